pub mod analyze;
pub mod health;
pub mod report;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Headroom over the file limit for the other form fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/analyze", post(analyze::analyze_handler))
        .route("/api/generate-report", post(report::generate_report_handler))
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::testing::{ScriptedProvider, KUBERNETES_GAP_REPLY};
    use crate::config::Config;
    use crate::extract::fixtures::docx_with_paragraphs;
    use crate::storage::FileStore;

    const BOUNDARY: &str = "resume-match-test-boundary";

    enum Part<'a> {
        File {
            name: &'a str,
            file_name: &'a str,
            bytes: &'a [u8],
        },
        Text {
            name: &'a str,
            value: &'a str,
        },
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File {
                    name,
                    file_name,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn test_config(dir: &Path, max_upload_bytes: usize) -> Config {
        Config {
            openai_api_key: None,
            openai_base_url: "http://127.0.0.1:9".to_string(),
            openai_model: "test-model".to_string(),
            llm_timeout: Duration::from_secs(1),
            upload_dir: dir.to_path_buf(),
            file_ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
            max_upload_bytes,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }

    struct Harness {
        router: Router,
        store: Arc<FileStore>,
        provider: Arc<ScriptedProvider>,
        _dir: tempfile::TempDir,
    }

    fn harness_with(provider: ScriptedProvider, max_upload_bytes: usize) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path(), Duration::from_secs(60)).unwrap());
        let provider = Arc::new(provider);
        let state = AppState {
            store: Arc::clone(&store),
            provider: provider.clone(),
            config: test_config(dir.path(), max_upload_bytes),
        };
        Harness {
            router: build_router(state),
            store,
            provider,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(ScriptedProvider::replying(KUBERNETES_GAP_REPLY), 5 * 1024 * 1024)
    }

    fn upload_dir_is_empty(store: &FileStore) -> bool {
        std::fs::read_dir(store.dir()).unwrap().next().is_none()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(router, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_docx_end_to_end() {
        let h = harness();
        let docx = docx_with_paragraphs(&["Skills: Go, Rust"]);
        let request = analyze_request(&[
            Part::File {
                name: "resume",
                file_name: "resume.docx",
                bytes: &docx,
            },
            Part::Text {
                name: "jobDescription",
                value: "Backend engineer: Go and Kubernetes required.",
            },
        ]);

        let (status, body) = send_json(h.router, request).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let skills: Vec<&str> = body["missingSkills"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["skill"].as_str().unwrap())
            .collect();
        assert!(skills.contains(&"Kubernetes"));
        assert_eq!(body["matchPercentage"], 58);

        assert_eq!(h.provider.calls(), 1);
        let prompt = h.provider.last_prompt().unwrap();
        assert!(prompt.contains("Skills: Go, Rust"));
        assert!(prompt.contains("Go and Kubernetes"));

        assert!(h.store.is_empty());
        assert!(upload_dir_is_empty(&h.store));
    }

    #[tokio::test]
    async fn test_unknown_fields_are_ignored() {
        let h = harness();
        let docx = docx_with_paragraphs(&["Rust developer"]);
        let request = analyze_request(&[
            Part::Text {
                name: "source",
                value: "web",
            },
            Part::File {
                name: "resume",
                file_name: "cv.DOCX",
                bytes: &docx,
            },
            Part::Text {
                name: "jobDescription",
                value: "Rust",
            },
        ]);
        let (status, _) = send(h.router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let h = harness();
        let request = analyze_request(&[Part::Text {
            name: "jobDescription",
            value: "Go developer",
        }]);
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "No resume file uploaded" }));
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_job_description_is_rejected_without_storing() {
        let h = harness();
        let docx = docx_with_paragraphs(&["Skills: Go"]);
        let request = analyze_request(&[
            Part::File {
                name: "resume",
                file_name: "resume.docx",
                bytes: &docx,
            },
            Part::Text {
                name: "jobDescription",
                value: "   ",
            },
        ]);
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Job description is required");
        assert_eq!(h.provider.calls(), 0);
        assert!(upload_dir_is_empty(&h.store));
    }

    #[tokio::test]
    async fn test_invalid_file_type_is_rejected() {
        let h = harness();
        let request = analyze_request(&[
            Part::File {
                name: "resume",
                file_name: "notes.txt",
                bytes: b"Skills: Go",
            },
            Part::Text {
                name: "jobDescription",
                value: "Go developer",
            },
        ]);
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed."
        );
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let h = harness_with(ScriptedProvider::replying(KUBERNETES_GAP_REPLY), 1024);
        let big = vec![b'a'; 4096];
        let request = analyze_request(&[
            Part::File {
                name: "resume",
                file_name: "resume.pdf",
                bytes: &big,
            },
            Part::Text {
                name: "jobDescription",
                value: "Go developer",
            },
        ]);
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("File too large."));
        assert!(upload_dir_is_empty(&h.store));
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_rejected_with_message() {
        let h = harness();
        let (status, body) = send_json(h.router, json_request("/api/analyze", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_bad_model_reply_is_generic_500_and_file_is_removed() {
        let h = harness_with(
            ScriptedProvider::replying("not json at all"),
            5 * 1024 * 1024,
        );
        let docx = docx_with_paragraphs(&["Skills: Go"]);
        let request = analyze_request(&[
            Part::File {
                name: "resume",
                file_name: "resume.docx",
                bytes: &docx,
            },
            Part::Text {
                name: "jobDescription",
                value: "Go developer",
            },
        ]);
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["message"].as_str().unwrap().contains("not json"));
        assert!(h.store.is_empty());
        assert!(upload_dir_is_empty(&h.store));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_500_and_file_is_removed() {
        let h = harness();
        let request = analyze_request(&[
            Part::File {
                name: "resume",
                file_name: "resume.docx",
                bytes: b"definitely not a zip archive",
            },
            Part::Text {
                name: "jobDescription",
                value: "Go developer",
            },
        ]);
        let (status, body) = send_json(h.router, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to extract text from resume");
        assert_eq!(h.provider.calls(), 0);
        assert!(upload_dir_is_empty(&h.store));
    }

    #[tokio::test]
    async fn test_generate_report_returns_pdf_with_headers() {
        let h = harness();
        let body = json!({
            "resumeFileName": "resume.docx",
            "analysisResult": serde_json::from_str::<Value>(KUBERNETES_GAP_REPLY).unwrap(),
        })
        .to_string();

        let response = h
            .router
            .oneshot(json_request("/api/generate-report", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=resume-analysis-report.pdf"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            headers[header::CONTENT_LENGTH].to_str().unwrap(),
            bytes.len().to_string()
        );
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_generate_report_requires_both_fields() {
        let analysis: Value = serde_json::from_str(KUBERNETES_GAP_REPLY).unwrap();
        let cases = [
            json!({ "analysisResult": analysis }).to_string(),
            json!({ "resumeFileName": "", "analysisResult": analysis }).to_string(),
            json!({ "resumeFileName": "resume.pdf" }).to_string(),
            "this is not json".to_string(),
        ];
        for body in cases {
            let h = harness();
            let (status, reply) =
                send_json(h.router, json_request("/api/generate-report", &body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(
                reply["message"],
                "Resume filename and analysis results are required"
            );
        }
    }

    #[tokio::test]
    async fn test_generate_report_rejects_out_of_range_score() {
        let h = harness();
        let mut analysis: Value = serde_json::from_str(KUBERNETES_GAP_REPLY).unwrap();
        analysis["matchPercentage"] = json!(140);
        let body = json!({ "resumeFileName": "r.pdf", "analysisResult": analysis }).to_string();
        let (status, reply) = send_json(h.router, json_request("/api/generate-report", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(reply["message"]
            .as_str()
            .unwrap()
            .contains("matchPercentage"));
    }
}
