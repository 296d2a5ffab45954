//! Report Renderer: lays an `AnalysisResult` out as a paginated A4 PDF built
//! on an in-memory lopdf document and serialized once.

pub mod canvas;
pub mod font_metrics;
pub mod style;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::debug;

use crate::analysis::{AnalysisResult, Insight};
use canvas::{Canvas, PageGeometry, TextStyle};
use font_metrics::Face;
use style::{
    priority_color, score_color, BODY, BODY_SIZE, FOOTER_SIZE, HEADING, HEADING_SIZE, ITEM_SIZE,
    MUTED, SCORE_BAR_HEIGHT, SUGGESTION, SUGGESTION_BACKGROUND, SUGGESTION_INDENT, TITLE_SIZE,
    TRACK, WHITE,
};

pub const REPORT_FILENAME: &str = "resume-analysis-report.pdf";
pub const REPORT_TITLE: &str = "Resume Analysis Report";
const PRODUCT_NAME: &str = "ResumeAI Optimizer";

const SECTION_GAP: f32 = 18.0;
const ITEM_GAP: f32 = 10.0;
/// Room a heading needs below it so it never sits alone at a page bottom.
const HEADING_KEEP_WITH_NEXT: f32 = 60.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid page layout: {0}")]
    Layout(String),

    #[error("failed to serialize PDF: {0}")]
    Serialize(String),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Renders on the blocking pool; layout and compression are CPU-bound.
pub async fn render(
    resume_name: String,
    analysis: AnalysisResult,
) -> Result<Vec<u8>, RenderError> {
    let generated_on = Utc::now().date_naive();
    tokio::task::spawn_blocking(move || render_report(&resume_name, &analysis, generated_on))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))?
}

pub fn render_report(
    resume_name: &str,
    analysis: &AnalysisResult,
    generated_on: NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    render_with_geometry(PageGeometry::A4, resume_name, analysis, generated_on)
}

fn render_with_geometry(
    geometry: PageGeometry,
    resume_name: &str,
    analysis: &AnalysisResult,
    generated_on: NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    let canvas = layout(geometry, resume_name, analysis)?;
    let pages = canvas.page_count();
    let date = generated_on.format("%Y-%m-%d").to_string();
    let footer_style = TextStyle::new(Face::Regular, FOOTER_SIZE, MUTED);

    // The name gets whatever the fixed footer text leaves of the line.
    let fixed = format!("Generated on {date} by {PRODUCT_NAME} |  | Page {pages} of {pages}");
    let fixed_width = font_metrics::measure(&fixed, Face::Regular, FOOTER_SIZE);
    let name_width = (geometry.content_width() - fixed_width).max(0.0);
    let footer_name =
        font_metrics::truncate_to_width(resume_name, Face::Regular, FOOTER_SIZE, name_width);

    let bytes = canvas.finish(REPORT_TITLE, footer_style, |page, total| {
        format!("Generated on {date} by {PRODUCT_NAME} | {footer_name} | Page {page} of {total}")
    })?;

    debug!(pages, bytes = bytes.len(), "Rendered analysis report");
    Ok(bytes)
}

fn layout(
    geometry: PageGeometry,
    resume_name: &str,
    analysis: &AnalysisResult,
) -> Result<Canvas, RenderError> {
    let mut canvas = Canvas::new(geometry)?;
    let body = TextStyle::new(Face::Regular, BODY_SIZE, BODY);

    canvas.centered(REPORT_TITLE, TextStyle::new(Face::Bold, TITLE_SIZE, HEADING));
    canvas.move_down(4.0);
    let resume_line = font_metrics::truncate_to_width(
        &format!("Resume: {resume_name}"),
        Face::Regular,
        BODY_SIZE,
        geometry.content_width(),
    );
    canvas.centered(&resume_line, TextStyle::new(Face::Regular, BODY_SIZE, MUTED));
    canvas.move_down(SECTION_GAP);

    let pct = analysis.match_percentage;
    section_heading(&mut canvas, "Match Score");
    canvas.labeled(
        "Match Percentage:",
        TextStyle::new(Face::Bold, ITEM_SIZE, BODY),
        &format!("{pct}%"),
        TextStyle::new(Face::Bold, ITEM_SIZE, score_color(pct)),
        0.0,
    );
    canvas.move_down(4.0);
    canvas.progress_bar(
        f32::from(pct) / 100.0,
        SCORE_BAR_HEIGHT,
        TRACK,
        score_color(pct),
    );
    canvas.move_down(SECTION_GAP);

    if !analysis.missing_skills.is_empty() {
        section_heading(&mut canvas, "Missing Skills");
        for skill in &analysis.missing_skills {
            canvas.heading_with_badge(
                &skill.skill,
                item_style(),
                &skill.priority.as_str().to_uppercase(),
                TextStyle::new(Face::Bold, FOOTER_SIZE, WHITE),
                priority_color(skill.priority),
            );
            item_body(
                &mut canvas,
                &skill.explanation,
                &skill.recommendation,
                skill.suggested_text.as_deref(),
            );
        }
        canvas.move_down(SECTION_GAP - ITEM_GAP);
    }

    insight_section(&mut canvas, "Experience Reframing", &analysis.experience_reframing);
    insight_section(&mut canvas, "Your Strengths", &analysis.strengths);

    let sections = analysis.sections();
    if !sections.is_empty() {
        section_heading(&mut canvas, "Ready-to-Use Resume Sections");
        for section in sections {
            canvas.paragraph(&section.title, item_style(), 0.0);
            canvas.move_down(2.0);
            canvas.highlighted(
                &section.content,
                body,
                SUGGESTION_INDENT,
                SUGGESTION_BACKGROUND,
                HEADING,
            );
            canvas.move_down(ITEM_GAP);
        }
    }

    Ok(canvas)
}

fn item_style() -> TextStyle {
    TextStyle::new(Face::Bold, ITEM_SIZE, BODY)
}

fn section_heading(canvas: &mut Canvas, title: &str) {
    canvas.ensure_space(HEADING_KEEP_WITH_NEXT);
    canvas.paragraph(title, TextStyle::new(Face::Bold, HEADING_SIZE, HEADING), 0.0);
    canvas.move_down(4.0);
}

fn insight_section(canvas: &mut Canvas, title: &str, items: &[Insight]) {
    if items.is_empty() {
        return;
    }
    section_heading(canvas, title);
    for item in items {
        canvas.paragraph(&item.title, item_style(), 0.0);
        item_body(
            canvas,
            &item.explanation,
            &item.recommendation,
            item.suggested_text.as_deref(),
        );
    }
    canvas.move_down(SECTION_GAP - ITEM_GAP);
}

fn item_body(
    canvas: &mut Canvas,
    explanation: &str,
    recommendation: &str,
    suggested_text: Option<&str>,
) {
    let body = TextStyle::new(Face::Regular, BODY_SIZE, BODY);
    canvas.paragraph(explanation, body, 0.0);
    canvas.labeled(
        "Recommendation:",
        TextStyle::new(Face::Bold, BODY_SIZE, BODY),
        recommendation,
        body,
        0.0,
    );
    if let Some(text) = suggested_text {
        canvas.move_down(2.0);
        canvas.paragraph(
            "Suggested Text:",
            TextStyle::new(Face::Bold, BODY_SIZE, SUGGESTION),
            SUGGESTION_INDENT,
        );
        canvas.highlighted(
            text,
            TextStyle::new(Face::Oblique, BODY_SIZE, SUGGESTION),
            SUGGESTION_INDENT,
            SUGGESTION_BACKGROUND,
            HEADING,
        );
    }
    canvas.move_down(ITEM_GAP);
}
