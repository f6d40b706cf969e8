//! # Report Assembler
//!
//! Builds a compliance report for a lab in one of two formats and
//! serializes it to PDF. Construction is a single pass through fixed
//! stages:
//!
//! ```text
//! TitlePage → Abstract → Equipment → Staff → Projects → Finalize
//! ```
//!
//! The equipment, staff and project stages are skipped when the lab has no
//! records of that kind. Each format implements [`ReportLayout`]; the
//! assembler only decides which stages run and in what order.

pub mod ieee;
pub mod who;

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{LabError, Result};
use crate::font::FontContext;
use crate::layout::canvas::Canvas;
use crate::layout::LayoutPage;
use crate::model::{Assistant, Equipment, Lab, Project};
use crate::pdf::{DocumentInfo, PdfWriter};
use crate::style::{Segment, StyledLine};

/// Placeholder drawn for absent fields.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Two-column flowing layout.
    #[default]
    Ieee,
    /// Single-column layout with tables.
    Who,
}

impl ReportFormat {
    /// Tag used in titles and file names.
    pub fn tag(self) -> &'static str {
        match self {
            ReportFormat::Ieee => "IEEE",
            ReportFormat::Who => "WHO",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReportFormat {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ieee" => Ok(ReportFormat::Ieee),
            "who" => Ok(ReportFormat::Who),
            other => Err(LabError::Config(format!(
                "unknown report format '{}' (expected ieee or who)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    TitlePage,
    Abstract,
    Equipment,
    Staff,
    Projects,
    Finalize,
}

impl ReportStage {
    pub fn next(self) -> Option<ReportStage> {
        match self {
            ReportStage::TitlePage => Some(ReportStage::Abstract),
            ReportStage::Abstract => Some(ReportStage::Equipment),
            ReportStage::Equipment => Some(ReportStage::Staff),
            ReportStage::Staff => Some(ReportStage::Projects),
            ReportStage::Projects => Some(ReportStage::Finalize),
            ReportStage::Finalize => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Date printed on the report. Same lab + same date = same bytes.
    pub date: NaiveDate,
}

impl ReportOptions {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Stages that ran, in order.
    pub stages: Vec<ReportStage>,
}

/// One report format: draws each stage onto its own canvas.
pub trait ReportLayout {
    fn title_page(&mut self, lab: &Lab, options: &ReportOptions);
    fn abstract_section(&mut self, lab: &Lab);
    fn equipment_section(&mut self, equipments: &[Equipment]);
    fn staff_section(&mut self, assistants: &[Assistant]);
    fn projects_section(&mut self, projects: &[Project]);
    /// Stamp the last footer and hand back the pages.
    fn finish(self) -> Vec<LayoutPage>;
}

/// `<name>_<TAG>_Report.pdf`, with every whitespace run in the name
/// replaced by one underscore.
pub fn report_filename(lab_name: &str, format: ReportFormat) -> String {
    let mut name = String::with_capacity(lab_name.len());
    let mut in_space = false;
    for ch in lab_name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(ch);
            in_space = false;
        }
    }
    format!("{}_{}_Report.pdf", name, format.tag())
}

/// Run the stage machine against `layout`.
pub fn assemble<L: ReportLayout>(
    mut layout: L,
    lab: &Lab,
    options: &ReportOptions,
) -> (Vec<LayoutPage>, Vec<ReportStage>) {
    let mut stages = Vec::new();
    let mut stage = Some(ReportStage::TitlePage);

    while let Some(current) = stage {
        let ran = match current {
            ReportStage::TitlePage => {
                layout.title_page(lab, options);
                true
            }
            ReportStage::Abstract => {
                layout.abstract_section(lab);
                true
            }
            ReportStage::Equipment if !lab.equipments.is_empty() => {
                layout.equipment_section(&lab.equipments);
                true
            }
            ReportStage::Staff if !lab.assistants.is_empty() => {
                layout.staff_section(&lab.assistants);
                true
            }
            ReportStage::Projects if !lab.projects.is_empty() => {
                layout.projects_section(&lab.projects);
                true
            }
            ReportStage::Finalize => true,
            _ => false,
        };
        if ran {
            stages.push(current);
        }
        stage = current.next();
    }

    (layout.finish(), stages)
}

/// Lay out a report without serializing it.
pub fn layout_report(
    lab: &Lab,
    format: ReportFormat,
    options: &ReportOptions,
    font_context: &FontContext,
) -> (Vec<LayoutPage>, Vec<ReportStage>) {
    match format {
        ReportFormat::Ieee => assemble(ieee::IeeeLayout::new(font_context), lab, options),
        ReportFormat::Who => assemble(who::WhoLayout::new(font_context), lab, options),
    }
}

/// Lay out and serialize a report for `lab`.
pub fn render_report(lab: &Lab, format: ReportFormat, options: &ReportOptions) -> Result<RenderedReport> {
    if lab.name.trim().is_empty() {
        return Err(LabError::RenderError(
            "the lab has no name to title the report with".to_string(),
        ));
    }

    let started = Utc::now();
    let font_context = FontContext::new();
    let (pages, stages) = layout_report(lab, format, options, &font_context);

    let document_info = DocumentInfo {
        title: Some(format!("{} {} Report", lab.name, format)),
        author: Some(lab.name.clone()),
        subject: Some(format!("Biosafety compliance report, {}", lab.location)),
        creation_date: Some(options.date),
    };
    let bytes = PdfWriter::new().write(&pages, &document_info);
    let elapsed = Utc::now() - started;

    info!(
        "rendered {} report for '{}': {} pages, {} bytes in {} ms",
        format,
        lab.name,
        pages.len(),
        bytes.len(),
        elapsed.num_milliseconds()
    );

    Ok(RenderedReport {
        filename: report_filename(&lab.name, format),
        bytes,
        page_count: pages.len(),
        stages,
    })
}

/// `value`, or [`NOT_AVAILABLE`] when it is blank.
pub(crate) fn or_na(field: &str, value: &str) -> String {
    if value.trim().is_empty() {
        warn!("{} missing, rendering {}", field, NOT_AVAILABLE);
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

/// `items` joined with `sep`, or [`NOT_AVAILABLE`] when there are none.
pub(crate) fn join_or_na(field: &str, items: &[String], sep: &str) -> String {
    let present: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if present.is_empty() {
        warn!("{} missing, rendering {}", field, NOT_AVAILABLE);
        NOT_AVAILABLE.to_string()
    } else {
        present.join(sep)
    }
}

pub(crate) fn bullet(text: &str) -> StyledLine {
    StyledLine::plain(format!("\u{2022} {}", text))
}

/// A bold heading line followed by one bullet per item, or a single
/// `Heading: N/A` line when there are no items.
pub(crate) fn bullet_list(heading: &str, items: &[String]) -> Vec<StyledLine> {
    let present: Vec<&String> = items.iter().filter(|s| !s.trim().is_empty()).collect();
    if present.is_empty() {
        warn!("{} missing, rendering {}", heading, NOT_AVAILABLE);
        return vec![StyledLine::labeled(heading, NOT_AVAILABLE)];
    }
    let mut lines = vec![StyledLine::new(vec![Segment::bold(format!("{}:", heading))])];
    lines.extend(present.into_iter().map(|s| bullet(s)));
    lines
}

/// Keep at most `max_lines` wrapped title lines. When text is cut the last
/// kept line ends in an ellipsis and still fits `max_width` in the
/// canvas's current font.
pub(crate) fn fit_lines(canvas: &Canvas, mut lines: Vec<String>, max_lines: usize, max_width: f64) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    warn!("cutting a {}-line title block to {} lines", lines.len(), max_lines);
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let mut kept = last.trim_end().to_string();
        while !kept.is_empty() && canvas.get_text_width(&format!("{}\u{2026}", kept)) > max_width {
            kept.pop();
        }
        *last = format!("{}\u{2026}", kept.trim_end());
    }
    lines
}
