//! # BioLedger
//!
//! Records for a single biosafety laboratory, and the compliance reports
//! generated from them.
//!
//! A deployment holds exactly one lab document. Projects, staff, equipment,
//! alerts and emergency contacts are embedded lists inside it, and every
//! change rewrites the whole document. From that document BioLedger
//! produces paginated PDF reports in two layouts: an IEEE-style two-column
//! paper and a WHO-style single-column report with tables.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / CLI)
//!       ↓
//!   [service]  - Singleton lab, embedded-list CRUD over a [store]
//!       ↓
//!   [report]   - Stage machine, IEEE and WHO layouts
//!       ↓
//!   [layout]   - Canvas, flow cursor, sections, tables
//!       ↓
//!   [pdf]      - Serialize to PDF bytes
//! ```
//!
//! [`mail`] turns alerts into notification emails and [`chat`] relays a
//! per-session conversation to a hosted completion API.

pub mod chat;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod mail;
pub mod model;
pub mod pdf;
pub mod report;
pub mod service;
pub mod store;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{LabError, Result};
pub use model::Lab;
pub use report::{render_report, RenderedReport, ReportFormat, ReportOptions};

/// Render a report for a lab described as JSON.
///
/// The JSON is the same document the store persists. Parse failures carry
/// a hint about what to fix.
pub fn render_report_json(json: &str, format: ReportFormat, options: &ReportOptions) -> Result<RenderedReport> {
    let lab: Lab = serde_json::from_str(json)?;
    render_report(&lab, format, options)
}
