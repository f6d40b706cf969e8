//! Integration tests for the BioLedger pipeline.
//!
//! These tests exercise the full path from a lab document to PDF output.
//! They verify:
//! - Records wrap and flow through columns and pages as laid out
//! - Justified lines fill their column exactly
//! - Nothing is drawn below the bottom margin except the page footer,
//!   even for over-tall table rows and very long lab names
//! - Report output is deterministic for a given lab and date
//! - Table headers repeat on every page a table spans
//! - The lab service, alert mail, and chat session work end to end

use bioledger::chat::{self, ChatMessage, CompletionClient, Conversation};
use bioledger::config::MailConfig;
use bioledger::font::FontContext;
use bioledger::layout::canvas::Canvas;
use bioledger::layout::flow::{Column, FlowCursor};
use bioledger::layout::section::{SectionRenderer, SectionStyle, RECORD_GAP};
use bioledger::layout::styled::ParagraphStyle;
use bioledger::layout::{Edges, LayoutPage, PageGeometry, PageSize};
use bioledger::mail::{AlertMailer, OutboxTransport};
use bioledger::model::{Alert, AlertCategory, Bsl, Equipment, Lab, Project};
use bioledger::report::{ieee, layout_report, report_filename};
use bioledger::service::{InitState, LabService};
use bioledger::store::{JsonFileStore, MemoryStore};
use bioledger::style::{FontFamily, FontStyle, Segment, StyledLine, TextAlign};
use bioledger::{render_report, render_report_json, LabError, ReportFormat, ReportOptions};
use chrono::{NaiveDate, TimeZone, Utc};

// ─── Helpers ────────────────────────────────────────────────────

const EXAMPLE_LAB: &str = include_str!("../demos/example_lab.json");

fn example_lab() -> Lab {
    serde_json::from_str(EXAMPLE_LAB).unwrap()
}

fn report_date() -> ReportOptions {
    ReportOptions::new(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
}

fn equipment(name: &str, specs: &[&str]) -> Equipment {
    Equipment {
        name: name.to_string(),
        model: "M-100".to_string(),
        manufacturer: "Esco".to_string(),
        year: 2021,
        photo_url: None,
        specifications: specs.iter().map(|s| s.to_string()).collect(),
    }
}

fn project(n: usize) -> Project {
    Project {
        title: format!("Pathogen Study {}", n),
        subtitle: String::new(),
        bsl: Bsl::Bsl2,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        team_members: vec!["Asha Rao".to_string(), "Ravi Kumar".to_string()],
        aim: "Characterise the growth of environmental isolates under varying temperature, \
              humidity and nutrient conditions over a full seasonal cycle."
            .to_string(),
        objectives: vec![
            "Collect samples".to_string(),
            "Culture isolates".to_string(),
            "Report findings".to_string(),
        ],
        methodology: "Samples are cultured on selective media, counted, and sequenced. \
                      Results are compared across sites and seasons."
            .to_string(),
        equipment: vec!["Incubator".to_string()],
        results: vec![],
    }
}

fn all_text(pages: &[LayoutPage]) -> String {
    pages
        .iter()
        .flat_map(|p| p.texts())
        .filter_map(|e| e.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every text element except the page footer sits above the bottom margin.
fn assert_inside_margins(pages: &[LayoutPage], geometry: &PageGeometry, format: ReportFormat) {
    for page in pages {
        for element in page.texts() {
            if element.text().is_some_and(|t| t.starts_with("Page ")) {
                continue;
            }
            assert!(
                element.y <= geometry.content_bottom() + 1e-6,
                "{} text {:?} at y={} is below the margin",
                format,
                element.text(),
                element.y
            );
        }
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-1.7"), "missing PDF header");
    let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(64)..]);
    assert!(tail.contains("startxref"), "missing startxref");
    assert!(tail.trim_end().ends_with("%%EOF"), "missing %%EOF");
}

// ─── Layout ─────────────────────────────────────────────────────

#[test]
fn test_equipment_name_wraps_before_bullets() {
    // An 80pt column.
    let geometry = PageGeometry::single_column(
        PageSize {
            width: 180.0,
            height: 400.0,
        },
        Edges::symmetric(20.0, 50.0),
    );
    let style = SectionStyle {
        title: ParagraphStyle::new(FontFamily::Times, 10.0, 12.0),
        title_font_style: FontStyle::Bold,
        space_after_title: 4.0,
        rule: None,
        body: ParagraphStyle::new(FontFamily::Times, 10.0, 12.0),
        record_gap: RECORD_GAP,
    };
    let fc = FontContext::new();
    let mut canvas = Canvas::new(&fc, geometry.size);
    let mut cursor = FlowCursor::new(geometry);

    let records = [equipment("Biosafety Cabinet Class II", &["HEPA H14", "UV lamp", "Alarm"])];
    let out = SectionRenderer::new().render(&mut canvas, &mut cursor, "Equipment", &records, &style, |e, _| {
        let mut lines = vec![StyledLine::new(vec![Segment::bold(e.name.clone())])];
        lines.extend(e.specifications.iter().map(|s| StyledLine::plain(format!("\u{2022} {}", s))));
        lines
    });

    let texts: Vec<&str> = out.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Biosafety Cabinet", "Class II", "\u{2022} HEPA H14", "\u{2022} UV lamp", "\u{2022} Alarm"]
    );
    for pair in out.lines.windows(2) {
        assert!((pair[1].y - pair[0].y - 12.0).abs() < 1e-9);
    }
}

#[test]
fn test_projects_move_whole_between_columns() {
    let fc = FontContext::new();
    let mut canvas = Canvas::new(&fc, PageSize::A4);
    let mut cursor = FlowCursor::new(ieee::geometry());
    let projects: Vec<Project> = (1..=12).map(project).collect();

    let out = SectionRenderer::new().render(
        &mut canvas,
        &mut cursor,
        "III. ONGOING RESEARCH PROJECTS",
        &projects,
        &ieee::section_style(),
        ieee::format_project,
    );

    assert_eq!(out.records.len(), 12);
    assert!(out.records.iter().any(|r| r.column == Column::Right));
    assert!(out.records.iter().any(|r| r.page > 1));
    for record in &out.records {
        let lines = &out.lines[record.first_line..record.first_line + record.line_count];
        assert!(
            lines.iter().all(|l| l.page == record.page && l.column == record.column),
            "project {} was split",
            record.index + 1
        );
    }
}

#[test]
fn test_record_in_right_column_moves_to_next_page() {
    let fc = FontContext::new();
    let mut canvas = Canvas::new(&fc, PageSize::A4);
    let mut cursor = FlowCursor::new(ieee::geometry());
    cursor.place(cursor.remaining());
    cursor.request_break(12.0).apply(&mut canvas);
    assert_eq!(cursor.column(), Column::Right);
    cursor.place(cursor.remaining() - 100.0);

    let sizes = [2usize, 20];
    let out = SectionRenderer::new().render(
        &mut canvas,
        &mut cursor,
        "Projects",
        &sizes,
        &ieee::section_style(),
        |n, i| (0..*n).map(|l| StyledLine::plain(format!("project {} line {}", i + 1, l))).collect(),
    );

    assert_eq!((out.records[0].page, out.records[0].column), (1, Column::Right));
    let second = &out.records[1];
    assert_eq!((second.page, second.column), (2, Column::Left));
    assert!((second.y - ieee::geometry().content_top()).abs() < 1e-9);
}

#[test]
fn test_justified_lines_fill_the_column() {
    let fc = FontContext::new();
    let mut canvas = Canvas::new(&fc, PageSize::A4);
    let mut cursor = FlowCursor::new(ieee::geometry());
    let projects: Vec<Project> = (1..=3).map(project).collect();

    let out = SectionRenderer::new().render(
        &mut canvas,
        &mut cursor,
        "Projects",
        &projects,
        &ieee::section_style(),
        ieee::format_project,
    );

    let justified: Vec<_> = out.lines.iter().filter(|l| l.justified).collect();
    assert!(!justified.is_empty());
    for line in justified {
        assert!(
            (line.width - line.available).abs() < 0.01,
            "{:?} is {} wide, expected {}",
            line.text,
            line.width,
            line.available
        );
    }
}

#[test]
fn test_nothing_drawn_below_bottom_margin() {
    let mut lab = example_lab();
    lab.projects = (1..=15).map(project).collect();
    let fc = FontContext::new();

    for (format, geometry) in [
        (ReportFormat::Ieee, ieee::geometry()),
        (ReportFormat::Who, bioledger::report::who::geometry()),
    ] {
        let (pages, _) = layout_report(&lab, format, &report_date(), &fc);
        assert!(pages.len() > 2);
        assert_inside_margins(&pages, &geometry, format);
    }
}

#[test]
fn test_long_lab_name_stays_on_the_page() {
    let mut lab = example_lab();
    lab.name = "Biosafety ".repeat(150).trim_end().to_string();
    lab.location = "Mysore Road, ".repeat(40);
    let fc = FontContext::new();

    for (format, geometry) in [
        (ReportFormat::Ieee, ieee::geometry()),
        (ReportFormat::Who, bioledger::report::who::geometry()),
    ] {
        let (pages, _) = layout_report(&lab, format, &report_date(), &fc);
        assert_inside_margins(&pages, &geometry, format);
        // The records still come after the title block.
        assert!(all_text(&pages).contains("HEPA H14 filtration"));
    }

    let (pages, _) = layout_report(&lab, ReportFormat::Who, &report_date(), &fc);
    let title_page: Vec<(&str, f64)> = pages[0]
        .texts()
        .filter_map(|e| e.text().map(|t| (t, e.y)))
        .collect();
    let date_y = title_page
        .iter()
        .find(|(t, _)| t.starts_with("Date of Report"))
        .map(|(_, y)| *y)
        .unwrap();
    let lowest_location = title_page
        .iter()
        .filter(|(t, _)| t.contains("Mysore Road"))
        .map(|(_, y)| *y)
        .fold(0.0, f64::max);
    assert!(lowest_location < date_y - 20.0);
}

#[test]
fn test_every_page_has_a_footer() {
    let mut lab = example_lab();
    lab.projects = (1..=15).map(project).collect();
    let fc = FontContext::new();
    let (pages, _) = layout_report(&lab, ReportFormat::Ieee, &report_date(), &fc);

    for (i, page) in pages.iter().enumerate() {
        let footer = format!("Page {}", i + 1);
        assert!(page.texts().any(|e| e.text() == Some(footer.as_str())));
    }
}

#[test]
fn test_record_text_is_preserved() {
    let lab = example_lab();
    let fc = FontContext::new();

    let (pages, _) = layout_report(&lab, ReportFormat::Ieee, &report_date(), &fc);
    let text = all_text(&pages);
    for spec in ["HEPA H14 filtration", "Downflow 0.3 m/s", "Three 32-well blocks"] {
        assert!(text.contains(spec), "missing {:?}", spec);
    }
    assert!(text.contains("Specifications:"));
    assert!(text.contains("N/A"));
    assert!(text.contains("RVCE Bio Lab"));

    let (pages, _) = layout_report(&lab, ReportFormat::Who, &report_date(), &fc);
    let text = all_text(&pages);
    assert!(text.contains("WHO-STYLE COMPLIANCE REPORT"));
    assert!(text.contains("Date of Report: 14/03/2025"));
    assert!(text.contains("Cell Culture"));
    assert!(text.contains("Name / Model"));
}

#[test]
fn test_section_text_matches_formatted_records() {
    let projects: Vec<Project> = (1..=20).map(project).collect();
    let fc = FontContext::new();
    let mut canvas = Canvas::new(&fc, PageSize::A4);
    let mut cursor = FlowCursor::new(ieee::geometry());
    let out = SectionRenderer::new().render(
        &mut canvas,
        &mut cursor,
        "Ongoing Research Projects",
        &projects,
        &ieee::section_style(),
        ieee::format_project,
    );

    // Wrapping only moves line breaks; words and their order survive.
    let formatted: Vec<String> = projects
        .iter()
        .enumerate()
        .flat_map(|(i, p)| ieee::format_project(p, i))
        .map(|line| line.text())
        .collect();
    let rendered: Vec<&str> = out.lines.iter().map(|l| l.text.as_str()).collect();
    let words = |text: &str| text.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(words(&rendered.join(" ")), words(&formatted.join(" ")));
    assert!(cursor.page() > 1);
}

#[test]
fn test_who_row_taller_than_a_page_is_split() {
    let specs: Vec<String> = (1..=80).map(|i| format!("Spec {}", i)).collect();
    let spec_refs: Vec<&str> = specs.iter().map(String::as_str).collect();
    let mut lab = Lab::new("Cell Bio Lab", "Mysuru");
    lab.equipments = vec![
        equipment("Sequencer", &spec_refs),
        equipment("Centrifuge", &["15000 rpm"]),
    ];
    let geometry = bioledger::report::who::geometry();
    let fc = FontContext::new();
    let (pages, _) = layout_report(&lab, ReportFormat::Who, &report_date(), &fc);

    assert_inside_margins(&pages, &geometry, ReportFormat::Who);
    let texts: Vec<&str> = pages.iter().flat_map(|p| p.texts()).filter_map(|e| e.text()).collect();
    for spec in &specs {
        let bullet = format!("\u{2022} {}", spec);
        assert_eq!(texts.iter().filter(|t| **t == bullet).count(), 1, "{:?}", bullet);
    }
    assert!(texts.contains(&"Centrifuge"));

    let spec_pages: Vec<&LayoutPage> = pages
        .iter()
        .filter(|p| p.texts().any(|e| e.text().is_some_and(|t| t.starts_with("\u{2022} Spec "))))
        .collect();
    assert!(spec_pages.len() > 1);
    for page in spec_pages {
        assert!(page.texts().any(|e| e.text() == Some("Name / Model")));
    }
}

#[test]
fn test_who_table_header_repeats() {
    let mut lab = Lab::new("Cell Bio Lab", "Mysuru");
    lab.equipments = (1..=60)
        .map(|i| equipment(&format!("Centrifuge {}", i), &["15000 rpm", "Refrigerated"]))
        .collect();
    let fc = FontContext::new();
    let (pages, _) = layout_report(&lab, ReportFormat::Who, &report_date(), &fc);

    let table_pages: Vec<&LayoutPage> = pages
        .iter()
        .filter(|p| p.texts().any(|e| e.text().is_some_and(|t| t.starts_with("Centrifuge "))))
        .collect();
    assert!(table_pages.len() > 1);
    for page in table_pages {
        assert!(page.texts().any(|e| e.text() == Some("Name / Model")));
    }
}

// ─── Report output ──────────────────────────────────────────────

#[test]
fn test_report_is_deterministic() {
    let lab = example_lab();
    for format in [ReportFormat::Ieee, ReportFormat::Who] {
        let a = render_report(&lab, format, &report_date()).unwrap();
        let b = render_report(&lab, format, &report_date()).unwrap();
        assert_eq!(a.bytes, b.bytes);
        assert_valid_pdf(&a.bytes);
    }
}

#[test]
fn test_report_filename_and_page_count() {
    let lab = example_lab();
    let report = render_report(&lab, ReportFormat::Who, &report_date()).unwrap();
    assert_eq!(report.filename, "RVCE_Bio_Lab_WHO_Report.pdf");
    assert_eq!(report.filename, report_filename(&lab.name, ReportFormat::Who));

    let pdf = String::from_utf8_lossy(&report.bytes);
    assert!(pdf.contains(&format!("/Count {}", report.page_count)));
    assert!(report.page_count >= 2);
}

#[test]
fn test_render_report_json_reports_parse_errors() {
    let err = render_report_json("{\"name\": \"Lab\"", ReportFormat::Ieee, &report_date()).unwrap_err();
    match err {
        LabError::ParseError { hint, .. } => assert!(hint.contains("truncated")),
        other => panic!("expected a parse error, got {}", other),
    }

    let report = render_report_json(EXAMPLE_LAB, ReportFormat::Ieee, &report_date()).unwrap();
    assert_valid_pdf(&report.bytes);
}

// ─── Service ────────────────────────────────────────────────────

#[test]
fn test_service_persists_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("lab.json");

    let mut service = LabService::new(JsonFileStore::new(&path));
    assert_eq!(service.state().unwrap(), InitState::Uninitialized);
    assert!(matches!(service.lab(), Err(LabError::NotInitialized)));

    service.initialize_empty("RVCE Bio Lab", "Bengaluru").unwrap();
    let list = service.add_equipment(equipment("Autoclave", &["121 C"])).unwrap();
    assert_eq!(list.len(), 1);

    let reopened = LabService::new(JsonFileStore::new(&path));
    assert_eq!(reopened.state().unwrap(), InitState::Initialized);
    assert_eq!(reopened.equipments().unwrap()[0].name, "Autoclave");
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_service_is_a_singleton() {
    let mut service = LabService::new(MemoryStore::new());
    service.initialize(example_lab()).unwrap();
    assert!(matches!(
        service.initialize_empty("Second Lab", "Elsewhere"),
        Err(LabError::AlreadyInitialized)
    ));
    assert_eq!(service.lab().unwrap().name, "RVCE Bio Lab");
}

#[test]
fn test_report_from_uninitialized_store() {
    let service = LabService::new(MemoryStore::new());
    let result = service.lab().and_then(|lab| render_report(&lab, ReportFormat::Ieee, &report_date()));
    assert!(matches!(result, Err(LabError::NotInitialized)));
}

// ─── Mail & chat ────────────────────────────────────────────────

#[test]
fn test_alert_mail_lands_in_outbox() {
    let dir = tempfile::tempdir().unwrap();
    let config = MailConfig {
        recipients: vec!["safety@example.org".to_string(), "head@example.org".to_string()],
        outbox_dir: dir.path().to_path_buf(),
        ..MailConfig::default()
    };
    let mailer = AlertMailer::new(&config, OutboxTransport::new(dir.path()));
    let alert = Alert {
        title: Some("Acid spill".to_string()),
        category: AlertCategory::ChemicalSpill,
        description: Some("Bench 4".to_string()),
    };
    let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();

    let mail = mailer.send_alert("RVCE Bio Lab", &alert, at).unwrap();
    assert_eq!(mail.subject, "Hazard Alert RVCE Bio Lab");

    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);
    let eml = std::fs::read_to_string(&files[0]).unwrap();
    assert!(eml.contains("To: safety@example.org, head@example.org"));
    assert!(eml.contains("Chemical Spill: Acid spill - Bench 4"));
}

#[test]
fn test_alert_mail_needs_recipients() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = AlertMailer::new(&MailConfig::default(), OutboxTransport::new(dir.path()));
    let alert = Alert {
        title: None,
        category: AlertCategory::Fire,
        description: None,
    };
    assert!(matches!(
        mailer.send_alert("Lab", &alert, Utc::now()),
        Err(LabError::NoRecipients)
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

struct CountingClient;

impl CompletionClient for CountingClient {
    fn complete(&self, messages: &[ChatMessage]) -> bioledger::Result<String> {
        Ok(format!("{} messages so far", messages.len()))
    }
}

struct OfflineClient;

impl CompletionClient for OfflineClient {
    fn complete(&self, _messages: &[ChatMessage]) -> bioledger::Result<String> {
        Err(LabError::Completion("connection refused".to_string()))
    }
}

#[test]
fn test_chat_session_keeps_context() {
    let mut conversation = Conversation::start("You are a biosafety assistant.", "Hello!");

    assert_eq!(chat::ask(&mut conversation, &CountingClient, "What is BSL-3?").unwrap(), "3 messages so far");
    assert_eq!(chat::ask(&mut conversation, &CountingClient, "And BSL-4?").unwrap(), "5 messages so far");
    assert_eq!(conversation.turns().len(), 4);

    assert!(chat::ask(&mut conversation, &OfflineClient, "Still there?").is_err());
    assert_eq!(conversation.turns().len(), 4);

    assert!(matches!(
        chat::ask(&mut conversation, &CountingClient, "   "),
        Err(LabError::EmptyMessage)
    ));

    conversation.reset();
    assert!(conversation.turns().is_empty());
    assert_eq!(conversation.messages().len(), 2);
}

#[test]
fn test_alignment_flag_is_respected() {
    // Left-aligned body never reports justified lines.
    let fc = FontContext::new();
    let mut canvas = Canvas::new(&fc, PageSize::A4);
    let mut cursor = FlowCursor::new(ieee::geometry());
    let style = SectionStyle {
        body: ieee::body_style().with_align(TextAlign::Left),
        ..ieee::section_style()
    };
    let out = SectionRenderer::new().render(&mut canvas, &mut cursor, "Projects", &[project(1)], &style, ieee::format_project);
    assert!(out.lines.iter().all(|l| !l.justified));
}
