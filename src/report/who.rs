//! WHO-style report: a separate title page, then numbered single-column
//! sections with equipment and staff as grid tables.

use super::{bullet_list, fit_lines, or_na, ReportLayout, ReportOptions, NOT_AVAILABLE};
use crate::font::{FontContext, FontKey};
use crate::layout::canvas::{Canvas, PageFooter, TextOptions};
use crate::layout::flow::FlowCursor;
use crate::layout::section::{SectionRenderer, SectionStyle, RECORD_GAP};
use crate::layout::styled::ParagraphStyle;
use crate::layout::table::{GridTable, TableColumn, TableStyle};
use crate::layout::{Edges, LayoutPage, PageGeometry, PageSize};
use crate::model::{Assistant, Equipment, Lab, Project};
use crate::style::{Color, FontFamily, FontStyle, Segment, StyledLine, TextAlign};

const FAMILY: FontFamily = FontFamily::Helvetica;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_X: f64 = 55.0;

const SECTION_SPACING: f64 = 20.0;

// Keeps the title page clear of the date line at the bottom.
const TITLE_MAX_LINES: usize = 6;
const LOCATION_MAX_LINES: usize = 3;

pub const ABSTRACT: &str = "This report presents a compliance overview of a BSL certified biosafety \
laboratory engaged in ongoing high-containment research projects. It details laboratory \
infrastructure, equipment inventory, and adherence to regulatory biosafety standards. The \
document also outlines active research efforts, staff qualifications, and safety protocols, \
ensuring operational alignment with institutional and international guidelines for secure and \
responsible biological research.";

pub fn geometry() -> PageGeometry {
    PageGeometry::single_column(
        PageSize::A4,
        Edges {
            top: MARGIN_TOP,
            right: MARGIN_X,
            bottom: MARGIN_BOTTOM,
            left: MARGIN_X,
        },
    )
}

pub fn section_style() -> SectionStyle {
    SectionStyle {
        title: ParagraphStyle::new(FAMILY, 14.0, 18.0),
        title_font_style: FontStyle::Bold,
        space_after_title: 16.0,
        rule: Some(Color::BLACK),
        body: ParagraphStyle::new(FAMILY, 10.0, 14.0).with_align(TextAlign::Justify),
        record_gap: RECORD_GAP,
    }
}

fn project_style() -> SectionStyle {
    SectionStyle {
        record_gap: RECORD_GAP + 12.0,
        ..section_style()
    }
}

pub struct WhoLayout<'a> {
    canvas: Canvas<'a>,
    cursor: FlowCursor,
    sections: SectionRenderer,
}

impl<'a> WhoLayout<'a> {
    pub fn new(font_context: &'a FontContext) -> Self {
        let footer = PageFooter {
            font: FontKey::new(FAMILY, FontStyle::Normal),
            font_size: 8.0,
            color: Color::BLACK,
            offset_from_bottom: MARGIN_BOTTOM / 2.0,
        };
        Self {
            canvas: Canvas::new(font_context, PageSize::A4).with_footer(footer),
            cursor: FlowCursor::new(geometry()),
            sections: SectionRenderer::new(),
        }
    }

    fn centered(&mut self, text: &str, style: FontStyle, size: f64, y: f64) {
        let g = geometry();
        self.canvas.set_font(FAMILY, style);
        self.canvas.set_font_size(size);
        let center = g.size.width / 2.0;
        self.canvas.text(text, center, y, TextOptions::aligned(TextAlign::Center));
    }

    fn table_section(&mut self, heading: &str, columns: Vec<TableColumn>, rows: Vec<Vec<String>>) {
        let table = GridTable::new(columns, TableStyle::default());
        self.cursor.skip(SECTION_SPACING);
        let next = table.lead_height(&mut self.canvas, &self.cursor, &rows);
        self.sections
            .render_heading(&mut self.canvas, &mut self.cursor, heading, &section_style(), next);
        table.render(&mut self.canvas, &mut self.cursor, &rows);
    }
}

impl ReportLayout for WhoLayout<'_> {
    fn title_page(&mut self, lab: &Lab, options: &ReportOptions) {
        let g = geometry();
        let height = g.size.height;

        self.centered("WHO-STYLE COMPLIANCE REPORT", FontStyle::Bold, 10.0, 80.0);

        self.canvas.set_font(FAMILY, FontStyle::Bold);
        self.canvas.set_font_size(24.0);
        let title = format!("Bio-safety Compliance Report: {}", lab.name);
        let title_width = g.content_width() * 0.8;
        let lines = self.canvas.split_text_to_size(&title, title_width);
        let mut y = 180.0;
        for line in fit_lines(&self.canvas, lines, TITLE_MAX_LINES, title_width) {
            self.canvas
                .text(&line, g.size.width / 2.0, y, TextOptions::aligned(TextAlign::Center));
            y += 28.0;
        }

        self.canvas.set_font(FAMILY, FontStyle::Normal);
        self.canvas.set_font_size(12.0);
        let location = format!("Location: {}", or_na("lab location", &lab.location));
        let lines = self.canvas.split_text_to_size(&location, g.content_width());
        let mut y = (y + 42.0).max(250.0);
        for line in fit_lines(&self.canvas, lines, LOCATION_MAX_LINES, g.content_width()) {
            self.centered(&line, FontStyle::Normal, 12.0, y);
            y += 18.0;
        }

        let date = format!("Date of Report: {}", options.date.format("%d/%m/%Y"));
        self.centered(&date, FontStyle::Normal, 12.0, height - 120.0);
        self.centered("World Health Organization", FontStyle::Bold, 12.0, height - 80.0);

        self.cursor.new_page().apply(&mut self.canvas);
    }

    fn abstract_section(&mut self, _lab: &Lab) {
        self.sections.render(
            &mut self.canvas,
            &mut self.cursor,
            "1. Abstract",
            &[ABSTRACT],
            &section_style(),
            |text, _| vec![StyledLine::plain(*text)],
        );
    }

    fn equipment_section(&mut self, equipments: &[Equipment]) {
        let columns = vec![
            TableColumn::new("ID", 0.5),
            TableColumn::new("Name / Model", 2.0),
            TableColumn::new("Manufacturer", 1.5),
            TableColumn::new("Year", 0.7),
            TableColumn::new("Specifications", 3.0),
        ];
        let rows = equipments.iter().enumerate().map(|(i, e)| equipment_row(e, i)).collect();
        self.table_section("2. Laboratory Equipment", columns, rows);
    }

    fn staff_section(&mut self, assistants: &[Assistant]) {
        let columns = vec![
            TableColumn::new("ID", 0.5),
            TableColumn::new("Name", 1.8),
            TableColumn::new("Designation / Role", 1.8),
            TableColumn::new("Department", 1.6),
            TableColumn::new("Specialization", 2.0),
        ];
        let rows = assistants.iter().enumerate().map(|(i, a)| staff_row(a, i)).collect();
        self.table_section("3. Qualified Staff Members", columns, rows);
    }

    fn projects_section(&mut self, projects: &[Project]) {
        self.cursor.skip(SECTION_SPACING);
        self.sections.render(
            &mut self.canvas,
            &mut self.cursor,
            "4. Ongoing Research Projects",
            projects,
            &project_style(),
            format_project,
        );
    }

    fn finish(self) -> Vec<LayoutPage> {
        self.canvas.finish()
    }
}

pub fn equipment_row(equipment: &Equipment, index: usize) -> Vec<String> {
    let specifications = if equipment.specifications.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        equipment
            .specifications
            .iter()
            .map(|s| format!("\u{2022} {}", s))
            .collect::<Vec<_>>()
            .join("\n")
    };
    vec![
        (index + 1).to_string(),
        format!(
            "{}\n(Model: {})",
            equipment.name,
            or_na("equipment model", &equipment.model)
        ),
        or_na("equipment manufacturer", &equipment.manufacturer),
        equipment.year.to_string(),
        specifications,
    ]
}

pub fn staff_row(assistant: &Assistant, index: usize) -> Vec<String> {
    vec![
        (index + 1).to_string(),
        assistant.name.clone(),
        format!(
            "{}\n(Role: {})",
            assistant.designation,
            or_na("staff role", &assistant.role)
        ),
        or_na("staff department", &assistant.department),
        or_na("staff specialization", &assistant.specialization),
    ]
}

pub fn format_project(project: &Project, index: usize) -> Vec<StyledLine> {
    let mut lines = vec![
        StyledLine::new(vec![Segment::bold(format!("4.{} {}", index + 1, project.title))]),
        StyledLine::labeled("Biosafety Level", &project.bsl.to_string()),
        StyledLine::labeled("Aim", &or_na("project aim", &project.aim)),
        StyledLine::labeled("Methodology", &or_na("project methodology", &project.methodology)),
    ];
    lines.extend(bullet_list("Objectives", &project.objectives));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Designation;

    #[test]
    fn equipment_row_stacks_model_and_specs() {
        let eq = Equipment {
            name: "Biosafety Cabinet".to_string(),
            model: "BSC-II".to_string(),
            manufacturer: "Esco".to_string(),
            year: 2022,
            photo_url: None,
            specifications: vec!["HEPA H14".to_string(), "UV lamp".to_string()],
        };
        assert_eq!(
            equipment_row(&eq, 0),
            vec![
                "1",
                "Biosafety Cabinet\n(Model: BSC-II)",
                "Esco",
                "2022",
                "\u{2022} HEPA H14\n\u{2022} UV lamp"
            ]
        );
    }

    #[test]
    fn staff_row_substitutes_na() {
        let a = Assistant {
            name: "Ravi Kumar".to_string(),
            email: "ravi@example.org".to_string(),
            photo_url: String::new(),
            designation: Designation::Mr,
            role: String::new(),
            department: "Microbiology".to_string(),
            specialization: String::new(),
            experience: String::new(),
            qualification: vec![],
        };
        let row = staff_row(&a, 4);
        assert_eq!(row[0], "5");
        assert_eq!(row[2], "Mr\n(Role: N/A)");
        assert_eq!(row[4], "N/A");
    }
}
