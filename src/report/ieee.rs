//! IEEE-style report: a full-width title block on the first page, then a
//! justified two-column flow of abstract, equipment, staff and projects.

use super::{bullet, bullet_list, fit_lines, join_or_na, or_na, ReportLayout, ReportOptions};
use crate::font::{FontContext, FontKey};
use crate::layout::canvas::{Canvas, PageFooter, TextOptions};
use crate::layout::flow::FlowCursor;
use crate::layout::section::{SectionRenderer, SectionStyle, RECORD_GAP};
use crate::layout::styled::ParagraphStyle;
use crate::layout::{Edges, LayoutPage, PageGeometry, PageSize};
use crate::model::{Assistant, Equipment, Lab, Project};
use crate::style::{Color, FontFamily, FontStyle, Segment, StyledLine, TextAlign};

const FAMILY: FontFamily = FontFamily::Times;
const MARGIN_VERTICAL: f64 = 54.0;
const MARGIN_HORIZONTAL: f64 = 48.0;
const COLUMN_GAP: f64 = 18.0;

// The title block stays a small part of the first page.
const NAME_MAX_LINES: usize = 3;
const LOCATION_MAX_LINES: usize = 2;

const BODY_SIZE: f64 = 10.0;
const BODY_LINE_HEIGHT: f64 = 12.0;

pub fn geometry() -> PageGeometry {
    PageGeometry::two_column(
        PageSize::A4,
        Edges::symmetric(MARGIN_VERTICAL, MARGIN_HORIZONTAL),
        COLUMN_GAP,
    )
}

fn title_color() -> Color {
    Color::rgb8(41, 128, 185)
}

pub fn body_style() -> ParagraphStyle {
    ParagraphStyle::new(FAMILY, BODY_SIZE, BODY_LINE_HEIGHT).with_align(TextAlign::Justify)
}

pub fn section_style() -> SectionStyle {
    SectionStyle {
        title: ParagraphStyle::new(FAMILY, 10.0, 14.0).with_align(TextAlign::Center),
        title_font_style: FontStyle::Bold,
        space_after_title: 4.0,
        rule: None,
        body: body_style(),
        record_gap: RECORD_GAP,
    }
}

fn roman(n: usize) -> &'static str {
    const NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
    NUMERALS.get(n.saturating_sub(1)).copied().unwrap_or("X")
}

pub struct IeeeLayout<'a> {
    canvas: Canvas<'a>,
    cursor: FlowCursor,
    sections: SectionRenderer,
    sections_drawn: usize,
}

impl<'a> IeeeLayout<'a> {
    pub fn new(font_context: &'a FontContext) -> Self {
        let footer = PageFooter {
            font: FontKey::new(FAMILY, FontStyle::Normal),
            font_size: 9.0,
            color: Color::BLACK,
            offset_from_bottom: MARGIN_VERTICAL / 2.0,
        };
        Self {
            canvas: Canvas::new(font_context, PageSize::A4).with_footer(footer),
            cursor: FlowCursor::new(geometry()),
            sections: SectionRenderer::new(),
            sections_drawn: 0,
        }
    }

    fn section<T, F>(&mut self, title: &str, records: &[T], format: F)
    where
        F: Fn(&T, usize) -> Vec<StyledLine>,
    {
        self.sections_drawn += 1;
        let heading = format!("{}. {}", roman(self.sections_drawn), title.to_uppercase());
        self.cursor.skip(BODY_LINE_HEIGHT / 2.0);
        self.sections.render(
            &mut self.canvas,
            &mut self.cursor,
            &heading,
            records,
            &section_style(),
            format,
        );
    }

    /// Centered lines across the full content width, at most `max_lines`
    /// of them. Returns the new y.
    fn centered_block(
        &mut self,
        text: &str,
        style: FontStyle,
        size: f64,
        line_height: f64,
        max_lines: usize,
        mut y: f64,
    ) -> f64 {
        let g = geometry();
        self.canvas.set_font(FAMILY, style);
        self.canvas.set_font_size(size);
        let center = g.content_left() + g.content_width() / 2.0;
        let lines = self.canvas.split_text_to_size(text, g.content_width());
        for line in fit_lines(&self.canvas, lines, max_lines, g.content_width()) {
            y += line_height;
            self.canvas.text(&line, center, y, TextOptions::aligned(TextAlign::Center));
        }
        y
    }
}

impl ReportLayout for IeeeLayout<'_> {
    fn title_page(&mut self, lab: &Lab, options: &ReportOptions) {
        let g = geometry();
        let mut y = g.content_top();

        self.canvas.set_text_color(title_color());
        y = self.centered_block(&lab.name, FontStyle::Bold, 22.0, 26.0, NAME_MAX_LINES, y);
        self.canvas.set_text_color(Color::BLACK);
        let location = or_na("lab location", &lab.location);
        y = self.centered_block(&location, FontStyle::Italic, 12.0, 18.0, LOCATION_MAX_LINES, y);
        let dateline = format!("Laboratory Compliance Report, {}", options.date.format("%B %-d, %Y"));
        y = self.centered_block(&dateline, FontStyle::Normal, 10.0, 16.0, 1, y);

        y += 10.0;
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.set_line_width(0.75);
        self.canvas.line(g.content_left(), y, g.content_left() + g.content_width(), y);

        self.cursor = FlowCursor::starting_at(g, y + 12.0, BODY_LINE_HEIGHT);
    }

    fn abstract_section(&mut self, lab: &Lab) {
        let style = body_style();
        let renderer = self.sections.line_renderer();

        let summary = StyledLine::new(vec![
            Segment::new("Abstract\u{2014}", FontStyle::BoldItalic),
            Segment::bold(abstract_text(lab)),
        ]);
        renderer.render(&mut self.canvas, &mut self.cursor, &summary, &style);

        self.cursor.skip(BODY_LINE_HEIGHT / 2.0);
        let terms = StyledLine::new(vec![
            Segment::new("Index Terms\u{2014}", FontStyle::BoldItalic),
            Segment::italic(index_terms(lab)),
        ]);
        renderer.render(&mut self.canvas, &mut self.cursor, &terms, &style);
    }

    fn equipment_section(&mut self, equipments: &[Equipment]) {
        self.section("Laboratory Equipment", equipments, format_equipment);
    }

    fn staff_section(&mut self, assistants: &[Assistant]) {
        self.section("Qualified Staff", assistants, format_assistant);
    }

    fn projects_section(&mut self, projects: &[Project]) {
        self.section("Ongoing Research Projects", projects, format_project);
    }

    fn finish(self) -> Vec<LayoutPage> {
        self.canvas.finish()
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("1 {}", one)
    } else {
        format!("{} {}", n, many)
    }
}

pub fn abstract_text(lab: &Lab) -> String {
    format!(
        "This report summarizes the biosafety posture of {}, {}. It inventories {}, \
         lists {} with their qualifications, and describes {} with their biosafety \
         levels, aims, methodologies and results, as a record of compliance with \
         institutional and international biosafety guidelines.",
        lab.name,
        or_na("lab location", &lab.location),
        plural(lab.equipments.len(), "item of laboratory equipment", "items of laboratory equipment"),
        plural(lab.assistants.len(), "qualified staff member", "qualified staff members"),
        plural(lab.projects.len(), "ongoing research project", "ongoing research projects"),
    )
}

fn index_terms(lab: &Lab) -> String {
    let mut levels: Vec<_> = lab.projects.iter().map(|p| p.bsl).collect();
    levels.sort();
    levels.dedup();
    let mut terms = vec![
        "biosafety".to_string(),
        "laboratory management".to_string(),
        "compliance".to_string(),
    ];
    terms.extend(levels.into_iter().map(|l| l.to_string()));
    terms.join(", ")
}

pub fn format_equipment(equipment: &Equipment, index: usize) -> Vec<StyledLine> {
    let mut lines = vec![StyledLine::new(vec![
        Segment::bold(format!("{}) {}", index + 1, equipment.name)),
        Segment::normal(format!(
            " ({}, {}, {})",
            or_na("equipment model", &equipment.model),
            or_na("equipment manufacturer", &equipment.manufacturer),
            equipment.year
        )),
    ])];
    if equipment.specifications.is_empty() {
        lines.push(StyledLine::labeled("Specifications", super::NOT_AVAILABLE));
    } else {
        lines.extend(equipment.specifications.iter().map(|s| bullet(s)));
    }
    lines
}

pub fn format_assistant(assistant: &Assistant, index: usize) -> Vec<StyledLine> {
    let qualifications: Vec<String> = assistant
        .qualification
        .iter()
        .map(|q| format!("{}, {} ({})", q.degree, q.institution, q.year))
        .collect();

    vec![
        StyledLine::new(vec![Segment::bold(format!(
            "{}) {} {}",
            index + 1,
            assistant.designation,
            assistant.name
        ))]),
        StyledLine::labeled("Role", &or_na("staff role", &assistant.role)),
        StyledLine::labeled("Department", &or_na("staff department", &assistant.department)),
        StyledLine::labeled("Specialization", &or_na("staff specialization", &assistant.specialization)),
        StyledLine::labeled("Experience", &or_na("staff experience", &assistant.experience)),
        StyledLine::labeled("Qualifications", &join_or_na("staff qualifications", &qualifications, "; ")),
        StyledLine::labeled("Email", &or_na("staff email", &assistant.email)),
    ]
}

pub fn format_project(project: &Project, index: usize) -> Vec<StyledLine> {
    let mut lines = vec![StyledLine::new(vec![
        Segment::bold(format!("{}. {}", index + 1, project.title)).underlined(),
    ])];
    if !project.subtitle.trim().is_empty() {
        lines.push(StyledLine::new(vec![Segment::italic(project.subtitle.clone())]));
    }
    lines.push(StyledLine::labeled("Biosafety Level", &project.bsl.to_string()));
    lines.push(StyledLine::labeled(
        "Duration",
        &format!(
            "{} to {}",
            project.start_date.format("%d %b %Y"),
            project.end_date.format("%d %b %Y")
        ),
    ));
    lines.push(StyledLine::labeled("Team", &join_or_na("project team", &project.team_members, ", ")));
    lines.push(StyledLine::labeled("Aim", &or_na("project aim", &project.aim)));
    lines.push(StyledLine::labeled("Methodology", &or_na("project methodology", &project.methodology)));
    lines.extend(bullet_list("Objectives", &project.objectives));
    lines.push(StyledLine::labeled("Equipment", &join_or_na("project equipment", &project.equipment, ", ")));
    lines.push(StyledLine::labeled("Results", &join_or_na("project results", &project.results, "; ")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bsl, Designation};
    use chrono::NaiveDate;

    fn project() -> Project {
        Project {
            title: "Antimicrobial resistance surveillance".to_string(),
            subtitle: String::new(),
            bsl: Bsl::Bsl2,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            team_members: vec![],
            aim: "Track resistance genes in hospital isolates.".to_string(),
            objectives: vec!["Sequence isolates".to_string(), "Map resistance genes".to_string()],
            methodology: String::new(),
            equipment: vec!["PCR Thermocycler".to_string()],
            results: vec![],
        }
    }

    #[test]
    fn project_formatter_substitutes_na() {
        let lines: Vec<String> = format_project(&project(), 0).iter().map(|l| l.text()).collect();
        assert_eq!(lines[0], "1. Antimicrobial resistance surveillance");
        assert!(lines.contains(&"Team: N/A".to_string()));
        assert!(lines.contains(&"Methodology: N/A".to_string()));
        assert!(lines.contains(&"Results: N/A".to_string()));
        assert!(lines.contains(&"Duration: 01 Jun 2024 to 31 May 2025".to_string()));
        assert!(lines.contains(&"\u{2022} Map resistance genes".to_string()));
    }

    #[test]
    fn project_title_is_underlined() {
        let first = &format_project(&project(), 2)[0];
        assert!(first.segments[0].underline);
        assert_eq!(first.text(), "3. Antimicrobial resistance surveillance");
    }

    #[test]
    fn equipment_formatter_lists_specifications() {
        let eq = Equipment {
            name: "Autoclave".to_string(),
            model: "AC-300".to_string(),
            manufacturer: String::new(),
            year: 2021,
            photo_url: None,
            specifications: vec!["121 C".to_string(), "50 L chamber".to_string()],
        };
        let lines: Vec<String> = format_equipment(&eq, 0).iter().map(|l| l.text()).collect();
        assert_eq!(lines, vec!["1) Autoclave (AC-300, N/A, 2021)", "\u{2022} 121 C", "\u{2022} 50 L chamber"]);
    }

    #[test]
    fn assistant_formatter_joins_qualifications() {
        let a = Assistant {
            name: "Asha Rao".to_string(),
            email: "asha@example.org".to_string(),
            photo_url: String::new(),
            designation: Designation::AssocProf,
            role: "Biosafety officer".to_string(),
            department: "Biotechnology".to_string(),
            specialization: String::new(),
            experience: "9 years".to_string(),
            qualification: vec![crate::model::Qualification {
                degree: "PhD".to_string(),
                institution: "IISc".to_string(),
                year: 2014,
            }],
        };
        let lines: Vec<String> = format_assistant(&a, 1).iter().map(|l| l.text()).collect();
        assert_eq!(lines[0], "2) Assoc Prof Asha Rao");
        assert!(lines.contains(&"Qualifications: PhD, IISc (2014)".to_string()));
        assert!(lines.contains(&"Specialization: N/A".to_string()));
    }

    #[test]
    fn roman_section_numbers() {
        assert_eq!(roman(1), "I");
        assert_eq!(roman(3), "III");
    }
}
