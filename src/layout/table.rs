//! Bordered grid tables with a filled header row.
//!
//! When a row does not fit below the cursor the table continues in the
//! next column or page and the header row is drawn again above it. Only a
//! row taller than a whole column is split: its cells are cut between
//! lines and the rest continues under the repeated header.

use log::debug;

use super::canvas::{Canvas, TextOptions};
use super::flow::{FlowBreak, FlowCursor};
use crate::style::{Color, FontFamily, FontStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub header: String,
    /// Relative width; columns share the available width by weight.
    pub weight: f64,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, weight: f64) -> Self {
        Self {
            header: header.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub family: FontFamily,
    pub font_size: f64,
    pub line_height: f64,
    pub cell_padding: f64,
    pub header_fill: Color,
    pub header_text: Color,
    pub text: Color,
    pub border: Color,
    pub border_width: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
            font_size: 9.0,
            line_height: 11.0,
            cell_padding: 4.0,
            header_fill: Color::hex("#222222"),
            header_text: Color::WHITE,
            text: Color::BLACK,
            border: Color::rgb8(191, 191, 191),
            border_width: 0.5,
        }
    }
}

/// Where each row ended up, for callers that need to know.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOutput {
    /// Page of every header row drawn, in order.
    pub header_pages: Vec<usize>,
    /// `(page, top y, height)` of every body row.
    pub rows: Vec<(usize, f64, f64)>,
}

#[derive(Clone)]
struct RowLayout {
    cells: Vec<Vec<String>>,
    height: f64,
}

impl RowLayout {
    fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Keep the first `lines` lines of every cell here and return the rest
    /// as a continuation row.
    fn split_off(&mut self, lines: usize, style: &TableStyle) -> RowLayout {
        let rest: Vec<Vec<String>> = self
            .cells
            .iter_mut()
            .map(|cell| cell.split_off(lines.min(cell.len())))
            .collect();
        self.height = row_height(self.line_count(), style);
        RowLayout {
            height: row_height(rest.iter().map(Vec::len).max().unwrap_or(0), style),
            cells: rest,
        }
    }
}

fn row_height(lines: usize, style: &TableStyle) -> f64 {
    lines.max(1) as f64 * style.line_height + 2.0 * style.cell_padding
}

pub struct GridTable {
    columns: Vec<TableColumn>,
    style: TableStyle,
}

impl GridTable {
    pub fn new(columns: Vec<TableColumn>, style: TableStyle) -> Self {
        Self { columns, style }
    }

    fn column_widths(&self, total: f64) -> Vec<f64> {
        let sum: f64 = self.columns.iter().map(|c| c.weight).sum();
        if sum <= 0.0 {
            let each = total / self.columns.len().max(1) as f64;
            return vec![each; self.columns.len()];
        }
        self.columns.iter().map(|c| total * c.weight / sum).collect()
    }

    fn set_cell_font(&self, canvas: &mut Canvas, header: bool) {
        let style = if header { FontStyle::Bold } else { FontStyle::Normal };
        canvas.set_font(self.style.family, style);
        canvas.set_font_size(self.style.font_size);
    }

    fn layout_row(&self, canvas: &mut Canvas, cells: &[String], widths: &[f64], header: bool) -> RowLayout {
        self.set_cell_font(canvas, header);
        let pad = self.style.cell_padding;
        let cells: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                canvas.split_text_to_size(text, (w - 2.0 * pad).max(1.0))
            })
            .collect();
        let max_lines = cells.iter().map(Vec::len).max().unwrap_or(1);
        RowLayout {
            height: row_height(max_lines, &self.style),
            cells,
        }
    }

    fn draw_row(&self, canvas: &mut Canvas, x: f64, y: f64, widths: &[f64], row: &RowLayout, header: bool) {
        let pad = self.style.cell_padding;
        let font_context = canvas.font_context();
        self.set_cell_font(canvas, header);
        canvas.set_text_color(if header { self.style.header_text } else { self.style.text });
        canvas.set_draw_color(self.style.border);
        canvas.set_line_width(self.style.border_width);
        let baseline = font_context.baseline_offset(canvas.font(), self.style.font_size, self.style.line_height);

        let mut cell_x = x;
        for (lines, &w) in row.cells.iter().zip(widths) {
            if header {
                canvas.fill_rect(cell_x, y, w, row.height, self.style.header_fill);
            }
            canvas.stroke_rect(cell_x, y, w, row.height);

            // Vertically centered.
            let block = lines.len() as f64 * self.style.line_height;
            let top = y + (row.height - block) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let line_y = top + i as f64 * self.style.line_height + baseline;
                canvas.text(line, cell_x + pad, line_y, TextOptions::default());
            }
            cell_x += w;
        }
    }

    /// Lines of a row that fit in `space`, padding included.
    fn lines_fitting(&self, space: f64) -> usize {
        let room = space - 2.0 * self.style.cell_padding + 1e-6;
        if room <= 0.0 {
            0
        } else {
            (room / self.style.line_height).floor() as usize
        }
    }

    /// Break to the next column or page and repeat the header there.
    fn continue_table(
        &self,
        canvas: &mut Canvas,
        cursor: &mut FlowCursor,
        widths: &[f64],
        header: &RowLayout,
        required: f64,
        output: &mut TableOutput,
    ) -> bool {
        let brk = cursor.request_break(required);
        brk.apply(canvas);
        if brk == FlowBreak::None {
            return false;
        }
        self.draw_row(canvas, cursor.x(), cursor.y(), widths, header, true);
        output.header_pages.push(cursor.page());
        cursor.place(header.height);
        true
    }

    /// Header plus the part of the first row that must stay with it: the
    /// whole row, or one line when the row has to be split anyway.
    fn lead(&self, header: &RowLayout, first: Option<&RowLayout>, column_room: f64) -> f64 {
        let first = match first {
            Some(row) if row.height <= column_room + 1e-6 => row.height,
            Some(_) => row_height(1, &self.style),
            None => 0.0,
        };
        header.height + first
    }

    /// Height that has to fit below a heading for the table to start
    /// under it.
    pub fn lead_height(&self, canvas: &mut Canvas, cursor: &FlowCursor, rows: &[Vec<String>]) -> f64 {
        let widths = self.column_widths(cursor.width());
        let header_cells: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let header = self.layout_row(canvas, &header_cells, &widths, true);
        let first = rows.first().map(|r| self.layout_row(canvas, r, &widths, false));
        self.lead(&header, first.as_ref(), cursor.full_column_height() - header.height)
    }

    /// Draw the header and `rows` at the cursor.
    pub fn render(&self, canvas: &mut Canvas, cursor: &mut FlowCursor, rows: &[Vec<String>]) -> TableOutput {
        let mut output = TableOutput::default();
        let widths = self.column_widths(cursor.width());
        let header_cells: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let header = self.layout_row(canvas, &header_cells, &widths, true);
        let body: Vec<RowLayout> = rows
            .iter()
            .map(|r| self.layout_row(canvas, r, &widths, false))
            .collect();
        // Room for body rows in a fresh column under a repeated header.
        let column_room = cursor.full_column_height() - header.height;

        cursor.ensure(self.lead(&header, body.first(), column_room)).apply(canvas);
        self.draw_row(canvas, cursor.x(), cursor.y(), &widths, &header, true);
        output.header_pages.push(cursor.page());
        cursor.place(header.height);

        for row in &body {
            let mut row = row.clone();
            loop {
                if !cursor.fits(row.height) {
                    let whole_fits_fresh = row.height <= column_room + 1e-6;
                    if (whole_fits_fresh || self.lines_fitting(cursor.remaining()) == 0)
                        && self.continue_table(canvas, cursor, &widths, &header, header.height + row.height, &mut output)
                    {
                        continue;
                    }
                    if !cursor.fits(row.height) && row.line_count() > 1 {
                        let here = self.lines_fitting(cursor.remaining()).clamp(1, row.line_count() - 1);
                        let rest = row.split_off(here, &self.style);
                        self.draw_row(canvas, cursor.x(), cursor.y(), &widths, &row, false);
                        output.rows.push((cursor.page(), cursor.y(), row.height));
                        cursor.place(row.height);
                        debug!("table row split after {} lines", here);
                        self.continue_table(canvas, cursor, &widths, &header, header.height + rest.height, &mut output);
                        row = rest;
                        continue;
                    }
                }
                self.draw_row(canvas, cursor.x(), cursor.y(), &widths, &row, false);
                output.rows.push((cursor.page(), cursor.y(), row.height));
                cursor.place(row.height);
                break;
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::layout::{DrawCommand, Edges, PageGeometry, PageSize};

    fn table() -> GridTable {
        GridTable::new(
            vec![
                TableColumn::new("ID", 0.5),
                TableColumn::new("Name", 2.0),
                TableColumn::new("Specifications", 3.0),
            ],
            TableStyle::default(),
        )
    }

    fn geometry() -> PageGeometry {
        PageGeometry::single_column(PageSize::A4, Edges::symmetric(60.0, 55.0))
    }

    fn rows(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| {
                vec![
                    (i + 1).to_string(),
                    format!("Centrifuge {}", i),
                    "\u{2022} 15000 rpm\n\u{2022} Refrigerated".to_string(),
                ]
            })
            .collect()
    }

    #[test]
    fn header_is_filled_and_white() {
        let fc = FontContext::new();
        let mut canvas = Canvas::new(&fc, PageSize::A4);
        let mut cursor = FlowCursor::new(geometry());
        table().render(&mut canvas, &mut cursor, &rows(1));

        let pages = canvas.finish();
        assert!(matches!(pages[0].elements[0].draw, DrawCommand::Rect { fill: Some(_), .. }));
        let header_text = pages[0]
            .elements
            .iter()
            .find(|e| e.text() == Some("ID"))
            .unwrap();
        match &header_text.draw {
            DrawCommand::Text { color, font, .. } => {
                assert_eq!(*color, Color::WHITE);
                assert_eq!(font.style, FontStyle::Bold);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn newlines_in_cells_make_taller_rows() {
        let fc = FontContext::new();
        let mut canvas = Canvas::new(&fc, PageSize::A4);
        let mut cursor = FlowCursor::new(geometry());
        let out = table().render(&mut canvas, &mut cursor, &rows(1));
        // Two specification lines plus padding.
        assert!((out.rows[0].2 - (2.0 * 11.0 + 8.0)).abs() < 1e-9);
    }

    #[test]
    fn header_repeats_on_every_page_and_rows_stay_whole() {
        let fc = FontContext::new();
        let mut canvas = Canvas::new(&fc, PageSize::A4);
        let mut cursor = FlowCursor::new(geometry());
        let out = table().render(&mut canvas, &mut cursor, &rows(60));

        let last_page = out.rows.last().unwrap().0;
        assert!(last_page > 1);
        assert_eq!(out.header_pages, (1..=last_page).collect::<Vec<_>>());
        let bottom = geometry().content_bottom();
        for &(_, y, h) in &out.rows {
            assert!(y + h <= bottom + 1e-6);
        }
    }

    #[test]
    fn row_taller_than_a_page_is_split_under_repeated_headers() {
        let fc = FontContext::new();
        let mut canvas = Canvas::new(&fc, PageSize::A4);
        let mut cursor = FlowCursor::new(geometry());
        cursor.place(300.0);
        let specs: Vec<String> = (1..=80).map(|i| format!("Spec {}", i)).collect();
        let rows = vec![vec!["1".to_string(), "Sequencer".to_string(), specs.join("\n")]];
        let out = table().render(&mut canvas, &mut cursor, &rows);

        let bottom = geometry().content_bottom();
        assert!(out.rows.len() > 1);
        for &(_, y, h) in &out.rows {
            assert!(y + h <= bottom + 1e-6);
        }
        // Starts in the space left on page 1 instead of skipping it.
        assert_eq!(out.rows[0].0, 1);
        let last_page = out.rows.last().unwrap().0;
        assert_eq!(out.header_pages, (1..=last_page).collect::<Vec<_>>());

        let pages = canvas.finish();
        let texts: Vec<&str> = pages.iter().flat_map(|p| p.texts()).filter_map(|e| e.text()).collect();
        for spec in &specs {
            assert_eq!(texts.iter().filter(|t| *t == spec).count(), 1);
        }
        assert_eq!(texts.iter().filter(|t| **t == "Sequencer").count(), 1);
    }
}
