//! # PDF Serializer
//!
//! Takes the laid-out pages and writes a PDF 1.7 file.
//!
//! Only the standard Type1 fonts are used, so nothing is embedded: each
//! face drawn anywhere in the document gets one font object with
//! WinAnsiEncoding, and text is written as WinAnsi bytes. Content streams
//! are FlateDecode compressed.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, pages, contents, info
//! ...
//! xref                <- byte offset of each object
//! trailer             <- root and info references
//! %%EOF
//! ```
//!
//! Output is a pure function of the pages and info: fonts are ordered by
//! face and no timestamps other than the supplied creation date are
//! written.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use chrono::NaiveDate;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{winansi_byte, FontKey, StandardFont};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::style::{FontFamily, FontStyle};

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creation_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font faces in resource order, with their object ids.
    font_objects: Vec<(FontKey, usize)>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], info: &DocumentInfo) -> Vec<u8> {
        // 0 = placeholder (objects are 1-indexed), 1 = Catalog, 2 = Pages.
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
        };

        self.register_fonts(&mut builder, pages);
        let font_resources = self.build_font_resource_dict(&builder.font_objects);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let content = self.build_content_stream(page, &builder.font_objects);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(content_data);

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_obj_id, font_resources
            );
            builder.objects.push(page_dict.into_bytes());
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(self.build_info_dict(info).into_bytes());

        self.serialize(&builder, info_obj_id)
    }

    fn build_info_dict(&self, info: &DocumentInfo) -> String {
        let mut dict = String::from("<< ");
        if let Some(ref title) = info.title {
            let _ = write!(dict, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        if let Some(ref author) = info.author {
            let _ = write!(dict, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = info.subject {
            let _ = write!(dict, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        if let Some(date) = info.creation_date {
            let _ = write!(dict, "/CreationDate (D:{}000000Z) ", date.format("%Y%m%d"));
        }
        let _ = write!(
            dict,
            "/Producer (BioLedger {}) /Creator (BioLedger) >>",
            env!("CARGO_PKG_VERSION")
        );
        dict
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, font_objects: &[(FontKey, usize)]) -> String {
        let mut stream = String::new();
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, font_objects);
        }
        stream
    }

    /// Write a single layout element as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        font_objects: &[(FontKey, usize)],
    ) {
        match &element.draw {
            DrawCommand::Text {
                text,
                font,
                font_size,
                color,
                word_spacing,
            } => {
                let idx = self.font_index(*font, font_objects);
                let _ = write!(
                    stream,
                    "BT\n/F{} {:.1} Tf\n{:.3} {:.3} {:.3} rg\n{:.3} Tw\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\nET\n",
                    idx,
                    font_size,
                    color.r,
                    color.g,
                    color.b,
                    word_spacing,
                    element.x,
                    page_height - element.y,
                    Self::escape_pdf_string(text)
                );
            }

            DrawCommand::Line { thickness, color } => {
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    color.r,
                    color.g,
                    color.b,
                    thickness,
                    element.x,
                    page_height - element.y,
                    element.x + element.width,
                    page_height - element.y - element.height
                );
            }

            DrawCommand::Rect {
                fill,
                stroke,
                stroke_width,
            } => {
                let x = element.x;
                let y = page_height - element.y - element.height;
                if let Some(bg) = fill {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        bg.r, bg.g, bg.b, x, y, element.width, element.height
                    );
                }
                if let Some(bc) = stroke {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        bc.r, bc.g, bc.b, stroke_width, x, y, element.width, element.height
                    );
                }
            }
        }
    }

    /// Every face used across all pages gets its own font object, ordered
    /// by family then style.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut keys: BTreeSet<FontKey> = pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| match &e.draw {
                DrawCommand::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();

        if keys.is_empty() {
            keys.insert(FontKey::new(FontFamily::Helvetica, FontStyle::Normal));
        }

        for key in keys {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                StandardFont::resolve(key).pdf_name()
            );
            builder.objects.push(font_dict.into_bytes());
            builder.font_objects.push((key, obj_id));
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[(FontKey, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resource index (/F0, /F1, ...) of a face.
    fn font_index(&self, font: FontKey, font_objects: &[(FontKey, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(key, _)| *key == font)
            .unwrap_or(0)
    }

    /// Encode text as a PDF literal string body in WinAnsiEncoding.
    ///
    /// Delimiters are backslash-escaped, bytes outside printable ASCII are
    /// written as octal escapes, and characters WinAnsi cannot represent
    /// become `?`.
    fn escape_pdf_string(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '(' => out.push_str("\\("),
                ')' => out.push_str("\\)"),
                _ => match winansi_byte(ch) {
                    Some(b) if (0x20..=0x7E).contains(&b) => out.push(b as char),
                    Some(b) => {
                        let _ = write!(out, "\\{:03o}", b);
                    }
                    None => out.push('?'),
                },
            }
        }
        out
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}
