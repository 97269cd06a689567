//! Minimal PDF 1.4 writer.
//!
//! Emits exactly what the reports need: a fixed page tree, the two
//! built-in Helvetica faces with WinAnsi encoding, and uncompressed
//! content streams, so the output stays inspectable in tests.

use crate::report::fonts::{win_ansi_byte, Font, FALLBACK_GLYPH};
use chrono::{DateTime, Utc};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

pub const PDF_HEADER: &[u8] = b"%PDF-1.4\n";
// comment with bytes above 0x7F so transports treat the file as binary
const BINARY_MARKER: &[u8] = &[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'];

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

/// Escape a string for a PDF literal string, mapping every character to
/// its WinAnsi byte and substituting '?' for anything the encoding lacks.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let byte = win_ansi_byte(c).unwrap_or(FALLBACK_GLYPH);
        match byte {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out
}

/// Builder for one page's drawing operators.
#[derive(Debug, Default)]
pub struct ContentStream {
    buf: String,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn fill_color(&mut self, color: Color) {
        self.buf
            .push_str(&format!("{:.3} {:.3} {:.3} rg\n", color.r, color.g, color.b));
    }

    pub fn stroke_color(&mut self, color: Color) {
        self.buf
            .push_str(&format!("{:.3} {:.3} {:.3} RG\n", color.r, color.g, color.b));
    }

    pub fn line_width(&mut self, width: f32) {
        self.buf.push_str(&format!("{:.2} w\n", width));
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.buf
            .push_str(&format!("{:.2} {:.2} {:.2} {:.2} re f\n", x, y, width, height));
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.buf
            .push_str(&format!("{:.2} {:.2} {:.2} {:.2} re S\n", x, y, width, height));
    }

    /// One line of text with its baseline at (x, y).
    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, text: &str) {
        self.buf.push_str(&format!(
            "BT\n/{} {:.2} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            font.resource_name(),
            size,
            x,
            y,
            encode_text(text)
        ));
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }
}

/// An in-memory PDF document: metadata plus finished page streams.
pub struct PdfDocument {
    title: String,
    created: DateTime<Utc>,
    pages: Vec<Vec<u8>>,
}

impl PdfDocument {
    pub fn new(title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            created,
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, content: ContentStream) {
        self.pages.push(content.into_bytes());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_object_id(index: usize) -> usize {
        FIRST_PAGE_ID + 2 * index + 1
    }

    fn content_object_id(index: usize) -> usize {
        FIRST_PAGE_ID + 2 * index
    }

    /// Serialize the whole document. The cross reference table carries the
    /// exact byte offset of every object.
    pub fn render(&self) -> Vec<u8> {
        // a PDF must have at least one page
        let fallback;
        let pages: &[Vec<u8>] = if self.pages.is_empty() {
            fallback = [Vec::new()];
            &fallback
        } else {
            &self.pages
        };

        let info_id = FIRST_PAGE_ID + 2 * pages.len();
        let mut offsets = vec![0usize; info_id + 1];
        let mut out = Vec::new();

        out.extend_from_slice(PDF_HEADER);
        out.extend_from_slice(BINARY_MARKER);

        push_object(
            &mut out,
            &mut offsets,
            CATALOG_ID,
            format!("<< /Type /Catalog /Pages {} 0 R >>\n", PAGES_ID).as_bytes(),
        );

        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", Self::page_object_id(i)))
            .collect();
        push_object(
            &mut out,
            &mut offsets,
            PAGES_ID,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>\n",
                kids.join(" "),
                pages.len()
            )
            .as_bytes(),
        );

        push_object(
            &mut out,
            &mut offsets,
            FONT_REGULAR_ID,
            font_dict(Font::Helvetica).as_bytes(),
        );
        push_object(
            &mut out,
            &mut offsets,
            FONT_BOLD_ID,
            font_dict(Font::HelveticaBold).as_bytes(),
        );

        for (index, content) in pages.iter().enumerate() {
            let content_id = Self::content_object_id(index);
            offsets[content_id] = out.len();
            out.extend_from_slice(format!("{} 0 obj\n", content_id).as_bytes());
            out.extend_from_slice(format!("<< /Length {} >>\nstream\n", content.len()).as_bytes());
            out.extend_from_slice(content);
            // the EOL before endstream is not part of the stream data
            out.extend_from_slice(b"\nendstream\nendobj\n");

            push_object(
                &mut out,
                &mut offsets,
                Self::page_object_id(index),
                format!(
                    "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /{} {} 0 R /{} {} 0 R >> >> \
                     /Contents {} 0 R >>\n",
                    PAGES_ID,
                    PAGE_WIDTH,
                    PAGE_HEIGHT,
                    Font::Helvetica.resource_name(),
                    FONT_REGULAR_ID,
                    Font::HelveticaBold.resource_name(),
                    FONT_BOLD_ID,
                    content_id
                )
                .as_bytes(),
            );
        }

        push_object(
            &mut out,
            &mut offsets,
            info_id,
            format!(
                "<< /Title ({}) /Producer (AgentFlow Manager) /CreationDate (D:{}Z) >>\n",
                encode_text(&self.title),
                self.created.format("%Y%m%d%H%M%S")
            )
            .as_bytes(),
        );

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", info_id + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for id in 1..=info_id {
            out.extend_from_slice(format!("{:010} 00000 n \n", offsets[id]).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                info_id + 1,
                CATALOG_ID,
                info_id,
                xref_offset
            )
            .as_bytes(),
        );

        out
    }
}

fn push_object(out: &mut Vec<u8>, offsets: &mut [usize], id: usize, body: &[u8]) {
    offsets[id] = out.len();
    out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"endobj\n");
}

fn font_dict(font: Font) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\n",
        font.base_name()
    )
}
