//! Report layout: turns a [`ReportDocument`] into finished PDF pages.
//!
//! Page one is a cover with the info table, the rest flows the summary,
//! metrics, recommendations, SWOT and next steps with automatic page
//! breaks. All visible strings come from the language catalog.

use crate::domain::model::{ReportDocument, SwotQuadrants};
use crate::i18n::{catalog, metric_label, Catalog};
use crate::report::fonts::{text_width, Font};
use crate::report::pdf::{Color, ContentStream, PdfDocument, PAGE_HEIGHT, PAGE_WIDTH};

const MARGIN_LEFT: f32 = 72.0;
const MARGIN_RIGHT: f32 = 72.0;
const MARGIN_TOP: f32 = 72.0;
const MARGIN_BOTTOM: f32 = 18.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

const TITLE_SIZE: f32 = 24.0;
const TITLE_SPACE_AFTER: f32 = 30.0;
const HEADING_SIZE: f32 = 16.0;
const HEADING_SPACE_BEFORE: f32 = 20.0;
const HEADING_SPACE_AFTER: f32 = 12.0;
const BODY_SIZE: f32 = 11.0;
const BODY_SPACE_AFTER: f32 = 12.0;
const METRIC_LABEL_SIZE: f32 = 12.0;
const METRIC_LABEL_SPACE_AFTER: f32 = 8.0;
const SECTION_GAP: f32 = 21.6;
const TABLE_PADDING_X: f32 = 6.0;
const TABLE_PADDING_Y: f32 = 3.0;
const LINE_SPACING: f32 = 1.2;

const TITLE_COLOR: Color = Color {
    r: 0.122,
    g: 0.306,
    b: 0.475,
};
const HEADING_COLOR: Color = Color {
    r: 0.180,
    g: 0.349,
    b: 0.518,
};
const INFO_LABEL_BG: Color = Color {
    r: 0.941,
    g: 0.941,
    b: 0.941,
};
const METRIC_LABEL_BG: Color = Color {
    r: 0.910,
    g: 0.957,
    b: 0.973,
};
const EXTRA_METRIC_BG: Color = Color {
    r: 0.961,
    g: 0.961,
    b: 0.961,
};
const GRID_GREY: Color = Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
};
const STRENGTHS_BAND: Color = Color {
    r: 0.835,
    g: 0.902,
    b: 0.949,
};
const WEAKNESSES_BAND: Color = Color {
    r: 0.949,
    g: 0.902,
    b: 0.835,
};
const OPPORTUNITIES_BAND: Color = Color {
    r: 0.902,
    g: 0.949,
    b: 0.835,
};
const THREATS_BAND: Color = Color {
    r: 0.949,
    g: 0.835,
    b: 0.835,
};

const INFO_TABLE_WIDTHS: [f32; 2] = [144.0, 216.0];
const METRICS_TABLE_WIDTHS: [f32; 2] = [180.0, 144.0];
const SWOT_TABLE_WIDTHS: [f32; 2] = [108.0, 288.0];
const SWOT_FONT_SIZE: f32 = 10.0;
const SWOT_ITEMS_PER_QUADRANT: usize = 5;

const ENGINE_VERSION_LINE: &str = "Sistema CrewAI v0.148.0";

struct TableStyle {
    label_bg: Color,
    grid_color: Color,
    grid_width: f32,
    font_size: f32,
}

const INFO_TABLE: TableStyle = TableStyle {
    label_bg: INFO_LABEL_BG,
    grid_color: Color::BLACK,
    grid_width: 1.0,
    font_size: BODY_SIZE,
};
const METRICS_TABLE: TableStyle = TableStyle {
    label_bg: METRIC_LABEL_BG,
    grid_color: GRID_GREY,
    grid_width: 1.0,
    font_size: BODY_SIZE,
};
const EXTRA_METRICS_TABLE: TableStyle = TableStyle {
    label_bg: EXTRA_METRIC_BG,
    grid_color: GRID_GREY,
    grid_width: 0.5,
    font_size: 10.0,
};

/// Render a composed report as PDF bytes. The output depends only on the
/// document, so rendering the same document twice gives identical bytes.
pub fn render_report(document: &ReportDocument) -> Vec<u8> {
    let t = catalog(document.language);
    let title = format!("{} - {}", t.report_title, document.company);
    let mut composer = PageComposer::new(&title, document);

    composer.cover(document, t);
    composer.break_page();
    composer.body(document, t);
    composer.finish()
}

struct PageComposer {
    doc: PdfDocument,
    page: ContentStream,
    cursor: f32,
}

impl PageComposer {
    fn new(title: &str, document: &ReportDocument) -> Self {
        Self {
            doc: PdfDocument::new(title, document.generated_at),
            page: ContentStream::new(),
            cursor: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.page);
        self.doc.add_page(finished);
        self.cursor = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.cursor - needed < MARGIN_BOTTOM && !self.page.is_empty() {
            self.break_page();
        }
    }

    fn spacer(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn finish(mut self) -> Vec<u8> {
        if !self.page.is_empty() {
            let finished = std::mem::take(&mut self.page);
            self.doc.add_page(finished);
        }
        self.doc.render()
    }

    fn cover(&mut self, document: &ReportDocument, t: &Catalog) {
        self.spacer(144.0);
        self.title_line(t.report_title);
        self.spacer(36.0);
        self.title_line(&document.company);
        self.spacer(72.0);

        let rows = vec![
            (t.label_company.to_string(), document.company.clone()),
            (t.label_industry.to_string(), document.industry.clone()),
            (t.label_location.to_string(), document.location.clone()),
            (
                t.label_analysis_type.to_string(),
                document
                    .analysis_type
                    .display_name(document.language)
                    .to_string(),
            ),
            (
                t.label_date.to_string(),
                document.generated_at.format("%d/%m/%Y").to_string(),
            ),
            (t.label_cost.to_string(), format!("${:.2}", document.cost)),
            (
                t.label_processing_time.to_string(),
                format!("{:.1} {}", document.processing_time, t.seconds_suffix),
            ),
        ];
        self.key_value_table(&rows, INFO_TABLE_WIDTHS, &INFO_TABLE);
        self.spacer(72.0);

        self.paragraph(
            t.generated_by,
            Font::HelveticaBold,
            BODY_SIZE,
            Color::BLACK,
            BODY_SPACE_AFTER,
        );
        self.paragraph(
            ENGINE_VERSION_LINE,
            Font::Helvetica,
            BODY_SIZE,
            Color::BLACK,
            BODY_SPACE_AFTER,
        );
        self.paragraph(
            t.copyright_line,
            Font::Helvetica,
            BODY_SIZE,
            Color::BLACK,
            BODY_SPACE_AFTER,
        );
    }

    fn body(&mut self, document: &ReportDocument, t: &Catalog) {
        self.heading(t.section_summary);
        for block in document.executive_summary.split("\n\n") {
            let flattened = block.trim().replace('\n', " ");
            if !flattened.is_empty() {
                self.paragraph(
                    &flattened,
                    Font::Helvetica,
                    BODY_SIZE,
                    Color::BLACK,
                    BODY_SPACE_AFTER,
                );
            }
        }
        self.spacer(SECTION_GAP);

        self.heading(t.section_metrics);
        let metrics = &document.metrics;
        let rows = vec![
            (
                t.metric_overall_score.to_string(),
                format!("{}/100", metrics.overall_score),
            ),
            (
                t.metric_growth_potential.to_string(),
                metrics.growth_potential.clone(),
            ),
            (t.metric_risk_level.to_string(), metrics.risk_level.clone()),
        ];
        self.key_value_table(&rows, METRICS_TABLE_WIDTHS, &METRICS_TABLE);

        if !metrics.extra.is_empty() {
            self.spacer(14.4);
            self.paragraph(
                t.detailed_metrics,
                Font::HelveticaBold,
                METRIC_LABEL_SIZE,
                TITLE_COLOR,
                METRIC_LABEL_SPACE_AFTER,
            );
            let extra_rows: Vec<(String, String)> = metrics
                .extra
                .iter()
                .map(|(key, value)| (metric_label(document.language, key), value.clone()))
                .collect();
            self.key_value_table(&extra_rows, METRICS_TABLE_WIDTHS, &EXTRA_METRICS_TABLE);
        }
        self.spacer(SECTION_GAP);

        self.heading(t.section_recommendations);
        for (i, recommendation) in document.recommendations.iter().enumerate() {
            self.paragraph(
                &format!("{}. {}", i + 1, recommendation),
                Font::Helvetica,
                BODY_SIZE,
                Color::BLACK,
                BODY_SPACE_AFTER,
            );
        }
        self.spacer(SECTION_GAP);

        if let Some(swot) = &document.swot {
            self.heading(t.section_swot);
            self.swot_table(swot, t);
            self.spacer(SECTION_GAP);
        }

        self.heading(t.section_next_steps);
        for (i, step) in document.next_steps.iter().enumerate() {
            self.paragraph(
                &format!("{}. {}", i + 1, step),
                Font::Helvetica,
                BODY_SIZE,
                Color::BLACK,
                BODY_SPACE_AFTER,
            );
        }
    }

    /// Centered title line in the cover style. Long company names wrap.
    fn title_line(&mut self, text: &str) {
        let leading = TITLE_SIZE * LINE_SPACING;
        for line in wrap_text(text, Font::HelveticaBold, TITLE_SIZE, CONTENT_WIDTH) {
            self.ensure_space(leading);
            self.cursor -= leading;
            let width = text_width(&line, Font::HelveticaBold, TITLE_SIZE);
            let x = MARGIN_LEFT + (CONTENT_WIDTH - width).max(0.0) / 2.0;
            self.page.fill_color(TITLE_COLOR);
            self.page
                .text(x, self.cursor, Font::HelveticaBold, TITLE_SIZE, &line);
        }
        self.cursor -= TITLE_SPACE_AFTER;
    }

    fn heading(&mut self, text: &str) {
        self.spacer(HEADING_SPACE_BEFORE);
        self.paragraph(
            text,
            Font::HelveticaBold,
            HEADING_SIZE,
            HEADING_COLOR,
            HEADING_SPACE_AFTER,
        );
    }

    fn paragraph(&mut self, text: &str, font: Font, size: f32, color: Color, space_after: f32) {
        let leading = size * LINE_SPACING;
        for line in wrap_text(text, font, size, CONTENT_WIDTH) {
            self.ensure_space(leading);
            self.cursor -= leading;
            self.page.fill_color(color);
            self.page.text(MARGIN_LEFT, self.cursor, font, size, &line);
        }
        self.cursor -= space_after;
    }

    /// Two column table with bold labels on a tinted background. Rows break
    /// to the next page individually so a long table never overflows.
    fn key_value_table(&mut self, rows: &[(String, String)], widths: [f32; 2], style: &TableStyle) {
        let leading = style.font_size * LINE_SPACING;
        let label_width = widths[0] - 2.0 * TABLE_PADDING_X;
        let value_width = widths[1] - 2.0 * TABLE_PADDING_X;

        for (label, value) in rows {
            let label_lines = wrap_text(label, Font::HelveticaBold, style.font_size, label_width);
            let value_lines = wrap_text(value, Font::Helvetica, style.font_size, value_width);
            let line_count = label_lines.len().max(value_lines.len());
            let height = line_count as f32 * leading + 2.0 * TABLE_PADDING_Y;

            self.ensure_space(height);
            let top = self.cursor;
            let bottom = top - height;

            self.page.fill_color(style.label_bg);
            self.page.fill_rect(MARGIN_LEFT, bottom, widths[0], height);

            self.page.fill_color(Color::BLACK);
            let mut y = top - TABLE_PADDING_Y - style.font_size;
            for line in &label_lines {
                self.page.text(
                    MARGIN_LEFT + TABLE_PADDING_X,
                    y,
                    Font::HelveticaBold,
                    style.font_size,
                    line,
                );
                y -= leading;
            }
            let mut y = top - TABLE_PADDING_Y - style.font_size;
            for line in &value_lines {
                self.page.text(
                    MARGIN_LEFT + widths[0] + TABLE_PADDING_X,
                    y,
                    Font::Helvetica,
                    style.font_size,
                    line,
                );
                y -= leading;
            }

            self.stroke_row(bottom, height, widths, style.grid_color, style.grid_width);
            self.cursor = bottom;
        }
    }

    fn swot_table(&mut self, swot: &SwotQuadrants, t: &Catalog) {
        let quadrants: [(&str, &[String], Color); 4] = [
            (t.swot_strengths, &swot.strengths, STRENGTHS_BAND),
            (t.swot_weaknesses, &swot.weaknesses, WEAKNESSES_BAND),
            (t.swot_opportunities, &swot.opportunities, OPPORTUNITIES_BAND),
            (t.swot_threats, &swot.threats, THREATS_BAND),
        ];
        for (header, items, band) in quadrants {
            self.swot_header_row(header, band);
            for item in items.iter().take(SWOT_ITEMS_PER_QUADRANT) {
                self.swot_item_row(item);
            }
        }
    }

    fn swot_header_row(&mut self, header: &str, band: Color) {
        let leading = SWOT_FONT_SIZE * LINE_SPACING;
        let height = leading + 2.0 * TABLE_PADDING_Y;
        self.ensure_space(height);
        let top = self.cursor;
        let bottom = top - height;

        let total_width = SWOT_TABLE_WIDTHS[0] + SWOT_TABLE_WIDTHS[1];
        self.page.fill_color(band);
        self.page.fill_rect(MARGIN_LEFT, bottom, total_width, height);

        self.page.fill_color(Color::BLACK);
        self.page.text(
            MARGIN_LEFT + TABLE_PADDING_X,
            top - TABLE_PADDING_Y - SWOT_FONT_SIZE,
            Font::HelveticaBold,
            SWOT_FONT_SIZE,
            header,
        );

        self.stroke_row(bottom, height, SWOT_TABLE_WIDTHS, GRID_GREY, 0.5);
        self.cursor = bottom;
    }

    fn swot_item_row(&mut self, item: &str) {
        let leading = SWOT_FONT_SIZE * LINE_SPACING;
        let bullet = format!("• {}", item);
        let lines = wrap_text(
            &bullet,
            Font::Helvetica,
            SWOT_FONT_SIZE,
            SWOT_TABLE_WIDTHS[1] - 2.0 * TABLE_PADDING_X,
        );
        let height = lines.len() as f32 * leading + 2.0 * TABLE_PADDING_Y;
        self.ensure_space(height);
        let top = self.cursor;
        let bottom = top - height;

        self.page.fill_color(Color::BLACK);
        let mut y = top - TABLE_PADDING_Y - SWOT_FONT_SIZE;
        for line in &lines {
            self.page.text(
                MARGIN_LEFT + SWOT_TABLE_WIDTHS[0] + TABLE_PADDING_X,
                y,
                Font::Helvetica,
                SWOT_FONT_SIZE,
                line,
            );
            y -= leading;
        }

        self.stroke_row(bottom, height, SWOT_TABLE_WIDTHS, GRID_GREY, 0.5);
        self.cursor = bottom;
    }

    fn stroke_row(&mut self, bottom: f32, height: f32, widths: [f32; 2], color: Color, line: f32) {
        self.page.stroke_color(color);
        self.page.line_width(line);
        self.page.stroke_rect(MARGIN_LEFT, bottom, widths[0], height);
        self.page
            .stroke_rect(MARGIN_LEFT + widths[0], bottom, widths[1], height);
    }
}

/// Greedy word wrap against the measured Helvetica widths. A single word
/// wider than the column keeps its own line instead of being cut.
fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if current.is_empty() || text_width(&candidate, font, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
