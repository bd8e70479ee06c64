use std::io::BufWriter;

use chrono::NaiveDateTime;
use printpdf::*;

use crate::error::{PennyError, Result};
use crate::fmt::{long_date, money};
use crate::reports::ReportSummary;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

fn chars_that_fit(width: f32, size: f32) -> usize {
    ((width / (size * 0.18)) as usize).max(1)
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PennyError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PennyError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
            pages: 1,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
        self.pages += 1;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, title: &str, generated: &str, filters: &str) {
        self.text(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        self.text(generated, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        if !filters.is_empty() {
            self.text(&format!("Filters: {filters}"), MARGIN_LEFT, 8.0, false);
            self.y += 5.0;
        }
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => self.text(headers[i], x, FONT_SIZE, true),
                    Align::Right => {
                        let tw = approx_text_width(headers[i], FONT_SIZE);
                        self.text(headers[i], x + col.width - tw, FONT_SIZE, true);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    /// One table row; left-aligned cells wrap onto extra lines when they
    /// overflow their column.
    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        let wrapped: Vec<Vec<String>> = cols
            .iter()
            .zip(values)
            .map(|(col, v)| match col.align {
                Align::Left => textwrap::wrap(v, chars_that_fit(col.width - 2.0, FONT_SIZE))
                    .into_iter()
                    .map(|line| line.into_owned())
                    .collect(),
                Align::Right => vec![v.to_string()],
            })
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);

        self.ensure_space(ROW_H * lines as f32);
        for line in 0..lines {
            let mut x = MARGIN_LEFT;
            for (col, cell) in cols.iter().zip(&wrapped) {
                if let Some(s) = cell.get(line) {
                    match col.align {
                        Align::Left => self.text(s, x, FONT_SIZE, bold),
                        Align::Right => {
                            let tw = approx_text_width(s, FONT_SIZE);
                            self.text(s, x + col.width - tw, FONT_SIZE, bold);
                        }
                    }
                }
                x += col.width;
            }
            self.y += ROW_H;
        }
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H * 2.0);
        self.text(label, MARGIN_LEFT, FONT_SIZE + 2.0, true);
        self.y += ROW_H + 1.0;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| PennyError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| PennyError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Expense report
// ---------------------------------------------------------------------------

fn build_report(
    report: &ReportSummary,
    filters: &str,
    generated_at: NaiveDateTime,
) -> Result<PdfWriter> {
    let mut pdf = PdfWriter::new("Expense Report")?;
    let generated = format!(
        "Generated on {} at {}",
        long_date(generated_at.date()),
        generated_at.format("%H:%M")
    );
    pdf.header("Expense Report", &generated, filters);

    if report.rows.is_empty() {
        pdf.text("No expenses found", MARGIN_LEFT, TITLE_SIZE, true);
        pdf.y += 7.0;
        pdf.text("Try adjusting your filters", MARGIN_LEFT, SUBTITLE_SIZE, false);
        return Ok(pdf);
    }

    let summary_cols = &[
        Col { width: 57.3, align: Align::Left },
        Col { width: 57.3, align: Align::Left },
        Col { width: 57.3, align: Align::Left },
    ];
    pdf.table_header(summary_cols, &["Total Expense", "Average Expense", "Total Transactions"]);
    let total = money(report.total);
    let avg = money(report.average);
    let count = report.count.to_string();
    pdf.table_row(summary_cols, &[&total, &avg, &count], true);
    pdf.blank_row();

    if !report.by_category.is_empty() {
        pdf.section_label("By Category");
        let cols = &[
            Col { width: 100.0, align: Align::Left },
            Col { width: 30.0, align: Align::Right },
            Col { width: 41.9, align: Align::Right },
        ];
        pdf.table_header(cols, &["Category", "Count", "Amount"]);
        for item in &report.by_category {
            let cnt = item.count.to_string();
            let amt = money(item.total);
            pdf.table_row(cols, &[item.category.name(), &cnt, &amt], false);
        }
        pdf.blank_row();
    }

    pdf.section_label("Detailed Expenses");
    let cols = &[
        Col { width: 30.0, align: Align::Left },
        Col { width: 80.0, align: Align::Left },
        Col { width: 32.0, align: Align::Left },
        Col { width: 29.9, align: Align::Right },
    ];
    pdf.table_header(cols, &["Date", "Description", "Category", "Amount"]);
    for e in &report.rows {
        let date = long_date(e.date);
        let desc = if e.description.trim().is_empty() { "-" } else { e.description.as_str() };
        let amt = money(e.amount);
        pdf.table_row(cols, &[&date, desc, e.category.name(), &amt], false);
    }
    pdf.separator();
    let total = money(report.total);
    pdf.table_row(cols, &["Total", "", "", &total], true);

    Ok(pdf)
}

/// Render a filtered expense report as a paginated A4 PDF.
pub fn render_report(
    report: &ReportSummary,
    filters: &str,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>> {
    build_report(report, filters, generated_at)?.to_bytes()
}
