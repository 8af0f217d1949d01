use std::io::{BufWriter, Cursor};

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point,
};
use tracing::warn;

use crate::error::ReportError;
use crate::traits::DocumentRenderer;

use super::document::{Block, Document, Table, TextStyle};
use super::font::FontSource;

// US Letter dimensions (mm)
const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 25.4;
const MARGIN_RIGHT: f32 = 25.4;
const CONTENT_W: f32 = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;

const PT_TO_MM: f32 = 0.3528;
const LEADING: f32 = 1.2;
const PRE_SIZE: f32 = 9.0;
const CELL_SIZE: f32 = 10.0;
const CELL_LEADING: f32 = 12.0 * PT_TO_MM;
const HEADER_SIZE: f32 = 12.0;
const CELL_PAD: f32 = 6.0 * PT_TO_MM;
const CELL_PAD_X: f32 = 1.5;

fn approx_char_width(size: f32) -> f32 {
    size * 0.18
}

/// 幅に収まるおおよその文字数
fn capacity(width: f32, size: f32) -> usize {
    ((width / approx_char_width(size)).floor() as usize).max(1)
}

fn wrap_lines(text: &str, width: f32, size: f32) -> Vec<String> {
    let lines: Vec<String> = textwrap::wrap(text, capacity(width, size))
        .into_iter()
        .map(|line| line.into_owned())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// 先頭の空白を保ったまま固定幅で分割
fn chunk_line(line: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
    dirty: bool,
}

impl PdfWriter {
    fn new(title: &str, source: &FontSource) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");

        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        let font = match source {
            FontSource::External { path, bytes } => {
                match doc.add_external_font(Cursor::new(bytes.as_slice())) {
                    Ok(font) => Some(font),
                    Err(e) => {
                        warn!(
                            "Could not register Unicode font {}: {e:?}. Falling back to built-in font",
                            path.display()
                        );
                        None
                    }
                }
            }
            FontSource::Builtin => None,
        };
        let font = match font {
            Some(font) => font,
            None => doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ReportError::Pdf(format!("{e:?}")))?,
        };

        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
            dirty: false,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc
            .get_page(self.current_page)
            .get_layer(self.current_layer)
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
        self.dirty = false;
    }

    /// 空ページを作らない改ページ
    fn page_break(&mut self) {
        if self.dirty {
            self.new_page();
        }
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.dirty && self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    /// y は行の上端。ベースラインはフォントサイズ分下
    fn text_at(&mut self, s: &str, x: f32, top: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let baseline = top + size * PT_TO_MM;
        self.layer()
            .use_text(s, size, Mm(x), Mm(PAGE_H - baseline), font);
        self.dirty = true;
    }

    fn line(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(PAGE_H - y1)), false),
                (Point::new(Mm(x2), Mm(PAGE_H - y2)), false),
            ],
            is_closed: false,
        });
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let (size, space_after) = style.metrics();
        let line_h = size * PT_TO_MM * LEADING;
        for line in wrap_lines(text, CONTENT_W, size) {
            self.ensure_space(line_h);
            let top = self.y;
            self.text_at(&line, MARGIN_LEFT, top, size, false);
            self.y += line_h;
        }
        self.y += space_after;
    }

    fn preformatted(&mut self, text: &str) {
        let line_h = PRE_SIZE * PT_TO_MM * LEADING;
        let max_chars = capacity(CONTENT_W, PRE_SIZE);
        for source_line in text.lines() {
            for line in chunk_line(source_line, max_chars) {
                self.ensure_space(line_h);
                let top = self.y;
                self.text_at(&line, MARGIN_LEFT, top, PRE_SIZE, false);
                self.y += line_h;
            }
        }
        self.y += TextStyle::Body.metrics().1;
    }

    fn table_row(&mut self, table: &Table, cells: &[String], header: bool) {
        let size = if header { HEADER_SIZE } else { CELL_SIZE };
        let wrapped: Vec<Vec<String>> = table
            .columns
            .iter()
            .zip(cells)
            .map(|(col, cell)| {
                if col.wrap && !header {
                    wrap_lines(cell, col.width - 2.0 * CELL_PAD_X, size)
                } else {
                    vec![cell.clone()]
                }
            })
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let row_h = line_count as f32 * CELL_LEADING + 2.0 * CELL_PAD;

        let top = self.y;
        let total_w: f32 = table.columns.iter().map(|c| c.width).sum();
        let mut x = MARGIN_LEFT;
        for (col, lines) in table.columns.iter().zip(&wrapped) {
            let mut line_top = top + CELL_PAD;
            for line in lines {
                self.text_at(line, x + CELL_PAD_X, line_top, size, header);
                line_top += CELL_LEADING;
            }
            self.line(x, top, x, top + row_h);
            x += col.width;
        }
        self.line(MARGIN_LEFT + total_w, top, MARGIN_LEFT + total_w, top + row_h);
        self.line(MARGIN_LEFT, top, MARGIN_LEFT + total_w, top);
        self.line(MARGIN_LEFT, top + row_h, MARGIN_LEFT + total_w, top + row_h);
        self.y = top + row_h;
    }

    fn row_height(table: &Table, cells: &[String]) -> f32 {
        let lines = table
            .columns
            .iter()
            .zip(cells)
            .map(|(col, cell)| {
                if col.wrap {
                    wrap_lines(cell, col.width - 2.0 * CELL_PAD_X, CELL_SIZE).len()
                } else {
                    1
                }
            })
            .max()
            .unwrap_or(1);
        lines as f32 * CELL_LEADING + 2.0 * CELL_PAD
    }

    /// ヘッダー行は改ページ後にも繰り返す
    fn table(&mut self, table: &Table) {
        let header_h = CELL_LEADING + 2.0 * CELL_PAD;
        self.ensure_space(header_h * 2.0);
        self.table_row(table, &table.header, true);

        for row in &table.rows {
            let needed = Self::row_height(table, row);
            if self.y + needed > PAGE_H - MARGIN_BOTTOM {
                self.new_page();
                self.table_row(table, &table.header, true);
            }
            self.table_row(table, row, false);
        }
        self.y += TextStyle::Body.metrics().1;
    }

    fn to_bytes(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        buf.into_inner()
            .map_err(|e| ReportError::Pdf(e.to_string()))
    }
}

/// printpdf による PDF 描画
pub struct PdfRenderer {
    font: FontSource,
}

impl PdfRenderer {
    pub fn new(font: FontSource) -> Self {
        Self { font }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &Document) -> Result<Vec<u8>, ReportError> {
        let mut pdf = PdfWriter::new(&document.title, &self.font)?;

        for block in &document.blocks {
            match block {
                Block::Text { text, style } => pdf.paragraph(text, *style),
                Block::Preformatted(text) => pdf.preformatted(text),
                Block::Table(table) => pdf.table(table),
                Block::Spacer(height) => pdf.y += height,
                Block::PageBreak => pdf.page_break(),
            }
        }

        pdf.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::build_document;
    use crate::report::loader::clean_rows;
    use crate::report::types::MerchantRow;
    use chrono::Local;

    #[test]
    fn test_wrap_lines() {
        let lines = wrap_lines("Eating Places and Restaurants", 20.0, 10.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= capacity(20.0, 10.0)));
        assert_eq!(wrap_lines("", 20.0, 10.0), vec![String::new()]);
    }

    #[test]
    fn test_chunk_line_keeps_indent() {
        let chunks = chunk_line("    \"key\": \"value\"", 8);
        assert_eq!(chunks[0], "    \"key");
        assert_eq!(chunks.concat(), "    \"key\": \"value\"");
    }

    #[test]
    fn test_render_produces_pdf() {
        let rows = (0..40)
            .map(|i| MerchantRow::new(format!("Store {}", i), format!("{}", 5000 + i % 4), "Misc"))
            .collect();
        let doc = build_document(&clean_rows(rows), Local::now()).unwrap();

        let bytes = PdfRenderer::new(FontSource::Builtin).render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
