use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use owned_ttf_parser::Face;
use printpdf::{
    Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
    Rgb,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{ExportError, ExportReceipt, Exporter};
use crate::invoice_gen::{Field, RenderedInvoice};

static REGULAR_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BOLD_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

// US Letter, portrait, half-inch margins.
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 12.7;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const TITLE_FONT_SIZE: f32 = 18.0;
const HEADING_FONT_SIZE: f32 = 11.0;
const NORMAL_FONT_SIZE: f32 = 9.5;
const SMALL_FONT_SIZE: f32 = 8.0;
const TOTAL_FONT_SIZE: f32 = 13.0;

const PT_TO_MM: f32 = 0.3528;
// Average DejaVu Sans advance, as a fraction of the font size. Used for wrapping.
const AVG_GLYPH_WIDTH: f32 = 0.56;

const SEAL_RADIUS_MM: f32 = 16.0;

/// Characters that cannot appear in a file name on common filesystems.
fn forbidden_in_file_name(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Whitespace runs, forbidden characters and `..` each become a single `_`.
fn file_name_part(text: &str) -> String {
    let mut part = String::with_capacity(text.len());
    let mut in_gap = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let dot_pair = c == '.' && chars.next_if_eq(&'.').is_some();
        if dot_pair || c.is_whitespace() || forbidden_in_file_name(c) {
            if !in_gap {
                part.push('_');
            }
            in_gap = true;
        } else {
            part.push(c);
            in_gap = false;
        }
    }
    part
}

/// File name for an exported invoice: `Invoice_<number>_<student>.pdf`, with
/// whitespace, path separators and other characters filesystems reject
/// replaced by `_`. An empty student name becomes `Student`.
pub fn pdf_file_name(invoice_no: &str, student_name: &str) -> String {
    let mut name = file_name_part(student_name);
    if name.is_empty() {
        name.push_str("Student");
    }
    format!("Invoice_{}_{}.pdf", file_name_part(invoice_no), name)
}

fn chars_per_line(width_mm: f32, font_size: f32) -> usize {
    ((width_mm / (font_size * AVG_GLYPH_WIDTH * PT_TO_MM)) as usize).max(1)
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let head: String = word.chars().take(max_chars).collect();
                word = word.chars().skip(max_chars).collect();
                lines.push(head);
            }
            let needed = if current.is_empty() { 0 } else { current.chars().count() + 1 };
            if needed + word.chars().count() > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn blue() -> Color {
    rgb(0.12, 0.25, 0.69)
}

fn green() -> Color {
    rgb(0.02, 0.59, 0.41)
}

fn dark() -> Color {
    rgb(0.2, 0.2, 0.2)
}

fn grey() -> Color {
    rgb(0.42, 0.45, 0.5)
}

/// A TrueType face embedded in the document, with the metrics used for layout.
struct PdfFont {
    face: Face<'static>,
    font_ref: IndirectFontRef,
}

impl PdfFont {
    fn embed(doc: &PdfDocumentReference, data: &'static [u8]) -> Result<Self, ExportError> {
        let face = Face::parse(data, 0)
            .map_err(|e| ExportError::PdfGeneration(format!("unreadable font: {}", e)))?;
        let font_ref = doc
            .add_external_font(data)
            .map_err(|e| ExportError::PdfGeneration(e.to_string()))?;
        Ok(Self { face, font_ref })
    }

    /// The text as it will be drawn: characters the face has no glyph for
    /// become `?`, control characters become spaces.
    fn printable(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                if c.is_control() {
                    ' '
                } else if self.face.glyph_index(c).is_some() {
                    c
                } else {
                    '?'
                }
            })
            .collect()
    }

    fn width_mm(&self, text: &str, font_size: f32) -> f32 {
        let advance: u32 = text
            .chars()
            .filter_map(|c| self.face.glyph_index(c))
            .filter_map(|glyph| self.face.glyph_hor_advance(glyph))
            .map(u32::from)
            .sum();
        advance as f32 / f32::from(self.face.units_per_em()) * font_size * PT_TO_MM
    }
}

/// Writes top to bottom, starting a new page when the current one is full.
struct Canvas<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: PdfFont,
    bold: PdfFont,
    y: f32,
}

impl<'a> Canvas<'a> {
    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN_MM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn font(&self, bold: bool) -> &PdfFont {
        if bold { &self.bold } else { &self.regular }
    }

    fn text_at(&self, text: &str, size: f32, x: f32, y: f32, bold: bool, color: Color) {
        let font = self.font(bold);
        self.layer.set_fill_color(color);
        self.layer.use_text(font.printable(text), size, Mm(x), Mm(y), &font.font_ref);
    }

    fn centered(&self, text: &str, size: f32, center_x: f32, y: f32, bold: bool, color: Color) {
        let font = self.font(bold);
        let width = font.width_mm(&font.printable(text), size);
        self.text_at(text, size, center_x - width / 2.0, y, bold, color);
    }

    fn right_aligned(
        &self,
        text: &str,
        size: f32,
        right_x: f32,
        y: f32,
        bold: bool,
        color: Color,
    ) {
        let font = self.font(bold);
        let width = font.width_mm(&font.printable(text), size);
        self.text_at(text, size, right_x - width, y, bold, color);
    }

    fn rule(&self, y: f32, color: Color, thickness: f32) {
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn frame(&self, x: f32, y_top: f32, width: f32, height: f32, color: Color) {
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(1.0);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(y_top)), false),
                (Point::new(Mm(x + width), Mm(y_top)), false),
                (Point::new(Mm(x + width), Mm(y_top - height)), false),
                (Point::new(Mm(x), Mm(y_top - height)), false),
            ],
            is_closed: true,
        });
    }

    fn circle(&self, center_x: f32, center_y: f32, radius: f32, color: Color) {
        let points = (0..48)
            .map(|i| {
                let angle = i as f32 / 48.0 * std::f32::consts::TAU;
                let x = center_x + radius * angle.cos();
                let y = center_y + radius * angle.sin();
                (Point::new(Mm(x), Mm(y)), false)
            })
            .collect();
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(2.0);
        self.layer.add_line(Line { points, is_closed: true });
    }
}

fn field_lines(fields: &[Field], max_chars: usize) -> Vec<String> {
    fields
        .iter()
        .flat_map(|field| wrap(&format!("{}: {}", field.label, field.value), max_chars))
        .collect()
}

fn draw_header(canvas: &mut Canvas, doc: &RenderedInvoice) {
    let height = 28.0;
    canvas.ensure(height + 6.0);
    let top = canvas.y;
    canvas.frame(MARGIN_MM, top, CONTENT_WIDTH_MM, height, blue());

    let center = PAGE_WIDTH_MM / 2.0;
    canvas.centered(&doc.header.name, TITLE_FONT_SIZE, center, top - 10.0, true, blue());
    canvas.centered(&doc.header.location, NORMAL_FONT_SIZE, center, top - 17.0, false, dark());
    canvas.centered(&doc.header.contact, SMALL_FONT_SIZE, center, top - 23.0, false, dark());

    canvas.y = top - height - 8.0;
}

fn draw_parties(canvas: &mut Canvas, doc: &RenderedInvoice) {
    let column_width = CONTENT_WIDTH_MM / 2.0 - 6.0;
    let max_chars = chars_per_line(column_width, NORMAL_FONT_SIZE);
    let left = field_lines(&doc.bill_to, max_chars);
    let right = field_lines(&doc.details, max_chars);
    let line_height = 5.0;
    let rows = left.len().max(right.len()) as f32;

    canvas.ensure(8.0 + rows * line_height);
    let left_x = MARGIN_MM + 2.0;
    let right_x = MARGIN_MM + CONTENT_WIDTH_MM / 2.0 + 4.0;

    canvas.text_at("Bill To:", HEADING_FONT_SIZE, left_x, canvas.y, true, blue());
    canvas.text_at("Invoice Details:", HEADING_FONT_SIZE, right_x, canvas.y, true, green());
    canvas.y -= 7.0;

    let mut y = canvas.y;
    for line in &left {
        canvas.text_at(line, NORMAL_FONT_SIZE, left_x, y, false, dark());
        y -= line_height;
    }
    let mut y_right = canvas.y;
    for line in &right {
        canvas.text_at(line, NORMAL_FONT_SIZE, right_x, y_right, false, dark());
        y_right -= line_height;
    }
    canvas.y -= rows * line_height + 6.0;
}

fn draw_items(canvas: &mut Canvas, doc: &RenderedInvoice) {
    let right_edge = PAGE_WIDTH_MM - MARGIN_MM - 2.0;
    let description_chars = chars_per_line(CONTENT_WIDTH_MM - 45.0, NORMAL_FONT_SIZE);

    canvas.ensure(12.0);
    canvas.text_at("Description", NORMAL_FONT_SIZE, MARGIN_MM + 2.0, canvas.y, true, dark());
    canvas.right_aligned("Amount (₹)", NORMAL_FONT_SIZE, right_edge, canvas.y, true, dark());
    canvas.rule(canvas.y - 2.5, dark(), 0.8);
    canvas.y -= 8.0;

    for row in &doc.rows {
        let lines = wrap(&row.description, description_chars);
        let height = lines.len() as f32 * 5.0 + 3.0;
        canvas.ensure(height);
        canvas.right_aligned(&row.amount, NORMAL_FONT_SIZE, right_edge, canvas.y, false, dark());
        let mut y = canvas.y;
        for line in &lines {
            canvas.text_at(line, NORMAL_FONT_SIZE, MARGIN_MM + 2.0, y, false, dark());
            y -= 5.0;
        }
        canvas.rule(canvas.y - height + 5.5, rgb(0.9, 0.91, 0.92), 0.5);
        canvas.y -= height;
    }
    canvas.y -= 4.0;
}

fn draw_totals(canvas: &mut Canvas, doc: &RenderedInvoice) {
    let right_edge = PAGE_WIDTH_MM - MARGIN_MM - 2.0;
    canvas.ensure(16.0);
    canvas.right_aligned(&doc.total_line, TOTAL_FONT_SIZE, right_edge, canvas.y, true, dark());
    canvas.y -= 7.0;
    canvas.right_aligned(&doc.paid_line, HEADING_FONT_SIZE, right_edge, canvas.y, true, green());
    canvas.y -= 10.0;
}

fn draw_notes(canvas: &mut Canvas, notes: &str) {
    let lines = wrap(notes, chars_per_line(CONTENT_WIDTH_MM - 4.0, NORMAL_FONT_SIZE));
    canvas.ensure(8.0 + lines.len() as f32 * 5.0);
    let amber = rgb(0.52, 0.3, 0.05);
    canvas.text_at("Notes:", HEADING_FONT_SIZE, MARGIN_MM + 2.0, canvas.y, true, amber);
    canvas.y -= 6.0;
    for line in &lines {
        canvas.text_at(line, NORMAL_FONT_SIZE, MARGIN_MM + 2.0, canvas.y, false, dark());
        canvas.y -= 5.0;
    }
    canvas.y -= 4.0;
}

fn draw_seal(canvas: &mut Canvas, doc: &RenderedInvoice) {
    canvas.ensure(2.0 * SEAL_RADIUS_MM + 8.0);
    let center_x = PAGE_WIDTH_MM / 2.0;
    let center_y = canvas.y - SEAL_RADIUS_MM - 2.0;
    canvas.circle(center_x, center_y, SEAL_RADIUS_MM, green());

    let lines = &doc.seal;
    let line_height = 4.5;
    let mut y = center_y + (lines.len() as f32 - 1.0) * line_height / 2.0 - 1.0;
    for (i, line) in lines.iter().enumerate() {
        let size = if i == 0 { HEADING_FONT_SIZE } else { SMALL_FONT_SIZE };
        canvas.centered(line, size, center_x, y, true, green());
        y -= line_height;
    }
    canvas.y = center_y - SEAL_RADIUS_MM - 8.0;
}

fn draw_footer(canvas: &mut Canvas, doc: &RenderedInvoice) {
    canvas.ensure(doc.footer.len() as f32 * 5.0);
    for line in &doc.footer {
        canvas.centered(line, SMALL_FONT_SIZE, PAGE_WIDTH_MM / 2.0, canvas.y, false, grey());
        canvas.y -= 5.0;
    }
}

/// Lay the rendered invoice out on Letter pages and return the PDF bytes.
pub fn render_pdf(doc: &RenderedInvoice) -> Result<Vec<u8>, ExportError> {
    let (pdf, page, layer) =
        PdfDocument::new(doc.title(), Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let regular = PdfFont::embed(&pdf, REGULAR_TTF)?;
    let bold = PdfFont::embed(&pdf, BOLD_TTF)?;

    {
        let mut canvas = Canvas {
            doc: &pdf,
            layer: pdf.get_page(page).get_layer(layer),
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };

        draw_header(&mut canvas, doc);
        draw_parties(&mut canvas, doc);
        draw_items(&mut canvas, doc);
        draw_totals(&mut canvas, doc);
        if let Some(notes) = &doc.notes {
            draw_notes(&mut canvas, notes);
        }
        draw_seal(&mut canvas, doc);
        draw_footer(&mut canvas, doc);
    }

    pdf.save_to_bytes()
        .map_err(|e| ExportError::PdfGeneration(e.to_string()))
}

/// Saves invoices as PDF files in one directory.
pub struct PdfExporter {
    output_dir: PathBuf,
}

impl PdfExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write through a temporary file so a failed export leaves nothing behind.
    fn persist(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let target = self.output_dir.join(file_name);
        let save_failed = |e: std::io::Error| {
            ExportError::PdfGeneration(format!("could not save {}: {}", target.display(), e))
        };

        std::fs::create_dir_all(&self.output_dir).map_err(save_failed)?;
        let mut file = NamedTempFile::new_in(&self.output_dir).map_err(save_failed)?;
        file.write_all(bytes).map_err(save_failed)?;
        file.persist(&target).map_err(|e| save_failed(e.error))?;
        Ok(target)
    }
}

#[async_trait]
impl Exporter for PdfExporter {
    fn label(&self) -> &'static str {
        "pdf"
    }

    async fn export(&self, document: &RenderedInvoice) -> Result<ExportReceipt, ExportError> {
        let bytes = render_pdf(document)?;
        debug!(bytes = bytes.len(), "pdf rendered");

        let file_name = pdf_file_name(&document.invoice_no, &document.student_name);
        let path = self.persist(&file_name, &bytes)?;
        info!(path = %path.display(), "invoice saved as pdf");

        Ok(ExportReceipt::Saved(path))
    }
}
