//! One-shot markdown to PDF report rendering.
//!
//! [`DocumentRenderer::render`] reads a markdown file, lays it out as
//! styled lines, paginates them onto A4 pages, and writes the finished
//! PDF. The document is assembled fully in memory and the output file is
//! only written on success, so a failed render never leaves a partial
//! file behind.

mod layout;

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use tracing::{debug, info};

use crate::Result;
use crate::error::DeviceError;
use layout::{Line, TextClass};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const LAYER_NAME: &str = "content";

/// One-shot file format converter: markdown in, paginated PDF out.
pub struct DocumentRenderer;

impl DocumentRenderer {
    /// Render the markdown file at `input` to a PDF at `output`.
    pub fn render(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let input = input.as_ref();
        let text =
            fs::read_to_string(input).map_err(|e| DeviceError::file_error(input, e))?;
        debug!(input = %input.display(), bytes = text.len(), "read report source");
        Self::render_str(&text, output)
    }

    /// Render a markdown string to a PDF at `output`.
    pub fn render_str(markdown: &str, output: impl AsRef<Path>) -> Result<()> {
        let output = output.as_ref();
        let lines = layout::layout(markdown);
        let title = document_title(&lines);

        let (doc, first_page, first_layer) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        let body = builtin_font(&doc, BuiltinFont::Helvetica)?;
        let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;
        let mono = builtin_font(&doc, BuiltinFont::Courier)?;

        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        let mut page_count = 1usize;

        for line in &lines {
            let (size_pt, leading_mm) = metrics(line.class);
            if y - leading_mm < MARGIN_MM {
                let (page, new_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
                layer = doc.get_page(page).get_layer(new_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
                page_count += 1;
            }
            y -= leading_mm;

            if !line.text.is_empty() {
                let font = match line.class {
                    TextClass::Heading(_) => &bold,
                    TextClass::Mono => &mono,
                    TextClass::Body => &body,
                };
                layer.use_text(line.text.clone(), size_pt, Mm(MARGIN_MM), Mm(y), font);
            }
        }

        let mut buffer = BufWriter::new(Vec::new());
        doc.save(&mut buffer).map_err(|e| DeviceError::render_failed(e.to_string()))?;
        let bytes = buffer
            .into_inner()
            .map_err(|e| DeviceError::render_failed(e.to_string()))?;
        fs::write(output, bytes).map_err(|e| DeviceError::file_error(output, e))?;

        info!(output = %output.display(), pages = page_count, "report rendered");
        Ok(())
    }
}

/// Font size (pt) and leading (mm) for each text class.
fn metrics(class: TextClass) -> (f32, f32) {
    match class {
        TextClass::Heading(1) => (20.0, 11.0),
        TextClass::Heading(2) => (16.0, 9.0),
        TextClass::Heading(_) => (13.0, 7.5),
        TextClass::Body => (11.0, 5.5),
        TextClass::Mono => (9.5, 4.8),
    }
}

fn builtin_font(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font).map_err(|e| DeviceError::render_failed(e.to_string()))
}

/// PDF document title: the first heading, or a fixed fallback.
fn document_title(lines: &[Line]) -> String {
    lines
        .iter()
        .find(|line| matches!(line.class, TextClass::Heading(_)))
        .map(|line| line.text.clone())
        .unwrap_or_else(|| "Report".to_string())
}
