//! In-process conversions through PDFium.
//!
//! PDFium is bound per conversion via `pdfium-locate`; a missing library
//! shows up as an unavailable [`Requirement::Renderer`] long before we get
//! here, so a bind failure at this point is reported as a render error.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 150 DPI would produce a
//! 12,000 × 17,000 px image. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping memory bounded.

use super::{text, Backend};
use crate::capability::Requirement;
use crate::config::{PageSeparator, MAX_RENDERED_PIXELS};
use crate::error::BackendFailure;
use crate::output::OutputPlan;
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points per pixel when placing an image on a PDF page (96 DPI source).
const POINTS_PER_PIXEL: f32 = 72.0 / 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfiumMode {
    /// PDF → plain text.
    Text,
    /// PDF → HTML document.
    Html,
    /// PDF → Markdown.
    Markdown,
    /// PDF → one PNG per page.
    PageImages,
    /// Raster image → single-page PDF.
    ImageToPdf,
}

/// Settings the renderer needs from the configuration.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub max_rendered_pixels: u32,
    pub page_separator: PageSeparator,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfiumBackend {
    mode: PdfiumMode,
    options: RenderOptions,
}

impl PdfiumBackend {
    pub fn new(mode: PdfiumMode, options: RenderOptions) -> Self {
        Self { mode, options }
    }

    pub fn mode(&self) -> PdfiumMode {
        self.mode
    }
}

impl Backend for PdfiumBackend {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn requirement(&self) -> Requirement {
        Requirement::Renderer
    }

    fn convert(&self, input: &Path, plan: &OutputPlan) -> Result<PathBuf, BackendFailure> {
        let pdfium =
            pdfium_locate::bind_pdfium().map_err(|e| BackendFailure::Render(e.to_string()))?;

        match self.mode {
            PdfiumMode::ImageToPdf => image_to_pdf(&pdfium, input, &plan.primary()),
            PdfiumMode::PageImages => {
                let document = open(&pdfium, input, self.options.password.as_deref())?;
                render_pages(&document, plan, self.options.max_rendered_pixels)
            }
            PdfiumMode::Text | PdfiumMode::Html | PdfiumMode::Markdown => {
                let document = open(&pdfium, input, self.options.password.as_deref())?;
                let pages = extract_text(&document)?;
                let body = match self.mode {
                    PdfiumMode::Text => text::assemble_text(&pages, &self.options.page_separator),
                    PdfiumMode::Markdown => {
                        text::assemble_markdown(&pages, &self.options.page_separator)
                    }
                    _ => text::assemble_html(&document_title(&document, input), &pages),
                };
                let output = plan.primary();
                std::fs::write(&output, body)?;
                Ok(output)
            }
        }
    }
}

fn render_err(context: &str, e: PdfiumError) -> BackendFailure {
    BackendFailure::Render(format!("{context}: {e:?}"))
}

fn open<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, BackendFailure> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let detail = format!("{e:?}");
        if detail.to_lowercase().contains("password") {
            BackendFailure::Render(if password.is_some() {
                "wrong password for encrypted PDF".to_string()
            } else {
                "PDF is encrypted; a password is required".to_string()
            })
        } else {
            BackendFailure::Render(format!("cannot open PDF: {detail}"))
        }
    })
}

fn extract_text(document: &PdfDocument<'_>) -> Result<Vec<String>, BackendFailure> {
    let mut pages = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| render_err(&format!("page {}", index + 1), e))?;
        pages.push(text.all());
    }
    info!("Extracted text from {} pages", pages.len());
    Ok(pages)
}

fn document_title(document: &PdfDocument<'_>, input: &Path) -> String {
    document
        .metadata()
        .get(PdfDocumentMetadataTagType::Title)
        .map(|tag| tag.value().to_string())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| {
            input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

fn render_pages(
    document: &PdfDocument<'_>,
    plan: &OutputPlan,
    max_pixels: u32,
) -> Result<PathBuf, BackendFailure> {
    let edge = i32::try_from(max_pixels.min(MAX_RENDERED_PIXELS)).unwrap_or(i32::MAX);
    let render_config = PdfRenderConfig::new()
        .set_target_width(edge)
        .set_maximum_height(edge);

    let mut written = 0usize;
    for (index, page) in document.pages().iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_err(&format!("page {}", index + 1), e))?;
        let image: DynamicImage = bitmap.as_image();
        let path = plan.page(index + 1);
        debug!(
            "Rendered page {} → {}x{} px → {}",
            index + 1,
            image.width(),
            image.height(),
            path.display()
        );
        image.save_with_format(&path, ImageFormat::Png)?;
        written += 1;
    }

    if written == 0 {
        return Err(BackendFailure::Render("document has no pages".to_string()));
    }
    info!("Rendered {} page image(s)", written);
    Ok(plan.primary())
}

fn image_to_pdf(pdfium: &Pdfium, input: &Path, output: &Path) -> Result<PathBuf, BackendFailure> {
    let image = image::open(input)?;
    let width = PdfPoints::new(image.width() as f32 * POINTS_PER_PIXEL);
    let height = PdfPoints::new(image.height() as f32 * POINTS_PER_PIXEL);

    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| render_err("create document", e))?;
    let object = PdfPageImageObject::new_with_width(&document, &image, width)
        .map_err(|e| render_err("embed image", e))?;
    {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(width, height))
            .map_err(|e| render_err("create page", e))?;
        page.objects_mut()
            .add_image_object(object)
            .map_err(|e| render_err("place image", e))?;
    }
    document
        .save_to_file(output)
        .map_err(|e| render_err("save PDF", e))?;
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RenderOptions {
        RenderOptions {
            max_rendered_pixels: 2000,
            page_separator: PageSeparator::None,
            password: None,
        }
    }

    #[test]
    fn every_mode_needs_the_renderer() {
        for mode in [
            PdfiumMode::Text,
            PdfiumMode::Html,
            PdfiumMode::Markdown,
            PdfiumMode::PageImages,
            PdfiumMode::ImageToPdf,
        ] {
            let b = PdfiumBackend::new(mode, options());
            assert_eq!(b.requirement(), Requirement::Renderer);
            assert_eq!(b.name(), "pdfium");
            assert_eq!(b.mode(), mode);
        }
    }
}
