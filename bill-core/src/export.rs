//! Turning a laid-out invoice into a downloadable document.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ExportError;
use crate::layout::{InvoiceSurface, SurfaceOp, TextAlign};
use crate::pdf::images::{downsample, fit_within, load_image};
use crate::pdf::{Color, FontMetrics, ImageId, PdfDocument};

/// Standard page sizes, portrait dimensions in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn portrait_dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(format!("unknown page size: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Options handed to the exporter along with the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Pixels per point kept when embedding raster images. Larger
    /// images are downsampled to this resolution.
    pub scale: f64,
    /// Whether image files referenced by the surface are loaded. When
    /// false their slots stay blank.
    pub allow_images: bool,
    /// Painted behind the content of every page.
    pub background: Color,
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Deflate page content and image streams.
    pub compress: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            scale: 2.0,
            allow_images: true,
            background: Color::WHITE,
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            compress: true,
        }
    }
}

impl ExportConfig {
    /// Page width and height in points after orientation.
    pub fn page_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.page_size.portrait_dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Raw document produced by an exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// A finished export: the document plus the file name to save it as.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Renders an invoice surface into a document.
pub trait InvoiceExporter {
    fn export(
        &self,
        surface: &InvoiceSurface,
        config: &ExportConfig,
    ) -> Result<ExportedDocument, ExportError>;
}

/// Exports to PDF. The surface is scaled to the full page width and
/// cut into page-high slices, one slice per page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl InvoiceExporter for PdfExporter {
    fn export(
        &self,
        surface: &InvoiceSurface,
        config: &ExportConfig,
    ) -> Result<ExportedDocument, ExportError> {
        if surface.width <= 0.0 || !config.scale.is_finite() || config.scale <= 0.0 {
            return Err(ExportError::Failed(format!(
                "invalid surface width {} or scale {}",
                surface.width, config.scale
            )));
        }

        let (page_w, page_h) = config.page_dimensions();
        let factor = page_w / surface.width;
        let slice = page_h / factor;
        let page_count = pages_needed(surface.height, slice);

        let mut doc = PdfDocument::new(Vec::new())?;
        doc.set_compression(config.compress);
        doc.set_info("Title", &surface.title);
        doc.set_info("Author", &surface.author);
        doc.set_info("Creator", "bill-core");

        let images = if config.allow_images {
            embed_images(&mut doc, surface, factor * config.scale)?
        } else {
            HashMap::new()
        };

        for page in 0..page_count {
            let top = page as f64 * slice;
            let bottom = top + slice;
            doc.begin_page(page_w, page_h)?;
            doc.fill_rect(0.0, 0.0, page_w, page_h, config.background);

            // Map a surface point onto this page (PDF y grows upward).
            let px = |x: f64| x * factor;
            let py = |y: f64| page_h - (y - top) * factor;

            for op in &surface.ops {
                let (op_top, op_bottom) = op.extent();
                if op_bottom < top || op_top > bottom {
                    continue;
                }
                match op {
                    SurfaceOp::Text {
                        text,
                        x,
                        baseline,
                        font,
                        size,
                        color,
                        align,
                    } => {
                        let width = FontMetrics::measure_text(text, *font, *size);
                        let left = match align {
                            TextAlign::Left => *x,
                            TextAlign::Center => x - width / 2.0,
                            TextAlign::Right => x - width,
                        };
                        doc.text(text, px(left), py(*baseline), *font, size * factor, *color);
                    }
                    SurfaceOp::Rule {
                        x1,
                        x2,
                        y,
                        width,
                        color,
                    } => {
                        doc.line(px(*x1), py(*y), px(*x2), py(*y), width * factor, *color);
                    }
                    SurfaceOp::Fill {
                        x,
                        y,
                        width,
                        height,
                        color,
                    } => {
                        doc.fill_rect(px(*x), py(y + height), width * factor, height * factor, *color);
                    }
                    SurfaceOp::Image {
                        source,
                        x,
                        y,
                        width,
                        height,
                    } => {
                        if let Some(&(id, img_w, img_h)) = images.get(source) {
                            let (ix, iy, iw, ih) = fit_within(img_w, img_h, *x, *y, *width, *height);
                            doc.draw_image(id, px(ix), py(iy + ih), iw * factor, ih * factor);
                        }
                    }
                }
            }
            doc.end_page()?;
        }

        let bytes = doc.end_document()?;
        debug!(pages = page_count, bytes = bytes.len(), "pdf written");
        Ok(ExportedDocument { bytes, page_count })
    }
}

/// Number of `slice`-high pages needed to show `height`; at least one.
pub fn pages_needed(height: f64, slice: f64) -> usize {
    if height <= 0.0 || slice <= 0.0 {
        return 1;
    }
    // Tolerate float noise right at a page boundary.
    ((height - 1e-6) / slice).ceil().max(1.0) as usize
}

/// Load every distinct image the surface references and embed it once.
///
/// Images are downsampled to `pixels_per_unit` times their slot size.
/// Returns the embedded id and the embedded pixel size per source path.
fn embed_images(
    doc: &mut PdfDocument<Vec<u8>>,
    surface: &InvoiceSurface,
    pixels_per_unit: f64,
) -> Result<HashMap<PathBuf, (ImageId, u32, u32)>, ExportError> {
    let mut embedded = HashMap::new();
    for op in &surface.ops {
        let SurfaceOp::Image {
            source,
            width,
            height,
            ..
        } = op
        else {
            continue;
        };
        if embedded.contains_key(source) {
            continue;
        }
        let data = fs::read(source).map_err(|e| {
            warn!(path = %source.display(), error = %e, "cannot read invoice image");
            e
        })?;
        let image = load_image(data)?;
        let max_w = (width * pixels_per_unit).ceil() as u32;
        let max_h = (height * pixels_per_unit).ceil() as u32;
        let image = downsample(image, max_w, max_h);
        let id = doc.add_image(&image)?;
        embedded.insert(source.clone(), (id, image.width, image.height));
    }
    Ok(embedded)
}
