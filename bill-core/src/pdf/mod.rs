//! Minimal PDF writer used to export bills.

pub mod document;
pub mod fonts;
pub mod graphics;
pub mod images;
pub mod objects;
pub mod writer;

pub use document::PdfDocument;
pub use fonts::{BuiltinFont, FontMetrics};
pub use graphics::Color;
pub use images::{ImageData, ImageId};
