use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::pdf::fonts::BuiltinFont;
use crate::pdf::graphics::Color;
use crate::pdf::images::{ImageData, ImageFormat, ImageId};
use crate::pdf::objects::{format_real, encode_literal, ObjId, PdfObject};
use crate::pdf::writer::PdfWriter;

const CATALOG_OBJ: ObjId = ObjId(1);
const PAGES_OBJ: ObjId = ObjId(2);
/// Fonts occupy objects 3..3+N, in `BuiltinFont::ALL` order.
const FIRST_FONT_OBJ_NUM: u32 = 3;

/// Streaming PDF builder.
///
/// Generic over `Write` so output can go to a file or a `Vec<u8>`.
/// Each page is written out by `end_page()`, images as soon as they are
/// added; only the page tree and catalog wait for `end_document()`.
///
/// Drawing coordinates use PDF's bottom-left origin, in points.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_ids: Vec<ObjId>,
    images: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    compress: bool,
}

struct PageBuilder {
    width: f64,
    height: f64,
    ops: Vec<u8>,
    /// Images drawn on this page, for the resource dictionary.
    images: Vec<ImageId>,
}

impl<W: Write> PdfDocument<W> {
    /// Start a document: writes the header and the shared font objects.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut writer = PdfWriter::new(writer);
        writer.write_header()?;

        let mut next = FIRST_FONT_OBJ_NUM;
        for font in BuiltinFont::ALL {
            let dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.base_name())),
                ("Encoding", PdfObject::name("WinAnsiEncoding")),
            ]);
            writer.write_object(ObjId(next), &dict)?;
            next += 1;
        }

        Ok(PdfDocument {
            writer,
            info: Vec::new(),
            page_ids: Vec::new(),
            images: Vec::new(),
            current_page: None,
            next_obj_num: next,
            compress: false,
        })
    }

    /// FlateDecode page content and raw image streams.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.compress = enabled;
        self
    }

    /// Document info entry, e.g. `Title` or `Creator`.
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current_page.is_some())
    }

    fn alloc(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num);
        self.next_obj_num += 1;
        id
    }

    /// Embed an image. It is written immediately and can then be drawn
    /// on any page.
    pub fn add_image(&mut self, image: &ImageData) -> io::Result<ImageId> {
        let smask = match &image.alpha {
            Some(alpha) => {
                let id = self.alloc();
                let (filter, data) = self.maybe_compress(alpha)?;
                let mut dict = vec![
                    ("Type", PdfObject::name("XObject")),
                    ("Subtype", PdfObject::name("Image")),
                    ("Width", PdfObject::Integer(image.width as i64)),
                    ("Height", PdfObject::Integer(image.height as i64)),
                    ("ColorSpace", PdfObject::name("DeviceGray")),
                    ("BitsPerComponent", PdfObject::Integer(8)),
                ];
                dict.extend(filter);
                self.writer.write_object(id, &PdfObject::stream(dict, data))?;
                Some(id)
            }
            None => None,
        };

        let id = self.alloc();
        let (filter, data) = match image.format {
            ImageFormat::Jpeg => (
                Some(("Filter", PdfObject::name("DCTDecode"))),
                image.data.clone(),
            ),
            ImageFormat::Png => self.maybe_compress(&image.data)?,
        };
        let mut dict = vec![
            ("Type", PdfObject::name("XObject")),
            ("Subtype", PdfObject::name("Image")),
            ("Width", PdfObject::Integer(image.width as i64)),
            ("Height", PdfObject::Integer(image.height as i64)),
            ("ColorSpace", PdfObject::name(image.color_space.pdf_name())),
            ("BitsPerComponent", PdfObject::Integer(8)),
        ];
        dict.extend(filter);
        if let Some(smask) = smask {
            dict.push(("SMask", PdfObject::Ref(smask)));
        }
        self.writer.write_object(id, &PdfObject::stream(dict, data))?;

        self.images.push(id);
        Ok(ImageId(self.images.len() - 1))
    }

    /// Begin a page of the given size in points, closing any open page.
    pub fn begin_page(&mut self, width: f64, height: f64) -> io::Result<&mut Self> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            ops: Vec::new(),
            images: Vec::new(),
        });
        Ok(self)
    }

    fn page(&mut self) -> &mut PageBuilder {
        self.current_page
            .as_mut()
            .expect("drawing requires an open page")
    }

    fn push_ops(&mut self, ops: String) -> &mut Self {
        self.page().ops.extend_from_slice(ops.as_bytes());
        self
    }

    /// Fill a rectangle; `(x, y)` is its lower-left corner.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) -> &mut Self {
        self.push_ops(format!(
            "q\n{} rg\n{} {} {} {} re\nf\nQ\n",
            rgb(color),
            format_real(x),
            format_real(y),
            format_real(width),
            format_real(height),
        ))
    }

    /// Stroke a straight line.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color) -> &mut Self {
        self.push_ops(format!(
            "q\n{} RG\n{} w\n{} {} m\n{} {} l\nS\nQ\n",
            rgb(color),
            format_real(width),
            format_real(x1),
            format_real(y1),
            format_real(x2),
            format_real(y2),
        ))
    }

    /// Draw one line of text with its baseline starting at `(x, y)`.
    pub fn text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: BuiltinFont,
        font_size: f64,
        color: Color,
    ) -> &mut Self {
        let mut ops = format!(
            "BT\n{} rg\n/{} {} Tf\n{} {} Td\n(",
            rgb(color),
            font.pdf_name(),
            format_real(font_size),
            format_real(x),
            format_real(y),
        )
        .into_bytes();
        ops.extend_from_slice(&encode_literal(text));
        ops.extend_from_slice(b") Tj\nET\n");
        self.page().ops.extend_from_slice(&ops);
        self
    }

    /// Paint an embedded image into the given rectangle.
    pub fn draw_image(&mut self, image: ImageId, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let page = self.page();
        if !page.images.contains(&image) {
            page.images.push(image);
        }
        self.push_ops(format!(
            "q\n{} 0 0 {} {} {} cm\n/Im{} Do\nQ\n",
            format_real(width),
            format_real(height),
            format_real(x),
            format_real(y),
            image.0 + 1,
        ))
    }

    /// Write the open page's content and page objects.
    pub fn end_page(&mut self) -> io::Result<()> {
        let Some(page) = self.current_page.take() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "end_page called with no open page",
            ));
        };

        let content_id = self.alloc();
        let page_id = self.alloc();

        let (filter, data) = self.maybe_compress(&page.ops)?;
        let content = PdfObject::stream(filter.into_iter().collect(), data);
        self.writer.write_object(content_id, &content)?;

        let fonts = BuiltinFont::ALL
            .iter()
            .enumerate()
            .map(|(i, font)| (font.pdf_name(), PdfObject::Ref(ObjId(FIRST_FONT_OBJ_NUM + i as u32))))
            .collect();
        let image_names: Vec<String> = page.images.iter().map(|id| format!("Im{}", id.0 + 1)).collect();
        let xobjects = page
            .images
            .iter()
            .zip(&image_names)
            .map(|(id, name)| (name.as_str(), PdfObject::Ref(self.images[id.0])))
            .collect();

        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Ref(PAGES_OBJ)),
            ("MediaBox", PdfObject::media_box(page.width, page.height)),
            ("Contents", PdfObject::Ref(content_id)),
            (
                "Resources",
                PdfObject::dict(vec![
                    ("Font", PdfObject::dict(fonts)),
                    ("XObject", PdfObject::dict(xobjects)),
                ]),
            ),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Close any open page, write the page tree, catalog, info and
    /// cross-reference table, and hand back the underlying writer.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc();
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::text(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            (
                "Kids",
                PdfObject::Array(self.page_ids.iter().map(|id| PdfObject::Ref(*id)).collect()),
            ),
            ("Count", PdfObject::Integer(self.page_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Ref(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.finish(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }

    /// Deflate `data` when compression is on, returning the filter entry
    /// to add to the stream dictionary.
    fn maybe_compress(
        &self,
        data: &[u8],
    ) -> io::Result<(Option<(&'static str, PdfObject)>, Vec<u8>)> {
        if !self.compress {
            return Ok((None, data.to_vec()));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok((
            Some(("Filter", PdfObject::name("FlateDecode"))),
            encoder.finish()?,
        ))
    }
}

fn rgb(color: Color) -> String {
    format!(
        "{} {} {}",
        format_real(color.r),
        format_real(color.g),
        format_real(color.b)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(compress: bool) -> String {
        let mut doc = PdfDocument::new(Vec::new()).unwrap();
        doc.set_compression(compress);
        doc.set_info("Title", "Invoice INV-000001");
        doc.begin_page(595.28, 841.89).unwrap();
        doc.text("Cupcake", 10.0, 800.0, BuiltinFont::Helvetica, 12.0, Color::BLACK);
        let bytes = doc.end_document().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn writes_text_page() {
        let out = render(false);
        assert!(out.starts_with("%PDF-1.7"));
        assert!(out.contains("/F1 12 Tf"));
        assert!(out.contains("10 800 Td"));
        assert!(out.contains("(Cupcake) Tj"));
        assert!(out.contains("/MediaBox [0 0 595.28 841.89]"));
        assert!(out.contains("/Count 1"));
        assert!(out.contains("(Invoice INV-000001)"));
        assert!(out.ends_with("%%EOF\n"));
    }

    #[test]
    fn compression_hides_content() {
        let out = render(true);
        assert!(out.contains("/Filter /FlateDecode"));
        assert!(!out.contains("(Cupcake) Tj"));
    }

    #[test]
    fn begin_page_closes_open_page() {
        let mut doc = PdfDocument::new(Vec::new()).unwrap();
        doc.begin_page(100.0, 100.0).unwrap();
        doc.begin_page(100.0, 100.0).unwrap();
        assert_eq!(doc.page_count(), 2);
        let out = String::from_utf8_lossy(&doc.end_document().unwrap()).into_owned();
        assert!(out.contains("/Count 2"));
    }
}
