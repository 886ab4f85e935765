use crate::error::ExportError;

/// Opaque handle to an image embedded in a `PdfDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }

    fn channels(&self) -> usize {
        match self {
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceGray => 1,
        }
    }
}

/// Decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    /// 8-bit pixel rows for PNG; the untouched file for JPEG (DCTDecode).
    pub data: Vec<u8>,
    /// 8-bit alpha plane, if the source had one.
    pub alpha: Option<Vec<u8>>,
}

/// Identify JPEG or PNG by magic bytes.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat, ExportError> {
    if data.starts_with(&[0xFF, 0xD8]) {
        Ok(ImageFormat::Jpeg)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Ok(ImageFormat::Png)
    } else {
        Err(ExportError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

pub fn load_image(data: Vec<u8>) -> Result<ImageData, ExportError> {
    match detect_format(&data)? {
        ImageFormat::Jpeg => parse_jpeg(data),
        ImageFormat::Png => parse_png(data),
    }
}

fn parse_jpeg(data: Vec<u8>) -> Result<ImageData, ExportError> {
    let (width, height, components) = jpeg_frame(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        n => {
            return Err(ExportError::Image(format!(
                "unsupported JPEG component count: {}",
                n
            )))
        }
    };
    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        data,
        alpha: None,
    })
}

/// Walk JPEG segments up to the first SOF0..SOF3 frame header and read
/// width, height and component count from it.
fn jpeg_frame(data: &[u8]) -> Result<(u32, u32, u8), ExportError> {
    let mut i = 2;
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        match marker {
            0xC0..=0xC3 => {
                if i + 9 >= data.len() {
                    break;
                }
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
                return Ok((width, height, data[i + 9]));
            }
            // Fill bytes and markers without a length field.
            0xFF | 0x00 | 0x01 | 0xD0..=0xD9 => i += if marker == 0xFF { 1 } else { 2 },
            _ => {
                let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
                i += 2 + len;
            }
        }
    }
    Err(ExportError::Image("JPEG has no frame header".to_string()))
}

fn parse_png(data: Vec<u8>) -> Result<ImageData, ExportError> {
    let mut decoder = png::Decoder::new(data.as_slice());
    // Expand palettes and low bit depths to 8-bit samples.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| ExportError::Image(format!("PNG decode error: {}", e)))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| ExportError::Image(format!("PNG frame error: {}", e)))?;
    buf.truncate(frame.buffer_size());

    let (color_space, alpha_stride) = match frame.color_type {
        png::ColorType::Rgb => (ColorSpace::DeviceRGB, None),
        png::ColorType::Rgba => (ColorSpace::DeviceRGB, Some(4)),
        png::ColorType::Grayscale => (ColorSpace::DeviceGray, None),
        png::ColorType::GrayscaleAlpha => (ColorSpace::DeviceGray, Some(2)),
        other => {
            return Err(ExportError::Image(format!(
                "unsupported PNG color type: {:?}",
                other
            )))
        }
    };

    let (pixels, alpha) = match alpha_stride {
        None => (buf, None),
        Some(stride) => {
            let color = stride - 1;
            let count = buf.len() / stride;
            let mut pixels = Vec::with_capacity(count * color);
            let mut alpha = Vec::with_capacity(count);
            for px in buf.chunks_exact(stride) {
                pixels.extend_from_slice(&px[..color]);
                alpha.push(px[color]);
            }
            (pixels, Some(alpha))
        }
    };

    Ok(ImageData {
        width: frame.width,
        height: frame.height,
        format: ImageFormat::Png,
        color_space,
        data: pixels,
        alpha,
    })
}

/// Nearest-neighbour reduction so the image is no larger than
/// `max_width` × `max_height` pixels, keeping its aspect ratio.
///
/// JPEG data is passed through untouched; images that already fit are
/// returned as-is.
pub fn downsample(image: ImageData, max_width: u32, max_height: u32) -> ImageData {
    if image.format == ImageFormat::Jpeg
        || (image.width <= max_width && image.height <= max_height)
        || max_width == 0
        || max_height == 0
    {
        return image;
    }
    let ratio = (max_width as f64 / image.width as f64).min(max_height as f64 / image.height as f64);
    let new_w = ((image.width as f64 * ratio).round() as u32).max(1);
    let new_h = ((image.height as f64 * ratio).round() as u32).max(1);

    let channels = image.color_space.channels();
    let src_x = |x: u32| ((x as u64 * image.width as u64) / new_w as u64) as usize;
    let src_y = |y: u32| ((y as u64 * image.height as u64) / new_h as u64) as usize;
    let src_w = image.width as usize;

    let mut pixels = Vec::with_capacity(new_w as usize * new_h as usize * channels);
    let mut alpha = image
        .alpha
        .as_ref()
        .map(|_| Vec::with_capacity(new_w as usize * new_h as usize));
    for y in 0..new_h {
        let row = src_y(y) * src_w;
        for x in 0..new_w {
            let idx = row + src_x(x);
            pixels.extend_from_slice(&image.data[idx * channels..(idx + 1) * channels]);
            if let (Some(out), Some(src)) = (alpha.as_mut(), image.alpha.as_ref()) {
                out.push(src[idx]);
            }
        }
    }

    ImageData {
        width: new_w,
        height: new_h,
        data: pixels,
        alpha,
        ..image
    }
}

/// Largest rectangle with the image's aspect ratio that fits in the
/// box, centred. Returns `(x, y, width, height)` in the box's units.
pub fn fit_within(img_w: u32, img_h: u32, x: f64, y: f64, width: f64, height: f64) -> (f64, f64, f64, f64) {
    if img_w == 0 || img_h == 0 {
        return (x, y, 0.0, 0.0);
    }
    let scale = (width / img_w as f64).min(height / img_h as f64);
    let w = img_w as f64 * scale;
    let h = img_h as f64 * scale;
    (x + (width - w) / 2.0, y + (height - h) / 2.0, w, h)
}
