//! Image XObject decoding.
//!
//! JPEG and JPEG 2000 streams are stored as-is. Flate, LZW and unfiltered
//! samples are unpacked to 8 bits per component, expanded through the palette
//! when indexed, and re-encoded as PNG. Stencil masks become grayscale.
//! JBIG2 and CCITT streams, and color spaces other than gray, RGB, CMYK
//! (or palettes over them), are reported as unsupported.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document as LopdfDocument, Object, Stream};

use crate::error::{Error, Result};

/// Bytes of one embedded image, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// File extension without the dot ("jpeg", "jpx", "png")
    pub extension: String,
}

impl RawImage {
    /// Create a new raw image.
    pub fn new(data: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            data,
            extension: extension.into(),
        }
    }

    /// Size of the encoded bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }
}

/// Decode an image XObject stream into storable bytes.
pub fn decode_image_stream(doc: &LopdfDocument, stream: &Stream) -> Result<RawImage> {
    let filters = stream_filters(&stream.dict);

    match filters.last().map(Vec::as_slice) {
        Some(b"DCTDecode") | Some(b"DCT") if filters.len() == 1 => {
            Ok(RawImage::new(stream.content.clone(), "jpeg"))
        }
        Some(b"JPXDecode") if filters.len() == 1 => Ok(RawImage::new(stream.content.clone(), "jpx")),
        Some(b"FlateDecode") | Some(b"Fl") | Some(b"LZWDecode") | Some(b"LZW") | None => {
            let samples = if filters.is_empty() {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .map_err(|e| Error::ImageExtract(format!("decompression failed: {}", e)))?
            };
            let data = encode_samples(doc, &stream.dict, samples)?;
            Ok(RawImage::new(data, "png"))
        }
        Some(other) => Err(Error::ImageExtract(format!(
            "unsupported filter chain ending in {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Filter names of a stream, in application order.
fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().ok())
            .map(|n| n.to_vec())
            .collect(),
        _ => Vec::new(),
    }
}

/// How an image's samples map to pixel components.
#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    /// Each sample holds 1, 3 or 4 components directly
    Direct(u8),
    /// Each sample is a palette index into `lookup`, `base` bytes per entry
    Indexed { base: u8, hival: u8, lookup: Vec<u8> },
}

/// Re-encode raw samples as PNG using the image dictionary's geometry.
fn encode_samples(doc: &LopdfDocument, dict: &Dictionary, samples: Vec<u8>) -> Result<Vec<u8>> {
    let width = dict_u32(dict, b"Width")?;
    let height = dict_u32(dict, b"Height")?;

    let is_mask = dict
        .get(b"ImageMask")
        .ok()
        .and_then(|o| o.as_bool().ok())
        .unwrap_or(false);

    let (bits, model) = if is_mask {
        (1, ColorModel::Direct(1))
    } else {
        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        let model = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|cs| color_model(doc, cs))
            .ok_or_else(|| Error::ImageExtract("unsupported color space".to_string()))?;
        (bits, model)
    };

    let bits = match bits {
        1 | 2 | 4 | 8 | 16 => bits as u8,
        other => {
            return Err(Error::ImageExtract(format!(
                "unsupported bits per component: {}",
                other
            )))
        }
    };

    match model {
        ColorModel::Direct(components) => {
            let pixels = unpack_samples(&samples, width, height, components as usize, bits, true)?;
            encode_png(width, height, components, pixels)
        }
        ColorModel::Indexed { base, hival, lookup } => {
            let indices = unpack_samples(&samples, width, height, 1, bits, false)?;
            let pixels = expand_palette(&indices, base, hival, &lookup);
            encode_png(width, height, base, pixels)
        }
    }
}

/// Unpack byte-aligned rows of `bits`-deep samples to one byte per sample.
///
/// With `scale`, values are stretched to 0..=255; palette indices are kept as-is.
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    per_pixel: usize,
    bits: u8,
    scale: bool,
) -> Result<Vec<u8>> {
    let per_row = width as usize * per_pixel;
    let row_bytes = (per_row * bits as usize).div_ceil(8);
    let needed = row_bytes * height as usize;
    if data.len() < needed {
        return Err(Error::ImageExtract(format!(
            "truncated samples: {} < {} bytes",
            data.len(),
            needed
        )));
    }
    if bits == 8 {
        return Ok(data[..needed].to_vec());
    }

    let max = (1u32 << bits) - 1;
    let mut out = Vec::with_capacity(per_row * height as usize);
    for row in data[..needed].chunks_exact(row_bytes) {
        for i in 0..per_row {
            let value = if bits == 16 {
                (u32::from(row[2 * i]) << 8) | u32::from(row[2 * i + 1])
            } else {
                let bit = i * bits as usize;
                let shift = 8 - bits as usize - bit % 8;
                (u32::from(row[bit / 8]) >> shift) & max
            };
            out.push(if scale {
                (value * 255 / max) as u8
            } else {
                value.min(255) as u8
            });
        }
    }
    Ok(out)
}

/// Replace palette indices with their `base`-component entries.
///
/// Indices above `hival` are clamped; entries missing from a short table are black.
fn expand_palette(indices: &[u8], base: u8, hival: u8, lookup: &[u8]) -> Vec<u8> {
    let base = base as usize;
    indices
        .iter()
        .flat_map(|&i| {
            let start = i.min(hival) as usize * base;
            (start..start + base).map(|j| lookup.get(j).copied().unwrap_or(0))
        })
        .collect()
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            Error::ImageExtract(format!("missing or invalid {}", String::from_utf8_lossy(key)))
        })
}

fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Color model for a color space object, if it is supported.
fn color_model(doc: &LopdfDocument, color_space: &Object) -> Option<ColorModel> {
    let color_space = resolve(doc, color_space)?;
    if let Object::Array(items) = color_space {
        if let Ok(b"Indexed" | b"I") = items.first()?.as_name() {
            let base = color_components(doc, items.get(1)?)?;
            let hival = u8::try_from(resolve(doc, items.get(2)?)?.as_i64().ok()?).ok()?;
            let lookup = match resolve(doc, items.get(3)?)? {
                Object::String(bytes, _) => bytes.clone(),
                Object::Stream(s) => s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone()),
                _ => return None,
            };
            return Some(ColorModel::Indexed { base, hival, lookup });
        }
    }
    color_components(doc, color_space).map(ColorModel::Direct)
}

/// Number of color components for a direct color space, if it is supported.
fn color_components(doc: &LopdfDocument, color_space: &Object) -> Option<u8> {
    match resolve(doc, color_space)? {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Some(1),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
            b"DeviceCMYK" | b"CMYK" => Some(4),
            _ => None,
        },
        Object::Array(items) => {
            let family = items.first()?.as_name().ok()?;
            match family {
                b"ICCBased" => {
                    let profile = resolve(doc, items.get(1)?)?;
                    let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                    matches!(n, 1 | 3 | 4).then_some(n as u8)
                }
                b"CalGray" => Some(1),
                b"CalRGB" => Some(3),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Encode 8-bit samples with 1, 3 or 4 components per pixel as PNG.
///
/// Four-component samples are treated as CMYK and converted to RGB.
pub fn encode_png(width: u32, height: u32, components: u8, samples: Vec<u8>) -> Result<Vec<u8>> {
    let expected = width as usize * height as usize * components as usize;
    if samples.len() < expected {
        return Err(Error::ImageExtract(format!(
            "truncated samples: {} < {} bytes",
            samples.len(),
            expected
        )));
    }

    let mut samples = samples;
    samples.truncate(expected);

    let invalid = || Error::ImageExtract("sample buffer does not match dimensions".to_string());
    let image = match components {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, samples).ok_or_else(invalid)?),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, samples).ok_or_else(invalid)?),
        4 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).ok_or_else(invalid)?,
        ),
        n => {
            return Err(Error::ImageExtract(format!(
                "unsupported component count: {}",
                n
            )))
        }
    };

    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::ImageExtract(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    samples
        .chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u16;
            [
                ((255 - px[0] as u16) * k / 255) as u8,
                ((255 - px[1] as u16) * k / 255) as u8,
                ((255 - px[2] as u16) * k / 255) as u8,
            ]
        })
        .collect()
}
