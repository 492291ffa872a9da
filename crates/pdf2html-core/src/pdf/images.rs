//! Conversion of image XObject streams into writable image files.
//!
//! Streams already carrying a file format (JPEG, JPEG 2000, JBIG2, CCITT)
//! are passed through untouched, after undoing any Flate/LZW/ASCII85
//! layers stacked in front of the codec. Raw sample data is wrapped into a PNG.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document, Object, Stream};
use std::io::Cursor;
use tracing::{trace, warn};

use super::{EmbeddedImage, Result};
use crate::error::PdfError;

/// Extension used when the sample layout cannot be expressed as an image.
const RAW_EXTENSION: &str = "bin";

/// Colour spaces the raw sample decoder understands.
#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed { base: Box<ColorSpace>, lookup: Vec<u8> },
}

impl ColorSpace {
    fn components(&self) -> usize {
        match self {
            ColorSpace::Gray | ColorSpace::Indexed { .. } => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

/// File extension for filters whose output is itself an image file format.
fn passthrough_extension(filter: &[u8]) -> Option<&'static str> {
    match filter {
        b"DCTDecode" | b"DCT" => Some("jpeg"),
        b"JPXDecode" => Some("jpx"),
        b"JBIG2Decode" => Some("jb2"),
        b"CCITTFaxDecode" | b"CCF" => Some("fax"),
        _ => None,
    }
}

/// Canonical name of a filter lopdf can decode, accepting the inline abbreviations.
fn transport_filter(filter: &[u8]) -> Option<&'static str> {
    match filter {
        b"FlateDecode" | b"Fl" => Some("FlateDecode"),
        b"LZWDecode" | b"LZW" => Some("LZWDecode"),
        b"ASCII85Decode" | b"A85" => Some("ASCII85Decode"),
        _ => None,
    }
}

/// Decode every filter in front of the trailing image codec.
///
/// Returns `None` when one of them is not a transport filter lopdf can undo.
fn strip_transport_filters(stream: &Stream, filters: &[&[u8]]) -> Option<Vec<u8>> {
    let (_, leading) = filters.split_last()?;
    let names = leading
        .iter()
        .map(|f| transport_filter(f).map(|name| Object::Name(name.as_bytes().to_vec())))
        .collect::<Option<Vec<_>>>()?;

    let mut transport = stream.clone();
    transport.dict.set("Filter", Object::Array(names));
    match transport.decompressed_content() {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Failed to undo transport filters on image: {}", e);
            None
        }
    }
}

fn filter_names(stream: &Stream) -> Vec<&[u8]> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(arr)) => arr.iter().filter_map(|o| o.as_name().ok()).collect(),
        _ => Vec::new(),
    }
}

fn dimension(doc: &Document, stream: &Stream, key: &[u8]) -> Option<u32> {
    let obj = stream.dict.get(key).ok()?;
    let (_, obj) = doc.dereference(obj).ok()?;
    obj.as_i64().ok().and_then(|v| u32::try_from(v).ok())
}

/// Turn an image XObject stream into bytes that can be written to disk.
pub(super) fn embedded_image(doc: &Document, stream: &Stream) -> Result<EmbeddedImage> {
    let width = dimension(doc, stream, b"Width").unwrap_or(0);
    let height = dimension(doc, stream, b"Height").unwrap_or(0);
    let filters = filter_names(stream);

    if let Some(last) = filters.last() {
        if let Some(extension) = passthrough_extension(last) {
            if filters.len() == 1 {
                trace!("Passing through {} image {}x{}", extension, width, height);
                return Ok(EmbeddedImage {
                    data: stream.content.clone(),
                    extension: extension.to_string(),
                    width,
                    height,
                });
            }
            if let Some(data) = strip_transport_filters(stream, &filters) {
                trace!("Passing through {} image {}x{} after transport decoding", extension, width, height);
                return Ok(EmbeddedImage {
                    data,
                    extension: extension.to_string(),
                    width,
                    height,
                });
            }
            warn!(
                "Image uses a filter chain ending in {}, writing it undecoded",
                String::from_utf8_lossy(last)
            );
            return Ok(raw_image(stream.content.clone(), width, height));
        }
    }

    if width == 0 || height == 0 {
        return Err(PdfError::ImageExtraction(
            "image dictionary has no usable Width/Height".to_string(),
        ));
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| PdfError::ImageExtraction(format!("failed to decompress image: {}", e)))?
    };

    let is_mask = stream
        .dict
        .get(b"ImageMask")
        .and_then(|o| o.as_bool())
        .unwrap_or(false);

    let color_space = if is_mask {
        Some(ColorSpace::Gray)
    } else {
        stream
            .dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| resolve_color_space(doc, o))
    };

    let bits = if is_mask {
        1
    } else {
        stream
            .dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8
    };

    let Some(color_space) = color_space else {
        warn!("Unsupported colour space for {}x{} image, writing raw samples", width, height);
        return Ok(raw_image(data, width, height));
    };

    match decode_samples(&data, width, height, &color_space, bits) {
        Some(img) => {
            let mut png = Vec::new();
            img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| PdfError::ImageExtraction(format!("failed to encode PNG: {}", e)))?;
            Ok(EmbeddedImage {
                data: png,
                extension: "png".to_string(),
                width,
                height,
            })
        }
        None => {
            warn!(
                "Could not decode {}x{} image ({:?}, {} bits), writing raw samples",
                width, height, color_space, bits
            );
            Ok(raw_image(data, width, height))
        }
    }
}

fn raw_image(data: Vec<u8>, width: u32, height: u32) -> EmbeddedImage {
    EmbeddedImage {
        data,
        extension: RAW_EXTENSION.to_string(),
        width,
        height,
    }
}

fn resolve_color_space(doc: &Document, obj: &Object) -> Option<ColorSpace> {
    let (_, obj) = doc.dereference(obj).ok()?;
    match obj {
        Object::Name(name) => device_color_space(name),
        Object::Array(arr) => {
            let family = arr.first()?.as_name().ok()?;
            match family {
                b"ICCBased" => {
                    let (_, profile) = doc.dereference(arr.get(1)?).ok()?;
                    let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                    match n {
                        1 => Some(ColorSpace::Gray),
                        3 => Some(ColorSpace::Rgb),
                        4 => Some(ColorSpace::Cmyk),
                        _ => None,
                    }
                }
                b"Indexed" | b"I" => {
                    let base = resolve_color_space(doc, arr.get(1)?)?;
                    if matches!(base, ColorSpace::Indexed { .. }) {
                        return None;
                    }
                    let (_, table) = doc.dereference(arr.get(3)?).ok()?;
                    let lookup = match table {
                        Object::String(bytes, _) => bytes.clone(),
                        Object::Stream(s) => s
                            .decompressed_content()
                            .unwrap_or_else(|_| s.content.clone()),
                        _ => return None,
                    };
                    Some(ColorSpace::Indexed {
                        base: Box::new(base),
                        lookup,
                    })
                }
                b"CalRGB" => Some(ColorSpace::Rgb),
                b"CalGray" => Some(ColorSpace::Gray),
                _ => None,
            }
        }
        _ => None,
    }
}

fn device_color_space(name: &[u8]) -> Option<ColorSpace> {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => Some(ColorSpace::Gray),
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(ColorSpace::Rgb),
        b"DeviceCMYK" | b"CMYK" => Some(ColorSpace::Cmyk),
        _ => None,
    }
}

/// Split packed rows into one value per sample. 16-bit samples keep their high byte.
fn unpack_samples(data: &[u8], width: usize, height: usize, components: usize, bits: u8) -> Option<Vec<u8>> {
    let bits = bits as usize;
    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return None;
    }

    let samples_per_row = width.checked_mul(components)?;
    let row_bytes = (samples_per_row.checked_mul(bits)? + 7) / 8;
    if data.len() < row_bytes.checked_mul(height)? {
        return None;
    }

    let mask = ((1u16 << bits.min(8)) - 1) as u8;
    let mut out = Vec::with_capacity(samples_per_row * height);
    for row in data.chunks(row_bytes).take(height) {
        for i in 0..samples_per_row {
            let value = match bits {
                8 => row[i],
                16 => row[i * 2],
                _ => {
                    let offset = i * bits;
                    let shift = 8 - bits - (offset % 8);
                    (row[offset / 8] >> shift) & mask
                }
            };
            out.push(value);
        }
    }
    Some(out)
}

fn scale(value: u8, bits: u8) -> u8 {
    match bits {
        8 | 16 => value,
        _ => {
            let max = (1u16 << bits) - 1;
            (value as u16 * 255 / max) as u8
        }
    }
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = 255 - k as u16;
    [
        ((255 - c as u16) * k / 255) as u8,
        ((255 - m as u16) * k / 255) as u8,
        ((255 - y as u16) * k / 255) as u8,
    ]
}

fn to_rgb(space: &ColorSpace, px: &[u8]) -> Option<[u8; 3]> {
    match space {
        ColorSpace::Gray => Some([px[0], px[0], px[0]]),
        ColorSpace::Rgb => Some([px[0], px[1], px[2]]),
        ColorSpace::Cmyk => Some(cmyk_to_rgb(px[0], px[1], px[2], px[3])),
        ColorSpace::Indexed { .. } => None,
    }
}

fn decode_samples(data: &[u8], width: u32, height: u32, space: &ColorSpace, bits: u8) -> Option<DynamicImage> {
    let (w, h) = (width as usize, height as usize);
    let samples = unpack_samples(data, w, h, space.components(), bits)?;

    match space {
        ColorSpace::Gray => {
            let pixels = samples.iter().map(|&v| scale(v, bits)).collect();
            GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        ColorSpace::Rgb => {
            let pixels = samples.iter().map(|&v| scale(v, bits)).collect();
            RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        ColorSpace::Cmyk => {
            let mut pixels = Vec::with_capacity(w * h * 3);
            for px in samples.chunks_exact(4) {
                let px: Vec<u8> = px.iter().map(|&v| scale(v, bits)).collect();
                pixels.extend_from_slice(&cmyk_to_rgb(px[0], px[1], px[2], px[3]));
            }
            RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        ColorSpace::Indexed { base, lookup } => {
            let n = base.components();
            let mut pixels = Vec::with_capacity(w * h * 3);
            for &index in &samples {
                let start = index as usize * n;
                let entry = lookup.get(start..start + n)?;
                pixels.extend_from_slice(&to_rgb(base, entry)?);
            }
            RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
    }
}
