//! Image XObject extraction.
//!
//! JPEG and JPEG 2000 streams are passed through untouched. Everything else
//! is decoded to 8-bit samples, converted to gray or RGB (plus alpha from a
//! soft mask) and re-encoded as PNG.

use base64::Engine;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{ImageFormat, ImageRef};

use super::content::{deref, resolve_dict, stream_data, ScannedPage};

/// An image payload ready for embedding.
#[derive(Debug, Clone)]
pub(crate) struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Color space of an image's samples.
#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed {
        base: Box<ColorSpace>,
        hival: usize,
        lookup: Vec<u8>,
    },
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

/// Pixel layout of decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Gray,
    Rgb,
}

/// Extracts the images referenced by a page.
pub(crate) struct ImageExtractor<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract every image the page references.
    ///
    /// Images listed in the page's resources come first, in resource order,
    /// followed by images only reached through Form XObjects. An image that
    /// fails to decode is logged and skipped; its index is not reused.
    pub fn extract_page_images(
        &self,
        page_index: u32,
        resources: Option<&'a Dictionary>,
        scanned: &ScannedPage,
    ) -> Vec<ImageRef> {
        let rects = scanned.placements_by_image();
        let mut images = Vec::new();

        for (index, id) in self.candidates(resources, scanned).into_iter().enumerate() {
            match self.extract_image(id) {
                Ok(image) => images.push(ImageRef {
                    index,
                    page: page_index,
                    format: image.format,
                    data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                    width: image.width,
                    height: image.height,
                    rects: rects.get(&id).cloned().unwrap_or_default(),
                }),
                Err(e) => {
                    log::warn!(
                        "Could not extract image {} from page {}: {}",
                        index,
                        page_index + 1,
                        e
                    );
                }
            }
        }

        images
    }

    fn candidates(&self, resources: Option<&'a Dictionary>, scanned: &ScannedPage) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = Vec::new();

        let xobjects = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| resolve_dict(self.doc, x));
        if let Some(xobjects) = xobjects {
            for (_, obj) in xobjects.iter() {
                if let Ok(id) = obj.as_reference() {
                    if self.is_image(id) && !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }

        for (id, _) in &scanned.placements {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }

        ids
    }

    fn is_image(&self, id: ObjectId) -> bool {
        match self.doc.get_object(id) {
            Ok(Object::Stream(s)) => matches!(s.dict.get(b"Subtype").and_then(Object::as_name_str), Ok("Image")),
            _ => false,
        }
    }

    /// Decode a single image XObject into an embeddable payload.
    pub fn extract_image(&self, id: ObjectId) -> Result<EncodedImage> {
        let stream = match self.doc.get_object(id)? {
            Object::Stream(s) => s,
            _ => return Err(Error::ImageExtract("not a stream".to_string())),
        };
        let dict = &stream.dict;
        let width = dimension(dict, b"Width")?;
        let height = dimension(dict, b"Height")?;

        let filters = filter_names(self.doc, dict);
        match filters.last().map(String::as_str) {
            Some("DCTDecode") | Some("DCT") if filters.len() == 1 => {
                return Ok(EncodedImage {
                    format: ImageFormat::Jpeg,
                    bytes: stream.content.clone(),
                    width,
                    height,
                });
            }
            Some("JPXDecode") if filters.len() == 1 => {
                return Ok(EncodedImage {
                    format: ImageFormat::Jp2,
                    bytes: stream.content.clone(),
                    width,
                    height,
                });
            }
            Some(f @ ("DCTDecode" | "DCT" | "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode" | "CCF")) => {
                return Err(Error::ImageExtract(format!("unsupported filter {}", f)));
            }
            _ => {}
        }

        let data = stream_data(stream)?;
        let image_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
        let (space, bpc) = if image_mask {
            (ColorSpace::Gray, 1)
        } else {
            let space = match dict.get(b"ColorSpace") {
                Ok(obj) => self.color_space(obj)?,
                Err(_) => return Err(Error::ImageExtract("missing color space".to_string())),
            };
            let bpc = dict
                .get(b"BitsPerComponent")
                .and_then(Object::as_i64)
                .unwrap_or(8);
            (space, bpc as u32)
        };

        let samples = unpack_samples(&data, width, height, space.components(), bpc)?;
        let (layout, mut pixels) = match &space {
            ColorSpace::Indexed { base, hival, lookup } => expand_indexed(&samples, base, *hival, lookup),
            _ => {
                let mut scaled: Vec<u8> = samples.iter().map(|&v| scale_sample(v, bpc)).collect();
                apply_decode_array(self.doc, dict, &mut scaled, space.components());
                to_pixels(&space, scaled)
            }
        };

        let mut color = match layout {
            PixelLayout::Gray => png::ColorType::Grayscale,
            PixelLayout::Rgb => png::ColorType::Rgb,
        };

        if let Some(alpha) = self.soft_mask(dict, width, height) {
            let channels = if layout == PixelLayout::Gray { 1 } else { 3 };
            pixels = pixels
                .chunks_exact(channels)
                .zip(alpha)
                .flat_map(|(px, a)| px.iter().copied().chain(std::iter::once(a)))
                .collect();
            color = match layout {
                PixelLayout::Gray => png::ColorType::GrayscaleAlpha,
                PixelLayout::Rgb => png::ColorType::Rgba,
            };
        }

        Ok(EncodedImage {
            format: ImageFormat::Png,
            bytes: encode_png(width, height, color, &pixels)?,
            width,
            height,
        })
    }

    fn color_space(&self, obj: &Object) -> Result<ColorSpace> {
        let unsupported = |name: &str| Error::ImageExtract(format!("unsupported color space {}", name));

        match deref(self.doc, obj) {
            Object::Name(name) => match name.as_slice() {
                b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorSpace::Gray),
                b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorSpace::Rgb),
                b"DeviceCMYK" | b"CMYK" => Ok(ColorSpace::Cmyk),
                other => Err(unsupported(&String::from_utf8_lossy(other))),
            },
            Object::Array(arr) => {
                let family = arr.first().and_then(|o| o.as_name_str().ok()).unwrap_or("");
                match family {
                    "CalGray" => Ok(ColorSpace::Gray),
                    "CalRGB" => Ok(ColorSpace::Rgb),
                    "ICCBased" => {
                        let n = arr
                            .get(1)
                            .and_then(|o| resolve_dict(self.doc, o))
                            .and_then(|d| d.get(b"N").and_then(Object::as_i64).ok())
                            .unwrap_or(0);
                        match n {
                            1 => Ok(ColorSpace::Gray),
                            3 => Ok(ColorSpace::Rgb),
                            4 => Ok(ColorSpace::Cmyk),
                            _ => Err(unsupported("ICCBased")),
                        }
                    }
                    "Indexed" | "I" if arr.len() >= 4 => {
                        let base = self.color_space(&arr[1])?;
                        if matches!(base, ColorSpace::Indexed { .. }) {
                            return Err(unsupported("nested Indexed"));
                        }
                        let hival = deref(self.doc, &arr[2]).as_i64().unwrap_or(0).clamp(0, 255) as usize;
                        let lookup = match deref(self.doc, &arr[3]) {
                            Object::String(bytes, _) => bytes.clone(),
                            Object::Stream(s) => stream_data(s)?,
                            _ => return Err(unsupported("Indexed lookup")),
                        };
                        Ok(ColorSpace::Indexed {
                            base: Box::new(base),
                            hival,
                            lookup,
                        })
                    }
                    other => Err(unsupported(other)),
                }
            }
            _ => Err(unsupported("?")),
        }
    }

    /// Alpha channel from an `/SMask` matching the image size.
    fn soft_mask(&self, dict: &Dictionary, width: u32, height: u32) -> Option<Vec<u8>> {
        let id = dict.get(b"SMask").and_then(Object::as_reference).ok()?;
        let Ok(Object::Stream(mask)) = self.doc.get_object(id) else {
            return None;
        };

        let mask_w = dimension(&mask.dict, b"Width").ok()?;
        let mask_h = dimension(&mask.dict, b"Height").ok()?;
        if mask_w != width || mask_h != height {
            log::debug!(
                "Ignoring soft mask of {}x{} for {}x{} image",
                mask_w,
                mask_h,
                width,
                height
            );
            return None;
        }

        let bpc = mask.dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(8) as u32;
        let data = stream_data(mask).ok()?;
        let samples = unpack_samples(&data, width, height, 1, bpc).ok()?;
        Some(samples.into_iter().map(|v| scale_sample(v, bpc)).collect())
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    match dict.get(key).and_then(Object::as_i64) {
        Ok(v) if v > 0 && v <= u32::MAX as i64 => Ok(v as u32),
        _ => Err(Error::ImageExtract(format!(
            "invalid {}",
            String::from_utf8_lossy(key)
        ))),
    }
}

fn filter_names(doc: &LopdfDocument, dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter").map(|f| deref(doc, f)) {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name_str().ok())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Unpack byte-aligned rows of `bpc`-bit samples. 16-bit samples keep their high byte.
fn unpack_samples(data: &[u8], width: u32, height: u32, components: usize, bpc: u32) -> Result<Vec<u8>> {
    if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::ImageExtract(format!("unsupported bits per component {}", bpc)));
    }

    let too_large = || Error::ImageExtract("image dimensions too large".to_string());
    let per_row = (width as usize).checked_mul(components).ok_or_else(too_large)?;
    let row_bytes = per_row
        .checked_mul(bpc as usize)
        .and_then(|bits| bits.checked_add(7))
        .ok_or_else(too_large)?
        / 8;
    let needed = row_bytes.checked_mul(height as usize).ok_or_else(too_large)?;
    let sample_count = per_row.checked_mul(height as usize).ok_or_else(too_large)?;
    if data.len() < needed {
        return Err(Error::ImageExtract(format!(
            "image data too short: {} bytes, expected {}",
            data.len(),
            needed
        )));
    }

    let mut samples = Vec::with_capacity(sample_count);
    for row in data[..needed].chunks_exact(row_bytes) {
        match bpc {
            8 => samples.extend_from_slice(&row[..per_row]),
            16 => samples.extend(row.chunks_exact(2).take(per_row).map(|c| c[0])),
            _ => {
                let bits = bpc as usize;
                let mask = (1u8 << bits) - 1;
                for i in 0..per_row {
                    let offset = i * bits;
                    let shift = 8 - bits - offset % 8;
                    samples.push((row[offset / 8] >> shift) & mask);
                }
            }
        }
    }

    Ok(samples)
}

/// Scale a raw sample value to the 0..=255 range.
fn scale_sample(value: u8, bpc: u32) -> u8 {
    match bpc {
        1 => value * 255,
        2 => value * 85,
        4 => value * 17,
        _ => value,
    }
}

/// Invert components whose `/Decode` range is reversed.
fn apply_decode_array(doc: &LopdfDocument, dict: &Dictionary, samples: &mut [u8], components: usize) {
    let Ok(decode) = dict.get(b"Decode").map(|d| deref(doc, d)).and_then(Object::as_array) else {
        return;
    };
    let ranges: Vec<f32> = decode
        .iter()
        .filter_map(|o| match o {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        })
        .collect();

    let inverted: Vec<bool> = (0..components)
        .map(|c| matches!((ranges.get(2 * c), ranges.get(2 * c + 1)), (Some(lo), Some(hi)) if lo > hi))
        .collect();
    if !inverted.iter().any(|&i| i) {
        return;
    }

    for (i, sample) in samples.iter_mut().enumerate() {
        if inverted[i % components] {
            *sample = 255 - *sample;
        }
    }
}

fn to_pixels(space: &ColorSpace, samples: Vec<u8>) -> (PixelLayout, Vec<u8>) {
    match space {
        ColorSpace::Gray => (PixelLayout::Gray, samples),
        ColorSpace::Cmyk => (
            PixelLayout::Rgb,
            samples.chunks_exact(4).flat_map(|c| cmyk_to_rgb(c[0], c[1], c[2], c[3])).collect(),
        ),
        _ => (PixelLayout::Rgb, samples),
    }
}

fn expand_indexed(indices: &[u8], base: &ColorSpace, hival: usize, lookup: &[u8]) -> (PixelLayout, Vec<u8>) {
    let n = base.components();
    let mut entries = Vec::with_capacity(indices.len() * n);
    for &idx in indices {
        let start = (idx as usize).min(hival) * n;
        for k in 0..n {
            entries.push(lookup.get(start + k).copied().unwrap_or(0));
        }
    }
    to_pixels(base, entries)
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let channel = |v: u8| ((255 - v as u32) * (255 - k as u32) / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

/// Encode 8-bit pixels as PNG.
pub(crate) fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::ImageExtract(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(data)
            .map_err(|e| Error::ImageExtract(format!("PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| Error::ImageExtract(format!("PNG finish: {}", e)))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    fn image_stream(dict: Vec<(&str, Object)>, content: Vec<u8>) -> Stream {
        let mut d = Dictionary::new();
        d.set("Type", Object::Name(b"XObject".to_vec()));
        d.set("Subtype", Object::Name(b"Image".to_vec()));
        for (k, v) in dict {
            d.set(k, v);
        }
        Stream::new(d, content)
    }

    fn decode_png(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    #[test]
    fn test_rgb_image_reencoded_as_png() {
        let mut doc = LopdfDocument::with_version("1.5");
        let pixels: Vec<u8> = (0..18).collect();
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(2)),
                ("Height", Object::Integer(3)),
                ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ],
            pixels.clone(),
        ));

        let image = ImageExtractor::new(&doc).extract_image(id).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!((image.width, image.height), (2, 3));

        let (info, data) = decode_png(&image.bytes);
        assert_eq!((info.width, info.height), (2, 3));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(data, pixels);
    }

    #[test]
    fn test_jpeg_passthrough() {
        let mut doc = LopdfDocument::with_version("1.5");
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(4)),
                ("Height", Object::Integer(4)),
                ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
                ("Filter", Object::Name(b"DCTDecode".to_vec())),
            ],
            jpeg.clone(),
        ));

        let image = ImageExtractor::new(&doc).extract_image(id).unwrap();
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!(image.bytes, jpeg);
    }

    #[test]
    fn test_cmyk_converted_to_rgb() {
        let mut doc = LopdfDocument::with_version("1.5");
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(1)),
                ("Height", Object::Integer(1)),
                ("ColorSpace", Object::Name(b"DeviceCMYK".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ],
            vec![0, 255, 255, 0],
        ));

        let image = ImageExtractor::new(&doc).extract_image(id).unwrap();
        let (info, data) = decode_png(&image.bytes);
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(data, vec![255, 0, 0]);
    }

    #[test]
    fn test_indexed_palette_expanded() {
        let mut doc = LopdfDocument::with_version("1.5");
        let palette = Object::String(vec![255, 0, 0, 0, 0, 255], lopdf::StringFormat::Hexadecimal);
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(2)),
                ("Height", Object::Integer(1)),
                (
                    "ColorSpace",
                    Object::Array(vec![
                        Object::Name(b"Indexed".to_vec()),
                        Object::Name(b"DeviceRGB".to_vec()),
                        Object::Integer(1),
                        palette,
                    ]),
                ),
                ("BitsPerComponent", Object::Integer(8)),
            ],
            vec![1, 0],
        ));

        let image = ImageExtractor::new(&doc).extract_image(id).unwrap();
        let (_, data) = decode_png(&image.bytes);
        assert_eq!(data, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_one_bit_gray_unpacked() {
        // 0b1010_0000: white, black, white
        let samples = unpack_samples(&[0b1010_0000], 3, 1, 1, 1).unwrap();
        assert_eq!(samples, vec![1, 0, 1]);
        let scaled: Vec<u8> = samples.iter().map(|&v| scale_sample(v, 1)).collect();
        assert_eq!(scaled, vec![255, 0, 255]);
    }

    #[test]
    fn test_soft_mask_adds_alpha() {
        let mut doc = LopdfDocument::with_version("1.5");
        let mask_id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(1)),
                ("Height", Object::Integer(1)),
                ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ],
            vec![128],
        ));
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(1)),
                ("Height", Object::Integer(1)),
                ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
                ("SMask", Object::Reference(mask_id)),
            ],
            vec![10, 20, 30],
        ));

        let image = ImageExtractor::new(&doc).extract_image(id).unwrap();
        let (info, data) = decode_png(&image.bytes);
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(data, vec![10, 20, 30, 128]);
    }

    #[test]
    fn test_short_data_is_an_error() {
        let mut doc = LopdfDocument::with_version("1.5");
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(4)),
                ("Height", Object::Integer(4)),
                ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ],
            vec![0; 5],
        ));

        let err = ImageExtractor::new(&doc).extract_image(id).unwrap_err();
        assert!(matches!(err, Error::ImageExtract(_)));
    }

    #[test]
    fn test_oversized_dimensions_are_skipped() {
        let mut doc = LopdfDocument::with_version("1.5");
        let id = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(1 << 31)),
                ("Height", Object::Integer(1 << 31)),
                ("ColorSpace", Object::Name(b"DeviceCMYK".to_vec())),
                ("BitsPerComponent", Object::Integer(16)),
            ],
            vec![0; 16],
        ));

        let err = ImageExtractor::new(&doc).extract_image(id).unwrap_err();
        assert!(matches!(err, Error::ImageExtract(_)));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let images = ImageExtractor::new(&doc).extract_page_images(0, Some(&resources), &ScannedPage::default());
        assert!(images.is_empty());
    }

    #[test]
    fn test_unpack_rejects_overflowing_sizes() {
        let err = unpack_samples(&[0; 8], u32::MAX, u32::MAX, 4, 16).unwrap_err();
        assert!(matches!(err, Error::ImageExtract(ref msg) if msg == "image dimensions too large"));
    }

    #[test]
    fn test_failed_image_is_skipped_but_keeps_index() {
        let mut doc = LopdfDocument::with_version("1.5");
        let broken = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(2)),
                ("Height", Object::Integer(2)),
                ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ],
            vec![0; 3],
        ));
        let good = doc.add_object(image_stream(
            vec![
                ("Width", Object::Integer(1)),
                ("Height", Object::Integer(1)),
                ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
            ],
            vec![200],
        ));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(broken));
        xobjects.set("Im1", Object::Reference(good));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let images = ImageExtractor::new(&doc).extract_page_images(0, Some(&resources), &ScannedPage::default());
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].index, 1);
        assert_eq!(images[0].format, ImageFormat::Png);
    }
}
