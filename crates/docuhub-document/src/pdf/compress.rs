// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF compression — structural clean-up (prune, Flate, renumber) and, when a
// target size is requested, progressive JPEG re-encoding of embedded images.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document, Object, Stream};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use docuhub_core::error::{DocuhubError, Result};

use crate::image::ImageProcessor;
use crate::pdf::reader::serialise;

/// (JPEG quality, scale factor) steps tried in order until a target fits.
const RECOMPRESSION_LADDER: [(u8, f32); 7] = [
    (85, 1.0),
    (70, 1.0),
    (55, 1.0),
    (40, 1.0),
    (25, 1.0),
    (40, 0.5),
    (25, 0.5),
];

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Size summary of a compression run, in the shape the front ends show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    /// Original size in MB with two decimals.
    pub original: String,
    /// Compressed size in MB with two decimals.
    pub compressed: String,
    /// Size reduction as a whole-number percentage.
    pub reduction: String,
    /// Always true when no target was given.
    pub target_met: bool,
}

impl CompressionReport {
    pub fn new(original_bytes: u64, compressed_bytes: u64, target: Option<u64>) -> Self {
        Self {
            original_bytes,
            compressed_bytes,
            original: megabytes(original_bytes),
            compressed: megabytes(compressed_bytes),
            reduction: reduction_percent(original_bytes, compressed_bytes),
            target_met: target.is_none_or(|limit| compressed_bytes <= limit),
        }
    }
}

/// Compressed bytes plus their report.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub bytes: Vec<u8>,
    pub report: CompressionReport,
}

fn megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

/// Reduction computed from the rounded MB figures, falling back to exact
/// byte counts for files under 0.01 MB.
fn reduction_percent(original: u64, compressed: u64) -> String {
    if original == 0 {
        return "0".to_string();
    }
    let rounded = |bytes: u64| (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0;
    let (orig, comp) = if rounded(original) > 0.0 {
        (rounded(original), rounded(compressed))
    } else {
        (original as f64, compressed as f64)
    };
    format!("{:.0}", 100.0 - comp / orig * 100.0)
}

/// Compress a PDF. With `target_bytes`, embedded images are re-encoded at
/// decreasing quality (then half resolution) until the output fits; the
/// smallest attempt is returned if none does.
#[instrument(skip(data), fields(data_len = data.len(), target_bytes))]
pub fn compress(data: &[u8], target_bytes: Option<u64>) -> Result<CompressionOutcome> {
    let original = Document::load_mem(data)
        .map_err(|err| DocuhubError::PdfError(format!("failed to load PDF: {}", err)))?;
    info!(original_bytes = data.len(), "Compressing PDF");

    let mut best = restructure(original.clone())?;
    debug!(bytes = best.len(), "Structural compression done");

    if let Some(target) = target_bytes {
        if best.len() as u64 > target && !has_recompressible_images(&original) {
            debug!("no recompressible images, keeping structural result");
        } else if best.len() as u64 > target {
            for (quality, scale) in RECOMPRESSION_LADDER {
                let mut attempt = original.clone();
                let replaced = recompress_images(&mut attempt, quality, scale);
                if replaced == 0 {
                    debug!(quality, scale, "no image shrank at this step");
                    continue;
                }
                let bytes = restructure(attempt)?;
                debug!(quality, scale, replaced, bytes = bytes.len(), "Recompression attempt");
                if bytes.len() < best.len() {
                    best = bytes;
                }
                if best.len() as u64 <= target {
                    break;
                }
            }
        }
        if best.len() as u64 > target {
            warn!(
                target,
                achieved = best.len(),
                "compression target not reachable"
            );
        }
    }

    let report = CompressionReport::new(data.len() as u64, best.len() as u64, target_bytes);
    info!(
        original = %report.original,
        compressed = %report.compressed,
        reduction = %report.reduction,
        "Compression complete"
    );
    Ok(CompressionOutcome {
        bytes: best,
        report,
    })
}

/// Drop unreachable objects, Flate-compress streams and renumber.
fn restructure(mut document: Document) -> Result<Vec<u8>> {
    document.prune_objects();
    document.delete_zero_length_streams();
    document.compress();
    document.renumber_objects();
    serialise(&mut document, "compressed PDF")
}

fn has_recompressible_images(document: &Document) -> bool {
    document.objects.values().any(|object| match object {
        Object::Stream(stream) => decode_image_stream(stream).is_some(),
        _ => false,
    })
}

/// Re-encode every eligible image stream as JPEG. Returns how many were
/// replaced.
fn recompress_images(document: &mut Document, quality: u8, scale: f32) -> usize {
    let mut replaced = 0;
    for (id, object) in document.objects.iter_mut() {
        let Object::Stream(stream) = object else {
            continue;
        };
        let Some(image) = decode_image_stream(stream) else {
            continue;
        };

        let processor = ImageProcessor::from_dynamic(image).scale(scale);
        let (width, height) = (processor.width(), processor.height());
        let encoded = match processor.to_jpeg_bytes(quality) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(?id, %err, "skipping image that failed to encode");
                continue;
            }
        };
        if scale >= 1.0 && encoded.len() >= stream.content.len() {
            continue;
        }

        stream.dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        stream.dict.remove(b"DecodeParms");
        stream.dict.set("Width", Object::Integer(width as i64));
        stream.dict.set("Height", Object::Integer(height as i64));
        stream.set_content(encoded);
        stream.allows_compression = false;
        replaced += 1;
    }
    replaced
}

/// Decode an 8-bit DeviceRGB/DeviceGray image without masks. Anything else
/// is left alone.
fn decode_image_stream(stream: &Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    if !matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Image") {
        return None;
    }
    if dict.has(b"SMask") || dict.has(b"Mask") || dict.has(b"ImageMask") {
        return None;
    }
    if dict.get(b"BitsPerComponent").and_then(Object::as_i64).ok()? != 8 {
        return None;
    }
    let gray = match dict.get(b"ColorSpace") {
        Ok(Object::Name(name)) if name.as_slice() == b"DeviceRGB" => false,
        Ok(Object::Name(name)) if name.as_slice() == b"DeviceGray" => true,
        _ => return None,
    };
    let width = u32::try_from(dict.get(b"Width").and_then(Object::as_i64).ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").and_then(Object::as_i64).ok()?).ok()?;

    let filter = dict.get(b"Filter").ok();
    match filter {
        Some(Object::Name(name)) if name.as_slice() == b"DCTDecode" => {
            let decoded = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .ok()?;
            Some(if gray {
                DynamicImage::ImageLuma8(decoded.to_luma8())
            } else {
                DynamicImage::ImageRgb8(decoded.to_rgb8())
            })
        }
        None | Some(Object::Name(_)) => {
            let raw = stream.decompressed_content().ok().or_else(|| {
                filter.is_none().then(|| stream.content.clone())
            })?;
            if gray {
                GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8)
            } else {
                RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn report_formats_like_the_web_tool() {
        let report = CompressionReport::new(3 * 1024 * 1024, 1536 * 1024, None);
        assert_eq!(report.original, "3.00");
        assert_eq!(report.compressed, "1.50");
        assert_eq!(report.reduction, "50");
        assert!(report.target_met);
    }

    #[test]
    fn report_tracks_target() {
        let report = CompressionReport::new(2_000_000, 1_500_000, Some(1_000_000));
        assert!(!report.target_met);
    }

    #[test]
    fn tiny_files_use_exact_reduction() {
        assert_eq!(reduction_percent(1000, 750), "25");
        assert_eq!(reduction_percent(0, 0), "0");
    }

    /// A one-page PDF showing a noisy RGB image, stored raw or, with
    /// `jpeg_quality`, as DCTDecode.
    fn image_pdf(side: u32) -> Vec<u8> {
        noisy_image_pdf(side, None)
    }

    fn noisy_image_pdf(side: u32, jpeg_quality: Option<u8>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut state: u32 = 7;
        let pixels: Vec<u8> = (0..side * side * 3)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) as u8
            })
            .collect();
        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => side as i64,
            "Height" => side as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        let content = match jpeg_quality {
            Some(quality) => {
                image_dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
                let rgb = RgbImage::from_raw(side, side, pixels).unwrap();
                ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(rgb))
                    .to_jpeg_bytes(quality)
                    .unwrap()
            }
            None => pixels,
        };
        let mut image_stream = Stream::new(image_dict, content);
        image_stream.allows_compression = jpeg_quality.is_none();
        let image_id = doc.add_object(image_stream);
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            format!("q {side} 0 0 {side} 0 0 cm /Im1 Do Q").into_bytes(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), (side as i64).into(), (side as i64).into()],
            "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn structural_compression_keeps_pages() {
        let input = image_pdf(32);
        let outcome = compress(&input, None).unwrap();
        let doc = Document::load_mem(&outcome.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(outcome.report.target_met);
    }

    #[test]
    fn target_drives_image_recompression() {
        let input = image_pdf(256);
        let target = (input.len() / 3) as u64;
        let outcome = compress(&input, Some(target)).unwrap();
        assert!(outcome.report.target_met, "report: {:?}", outcome.report);
        assert!(outcome.bytes.len() as u64 <= target);
    }

    #[test]
    fn existing_jpegs_walk_the_whole_ladder() {
        // Re-encoding a quality-60 JPEG at 85 only grows it, so the target
        // is reached further down the ladder.
        let input = noisy_image_pdf(512, Some(60));
        let target = (input.len() / 4) as u64;
        let outcome = compress(&input, Some(target)).unwrap();
        assert!(outcome.report.target_met, "report: {:?}", outcome.report);
        assert!(outcome.bytes.len() as u64 <= target);
        assert_eq!(
            Document::load_mem(&outcome.bytes).unwrap().get_pages().len(),
            1
        );
    }

    #[test]
    fn documents_without_images_keep_the_structural_result() {
        let input = crate::pdf::testing::sample_pdf(&["only text"]);
        let outcome = compress(&input, Some(1)).unwrap();
        assert!(!outcome.report.target_met);
        assert!(Document::load_mem(&outcome.bytes).is_ok());
    }

    #[test]
    fn invalid_pdf_is_an_error() {
        assert!(compress(b"garbage", None).is_err());
    }
}
