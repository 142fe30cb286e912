// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, downscale and re-encode images using the `image`
// crate. Backs PDF image recompression and the storage down-compression of
// uploaded images.

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument, warn};

use docuhub_core::error::{DocuhubError, Result};

/// Longest side allowed for images kept in transient storage.
pub const STORAGE_MAX_DIMENSION: u32 = 2048;

/// First JPEG quality tried by storage down-compression.
const STORAGE_START_QUALITY: u8 = 90;
const STORAGE_QUALITY_STEP: u8 = 10;
const STORAGE_MIN_QUALITY: u8 = 10;

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so they
/// chain:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&png)?
///     .fit_within(2048)
///     .to_jpeg_bytes(80)?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| DocuhubError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize the image to fit within `max_width` x `max_height`, preserving
    /// aspect ratio. Uses Lanczos3 filtering for high-quality downscaling.
    #[instrument(skip(self), fields(max_width, max_height))]
    pub fn resize(self, max_width: u32, max_height: u32) -> Self {
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            max_width,
            max_height,
            "Resizing image"
        );
        let resized = self
            .image
            .resize(max_width, max_height, image::imageops::FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Resize complete"
        );
        Self { image: resized }
    }

    /// Shrink so the longest side is at most `max_side`. Never upscales.
    pub fn fit_within(self, max_side: u32) -> Self {
        if self.image.width() <= max_side && self.image.height() <= max_side {
            return self;
        }
        self.resize(max_side, max_side)
    }

    /// Scale both sides by `factor` (0 < factor <= 1), keeping at least 1 px.
    pub fn scale(self, factor: f32) -> Self {
        if factor >= 1.0 {
            return self;
        }
        let width = ((self.image.width() as f32 * factor).round() as u32).max(1);
        let height = ((self.image.height() as f32 * factor).round() as u32).max(1);
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| DocuhubError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    /// Grey images stay single-channel.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        let result = match &self.image {
            DynamicImage::ImageLuma8(gray) => gray.write_with_encoder(encoder),
            other => other.to_rgb8().write_with_encoder(encoder),
        };
        result.map_err(|err| DocuhubError::ImageError(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Shrink an uploaded image for transient storage.
///
/// Images already within `cap_bytes` are returned untouched. Larger ones are
/// scaled so the longest side is at most 2048 px, then JPEG-encoded starting
/// at quality 90 and stepping down by 10 while the result is still over the
/// cap and quality stays above 10.
#[instrument(skip(data), fields(data_len = data.len(), cap_bytes))]
pub fn compress_for_storage(data: &[u8], cap_bytes: u64) -> Result<Vec<u8>> {
    if data.len() as u64 <= cap_bytes {
        return Ok(data.to_vec());
    }

    let processor = ImageProcessor::from_bytes(data)?.fit_within(STORAGE_MAX_DIMENSION);

    let mut quality = STORAGE_START_QUALITY;
    let mut encoded = processor.to_jpeg_bytes(quality)?;
    while encoded.len() as u64 > cap_bytes && quality > STORAGE_MIN_QUALITY {
        quality -= STORAGE_QUALITY_STEP;
        encoded = processor.to_jpeg_bytes(quality)?;
    }

    if encoded.len() as u64 > cap_bytes {
        warn!(
            size = encoded.len(),
            cap_bytes, "image still above storage cap at lowest quality"
        );
    }
    info!(
        from = data.len(),
        to = encoded.len(),
        quality,
        "Image down-compressed for storage"
    );
    Ok(encoded)
}
