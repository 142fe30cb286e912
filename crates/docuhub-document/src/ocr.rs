// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-to-text recognition for the OCR tool, using the `ocrs` engine with
// models executed by `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature.
//
// # Models
//
// The engine needs `text-detection.rten` and `text-recognition.rten`. They are
// looked up in `$DOCUHUB_OCR_MODELS`, then `$XDG_CACHE_HOME/ocrs`, then
// `~/.cache/ocrs` (where `ocrs-cli` caches them on first run).
//
// Build `ocrs` and `rten` in release mode; debug builds are very slow.

use std::path::{Path, PathBuf};

use docuhub_core::error::{DocuhubError, Result};
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Directory searched for the model files when none is configured.
pub fn default_model_dir() -> PathBuf {
    model_dir_from(|key| std::env::var(key).ok())
}

fn model_dir_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup("DOCUHUB_OCR_MODELS") {
        PathBuf::from(dir)
    } else if let Some(cache) = lookup("XDG_CACHE_HOME") {
        PathBuf::from(cache).join("ocrs")
    } else if let Some(home) = lookup("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two model files.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    pub detection_model: PathBuf,
    pub recognition_model: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model: dir.join(DETECTION_MODEL),
            recognition_model: dir.join(RECOGNITION_MODEL),
        }
    }

    /// Whether both model files are present.
    pub fn models_present(&self) -> bool {
        self.detection_model.exists() && self.recognition_model.exists()
    }

    fn load(path: &Path, role: &str) -> Result<Model> {
        if !path.exists() {
            return Err(DocuhubError::OcrError(format!(
                "{} model not found at {}; run `ocrs-cli` once to download the models",
                role,
                path.display()
            )));
        }
        Model::load_file(path).map_err(|err| {
            DocuhubError::OcrError(format!(
                "failed to load {} model from {}: {}",
                role,
                path.display(),
                err
            ))
        })
    }
}

/// A loaded recogniser. Loading the models is the expensive part, so keep one
/// engine around for several images.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    #[instrument(skip_all, fields(
        detection = %config.detection_model.display(),
        recognition = %config.recognition_model.display(),
    ))]
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let detection_model = OcrConfig::load(&config.detection_model, "detection")?;
        let recognition_model = OcrConfig::load(&config.recognition_model, "recognition")?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| DocuhubError::OcrError(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }

    /// Recognise all text in `image`, one output line per detected text line.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            DocuhubError::OcrError(format!("unusable image ({}x{}): {}", width, height, err))
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| DocuhubError::OcrError(format!("OCR preprocessing failed: {}", err)))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| DocuhubError::OcrError(format!("OCR recognition failed: {}", err)))?;

        debug!(lines = text.lines().count(), chars = text.len(), "OCR complete");
        Ok(text)
    }

    /// Decode JPEG/PNG bytes and recognise their text.
    pub fn recognize_image_bytes(&self, data: &[u8]) -> Result<String> {
        let image = image::load_from_memory(data)
            .map_err(|err| DocuhubError::ImageError(format!("failed to decode image: {}", err)))?;
        self.recognize_text(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_model_dir_wins() {
        let dir = model_dir_from(|key| match key {
            "DOCUHUB_OCR_MODELS" => Some("/models".to_string()),
            "XDG_CACHE_HOME" => Some("/cache".to_string()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/models"));
    }

    #[test]
    fn cache_dirs_are_fallbacks() {
        let xdg = model_dir_from(|key| (key == "XDG_CACHE_HOME").then(|| "/cache".to_string()));
        assert_eq!(xdg, PathBuf::from("/cache/ocrs"));

        let home = model_dir_from(|key| (key == "HOME").then(|| "/home/u".to_string()));
        assert_eq!(home, PathBuf::from("/home/u/.cache/ocrs"));
    }

    #[test]
    fn missing_models_are_an_ocr_error() {
        let config = OcrConfig::from_dir("/nonexistent/ocr-models");
        assert!(!config.models_present());
        assert!(matches!(OcrEngine::new(&config), Err(DocuhubError::OcrError(_))));
    }
}
