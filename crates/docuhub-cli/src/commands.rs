// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One function per subcommand. Each validates and loads its input through
// the service layer, runs the tool, writes the output and closes the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use docuhub_core::stamp::{PageNumberSettings, WatermarkSettings};
use docuhub_core::types::{DocumentType, ToolId, parse_size_target};
use docuhub_document::pdf::metadata::{FileMetadata, inspect, modified_time};
use docuhub_document::{
    DocumentConverter, PdfReader, add_page_numbers, add_watermark, compress, merge, protect,
};
use tracing::info;

use crate::services::{AppServices, display_name, write_output};

pub fn merge_cmd(services: &mut AppServices, inputs: &[PathBuf], output: &Path) -> Result<()> {
    let tool = ToolId::PdfMerge;
    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        documents.push(services.load_input(tool, input)?.data);
    }

    let merged = merge(&documents)?;
    write_output(output, &merged)?;
    services.complete(tool, output)?;
    println!("Merged {} files into {}", inputs.len(), output.display());
    Ok(())
}

pub fn split_cmd(services: &mut AppServices, input: &Path, pages: &str, output: &Path) -> Result<()> {
    let tool = ToolId::PdfSplit;
    let file = services.load_input(tool, input)?;

    let reader = PdfReader::from_bytes(&file.data)?;
    let bytes = reader.split(pages)?;
    write_output(output, &bytes)?;
    services.complete(tool, output)?;
    println!("Wrote pages {} to {}", pages, output.display());
    Ok(())
}

pub fn compress_cmd(
    services: &mut AppServices,
    input: &Path,
    target: Option<&str>,
    output: &Path,
) -> Result<()> {
    let tool = ToolId::PdfCompress;
    let target_bytes = match target {
        Some(raw) => {
            let Some(bytes) = parse_size_target(raw) else {
                bail!("invalid target size '{raw}' (try '1MB' or '500KB')");
            };
            services.prefs().set_target_size(raw)?;
            Some(bytes)
        }
        None => services
            .prefs()
            .target_size()?
            .as_deref()
            .and_then(parse_size_target),
    };

    let file = services.load_input(tool, input)?;
    let outcome = compress(&file.data, target_bytes)?;
    write_output(output, &outcome.bytes)?;
    services.complete(tool, output)?;

    let report = outcome.report;
    println!(
        "{} MB -> {} MB ({}% smaller)",
        report.original, report.compressed, report.reduction
    );
    if !report.target_met {
        println!("Target size not reached; this is the smallest version produced.");
    }
    Ok(())
}

#[cfg(feature = "render")]
pub fn redact_cmd(
    services: &mut AppServices,
    input: &Path,
    rects: &[crate::cli::RectArg],
    erase: &[crate::cli::PointArg],
    scale: Option<f32>,
    output: &Path,
) -> Result<()> {
    use docuhub_document::redact::{
        PageRasterizer, PdfiumRasterizer, Point, Rectangle, RedactionSet, bind_pdfium,
        redact_document,
    };

    let tool = ToolId::PdfRedact;
    let scale = scale.unwrap_or(services.config().redaction_scale);
    if scale <= 0.0 {
        bail!("scale must be positive");
    }
    let file = services.load_input(tool, input)?;

    let pdfium = bind_pdfium()?;
    let rasterizer = PdfiumRasterizer::load(&pdfium, &file.data)?;
    let page_count = rasterizer.page_count();

    let mut redactions = RedactionSet::new();
    for rect in rects {
        if rect.page > page_count {
            tracing::warn!(page = rect.page, page_count, "ignoring rectangle past the last page");
            continue;
        }
        redactions.add(
            rect.page,
            Rectangle::new(
                rect.x * scale,
                rect.y * scale,
                rect.width * scale,
                rect.height * scale,
            ),
        );
    }

    let padding = services.config().erase_padding;
    for point in erase {
        let removed =
            redactions.erase_at(point.page, Point::new(point.x * scale, point.y * scale), padding);
        tracing::debug!(page = point.page, removed, "erase applied");
    }

    let bytes = redact_document(&rasterizer, &redactions, scale)?;
    write_output(output, &bytes)?;
    services.complete(tool, output)?;
    println!(
        "Redacted {} region(s) across {} page(s) into {}",
        redactions.total(),
        page_count,
        output.display()
    );
    Ok(())
}

pub fn protect_cmd(
    services: &mut AppServices,
    input: &Path,
    user_password: &str,
    owner_password: Option<&str>,
    output: &Path,
) -> Result<()> {
    let tool = ToolId::PdfProtect;
    let file = services.load_input(tool, input)?;

    let bytes = protect(&file.data, user_password, owner_password)?;
    write_output(output, &bytes)?;
    services.complete(tool, output)?;
    println!("Protected PDF written to {}", output.display());
    Ok(())
}

pub struct WatermarkOverrides {
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub gray: Option<f32>,
    pub rotation: Option<f32>,
}

impl WatermarkOverrides {
    fn apply(self, mut settings: WatermarkSettings) -> WatermarkSettings {
        if let Some(text) = self.text {
            settings.text = text;
        }
        if let Some(size) = self.font_size {
            settings.font_size = size;
        }
        if let Some(gray) = self.gray {
            settings.gray = gray.clamp(0.0, 1.0);
        }
        if let Some(rotation) = self.rotation {
            settings.rotation_degrees = rotation;
        }
        settings
    }
}

pub fn watermark_cmd(
    services: &mut AppServices,
    input: &Path,
    overrides: WatermarkOverrides,
    output: &Path,
) -> Result<()> {
    let tool = ToolId::PdfWatermark;
    let settings = overrides.apply(services.prefs().watermark_settings()?);
    let file = services.load_input(tool, input)?;

    let bytes = add_watermark(&file.data, &settings)?;
    services.prefs().set_watermark_settings(&settings)?;
    write_output(output, &bytes)?;
    services.complete(tool, output)?;
    println!("Watermarked \"{}\" into {}", settings.text, output.display());
    Ok(())
}

pub fn page_numbers_cmd(
    services: &mut AppServices,
    input: &Path,
    format: Option<String>,
    position: Option<crate::cli::PositionArg>,
    start_at: Option<u32>,
    output: &Path,
) -> Result<()> {
    let tool = ToolId::PdfPageNumbers;
    let mut settings: PageNumberSettings = services.prefs().page_number_settings()?;
    if let Some(format) = format {
        settings.format = format;
    }
    if let Some(position) = position {
        settings.position = position.into();
    }
    if let Some(start_at) = start_at {
        settings.start_at = start_at;
    }
    let file = services.load_input(tool, input)?;

    let bytes = add_page_numbers(&file.data, &settings)?;
    services.prefs().set_page_number_settings(&settings)?;
    write_output(output, &bytes)?;
    services.complete(tool, output)?;
    println!("Numbered pages written to {}", output.display());
    Ok(())
}

/// Tool that converts a file of this name to PDF.
fn conversion_tool(input: &Path) -> ToolId {
    match DocumentType::from_file_name(&display_name(input)) {
        DocumentType::Jpeg => ToolId::JpegToPdf,
        DocumentType::Png => ToolId::PngToPdf,
        _ => ToolId::DocumentToPdf,
    }
}

pub fn to_pdf_cmd(services: &mut AppServices, input: &Path, output: Option<&Path>) -> Result<()> {
    let tool = conversion_tool(input);
    let file = services.load_input(tool, input)?;

    let converter = DocumentConverter::new(services.config().text_layout.clone());
    let converted = converter.to_pdf(&file.meta.name, &file.data)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_file_name(&converted.file_name));

    write_output(&output, &converted.bytes)?;
    services.complete(tool, &output)?;
    println!("Converted {} to {}", file.meta.name, output.display());
    Ok(())
}

pub fn metadata_cmd(services: &mut AppServices, input: &Path, json: bool) -> Result<()> {
    let tool = ToolId::MetadataViewer;
    let modified = modified_time(input);
    let file = services.load_input(tool, input)?;

    let metadata = inspect(&file.meta.name, &file.data, modified);
    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        print_metadata(&metadata);
    }
    services.complete(tool, input)?;
    Ok(())
}

fn print_metadata(metadata: &FileMetadata) {
    println!("Name:          {}", metadata.name);
    println!("Type:          {}", metadata.mime_type);
    println!("Size:          {} ({} bytes)", metadata.human_size, metadata.size);
    if let Some(modified) = metadata.last_modified {
        println!("Last modified: {}", modified.to_rfc3339());
    }
    if let Some(pdf) = &metadata.pdf {
        println!("PDF version:   {}", pdf.version);
        println!("Pages:         {}", pdf.page_count);
        println!("Encrypted:     {}", if pdf.encrypted { "yes" } else { "no" });
        for (key, value) in &pdf.info {
            println!("{:<15}{}", format!("{key}:"), value);
        }
    }
}

#[cfg(feature = "ocr")]
pub fn ocr_cmd(
    services: &mut AppServices,
    input: &Path,
    models: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    use docuhub_document::compress_for_storage;
    use docuhub_document::ocr::{OcrConfig, OcrEngine};

    let tool = ToolId::Ocr;
    let file = services.load_input(tool, input)?;
    let image = compress_for_storage(&file.data, services.config().storage_cap_bytes)?;

    let config = models.map(OcrConfig::from_dir).unwrap_or_default();
    let engine = OcrEngine::new(&config)?;
    let text = engine.recognize_image_bytes(&image)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("txt"));
    write_output(&output, text.as_bytes())?;
    services.complete(tool, &output)?;
    println!("Recognised {} line(s) into {}", text.lines().count(), output.display());
    Ok(())
}

pub fn recent_cmd(services: &AppServices, remove: Option<usize>, deleted: bool) -> Result<()> {
    let prefs = services.prefs();

    if let Some(position) = remove {
        let index = position
            .checked_sub(1)
            .context("positions start at 1")?;
        match prefs.delete_recent_file(index)? {
            Some(file) => println!("Removed {} from recent files", file.name),
            None => bail!("no recent file at position {position}"),
        }
        return Ok(());
    }

    if deleted {
        let files = prefs.deleted_files()?;
        if files.is_empty() {
            println!("No recently deleted files.");
        }
        for file in files {
            println!(
                "{}  ({}, removed {})",
                file.name,
                file.tool.title(),
                file.deleted_time.format("%Y-%m-%d %H:%M")
            );
        }
        return Ok(());
    }

    let files = prefs.recent_files()?;
    if files.is_empty() {
        println!("No recent files.");
    }
    for (index, file) in files.iter().enumerate() {
        println!(
            "{}. {}  ({}, {})",
            index + 1,
            file.name,
            file.tool.title(),
            file.time.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub fn tools_cmd(services: &AppServices) -> Result<()> {
    let prefs = services.prefs();
    let counts = prefs.usage_counts()?;
    let last = prefs.last_tool()?;

    for tool in ToolId::ALL {
        let marker = if last == Some(tool) { "*" } else { " " };
        let uses = counts.get(tool.as_str()).copied().unwrap_or(0);
        println!(
            "{marker} {:<18} {:<22} {:>4} use(s)  {}",
            tool.as_str(),
            tool.title(),
            uses,
            tool.description()
        );
    }
    let recent = prefs.recent_tools()?;
    if !recent.is_empty() {
        let names: Vec<&str> = recent.iter().map(ToolId::as_str).collect();
        info!(recent = ?names, "recent tools");
        println!("\nRecently used: {}", names.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_tool_follows_extension() {
        assert_eq!(conversion_tool(Path::new("a/photo.JPG")), ToolId::JpegToPdf);
        assert_eq!(conversion_tool(Path::new("scan.png")), ToolId::PngToPdf);
        assert_eq!(conversion_tool(Path::new("notes.docx")), ToolId::DocumentToPdf);
    }

    #[test]
    fn watermark_overrides_keep_unset_fields() {
        let settings = WatermarkOverrides {
            text: Some("DRAFT".into()),
            font_size: None,
            gray: Some(3.0),
            rotation: None,
        }
        .apply(WatermarkSettings::default());
        assert_eq!(settings.text, "DRAFT");
        assert_eq!(settings.font_size, 48.0);
        assert_eq!(settings.gray, 1.0);
        assert_eq!(settings.rotation_degrees, 45.0);
    }
}
