// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page stamping — text watermarks and page numbers drawn on top of existing
// page content with lopdf. The original content is wrapped in q/Q so its
// graphics state cannot leak into the stamp.

use docuhub_core::error::{DocuhubError, Result};
use docuhub_core::stamp::{NumberPosition, PageNumberSettings, WatermarkSettings};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info, instrument};

use crate::layout::{StandardFontMetrics, TextMeasure};
use crate::pdf::reader::{inherited_value, serialise};

/// Resource name of the stamp font, unlikely to clash with existing fonts.
const STAMP_FONT: &str = "DhStampF1";

/// Used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 595.0, 842.0];

/// Draw `settings.text` across the centre of every page.
#[instrument(skip(data, settings), fields(data_len = data.len(), text = %settings.text))]
pub fn add_watermark(data: &[u8], settings: &WatermarkSettings) -> Result<Vec<u8>> {
    if settings.text.trim().is_empty() {
        return Err(DocuhubError::PdfError(
            "watermark text must not be empty".to_string(),
        ));
    }
    let encoded = win_ansi_bytes(&settings.text)?;
    let metrics = StandardFontMetrics::helvetica(settings.font_size);
    let text_width = metrics.measure(&settings.text);
    let (sin, cos) = settings.rotation_degrees.to_radians().sin_cos();

    stamp_pages(data, |_, _, [llx, lly, urx, ury]| {
        let (cx, cy) = ((llx + urx) / 2.0, (lly + ury) / 2.0);
        // Offset from the text origin to the text centre, rotated.
        let (dx, dy) = (text_width / 2.0, settings.font_size / 3.0);
        let tx = cx - (dx * cos - dy * sin);
        let ty = cy - (dx * sin + dy * cos);

        Ok(text_operations(
            encoded.clone(),
            settings.font_size,
            settings.gray,
            [cos, sin, -sin, cos, tx, ty],
        ))
    })
}

/// Stamp a page label such as "3 / 10" on every page.
#[instrument(skip(data, settings), fields(data_len = data.len(), format = %settings.format))]
pub fn add_page_numbers(data: &[u8], settings: &PageNumberSettings) -> Result<Vec<u8>> {
    win_ansi_bytes(&settings.format)?;
    let metrics = StandardFontMetrics::helvetica(settings.font_size);

    stamp_pages(data, |index, total, [llx, lly, urx, ury]| {
        let label = settings.label(index, total);
        let width = metrics.measure(&label);
        let margin = settings.margin;

        let x = match settings.position {
            NumberPosition::BottomLeft | NumberPosition::TopLeft => llx + margin,
            NumberPosition::BottomCenter | NumberPosition::TopCenter => {
                (llx + urx) / 2.0 - width / 2.0
            }
            NumberPosition::BottomRight | NumberPosition::TopRight => urx - margin - width,
        };
        let y = match settings.position {
            NumberPosition::BottomLeft | NumberPosition::BottomCenter | NumberPosition::BottomRight => {
                lly + margin
            }
            NumberPosition::TopLeft | NumberPosition::TopCenter | NumberPosition::TopRight => {
                ury - margin - settings.font_size
            }
        };

        Ok(text_operations(
            win_ansi_bytes(&label)?,
            settings.font_size,
            0.0,
            [1.0, 0.0, 0.0, 1.0, x, y],
        ))
    })
}

/// Encode `text` for the WinAnsiEncoding stamp font. Characters the
/// encoding has no code for are rejected rather than drawn as garbage.
fn win_ansi_bytes(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|ch| {
            win_ansi_code(ch).ok_or_else(|| {
                DocuhubError::PdfError(format!(
                    "'{ch}' (U+{:04X}) cannot be drawn with the standard PDF fonts",
                    ch as u32
                ))
            })
        })
        .collect()
}

fn win_ansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Show one WinAnsi-encoded string with the stamp font at the given text
/// matrix.
fn text_operations(text: Vec<u8>, font_size: f32, gray: f32, matrix: [f32; 6]) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(STAMP_FONT.as_bytes().to_vec()), font_size.into()],
        ),
        Operation::new("g", vec![gray.clamp(0.0, 1.0).into()]),
        Operation::new("Tm", matrix.iter().map(|value| (*value).into()).collect()),
        Operation::new("Tj", vec![Object::String(text, StringFormat::Literal)]),
        Operation::new("ET", vec![]),
    ]
}

/// Append the operations produced by `draw(index, total, media_box)` to every
/// page and return the re-serialised document.
fn stamp_pages<F>(data: &[u8], mut draw: F) -> Result<Vec<u8>>
where
    F: FnMut(usize, usize, [f32; 4]) -> Result<Vec<Operation>>,
{
    let mut document = Document::load_mem(data)
        .map_err(|err| DocuhubError::PdfError(format!("failed to load PDF: {}", err)))?;

    let font_id = document.add_object(helvetica_font());
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    let total = page_ids.len();
    info!(pages = total, "Stamping pages");

    for (index, page_id) in page_ids.into_iter().enumerate() {
        let media_box = media_box(&document, page_id);
        let operations = draw(index, total, media_box)?;
        add_font_resource(&mut document, page_id, font_id)?;
        append_content(&mut document, page_id, operations)?;
    }

    let output = serialise(&mut document, "stamped PDF")?;
    debug!(output_bytes = output.len(), "Stamping complete");
    Ok(output)
}

fn helvetica_font() -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}

/// The page's effective MediaBox as `[llx, lly, urx, ury]`.
fn media_box(document: &Document, page_id: ObjectId) -> [f32; 4] {
    let Ok(page) = document.get_dictionary(page_id) else {
        return DEFAULT_MEDIA_BOX;
    };
    let Some(object) = inherited_value(document, page, b"MediaBox") else {
        return DEFAULT_MEDIA_BOX;
    };
    let array = match object {
        Object::Reference(id) => document.get_object(*id).and_then(Object::as_array),
        other => other.as_array(),
    };
    let Ok(array) = array else {
        return DEFAULT_MEDIA_BOX;
    };

    let values: Vec<f32> = array
        .iter()
        .filter_map(|value| value.as_float().ok())
        .collect();
    match values.as_slice() {
        [a, b, c, d] => [a.min(*c), b.min(*d), a.max(*c), b.max(*d)],
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// Give the page a direct /Resources dictionary (copied from whatever it
/// inherited) whose /Font entry includes the stamp font.
fn add_font_resource(document: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = {
        let page = document.get_dictionary(page_id).map_err(|err| {
            DocuhubError::PdfError(format!("cannot read page {:?}: {}", page_id, err))
        })?;
        match inherited_value(document, page, b"Resources") {
            Some(Object::Dictionary(dict)) => dict.clone(),
            Some(Object::Reference(id)) => document
                .get_dictionary(*id)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        }
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => document
            .get_dictionary(*id)
            .cloned()
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };
    fonts.set(STAMP_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = document.get_dictionary_mut(page_id).map_err(|err| {
        DocuhubError::PdfError(format!("cannot update page {:?}: {}", page_id, err))
    })?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Wrap the existing content in q/Q and append `operations` after it.
fn append_content(
    document: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<()> {
    let stamp = Content { operations }
        .encode()
        .map_err(|err| DocuhubError::PdfError(format!("failed to encode stamp: {}", err)))?;

    let existing: Vec<Object> = {
        let page = document.get_dictionary(page_id).map_err(|err| {
            DocuhubError::PdfError(format!("cannot read page {:?}: {}", page_id, err))
        })?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match document.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    let save_state = document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let mut trailer = b"\nQ\n".to_vec();
    trailer.extend_from_slice(&stamp);
    let stamp_id = document.add_object(Stream::new(Dictionary::new(), trailer));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_state));
    contents.extend(existing);
    contents.push(Object::Reference(stamp_id));

    let page = document.get_dictionary_mut(page_id).map_err(|err| {
        DocuhubError::PdfError(format!("cannot update page {:?}: {}", page_id, err))
    })?;
    page.set("Contents", Object::Array(contents));
    Ok(())
}
