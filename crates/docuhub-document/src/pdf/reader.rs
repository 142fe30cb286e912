// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open existing PDF documents, merge several into one, and
// extract page selections, using the `lopdf` crate.

use std::collections::HashMap;
use std::path::Path;

use docuhub_core::PageSelection;
use docuhub_core::error::{DocuhubError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guard against malformed, cyclic /Parent chains.
const MAX_TREE_DEPTH: usize = 64;

/// Reads and manipulates existing PDF files.
pub struct PdfReader {
    document: Document,
    /// Source path, if opened from a file.
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            DocuhubError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            DocuhubError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract the pages named by a selection such as `"2-3"` or `"1,4-6"`
    /// into a new PDF. Pages come out in ascending order.
    #[instrument(skip(self), fields(page_count = self.page_count()))]
    pub fn split(&self, selection: &str) -> Result<Vec<u8>> {
        let selection = PageSelection::parse(selection, self.page_count())?;
        let pages = selection.pages();
        info!(selected = pages.len(), "Splitting PDF");
        self.extract_pages(&pages)
    }

    /// Copy the given 1-indexed pages, in the given order, into a new PDF.
    pub fn extract_pages(&self, page_numbers: &[u32]) -> Result<Vec<u8>> {
        let pages = self.document.get_pages();
        let (mut target, pages_id) = empty_document();
        let mut copier = PageCopier::new(&self.document);

        for &page_number in page_numbers {
            let page_id = *pages.get(&page_number).ok_or_else(|| {
                DocuhubError::InvalidPageRange(format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    pages.len()
                ))
            })?;
            copier.append_page(&mut target, pages_id, page_id)?;
        }

        let output = serialise(&mut target, "extracted pages")?;
        debug!(
            pages = page_numbers.len(),
            output_bytes = output.len(),
            "Pages extracted"
        );
        Ok(output)
    }
}

/// Concatenate PDFs in the order given.
#[instrument(skip_all, fields(documents = inputs.len()))]
pub fn merge<B: AsRef<[u8]>>(inputs: &[B]) -> Result<Vec<u8>> {
    if inputs.is_empty() {
        return Err(DocuhubError::PdfError("nothing to merge".to_string()));
    }
    info!(documents = inputs.len(), "Merging PDFs");

    let (mut merged, pages_id) = empty_document();
    let mut total_pages = 0usize;

    for (index, bytes) in inputs.iter().enumerate() {
        let source = Document::load_mem(bytes.as_ref()).map_err(|err| {
            DocuhubError::PdfError(format!("failed to load PDF #{}: {}", index + 1, err))
        })?;

        // get_pages is keyed by page number, so iteration is in page order.
        let source_pages = source.get_pages();
        let mut copier = PageCopier::new(&source);
        for page_id in source_pages.values() {
            copier.append_page(&mut merged, pages_id, *page_id)?;
        }
        total_pages += source_pages.len();
    }

    let output = serialise(&mut merged, "merged PDF")?;
    debug!(total_pages, output_bytes = output.len(), "Merge complete");
    Ok(output)
}

/// Serialise a document to bytes.
pub(crate) fn serialise(document: &mut Document, what: &str) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|err| DocuhubError::PdfError(format!("failed to serialise {}: {}", what, err)))?;
    Ok(output)
}

/// A document holding an empty page tree, returning the /Pages id.
fn empty_document() -> (Document, ObjectId) {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(Vec::new()));
    pages.set("Count", Object::Integer(0));
    document.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = document.add_object(catalog);
    document.trailer.set("Root", Object::Reference(catalog_id));

    (document, pages_id)
}

/// Copies pages from one source document into targets.
///
/// Every source object is copied at most once per copier, so objects shared
/// between pages (fonts, images) stay shared and reference cycles terminate.
struct PageCopier<'a> {
    source: &'a Document,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            copied: HashMap::new(),
        }
    }

    /// Copy a page and everything it references, append it to the target's
    /// page tree and materialise inherited attributes on it.
    fn append_page(
        &mut self,
        target: &mut Document,
        pages_id: ObjectId,
        page_id: ObjectId,
    ) -> Result<()> {
        let source_page = self.source.get_dictionary(page_id).map_err(|err| {
            DocuhubError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;
        let inherited = inherited_attributes(self.source, source_page);

        let new_page_id = self.copy_reference(target, page_id);

        let mut materialised = Vec::with_capacity(inherited.len());
        for (key, value) in inherited {
            materialised.push((key, self.copy_object(target, &value)));
        }

        match target.get_object_mut(new_page_id) {
            Ok(Object::Dictionary(page)) => {
                page.set("Parent", Object::Reference(pages_id));
                for (key, value) in materialised {
                    page.set(key.to_vec(), value);
                }
            }
            _ => {
                return Err(DocuhubError::PdfError(format!(
                    "page object {:?} is not a dictionary",
                    page_id
                )));
            }
        }

        let Ok(Object::Dictionary(pages)) = target.get_object_mut(pages_id) else {
            return Err(DocuhubError::PdfError("target has no page tree".to_string()));
        };
        let count = match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => {
                kids.push(Object::Reference(new_page_id));
                kids.len()
            }
            _ => {
                return Err(DocuhubError::PdfError(
                    "target page tree has no /Kids array".to_string(),
                ));
            }
        };
        pages.set("Count", Object::Integer(count as i64));

        Ok(())
    }

    /// Copy the object behind `id` (once) and return its id in the target.
    fn copy_reference(&mut self, target: &mut Document, id: ObjectId) -> ObjectId {
        if let Some(&existing) = self.copied.get(&id) {
            return existing;
        }

        // Reserve the id before descending so cycles resolve to it.
        let new_id = target.new_object_id();
        self.copied.insert(id, new_id);

        let copy = match self.source.get_object(id) {
            Ok(object) => self.copy_object(target, object),
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        };
        target.objects.insert(new_id, copy);
        new_id
    }

    /// Deep-copy an object, following references. /Parent entries are
    /// dropped; the page's own /Parent is re-pointed by the caller.
    fn copy_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(target, item))
                    .collect(),
            ),
            Object::Reference(id) => Object::Reference(self.copy_reference(target, *id)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(target, &stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.copy_object(target, value));
        }
        copy
    }
}

/// Inheritable attributes the page lacks but an ancestor in the page tree
/// defines, nearest ancestor first.
fn inherited_attributes(source: &Document, page: &Dictionary) -> Vec<(&'static [u8], Object)> {
    INHERITABLE_KEYS
        .into_iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| inherited_value(source, page, key).map(|value| (key, value.clone())))
        .collect()
}

/// Look up `key` on a page, falling back to its ancestors in the page tree.
pub(crate) fn inherited_value<'d>(
    source: &'d Document,
    page: &'d Dictionary,
    key: &[u8],
) -> Option<&'d Object> {
    if let Ok(value) = page.get(key) {
        return Some(value);
    }

    let mut node = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = node {
        if depth >= MAX_TREE_DEPTH {
            warn!(?node_id, "page tree too deep, giving up on inheritance");
            return None;
        }
        depth += 1;

        let dict = source.get_dictionary(node_id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        node = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_content, sample_pdf};

    #[test]
    fn split_extracts_selected_pages_in_order() {
        let reader = PdfReader::from_bytes(&sample_pdf(&["P1", "P2", "P3", "P4", "P5"])).unwrap();
        let out = reader.split("2-3").unwrap();

        let result = PdfReader::from_bytes(&out).unwrap();
        assert_eq!(result.page_count(), 2);
        assert!(page_content(&out, 1).contains("(P2)"));
        assert!(page_content(&out, 2).contains("(P3)"));
    }

    #[test]
    fn split_rejects_out_of_range() {
        let reader = PdfReader::from_bytes(&sample_pdf(&["P1", "P2", "P3", "P4", "P5"])).unwrap();
        assert!(matches!(
            reader.split("6"),
            Err(DocuhubError::InvalidPageRange(_))
        ));
    }

    #[test]
    fn copied_pages_carry_inherited_attributes() {
        let reader = PdfReader::from_bytes(&sample_pdf(&["P1", "P2"])).unwrap();
        let out = reader.extract_pages(&[2]).unwrap();

        let doc = Document::load_mem(&out).unwrap();
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }

    #[test]
    fn merge_keeps_input_order() {
        let a = sample_pdf(&["A1"]);
        let b = sample_pdf(&["B1", "B2"]);
        let out = merge(&[&a, &b]).unwrap();

        assert_eq!(PdfReader::from_bytes(&out).unwrap().page_count(), 3);
        assert!(page_content(&out, 1).contains("(A1)"));
        assert!(page_content(&out, 2).contains("(B1)"));
        assert!(page_content(&out, 3).contains("(B2)"));
    }

    #[test]
    fn shared_objects_are_copied_once() {
        let reader = PdfReader::from_bytes(&sample_pdf(&["P1", "P2", "P3"])).unwrap();
        let out = reader.extract_pages(&[1, 2, 3]).unwrap();
        let doc = Document::load_mem(&out).unwrap();

        let fonts = doc
            .objects
            .values()
            .filter(|object| {
                object
                    .as_dict()
                    .map(|dict| dict.has_type(b"Font"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(fonts, 1);
    }

    #[test]
    fn merge_of_nothing_is_an_error() {
        let empty: [&[u8]; 0] = [];
        assert!(merge(&empty).is_err());
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        assert!(matches!(
            PdfReader::from_bytes(b"not a pdf"),
            Err(DocuhubError::PdfError(_))
        ));
    }
}
