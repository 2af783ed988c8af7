//! Copying pages from one document into a brand-new one.
//!
//! Only the objects reachable from the selected pages are carried over, and
//! they are renumbered into the new document. The source page tree is never
//! copied: references to page tree nodes either point at a copied page or
//! become `null`.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::CodecError;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed, cyclic `Parent` chains.
const MAX_TREE_DEPTH: usize = 64;

/// Build a new document holding `pages` (1-based, in the given order) copied from `source`.
pub(crate) fn copy_pages_in_order(source: &Document, pages: &[u32]) -> Result<Document, CodecError> {
    let page_ids = source.get_pages();
    let mut copier = ObjectCopier::new(source, &page_ids);

    let pages_id = copier.target.new_object_id();

    let mut selected = Vec::with_capacity(pages.len());
    for &page in pages {
        let source_id = *page_ids.get(&page).ok_or_else(|| CodecError::Decode {
            message: format!("page {page} is missing from the page tree"),
            source: None,
        })?;
        let target_id = copier.target.new_object_id();
        copier.id_map.insert(source_id, target_id);
        selected.push((source_id, target_id));
    }

    for &(source_id, target_id) in &selected {
        copier.copy_page(source_id, target_id, pages_id)?;
    }
    copier.drain();

    let mut target = copier.target;
    let kids: Vec<Object> = selected
        .iter()
        .map(|&(_, target_id)| Object::Reference(target_id))
        .collect();
    target.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ])),
    );

    let catalog_id = target.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    target.trailer.set("Root", Object::Reference(catalog_id));

    Ok(target)
}

struct ObjectCopier<'a> {
    source: &'a Document,
    target: Document,
    /// Source object id -> id of its copy in `target`
    id_map: HashMap<ObjectId, ObjectId>,
    /// Every `Page` and `Pages` node of the source
    page_tree: HashSet<ObjectId>,
    /// Source objects that have an id in `target` but have not been written yet
    pending: VecDeque<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, page_ids: &BTreeMap<u32, ObjectId>) -> Self {
        let mut page_tree = HashSet::new();
        for &page_id in page_ids.values() {
            page_tree.insert(page_id);
            let mut node = parent_of(source, page_id);
            let mut depth = 0;
            while let Some(id) = node {
                if depth >= MAX_TREE_DEPTH || !page_tree.insert(id) {
                    break;
                }
                node = parent_of(source, id);
                depth += 1;
            }
        }

        Self {
            source,
            target: Document::with_version(source.version.clone()),
            id_map: HashMap::new(),
            page_tree,
            pending: VecDeque::new(),
        }
    }

    fn copy_page(
        &mut self,
        source_id: ObjectId,
        target_id: ObjectId,
        parent: ObjectId,
    ) -> Result<(), CodecError> {
        let source = self.source;
        let original = source
            .get_dictionary(source_id)
            .map_err(|e| CodecError::Decode {
                message: format!("page object {} {} is not a dictionary", source_id.0, source_id.1),
                source: Some(e),
            })?;

        let mut page = Dictionary::new();
        for (key, value) in original.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            let copied = self.copy_object(value);
            page.set(key.clone(), copied);
        }

        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key)
                && let Some(value) = inherited_attribute(source, original, key)
            {
                let copied = self.copy_object(value);
                page.set(key.to_vec(), copied);
            }
        }

        page.set("Parent", Object::Reference(parent));
        self.target
            .objects
            .insert(target_id, Object::Dictionary(page));
        Ok(())
    }

    /// Write out every object discovered while copying, until none remain.
    fn drain(&mut self) {
        let source = self.source;
        while let Some(source_id) = self.pending.pop_front() {
            let target_id = self.id_map[&source_id];
            // Dangling references are legal PDF and read as null
            let copied = match source.get_object(source_id) {
                Ok(object) => self.copy_object(object),
                Err(_) => Object::Null,
            };
            self.target.objects.insert(target_id, copied);
        }
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.map_reference(*id),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            let copied = self.copy_object(value);
            copy.set(key.clone(), copied);
        }
        copy
    }

    fn map_reference(&mut self, id: ObjectId) -> Object {
        if let Some(&target_id) = self.id_map.get(&id) {
            return Object::Reference(target_id);
        }
        if self.page_tree.contains(&id) {
            return Object::Null;
        }
        let target_id = self.target.new_object_id();
        self.id_map.insert(id, target_id);
        self.pending.push_back(id);
        Object::Reference(target_id)
    }
}

fn parent_of(document: &Document, id: ObjectId) -> Option<ObjectId> {
    document
        .get_dictionary(id)
        .ok()?
        .get(b"Parent")
        .and_then(Object::as_reference)
        .ok()
}

/// Look up `key` on the nearest ancestor of `page` that defines it.
fn inherited_attribute<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = node {
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        let dict = document.get_dictionary(id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        node = dict.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    None
}
