//! In-memory PDF fixtures shared by unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Build a PDF whose page `n` draws the text `"Page n"`.
pub(crate) fn build_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_ids = add_pages(&mut doc, pages_id, num_pages, true);
    finish(&mut doc, pages_id, &page_ids, Dictionary::new())
}

/// Like [`build_pdf`] but `MediaBox` and `Resources` live only on the page tree root.
pub(crate) fn build_pdf_with_inherited_attributes(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_ids = add_pages(&mut doc, pages_id, num_pages, false);

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]);
    let inherited = Dictionary::from_iter(vec![
        ("MediaBox", media_box(300, 400)),
        ("Resources", Object::Dictionary(resources)),
        ("Rotate", Object::Integer(90)),
    ]);
    finish(&mut doc, pages_id, &page_ids, inherited)
}

/// Build a PDF where page 1 carries a link annotation pointing at page `target`.
pub(crate) fn build_pdf_with_link(num_pages: u32, target: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_ids = add_pages(&mut doc, pages_id, num_pages, true);

    let link_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Link".to_vec())),
        ("Rect", media_box(10, 10)),
        (
            "Dest",
            Object::Array(vec![
                Object::Reference(page_ids[target as usize - 1]),
                Object::Name(b"Fit".to_vec()),
            ]),
        ),
    ]));
    if let Ok(Object::Dictionary(first)) = doc.get_object_mut(page_ids[0]) {
        first.set("Annots", Object::Array(vec![Object::Reference(link_id)]));
    }
    finish(&mut doc, pages_id, &page_ids, Dictionary::new())
}

/// Text label of every page, in page order.
pub(crate) fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| page_label(&doc, page_id))
        .collect()
}

pub(crate) fn page_label(doc: &Document, page_id: ObjectId) -> String {
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .find(|op| op.operator == "Tj")
        .and_then(|op| op.operands.first())
        .and_then(|operand| operand.as_str().ok())
        .map(|text| String::from_utf8_lossy(text).into_owned())
        .unwrap_or_default()
}

fn add_pages(doc: &mut Document, pages_id: ObjectId, num_pages: u32, own_box: bool) -> Vec<ObjectId> {
    (1..=num_pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {n}").into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let mut page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            if own_box {
                page.set("MediaBox", media_box(612, 792));
            }
            doc.add_object(page)
        })
        .collect()
}

fn finish(
    doc: &mut Document,
    pages_id: ObjectId,
    page_ids: &[ObjectId],
    mut pages: Dictionary,
) -> Vec<u8> {
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set(
        "Kids",
        Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn media_box(width: i64, height: i64) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(height),
    ])
}
