//! Shared fixtures: small text PDFs generated with lopdf

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// Build a document with one text line per entry on each page
///
/// Font resources and the MediaBox live on the Pages node, so every page
/// inherits them the way many real-world producers lay out their trees.
pub fn build_pdf(pages: &[&[&str]]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let y = 720 - 16 * i as i64;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![72.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Save a generated document into `dir`
pub fn write_pdf(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_pdf(pages);
    doc.save(&path).expect("Failed to save fixture PDF");
    path
}

/// Six pages: a preface, then three chapters starting on pages 2, 4 and 6
pub const BOOK: &[&[&str]] = &[
    &["Preface", "Thanks for reading"],
    &["Chapter 1 Beginnings", "It was a dark night"],
    &["the story goes on"],
    &["Chapter 2 Middles", "things happen"],
    &["still chapter two"],
    &["Chapter 3 Endings", "the end"],
];

const PLAIN_PAGE: &[&str] = &["just some body text"];

/// `n` pages of plain body text without any headings
pub fn plain_pages(n: usize) -> Vec<&'static [&'static str]> {
    vec![PLAIN_PAGE; n]
}

/// Percent-encode a path segment for request URIs
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
