//! Deck fixtures built in code, so the tests need no binary files.

#![allow(dead_code)]

use edgequake_deck2notes::{Summary, TopicSummary};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

/// Write a PDF with one page per entry; `None` gives a page with no text.
pub fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    build_pdf(path, pages, None);
}

/// Like [`write_pdf`], but the first page's resources also carry a Type0
/// `Identity-H` font with no `ToUnicode` map, which lopdf cannot decode.
pub fn write_pdf_with_cid_font_on_first_page(path: &Path, pages: &[Option<&str>]) {
    let cid_font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "NotoSansCJK",
        "Encoding" => "Identity-H",
    };
    build_pdf(path, pages, Some(cid_font));
}

fn build_pdf(path: &Path, pages: &[Option<&str>], first_page_font: Option<Dictionary>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    let cid_font_id = first_page_font.map(|font| doc.add_object(font));
    for (i, text) in pages.iter().enumerate() {
        let mut fonts = dictionary! { "F1" => font_id };
        if let (0, Some(id)) = (i, cid_font_id) {
            fonts.set("F2", id);
        }
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            "Resources" => dictionary! { "Font" => fonts },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

/// Write a PPTX whose slides hold the given text shapes, one paragraph each.
///
/// Slide parts are stored in reverse file order so tests also cover the
/// `presentation.xml` ordering.
pub fn write_pptx(path: &Path, slides: &[&[&str]]) {
    let file = std::fs::File::create(path).expect("create pptx");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();

    let n = slides.len();
    let mut sld_ids = String::new();
    let mut rels = String::new();
    for i in 0..n {
        // Presentation slide i lives in part slide{n - i}.xml.
        sld_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + i,
            i + 2
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            i + 2,
            n - i
        ));
    }

    let entries = [
        (
            "[Content_Types].xml".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_string(),
        ),
        (
            "ppt/presentation.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{sld_ids}</p:sldIdLst></p:presentation>"#
            ),
        ),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            ),
        ),
    ];
    for (name, body) in entries {
        zip.start_file(name, options).expect("start entry");
        zip.write_all(body.as_bytes()).expect("write entry");
    }

    for (i, shapes) in slides.iter().enumerate() {
        let shapes_xml: String = shapes
            .iter()
            .map(|text| {
                format!(
                    "<p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>",
                    escape(text)
                )
            })
            .collect();
        let slide = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{shapes_xml}</p:spTree></p:cSld></p:sld>"#
        );
        zip.start_file(format!("ppt/slides/slide{}.xml", n - i), options)
            .expect("start slide");
        zip.write_all(slide.as_bytes()).expect("write slide");
    }
    zip.finish().expect("finish pptx");
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The concept reply used by the mocked pipeline runs.
pub const CONCEPTS_REPLY: &str = r#"{
  "concepts": [
    { "topic": "First Slide", "key_ideas": ["This is the first slide content"] }
  ]
}"#;

/// A complete summary reply matching [`CONCEPTS_REPLY`].
pub const SUMMARY_REPLY: &str = r#"{
  "topics": [
    {
      "topic": "First Slide",
      "summary": "An introduction to the deck.",
      "key_insights": ["The first slide sets the scene"],
      "questions": ["What does the first slide introduce?"],
      "key_terms": ["introduction"]
    }
  ]
}"#;

pub fn sample_summary() -> Summary {
    Summary {
        topics: vec![TopicSummary {
            topic: "Graph Search".into(),
            examples: Some(vec!["BFS on a grid".into()]),
            key_terms: None,
            detailed_explanation: None,
            summary: "Breadth-first and depth-first traversal.".into(),
            key_insights: vec!["BFS finds shortest paths in unweighted graphs".into()],
            questions: vec!["When does DFS beat BFS?".into()],
        }],
    }
}
