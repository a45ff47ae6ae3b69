//! PPTX (Office Open XML) slide extraction.
//!
//! A `.pptx` is a ZIP archive. Slide order is not the order of the
//! `slideN.xml` files: it is the order of `<p:sldId>` entries in
//! `ppt/presentation.xml`, each pointing at a relationship id that
//! `ppt/_rels/presentation.xml.rels` resolves to a slide part.
//!
//! Each slide part is scanned once with a streaming XML reader:
//! * every `p:sp` carrying a `p:txBody` contributes its text (paragraphs
//!   joined by `\n`, `<a:br/>` as `\n`), in document order;
//! * every `p:pic` contributes an [`ImageDescriptor`] from its `a:off` /
//!   `a:ext` transform.
//!
//! Shapes nested in group shapes are visited like top-level ones.

use crate::types::{DeckFormat, ImageDescriptor, SlideRecord};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Parse every slide of a PPTX archive, in presentation order.
///
/// Errors are plain strings; the caller wraps them with the file path.
pub fn parse_deck<R: Read + Seek>(reader: R) -> Result<Vec<SlideRecord>, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("not a valid ZIP archive: {e}"))?;
    let slide_parts = slide_order(&mut archive)?;
    let slide_count = slide_parts.len();

    slide_parts
        .iter()
        .enumerate()
        .map(|(idx, part)| {
            let xml = read_part(&mut archive, part)?;
            let content = scan_slide(&xml).map_err(|e| format!("{part}: {e}"))?;
            Ok(SlideRecord {
                slide_number: idx + 1,
                text: content.texts.join("\n"),
                images: content.images,
                metadata: BTreeMap::from([
                    ("file_type".to_string(), DeckFormat::Pptx.as_str().to_string()),
                    (DeckFormat::Pptx.count_key().to_string(), slide_count.to_string()),
                ]),
            })
        })
        .collect()
}

/// Count slides without parsing slide content.
pub fn count_slides<R: Read + Seek>(reader: R) -> Result<usize, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("not a valid ZIP archive: {e}"))?;
    Ok(slide_order(&mut archive)?.len())
}

/// Resolve the ordered list of slide part names (e.g. `ppt/slides/slide2.xml`).
fn slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>, String> {
    let presentation = read_part(archive, PRESENTATION_PART)?;
    let rels = read_part(archive, PRESENTATION_RELS)?;
    let targets = relationship_targets(&rels)?;

    let mut reader = Reader::from_str(&presentation);
    let mut parts = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if local_name(e) == b"sldId" => {
                let rel_id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.local_name().as_ref() == b"id" && a.key.prefix().is_some())
                    .map(|a| String::from_utf8_lossy(&a.value).to_string())
                    .ok_or_else(|| "slide entry without a relationship id".to_string())?;
                let target = targets
                    .get(&rel_id)
                    .ok_or_else(|| format!("slide relationship '{rel_id}' is not declared"))?;
                parts.push(resolve_target(target));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("{PRESENTATION_PART}: {e}")),
            _ => {}
        }
    }
    Ok(parts)
}

/// Map relationship `Id` → `Target` from a `.rels` part.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if local_name(e) == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => target = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("{PRESENTATION_RELS}: {e}")),
            _ => {}
        }
    }
    Ok(targets)
}

/// Relationship targets are relative to `ppt/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target.trim_start_matches("./")),
    }
}

#[derive(Debug, Default)]
struct SlideContent {
    texts: Vec<String>,
    images: Vec<ImageDescriptor>,
}

#[derive(Default)]
struct ShapeState {
    has_text_body: bool,
    paragraphs: Vec<String>,
    paragraph: Option<String>,
    in_run_text: bool,
}

fn scan_slide(xml: &str) -> Result<SlideContent, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut content = SlideContent::default();
    let mut shape: Option<ShapeState> = None;
    let mut picture: Option<ImageDescriptor> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match local_name(e) {
                b"sp" => shape = Some(ShapeState::default()),
                b"pic" => picture = Some(ImageDescriptor::default()),
                b"txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.has_text_body = true;
                    }
                }
                b"p" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.has_text_body) {
                        s.paragraph = Some(String::new());
                    }
                }
                b"t" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.paragraph.is_some()) {
                        s.in_run_text = true;
                    }
                }
                b"br" => push_line_break(shape.as_mut()),
                b"off" | b"ext" => apply_transform(picture.as_mut(), e),
                _ => {}
            },
            Event::Empty(ref e) => match local_name(e) {
                b"p" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.has_text_body) {
                        s.paragraphs.push(String::new());
                    }
                }
                b"br" => push_line_break(shape.as_mut()),
                b"off" | b"ext" => apply_transform(picture.as_mut(), e),
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some(s) = shape.as_mut().filter(|s| s.in_run_text) {
                    let text = t.unescape()?;
                    if let Some(p) = s.paragraph.as_mut() {
                        p.push_str(&text);
                    }
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => {
                    if let Some(s) = shape.as_mut() {
                        s.in_run_text = false;
                    }
                }
                b"p" => {
                    if let Some(s) = shape.as_mut() {
                        if let Some(p) = s.paragraph.take() {
                            s.paragraphs.push(p);
                        }
                    }
                }
                b"sp" => {
                    if let Some(s) = shape.take().filter(|s| s.has_text_body) {
                        content.texts.push(s.paragraphs.join("\n"));
                    }
                }
                b"pic" => {
                    if let Some(img) = picture.take() {
                        content.images.push(img);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(content)
}

fn push_line_break(shape: Option<&mut ShapeState>) {
    if let Some(p) = shape.and_then(|s| s.paragraph.as_mut()) {
        p.push('\n');
    }
}

/// Copy `x`/`y` (from `a:off`) or `cx`/`cy` (from `a:ext`) into the picture box.
///
/// `a:ext` also appears inside `a:extLst` with only a `uri`; such elements
/// carry none of these attributes and leave the box untouched.
fn apply_transform(picture: Option<&mut ImageDescriptor>, e: &BytesStart<'_>) {
    let Some(img) = picture else { return };
    for attr in e.attributes().flatten() {
        let Ok(value) = String::from_utf8_lossy(&attr.value).parse::<i64>() else {
            continue;
        };
        match attr.key.as_ref() {
            b"x" => img.left = value,
            b"y" => img.top = value,
            b"cx" => img.width = value,
            b"cy" => img.height = value,
            _ => {}
        }
    }
}

fn local_name<'a>(e: &'a BytesStart<'a>) -> &'a [u8] {
    let name = e.name().into_inner();
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| format!("missing part '{name}': {e}"))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| format!("failed to read '{name}': {e}"))?;
    Ok(content)
}
