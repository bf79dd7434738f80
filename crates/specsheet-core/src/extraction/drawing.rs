//! Embedded pictures from the OOXML package.
//!
//! calamine does not expose drawings, so the package is opened a second time
//! with `zip` and walked by relationship:
//! workbook -> worksheet -> drawing -> media.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::classify::ImageCategory;
use crate::extraction::{image_id, media};
use crate::model::{CellAnchor, ExtractedImage};
use crate::warnings::Warnings;

/// Default column width in EMU (8.43 characters, 64 px).
pub const DEFAULT_COL_WIDTH_EMU: i64 = 609_600;
/// Default row height in EMU (15 pt, 20 px).
pub const DEFAULT_ROW_HEIGHT_EMU: i64 = 190_500;

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Position of a picture as the drawing part records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorPos {
    /// `twoCellAnchor` / `oneCellAnchor`: top-left cell plus EMU offset into it.
    Cell {
        col: u32,
        col_off: i64,
        row: u32,
        row_off: i64,
    },
    /// `absoluteAnchor`: EMU distance from the sheet origin.
    Absolute { x: i64, y: i64 },
}

impl AnchorPos {
    /// The cell the picture visually sits in.
    ///
    /// An offset past the middle of its cell moves the anchor to the next
    /// cell. Absolute positions are mapped to the nearest cell using the
    /// default column width and row height.
    pub fn resolve(&self) -> CellAnchor {
        match *self {
            AnchorPos::Cell {
                col,
                col_off,
                row,
                row_off,
            } => CellAnchor {
                col: col + u32::from(col_off > DEFAULT_COL_WIDTH_EMU / 2),
                row: row + u32::from(row_off > DEFAULT_ROW_HEIGHT_EMU / 2),
            },
            AnchorPos::Absolute { x, y } => CellAnchor {
                col: nearest_cell(x, DEFAULT_COL_WIDTH_EMU),
                row: nearest_cell(y, DEFAULT_ROW_HEIGHT_EMU),
            },
        }
    }
}

fn nearest_cell(emu: i64, size: i64) -> u32 {
    let index = emu.max(0) / size + i64::from(emu.max(0) % size > size / 2);
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// A picture element found in a drawing part.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPicture {
    pub anchor: AnchorPos,
    pub embed: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
    external: bool,
}

/// Extract every embedded picture, in sheet order then drawing order.
pub(crate) fn extract_images(bytes: &[u8], warnings: &mut Warnings) -> Vec<ExtractedImage> {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(a) => a,
        Err(e) => {
            warnings.warn(None, format!("images skipped, package unreadable: {e}"));
            return Vec::new();
        }
    };

    let Some(workbook_xml) = read_text(&mut archive, "xl/workbook.xml") else {
        return Vec::new();
    };
    let workbook_rels = read_text(&mut archive, "xl/_rels/workbook.xml.rels")
        .map(|xml| parse_relationships(&xml))
        .unwrap_or_default();

    let mut images = Vec::new();
    for (sheet_name, rel_id) in parse_workbook_sheets(&workbook_xml) {
        let Some(rel) = workbook_rels.iter().find(|r| r.id == rel_id) else {
            continue;
        };
        let sheet_part = resolve_target("xl", &rel.target);
        images.extend(sheet_images(&mut archive, &sheet_name, &sheet_part, warnings));
    }
    images
}

fn sheet_images(
    archive: &mut Archive<'_>,
    sheet_name: &str,
    sheet_part: &str,
    warnings: &mut Warnings,
) -> Vec<ExtractedImage> {
    let Some(sheet_rels) = read_text(archive, &rels_path(sheet_part)) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for drawing in parse_relationships(&sheet_rels)
        .into_iter()
        .filter(|r| r.kind.ends_with("/drawing") && !r.external)
    {
        let drawing_part = resolve_target(parent_dir(sheet_part), &drawing.target);
        let Some(drawing_xml) = read_text(archive, &drawing_part) else {
            warnings.warn(Some(sheet_name), format!("drawing part {drawing_part} is missing"));
            continue;
        };
        let pictures = parse_drawing(&drawing_xml);
        if pictures.is_empty() {
            continue;
        }
        let drawing_rels = read_text(archive, &rels_path(&drawing_part))
            .map(|xml| parse_relationships(&xml))
            .unwrap_or_default();

        for picture in pictures {
            if let Some(image) =
                load_picture(archive, sheet_name, &drawing_part, &drawing_rels, picture, warnings)
            {
                images.push(image);
            }
        }
    }
    images
}

fn load_picture(
    archive: &mut Archive<'_>,
    sheet_name: &str,
    drawing_part: &str,
    drawing_rels: &[Relationship],
    picture: DrawingPicture,
    warnings: &mut Warnings,
) -> Option<ExtractedImage> {
    let anchor = picture.anchor.resolve();
    let cell = anchor.to_a1();

    let Some(rel) = drawing_rels.iter().find(|r| r.id == picture.embed) else {
        warnings.warn(
            Some(sheet_name),
            format!("image at {cell} skipped: relationship {} not found", picture.embed),
        );
        return None;
    };
    if rel.external {
        tracing::debug!(sheet = sheet_name, %cell, target = %rel.target, "linked image not embedded");
        return None;
    }

    let media_part = resolve_target(parent_dir(drawing_part), &rel.target);
    let content = match read_part(archive, &media_part) {
        Ok(bytes) => bytes,
        Err(e) => {
            warnings.warn(Some(sheet_name), format!("image at {cell} skipped: {e}"));
            return None;
        }
    };
    let info = match media::inspect(&content, &media_part) {
        Ok(info) => info,
        Err(e) => {
            warnings.warn(Some(sheet_name), format!("image at {cell} skipped: {e}"));
            return None;
        }
    };

    let file_name = media_part
        .rsplit('/')
        .next()
        .unwrap_or(media_part.as_str())
        .to_string();
    tracing::debug!(sheet = sheet_name, %cell, file = %file_name, "extracted image");

    Some(ExtractedImage {
        id: image_id(sheet_name, &cell, &content),
        sheet_name: sheet_name.to_string(),
        cell_reference: cell,
        file_name,
        name: picture.name,
        description: picture.description,
        mime_type: info.mime_type,
        width: info.width,
        height: info.height,
        file_size: content.len(),
        category: ImageCategory::Other,
        context: None,
        storage_ref: None,
        anchor,
        content,
    })
}

fn read_part(archive: &mut Archive<'_>, path: &str) -> Result<Vec<u8>, String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| format!("part {path} not found: {e}"))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("part {path} could not be read: {e}"))?;
    Ok(bytes)
}

fn read_text(archive: &mut Archive<'_>, path: &str) -> Option<String> {
    read_part(archive, path)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn xml_reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

/// `(sheet name, relationship id)` pairs from `xl/workbook.xml`.
fn parse_workbook_sheets(xml: &str) -> Vec<(String, String)> {
    let mut reader = xml_reader(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(id)) = (attr(&e, b"name"), attr(&e, b"id")) {
                    sheets.push((name, id));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    sheets
}

fn parse_relationships(xml: &str) -> Vec<Relationship> {
    let mut reader = xml_reader(xml);
    let mut rels = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    rels.push(Relationship {
                        id,
                        kind: attr(&e, b"Type").unwrap_or_default(),
                        target,
                        external: attr(&e, b"TargetMode").is_some_and(|m| m == "External"),
                    });
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    rels
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Col,
    ColOff,
    Row,
    RowOff,
}

/// Pictures in a drawing part, in document order.
///
/// Pictures inside a group share the group's anchor.
pub fn parse_drawing(xml: &str) -> Vec<DrawingPicture> {
    let mut reader = xml_reader(xml);
    let mut pictures = Vec::new();

    let mut anchor: Option<AnchorPos> = None;
    let mut in_from = false;
    let mut marker: Option<Marker> = None;
    let (mut col, mut col_off, mut row, mut row_off) = (0u32, 0i64, 0u32, 0i64);

    let mut in_pic = false;
    let mut embed: Option<String> = None;
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" | b"absoluteAnchor" => {
                    anchor = None;
                    (col, col_off, row, row_off) = (0, 0, 0, 0);
                }
                b"from" => in_from = true,
                b"col" if in_from => marker = Some(Marker::Col),
                b"colOff" if in_from => marker = Some(Marker::ColOff),
                b"row" if in_from => marker = Some(Marker::Row),
                b"rowOff" if in_from => marker = Some(Marker::RowOff),
                b"pic" => {
                    in_pic = true;
                    (embed, name, description) = (None, None, None);
                }
                local => picture_attrs(&e, local, in_pic, &mut embed, &mut name, &mut description),
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"pos" if anchor.is_none() => {
                    let x = attr(&e, b"x").and_then(|v| v.parse().ok()).unwrap_or(0);
                    let y = attr(&e, b"y").and_then(|v| v.parse().ok()).unwrap_or(0);
                    anchor = Some(AnchorPos::Absolute { x, y });
                }
                local => picture_attrs(&e, local, in_pic, &mut embed, &mut name, &mut description),
            },
            Ok(Event::Text(t)) => {
                if let (Some(m), Ok(text)) = (marker, t.unescape()) {
                    let text = text.trim();
                    match m {
                        Marker::Col => col = text.parse().unwrap_or(0),
                        Marker::ColOff => col_off = text.parse().unwrap_or(0),
                        Marker::Row => row = text.parse().unwrap_or(0),
                        Marker::RowOff => row_off = text.parse().unwrap_or(0),
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"from" => {
                    in_from = false;
                    anchor = Some(AnchorPos::Cell {
                        col,
                        col_off,
                        row,
                        row_off,
                    });
                }
                b"col" | b"colOff" | b"row" | b"rowOff" => marker = None,
                b"pic" => {
                    in_pic = false;
                    if let (Some(anchor), Some(embed)) = (anchor, embed.take()) {
                        pictures.push(DrawingPicture {
                            anchor,
                            embed,
                            name: name.take(),
                            description: description.take(),
                        });
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "drawing part is not well-formed, stopping");
                break;
            }
            _ => {}
        }
    }
    pictures
}

fn picture_attrs(
    e: &BytesStart<'_>,
    local: &[u8],
    in_pic: bool,
    embed: &mut Option<String>,
    name: &mut Option<String>,
    description: &mut Option<String>,
) {
    if !in_pic {
        return;
    }
    match local {
        b"cNvPr" => {
            *name = attr(e, b"name").filter(|s| !s.trim().is_empty());
            *description = attr(e, b"descr").filter(|s| !s.trim().is_empty());
        }
        b"blip" => *embed = attr(e, b"embed"),
        _ => {}
    }
}
