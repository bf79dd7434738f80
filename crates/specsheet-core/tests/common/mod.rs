//! Builds small .xlsx packages in memory for end-to-end tests.
//!
//! Cells are written as inline strings; an empty string leaves the cell out.
//! Pictures get one drawing part per sheet and one media part each.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use image::{ImageBuffer, ImageFormat, Rgb};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

struct Picture {
    col: u32,
    row: u32,
    name: String,
    png: Vec<u8>,
}

struct Sheet {
    name: String,
    rows: Vec<Vec<String>>,
    pictures: Vec<Picture>,
}

#[derive(Default)]
pub struct WorkbookBuilder {
    sheets: Vec<Sheet>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        self.sheets.push(Sheet {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
            pictures: Vec::new(),
        });
        self
    }

    /// Anchor a PNG with its top-left corner in the zero-based cell (col, row)
    /// of the most recently added sheet.
    pub fn picture(mut self, col: u32, row: u32, name: &str, png: Vec<u8>) -> Self {
        let sheet = self.sheets.last_mut().expect("add a sheet before a picture");
        sheet.pictures.push(Picture {
            col,
            row,
            name: name.to_string(),
            png,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();
        let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, path: &str, body: &[u8]| {
            zip.start_file(path, opts).unwrap();
            zip.write_all(body).unwrap();
        };

        put(&mut zip, "[Content_Types].xml", self.content_types().as_bytes());
        put(
            &mut zip,
            "_rels/.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
            )
            .as_bytes(),
        );
        put(&mut zip, "xl/workbook.xml", self.workbook_xml().as_bytes());
        put(&mut zip, "xl/_rels/workbook.xml.rels", self.workbook_rels().as_bytes());

        let mut media_index = 0;
        for (i, sheet) in self.sheets.iter().enumerate() {
            let n = i + 1;
            put(
                &mut zip,
                &format!("xl/worksheets/sheet{n}.xml"),
                sheet_xml(sheet).as_bytes(),
            );
            if sheet.pictures.is_empty() {
                continue;
            }
            put(
                &mut zip,
                &format!("xl/worksheets/_rels/sheet{n}.xml.rels"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/drawing" Target="../drawings/drawing{n}.xml"/></Relationships>"#
                )
                .as_bytes(),
            );

            let mut rels = String::new();
            for (p, picture) in sheet.pictures.iter().enumerate() {
                media_index += 1;
                rels.push_str(&format!(
                    r#"<Relationship Id="rId{}" Type="{REL_NS}/image" Target="../media/image{media_index}.png"/>"#,
                    p + 1
                ));
                put(&mut zip, &format!("xl/media/image{media_index}.png"), &picture.png);
            }
            put(
                &mut zip,
                &format!("xl/drawings/drawing{n}.xml"),
                drawing_xml(sheet).as_bytes(),
            );
            put(
                &mut zip,
                &format!("xl/drawings/_rels/drawing{n}.xml.rels"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}">{rels}</Relationships>"#
                )
                .as_bytes(),
            );
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let mut overrides = String::from(
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for (i, sheet) in self.sheets.iter().enumerate() {
            overrides.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
            if !sheet.pictures.is_empty() {
                overrides.push_str(&format!(
                    r#"<Override PartName="/xl/drawings/drawing{}.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>"#,
                    i + 1
                ));
            }
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{overrides}</Types>"#
        )
    }

    fn workbook_xml(&self) -> String {
        let sheets: String = self
            .sheets
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    escape(&s.name),
                    i + 1,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{sheets}</sheets></workbook>"#
        )
    }

    fn workbook_rels(&self) -> String {
        let rels: String = (1..=self.sheets.len())
            .map(|n| {
                format!(
                    r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}">{rels}</Relationships>"#
        )
    }
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut data = String::new();
    for (r, row) in sheet.rows.iter().enumerate() {
        let cells: String = row
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_empty())
            .map(|(c, v)| {
                format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    column(c),
                    r + 1,
                    escape(v)
                )
            })
            .collect();
        if !cells.is_empty() {
            data.push_str(&format!(r#"<row r="{}">{cells}</row>"#, r + 1));
        }
    }
    let drawing = if sheet.pictures.is_empty() {
        ""
    } else {
        r#"<drawing r:id="rId1"/>"#
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheetData>{data}</sheetData>{drawing}</worksheet>"#
    )
}

fn drawing_xml(sheet: &Sheet) -> String {
    let anchors: String = sheet
        .pictures
        .iter()
        .enumerate()
        .map(|(p, pic)| {
            format!(
                r#"<xdr:oneCellAnchor><xdr:from><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from><xdr:ext cx="952500" cy="952500"/><xdr:pic><xdr:nvPicPr><xdr:cNvPr id="{}" name="{}"/><xdr:cNvPicPr/></xdr:nvPicPr><xdr:blipFill><a:blip r:embed="rId{}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill><xdr:spPr/></xdr:pic><xdr:clientData/></xdr:oneCellAnchor>"#,
                pic.col,
                pic.row,
                p + 2,
                escape(&pic.name),
                p + 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="{REL_NS}">{anchors}</xdr:wsDr>"#
    )
}

fn column(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        letters.push((b'A' + ((n - 1) % 26) as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A solid-color PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgb([width as u8, height as u8, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A BA workbook with every expected sheet except Business Value.
pub fn ba_workbook() -> Vec<u8> {
    WorkbookBuilder::new()
        .sheet(
            "Product Overview",
            &[
                &["Product Name", "Checkout Revamp"],
                &["Category", "Payments"],
                &["Product Owner", ""],
                &["Version", "nan"],
            ],
        )
        .sheet(
            "User Story",
            &[
                &["US ID", "As A", "I Want", "So That", "Priority"],
                &["US-1", "shopper", "to pay with one click", "I save time", "High"],
            ],
        )
        .sheet(
            "Acceptance Criteria",
            &[
                &["AC ID", "US ID", "Given", "When", "Then"],
                &["AC-1", "US-1", "a saved card", "I click pay", "the order is placed"],
            ],
        )
        .sheet("BA Approval", &[&["Approver", "Dana"], &["Status", "Approved"]])
        .build()
}

/// A BA workbook with all five expected sheets.
pub fn full_ba_workbook() -> Vec<u8> {
    WorkbookBuilder::new()
        .sheet(
            "Product Overview",
            &[&["Product Name", "Loyalty Points"], &["Category", "Retention"]],
        )
        .sheet(
            "User Story",
            &[
                &["US ID", "As A", "I Want", "So That"],
                &["US-1", "member", "to earn points", "I come back"],
                &["US-2", "member", "to redeem points", "I save money"],
            ],
        )
        .sheet(
            "Acceptance Criteria",
            &[
                &["AC ID", "US ID", "Then"],
                &["AC-1", "US-1", "points are credited"],
                &["AC-2", "US-1", "the balance is shown"],
                &["AC-3", "US-2", "points are deducted"],
            ],
        )
        .sheet(
            "Business Value",
            &[
                &["Metric", "Value"],
                &["Revenue Impact", "High"],
                &["User Adoption", "30% of members"],
            ],
        )
        .sheet("BA Approval", &[&["Approved By", "Dana"], &["Status", "pending"]])
        .build()
}

/// A UIUX workbook with pictures on the asset and overview sheets.
pub fn uiux_workbook() -> Vec<u8> {
    WorkbookBuilder::new()
        .sheet(
            "Design Overview",
            &[&["Design Name", "Onboarding"], &["Designer", "Kim"]],
        )
        .picture(3, 0, "Picture 1", png(12, 12))
        .sheet(
            "Figma Links",
            &[
                &["Screen Name", "Figma URL", "Frame Type"],
                &["Welcome", "https://www.figma.com/file/AbC123/Onboarding", "Mobile"],
                &["Broken", "figma onboarding", "Mobile"],
            ],
        )
        .sheet(
            "Design Assets",
            &[
                &["Asset Name", "Asset Type", "File Type"],
                &["Home screen", "Hi-fi Mockup", "PNG"],
                &["Signup flow", "User Flow Diagram", "PNG"],
            ],
        )
        .picture(4, 1, "Picture 2", png(40, 30))
        .picture(4, 2, "Picture 3", png(20, 10))
        .sheet("Design Decisions", &[&["Decision ID", "Decision"], &["DD-1", "Use bottom tabs"]])
        .sheet("Approval", &[&["Approver", "Lee"], &["Status", "approved"]])
        .sheet("Notes", &[&["scratch"]])
        .picture(0, 2, "Login screenshot", png(8, 8))
        .build()
}

/// An ENGINEER workbook with durations in mixed units and an architecture diagram.
pub fn engineer_workbook() -> Vec<u8> {
    WorkbookBuilder::new()
        .sheet("Project Info", &[&["Project Name", "Ledger Service"]])
        .sheet(
            "Tech Stack",
            &[
                &["Layer", "Technology"],
                &["Backend API", "Rust"],
                &["Database", "PostgreSQL"],
            ],
        )
        .sheet(
            "Development Estimate",
            &[
                &["Phase", "Task", "Duration"],
                &["Build", "Core ledger", "3 weeks"],
                &["Test", "Load tests", "10 days"],
                &["Launch", "Rollout", "soon"],
            ],
        )
        .sheet(
            "Architecture Documents",
            &[
                &["Document Name", "Type", "Link"],
                &["System overview", "Diagram", "https://wiki.example.com/ledger"],
            ],
        )
        .picture(5, 1, "Picture 1", png(16, 16))
        .sheet("Approval", &[&["Status", "Rejected"]])
        .build()
}
