//! Synthetic PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Width and height of the RGB test image.
pub const IMAGE_WIDTH: u32 = 2;
pub const IMAGE_HEIGHT: u32 = 3;

/// Content of one page in a fixture.
#[derive(Default, Clone)]
pub struct PageFixture {
    /// Text lines drawn top-down at 12pt Helvetica
    pub lines: Vec<String>,
    /// Place the RGB test image on the page
    pub image: bool,
    /// Stroke a blue horizontal rule
    pub rule: bool,
    /// Give the page a Contents entry no reader can use
    pub broken: bool,
}

impl PageFixture {
    pub fn text(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self) -> Self {
        self.image = true;
        self
    }

    pub fn with_rule(mut self) -> Self {
        self.rule = true;
        self
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }
}

/// Escape a literal PDF string.
fn pdf_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

fn content_stream(page: &PageFixture) -> String {
    let mut ops = String::new();

    if !page.lines.is_empty() {
        ops.push_str("BT\n/F1 12 Tf\n14 TL\n72 720 Td\n");
        for (i, line) in page.lines.iter().enumerate() {
            if i > 0 {
                ops.push_str("T*\n");
            }
            ops.push_str(&format!("({}) Tj\n", pdf_literal(line)));
        }
        ops.push_str("ET\n");
    }

    if page.image {
        ops.push_str("q\n100 0 0 150 72 400 cm\n/Im1 Do\nQ\n");
    }

    if page.rule {
        ops.push_str("q\n0 0 1 RG\n2 w\n72 300 m\n540 300 l\nS\nQ\n");
    }

    ops
}

/// Uncompressed 2x3 DeviceRGB image: red, green, blue, white, black, gray.
fn rgb_image() -> Stream {
    let pixels: Vec<u8> = vec![
        255, 0, 0, 0, 255, 0, //
        0, 0, 255, 255, 255, 255, //
        0, 0, 0, 128, 128, 128,
    ];
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => IMAGE_WIDTH as i64,
            "Height" => IMAGE_HEIGHT as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        pixels,
    )
}

/// Build a PDF with the given pages and optional author.
pub fn build_pdf(pages: &[PageFixture], author: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let image_id = doc.add_object(rgb_image());

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, font_id, image_id, page);
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(author) = author {
        let info_id = doc.add_object(dictionary! {
            "Author" => Object::String(author.as_bytes().to_vec(), StringFormat::Literal),
            "Producer" => Object::String(b"fixture".to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn add_page(doc: &mut Document, pages_id: ObjectId, font_id: ObjectId, image_id: ObjectId, page: &PageFixture) -> ObjectId {
    let contents: Object = if page.broken {
        Object::Integer(7)
    } else {
        let stream = Stream::new(Dictionary::new(), content_stream(page).into_bytes());
        doc.add_object(stream).into()
    };

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    };
    if page.image {
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }

    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => resources,
        "Contents" => contents,
    })
}

/// Build a one-page PDF whose MediaBox and Resources live on the root
/// Pages node, two levels above the page.
pub fn build_pdf_inherited(lines: &[&str], media_box: [i64; 4]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();
    let middle_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut ops = String::from("BT\n/F1 12 Tf\n14 TL\n36 360 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push_str("T*\n");
        }
        ops.push_str(&format!("({}) Tj\n", pdf_literal(line)));
    }
    ops.push_str("ET\n");
    let contents = doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => middle_id,
        "Contents" => contents,
    });
    doc.objects.insert(
        middle_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![middle_id.into()],
            "Count" => 1,
            "MediaBox" => media_box.iter().map(|&v| Object::Integer(v)).collect::<Vec<Object>>(),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Write a fixture into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageFixture], author: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages, author)).unwrap();
    path
}

/// Payloads of all `data:image/png;base64,` URIs in `html`.
pub fn png_payloads(html: &str) -> Vec<&str> {
    const PREFIX: &str = "data:image/png;base64,";
    html.match_indices(PREFIX)
        .filter_map(|(start, _)| {
            let rest = &html[start + PREFIX.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect()
}
