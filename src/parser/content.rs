//! Content stream scanning.
//!
//! Walks a page's operators while tracking the graphics state, and records
//! the three kinds of marks the converter cares about: text spans, image
//! placements and painted paths. Form XObjects are entered recursively so
//! that text and images drawn through them land on the page as well.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::{Color, DrawingRef, Rect, Span, DEFAULT_FONT_SIZE};

/// Nesting limit for Form XObjects.
const MAX_FORM_DEPTH: usize = 8;

/// Glyph width (in 1/1000 em) used when a font carries no `/Widths`.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;

/// TJ adjustment (in 1/1000 em) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Marks collected from one page.
#[derive(Debug, Default)]
pub(crate) struct ScannedPage {
    /// Text spans in content order
    pub spans: Vec<Span>,
    /// Painted paths in content order
    pub drawings: Vec<DrawingRef>,
    /// Image XObjects drawn on the page, in the order they were drawn
    pub placements: Vec<(ObjectId, Rect)>,
}

impl ScannedPage {
    /// Placement rectangles grouped by image object, preserving draw order.
    pub fn placements_by_image(&self) -> HashMap<ObjectId, Vec<Rect>> {
        let mut map: HashMap<ObjectId, Vec<Rect>> = HashMap::new();
        for (id, rect) in &self.placements {
            map.entry(*id).or_default().push(*rect);
        }
        map
    }
}

/// Maps user space (PDF, bottom-left origin) to page space (top-left origin).
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageSpace {
    origin_x: f32,
    top: f32,
}

impl PageSpace {
    /// Build from a MediaBox given as `[x0, y0, x1, y1]`.
    pub fn from_media_box(media_box: [f32; 4]) -> Self {
        Self {
            origin_x: media_box[0].min(media_box[2]),
            top: media_box[1].max(media_box[3]),
        }
    }

    fn to_page(self, (x, y): (f32, f32)) -> (f32, f32) {
        (x - self.origin_x, self.top - y)
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Read six finite numeric operands.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6]
            .iter()
            .filter_map(get_number)
            .filter(|v| v.is_finite())
            .collect();
        if n.len() != 6 {
            return None;
        }
        Some(Self::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    }

    /// `self` applied first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit vertical vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Geometric mean of the axis scales.
    fn mean_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Text state parameters (saved with `q` / restored with `Q`).
#[derive(Debug, Clone)]
struct TextParams {
    font: Option<Vec<u8>>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font: None,
            size: DEFAULT_FONT_SIZE,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: Color,
    stroke: Color,
    line_width: f32,
    text: TextParams,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            text: TextParams::default(),
        }
    }
}

/// A font resource with what is needed to decode and measure its strings.
struct FontEntry<'a> {
    base_font: String,
    encoding: Option<lopdf::Encoding<'a>>,
    first_char: u32,
    widths: Vec<f32>,
    two_byte: bool,
}

impl<'a> FontEntry<'a> {
    fn load(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .and_then(Object::as_name_str)
            .map(strip_subset_prefix)
            .unwrap_or_default()
            .to_string();
        let two_byte = matches!(dict.get(b"Subtype").and_then(Object::as_name_str), Ok("Type0"));
        let first_char = dict
            .get(b"FirstChar")
            .and_then(Object::as_i64)
            .map(|v| v.max(0) as u32)
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .map(|obj| deref(doc, obj))
            .and_then(Object::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|w| get_number(deref(doc, w)).unwrap_or(0.0))
                    .collect::<Vec<f32>>()
            })
            .unwrap_or_default();

        Self {
            base_font,
            encoding: dict.get_font_encoding(doc).ok(),
            first_char,
            widths,
            two_byte,
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match &self.encoding {
            Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Glyph width in 1/1000 em.
    fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(FALLBACK_GLYPH_WIDTH)
    }
}

type FontTable<'a> = HashMap<Vec<u8>, FontEntry<'a>>;

/// Walks content streams and collects page marks.
pub(crate) struct ContentScanner<'a> {
    doc: &'a LopdfDocument,
    space: PageSpace,
    record_drawings: bool,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    path: Vec<(f32, f32)>,
    forms: Vec<ObjectId>,
    out: ScannedPage,
}

impl<'a> ContentScanner<'a> {
    pub fn new(doc: &'a LopdfDocument, space: PageSpace) -> Self {
        Self {
            doc,
            space,
            record_drawings: true,
            state: GraphicsState::new(Matrix::IDENTITY),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            path: Vec::new(),
            forms: Vec::new(),
            out: ScannedPage::default(),
        }
    }

    /// Enable or disable recording of painted paths.
    pub fn with_drawings(mut self, record: bool) -> Self {
        self.record_drawings = record;
        self
    }

    /// Scan a page's content with its resource dictionary.
    pub fn scan(mut self, content: &[u8], resources: Option<&'a Dictionary>) -> Result<ScannedPage> {
        self.scan_stream(content, resources, 0)?;
        Ok(self.out)
    }

    fn scan_stream(&mut self, content: &[u8], resources: Option<&'a Dictionary>, depth: usize) -> Result<()> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::TextExtract(format!("content stream: {}", e)))?;
        let fonts = load_fonts(self.doc, resources);

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                // Graphics state
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(saved) = self.stack.pop() {
                        self.state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.state.ctm = m.multiply(&self.state.ctm);
                    }
                }
                "w" => {
                    if let Some(w) = operands.first().and_then(get_number) {
                        self.state.line_width = w;
                    }
                }

                // Color
                "cs" => self.state.fill = Color::BLACK,
                "CS" => self.state.stroke = Color::BLACK,
                "g" | "rg" | "k" | "sc" | "scn" => {
                    if let Some(color) = color_from_operands(operands) {
                        self.state.fill = color;
                    }
                }
                "G" | "RG" | "K" | "SC" | "SCN" => {
                    if let Some(color) = color_from_operands(operands) {
                        self.state.stroke = color;
                    }
                }

                // Text objects and state
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.state.text.font = Some(name.clone());
                    }
                    if let Some(size) = operands.get(1).and_then(get_number) {
                        self.state.text.size = size;
                    }
                }
                "Tc" => set_number(operands, &mut self.state.text.char_spacing),
                "Tw" => set_number(operands, &mut self.state.text.word_spacing),
                "TL" => set_number(operands, &mut self.state.text.leading),
                "Ts" => set_number(operands, &mut self.state.text.rise),
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(get_number) {
                        self.state.text.horizontal_scale = scale / 100.0;
                    }
                }

                // Text positioning
                "Td" | "TD" => {
                    let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                    let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                    if op.operator == "TD" {
                        self.state.text.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "T*" => self.next_line(),

                // Text showing
                "Tj" => self.show_text(operands.first().into_iter(), &fonts),
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        self.show_text(items.iter(), &fonts);
                    }
                }
                "'" => {
                    self.next_line();
                    self.show_text(operands.first().into_iter(), &fonts);
                }
                "\"" => {
                    set_number(operands, &mut self.state.text.word_spacing);
                    set_number(operands.get(1..).unwrap_or_default(), &mut self.state.text.char_spacing);
                    self.next_line();
                    self.show_text(operands.get(2).into_iter(), &fonts);
                }

                // Path construction
                "m" | "l" => self.push_points(operands, 1),
                "c" => self.push_points(operands, 3),
                "v" | "y" => self.push_points(operands, 2),
                "re" => {
                    let n: Vec<f32> = operands.iter().filter_map(get_number).collect();
                    if n.len() >= 4 {
                        let (x, y, w, h) = (n[0], n[1], n[2], n[3]);
                        for (px, py) in [(x, y), (x + w, y), (x + w, y + h), (x, y + h)] {
                            self.push_point(px, py);
                        }
                    }
                }
                "h" => {}

                // Path painting
                "S" | "s" => self.paint(true, false),
                "f" | "F" | "f*" => self.paint(false, true),
                "B" | "B*" | "b" | "b*" => self.paint(true, true),
                "n" => self.path.clear(),

                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.invoke_xobject(name, resources, depth)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translate(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    /// Decode and measure a sequence of TJ items (strings and adjustments).
    fn show_text<'o, I>(&mut self, items: I, fonts: &FontTable<'a>)
    where
        I: Iterator<Item = &'o Object>,
    {
        let params = &self.state.text;
        let font = params.font.as_ref().and_then(|name| fonts.get(name));
        let size = params.size;
        let scale = params.horizontal_scale;

        let mut text = String::new();
        let mut advance = 0.0f32;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = match font {
                        Some(f) => f.decode(bytes),
                        None => decode_text_simple(bytes),
                    };
                    text.push_str(&decoded);
                    advance += string_advance(font, bytes, params) * scale;
                }
                other => {
                    if let Some(n) = get_number(other) {
                        advance -= n / 1000.0 * size * scale;
                        if -n > TJ_SPACE_THRESHOLD && needs_word_space(&text) {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        let rendering = self.text_matrix.multiply(&self.state.ctm);
        let rise = params.rise;
        let descent = rise - size * 0.2;
        let ascent = rise + size * 0.8;
        let corners = [(0.0, descent), (advance, descent), (0.0, ascent), (advance, ascent)];
        let bbox = Rect::from_points(
            corners
                .iter()
                .map(|&(x, y)| self.space.to_page(rendering.apply(x, y))),
        )
        .unwrap_or_default();
        let effective_size = round2(size * rendering.vertical_scale());

        self.text_matrix = Matrix::translate(advance, 0.0).multiply(&self.text_matrix);

        if !text.trim().is_empty() {
            let font_name = match (font, &params.font) {
                (Some(f), _) if !f.base_font.is_empty() => f.base_font.clone(),
                (_, Some(name)) => String::from_utf8_lossy(name).to_string(),
                _ => String::new(),
            };
            self.out
                .spans
                .push(Span::new(text, bbox, font_name, effective_size, self.state.fill));
        }
    }

    fn push_point(&mut self, x: f32, y: f32) {
        let point = self.space.to_page(self.state.ctm.apply(x, y));
        self.path.push(point);
    }

    /// Push the coordinates of `count` points from the operands.
    fn push_points(&mut self, operands: &[Object], count: usize) {
        let n: Vec<f32> = operands.iter().filter_map(get_number).collect();
        for pair in n.chunks_exact(2).take(count) {
            self.push_point(pair[0], pair[1]);
        }
    }

    fn paint(&mut self, stroke: bool, fill: bool) {
        let points = std::mem::take(&mut self.path);
        if !self.record_drawings {
            return;
        }
        if let Some(bbox) = Rect::from_points(points) {
            self.out.drawings.push(DrawingRef {
                bbox,
                stroke_color: stroke.then_some(self.state.stroke),
                fill_color: fill.then_some(self.state.fill),
                width: round2(self.state.line_width * self.state.ctm.mean_scale()),
            });
        }
    }

    fn invoke_xobject(&mut self, name: &[u8], resources: Option<&'a Dictionary>, depth: usize) -> Result<()> {
        let Some(id) = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| resolve_dict(self.doc, x))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| obj.as_reference().ok())
        else {
            log::debug!("XObject /{} not found in resources", String::from_utf8_lossy(name));
            return Ok(());
        };

        let Ok(Object::Stream(stream)) = self.doc.get_object(id) else {
            return Ok(());
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name_str) {
            Ok("Image") => {
                let ctm = self.state.ctm;
                let rect = Rect::from_points(
                    [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
                        .iter()
                        .map(|&(x, y)| self.space.to_page(ctm.apply(x, y))),
                )
                .unwrap_or_default();
                self.out.placements.push((id, rect));
            }
            Ok("Form") => {
                if depth >= MAX_FORM_DEPTH || self.forms.contains(&id) {
                    log::debug!("Skipping nested form XObject {:?}", id);
                    return Ok(());
                }
                let content = stream_data(stream)?;
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| resolve_dict(self.doc, r))
                    .or(resources);
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .and_then(Object::as_array)
                    .ok()
                    .and_then(|arr| Matrix::from_operands(arr))
                    .unwrap_or(Matrix::IDENTITY);

                let saved_state = self.state.clone();
                let saved_depth = self.stack.len();
                let saved_text = (self.text_matrix, self.line_matrix);
                self.state.ctm = matrix.multiply(&self.state.ctm);
                self.forms.push(id);

                let result = self.scan_stream(&content, form_resources, depth + 1);

                self.forms.pop();
                self.stack.truncate(saved_depth);
                self.state = saved_state;
                (self.text_matrix, self.line_matrix) = saved_text;
                result?;
            }
            _ => {}
        }

        Ok(())
    }
}

/// Horizontal displacement of a shown string in text space, before `Tz`.
fn string_advance(font: Option<&FontEntry<'_>>, bytes: &[u8], params: &TextParams) -> f32 {
    let size = params.size;
    let glyph = |width: f32| width / 1000.0 * size + params.char_spacing;

    match font {
        Some(f) if f.two_byte => bytes
            .chunks(2)
            .map(|c| {
                let code = c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                glyph(f.glyph_width(code))
            })
            .sum(),
        Some(f) => bytes
            .iter()
            .map(|&b| {
                let space = if b == b' ' { params.word_spacing } else { 0.0 };
                glyph(f.glyph_width(b as u32)) + space
            })
            .sum(),
        None => bytes
            .iter()
            .map(|&b| {
                let space = if b == b' ' { params.word_spacing } else { 0.0 };
                glyph(FALLBACK_GLYPH_WIDTH) + space
            })
            .sum(),
    }
}

/// Whether a TJ word gap should become a literal space.
fn needs_word_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c),
        None => false,
    }
}

fn load_fonts<'a>(doc: &'a LopdfDocument, resources: Option<&'a Dictionary>) -> FontTable<'a> {
    let mut fonts = HashMap::new();
    let Some(font_dict) = resources
        .and_then(|res| res.get(b"Font").ok())
        .and_then(|f| resolve_dict(doc, f))
    else {
        return fonts;
    };

    for (name, obj) in font_dict.iter() {
        if let Some(dict) = resolve_dict(doc, obj) {
            fonts.insert(name.clone(), FontEntry::load(doc, dict));
        }
    }
    fonts
}

/// Resolve a direct or referenced dictionary.
pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        },
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

/// Follow a reference, returning the object itself otherwise.
pub(crate) fn deref<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decoded stream bytes; unfiltered streams are returned as stored.
pub(crate) fn stream_data(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::PdfParse(format!("stream decode: {}", e)))
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn set_number(operands: &[Object], target: &mut f32) {
    if let Some(v) = operands.first().and_then(get_number) {
        *target = v;
    }
}

fn color_from_operands(operands: &[Object]) -> Option<Color> {
    let n: Vec<f32> = operands.iter().filter_map(get_number).collect();
    match n.as_slice() {
        [g] => Some(Color::from_gray(*g)),
        [r, g, b] => Some(Color::from_rgb(*r, *g, *b)),
        [c, m, y, k] => Some(Color::from_cmyk(*c, *m, *y, *k)),
        _ => None,
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Drop a subset tag such as `ABCDEF+` from a font name.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
