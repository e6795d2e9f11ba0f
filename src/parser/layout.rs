//! Content-stream text layout.
//!
//! Walks a page's content stream, tracks the graphics and text matrices and
//! the current font, and produces positioned [`TextSpan`]s. Adjacent spans in
//! the same font are merged into style runs, and runs on the same baseline are
//! grouped into [`TextLine`]s in top-to-bottom, left-to-right order.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Estimated glyph advance as a fraction of the font size.
const EM_FRACTION: f32 = 0.5;

/// A run of text drawn with one font at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Approximate advance width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font name marks a bold face
    pub is_bold: bool,
}

impl TextSpan {
    /// Create a new text span.
    ///
    /// Width is estimated at half an em per character; content streams do not
    /// carry glyph metrics without loading the font program.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32, font_name: impl Into<String>) -> Self {
        let text = text.into();
        let font_name = font_name.into();
        let is_bold = font_name.to_lowercase().contains("bold");
        let width = text.chars().count() as f32 * font_size * EM_FRACTION;

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
        }
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Spans in drawing order along the line
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    /// Create a line from spans already in reading order.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// The span whose style stands for the whole line.
    pub fn first_span(&self) -> Option<&TextSpan> {
        self.spans.first()
    }

    /// Style-run texts joined with single spaces.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Baseline of the line (baseline of its first span).
    pub fn y(&self) -> f32 {
        self.spans.first().map(|s| s.y).unwrap_or(0.0)
    }
}

/// Extract positioned style runs from a page.
pub fn extract_page_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = page_content(doc, page_id)?;
    let spans = parse_content_stream(doc, &content, &fonts)?;
    Ok(merge_style_runs(spans))
}

/// Extract spans from a page and group them into lines.
pub fn extract_page_lines(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextLine>> {
    Ok(group_spans_into_lines(extract_page_spans(doc, page_id)?))
}

/// Get the decompressed content stream of a page.
///
/// Pages without a `Contents` entry are blank and yield an empty stream.
pub fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            // Unfiltered streams have nothing to decompress
            Ok(Object::Stream(s)) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        },
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        match s.decompressed_content() {
                            Ok(data) => content.extend_from_slice(&data),
                            Err(_) => content.extend_from_slice(&s.content),
                        }
                        content.push(b' ');
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

/// Parse a content stream into spans, decoding strings with each font's encoding.
fn parse_content_stream(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> Result<Vec<TextSpan>> {
    let content = strip_inline_images(content);
    let content =
        lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut font_name = String::new();
    let mut encoding = None;
    let mut font_size: f32 = 12.0;
    let mut text = TextMatrix::default();
    let mut ctm = Matrix::IDENTITY;
    let mut ctm_stack: Vec<Matrix> = Vec::new();
    let mut in_text_block = false;

    for op in content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ctm = m.concat(&ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                text.reset();
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(resource) = &op.operands[0] {
                        let font = fonts.get(resource.as_slice());
                        font_name = font
                            .and_then(|f| f.get(b"BaseFont").ok())
                            .and_then(|o| o.as_name().ok())
                            .map(|n| String::from_utf8_lossy(n).to_string())
                            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                        encoding = font.and_then(|f| f.get_font_encoding(doc).ok());
                    }
                    font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    text.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        text.leading = -ty;
                    }
                    text.translate(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    text.set(m);
                }
            }
            "T*" => text.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator == "'" || op.operator == "\"" {
                    text.next_line();
                }
                if !in_text_block {
                    continue;
                }

                let decode = |bytes: &[u8]| match &encoding {
                    Some(enc) => LopdfDocument::decode_text(enc, bytes)
                        .unwrap_or_else(|_| decode_text_simple(bytes)),
                    None => decode_text_simple(bytes),
                };
                let (shown, kerning) = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => decode_array(items, &decode),
                        _ => (String::new(), 0.0),
                    },
                    "\"" => (decode_operand(op.operands.get(2), &decode), 0.0),
                    _ => (decode_operand(op.operands.first(), &decode), 0.0),
                };

                // Glyph positions are estimated, so the pen moves by the same
                // estimate the span width uses
                let advance = shown.chars().count() as f32 * font_size * EM_FRACTION
                    - kerning / 1000.0 * font_size;

                if !shown.trim().is_empty() {
                    let device = text.current.concat(&ctm);
                    spans.push(TextSpan::new(
                        shown,
                        device.e,
                        device.f,
                        font_size * device.vertical_scale(),
                        font_name.clone(),
                    ));
                }
                text.advance(advance);
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Remove inline images (`BI ... ID <data> EI`) from a content stream.
///
/// The content parser can stop at binary image data and drop every operation
/// after it, so the images are cut out before decoding.
fn strip_inline_images(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut pos = 0;
    let mut stripped = 0;

    while let Some(start) = find_token(content, b"BI", pos) {
        let Some(data) = find_token(content, b"ID", start + 2) else {
            break;
        };
        // One whitespace byte separates ID from the data
        let Some(end) = find_token(content, b"EI", data + 3) else {
            log::warn!(
                "Unterminated inline image at byte {}; text after it is dropped",
                start
            );
            out.extend_from_slice(&content[pos..start]);
            return out;
        };
        out.extend_from_slice(&content[pos..start]);
        out.push(b' ');
        pos = end + 2;
        stripped += 1;
    }

    if stripped > 0 {
        log::debug!("Skipped {} inline image(s) in content stream", stripped);
    }
    out.extend_from_slice(&content[pos..]);
    out
}

/// Position of `token` at or after `from`, delimited by whitespace or the stream ends.
fn find_token(content: &[u8], token: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + token.len() <= content.len() {
        if &content[i..i + token.len()] == token
            && (i == 0 || content[i - 1].is_ascii_whitespace())
            && content
                .get(i + token.len())
                .map_or(true, |b| b.is_ascii_whitespace())
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Decode a `TJ` array, turning large negative kerning into word spaces.
///
/// Also returns the summed adjustment in thousandths of an em (positive moves
/// left), which the caller needs to advance the pen.
fn decode_array(items: &[Object], decode: &dyn Fn(&[u8]) -> String) -> (String, f32) {
    // Adjustments are in 1/1000 text space units; ~200 is a word gap in most fonts
    let space_threshold = 200.0;
    let mut combined = String::new();
    let mut kerning = 0.0;

    for item in items {
        let adjustment = match item {
            Object::String(bytes, _) => {
                combined.push_str(&decode(bytes));
                continue;
            }
            Object::Integer(n) => -(*n as f32),
            Object::Real(n) => -n,
            _ => continue,
        };
        kerning -= adjustment;

        if adjustment > space_threshold
            && !combined.is_empty()
            && !combined.ends_with(' ')
            && !combined.ends_with('\u{00A0}')
            && !combined.chars().last().map(is_spaceless_script_char).unwrap_or(false)
        {
            combined.push(' ');
        }
    }

    (combined, kerning)
}

fn decode_operand(operand: Option<&Object>, decode: &dyn Fn(&[u8]) -> String) -> String {
    match operand {
        Some(Object::String(bytes, _)) => decode(bytes),
        _ => String::new(),
    }
}

/// Merge spans that continue each other into style runs.
///
/// Works in drawing order: a span joins the previous one when both use the
/// same font at the same size on the same baseline and it starts where the
/// previous one ends (gap within 20% of a character width).
pub fn merge_style_runs(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut runs: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(prev) = runs.last_mut() {
            let char_width = span.font_size * EM_FRACTION;
            let gap = span.x - (prev.x + prev.width);
            if prev.font_name == span.font_name
                && (prev.font_size - span.font_size).abs() < 0.01
                && (prev.y - span.y).abs() <= span.font_size * 0.1
                && gap.abs() <= char_width * 0.2
            {
                prev.text.push_str(&span.text);
                prev.width = span.x + span.width - prev.x;
                continue;
            }
        }
        runs.push(span);
    }

    runs
}

/// Group spans into lines by baseline.
///
/// Spans are ordered top to bottom (PDF Y grows upwards) then left to right;
/// a span joins the current line when its baseline is within 30% of its font
/// size of the line's first baseline.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Read the six operands of `cm` or `Tm`.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().map(get_number).collect::<Option<_>>()?;
        Some(Self::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    }

    /// `self × other`: apply `self` first, then `other`.
    fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Length of the transformed unit vertical, i.e. how much glyph height scales.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text matrix and text line matrix of a `BT`/`ET` block.
#[derive(Debug, Clone)]
struct TextMatrix {
    line: Matrix,
    current: Matrix,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            line: Matrix::IDENTITY,
            current: Matrix::IDENTITY,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn reset(&mut self) {
        self.line = Matrix::IDENTITY;
        self.current = Matrix::IDENTITY;
    }

    fn set(&mut self, m: Matrix) {
        self.line = m;
        self.current = m;
    }

    /// Start a new line offset from the start of the current one.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.set(Matrix::translation(tx, ty).concat(&self.line));
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    /// Move the pen along the current line after showing text.
    fn advance(&mut self, tx: f32) {
        self.current = Matrix::translation(tx, 0.0).concat(&self.current);
    }
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
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
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
