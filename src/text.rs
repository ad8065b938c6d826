//! Line-aware page text extraction.
//!
//! Text is decoded from the page content stream operator by operator. A new
//! line starts whenever text is shown on a different baseline than the
//! previous run, so headings keep their own line even when a whole page is
//! typeset inside one `BT`/`ET` block.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Baselines closer than this, in user space units, belong to one line.
const SAME_LINE_TOLERANCE: f32 = 1.0;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const WORD_GAP: f32 = 200.0;

/// Text line matrix, tracked only as far as positioning operators need.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn baseline(&self) -> f32 {
        self.f
    }
}

/// Accumulates shown text runs into newline-separated lines.
#[derive(Default)]
struct LineBuilder {
    text: String,
    line: String,
    baseline: Option<f32>,
    /// A positioning operator ran since the last shown run.
    moved: bool,
}

impl LineBuilder {
    fn show(&mut self, baseline: f32, run: &str) {
        if run.is_empty() {
            return;
        }

        match self.baseline {
            Some(prev) if (prev - baseline).abs() <= SAME_LINE_TOLERANCE => {
                if self.moved && needs_space(&self.line) && !run.starts_with(char::is_whitespace) {
                    self.line.push(' ');
                }
            }
            Some(_) => self.break_line(),
            None => {}
        }

        self.line.push_str(run);
        self.baseline = Some(baseline);
        self.moved = false;
    }

    fn break_line(&mut self) {
        self.text.push_str(self.line.trim_end());
        self.text.push('\n');
        self.line.clear();
    }

    fn finish(mut self) -> String {
        if !self.line.is_empty() {
            self.break_line();
        }
        self.text
    }
}

/// Extract the text of one page, one output line per baseline.
pub(crate) fn page_text(doc: &LopdfDocument, page_id: ObjectId) -> Result<String> {
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| Error::TextExtract(e.to_string()))?;
    let content = Content::decode(&data).map_err(|e| Error::TextExtract(e.to_string()))?;

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let encodings: BTreeMap<Vec<u8>, _> = fonts
        .iter()
        .filter_map(|(name, font)| {
            font.get_font_encoding(doc)
                .ok()
                .map(|enc| (name.clone(), enc))
        })
        .collect();
    let decode = |font: &[u8], bytes: &[u8]| -> String {
        encodings
            .get(font)
            .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
            .unwrap_or_else(|| decode_bytes(bytes))
    };

    let mut lines = LineBuilder::default();
    let mut matrix = TextMatrix::default();
    let mut leading = 0.0;
    let mut font: Vec<u8> = Vec::new();

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                matrix = TextMatrix::default();
                lines.moved = true;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    font = name.clone();
                }
            }
            "TL" => {
                if let Some(tl) = operands.first().and_then(number) {
                    leading = tl;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(number);
                let ty = operands.get(1).and_then(number);
                if let (Some(tx), Some(ty)) = (tx, ty) {
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                    matrix.translate(tx, ty);
                    lines.moved = true;
                }
            }
            "Tm" => {
                let values: Vec<f32> = operands.iter().filter_map(number).collect();
                if let [a, b, c, d, e, f] = values[..] {
                    matrix = TextMatrix { a, b, c, d, e, f };
                    lines.moved = true;
                }
            }
            "T*" => {
                matrix.translate(0.0, -leading);
                lines.moved = true;
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    lines.show(matrix.baseline(), &decode(&font, bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let run = join_tj(items, |bytes| decode(&font, bytes));
                    lines.show(matrix.baseline(), &run);
                }
            }
            "'" | "\"" => {
                matrix.translate(0.0, -leading);
                lines.moved = true;
                let index = if op.operator == "'" { 0 } else { 2 };
                if let Some(Object::String(bytes, _)) = operands.get(index) {
                    lines.show(matrix.baseline(), &decode(&font, bytes));
                }
            }
            _ => {}
        }
    }

    Ok(lines.finish())
}

/// Concatenate a TJ array, turning large negative adjustments into spaces.
fn join_tj(items: &[Object], decode: impl Fn(&[u8]) -> String) -> String {
    let mut run = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => run.push_str(&decode(bytes)),
            other => {
                if let Some(adjustment) = number(other) {
                    if -adjustment > WORD_GAP && needs_space(&run) {
                        run.push(' ');
                    }
                }
            }
        }
    }
    run
}

fn number(obj: &Object) -> Option<f32> {
    obj.as_float().ok()
}

/// A separator is due unless the text is empty, already ends in whitespace,
/// or ends in a script written without spaces.
fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

fn is_spaceless_script_char(c: char) -> bool {
    matches!(
        c,
        '\u{3000}'..='\u{30FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{FF00}'..='\u{FFEF}'
    )
}

/// Decode bytes with no font encoding: UTF-16BE with BOM, then UTF-8,
/// then Latin-1.
pub(crate) fn decode_bytes(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
