//! Splits a model reply into the six digest sections.
//!
//! A section starts at an ordinal marker: at the beginning of a line, any number of `*`,
//! the word `Question`, spaces or tabs, one or more digits, an optional `.` and any number
//! of trailing `*`. Whatever follows the marker on the same line belongs to the section
//! body. Sections are assigned by position, not by the printed number.

use pulldown_cmark::{Event, Parser, html};

pub const SECTION_KEYS: [&str; 6] = ["subject", "built", "strategy", "playbook", "stack", "advice"];

const NO_SUMMARY: &str = "<em>No summary</em>";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSummary {
    pub subject: String,
    pub built: String,
    pub strategy: String,
    pub playbook: String,
    pub stack: String,
    pub advice: String,
}

impl ParsedSummary {
    /// Stand-in for videos that have no summary file yet.
    pub fn missing() -> Self {
        Self {
            subject: NO_SUMMARY.to_string(),
            ..Self::default()
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut parsed = Self::default();
        for (slot, body) in parsed.slots_mut().into_iter().zip(split_sections(text)) {
            *slot = render_markdown(body.trim());
        }
        parsed
    }

    /// Sections in key order.
    pub fn sections(&self) -> [(&'static str, &str); 6] {
        [
            (SECTION_KEYS[0], self.subject.as_str()),
            (SECTION_KEYS[1], self.built.as_str()),
            (SECTION_KEYS[2], self.strategy.as_str()),
            (SECTION_KEYS[3], self.playbook.as_str()),
            (SECTION_KEYS[4], self.stack.as_str()),
            (SECTION_KEYS[5], self.advice.as_str()),
        ]
    }

    fn slots_mut(&mut self) -> [&mut String; 6] {
        [
            &mut self.subject,
            &mut self.built,
            &mut self.strategy,
            &mut self.playbook,
            &mut self.stack,
            &mut self.advice,
        ]
    }
}

/// Raw HTML in the reply is shown as text, never passed through.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

/// Bodies following each marker, in order of appearance. Text before the first marker
/// is dropped.
pub fn split_sections(text: &str) -> Vec<&str> {
    let mut bounds: Vec<(usize, usize)> = Vec::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if let Some(len) = marker_len(line) {
            bounds.push((offset, offset + len));
        }
        offset += line.len();
    }

    bounds
        .iter()
        .enumerate()
        .map(|(i, &(_, body_start))| {
            let body_end = bounds.get(i + 1).map_or(text.len(), |&(start, _)| start);
            &text[body_start..body_end]
        })
        .collect()
}

/// Byte length of the marker at the start of `line`, if there is one.
fn marker_len(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut pos = count_while(bytes, 0, |b| b == b'*');

    let rest = line.get(pos..)?;
    if !rest.starts_with("Question") {
        return None;
    }
    pos += "Question".len();

    let spaces = count_while(bytes, pos, |b| b == b' ' || b == b'\t');
    if spaces == 0 {
        return None;
    }
    pos += spaces;

    let digits = count_while(bytes, pos, |b| b.is_ascii_digit());
    if digits == 0 {
        return None;
    }
    pos += digits;

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
    }
    pos += count_while(bytes, pos, |b| b == b'*');

    Some(pos)
}

fn count_while(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    bytes
        .get(from..)
        .map_or(0, |tail| tail.iter().take_while(|&&b| pred(b)).count())
}
