//! Product specification extractor
//!
//! Turns a product description (HTML from the catalog, or plain text) into a
//! flat `label -> value` map. The input is first reduced to text segments:
//! tags are stripped, block-level tags (`li`, `p`, `br`, ...) end a segment,
//! and plain text is segmented by lines. Each segment is then cut at known
//! label boundaries so that flattened descriptions such as
//! `"Diamond Shape: round Diamond Weight: 0.5"` still yield one entry per
//! label.
//!
//! The first value seen for a label wins; later ones are ignored.

use serde::Serialize;
use std::collections::BTreeMap;

pub const DIAMOND_SHAPE: &str = "Diamond Shape";
pub const DIAMOND_WEIGHT: &str = "Diamond Weight";
pub const TOTAL_DIAMONDS: &str = "Total Diamonds";
pub const TOTAL_DIAMOND_WEIGHT: &str = "Total Diamond Weight";
pub const TOTAL_DIAMOND_CARAT: &str = "Total Diamond Carat";
pub const DIAMOND_QUALITY: &str = "Diamond Quality";
pub const SIZE: &str = "Size";
pub const DIMENSIONS: &str = "Dimensions";
pub const GOLD_10K: &str = "10K Gold";
pub const GOLD_14K: &str = "14K Gold";
pub const GOLD_18K: &str = "18K Gold";

/// Labels the pricing pipeline reads
pub const KNOWN_LABELS: &[&str] = &[
    DIAMOND_SHAPE,
    DIAMOND_WEIGHT,
    TOTAL_DIAMONDS,
    TOTAL_DIAMOND_WEIGHT,
    TOTAL_DIAMOND_CARAT,
    DIAMOND_QUALITY,
    SIZE,
    DIMENSIONS,
    GOLD_10K,
    GOLD_14K,
    GOLD_18K,
];

const BLOCK_TAGS: &[&str] = &[
    "li", "p", "br", "div", "ul", "ol", "tr", "td", "th", "table", "h1", "h2", "h3", "h4",
    "h5", "h6", "section", "hr",
];

const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
];

/// Longest text accepted as a label when deciding where a line starts
const MAX_LABEL_CHARS: usize = 40;

/// Extracted `label -> value` pairs
pub type SpecMap = BTreeMap<String, String>;

/// Extract labeled specification values from a product description.
pub fn extract(raw: &str) -> SpecMap {
    let mut map = SpecMap::new();
    if raw.trim().is_empty() {
        return map;
    }

    let pieces: Vec<(String, String)> = segments(raw)
        .iter()
        .flat_map(|segment| split_at_known_labels(segment))
        .filter_map(|piece| split_pair(&piece))
        .collect();

    // Labels exactly as written
    for (label, value) in &pieces {
        map.entry(label.clone()).or_insert_with(|| value.clone());
    }

    // Known labels written in a different case
    for (label, value) in &pieces {
        if let Some(canonical) = KNOWN_LABELS
            .iter()
            .find(|known| known.eq_ignore_ascii_case(label))
        {
            map.entry(canonical.to_string())
                .or_insert_with(|| value.clone());
        }
    }

    map
}

/// Diamond summary used by listing pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiamondDetails {
    pub carat: String,
    pub quality: String,
    pub shape: String,
    pub count: String,
}

pub fn diamond_details(spec: &SpecMap) -> DiamondDetails {
    let get = |label: &str| spec.get(label).map(|v| v.trim().to_string()).unwrap_or_default();
    DiamondDetails {
        carat: get(TOTAL_DIAMOND_CARAT),
        quality: get(DIAMOND_QUALITY),
        shape: get(DIAMOND_SHAPE),
        count: get(TOTAL_DIAMONDS),
    }
}

/// Reduce the description to whitespace-collapsed text segments.
fn segments(raw: &str) -> Vec<String> {
    let markup = has_markup(raw);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < raw.len() {
        let rest = &raw[i..];

        if rest.starts_with('<') {
            if let Some((len, block)) = parse_tag(rest) {
                if block {
                    flush(&mut current, &mut out);
                }
                i += len;
                continue;
            }
        }

        if rest.starts_with('&') {
            if let Some((entity, decoded)) = ENTITIES.iter().find(|(e, _)| rest.starts_with(e)) {
                current.push_str(decoded);
                i += entity.len();
                continue;
            }
        }

        // `rest` is non-empty and starts on a char boundary
        let c = rest.chars().next().unwrap_or(' ');
        let line_break = c == '\n'
            && (!markup || (current.contains(':') && line_opens_label(&rest[1..])));
        if line_break {
            flush(&mut current, &mut out);
        } else {
            current.push(c);
        }
        i += c.len_utf8();
    }
    flush(&mut current, &mut out);

    out
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    let collapsed = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        out.push(collapsed);
    }
    current.clear();
}

/// Whether the next line begins with its own `Label:`. Inside markup a
/// newline only ends the segment in that case, so a value wrapped over
/// several lines of one `<li>` stays whole.
fn line_opens_label(rest: &str) -> bool {
    let line = rest.split('\n').next().unwrap_or("");
    let text = strip_tags(line);
    let Some((label, _)) = text.split_once(':') else {
        return false;
    };
    let label = label.replace('*', "");
    let label = label.trim();
    !label.is_empty()
        && label.chars().count() <= MAX_LABEL_CHARS
        && label
            .chars()
            .all(|c| c.is_alphanumeric() || c.is_whitespace() || "-()/&.'".contains(c))
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if let Some((len, _)) = parse_tag(rest) {
            i += len;
            continue;
        }
        let c = rest.chars().next().unwrap_or(' ');
        out.push(c);
        i += c.len_utf8();
    }
    out
}

fn has_markup(raw: &str) -> bool {
    raw.match_indices('<')
        .any(|(i, _)| parse_tag(&raw[i..]).is_some())
}

/// Recognize a tag at the start of `s`, returning its byte length and
/// whether it is block-level.
fn parse_tag(s: &str) -> Option<(usize, bool)> {
    let mut chars = s.chars();
    if chars.next() != Some('<') {
        return None;
    }
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' => {}
        _ => return None,
    }

    let end = s.find('>')?;
    let name: String = s[1..end]
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    Some((end + 1, BLOCK_TAGS.contains(&name.as_str())))
}

/// Cut a segment so every known `Label:` marker starts a new piece.
fn split_at_known_labels(segment: &str) -> Vec<String> {
    let lower = segment.to_ascii_lowercase();
    let mut starts: Vec<usize> = KNOWN_LABELS
        .iter()
        .flat_map(|label| marker_positions(&lower, label))
        .filter(|&pos| pos > 0)
        .collect();
    starts.sort_unstable();
    starts.dedup();

    let mut pieces = Vec::with_capacity(starts.len() + 1);
    let mut from = 0;
    for start in starts {
        pieces.push(segment[from..start].to_string());
        from = start;
    }
    pieces.push(segment[from..].to_string());
    pieces
}

/// Byte offsets in `lower` where `label:` appears as a whole label.
fn marker_positions(lower: &str, label: &str) -> Vec<usize> {
    let needle = format!("{}:", label.to_ascii_lowercase());
    lower
        .match_indices(&needle)
        .map(|(pos, _)| pos)
        .filter(|&pos| !is_word_char_before(lower, pos))
        .filter(|&pos| !is_tail_of_longer_label(lower, pos, label))
        .collect()
}

fn is_word_char_before(lower: &str, pos: usize) -> bool {
    lower[..pos]
        .chars()
        .next_back()
        .map(|c| c.is_alphanumeric())
        .unwrap_or(false)
}

/// "Diamond Weight:" inside "Total Diamond Weight:" is not its own label
fn is_tail_of_longer_label(lower: &str, pos: usize, label: &str) -> bool {
    let label_lower = label.to_ascii_lowercase();
    KNOWN_LABELS.iter().any(|longer| {
        let longer = longer.to_ascii_lowercase();
        if longer.len() <= label_lower.len() || !longer.ends_with(&label_lower) {
            return false;
        }
        let prefix_len = longer.len() - label_lower.len();
        pos >= prefix_len
            && lower.is_char_boundary(pos - prefix_len)
            && lower[pos - prefix_len..].starts_with(&longer)
    })
}

/// Split `Label: Value` at the first colon. Markdown emphasis is dropped.
fn split_pair(piece: &str) -> Option<(String, String)> {
    let (label, value) = piece.split_once(':')?;
    let label = label.replace('*', "").trim().to_string();
    let value = value
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .to_string();

    if label.is_empty() || value.is_empty() {
        return None;
    }
    Some((label, value))
}
