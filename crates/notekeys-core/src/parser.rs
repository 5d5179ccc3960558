use crate::error::MappingError;
use crate::keymap::named_key_char;
use crate::mapping::{MappingSets, MappingTable};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub fn load_mappings<P: AsRef<Path>>(path: P) -> Result<MappingSets> {
    let path = path.as_ref();
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = decode_bytes(&raw);
    let sets =
        parse_mappings(text.as_ref()).with_context(|| format!("parsing {}", path.display()))?;
    Ok(sets)
}

/// BOM first, then UTF-8, then Shift_JIS.
fn decode_bytes(raw: &[u8]) -> Cow<'_, str> {
    let (enc, body) = match encoding_rs::Encoding::for_bom(raw) {
        Some((enc, bom_len)) => (enc, &raw[bom_len..]),
        None => match std::str::from_utf8(raw) {
            Ok(s) => return Cow::Borrowed(s),
            Err(_) => (encoding_rs::SHIFT_JIS, raw),
        },
    };
    debug!("Decoding mapping file as {}", enc.name());
    let (text, _, had_errors) = enc.decode(body);
    if had_errors {
        warn!("{} decode replaced invalid bytes", enc.name());
    }
    text
}

/// Parse mapping sets.
///
/// ```text
/// ; Piano layouts
/// [lower]
/// 60 = a
/// C#4 = 'A'
/// D4 = <left>
/// ```
pub fn parse_mappings(content: &str) -> Result<MappingSets, MappingError> {
    let mut sets = MappingSets::default();
    let mut current: Option<(String, HashMap<u8, char>)> = None;

    let flush = |sets: &mut MappingSets, current: Option<(String, HashMap<u8, char>)>| {
        if let Some((name, map)) = current {
            if sets.sets.contains_key(&name) {
                warn!("Mapping set [{}] defined twice, keeping the last one", name);
            }
            sets.sets.insert(name, map.into_iter().collect::<MappingTable>());
        }
    };

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();

        if line.starts_with(';') {
            if sets.name.is_none() && current.is_none() && sets.sets.is_empty() {
                let name = line.trim_start_matches(';').trim();
                if !name.is_empty() {
                    sets.name = Some(name.to_string());
                }
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim();
            if name.is_empty() {
                return Err(MappingError::EmptySectionName { line: line_no });
            }
            flush(&mut sets, current.take());
            current = Some((name.to_string(), HashMap::new()));
            continue;
        }

        let Some((_, map)) = current.as_mut() else {
            return Err(MappingError::EntryOutsideSection { line: line_no });
        };
        let (lhs, rhs) = line
            .split_once('=')
            .ok_or(MappingError::MissingSeparator { line: line_no })?;
        let lhs = lhs.trim();
        let rhs = rhs.trim();

        let note = parse_note(lhs).ok_or_else(|| MappingError::InvalidNote {
            line: line_no,
            text: lhs.to_string(),
        })?;
        let ch = parse_key(rhs).ok_or_else(|| MappingError::InvalidKey {
            line: line_no,
            text: rhs.to_string(),
        })?;

        if let Some(prev) = map.insert(note, ch) {
            warn!(
                "Line {}: note {} mapped again ({:?} -> {:?})",
                line_no, note, prev, ch
            );
        }
    }

    flush(&mut sets, current);
    Ok(sets)
}

/// Note number (`60`) or note name (`C4`, `F#3`, `Bb-1`), middle C = C4 = 60.
pub fn parse_note(raw: &str) -> Option<u8> {
    if let Ok(n) = raw.parse::<u8>() {
        return (n <= 127).then_some(n);
    }

    let mut chars = raw.chars();
    let pitch_class: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (accidental, octave) = if let Some(o) = rest.strip_prefix('#') {
        (1, o)
    } else if let Some(o) = rest.strip_prefix('b') {
        (-1, o)
    } else {
        (0, rest)
    };
    let octave: i32 = octave.parse().ok()?;
    if !(-1..=9).contains(&octave) {
        return None;
    }
    let n = (octave + 1) * 12 + pitch_class + accidental;
    u8::try_from(n).ok().filter(|&n| n <= 127)
}

/// A single character, a quoted character, or a `<named>` key.
pub fn parse_key(raw: &str) -> Option<char> {
    if raw.len() > 2 && raw.starts_with('<') && raw.ends_with('>') {
        return named_key_char(&raw[1..raw.len() - 1]);
    }
    let inner = strip_quotes(raw).unwrap_or(raw);
    let mut chars = inner.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn strip_quotes(raw: &str) -> Option<&str> {
    let q = raw.chars().next()?;
    if (q == '\'' || q == '"') && raw.len() >= 2 && raw.ends_with(q) {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}
