//! Recording-filename heuristics.
//!
//! Recorder output follows two naming conventions, both starting with an
//! eight-digit date:
//!
//! - `YYYYMMDD HHMM - service name - title[ - description]`
//! - `YYYYMMDD - title`
//!
//! plus an optional `_NNN` cut-number suffix appended by the trim job. The
//! parser extracts title, cut number and the embedded timestamp; everything
//! it cannot prove stays untouched so the caller can fall back to resolver
//! metadata or filesystem times.

use std::ffi::OsStr;

use chrono::{NaiveDate, NaiveDateTime};

/// Time assumed for the date-only naming convention.
const DUMMY_TIME: (u32, u32) = (20, 0);

/// Outcome of the filename grammar, before any resolver lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilename {
    /// Title remainder; may be empty when the name was only a date block.
    pub title: String,
    /// Three-digit trim counter, empty when absent.
    pub cut_number: String,
    /// Timestamp embedded in the name, when both conventions' digit groups
    /// parse into a valid calendar date.
    pub recorded_at: Option<NaiveDateTime>,
}

fn all_ascii_digits(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit)
}

fn parse_timestamp(date_digits: &str, time_digits: &str) -> Option<NaiveDateTime> {
    let year: i32 = date_digits.get(0..4)?.parse().ok()?;
    let month: u32 = date_digits.get(4..6)?.parse().ok()?;
    let day: u32 = date_digits.get(6..8)?.parse().ok()?;
    let hour: u32 = time_digits.get(0..2)?.parse().ok()?;
    let minute: u32 = time_digits.get(2..4)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

/// Applies the filename grammar to a name with the extension already removed.
pub fn parse_stem(stem: &str) -> ParsedFilename {
    let mut title = stem.to_string();
    let mut cut_number = String::new();

    // Trim jobs append `_NNN` at a fixed offset from the end.
    let bytes = title.as_bytes();
    if bytes.len() >= 4
        && bytes[bytes.len() - 4] == b'_'
        && all_ascii_digits(&bytes[bytes.len() - 3..])
    {
        cut_number = title[title.len() - 3..].to_string();
        title.truncate(title.len() - 4);
    }

    title = title.replace('_', " ");

    let mut recorded_at = None;
    let bytes = title.as_bytes();
    if bytes.len() >= 8 && all_ascii_digits(&bytes[..8]) {
        let has_time_block = bytes.get(8).map_or(false, |b| !b.is_ascii_digit())
            && bytes.len() >= 13
            && all_ascii_digits(&bytes[9..13]);
        if has_time_block {
            // `YYYYMMDD HHMM - service name - title`
            recorded_at = parse_timestamp(&title[0..8], &title[9..13]);
            let mut rest = title.get(16..).unwrap_or("").to_string();
            // Skip the service-name segment up to the first separator.
            if let Some(split) = rest.find(" - ") {
                if split > 0 {
                    rest = rest[split + 3..].to_string();
                }
            }
            title = rest;
        } else if title.get(8..11) == Some(" - ") {
            // `YYYYMMDD - title`
            let time = format!("{:02}{:02}", DUMMY_TIME.0, DUMMY_TIME.1);
            recorded_at = parse_timestamp(&title[0..8], &time);
            title = title[11..].to_string();
        }
    }

    ParsedFilename {
        title,
        cut_number,
        recorded_at,
    }
}

/// Remapped code points for bytes 0x80..=0x9F; `None` marks the five bytes
/// CP1252 leaves undefined.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Reinterprets raw bytes as CP1252. Returns `None` when a byte has no
/// CP1252 meaning, in which case the entry is dropped by the builder.
pub fn decode_cp1252(bytes: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        let c = match b {
            0x00..=0x7F => char::from(b),
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize]?,
            _ => char::from_u32(u32::from(b))?,
        };
        out.push(c);
    }
    Some(out)
}

/// Recovers a display string from a raw filename: UTF-8 when valid,
/// otherwise the CP1252 reinterpretation of the same bytes.
pub fn decode_filename(raw: &OsStr) -> Option<String> {
    if let Some(utf8) = raw.to_str() {
        return Some(utf8.to_string());
    }
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        return decode_cp1252(raw.as_bytes());
    }
    #[cfg(not(unix))]
    {
        Some(raw.to_string_lossy().into_owned())
    }
}
