//! Windows-1252 encoding utilities for Latin thermal printers
//!
//! Receipts are composed in UTF-8. Before sending, text is mapped to the
//! printer's single-byte code page:
//! - `₹` has no code point in CP1252 and is spelled out as `Rs.`
//! - other unmappable characters become `?`
//! - ESC/POS command bytes (ASCII range) pass through untouched

use tracing::instrument;

/// ESC t 16 - select code page WPC1252
const SELECT_CP1252: [u8; 3] = [0x1B, 0x74, 16];

/// Replace characters the printer cannot show
pub fn sanitize_for_printer(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '₹' => out.push_str("Rs."),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut tmp = [0u8; 4];
                let (_, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut tmp));
                out.push(if had_errors { '?' } else { c });
            }
        }
    }
    out
}

/// Printed width of a string in columns (one byte per character in CP1252)
pub fn text_width(s: &str) -> usize {
    sanitize_for_printer(s).chars().count()
}

/// Truncate to at most `max_width` printed columns
pub fn truncate_text(s: &str, max_width: usize) -> String {
    sanitize_for_printer(s).chars().take(max_width).collect()
}

/// Pad (or truncate) to exactly `width` printed columns
pub fn pad_text(s: &str, width: usize, align_right: bool) -> String {
    let clean = sanitize_for_printer(s);
    let current = clean.chars().count();
    if current >= width {
        return clean.chars().take(width).collect();
    }
    let spaces = " ".repeat(width - current);
    if align_right {
        format!("{spaces}{clean}")
    } else {
        format!("{clean}{spaces}")
    }
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to CP1252
///
/// ASCII bytes (0x00-0x7F) are copied as-is so command sequences survive;
/// runs of non-ASCII bytes are decoded as UTF-8 and re-encoded. The code
/// page is selected at the start and again after every INIT (`ESC @`).
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn encode_for_printer(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len() + 8);
    result.extend_from_slice(&SELECT_CP1252);

    let mut buffer = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];

        if b == 0x1B && i + 1 < bytes.len() && bytes[i + 1] == 0x40 {
            flush_buffer(&mut buffer, &mut result);
            result.extend_from_slice(&[0x1B, 0x40]);
            result.extend_from_slice(&SELECT_CP1252);
            i += 2;
            continue;
        }

        if b < 0x80 {
            flush_buffer(&mut buffer, &mut result);
            result.push(b);
        } else {
            buffer.push(b);
        }
        i += 1;
    }
    flush_buffer(&mut buffer, &mut result);
    result
}

fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }
    let text = String::from_utf8_lossy(buffer);
    let clean = sanitize_for_printer(&text);
    let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(&clean);
    result.extend_from_slice(&encoded);
    buffer.clear();
}
