//! PDF page count discovery
//!
//! Only the page tree is inspected: the root `/Type /Pages` node carries the
//! total number of leaf pages in its `/Count` entry. Page trees stored inside
//! compressed object streams are not visible to this scan; documents whose
//! leaf pages are still plain objects fall back to counting `/Type /Page`.

use crate::error::IoError;
use jewelviz_core::Result;

/// Number of pages in a PDF document
pub fn page_count(bytes: &[u8]) -> Result<u32> {
    Ok(scan_page_count(bytes)?)
}

fn scan_page_count(bytes: &[u8]) -> std::result::Result<u32, IoError> {
    let mut tree_count: Option<u32> = None;
    let mut leaves = 0u32;

    for pos in find_all(bytes, b"/Type") {
        let rest = skip_whitespace(&bytes[pos + 5..]);
        match name_token(rest) {
            Some(b"/Pages") => {
                let (start, end) = enclosing_object(bytes, pos);
                if let Some(count) = count_entry(&bytes[start..end]) {
                    // The root of the tree has the largest count
                    tree_count = Some(tree_count.map_or(count, |c| c.max(count)));
                }
            }
            Some(b"/Page") => leaves += 1,
            _ => {}
        }
    }

    let total = match tree_count {
        Some(count) if count > 0 => count,
        _ if leaves > 0 => leaves,
        _ => return Err(IoError::MissingPageTree),
    };

    tracing::debug!(pages = total, "Resolved PDF page count");
    Ok(total)
}

fn find_all<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, w)| *w == needle)
        .map(|(i, _)| i)
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[start..]
}

/// Leading PDF name token such as `/Pages`
fn name_token(data: &[u8]) -> Option<&[u8]> {
    if data.first() != Some(&b'/') {
        return None;
    }
    let len = data[1..]
        .iter()
        .position(|&b| is_delimiter(b))
        .map_or(data.len(), |i| i + 1);
    Some(&data[..len])
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'/' | b'<' | b'>' | b'[' | b']' | b'(' | b')')
}

/// Byte range of the indirect object surrounding `pos`
fn enclosing_object(bytes: &[u8], pos: usize) -> (usize, usize) {
    let start = bytes[..pos]
        .windows(3)
        .rposition(|w| w == b"obj")
        .map_or(0, |i| i + 3);
    let end = find_from(bytes, b"endobj", pos).unwrap_or(bytes.len());
    (start, end)
}

fn count_entry(object: &[u8]) -> Option<u32> {
    let at = find_from(object, b"/Count", 0)?;
    let rest = skip_whitespace(&object[at + 6..]);
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()
}
