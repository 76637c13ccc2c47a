//! Byte-budget shortening of individual path components
//!
//! Most filesystems cap a single name at 255 bytes. Over-long names are cut
//! from the middle outwards so both the recognisable prefix and suffix
//! survive, and the removed run is replaced with a single [`SHORTEN_MARKER`].
//! Shortening is applied per component, never across a whole path.

/// Character spliced in where codepoints were removed
pub const SHORTEN_MARKER: char = '#';

/// Number of bytes `s` occupies when encoded as UTF-8
///
/// `str::len` already counts bytes; this names the unit at call sites
/// that compare against a byte budget.
#[inline]
pub fn utf8_len(s: &str) -> usize {
    s.len()
}

/// Shorten `component` so its UTF-8 encoding is at least `bytes_to_remove`
/// bytes shorter than the original, after accounting for the marker.
///
/// Codepoints are dropped starting at the midpoint, alternating between the
/// left and right side of the removed run, until `bytes_to_remove + 1` bytes
/// are gone. The extra byte pays for the one-byte marker.
///
/// ```rust
/// use classfile_paths::shorten::shorten_path_component;
///
/// assert_eq!(shorten_path_component("abcdefghij", 3), "abcd#ij");
/// ```
pub fn shorten_path_component(component: &str, bytes_to_remove: usize) -> String {
    let chars: Vec<char> = component.chars().collect();
    if chars.is_empty() {
        return SHORTEN_MARKER.to_string();
    }

    let target = bytes_to_remove + 1;
    let mid = chars.len() / 2;

    // removed run is chars[left..right]
    let mut left = mid;
    let mut right = mid + 1;
    let mut removed = chars[mid].len_utf8();

    // with an even count, take both middle codepoints unless one already suffices
    if chars.len() % 2 == 0 && removed < target && right < chars.len() {
        removed += chars[right].len_utf8();
        right += 1;
    }

    while removed < target && (left > 0 || right < chars.len()) {
        if left > 0 {
            left -= 1;
            removed += chars[left].len_utf8();
        }
        if removed < target && right < chars.len() {
            removed += chars[right].len_utf8();
            right += 1;
        }
    }

    let mut shortened = String::with_capacity(component.len() + 1 - removed.min(component.len()));
    shortened.extend(&chars[..left]);
    shortened.push(SHORTEN_MARKER);
    shortened.extend(&chars[right..]);
    shortened
}

/// Shorten `component` only if it (plus `suffix`, e.g. a file extension)
/// exceeds `max_bytes`. Returns the component unchanged otherwise.
pub fn fit_component(component: &str, suffix: &str, max_bytes: usize) -> String {
    let total = utf8_len(component) + utf8_len(suffix);
    if total > max_bytes {
        shorten_path_component(component, total - max_bytes)
    } else {
        component.to_string()
    }
}
