//! Hex dump rendering for raw wire messages.
//!
//! Layout, per line of eight bytes:
//!
//! ```text
//! 47 45 54 20 2f 20 48 54 \tG E T   /   H T \n
//! ```
//!
//! Each byte is two lowercase hex digits and a space; the ASCII column shows
//! printable bytes as themselves and everything else as `.`, each followed
//! by a space. The last line has no trailing newline, and a short last line
//! is padded so its ASCII column lines up with the lines above.

/// Bytes per line.
pub const GROUP_SIZE: usize = 8;

/// Width of one hex cell (`"ff "`).
const HEX_CELL: &str = "   ";

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Renders `bytes` as a hex dump.
///
/// # Examples
///
/// ```
/// use txn_inspector::decoder::hexdump::hex_dump;
///
/// assert_eq!(hex_dump(b"Hi"), "48 69                   \tH i ");
/// assert_eq!(hex_dump(b""), "");
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let lines = bytes.len().div_ceil(GROUP_SIZE);
    // hex column + tab + ascii column + newline
    let mut out = String::with_capacity(lines * (GROUP_SIZE * 5 + 2));
    let mut ascii = String::with_capacity(GROUP_SIZE * 2);

    for (i, &b) in bytes.iter().enumerate() {
        if i != 0 && i % GROUP_SIZE == 0 {
            out.push('\t');
            out.push_str(&ascii);
            out.push('\n');
            ascii.clear();
        }

        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
        out.push(' ');

        ascii.push(printable(b));
        ascii.push(' ');
    }

    if !ascii.is_empty() {
        let filled = ascii.len() / 2;
        for _ in filled..GROUP_SIZE {
            out.push_str(HEX_CELL);
        }
        out.push('\t');
        out.push_str(&ascii);
    }

    out
}

fn printable(b: u8) -> char {
    if (0x20..=0x7e).contains(&b) {
        b as char
    } else {
        '.'
    }
}
