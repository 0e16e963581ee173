use crate::data::{WINDOWS_1252, WINDOWS_1252_REVERSE};

/// Maps a codepoint onto its windows-1252 code position.
///
/// Only the handful of codepoints where windows-1252 diverges from latin-1
/// (the 0x80 - 0x9f block) are remapped. Everything else, including
/// codepoints that windows-1252 can't represent at all, is returned as is.
///
/// ```
/// use pdx_escape::to_codepage;
///
/// assert_eq!(to_codepage(0x20ac), 0x80); // €
/// assert_eq!(to_codepage(0x2122), 0x99); // ™
/// assert_eq!(to_codepage(u32::from('A')), u32::from('A'));
/// assert_eq!(to_codepage(0x3042), 0x3042); // あ
/// ```
#[inline]
pub fn to_codepage(codepoint: u32) -> u32 {
    // the whole table lives above latin-1
    if codepoint <= 0xff {
        return codepoint;
    }

    match WINDOWS_1252_REVERSE.binary_search_by_key(&codepoint, |&(cp, _)| cp) {
        Ok(idx) => u32::from(WINDOWS_1252_REVERSE[idx].1),
        Err(_) => codepoint,
    }
}

/// Maps a windows-1252 code position back onto its codepoint.
///
/// The inverse of [`to_codepage`]. Values outside of a single byte and the
/// five unused positions of the block are returned as is.
///
/// ```
/// use pdx_escape::from_codepage;
///
/// assert_eq!(from_codepage(0x80), 0x20ac);
/// assert_eq!(from_codepage(0x8a), 0x0160); // Š
/// assert_eq!(from_codepage(0x81), 0x81);
/// assert_eq!(from_codepage(0xff), 0xff);
/// assert_eq!(from_codepage(0x3042), 0x3042);
/// ```
#[inline]
pub fn from_codepage(unit: u32) -> u32 {
    if unit <= 0xff {
        WINDOWS_1252[unit as usize]
    } else {
        unit
    }
}
