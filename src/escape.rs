use crate::data::{CK2_ESCAPE_TARGETS, EU4_ESCAPE_TARGETS};
use crate::{Error, ErrorKind};
use std::fmt;
use std::str::FromStr;

/// The game whose text format is targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Variant {
    /// Europa Universalis IV
    Eu4,

    /// Crusader Kings II
    Ck2,
}

impl Variant {
    /// The escape configuration of the game
    pub fn config(self) -> &'static EscapeConfig {
        match self {
            Variant::Eu4 => &EscapeConfig::EU4,
            Variant::Ck2 => &EscapeConfig::CK2,
        }
    }

    /// Short lowercase name of the game
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Eu4 => "eu4",
            Variant::Ck2 => "ck2",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("eu4") {
            Ok(Variant::Eu4)
        } else if s.eq_ignore_ascii_case("ck2") {
            Ok(Variant::Ck2)
        } else {
            Err(Error::new(ErrorKind::UnknownVariant(String::from(s))))
        }
    }
}

/// The set of bytes a game's parser treats as syntax and the shifts that
/// move a colliding byte out of that set.
#[derive(Debug, PartialEq, Eq)]
pub struct EscapeConfig {
    targets: &'static [bool; 256],
    high_byte_shift: i16,
    low_byte_shift: i16,
}

impl EscapeConfig {
    /// Europa Universalis IV
    pub const EU4: EscapeConfig = EscapeConfig {
        targets: &EU4_ESCAPE_TARGETS,
        high_byte_shift: -9,
        low_byte_shift: 14,
    };

    /// Crusader Kings II
    pub const CK2: EscapeConfig = EscapeConfig {
        targets: &CK2_ESCAPE_TARGETS,
        high_byte_shift: -9,
        low_byte_shift: 15,
    };

    /// Returns true if the parser would interpret the byte as syntax
    #[inline]
    pub fn is_target(&self, byte: u8) -> bool {
        self.targets[usize::from(byte)]
    }

    /// Offset applied to a colliding high byte
    pub fn high_byte_shift(&self) -> i16 {
        self.high_byte_shift
    }

    /// Offset applied to a colliding low byte
    pub fn low_byte_shift(&self) -> i16 {
        self.low_byte_shift
    }
}

/// First unit of an escape sequence. Records which halves of the codepoint
/// were shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EscapeMarker {
    /// Neither byte collides
    NoCollision = 0x10,

    /// The low byte collides and is shifted
    LowCollides = 0x11,

    /// The high byte collides and is shifted
    HighCollides = 0x12,

    /// Both bytes collide and are shifted
    BothCollide = 0x13,
}

impl EscapeMarker {
    /// Interprets a unit as an escape marker
    ///
    /// ```
    /// use pdx_escape::EscapeMarker;
    /// assert_eq!(EscapeMarker::from_unit(0x12), Some(EscapeMarker::HighCollides));
    /// assert_eq!(EscapeMarker::from_unit(0x14), None);
    /// ```
    #[inline]
    pub fn from_unit(unit: u32) -> Option<EscapeMarker> {
        match unit {
            0x10 => Some(EscapeMarker::NoCollision),
            0x11 => Some(EscapeMarker::LowCollides),
            0x12 => Some(EscapeMarker::HighCollides),
            0x13 => Some(EscapeMarker::BothCollide),
            _ => None,
        }
    }

    #[inline]
    fn new(high_collides: bool, low_collides: bool) -> EscapeMarker {
        match (high_collides, low_collides) {
            (false, false) => EscapeMarker::NoCollision,
            (false, true) => EscapeMarker::LowCollides,
            (true, false) => EscapeMarker::HighCollides,
            (true, true) => EscapeMarker::BothCollide,
        }
    }

    /// The byte value of the marker
    pub fn value(self) -> u8 {
        self as u8
    }

    #[inline]
    fn high_shifted(self) -> bool {
        matches!(self, EscapeMarker::HighCollides | EscapeMarker::BothCollide)
    }

    #[inline]
    fn low_shifted(self) -> bool {
        matches!(self, EscapeMarker::LowCollides | EscapeMarker::BothCollide)
    }
}

/// A codepoint that did not make it through unharmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// Index of the codepoint in the input
    pub offset: usize,

    /// The offending codepoint
    pub codepoint: u32,

    /// What happened to it
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Returns true if the codepoint was omitted from the output
    pub fn is_skipped(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Null | DiagnosticKind::OutsideBmp)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            DiagnosticKind::Null => write!(f, "skipped null character (offset: {})", self.offset),
            DiagnosticKind::OutsideBmp => write!(
                f,
                "skipped U+{:X} outside of the basic multilingual plane (offset: {})",
                self.codepoint, self.offset
            ),
            DiagnosticKind::MarkerCollision => write!(
                f,
                "control character U+{:04X} collides with an escape marker (offset: {})",
                self.codepoint, self.offset
            ),
        }
    }
}

/// The reason a diagnostic was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiagnosticKind {
    /// A null character, never valid game text. Skipped.
    Null,

    /// A codepoint above 0xffff. Skipped.
    OutsideBmp,

    /// A raw 0x10 - 0x13 control character. Kept, but it will be read back
    /// as the start of an escape sequence.
    MarkerCollision,
}

/// Output of [`encode`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoded {
    /// Escaped units. Straight out of [`encode`] every unit is at most
    /// 0xff; [`Format::encode`](crate::Format::encode) may present them as
    /// wider codepoints.
    pub units: Vec<u32>,

    /// Codepoints that were skipped or are ambiguous
    pub diagnostics: Vec<Diagnostic>,
}

impl Encoded {
    /// Number of codepoints omitted from the output
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|x| x.is_skipped()).count()
    }
}

/// Escapes every codepoint that needs two bytes into a three unit sequence
/// of marker, low byte, and high byte.
///
/// Codepoints that fit in a single byte are emitted as is. Null and
/// codepoints outside the basic multilingual plane are dropped and
/// reported in [`Encoded::diagnostics`].
///
/// ```
/// use pdx_escape::{encode, EscapeConfig};
///
/// // あ is 0x3042: neither byte collides
/// let out = encode("aあ".chars().map(u32::from), &EscapeConfig::EU4);
/// assert_eq!(out.units, vec![0x61, 0x10, 0x42, 0x30]);
///
/// // 0x7b is "{" so the low byte is shifted
/// let out = encode([0x307b], &EscapeConfig::EU4);
/// assert_eq!(out.units, vec![0x11, 0x7b + 14, 0x30]);
/// ```
pub fn encode<I>(codepoints: I, config: &EscapeConfig) -> Encoded
where
    I: IntoIterator<Item = u32>,
{
    let codepoints = codepoints.into_iter();
    let mut result = Encoded {
        units: Vec::with_capacity(codepoints.size_hint().0),
        diagnostics: Vec::new(),
    };

    for (offset, codepoint) in codepoints.enumerate() {
        let kind = if codepoint > 0xffff {
            Some(DiagnosticKind::OutsideBmp)
        } else if codepoint == 0 {
            Some(DiagnosticKind::Null)
        } else {
            None
        };

        if let Some(kind) = kind {
            let diagnostic = Diagnostic {
                offset,
                codepoint,
                kind,
            };
            tracing::warn!("{}", diagnostic);
            result.diagnostics.push(diagnostic);
            continue;
        }

        let high = ((codepoint >> 8) & 0xff) as u8;
        let low = (codepoint & 0xff) as u8;

        if high == 0 {
            if EscapeMarker::from_unit(codepoint).is_some() {
                let diagnostic = Diagnostic {
                    offset,
                    codepoint,
                    kind: DiagnosticKind::MarkerCollision,
                };
                tracing::warn!("{}", diagnostic);
                result.diagnostics.push(diagnostic);
            }

            result.units.push(codepoint);
            continue;
        }

        let marker = EscapeMarker::new(config.is_target(high), config.is_target(low));
        let mut high = i16::from(high);
        let mut low = i16::from(low);

        if marker.low_shifted() {
            low += config.low_byte_shift;
        }

        if marker.high_shifted() {
            high += config.high_byte_shift;
        }

        result.units.push(u32::from(marker.value()));
        result.units.push(low as u32);
        result.units.push(high as u32);
    }

    result
}

/// Reverses [`encode`].
///
/// Every escape marker consumes the next two units as the low and high
/// byte of a codepoint. Any other unit is returned as is.
///
/// ```
/// use pdx_escape::{decode, EscapeConfig};
///
/// let out = decode(&[0x61, 0x10, 0x42, 0x30], &EscapeConfig::EU4).unwrap();
/// assert_eq!(out, vec![0x61, 0x3042]);
///
/// // truncated
/// assert!(decode(&[0x10, 0x42], &EscapeConfig::EU4).is_err());
/// ```
pub fn decode(units: &[u32], config: &EscapeConfig) -> Result<Vec<u32>, Error> {
    let mut result = Vec::with_capacity(units.len());
    let mut i = 0;
    while let Some(&unit) = units.get(i) {
        let marker = match EscapeMarker::from_unit(unit) {
            Some(marker) => marker,
            None => {
                result.push(unit);
                i += 1;
                continue;
            }
        };

        let malformed = || Error::new(ErrorKind::MalformedEscape { offset: i });
        let (low, high) = match units.get(i + 1..i + 3) {
            Some(&[low, high]) => (low, high),
            _ => return Err(malformed()),
        };

        let low = unshift(low, marker.low_shifted(), config.low_byte_shift).ok_or_else(malformed)?;
        let high =
            unshift(high, marker.high_shifted(), config.high_byte_shift).ok_or_else(malformed)?;

        // the encoder never escapes a single byte codepoint
        if high == 0 {
            return Err(malformed());
        }

        result.push((high << 8) | low);
        i += 3;
    }

    Ok(result)
}

#[inline]
fn unshift(unit: u32, shifted: bool, shift: i16) -> Option<u32> {
    if unit > 0xff {
        return None;
    }

    let value = if shifted {
        unit as i32 - i32::from(shift)
    } else {
        unit as i32
    };

    if (0..=0xff).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::*;

    fn configs() -> [&'static EscapeConfig; 2] {
        [&EscapeConfig::EU4, &EscapeConfig::CK2]
    }

    #[test]
    fn markers_are_never_targets() {
        for config in configs().iter() {
            for marker in 0x10..=0x13 {
                assert!(!config.is_target(marker));
            }
        }
    }

    #[test]
    fn shifted_bytes_are_never_targets() {
        for config in configs().iter() {
            for byte in (0u8..=0xff).filter(|x| config.is_target(*x)) {
                let low = i16::from(byte) + config.low_byte_shift();
                assert!((0..=0xff).contains(&low));
                assert!(!config.is_target(low as u8), "low 0x{:02x}", byte);

                if byte != 0 {
                    let high = i16::from(byte) + config.high_byte_shift();
                    assert!((0..=0xff).contains(&high));
                    assert!(!config.is_target(high as u8), "high 0x{:02x}", byte);
                }
            }
        }
    }

    #[rstest]
    #[case(0x3042, [0x10, 0x42, 0x30])] // あ
    #[case(0x305b, [0x11, 0x5b + 14, 0x30])] // low is [
    #[case(0x2042, [0x12, 0x42, 0x20 - 9])] // high is space
    #[case(0x0a0d, [0x13, 0x0d + 14, 0x0a - 9])] // both newlines
    #[case(0x4e00, [0x11, 0x00 + 14, 0x4e])] // 一 has a null low byte
    fn eu4_escape_sequences(#[case] codepoint: u32, #[case] expected: [u32; 3]) {
        let out = encode([codepoint], &EscapeConfig::EU4);
        assert_eq!(out.units, expected.to_vec());
        assert!(out.diagnostics.is_empty());
        assert_eq!(decode(&out.units, &EscapeConfig::EU4).unwrap(), vec![codepoint]);
    }

    #[test]
    fn null_low_byte_collides() {
        let out = encode([0x4e00], &EscapeConfig::CK2);
        assert_eq!(out.units, vec![0x11, 15, 0x4e]);
    }

    #[rstest]
    #[case(u32::from(b'#'), 0x10)]
    #[case(u32::from(b']'), 0x10)]
    #[case(u32::from(b'/'), 0x10)]
    #[case(u32::from(b'"'), 0x11)]
    fn ck2_targets_differ(#[case] low: u32, #[case] marker: u32) {
        let out = encode([0x3000 | low], &EscapeConfig::CK2);
        assert_eq!(out.units[0], marker);
    }

    #[test]
    fn euro_marker_follows_targets() {
        for config in configs().iter() {
            let out = encode([0x20ac], config);
            let expected = 0x10
                + (if config.is_target(0x20) { 2 } else { 0 })
                + (if config.is_target(0xac) { 1 } else { 0 });
            assert_eq!(out.units.len(), 3);
            assert_eq!(out.units[0], expected);
            assert_eq!(out.units[0], 0x12);
        }
    }

    #[test]
    fn drop_null_and_astral() {
        let out = encode([0x00, 0x10ffff, 0x41], &EscapeConfig::EU4);
        assert_eq!(out.units, vec![0x41]);
        assert_eq!(
            out.diagnostics,
            vec![
                Diagnostic {
                    offset: 0,
                    codepoint: 0,
                    kind: DiagnosticKind::Null
                },
                Diagnostic {
                    offset: 1,
                    codepoint: 0x10ffff,
                    kind: DiagnosticKind::OutsideBmp
                },
            ]
        );
        assert_eq!(out.skipped(), 2);
    }

    #[test]
    fn raw_marker_is_reported_and_kept() {
        let out = encode([0x41, 0x11, 0x42], &EscapeConfig::EU4);
        assert_eq!(out.units, vec![0x41, 0x11, 0x42]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MarkerCollision);
        assert_eq!(out.skipped(), 0);
    }

    #[test]
    fn single_byte_passthrough() {
        for config in configs().iter() {
            for cp in 0x01..=0xff {
                assert_eq!(encode([cp], config).units, vec![cp]);
            }
        }
    }

    #[test]
    fn escape_shape() {
        for config in configs().iter() {
            for cp in (0x100..=0xffff).step_by(7) {
                let units = encode([cp], config).units;
                assert_eq!(units.len(), 3);
                assert!(EscapeMarker::from_unit(units[0]).is_some());
                assert!(units.iter().all(|x| *x <= 0xff));
                assert!(!config.is_target(units[1] as u8));
                assert!(!config.is_target(units[2] as u8));
            }
        }
    }

    #[test]
    fn round_trip_bmp() {
        for config in configs().iter() {
            for cp in (0x01..=0xffff).filter(|x| EscapeMarker::from_unit(*x).is_none()) {
                let out = encode([cp], config);
                assert_eq!(decode(&out.units, config).unwrap(), vec![cp], "U+{:04X}", cp);
            }
        }
    }

    #[rstest]
    #[case(&[0x10])]
    #[case(&[0x41, 0x13, 0x20])]
    #[case(&[0x11, 0x100, 0x30])]
    #[case(&[0x10, 0x41, 0x00])]
    #[case(&[0x12, 0x41, 0xfc])]
    fn malformed_escapes(#[case] units: &[u32]) {
        let err = decode(units, &EscapeConfig::EU4).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedEscape { .. }));
    }

    #[test]
    fn malformed_escape_offset() {
        let err = decode(&[0x41, 0x42, 0x10, 0x43], &EscapeConfig::CK2).unwrap_err();
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn decode_passes_wide_units() {
        let out = decode(&[0x3042, 0x41], &EscapeConfig::EU4).unwrap();
        assert_eq!(out, vec![0x3042, 0x41]);
    }

    #[rstest]
    #[case("eu4", Variant::Eu4)]
    #[case("EU4", Variant::Eu4)]
    #[case("ck2", Variant::Ck2)]
    fn parse_variant(#[case] input: &str, #[case] expected: Variant) {
        assert_eq!(input.parse::<Variant>().unwrap(), expected);
    }

    #[test]
    fn parse_unknown_variant() {
        let err = "hoi4".parse::<Variant>().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownVariant(x) if x == "hoi4"));
    }

    #[quickcheck]
    fn text_round_trip(data: String) -> bool {
        let codepoints = data
            .chars()
            .map(u32::from)
            .filter(|&x| x != 0 && x <= 0xffff && EscapeMarker::from_unit(x).is_none())
            .collect::<Vec<_>>();
        let out = encode(codepoints.iter().copied(), &EscapeConfig::EU4);
        decode(&out.units, &EscapeConfig::EU4).unwrap() == codepoints
    }

    #[quickcheck]
    fn decode_never_panics(data: Vec<u32>) -> bool {
        let _ = decode(&data, &EscapeConfig::CK2);
        true
    }
}
