use crate::codepage::{from_codepage, to_codepage};
use crate::escape::{self, Encoded, EscapeConfig, EscapeMarker, Variant};
use crate::{Error, ErrorKind, Serializer};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// How the windows-1252 table wraps the escape step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodepageMode {
    /// The game reads the file as a raw windows-1252 byte stream. Input
    /// codepoints are mapped onto their code position before escaping.
    Bytes,

    /// The game reads the file as utf-8 and converts it to windows-1252
    /// itself. Escaped units in the 0x80 - 0x9f block are presented as the
    /// codepoints the game will convert back into those bytes.
    Text,
}

/// A localisation file format of a game
///
/// ```
/// use pdx_escape::{Format, Variant};
///
/// let format = Format::new(Variant::Eu4, "txt").unwrap();
/// assert_eq!(format, Format::Eu4Txt);
///
/// let data = format.to_vec("A€B").unwrap();
/// assert_eq!(data, vec![0x41, 0x80, 0x42]);
/// assert_eq!(format.from_slice(&data).unwrap(), "A€B");
///
/// assert!(Format::new(Variant::Ck2, "yml").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Format {
    /// EU4 `localisation/*.yml`
    Eu4Yml,

    /// EU4 `.txt` files
    Eu4Txt,

    /// CK2 `localisation/*.csv`
    Ck2Csv,

    /// CK2 `.txt` files
    Ck2Txt,
}

struct FormatDef {
    format: Format,
    variant: Variant,
    extension: &'static str,
    codepage: CodepageMode,
    serializer: Serializer,
}

static FORMATS: [FormatDef; 4] = [
    FormatDef {
        format: Format::Eu4Yml,
        variant: Variant::Eu4,
        extension: "yml",
        codepage: CodepageMode::Text,
        serializer: Serializer::Utf8Bom,
    },
    FormatDef {
        format: Format::Eu4Txt,
        variant: Variant::Eu4,
        extension: "txt",
        codepage: CodepageMode::Bytes,
        serializer: Serializer::SingleByte,
    },
    FormatDef {
        format: Format::Ck2Csv,
        variant: Variant::Ck2,
        extension: "csv",
        codepage: CodepageMode::Bytes,
        serializer: Serializer::SingleByte,
    },
    FormatDef {
        format: Format::Ck2Txt,
        variant: Variant::Ck2,
        extension: "txt",
        codepage: CodepageMode::Bytes,
        serializer: Serializer::SingleByte,
    },
];

impl Format {
    /// Every supported format
    pub const ALL: [Format; 4] = [Format::Eu4Yml, Format::Eu4Txt, Format::Ck2Csv, Format::Ck2Txt];

    /// Looks up the format of a game's file extension. A leading dot and
    /// ascii case are ignored.
    pub fn new(variant: Variant, extension: &str) -> Result<Format, Error> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        FORMATS
            .iter()
            .find(|def| def.variant == variant && def.extension.eq_ignore_ascii_case(ext))
            .map(|def| def.format)
            .ok_or_else(|| {
                Error::new(ErrorKind::UnsupportedFormat {
                    variant,
                    extension: String::from(extension),
                })
            })
    }

    /// Looks up the format from the extension of the path
    pub fn from_path<P: AsRef<Path>>(variant: Variant, path: P) -> Result<Format, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|x| x.to_string_lossy())
            .unwrap_or_default();
        Format::new(variant, &ext).map_err(|e| e.at(path))
    }

    #[inline]
    fn def(self) -> &'static FormatDef {
        match self {
            Format::Eu4Yml => &FORMATS[0],
            Format::Eu4Txt => &FORMATS[1],
            Format::Ck2Csv => &FORMATS[2],
            Format::Ck2Txt => &FORMATS[3],
        }
    }

    /// The game of the format
    pub fn variant(self) -> Variant {
        self.def().variant
    }

    /// The file extension of the format (without a dot)
    pub fn extension(self) -> &'static str {
        self.def().extension
    }

    /// The escape configuration of the game
    pub fn config(self) -> &'static EscapeConfig {
        self.variant().config()
    }

    /// How the windows-1252 table is applied
    pub fn codepage_mode(self) -> CodepageMode {
        self.def().codepage
    }

    /// How the escaped units are written out
    pub fn serializer(self) -> Serializer {
        self.def().serializer
    }

    /// Escapes the codepoints, producing the units the serializer writes
    pub fn encode_codepoints<I>(self, codepoints: I) -> Encoded
    where
        I: IntoIterator<Item = u32>,
    {
        let config = self.config();
        match self.codepage_mode() {
            CodepageMode::Bytes => escape::encode(codepoints.into_iter().map(to_codepage), config),
            CodepageMode::Text => {
                let mut out = escape::encode(codepoints, config);
                out.units.iter_mut().for_each(|x| *x = from_codepage(*x));
                out
            }
        }
    }

    /// Escapes text, producing the units the serializer writes
    pub fn encode(self, text: &str) -> Encoded {
        self.encode_codepoints(text.chars().map(u32::from))
    }

    /// Reverses [`Format::encode_codepoints`]
    pub fn decode_codepoints(self, units: &[u32]) -> Result<Vec<u32>, Error> {
        let config = self.config();
        match self.codepage_mode() {
            CodepageMode::Bytes => {
                let mut out = escape::decode(units, config)?;
                out.iter_mut().for_each(|x| *x = from_codepage(*x));
                Ok(out)
            }
            CodepageMode::Text => {
                // only the bytes of an escape group were presented through
                // the table, literal text is left as written
                let mut units = units.to_vec();
                let mut i = 0;
                while i < units.len() {
                    if EscapeMarker::from_unit(units[i]).is_some() {
                        for unit in units.iter_mut().skip(i + 1).take(2) {
                            *unit = to_codepage(*unit);
                        }
                        i += 3;
                    } else {
                        i += 1;
                    }
                }

                escape::decode(&units, config)
            }
        }
    }

    /// Reverses [`Format::encode`]
    pub fn decode(self, units: &[u32]) -> Result<String, Error> {
        let codepoints = self.decode_codepoints(units)?;
        let mut result = String::with_capacity(codepoints.len());
        let mut offset = 0;
        for cp in codepoints {
            let c = std::char::from_u32(cp)
                .ok_or_else(|| Error::new(ErrorKind::MalformedEscape { offset }))?;
            result.push(c);

            // markers are never remapped, so they still delimit the groups
            offset += match units.get(offset).copied().and_then(EscapeMarker::from_unit) {
                Some(_) => 3,
                None => 1,
            };
        }
        Ok(result)
    }

    /// Escapes the text and serializes it into the writer. Returns the
    /// diagnostics of the escape step.
    pub fn write_to<W: Write>(
        self,
        text: &str,
        writer: W,
    ) -> Result<Vec<escape::Diagnostic>, Error> {
        let encoded = self.encode(text);
        self.serializer().write_units(&encoded.units, writer)?;
        Ok(encoded.diagnostics)
    }

    /// Escapes and serializes the text into a new buffer
    pub fn to_vec(self, text: &str) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.write_to(text, &mut out)?;
        Ok(out)
    }

    /// Parses serialized data and reverses the escape
    pub fn from_slice(self, data: &[u8]) -> Result<String, Error> {
        let units = self.serializer().read_units(data)?;
        self.decode(&units)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} .{}", self.variant(), self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(Variant::Eu4, "yml", Format::Eu4Yml)]
    #[case(Variant::Eu4, ".yml", Format::Eu4Yml)]
    #[case(Variant::Eu4, "TXT", Format::Eu4Txt)]
    #[case(Variant::Ck2, "csv", Format::Ck2Csv)]
    #[case(Variant::Ck2, "txt", Format::Ck2Txt)]
    fn dispatch(#[case] variant: Variant, #[case] ext: &str, #[case] expected: Format) {
        let format = Format::new(variant, ext).unwrap();
        assert_eq!(format, expected);
        assert_eq!(format.variant(), variant);
    }

    #[rstest]
    #[case(Variant::Eu4, "csv")]
    #[case(Variant::Ck2, "yml")]
    #[case(Variant::Eu4, "")]
    #[case(Variant::Ck2, "gui")]
    fn unsupported(#[case] variant: Variant, #[case] ext: &str) {
        let err = Format::new(variant, ext).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedFormat { .. }));
    }

    #[test]
    fn table_is_consistent() {
        for format in Format::ALL.iter().copied() {
            assert_eq!(format.def().format, format);
            assert_eq!(Format::new(format.variant(), format.extension()).unwrap(), format);
        }
    }

    #[test]
    fn from_path_reports_path() {
        let err = Format::from_path(Variant::Eu4, "history/countries/FRA.gui").unwrap_err();
        assert_eq!(err.path(), Some(Path::new("history/countries/FRA.gui")));
        assert_eq!(
            Format::from_path(Variant::Ck2, "localisation/text.csv").unwrap(),
            Format::Ck2Csv
        );
    }

    #[test]
    fn bytes_mode_maps_codepage_first() {
        // € and ™ have windows-1252 positions, so they are not escaped
        let out = Format::Eu4Txt.encode("€™");
        assert_eq!(out.units, vec![0x80, 0x99]);
    }

    #[test]
    fn text_mode_escapes_everything_wide() {
        // € is escaped (high byte 0x20 collides)
        let out = Format::Eu4Yml.encode("€");
        assert_eq!(out.units, vec![0x12, 0xac, 0x17]);
    }

    #[test]
    fn text_mode_presents_block_as_codepoints() {
        // low byte 0x80 collides and is shifted to 0x8e, which is Ž
        let out = Format::Eu4Yml.encode("\u{3080}");
        assert_eq!(out.units, vec![0x11, 0x017d, 0x30]);
        assert_eq!(Format::Eu4Yml.decode(&out.units).unwrap(), "\u{3080}");
    }

    #[test]
    fn text_mode_keeps_literal_table_characters() {
        let text = "l_english:\n A:0 \"“x” € — ™…\"\n";
        let units = text.chars().map(u32::from).collect::<Vec<_>>();
        assert_eq!(Format::Eu4Yml.decode(&units).unwrap(), text);

        let mut data = b"\xef\xbb\xbf".to_vec();
        data.extend_from_slice(text.as_bytes());
        assert_eq!(Format::Eu4Yml.from_slice(&data).unwrap(), text);
    }

    #[test]
    fn text_mode_mixes_literal_and_escaped() {
        let mut units = vec![0x201c];
        units.extend(Format::Eu4Yml.encode("\u{3080}").units);
        units.push(0x20ac);
        assert_eq!(Format::Eu4Yml.decode(&units).unwrap(), "“\u{3080}€");
    }

    #[rstest]
    #[case(Format::Eu4Yml)]
    #[case(Format::Eu4Txt)]
    #[case(Format::Ck2Csv)]
    #[case(Format::Ck2Txt)]
    fn round_trip_text(#[case] format: Format) {
        let text = "l_english:\n KEY:0 \"日本語 Привет “quoted” — {$VAL$} #comment\"\r\n";
        let data = format.to_vec(text).unwrap();
        assert_eq!(format.from_slice(&data).unwrap(), text);
    }

    #[test]
    fn decode_rejects_surrogates() {
        // escapes U+D800
        let err = Format::Ck2Txt.decode(&[0x10, 0x00, 0xd8]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedEscape { offset: 0 }));
    }

    #[test]
    fn surrogate_offset_counts_units() {
        // two escape groups precede the surrogate
        let units = [0x10, 0x42, 0x30, 0x41, 0x10, 0x44, 0x30, 0x10, 0x00, 0xd8];
        let err = Format::Ck2Txt.decode(&units).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedEscape { offset: 7 }));
        assert_eq!(err.offset(), Some(7));
    }
}
