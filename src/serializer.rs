use crate::{Error, ErrorKind};
use std::io::Write;

const BOM: &[u8] = b"\xef\xbb\xbf";

/// Writes escaped units into the bytes of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Serializer {
    /// Utf-8 text prefixed with a byte order mark
    Utf8Bom,

    /// One raw byte per unit
    SingleByte,
}

impl Serializer {
    /// Serializes the units into the writer.
    ///
    /// ```
    /// use pdx_escape::Serializer;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut out: Vec<u8> = Vec::new();
    /// Serializer::SingleByte.write_units(&[0x41, 0x80, 0xff], &mut out)?;
    /// assert_eq!(&out, b"A\x80\xff");
    ///
    /// out.clear();
    /// Serializer::Utf8Bom.write_units(&[0x41, 0x20ac], &mut out)?;
    /// assert_eq!(&out, "\u{feff}A€".as_bytes());
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_units<W: Write>(self, units: &[u32], mut writer: W) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(units.len() + BOM.len());
        match self {
            Serializer::Utf8Bom => {
                buf.extend_from_slice(BOM);
                let mut scratch = [0u8; 4];
                for (offset, &unit) in units.iter().enumerate() {
                    let c = std::char::from_u32(unit)
                        .ok_or_else(|| Error::new(ErrorKind::OutOfRange { unit, offset }))?;
                    buf.extend_from_slice(c.encode_utf8(&mut scratch).as_bytes());
                }
            }
            Serializer::SingleByte => {
                for (offset, &unit) in units.iter().enumerate() {
                    if unit > 0xff {
                        return Err(Error::new(ErrorKind::OutOfRange { unit, offset }));
                    }
                    buf.push(unit as u8);
                }
            }
        }

        writer.write_all(&buf)?;
        Ok(())
    }

    /// Parses file data back into units. The inverse of
    /// [`Serializer::write_units`], though a missing byte order mark is
    /// tolerated.
    ///
    /// ```
    /// use pdx_escape::Serializer;
    ///
    /// let units = Serializer::Utf8Bom.read_units("\u{feff}A€".as_bytes()).unwrap();
    /// assert_eq!(units, vec![0x41, 0x20ac]);
    ///
    /// let units = Serializer::SingleByte.read_units(b"A\x80").unwrap();
    /// assert_eq!(units, vec![0x41, 0x80]);
    /// ```
    pub fn read_units(self, data: &[u8]) -> Result<Vec<u32>, Error> {
        match self {
            Serializer::Utf8Bom => {
                let text = read_text(data, true)?;
                Ok(text.chars().map(u32::from).collect())
            }
            Serializer::SingleByte => Ok(data.iter().copied().map(u32::from).collect()),
        }
    }
}

/// Interprets source data as utf-8 text, optionally stripping a leading
/// byte order mark.
pub(crate) fn read_text(data: &[u8], strip_bom: bool) -> Result<&str, Error> {
    let body = if strip_bom {
        data.strip_prefix(BOM).unwrap_or(data)
    } else {
        data
    };

    std::str::from_utf8(body).map_err(|e| {
        let offset = e.valid_up_to() + (data.len() - body.len());
        Error::new(ErrorKind::InvalidUtf8 { offset })
    })
}
