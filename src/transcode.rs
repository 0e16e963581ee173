use crate::serializer::read_text;
use crate::{Diagnostic, Error, ErrorKind, Format, Variant};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to a source file name when no output is given
pub const DEFAULT_SUFFIX: &str = "encode";

/// Extensions considered when walking a directory
const EXTENSIONS: [&str; 3] = ["yml", "csv", "txt"];

/// Which way files are transcoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Utf-8 source text into the escaped game format
    Encode,

    /// Escaped game files back into utf-8 text
    Decode,
}

/// Outcome of transcoding a single file
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub format: Format,
    pub diagnostics: Vec<Diagnostic>,
}

/// Transcodes localisation files on disk
///
/// ```no_run
/// use pdx_escape::{Transcoder, Variant};
/// use std::path::Path;
/// # fn main() -> Result<(), pdx_escape::Error> {
/// let reports = Transcoder::new(Variant::Eu4)
///     .strip_bom(true)
///     .run("localisation", Some(Path::new("out")))?;
/// for report in reports {
///     println!("{}", report.destination.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Transcoder {
    variant: Variant,
    strip_bom: bool,
    direction: Direction,
}

impl Transcoder {
    /// Creates a transcoder that encodes files of the given game
    pub fn new(variant: Variant) -> Self {
        Transcoder {
            variant,
            strip_bom: false,
            direction: Direction::Encode,
        }
    }

    /// Whether source text starts with a byte order mark that should be
    /// dropped before encoding. Otherwise the mark is escaped as text.
    pub fn strip_bom(&mut self, strip_bom: bool) -> &mut Self {
        self.strip_bom = strip_bom;
        self
    }

    /// Set the direction of the transcode
    pub fn direction(&mut self, direction: Direction) -> &mut Self {
        self.direction = direction;
        self
    }

    /// Transcodes a single source file into the destination path. The
    /// destination is only replaced once the output is complete.
    pub fn transcode_file(&self, src: &Path, dst: &Path) -> Result<FileReport, Error> {
        self.transcode_file_impl(src, dst).map_err(|e| e.at(src))
    }

    fn transcode_file_impl(&self, src: &Path, dst: &Path) -> Result<FileReport, Error> {
        let format = Format::from_path(self.variant, src)?;
        let data = fs::read(src)?;

        let (output, diagnostics) = match self.direction {
            Direction::Encode => {
                let text = read_text(&data, self.strip_bom)?;
                let encoded = format.encode(text);
                let mut out = Vec::with_capacity(data.len());
                format.serializer().write_units(&encoded.units, &mut out)?;
                (out, encoded.diagnostics)
            }
            Direction::Decode => {
                let text = format.from_slice(&data)?;
                let mut out = Vec::with_capacity(text.len() + 3);
                if self.strip_bom {
                    out.extend_from_slice(b"\xef\xbb\xbf");
                }
                out.extend_from_slice(text.as_bytes());
                (out, Vec::new())
            }
        };

        write_atomic(dst, &output)?;

        tracing::debug!(
            "{} -> {} ({}, {} diagnostics)",
            src.display(),
            dst.display(),
            format,
            diagnostics.len()
        );

        Ok(FileReport {
            source: src.to_path_buf(),
            destination: dst.to_path_buf(),
            format,
            diagnostics,
        })
    }

    /// Transcodes a file or every localisation file beneath a directory.
    ///
    /// - A file is written to `out` when it names a file, into `out` when it
    ///   is an existing directory, or next to the source with an `.encode`
    ///   suffix when absent.
    /// - A directory is mirrored into `out`, which must be an existing
    ///   directory, or each file is written next to its source with an
    ///   `.encode` suffix when absent. Only `yml`, `csv`, and `txt` files
    ///   are considered.
    ///
    /// The first failing file aborts the run.
    pub fn run<P: AsRef<Path>>(&self, src: P, out: Option<&Path>) -> Result<Vec<FileReport>, Error> {
        let src = src.as_ref();
        let reports = if src.is_file() {
            let dst = match out {
                None => suffixed(src),
                Some(out) if out.is_dir() => match src.file_name() {
                    Some(name) => out.join(name),
                    None => return Err(Error::new(ErrorKind::InvalidOutput(out.to_path_buf()))),
                },
                Some(out) if out.as_os_str().is_empty() => {
                    return Err(Error::new(ErrorKind::InvalidOutput(out.to_path_buf())))
                }
                Some(out) => out.to_path_buf(),
            };

            vec![self.transcode_file(src, &dst)?]
        } else if src.is_dir() {
            self.run_dir(src, out)?
        } else {
            return Err(Error::new(ErrorKind::SourceNotFound(src.to_path_buf())));
        };

        let diagnostics: usize = reports.iter().map(|x| x.diagnostics.len()).sum();
        tracing::info!(
            "transcoded {} files with {} diagnostics",
            reports.len(),
            diagnostics
        );

        Ok(reports)
    }

    fn run_dir(&self, src: &Path, out: Option<&Path>) -> Result<Vec<FileReport>, Error> {
        if let Some(out) = out {
            if !out.is_dir() {
                return Err(Error::new(ErrorKind::InvalidOutput(out.to_path_buf())));
            }
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(src).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(src).to_path_buf();
                Error::from(std::io::Error::from(e)).at(&path)
            })?;

            if entry.file_type().is_file() && has_localisation_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            let dst = match out {
                None => suffixed(&file),
                Some(out) => {
                    let relative = file.strip_prefix(src).unwrap_or(&file);
                    let dst = out.join(relative);
                    if let Some(parent) = dst.parent() {
                        fs::create_dir_all(parent).map_err(|e| Error::from(e).at(&file))?;
                    }
                    dst
                }
            };

            reports.push(self.transcode_file(&file, &dst)?);
        }

        Ok(reports)
    }
}

fn has_localisation_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|x| x.to_str())
        .map_or(false, |ext| {
            EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(ext))
        })
}

/// `dir/name.ext` -> `dir/name.ext.encode`
fn suffixed(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(DEFAULT_SUFFIX);
    path.with_file_name(name)
}

fn write_atomic(dst: &Path, data: &[u8]) -> Result<(), Error> {
    let dir = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.persist(dst).map_err(|e| Error::from(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("a/l_english.yml", "a/l_english.yml.encode")]
    #[case("text.csv", "text.csv.encode")]
    fn suffix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(suffixed(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case("a.yml", true)]
    #[case("a.YML", true)]
    #[case("b/a.csv", true)]
    #[case("a.txt", true)]
    #[case("a.yml.encode", false)]
    #[case("a.gui", false)]
    #[case("yml", false)]
    fn localisation_extension(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(has_localisation_extension(Path::new(input)), expected);
    }

    #[test]
    fn missing_source() {
        let err = Transcoder::new(Variant::Eu4)
            .run("this/does/not/exist.yml", None)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SourceNotFound(_)));
    }
}
