use crate::Variant;
use std::fmt;
use std::path::{Path, PathBuf};

/// An error that can occur when escaping, unescaping, or transcoding files
#[derive(Debug)]
pub struct Error(Box<ErrorImpl>);

#[derive(Debug)]
struct ErrorImpl {
    kind: ErrorKind,
    path: Option<PathBuf>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(ErrorImpl { kind, path: None }))
    }

    /// Attach the file that was being processed. The first path attached
    /// wins, so nested calls keep the most specific file.
    pub(crate) fn at(mut self, path: &Path) -> Error {
        if self.0.path.is_none() {
            self.0.path = Some(path.to_path_buf());
        }
        self
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// The file that was being processed when the error occurred (if any)
    pub fn path(&self) -> Option<&Path> {
        self.0.path.as_deref()
    }

    /// Returns the unit offset that the error occurs (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.kind.offset()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// An escape marker was not followed by a well formed low and high byte
    MalformedEscape { offset: usize },

    /// No format is defined for the variant and file extension
    UnsupportedFormat { variant: Variant, extension: String },

    /// A unit could not be represented by the serializer
    OutOfRange { unit: u32, offset: usize },

    /// Text input was not valid utf-8
    InvalidUtf8 { offset: usize },

    /// The game variant was not recognized
    UnknownVariant(String),

    /// The source path does not exist
    SourceNotFound(PathBuf),

    /// The output path is not usable for the given source
    InvalidOutput(PathBuf),

    /// An error occurred when performing IO.
    Io(std::io::Error),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::MalformedEscape { offset } => Some(offset),
            ErrorKind::OutOfRange { offset, .. } => Some(offset),
            ErrorKind::InvalidUtf8 { offset } => Some(offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.0.kind {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::MalformedEscape { offset } => {
                write!(f, "malformed escape sequence (offset: {})", offset)
            }
            ErrorKind::UnsupportedFormat {
                variant,
                ref extension,
            } => write!(
                f,
                "unsupported format: {} files are not defined for {}",
                extension, variant
            ),
            ErrorKind::OutOfRange { unit, offset } => write!(
                f,
                "unit 0x{:x} can not be serialized (offset: {})",
                unit, offset
            ),
            ErrorKind::InvalidUtf8 { offset } => {
                write!(f, "invalid utf-8 text (offset: {})", offset)
            }
            ErrorKind::UnknownVariant(ref x) => {
                write!(f, "unknown game type: {} (expected eu4 or ck2)", x)
            }
            ErrorKind::SourceNotFound(ref x) => write!(f, "source not found: {}", x.display()),
            ErrorKind::InvalidOutput(ref x) => write!(f, "invalid output path: {}", x.display()),
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0.kind, f)?;
        if let Some(path) = self.0.path.as_ref() {
            write!(f, " in {}", path.display())?;
        }

        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}
