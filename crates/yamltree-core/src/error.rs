//! Error types for yamltree
//!
//! Errors are structured: a kind, the dotted path being resolved, the file
//! involved (if any), and an actionable help message.

use std::fmt;
use std::path::Path;

/// Result type alias for yamltree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for yamltree operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Dotted path being resolved when the error occurred (e.g., "mcs.camera.exposure")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl SourceLocation {
    /// A location naming only a file
    pub fn file(path: &Path) -> Self {
        Self {
            file: path.display().to_string(),
            line: None,
            column: None,
        }
    }
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No prefix of the dotted path names a YAML file
    NotFound,
    /// A path exists but is not a regular file, or the dotted path is malformed
    InvalidPath,
    /// A placeholder is malformed or has no namespace entry
    Interpolation,
    /// A segment after the owning file does not exist in the loaded structure
    KeyNotFound { segment: String },
    /// A typed accessor was used on a value of another type
    TypeMismatch,
    /// Malformed YAML
    Parse,
    /// The file exists but could not be read
    Io,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a not found error; callers attach the dotted path
    pub fn not_found(cause: impl Into<String>) -> Self {
        Self {
            help: Some(
                "Check that a matching directory or .yaml file exists under the config root"
                    .into(),
            ),
            cause: Some(cause.into()),
            ..Self::new(ErrorKind::NotFound)
        }
    }

    /// Create an invalid path error for a filesystem path that is not a regular file
    pub fn invalid_path(file: &Path) -> Self {
        Self {
            source_location: Some(SourceLocation::file(file)),
            help: Some("Replace it with a regular YAML file".into()),
            cause: Some(format!("'{}' is not a regular file", file.display())),
            ..Self::new(ErrorKind::InvalidPath)
        }
    }

    /// Create an error for a malformed dotted path
    pub fn malformed_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            help: Some("Dotted paths look like 'actor.section.key'".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::InvalidPath)
        }
        .with_path(path)
    }

    /// Create an error for a placeholder with no namespace entry
    pub fn unresolved_placeholder(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            help: Some(format!(
                "Provide '{}' in the namespace, or write '$$' for a literal '$'",
                name
            )),
            cause: Some(format!("No namespace entry for '{}'", name)),
            ..Self::new(ErrorKind::Interpolation)
        }
    }

    /// Create an error for text that is not a valid placeholder
    pub fn invalid_placeholder(message: impl Into<String>) -> Self {
        Self {
            help: Some("Placeholders look like ${name} or $name; write '$$' for a literal '$'".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Interpolation)
        }
    }

    /// Create a key not found error for a segment inside a loaded file
    pub fn key_not_found(segment: impl Into<String>, path: impl Into<String>) -> Self {
        let segment = segment.into();
        Self {
            help: Some(format!(
                "Check that '{}' exists in the file that owns this path",
                segment
            )),
            ..Self::new(ErrorKind::KeyNotFound { segment })
        }
        .with_path(path)
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            help: Some(format!("Ensure the value is a {}", expected.into())),
            cause: Some(format!("Got: {}", got.into())),
            ..Self::new(ErrorKind::TypeMismatch)
        }
        .with_path(path)
    }

    /// Create a YAML parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create an I/O error for a file that could not be read
    pub fn io(file: &Path, err: std::io::Error) -> Self {
        Self {
            source_location: Some(SourceLocation::file(file)),
            cause: Some(err.to_string()),
            ..Self::new(ErrorKind::Io)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add path context unless the error already carries one
    pub fn or_path(self, path: &str) -> Self {
        if self.path.is_some() {
            self
        } else {
            self.with_path(path)
        }
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }

    pub fn is_key_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::KeyNotFound { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::NotFound => write!(f, "Configuration not found")?,
            ErrorKind::InvalidPath => write!(f, "Invalid path")?,
            ErrorKind::Interpolation => write!(f, "Interpolation failed")?,
            ErrorKind::KeyNotFound { segment } => write!(f, "Key not found: {}", segment)?,
            ErrorKind::TypeMismatch => write!(f, "Type mismatch")?,
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
                if let Some(column) = loc.column {
                    write!(f, ":{}", column)?;
                }
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
