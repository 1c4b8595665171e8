use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for vmbridge-source operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename so that the parser and the
/// configuration loader can build labelled diagnostics without threading both
/// values through every call.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create an error for a token the parser did not expect.
    pub fn unexpected_token(
        &self,
        found: impl Into<String>,
        expected: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnexpectedToken {
            src: self.named_source(),
            span: span.into(),
            found: found.into(),
            expected: expected.into(),
        })
    }

    /// Create an error for input ending in the middle of a declaration.
    pub fn unexpected_eof(&self, expected: impl Into<String>) -> Box<Error> {
        let end = self.src.len();
        Box::new(Error::UnexpectedEof {
            src: self.named_source(),
            span: (end, 0).into(),
            expected: expected.into(),
        })
    }

    /// Create an error for a character the lexer cannot classify.
    pub fn invalid_character(&self, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::InvalidCharacter {
            src: self.named_source(),
            span: span.into(),
        })
    }

    /// Create a configuration parse error from a toml error.
    pub fn config_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Config {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a configuration validation error.
    pub fn invalid_config(&self, message: impl Into<String>) -> Box<Error> {
        Box::new(Error::InvalidConfig {
            src: self.named_source(),
            span: None,
            message: message.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(vmbridge::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected {found}")]
    #[diagnostic(code(vmbridge::parse_error), help("expected {expected}"))]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected {found}")]
        span: SourceSpan,
        found: String,
        expected: String,
    },

    #[error("unexpected end of file")]
    #[diagnostic(code(vmbridge::parse_error), help("expected {expected}"))]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("file ends here")]
        span: SourceSpan,
        expected: String,
    },

    #[error("unrecognized character")]
    #[diagnostic(code(vmbridge::lex_error))]
    InvalidCharacter {
        #[source_code]
        src: NamedSource<String>,
        #[label("not valid here")]
        span: SourceSpan,
    },

    #[error("failed to parse vmbridge.toml")]
    #[diagnostic(code(vmbridge::config_error))]
    Config {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(
        code(vmbridge::invalid_config),
        help("see the [project] and [markers] tables in vmbridge.toml")
    )]
    InvalidConfig {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}

impl Error {
    /// Create an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }
}
