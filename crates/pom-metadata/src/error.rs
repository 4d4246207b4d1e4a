//! Errors raised while extracting metadata from a pom.xml.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PomError {
    #[error("Failed to load POM document '{document}': {source}")]
    DocumentLoad {
        document: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Missing required field '{field}' under '{path}' in '{document}'")]
    MissingField {
        field: &'static str,
        path: String,
        document: String,
    },

    #[error("Property '{property}' in '{document}' is not a valid threshold: '{value}'")]
    NumericParse {
        property: String,
        value: String,
        document: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No {field} declared by the module and no parent to inherit it from")]
    NoIdentityAvailable { field: &'static str },

    #[error("Invalid extractor configuration ({origin}): {source}")]
    Config {
        origin: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, PomError>;

impl PomError {
    pub(crate) fn load(
        document: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DocumentLoad {
            document: document.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn config(
        origin: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Config {
            origin: origin.into(),
            source: source.into(),
        }
    }

    /// Name of the document the error refers to, when known.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::DocumentLoad { document, .. }
            | Self::MissingField { document, .. }
            | Self::NumericParse { document, .. } => Some(document),
            Self::NoIdentityAvailable { .. } | Self::Config { .. } => None,
        }
    }
}
