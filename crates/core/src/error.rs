use std::io;

/// Errors that can occur while converting a module graph
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected kind for property struct field: {0}")]
    UnsupportedFieldKind(String),

    #[error("properties must be a struct, got {0}")]
    InvalidPropertyShape(String),

    #[error(
        "{name} ({existing}) is present in properties whereas it should be consolidated into a commonAttributes"
    )]
    DuplicatePropertyName { name: String, existing: String },

    #[error("Unknown {axis}: {config}")]
    UnknownDiscriminator { axis: String, config: String },

    #[error("Unknown code-generation mode: {0}")]
    UnknownCodegenMode(String),

    #[error("{0} attribute could not be collapsed as it has two or more unrelated axes")]
    UncollapsibleAttribute(String),

    #[error("{0}")]
    UnconvertedDeps(String),

    #[error("{0}")]
    MissingDeps(String),

    #[error("Error while parsing property: {name:?}. {source}")]
    Property {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Error generating target {label}: {source}")]
    Target {
        label: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Graph decode error: {0}")]
    GraphDecode(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Wraps an error raised while printing the named property.
    pub fn in_property(self, name: impl Into<String>) -> Self {
        Error::Property {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wraps an error raised while generating the labelled target.
    pub fn in_target(self, label: impl Into<String>) -> Self {
        Error::Target {
            label: label.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through property and target context.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Property { source, .. } | Error::Target { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;
