use thiserror::Error;

/// Result type alias using ApiDiffError
pub type Result<T> = std::result::Result<T, ApiDiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of every error
/// the comparison engine can surface. Each kind maps to a stable error code
/// that CI tooling can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    UnsupportedFormat,
    InvalidDocument,

    // References
    CircularReference,
    UnresolvableReference,

    // Classification
    /// The taxonomy table has no severity for an emitted entity/action pair
    ClassificationGap,

    // Collaborators
    /// The schema-diff collaborator failed for one body location
    SchemaDiff,

    // Integration/IO
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::UnsupportedFormat => "ERR_UNSUPPORTED_FORMAT",
            ExErrorKind::InvalidDocument => "ERR_INVALID_DOCUMENT",
            ExErrorKind::CircularReference => "ERR_CIRCULAR_REFERENCE",
            ExErrorKind::UnresolvableReference => "ERR_UNRESOLVABLE_REFERENCE",
            ExErrorKind::ClassificationGap => "ERR_CLASSIFICATION_GAP",
            ExErrorKind::SchemaDiff => "ERR_SCHEMA_DIFF",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification fields used for programmatic handling plus the
/// context a reporter needs to print an actionable message: which document,
/// which location inside it, and which operation was running.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    document: Option<String>,
    pointer: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            document: None,
            pointer: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the original location of the document being processed
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Add a location inside the document (dot-joined path or JSON pointer)
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the document location, if any
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Get the in-document location, if any
    pub fn pointer(&self) -> Option<&str> {
        self.pointer.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:?}", self.code(), self.kind)?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(document) = &self.document {
            write!(f, " (document: {})", document)?;
        }
        if let Some(pointer) = &self.pointer {
            write!(f, " (at: {})", pointer)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for resolution, canonicalisation and classification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiDiffError {
    // ===== Reference Errors =====
    /// A reference reappeared on its own resolution path
    #[error("Circular reference detected: {reference} (chain: {})", chain.join(" -> "))]
    CircularReference {
        reference: String,
        chain: Vec<String>,
    },

    /// A reference is external, malformed, or points at nothing
    #[error("Unresolvable reference: {reference}: {reason}")]
    UnresolvableReference { reference: String, reason: String },

    // ===== Document Errors =====
    /// Format tag or version key is not one the builder understands
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// A structural node has the wrong JSON type
    #[error("Invalid document at {location}: {reason}")]
    InvalidDocument { location: String, reason: String },

    // ===== Classification Errors =====
    /// The taxonomy table has no entry for a composite code
    #[error("No severity registered for difference code: {code}")]
    ClassificationGap { code: String },

    // ===== Configuration =====
    /// Engine configuration could not be read or is inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ===== Serialization =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from ApiDiffError to ExError
impl From<ApiDiffError> for ExError {
    fn from(err: ApiDiffError) -> Self {
        match err {
            ApiDiffError::CircularReference { reference, chain } => {
                ExError::new(ExErrorKind::CircularReference)
                    .with_pointer(reference)
                    .with_op("resolve_reference")
                    .with_message(format!("Reference cycle: {}", chain.join(" -> ")))
            }

            ApiDiffError::UnresolvableReference { reference, reason } => {
                ExError::new(ExErrorKind::UnresolvableReference)
                    .with_pointer(reference)
                    .with_op("resolve_reference")
                    .with_message(reason)
            }

            ApiDiffError::UnsupportedFormat { format } => {
                ExError::new(ExErrorKind::UnsupportedFormat)
                    .with_op("build_canonical_spec")
                    .with_message(format!("Unsupported format: {}", format))
            }

            ApiDiffError::InvalidDocument { location, reason } => {
                ExError::new(ExErrorKind::InvalidDocument)
                    .with_pointer(location)
                    .with_op("build_canonical_spec")
                    .with_message(reason)
            }

            ApiDiffError::ClassificationGap { code } => {
                ExError::new(ExErrorKind::ClassificationGap)
                    .with_op("classify")
                    .with_message(format!("No severity registered for code `{}`", code))
            }

            ApiDiffError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::Config).with_message(reason)
            }

            ApiDiffError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ApiDiffError
impl From<serde_json::Error> for ApiDiffError {
    fn from(err: serde_json::Error) -> Self {
        ApiDiffError::Serialization {
            message: err.to_string(),
        }
    }
}
