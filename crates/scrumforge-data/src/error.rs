use thiserror::Error;

pub type ScrumResult<T> = std::result::Result<T, ScrumError>;

/// Machine-readable error kind, per the §7 error-handling table: every
/// `ScrumError` maps onto exactly one of these for disposition logic
/// upstream (strict/lenient sprint handling, retry policy, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Dependency,
    Subprocess,
    Io,
    Schema,
    Fatal,
}

#[derive(Error, Debug)]
pub enum ScrumError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        remediation: Option<String>,
    },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    #[error("conflict: {message}")]
    Conflict {
        message: String,
        remediation: Option<String>,
    },

    #[error("dependency error: {message}")]
    Dependency {
        message: String,
        remediation: Option<String>,
    },

    #[error("subprocess '{tool}' failed: {message}")]
    Subprocess {
        tool: String,
        message: String,
        timed_out: bool,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema error reading {path}: {message}")]
    Schema { path: String, message: String },

    #[error("fatal invariant violation: {0}")]
    Fatal(String),
}

impl ScrumError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            remediation: None,
        }
    }

    pub fn validation_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            remediation: Some(hint.into()),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            remediation: None,
        }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
            remediation: None,
        }
    }

    pub fn subprocess(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subprocess {
            tool: tool.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn subprocess_timeout(tool: impl Into<String>) -> Self {
        Self::Subprocess {
            tool: tool.into(),
            message: "timed out".to_string(),
            timed_out: true,
        }
    }

    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// The machine-readable kind, independent of the human message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Dependency { .. } => ErrorKind::Dependency,
            Self::Subprocess { .. } => ErrorKind::Subprocess,
            Self::Io(_) => ErrorKind::Io,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::Fatal(_) => ErrorKind::Fatal,
        }
    }

    /// Optional remediation hint surfaced to the caller alongside the message.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            Self::Validation { remediation, .. }
            | Self::Conflict { remediation, .. }
            | Self::Dependency { remediation, .. } => remediation.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScrumError {
    fn from(e: serde_json::Error) -> Self {
        Self::schema("<memory>", e.to_string())
    }
}

impl From<serde_yaml::Error> for ScrumError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::schema("<memory>", e.to_string())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "ValidationError",
            Self::NotFound => "NotFoundError",
            Self::Conflict => "ConflictError",
            Self::Dependency => "DependencyError",
            Self::Subprocess => "SubprocessError",
            Self::Io => "IOError",
            Self::Schema => "SchemaError",
            Self::Fatal => "FatalError",
        };
        write!(f, "{s}")
    }
}
