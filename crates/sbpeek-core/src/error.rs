use std::fmt;

/// Everything that can stop a peek run.
///
/// The first two variants are raised before any network access; the last
/// three come from the broker boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad command line input (conflicting flags, `--max` out of range).
    Usage(String),
    /// No queue name could be resolved.
    Configuration(String),
    /// Missing or rejected SAS credentials.
    Authentication(String),
    /// The queue or its dead-letter sub-queue does not exist.
    NotFound(String),
    /// Network or service failure.
    Transport(String),
}

impl Error {
    /// Process exit code for this error: 1 for usage/configuration problems,
    /// 2 for failures reported by the broker.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) | Error::Configuration(_) => 1,
            Error::Authentication(_) | Error::NotFound(_) | Error::Transport(_) => 2,
        }
    }

    /// Classifies an SDK error by its rendered text.
    pub fn from_broker<E: fmt::Display + fmt::Debug>(err: E) -> Self {
        let message = format!("{err}");
        let haystack = format!("{message} {err:?}").to_ascii_lowercase();

        if AUTH_MARKERS.iter().any(|m| haystack.contains(m)) {
            Error::Authentication(message)
        } else if NOT_FOUND_MARKERS.iter().any(|m| haystack.contains(m)) {
            Error::NotFound(message)
        } else {
            Error::Transport(message)
        }
    }

    /// Prepends `step` to the message, keeping the variant.
    pub fn context(self, step: &str) -> Self {
        match self {
            Error::Usage(m) => Error::Usage(format!("{step}: {m}")),
            Error::Configuration(m) => Error::Configuration(format!("{step}: {m}")),
            Error::Authentication(m) => Error::Authentication(format!("{step}: {m}")),
            Error::NotFound(m) => Error::NotFound(format!("{step}: {m}")),
            Error::Transport(m) => Error::Transport(format!("{step}: {m}")),
        }
    }
}

const AUTH_MARKERS: &[&str] = &[
    "unauthorized",
    "unauthorizedaccess",
    "401",
    "invalid signature",
    "sharedaccesskey",
    "authorization",
];

const NOT_FOUND_MARKERS: &[&str] = &["not found", "notfound", "404", "could not be found"];

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage(msg) => write!(f, "usage error: {}", msg),
            Error::Configuration(msg) => write!(f, "{}", msg),
            Error::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            Error::NotFound(msg) => write!(f, "entity not found: {}", msg),
            Error::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
