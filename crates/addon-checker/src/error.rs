//! Error types for addon-checker

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that escape the checker.
///
/// Lookups never fail: a missing or unreadable package is a `None`
/// version. What does escape is either a policy violation the user has
/// to act on, or a caller mistake.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A version or single-implementation policy is not met. The message
    /// is complete on its own.
    #[error("{message}")]
    AssertionFailed { message: String },

    #[error(
        "Invalid check target: {reason}. Expected a project ({{ root, addons }}) \
         or an addon ({{ name, root?, project: {{ root }} }})"
    )]
    InvalidTarget { reason: String },

    #[error("{kind} is no longer supported, only npm dependencies can be checked")]
    UnsupportedKind { kind: String },

    #[error("Invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] addon_fs::Error),
}

impl Error {
    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    /// Whether this is a policy violation rather than a caller mistake.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }

    /// Whether the message already explains the problem, so hosts should
    /// print it without any backtrace or error chain.
    pub fn suppress_stacktrace(&self) -> bool {
        self.is_policy_violation()
    }
}
