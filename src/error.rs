/// Failure categories shared by the fetch pipeline and the dashboard.
///
/// Series-level kinds (`Network`, `EmptyResponse`, `MalformedResponse`) only ever
/// skip one series; `Persistence` and `MissingArtifact` end the current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential, bad catalog file, unknown sheet, bad CLI input.
    Config,
    /// Request error, timeout, or non-success HTTP status.
    Network,
    /// The provider answered but returned zero records.
    EmptyResponse,
    /// The body was not the JSON shape the provider adapter expects.
    MalformedResponse,
    /// Unparseable date/value at render time.
    Parse,
    /// Workbook write/read or file-system error.
    Persistence,
    /// The workbook is absent after a fetch-and-write run.
    MissingArtifact,
    /// Terminal setup, drawing, or input error.
    Terminal,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Network => "network failure",
            ErrorKind::EmptyResponse => "empty response",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Parse => "parse failure",
            ErrorKind::Persistence => "persistence failure",
            ErrorKind::MissingArtifact => "missing artifact",
            ErrorKind::Terminal => "terminal",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::Config => 2,
            ErrorKind::Network
            | ErrorKind::EmptyResponse
            | ErrorKind::MalformedResponse
            | ErrorKind::Parse => 4,
            ErrorKind::Persistence => 5,
            ErrorKind::MissingArtifact => 6,
            ErrorKind::Terminal => 7,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::new(ErrorKind::Config, "x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::EmptyResponse, "x").exit_code(), 4);
        assert_eq!(AppError::new(ErrorKind::Persistence, "x").exit_code(), 5);
        assert_eq!(AppError::new(ErrorKind::MissingArtifact, "x").exit_code(), 6);
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::new(ErrorKind::Network, "ECOS request failed: timeout");
        assert_eq!(err.to_string(), "ECOS request failed: timeout");
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
