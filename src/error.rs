use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A single metric or event broke its input contract. Only that call fails.
    ContractViolation,
    /// The report payload as a whole could not be obtained or decoded.
    UpstreamDataUnavailable,
    Configuration,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::ContractViolation => "contract violation",
            ErrorKind::UpstreamDataUnavailable => "report unavailable",
            ErrorKind::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineError {
    kind: ErrorKind,
    message: String,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ContractViolation, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamDataUnavailable, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_contract_violation(&self) -> bool {
        self.kind == ErrorKind::ContractViolation
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
