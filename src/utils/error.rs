use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GtpError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Result table error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    // 以下錯誤的 Display 直接作為 GTP 失敗回應的文字
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("invalid color: \"{0}\"")]
    InvalidColor(String),

    #[error("invalid vertex: \"{0}\"")]
    InvalidVertex(String),

    #[error("unacceptable size")]
    InvalidBoardSize(usize),

    #[error("illegal move: \"{color} {vertex}\" {reason}")]
    IllegalMove {
        color: String,
        vertex: String,
        reason: String,
    },

    #[error("cannot undo")]
    CannotUndo,

    #[error("protocol error: {message}")]
    Protocol { message: String },

    #[error("{engine} failed on '{command}': {message}")]
    EngineFailure {
        engine: String,
        command: String,
        message: String,
    },

    #[error("{engine} did not answer '{command}' within {timeout:?}")]
    EngineTimeout {
        engine: String,
        command: String,
        timeout: Duration,
    },

    #[error("{engine} exited unexpectedly")]
    EngineExited { engine: String },

    #[error("Failed to start '{command}': {message}")]
    Process { command: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Protocol,
    Rules,
    Engine,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GtpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GtpError::ConfigValidationError { .. }
            | GtpError::InvalidConfigValueError { .. }
            | GtpError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GtpError::Syntax { .. }
            | GtpError::Protocol { .. }
            | GtpError::InvalidColor(_)
            | GtpError::InvalidVertex(_)
            | GtpError::PatternError(_) => ErrorCategory::Protocol,
            GtpError::InvalidBoardSize(_)
            | GtpError::IllegalMove { .. }
            | GtpError::CannotUndo => ErrorCategory::Rules,
            GtpError::EngineFailure { .. }
            | GtpError::EngineTimeout { .. }
            | GtpError::EngineExited { .. } => ErrorCategory::Engine,
            GtpError::IoError(_)
            | GtpError::CsvError(_)
            | GtpError::SerializationError(_)
            | GtpError::Process { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Rules => ErrorSeverity::Low,
            ErrorCategory::Engine => match self {
                GtpError::EngineTimeout { .. } => ErrorSeverity::Medium,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Protocol | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GtpError::MissingConfigError { field } => {
                format!("Provide a value for '{}' in the config file or on the command line", field)
            }
            GtpError::InvalidConfigValueError { field, .. }
            | GtpError::ConfigValidationError { field, .. } => {
                format!("Check the value of '{}'", field)
            }
            GtpError::EngineTimeout { .. } => {
                "Increase timeout_secs or check that the engine is not stuck".to_string()
            }
            GtpError::EngineExited { .. } | GtpError::Process { .. } => {
                "Run the engine command by hand and check its stderr output".to_string()
            }
            GtpError::EngineFailure { .. } | GtpError::Protocol { .. } => {
                "Check that the engine implements the GTP commands used by the match".to_string()
            }
            GtpError::IoError(_) | GtpError::CsvError(_) => {
                "Check permissions and free space in the results directory".to_string()
            }
            GtpError::PatternError(_) => "Fix the #? pattern in the test file".to_string(),
            _ => "No action required".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Engine => format!("Engine problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, GtpError>;
