use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("{resource} already exists")]
    AlreadyExists { resource: String },

    #[error("{resource} does not exist")]
    NotFound { resource: String },

    #[error("{service} {operation} failed: {message}")]
    Cloud {
        service: &'static str,
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Provisioning error: {message}")]
    ProvisioningError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Cloud,
    Network,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LabError {
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::ProvisioningError {
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::Cloud { .. }
            | Self::Timeout { .. }
            | Self::ProvisioningError { .. } => ErrorCategory::Cloud,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyExists { .. } | Self::NotFound { .. } => ErrorSeverity::Low,
            Self::Timeout { .. } | Self::HttpError(_) => ErrorSeverity::Medium,
            Self::Cloud { .. }
            | Self::ProvisioningError { .. }
            | Self::SerializationError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::AlreadyExists { resource } => {
                format!("{} is left as is; run destroy first for a clean deployment", resource)
            }
            Self::NotFound { resource } => {
                format!("Check that {} was created in the configured region", resource)
            }
            Self::Cloud { code, .. } => match code.as_deref() {
                Some("AccessDenied") | Some("AccessDeniedException") => {
                    "Check that your AWS profile has permission for this call".to_string()
                }
                Some("ExpiredToken") | Some("ExpiredTokenException") => {
                    "Refresh your credentials (for example `aws sso login`)".to_string()
                }
                Some("TooManyRequestsException") | Some("ThrottlingException") => {
                    "Wait a moment and run the command again".to_string()
                }
                _ => "Inspect the service message above and the AWS console".to_string(),
            },
            Self::Timeout { .. } => {
                "The resource may still be transitioning; check its status and retry".to_string()
            }
            Self::HttpError(_) => "Check the API URL, API key and network access".to_string(),
            Self::IoError(_) => "Check that the file exists and is readable".to_string(),
            Self::SerializationError(_) => "Check that the data file is valid JSON".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Fix the configuration file or the command line flags".to_string()
            }
            Self::ProvisioningError { .. } => {
                "Run destroy to remove partial resources, then deploy again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Cloud => format!("Cloud operation failed: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
        }
    }

    /// Process exit code for an error that aborted a run; never zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
