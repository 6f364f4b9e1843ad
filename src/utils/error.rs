use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentalError {
    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("{action} requires the {required} capability")]
    CapabilityRequired { action: String, required: String },

    #[error("No unit selected")]
    NoUnitSelected,

    #[error("Unit {unit_id} is not available")]
    UnitUnavailable { unit_id: u32 },

    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Access,
    State,
    Lookup,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RentalError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            identifier: identifier.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::InvalidInput { .. } => ErrorCategory::Validation,
            Self::AuthenticationRequired | Self::CapabilityRequired { .. } => {
                ErrorCategory::Access
            }
            Self::NoUnitSelected
            | Self::UnitUnavailable { .. }
            | Self::InvalidTransition { .. } => ErrorCategory::State,
            Self::NotFound { .. } => ErrorCategory::Lookup,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::StoreError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Access | ErrorCategory::State => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message, .. } => message.clone(),
            Self::NotFound { entity, identifier } => {
                format!("The requested {} ({}) does not exist", entity, identifier)
            }
            Self::AuthenticationRequired => "Please sign in first".to_string(),
            Self::CapabilityRequired { action, required } => {
                format!("Only a {} can {}", required, action)
            }
            Self::NoUnitSelected => "Please select a unit first".to_string(),
            Self::UnitUnavailable { unit_id } => {
                format!("Unit {} has already been rented", unit_id)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "Correct the highlighted field and submit again",
            Self::InvalidInput { .. } => "Check the unit price and lease duration passed in",
            Self::NotFound { .. } => "Refresh the listing and pick an existing entry",
            Self::AuthenticationRequired => "Sign in with a tenant account",
            Self::CapabilityRequired { .. } => "Switch to an account with the required role",
            Self::NoUnitSelected | Self::UnitUnavailable { .. } => {
                "Go back to the unit catalog and choose an available unit"
            }
            Self::InvalidTransition { .. } => "Restart the checkout from the unit page",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Check the TOML configuration file",
            Self::StoreError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::CsvError(_) => "Check the data files and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, RentalError>;
