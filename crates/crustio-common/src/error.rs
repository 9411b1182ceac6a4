use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrustioError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("franchise not found: {0}")]
    FranchiseNotFound(String),
    #[error("store not found: {franchise}/{store}")]
    StoreNotFound { franchise: String, store: String },
    #[error("menu item not found: {0}")]
    MenuItemNotFound(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication required: {0}")]
    AuthRequired(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("order fulfillment failed: {0}")]
    FulfillmentFailed(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrustioError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UserNotFound",
            Self::UserAlreadyExists(_) => "UserAlreadyExists",
            Self::FranchiseNotFound(_) => "FranchiseNotFound",
            Self::StoreNotFound { .. } => "StoreNotFound",
            Self::MenuItemNotFound(_) => "MenuItemNotFound",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::AuthRequired(_) => "AuthRequired",
            Self::AccessDenied(_) => "AccessDenied",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::FulfillmentFailed(_) => "FulfillmentFailed",
            Self::InternalError(_) => "InternalError",
            Self::Io(_) => "InternalError",
        }
    }
}

pub type Result<T> = std::result::Result<T, CrustioError>;
