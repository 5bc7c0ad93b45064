/// Field whose uniqueness invariant a candidate value collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
    IdentityNumber,
}

impl ConflictField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::IdentityNumber => "identity number",
        }
    }
}

/// Accounts service domain error variants.
///
/// Every variant aborts the current unit of work in full before it
/// reaches the caller; there are no partial writes behind any of them.
#[derive(Debug, thiserror::Error)]
pub enum AccountsServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("person not found")]
    PersonNotFound,
    #[error("account aggregate not found")]
    AggregateNotFound,
    #[error("{} already exists", .0.as_str())]
    AlreadyExists(ConflictField),
    #[error("invalid username")]
    InvalidUsername,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid identity number")]
    InvalidIdentityNumber,
    #[error("invalid phone")]
    InvalidPhone,
    #[error("invalid birth date")]
    InvalidBirthDate,
    #[error("conflicting concurrent modification")]
    StoreConflict,
    #[error("account storage failure")]
    Store(#[from] anyhow::Error),
}

impl AccountsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PersonNotFound => "PERSON_NOT_FOUND",
            Self::AggregateNotFound => "AGGREGATE_NOT_FOUND",
            Self::AlreadyExists(ConflictField::Username) => "USERNAME_ALREADY_EXISTS",
            Self::AlreadyExists(ConflictField::Email) => "EMAIL_ALREADY_EXISTS",
            Self::AlreadyExists(ConflictField::IdentityNumber) => {
                "IDENTITY_NUMBER_ALREADY_EXISTS"
            }
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidIdentityNumber => "INVALID_IDENTITY_NUMBER",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InvalidBirthDate => "INVALID_BIRTH_DATE",
            Self::StoreConflict => "STORE_CONFLICT",
            Self::Store(_) => "STORE_FAILURE",
        }
    }

    /// Whether a caller may retry the operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreConflict)
    }
}
