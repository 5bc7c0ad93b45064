use crate::domain::repository::UniquenessProbe;
use crate::error::{AccountsServiceError, ConflictField};

/// Candidate values for one aggregate, plus the ids to leave out of the
/// scan when the aggregate is being updated rather than created.
#[derive(Debug, Clone, Copy)]
pub struct UniquenessCheck<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub identity_number: &'a str,
    pub exclude_user: Option<i32>,
    pub exclude_person: Option<i32>,
}

impl<'a> UniquenessCheck<'a> {
    /// Check for a brand-new aggregate: nothing to exclude.
    pub fn for_create(username: &'a str, email: &'a str, identity_number: &'a str) -> Self {
        Self {
            username,
            email,
            identity_number,
            exclude_user: None,
            exclude_person: None,
        }
    }
}

/// Checks candidate username/email/identity-number values against the
/// existing records. Read-only.
pub struct UniquenessValidator<P: UniquenessProbe> {
    pub probe: P,
}

impl<P: UniquenessProbe> UniquenessValidator<P> {
    /// Probe the fields in fixed order (username, then email, then
    /// identity number) and report the first conflict found.
    pub async fn validate(&self, check: UniquenessCheck<'_>) -> Result<(), AccountsServiceError> {
        if self
            .probe
            .username_taken(check.username, check.exclude_user)
            .await?
        {
            return Err(AccountsServiceError::AlreadyExists(ConflictField::Username));
        }
        if self
            .probe
            .email_taken(check.email, check.exclude_person)
            .await?
        {
            return Err(AccountsServiceError::AlreadyExists(ConflictField::Email));
        }
        if self
            .probe
            .identity_number_taken(check.identity_number, check.exclude_person)
            .await?
        {
            return Err(AccountsServiceError::AlreadyExists(
                ConflictField::IdentityNumber,
            ));
        }
        Ok(())
    }

    /// Username-only check, used when an update changes the username.
    pub async fn validate_username(
        &self,
        username: &str,
        exclude_user: Option<i32>,
    ) -> Result<(), AccountsServiceError> {
        if self.probe.username_taken(username, exclude_user).await? {
            return Err(AccountsServiceError::AlreadyExists(ConflictField::Username));
        }
        Ok(())
    }
}
