use tracing::warn;

use campus_domain::audit::AuditAction;

use crate::domain::repository::{AccountStore, RoleLookup, UniquenessProbe};
use crate::domain::types::{
    AggregateIds, AuditEntry, PersonFields, validate_birth_date, validate_email,
    validate_identity_number, validate_phone, validate_username,
};
use crate::error::AccountsServiceError;
use crate::usecase::uniqueness::{UniquenessCheck, UniquenessValidator};

/// Field-format checks shared by create and update. Runs before any
/// store access and names the first offending field.
fn validate_formats(username: &str, person: &PersonFields) -> Result<(), AccountsServiceError> {
    if !validate_username(username) {
        return Err(AccountsServiceError::InvalidUsername);
    }
    if !validate_email(&person.email) {
        return Err(AccountsServiceError::InvalidEmail);
    }
    if !validate_identity_number(&person.identity_number) {
        return Err(AccountsServiceError::InvalidIdentityNumber);
    }
    if !validate_phone(&person.phone) {
        return Err(AccountsServiceError::InvalidPhone);
    }
    if !validate_birth_date(person.birth_date) {
        return Err(AccountsServiceError::InvalidBirthDate);
    }
    Ok(())
}

/// Resolve role names to ids, deduplicating and skipping names that do
/// not resolve. A role-name typo costs that one role, not the whole
/// aggregate mutation.
async fn resolve_role_ids<R: RoleLookup>(
    roles: &R,
    role_names: &[String],
) -> Result<Vec<i32>, AccountsServiceError> {
    let mut role_ids = Vec::with_capacity(role_names.len());
    for name in role_names {
        match roles.find_by_name(name).await? {
            Some(role) => {
                if !role_ids.contains(&role.id) {
                    role_ids.push(role.id);
                }
            }
            None => warn!(role = %name, "unknown role name skipped"),
        }
    }
    Ok(role_ids)
}

// ── CreateAccount ────────────────────────────────────────────────────────────

pub struct CreateAccountInput {
    pub username: String,
    pub person: PersonFields,
    pub role_names: Vec<String>,
}

pub struct CreateAccountUseCase<S, P, R>
where
    S: AccountStore,
    P: UniquenessProbe,
    R: RoleLookup,
{
    pub store: S,
    pub validator: UniquenessValidator<P>,
    pub roles: R,
}

impl<S, P, R> CreateAccountUseCase<S, P, R>
where
    S: AccountStore,
    P: UniquenessProbe,
    R: RoleLookup,
{
    pub async fn execute(
        &self,
        input: CreateAccountInput,
    ) -> Result<AggregateIds, AccountsServiceError> {
        validate_formats(&input.username, &input.person)?;
        self.validator
            .validate(UniquenessCheck::for_create(
                &input.username,
                &input.person.email,
                &input.person.identity_number,
            ))
            .await?;
        let role_ids = resolve_role_ids(&self.roles, &input.role_names).await?;
        let audit = AuditEntry::new(&input.username, &input.person, AuditAction::Created);
        self.store
            .insert_aggregate(&input.username, &input.person, &role_ids, &audit)
            .await
    }
}

// ── UpdateAccount ────────────────────────────────────────────────────────────

pub struct UpdateAccountInput {
    pub username: String,
    pub person: PersonFields,
    pub role_names: Vec<String>,
}

pub struct UpdateAccountUseCase<S, P, R>
where
    S: AccountStore,
    P: UniquenessProbe,
    R: RoleLookup,
{
    pub store: S,
    pub validator: UniquenessValidator<P>,
    pub roles: R,
}

impl<S, P, R> UpdateAccountUseCase<S, P, R>
where
    S: AccountStore,
    P: UniquenessProbe,
    R: RoleLookup,
{
    pub async fn execute(
        &self,
        ids: AggregateIds,
        input: UpdateAccountInput,
    ) -> Result<(), AccountsServiceError> {
        let user = self
            .store
            .find_user(ids.user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)?;
        self.store
            .find_person(ids.person_id)
            .await?
            .ok_or(AccountsServiceError::PersonNotFound)?;

        validate_formats(&input.username, &input.person)?;

        // The aggregate may keep its own username; only a changed value
        // needs a uniqueness check, excluding this user from the scan.
        if input.username != user.username {
            self.validator
                .validate_username(&input.username, Some(ids.user_id))
                .await?;
        }

        let role_ids = resolve_role_ids(&self.roles, &input.role_names).await?;
        let audit = AuditEntry::new(&input.username, &input.person, AuditAction::Updated);
        self.store
            .update_aggregate(ids, &input.username, &input.person, &role_ids, &audit)
            .await
    }
}

// ── DeleteAccount ────────────────────────────────────────────────────────────

pub struct DeleteAccountUseCase<S: AccountStore> {
    pub store: S,
}

impl<S: AccountStore> DeleteAccountUseCase<S> {
    pub async fn execute(&self, ids: AggregateIds) -> Result<(), AccountsServiceError> {
        // Both ids must name the same aggregate; a user id paired with
        // an unrelated person id is not deletable.
        let user = self
            .store
            .find_user_for_person(ids.user_id, ids.person_id)
            .await?
            .ok_or(AccountsServiceError::AggregateNotFound)?;
        let person = self
            .store
            .find_person(ids.person_id)
            .await?
            .ok_or(AccountsServiceError::PersonNotFound)?;

        // Snapshot the values as they are right before removal.
        let audit = AuditEntry::new(&user.username, &person.fields, AuditAction::Deleted);
        self.store.delete_aggregate(ids, &audit).await
    }
}
