#![allow(async_fn_in_trait)]

use crate::domain::types::{
    AccountRecord, AccountUser, AggregateIds, AuditEntry, Person, PersonFields, Role,
};
use crate::error::AccountsServiceError;

/// Read-only probes backing the uniqueness validator.
///
/// Each probe may exclude one record id so an aggregate under update
/// does not conflict with its own current values. Never writes; safe to
/// call any number of times before a unit of work.
pub trait UniquenessProbe: Send + Sync {
    async fn username_taken(
        &self,
        username: &str,
        exclude_user: Option<i32>,
    ) -> Result<bool, AccountsServiceError>;

    async fn email_taken(
        &self,
        email: &str,
        exclude_person: Option<i32>,
    ) -> Result<bool, AccountsServiceError>;

    async fn identity_number_taken(
        &self,
        identity_number: &str,
        exclude_person: Option<i32>,
    ) -> Result<bool, AccountsServiceError>;
}

/// Role lookup by name. Roles are managed outside this service; a
/// missing name resolves to `None`, never an error.
pub trait RoleLookup: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AccountsServiceError>;
}

/// Store for the user+person+role-set aggregate.
///
/// The three mutation methods each run every write (person, user, role
/// pairs, and the audit entry) inside one transaction: all of it
/// commits together or none of it does.
pub trait AccountStore: Send + Sync {
    async fn find_user(&self, user_id: i32) -> Result<Option<AccountUser>, AccountsServiceError>;

    /// Find the user only if it references exactly this person. Guards
    /// deletion against a user/person id pair from two different
    /// aggregates.
    async fn find_user_for_person(
        &self,
        user_id: i32,
        person_id: i32,
    ) -> Result<Option<AccountUser>, AccountsServiceError>;

    async fn find_person(&self, person_id: i32) -> Result<Option<Person>, AccountsServiceError>;

    /// Full aggregate listing with role names, ordered by username.
    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, AccountsServiceError>;

    /// Insert person, user, and role pairs, appending `audit` in the
    /// same transaction. Returns the store-generated identifiers.
    async fn insert_aggregate(
        &self,
        username: &str,
        person: &PersonFields,
        role_ids: &[i32],
        audit: &AuditEntry,
    ) -> Result<AggregateIds, AccountsServiceError>;

    /// Overwrite all person fields and the username, replace the role
    /// pair set, and append `audit`, atomically.
    async fn update_aggregate(
        &self,
        ids: AggregateIds,
        username: &str,
        person: &PersonFields,
        role_ids: &[i32],
        audit: &AuditEntry,
    ) -> Result<(), AccountsServiceError>;

    /// Remove role pairs, user, and person in dependency order and
    /// append `audit`, atomically.
    async fn delete_aggregate(
        &self,
        ids: AggregateIds,
        audit: &AuditEntry,
    ) -> Result<(), AccountsServiceError>;
}
