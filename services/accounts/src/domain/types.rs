use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use campus_domain::audit::AuditAction;

/// Identity attributes of a person. Aggregate updates replace all of
/// these at once; there is no partial merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    pub email: String,
    pub identity_number: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: NaiveDate,
}

/// Person row as stored.
#[derive(Debug, Clone)]
pub struct Person {
    pub id: i32,
    pub fields: PersonFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login account referencing exactly one person.
#[derive(Debug, Clone)]
pub struct AccountUser {
    pub id: i32,
    pub username: String,
    pub person_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named permission grouping, looked up by name and never created here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// The ids pinning one user+person aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateIds {
    pub user_id: i32,
    pub person_id: i32,
}

/// One row of the account listing: the user, its person fields, and the
/// names of its assigned roles.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRecord {
    pub user_id: i32,
    pub person_id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub identity_number: String,
    pub birth_date: NaiveDate,
    pub role_names: Vec<String>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Case-insensitive substring match over username, first/last name,
    /// email, identity number, and assigned role names.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.username.to_lowercase().contains(&needle)
            || self.first_name.to_lowercase().contains(&needle)
            || self.last_name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
            || self.identity_number.to_lowercase().contains(&needle)
            || self
                .role_names
                .iter()
                .any(|role| role.to_lowercase().contains(&needle))
    }
}

/// Immutable snapshot of one account mutation, appended to the audit
/// store inside the same unit of work as the mutation itself.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub username: String,
    pub person: PersonFields,
    pub action: AuditAction,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(username: &str, person: &PersonFields, action: AuditAction) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.to_owned(),
            person: person.clone(),
            action,
            recorded_at: Utc::now(),
        }
    }
}

/// Validate a username: alphanumeric + dot + hyphen + underscore,
/// 3-30 chars, must start with a letter.
pub fn validate_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }
    let mut chars = username.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Validate an email shape: one '@', non-empty local part, dotted domain.
/// Deliverability is not this service's problem.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Validate an identity number: digits optionally grouped by single
/// hyphens (e.g. "1-1111-1111"), 9-12 digits total.
pub fn validate_identity_number(identity_number: &str) -> bool {
    if identity_number.starts_with('-') || identity_number.ends_with('-') {
        return false;
    }
    if identity_number.contains("--") {
        return false;
    }
    let digit_count = identity_number.chars().filter(char::is_ascii_digit).count();
    if !(9..=12).contains(&digit_count) {
        return false;
    }
    identity_number
        .chars()
        .all(|c| c.is_ascii_digit() || c == '-')
}

/// Validate a phone number: optional leading '+', then 7-15 digits with
/// optional space/hyphen/paren separators.
pub fn validate_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    let digit_count = rest.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digit_count) {
        return false;
    }
    rest.chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-' || c == '(' || c == ')')
}

/// Validate a birth date: not in the future and after 1900-01-01.
pub fn validate_birth_date(birth_date: NaiveDate) -> bool {
    let today = Utc::now().date_naive();
    let floor = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    birth_date <= today && birth_date >= floor
}
