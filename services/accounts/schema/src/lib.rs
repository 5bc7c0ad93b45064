//! sea-orm entity definitions for the accounts service.

pub mod audit_entries;
pub mod persons;
pub mod roles;
pub mod user_roles;
pub mod users;
