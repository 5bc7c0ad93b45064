use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, Database,
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionError, TransactionTrait,
};

use campus_accounts_schema::{audit_entries, persons, roles, user_roles, users};

use crate::config::AccountsConfig;
use crate::domain::repository::{AccountStore, RoleLookup, UniquenessProbe};
use crate::domain::types::{
    AccountRecord, AccountUser, AggregateIds, AuditEntry, Person, PersonFields, Role,
};
use crate::error::AccountsServiceError;

/// Open a connection pool against the configured database.
pub async fn connect(config: &AccountsConfig) -> Result<DatabaseConnection, DbErr> {
    Database::connect(&config.database_url).await
}

// ── Account store ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountStore {
    pub db: DatabaseConnection,
}

impl UniquenessProbe for DbAccountStore {
    async fn username_taken(
        &self,
        username: &str,
        exclude_user: Option<i32>,
    ) -> Result<bool, AccountsServiceError> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude_user {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("probe username uniqueness")?;
        Ok(count > 0)
    }

    async fn email_taken(
        &self,
        email: &str,
        exclude_person: Option<i32>,
    ) -> Result<bool, AccountsServiceError> {
        let mut query = persons::Entity::find().filter(persons::Column::Email.eq(email));
        if let Some(id) = exclude_person {
            query = query.filter(persons::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("probe email uniqueness")?;
        Ok(count > 0)
    }

    async fn identity_number_taken(
        &self,
        identity_number: &str,
        exclude_person: Option<i32>,
    ) -> Result<bool, AccountsServiceError> {
        let mut query =
            persons::Entity::find().filter(persons::Column::IdentityNumber.eq(identity_number));
        if let Some(id) = exclude_person {
            query = query.filter(persons::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("probe identity number uniqueness")?;
        Ok(count > 0)
    }
}

impl RoleLookup for DbAccountStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AccountsServiceError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model.map(role_from_model))
    }
}

impl AccountStore for DbAccountStore {
    async fn find_user(&self, user_id: i32) -> Result<Option<AccountUser>, AccountsServiceError> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_user_for_person(
        &self,
        user_id: i32,
        person_id: i32,
    ) -> Result<Option<AccountUser>, AccountsServiceError> {
        let model = users::Entity::find_by_id(user_id)
            .filter(users::Column::PersonId.eq(person_id))
            .one(&self.db)
            .await
            .context("find user for person")?;
        Ok(model.map(user_from_model))
    }

    async fn find_person(&self, person_id: i32) -> Result<Option<Person>, AccountsServiceError> {
        let model = persons::Entity::find_by_id(person_id)
            .one(&self.db)
            .await
            .context("find person by id")?;
        Ok(model.map(person_from_model))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, AccountsServiceError> {
        let rows = users::Entity::find()
            .find_also_related(persons::Entity)
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .context("list account users")?;

        let mut records = Vec::with_capacity(rows.len());
        for (user, person) in rows {
            // person_id is FK-backed; a missing row means a corrupt store.
            let Some(person) = person else {
                return Err(AccountsServiceError::Store(anyhow::anyhow!(
                    "user {} references a missing person",
                    user.id
                )));
            };
            let pairs = user_roles::Entity::find()
                .filter(user_roles::Column::UserId.eq(user.id))
                .find_also_related(roles::Entity)
                .all(&self.db)
                .await
                .context("list account roles")?;
            let role_names = pairs
                .into_iter()
                .filter_map(|(_, role)| role.map(|r| r.name))
                .collect();
            records.push(AccountRecord {
                user_id: user.id,
                person_id: person.id,
                username: user.username,
                first_name: person.first_name,
                last_name: person.last_name,
                email: person.email,
                phone: person.phone,
                identity_number: person.identity_number,
                birth_date: person.birth_date,
                role_names,
                created_at: user.created_at,
            });
        }
        Ok(records)
    }

    async fn insert_aggregate(
        &self,
        username: &str,
        person: &PersonFields,
        role_ids: &[i32],
        audit: &AuditEntry,
    ) -> Result<AggregateIds, AccountsServiceError> {
        self.db
            .transaction::<_, AggregateIds, AccountsServiceError>(|txn| {
                let username = username.to_owned();
                let person = person.clone();
                let role_ids = role_ids.to_vec();
                let audit = audit.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let inserted = persons::Entity::insert(persons::ActiveModel {
                        email: Set(person.email.clone()),
                        identity_number: Set(person.identity_number.clone()),
                        first_name: Set(person.first_name.clone()),
                        last_name: Set(person.last_name.clone()),
                        phone: Set(person.phone.clone()),
                        birth_date: Set(person.birth_date),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    })
                    .exec(txn)
                    .await
                    .context("insert person")?;

                    let person_id = inserted.last_insert_id;
                    // A person without a store-assigned identity must not
                    // gain a user referencing it.
                    if person_id <= 0 {
                        return Err(AccountsServiceError::Store(anyhow::anyhow!(
                            "person insert produced no identifier"
                        )));
                    }

                    let user_id = users::Entity::insert(users::ActiveModel {
                        username: Set(username.clone()),
                        person_id: Set(person_id),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    })
                    .exec(txn)
                    .await
                    .context("insert user")?
                    .last_insert_id;

                    for role_id in &role_ids {
                        user_roles::ActiveModel {
                            user_id: Set(user_id),
                            role_id: Set(*role_id),
                        }
                        .insert(txn)
                        .await
                        .context("insert user role")?;
                    }

                    append_audit_entry(txn, &audit).await?;

                    Ok(AggregateIds { user_id, person_id })
                })
            })
            .await
            .map_err(flatten_txn_err)
    }

    async fn update_aggregate(
        &self,
        ids: AggregateIds,
        username: &str,
        person: &PersonFields,
        role_ids: &[i32],
        audit: &AuditEntry,
    ) -> Result<(), AccountsServiceError> {
        self.db
            .transaction::<_, (), AccountsServiceError>(|txn| {
                let username = username.to_owned();
                let person = person.clone();
                let role_ids = role_ids.to_vec();
                let audit = audit.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    // Full replace of every person field.
                    persons::ActiveModel {
                        id: Set(ids.person_id),
                        email: Set(person.email.clone()),
                        identity_number: Set(person.identity_number.clone()),
                        first_name: Set(person.first_name.clone()),
                        last_name: Set(person.last_name.clone()),
                        phone: Set(person.phone.clone()),
                        birth_date: Set(person.birth_date),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .map_err(|e| conflict_or(e, "update person"))?;

                    users::ActiveModel {
                        id: Set(ids.user_id),
                        username: Set(username.clone()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .map_err(|e| conflict_or(e, "update user"))?;

                    // Replace the whole role pair set.
                    user_roles::Entity::delete_many()
                        .filter(user_roles::Column::UserId.eq(ids.user_id))
                        .exec(txn)
                        .await
                        .context("delete user roles")?;
                    for role_id in &role_ids {
                        user_roles::ActiveModel {
                            user_id: Set(ids.user_id),
                            role_id: Set(*role_id),
                        }
                        .insert(txn)
                        .await
                        .context("insert user role")?;
                    }

                    append_audit_entry(txn, &audit).await?;

                    Ok(())
                })
            })
            .await
            .map_err(flatten_txn_err)
    }

    async fn delete_aggregate(
        &self,
        ids: AggregateIds,
        audit: &AuditEntry,
    ) -> Result<(), AccountsServiceError> {
        self.db
            .transaction::<_, (), AccountsServiceError>(|txn| {
                let audit = audit.clone();
                Box::pin(async move {
                    // Dependency order: pairs, then user, then person.
                    user_roles::Entity::delete_many()
                        .filter(user_roles::Column::UserId.eq(ids.user_id))
                        .exec(txn)
                        .await
                        .context("delete user roles")?;

                    let deleted_users = users::Entity::delete_by_id(ids.user_id)
                        .exec(txn)
                        .await
                        .context("delete user")?;
                    if deleted_users.rows_affected == 0 {
                        // The row disappeared between the load and this
                        // transaction.
                        return Err(AccountsServiceError::StoreConflict);
                    }

                    let deleted_persons = persons::Entity::delete_by_id(ids.person_id)
                        .exec(txn)
                        .await
                        .context("delete person")?;
                    if deleted_persons.rows_affected == 0 {
                        return Err(AccountsServiceError::StoreConflict);
                    }

                    append_audit_entry(txn, &audit).await?;

                    Ok(())
                })
            })
            .await
            .map_err(flatten_txn_err)
    }
}

// ── Audit recorder ───────────────────────────────────────────────────────────

/// Append one immutable audit row on the given connection. Runs on the
/// mutation's own transaction, so a rollback discards the audit row with
/// everything else. Nothing in this service reads the table back.
async fn append_audit_entry<C: ConnectionTrait>(
    conn: &C,
    entry: &AuditEntry,
) -> Result<(), AccountsServiceError> {
    audit_entries::ActiveModel {
        id: Set(entry.id),
        username: Set(entry.username.clone()),
        first_name: Set(entry.person.first_name.clone()),
        last_name: Set(entry.person.last_name.clone()),
        email: Set(entry.person.email.clone()),
        phone: Set(entry.person.phone.clone()),
        identity_number: Set(entry.person.identity_number.clone()),
        birth_date: Set(entry.person.birth_date),
        action: Set(entry.action.as_str().to_owned()),
        recorded_at: Set(entry.recorded_at),
    }
    .insert(conn)
    .await
    .context("append audit entry")?;
    Ok(())
}

// ── Error mapping ────────────────────────────────────────────────────────────

fn conflict_or(err: DbErr, what: &'static str) -> AccountsServiceError {
    match err {
        DbErr::RecordNotUpdated => AccountsServiceError::StoreConflict,
        err => AccountsServiceError::Store(anyhow::Error::new(err).context(what)),
    }
}

fn flatten_txn_err(err: TransactionError<AccountsServiceError>) -> AccountsServiceError {
    match err {
        TransactionError::Connection(err) => AccountsServiceError::Store(
            anyhow::Error::new(err).context("account aggregate transaction"),
        ),
        TransactionError::Transaction(err) => err,
    }
}

// ── Model mapping ────────────────────────────────────────────────────────────

fn person_from_model(model: persons::Model) -> Person {
    Person {
        id: model.id,
        fields: PersonFields {
            email: model.email,
            identity_number: model.identity_number,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            birth_date: model.birth_date,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn user_from_model(model: users::Model) -> AccountUser {
    AccountUser {
        id: model.id,
        username: model.username,
        person_id: model.person_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
    }
}
