//! End-to-end coverage of the real transactional store.
//!
//! Needs a reachable PostgreSQL, so the test is ignored by default:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/campus_test cargo test -- --ignored
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use campus_domain::pagination::PageQuery;

use campus_accounts::config::AccountsConfig;
use campus_accounts::domain::types::{AggregateIds, PersonFields};
use campus_accounts::error::{AccountsServiceError, ConflictField};
use campus_accounts::infra::db::{DbAccountStore, connect};
use campus_accounts::usecase::account::{
    CreateAccountInput, CreateAccountUseCase, DeleteAccountUseCase, UpdateAccountInput,
    UpdateAccountUseCase,
};
use campus_accounts::usecase::listing::ListAccountsUseCase;
use campus_accounts::usecase::uniqueness::UniquenessValidator;
use campus_accounts_migration::Migrator;
use sea_orm_migration::MigratorTrait;

fn unique_suffix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_nanos() as u64
        % 100_000_000
}

fn fields(email: String, identity_number: String) -> PersonFields {
    PersonFields {
        email,
        identity_number,
        first_name: "Integration".into(),
        last_name: "Test".into(),
        phone: "+506 8888-1111".into(),
        birth_date: chrono::NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable PostgreSQL"]
async fn should_run_full_aggregate_lifecycle_against_postgres() {
    let config = AccountsConfig::from_env();
    let db = connect(&config).await.expect("database connection");
    Migrator::up(&db, None).await.expect("migrations");
    let store = DbAccountStore { db };

    let suffix = unique_suffix();
    let username = format!("it{suffix}");
    let email = format!("it{suffix}@x.com");
    let identity = format!("9-{:04}-{:04}", suffix % 10_000, (suffix / 10_000) % 10_000);

    let create = CreateAccountUseCase {
        store: store.clone(),
        validator: UniquenessValidator {
            probe: store.clone(),
        },
        roles: store.clone(),
    };

    // Create with one known and one unknown role name.
    let ids = create
        .execute(CreateAccountInput {
            username: username.clone(),
            person: fields(email.clone(), identity.clone()),
            role_names: vec!["Visitor".into(), "Ghost".into()],
        })
        .await
        .expect("create aggregate");

    // Reusing the email must conflict and leave nothing behind.
    let conflict = create
        .execute(CreateAccountInput {
            username: format!("it{suffix}b"),
            person: fields(email.clone(), format!("8{:08}", suffix)),
            role_names: vec![],
        })
        .await;
    assert!(matches!(
        conflict,
        Err(AccountsServiceError::AlreadyExists(ConflictField::Email))
    ));

    // The listing sees exactly one matching row with the Visitor role.
    let listing = ListAccountsUseCase {
        store: store.clone(),
    };
    let page = listing
        .execute(Some(&username), PageQuery::default())
        .await
        .expect("list accounts");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].role_names, vec!["Visitor".to_string()]);

    // Update replaces fields and the role set atomically.
    let update = UpdateAccountUseCase {
        store: store.clone(),
        validator: UniquenessValidator {
            probe: store.clone(),
        },
        roles: store.clone(),
    };
    let mut updated = fields(email.clone(), identity.clone());
    updated.first_name = "Renamed".into();
    update
        .execute(
            ids,
            UpdateAccountInput {
                username: username.clone(),
                person: updated,
                role_names: vec!["Staff".into()],
            },
        )
        .await
        .expect("update aggregate");

    let page = listing
        .execute(Some(&username), PageQuery::default())
        .await
        .expect("list accounts after update");
    assert_eq!(page.items[0].first_name, "Renamed");
    assert_eq!(page.items[0].role_names, vec!["Staff".to_string()]);

    // A mismatched person id must not delete anything.
    let delete = DeleteAccountUseCase {
        store: store.clone(),
    };
    let mismatch = delete
        .execute(AggregateIds {
            user_id: ids.user_id,
            person_id: ids.person_id + 1,
        })
        .await;
    assert!(matches!(
        mismatch,
        Err(AccountsServiceError::AggregateNotFound)
    ));

    delete.execute(ids).await.expect("delete aggregate");
    let page = listing
        .execute(Some(&username), PageQuery::default())
        .await
        .expect("list accounts after delete");
    assert_eq!(page.total_count, 0);
}
