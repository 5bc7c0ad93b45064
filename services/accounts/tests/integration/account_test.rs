use campus_domain::audit::AuditAction;

use campus_accounts::domain::types::AggregateIds;
use campus_accounts::error::{AccountsServiceError, ConflictField};
use campus_accounts::usecase::account::UpdateAccountInput;

use crate::helpers::{
    InMemoryStore, create_input, create_usecase, delete_usecase, person_fields, update_usecase,
};

#[tokio::test]
async fn should_create_aggregate_with_role_and_audit_entry() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &["Admin"]))
        .await
        .unwrap();

    let state = store.state();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.persons.len(), 1);
    assert_eq!(state.role_pairs, vec![(ids.user_id, 1)]);
    assert_eq!(state.audit.len(), 1);
    assert_eq!(state.audit[0].action, AuditAction::Created);
    assert_eq!(state.audit[0].username, "jdoe");
}

#[tokio::test]
async fn should_reject_second_aggregate_reusing_email() {
    let store = InMemoryStore::with_base_roles();
    create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &[]))
        .await
        .unwrap();

    let result = create_usecase(&store)
        .execute(create_input("jsmith", "j@x.com", "2-2222-2222", &[]))
        .await;
    assert!(matches!(
        result,
        Err(AccountsServiceError::AlreadyExists(ConflictField::Email))
    ));

    // No second person, user, or audit row came into existence.
    let state = store.state();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.persons.len(), 1);
    assert_eq!(state.audit.len(), 1);
}

#[tokio::test]
async fn should_leave_no_trace_when_the_write_fails() {
    let store = InMemoryStore::with_base_roles();
    store.fail_next_write();

    let result = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &["Admin"]))
        .await;
    assert!(matches!(result, Err(AccountsServiceError::Store(_))));

    let state = store.state();
    assert!(state.users.is_empty());
    assert!(state.persons.is_empty());
    assert!(state.role_pairs.is_empty());
    assert!(state.audit.is_empty(), "rolled-back mutation must not be audited");
}

#[tokio::test]
async fn should_commit_update_with_only_resolvable_roles() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &["Admin"]))
        .await
        .unwrap();

    // "Ghost" does not exist; the update still commits with "Visitor".
    update_usecase(&store)
        .execute(
            ids,
            UpdateAccountInput {
                username: "jdoe".into(),
                person: person_fields("j@x.com", "1-1111-1111"),
                role_names: vec!["Visitor".into(), "Ghost".into()],
            },
        )
        .await
        .unwrap();

    let state = store.state();
    assert_eq!(state.role_pairs, vec![(ids.user_id, 2)]);
    assert_eq!(state.audit.len(), 2);
    assert_eq!(state.audit[1].action, AuditAction::Updated);
}

#[tokio::test]
async fn should_overwrite_all_person_fields_on_update() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &[]))
        .await
        .unwrap();

    let mut person = person_fields("john.doe@uni.ac.cr", "1-1111-1111");
    person.first_name = "Johnny".into();
    person.phone = "+506 7777-2222".into();
    update_usecase(&store)
        .execute(
            ids,
            UpdateAccountInput {
                username: "jdoe".into(),
                person: person.clone(),
                role_names: vec![],
            },
        )
        .await
        .unwrap();

    let state = store.state();
    assert_eq!(state.persons[0].fields, person);
}

#[tokio::test]
async fn should_keep_exact_role_set_after_repeated_update() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &["Admin"]))
        .await
        .unwrap();

    for _ in 0..2 {
        update_usecase(&store)
            .execute(
                ids,
                UpdateAccountInput {
                    username: "jdoe".into(),
                    person: person_fields("j@x.com", "1-1111-1111"),
                    role_names: vec!["Visitor".into(), "Staff".into()],
                },
            )
            .await
            .unwrap();
    }

    let state = store.state();
    assert_eq!(
        state.role_pairs,
        vec![(ids.user_id, 2), (ids.user_id, 3)],
        "replaying the same role set must not duplicate pairs"
    );
}

#[tokio::test]
async fn should_reject_update_stealing_another_username() {
    let store = InMemoryStore::with_base_roles();
    create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &[]))
        .await
        .unwrap();
    let ids = create_usecase(&store)
        .execute(create_input("jsmith", "s@x.com", "2-2222-2222", &[]))
        .await
        .unwrap();

    let result = update_usecase(&store)
        .execute(
            ids,
            UpdateAccountInput {
                username: "jdoe".into(),
                person: person_fields("s@x.com", "2-2222-2222"),
                role_names: vec![],
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(AccountsServiceError::AlreadyExists(ConflictField::Username))
    ));
}

#[tokio::test]
async fn should_allow_update_keeping_own_username() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &[]))
        .await
        .unwrap();

    // Same username, new phone: no self-conflict.
    let mut person = person_fields("j@x.com", "1-1111-1111");
    person.phone = "+506 7777-2222".into();
    update_usecase(&store)
        .execute(
            ids,
            UpdateAccountInput {
                username: "jdoe".into(),
                person,
                role_names: vec![],
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn should_refuse_delete_with_mismatched_person_id() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &["Admin"]))
        .await
        .unwrap();

    let result = delete_usecase(&store)
        .execute(AggregateIds {
            user_id: ids.user_id,
            person_id: ids.person_id + 40,
        })
        .await;
    assert!(matches!(
        result,
        Err(AccountsServiceError::AggregateNotFound)
    ));

    let state = store.state();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.persons.len(), 1);
    assert_eq!(state.role_pairs.len(), 1);
}

#[tokio::test]
async fn should_delete_aggregate_and_snapshot_final_values() {
    let store = InMemoryStore::with_base_roles();
    let ids = create_usecase(&store)
        .execute(create_input("jdoe", "j@x.com", "1-1111-1111", &["Admin"]))
        .await
        .unwrap();

    delete_usecase(&store).execute(ids).await.unwrap();

    let state = store.state();
    assert!(state.users.is_empty());
    assert!(state.persons.is_empty());
    assert!(state.role_pairs.is_empty());
    assert_eq!(state.audit.len(), 2);
    let deleted = &state.audit[1];
    assert_eq!(deleted.action, AuditAction::Deleted);
    assert_eq!(deleted.username, "jdoe");
    assert_eq!(deleted.person.email, "j@x.com");
}
