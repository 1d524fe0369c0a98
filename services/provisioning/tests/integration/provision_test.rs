use edutech_domain::role::Role;
use edutech_provisioning::error::ProvisionError;
use edutech_provisioning::usecase::provision::{
    ConfirmOutcome, EnsureIdentityInput, IdentityStatus,
};

use crate::helpers::{
    ADMIN_EMAIL, MemoryBackend, Op, PASSWORD, STUDENT_EMAIL, TEACHER_EMAIL, credentials,
    profile_role,
};

fn input(email: &str, role: Role) -> EnsureIdentityInput {
    EnsureIdentityInput {
        credentials: credentials(email),
        role,
    }
}

// ── EnsureIdentityUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_confirmed_identity_and_profile_when_absent() {
    let backend = MemoryBackend::new();

    let outcome = backend
        .ensure_usecase()
        .execute(&input(TEACHER_EMAIL, Role::Teacher))
        .await
        .unwrap();

    assert_eq!(outcome.status, IdentityStatus::Created);
    assert!(outcome.identity.confirmed);
    let state = backend.state.lock().unwrap();
    assert_eq!(state.identities.len(), 1);
    let profile = &state.profiles[0];
    assert_eq!(profile.id, outcome.identity.id);
    assert_eq!(profile.name, "teacher");
    assert_eq!(profile.role, Some(Role::Teacher));
}

#[tokio::test]
async fn should_reuse_existing_identity_on_second_run() {
    let backend = MemoryBackend::new();
    let usecase = backend.ensure_usecase();

    let first = usecase
        .execute(&input(STUDENT_EMAIL, Role::Student))
        .await
        .unwrap();
    let second = usecase
        .execute(&input(STUDENT_EMAIL, Role::Student))
        .await
        .unwrap();

    assert_eq!(second.status, IdentityStatus::AlreadyExists);
    assert_eq!(second.identity.id, first.identity.id);
    let state = backend.state.lock().unwrap();
    assert_eq!(state.identities.len(), 1);
    assert_eq!(state.profiles.len(), 1);
}

#[tokio::test]
async fn should_leave_existing_identity_unconfirmed_but_rewrite_profile() {
    let backend = MemoryBackend::new();
    let existing = backend.add_identity(ADMIN_EMAIL, "old-password");

    let outcome = backend
        .ensure_usecase()
        .execute(&input(ADMIN_EMAIL, Role::Admin))
        .await
        .unwrap();

    assert_eq!(outcome.status, IdentityStatus::AlreadyExists);
    assert!(!outcome.identity.confirmed);
    let state = backend.state.lock().unwrap();
    assert_eq!(state.passwords[ADMIN_EMAIL], "old-password");
    assert_eq!(state.profiles[0].id, existing.id);
    assert_eq!(state.profiles[0].role, Some(Role::Admin));
}

#[tokio::test]
async fn should_provision_all_accounts_in_order() {
    let backend = MemoryBackend::new();

    let outcomes = backend
        .ensure_usecase()
        .execute_all(&[
            input(ADMIN_EMAIL, Role::Admin),
            input(TEACHER_EMAIL, Role::Teacher),
            input(STUDENT_EMAIL, Role::Student),
        ])
        .await
        .unwrap();

    assert_eq!(
        outcomes.iter().map(|o| o.role).collect::<Vec<_>>(),
        Role::ALL
    );
    assert_eq!(profile_role(&backend, STUDENT_EMAIL), Some(Role::Student));
}

#[tokio::test]
async fn should_abort_remaining_accounts_on_first_failure() {
    let backend = MemoryBackend::new();
    backend.fail(Op::UpsertProfile);

    let result = backend
        .ensure_usecase()
        .execute_all(&[
            input(ADMIN_EMAIL, Role::Admin),
            input(TEACHER_EMAIL, Role::Teacher),
        ])
        .await;

    assert!(
        matches!(result, Err(ProvisionError::Backend(_))),
        "expected Backend, got {result:?}"
    );
    // The admin identity was created before its profile write failed.
    let state = backend.state.lock().unwrap();
    assert_eq!(state.identities.len(), 1);
    assert_eq!(state.identities[0].email, ADMIN_EMAIL);
}

// ── ConfirmIdentityUseCase ───────────────────────────────────────────────────

#[tokio::test]
async fn should_confirm_existing_identity() {
    let backend = MemoryBackend::new();
    let identity = backend.add_identity(TEACHER_EMAIL, PASSWORD);

    let outcome = backend
        .confirm_usecase()
        .execute(TEACHER_EMAIL)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ConfirmOutcome::Confirmed(ref confirmed) if confirmed.id == identity.id && confirmed.confirmed
    ));
    assert!(backend.state.lock().unwrap().identities[0].confirmed);
}

#[tokio::test]
async fn should_confirm_again_when_already_confirmed() {
    let backend = MemoryBackend::new();
    backend.add_identity(TEACHER_EMAIL, PASSWORD);
    let usecase = backend.confirm_usecase();

    usecase.execute(TEACHER_EMAIL).await.unwrap();
    let second = usecase.execute(TEACHER_EMAIL).await.unwrap();

    assert!(matches!(second, ConfirmOutcome::Confirmed(_)));
    assert_eq!(backend.state.lock().unwrap().confirm_calls, 2);
}

#[tokio::test]
async fn should_report_not_found_and_continue_with_next_email() {
    let backend = MemoryBackend::new();
    backend.add_identity(STUDENT_EMAIL, PASSWORD);

    let outcomes = backend
        .confirm_usecase()
        .execute_all(&[ADMIN_EMAIL, STUDENT_EMAIL])
        .await
        .unwrap();

    assert_eq!(outcomes[0], (ADMIN_EMAIL.to_owned(), ConfirmOutcome::NotFound));
    assert!(matches!(outcomes[1].1, ConfirmOutcome::Confirmed(_)));
    assert_eq!(backend.state.lock().unwrap().confirm_calls, 1);
}
