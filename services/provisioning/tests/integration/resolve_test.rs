use edutech_provisioning::domain::repository::IdentityResolver;
use edutech_provisioning::error::ProvisionError;
use edutech_provisioning::usecase::resolve::PagedIdentityResolver;

use crate::helpers::{MemoryBackend, Op, PASSWORD};

fn resolver(backend: &MemoryBackend, per_page: u32) -> PagedIdentityResolver<MemoryBackend> {
    PagedIdentityResolver {
        directory: backend.clone(),
        per_page,
    }
}

#[tokio::test]
async fn should_find_identity_on_a_later_page() {
    let backend = MemoryBackend::with_filler(25);
    let target = backend.add_identity("teacher@edutech.test", PASSWORD);
    backend.add_identity("late@edutech.test", PASSWORD);

    let found = resolver(&backend, 10)
        .resolve("teacher@edutech.test")
        .await
        .unwrap();

    assert_eq!(found, Some(target));
    assert_eq!(backend.state.lock().unwrap().pages_listed, vec![1, 2, 3]);
}

#[tokio::test]
async fn should_find_identity_that_is_last_entry_of_final_page() {
    let backend = MemoryBackend::with_filler(19);
    let target = backend.add_identity("student@edutech.test", PASSWORD);

    // 20 identities, 10 per page: the match is the last entry of page 2.
    let found = resolver(&backend, 10)
        .resolve("student@edutech.test")
        .await
        .unwrap();

    assert_eq!(found.map(|i| i.id), Some(target.id));
}

#[tokio::test]
async fn should_report_absent_only_after_the_last_page() {
    let backend = MemoryBackend::with_filler(20);

    let found = resolver(&backend, 10)
        .resolve("ghost@edutech.test")
        .await
        .unwrap();

    assert!(found.is_none());
    // Page 3 comes back empty, which ends the scan.
    assert_eq!(backend.state.lock().unwrap().pages_listed, vec![1, 2, 3]);
}

#[tokio::test]
async fn should_stop_scanning_at_the_first_match() {
    let backend = MemoryBackend::new();
    backend.add_identity("admin@edutech.test", PASSWORD);
    for i in 0..30 {
        backend.add_identity(&format!("user{i}@other.test"), PASSWORD);
    }

    resolver(&backend, 10)
        .resolve("admin@edutech.test")
        .await
        .unwrap();

    assert_eq!(backend.state.lock().unwrap().pages_listed, vec![1]);
}

#[tokio::test]
async fn should_match_email_case_sensitively() {
    let backend = MemoryBackend::new();
    backend.add_identity("Teacher@edutech.test", PASSWORD);

    let found = PagedIdentityResolver::new(backend.clone())
        .resolve("teacher@edutech.test")
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn should_propagate_listing_failure() {
    let backend = MemoryBackend::with_filler(3);
    backend.fail(Op::ListIdentities);

    let result = PagedIdentityResolver::new(backend.clone())
        .resolve("teacher@edutech.test")
        .await;

    assert!(
        matches!(result, Err(ProvisionError::Backend(_))),
        "expected Backend, got {result:?}"
    );
}
