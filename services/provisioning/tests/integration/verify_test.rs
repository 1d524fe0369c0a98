use edutech_domain::role::Role;
use edutech_provisioning::domain::repository::ProfileRepository;
use edutech_provisioning::domain::types::{Credentials, ProfileUpsert};
use edutech_provisioning::error::ProvisionError;
use edutech_provisioning::reporter::Reporter;
use edutech_provisioning::usecase::verify::{PolicyCheck, VerifySetupInput, check_presence};

use crate::helpers::{
    ADMIN_EMAIL, MemoryBackend, Op, STUDENT_EMAIL, TEACHER_EMAIL, credentials,
};

fn input() -> VerifySetupInput {
    VerifySetupInput {
        expected_emails: vec![
            ADMIN_EMAIL.to_owned(),
            TEACHER_EMAIL.to_owned(),
            STUDENT_EMAIL.to_owned(),
        ],
        probe: credentials(STUDENT_EMAIL),
    }
}

/// Demo identities with a profile for each of `with_profiles`.
async fn provisioned(with_profiles: &[(&str, Role)]) -> MemoryBackend {
    let backend = MemoryBackend::with_demo_identities();
    for (email, role) in with_profiles {
        backend
            .upsert(&ProfileUpsert {
                id: backend.identity_id(email),
                name: email.split('@').next().unwrap().to_owned(),
                email: (*email).to_owned(),
                role: *role,
                is_active: None,
            })
            .await
            .unwrap();
    }
    backend
}

#[tokio::test]
async fn should_pass_on_fully_provisioned_backend() {
    let backend = provisioned(&[
        (ADMIN_EMAIL, Role::Admin),
        (TEACHER_EMAIL, Role::Teacher),
        (STUDENT_EMAIL, Role::Student),
    ])
    .await;

    let report = backend.verify_usecase().execute(&input()).await.unwrap();

    assert_eq!(report.sampled_profiles, 3);
    assert!(report.presence.iter().all(|p| p.is_present()));
    assert_eq!(
        report.policy,
        PolicyCheck::Passed {
            name: "student".into(),
            role: Some(Role::Student)
        }
    );
    let state = backend.state.lock().unwrap();
    assert_eq!(state.sign_outs, 1);
    assert_eq!(state.active_sessions, 0);
}

#[tokio::test]
async fn should_fail_at_schema_check_before_presence_and_sign_in() {
    let backend = MemoryBackend::with_demo_identities();
    backend.fail(Op::SampleProfiles);

    let result = backend.verify_usecase().execute(&input()).await;

    assert!(
        matches!(result, Err(ProvisionError::SchemaUnreachable(_))),
        "expected SchemaUnreachable, got {result:?}"
    );
    let state = backend.state.lock().unwrap();
    assert_eq!(state.active_sessions, 0);
    assert_eq!(state.sign_outs, 0);
}

#[tokio::test]
async fn should_report_missing_profiles_without_failing() {
    let backend = provisioned(&[(STUDENT_EMAIL, Role::Student)]).await;

    let report = backend.verify_usecase().execute(&input()).await.unwrap();

    let missing: Vec<&str> = report
        .presence
        .iter()
        .filter(|p| !p.is_present())
        .map(|p| p.email.as_str())
        .collect();
    assert_eq!(missing, [ADMIN_EMAIL, TEACHER_EMAIL]);
    assert!(matches!(report.policy, PolicyCheck::Passed { .. }));
}

#[tokio::test]
async fn should_only_see_profiles_within_the_sample() {
    let backend = provisioned(&[
        (ADMIN_EMAIL, Role::Admin),
        (TEACHER_EMAIL, Role::Teacher),
        (STUDENT_EMAIL, Role::Student),
    ])
    .await;
    // Push the student's profile out of the five-row sample.
    {
        let mut state = backend.state.lock().unwrap();
        let student = state.profiles.remove(2);
        for i in 0..5 {
            let mut filler = student.clone();
            filler.id = uuid::Uuid::new_v4().into();
            filler.email = format!("filler{i}@other.test");
            state.profiles.push(filler);
        }
        state.profiles.push(student);
    }

    let report = backend.verify_usecase().execute(&input()).await.unwrap();

    assert_eq!(report.sampled_profiles, 5);
    assert!(!report.presence[2].is_present());
    // The self-access read is not limited to the sample.
    assert!(matches!(report.policy, PolicyCheck::Passed { .. }));
}

#[tokio::test]
async fn should_skip_policy_check_when_probe_cannot_sign_in() {
    let backend = provisioned(&[(STUDENT_EMAIL, Role::Student)]).await;
    let input = VerifySetupInput {
        probe: Credentials {
            email: STUDENT_EMAIL.into(),
            password: "wrong".into(),
        },
        ..input()
    };

    let report = backend.verify_usecase().execute(&input).await.unwrap();

    assert_eq!(
        report.policy,
        PolicyCheck::Skipped {
            reason: "Invalid login credentials (HTTP 400)".into()
        }
    );
    assert_eq!(backend.state.lock().unwrap().sign_outs, 0);
}

#[tokio::test]
async fn should_fail_policy_check_and_still_sign_out_when_own_profile_is_hidden() {
    // Signed-in student has no profile row visible.
    let backend = provisioned(&[(ADMIN_EMAIL, Role::Admin)]).await;

    let result = backend.verify_usecase().execute(&input()).await;

    assert!(
        matches!(result, Err(ProvisionError::PolicyViolation(_))),
        "expected PolicyViolation, got {result:?}"
    );
    let state = backend.state.lock().unwrap();
    assert_eq!(state.sign_outs, 1);
    assert_eq!(state.active_sessions, 0);
}

#[tokio::test]
async fn should_keep_policy_error_when_sign_out_also_fails() {
    let backend = provisioned(&[(STUDENT_EMAIL, Role::Student)]).await;
    backend.fail(Op::FetchOwnProfile);
    backend.fail(Op::SignOut);

    let err = backend
        .verify_usecase()
        .execute(&input())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "POLICY_VIOLATION");
    assert_eq!(backend.state.lock().unwrap().sign_outs, 1);
}

#[tokio::test]
async fn should_fail_when_sign_out_fails_after_successful_read() {
    let backend = provisioned(&[(STUDENT_EMAIL, Role::Student)]).await;
    backend.fail(Op::SignOut);

    let err = backend
        .verify_usecase()
        .execute(&input())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "BACKEND");
    assert_eq!(
        err.to_string(),
        "sign out probe session: injected failure: SignOut"
    );
}

#[tokio::test]
async fn should_treat_profile_without_role_as_present() {
    let backend = provisioned(&[
        (ADMIN_EMAIL, Role::Admin),
        (TEACHER_EMAIL, Role::Teacher),
        (STUDENT_EMAIL, Role::Student),
    ])
    .await;
    for profile in backend.state.lock().unwrap().profiles.iter_mut() {
        profile.role = None;
    }

    let report = backend.verify_usecase().execute(&input()).await.unwrap();

    assert!(report.presence.iter().all(|p| p.is_present() && p.role.is_none()));
    assert_eq!(
        report.policy,
        PolicyCheck::Passed {
            name: "student".into(),
            role: None
        }
    );
}

#[tokio::test]
async fn should_keep_presence_lines_when_policy_check_fails() {
    let backend = provisioned(&[(ADMIN_EMAIL, Role::Admin)]).await;
    let usecase = backend.verify_usecase();
    let input = input();
    let mut reporter = Reporter::new();

    let sample = usecase.sample_profiles().await.unwrap();
    reporter.schema(sample.len());
    reporter.presence(&check_presence(&sample, &input.expected_emails));
    let err = usecase.check_self_access(&input.probe).await.unwrap_err();

    assert_eq!(err.kind(), "POLICY_VIOLATION");
    let out = reporter.render();
    assert!(out.contains("PASS  profile admin@edutech.test (admin)"));
    assert!(out.contains("FAIL  profile student@edutech.test missing"));
    assert!(out.ends_with("Results: 2 passed, 2 failed"));
}
