//! Integration tests for the registry layer.
//!
//! These tests exercise MemoryRegistry, FileRegistry, the Verifier
//! pipeline, and the backend handlers together.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use refcode::api::{
    handle_validate_google_forms, handle_validate_reference, Outcome, ValidateGoogleFormsRequest,
    ValidateReferenceRequest, MSG_ALREADY_USED, MSG_NOT_FOUND, MSG_UNAVAILABLE, MSG_VALIDATED,
};
use refcode::core::generator::CodeGenerator;
use refcode::core::types::{Identity, ReferenceCode};
use refcode::core::validator::{ErrorKind, ValidationError};
use refcode::engine::Verifier;
use refcode::registry::mock::{FailOn, MemoryRegistry, MockOperation};
use refcode::registry::{
    create_registry, FileRegistry, Registry, RegistryEndpoint, RegistryError, RegistryProvider,
    RegistrySettings, RegistryStatus, Submission, SubmissionStatus,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn asha() -> Identity {
    Identity::new("Asha Patel", "asha@example.com", "9876543210")
}

fn issue(identity: &Identity) -> ReferenceCode {
    CodeGenerator::new().generate(identity)
}

fn settings(provider: RegistryProvider, dir: &TempDir) -> RegistrySettings {
    RegistrySettings {
        provider,
        path: dir.path().join("registry.json"),
        base_url: None,
        endpoint: RegistryEndpoint::Reference,
        timeout: Duration::from_millis(200),
        retries: 1,
    }
}

// =============================================================================
// File registry
// =============================================================================

mod file_registry {
    use super::*;

    #[test]
    fn record_then_lookup_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        let code = issue(&asha());

        FileRegistry::with_path(&path)
            .record(&code, Some("form_abc".into()))
            .unwrap();

        // A fresh handle sees what the first one wrote.
        let reopened = FileRegistry::with_path(&path);
        let status = tokio_test::block_on(reopened.lookup(&code, &asha())).unwrap();
        match status {
            RegistryStatus::Available(s) => {
                assert_eq!(s.form_id, "form_abc");
                assert_eq!(s.status, SubmissionStatus::Pending);
            }
            other => panic!("expected Available, got {:?}", other),
        }
    }

    #[test]
    fn consume_is_one_shot() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::with_path(dir.path().join("registry.json"));
        let code = issue(&asha());
        registry.record(&code, None).unwrap();

        assert!(matches!(
            registry.consume(&code).unwrap(),
            RegistryStatus::Available(_)
        ));
        assert!(matches!(
            registry.consume(&code).unwrap(),
            RegistryStatus::AlreadyUsed(_)
        ));

        let status = tokio_test::block_on(registry.lookup(&code, &asha())).unwrap();
        assert!(matches!(status, RegistryStatus::AlreadyUsed(_)));
    }

    #[test]
    fn missing_file_means_empty() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::with_path(dir.path().join("nested/registry.json"));

        assert!(registry.list().unwrap().is_empty());
        let status = tokio_test::block_on(registry.lookup(&issue(&asha()), &asha())).unwrap();
        assert_eq!(status, RegistryStatus::NotFound);
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();

        let registry = FileRegistry::with_path(&path);
        let result = tokio_test::block_on(registry.lookup(&issue(&asha()), &asha()));
        assert!(matches!(result, Err(RegistryError::Storage(_))));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::with_path(dir.path().join("registry.json"));
        registry.record(&issue(&asha()), None).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(names.is_empty(), "leftover temp files: {:?}", names);
    }
}

// =============================================================================
// Verifier
// =============================================================================

mod verifier {
    use super::*;

    #[tokio::test]
    async fn registered_code_verifies() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new();
        registry.insert(code.clone());

        let outcome = Verifier::new(Box::new(registry.clone()))
            .verify(code.as_str(), &who)
            .await;

        assert!(outcome.verdict.valid);
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.submission.is_some());
        assert_eq!(registry.lookup_count(), 1);
    }

    #[tokio::test]
    async fn local_failure_skips_registry() {
        let code = issue(&asha());
        let registry = MemoryRegistry::new();
        registry.insert(code.clone());

        let stranger = Identity::new("Someone Else", "else@example.org", "5550000000");
        let outcome = Verifier::new(Box::new(registry.clone()))
            .verify(code.as_str(), &stranger)
            .await;

        assert_eq!(outcome.verdict.error, Some(ValidationError::Mismatch));
        assert_eq!(outcome.attempts, 0);
        assert_eq!(registry.lookup_count(), 0);
    }

    #[tokio::test]
    async fn malformed_code_never_reaches_registry() {
        let registry = MemoryRegistry::new();
        let outcome = Verifier::new(Box::new(registry.clone()))
            .verify("XYZ1234567890123456", &asha())
            .await;

        assert_eq!(outcome.verdict.error, Some(ValidationError::Format));
        assert!(registry.operations().is_empty());
    }

    #[tokio::test]
    async fn unknown_code_is_not_registered() {
        let who = asha();
        let code = issue(&who);
        let outcome = Verifier::new(Box::new(MemoryRegistry::new()))
            .verify(code.as_str(), &who)
            .await;

        assert_eq!(outcome.verdict.error, Some(ValidationError::NotRegistered));
        assert_eq!(outcome.verdict.error_kind(), Some(ErrorKind::Registry));
        // Local checks passed, so the recomputed values are still reported.
        assert!(outcome.verdict.details.is_some());
    }

    #[tokio::test]
    async fn consumed_code_is_already_used() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new();
        registry.insert(code.clone());
        registry.consume(&code);

        let outcome = Verifier::new(Box::new(registry))
            .verify(code.as_str(), &who)
            .await;
        assert_eq!(outcome.verdict.error, Some(ValidationError::AlreadyUsed));
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new().fail_on(FailOn::Times(
            1,
            RegistryError::Unavailable("connection reset".into()),
        ));
        registry.insert(code.clone());

        let outcome = Verifier::new(Box::new(registry.clone()))
            .with_retries(1)
            .verify(code.as_str(), &who)
            .await;

        assert!(outcome.verdict.valid);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(
            registry.operations().last(),
            Some(&MockOperation::Lookup { code: code.clone() })
        );
    }

    #[tokio::test]
    async fn exhausted_retries_is_service_error() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new().fail_on(FailOn::Always(RegistryError::Api {
            status: 503,
            message: "maintenance".into(),
        }));

        let outcome = Verifier::new(Box::new(registry.clone()))
            .with_retries(2)
            .verify(code.as_str(), &who)
            .await;

        assert!(!outcome.verdict.valid);
        assert_eq!(outcome.verdict.error_kind(), Some(ErrorKind::Service));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(registry.lookup_count(), 3);
    }

    #[tokio::test]
    async fn recovered_registry_answers_again() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new().fail_on(FailOn::Always(RegistryError::Unavailable(
            "down".into(),
        )));
        registry.insert(code.clone());
        let verifier = Verifier::new(Box::new(registry.clone())).with_retries(0);

        let outcome = verifier.verify(code.as_str(), &who).await;
        assert_eq!(outcome.verdict.error_kind(), Some(ErrorKind::Service));

        registry.clear_fail_on();
        let outcome = verifier.verify(code.as_str(), &who).await;
        assert!(outcome.verdict.valid);
    }

    #[tokio::test]
    async fn slow_registry_times_out() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new().with_latency(Duration::from_millis(500));
        registry.insert(code.clone());

        let outcome = Verifier::new(Box::new(registry))
            .with_timeout(Duration::from_millis(20))
            .with_retries(0)
            .verify(code.as_str(), &who)
            .await;

        assert_eq!(outcome.verdict.error_kind(), Some(ErrorKind::Service));
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn works_over_file_registry_from_settings() {
        let dir = TempDir::new().unwrap();
        let settings = settings(RegistryProvider::File, &dir);
        let who = asha();
        let code = issue(&who);
        FileRegistry::with_path(&settings.path)
            .record(&code, None)
            .unwrap();

        let registry = create_registry(&settings).unwrap();
        assert_eq!(registry.name(), "file");

        let outcome = Verifier::from_settings(registry, &settings)
            .verify(code.as_str(), &who)
            .await;
        assert!(outcome.verdict.valid);
    }

    #[tokio::test]
    async fn no_registry_is_service_error() {
        let dir = TempDir::new().unwrap();
        let settings = settings(RegistryProvider::None, &dir);
        let registry = create_registry(&settings).unwrap();

        let who = asha();
        let code = issue(&who);
        let outcome = Verifier::from_settings(registry, &settings)
            .verify(code.as_str(), &who)
            .await;
        assert_eq!(outcome.verdict.error_kind(), Some(ErrorKind::Service));
    }

    #[test]
    fn http_provider_requires_base_url() {
        let dir = TempDir::new().unwrap();
        let settings = settings(RegistryProvider::Http, &dir);
        assert!(matches!(
            create_registry(&settings),
            Err(RegistryError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_verifications_share_a_registry() {
        let registry = MemoryRegistry::new();
        let mut people = Vec::new();
        for i in 0..8 {
            let who = Identity::new(
                format!("Person {}", i),
                format!("p{}@example.com", i),
                format!("98765432{:02}", i),
            );
            let code = issue(&who);
            registry.insert(code.clone());
            people.push((who, code));
        }

        let verifier = Arc::new(Verifier::new(Box::new(registry.clone())));
        let mut handles = Vec::new();
        for (who, code) in people {
            let verifier = Arc::clone(&verifier);
            handles.push(tokio::spawn(async move {
                verifier.verify(code.as_str(), &who).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().verdict.valid);
        }
        assert_eq!(registry.lookup_count(), 8);
    }
}

// =============================================================================
// Backend handlers
// =============================================================================

mod handlers {
    use super::*;

    fn verifier(registry: &MemoryRegistry) -> Verifier {
        Verifier::new(Box::new(registry.clone())).with_retries(0)
    }

    #[tokio::test]
    async fn reference_endpoint_maps_statuses() {
        let code = issue(&asha());
        let registry = MemoryRegistry::new();
        let verifier = verifier(&registry);
        let request = ValidateReferenceRequest::new(code.as_str());

        let response = handle_validate_reference(&verifier, &request).await;
        assert!(!response.success);
        assert_eq!(response.message, MSG_NOT_FOUND);
        assert_eq!(response.outcome, Some(Outcome::NotFound));

        registry.insert(code.clone());
        let response = handle_validate_reference(&verifier, &request).await;
        assert!(response.success);
        assert_eq!(response.message, MSG_VALIDATED);
        assert_eq!(response.data.unwrap().status, SubmissionStatus::Pending);

        registry.consume(&code);
        let response = handle_validate_reference(&verifier, &request).await;
        assert!(!response.success);
        assert_eq!(response.message, MSG_ALREADY_USED);
        assert_eq!(response.outcome, Some(Outcome::AlreadyUsed));
        assert_eq!(response.data.unwrap().status, SubmissionStatus::Processed);
    }

    #[tokio::test]
    async fn reference_endpoint_rejects_malformed_code() {
        let registry = MemoryRegistry::new();
        let request = ValidateReferenceRequest::new("NRL123");

        let response = handle_validate_reference(&verifier(&registry), &request).await;
        assert!(!response.success);
        assert_eq!(response.message, ValidationError::Format.to_string());
        assert_eq!(response.http_status(), 422);
        assert!(registry.operations().is_empty());
    }

    #[tokio::test]
    async fn reference_endpoint_hides_registry_errors() {
        let registry = MemoryRegistry::new().fail_on(FailOn::Always(RegistryError::Storage(
            "disk full".into(),
        )));
        let request = ValidateReferenceRequest::new(issue(&asha()).as_str());

        let response = handle_validate_reference(&verifier(&registry), &request).await;
        assert!(!response.success);
        assert_eq!(response.message, MSG_UNAVAILABLE);
        assert_eq!(response.outcome, Some(Outcome::Unavailable));
    }

    #[tokio::test]
    async fn slow_registry_answers_unavailable_in_time() {
        let code = issue(&asha());
        let registry = MemoryRegistry::new().with_latency(Duration::from_secs(30));
        registry.insert(code.clone());
        let verifier = Verifier::new(Box::new(registry.clone()))
            .with_timeout(Duration::from_millis(50))
            .with_retries(0);

        let reference = ValidateReferenceRequest::new(code.as_str());
        let response = tokio::time::timeout(
            Duration::from_secs(2),
            handle_validate_reference(&verifier, &reference),
        )
        .await
        .expect("handler must not wait on the registry");
        assert_eq!(response.message, MSG_UNAVAILABLE);
        assert_eq!(response.outcome, Some(Outcome::Unavailable));
        assert_eq!(response.http_status(), 503);

        let forms = ValidateGoogleFormsRequest::new(code.as_str(), asha());
        let response = tokio::time::timeout(
            Duration::from_secs(2),
            handle_validate_google_forms(&verifier, &forms),
        )
        .await
        .expect("handler must not wait on the registry");
        assert_eq!(response.outcome, Some(Outcome::Unavailable));
        assert_eq!(response.http_status(), 503);
    }

    #[tokio::test]
    async fn forms_endpoint_checks_identity_first() {
        let who = asha();
        let code = issue(&who);
        let registry = MemoryRegistry::new();
        registry.insert(code.clone());
        let verifier = verifier(&registry);

        let response = handle_validate_google_forms(
            &verifier,
            &ValidateGoogleFormsRequest::new(code.as_str(), who.clone()),
        )
        .await;
        assert!(response.success, "{:?}", response);

        let before = registry.lookup_count();
        let stranger = Identity::new("Someone Else", "else@example.org", "5550000000");
        let response = handle_validate_google_forms(
            &verifier,
            &ValidateGoogleFormsRequest::new(code.as_str(), stranger),
        )
        .await;
        assert!(!response.success);
        assert_eq!(response.message, ValidationError::Mismatch.to_string());
        assert_eq!(response.outcome, Some(Outcome::Rejected));
        assert_eq!(registry.lookup_count(), before);
    }

    #[tokio::test]
    async fn seeded_submission_round_trips_through_handler() {
        let code = issue(&asha());
        let mut submission = Submission::pending(code.clone(), Utc::now());
        submission.form_id = "form_seeded".into();
        let registry = MemoryRegistry::with_submissions(vec![submission]);

        let request = ValidateReferenceRequest::new(code.as_str());
        let response = handle_validate_reference(&verifier(&registry), &request).await;
        assert_eq!(response.data.unwrap().form_id, "form_seeded");
    }
}
