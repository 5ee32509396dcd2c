//! Integration tests for papertrade-core
//!
//! Exercise the auth flow against a real file-backed DuckDB store.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

use papertrade_core::adapters::duckdb::DuckDbCredentialStore;
use papertrade_core::domain::HashingParams;
use papertrade_core::services::{DemoService, TOKEN_TTL_HOURS};
use papertrade_core::{AuthService, CredentialStore, Error, PapertradeContext};

// ============================================================================
// Test Helpers
// ============================================================================

const SECRET: &[u8] = b"integration-test-secret";

/// Open (or reopen) a file-backed store with schema initialized
fn open_store(temp_dir: &TempDir) -> Arc<DuckDbCredentialStore> {
    let db_path = temp_dir.path().join("test.duckdb");
    let store = DuckDbCredentialStore::new(&db_path).expect("Failed to open store");
    store.ensure_schema().expect("Failed to initialize schema");
    Arc::new(store)
}

fn auth_over(store: Arc<DuckDbCredentialStore>) -> AuthService {
    AuthService::new(store, HashingParams::minimal(), SECRET).expect("Failed to build auth service")
}

// ============================================================================
// Register / login round trips
// ============================================================================

#[test]
fn test_register_login_verify_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let auth = auth_over(open_store(&temp_dir));

    let registered = auth
        .register("Demo User", "demo@example.com", "password123")
        .unwrap();
    assert_eq!(registered.user.balance, Decimal::from(100_000));
    assert_eq!(auth.verify(&registered.token).unwrap(), registered.user.id);

    let logged_in = auth.login("demo@example.com", "password123").unwrap();
    assert_eq!(logged_in.user, registered.user);
    assert_eq!(auth.verify(&logged_in.token).unwrap(), registered.user.id);
}

#[test]
fn test_many_principals_each_resolve_to_themselves() {
    let temp_dir = TempDir::new().unwrap();
    let auth = auth_over(open_store(&temp_dir));

    let mut ids = Vec::new();
    for i in 0..5 {
        let email = format!("trader{}@example.com", i);
        let session = auth.register(&format!("Trader {}", i), &email, "hunter22").unwrap();
        ids.push((email, session.user.id));
    }

    for (email, id) in &ids {
        let session = auth.login(email, "hunter22").unwrap();
        assert_eq!(session.user.id, *id);
        assert_eq!(auth.get_profile(*id).unwrap().email, *email);
    }
}

#[test]
fn test_failed_login_messages_are_identical() {
    let temp_dir = TempDir::new().unwrap();
    let auth = auth_over(open_store(&temp_dir));
    auth.register("Demo User", "demo@example.com", "password123")
        .unwrap();

    let wrong_password = auth.login("demo@example.com", "wrongpass").unwrap_err();
    let unknown_email = auth.login("nobody@example.com", "wrongpass").unwrap_err();

    assert!(matches!(wrong_password, Error::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[test]
fn test_duplicate_registration_leaves_first_principal_intact() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let auth = auth_over(Arc::clone(&store));

    let first = auth
        .register("Demo User", "demo@example.com", "password123")
        .unwrap();
    let before = store.find_by_email("demo@example.com").unwrap().unwrap();

    let err = auth
        .register("Someone Else", "demo@example.com", "different")
        .unwrap_err();
    assert!(matches!(err, Error::Conflict));

    let after = store.find_by_email("demo@example.com").unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(after.id, first.user.id);
    assert_eq!(store.count().unwrap(), 1);
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_expired_token_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let auth = auth_over(open_store(&temp_dir));
    let session = auth
        .register("Demo User", "demo@example.com", "password123")
        .unwrap();

    let issued_at = Utc::now() - Duration::hours(TOKEN_TTL_HOURS + 1);
    let stale = auth.signer().issue_at(session.user.id, issued_at).unwrap();

    assert!(matches!(auth.verify(&stale), Err(Error::InvalidToken)));
}

#[test]
fn test_token_from_other_secret_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let auth = auth_over(Arc::clone(&store));
    let other = AuthService::new(store, HashingParams::minimal(), b"another-secret").unwrap();

    let session = other
        .register("Demo User", "demo@example.com", "password123")
        .unwrap();
    assert!(matches!(auth.verify(&session.token), Err(Error::InvalidToken)));
}

#[test]
fn test_valid_token_for_vanished_principal_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let auth = auth_over(open_store(&temp_dir));

    let token = auth.signer().issue(Uuid::new_v4()).unwrap();
    let id = auth.verify(&token).unwrap();
    assert!(matches!(auth.get_profile(id), Err(Error::NotFound(_))));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_principals_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let id = {
        let auth = auth_over(open_store(&temp_dir));
        auth.register("Demo User", "demo@example.com", "password123")
            .unwrap()
            .user
            .id
    };

    let auth = auth_over(open_store(&temp_dir));
    let session = auth.login("demo@example.com", "password123").unwrap();
    assert_eq!(session.user.id, id);
    assert_eq!(session.user.balance, Decimal::from(100_000));
}

#[test]
fn test_sequential_reopen_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();

    for _ in 0..5 {
        let store = open_store(&temp_dir);
        assert_eq!(store.count().unwrap(), 0);
    }
}

// ============================================================================
// Context and demo mode
// ============================================================================

#[test]
fn test_context_wires_store_and_auth() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("settings.json"),
        r#"{"auth": {"hashing": {"memoryCost": 8, "timeCost": 1, "parallelism": 1}}}"#,
    )
    .unwrap();

    let ctx = PapertradeContext::new(temp_dir.path()).unwrap();
    let session = ctx
        .auth_service
        .register("Demo User", "demo@example.com", "password123")
        .unwrap();

    let status = ctx.status_service.get_status(&ctx.config).unwrap();
    assert_eq!(status.total_principals, 1);
    assert_eq!(ctx.auth_service.verify(&session.token).unwrap(), session.user.id);
    assert!(temp_dir.path().join(ctx.config.db_filename()).exists());
}

#[test]
fn test_demo_mode_seeds_demo_principal() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("settings.json"),
        r#"{"auth": {"hashing": {"memoryCost": 8, "timeCost": 1, "parallelism": 1}}}"#,
    )
    .unwrap();

    let demo = DemoService::new(temp_dir.path());
    demo.enable().unwrap();
    assert!(demo.is_enabled().unwrap());

    let ctx = PapertradeContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.config.db_filename(), "demo.duckdb");
    let session = ctx
        .auth_service
        .login("demo@example.com", "password123")
        .unwrap();
    assert_eq!(session.user.name, "Demo User");
    assert_eq!(ctx.store.count().unwrap(), 1);

    demo.disable(true).unwrap();
    assert!(!demo.is_enabled().unwrap());
}
