//! Concurrent registration tests
//!
//! Many threads share one store, the way request handlers do. The UNIQUE
//! constraint has to hold no matter how registrations interleave.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use papertrade_core::adapters::duckdb::DuckDbCredentialStore;
use papertrade_core::domain::HashingParams;
use papertrade_core::{AuthService, CredentialStore, Error};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 8;

fn shared_auth(temp_dir: &TempDir) -> (Arc<DuckDbCredentialStore>, Arc<AuthService>) {
    let store = DuckDbCredentialStore::new(&temp_dir.path().join("concurrent.duckdb")).unwrap();
    store.ensure_schema().unwrap();
    let store = Arc::new(store);
    let auth = AuthService::new(
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        HashingParams::minimal(),
        b"concurrent-secret",
    )
    .unwrap();
    (store, Arc::new(auth))
}

/// Every thread registers the same email at once; exactly one may win
#[test]
fn test_concurrent_duplicate_registration() {
    let temp_dir = TempDir::new().unwrap();
    let (store, auth) = shared_auth(&temp_dir);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let conflict_count = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let auth = Arc::clone(&auth);
            let success_count = Arc::clone(&success_count);
            let conflict_count = Arc::clone(&conflict_count);

            thread::spawn(move || {
                barrier.wait();
                match auth.register(&format!("Racer {}", i), "race@example.com", "password123") {
                    Ok(_) => {
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(Error::Conflict) => {
                        conflict_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected error: {}", e),
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(success_count.load(Ordering::SeqCst), 1);
    assert_eq!(conflict_count.load(Ordering::SeqCst), THREAD_COUNT - 1);
    assert_eq!(store.count().unwrap(), 1);
}

/// Distinct emails registered concurrently all succeed
#[test]
fn test_concurrent_distinct_registrations() {
    let temp_dir = TempDir::new().unwrap();
    let (store, auth) = shared_auth(&temp_dir);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let auth = Arc::clone(&auth);
            thread::spawn(move || {
                barrier.wait();
                let email = format!("trader{}@example.com", i);
                let session = auth.register("Trader", &email, "password123").unwrap();
                let login = auth.login(&email, "password123").unwrap();
                assert_eq!(session.user.id, login.user.id);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.count().unwrap(), THREAD_COUNT as u64);
}
