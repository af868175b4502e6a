//! Common test utilities

use std::sync::atomic::{AtomicU32, Ordering};

use axum::Router;
use powerbill::api;
use powerbill::store::{FileStore, Store};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Build an app over a fresh file store at a unique temp path, so every
/// test starts from the default empty state.
pub fn test_app() -> Router {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "powerbill-test-{}-{}.json",
        std::process::id(),
        n
    ));
    let _ = std::fs::remove_file(&path);

    let store = Store::File(FileStore::new(path));
    api::create_router().with_state(store)
}
