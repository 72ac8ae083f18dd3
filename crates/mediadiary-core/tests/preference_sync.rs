use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::json;
use tokio::sync::Notify;

use mediadiary_core::remote::{
    from_document, paths, to_document, Document, DocumentStore, DocumentTransaction, Query,
};
use mediadiary_core::store::DiaryCache;
use mediadiary_core::{
    DiaryError, GlobalStore, IdentityProvider, MediaType, Result, SqliteDocumentStore, Theme, User,
    UserPreferences,
};

/// Identity provider whose sign-out outcome is switchable.
#[derive(Default)]
struct TestIdentity {
    fail: AtomicBool,
}

impl IdentityProvider for TestIdentity {
    async fn sign_out(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DiaryError::SignOut("network unreachable".to_string()));
        }
        Ok(())
    }
}

/// Wraps the SQLite store, counting transactions and optionally failing or
/// pausing them.
struct ScriptedStore {
    inner: SqliteDocumentStore,
    transactions: AtomicUsize,
    fail_transactions: AtomicBool,
    pause: Option<Pause>,
}

struct Pause {
    entered: Notify,
    release: Notify,
}

impl ScriptedStore {
    fn new() -> Self {
        Self {
            inner: SqliteDocumentStore::open_in_memory().expect("open store"),
            transactions: AtomicUsize::new(0),
            fail_transactions: AtomicBool::new(false),
            pause: None,
        }
    }

    fn paused() -> Self {
        Self {
            pause: Some(Pause {
                entered: Notify::new(),
                release: Notify::new(),
            }),
            ..Self::new()
        }
    }

    fn pause(&self) -> &Pause {
        self.pause.as_ref().expect("store built with a pause")
    }
}

impl DocumentStore for ScriptedStore {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, document: Document) -> Result<()> {
        self.inner.set(path, document).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        self.inner.query(query).await
    }

    async fn run_transaction<T, F>(&self, body: F) -> Result<T>
    where
        F: FnMut(&mut dyn DocumentTransaction) -> Result<T>,
    {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        if let Some(pause) = &self.pause {
            pause.entered.notify_one();
            pause.release.notified().await;
        }
        if self.fail_transactions.load(Ordering::SeqCst) {
            return Err(DiaryError::Storage("connection reset".to_string()));
        }
        self.inner.run_transaction(body).await
    }
}

fn dark_2024() -> UserPreferences {
    UserPreferences {
        theme: Theme::Dark,
        year: Some("2024".to_string()),
        years: vec![2023, 2024],
        ..UserPreferences::default()
    }
}

async fn signed_in(remote: ScriptedStore) -> GlobalStore<ScriptedStore, TestIdentity> {
    let store = GlobalStore::new(remote, TestIdentity::default());
    store
        .load_preferences_for_user(User::new("u1"))
        .await
        .expect("load preferences");
    store
}

async fn stored_preferences(store: &GlobalStore<ScriptedStore, TestIdentity>) -> Option<Document> {
    store
        .remote()
        .get(&paths::preferences("u1"))
        .await
        .expect("read preferences")
}

#[tokio::test]
async fn test_save_creates_then_updates_remote_document() {
    let store = signed_in(ScriptedStore::new()).await;
    assert!(stored_preferences(&store).await.is_none());

    store.save_preferences(dark_2024()).await.expect("first save");
    let first = stored_preferences(&store).await.expect("document created");
    assert_eq!(
        from_document::<UserPreferences>(first.clone()).expect("decode"),
        dark_2024()
    );

    let mut changed = dark_2024();
    changed.theme = Theme::Light;
    store.save_preferences(changed).await.expect("second save");
    let second = stored_preferences(&store).await.expect("document kept");

    assert_eq!(second.get("theme"), Some(&json!("light")));
    for field in ["year", "years", "mediaTypes"] {
        assert_eq!(first.get(field), second.get(field), "{} unchanged", field);
    }
}

#[tokio::test]
async fn test_save_keeps_fields_it_does_not_own() {
    let store = signed_in(ScriptedStore::new()).await;
    store
        .remote()
        .set(
            &paths::preferences("u1"),
            to_document(&json!({"theme": "light", "pinned": ["r1"]})).expect("doc"),
        )
        .await
        .expect("seed");

    store.save_preferences(dark_2024()).await.expect("save");

    let stored = stored_preferences(&store).await.expect("document");
    assert_eq!(stored.get("pinned"), Some(&json!(["r1"])));
    assert_eq!(stored.get("theme"), Some(&json!("dark")));
}

#[tokio::test]
async fn test_validation_failure_makes_no_remote_call() {
    let store = signed_in(ScriptedStore::new()).await;
    let mut prefs = dark_2024();
    prefs.media_types.clear();

    let result = store.save_preferences(prefs).await;

    assert!(matches!(result, Err(DiaryError::Validation(_))));
    assert_eq!(store.remote().transactions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_write_failure_propagates_and_keeps_local_state() {
    let store = signed_in(ScriptedStore::new()).await;
    store.save_preferences(dark_2024()).await.expect("save");
    let before = store.snapshot();

    store
        .remote()
        .fail_transactions
        .store(true, Ordering::SeqCst);
    let result = store
        .set_preference(|prefs| prefs.media_types = [MediaType::Film].into_iter().collect())
        .await;

    assert!(matches!(result, Err(DiaryError::Write(_))));
    assert_eq!(*store.snapshot(), *before);
}

#[tokio::test]
async fn test_logout_is_all_or_nothing() {
    let store = signed_in(ScriptedStore::new()).await;
    store.save_preferences(dark_2024()).await.expect("save");
    store.load_diary().await.expect("diary");
    store.filter_data().await.expect("facets");

    store.identity().fail.store(true, Ordering::SeqCst);
    let before = store.snapshot();
    assert!(matches!(store.logout().await, Err(DiaryError::SignOut(_))));
    assert_eq!(*store.snapshot(), *before);

    store.identity().fail.store(false, Ordering::SeqCst);
    let mut rx = store.subscribe();
    store.logout().await.expect("logout");

    let reset = rx.recv().await.expect("one snapshot");
    assert!(reset.user.is_none());
    assert_eq!(reset.preferences, UserPreferences::default());
    assert_eq!(reset.diary, DiaryCache::default());
    assert!(reset.session.filter_data.is_none());
    assert!(rx.try_recv().is_err(), "reset lands as a single snapshot");
}

#[tokio::test]
async fn test_logout_waits_for_in_flight_save() {
    let store = signed_in(ScriptedStore::paused()).await;
    let mut rx = store.subscribe();

    let pause = store.remote().pause();
    let save = store.save_preferences(dark_2024());
    let logout = async {
        pause.entered.notified().await;
        let (logged_out, ()) = tokio::join!(store.logout(), async {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            // logout is queued behind the save and has not reset anything
            assert!(store.snapshot().user.is_some());
            pause.release.notify_one();
        });
        logged_out
    };
    let (saved, logged_out) = tokio::join!(save, logout);

    saved.expect("save completes");
    logged_out.expect("logout completes");

    let after_save = rx.recv().await.expect("save snapshot");
    assert_eq!(after_save.preferences, dark_2024());
    assert!(after_save.user.is_some());

    let after_logout = rx.recv().await.expect("logout snapshot");
    assert!(after_logout.user.is_none());
    assert_eq!(after_logout.preferences, UserPreferences::default());
    assert_eq!(*store.snapshot(), *after_logout);

    let remote = stored_preferences(&store).await.expect("save reached remote");
    assert_eq!(remote.get("theme"), Some(&json!("dark")));
}

#[tokio::test]
async fn test_save_after_logout_is_rejected() {
    let store = signed_in(ScriptedStore::new()).await;
    store.logout().await.expect("logout");

    let result = store.save_preferences(dark_2024()).await;

    assert!(matches!(result, Err(DiaryError::NotSignedIn)));
    assert_eq!(store.remote().transactions.load(Ordering::SeqCst), 0);
    assert_eq!(store.snapshot().preferences, UserPreferences::default());
}
