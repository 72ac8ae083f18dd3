//! Global state store.
//!
//! A single-writer container for the signed-in user, their preferences, the
//! committed filter and per-session caches. Every mutation goes through
//! [`GlobalStore::dispatch`], which applies one [`Action`] and publishes the
//! resulting snapshot to subscribers in commit order.
//!
//! Operations that read or write the remote store run under a write gate:
//! they hold it shared while in flight, and [`GlobalStore::logout`] holds it
//! exclusively. Logout therefore waits for in-flight writes, and anything
//! started after logout sees the signed-out state.

mod state;

pub use state::{Action, DiaryCache, SessionCache, StoreState};

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::composer::FilterPanelHost;
use crate::diary;
use crate::error::{DiaryError, Result};
use crate::facets::FilterData;
use crate::identity::IdentityProvider;
use crate::remote::{from_document, paths, to_document, DocumentStore};
use crate::types::{FilterSelection, User, UserPreferences};

/// Snapshot buffer per subscriber before it starts lagging.
const SNAPSHOT_CAPACITY: usize = 64;

pub struct GlobalStore<S, I> {
    remote: S,
    identity: I,
    state: RwLock<Arc<StoreState>>,
    snapshots: broadcast::Sender<Arc<StoreState>>,
    write_gate: tokio::sync::RwLock<()>,
}

impl<S, I> GlobalStore<S, I> {
    pub fn new(remote: S, identity: I) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        Self {
            remote,
            identity,
            state: RwLock::new(Arc::new(StoreState::default())),
            snapshots,
            write_gate: tokio::sync::RwLock::new(()),
        }
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Current committed state.
    pub fn snapshot(&self) -> Arc<StoreState> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Receive every snapshot committed from now on, in commit order.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StoreState>> {
        self.snapshots.subscribe()
    }

    /// Apply one action and publish the new snapshot.
    pub fn dispatch(&self, action: Action) -> Arc<StoreState> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(action = action.name(), "dispatch");
        Arc::make_mut(&mut guard).apply(action);
        let snapshot = Arc::clone(&guard);
        // Publishing under the lock keeps broadcast order equal to commit order.
        let _ = self.snapshots.send(Arc::clone(&snapshot));
        snapshot
    }

    pub fn set_user(&self, user: Option<User>) {
        self.dispatch(Action::SetUser(user));
    }

    pub fn set_preferences(&self, preferences: UserPreferences) {
        self.dispatch(Action::SetPreferences(preferences));
    }

    pub fn set_user_and_preferences(&self, user: Option<User>, preferences: UserPreferences) {
        self.dispatch(Action::SetUserAndPreferences { user, preferences });
    }

    pub fn set_filter(&self, filter: FilterSelection) {
        self.dispatch(Action::SetFilter(filter));
    }

    fn current_uid(&self) -> Result<String> {
        self.snapshot()
            .user
            .as_ref()
            .map(|user| user.uid.clone())
            .ok_or(DiaryError::NotSignedIn)
    }

    fn is_current_uid(&self, uid: &str) -> bool {
        self.snapshot()
            .user
            .as_ref()
            .is_some_and(|user| user.uid == uid)
    }
}

impl<S: DocumentStore, I: IdentityProvider> GlobalStore<S, I> {
    /// Hydrate preferences for `user` and sign them in as one transition.
    ///
    /// A user without a stored preferences document gets defaults.
    pub async fn load_preferences_for_user(&self, user: User) -> Result<()> {
        let _gate = self.write_gate.read().await;
        let document = self
            .remote
            .get(&paths::preferences(&user.uid))
            .await
            .map_err(DiaryError::into_fetch)?;

        let preferences = match document {
            Some(document) => from_document(document).map_err(DiaryError::into_fetch)?,
            None => {
                tracing::info!(uid = %user.uid, "no stored preferences; using defaults");
                UserPreferences::default()
            }
        };
        self.dispatch(Action::SetUserAndPreferences {
            user: Some(user),
            preferences,
        });
        Ok(())
    }

    /// Upsert preferences remotely, then apply them locally.
    ///
    /// Local state changes only after the remote transaction commits.
    ///
    /// # Errors
    ///
    /// - `DiaryError::Validation` before any remote call if no media type is tracked
    /// - `DiaryError::NotSignedIn` if no user is signed in
    /// - `DiaryError::Write` if the remote transaction fails
    pub async fn save_preferences(&self, preferences: UserPreferences) -> Result<()> {
        preferences.validate()?;
        let _gate = self.write_gate.read().await;
        let uid = self.current_uid()?;
        let path = paths::preferences(&uid);
        let fields = to_document(&preferences)?;

        self.remote
            .run_transaction(|tx| {
                if tx.get(&path)?.is_none() {
                    tx.set(&path, fields.clone())?;
                }
                tx.update(&path, fields.clone())
            })
            .await
            .map_err(|err| {
                tracing::warn!(uid = %uid, error = %err, "preference save failed");
                err.into_write()
            })?;

        self.dispatch(Action::SetPreferences(preferences));
        tracing::info!(uid = %uid, "preferences saved");
        Ok(())
    }

    /// Save a modified copy of the current preferences.
    pub async fn set_preference<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut UserPreferences),
    {
        let mut preferences = self.snapshot().preferences.clone();
        change(&mut preferences);
        self.save_preferences(preferences).await
    }

    /// Sign out, then reset identity, preferences and caches in one transition.
    ///
    /// Waits for in-flight remote operations first. On sign-out failure the
    /// error is logged and returned and local state is left untouched.
    pub async fn logout(&self) -> Result<()> {
        let _gate = self.write_gate.write().await;
        if let Err(err) = self.identity.sign_out().await {
            tracing::error!(error = %err, "sign-out failed; keeping session state");
            return Err(match err {
                DiaryError::SignOut(_) => err,
                other => DiaryError::SignOut(other.to_string()),
            });
        }
        self.dispatch(Action::SignedOut);
        tracing::info!("signed out");
        Ok(())
    }

    /// Fetch the signed-in user's diary into the diary cache.
    pub async fn load_diary(&self) -> Result<Arc<StoreState>> {
        let _gate = self.write_gate.read().await;
        let uid = self.current_uid()?;
        let records = diary::list_records(&self.remote, &uid)
            .await
            .map_err(DiaryError::into_fetch)?;
        if !self.is_current_uid(&uid) {
            return Err(DiaryError::NotSignedIn);
        }
        Ok(self.dispatch(Action::SetDiary(DiaryCache::from_records(records))))
    }

    /// Facet aggregate for the signed-in user, fetched once per session.
    pub async fn filter_data(&self) -> Result<Arc<FilterData>> {
        let uid = self.current_uid()?;
        if let Some(cached) = self.snapshot().session.filter_data_for(&uid) {
            return Ok(cached);
        }
        self.refetch_filter_data().await
    }

    /// Fetch the facet aggregate, replacing any cached copy.
    ///
    /// A missing aggregate document is an empty aggregate, not an error.
    pub async fn refetch_filter_data(&self) -> Result<Arc<FilterData>> {
        let _gate = self.write_gate.read().await;
        let uid = self.current_uid()?;
        let document = self
            .remote
            .get(&paths::filter_data(&uid))
            .await
            .map_err(DiaryError::into_fetch)?;
        let data = match document {
            Some(document) => from_document(document).map_err(DiaryError::into_fetch)?,
            None => FilterData::default(),
        };
        let data = Arc::new(data);
        if self.is_current_uid(&uid) {
            self.dispatch(Action::CacheFilterData {
                uid,
                data: Arc::clone(&data),
            });
        }
        Ok(data)
    }

    /// Facet aggregate, degrading any failure to an empty aggregate.
    pub async fn filter_data_or_empty(&self) -> Arc<FilterData> {
        match self.filter_data().await {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(error = %err, "facet aggregate unavailable; showing no facet controls");
                Arc::new(FilterData::default())
            }
        }
    }
}

impl<S, I> FilterPanelHost for GlobalStore<S, I> {
    fn committed_filter(&self) -> FilterSelection {
        self.snapshot().filter.clone()
    }

    fn open_filter_panel(&self) {
        self.dispatch(Action::OpenFilterPanel);
    }

    fn close_filter_panel(&self) {
        self.dispatch(Action::CloseFilterPanel);
    }

    fn commit_filter(&self, selection: FilterSelection) {
        self.dispatch(Action::CommitFilter(selection));
    }
}
