//! Store state and the action set that mutates it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::facets::FilterData;
use crate::types::{DiaryRecord, FilterSelection, User, UserPreferences};

/// Diary records cached for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiaryCache {
    pub by_id: HashMap<String, DiaryRecord>,
    /// Record ids per diary date, in insertion order
    pub by_date: BTreeMap<NaiveDate, Vec<String>>,
}

impl DiaryCache {
    pub fn from_records(records: impl IntoIterator<Item = DiaryRecord>) -> Self {
        let mut cache = DiaryCache::default();
        for record in records {
            cache
                .by_date
                .entry(record.diary_date)
                .or_default()
                .push(record.id.clone());
            cache.by_id.insert(record.id.clone(), record);
        }
        cache
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Records newest date first.
    pub fn newest_first(&self) -> impl Iterator<Item = &DiaryRecord> {
        self.by_date
            .iter()
            .rev()
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| self.by_id.get(id))
    }
}

/// Data cached for the lifetime of one signed-in session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionCache {
    /// Facet aggregate and the uid it was fetched for
    pub filter_data: Option<(String, Arc<FilterData>)>,
}

impl SessionCache {
    pub fn filter_data_for(&self, uid: &str) -> Option<Arc<FilterData>> {
        self.filter_data
            .as_ref()
            .filter(|(owner, _)| owner == uid)
            .map(|(_, data)| Arc::clone(data))
    }
}

/// Everything the global store holds. Observers receive whole snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub user: Option<User>,
    pub preferences: UserPreferences,
    /// Committed filter applied to chart queries
    pub filter: FilterSelection,
    pub filter_panel_open: bool,
    pub diary: DiaryCache,
    pub session: SessionCache,
}

/// The closed set of state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUser(Option<User>),
    SetPreferences(UserPreferences),
    SetUserAndPreferences {
        user: Option<User>,
        preferences: UserPreferences,
    },
    SetFilter(FilterSelection),
    OpenFilterPanel,
    CloseFilterPanel,
    /// Replace the committed filter and close the panel as one transition
    CommitFilter(FilterSelection),
    SetDiary(DiaryCache),
    CacheFilterData {
        uid: String,
        data: Arc<FilterData>,
    },
    /// Post-sign-out reset of identity, preferences, filter and every cache
    SignedOut,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetUser(_) => "set_user",
            Action::SetPreferences(_) => "set_preferences",
            Action::SetUserAndPreferences { .. } => "set_user_and_preferences",
            Action::SetFilter(_) => "set_filter",
            Action::OpenFilterPanel => "open_filter_panel",
            Action::CloseFilterPanel => "close_filter_panel",
            Action::CommitFilter(_) => "commit_filter",
            Action::SetDiary(_) => "set_diary",
            Action::CacheFilterData { .. } => "cache_filter_data",
            Action::SignedOut => "signed_out",
        }
    }
}

impl StoreState {
    /// Apply one action in place.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetUser(user) => self.user = user,
            Action::SetPreferences(preferences) => self.preferences = preferences,
            Action::SetUserAndPreferences { user, preferences } => {
                self.user = user;
                self.preferences = preferences;
            }
            Action::SetFilter(filter) => self.filter = filter.normalized(),
            Action::OpenFilterPanel => self.filter_panel_open = true,
            Action::CloseFilterPanel => self.filter_panel_open = false,
            Action::CommitFilter(filter) => {
                self.filter = filter.normalized();
                self.filter_panel_open = false;
            }
            Action::SetDiary(diary) => self.diary = diary,
            Action::CacheFilterData { uid, data } => {
                self.session.filter_data = Some((uid, data));
            }
            Action::SignedOut => {
                self.user = None;
                self.preferences = UserPreferences::default();
                self.filter = FilterSelection::default();
                self.filter_panel_open = false;
                self.diary = DiaryCache::default();
                self.session = SessionCache::default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MediaType, Theme};

    fn record(id: &str, y: i32, m: u32, d: u32) -> DiaryRecord {
        let date = NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        DiaryRecord::new(id, MediaType::Film, id, date)
    }

    #[test]
    fn test_commit_filter_sets_filter_and_closes_panel() {
        let mut state = StoreState {
            filter_panel_open: true,
            ..StoreState::default()
        };
        state.apply(Action::CommitFilter(FilterSelection::new().diary_year(2023)));
        assert_eq!(state.filter.diary_year, Some(2023));
        assert!(!state.filter_panel_open);
    }

    #[test]
    fn test_signed_out_resets_identity_and_caches() {
        let mut state = StoreState::default();
        state.apply(Action::SetUserAndPreferences {
            user: Some(User::new("u1")),
            preferences: UserPreferences {
                theme: Theme::Dark,
                ..UserPreferences::default()
            },
        });
        state.apply(Action::SetDiary(DiaryCache::from_records([record("a", 2023, 1, 1)])));
        state.apply(Action::CacheFilterData {
            uid: "u1".to_string(),
            data: Arc::new(FilterData::default()),
        });

        state.apply(Action::SignedOut);

        assert!(state.user.is_none());
        assert_eq!(state.preferences, UserPreferences::default());
        assert!(state.diary.is_empty());
        assert!(state.session.filter_data.is_none());
    }

    #[test]
    fn test_signed_out_drops_previous_users_filter() {
        let mut state = StoreState::default();
        state.apply(Action::SetFilter(FilterSelection::new().genre("Drama")));
        state.apply(Action::OpenFilterPanel);
        state.apply(Action::SignedOut);
        assert!(state.filter.is_empty());
        assert!(!state.filter_panel_open);
    }

    #[test]
    fn test_diary_cache_orders_newest_first() {
        let cache = DiaryCache::from_records([
            record("old", 2021, 5, 1),
            record("new", 2023, 1, 1),
            record("mid", 2022, 7, 9),
        ]);
        let ids: Vec<&str> = cache.newest_first().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_session_cache_is_per_user() {
        let session = SessionCache {
            filter_data: Some(("u1".to_string(), Arc::new(FilterData::default()))),
        };
        assert!(session.filter_data_for("u1").is_some());
        assert!(session.filter_data_for("u2").is_none());
    }
}
