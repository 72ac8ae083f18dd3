//! Filter composer: the draft-editing state machine behind the filter panel.
//!
//! `Idle -> Editing -> Saving -> Idle`. The draft is owned by the composer
//! for one editing cycle and reaches shared state only through
//! [`FilterPanelHost::commit_filter`].

use crate::error::{DiaryError, Result};
use crate::facets::{compute_candidates, FacetCandidate, FacetDimension, FilterData};
use crate::types::{FilterSelection, MediaType, RatingOption};

/// Owner of the committed filter and the panel-open flag.
pub trait FilterPanelHost {
    fn committed_filter(&self) -> FilterSelection;

    fn open_filter_panel(&self);

    fn close_filter_panel(&self);

    /// Replace the committed filter and close the panel in one transition.
    fn commit_filter(&self, selection: FilterSelection);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Editing,
    Saving,
}

#[derive(Debug)]
pub struct FilterComposer {
    state: PanelState,
    draft: Option<FilterSelection>,
}

impl Default for FilterComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterComposer {
    pub fn new() -> Self {
        Self {
            state: PanelState::Idle,
            draft: None,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// The draft of the current editing cycle.
    pub fn draft(&self) -> Option<&FilterSelection> {
        self.draft.as_ref()
    }

    /// Start an editing cycle from a copy of the committed filter.
    pub fn open<H: FilterPanelHost>(&mut self, host: &H) -> Result<()> {
        if self.state != PanelState::Idle {
            return Err(self.invalid("open"));
        }
        self.draft = Some(host.committed_filter());
        self.state = PanelState::Editing;
        host.open_filter_panel();
        Ok(())
    }

    /// Change the diary year; a different year clears every other facet.
    pub fn set_diary_year(&mut self, year: Option<i32>) -> Result<()> {
        let draft = self.draft_mut("set diary year")?;
        if draft.diary_year != year {
            *draft = FilterSelection {
                diary_year: year,
                ..FilterSelection::default()
            };
        }
        Ok(())
    }

    /// Add or remove one media type from the draft's type set.
    pub fn toggle_media_type(&mut self, media_type: MediaType) -> Result<()> {
        let draft = self.draft_mut("toggle media type")?;
        let set = draft.media_type.get_or_insert_with(Default::default);
        if !set.remove(&media_type) {
            set.insert(media_type);
        }
        if set.is_empty() {
            draft.media_type = None;
        }
        Ok(())
    }

    pub fn clear_media_types(&mut self) -> Result<()> {
        self.draft_mut("clear media types")?.media_type = None;
        Ok(())
    }

    pub fn set_rating(&mut self, option: RatingOption) -> Result<()> {
        let rating = option.to_filter()?;
        self.draft_mut("set rating")?.rating = rating;
        Ok(())
    }

    pub fn set_released_decade(&mut self, decade: Option<i32>) -> Result<()> {
        self.draft_mut("set released decade")?.released_decade = decade;
        Ok(())
    }

    pub fn set_logged_before(&mut self, logged_before: Option<bool>) -> Result<()> {
        self.draft_mut("set logged before")?.logged_before = logged_before;
        Ok(())
    }

    pub fn set_genre(&mut self, genre: Option<String>) -> Result<()> {
        self.draft_mut("set genre")?.genre = genre.filter(|g| !g.trim().is_empty());
        Ok(())
    }

    /// Whether reset would change anything.
    pub fn can_reset(&self) -> bool {
        self.state == PanelState::Editing
            && self.draft.as_ref().is_some_and(|draft| !draft.is_empty())
    }

    /// Clear every facet, diary year included.
    pub fn reset(&mut self) -> Result<()> {
        *self.draft_mut("reset")? = FilterSelection::default();
        Ok(())
    }

    /// Selectable values for `dimension`, scoped to the draft's diary year.
    pub fn candidates(&self, data: &FilterData, dimension: FacetDimension) -> Vec<FacetCandidate> {
        let year = self.draft.as_ref().and_then(|draft| draft.diary_year);
        compute_candidates(data, dimension, year, dimension.default_order())
    }

    /// Commit the draft and close the panel.
    pub fn save<H: FilterPanelHost>(&mut self, host: &H) -> Result<FilterSelection> {
        if self.state != PanelState::Editing {
            return Err(self.invalid("save"));
        }
        self.state = PanelState::Saving;
        let selection = self.draft.take().unwrap_or_default().normalized();
        host.commit_filter(selection.clone());
        self.state = PanelState::Idle;
        tracing::debug!(active = selection.active_count(), "filter committed");
        Ok(selection)
    }

    /// Discard the draft and close the panel.
    pub fn close<H: FilterPanelHost>(&mut self, host: &H) {
        self.draft = None;
        if self.state != PanelState::Idle {
            self.state = PanelState::Idle;
            host.close_filter_panel();
        }
    }

    fn draft_mut(&mut self, operation: &str) -> Result<&mut FilterSelection> {
        if self.state != PanelState::Editing {
            return Err(self.invalid(operation));
        }
        Ok(self.draft.get_or_insert_with(FilterSelection::default))
    }

    fn invalid(&self, operation: &str) -> DiaryError {
        DiaryError::InvalidState(format!(
            "Cannot {} while the filter panel is {:?}",
            operation, self.state
        ))
    }
}
