use serde::Serialize;
use tracing::debug;

use crate::catalog::Track;
use crate::config::Config;
use crate::favorites::{FavoritesStore, Toggled};
use crate::search::{Applied, FetchOutcome, SearchController, SearchTicket};

/// Everything the single screen shows, in one place.
///
/// The detail view is open exactly when `selected` holds a track.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub search: SearchController,
    pub favorites: FavoritesStore,
    pub selected: Option<Track>,
    pub favorites_open: bool,
    pub rating_draft: String,
}

#[derive(Debug)]
pub enum Action {
    SetSearchText(String),
    SearchCompleted(FetchOutcome),
    OpenDetail(u64),
    CloseDetail,
    SetRatingDraft(String),
    ToggleFavorite,
    RemoveFavorite(u64),
    OpenFavorites,
    CloseFavorites,
}

/// Work the runtime must carry out on behalf of the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(SearchTicket),
}

/// What an action did, for the front end to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Updated,
    Search(Applied),
    Favorite(Toggled),
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            search: SearchController::new(config),
            ..Self::default()
        }
    }

    pub fn is_detail_open(&self) -> bool {
        self.selected.is_some()
    }

    /// The rating field only shows for a selected track that isn't a
    /// favourite yet.
    pub fn rating_input_visible(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|t| !self.favorites.is_favorite(t.id))
    }

    pub fn selected_is_favorite(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|t| self.favorites.is_favorite(t.id))
    }

    /// Applies `action`, returning what changed and any effect to run.
    pub fn update(&mut self, action: Action) -> (Outcome, Option<Effect>) {
        match action {
            Action::SetSearchText(text) => {
                let effect = self.search.set_text(text).map(Effect::Fetch);
                (Outcome::Updated, effect)
            }

            Action::SearchCompleted(outcome) => (Outcome::Search(self.search.apply(outcome)), None),

            Action::OpenDetail(track_id) => match self.search.find_result(track_id) {
                Some(track) => {
                    self.selected = Some(track.clone());
                    (Outcome::Updated, None)
                }
                None => {
                    debug!("Ignoring open for unknown track {}", track_id);
                    (Outcome::Unchanged, None)
                }
            },

            Action::CloseDetail => {
                if self.selected.take().is_none() {
                    return (Outcome::Unchanged, None);
                }
                self.rating_draft.clear();
                (Outcome::Updated, None)
            }

            Action::SetRatingDraft(text) => {
                if !self.rating_input_visible() {
                    return (Outcome::Unchanged, None);
                }
                self.rating_draft = text;
                (Outcome::Updated, None)
            }

            Action::ToggleFavorite => {
                let Some(track) = self.selected.take() else {
                    return (Outcome::Unchanged, None);
                };
                let toggled = self.favorites.toggle(&track, &self.rating_draft);
                self.rating_draft.clear();
                (Outcome::Favorite(toggled), None)
            }

            Action::RemoveFavorite(track_id) => match self.favorites.remove(track_id) {
                Some(_) => (Outcome::Favorite(Toggled::Removed), None),
                None => (Outcome::Unchanged, None),
            },

            Action::OpenFavorites => {
                self.favorites_open = true;
                (Outcome::Updated, None)
            }

            Action::CloseFavorites => {
                self.favorites_open = false;
                (Outcome::Updated, None)
            }
        }
    }
}
