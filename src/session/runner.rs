use std::sync::Arc;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::{Action, AppState, Effect, Outcome};
use crate::catalog::CatalogSource;
use crate::config::Config;
use crate::error::Result;
use crate::favorites::Toggled;
use crate::search::{Applied, FetchOutcome, run_fetch};
use crate::session::command::Command;
use crate::session::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The single-screen interactive session.
///
/// Owns the [`AppState`]; searches run on spawned tasks and report back over
/// a channel, so typing never waits on the network.
pub struct Session<S> {
    state: AppState,
    source: Arc<S>,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl<S> Session<S>
where
    S: CatalogSource + Send + Sync + 'static,
{
    pub fn new(config: &Config, source: S) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::new(config),
            source: Arc::new(source),
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Reads commands from stdin until `/quit` or end of input.
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        print_lines(render::header());
        print_lines(render::help());

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if self.handle_command(Command::parse(&line))? == Flow::Quit {
                        break;
                    }
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    if self.receive(outcome) != Applied::Stale {
                        print_lines(render::screen(&self.state));
                    }
                }
            }
        }

        info!(
            "Session ended with {} favourites (not saved)",
            self.state.favorites.len()
        );

        Ok(())
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Quit => return Ok(Flow::Quit),

            Command::Help => print_lines(render::help()),

            Command::Invalid(message) => println!("{}", message.red()),

            Command::Redraw => print_lines(render::screen(&self.state)),

            Command::State => println!("{}", serde_json::to_string_pretty(&self.state)?),

            Command::Search(text) => {
                self.dispatch(Action::SetSearchText(text));
                print_lines(render::screen(&self.state));
            }

            Command::Clear => {
                self.dispatch(Action::SetSearchText(String::new()));
                println!("{}", "Search cleared".dimmed());
            }

            Command::Open(position) => {
                let track_id = self
                    .state
                    .search
                    .results()
                    .get(position.wrapping_sub(1))
                    .map(|t| t.id);
                match track_id {
                    Some(id) => {
                        self.dispatch(Action::OpenDetail(id));
                        print_lines(render::screen(&self.state));
                    }
                    None => println!("{}", format!("No result #{}", position).red()),
                }
            }

            Command::Rate(text) => {
                if self.dispatch(Action::SetRatingDraft(text)) == Outcome::Unchanged {
                    println!("{}", "Open a track that isn't a favourite to rate it".yellow());
                } else {
                    print_lines(render::screen(&self.state));
                }
            }

            Command::Favorite => match self.dispatch(Action::ToggleFavorite) {
                Outcome::Favorite(toggled) => {
                    let message = toggled.to_string();
                    match toggled {
                        Toggled::Added => println!("{}", message.green()),
                        Toggled::Removed => println!("{}", message.yellow()),
                    }
                    print_lines(render::screen(&self.state));
                }
                _ => println!("{}", "Open a track first with /open N".yellow()),
            },

            Command::Close => {
                let action = if self.state.is_detail_open() {
                    Action::CloseDetail
                } else {
                    Action::CloseFavorites
                };
                self.dispatch(action);
                print_lines(render::screen(&self.state));
            }

            Command::Favorites => {
                self.dispatch(Action::CloseDetail);
                self.dispatch(Action::OpenFavorites);
                print_lines(render::screen(&self.state));
            }

            Command::Remove(position) => {
                let track_id = self.state.favorites.nth(position).map(|e| e.track_id());
                match track_id {
                    Some(id) => {
                        self.dispatch(Action::RemoveFavorite(id));
                        print_lines(render::screen(&self.state));
                    }
                    None => println!("{}", format!("No favourite #{}", position).red()),
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn receive(&mut self, outcome: FetchOutcome) -> Applied {
        match self.dispatch(Action::SearchCompleted(outcome)) {
            Outcome::Search(applied) => applied,
            _ => Applied::Stale,
        }
    }

    fn dispatch(&mut self, action: Action) -> Outcome {
        let (outcome, effect) = self.state.update(action);
        if let Some(effect) = effect {
            self.run_effect(effect);
        }
        outcome
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Fetch(ticket) => {
                let source = Arc::clone(&self.source);
                let outcome_tx = self.outcome_tx.clone();
                tokio::spawn(async move {
                    let outcome = run_fetch(source.as_ref(), ticket).await;
                    // The session may already be gone; nothing to report to.
                    let _ = outcome_tx.send(outcome);
                });
            }
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::catalog::{SearchQuery, Track};
    use crate::error::AppError;

    #[derive(Default)]
    struct CannedCatalog {
        calls: AtomicUsize,
    }

    impl CatalogSource for CannedCatalog {
        fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<Track>>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let term = query.term.clone();
            async move {
                match term.as_str() {
                    "daft punk" => Ok(vec![
                        Track::mock(1, "One More Time", "Daft Punk"),
                        Track::mock(42, "Digital Love", "Daft Punk"),
                    ]),
                    _ => Err(AppError::CatalogApi {
                        status: 500,
                        body: "boom".to_string(),
                    }),
                }
            }
        }
    }

    async fn settle(session: &mut Session<CannedCatalog>) -> Applied {
        let outcome = session.outcome_rx.recv().await.unwrap();
        session.receive(outcome)
    }

    #[tokio::test]
    async fn test_search_open_favorite_remove() {
        let mut session = Session::new(&Config::default(), CannedCatalog::default());

        session.handle_command(Command::parse("daft punk")).unwrap();
        assert!(session.state().search.is_loading());
        assert_eq!(settle(&mut session).await, Applied::Results(2));

        session.handle_command(Command::parse("/open 2")).unwrap();
        assert_eq!(session.state().selected.as_ref().map(|t| t.id), Some(42));

        session.handle_command(Command::parse("/rate 8")).unwrap();
        session.handle_command(Command::parse("/fav")).unwrap();
        assert_eq!(
            session.state().favorites.get(42).and_then(|e| e.rating.as_deref()),
            Some("8")
        );
        assert!(!session.state().is_detail_open());

        session.handle_command(Command::parse("/favs")).unwrap();
        assert!(session.state().favorites_open);

        session.handle_command(Command::parse("/rm 1")).unwrap();
        assert!(session.state().favorites.is_empty());

        session.handle_command(Command::parse("/close")).unwrap();
        assert!(!session.state().favorites_open);
    }

    #[tokio::test]
    async fn test_clear_does_not_fetch() {
        let mut session = Session::new(&Config::default(), CannedCatalog::default());

        session.handle_command(Command::parse("/clear")).unwrap();

        assert_eq!(session.source.calls.load(Ordering::SeqCst), 0);
        assert!(!session.state().search.is_loading());
    }

    #[tokio::test]
    async fn test_whitespace_line_issues_search() {
        let mut session = Session::new(&Config::default(), CannedCatalog::default());

        session.handle_command(Command::parse("  ")).unwrap();
        assert!(session.state().search.is_loading());
        assert_eq!(settle(&mut session).await, Applied::Failed);
        assert_eq!(session.source.calls.load(Ordering::SeqCst), 1);

        session.handle_command(Command::parse("")).unwrap();
        assert_eq!(session.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_search_keeps_session_alive() {
        let mut session = Session::new(&Config::default(), CannedCatalog::default());

        session.handle_command(Command::parse("daft punk")).unwrap();
        settle(&mut session).await;
        session.handle_command(Command::parse("nope")).unwrap();

        assert_eq!(settle(&mut session).await, Applied::Failed);
        assert_eq!(session.state().search.results().len(), 2);
        assert!(session.state().search.last_error().is_some());
        assert_eq!(
            session.handle_command(Command::parse("/open 1")).unwrap(),
            Flow::Continue
        );
    }

    #[tokio::test]
    async fn test_out_of_range_positions_are_ignored() {
        let mut session = Session::new(&Config::default(), CannedCatalog::default());

        session.handle_command(Command::parse("/open 5")).unwrap();
        session.handle_command(Command::parse("/rm 1")).unwrap();
        session.handle_command(Command::parse("/fav")).unwrap();

        assert!(session.state().selected.is_none());
        assert!(session.state().favorites.is_empty());
    }

    #[tokio::test]
    async fn test_quit() {
        let mut session = Session::new(&Config::default(), CannedCatalog::default());
        assert_eq!(session.handle_command(Command::Quit).unwrap(), Flow::Quit);
    }
}
