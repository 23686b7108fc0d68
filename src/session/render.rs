//! Plain-text rendering of the session screen.
//!
//! Every function returns lines rather than printing, so the runner decides
//! where output goes.

use colored::Colorize;

use crate::app::AppState;
use crate::catalog::Track;
use crate::favorites::FavoritesStore;
use crate::session::command::HELP;

const RULE_WIDTH: usize = 50;

pub fn header() -> Vec<String> {
    vec![
        format!("{}", "Music Search".cyan().bold()),
        "=".repeat(RULE_WIDTH),
    ]
}

/// Whichever view is on top: detail, then favourites, then results.
pub fn screen(state: &AppState) -> Vec<String> {
    if let Some(track) = &state.selected {
        return detail(
            track,
            state.selected_is_favorite(),
            state.rating_input_visible(),
            &state.rating_draft,
        );
    }

    if state.favorites_open {
        return favorites(&state.favorites);
    }

    results(state)
}

pub fn results(state: &AppState) -> Vec<String> {
    let mut lines = Vec::new();

    let search = &state.search;
    if search.is_loading() {
        lines.push(format!("{}", "Searching...".yellow()));
    }
    if let Some(error) = search.last_error() {
        lines.push(format!("{} {}", "Search failed:".red().bold(), error.red()));
    }

    if search.results().is_empty() {
        lines.push(format!(
            "{}",
            "Try searching for an artist or a song".dimmed()
        ));
        return lines;
    }

    for (i, track) in search.results().iter().enumerate() {
        let marker = if state.favorites.is_favorite(track.id) {
            "*".yellow()
        } else {
            " ".normal()
        };
        lines.push(format!(
            "{:2}. {} {} - {}",
            i + 1,
            marker,
            track.display_name().bold(),
            track.display_artist().dimmed()
        ));
    }

    lines.push(format!(
        "\n{}",
        format!("{} results for \"{}\"", search.results().len(), search.text()).cyan()
    ));

    lines
}

pub fn detail(track: &Track, is_favorite: bool, rating_input: bool, draft: &str) -> Vec<String> {
    let mut lines = vec![
        format!("{}", track.display_name().bold()),
        format!("  Artist:   {}", track.display_artist()),
        format!("  Album:    {}", track.display_collection()),
    ];

    if let Some(minutes) = track.duration_minutes() {
        lines.push(format!("  Duration: {} min", minutes));
    }
    if let Some(url) = &track.artwork_url {
        lines.push(format!("  Artwork:  {}", url.dimmed()));
    }
    if let Some(url) = &track.preview_url {
        lines.push(format!("  Preview:  {}", url.dimmed()));
    }
    if let Some(url) = &track.view_url {
        lines.push(format!("  Store:    {}", url.dimmed()));
    }

    if is_favorite {
        lines.push(format!("\n{}", "* In your favourites (/fav to remove)".yellow()));
    } else {
        if rating_input {
            let shown = if draft.is_empty() { "-" } else { draft };
            lines.push(format!("\n  Rating (/10): {} (set with /rate)", shown));
        }
        lines.push(format!("{}", "  /fav to add to favourites".yellow()));
    }

    lines
}

pub fn favorites(store: &FavoritesStore) -> Vec<String> {
    let mut lines = vec![format!("{}", "My favourites".yellow().bold())];

    if store.is_empty() {
        lines.push(format!("{}", "No favourites yet".dimmed()));
        return lines;
    }

    for (i, entry) in store.iter().enumerate() {
        let mut line = format!(
            "{:2}. {} - {}",
            i + 1,
            entry.track.display_name().bold(),
            entry.track.display_artist()
        );
        if let Some(label) = entry.rating_label() {
            line.push_str(&format!(" {}", label.green()));
        }
        line.push_str(&format!(
            " {}",
            entry.added_at.format("added %H:%M:%S").to_string().dimmed()
        ));
        lines.push(line);
    }

    lines.push(format!("{}", "/rm N to remove, /close to go back".dimmed()));

    lines
}

pub fn help() -> Vec<String> {
    HELP.iter()
        .map(|(usage, what)| format!("  {:<12} {}", usage.green(), what))
        .collect()
}
