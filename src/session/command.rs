/// A line of input from the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: becomes the new search text.
    Search(String),
    /// `/clear`: set the search text to empty.
    Clear,
    /// `/open N`: open the Nth result (1-based).
    Open(usize),
    /// `/rate TEXT`: set the rating draft for the open track.
    Rate(String),
    /// `/fav`: toggle the open track's favourite status.
    Favorite,
    /// `/close`: close the detail view, or the favourites list.
    Close,
    /// `/favs`: show the favourites list.
    Favorites,
    /// `/rm N`: remove the Nth favourite (1-based).
    Remove(usize),
    /// `/state`: dump the session state as JSON.
    State,
    Help,
    Quit,
    /// Empty line: redraw the current screen.
    Redraw,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(rest) = line.strip_prefix('/') else {
            if line.is_empty() {
                return Command::Redraw;
            }
            return Command::Search(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "clear" => Command::Clear,
            "open" | "o" => parse_position(arg).map_or_else(
                || Command::Invalid("usage: /open N".to_string()),
                Command::Open,
            ),
            "rate" | "r" => Command::Rate(arg.to_string()),
            "fav" | "f" => Command::Favorite,
            "close" | "c" => Command::Close,
            "favs" => Command::Favorites,
            "rm" => parse_position(arg).map_or_else(
                || Command::Invalid("usage: /rm N".to_string()),
                Command::Remove,
            ),
            "state" => Command::State,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command: /{}", other)),
        }
    }
}

fn parse_position(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0)
}

pub const HELP: &[(&str, &str)] = &[
    ("<text>", "search the catalog"),
    ("/clear", "clear the search text (results stay)"),
    ("/open N", "show details for result N"),
    ("/rate TEXT", "rating (/10) to attach when favouriting"),
    ("/fav", "toggle favourite for the open track"),
    ("/close", "close the detail view or favourites list"),
    ("/favs", "show your favourites"),
    ("/rm N", "remove favourite N"),
    ("/state", "print the session state as JSON"),
    ("/quit", "exit"),
];
