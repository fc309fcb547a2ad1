//! Classifies raw input into the closed set of assistant commands.

use shared::Command;

const OPEN_URL_PREFIXES: [&str; 2] = ["öffne url", "offne url"];
const OPEN_PREFIXES: [&str; 2] = ["öffne", "offne"];
const SEARCH_PREFIX: &str = "suche";

/// Parse user input into a command, or `None` if it is ordinary chat.
///
/// Prefix rules are checked in a fixed order and the first match wins, so
/// `"öffne url"` must be tested before the bare `"öffne"`.
///
/// The argument is whatever follows the matched prefix. Later occurrences of
/// the prefix word are kept, so `"suche suchmaschine"` searches for
/// `"suchmaschine"` rather than `"maschine"`.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim().to_lowercase();

    if let Some(rest) = strip_any_prefix(&text, &OPEN_URL_PREFIXES) {
        return Some(Command::OpenUrl(rest.trim().to_string()));
    }
    if let Some(rest) = strip_any_prefix(&text, &OPEN_PREFIXES) {
        return Some(Command::OpenProgram(rest.trim().to_string()));
    }
    if let Some(rest) = text.strip_prefix(SEARCH_PREFIX) {
        return Some(Command::Search(rest.trim().to_string()));
    }

    match text.as_str() {
        "hilfe" | "help" => Some(Command::Help),
        "lösche chat" | "losche chat" | "clear" => Some(Command::ClearChat),
        "exit" | "quit" | "beenden" => Some(Command::Exit),
        _ => None,
    }
}

fn strip_any_prefix<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| text.strip_prefix(p))
}

/// Command overview shown for `hilfe`
pub fn help_text() -> &'static str {
    "Verfügbare Befehle:
- öffne [programm]: Öffnet ein Programm (z.B. notepad, calc, explorer)
- öffne url [webadresse]: Öffnet eine Webseite
- suche [suchbegriff]: Sucht nach Informationen
- hilfe: Zeigt diese Hilfe an
- lösche chat: Löscht den Chat-Verlauf
- exit/quit/beenden: Beendet den Assistenten

Für alle anderen Anfragen stehe ich als KI-Assistent zur Verfügung!"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_url() {
        assert_eq!(
            parse_command("öffne url example.com"),
            Some(Command::OpenUrl("example.com".into()))
        );
        assert_eq!(
            parse_command("  Offne URL   https://rust-lang.org  "),
            Some(Command::OpenUrl("https://rust-lang.org".into()))
        );
    }

    #[test]
    fn test_open_url_without_argument() {
        assert_eq!(parse_command("öffne url"), Some(Command::OpenUrl(String::new())));
    }

    #[test]
    fn test_open_program() {
        assert_eq!(
            parse_command("Öffne Rechner"),
            Some(Command::OpenProgram("rechner".into()))
        );
        assert_eq!(
            parse_command("offne notepad"),
            Some(Command::OpenProgram("notepad".into()))
        );
    }

    #[test]
    fn test_search() {
        assert_eq!(
            parse_command("suche katzenbilder"),
            Some(Command::Search("katzenbilder".into()))
        );
        assert_eq!(parse_command("suche"), Some(Command::Search(String::new())));
    }

    #[test]
    fn test_search_keeps_prefix_word_inside_argument() {
        assert_eq!(
            parse_command("suche suchmaschinen"),
            Some(Command::Search("suchmaschinen".into()))
        );
        assert_eq!(
            parse_command("suche suchmaschine"),
            Some(Command::Search("suchmaschine".into()))
        );
    }

    #[test]
    fn test_exact_commands() {
        assert_eq!(parse_command("hilfe"), Some(Command::Help));
        assert_eq!(parse_command("HELP"), Some(Command::Help));
        assert_eq!(parse_command("Lösche Chat"), Some(Command::ClearChat));
        assert_eq!(parse_command("losche chat"), Some(Command::ClearChat));
        assert_eq!(parse_command("clear"), Some(Command::ClearChat));
        assert_eq!(parse_command("Exit"), Some(Command::Exit));
        assert_eq!(parse_command("QUIT"), Some(Command::Exit));
        assert_eq!(parse_command(" beenden "), Some(Command::Exit));
    }

    #[test]
    fn test_exact_commands_need_whole_input() {
        assert_eq!(parse_command("hilfe bitte"), None);
        assert_eq!(parse_command("exit now"), None);
    }

    #[test]
    fn test_plain_chat_is_not_a_command() {
        assert_eq!(parse_command("wie geht es dir"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_help_text_lists_commands() {
        let help = help_text();
        for needle in ["öffne url", "suche", "lösche chat", "beenden"] {
            assert!(help.contains(needle), "missing {}", needle);
        }
    }
}
