//! Cleanup of raw switch CLI output captured by the helper script.

use std::sync::LazyLock;

use regex::Regex;
use tmcheck_common::filter::RemoteCommand;

const BACKSPACE: char = '\u{8}';
const DEBUG_MARKER: &str = "[DEBUG]";

static PAGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*--More--\s*").expect("pager pattern"));
static PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+[#>]\s*(exit)?$").expect("prompt pattern"));

/// How a cleaned output line should be highlighted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    /// Column header of an interface or VLAN table.
    Header,
    Down,
    Up,
    Plain,
}

/// Strips terminal artifacts, pager markers, echoed commands and prompts.
///
/// Applying it to its own output changes nothing.
pub fn sanitize(raw: &str) -> String {
    let erased: String = collapse_backspaces(raw);
    let unpaged = PAGER.replace_all(&erased, "");

    unpaged
        .lines()
        .filter(|line| keep_line(line))
        .collect::<Vec<&str>>()
        .join("\n")
}

pub fn classify(line: &str) -> LineStyle {
    if (line.contains("Port") && line.contains("Type")) || line.contains("Existing Vlans") {
        return LineStyle::Header;
    }
    let lower: String = line.to_lowercase();
    if lower.contains("down") {
        LineStyle::Down
    } else if lower.contains("up") {
        LineStyle::Up
    } else {
        LineStyle::Plain
    }
}

/// A character followed by a backspace cancels out. Backspaces with nothing
/// left to erase are dropped.
fn collapse_backspaces(text: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(text.len());
    for c in text.chars() {
        if c == BACKSPACE {
            out.pop();
        } else {
            out.push(c);
        }
    }
    out.into_iter().collect()
}

fn keep_line(line: &str) -> bool {
    let stripped: &str = line.trim();
    if stripped.is_empty() || line.contains(DEBUG_MARKER) {
        return false;
    }
    if stripped == "exit" || RemoteCommand::ALL.iter().any(|c| c.as_str() == stripped) {
        return false;
    }
    !PROMPT.is_match(stripped)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = "show interface brief\n\
        \n\
        KARSIYAKA#\n\
        Port    Type   Link   Speed\n\
        Port1   GE     down   100M\n\
        Port2   GE     up     1000M\n\
        ---[DEBUG] >> paging\n\
        \x20--More-- \u{8}\u{8}\u{8}\u{8}\u{8}\u{8}\u{8}\u{8}Port3   GE     up     1000M\n\
        KARSIYAKA#exit\n";

    #[test]
    fn sanitize_should_drop_prompts_echoes_and_debug_lines() {
        let cleaned: String = sanitize(CAPTURE);
        let lines: Vec<&str> = cleaned.lines().collect();

        assert_eq!(lines[0], "Port    Type   Link   Speed");
        assert!(!cleaned.contains("KARSIYAKA#"));
        assert!(!cleaned.contains("[DEBUG]"));
        assert!(!cleaned.contains("show interface brief"));
        assert!(!cleaned.contains("--More--"));
        assert!(lines.iter().any(|l| l.starts_with("Port1")));
    }

    #[test]
    fn sanitize_should_be_idempotent() {
        let once: String = sanitize(CAPTURE);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn prompt_lines_should_be_dropped() {
        assert_eq!(sanitize("KARSIYAKA#exit"), "");
        assert_eq!(sanitize("sw-01>"), "");
        assert_eq!(sanitize("show clock\nexit\n"), "");
        assert_eq!(sanitize("Current time is 12:00"), "Current time is 12:00");
    }

    #[test]
    fn backspaces_should_erase_the_previous_character() {
        assert_eq!(collapse_backspaces("abc\u{8}\u{8}d"), "ad");
        assert_eq!(collapse_backspaces("\u{8}\u{8}x"), "x");
    }

    #[test]
    fn classify_should_pick_highlight() {
        assert_eq!(classify("Port1  down  100M"), LineStyle::Down);
        assert_eq!(classify("Port2  UP  1000M"), LineStyle::Up);
        assert_eq!(classify("Port    Type   Link"), LineStyle::Header);
        assert_eq!(classify("Existing Vlans: 1,10"), LineStyle::Header);
        assert_eq!(classify("12:00:01 UTC"), LineStyle::Plain);
    }
}
