//! Filename cleanup for generated `.osu` and `.osz` names.

pub const FALLBACK_FILENAME: &str = "file";

const MAX_FILENAME_BYTES: usize = 255;

const WINDOWS_RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub fn sanitize_filename(name: &str) -> String {
    sanitize_with_fallback(name, FALLBACK_FILENAME)
}

pub fn sanitize_with_fallback(name: &str, fallback: &str) -> String {
    let fallback = if fallback.is_empty() {
        FALLBACK_FILENAME
    } else {
        fallback
    };

    let mut cleaned = normalize(name);
    if is_reserved(&cleaned) || cleaned.is_empty() {
        cleaned = fallback.to_string();
    }
    if cleaned.starts_with('.') {
        cleaned.insert_str(0, fallback);
    }
    truncate_on_char_boundary(&mut cleaned, MAX_FILENAME_BYTES);
    cleaned
}

fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.chars().filter(|ch| !is_disallowed(*ch)) {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

fn is_disallowed(ch: char) -> bool {
    ch <= '\u{1F}' || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

fn is_reserved(name: &str) -> bool {
    let upper = name.to_uppercase();
    WINDOWS_RESERVED_NAMES.contains(&upper.as_str())
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_control_characters() {
        assert_eq!(
            sanitize_filename("AC/DC - Back\\In:Black? (Sparebeat) [Hard].osu"),
            "ACDC - BackInBlack (Sparebeat) [Hard].osu"
        );
        assert_eq!(sanitize_filename("a\u{0}b\tc\nd"), "abcd");
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        assert_eq!(sanitize_filename("   lots    of \u{3000} space  "), "lots of space");
    }

    #[test]
    fn reserved_and_empty_names_use_fallback() {
        assert_eq!(sanitize_filename("con"), "file");
        assert_eq!(sanitize_filename("LPT9"), "file");
        assert_eq!(sanitize_filename("CONSOLE"), "CONSOLE");
        assert_eq!(sanitize_filename("<>|"), "file");
        assert_eq!(sanitize_with_fallback("", "map"), "map");
    }

    #[test]
    fn leading_dot_gets_prefixed() {
        assert_eq!(sanitize_filename(".hidden"), "file.hidden");
    }

    #[test]
    fn long_names_truncate_without_splitting_characters() {
        let name = "あ".repeat(100);
        let out = sanitize_filename(&name);
        assert!(out.len() <= 255);
        assert_eq!(out.chars().count(), 85);
    }
}
