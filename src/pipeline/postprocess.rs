//! Post-processing: deterministic cleanup of PDF text layers.
//!
//! pdfium hands back page text with whatever line endings and spacing the
//! producer used. These passes make the Markdown output stable across
//! producers without touching the words themselves.
//!
//! Rules (applied in order):
//! 1. Normalise line endings (CRLF / CR → LF)
//! 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
//! 3. Trim trailing whitespace per line
//! 4. Collapse runs of blank lines down to one
//! 5. Ensure the text ends with exactly one newline
//!
//! Line endings and invisible characters go first: a stray `\r` or a lone
//! zero-width space would otherwise keep a line from counting as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every normalisation rule to extracted PDF text.
pub fn normalise_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse blank-line runs ─────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 5: Ensure text ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  indented   \nnext\t"),
            "  indented\nnext"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "page\u{200B}one\u{FEFF} hy\u{00AD}phen";
        assert_eq!(remove_invisible_chars(input), "pageone hyphen");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("text"), "text\n");
        assert_eq!(ensure_final_newline("text\n\n\n"), "text\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn test_crlf_blank_runs_collapse_after_trimming() {
        // Whitespace-only lines only become blank once trimmed.
        let input = "Page one\r\n   \r\n \r\n\r\nPage two  \r\n";
        assert_eq!(normalise_text(input), "Page one\n\nPage two\n");
    }

    #[test]
    fn test_normalise_is_idempotent() {
        let once = normalise_text("A\r\n\r\n\r\n\u{200B}B   \n\n\n\nC");
        assert_eq!(normalise_text(&once), once);
    }
}
