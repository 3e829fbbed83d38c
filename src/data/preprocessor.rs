// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans raw tweet and image-description text before it reaches
// the tokenizer.
//
// Scraped tweets commonly contain:
//   - Non-breaking spaces (U+00A0) from web rendering
//   - Zero-width spaces (U+200B) from copy-pasting
//   - Embedded newlines and carriage returns
//   - Runs of consecutive spaces
//   - Control characters
//
// Cleaning steps (applied in order):
//   1. Replace Unicode whitespace variants and newlines with
//      a plain space (a sample is a single line of text)
//   2. Remove invisible control characters
//   3. Collapse multiple spaces into one
//   4. Trim leading/trailing whitespace

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw text string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1 + 2: Normalise individual characters ───────────────────────
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                // Non-breaking space, zero-width space, byte order mark
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();

        // ── Step 3: Collapse consecutive spaces ───────────────────────────────
        let mut out = String::with_capacity(normalised.len());
        let mut last_space = false;

        for c in normalised.chars() {
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        out.trim().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn test_flattens_newlines() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("line1\nline2\r\nline3"), "line1 line2 line3");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }
}
