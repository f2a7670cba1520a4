/// Wildcard matching for MIDI port names.
///
/// Patterns support `?` (exactly one character) and `*` (zero or more
/// characters). Everything else is literal. A pattern matches the whole
/// candidate string, never a substring.

use regex::Regex;

/// A compiled wildcard pattern.
pub struct Wildcard {
    pattern: String,
    regex: Regex,
}

impl Wildcard {
    /// Compile a wildcard pattern. Total: every string is a valid pattern.
    pub fn new(pattern: &str) -> Self {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut buf = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                _ => expr.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
            }
        }
        expr.push('$');
        // The expression is built from escaped literals, `.` and `.*` only,
        // so compilation cannot fail.
        let regex = Regex::new(&expr).expect("escaped wildcard compiles");
        Self {
            pattern: pattern.to_string(),
            regex,
        }
    }

    /// The original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern matches the entire candidate string.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

impl std::fmt::Debug for Wildcard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Wildcard").field(&self.pattern).finish()
    }
}

/// One-shot convenience: compile `pattern` and test `candidate`.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    Wildcard::new(pattern).matches(candidate)
}
