//! Character counting and platform length checks.

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Count user-perceived characters (extended grapheme clusters).
///
/// CJK text counts one per ideograph and multi-codepoint emoji count once,
/// matching what a publishing platform's counter shows.
pub fn character_count(content: &str) -> usize {
    content.graphemes(true).count()
}

/// Result of comparing content length against a platform limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthCheck {
    pub used: usize,
    pub limit: usize,
}

impl LengthCheck {
    /// Build a check from an already-counted length.
    pub fn from_count(used: usize, limit: usize) -> Self {
        Self { used, limit }
    }

    /// `true` when content exceeds the limit. Over-limit is a warning only;
    /// content is never truncated.
    pub fn is_over_limit(&self) -> bool {
        self.used > self.limit
    }

    /// Characters beyond the limit, zero when within it.
    pub fn excess(&self) -> usize {
        self.used.saturating_sub(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_count_uses_graphemes() {
        assert_eq!(character_count("hello"), 5);
        assert_eq!(character_count("知乎专栏"), 4);
        assert_eq!(character_count("e\u{301}"), 1);
        assert_eq!(character_count("👩‍💻"), 1);
        assert_eq!(character_count(""), 0);
    }

    #[test]
    fn length_check_flags_over_limit_without_touching_counts() {
        let check = LengthCheck::from_count(5200, 5000);
        assert!(check.is_over_limit());
        assert_eq!(check.excess(), 200);
        assert_eq!(check.used, 5200);

        let at_limit = LengthCheck::from_count(character_count(&"x".repeat(280)), 280);
        assert!(!at_limit.is_over_limit());
        assert_eq!(at_limit.excess(), 0);
    }
}
