//! Word boundary search for caret motion and double-click selection.
//!
//! Word characters are the locale-naive ASCII class `[A-Za-z0-9_]`. A word
//! starts at a word char whose immediate predecessor is a non-word char, so
//! a word-run at the very beginning of the text has no detectable start
//! (there is nothing before it to separate from).

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Finds the first word start at or after `from`.
///
/// Returns the char index of the first word char at index >= `from` that is
/// immediately preceded by a non-word char, or `None` when no later word
/// start exists.
pub fn next_word_start(text: &str, from: usize) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (i, c) in text.chars().enumerate() {
        if i >= from.max(1)
            && is_word_char(c)
            && let Some(p) = prev
            && !is_word_char(p)
        {
            return Some(i);
        }
        prev = Some(c);
    }
    None
}

/// Finds the start of the last word-run in `text[..end]`.
///
/// Trailing non-word chars before `end` are skipped, then the preceding
/// word-run is walked back to its start. Returns `None` when there is no
/// word-run, or when the run begins at index 0 (no separator precedes it).
pub fn previous_word_start(text: &str, end: usize) -> Option<usize> {
    let chars: Vec<char> = text.chars().take(end).collect();
    let mut i = chars.len();
    while i > 0 && !is_word_char(chars[i - 1]) {
        i -= 1;
    }
    if i == 0 {
        return None;
    }
    while i > 0 && is_word_char(chars[i - 1]) {
        i -= 1;
    }
    // A run starting at 0 has no preceding non-word char.
    if i == 0 { None } else { Some(i) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_word_start_finds_separated_words() {
        assert_eq!(next_word_start("foo bar baz", 0), Some(4));
        assert_eq!(next_word_start("foo bar baz", 4), Some(4));
        assert_eq!(next_word_start("foo bar baz", 5), Some(8));
        assert_eq!(next_word_start("foo bar baz", 9), None);
    }

    #[test]
    fn next_word_start_never_matches_index_zero() {
        // The first word has no preceding separator.
        assert_eq!(next_word_start("foo", 0), None);
        assert_eq!(next_word_start(" foo", 0), Some(1));
    }

    #[test]
    fn previous_word_start_walks_back_over_separators() {
        assert_eq!(previous_word_start("foo bar baz", 11), Some(8));
        assert_eq!(previous_word_start("foo bar baz", 10), Some(8));
        assert_eq!(previous_word_start("foo bar ", 8), Some(4));
        assert_eq!(previous_word_start("foo bar, ", 9), Some(4));
    }

    #[test]
    fn previous_word_start_at_leading_run_is_none() {
        assert_eq!(previous_word_start("foobar", 6), None);
        assert_eq!(previous_word_start("foo bar", 3), None);
        assert_eq!(previous_word_start("   ", 3), None);
        assert_eq!(previous_word_start("", 0), None);
    }

    #[test]
    fn underscores_and_digits_are_word_chars() {
        assert_eq!(next_word_start("a _b1 c", 1), Some(2));
        assert_eq!(previous_word_start("x _b1", 5), Some(2));
    }
}
