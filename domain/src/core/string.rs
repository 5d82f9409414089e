//! String utilities for the domain layer.

const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max_len` bytes, marking the cut with `...`
///
/// The cut always lands on a character boundary. Used to keep raw model
/// output and error bodies readable in logs and error messages.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let budget = max_len.saturating_sub(ELLIPSIS.len());
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= budget)
        .last()
        .unwrap_or(0);

    format!("{}{}", &s[..end], ELLIPSIS)
}

/// Truncate to at most `max_chars` characters, without an ellipsis.
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
