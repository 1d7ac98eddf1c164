//! Helpers for writing diagnostic messages that read like prose.

use std::fmt::Display;

/// Spells out counts up to ten, which read better in messages than digits.
pub(crate) fn count_to_words(count: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    match WORDS.get(count) {
        Some(word) => word.to_string(),
        None => count.to_string(),
    }
}

/// Lists `items` in double quotes, e.g. `"a", "b", and "c"`.
///
/// At most `max_items` are shown; the rest are summarised as `and <count> more`.
pub(crate) fn quoted_list<T: Display>(items: &[T], max_items: usize) -> String {
    let shown = max_items.max(1).min(items.len());
    let (head, rest) = items.split_at(shown);
    let mut quoted = head.iter().map(|item| format!("\"{item}\"")).collect::<Vec<_>>();
    if !rest.is_empty() {
        return format!("{}, and {} more", quoted.join(", "), count_to_words(rest.len()));
    }
    match quoted.len() {
        0 | 1 => quoted.join(""),
        2 => quoted.join(" and "),
        _ => {
            let last = quoted.pop().unwrap_or_default();
            format!("{}, and {last}", quoted.join(", "))
        }
    }
}

/// `"s"` unless `count` is one.
pub(crate) fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_lists() {
        assert_eq!(quoted_list(&["voter"], 4), "\"voter\"");
        assert_eq!(quoted_list(&["voter", "weight"], 4), "\"voter\" and \"weight\"");
        assert_eq!(
            quoted_list(&["a", "b", "c"], 4),
            "\"a\", \"b\", and \"c\""
        );
        assert_eq!(
            quoted_list(&["a", "b", "c", "d", "e"], 3),
            "\"a\", \"b\", \"c\", and two more"
        );
        assert_eq!(quoted_list::<&str>(&[], 3), "");
    }

    #[test]
    fn counts() {
        assert_eq!(count_to_words(3), "three");
        assert_eq!(count_to_words(12), "12");
        assert_eq!(plural_s(1), "");
        assert_eq!(plural_s(0), "s");
    }
}
