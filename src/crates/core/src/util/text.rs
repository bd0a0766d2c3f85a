const ELLIPSIS: &str = "...";

/// Keep the first `max_chars` characters, appending `...` when anything was cut.
/// Counts `char`s, so CJK text is never split inside a code point.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_with_ellipsis;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_with_ellipsis("我今天很焦虑", 50), "我今天很焦虑");
        assert_eq!(truncate_with_ellipsis("", 50), "");
    }

    #[test]
    fn exact_length_is_untouched() {
        let text = "字".repeat(50);
        assert_eq!(truncate_with_ellipsis(&text, 50), text);
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let text = "情".repeat(51);
        let truncated = truncate_with_ellipsis(&text, 50);
        assert_eq!(truncated.chars().count(), 53);
        assert!(truncated.ends_with("情..."));
    }
}
