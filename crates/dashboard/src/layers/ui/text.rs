const TAB_WIDTH: usize = 4;

/// Wraps prose at word boundaries; words longer than `width` are split.
pub(crate) fn wrap_text_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut line = String::new();
        let mut count = 0usize;
        for word in raw.split(' ') {
            let mut word_len = word.chars().count();
            let needed = if count == 0 { word_len } else { word_len + 1 };
            if count > 0 && count + needed > width {
                lines.push(std::mem::take(&mut line));
                count = 0;
            } else if count > 0 {
                line.push(' ');
                count += 1;
            }
            let mut rest = word;
            while word_len > width - count {
                let split = rest
                    .char_indices()
                    .nth(width - count)
                    .map(|(index, _)| index)
                    .unwrap_or(rest.len());
                line.push_str(&rest[..split]);
                lines.push(std::mem::take(&mut line));
                rest = &rest[split..];
                word_len = rest.chars().count();
                count = 0;
            }
            line.push_str(rest);
            count += word_len;
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Control characters from backend text would corrupt the frame.
pub(crate) fn sanitize_text_for_tui(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push('\n'),
            '\r' => {}
            '\t' => out.extend(std::iter::repeat(' ').take(TAB_WIDTH)),
            _ if ch.is_control() => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= max_len {
        return text.to_string();
    }
    if max_len <= 3 {
        return text.chars().take(max_len).collect();
    }
    let mut out: String = text.chars().take(max_len - 3).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text_lines("never send gift cards", 10),
            vec!["never send", "gift cards"]
        );
    }

    #[test]
    fn splits_words_longer_than_width() {
        assert_eq!(wrap_text_lines("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn keeps_blank_lines() {
        assert_eq!(wrap_text_lines("a\n\nb", 5), vec!["a", "", "b"]);
    }

    #[test]
    fn sanitize_drops_carriage_returns_and_expands_tabs() {
        assert_eq!(sanitize_text_for_tui("a\r\n\tb\u{7}"), "a\n    b ");
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
        assert_eq!(truncate_with_ellipsis("hi", 8), "hi");
        assert_eq!(truncate_with_ellipsis("hello", 2), "he");
    }
}
