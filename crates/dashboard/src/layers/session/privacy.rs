const MASK: char = '•';
pub(crate) const HIDDEN_IMAGE: &str = "[image hidden]";

/// Same number of characters as the input, all masked.
pub(crate) fn mask(text: &str) -> String {
    text.chars().map(|_| MASK).collect()
}

pub(crate) fn shown<'a>(text: &'a str, redacted: bool) -> std::borrow::Cow<'a, str> {
    if redacted {
        std::borrow::Cow::Owned(mask(text))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_preserves_character_count() {
        assert_eq!(mask("Hé!"), "•••");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn shown_passes_through_when_not_redacted() {
        assert_eq!(shown("Her", false), "Her");
        assert_eq!(shown("Her", true), "•••");
    }
}
