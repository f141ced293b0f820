use regex::Regex;
use std::sync::OnceLock;

use super::html::escape_html;

pub(crate) const BULLET: &str = "•";

struct MarkdownRules {
    bold: Regex,
    italic: Regex,
}

fn rules() -> &'static MarkdownRules {
    static RULES: OnceLock<MarkdownRules> = OnceLock::new();
    RULES.get_or_init(|| MarkdownRules {
        bold: Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"),
        italic: Regex::new(r"\*(.*?)\*").expect("italic pattern"),
    })
}

/// Turns assistant free text into an HTML-safe fragment.
///
/// Escaping runs first so every tag in the output was produced here. Bold is
/// matched before italic so a `**` pair is never consumed as two single
/// markers. Emphasis does not span lines.
pub(crate) fn format_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let rules = rules();
    let escaped = escape_html(text);
    let bolded = rules.bold.replace_all(&escaped, "<strong>$1</strong>");
    let emphasized = rules.italic.replace_all(&bolded, "<em>$1</em>");
    let broken = emphasized.replace('\n', "<br>");
    broken.replace("<br>- ", &format!("<br>{BULLET} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_angle_brackets_and_ampersands() {
        let out = format_markdown("<b>Tom & Jerry</b>");
        assert_eq!(out, "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
    }

    #[test]
    fn wraps_double_asterisks_once_in_bold() {
        let out = format_markdown("**x**");
        assert_eq!(out, "<strong>x</strong>");
        assert_eq!(out.matches("<strong>").count(), 1);
        assert!(!out.contains("<em>"));
    }

    #[test]
    fn bold_and_italic_are_non_greedy() {
        let out = format_markdown("**a** and **b**, *c* or *d*");
        assert_eq!(
            out,
            "<strong>a</strong> and <strong>b</strong>, <em>c</em> or <em>d</em>"
        );
    }

    #[test]
    fn bullet_after_line_break_becomes_glyph() {
        let out = format_markdown("line1\n- a");
        assert_eq!(out, "line1<br>• a");
        assert!(!out.contains("<br>- "));
    }

    #[test]
    fn leading_dash_without_break_is_kept() {
        assert_eq!(format_markdown("- first"), "- first");
    }

    #[test]
    fn emphasis_does_not_cross_newlines() {
        assert_eq!(format_markdown("*open\nclose*"), "*open<br>close*");
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert_eq!(format_markdown(""), "");
    }
}
