use protocol::{ImageFindings, TimelineEntry};

use crate::layers::render::{analysis_block_html, format_markdown};

const FENCE_OPEN: &str = "```json";
const FENCE: &str = "```";

/// Screenshot analysis turned into something the results panel can show.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ImageInterpretation {
    pub(crate) html: String,
    /// Present only when the model returned structured findings with a
    /// `timeline` key; an empty list still replaces the text timeline.
    pub(crate) timeline: Option<Vec<TimelineEntry>>,
}

/// Structured findings when the text is a JSON object (optionally fenced),
/// Markdown otherwise. Never fails.
pub(crate) fn interpret_image_analysis(text: &str) -> ImageInterpretation {
    match parse_findings(text) {
        Some(findings) => ImageInterpretation {
            html: analysis_block_html(&findings),
            timeline: findings.timeline,
        },
        None => ImageInterpretation {
            html: format_markdown(text),
            timeline: None,
        },
    }
}

pub(crate) fn parse_findings(text: &str) -> Option<ImageFindings> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with(FENCE_OPEN)) {
        return None;
    }
    let cleaned = text.replace(FENCE_OPEN, "").replace(FENCE, "");
    let value: serde_json::Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "image analysis is not valid json, using markdown");
            return None;
        }
    };
    if !value.is_object() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(findings) => Some(findings),
        Err(err) => {
            tracing::debug!(error = %err, "image findings have unexpected shape, using markdown");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_becomes_analysis_block() {
        let text = "```json\n{\"risk_score\": \"88\", \"scam_type\": \"Pig Butchering\", \"red_flags\": [{\"title\": \"Crypto\"}], \"verdict\": \"Stop\"}\n```";
        let out = interpret_image_analysis(text);
        assert!(out.html.contains("score-banner critical"));
        assert!(out.html.contains("Pig Butchering"));
        assert!(out.html.contains("<h5>Crypto</h5>"));
        assert_eq!(out.timeline, None);
    }

    #[test]
    fn timeline_is_carried_over() {
        let text = r#"{"risk_score": 40, "timeline": [{"phase": "Day 1", "event": "Hello", "risk_score": 10}]}"#;
        let out = interpret_image_analysis(text);
        let timeline = out.timeline.expect("timeline");
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].phase, "Day 1");
    }

    #[test]
    fn null_red_flags_keep_structured_findings() {
        let text = r#"{"risk_score": 90, "red_flags": null, "timeline": [{"phase": "Day 1", "event": "Hello", "risk_score": 20}], "verdict": "Block"}"#;
        let out = interpret_image_analysis(text);
        assert!(out.html.contains("score-banner critical"));
        assert!(out.html.contains("Block"));
        assert!(!out.html.contains("<h5>"));
        let timeline = out.timeline.expect("timeline");
        assert_eq!(timeline[0].phase, "Day 1");
    }

    #[test]
    fn plain_string_red_flags_render_as_untitled() {
        let text = r#"{"risk_score": 90, "red_flags": ["Asks for gift cards", {"title": "Urgency"}], "timeline": []}"#;
        let out = interpret_image_analysis(text);
        assert!(out.html.contains("score-banner critical"));
        assert!(out.html.contains("<h5>Flag</h5>"));
        assert!(out.html.contains("<h5>Urgency</h5>"));
        assert_eq!(out.timeline, Some(Vec::new()));
    }

    #[test]
    fn broken_json_falls_back_to_markdown() {
        let out = interpret_image_analysis("{ this is **not** json");
        assert_eq!(out.html, "{ this is <strong>not</strong> json");
        assert!(out.timeline.is_none());
    }

    #[test]
    fn prose_is_rendered_as_markdown() {
        let out = interpret_image_analysis("Looks fine.\n- no money asked");
        assert_eq!(out.html, "Looks fine.<br>• no money asked");
    }

    #[test]
    fn non_object_json_falls_back() {
        assert!(parse_findings("```json\n[1, 2]\n```").is_none());
        assert!(parse_findings("  {\"verdict\": \"ok\"}  ").is_some());
    }
}
