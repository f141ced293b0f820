//! Plain-text projection of the session view. The TUI styles these lines and
//! the headless commands print them as they are.

use std::time::SystemTime;

use super::text::sanitize_text_for_tui;
use crate::layers::render::html_to_text;
use crate::layers::session::assistant::{Assistant, BubbleBody, Speaker};
use crate::layers::session::financial::FinancialPanel;
use crate::layers::session::privacy::{shown, HIDDEN_IMAGE};
use crate::layers::session::results::ListContent;
use crate::layers::session::scripts::{ScriptsContent, ScriptsPanel};
use crate::layers::session::SessionView;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Normal,
    Heading,
    Dim,
    /// `#rrggbb` from the backend or the risk bands.
    Color(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StyledLine {
    pub(crate) text: String,
    pub(crate) tone: Tone,
}

impl StyledLine {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    fn normal(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Normal)
    }

    fn heading(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Heading)
    }

    fn dim(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Dim)
    }

    fn colored(text: impl Into<String>, color: &str) -> Self {
        Self::new(text, Tone::Color(color.to_string()))
    }
}

pub(crate) fn plain(lines: &[StyledLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn html_lines(html: &str, indent: &str) -> Vec<StyledLine> {
    sanitize_text_for_tui(&html_to_text(html))
        .lines()
        .map(|line| StyledLine::normal(format!("{indent}{line}")))
        .collect()
}

pub(crate) fn form_lines(view: &SessionView) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    if view.form.inputs_visible {
        for (index, row) in view.form.rows().iter().enumerate() {
            let marker = if index == view.form.selected { ">" } else { " " };
            lines.push(StyledLine::normal(format!(
                "{marker} {}: {}",
                shown(&row.sender, view.redacted),
                shown(&row.text, view.redacted)
            )));
        }
    } else {
        lines.push(StyledLine::dim("Message list hidden while a screenshot is attached."));
    }
    lines.push(StyledLine::normal(""));
    if view.image.has_image() {
        let label = if view.redacted {
            HIDDEN_IMAGE.to_string()
        } else {
            view.image
                .file_name
                .clone()
                .unwrap_or_else(|| "screenshot".to_string())
        };
        lines.push(StyledLine::heading(format!("Screenshot: {label}")));
    } else {
        lines.push(StyledLine::dim("No screenshot attached."));
    }
    lines
}

fn list_lines(lines: &mut Vec<StyledLine>, title: &str, content: &ListContent) {
    lines.push(StyledLine::heading(title));
    match content {
        ListContent::Placeholder(text) => lines.push(StyledLine::dim(format!("  {text}"))),
        ListContent::Items(items) => {
            for item in items {
                lines.push(StyledLine::normal(format!("  {}", item.heading)));
                lines.push(StyledLine::dim(format!("    {}", item.body)));
            }
        }
    }
    lines.push(StyledLine::normal(""));
}

pub(crate) fn results_lines(view: &SessionView) -> Vec<StyledLine> {
    let panel = &view.results;
    if !panel.visible {
        return vec![StyledLine::dim("Run an analysis to see results.")];
    }
    let mut lines = Vec::new();
    if view.last_result.is_some() {
        lines.push(StyledLine::colored(
            format!("RISK SCORE {}  {}", panel.meter.score, panel.meter.message),
            &panel.meter.color,
        ));
        lines.push(StyledLine::normal(""));
    }

    if let Some(card) = &panel.classification {
        lines.push(StyledLine::heading(format!("Scam type: {}", card.kind)));
        if !card.description.is_empty() {
            lines.push(StyledLine::normal(format!("  {}", card.description)));
        }
        lines.push(StyledLine::normal(format!("  Average loss: {}", card.avg_loss)));
        lines.push(StyledLine::colored(
            format!("  Probability: {}", card.probability),
            card.probability_color,
        ));
        lines.push(StyledLine::normal(""));
    }

    if view.last_result.is_some() {
        list_lines(&mut lines, "Detected Patterns", &panel.patterns);
        list_lines(&mut lines, "Financial Red Flags", &panel.flags);
    }

    if !panel.insights.is_empty() {
        lines.push(StyledLine::heading("AI Insights"));
        for insight in &panel.insights {
            if let Some(title) = &insight.title {
                lines.push(StyledLine::normal(format!("  [{}] {}", insight.kind, title)));
            }
            lines.extend(html_lines(&insight.html, "    "));
        }
        lines.push(StyledLine::normal(""));
    }

    if !panel.actions.is_empty() {
        lines.push(StyledLine::heading("Recommended Actions"));
        for action in &panel.actions {
            lines.push(StyledLine::normal(format!("  {action}")));
        }
        lines.push(StyledLine::normal(""));
    }

    if panel.timeline.visible {
        lines.push(StyledLine::heading("Timeline"));
        for row in &panel.timeline.rows {
            lines.push(StyledLine::normal(format!("  {}  {}", row.phase, row.event)));
            lines.push(StyledLine::colored(
                format!("    Risk: {}", row.risk_score),
                row.badge_color,
            ));
        }
        lines.push(StyledLine::normal(""));
    }

    lines.extend(scripts_lines(&view.scripts));
    lines
}

pub(crate) fn scripts_lines(panel: &ScriptsPanel) -> Vec<StyledLine> {
    let title = match panel.kind {
        Some(kind) => format!("Safety Scripts: {}", kind.label()),
        None => "Safety Scripts".to_string(),
    };
    match &panel.content {
        ScriptsContent::Hidden => Vec::new(),
        ScriptsContent::Loading => vec![
            StyledLine::heading(title),
            StyledLine::dim("  Generating..."),
        ],
        ScriptsContent::Message(text) => {
            vec![StyledLine::heading(title), StyledLine::dim(format!("  {text}"))]
        }
        ScriptsContent::Scripts(scripts) => {
            let mut lines = vec![StyledLine::heading(title)];
            for (index, script) in scripts.iter().enumerate() {
                lines.push(StyledLine::normal(format!(
                    "  {}. \"{}\"",
                    index + 1,
                    sanitize_text_for_tui(script)
                )));
            }
            lines
        }
    }
}

fn timestamp(at: SystemTime) -> String {
    humantime::format_rfc3339_seconds(at).to_string()
}

pub(crate) fn transcript_lines(assistant: &Assistant) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    for bubble in &assistant.transcript {
        let who = match bubble.speaker {
            Speaker::User => "You",
            Speaker::Assistant => "Cupid AI",
        };
        lines.push(StyledLine::heading(format!("{who}:  {}", timestamp(bubble.at))));
        match &bubble.body {
            BubbleBody::Html(html) => lines.extend(html_lines(html, "  ")),
            BubbleBody::Image { name, .. } => {
                lines.push(StyledLine::dim(format!("  [image {name}]")));
            }
        }
        lines.push(StyledLine::normal(""));
    }
    lines
}

pub(crate) fn suggestions_line(assistant: &Assistant) -> String {
    assistant
        .suggestions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            if index == assistant.selected_suggestion {
                format!("[{question}]")
            } else {
                question.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub(crate) fn financial_lines(panel: &FinancialPanel) -> Vec<StyledLine> {
    let Some(display) = &panel.display else {
        return Vec::new();
    };
    let mut lines = vec![StyledLine::colored(
        format!("Financial risk {} ({})", display.score, display.fill_width),
        display.color,
    )];
    for factor in &display.factors {
        lines.push(StyledLine::normal(format!("  • {factor}")));
    }
    lines.push(StyledLine::colored(display.recommendation.clone(), display.color));
    lines.push(StyledLine::normal(format!("Action: {}", display.action)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::session::capture::{accept_image, ImageFile, ImageSource};
    use crate::layers::session::results::display_results;
    use protocol::{AnalysisResult, Insight, COLOR_LOW};

    #[test]
    fn redacted_form_masks_rows_and_image() {
        let mut view = SessionView::default();
        view.form.selected_row_mut().text = "secret".to_string();
        view.redacted = true;
        let text = plain(&form_lines(&view));
        assert!(text.contains("> ••••: ••••••"));

        accept_image(
            &mut view,
            ImageFile {
                name: "chat.png".to_string(),
                mime: "image/png".to_string(),
                bytes: vec![1],
            },
            ImageSource::Drop,
        );
        let text = plain(&form_lines(&view));
        assert!(text.contains(HIDDEN_IMAGE));
        assert!(!text.contains("chat.png"));
    }

    #[test]
    fn results_show_meter_and_flattened_insights() {
        let mut view = SessionView::default();
        let mut result = AnalysisResult::image_only();
        result.ai_insights.push(Insight {
            kind: "warning".to_string(),
            title: "Urgency".to_string(),
            description: "Pressure to act <strong>now</strong><br>• twice".to_string(),
        });
        display_results(&mut view, result);
        let lines = results_lines(&view);
        assert_eq!(
            lines[0],
            StyledLine::colored("RISK SCORE 0  IMAGE ANALYSIS ONLY", COLOR_LOW)
        );
        let text = plain(&lines);
        assert!(text.contains("  [warning] Urgency\n    Pressure to act now\n    • twice"));
        assert!(text.contains("No specific scam patterns detected in text."));
        assert!(text.contains("✅ Conversation appears relatively normal"));
    }

    #[test]
    fn hidden_scripts_render_nothing() {
        assert!(scripts_lines(&ScriptsPanel::default()).is_empty());
    }

    #[test]
    fn selected_suggestion_is_bracketed() {
        let mut assistant = Assistant::default();
        assistant.toggle();
        assert_eq!(
            suggestions_line(&assistant),
            "[How to spot a scam?]  What are the red flags?  Is this safe?"
        );
    }
}
