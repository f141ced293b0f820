use protocol::{ChatReply, ChatRequest, ImageAnalysisReply, ImageAnalysisRequest};
use std::time::SystemTime;

use super::capture::ImageFile;
use super::rules::{suggestions_for, IMAGE_SUGGESTIONS, OPENING_SUGGESTIONS};
use super::SessionView;
use crate::layers::render::{escape_html, format_markdown};
use crate::layers::service::backend::RiskBackend;

pub(crate) const THINKING: &str = "Thinking...";
pub(crate) const CONNECTION_TROUBLE: &str = "I'm having trouble connecting. Please try again.";
pub(crate) const ANALYZING_SCREENSHOT: &str = "Analyzing this screenshot for you...";
pub(crate) const SCREENSHOT_FAILED: &str =
    "I couldn't analyze that image. Please make sure it's a clear chat screenshot.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Speaker {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum BubbleBody {
    Html(String),
    Image { name: String, data_url: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Bubble {
    /// Only placeholders carry an id; they are removed by it.
    pub(crate) id: Option<String>,
    pub(crate) speaker: Speaker,
    pub(crate) body: BubbleBody,
    pub(crate) at: SystemTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ChatPhase {
    #[default]
    Idle,
    Sent,
    AwaitingReply,
    Replied,
}

/// Floating chat window. The transcript lives only as long as the session.
#[derive(Clone, Debug, Default)]
pub(crate) struct Assistant {
    pub(crate) open: bool,
    pub(crate) input: String,
    pub(crate) transcript: Vec<Bubble>,
    pub(crate) suggestions: Vec<&'static str>,
    pub(crate) selected_suggestion: usize,
    pub(crate) phase: ChatPhase,
}

impl Assistant {
    pub(crate) fn toggle(&mut self) {
        self.open = !self.open;
        if self.open {
            self.set_suggestions(OPENING_SUGGESTIONS);
        }
    }

    pub(crate) fn set_suggestions(&mut self, questions: &'static [&'static str]) {
        self.suggestions = questions.to_vec();
        self.selected_suggestion = 0;
    }

    /// Appends an assistant bubble, opening the window when it is closed.
    pub(crate) fn push_assistant(&mut self, html: impl Into<String>) {
        self.open = true;
        self.push(Speaker::Assistant, BubbleBody::Html(html.into()), None);
    }

    fn push(&mut self, speaker: Speaker, body: BubbleBody, id: Option<String>) {
        self.transcript.push(Bubble {
            id,
            speaker,
            body,
            at: SystemTime::now(),
        });
    }

    fn record_user_message(&mut self, message: &str) {
        self.push(Speaker::User, BubbleBody::Html(escape_html(message)), None);
        self.phase = ChatPhase::Sent;
    }

    fn add_placeholder(&mut self) -> String {
        let id = format!("loading-{}", uuid::Uuid::new_v4());
        self.push(
            Speaker::Assistant,
            BubbleBody::Html(THINKING.to_string()),
            Some(id.clone()),
        );
        self.phase = ChatPhase::AwaitingReply;
        id
    }

    pub(crate) fn remove_bubble(&mut self, id: &str) -> bool {
        let before = self.transcript.len();
        self.transcript
            .retain(|bubble| bubble.id.as_deref() != Some(id));
        before != self.transcript.len()
    }

    pub(crate) fn select_next_suggestion(&mut self) {
        if !self.suggestions.is_empty() {
            self.selected_suggestion = (self.selected_suggestion + 1) % self.suggestions.len();
        }
    }

    /// Puts the highlighted suggestion in the input box, ready to send.
    pub(crate) fn use_suggestion(&mut self) -> bool {
        match self.suggestions.get(self.selected_suggestion) {
            Some(question) => {
                self.input = question.to_string();
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChatJob {
    pub(crate) message: String,
    pub(crate) placeholder_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChatOutcome {
    Answered(String),
    /// The backend answered with an `error` body.
    Refused,
    /// Transport or decode failure.
    Unreachable,
}

/// Takes the trimmed input; blank input does nothing at all.
pub(crate) fn begin_chat(view: &mut SessionView) -> Option<ChatJob> {
    let message = view.assistant.input.trim().to_string();
    if message.is_empty() {
        return None;
    }
    view.assistant.input.clear();
    view.assistant.record_user_message(&message);
    let placeholder_id = view.assistant.add_placeholder();
    Some(ChatJob {
        message,
        placeholder_id,
    })
}

pub(crate) async fn run_chat(backend: &dyn RiskBackend, job: &ChatJob) -> ChatOutcome {
    let request = ChatRequest {
        message: job.message.clone(),
    };
    match backend.chat(&request).await {
        Ok(ChatReply::Answered { response, .. }) => ChatOutcome::Answered(response),
        Ok(ChatReply::Failed { error }) => {
            tracing::warn!(error = %error, "chat endpoint returned an error");
            ChatOutcome::Refused
        }
        Err(err) => {
            tracing::warn!(error = %err, "chat request failed");
            ChatOutcome::Unreachable
        }
    }
}

pub(crate) fn apply_chat(view: &mut SessionView, job: &ChatJob, outcome: ChatOutcome) {
    let assistant = &mut view.assistant;
    assistant.remove_bubble(&job.placeholder_id);
    match outcome {
        ChatOutcome::Answered(response) => {
            assistant.push_assistant(format_markdown(&response));
            assistant.set_suggestions(suggestions_for(&job.message));
        }
        ChatOutcome::Refused => assistant.push_assistant(CONNECTION_TROUBLE),
        ChatOutcome::Unreachable => {}
    }
    assistant.phase = ChatPhase::Replied;
}

pub(crate) async fn send_chat(view: &mut SessionView, backend: &dyn RiskBackend) -> bool {
    let Some(job) = begin_chat(view) else {
        return false;
    };
    let outcome = run_chat(backend, &job).await;
    apply_chat(view, &job, outcome);
    true
}

/// Shows the screenshot and the "analyzing" bubble; returns the data URL to send.
pub(crate) fn begin_chat_image(view: &mut SessionView, file: ImageFile) -> String {
    let data_url = file.data_url();
    view.assistant.open = true;
    view.assistant.push(
        Speaker::User,
        BubbleBody::Image {
            name: file.name,
            data_url: data_url.clone(),
        },
        None,
    );
    view.assistant.push_assistant(ANALYZING_SCREENSHOT);
    data_url
}

pub(crate) async fn run_chat_image(backend: &dyn RiskBackend, data_url: String) -> Option<String> {
    let request = ImageAnalysisRequest { image: data_url };
    match backend.analyze_image(&request).await {
        Ok(ImageAnalysisReply::Completed { analysis, .. }) => Some(analysis),
        Ok(ImageAnalysisReply::Failed { error }) => {
            tracing::warn!(error = %error, "chat screenshot analysis refused");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "chat screenshot analysis failed");
            None
        }
    }
}

pub(crate) fn apply_chat_image(view: &mut SessionView, analysis: Option<String>) {
    match analysis {
        Some(text) => {
            view.assistant.push_assistant(format_markdown(&text));
            view.assistant.set_suggestions(IMAGE_SUGGESTIONS);
        }
        None => view.assistant.push_assistant(SCREENSHOT_FAILED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::service::backend::testing::{BackendCall, ScriptedBackend};
    use crate::layers::session::rules::DEFAULT_SUGGESTIONS;

    fn html_bodies(view: &SessionView) -> Vec<String> {
        view.assistant
            .transcript
            .iter()
            .filter_map(|bubble| match &bubble.body {
                BubbleBody::Html(html) => Some(html.clone()),
                BubbleBody::Image { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn blank_message_is_a_no_op() {
        let backend = ScriptedBackend::default();
        let mut view = SessionView::default();
        view.assistant.input = "   \n\t".to_string();
        assert!(!send_chat(&mut view, &backend).await);
        assert!(backend.calls().is_empty());
        assert!(view.assistant.transcript.is_empty());
        assert_eq!(view.assistant.phase, ChatPhase::Idle);
    }

    #[test]
    fn sending_adds_user_bubble_and_placeholder() {
        let mut view = SessionView::default();
        view.assistant.input = "  is <this> safe?  ".to_string();
        let job = begin_chat(&mut view).expect("job");
        assert_eq!(job.message, "is <this> safe?");
        assert!(job.placeholder_id.starts_with("loading-"));
        assert!(view.assistant.input.is_empty());
        assert_eq!(
            html_bodies(&view),
            vec!["is &lt;this&gt; safe?".to_string(), THINKING.to_string()]
        );
        assert_eq!(view.assistant.phase, ChatPhase::AwaitingReply);
    }

    #[tokio::test]
    async fn answer_replaces_placeholder_and_picks_suggestions() {
        let backend = ScriptedBackend {
            chat: Some(ChatReply::Answered {
                response: "**Never** buy gift cards".to_string(),
                timestamp: None,
            }),
            ..ScriptedBackend::default()
        };
        let mut view = SessionView::default();
        view.assistant.input = "She wants a gift card".to_string();
        assert!(send_chat(&mut view, &backend).await);
        assert_eq!(
            backend.calls(),
            vec![BackendCall::Chat(ChatRequest {
                message: "She wants a gift card".to_string()
            })]
        );
        assert_eq!(
            html_bodies(&view),
            vec![
                "She wants a gift card".to_string(),
                "<strong>Never</strong> buy gift cards".to_string()
            ]
        );
        assert_eq!(view.assistant.suggestions[0], "Common money scams?");
        assert_eq!(view.assistant.phase, ChatPhase::Replied);
        assert!(view.assistant.open);
    }

    #[tokio::test]
    async fn error_reply_shows_connection_bubble() {
        let backend = ScriptedBackend {
            chat: Some(ChatReply::Failed {
                error: "quota".to_string(),
            }),
            ..ScriptedBackend::default()
        };
        let mut view = SessionView::default();
        view.assistant.input = "hello".to_string();
        send_chat(&mut view, &backend).await;
        assert_eq!(
            html_bodies(&view),
            vec!["hello".to_string(), CONNECTION_TROUBLE.to_string()]
        );
        assert!(view.assistant.suggestions.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_only_removes_placeholder() {
        let backend = ScriptedBackend::default();
        let mut view = SessionView::default();
        view.assistant.input = "hello".to_string();
        send_chat(&mut view, &backend).await;
        assert_eq!(html_bodies(&view), vec!["hello".to_string()]);
        assert!(view
            .assistant
            .transcript
            .iter()
            .all(|bubble| bubble.id.is_none()));
    }

    #[test]
    fn opening_shows_starter_questions() {
        let mut assistant = Assistant::default();
        assistant.toggle();
        assert!(assistant.open);
        assert_eq!(assistant.suggestions, OPENING_SUGGESTIONS.to_vec());
        assistant.select_next_suggestion();
        assert!(assistant.use_suggestion());
        assert_eq!(assistant.input, "What are the red flags?");
    }

    #[test]
    fn pushed_message_opens_window() {
        let mut assistant = Assistant::default();
        assistant.push_assistant("hi");
        assert!(assistant.open);
        assert_eq!(assistant.transcript.len(), 1);
    }

    #[tokio::test]
    async fn screenshot_in_chat_is_analyzed() {
        let backend = ScriptedBackend {
            image: Some(ImageAnalysisReply::Completed {
                analysis: "Looks *risky*".to_string(),
                timestamp: None,
            }),
            ..ScriptedBackend::default()
        };
        let mut view = SessionView::default();
        let file = ImageFile {
            name: "chat.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        let data_url = begin_chat_image(&mut view, file);
        let analysis = run_chat_image(&backend, data_url.clone()).await;
        apply_chat_image(&mut view, analysis);
        assert_eq!(
            backend.calls(),
            vec![BackendCall::AnalyzeImage(ImageAnalysisRequest { image: data_url })]
        );
        assert_eq!(
            html_bodies(&view),
            vec![
                ANALYZING_SCREENSHOT.to_string(),
                "Looks <em>risky</em>".to_string()
            ]
        );
        assert_eq!(view.assistant.suggestions, IMAGE_SUGGESTIONS.to_vec());
    }

    #[tokio::test]
    async fn failed_screenshot_gets_apology() {
        let backend = ScriptedBackend {
            image: Some(ImageAnalysisReply::Failed {
                error: "bad image".to_string(),
            }),
            ..ScriptedBackend::default()
        };
        let mut view = SessionView::default();
        view.assistant.set_suggestions(DEFAULT_SUGGESTIONS);
        let analysis = run_chat_image(&backend, "data:image/png;base64,AA==".to_string()).await;
        apply_chat_image(&mut view, analysis);
        assert_eq!(html_bodies(&view), vec![SCREENSHOT_FAILED.to_string()]);
        assert_eq!(view.assistant.suggestions, DEFAULT_SUGGESTIONS.to_vec());
    }
}
