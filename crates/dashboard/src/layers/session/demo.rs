use protocol::DemoConversation;
use std::time::Duration;

use super::orchestrator::analyze_conversation;
use super::{Alert, SessionView};
use crate::layers::service::backend::RiskBackend;

pub(crate) const DEMO_IDS: &[&str] = &["1", "2"];

pub(crate) async fn fetch_demo(backend: &dyn RiskBackend, id: &str) -> Option<DemoConversation> {
    match backend.demo_conversation(id).await {
        Ok(demo) => Some(demo),
        Err(err) => {
            tracing::error!(demo_id = id, error = %err, "demo conversation failed to load");
            None
        }
    }
}

/// Replaces the form rows. Returns whether analysis should be scheduled.
pub(crate) fn apply_demo(view: &mut SessionView, demo: Option<DemoConversation>) -> bool {
    let Some(demo) = demo else {
        view.raise(Alert::DemoFailed);
        return false;
    };
    tracing::info!(messages = demo.messages.len(), "demo conversation loaded");
    view.form.replace_all(demo.messages);
    true
}

pub(crate) async fn load_demo(
    view: &mut SessionView,
    backend: &dyn RiskBackend,
    id: &str,
    autorun_delay: Duration,
    summary_delay: Duration,
) -> bool {
    let demo = fetch_demo(backend, id).await;
    if !apply_demo(view, demo) {
        return false;
    }
    tokio::time::sleep(autorun_delay).await;
    analyze_conversation(view, backend, summary_delay).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::service::backend::testing::{BackendCall, ScriptedBackend};
    use protocol::{AnalysisResult, AnalyzeRequest, Message};

    #[tokio::test]
    async fn demo_replaces_rows_and_runs_analysis() {
        let messages = vec![
            Message::new("Stranger", "I am overseas on a peacekeeping mission"),
            Message::new("Me", "Hi, we just met."),
        ];
        let backend = ScriptedBackend {
            demo: Some(DemoConversation {
                messages: messages.clone(),
            }),
            analysis: Some(AnalysisResult::image_only()),
            ..ScriptedBackend::default()
        };
        let mut view = SessionView::default();
        view.form.add_row("Old", "stale row");
        assert!(load_demo(&mut view, &backend, "1", Duration::ZERO, Duration::ZERO).await);
        assert_eq!(view.form.rows().len(), 2);
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::Demo("1".to_string()),
                BackendCall::Analyze(AnalyzeRequest { messages }),
            ]
        );
    }

    #[tokio::test]
    async fn failed_demo_alerts_and_keeps_rows() {
        let backend = ScriptedBackend::default();
        let mut view = SessionView::default();
        view.form.selected_row_mut().text = "mine".to_string();
        assert!(!load_demo(&mut view, &backend, "9", Duration::ZERO, Duration::ZERO).await);
        assert_eq!(view.alert, Some(Alert::DemoFailed));
        assert_eq!(view.form.rows()[0].text, "mine");
        assert_eq!(backend.calls(), vec![BackendCall::Demo("9".to_string())]);
    }

    #[test]
    fn empty_demo_keeps_one_row() {
        let mut view = SessionView::default();
        assert!(apply_demo(&mut view, Some(DemoConversation::default())));
        assert_eq!(view.form.rows().len(), 1);
    }
}
