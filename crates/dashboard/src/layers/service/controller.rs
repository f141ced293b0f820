use protocol::config::DashboardConfig;
use protocol::ScriptKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::backend::RiskBackend;
use super::events::SessionEvent;
use crate::layers::session::assistant::{
    apply_chat, apply_chat_image, begin_chat, begin_chat_image, run_chat, run_chat_image,
};
use crate::layers::session::capture::{finish_capture, ImageCandidate, ImageSource};
use crate::layers::session::demo::{apply_demo, fetch_demo};
use crate::layers::session::financial::{apply_financial, begin_financial, run_financial};
use crate::layers::session::orchestrator::{apply_analysis, begin_analysis, run_analysis};
use crate::layers::session::report::{apply_report, begin_report, run_report};
use crate::layers::session::scripts::{apply_scripts, begin_scripts, run_scripts};
use crate::layers::session::{Alert, SessionView};

/// Starts flows from the UI loop. Network work runs on spawned tasks that
/// report back through [`SessionEvent`]s; [`Controller::handle`] applies them.
#[derive(Clone)]
pub(crate) struct Controller {
    backend: Arc<dyn RiskBackend>,
    events: mpsc::Sender<SessionEvent>,
    summary_delay: Duration,
    autorun_delay: Duration,
    report_dir: PathBuf,
}

impl Controller {
    pub(crate) fn new(
        backend: Arc<dyn RiskBackend>,
        events: mpsc::Sender<SessionEvent>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            backend,
            events,
            summary_delay: Duration::from_millis(config.assistant.summary_delay_ms),
            autorun_delay: Duration::from_millis(config.assistant.demo_autorun_delay_ms),
            report_dir: config.export.report_dir.clone(),
        }
    }

    fn emit_after(&self, delay: Duration, event: SessionEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(event).await;
        });
    }

    pub(crate) fn analyze(&self, view: &mut SessionView) {
        let Some(job) = begin_analysis(view) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let stages = events.clone();
            let outcome = run_analysis(backend.as_ref(), job, move |stage| {
                let _ = stages.try_send(SessionEvent::AnalysisStage(stage));
            })
            .await;
            let _ = events.send(SessionEvent::AnalysisFinished(outcome)).await;
        });
    }

    pub(crate) fn attach_image(&self, view: &mut SessionView, path: PathBuf, source: ImageSource) {
        let candidate = match ImageCandidate::from_path(path) {
            Ok(candidate) => candidate,
            Err(alert) => {
                view.raise(alert);
                return;
            }
        };
        let events = self.events.clone();
        tokio::spawn(async move {
            let file = candidate.load().await;
            let _ = events.send(SessionEvent::ImageLoaded { file, source }).await;
        });
    }

    pub(crate) fn load_demo(&self, id: &str) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let demo = fetch_demo(backend.as_ref(), &id).await;
            let _ = events.send(SessionEvent::DemoLoaded(demo)).await;
        });
    }

    pub(crate) fn send_chat(&self, view: &mut SessionView) {
        let Some(job) = begin_chat(view) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = run_chat(backend.as_ref(), &job).await;
            let _ = events.send(SessionEvent::ChatFinished { job, outcome }).await;
        });
    }

    pub(crate) fn attach_chat_image(&self, view: &mut SessionView, path: PathBuf) {
        let candidate = match ImageCandidate::from_path(path) {
            Ok(candidate) => candidate,
            Err(alert) => {
                view.raise(alert);
                return;
            }
        };
        let events = self.events.clone();
        tokio::spawn(async move {
            let file = candidate.load().await;
            let _ = events.send(SessionEvent::ChatImageLoaded(file)).await;
        });
    }

    pub(crate) fn calculate_financial(&self, view: &mut SessionView) {
        let Some(request) = begin_financial(view) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = run_financial(backend.as_ref(), &request).await;
            let _ = events
                .send(SessionEvent::FinancialFinished { request, result })
                .await;
        });
    }

    pub(crate) fn generate_script(&self, view: &mut SessionView, kind: ScriptKind) {
        let request = begin_scripts(view, kind);
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let scripts = run_scripts(backend.as_ref(), &request).await;
            let _ = events.send(SessionEvent::ScriptsFinished(scripts)).await;
        });
    }

    pub(crate) fn export_report(&self, view: &mut SessionView) {
        let Some(data) = begin_report(view) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let report_dir = self.report_dir.clone();
        tokio::spawn(async move {
            let outcome = run_report(backend.as_ref(), &data, &report_dir).await;
            let _ = events.send(SessionEvent::ReportFinished(outcome)).await;
        });
    }

    pub(crate) fn handle(&self, view: &mut SessionView, event: SessionEvent) {
        match event {
            SessionEvent::AnalysisStage(status) => view.loading.set_status(status),
            SessionEvent::AnalysisFinished(outcome) => {
                if let Some(summary) = apply_analysis(view, outcome) {
                    self.emit_after(self.summary_delay, SessionEvent::AssistantMessage(summary));
                }
            }
            SessionEvent::AnalysisRequested => self.analyze(view),
            SessionEvent::AssistantMessage(html) => view.assistant.push_assistant(html),
            SessionEvent::ImageLoaded { file, source } => {
                let _ = finish_capture(view, file, source);
            }
            SessionEvent::DemoLoaded(demo) => {
                if apply_demo(view, demo) {
                    self.emit_after(self.autorun_delay, SessionEvent::AnalysisRequested);
                }
            }
            SessionEvent::ChatFinished { job, outcome } => apply_chat(view, &job, outcome),
            SessionEvent::ChatImageLoaded(Ok(file)) => {
                let data_url = begin_chat_image(view, file);
                let backend = Arc::clone(&self.backend);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let analysis = run_chat_image(backend.as_ref(), data_url).await;
                    let _ = events.send(SessionEvent::ChatImageAnalyzed(analysis)).await;
                });
            }
            SessionEvent::ChatImageLoaded(Err(err)) => {
                tracing::warn!(error = %err, "chat image read failed");
                view.raise(Alert::ImageUnreadable);
            }
            SessionEvent::ChatImageAnalyzed(analysis) => apply_chat_image(view, analysis),
            SessionEvent::FinancialFinished { request, result } => {
                if let Some(summary) = apply_financial(view, &request, result) {
                    self.emit_after(self.summary_delay, SessionEvent::AssistantMessage(summary));
                }
            }
            SessionEvent::ScriptsFinished(scripts) => apply_scripts(view, scripts),
            SessionEvent::ReportFinished(outcome) => apply_report(view, outcome),
        }
    }
}
