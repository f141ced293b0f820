use crate::layers::session::assistant::{ChatJob, ChatOutcome};
use crate::layers::session::capture::{ImageFile, ImageSource};
use crate::layers::session::orchestrator::AnalysisOutcome;
use protocol::{DemoConversation, FinancialRiskRequest, FinancialRiskResult};
use std::path::PathBuf;

/// Results of background work, applied to the view on the UI loop.
pub(crate) enum SessionEvent {
    AnalysisStage(&'static str),
    AnalysisFinished(AnalysisOutcome),
    /// Fired after the demo autorun delay.
    AnalysisRequested,
    AssistantMessage(String),
    ImageLoaded {
        file: anyhow::Result<ImageFile>,
        source: ImageSource,
    },
    DemoLoaded(Option<DemoConversation>),
    ChatFinished {
        job: ChatJob,
        outcome: ChatOutcome,
    },
    ChatImageLoaded(anyhow::Result<ImageFile>),
    ChatImageAnalyzed(Option<String>),
    FinancialFinished {
        request: FinancialRiskRequest,
        result: Option<FinancialRiskResult>,
    },
    ScriptsFinished(Option<Vec<String>>),
    ReportFinished(anyhow::Result<PathBuf>),
}
