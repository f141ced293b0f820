//! View state for one dashboard session and the flows that mutate it.
//!
//! Every flow is split the same way: a synchronous `begin_*` that validates
//! input against the view and returns a job, an async `run_*` that talks to a
//! [`RiskBackend`](crate::layers::service::backend::RiskBackend), and a
//! synchronous `apply_*` that folds the outcome back into the view. The
//! terminal loop owns the view and only ever runs the synchronous halves.

pub(crate) mod assistant;
pub(crate) mod capture;
pub(crate) mod demo;
pub(crate) mod financial;
pub(crate) mod form;
pub(crate) mod interpret;
pub(crate) mod orchestrator;
pub(crate) mod privacy;
pub(crate) mod report;
pub(crate) mod results;
pub(crate) mod rules;
pub(crate) mod scripts;

use protocol::AnalysisResult;

use assistant::Assistant;
use capture::ImageSlot;
use financial::FinancialPanel;
use form::MessageForm;
use results::{ChartSlot, ResultsPanel};
use scripts::ScriptsPanel;

/// User-facing alerts. Raised before any network call for input errors, or
/// after a failed call where the flow has no inline place to report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Alert {
    NoInput,
    LastMessage,
    NotAnImage,
    ImageUnreadable,
    MissingFields,
    CalculationFailed,
    DemoFailed,
    NoAnalysisYet,
    ReportFailed,
}

impl Alert {
    pub(crate) fn message(self) -> &'static str {
        match self {
            Alert::NoInput => "Please enter at least one message or upload a screenshot!",
            Alert::LastMessage => "You need at least one message!",
            Alert::NotAnImage => "Please upload an image file.",
            Alert::ImageUnreadable => "Could not read that image file.",
            Alert::MissingFields => "Please fill in all fields!",
            Alert::CalculationFailed => "Failed to calculate risk",
            Alert::DemoFailed => "Failed to load demo conversation",
            Alert::NoAnalysisYet => "Please run an analysis first.",
            Alert::ReportFailed => "Failed to export report",
        }
    }
}

pub(crate) const STATUS_ANALYZING_TEXT: &str = "ANALYZING RISK...";
pub(crate) const STATUS_ANALYZING_IMAGE: &str = "ANALYZING IMAGE...";

/// Overlay shown over the results panel while an analysis is in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LoadingState {
    pub(crate) active: bool,
    pub(crate) status: String,
}

impl LoadingState {
    pub(crate) fn start(&mut self, status: &str) {
        self.active = true;
        self.status = status.to_string();
    }

    pub(crate) fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    pub(crate) fn clear(&mut self) {
        self.active = false;
    }
}

#[derive(Default)]
pub(crate) struct SessionView {
    pub(crate) form: MessageForm,
    pub(crate) image: ImageSlot,
    pub(crate) loading: LoadingState,
    pub(crate) results: ResultsPanel,
    pub(crate) chart: ChartSlot,
    /// Overwritten wholesale by every render; the report export reads it.
    pub(crate) last_result: Option<AnalysisResult>,
    pub(crate) assistant: Assistant,
    pub(crate) financial: FinancialPanel,
    pub(crate) scripts: ScriptsPanel,
    pub(crate) redacted: bool,
    pub(crate) alert: Option<Alert>,
    /// One-line status for things that have no panel of their own.
    pub(crate) notice: Option<String>,
}

impl SessionView {
    pub(crate) fn raise(&mut self, alert: Alert) {
        tracing::info!(alert = ?alert, "alert raised");
        self.alert = Some(alert);
    }

    pub(crate) fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub(crate) fn toggle_privacy(&mut self) {
        self.redacted = !self.redacted;
    }
}
