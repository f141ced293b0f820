use protocol::{
    AnalysisResult, AnalyzeRequest, ImageAnalysisReply, ImageAnalysisRequest, Insight, Message,
};
use std::time::Duration;

use super::interpret::interpret_image_analysis;
use super::results::{display_results, SCREENSHOT_INSIGHT_TITLE};
use super::rules::{escalate, summary_band};
use super::{Alert, SessionView, STATUS_ANALYZING_IMAGE, STATUS_ANALYZING_TEXT};
use crate::layers::service::backend::RiskBackend;

/// Everything an analysis needs, captured from the form when it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AnalysisJob {
    pub(crate) messages: Vec<Message>,
    /// Data URL of the attached screenshot.
    pub(crate) image: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AnalysisOutcome {
    /// `None` when the text analysis call failed.
    pub(crate) result: Option<AnalysisResult>,
    /// The image call itself failed (not an `error` reply).
    pub(crate) image_unreachable: bool,
}

pub(crate) fn begin_analysis(view: &mut SessionView) -> Option<AnalysisJob> {
    let messages = view.form.collect_messages();
    let image = view
        .image
        .has_image()
        .then(|| view.image.preview_src.clone());
    if messages.is_empty() && image.is_none() {
        view.raise(Alert::NoInput);
        return None;
    }
    tracing::info!(
        messages = messages.len(),
        with_image = image.is_some(),
        "analysis started"
    );
    view.results.visible = true;
    view.loading.start(STATUS_ANALYZING_TEXT);
    Some(AnalysisJob { messages, image })
}

/// Text first, then the screenshot. `on_stage` receives status label changes.
pub(crate) async fn run_analysis<F>(
    backend: &dyn RiskBackend,
    job: AnalysisJob,
    mut on_stage: F,
) -> AnalysisOutcome
where
    F: FnMut(&'static str) + Send,
{
    let mut result = if job.messages.is_empty() {
        Some(AnalysisResult::image_only())
    } else {
        let request = AnalyzeRequest {
            messages: job.messages,
        };
        match backend.analyze(&request).await {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::error!(error = %err, "text analysis failed");
                None
            }
        }
    };

    let mut image_unreachable = false;
    if let Some(image) = job.image {
        on_stage(STATUS_ANALYZING_IMAGE);
        match backend.analyze_image(&ImageAnalysisRequest { image }).await {
            Ok(ImageAnalysisReply::Completed { analysis, .. }) => match result.as_mut() {
                Some(result) => merge_image_analysis(result, &analysis),
                None => tracing::warn!("image analysis discarded, no text result to merge into"),
            },
            Ok(ImageAnalysisReply::Failed { error }) => {
                tracing::warn!(error = %error, "image analysis refused");
            }
            Err(err) => {
                tracing::error!(error = %err, "image analysis failed");
                image_unreachable = true;
            }
        }
    }

    AnalysisOutcome {
        result,
        image_unreachable,
    }
}

/// Image findings only ever raise the score and prepend one insight card.
pub(crate) fn merge_image_analysis(result: &mut AnalysisResult, analysis: &str) {
    if escalate(result, analysis) {
        tracing::info!(risk_score = result.risk_score, "risk escalated by screenshot");
    }
    if analysis.is_empty() {
        return;
    }
    let interpretation = interpret_image_analysis(analysis);
    if let Some(timeline) = interpretation.timeline {
        result.timeline = timeline;
    }
    result.ai_insights.insert(
        0,
        Insight {
            kind: "info".to_string(),
            title: SCREENSHOT_INSIGHT_TITLE.to_string(),
            description: interpretation.html,
        },
    );
}

/// Renders the outcome. Returns the assistant summary to push once the
/// configured delay has passed, or `None` when there is nothing to show.
///
/// A failed text analysis leaves the loading overlay up; only a failed image
/// call clears it.
pub(crate) fn apply_analysis(view: &mut SessionView, outcome: AnalysisOutcome) -> Option<String> {
    if outcome.image_unreachable {
        view.loading.clear();
    }
    let result = outcome.result?;
    view.loading.clear();
    let summary = summary_message(result.risk_score);
    display_results(view, result);
    Some(summary)
}

pub(crate) fn summary_message(risk_score: u32) -> String {
    format!(
        "<strong>Analysis Complete!</strong><br>I've detected a <strong>{}</strong> risk level ({}%). \
         Check the 'Detected Patterns' and 'Safety Response Assistant' for direct advice on how to handle this contact.",
        summary_band(risk_score),
        risk_score
    )
}

/// Runs the whole analysis in place, including the delayed assistant summary.
pub(crate) async fn analyze_conversation(
    view: &mut SessionView,
    backend: &dyn RiskBackend,
    summary_delay: Duration,
) -> bool {
    let Some(job) = begin_analysis(view) else {
        return false;
    };
    let loading = &mut view.loading;
    let outcome = run_analysis(backend, job, |stage| loading.set_status(stage)).await;
    let Some(summary) = apply_analysis(view, outcome) else {
        return false;
    };
    tokio::time::sleep(summary_delay).await;
    view.assistant.push_assistant(summary);
    true
}
