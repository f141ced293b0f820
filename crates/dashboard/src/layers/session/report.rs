use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Alert, SessionView};
use crate::layers::service::backend::RiskBackend;

/// Serialized last result, or an alert when nothing has been analyzed yet.
pub(crate) fn begin_report(view: &mut SessionView) -> Option<String> {
    let Some(result) = view.last_result.as_ref() else {
        view.raise(Alert::NoAnalysisYet);
        return None;
    };
    match serde_json::to_string(result) {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize analysis for report");
            view.raise(Alert::ReportFailed);
            None
        }
    }
}

pub(crate) async fn run_report(
    backend: &dyn RiskBackend,
    data: &str,
    report_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let page = backend.render_report(data).await?;
    write_report(report_dir, &page).await
}

async fn write_report(report_dir: &Path, page: &str) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(report_dir)
        .await
        .with_context(|| format!("failed to create {}", report_dir.display()))?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_millis();
    let path = report_dir.join(format!("report-{millis}.html"));
    tokio::fs::write(&path, page)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub(crate) fn apply_report(view: &mut SessionView, outcome: anyhow::Result<PathBuf>) {
    match outcome {
        Ok(path) => {
            tracing::info!(path = %path.display(), "report exported");
            view.notice = Some(format!("Report saved to {}", path.display()));
        }
        Err(err) => {
            tracing::error!(error = %err, "report export failed");
            view.raise(Alert::ReportFailed);
        }
    }
}

pub(crate) async fn export_report(
    view: &mut SessionView,
    backend: &dyn RiskBackend,
    report_dir: &Path,
) -> bool {
    let Some(data) = begin_report(view) else {
        return false;
    };
    let outcome = run_report(backend, &data, report_dir).await;
    let exported = outcome.is_ok();
    apply_report(view, outcome);
    exported
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::service::backend::testing::{BackendCall, ScriptedBackend};
    use protocol::AnalysisResult;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cupid-report-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn export_requires_an_analysis() {
        let backend = ScriptedBackend::default();
        let mut view = SessionView::default();
        assert!(!export_report(&mut view, &backend, &temp_dir()).await);
        assert_eq!(view.alert, Some(Alert::NoAnalysisYet));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn posts_last_result_and_writes_page() {
        let backend = ScriptedBackend {
            report: Some("<html>report</html>".to_string()),
            ..ScriptedBackend::default()
        };
        let mut view = SessionView::default();
        view.last_result = Some(AnalysisResult::image_only());
        let dir = temp_dir();
        assert!(export_report(&mut view, &backend, &dir).await);

        let expected = serde_json::to_string(&AnalysisResult::image_only()).expect("json");
        assert_eq!(backend.calls(), vec![BackendCall::Report(expected)]);
        let notice = view.notice.clone().expect("notice");
        let path = notice.trim_start_matches("Report saved to ");
        assert!(path.ends_with(".html"));
        let page = std::fs::read_to_string(path).expect("read report");
        assert_eq!(page, "<html>report</html>");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn backend_failure_raises_alert() {
        let backend = ScriptedBackend::default();
        let mut view = SessionView::default();
        view.last_result = Some(AnalysisResult::image_only());
        assert!(!export_report(&mut view, &backend, &temp_dir()).await);
        assert_eq!(view.alert, Some(Alert::ReportFailed));
    }
}
