//! One-shot subcommands. They drive the same session flows as the terminal
//! dashboard against a private view and print the result as plain text.

use anyhow::Context;
use protocol::config::DashboardConfig;
use protocol::Message;
use std::path::Path;
use std::time::Duration;

use crate::cli::{parse_message, Command};
use crate::layers::service::RiskBackend;
use crate::layers::session::assistant::{apply_chat_image, begin_chat_image, run_chat_image, send_chat};
use crate::layers::session::capture::{capture_image, ImageCandidate, ImageSource};
use crate::layers::session::demo::load_demo;
use crate::layers::session::financial::{calculate_financial_risk, PAYMENT_METHODS};
use crate::layers::session::form::DEFAULT_SENDER;
use crate::layers::session::orchestrator::analyze_conversation;
use crate::layers::session::report::export_report;
use crate::layers::session::scripts::generate_script;
use crate::layers::session::SessionView;
use crate::layers::ui::format::{
    financial_lines, form_lines, plain, results_lines, scripts_lines, transcript_lines,
};

pub(crate) async fn run_command(
    command: Command,
    config: &DashboardConfig,
    backend: &dyn RiskBackend,
) -> anyhow::Result<String> {
    let mut view = SessionView::default();
    let output = match command {
        Command::Analyze {
            messages,
            image,
            json,
            export,
        } => {
            view.form.replace_all(parse_messages(&messages));
            if let Some(path) = image {
                attach(&mut view, &path).await?;
            }
            if !analyze_conversation(&mut view, backend, Duration::ZERO).await {
                return Err(failure(&view, "analysis failed"));
            }
            let mut output = if json {
                let result = view.last_result.as_ref().context("no analysis result")?;
                serde_json::to_string_pretty(result)?
            } else {
                let mut output = plain(&results_lines(&view));
                output.push('\n');
                output.push_str(&plain(&transcript_lines(&view.assistant)));
                output
            };
            if export {
                if !export_report(&mut view, backend, &config.export.report_dir).await {
                    return Err(failure(&view, "report export failed"));
                }
                if let Some(notice) = &view.notice {
                    output.push('\n');
                    output.push_str(notice);
                }
            }
            output
        }
        Command::Chat { message, image } => {
            if message.is_none() && image.is_none() {
                anyhow::bail!("give a message or --image");
            }
            if let Some(path) = image {
                let candidate = ImageCandidate::from_path(&path)
                    .map_err(|alert| anyhow::anyhow!(alert.message()))?;
                let file = candidate.load().await?;
                let data_url = begin_chat_image(&mut view, file);
                let analysis = run_chat_image(backend, data_url).await;
                apply_chat_image(&mut view, analysis);
            }
            if let Some(message) = message {
                view.assistant.input = message;
                send_chat(&mut view, backend).await;
            }
            plain(&transcript_lines(&view.assistant))
        }
        Command::Financial {
            amount,
            reason,
            payment_method,
            days,
        } => {
            let form = &mut view.financial.form;
            form.amount = amount;
            form.reason = reason;
            form.payment_method = payment_method_index(&payment_method)?;
            form.relationship_days = days;
            if !calculate_financial_risk(&mut view, backend, Duration::ZERO).await {
                return Err(failure(&view, "financial risk calculation failed"));
            }
            let mut output = plain(&financial_lines(&view.financial));
            output.push_str("\n\n");
            output.push_str(&plain(&transcript_lines(&view.assistant)));
            output
        }
        Command::Demo { id } => {
            if !load_demo(&mut view, backend, &id, Duration::ZERO, Duration::ZERO).await {
                return Err(failure(&view, "demo analysis failed"));
            }
            let mut output = plain(&form_lines(&view));
            output.push_str("\n\n");
            output.push_str(&plain(&results_lines(&view)));
            output
        }
        Command::Scripts { kind, messages } => {
            view.form.replace_all(parse_messages(&messages));
            generate_script(&mut view, backend, kind.into()).await;
            plain(&scripts_lines(&view.scripts))
        }
    };
    Ok(output)
}

fn parse_messages(raw: &[String]) -> Vec<Message> {
    raw.iter()
        .map(|line| {
            let (sender, text) = parse_message(line, DEFAULT_SENDER);
            Message::new(sender, text)
        })
        .collect()
}

async fn attach(view: &mut SessionView, path: &Path) -> anyhow::Result<()> {
    capture_image(view, path, ImageSource::Input)
        .await
        .map_err(|alert| anyhow::anyhow!("{}: {}", alert.message(), path.display()))
}

/// Payment methods match their label ignoring case, spaces and underscores.
fn payment_method_index(name: &str) -> anyhow::Result<usize> {
    let wanted = normalize(name);
    PAYMENT_METHODS
        .iter()
        .position(|method| normalize(method) == wanted)
        .with_context(|| {
            format!(
                "unknown payment method {name:?}; expected one of {}",
                PAYMENT_METHODS.join(", ")
            )
        })
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The raised alert when there is one, else a generic message.
fn failure(view: &SessionView, fallback: &str) -> anyhow::Error {
    match view.alert {
        Some(alert) => anyhow::anyhow!(alert.message()),
        None => anyhow::anyhow!("{fallback}; see the log for the backend error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ScriptChoice;
    use crate::layers::service::backend::testing::{BackendCall, ScriptedBackend};
    use protocol::{AnalysisResult, FinancialRiskResult, RiskLevel, ScriptsReply, COLOR_HIGH};

    fn high_risk() -> AnalysisResult {
        AnalysisResult {
            risk_score: 82,
            risk_level: RiskLevel::High,
            risk_color: COLOR_HIGH.to_string(),
            risk_message: "CRITICAL RISK DETECTED".to_string(),
            ..AnalysisResult::image_only()
        }
    }

    #[tokio::test]
    async fn analyze_prints_panel_and_summary() {
        let backend = ScriptedBackend {
            analysis: Some(high_risk()),
            ..ScriptedBackend::default()
        };
        let command = Command::Analyze {
            messages: vec!["Them: send a gift card".to_string()],
            image: None,
            json: false,
            export: false,
        };
        let output = run_command(command, &DashboardConfig::default(), &backend)
            .await
            .expect("analyze");
        assert!(output.contains("RISK SCORE 82  CRITICAL RISK DETECTED"));
        assert!(output.contains("CRITICAL risk level (82%)"));
        assert_eq!(backend.count(|call| matches!(call, BackendCall::Analyze(_))), 1);
    }

    #[tokio::test]
    async fn analyze_json_prints_result() {
        let backend = ScriptedBackend {
            analysis: Some(high_risk()),
            ..ScriptedBackend::default()
        };
        let command = Command::Analyze {
            messages: vec!["hello".to_string()],
            image: None,
            json: true,
            export: false,
        };
        let output = run_command(command, &DashboardConfig::default(), &backend)
            .await
            .expect("analyze");
        let parsed: AnalysisResult = serde_json::from_str(&output).expect("json");
        assert_eq!(parsed.risk_score, 82);
    }

    #[tokio::test]
    async fn empty_analyze_reports_alert() {
        let backend = ScriptedBackend::default();
        let command = Command::Analyze {
            messages: Vec::new(),
            image: None,
            json: false,
            export: false,
        };
        let err = run_command(command, &DashboardConfig::default(), &backend)
            .await
            .expect_err("no input");
        assert_eq!(
            err.to_string(),
            "Please enter at least one message or upload a screenshot!"
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn financial_uses_named_payment_method() {
        let backend = ScriptedBackend {
            financial: Some(FinancialRiskResult {
                risk_score: 90,
                risk_factors: vec!["Gift cards are untraceable".to_string()],
                recommendation: "Do not send".to_string(),
                action: "Stop".to_string(),
            }),
            ..ScriptedBackend::default()
        };
        let command = Command::Financial {
            amount: "500".to_string(),
            reason: "plane ticket".to_string(),
            payment_method: "gift_card".to_string(),
            days: "14".to_string(),
        };
        let output = run_command(command, &DashboardConfig::default(), &backend)
            .await
            .expect("financial");
        assert!(output.contains("Gift cards are untraceable"));
        assert!(output.contains("Action: Stop"));
    }

    #[tokio::test]
    async fn scripts_print_numbered_lines() {
        let backend = ScriptedBackend {
            scripts: Some(ScriptsReply::Generated {
                scripts: vec!["I don't send money online.".to_string()],
            }),
            ..ScriptedBackend::default()
        };
        let command = Command::Scripts {
            kind: ScriptChoice::DeclineMoney,
            messages: vec!["Them: I need $300".to_string()],
        };
        let output = run_command(command, &DashboardConfig::default(), &backend)
            .await
            .expect("scripts");
        assert!(output.contains("1. \"I don't send money online.\""));
    }

    #[test]
    fn payment_methods_match_loosely() {
        assert_eq!(payment_method_index("gift_card").expect("known"), 1);
        assert_eq!(payment_method_index("WESTERN UNION").expect("known"), 6);
        assert!(payment_method_index("cheque").is_err());
    }
}
