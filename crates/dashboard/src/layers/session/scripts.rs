use protocol::{ScriptKind, ScriptRequest, ScriptsReply};

use super::SessionView;
use crate::layers::service::backend::RiskBackend;

pub(crate) const NO_SCRIPTS: &str = "Could not generate scripts. Please try again.";
pub(crate) const SCRIPT_ERROR: &str = "Error generating response.";

pub(crate) const SCRIPT_KINDS: [ScriptKind; 3] = [
    ScriptKind::DeclineMoney,
    ScriptKind::VerifyIdentity,
    ScriptKind::BreakContact,
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum ScriptsContent {
    #[default]
    Hidden,
    Loading,
    Scripts(Vec<String>),
    Message(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScriptsPanel {
    pub(crate) kind: Option<ScriptKind>,
    pub(crate) content: ScriptsContent,
}

pub(crate) fn begin_scripts(view: &mut SessionView, kind: ScriptKind) -> ScriptRequest {
    view.scripts = ScriptsPanel {
        kind: Some(kind),
        content: ScriptsContent::Loading,
    };
    ScriptRequest {
        kind,
        context: view.form.context(),
    }
}

/// `None` on transport failure; an `error` reply counts as zero scripts.
pub(crate) async fn run_scripts(
    backend: &dyn RiskBackend,
    request: &ScriptRequest,
) -> Option<Vec<String>> {
    match backend.generate_scripts(request).await {
        Ok(reply) => {
            if let ScriptsReply::Failed { error } = &reply {
                tracing::warn!(error = %error, "script generation refused");
            }
            Some(reply.into_scripts())
        }
        Err(err) => {
            tracing::error!(error = %err, "script generation failed");
            None
        }
    }
}

pub(crate) fn apply_scripts(view: &mut SessionView, scripts: Option<Vec<String>>) {
    view.scripts.content = match scripts {
        Some(scripts) if scripts.is_empty() => ScriptsContent::Message(NO_SCRIPTS),
        Some(scripts) => ScriptsContent::Scripts(scripts),
        None => ScriptsContent::Message(SCRIPT_ERROR),
    };
}

pub(crate) async fn generate_script(
    view: &mut SessionView,
    backend: &dyn RiskBackend,
    kind: ScriptKind,
) {
    let request = begin_scripts(view, kind);
    let scripts = run_scripts(backend, &request).await;
    apply_scripts(view, scripts);
}
