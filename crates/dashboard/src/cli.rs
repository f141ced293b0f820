use clap::{Parser, Subcommand, ValueEnum};
use protocol::ScriptKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cupidsecure",
    version,
    about = "Romance-scam risk dashboard for the CupidSecure backend"
)]
pub(crate) struct Args {
    /// TOML config; built-in defaults when omitted.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long)]
    pub(crate) backend_url: Option<String>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    /// Subcommands always log to stderr; the dashboard never does.
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Analyze a conversation and print the results panel.
    Analyze {
        /// `Sender: text`; repeat for each message. Without a colon the
        /// sender is `Them`.
        #[arg(short = 'm', long = "message")]
        messages: Vec<String>,
        /// Screenshot to analyze alongside (or instead of) the messages.
        #[arg(long)]
        image: Option<PathBuf>,
        /// Print the raw analysis JSON instead of the formatted panel.
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Also export the HTML report.
        #[arg(long, default_value_t = false)]
        export: bool,
    },
    /// Ask the assistant a question, or have it read a screenshot.
    Chat {
        message: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Score a money request.
    Financial {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "Gift Card")]
        payment_method: String,
        #[arg(long)]
        days: String,
    },
    /// Load a demo conversation and analyze it.
    Demo { id: String },
    /// Generate safety-response scripts for a conversation.
    Scripts {
        kind: ScriptChoice,
        #[arg(short = 'm', long = "message")]
        messages: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScriptChoice {
    DeclineMoney,
    VerifyIdentity,
    BreakContact,
}

impl From<ScriptChoice> for ScriptKind {
    fn from(choice: ScriptChoice) -> Self {
        match choice {
            ScriptChoice::DeclineMoney => ScriptKind::DeclineMoney,
            ScriptChoice::VerifyIdentity => ScriptKind::VerifyIdentity,
            ScriptChoice::BreakContact => ScriptKind::BreakContact,
        }
    }
}

/// Splits `Sender: text` at the first colon.
pub(crate) fn parse_message(raw: &str, default_sender: &str) -> (String, String) {
    match raw.split_once(':') {
        Some((sender, text)) if !sender.trim().is_empty() && !sender.contains(' ') => {
            (sender.trim().to_string(), text.trim().to_string())
        }
        _ => (default_sender.to_string(), raw.trim().to_string()),
    }
}
