use crate::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAnalysisRequest {
    /// Full `data:image/...;base64,...` URL.
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ImageAnalysisReply {
    Failed {
        error: String,
    },
    Completed {
        analysis: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatReply {
    Failed {
        error: String,
    },
    Answered {
        response: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialRiskRequest {
    pub amount: f64,
    pub reason: String,
    pub payment_method: String,
    pub relationship_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialRiskResult {
    #[serde(deserialize_with = "crate::lenient::score")]
    pub risk_score: u32,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    DeclineMoney,
    VerifyIdentity,
    BreakContact,
}

impl ScriptKind {
    pub fn label(self) -> &'static str {
        match self {
            ScriptKind::DeclineMoney => "Decline money request",
            ScriptKind::VerifyIdentity => "Verify identity",
            ScriptKind::BreakContact => "Break contact",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptRequest {
    #[serde(rename = "type")]
    pub kind: ScriptKind,
    pub context: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScriptsReply {
    Failed {
        error: String,
    },
    Generated {
        #[serde(default)]
        scripts: Vec<String>,
    },
}

impl ScriptsReply {
    pub fn into_scripts(self) -> Vec<String> {
        match self {
            ScriptsReply::Failed { .. } => Vec::new(),
            ScriptsReply::Generated { scripts } => scripts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DemoConversation {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_reply_with_error_is_failed() {
        let reply: ImageAnalysisReply =
            serde_json::from_str(r#"{"error": "Failed to get analysis from AI"}"#)
                .expect("decode");
        assert_eq!(
            reply,
            ImageAnalysisReply::Failed {
                error: "Failed to get analysis from AI".to_string()
            }
        );
    }

    #[test]
    fn image_reply_with_analysis_is_completed() {
        let reply: ImageAnalysisReply = serde_json::from_str(
            r#"{"analysis": "{\"risk_score\": 10}", "timestamp": "2024-01-01T00:00:00"}"#,
        )
        .expect("decode");
        match reply {
            ImageAnalysisReply::Completed { analysis, timestamp } => {
                assert_eq!(analysis, r#"{"risk_score": 10}"#);
                assert!(timestamp.is_some());
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn chat_reply_without_known_fields_is_rejected() {
        let parsed: Result<ChatReply, _> = serde_json::from_str(r#"{"status": "ok"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn script_request_uses_type_key() {
        let request = ScriptRequest {
            kind: ScriptKind::VerifyIdentity,
            context: "Her: hi".to_string(),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["type"], "verify_identity");
        assert_eq!(json["context"], "Her: hi");
    }

    #[test]
    fn scripts_reply_error_yields_no_scripts() {
        let reply: ScriptsReply =
            serde_json::from_str(r#"{"error": "boom"}"#).expect("decode");
        assert!(reply.into_scripts().is_empty());
    }
}
