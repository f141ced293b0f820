use serde::{Deserialize, Serialize};

pub mod config;
pub mod endpoints;
mod lenient;
pub mod paths;

pub use endpoints::{
    ChatReply, ChatRequest, DemoConversation, FinancialRiskRequest, FinancialRiskResult,
    ImageAnalysisReply, ImageAnalysisRequest, ScriptKind, ScriptRequest, ScriptsReply,
};

pub const COLOR_HIGH: &str = "#ef4444";
pub const COLOR_MEDIUM: &str = "#f59e0b";
pub const COLOR_LOW: &str = "#10b981";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Message {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub text: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band used for timeline badges and the financial summary: >=70 high, >=40 medium.
    pub fn from_score(score: u32) -> Self {
        if score >= 70 {
            RiskLevel::High
        } else if score >= 40 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => COLOR_LOW,
            RiskLevel::Medium => COLOR_MEDIUM,
            RiskLevel::High => COLOR_HIGH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedPattern {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedFlag {
    pub name: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    #[serde(rename = "type", default = "default_insight_kind")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    /// HTML fragment.
    #[serde(default)]
    pub description: String,
}

fn default_insight_kind() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScamClassification {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_loss: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub probability: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TimelineEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub phase: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub event: String,
    #[serde(default, deserialize_with = "lenient::score")]
    pub risk_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient::score")]
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_color: String,
    #[serde(default)]
    pub risk_message: String,
    #[serde(default)]
    pub detected_patterns: Vec<DetectedPattern>,
    #[serde(default)]
    pub detected_flags: Vec<DetectedFlag>,
    #[serde(default)]
    pub ai_insights: Vec<Insight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scam_classification: Option<ScamClassification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineEntry>,
}

impl AnalysisResult {
    /// Zero-risk base used when only a screenshot is submitted.
    pub fn image_only() -> Self {
        Self {
            risk_score: 0,
            risk_level: RiskLevel::Low,
            risk_color: COLOR_LOW.to_string(),
            risk_message: "IMAGE ANALYSIS ONLY".to_string(),
            detected_patterns: Vec::new(),
            detected_flags: Vec::new(),
            ai_insights: Vec::new(),
            scam_classification: None,
            timeline: Vec::new(),
        }
    }
}

/// Structured reading of an image-analysis `analysis` string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImageFindings {
    #[serde(default, deserialize_with = "lenient::optional_score")]
    pub risk_score: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub scam_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::red_flags")]
    pub red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub timeline: Option<Vec<TimelineEntry>>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub verdict: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RedFlag {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_result_accepts_backend_payload() {
        let body = r##"{
            "risk_score": 75,
            "risk_level": "high",
            "risk_color": "#ef4444",
            "risk_message": "CRITICAL RISK DETECTED",
            "detected_patterns": [
                {"name": "financial_request", "description": "Asks for money", "weight": 40, "matches": ["$500"]}
            ],
            "detected_flags": [
                {"name": "financial_discussion", "severity": "medium", "weight": 10}
            ],
            "ai_insights": [
                {"type": "danger", "title": "Gift Card Request", "description": "Never pay with gift cards."}
            ],
            "timeline": [],
            "scam_classification": {}
        }"##;
        let result: AnalysisResult = serde_json::from_str(body).expect("decode");
        assert_eq!(result.risk_score, 75);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.detected_patterns[0].matches, vec!["$500".to_string()]);
        assert_eq!(result.ai_insights[0].kind, "danger");
        assert!(result.timeline.is_empty());
        assert_eq!(
            result.scam_classification,
            Some(ScamClassification::default())
        );
    }

    #[test]
    fn timeline_scores_tolerate_model_output() {
        let body = r#"[
            {"phase": "Week 1", "event": "Love bombing", "risk_score": "35"},
            {"phase": "Week 2", "event": "Crisis", "risk_score": 82.6},
            {"phase": 3, "risk_score": null}
        ]"#;
        let timeline: Vec<TimelineEntry> = serde_json::from_str(body).expect("decode");
        assert_eq!(timeline[0].risk_score, 35);
        assert_eq!(timeline[1].risk_score, 83);
        assert_eq!(timeline[2].phase, "3");
        assert_eq!(timeline[2].event, "");
        assert_eq!(timeline[2].risk_score, 0);
    }

    #[test]
    fn image_findings_keep_absent_timeline_distinct_from_empty() {
        let absent: ImageFindings =
            serde_json::from_str(r#"{"risk_score": 90, "verdict": "Scam"}"#).expect("decode");
        assert!(absent.timeline.is_none());
        let empty: ImageFindings = serde_json::from_str(r#"{"timeline": []}"#).expect("decode");
        assert_eq!(empty.timeline, Some(Vec::new()));
        assert_eq!(empty.risk_score, None);
    }

    #[test]
    fn risk_level_bands_follow_thresholds() {
        assert_eq!(RiskLevel::from_score(70), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::Low);
    }

    #[test]
    fn image_only_base_is_zero_risk() {
        let base = AnalysisResult::image_only();
        assert_eq!(base.risk_score, 0);
        assert_eq!(base.risk_level, RiskLevel::Low);
        assert_eq!(base.risk_color, COLOR_LOW);
        assert!(base.ai_insights.is_empty());
    }

    #[test]
    fn red_flags_tolerate_model_output() {
        let findings: ImageFindings =
            serde_json::from_str(r#"{"red_flags": "none"}"#).expect("decode");
        assert!(findings.red_flags.is_empty());

        let findings: ImageFindings =
            serde_json::from_str(r#"{"red_flags": [7, {"description": "Urgent"}]}"#)
                .expect("decode");
        assert_eq!(findings.red_flags[0], RedFlag::default());
        assert_eq!(findings.red_flags[1].description.as_deref(), Some("Urgent"));
    }
}
