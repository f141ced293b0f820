//! Keyword rule tables. Control flow only asks these tables; swapping a rule
//! never touches the orchestrator or the assistant.

use protocol::{AnalysisResult, RiskLevel, COLOR_HIGH};

pub(crate) struct EscalationRule {
    pub(crate) keywords: &'static [&'static str],
    pub(crate) score_floor: u32,
    pub(crate) level: RiskLevel,
    pub(crate) color: &'static str,
    pub(crate) message: &'static str,
}

/// Applied to the raw screenshot analysis text before any parsing.
pub(crate) const ESCALATION_RULES: &[EscalationRule] = &[EscalationRule {
    keywords: &["high risk", "scam"],
    score_floor: 85,
    level: RiskLevel::High,
    color: COLOR_HIGH,
    message: "CRITICAL RISK (IMAGE)",
}];

pub(crate) fn escalation_for(text: &str) -> Option<&'static EscalationRule> {
    let lowered = text.to_lowercase();
    ESCALATION_RULES.iter().find(|rule| {
        rule.keywords
            .iter()
            .any(|keyword| lowered.contains(keyword))
    })
}

/// Raises the result to the rule's floor. Never lowers a score.
pub(crate) fn escalate(result: &mut AnalysisResult, text: &str) -> bool {
    let Some(rule) = escalation_for(text) else {
        return false;
    };
    result.risk_score = result.risk_score.max(rule.score_floor);
    result.risk_level = rule.level;
    result.risk_color = rule.color.to_string();
    result.risk_message = rule.message.to_string();
    true
}

pub(crate) struct SuggestionRule {
    pub(crate) keywords: &'static [&'static str],
    pub(crate) questions: &'static [&'static str],
}

pub(crate) const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        keywords: &["money", "gift card"],
        questions: &[
            "Common money scams?",
            "Why do they ask for cards?",
            "Safety script?",
        ],
    },
    SuggestionRule {
        keywords: &["military", "deployed"],
        questions: &[
            "Military scam red flags",
            "How to verify a soldier?",
            "Reporting scams",
        ],
    },
];

pub(crate) const DEFAULT_SUGGESTIONS: &[&str] =
    &["Next steps?", "More red flags?", "Analyze a new chat"];

pub(crate) const OPENING_SUGGESTIONS: &[&str] = &[
    "How to spot a scam?",
    "What are the red flags?",
    "Is this safe?",
];

pub(crate) const IMAGE_SUGGESTIONS: &[&str] = &[
    "Tell me more about the risks",
    "What should I say next?",
    "Block this person?",
];

/// Follow-ups after a chat reply, chosen from what the user asked.
pub(crate) fn suggestions_for(message: &str) -> &'static [&'static str] {
    let lowered = message.to_lowercase();
    SUGGESTION_RULES
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| lowered.contains(keyword))
        })
        .map(|rule| rule.questions)
        .unwrap_or(DEFAULT_SUGGESTIONS)
}

/// Word used by the assistant summary: >70 critical, >40 suspicious.
pub(crate) fn summary_band(score: u32) -> &'static str {
    if score > 70 {
        "CRITICAL"
    } else if score > 40 {
        "SUSPICIOUS"
    } else {
        "LOW"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(score: u32) -> AnalysisResult {
        let mut result = AnalysisResult::image_only();
        result.risk_score = score;
        result
    }

    #[test]
    fn scam_keyword_raises_score_to_floor() {
        let mut result = base(20);
        assert!(escalate(&mut result, "I think this is a scam"));
        assert_eq!(result.risk_score, 85);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.risk_color, COLOR_HIGH);
        assert_eq!(result.risk_message, "CRITICAL RISK (IMAGE)");
    }

    #[test]
    fn escalation_never_lowers_score() {
        let mut result = base(97);
        assert!(escalate(&mut result, "HIGH RISK conversation"));
        assert_eq!(result.risk_score, 97);
    }

    #[test]
    fn neutral_text_leaves_result_alone() {
        let mut result = base(20);
        assert!(!escalate(&mut result, "looks like a friendly chat"));
        assert_eq!(result.risk_score, 20);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn suggestions_follow_keywords() {
        assert_eq!(suggestions_for("She wants a GIFT CARD")[0], "Common money scams?");
        assert_eq!(suggestions_for("he says he is deployed")[0], "Military scam red flags");
        assert_eq!(suggestions_for("hello"), DEFAULT_SUGGESTIONS);
    }

    #[test]
    fn money_rule_wins_over_military() {
        assert_eq!(
            suggestions_for("deployed soldier wants money")[0],
            "Common money scams?"
        );
    }

    #[test]
    fn summary_bands_are_strict() {
        assert_eq!(summary_band(71), "CRITICAL");
        assert_eq!(summary_band(70), "SUSPICIOUS");
        assert_eq!(summary_band(41), "SUSPICIOUS");
        assert_eq!(summary_band(40), "LOW");
    }
}
