use protocol::{
    AnalysisResult, DetectedFlag, DetectedPattern, Insight, RiskLevel, ScamClassification,
    TimelineEntry, COLOR_HIGH, COLOR_LOW, COLOR_MEDIUM,
};

use super::SessionView;

pub(crate) const SCREENSHOT_INSIGHT_TITLE: &str = "📸 Screenshot Analysis";
pub(crate) const NO_PATTERNS: &str = "No specific scam patterns detected in text.";
pub(crate) const NO_FLAGS: &str = "No financial red flags detected.";
pub(crate) const CHART_LABEL: &str = "Risk Score Over Time";
const UNKNOWN_CLASSIFICATION: &str = "None/Unknown";

pub(crate) const HIGH_RISK_ACTIONS: [&str; 5] = [
    "🚫 DO NOT send any money to this person",
    "📱 Block this person immediately on all platforms",
    "🚨 Report to the dating platform and FBI IC3",
    "👮 File a report at ic3.gov if you sent money",
    "🗣️ Warn friends and family about this interaction",
];

pub(crate) const MEDIUM_RISK_ACTIONS: [&str; 5] = [
    "⚠️ Proceed with extreme caution",
    "📹 Verify identity through video call",
    "🔍 Research this person thoroughly",
    "💬 Never send money without meeting in person",
    "👥 Tell a trusted friend about this relationship",
];

pub(crate) const LOW_RISK_ACTIONS: [&str; 5] = [
    "✅ Conversation appears relatively normal",
    "👁️ Still remain cautious and aware",
    "🚫 Never send money to online-only contacts",
    "📹 Always verify identity before deepening relationship",
    "🧠 Trust your instincts - if something feels off, it probably is",
];

pub(crate) fn actions_for(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::High => &HIGH_RISK_ACTIONS,
        RiskLevel::Medium => &MEDIUM_RISK_ACTIONS,
        RiskLevel::Low => &LOW_RISK_ACTIONS,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RiskMeter {
    pub(crate) score: u32,
    /// CSS-style width, e.g. `"75%"`.
    pub(crate) fill_width: String,
    pub(crate) color: String,
    pub(crate) message: String,
}

impl RiskMeter {
    pub(crate) fn ratio(&self) -> f64 {
        f64::from(self.score.min(100)) / 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClassificationCard {
    pub(crate) kind: String,
    pub(crate) description: String,
    pub(crate) avg_loss: String,
    pub(crate) probability: String,
    pub(crate) probability_color: &'static str,
}

impl ClassificationCard {
    fn from_classification(classification: &ScamClassification) -> Option<Self> {
        let kind = classification
            .kind
            .as_deref()
            .filter(|kind| !kind.is_empty() && *kind != UNKNOWN_CLASSIFICATION)?;
        let probability_color = match classification.probability.as_deref() {
            Some("High") => COLOR_HIGH,
            Some("Medium") => COLOR_MEDIUM,
            _ => COLOR_LOW,
        };
        Some(Self {
            kind: kind.to_string(),
            description: classification.description.clone().unwrap_or_default(),
            avg_loss: non_empty_or(classification.avg_loss.as_deref(), "Unknown"),
            probability: non_empty_or(classification.probability.as_deref(), "Medium"),
            probability_color,
        })
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|text| !text.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ListItem {
    pub(crate) heading: String,
    pub(crate) body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListContent {
    Placeholder(&'static str),
    Items(Vec<ListItem>),
}

impl Default for ListContent {
    fn default() -> Self {
        ListContent::Items(Vec::new())
    }
}

impl ListContent {
    pub(crate) fn len(&self) -> usize {
        match self {
            ListContent::Placeholder(_) => 0,
            ListContent::Items(items) => items.len(),
        }
    }
}

/// Only the first underscore is replaced, matching the backend's naming.
fn display_name(name: &str) -> String {
    name.replacen('_', " ", 1).to_uppercase()
}

fn pattern_items(patterns: &[DetectedPattern]) -> ListContent {
    if patterns.is_empty() {
        return ListContent::Placeholder(NO_PATTERNS);
    }
    ListContent::Items(
        patterns
            .iter()
            .map(|pattern| ListItem {
                heading: display_name(&pattern.name),
                body: format!("{} (Weight: {})", pattern.description, pattern.weight),
            })
            .collect(),
    )
}

fn flag_items(flags: &[DetectedFlag]) -> ListContent {
    if flags.is_empty() {
        return ListContent::Placeholder(NO_FLAGS);
    }
    ListContent::Items(
        flags
            .iter()
            .map(|flag| ListItem {
                heading: display_name(&flag.name),
                body: format!("Severity: {} (Weight: {})", flag.severity, flag.weight),
            })
            .collect(),
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InsightCard {
    pub(crate) kind: String,
    /// `None` for the screenshot card, whose block carries its own banner.
    pub(crate) title: Option<String>,
    pub(crate) html: String,
}

impl From<&Insight> for InsightCard {
    fn from(insight: &Insight) -> Self {
        let title = (insight.title != SCREENSHOT_INSIGHT_TITLE).then(|| insight.title.clone());
        Self {
            kind: insight.kind.clone(),
            title,
            html: insight.description.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TimelineRow {
    pub(crate) phase: String,
    pub(crate) event: String,
    pub(crate) risk_score: u32,
    pub(crate) badge_color: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TimelineSection {
    pub(crate) visible: bool,
    pub(crate) rows: Vec<TimelineRow>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ResultsPanel {
    pub(crate) visible: bool,
    pub(crate) scroll: u16,
    pub(crate) meter: RiskMeter,
    pub(crate) classification: Option<ClassificationCard>,
    pub(crate) patterns: ListContent,
    pub(crate) flags: ListContent,
    pub(crate) insights: Vec<InsightCard>,
    pub(crate) actions: Vec<&'static str>,
    pub(crate) timeline: TimelineSection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChartInstance {
    pub(crate) id: u64,
    pub(crate) label: &'static str,
    pub(crate) labels: Vec<String>,
    pub(crate) points: Vec<u32>,
}

/// Holds at most one chart. Drawing a new one destroys the old one first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ChartSlot {
    current: Option<ChartInstance>,
    created: u64,
    destroyed: u64,
}

impl ChartSlot {
    pub(crate) fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    /// Charts still attached; never more than one.
    pub(crate) fn live(&self) -> u64 {
        self.created - self.destroyed
    }

    fn redraw(&mut self, timeline: &[TimelineEntry]) {
        if let Some(previous) = self.current.take() {
            tracing::debug!(chart_id = previous.id, "chart destroyed");
            self.destroyed += 1;
        }
        self.created += 1;
        self.current = Some(ChartInstance {
            id: self.created,
            label: CHART_LABEL,
            labels: timeline.iter().map(|entry| entry.phase.clone()).collect(),
            points: timeline.iter().map(|entry| entry.risk_score).collect(),
        });
    }
}

pub(crate) fn render_timeline_and_chart(view: &mut SessionView, timeline: &[TimelineEntry]) {
    if timeline.is_empty() {
        view.results.timeline.visible = false;
        return;
    }
    view.results.timeline = TimelineSection {
        visible: true,
        rows: timeline
            .iter()
            .map(|entry| TimelineRow {
                phase: entry.phase.clone(),
                event: entry.event.clone(),
                risk_score: entry.risk_score,
                badge_color: RiskLevel::from_score(entry.risk_score).color(),
            })
            .collect(),
    };
    view.chart.redraw(timeline);
}

/// Replaces every part of the results panel with `result`.
pub(crate) fn display_results(view: &mut SessionView, result: AnalysisResult) {
    tracing::info!(
        risk_score = result.risk_score,
        risk_level = result.risk_level.as_str(),
        patterns = result.detected_patterns.len(),
        flags = result.detected_flags.len(),
        insights = result.ai_insights.len(),
        "displaying results"
    );
    view.results.visible = true;
    view.results.scroll = 0;
    render_timeline_and_chart(view, &result.timeline);

    let panel = &mut view.results;
    panel.meter = RiskMeter {
        score: result.risk_score,
        fill_width: format!("{}%", result.risk_score),
        color: result.risk_color.clone(),
        message: result.risk_message.clone(),
    };
    panel.classification = result
        .scam_classification
        .as_ref()
        .and_then(ClassificationCard::from_classification);
    panel.patterns = pattern_items(&result.detected_patterns);
    panel.flags = flag_items(&result.detected_flags);
    panel.insights = result.ai_insights.iter().map(InsightCard::from).collect();
    panel.actions = actions_for(result.risk_level).to_vec();

    view.last_result = Some(result);
}
