use protocol::{FinancialRiskRequest, FinancialRiskResult, RiskLevel, COLOR_LOW, COLOR_MEDIUM};
use std::time::Duration;

use super::{Alert, SessionView};
use crate::layers::service::backend::RiskBackend;

/// The calculator uses a deeper red than the analysis meter.
pub(crate) const FINANCIAL_COLOR_HIGH: &str = "#dc2626";

pub(crate) const PAYMENT_METHODS: &[&str] = &[
    "Bank Transfer",
    "Gift Card",
    "Wire Transfer",
    "Crypto",
    "Cash App",
    "Zelle",
    "Western Union",
    "PayPal",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FinancialField {
    #[default]
    Amount,
    Reason,
    PaymentMethod,
    RelationshipDays,
}

impl FinancialField {
    pub(crate) fn next(self) -> Self {
        match self {
            FinancialField::Amount => FinancialField::Reason,
            FinancialField::Reason => FinancialField::PaymentMethod,
            FinancialField::PaymentMethod => FinancialField::RelationshipDays,
            FinancialField::RelationshipDays => FinancialField::Amount,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            FinancialField::Amount => FinancialField::RelationshipDays,
            FinancialField::Reason => FinancialField::Amount,
            FinancialField::PaymentMethod => FinancialField::Reason,
            FinancialField::RelationshipDays => FinancialField::PaymentMethod,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FinancialForm {
    pub(crate) amount: String,
    pub(crate) reason: String,
    pub(crate) payment_method: usize,
    pub(crate) relationship_days: String,
    pub(crate) focus: FinancialField,
}

impl FinancialForm {
    pub(crate) fn payment_method(&self) -> &'static str {
        PAYMENT_METHODS[self.payment_method % PAYMENT_METHODS.len()]
    }

    pub(crate) fn cycle_payment_method(&mut self) {
        self.payment_method = (self.payment_method + 1) % PAYMENT_METHODS.len();
    }

    /// Text field under focus; the payment method is a picker and has none.
    pub(crate) fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FinancialField::Amount => Some(&mut self.amount),
            FinancialField::Reason => Some(&mut self.reason),
            FinancialField::RelationshipDays => Some(&mut self.relationship_days),
            FinancialField::PaymentMethod => None,
        }
    }

    /// Amount must be positive, reason non-empty and the day count non-zero.
    pub(crate) fn to_request(&self) -> Result<FinancialRiskRequest, Alert> {
        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(Alert::MissingFields)?;
        if self.reason.is_empty() {
            return Err(Alert::MissingFields);
        }
        let relationship_days = self
            .relationship_days
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|days| *days != 0)
            .ok_or(Alert::MissingFields)?;
        Ok(FinancialRiskRequest {
            amount,
            reason: self.reason.clone(),
            payment_method: self.payment_method().to_string(),
            relationship_days,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FinancialDisplay {
    pub(crate) score: u32,
    pub(crate) color: &'static str,
    pub(crate) fill_width: String,
    pub(crate) factors: Vec<String>,
    pub(crate) recommendation: String,
    pub(crate) action: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FinancialPanel {
    pub(crate) form: FinancialForm,
    pub(crate) display: Option<FinancialDisplay>,
}

pub(crate) fn financial_color(score: u32) -> &'static str {
    if score >= 70 {
        FINANCIAL_COLOR_HIGH
    } else if score >= 40 {
        COLOR_MEDIUM
    } else {
        COLOR_LOW
    }
}

pub(crate) fn begin_financial(view: &mut SessionView) -> Option<FinancialRiskRequest> {
    match view.financial.form.to_request() {
        Ok(request) => Some(request),
        Err(alert) => {
            view.raise(alert);
            None
        }
    }
}

pub(crate) async fn run_financial(
    backend: &dyn RiskBackend,
    request: &FinancialRiskRequest,
) -> Option<FinancialRiskResult> {
    match backend.financial_risk(request).await {
        Ok(result) => Some(result),
        Err(err) => {
            tracing::error!(error = %err, "financial risk calculation failed");
            None
        }
    }
}

/// Renders the result and returns the assistant summary to push later.
pub(crate) fn apply_financial(
    view: &mut SessionView,
    request: &FinancialRiskRequest,
    result: Option<FinancialRiskResult>,
) -> Option<String> {
    let Some(result) = result else {
        view.raise(Alert::CalculationFailed);
        return None;
    };
    tracing::info!(risk_score = result.risk_score, "financial risk displayed");
    let summary = financial_summary(request, result.risk_score);
    view.financial.display = Some(FinancialDisplay {
        score: result.risk_score,
        color: financial_color(result.risk_score),
        fill_width: format!("{}%", result.risk_score),
        factors: result.risk_factors,
        recommendation: result.recommendation,
        action: result.action,
    });
    Some(summary)
}

/// The calculator endpoint returns no level, so the band comes from the score.
pub(crate) fn financial_summary(request: &FinancialRiskRequest, risk_score: u32) -> String {
    format!(
        "<strong>Monetary Risk Calculation:</strong><br>The requested amount (${}) combined with \
         the relationship duration ({} days) indicates a <strong>{}</strong> risk profile. \
         Scammers often use 'Emergency' or 'Medical' reasons as high-pressure tactics.",
        request.amount,
        request.relationship_days,
        RiskLevel::from_score(risk_score).as_str().to_uppercase()
    )
}

pub(crate) async fn calculate_financial_risk(
    view: &mut SessionView,
    backend: &dyn RiskBackend,
    summary_delay: Duration,
) -> bool {
    let Some(request) = begin_financial(view) else {
        return false;
    };
    let result = run_financial(backend, &request).await;
    let Some(summary) = apply_financial(view, &request, result) else {
        return false;
    };
    tokio::time::sleep(summary_delay).await;
    view.assistant.push_assistant(summary);
    true
}
