/// Endpoint paths, relative to the configured backend base URL.
pub const ANALYZE: &str = "/api/analyze";
pub const ANALYZE_IMAGE: &str = "/api/analyze-image";
pub const CHAT: &str = "/api/chat";
pub const FINANCIAL_RISK: &str = "/api/calculate-financial-risk";
pub const GENERATE_RESPONSE: &str = "/api/generate-response";
pub const REPORT: &str = "/report";

pub fn demo_conversation(id: &str) -> String {
    format!("/api/demo-conversation/{id}")
}
