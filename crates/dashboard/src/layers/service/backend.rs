use anyhow::Context;
use async_trait::async_trait;
use protocol::config::BackendConfig;
use protocol::{
    paths, AnalysisResult, AnalyzeRequest, ChatReply, ChatRequest, DemoConversation,
    FinancialRiskRequest, FinancialRiskResult, ImageAnalysisReply, ImageAnalysisRequest,
    ScriptRequest, ScriptsReply,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::http_utils::join_base_path;

/// Every endpoint the dashboard talks to. Each call is a single attempt.
#[async_trait]
pub(crate) trait RiskBackend: Send + Sync {
    async fn demo_conversation(&self, id: &str) -> anyhow::Result<DemoConversation>;
    async fn analyze(&self, request: &AnalyzeRequest) -> anyhow::Result<AnalysisResult>;
    async fn analyze_image(
        &self,
        request: &ImageAnalysisRequest,
    ) -> anyhow::Result<ImageAnalysisReply>;
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatReply>;
    async fn financial_risk(
        &self,
        request: &FinancialRiskRequest,
    ) -> anyhow::Result<FinancialRiskResult>;
    async fn generate_scripts(&self, request: &ScriptRequest) -> anyhow::Result<ScriptsReply>;
    /// Posts the serialized analysis as the `data` form field, returns the page.
    async fn render_report(&self, data: &str) -> anyhow::Result<String>;
}

pub(crate) struct HttpBackend {
    base_url: String,
    client: Client,
    next_request_id: AtomicU64,
}

impl HttpBackend {
    pub(crate) fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        join_base_path(&config.base_url, "/")?;
        let mut builder = Client::builder().user_agent("cupidsecure-dashboard");
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().context("failed to build http client")?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            next_request_id: AtomicU64::new(1),
        })
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> anyhow::Result<R> {
        let url = join_base_path(&self.base_url, path)?;
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(request_id, %url, "GET start");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        decode_body(request_id, &url, response).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> anyhow::Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = join_base_path(&self.base_url, path)?;
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(request_id, %url, "POST start");
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        decode_body(request_id, &url, response).await
    }
}

/// Error replies carry a JSON body too, so the status code is logged but
/// decoding decides whether the call succeeded.
async fn decode_body<R: DeserializeOwned>(
    request_id: u64,
    url: &str,
    response: reqwest::Response,
) -> anyhow::Result<R> {
    let started = Instant::now();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed to read body from {url}"))?;
    tracing::debug!(
        request_id,
        status = status.as_u16(),
        content_type = %content_type,
        body_len = body.len(),
        read_ms = started.elapsed().as_millis() as u64,
        "response received"
    );
    serde_json::from_str(&body).with_context(|| {
        format!(
            "unexpected response from {url} (status {}): {}",
            status.as_u16(),
            preview(&body)
        )
    })
}

fn preview(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() <= LIMIT {
        return body.to_string();
    }
    let mut out: String = body.chars().take(LIMIT).collect();
    out.push_str("...");
    out
}

#[async_trait]
impl RiskBackend for HttpBackend {
    async fn demo_conversation(&self, id: &str) -> anyhow::Result<DemoConversation> {
        self.get_json(&paths::demo_conversation(id)).await
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> anyhow::Result<AnalysisResult> {
        self.post_json(paths::ANALYZE, request).await
    }

    async fn analyze_image(
        &self,
        request: &ImageAnalysisRequest,
    ) -> anyhow::Result<ImageAnalysisReply> {
        self.post_json(paths::ANALYZE_IMAGE, request).await
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatReply> {
        self.post_json(paths::CHAT, request).await
    }

    async fn financial_risk(
        &self,
        request: &FinancialRiskRequest,
    ) -> anyhow::Result<FinancialRiskResult> {
        self.post_json(paths::FINANCIAL_RISK, request).await
    }

    async fn generate_scripts(&self, request: &ScriptRequest) -> anyhow::Result<ScriptsReply> {
        self.post_json(paths::GENERATE_RESPONSE, request).await
    }

    async fn render_report(&self, data: &str) -> anyhow::Result<String> {
        let url = join_base_path(&self.base_url, paths::REPORT)?;
        let response = self
            .client
            .post(&url)
            .form(&[("data", data)])
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read body from {url}"))?;
        if !status.is_success() {
            anyhow::bail!("report request failed status={} body={}", status, preview(&body));
        }
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum BackendCall {
        Demo(String),
        Analyze(AnalyzeRequest),
        AnalyzeImage(ImageAnalysisRequest),
        Chat(ChatRequest),
        Financial(FinancialRiskRequest),
        Scripts(ScriptRequest),
        Report(String),
    }

    /// Canned replies per endpoint; an unset reply behaves like an unreachable backend.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        pub(crate) demo: Option<DemoConversation>,
        pub(crate) analysis: Option<AnalysisResult>,
        pub(crate) image: Option<ImageAnalysisReply>,
        pub(crate) chat: Option<ChatReply>,
        pub(crate) financial: Option<FinancialRiskResult>,
        pub(crate) scripts: Option<ScriptsReply>,
        pub(crate) report: Option<String>,
        pub(crate) calls: Mutex<Vec<BackendCall>>,
    }

    impl ScriptedBackend {
        pub(crate) fn calls(&self) -> Vec<BackendCall> {
            self.calls.lock().expect("calls lock").clone()
        }

        pub(crate) fn count(&self, matches: impl Fn(&BackendCall) -> bool) -> usize {
            self.calls().iter().filter(|call| matches(call)).count()
        }

        fn record(&self, call: BackendCall) {
            self.calls.lock().expect("calls lock").push(call);
        }
    }

    fn canned<T: Clone>(value: &Option<T>) -> anyhow::Result<T> {
        value
            .clone()
            .ok_or_else(|| anyhow::anyhow!("connection refused"))
    }

    #[async_trait]
    impl RiskBackend for ScriptedBackend {
        async fn demo_conversation(&self, id: &str) -> anyhow::Result<DemoConversation> {
            self.record(BackendCall::Demo(id.to_string()));
            canned(&self.demo)
        }

        async fn analyze(&self, request: &AnalyzeRequest) -> anyhow::Result<AnalysisResult> {
            self.record(BackendCall::Analyze(request.clone()));
            canned(&self.analysis)
        }

        async fn analyze_image(
            &self,
            request: &ImageAnalysisRequest,
        ) -> anyhow::Result<ImageAnalysisReply> {
            self.record(BackendCall::AnalyzeImage(request.clone()));
            canned(&self.image)
        }

        async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatReply> {
            self.record(BackendCall::Chat(request.clone()));
            canned(&self.chat)
        }

        async fn financial_risk(
            &self,
            request: &FinancialRiskRequest,
        ) -> anyhow::Result<FinancialRiskResult> {
            self.record(BackendCall::Financial(request.clone()));
            canned(&self.financial)
        }

        async fn generate_scripts(
            &self,
            request: &ScriptRequest,
        ) -> anyhow::Result<ScriptsReply> {
            self.record(BackendCall::Scripts(request.clone()));
            canned(&self.scripts)
        }

        async fn render_report(&self, data: &str) -> anyhow::Result<String> {
            self.record(BackendCall::Report(data.to_string()));
            canned(&self.report)
        }
    }
}
