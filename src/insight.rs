use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SpendError};
use crate::fmt::won;
use crate::settings::Settings;
use crate::summary::Summary;

pub const SYSTEM_PROMPT: &str =
    "당신은 개인 재무 관리 전문가입니다. 사용자의 지출 데이터를 분석하고 실용적인 절약 조언을 제공합니다.";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Anything that turns a prompt into text. The production implementation
/// talks to an OpenAI-compatible endpoint.
pub trait TextGenerator {
    fn generate(&self, request: &CompletionRequest) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

pub fn build_prompt(summary: &Summary) -> String {
    let category_lines: Vec<String> = summary
        .categories
        .iter()
        .map(|c| format!("- {}: {} ({:.1}%)", c.category, won(c.amount), c.percentage))
        .collect();
    format!(
        "다음은 사용자의 지출 데이터 요약입니다.\n\n\
         - 총 지출: {total}\n\
         - 평균 지출: {average}\n\
         - 최대 지출: {max}\n\
         - 거래 건수: {count}건\n\n\
         카테고리별 지출:\n{categories}\n\n\
         위 데이터를 바탕으로 다음을 작성해 주세요.\n\
         1. 지출 패턴 분석 (2~3문장)\n\
         2. 주의가 필요한 카테고리와 그 이유\n\
         3. 구체적인 절약 방법 3가지\n\
         4. 다음 달 지출 목표 제안",
        total = won(summary.total),
        average = won(summary.average),
        max = won(summary.max),
        count = summary.count,
        categories = category_lines.join("\n"),
    )
}

pub fn request_for(summary: &Summary, settings: &Settings) -> CompletionRequest {
    CompletionRequest {
        model: settings.model.clone(),
        system: SYSTEM_PROMPT.to_string(),
        prompt: build_prompt(summary),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

/// Build the prompt for `summary` and hand it to `generator`. No retry and no
/// check of the returned text.
pub fn generate_insight(
    generator: &dyn TextGenerator,
    summary: &Summary,
    settings: &Settings,
) -> Result<String> {
    if summary.is_empty() {
        return Err(SpendError::NoMatchingData);
    }
    let request = request_for(summary, settings);
    debug!(
        model = %request.model,
        prompt_chars = request.prompt.chars().count(),
        "requesting insight"
    );
    match generator.generate(&request) {
        Ok(text) => {
            info!(chars = text.chars().count(), "insight received");
            Ok(text)
        }
        Err(e) => {
            warn!(error = %e, "insight request failed");
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    api_key: String,
    api_base: String,
    http: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> Result<OpenAiClient> {
        let api_key = settings.resolved_api_key().ok_or_else(|| {
            SpendError::Insight(format!(
                "no API key configured; set {} or run `spendlens config set api_key <key>`",
                crate::settings::API_KEY_ENV
            ))
        })?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| SpendError::Insight(format!("HTTP client setup: {e}")))?;
        Ok(OpenAiClient {
            api_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

impl TextGenerator for OpenAiClient {
    fn generate(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| SpendError::Insight("API key contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(self.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .map_err(|e| SpendError::Insight(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().unwrap_or_default();
            return Err(SpendError::Insight(format!("provider error: {status} {txt}")));
        }

        let out: ChatResponse = resp
            .json()
            .map_err(|e| SpendError::Insight(format!("malformed response: {e}")))?;
        extract_text(out)
    }
}

fn extract_text(resp: ChatResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| SpendError::Insight("response contained no choices".into()))
}
