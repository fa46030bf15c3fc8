//! OpenAI narrative-feedback client
//!
//! Builds a Japanese coaching prompt from the scored result and asks a
//! chat-completion model for a short learner-facing comment. Failures
//! surface as `Error::Feedback`; the orchestrator treats them as
//! non-fatal and stores a placeholder instead.

use crate::models::TaskType;
use crate::services::{FeedbackGenerator, FeedbackInput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use sesa_common::{Error, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// OpenAI chat-completion feedback generator
///
/// The API key is optional at construction; a missing key is reported at
/// generation time so the rest of the pipeline still runs without one.
pub struct OpenAiFeedbackClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl OpenAiFeedbackClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(Self { http, api_key })
    }

    /// Coaching tone is pitched by an accuracy-leaning blend of the
    /// sub-scores, not the report's composite
    fn level_hint(input: &FeedbackInput) -> f64 {
        let s = &input.scores;
        match input.task_type {
            TaskType::Reading => 0.5 * s.accuracy + 0.3 * s.fluency + 0.2 * s.prosody,
            TaskType::Speech => 0.3 * s.accuracy + 0.35 * s.fluency + 0.35 * s.prosody,
        }
    }

    fn build_prompt(input: &FeedbackInput) -> String {
        let level = Self::level_hint(input);
        let tone = if level >= 85.0 {
            "とても上手に話せています。良かった点を具体的に褒めつつ、さらに磨ける点を1つ挙げてください。"
        } else if level >= 70.0 {
            "概ね良好です。良かった点を1つ褒め、改善すべき点を2つまで具体的に指摘してください。"
        } else {
            "改善の余地があります。励ましを添えつつ、最も効果的な練習ポイントを2〜3個具体的に示してください。"
        };

        let task_label = match input.task_type {
            TaskType::Reading => "音読課題",
            TaskType::Speech => "スピーチ課題",
        };

        let mut prompt = String::new();
        prompt.push_str("あなたは日本人大学生向けの英語発音指導の専門家です。\n");
        prompt.push_str("以下の発音評価結果をもとに、日本語で200字程度の学習フィードバックを書いてください。\n");
        prompt.push_str(tone);
        prompt.push('\n');
        prompt.push_str(&format!("\n課題種別: {}\n", task_label));
        if !input.target_text.trim().is_empty() {
            prompt.push_str(&format!("課題文: {}\n", input.target_text));
        }
        prompt.push_str(&format!("認識されたテキスト: {}\n", input.transcription));
        prompt.push_str(&format!(
            "スコア: 正確性 {:.1} / 流暢性 {:.1} / 韻律 {:.1} / 完全性 {:.1}\n",
            input.scores.accuracy,
            input.scores.fluency,
            input.scores.prosody,
            input.scores.completeness
        ));
        prompt.push_str(&format!("発音に問題のあった単語: {}\n", input.mispronounced_words));
        prompt.push_str(&format!("発音に問題のあった音素: {}\n", input.phoneme_errors));
        prompt
    }
}

#[async_trait]
impl FeedbackGenerator for OpenAiFeedbackClient {
    async fn generate(&self, input: &FeedbackInput) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Feedback("OPENAI_API_KEY未設定のためフィードバックを生成できません".to_string()))?;

        let body = json!({
            "model": MODEL,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "system",
                    "content": "あなたは英語発音指導の専門家です。学習者を励ましながら、具体的で実行可能なアドバイスを日本語で提供します。"
                },
                {
                    "role": "user",
                    "content": Self::build_prompt(input)
                }
            ]
        });

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Feedback(format!("OpenAI へのリクエストに失敗: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Feedback(format!(
                "OpenAI API error {}: {}",
                status.as_u16(),
                text
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Feedback(format!("OpenAI 応答の解析に失敗: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Feedback("OpenAI 応答にフィードバック本文がありません".to_string()))?;

        tracing::info!(chars = content.chars().count(), "Feedback generated");
        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}
