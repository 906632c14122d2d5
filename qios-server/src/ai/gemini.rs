//! Google Gemini `generateContent` over REST

use async_trait::async_trait;
use serde_json::json;

use super::{AiError, TextGenerator};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            model,
        }
    }
}

/// Concatenated text parts of the first candidate
fn reply_text(body: &serde_json::Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 2048 },
        });
        let resp = self
            .http
            .post(format!("{BASE_URL}/{}:generateContent", self.model))
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;
        if !status.is_success() {
            return Err(AiError::Api {
                status: status.as_u16(),
                message: body["error"]["message"]
                    .as_str()
                    .map(String::from)
                    .unwrap_or_else(|| body.to_string()),
            });
        }
        reply_text(&body).ok_or(AiError::EmptyReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_candidate() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "TYPE: trend\n"}, {"text": "TITLE: Naik"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(reply_text(&body).as_deref(), Some("TYPE: trend\nTITLE: Naik"));
    }

    #[test]
    fn empty_reply_is_none() {
        assert!(reply_text(&json!({"candidates": []})).is_none());
        assert!(reply_text(&json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]})).is_none());
    }
}
