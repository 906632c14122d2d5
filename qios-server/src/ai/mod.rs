//! AI business insights
//!
//! A prompt is built from a store data summary ([`prompts`]), sent to a
//! [`TextGenerator`] (Gemini in production, [`gemini`]) and the free-text
//! reply is parsed into [`Insight`]s ([`parse`]).

pub mod gemini;
pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::Insight;

pub use gemini::GeminiClient;

const NOT_CONFIGURED_MESSAGE: &str =
    "AI insights are not configured. Set GEMINI_API_KEY to enable this feature.";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI reply contained no text")]
    EmptyReply,
}

impl From<AiError> for AppError {
    fn from(e: AiError) -> Self {
        tracing::error!(error = %e, "AI request failed");
        AppError::new(ErrorCode::AiRequestFailed)
    }
}

/// Generative text backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Run `prompt` through the generator and parse the reply
pub async fn generate_insights(
    generator: Option<&dyn TextGenerator>,
    prompt: &str,
) -> Result<Vec<Insight>, AppError> {
    let generator = generator
        .ok_or_else(|| AppError::with_message(ErrorCode::AiNotConfigured, NOT_CONFIGURED_MESSAGE))?;
    let reply = generator.generate(prompt).await?;
    let insights = parse::parse_insights(&reply);
    tracing::debug!(count = insights.len(), "Parsed AI insights");
    Ok(insights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{InsightImpact, InsightType};

    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::Api {
                status: 429,
                message: "quota exceeded".into(),
            })
        }
    }

    #[tokio::test]
    async fn missing_generator_is_not_configured() {
        let err = generate_insights(None, "prompt").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AiNotConfigured);
        assert_eq!(err.message, NOT_CONFIGURED_MESSAGE);
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn generator_failure_is_request_failed() {
        let err = generate_insights(Some(&Failing), "prompt").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AiRequestFailed);
    }

    #[tokio::test]
    async fn reply_is_parsed() {
        let generator = Canned(
            "TYPE: warning\nTITLE: Stok gula menipis\nDESCRIPTION: Sisa 2 kg.\nIMPACT: high\nCONFIDENCE: 90%",
        );
        let insights = generate_insights(Some(&generator), "prompt").await.unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightType::Warning);
        assert_eq!(insights[0].impact, InsightImpact::High);
        assert_eq!(insights[0].confidence, 90);
    }
}
