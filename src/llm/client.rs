use super::models::{Model, Usage};
use crate::config::Config;
use serde::{Deserialize, Serialize};

/// OpenRouter direct API URL (BYOK mode)
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Rate limit retry configuration
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 2000; // 2 seconds
const BACKOFF_MULTIPLIER: u64 = 2; // Exponential backoff

/// Response from LLM including content and usage stats
#[derive(Debug)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// LLM transport. Constructed once from the explicit config at startup
/// and passed to whatever needs it - the client never loads config state
/// on its own.
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!("No API key configured. Run 'compass --setup' to get started.")
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
        })
    }

    /// Call the chat completions API with full response including usage.
    /// Includes automatic retry with exponential backoff for rate limits.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        model: Model,
        json_mode: bool,
    ) -> anyhow::Result<LlmResponse> {
        let response_format = if json_mode {
            Some(ResponseFormat {
                format_type: "json_object".to_string(),
            })
        } else {
            None
        };

        let request = ChatRequest {
            model: model.id().to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: model.max_tokens(),
            stream: false,
            response_format,
        };

        let mut last_error = String::new();
        let mut retry_count = 0;

        while retry_count <= MAX_RETRIES {
            let response = self
                .http
                .post(OPENROUTER_URL)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;

            if status.is_success() {
                let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
                    anyhow::anyhow!("Failed to parse OpenRouter response: {}\n{}", e, text)
                })?;

                let content = parsed
                    .choices
                    .first()
                    .map(|c| c.message.content.clone())
                    .unwrap_or_default();

                return Ok(LlmResponse {
                    content,
                    usage: parsed.usage,
                });
            }

            last_error = text.clone();

            // Check if we should retry (rate limits)
            if status.as_u16() == 429 && retry_count < MAX_RETRIES {
                retry_count += 1;

                let retry_after = parse_retry_after(&text).unwrap_or_else(|| {
                    // Exponential backoff
                    (INITIAL_BACKOFF_MS * BACKOFF_MULTIPLIER.pow(retry_count - 1)) / 1000
                });

                eprintln!(
                    "  OpenRouter rate limited. Retrying in {}s (attempt {}/{})",
                    retry_after, retry_count, MAX_RETRIES
                );
                tokio::time::sleep(tokio::time::Duration::from_secs(retry_after)).await;
                continue;
            }

            // Non-retryable error or max retries exceeded
            let error_msg = match status.as_u16() {
                401 => "Invalid API key. Run 'compass --setup' to update it.".to_string(),
                429 => format!(
                    "Rate limited by OpenRouter after {} retries. Try again in a few minutes.",
                    retry_count
                ),
                500..=599 => format!(
                    "OpenRouter server error ({}). The service may be temporarily unavailable.",
                    status
                ),
                _ => format!("API error {}: {}", status, truncate_str(&text, 200)),
            };
            return Err(anyhow::anyhow!("{}", error_msg));
        }

        // Should not reach here, but handle it gracefully
        Err(anyhow::anyhow!("{}", last_error))
    }
}

/// Extract retry-after hint from OpenRouter response (if present)
fn parse_retry_after(text: &str) -> Option<u64> {
    // Look for patterns like "retry after X seconds" or "wait X seconds"
    let text_lower = text.to_lowercase();
    if let Some(pos) = text_lower.find("retry") {
        let after_retry = &text_lower[pos..];
        for word in after_retry.split_whitespace().skip(1).take(5) {
            if let Ok(secs) = word
                .trim_matches(|c: char| !c.is_numeric())
                .parse::<u64>()
            {
                if secs > 0 && secs < 300 {
                    return Some(secs);
                }
            }
        }
    }
    None
}

/// Truncate a string for display (Unicode-safe)
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after_finds_seconds() {
        assert_eq!(
            parse_retry_after("Rate limited. Please retry after 30 seconds."),
            Some(30)
        );
        assert_eq!(parse_retry_after("no hint here"), None);
    }

    #[test]
    fn test_truncate_str_unicode_safe() {
        assert_eq!(truncate_str("ééééé", 3), "ééé");
        assert_eq!(truncate_str("short", 10), "short");
    }
}
