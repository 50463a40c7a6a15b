// autocommit-core/src/api.rs

//! OpenAI-compatible chat-completions client with retry and backoff.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, to_value, Value};
use tokio::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ModelConfig, RuntimeConfig};
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;

/// Retry schedule for transient failures (network errors, 429, 5xx).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        std::cmp::min(
            Duration::from_secs_f64(current.as_secs_f64() * self.backoff_factor),
            self.max_delay,
        )
    }
}

pub async fn get_chat_completion(
    client: &Client,
    config: &RuntimeConfig,
    messages: Vec<ChatMessage>,
    tool_definitions: &[ToolDefinition],
) -> Result<ApiResponse> {
    get_chat_completion_with_retry(client, config, messages, tool_definitions, RetryPolicy::default())
        .await
}

pub async fn get_chat_completion_with_retry(
    client: &Client,
    config: &RuntimeConfig,
    messages: Vec<ChatMessage>,
    tool_definitions: &[ToolDefinition],
    retry: RetryPolicy,
) -> Result<ApiResponse> {
    let model_config = &config.model;
    let url_str = &model_config.endpoint;

    let request_body = build_openai_request(messages, model_config, tool_definitions)?;

    debug!(
        "Request URL: {}\nRequest JSON: {}",
        url_str,
        serde_json::to_string_pretty(&request_body)?
    );

    let mut retries = 0;
    let mut current_delay = retry.initial_delay;

    loop {
        let request = client
            .post(url_str)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", config.api_key));

        let response = match request.json(&request_body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                if retries < retry.max_retries {
                    retries += 1;
                    warn!(
                        "Network error sending request: {}. Retrying in {:?} (attempt {}/{})",
                        e, current_delay, retries, retry.max_retries
                    );
                    tokio::time::sleep(current_delay).await;
                    current_delay = retry.next_delay(current_delay);
                    continue;
                }
                return Err(anyhow!(
                    "Network error after {} retries: {}",
                    retry.max_retries,
                    e
                ));
            }
        };

        let status = response.status();

        if (status.as_u16() == 429 || status.is_server_error()) && retries < retry.max_retries {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);

            let wait_time = retry_after.unwrap_or(current_delay);
            retries += 1;
            warn!(
                "API request failed with status {}. Retrying in {:?} (attempt {}/{})",
                status, wait_time, retries, retry.max_retries
            );
            tokio::time::sleep(wait_time).await;
            current_delay = retry.next_delay(current_delay);
            continue;
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read API error response body")?;
            debug!("API request failed. Status: {}, Body: {}", status, error_text);
            return Err(anyhow!("API error: {} - {}", status, error_text));
        }

        let response_value: Value = response
            .json()
            .await
            .context("Failed to read API response body as JSON")?;

        let mut response_json_obj = match response_value {
            Value::Object(map) => map,
            other => return Err(anyhow!("API response was not a JSON object: {:?}", other)),
        };

        // Some compatible servers omit the id.
        if !response_json_obj.contains_key("id") {
            let new_id = format!("chatcmpl-{}", Uuid::new_v4());
            debug!("Added missing 'id' field to API response with value: {}", new_id);
            response_json_obj.insert("id".to_string(), json!(new_id));
        }

        let api_response: ApiResponse = serde_json::from_value(Value::Object(response_json_obj))
            .context("Failed to deserialize API response")?;

        if let Some(choice) = api_response.choices.first() {
            match &choice.message.tool_calls {
                Some(tool_calls) => debug!("Tool calls: {:#?}", tool_calls),
                None => debug!("No tool calls"),
            }
        } else {
            debug!("Response has empty 'choices' array");
        }

        return Ok(api_response);
    }
}

/// Builds the request body: model, messages, tools (omitted when empty) and
/// any extra `[model.parameters]` merged in at the top level.
pub fn build_openai_request(
    messages: Vec<ChatMessage>,
    model_config: &ModelConfig,
    tool_definitions: &[ToolDefinition],
) -> Result<Value> {
    let mut request_map = serde_json::Map::new();
    request_map.insert("model".to_string(), json!(model_config.model_name));
    request_map.insert("messages".to_string(), to_value(messages)?);

    let tools_json: Vec<Value> = tool_definitions
        .iter()
        .map(|tool_def| {
            json!({
                "type": "function",
                "function": tool_def
            })
        })
        .collect();

    if !tools_json.is_empty() {
        request_map.insert("tools".to_string(), Value::Array(tools_json));
    }

    if let Some(parameters) = model_config.parameters.as_table() {
        for (key, value) in parameters {
            let json_value = to_value(value.clone())
                .with_context(|| format!("Failed to convert TOML parameter '{}' to JSON", key))?;
            request_map.insert(key.clone(), json_value);
        }
    }
    Ok(Value::Object(request_map))
}
