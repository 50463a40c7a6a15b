// autocommit-core/src/lib.rs

//! Core library for the `autocommit` agent.
//!
//! The [`Agent`] drives a chat-completions model through a tool loop. The
//! tools it exposes for git live in [`tools::GitToolProvider`], built on the
//! guarded command layer in [`git`].

pub mod api;
pub mod config;
pub mod errors;
pub mod git;
pub mod prompt;
pub mod tools;
pub mod utils;

pub mod models {
    pub mod chat;
    pub mod tools;
}


use anyhow::Context;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

pub use config::{AppConfig, CommitConfig, ModelConfig, RuntimeConfig};
pub use errors::AgentError;
pub use models::chat::{ApiResponse, ChatMessage, Choice};
pub use models::tools::{
    ToolCall, ToolDefinition, ToolFunction, ToolInput, ToolParameter, ToolParameterType,
    ToolParametersDefinition,
};
pub use tools::GitToolProvider;

pub use async_trait::async_trait;

/// Supplies tools to the [`Agent`].
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn get_tool_definitions(&self) -> Vec<ToolDefinition>;

    /// Executes the named tool. An `Err` is reported to the model as a
    /// failed tool call; the loop continues.
    async fn execute_tool(
        &self,
        tool_name: &str,
        input: ToolInput,
        working_dir: &Path,
    ) -> anyhow::Result<String>;
}

/// Outcome of an [`Agent::run`].
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AgentOutput {
    pub applied_tool_results: Vec<ToolExecutionResult>,
    /// Content of the model's last message, the one without tool calls.
    pub final_message: Option<String>,
    pub iterations: usize,
}

/// One tool call made during a run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub input: JsonValue,
    pub output: String,
    pub status: ToolExecutionStatus,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub enum ToolExecutionStatus {
    Success,
    Failure,
}

pub struct Agent {
    config: RuntimeConfig,
    tool_provider: Arc<dyn ToolProvider>,
    http_client: Client,
}

impl Agent {
    pub fn new(config: RuntimeConfig, tool_provider: Arc<dyn ToolProvider>) -> Result<Self, AgentError> {
        if config.max_iterations == 0 {
            return Err(AgentError::config("max_iterations must be at least 1"));
        }
        let http_client = Client::builder()
            .build()
            .map_err(|e| AgentError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            tool_provider,
            http_client,
        })
    }

    /// Runs the tool loop until the model answers without tool calls.
    ///
    /// Tool calls from one response are executed in order. Argument parse
    /// failures and tool errors are fed back to the model as tool messages.
    pub async fn run(
        &self,
        mut messages: Vec<ChatMessage>,
        working_dir: &Path,
    ) -> Result<AgentOutput, AgentError> {
        info!(num_initial_messages = messages.len(), working_dir = ?working_dir, "Starting agent run.");

        if messages.is_empty() {
            return Err(AgentError::config("Cannot run agent with empty message history"));
        }

        let max_iterations = self.config.max_iterations;
        let tool_definitions = self.tool_provider.get_tool_definitions();
        let mut collected_tool_results: Vec<ToolExecutionResult> = Vec::new();

        for iteration in 1..=max_iterations {
            info!(iteration = iteration, "Starting agent iteration {}.", iteration);
            debug!(
                model = %self.config.model.model_name,
                endpoint = %self.config.model.endpoint,
                num_messages = messages.len(),
                num_tools = tool_definitions.len(),
                "Sending request to AI model."
            );
            trace!(payload = %serde_json::to_string_pretty(&messages).unwrap_or_default(), "Messages sent to API");

            let api_response = api::get_chat_completion(
                &self.http_client,
                &self.config,
                messages.clone(),
                &tool_definitions,
            )
            .await
            .map_err(|e| {
                error!(error = ?e, "API call failed during agent run.");
                AgentError::Api(e.context("API call failed during agent run"))
            })?;

            let choice = api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AgentError::Response("API response contained no choices".to_string()))?;
            let response_message = choice.message;
            trace!(message = %serde_json::to_string_pretty(&response_message).unwrap_or_default(), "Assistant message");

            messages.push(response_message.clone());

            let tool_calls = match response_message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    info!(iterations = iteration, "Received final response from AI.");
                    return Ok(AgentOutput {
                        applied_tool_results: collected_tool_results,
                        final_message: response_message.content,
                        iterations: iteration,
                    });
                }
            };

            info!(count = tool_calls.len(), "AI requested {} tool call(s).", tool_calls.len());
            for tool_call in tool_calls {
                let result = self.execute_tool_call(tool_call, working_dir).await;
                messages.push(ChatMessage::tool(result.tool_call_id.clone(), result.output.clone()));
                collected_tool_results.push(result);
            }
        }

        error!(limit = max_iterations, "Agent reached maximum iteration limit.");
        Err(AgentError::MaxIterations(max_iterations))
    }

    async fn execute_tool_call(&self, tool_call: ToolCall, working_dir: &Path) -> ToolExecutionResult {
        let tool_name = tool_call.function.name;
        let raw_arguments = tool_call.function.arguments;
        debug!(tool_call_id = %tool_call.id, tool_name = %tool_name, "Processing request for tool '{}'.", tool_name);
        trace!(arguments = %raw_arguments, "Raw tool arguments");

        let arguments: HashMap<String, JsonValue> = match parse_arguments(&raw_arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                error!(tool_call_id = %tool_call.id, tool_name = %tool_name, error = ?e, "Failed to parse arguments for tool '{}'.", tool_name);
                return ToolExecutionResult {
                    tool_call_id: tool_call.id,
                    output: format!(
                        "Error parsing arguments for tool '{}': {:#}. Arguments received: {}",
                        tool_name, e, raw_arguments
                    ),
                    tool_name,
                    input: JsonValue::String(raw_arguments),
                    status: ToolExecutionStatus::Failure,
                };
            }
        };

        let input_json = serde_json::to_value(&arguments).unwrap_or(JsonValue::Null);
        let execution = self
            .tool_provider
            .execute_tool(&tool_name, ToolInput { arguments }, working_dir)
            .await;

        let (output, status) = match execution {
            Ok(output) => {
                info!(tool_call_id = %tool_call.id, tool_name = %tool_name, "Tool '{}' executed.", tool_name);
                trace!(output = %output, "Output from tool '{}'", tool_name);
                (output, ToolExecutionStatus::Success)
            }
            Err(e) => {
                error!(tool_call_id = %tool_call.id, tool_name = %tool_name, error = ?e, "Execution failed for tool '{}'.", tool_name);
                (
                    format!("Error executing tool '{}': {:#}", tool_name, e),
                    ToolExecutionStatus::Failure,
                )
            }
        };

        ToolExecutionResult {
            tool_call_id: tool_call.id,
            tool_name,
            input: input_json,
            output,
            status,
        }
    }
}

/// Models sometimes send `""` for a tool without parameters.
fn parse_arguments(raw: &str) -> anyhow::Result<HashMap<String, JsonValue>> {
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(raw).context("Tool arguments are not a JSON object")
}
