//! Assistant tool-calling loop
//!
//! Drives the conversation: sends the transcript to the chat model,
//! dispatches any tool calls it requests, feeds the results back, and
//! repeats until the model answers with plain text.

use anyhow::{bail, Result};
use std::sync::Arc;

use gtasks_sdk::log_tool_call;

use crate::llm::{ChatMessage, ChatModel};
use crate::tools::ToolRegistry;

/// Instructions the model operates under
pub const SYSTEM_PROMPT: &str = "\
You are a helpful assistant that manages the user's tasks in Google Tasks.

When the user asks about their tasks, look them up with the available tools \
and answer from what you find. When the user wants to add a task, first check \
whether a matching task already exists; update the existing task instead of \
creating a duplicate. When the user wants to change or complete a task, find \
it first and update it by id.

If a request is ambiguous (which list, which task), ask the user to clarify \
instead of guessing.";

/// Upper bound on model round-trips for a single user message
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Sent when the model replies with neither text nor tool calls
const EMPTY_REPLY_NUDGE: &str = "Respond with a real output.";

/// One executed tool call, for display
#[derive(Debug, Clone)]
pub struct ToolCallSummary {
    pub name: String,
    pub input: String,
    pub output: String,
}

/// Final answer for one user message
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub content: String,
    pub tool_calls: Vec<ToolCallSummary>,
}

/// Conversation state plus the collaborators that drive it
pub struct Assistant {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    messages: Vec<ChatMessage>,
    max_turns: usize,
}

impl Assistant {
    /// Fresh conversation seeded with the system prompt
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self::with_transcript(model, tools, Vec::new())
    }

    /// Resume from a saved transcript; an empty transcript starts fresh
    pub fn with_transcript(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        mut messages: Vec<ChatMessage>,
    ) -> Self {
        if messages.is_empty() {
            messages.push(ChatMessage::system(SYSTEM_PROMPT));
        }
        Self {
            model,
            tools,
            messages,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Full transcript, including the system prompt
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Handle one user message and return the model's final answer
    pub async fn handle(&mut self, user_input: &str) -> Result<AssistantReply> {
        self.messages.push(ChatMessage::user(user_input));
        let mut summaries = Vec::new();

        for _ in 0..self.max_turns {
            let reply = self
                .model
                .complete(&self.messages, &self.tools.specs())
                .await?;

            if !reply.tool_calls.is_empty() {
                let calls = reply.tool_calls.clone();
                self.messages.push(reply);
                for call in calls {
                    log_tool_call!(call.function.name, call.function.arguments);

                    let params = parse_arguments(&call.function.arguments);
                    let result = self.tools.dispatch(&call.function.name, params).await;
                    let content = if result.is_error {
                        format!("Error: {}\n please fix your mistakes.", result.content)
                    } else {
                        result.content
                    };

                    summaries.push(ToolCallSummary {
                        name: call.function.name,
                        input: call.function.arguments,
                        output: content.clone(),
                    });
                    self.messages.push(ChatMessage::tool(call.id, content));
                }
                continue;
            }

            if !reply.has_content() {
                // The model produced neither text nor tool calls; nudge it.
                self.messages.push(reply);
                self.messages.push(ChatMessage::user(EMPTY_REPLY_NUDGE));
                continue;
            }

            let content = reply.content.clone().unwrap_or_default();
            self.messages.push(reply);
            return Ok(AssistantReply {
                content,
                tool_calls: summaries,
            });
        }

        bail!(
            "no final answer after {} model turns; aborting this request",
            self.max_turns
        )
    }
}

/// Model-produced arguments are a JSON string; tolerate empty and bad input
fn parse_arguments(arguments: &str) -> serde_json::Value {
    if arguments.trim().is_empty() {
        return serde_json::Value::Object(Default::default());
    }
    serde_json::from_str(arguments)
        .unwrap_or_else(|_| serde_json::Value::String(arguments.to_string()))
}
