//! # Biosafety Chat
//!
//! A thin proxy to an OpenAI-compatible completion API. Each user session
//! owns a [`Conversation`]; nothing is shared between sessions. The first
//! two messages (system prompt and greeting) are the preamble and survive
//! [`Conversation::reset`].

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::error::{LabError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The message history of one chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    preamble_len: usize,
}

impl Conversation {
    /// Start a session with the system prompt and a greeting.
    pub fn start(system_prompt: &str, greeting: &str) -> Self {
        let messages = vec![
            ChatMessage::new(Role::System, system_prompt),
            ChatMessage::new(Role::System, greeting),
        ];
        Self {
            preamble_len: messages.len(),
            messages,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::start(&config.system_prompt, &config.greeting)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages exchanged after the preamble.
    pub fn turns(&self) -> &[ChatMessage] {
        &self.messages[self.preamble_len..]
    }

    pub fn greeting(&self) -> &str {
        &self.messages[self.preamble_len - 1].content
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
    }

    /// Drop every turn, keeping the preamble.
    pub fn reset(&mut self) {
        self.messages.truncate(self.preamble_len);
    }
}

/// Something that turns a message history into the next reply.
pub trait CompletionClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Ask one question within a session.
///
/// The user's message and the reply are both appended to `conversation`.
/// On failure the conversation is left exactly as it was.
pub fn ask(
    conversation: &mut Conversation,
    client: &dyn CompletionClient,
    message: &str,
) -> Result<String> {
    let message = message.trim();
    if message.is_empty() {
        return Err(LabError::EmptyMessage);
    }

    conversation.push_user(message);
    match client.complete(conversation.messages()) {
        Ok(reply) => {
            conversation.push_assistant(reply.clone());
            Ok(reply)
        }
        Err(e) => {
            conversation.messages.pop();
            warn!("completion failed: {}", e);
            Err(e)
        }
    }
}

/// Client for Groq (or any OpenAI-compatible) chat completions.
pub struct GroqClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl GroqClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let mut client = Self::new(config.base_url.clone(), config.api_key()?, config.model.clone());
        client.timeout = Duration::from_secs(config.timeout_secs);
        Ok(client)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl CompletionClient for GroqClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };
        debug!("requesting completion with {} messages", messages.len());

        let response = ureq::post(&self.endpoint())
            .set("authorization", &format!("Bearer {}", self.api_key))
            .set("content-type", "application/json")
            .timeout(self.timeout)
            .send_json(&request)
            .map_err(|e| LabError::Completion(e.to_string()))?;

        let response: CompletionResponse = response
            .into_json()
            .map_err(|e| LabError::Completion(format!("invalid response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LabError::Completion("response contained no reply".to_string()))
    }
}
