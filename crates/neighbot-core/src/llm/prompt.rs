//! System prompt and conversation rendering.
//!
//! The full ordered history of a context is submitted on every turn. User
//! turns are rendered as small JSON objects so the model can tell speakers
//! and locations apart; assistant and system turns go through verbatim.

use neighbot_types::config::BotConfig;
use neighbot_types::llm::{CompletionRequest, MessageRole, PromptMessage};
use neighbot_types::message::Message;

const RULES: &str = "\
The following messages come from various users and sources. They will be formatted as JSON.

Do not mimic or use JSON formatting. Always respond as yourself and only with what you want to say.

Keep your responses short, shorter responses take less time to generate and are more chat friendly.
Keep things safe for work. No explicit content is allowed.
Use '@' before an username to reply to them directly, notifying/pinging them.";

/// Bot identity used to render the system prompt.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub bot_name: String,
    pub persona: String,
    /// Empty leaves the creator line out.
    pub creator: String,
    /// Empty leaves the appearance rule out.
    pub avatar_url: String,
}

impl PromptSettings {
    pub fn new(bot_name: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            persona: persona.into(),
            creator: String::new(),
            avatar_url: String::new(),
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = avatar_url.into();
        self
    }

    /// The system prompt: identity line, chat rules, then persona.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are {}. {RULES}", self.bot_name);
        if !self.creator.trim().is_empty() {
            prompt.push_str(&format!("\nYou have been created by '{}'.", self.creator));
        }
        if !self.avatar_url.trim().is_empty() {
            prompt.push_str(&format!(
                "\nWhen asked what you look like, respond with: {}",
                self.avatar_url
            ));
        }
        prompt.push_str(&format!(
            "\n\nFollow given persona: '{}'.\n\
             Persona should be followed as long as rules are followed. \
             You are aware of being an AI, but should try to act per given persona.",
            self.persona
        ));
        prompt
    }

    /// Build a completion request from a context's history.
    pub fn build_request(&self, history: &[Message]) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            system: Some(self.system_prompt()),
            messages: history.iter().map(render_turn).collect(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl From<&BotConfig> for PromptSettings {
    fn from(config: &BotConfig) -> Self {
        Self::new(config.name.clone(), config.persona.clone())
            .with_creator(config.creator.clone())
            .with_avatar_url(config.avatar_url.clone())
    }
}

/// Render one stored message as a prompt turn.
pub fn render_turn(message: &Message) -> PromptMessage {
    let content = match message.role {
        MessageRole::User => serde_json::json!({
            "username": message.username,
            "source": message.source,
            "role": message.role,
            "content": message.content,
            "timestamp": message.timestamp.to_rfc2822(),
        })
        .to_string(),
        MessageRole::Assistant | MessageRole::System => message.content.clone(),
    };
    PromptMessage {
        role: message.role,
        content,
    }
}
