//! Two-mode dialogue over a role-tagged transcript
//!
//! A dialogue is either speaking to the user (external) or reasoning
//! privately (internal). Every switch between the two inserts one
//! announcement and one function-role marker into the transcript, so the
//! model can always tell which state the latest turns belong to.

#[cfg(test)]
mod proptests;

use crate::error::ReasonerError;
use crate::llm::{LlmRequest, LlmService, Message, Reply, Role};
use std::sync::Arc;

/// Prefix carried by every assistant message written in monologue voice
pub const MONOLOGUE_TAG: &str = "[Internal Monologue]: ";

pub const ENTER_MONOLOGUE: &str = "enter_monologue";
pub const EXIT_MONOLOGUE: &str = "exit_monologue";

const ENTER_ANNOUNCEMENT: &str = "I am now in the internal monologue state. I won't be able to respond here, so I'll use this space to think, reflect, and plan.";
const EXIT_ANNOUNCEMENT: &str =
    "I am now entering the external dialogue state. Everything I say there will be seen.";
const ENTER_MARKER: &str = "[Entered Internal Monologue]";
const EXIT_MARKER: &str = "[Exited Internal Monologue]";

/// Whose eyes the next assistant turn is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    External,
    Internal,
}

/// Transcript, mode and the provider that completes it
pub struct Dialogue {
    llm: Arc<dyn LlmService>,
    model: String,
    messages: Vec<Message>,
    mode: Mode,
}

impl Dialogue {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmService>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            messages: Vec::new(),
            mode: Mode::External,
        }
    }

    #[must_use]
    pub fn with_system_prompt(
        llm: Arc<dyn LlmService>,
        system_prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let mut dialogue = Self::new(llm, model);
        dialogue.append(Role::System, system_prompt, None);
        dialogue
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Append a message as-is
    pub fn append(&mut self, role: Role, content: impl Into<String>, name: Option<&str>) {
        self.messages.push(Message {
            role,
            content: content.into(),
            name: name.map(str::to_string),
        });
    }

    fn append_monologue(&mut self, text: &str) {
        self.append(Role::Assistant, format!("{MONOLOGUE_TAG}{text}"), None);
    }

    /// Reply to the user.
    ///
    /// `thought` describes how to respond (for example "I'll answer with the
    /// plan I chose"), not the reply itself. Returns the model's reply, which
    /// is also appended to the transcript.
    ///
    /// # Errors
    ///
    /// Provider failures pass through as [`ReasonerError::Provider`]; a
    /// function-call reply is [`ReasonerError::UnexpectedResponse`].
    pub async fn speak_external(&mut self, thought: &str) -> Result<String, ReasonerError> {
        self.append_monologue(thought);
        if self.mode == Mode::Internal {
            self.mode = Mode::External;
            self.append_monologue(EXIT_ANNOUNCEMENT);
            self.append(Role::Function, EXIT_MARKER, Some(EXIT_MONOLOGUE));
            tracing::debug!(model = %self.model, "left internal monologue");
        }

        let request = LlmRequest::new(self.model.clone(), self.messages.clone());
        let reply = self.complete_text(&request).await?;
        self.append(Role::Assistant, reply.clone(), None);
        Ok(reply)
    }

    /// Think privately.
    ///
    /// Returns the model's continuation of the monologue with any monologue
    /// tags removed; the transcript keeps the tagged form.
    ///
    /// # Errors
    ///
    /// Same as [`Dialogue::speak_external`].
    pub async fn think_internal(&mut self, thought: &str) -> Result<String, ReasonerError> {
        if self.mode == Mode::External {
            self.mode = Mode::Internal;
            self.append_monologue(ENTER_ANNOUNCEMENT);
            self.append(Role::Function, ENTER_MARKER, Some(ENTER_MONOLOGUE));
            tracing::debug!(model = %self.model, "entered internal monologue");
        }
        self.append_monologue(thought);

        let request = LlmRequest::new(self.model.clone(), self.messages.clone()).cached();
        let reply = self.complete_text(&request).await?;
        let cleaned = reply.replace(MONOLOGUE_TAG, "");
        self.append_monologue(&cleaned);
        Ok(cleaned)
    }

    /// Issue `request` and insist on a text reply
    async fn complete_text(&self, request: &LlmRequest) -> Result<String, ReasonerError> {
        let response = self.llm.complete(request).await?;
        match response.reply {
            Reply::Text(text) => Ok(text),
            Reply::FunctionCall { .. } => Err(ReasonerError::UnexpectedResponse {
                content: response.raw_content(),
            }),
        }
    }

    pub(crate) fn llm(&self) -> &Arc<dyn LlmService> {
        &self.llm
    }
}
