//! Common types for LLM interactions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// LLM request
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub functions: Vec<FunctionDefinition>,
    /// Name of the function the model is forced to call, if any
    pub function_call: Option<String>,
    /// Whether a previously seen identical request may be answered from cache
    pub cache: bool,
}

impl LlmRequest {
    /// Plain completion over a transcript
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            functions: vec![],
            function_call: None,
            cache: false,
        }
    }

    #[must_use]
    pub fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Offer a single function and force the model to call it
    #[must_use]
    pub fn forcing(mut self, function: FunctionDefinition) -> Self {
        self.function_call = Some(function.name.clone());
        self.functions = vec![function];
        self
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }
}

/// Message in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Function or event name, only meaningful for function-role messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

/// Function the model may call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// What the model produced
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    FunctionCall {
        name: String,
        arguments: Map<String, Value>,
    },
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub reply: Reply,
    pub usage: Usage,
}

impl LlmResponse {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            usage: Usage::default(),
        }
    }

    #[must_use]
    pub fn function_call(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            reply: Reply::FunctionCall {
                name: name.into(),
                arguments,
            },
            usage: Usage::default(),
        }
    }

    /// Raw content for diagnostics, whatever the reply kind
    #[must_use]
    pub fn raw_content(&self) -> String {
        match &self.reply {
            Reply::Text(text) => text.clone(),
            Reply::FunctionCall { name, arguments } => {
                format!("{name}({})", Value::Object(arguments.clone()))
            }
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0
    }
}
