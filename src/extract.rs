//! Structured extraction through a forced function call
//!
//! The model is offered exactly one function, `remember_<field>`, whose
//! parameters describe the value wanted, and is forced to call it. The call's
//! arguments are the extracted value; the filled-in template is written back
//! into the transcript as a function message so later turns can see what was
//! stored.

mod schema;
mod template;

#[cfg(test)]
mod proptests;

pub use schema::{
    single_field_schema, EnumSchema, FieldKind, FieldSchema, RecordSchema, Target,
    SINGLE_FIELD_TITLE,
};
pub use template::{escape, Template, TemplateError};

use crate::dialogue::Dialogue;
use crate::error::ReasonerError;
use crate::llm::{FunctionDefinition, LlmRequest, Reply, Role};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Name of the function offered for `field`
#[must_use]
pub fn function_name(field: &str) -> String {
    format!("remember_{field}")
}

/// Function definition offered to the model for `template` and `target`
#[must_use]
pub fn remember_function(template: &Template, target: &Target) -> FunctionDefinition {
    FunctionDefinition {
        name: function_name(template.field()),
        description: format!(
            "This function stores a piece of information in the format: '{}'.",
            template.source()
        ),
        parameters: target.parameters(template.field()),
    }
}

/// Text substituted into the template for an extracted value
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pick the value out of the function arguments.
///
/// Record targets take the whole argument object. Primitive targets take the
/// expected field and otherwise fall back to the last pair in the order the
/// provider sent them, since schema-guided generation is not reliable about
/// key naming.
fn decode_arguments(
    field: &str,
    target: &Target,
    mut arguments: Map<String, Value>,
) -> Result<Value, ReasonerError> {
    match target {
        Target::Record(_) => Ok(Value::Object(arguments)),
        Target::Primitive(_) => {
            if let Some(value) = arguments.remove(field) {
                return Ok(value);
            }
            match arguments.into_iter().next_back() {
                Some((key, value)) => {
                    tracing::warn!(
                        expected = %field,
                        actual = %key,
                        "function argument named differently than requested, using it anyway"
                    );
                    Ok(value)
                }
                None => Err(ReasonerError::MissingArgument {
                    field: field.to_string(),
                }),
            }
        }
    }
}

impl Dialogue {
    /// Extract one piece of information in the shape of `target`.
    ///
    /// `template` must contain exactly one named placeholder; it names the
    /// value and is rendered with it into a `Stored information: "..."`
    /// function message appended to the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError::Usage`] for a malformed template before any
    /// provider call, [`ReasonerError::Provider`] when the completion fails,
    /// [`ReasonerError::UnexpectedResponse`] when the model answers with text,
    /// and [`ReasonerError::MissingArgument`] when the call carries no value.
    pub async fn extract(&mut self, template: &str, target: &Target) -> Result<Value, ReasonerError> {
        let template = Template::parse(template)?;
        let function = remember_function(&template, target);

        let request =
            LlmRequest::new(self.model(), self.messages().to_vec()).forcing(function).cached();
        let response = self.llm().complete(&request).await?;

        let (name, arguments) = match response.reply {
            Reply::FunctionCall { name, arguments } => (name, arguments),
            Reply::Text(content) => return Err(ReasonerError::UnexpectedResponse { content }),
        };

        let value = decode_arguments(template.field(), target, arguments)?;

        let info = template.render(&display_value(&value));
        tracing::info!(
            function = %name,
            target = %target.label(),
            info = %info,
            "stored extracted information"
        );
        self.append(Role::Function, format!("Stored information: \"{info}\""), Some(&name));

        Ok(value)
    }

    /// [`Dialogue::extract`] decoded into `T`
    ///
    /// # Errors
    ///
    /// Everything [`Dialogue::extract`] returns, plus
    /// [`ReasonerError::Decode`] when the value does not fit `T`. The
    /// transcript note is already recorded in that case.
    pub async fn extract_as<T: DeserializeOwned>(
        &mut self,
        template: &str,
        target: &Target,
    ) -> Result<T, ReasonerError> {
        let value = self.extract(template, target).await?;
        Ok(serde_json::from_value(value)?)
    }
}
