//! Step-by-step procedure guidance
//!
//! Each user message is checked against the current step with a yes/no
//! extraction. The guide then thinks privately about what the user needs and
//! answers them, or recaps everything once the last step is done.

use crate::dialogue::Dialogue;
use crate::error::ReasonerError;
use crate::extract::{escape, FieldKind, Target};
use crate::llm::{LlmService, Role};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert experimental synthetic biologist who is well versed on the intricacies and reasons of various procedures. You will aide the user through a particular procedure, and you'll use your internal monologue to reason before responding to the user. You will use your monologue to think and respond to the user with precise responses with no wasted words.";

const RESPOND_THOUGHT: &str = "I'll respond to the user using the response I chose.";

const RECAP_THOUGHT: &str = "I need to exit the conversation because we've finished all the steps in the procedure. I want to recap all that we've done and learned to help consolidate this information to the user. Let's just think about everything we've done and we'll worry about presenting it properly later.";

const FOLLOW_UP_THOUGHT: &str = "We've already finished every step of the procedure. I should answer whatever the user is asking about what we did, without starting anything new.";

#[derive(Debug, Error)]
pub enum ProcedureError {
    #[error("failed to read procedure file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid procedure definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("procedure '{0}' has no steps")]
    NoSteps(String),
}

/// A named, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Procedure {
    /// Agarose gel electrophoresis, as run at the bench
    #[must_use]
    pub fn gel_electrophoresis() -> Self {
        let steps = [
            "(1) Add 100 mL of 1XTBE buffer from the big container next to the sink and transfer it to a flask.",
            "(2) For x% gel, weigh x g of agarose and mix (e.g., 1 g agarose for 1% gel).",
            "(3) Microwave for about 2 min. The solution should be clear afterwards.",
            "(4) Set the flask and let it cool. That doesn't mean just leave it there to harden.",
            "(5) Get the gel mold and set it on the tray. Be sure to tighten the screw but not too much. Make sure the gel mold is balanced.",
            "(6) Get the 20-lane comb and set it on the end of the gel mold at the top.",
            "(7) Once the flask is cool enough to touch (make sure the solution hasn't solidified completely), put in 10 uL of ethidium bromide and swirl around until evenly distributed.",
            "(8) Pour the solution into the mold and use pipette tips to push bubbles to the side.",
            "(9) Cover with the foil and be sure to wash the flask with water.",
            "(10) After 45 mins, for sample preparation, add 6XLoading dye to the sample (Volume of the sample:Volume of the Loading dye=4:1. e.g. 5 uL loading dye for 20 uL sample solution).",
            "(11) Load the mixed sample to the lane. Each lane can hold up to 30 uL. Run at 100-130 constant voltage for 30-45 mins.",
        ];
        Self {
            name: "gel electrophoresis".to_string(),
            steps: steps.iter().map(ToString::to_string).collect(),
            system_prompt: None,
        }
    }

    /// Parse a JSON procedure definition
    ///
    /// # Errors
    ///
    /// Returns [`ProcedureError::Parse`] for malformed JSON and
    /// [`ProcedureError::NoSteps`] when the step list is empty.
    pub fn from_json(text: &str) -> Result<Self, ProcedureError> {
        let procedure: Procedure = serde_json::from_str(text)?;
        if procedure.steps.is_empty() {
            return Err(ProcedureError::NoSteps(procedure.name));
        }
        Ok(procedure)
    }

    /// Read and parse a JSON procedure file
    ///
    /// # Errors
    ///
    /// Returns [`ProcedureError::Io`] when the file cannot be read, otherwise
    /// the same errors as [`Procedure::from_json`].
    pub fn load(path: &Path) -> Result<Self, ProcedureError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProcedureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// First thing the user "says" to start the session
    #[must_use]
    pub fn opening_message(&self) -> String {
        format!(
            "Hi! I'm trying to do the {} procedure. I haven't started anything yet though.",
            self.name
        )
    }

    /// Extraction template asking whether `step` is done
    #[must_use]
    pub fn completion_template(&self, step: &str) -> String {
        format!(
            "Has the user completed the step {} in the procedure of {}? {{answer}}",
            escape(step),
            escape(&self.name)
        )
    }
}

fn guidance_thought(step: &str) -> String {
    format!(
        "I need to guide the user to finish the step ({step}) to get to the next step in the procedure. I want to think about the current state they are in and understand deeply what they have done to help them understand what to do next. What has happened so far and if something has gone wrong what can we do to help them?"
    )
}

/// Outcome of one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Step the user message was checked against, if any was pending
    pub checked_step: Option<String>,
    pub step_completed: bool,
    /// Private reasoning, not meant for the user
    pub thought: String,
    pub reply: String,
    pub finished: bool,
}

/// Walks a user through a [`Procedure`]
pub struct ProcedureGuide {
    dialogue: Dialogue,
    procedure: Procedure,
    current: usize,
}

impl ProcedureGuide {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmService>, procedure: Procedure, model: &str) -> Self {
        let dialogue = Dialogue::with_system_prompt(llm, procedure.system_prompt(), model);
        Self {
            dialogue,
            procedure,
            current: 0,
        }
    }

    #[must_use]
    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    #[must_use]
    pub fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    /// Step the user is working on, `None` once all are done
    #[must_use]
    pub fn current_step(&self) -> Option<&str> {
        self.procedure.steps.get(self.current).map(String::as_str)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current >= self.procedure.steps.len()
    }

    /// Handle one user message
    ///
    /// # Errors
    ///
    /// Any [`ReasonerError`] from the completion check or the model calls.
    /// The user message stays in the transcript.
    pub async fn respond(&mut self, user_message: &str) -> Result<Turn, ReasonerError> {
        self.dialogue.append(Role::User, user_message, None);

        let Some(step) = self.current_step().map(str::to_string) else {
            let thought = self.dialogue.think_internal(FOLLOW_UP_THOUGHT).await?;
            let reply = self.dialogue.speak_external(RESPOND_THOUGHT).await?;
            return Ok(Turn {
                checked_step: None,
                step_completed: false,
                thought,
                reply,
                finished: true,
            });
        };

        let template = self.procedure.completion_template(&step);
        let step_completed: bool = self
            .dialogue
            .extract_as(&template, &Target::Primitive(FieldKind::Boolean))
            .await?;

        if step_completed {
            self.current += 1;
            tracing::info!(
                procedure = %self.procedure.name,
                completed = self.current,
                total = self.procedure.steps.len(),
                "step completed"
            );
        }

        let thought = match self.current_step().map(str::to_string) {
            Some(next) => self.dialogue.think_internal(&guidance_thought(&next)).await?,
            None => self.dialogue.think_internal(RECAP_THOUGHT).await?,
        };
        let reply = self.dialogue.speak_external(RESPOND_THOUGHT).await?;

        Ok(Turn {
            checked_step: Some(step),
            step_completed,
            thought,
            reply,
            finished: self.is_finished(),
        })
    }
}
