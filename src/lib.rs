//! Procedure Guide - LLM-driven walkthroughs of multi-step procedures
//!
//! A dialogue keeps a role-tagged transcript and switches between private
//! reasoning and user-visible speech. Structured values are pulled out of the
//! conversation by forcing the model to call a single `remember_<field>`
//! function.

pub mod dialogue;
pub mod error;
pub mod extract;
pub mod llm;
pub mod procedure;

pub use dialogue::{Dialogue, Mode};
pub use error::ReasonerError;
pub use extract::{EnumSchema, FieldKind, FieldSchema, RecordSchema, Target};
pub use procedure::{Procedure, ProcedureGuide, Turn};
