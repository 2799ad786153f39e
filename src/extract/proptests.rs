//! Property-based tests for templates and extraction
//!
//! - one named placeholder always parses and renders the value in place
//! - any other placeholder count is rejected before the provider is called
//! - escaped text never introduces placeholders

use super::*;
use crate::llm::testing::MockLlmService;
use crate::llm::Message;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

/// Literal text without braces
fn arb_literal() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,?!()%-]{0,40}"
}

fn arb_field() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn prop_single_placeholder_renders_in_place(
        prefix in arb_literal(),
        field in arb_field(),
        suffix in arb_literal(),
        value in "[a-zA-Z0-9 ]{0,20}",
    ) {
        let source = format!("{prefix}{{{field}}}{suffix}");
        let template = Template::parse(&source).unwrap();
        prop_assert_eq!(template.field(), field.as_str());
        prop_assert_eq!(template.render(&value), format!("{prefix}{value}{suffix}"));
    }

    #[test]
    fn prop_escaped_text_has_no_placeholders(text in ".{0,60}") {
        prop_assert_eq!(Template::parse(&escape(&text)), Err(TemplateError::PlaceholderCount(0)));

        let template = Template::parse(&format!("{}{{x}}", escape(&text))).unwrap();
        prop_assert_eq!(template.render("v"), format!("{text}v"));
    }

    #[test]
    fn prop_wrong_placeholder_count_never_calls_provider(
        fields in proptest::collection::vec(arb_field(), 0..5),
        glue in arb_literal(),
    ) {
        prop_assume!(fields.len() != 1);
        let source = fields
            .iter()
            .map(|f| format!("{{{f}}}"))
            .collect::<Vec<_>>()
            .join(&glue);

        let mock = Arc::new(MockLlmService::new());
        let mut dialogue = Dialogue::new(mock.clone(), "test-model");
        let result = block_on(dialogue.extract(&source, &Target::Primitive(FieldKind::String)));

        prop_assert!(matches!(result, Err(ReasonerError::Usage(TemplateError::PlaceholderCount(n))) if n == fields.len()));
        prop_assert!(mock.recorded_requests().is_empty());
        prop_assert!(dialogue.messages().is_empty());
    }

    #[test]
    fn prop_extracted_integer_is_recorded(
        field in arb_field(),
        n in -10_000i64..10_000,
    ) {
        let mock = Arc::new(MockLlmService::new());
        let mut arguments = serde_json::Map::new();
        arguments.insert(field.clone(), json!(n));
        mock.queue_call(&function_name(&field), serde_json::Value::Object(arguments));
        let mut dialogue = Dialogue::new(mock.clone(), "test-model");

        let source = format!("Value is {{{field}}}.");
        let value = block_on(dialogue.extract(&source, &Target::Primitive(FieldKind::Integer))).unwrap();

        prop_assert_eq!(value, json!(n));
        prop_assert_eq!(
            dialogue.messages().last().unwrap(),
            &Message::function(function_name(&field), format!("Stored information: \"Value is {n}.\""))
        );
        let requests = mock.recorded_requests();
        prop_assert_eq!(requests.len(), 1);
        prop_assert_eq!(requests[0].function_call.clone(), Some(function_name(&field)));
    }
}
