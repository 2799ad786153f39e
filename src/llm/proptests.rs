//! Property-based tests for the provider translation layer
//!
//! - transcript translation keeps order, roles, names and content
//! - a forced function always appears as the only offered function
//! - any JSON object survives argument decoding

use super::openai::{parse_arguments, OpenAIService};
use super::types::{FunctionDefinition, LlmRequest, Message, Role};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::System),
        Just(Role::User),
        Just(Role::Assistant),
        Just(Role::Function),
    ]
}

fn arb_message() -> impl Strategy<Value = Message> {
    (arb_role(), "[a-zA-Z0-9 _.!?,:\\[\\]]{0,80}", "[a-z_]{3,16}").prop_map(
        |(role, content, name)| match role {
            Role::Function => Message::function(name, content),
            other => Message::new(other, content),
        },
    )
}

fn arb_json_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,30}".prop_map(Value::String),
        proptest::collection::vec("[a-z]{0,8}".prop_map(Value::String), 0..4).prop_map(Value::Array),
    ]
}

fn arb_arguments() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::hash_map("[a-z_]{1,10}", arb_json_value(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_translation_preserves_transcript(messages in proptest::collection::vec(arb_message(), 0..12)) {
        let request = LlmRequest::new("test-model", messages.clone());
        let body = serde_json::to_value(OpenAIService::translate_request(&request)).unwrap();
        let wire = body["messages"].as_array().unwrap();

        prop_assert_eq!(wire.len(), messages.len());
        for (sent, original) in wire.iter().zip(&messages) {
            prop_assert_eq!(sent["role"].as_str(), Some(original.role.as_str()));
            prop_assert_eq!(sent["content"].as_str(), Some(original.content.as_str()));
            prop_assert_eq!(sent.get("name").and_then(Value::as_str), original.name.as_deref());
        }
    }

    #[test]
    fn prop_forced_function_is_only_option(name in "remember_[a-z_]{1,12}", cache in any::<bool>()) {
        let mut request = LlmRequest::new("test-model", vec![Message::user("hi")]).forcing(FunctionDefinition {
            name: name.clone(),
            description: "stores a value".to_string(),
            parameters: serde_json::json!({"type": "object"}),
        });
        request.cache = cache;
        let body = serde_json::to_value(OpenAIService::translate_request(&request)).unwrap();

        prop_assert_eq!(body["functions"].as_array().map(Vec::len), Some(1));
        prop_assert_eq!(body["functions"][0]["name"].as_str(), Some(name.as_str()));
        prop_assert_eq!(body["function_call"]["name"].as_str(), Some(name.as_str()));
        // The cache hint is local; it never reaches the wire
        prop_assert!(body.get("cache").is_none());
    }

    #[test]
    fn prop_arguments_round_trip(arguments in arb_arguments()) {
        let raw = Value::Object(arguments.clone()).to_string();
        prop_assert_eq!(parse_arguments(&raw).unwrap(), arguments);
    }
}
