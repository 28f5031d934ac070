//! End-to-end scenarios against the built-in rule book.

use parley_common::builtin::{default_dispatcher, default_rule_book};
use parley_common::dispatch::{Computation, Dispatcher, FunctionalKeyword};
use parley_common::priority::PriorityClassifier;
use parley_common::rulebook::{CompiledRules, RawPatternRule};
use parley_common::{weighted, TemplateSelector};

fn builtin_rules() -> CompiledRules {
    default_rule_book()
        .expect("built-in rule book parses")
        .compile()
        .expect("built-in rule book compiles")
}

#[test]
fn test_computer_category() {
    let rules = builtin_rules();
    let result = rules.categories.classify_default("My computer is running slow");
    assert_eq!(result.name(), "computer");
}

#[test]
fn test_blank_input_is_unknown() {
    let rules = builtin_rules();
    assert!(rules.categories.classify_default("").is_unknown());
    assert!(rules.categories.classify_default("   ").is_unknown());
    assert!(rules.patterns.classify_all("").is_empty());
    assert!(rules.patterns.classify_all("   ").is_empty());
    assert!(weighted::classify("   ", &rules.weighted).is_empty());
}

#[test]
fn test_hello_reply_membership() {
    let rules = builtin_rules();
    for _ in 0..20 {
        let reply = rules.bot.get_response("hello");
        assert!(
            ["Hello!", "Hi there!", "Hey!"].contains(&reply.response.as_str()),
            "unexpected reply {:?}",
            reply.response
        );
    }
}

#[test]
fn test_priority_patterns_scenario() {
    let pattern = r"\b(test|testing)\b".to_string();
    let raw = |category: &str, priority: Option<i32>| RawPatternRule {
        pattern: pattern.clone(),
        category: category.to_string(),
        priority,
    };
    let classifier = PriorityClassifier::compile(&[
        raw("high", Some(2)),
        raw("medium", Some(1)),
        raw("low", Some(0)),
        raw("default", None),
    ])
    .unwrap();

    assert_eq!(
        classifier.classify_all("testing 123"),
        vec!["high", "medium", "low", "default"]
    );
}

#[test]
fn test_functional_keyword_scenario() {
    let dispatcher = Dispatcher::new(
        vec![
            FunctionalKeyword::new("math", 5, Computation::Arithmetic).into(),
            FunctionalKeyword::new("no", 1, Computation::Template("Are you sure, (0) ?".to_string())).into(),
        ],
        vec!["Go on.".to_string()],
    )
    .unwrap();

    let reply = dispatcher.respond("no one understands me");
    assert_eq!(reply.reply, "Are you sure, no one understands me ?");

    // a failing computation in another keyword is a reply, not a panic
    let reply = dispatcher.respond("math one plus ( two");
    assert!(reply.reply.starts_with("Error: "));
}

#[test]
fn test_capture_substitution_round_trip() {
    let rules = default_rule_book()
        .unwrap()
        .compile_with(TemplateSelector::Fixed { index: 0 })
        .unwrap();
    let reply = rules.bot.get_response("I am feeling happy");
    assert_eq!(reply.response, "Why do you say you are feeling happy?");
    assert_eq!(reply.details.decomposition.as_deref(), Some("i am *"));
}

#[test]
fn test_builtin_dispatcher_routes_by_priority() {
    let rules = default_rule_book()
        .unwrap()
        .compile_with(TemplateSelector::Fixed { index: 0 })
        .unwrap();
    let dispatcher = default_dispatcher(&rules);

    assert_eq!(dispatcher.respond("math 2 + 2").reply, "4");
    assert_eq!(
        dispatcher.respond("my computer is making noises").reply,
        "Why do you say your computer is making noises?"
    );
    assert!(dispatcher.respond("the sky").fallback);
}

#[test]
fn test_details_list_alternatives() {
    let rules = builtin_rules();
    let reply = rules.bot.get_response("I am sorry about my computer");
    let words: Vec<&str> = reply
        .details
        .matched_keywords
        .iter()
        .map(|k| k.word.as_str())
        .collect();
    assert_eq!(words, vec!["computer", "i am", "sorry"]);
    assert!(!reply.details.alternatives.is_empty());

    let json = serde_json::to_value(&reply.details).unwrap();
    assert_eq!(json["matched_keywords"][0]["priority"], 5);
}

#[test]
fn test_weighted_top_two() {
    let rules = builtin_rules();
    let top = weighted::classify_top("my laptop wifi keeps dropping", &rules.weighted, 2);
    assert_eq!(top.len(), 2);
    assert!(top.contains(&"computer".to_string()));
    assert!(top.contains(&"network".to_string()));
}
