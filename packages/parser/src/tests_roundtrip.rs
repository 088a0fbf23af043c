//! Losslessness of the tokenizer over arbitrary and template-heavy input

use crate::*;
use proptest::prelude::*;

/// Strings built from fragments that exercise delimiter edge cases
fn template_soup() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("{{".to_string()),
        Just("}}".to_string()),
        Just("{%".to_string()),
        Just("%}".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("%".to_string()),
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("<p>".to_string()),
        Just("ü".to_string()),
        "[a-z.]{1,4}",
    ];
    prop::collection::vec(fragment, 0..24).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_serialize_inverts_tokenize(source in template_soup()) {
        prop_assert_eq!(serialize(&tokenize(&source)), source);
    }

    #[test]
    fn prop_serialize_inverts_tokenize_any_text(source in any::<String>()) {
        prop_assert_eq!(serialize(&tokenize(&source)), source);
    }

    #[test]
    fn prop_no_empty_tokens(source in template_soup()) {
        prop_assert!(tokenize(&source).iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn prop_delimited_tokens_are_well_formed(source in template_soup()) {
        for token in tokenize(&source) {
            match token {
                Token::Output { raw, .. } => {
                    prop_assert!(raw.starts_with("{{") && raw.ends_with("}}") && raw.len() >= 4);
                }
                Token::Logic { raw, .. } => {
                    prop_assert!(raw.starts_with("{%") && raw.ends_with("%}") && raw.len() >= 4, "malformed logic token: {:?}", raw);
                }
                Token::Literal { .. } => {}
            }
        }
    }
}

#[test]
fn test_roundtrip_fixed_cases() {
    let sources = vec![
        "",
        "{{ name }}",
        "{{a}}{{b}}",
        "{% if a %}X{% endif %}",
        "{{",
        "}}",
        "{%}",
        "{{%}}",
        "{%}}%}",
        "a{b}c%d",
        "<p>{{ x }}</p>\n{% for i in items %}\n  <li>{{ i }}</li>\n{% endfor %}",
    ];

    for source in sources {
        assert_eq!(serialize(&tokenize(source)), source, "Roundtrip failed for {:?}", source);
    }
}

#[test]
fn test_ambiguous_openers() {
    // `{%}}%}`: the directive opener is closed by the first `%}`
    let tokens = tokenize("{%}}%}");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_logic());

    // `{{%}}`: placeholder opener wins at position 0
    let tokens = tokenize("{{%}}");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_output());
}
