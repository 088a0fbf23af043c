//! Sequences of edit intents against one document
//!
//! This tests:
//! - Repeated backspace across chips, directives and multibyte text
//! - Typing around chips
//! - Insert, delete, toggle and reconcile chains

use stencil_editor::{
    BufferPosition, EditController, EditIntent, EditOutcome, EditSession, EditorConfig, NoopHost,
    Token, VariableDescriptor, ViewMode,
};
use stencil_editor::{end_position, Document};
use stencil_parser::Tokenizer;

fn backspace_until_empty(source: &str) -> Vec<String> {
    let tokenizer = Tokenizer::default();
    let mut doc = Document::from_source(source, &tokenizer);
    let mut controller = EditController::new(ViewMode::Live, tokenizer);
    let mut cursor = end_position(doc.tokens(), ViewMode::Live);
    let mut states = vec![doc.source()];

    loop {
        match controller
            .apply(&mut doc, EditIntent::DeleteBackward { position: cursor })
            .unwrap()
        {
            EditOutcome::Edited { cursor: next } => {
                cursor = next;
                states.push(doc.source());
            }
            _ => break,
        }
    }
    states
}

#[test]
fn test_backspace_through_mixed_document() {
    let states = backspace_until_empty("ab{{ x }}é{% if a %}{{ y }}");
    assert_eq!(
        states,
        vec![
            "ab{{ x }}é{% if a %}{{ y }}",
            "ab{{ x }}é{% if a %}",
            "ab{{ x }}{% if a %}",
            "ab{% if a %}",
            "a{% if a %}",
            "{% if a %}",
        ]
    );
}

#[test]
fn test_backspace_never_truncates_expressions() {
    let states = backspace_until_empty("{{ customer.first_name }}{{ order.name }}");
    assert_eq!(
        states,
        vec![
            "{{ customer.first_name }}{{ order.name }}",
            "{{ customer.first_name }}",
            "",
        ]
    );
}

#[test]
fn test_type_around_chip_then_delete_it() {
    let tokenizer = Tokenizer::default();
    let mut doc = Document::from_source("{{ name }}", &tokenizer);
    let mut controller = EditController::new(ViewMode::Live, tokenizer);

    let typed = |controller: &mut EditController, doc: &mut Document, position, text: &str| {
        match controller
            .apply(
                doc,
                EditIntent::Insert {
                    position,
                    text: text.to_string(),
                },
            )
            .unwrap()
        {
            EditOutcome::Edited { cursor } => cursor,
            other => panic!("unexpected outcome {:?}", other),
        }
    };

    typed(&mut controller, &mut doc, BufferPosition::BeforeChip { token: 0 }, "Hi ");
    let cursor = typed(&mut controller, &mut doc, BufferPosition::AfterChip { token: 1 }, "!");
    assert_eq!(doc.source(), "Hi {{ name }}!");
    assert_eq!(cursor, BufferPosition::text(2, 1));

    controller
        .apply(&mut doc, EditIntent::DeleteBackward { position: BufferPosition::text(2, 0) })
        .unwrap();
    assert_eq!(doc.tokens(), &[Token::literal("Hi "), Token::literal("!")]);
}

#[test]
fn test_insert_delete_toggle_chain() {
    let mut session = EditSession::new("Total: ", EditorConfig::default(), NoopHost);
    let cursor = session.toggle_mode(BufferPosition::text(0, 7));
    assert_eq!(cursor, BufferPosition::text(0, 7));

    let price = VariableDescriptor::new("product.price", "");
    let cursor = session.insert_variable_at(&price, cursor).unwrap();
    assert_eq!(session.raw(), "Total: {{ product.price }}\u{a0}");

    // Backspace eats the spacing unit, then the chip
    let EditOutcome::Edited { cursor } = session
        .apply_edit(EditIntent::DeleteBackward { position: cursor })
        .unwrap()
    else {
        panic!("expected an edit");
    };
    assert_eq!(session.raw(), "Total: {{ product.price }}");

    session
        .apply_edit(EditIntent::DeleteBackward { position: cursor })
        .unwrap();
    assert_eq!(session.raw(), "Total: ");

    let cursor = session.toggle_mode(end_position(session.tokens(), ViewMode::Live));
    assert_eq!(session.mode(), ViewMode::Raw);
    assert_eq!(session.raw(), "Total: ");
    assert_eq!(cursor, BufferPosition::text(0, 7));
}

#[test]
fn test_toggle_cleans_artifacts_left_by_live_editing() {
    let mut session = EditSession::new("", EditorConfig::default(), NoopHost);
    session.toggle_mode(BufferPosition::Boundary { token: 0 });
    session
        .insert_variable(&VariableDescriptor::new("a", ""))
        .unwrap();
    assert_eq!(session.raw(), "{{ a }}\u{a0}");

    session.toggle_mode(BufferPosition::Boundary { token: 0 });
    assert_eq!(session.raw(), "{{ a }} ");
}
