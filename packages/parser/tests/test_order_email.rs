use stencil_parser::{serialize, tokenize, LogicRole, Token};

const ORDER_EMAIL: &str = include_str!("fixtures_order_email.liquid");

fn count_role(tokens: &[Token], role: LogicRole) -> usize {
    tokens.iter().filter(|t| t.role() == Some(role)).count()
}

#[test]
fn test_order_email_roundtrips() {
    let tokens = tokenize(ORDER_EMAIL);
    assert_eq!(serialize(&tokens), ORDER_EMAIL);
}

#[test]
fn test_order_email_block_balance() {
    let tokens = tokenize(ORDER_EMAIL);

    let opening = count_role(&tokens, LogicRole::Opening);
    let closing = count_role(&tokens, LogicRole::Closing);
    assert_eq!(opening, closing, "Every opened block should be closed");
    assert_eq!(opening, 13);
}

#[test]
fn test_order_email_placeholders() {
    let tokens = tokenize(ORDER_EMAIL);

    let expressions: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Output { expression, .. } => Some(expression.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(
        expressions,
        vec![
            "customer.first_name",
            "delivery_instructions",
            "consolidated_estimated_delivery_time",
            "consolidated_estimated_delivery_time",
        ]
    );
}

#[test]
fn test_order_email_standalone_directives() {
    let tokens = tokenize(ORDER_EMAIL);

    let standalone: Vec<&str> = tokens
        .iter()
        .filter(|t| t.role() == Some(LogicRole::Standalone))
        .map(|t| t.source())
        .collect();

    assert!(standalone.contains(&"{% break %}"));
    assert!(standalone.contains(&"{% when 'local' %}"));
    assert!(standalone.contains(&"{% elsif gift_card_line_items.first %}"));
    assert_eq!(standalone.iter().filter(|s| s.contains("assign")).count(), 3);
}
