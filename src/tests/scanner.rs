use crate::parser::scanner::{span_text, tokenize, TokenKind};

#[test]
fn scans_declaration_tokens() {
    let tokens = tokenize("uint256 count = 5;");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Operator,
            TokenKind::Number,
            TokenKind::Punctuation,
        ]
    );
    assert_eq!(tokens[0].text, "uint256");
    assert_eq!(tokens[3].text, "5");
}

#[test]
fn classifies_keywords() {
    let tokens = tokenize("contract Foo");
    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn keeps_comment_text() {
    let tokens = tokenize("// plain\n/// documented\nuint x;");
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].text, "plain");
    assert_eq!(tokens[1].kind, TokenKind::DocComment);
    assert_eq!(tokens[1].text, "documented");
}

#[test]
fn block_comment_shields_punctuation() {
    let tokens = tokenize("/* a { b } */ x");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].text, "a { b }");
    assert_eq!(tokens[1].text, "x");
}

#[test]
fn string_literal_shields_punctuation() {
    let tokens = tokenize("x = \");\";");
    assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[2].text, ");");
    assert_eq!(tokens[3].text, ";");
}

#[test]
fn string_literal_keeps_escapes() {
    let tokens = tokenize(r#""a\"b""#);
    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].text, "a\\\"b");
}

#[test]
fn maximal_munch_operators() {
    let tokens = tokenize("a >= b >> 2 ** 3");
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["a", ">=", "b", ">>", "2", "**", "3"]);
}

#[test]
fn hex_literals() {
    let tokens = tokenize("0xDEADbeef");
    assert_eq!(tokens[0].kind, TokenKind::HexNumber);
    assert_eq!(tokens[0].text, "0xDEADbeef");
}

#[test]
fn invalid_characters_do_not_fail() {
    let tokens = tokenize("uint @ x");
    assert_eq!(tokens[1].kind, TokenKind::Invalid);
    assert_eq!(tokens[2].text, "x");
}

#[test]
fn tracks_lines() {
    let tokens = tokenize("a\nb");
    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[1].line, 2);
    assert_eq!(tokens[1].column, 1);
}

#[test]
fn scanning_is_deterministic() {
    let source = "contract C { uint256 a; /* note */ }";
    assert_eq!(tokenize(source), tokenize(source));
}

#[test]
fn span_text_reconstructs_source() {
    let tokens = tokenize("msg.sender == address(0)");
    assert_eq!(span_text(&tokens), "msg.sender == address(0)");
}
