//! Integration tests for the tokenizer.

use thicket_common::ParseErrorList;
use thicket_html::{Characters, Cursor, Fault, TextContent, Token, TokenKind, Tokenizer};

/// Helper to tokenize a string and return owned copies of the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input);
    drain(&mut tokenizer)
}

/// Helper to build a tokenizer that records diagnostics
fn tracking(input: &str) -> Tokenizer {
    Tokenizer::with_errors(Cursor::new(input), ParseErrorList::tracking(64))
}

fn drain(tokenizer: &mut Tokenizer) -> Vec<Token> {
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.read().expect("no fault");
        let done = token.is_eof();
        tokens.push(token.clone());
        tokenizer.recycle(token);
        if done {
            return tokens;
        }
    }
}

fn text(data: &str) -> Token {
    Token::Characters(Characters {
        data: data.to_owned(),
        cdata: false,
    })
}

fn messages(tokenizer: &Tokenizer) -> Vec<String> {
    tokenizer
        .errors()
        .iter()
        .map(|error| error.message.clone())
        .collect()
}

#[test]
fn test_plain_text_is_one_run() {
    let tokens = tokenize("Hello, world");
    assert_eq!(tokens, vec![text("Hello, world"), Token::EndOfInput]);
}

#[test]
fn test_references_coalesce_into_the_run() {
    let tokens = tokenize("Hi &amp; bye &#x41;&#66;");
    assert_eq!(tokens, vec![text("Hi & bye AB"), Token::EndOfInput]);
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    let Token::Doctype(doctype) = &tokens[0] else {
        panic!("Expected DOCTYPE token, got {}", tokens[0]);
    };
    assert_eq!(doctype.name.as_deref(), Some("html"));
    assert!(!doctype.force_quirks);
    assert!(doctype.public_identifier.is_none());
}

#[test]
fn test_doctype_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    let Token::Doctype(doctype) = &tokens[0] else {
        panic!("Expected DOCTYPE token");
    };
    assert_eq!(
        doctype.public_identifier.as_deref(),
        Some("-//W3C//DTD HTML 4.01//EN")
    );
    assert_eq!(
        doctype.system_identifier.as_deref(),
        Some("http://www.w3.org/TR/html4/strict.dtd")
    );
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize(r#"<DIV id=main class="a b" data-x='y' hidden>"#);
    let Token::StartTag(tag) = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(tag.name, "DIV");
    assert_eq!(tag.normal_name(), "div");
    assert!(!tag.self_closing);
    assert_eq!(tag.attributes.len(), 4);
    assert_eq!(tag.attributes.get("id"), Some("main"));
    assert_eq!(tag.attributes.get("class"), Some("a b"));
    assert_eq!(tag.attributes.get("data-x"), Some("y"));
    assert_eq!(tag.attributes.get("hidden"), Some(""));
}

#[test]
fn test_duplicate_attribute_is_dropped() {
    let mut tokenizer = tracking(r#"<p a="1" a="2">"#);
    let tokens = drain(&mut tokenizer);
    let Token::StartTag(tag) = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(tag.attributes.len(), 1);
    assert_eq!(tag.attributes.get("a"), Some("1"));
    assert!(
        messages(&tokenizer)
            .iter()
            .any(|message| message.contains("duplicate attribute [a]"))
    );
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</span>");
    assert_eq!(tokens[0].kind(), TokenKind::EndTag);
    assert!(tokens[0].is_end_tag_named("span"));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->after");
    let Token::Comment(comment) = &tokens[0] else {
        panic!("Expected Comment token");
    };
    assert_eq!(comment.data, " hello ");
    assert!(!comment.bogus);
    assert_eq!(tokens[1], text("after"));
}

#[test]
fn test_bogus_comments_keep_their_opener() {
    let tokens = tokenize(r#"<?xml version="1.0"?><!ENTITY x>"#);
    let Token::Comment(pi) = &tokens[0] else {
        panic!("Expected Comment token");
    };
    assert!(pi.bogus);
    assert_eq!(pi.data, r#"?xml version="1.0"?"#);
    let Token::Comment(declaration) = &tokens[1] else {
        panic!("Expected Comment token");
    };
    assert!(declaration.bogus);
    assert_eq!(declaration.data, "!ENTITY x");
}

#[test]
fn test_cdata_is_a_separate_run() {
    let tokens = tokenize("a<![CDATA[x<y & z]]>b");
    assert_eq!(
        tokens,
        vec![
            text("a"),
            Token::Characters(Characters {
                data: "x<y & z".to_owned(),
                cdata: true,
            }),
            text("b"),
            Token::EndOfInput,
        ]
    );
}

#[test]
fn test_numeric_reference_replacements() {
    let tokens = tokenize("&#0;&#x80;&#xD800;&#x110000;");
    assert_eq!(
        tokens[0],
        text("\u{FFFD}\u{20AC}\u{FFFD}\u{FFFD}")
    );
}

#[test]
fn test_attribute_legacy_reference_rules() {
    let tokens = tokenize(r#"<a href="?a=1&amp=2&copy">"#);
    let Token::StartTag(tag) = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(tag.attributes.get("href"), Some("?a=1&amp=2\u{a9}"));
}

#[test]
fn test_missing_semicolon_decodes_with_diagnostic() {
    let mut tokenizer = tracking("&amp done");
    let tokens = drain(&mut tokenizer);
    assert_eq!(tokens[0], text("& done"));
    assert_eq!(tokenizer.errors().len(), 1);
}

#[test]
fn test_unknown_reference_stays_literal() {
    let tokens = tokenize("&bogus; &");
    assert_eq!(tokens[0], text("&bogus; &"));
}

#[test]
fn test_script_data_after_transition() {
    let mut tokenizer = Tokenizer::new("<script>if (a<b) { x = '</p>'; }</script>done");
    let token = tokenizer.read().expect("no fault");
    assert!(token.is_start_tag_named("script"));
    tokenizer.recycle(token);
    tokenizer.enter_text_content(TextContent::ScriptData);

    let rest = drain(&mut tokenizer);
    assert_eq!(rest[0], text("if (a<b) { x = '</p>'; }"));
    assert!(rest[1].is_end_tag_named("script"));
    assert_eq!(rest[2], text("done"));
}

#[test]
fn test_script_data_less_than_sign_variants() {
    let mut tokenizer = Tokenizer::new("<script>a<b<!--c-->d</x></script>");
    let token = tokenizer.read().expect("no fault");
    tokenizer.recycle(token);
    tokenizer.enter_text_content(TextContent::ScriptData);

    let rest = drain(&mut tokenizer);
    assert_eq!(rest[0], text("a<b<!--c-->d</x>"));
    assert!(rest[1].is_end_tag_named("script"));
    assert!(rest[2].is_eof());
}

#[test]
fn test_rcdata_decodes_references_but_not_tags() {
    let mut tokenizer = Tokenizer::new("<title>a &lt; <b>b</b></title>");
    let token = tokenizer.read().expect("no fault");
    tokenizer.recycle(token);
    tokenizer.enter_text_content(TextContent::Rcdata);

    let rest = drain(&mut tokenizer);
    assert_eq!(rest[0], text("a < <b>b</b>"));
    assert!(rest[1].is_end_tag_named("title"));
}

#[test]
fn test_self_closing_not_acknowledged_reports_once() {
    let mut tokenizer = tracking("<div/>text<p>");
    let tokens = drain(&mut tokenizer);
    let Token::StartTag(tag) = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert!(tag.self_closing);
    let unacknowledged = messages(&tokenizer)
        .iter()
        .filter(|message| message.contains("self-closing flag not acknowledged"))
        .count();
    assert_eq!(unacknowledged, 1);
    assert_eq!(tokens.last(), Some(&Token::EndOfInput));
}

#[test]
fn test_acknowledged_self_closing_is_silent() {
    let mut tokenizer = tracking("<br/>x");
    let token = tokenizer.read().expect("no fault");
    tokenizer.recycle(token);
    tokenizer.acknowledge_self_closing();
    let _ = drain(&mut tokenizer);
    assert!(tokenizer.errors().is_empty());
}

#[test]
fn test_read_without_recycle_is_a_fault() {
    let mut tokenizer = Tokenizer::new("<p>x");
    let token = tokenizer.read().expect("no fault");
    assert_eq!(tokenizer.read(), Err(Fault::TokenNotReturned));
    tokenizer.recycle(token);
    assert!(tokenizer.read().is_ok());
}

#[test]
fn test_end_of_input_repeats() {
    let mut tokenizer = Tokenizer::new("");
    for _ in 0..3 {
        let token = tokenizer.read().expect("no fault");
        assert!(token.is_eof());
        tokenizer.recycle(token);
    }
}

#[test]
fn test_truncated_inputs_terminate() {
    for input in ["<", "<a", "<a href", "<a href=\"x", "<!--", "<!DOCTYPE", "&#", "</"] {
        let tokens = tokenize(input);
        assert_eq!(tokens.last(), Some(&Token::EndOfInput), "input {input:?}");
    }
}

#[test]
fn test_recycled_tag_has_no_leftovers() {
    let mut tokenizer = Tokenizer::new(r#"<a href="x" class=y><b>"#);
    let first = tokenizer.read().expect("no fault");
    tokenizer.recycle(first);
    let second = tokenizer.read().expect("no fault");
    let Token::StartTag(tag) = &second else {
        panic!("Expected StartTag token");
    };
    assert_eq!(tag.name, "b");
    assert!(tag.attributes.is_empty());
}

#[test]
fn test_unescape_entities() {
    let mut tokenizer = Tokenizer::new("1 &lt; 2 &NotEqualTilde; <b>");
    assert_eq!(
        tokenizer.unescape_entities(false).expect("no fault"),
        "1 < 2 \u{2242}\u{338} <b>"
    );
}
