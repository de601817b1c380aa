//! Property tests: any input tokenizes to the end and parses to a valid tree.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use thicket_common::ParseSettings;
use thicket_dom::NodeId;
use thicket_html::{
    Characters, Cursor, Fault, HtmlTreeBuilder, Parser, Token, TokenSink, Tokenizer,
    XmlTreeBuilder, print_tree,
};

/// Markup-heavy fragments so generated inputs hit the interesting states.
const PIECES: &[&str] = &[
    "<", ">", "</", "/>", "<!--", "-->", "<!DOCTYPE html>", "<![CDATA[", "]]>", "&", "&amp;",
    "&#x", ";", "=", "\"", "'", "<p>", "<b>", "</b>", "<i>", "</p>", "<table>", "<tr>", "<td>",
    "</table>", "<select>", "<option>", "<script>", "</script>", "<title>", "<a href=x>",
    "</a>", "<frameset>", "<?xml", "?>", "<html>", "<body>", "\0", " ", "\n", "x",
];

fn assemble(picks: &[u8]) -> String {
    picks
        .iter()
        .map(|&pick| PIECES[usize::from(pick) % PIECES.len()])
        .collect()
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input);
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

#[quickcheck]
fn prop_tokenizer_reaches_end_of_input(input: String) -> bool {
    let tokens = tokenize(&input);
    tokens.last().is_some_and(Token::is_eof)
        && tokens.iter().filter(|token| token.is_eof()).count() == 1
}

#[quickcheck]
fn prop_character_runs_are_coalesced(picks: Vec<u8>) -> bool {
    let tokens = tokenize(&assemble(&picks));
    tokens.windows(2).all(|pair| match (&pair[0], &pair[1]) {
        (Token::Characters(a), Token::Characters(b)) => a.cdata || b.cdata,
        _ => true,
    })
}

/// Feed `pieces` to `sink` as consecutive character runs, then end of input.
fn build_from_runs<S: TokenSink>(mut sink: S, pieces: &[&str]) -> S {
    for piece in pieces {
        let run = Token::Characters(Characters {
            data: (*piece).to_owned(),
            cdata: false,
        });
        let _ = sink.process(&run).expect("no fault");
    }
    let _ = sink.process(&Token::EndOfInput).expect("no fault");
    sink
}

/// Cut `text` at the given character offsets (taken modulo its length).
fn split_at_chars<'a>(text: &'a str, cuts: &[usize]) -> Vec<&'a str> {
    let offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    if offsets.is_empty() {
        return vec![text];
    }
    let mut bounds: Vec<usize> = cuts.iter().map(|cut| offsets[cut % offsets.len()]).collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut pieces = Vec::new();
    let mut start = 0;
    for bound in bounds {
        if bound > start {
            pieces.push(&text[start..bound]);
            start = bound;
        }
    }
    pieces.push(&text[start..]);
    pieces
}

#[quickcheck]
fn prop_split_text_runs_build_the_same_tree(text: String, cuts: Vec<usize>) -> bool {
    let text: String = text.chars().filter(|&c| c != '\0').collect();
    let pieces = split_at_chars(&text, &cuts);

    let html = |pieces: &[&str]| {
        let builder = HtmlTreeBuilder::new(Tokenizer::new(""), "", ParseSettings::HTML_DEFAULT);
        print_tree(&build_from_runs(builder, pieces).into_parts().0)
    };
    // The XML builder keeps one node per run, so only the text is compared.
    let xml = |pieces: &[&str]| {
        let builder = XmlTreeBuilder::new(Tokenizer::new(""), "", ParseSettings::PRESERVE_CASE);
        build_from_runs(builder, pieces)
            .into_parts()
            .0
            .text_content(NodeId::ROOT)
    };

    html(&[text.as_str()]) == html(&pieces) && xml(&[text.as_str()]) == xml(&pieces)
}

#[quickcheck]
fn prop_html_parse_yields_valid_tree(input: String) -> bool {
    let tree = Parser::html().parse_input(&input, "").expect("no fault");
    tree.validate().is_ok() && tree.body().is_some()
}

#[quickcheck]
fn prop_html_markup_parse_yields_valid_tree(picks: Vec<u8>) -> bool {
    let input = assemble(&picks);
    let mut parser = Parser::html().track_errors(8);
    let tree = parser.parse_input(&input, "").expect("no fault");
    tree.validate().is_ok() && parser.errors().len() <= 8
}

#[quickcheck]
fn prop_xml_parse_yields_valid_tree(picks: Vec<u8>) -> bool {
    let input = assemble(&picks);
    let tree = Parser::xml().parse_input(&input, "").expect("no fault");
    tree.validate().is_ok()
}

#[quickcheck]
fn prop_plain_text_survives(input: String) -> TestResult {
    if input.chars().any(|c| matches!(c, '<' | '&' | '\0' | '\r')) || input.trim().is_empty() {
        return TestResult::discard();
    }
    let tree = thicket_html::parse(&input, "").expect("no fault");
    let Some(body) = tree.body() else {
        return TestResult::failed();
    };
    TestResult::from_bool(tree.text_content(body) == input.trim_start_matches(is_html_space))
}

fn is_html_space(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | ' ')
}

#[quickcheck]
fn prop_rewind_returns_to_mark(input: String, skip: usize, ahead: usize) -> bool {
    // Carriage returns are normalized away, which would shift offsets.
    let input: String = input.chars().filter(|&c| c != '\r').collect();
    let mut cursor = Cursor::new(input.as_str());
    for _ in 0..skip % 8 {
        cursor.advance();
    }
    let marked = cursor.pos();
    let expected: String = input[marked..].chars().take(ahead % 8).collect();
    cursor.mark();
    let consumed: String = (0..ahead % 8).filter_map(|_| cursor.consume()).collect();
    cursor.rewind_to_mark().is_ok()
        && cursor.pos() == marked
        && consumed == expected
        && cursor.rewind_to_mark() == Err(Fault::NoMark)
}
