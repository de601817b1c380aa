//! Integration tests for the token callback mode.

use thicket_html::tokenizer::{Characters, Comment, Doctype, Tag};
use thicket_html::{Flavor, Parser, TokenHandler, TokenSink, TokenStream, Tokenizer};

/// Records every callback as a short line.
#[derive(Debug, Default)]
struct Recorder {
    events: Vec<String>,
    finished: usize,
}

impl TokenHandler for Recorder {
    fn start_tag(&mut self, tag: &Tag) {
        self.events.push(format!("start {}", tag.name));
    }

    fn end_tag(&mut self, tag: &Tag) {
        self.events.push(format!("end {}", tag.name));
    }

    fn text(&mut self, text: &Characters) {
        self.events.push(format!("text {}", text.data));
    }

    fn comment(&mut self, comment: &Comment) {
        self.events.push(format!("comment {}", comment.data));
    }

    fn doctype(&mut self, doctype: &Doctype) {
        self.events.push(format!(
            "doctype {}",
            doctype.name.as_deref().unwrap_or_default()
        ));
    }

    fn end_of_input(&mut self) {
        self.finished += 1;
    }
}

#[test]
fn test_events_in_document_order() {
    let recorder = Parser::html()
        .stream("<!DOCTYPE html><p class=x>a &amp; b</p><!--c-->", Recorder::default())
        .expect("no fault");
    assert_eq!(
        recorder.events,
        vec![
            "doctype html",
            "start p",
            "text a & b",
            "end p",
            "comment c",
        ]
    );
    assert_eq!(recorder.finished, 1);
}

#[test]
fn test_no_implied_tags_are_reported() {
    let recorder = Parser::html()
        .stream("<td>x", Recorder::default())
        .expect("no fault");
    assert_eq!(recorder.events, vec!["start td", "text x"]);
}

#[test]
fn test_html_flavor_treats_script_as_raw_text() {
    let recorder = Parser::html()
        .stream("<script>a<b>c</script><b>", Recorder::default())
        .expect("no fault");
    assert_eq!(
        recorder.events,
        vec!["start script", "text a<b>c", "end script", "start b"]
    );
}

#[test]
fn test_xml_flavor_tokenizes_script_content() {
    let recorder = Parser::xml()
        .stream("<script>a<b>c</script>", Recorder::default())
        .expect("no fault");
    assert_eq!(
        recorder.events,
        vec!["start script", "text a", "start b", "text c", "end script"]
    );
}

#[test]
fn test_self_closing_is_acknowledged() {
    let mut parser = Parser::html().track_errors(10);
    let recorder = parser
        .stream("<div/><span/>", Recorder::default())
        .expect("no fault");
    assert_eq!(recorder.events, vec!["start div", "start span"]);
    assert!(parser.errors().is_empty());
}

#[test]
fn test_empty_input_only_ends() {
    let recorder = Parser::html()
        .stream("", Recorder::default())
        .expect("no fault");
    assert!(recorder.events.is_empty());
    assert_eq!(recorder.finished, 1);
}

#[test]
fn test_stream_driven_directly() {
    let tokenizer = Tokenizer::new("<a>b</a>");
    let mut stream = TokenStream::new(tokenizer, Flavor::Html, Recorder::default());
    stream.run().expect("no fault");
    assert!(stream.tokenizer().errors().is_empty());
    let recorder = stream.into_handler();
    assert_eq!(recorder.events, vec!["start a", "text b", "end a"]);
}
