//! Integration tests for the XML tree builder.

use thicket_dom::{DomTree, NodeData, NodeId, QuirksMode};
use thicket_html::{Parser, print_tree};

fn parse(xml: &str) -> DomTree {
    thicket_html::parse_xml(xml, "").expect("no fault")
}

fn child_tags(tree: &DomTree, id: NodeId) -> Vec<&str> {
    tree.children(id)
        .iter()
        .filter_map(|&child| tree.tag_name(child))
        .collect()
}

#[test]
fn test_declaration_then_nested_elements() {
    let tree = parse(r#"<?xml version="1.0"?><Note><To>Tove</To><From>Jani</From></Note>"#);
    let root_children = tree.children(NodeId::ROOT);
    assert_eq!(root_children.len(), 2);
    let Some(NodeData::XmlDeclaration(declaration)) = tree.data(root_children[0]) else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.name, "xml");
    assert_eq!(declaration.attrs.get("version"), Some("1.0"));

    let note = root_children[1];
    assert_eq!(tree.tag_name(note), Some("Note"));
    assert_eq!(child_tags(&tree, note), vec!["To", "From"]);
    assert_eq!(tree.text_content(note), "ToveJani");
    tree.validate().expect("well-formed tree");
}

#[test]
fn test_no_implied_elements() {
    let tree = parse("hello<p>x");
    assert!(tree.document_element().is_some());
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["p"]);
    assert_eq!(tree.as_text(tree.children(NodeId::ROOT)[0]), Some("hello"));
    assert!(tree.head().is_none());
    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn test_cdata_becomes_its_own_node() {
    let tree = parse("<a>x<![CDATA[<b> & c]]>y</a>");
    let a = tree.children(NodeId::ROOT)[0];
    let children = tree.children(a);
    assert_eq!(children.len(), 3);
    assert_eq!(
        tree.data(children[1]),
        Some(&NodeData::CData("<b> & c".to_owned()))
    );
    assert_eq!(tree.text_content(a), "x<b> & cy");
}

#[test]
fn test_unmatched_end_tag_is_ignored() {
    let tree = parse("<a><b></c>x</b></a>");
    let a = tree.children(NodeId::ROOT)[0];
    let b = tree.children(a)[0];
    assert_eq!(tree.text_content(b), "x");
}

#[test]
fn test_end_tag_closes_intervening_elements() {
    let tree = parse("<a><b>x</a>y");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["a"]);
    let last = *tree.children(NodeId::ROOT).last().expect("text");
    assert_eq!(tree.as_text(last), Some("y"));
}

#[test]
fn test_self_closing_elements_stay_empty() {
    let mut parser = Parser::xml().track_errors(10);
    let tree = parser.parse_input("<list><item/><item id='2'/></list>", "").expect("no fault");
    let list = tree.children(NodeId::ROOT)[0];
    assert_eq!(child_tags(&tree, list), vec!["item", "item"]);
    for &item in tree.children(list) {
        assert!(tree.children(item).is_empty());
    }
    assert!(parser.errors().is_empty());
}

#[test]
fn test_html_void_names_are_not_special() {
    let tree = parse("<br>text</br>");
    let br = tree.children(NodeId::ROOT)[0];
    assert_eq!(tree.text_content(br), "text");
}

#[test]
fn test_doctype_kept_verbatim() {
    let tree = parse(r#"<!DOCTYPE Note SYSTEM "Note.dtd"><Note/>"#);
    let doctype = tree.doctype().expect("doctype");
    assert_eq!(doctype.name, "Note");
    assert_eq!(doctype.pub_sys_key.as_deref(), Some("SYSTEM"));
    assert_eq!(doctype.system_id, "Note.dtd");
    assert!(doctype.public_id.is_empty());
    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn test_entity_declaration() {
    let tree = parse(r#"<!ENTITY copy "(c)"><doc/>"#);
    let first = tree.children(NodeId::ROOT)[0];
    let Some(NodeData::XmlDeclaration(declaration)) = tree.data(first) else {
        panic!("expected a declaration, got {:?}", tree.data(first));
    };
    assert_eq!(declaration.name, "ENTITY");
    assert!(!declaration.is_processing_instruction);
    assert!(declaration.attrs.contains("copy"));
}

#[test]
fn test_comments_and_text_kept_separate() {
    let tree = parse("<a>one<!-- two -->three</a>");
    let a = tree.children(NodeId::ROOT)[0];
    let children = tree.children(a);
    assert_eq!(children.len(), 3);
    assert_eq!(
        tree.data(children[1]),
        Some(&NodeData::Comment(" two ".to_owned()))
    );
}

#[test]
fn test_script_is_not_raw_text_in_xml() {
    let tree = parse("<script><b>x</b></script>");
    let script = tree.children(NodeId::ROOT)[0];
    assert_eq!(child_tags(&tree, script), vec!["b"]);
}

#[test]
fn test_lowercase_settings_fold_names() {
    let mut parser = Parser::xml().with_settings(thicket_common::ParseSettings::HTML_DEFAULT);
    let tree = parser
        .parse_input(r#"<Note LANG="en"/><Next/>"#, "")
        .expect("no fault");
    let roots = tree.children(NodeId::ROOT);
    assert_eq!(roots.len(), 2);
    let note = roots[0];
    assert_eq!(tree.tag_name(note), Some("note"));
    assert!(tree.children(note).is_empty());
    assert_eq!(tree.tag_name(roots[1]), Some("next"));
    assert_eq!(
        tree.as_element(note).and_then(|e| e.attrs.get("lang")),
        Some("en")
    );
}

#[test]
fn test_unquoted_value_keeps_trailing_slash() {
    let tree = parse("<note lang=en/>");
    let note = tree.children(NodeId::ROOT)[0];
    assert_eq!(
        tree.as_element(note).and_then(|e| e.attrs.get("lang")),
        Some("en/")
    );
}

#[test]
fn test_print_tree_shows_declarations() {
    let tree = parse(r#"<?xml version="1.0"?><a><![CDATA[x]]></a>"#);
    let outline = print_tree(&tree);
    assert!(outline.contains(r#"<?xml version="1.0"?>"#), "{outline}");
    assert!(outline.contains("<![CDATA[x]]>"), "{outline}");
}
