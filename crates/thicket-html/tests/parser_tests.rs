//! Integration tests for the HTML tree builder.

use thicket_dom::{DomTree, NodeData, NodeId, QuirksMode};
use thicket_html::Parser;

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    thicket_html::parse(html, "").expect("no fault")
}

/// Helper to parse HTML and keep the diagnostics
fn parse_with_errors(html: &str) -> (DomTree, Vec<String>) {
    let mut parser = Parser::html().track_errors(100);
    let tree = parser.parse_input(html, "").expect("no fault");
    let messages = parser
        .errors()
        .iter()
        .map(|error| error.message.clone())
        .collect();
    (tree, messages)
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if tree.tag_name(from) == Some(tag) {
        return Some(from);
    }
    for &child_id in tree.children(from) {
        if let Some(found) = find_element(tree, child_id, tag) {
            return Some(found);
        }
    }
    None
}

/// Helper to list the tag names of a node's element children
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<&str> {
    tree.children(id)
        .iter()
        .filter_map(|&child| tree.tag_name(child))
        .collect()
}

fn body(tree: &DomTree) -> NodeId {
    tree.body().expect("body element")
}

#[test]
fn test_doctype_paragraph_scenario() {
    let (tree, _) = parse_with_errors("<!DOCTYPE html><p>Hi &amp; bye");
    assert_eq!(tree.doctype().map(|d| d.name.as_str()), Some("html"));
    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
    let p = find_element(&tree, body(&tree), "p").expect("p element");
    assert_eq!(tree.text_content(p), "Hi & bye");
    tree.validate().expect("well-formed tree");
}

#[test]
fn test_implied_document_structure() {
    let tree = parse("hello");
    let html = tree.document_element().expect("html element");
    assert_eq!(tree.tag_name(html), Some("html"));
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    assert_eq!(tree.text_content(body(&tree)), "hello");
}

#[test]
fn test_empty_input_still_has_structure() {
    let tree = parse("");
    let html = tree.document_element().expect("html element");
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    assert_eq!(tree.quirks_mode(), QuirksMode::Quirks);
}

#[test]
fn test_head_elements() {
    let tree = parse("<title>a &amp; <b></title><meta charset=utf-8><link rel=x><p>x");
    let head = tree.head().expect("head");
    assert_eq!(child_tags(&tree, head), vec!["title", "meta", "link"]);
    let title = tree.children(head)[0];
    assert_eq!(tree.text_content(title), "a & <b>");
    assert_eq!(child_tags(&tree, body(&tree)), vec!["p"]);
}

#[test]
fn test_script_content_is_data() {
    let tree = parse("<script>if (a<b) { go(); }</script>");
    let script = find_element(&tree, NodeId::ROOT, "script").expect("script");
    assert_eq!(tree.parent(script), tree.head());
    let content = tree.children(script)[0];
    assert_eq!(
        tree.data(content),
        Some(&NodeData::Data("if (a<b) { go(); }".to_owned()))
    );
}

#[test]
fn test_mismatched_end_tag_closes_inner_element() {
    let (tree, _) = parse_with_errors("<a><b>x</a>");
    let a = find_element(&tree, body(&tree), "a").expect("a");
    assert_eq!(child_tags(&tree, a), vec!["b"]);
    let b = tree.children(a)[0];
    assert_eq!(tree.text_content(b), "x");
    assert_eq!(tree.children(body(&tree)).len(), 1);
}

#[test]
fn test_adoption_agency_splits_block() {
    let tree = parse("<b>1<p>2</b>3</p>");
    let body = body(&tree);
    assert_eq!(child_tags(&tree, body), vec!["b", "p"]);
    let b = tree.children(body)[0];
    assert_eq!(tree.text_content(b), "1");
    let p = tree.children(body)[1];
    assert_eq!(child_tags(&tree, p), vec!["b"]);
    let inner = tree.children(p)[0];
    assert_eq!(tree.text_content(inner), "2");
    assert_eq!(tree.text_content(p), "23");
    tree.validate().expect("well-formed tree");
}

#[test]
fn test_adoption_agency_nested_anchors() {
    let tree = parse("<a href=1>one<a href=2>two");
    let body = body(&tree);
    assert_eq!(child_tags(&tree, body), vec!["a", "a"]);
    let second = tree.children(body)[1];
    assert_eq!(
        tree.as_element(second).and_then(|e| e.attrs.get("href")),
        Some("2")
    );
    assert_eq!(tree.text_content(second), "two");
}

#[test]
fn test_formatting_reconstructed_in_next_paragraph() {
    let tree = parse("<p><i>x<p>y");
    let body = body(&tree);
    assert_eq!(child_tags(&tree, body), vec!["p", "p"]);
    let second = tree.children(body)[1];
    assert_eq!(child_tags(&tree, second), vec!["i"]);
    assert_eq!(tree.text_content(second), "y");
}

#[test]
fn test_noahs_ark_limits_reconstruction() {
    let tree = parse("<p><b><b><b><b>x</p><p>y");
    let body = body(&tree);
    let second = tree.children(body)[1];
    let mut depth = 0;
    let mut node = second;
    while let Some(&child) = tree.children(node).first() {
        if tree.tag_name(child) != Some("b") {
            break;
        }
        depth += 1;
        node = child;
    }
    assert_eq!(depth, 3);
}

#[test]
fn test_foster_parenting_text() {
    let tree = parse("<table>foo<tr><td>bar</td></tr></table>");
    let body = body(&tree);
    let children = tree.children(body);
    assert_eq!(children.len(), 2);
    assert_eq!(tree.as_text(children[0]), Some("foo"));
    assert_eq!(tree.tag_name(children[1]), Some("table"));
    let td = find_element(&tree, children[1], "td").expect("td");
    assert_eq!(tree.text_content(td), "bar");
}

#[test]
fn test_foster_parenting_element() {
    let tree = parse("<table><tr><div>moved</div><td>cell</td></tr></table>");
    let body = body(&tree);
    assert_eq!(child_tags(&tree, body), vec!["div", "table"]);
    tree.validate().expect("well-formed tree");
}

#[test]
fn test_whitespace_in_table_stays_put() {
    let tree = parse("<table> <tr> <td>x</td> </tr> </table>");
    let body = body(&tree);
    assert_eq!(child_tags(&tree, body), vec!["table"]);
    assert_eq!(tree.children(body).len(), 1);
}

#[test]
fn test_implied_table_structure() {
    let tree = parse("<table><td>x</table>");
    let table = find_element(&tree, NodeId::ROOT, "table").expect("table");
    assert_eq!(child_tags(&tree, table), vec!["tbody"]);
    let tbody = tree.children(table)[0];
    assert_eq!(child_tags(&tree, tbody), vec!["tr"]);
    let tr = tree.children(tbody)[0];
    assert_eq!(child_tags(&tree, tr), vec!["td"]);
}

#[test]
fn test_columns_and_caption() {
    let tree = parse("<table><caption>c</caption><col><tr><td>1</td></tr></table>");
    let table = find_element(&tree, NodeId::ROOT, "table").expect("table");
    assert_eq!(child_tags(&tree, table), vec!["caption", "colgroup", "tbody"]);
    let colgroup = tree.children(table)[1];
    assert_eq!(child_tags(&tree, colgroup), vec!["col"]);
}

#[test]
fn test_cell_closed_by_next_cell() {
    let tree = parse("<table><tr><td>1<td>2<tr><td>3</table>");
    let tbody = find_element(&tree, NodeId::ROOT, "tbody").expect("tbody");
    assert_eq!(child_tags(&tree, tbody), vec!["tr", "tr"]);
    let first_row = tree.children(tbody)[0];
    assert_eq!(child_tags(&tree, first_row), vec!["td", "td"]);
}

#[test]
fn test_nested_table_closes_outer() {
    let tree = parse("<table><tr><td><table><tr><td>in</table>after</td></tr></table>");
    let outer_td = find_element(&tree, NodeId::ROOT, "td").expect("td");
    assert_eq!(child_tags(&tree, outer_td), vec!["table"]);
    assert_eq!(tree.text_content(outer_td), "inafter");
}

#[test]
fn test_select_options() {
    let tree = parse("<select><option>a<option>b<optgroup><option>c</select>after");
    let select = find_element(&tree, NodeId::ROOT, "select").expect("select");
    assert_eq!(child_tags(&tree, select), vec!["option", "option", "optgroup"]);
    let body = body(&tree);
    assert_eq!(tree.as_text(*tree.children(body).last().expect("text")), Some("after"));
}

#[test]
fn test_select_in_table_closed_by_cell() {
    let tree = parse("<table><tr><td><select><option>a<td>next</table>");
    let tr = find_element(&tree, NodeId::ROOT, "tr").expect("tr");
    assert_eq!(child_tags(&tree, tr), vec!["td", "td"]);
}

#[test]
fn test_paragraph_closed_by_block() {
    let tree = parse("<p>a<div>b</div>");
    assert_eq!(child_tags(&tree, body(&tree)), vec!["p", "div"]);
}

#[test]
fn test_end_p_without_p_inserts_one() {
    let (tree, errors) = parse_with_errors("<!DOCTYPE html><body></p>");
    assert_eq!(child_tags(&tree, body(&tree)), vec!["p"]);
    assert!(!errors.is_empty());
}

#[test]
fn test_list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b</ul><dl><dt>t<dd>d</dl>");
    let ul = find_element(&tree, NodeId::ROOT, "ul").expect("ul");
    assert_eq!(child_tags(&tree, ul), vec!["li", "li"]);
    let dl = find_element(&tree, NodeId::ROOT, "dl").expect("dl");
    assert_eq!(child_tags(&tree, dl), vec!["dt", "dd"]);
}

#[test]
fn test_headings_do_not_nest() {
    let (tree, errors) = parse_with_errors("<!DOCTYPE html><h1>a<h2>b");
    assert_eq!(child_tags(&tree, body(&tree)), vec!["h1", "h2"]);
    assert!(!errors.is_empty());
}

#[test]
fn test_leading_newline_dropped() {
    let tree = parse("<pre>\n\nx</pre><textarea>\nfoo</textarea>");
    let pre = find_element(&tree, NodeId::ROOT, "pre").expect("pre");
    assert_eq!(tree.text_content(pre), "\nx");
    let textarea = find_element(&tree, NodeId::ROOT, "textarea").expect("textarea");
    assert_eq!(tree.text_content(textarea), "foo");
}

#[test]
fn test_void_elements_are_not_parents() {
    let tree = parse("<p>a<br>b<img src=x>c<input type=text>d");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(child_tags(&tree, p), vec!["br", "img", "input"]);
    for &child in tree.children(p) {
        if tree.tag_name(child).is_some() {
            assert!(tree.children(child).is_empty());
        }
    }
}

#[test]
fn test_image_becomes_img() {
    let tree = parse("<image src=a.png>");
    let img = find_element(&tree, NodeId::ROOT, "img").expect("img");
    assert_eq!(
        tree.as_element(img).and_then(|e| e.attrs.get("src")),
        Some("a.png")
    );
}

#[test]
fn test_end_br_becomes_start_br() {
    let tree = parse("<p>a</br>b");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(child_tags(&tree, p), vec!["br"]);
}

#[test]
fn test_self_closing_non_void_reports_once() {
    let (tree, errors) = parse_with_errors("<!DOCTYPE html><div/>x<br/>");
    let unacknowledged = errors
        .iter()
        .filter(|message| message.contains("self-closing flag not acknowledged"))
        .count();
    assert_eq!(unacknowledged, 1);
    // The flag does not close a non-void element.
    let div = find_element(&tree, NodeId::ROOT, "div").expect("div");
    assert_eq!(tree.text_content(div), "x");
    assert_eq!(child_tags(&tree, div), vec!["br"]);
}

#[test]
fn test_html_and_body_attributes_merge() {
    let tree = parse("<html lang=en><body class=a><html lang=fr data-x=1><body id=b>");
    let html = tree.document_element().expect("html");
    let html_attrs = &tree.as_element(html).expect("element").attrs;
    assert_eq!(html_attrs.get("lang"), Some("en"));
    assert_eq!(html_attrs.get("data-x"), Some("1"));
    let body_attrs = &tree.as_element(body(&tree)).expect("element").attrs;
    assert_eq!(body_attrs.get("class"), Some("a"));
    assert_eq!(body_attrs.get("id"), Some("b"));
}

#[test]
fn test_attribute_case_folding() {
    let tree = parse("<DIV ID=x Class=y>");
    let div = find_element(&tree, NodeId::ROOT, "div").expect("div");
    let attrs = &tree.as_element(div).expect("element").attrs;
    assert_eq!(attrs.get("id"), Some("x"));
    assert_eq!(attrs.get("class"), Some("y"));

    let mut parser = Parser::html().with_settings(thicket_common::ParseSettings::PRESERVE_CASE);
    let tree = parser.parse_input("<DIV ID=x>", "").expect("no fault");
    assert!(find_element(&tree, NodeId::ROOT, "DIV").is_some());
}

#[test]
fn test_comments_placement() {
    let tree = parse("<!--first--><html><body><!--inner--></body></html><!--last-->");
    let root_children = tree.children(NodeId::ROOT);
    assert_eq!(
        tree.data(root_children[0]),
        Some(&NodeData::Comment("first".to_owned()))
    );
    assert_eq!(
        tree.data(*root_children.last().expect("comment")),
        Some(&NodeData::Comment("last".to_owned()))
    );
    let body_children = tree.children(body(&tree));
    assert_eq!(
        tree.data(body_children[0]),
        Some(&NodeData::Comment("inner".to_owned()))
    );
}

#[test]
fn test_frameset_document() {
    let tree = parse("<!DOCTYPE html><frameset><frame src=a><frame src=b></frameset>");
    let html = tree.document_element().expect("html");
    assert_eq!(child_tags(&tree, html), vec!["head", "frameset"]);
    let frameset = tree.children(html)[1];
    assert_eq!(child_tags(&tree, frameset), vec!["frame", "frame"]);
}

#[test]
fn test_frameset_ignored_after_content() {
    let tree = parse("<!DOCTYPE html><p>text</p><frameset>");
    let html = tree.document_element().expect("html");
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
}

#[test]
fn test_quirks_classification() {
    assert_eq!(parse("<p>").quirks_mode(), QuirksMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode(), QuirksMode::NoQuirks);
    assert_eq!(
        parse(
            r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#
        )
        .quirks_mode(),
        QuirksMode::LimitedQuirks
    );
    assert_eq!(
        parse(r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">"#).quirks_mode(),
        QuirksMode::Quirks
    );
}

#[test]
fn test_table_in_paragraph_depends_on_quirks() {
    let quirky = parse("<p><table></table>");
    let p = find_element(&quirky, NodeId::ROOT, "p").expect("p");
    assert_eq!(child_tags(&quirky, p), vec!["table"]);

    let standard = parse("<!DOCTYPE html><p><table></table>");
    assert_eq!(child_tags(&standard, body(&standard)), vec!["p", "table"]);
}

#[test]
fn test_base_href_applies_to_later_nodes() {
    let mut parser = Parser::html();
    let tree = parser
        .parse_input(
            r#"<base href="http://example.com/dir/"><p>x"#,
            "http://origin.test/",
        )
        .expect("no fault");
    let html = tree.document_element().expect("html");
    assert_eq!(
        tree.get(html).map(|node| node.base_uri.as_ref()),
        Some("http://origin.test/")
    );
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(
        tree.get(p).map(|node| node.base_uri.as_ref()),
        Some("http://example.com/dir/")
    );
}

#[test]
fn test_stray_tags_are_ignored() {
    let (tree, errors) = parse_with_errors("<!DOCTYPE html></div><td>x</span><caption>");
    assert_eq!(tree.text_content(body(&tree)), "x");
    assert!(child_tags(&tree, body(&tree)).is_empty());
    assert!(errors.len() >= 4);
}

#[test]
fn test_cdata_in_html_is_text() {
    let tree = parse("<p>a<![CDATA[<b>]]>c");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "a<b>c");
}

#[test]
fn test_text_after_body_goes_to_body() {
    let tree = parse("<body>a</body>b</html>c");
    assert_eq!(tree.text_content(body(&tree)), "abc");
}

#[test]
fn test_null_characters_dropped_in_body() {
    let tree = parse("<p>a\0b");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(tree.text_content(p), "ab");
}

#[test]
fn test_plaintext_swallows_markup() {
    let tree = parse("<plaintext><b>x</plaintext>");
    let plaintext = find_element(&tree, NodeId::ROOT, "plaintext").expect("plaintext");
    assert_eq!(tree.text_content(plaintext), "<b>x</plaintext>");
}

#[test]
fn test_template_parsed_as_ordinary_element() {
    let tree = parse("<template><p>x</p></template>");
    let template = find_element(&tree, NodeId::ROOT, "template").expect("template");
    assert_eq!(child_tags(&tree, template), vec!["p"]);
}

#[test]
fn test_parse_bytes_replaces_invalid_utf8() {
    let mut parser = Parser::html();
    let tree = parser
        .parse_bytes(b"<p>caf\xC3\xA9 \xFF</p>", "")
        .expect("no fault");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(tree.text_content(p), "caf\u{e9} \u{FFFD}");
}
