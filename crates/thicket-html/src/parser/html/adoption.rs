//! [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs misnested formatting markup such as `<a><b>x</a>y</b>` by
//! cloning formatting elements and moving content under the clones.

use thicket_dom::{NodeData, NodeId};

use super::{FormattingEntry, HtmlTreeBuilder, SPECIAL_ELEMENTS, name_in};
use crate::error::Fault;
use crate::tokenizer::{Tag, Token};

/// "Outer loop: If outer loop counter is greater than or equal to 8, then return."
const OUTER_LOOP_LIMIT: usize = 8;

/// "If inner loop counter is greater than 3 and node is in the list of active
/// formatting elements, then remove node from the list of active formatting
/// elements."
const INNER_LOOP_LIMIT: usize = 3;

impl HtmlTreeBuilder {
    /// Run the adoption agency algorithm for a token whose tag name is `subject`.
    pub(super) fn run_adoption_agency(&mut self, subject: &str) -> Result<(), Fault> {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the stack
        //          of open elements and return."
        let current = self.current_node();
        if self.current_is(subject) && self.formatting_index_of(current).is_none() {
            let _ = self.core.pop()?;
            return Ok(());
        }

        // STEP 3-4: "Let outer loop counter be 0. Outer loop: ..."
        for _ in 0..OUTER_LOOP_LIMIT {
            // STEP 4.3: "Let formatting element be the last element in the list
            //            of active formatting elements that: is between the end
            //            of the list and the last marker in the list, if any, or
            //            the start of the list otherwise, and has the tag name
            //            subject. If there is no such element, then return and
            //            instead act as described in the "any other end tag"
            //            entry above."
            let Some((_, formatting_element)) = self.formatting_element_named(subject) else {
                let _ = self.any_other_end_tag(subject, &Token::EndTag(Tag::named(subject)))?;
                return Ok(());
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_position) = self
                .core
                .stack
                .iter()
                .position(|&id| id == formatting_element)
            else {
                self.core.error(format_args!(
                    "formatting element [{subject}] is no longer open"
                ));
                if let Some(index) = self.formatting_index_of(formatting_element) {
                    let _ = self.formatting.remove(index);
                }
                return Ok(());
            };

            // STEP 4.5: "If formatting element is in the stack of open elements,
            //            but the element is not in scope, then this is a parse
            //            error; return."
            if !self.node_in_scope(formatting_element) {
                self.core.error(format_args!(
                    "formatting element [{subject}] is not in scope"
                ));
                return Ok(());
            }

            // STEP 4.6: "If formatting element is not the current node, this is
            //            a parse error. (But do not return.)"
            if formatting_element != self.current_node() {
                self.core.error(format_args!(
                    "end tag [{subject}] does not close the current element"
                ));
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack of
            //            open elements that is lower in the stack than formatting
            //            element, and is an element in the special category."
            let furthest = self.core.stack[formatting_position + 1..]
                .iter()
                .position(|&id| {
                    self.core
                        .tree
                        .tag_name(id)
                        .is_some_and(|name| name_in(name, SPECIAL_ELEMENTS))
                })
                .map(|offset| formatting_position + 1 + offset);

            // STEP 4.8: "If there is no furthest block, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formatting element, then remove formatting element from
            //            the list of active formatting elements, and finally
            //            return."
            let Some(furthest_position) = furthest else {
                self.core.stack.truncate(formatting_position);
                if let Some(index) = self.formatting_index_of(formatting_element) {
                    let _ = self.formatting.remove(index);
                }
                return Ok(());
            };
            let furthest_block = self.core.stack[furthest_position];

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let common_ancestor = match formatting_position.checked_sub(1) {
                Some(above) => self.core.stack[above],
                None => NodeId::ROOT,
            };

            // STEP 4.10: "Let a bookmark note the position of formatting element
            //             in the list of active formatting elements relative to
            //             the elements on either side of it in the list."
            let mut bookmark = self
                .formatting_index_of(formatting_element)
                .ok_or(Fault::Unreachable("formatting element left the list"))?;

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_position = furthest_position;
            let mut last_node = furthest_block;

            // STEP 4.12-4.13: The inner loop.
            let mut inner = 0;
            loop {
                inner += 1;

                // STEP 4.13.2: "Let node be the element immediately above node
                //               in the stack of open elements, or if node is no
                //               longer in the stack of open elements (e.g.
                //               because it got removed by this algorithm), the
                //               element that was immediately above node in the
                //               stack of open elements before node was removed."
                node_position -= 1;
                let node = self.core.stack[node_position];

                // STEP 4.13.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If inner loop counter is greater than 3 and node
                //               is in the list of active formatting elements,
                //               then remove node from the list of active
                //               formatting elements."
                let mut entry = self.formatting_index_of(node);
                if inner > INNER_LOOP_LIMIT
                    && let Some(index) = entry
                {
                    let _ = self.formatting.remove(index);
                    if index < bookmark {
                        bookmark -= 1;
                    }
                    entry = None;
                }

                // STEP 4.13.5: "If node is not in the list of active formatting
                //               elements, then remove node from the stack of
                //               open elements and continue."
                let Some(index) = entry else {
                    let _ = self.core.stack.remove(node_position);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the
                //               element node was created, in the HTML namespace,
                //               with common ancestor as the intended parent;
                //               replace the entry for node in the list of active
                //               formatting elements with an entry for the new
                //               element, replace the entry for node in the stack
                //               of open elements with an entry for the new
                //               element, and let node be the new element."
                let tag = match &self.formatting[index] {
                    FormattingEntry::Element { tag, .. } => tag.clone(),
                    FormattingEntry::Marker => {
                        return Err(Fault::Unreachable("marker matched an open element"));
                    }
                };
                let replacement = self.create_element(&tag);
                self.formatting[index] = FormattingEntry::Element {
                    node: replacement,
                    tag,
                };
                self.core.stack[node_position] = replacement;

                // STEP 4.13.7: "If last node is furthest block, then move the
                //               aforementioned bookmark to be immediately after
                //               the new node in the list of active formatting
                //               elements."
                if last_node == furthest_block {
                    bookmark = index + 1;
                }

                // STEP 4.13.8: "Append last node to node."
                self.core.tree.append_child(replacement, last_node)?;

                // STEP 4.13.9: "Set last node to node."
                last_node = replacement;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             previous step at the appropriate place for inserting a
            //             node, but using common ancestor as the override target."
            let (parent, before) = self.appropriate_place(Some(common_ancestor));
            self.core.tree.insert_before(parent, last_node, before)?;

            // STEP 4.15: "Create an element for the token for which formatting
            //             element was created, in the HTML namespace, with
            //             furthest block as the intended parent."
            let formatting_index = self
                .formatting_index_of(formatting_element)
                .ok_or(Fault::Unreachable("formatting element left the list"))?;
            let tag = match &self.formatting[formatting_index] {
                FormattingEntry::Element { tag, .. } => tag.clone(),
                FormattingEntry::Marker => {
                    return Err(Fault::Unreachable("marker matched an open element"));
                }
            };
            let new_element = self.create_element(&tag);

            // STEP 4.16: "Take all of the child nodes of furthest block and
            //             append them to the element created in the last step."
            self.core.tree.move_children(furthest_block, new_element)?;

            // STEP 4.17: "Append that new element to furthest block."
            self.core.tree.append_child(furthest_block, new_element)?;

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the position
            //             of the aforementioned bookmark."
            let _ = self.formatting.remove(formatting_index);
            if formatting_index < bookmark {
                bookmark -= 1;
            }
            self.formatting.insert(
                bookmark.min(self.formatting.len()),
                FormattingEntry::Element {
                    node: new_element,
                    tag,
                },
            );

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack of
            //             open elements immediately below the position of
            //             furthest block in that stack."
            self.remove_from_stack(formatting_element);
            let below_furthest = self
                .core
                .stack
                .iter()
                .position(|&id| id == furthest_block)
                .map_or(self.core.stack.len(), |position| position + 1);
            self.core.stack.insert(below_furthest, new_element);
        }
        Ok(())
    }

    /// A detached element for `tag`, ready to be placed.
    fn create_element(&mut self, tag: &Tag) -> NodeId {
        let element = self.core.element_for(tag);
        self.core.tree.alloc(NodeData::Element(element))
    }
}

#[cfg(test)]
mod tests {
    use thicket_common::ParseSettings;

    use super::*;
    use crate::parser::tree_builder::TokenSink;
    use crate::tokenizer::Tokenizer;

    fn build(html: &str) -> HtmlTreeBuilder {
        let mut builder =
            HtmlTreeBuilder::new(Tokenizer::new(html), "", ParseSettings::HTML_DEFAULT);
        builder.run().expect("no fault");
        builder
    }

    fn names(builder: &HtmlTreeBuilder, parent: NodeId) -> Vec<String> {
        builder
            .tree()
            .children(parent)
            .iter()
            .filter_map(|&id| builder.tree().tag_name(id).map(str::to_owned))
            .collect()
    }

    #[test]
    fn test_misnested_formatting_without_block() {
        let builder = build("<p><b><i>x</b>y");
        let tree = builder.tree();
        let p = tree.children(tree.body().expect("body"))[0];
        // <p><b><i>x</i></b><i>y</i></p>
        assert_eq!(names(&builder, p), vec!["b", "i"]);
        assert_eq!(builder.formatting.len(), 1);
    }

    #[test]
    fn test_furthest_block_is_split() {
        let builder = build("<b>1<p>2</b>3</p>");
        let tree = builder.tree();
        let body = tree.body().expect("body");
        assert_eq!(names(&builder, body), vec!["b", "p"]);
        let p = tree.children(body)[1];
        // The p gets a fresh <b> holding "2", then "3" follows it.
        assert_eq!(names(&builder, p), vec!["b"]);
        assert_eq!(tree.text_content(p), "23");
        tree.validate().expect("valid tree");
    }
}
