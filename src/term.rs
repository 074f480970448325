//! Elixir Term Conversion Utilities
//!
//! Converts tree nodes and document metadata to Elixir terms.

use rustler::{Encoder, Env, NewBinary, Term};

use crate::tree::{NodeKind, TreeIndex};

rustler::atoms! {
    ok,
    error,
    element,
    text,
    cdata,
    comment,
    pi,
    document,
    processing_instruction,
    uri,
    input_encoding,
    xml_encoding,
    xml_version,
    standalone,
    namespace_aware,
    nodes,
    elements,
    texts,
    attributes,
}

/// Atom naming a node kind
pub fn kind_to_atom(kind: NodeKind) -> rustler::Atom {
    match kind {
        NodeKind::Element => element(),
        NodeKind::Text => text(),
        NodeKind::CData => cdata(),
        NodeKind::Comment => comment(),
        NodeKind::ProcessingInstruction => processing_instruction(),
        NodeKind::Document => document(),
    }
}

/// Convert a subtree to nested terms:
///
/// - element: `{:element, name, [{name, value}], children}`
/// - text: the binary itself
/// - CDATA, comment: `{:cdata, data}`, `{:comment, data}`
/// - processing instruction: `{:pi, target, data}`
/// - document: `{:document, children}`
pub fn node_to_term<'a>(env: Env<'a>, tree: &TreeIndex, pos: usize) -> Term<'a> {
    let kind = tree.kind(pos);
    match kind {
        NodeKind::Text => str_to_binary(env, &tree.text_content(pos)),
        NodeKind::CData | NodeKind::Comment => {
            let data = tree.text_content(pos);
            (kind_to_atom(kind), str_to_binary(env, &data)).encode(env)
        }
        NodeKind::ProcessingInstruction => {
            let e = element_ordinal(tree, pos);
            let target = str_to_binary(env, tree.pseudo_attribute(e, 2));
            let data = str_to_binary(env, tree.pseudo_attribute(e, 1));
            (pi(), target, data).encode(env)
        }
        NodeKind::Document => (document(), children_to_term(env, tree, pos)).encode(env),
        NodeKind::Element => {
            let e = element_ordinal(tree, pos);
            let name = str_to_binary(env, &tree.qualified_name(e));
            let attrs = attributes_to_term(env, tree, e);
            let children = children_to_term(env, tree, pos);
            (element(), name, attrs, children).encode(env)
        }
    }
}

/// `[{name, value}]` of an element ordinal, in document order
pub fn attributes_to_term<'a>(env: Env<'a>, tree: &TreeIndex, e: usize) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for attr in tree.attribute_positions(e).rev() {
        let name = tree.attribute_qualified_name(attr).unwrap_or_default();
        let pair = (str_to_binary(env, &name), str_to_binary(env, tree.attribute_value(attr)));
        list = list.list_prepend(pair.encode(env));
    }
    list
}

fn children_to_term<'a>(env: Env<'a>, tree: &TreeIndex, pos: usize) -> Term<'a> {
    // Walk last child to first so prepending keeps document order.
    let mut list = Term::list_new_empty(env);
    let mut child = tree.last_child(pos);
    while let Some(c) = child {
        list = list.list_prepend(node_to_term(env, tree, c));
        child = tree.previous_sibling(c);
    }
    list
}

/// Keyword list describing the document
pub fn document_info_to_term<'a>(env: Env<'a>, tree: &TreeIndex) -> Term<'a> {
    let context = tree.context();
    let pairs = [
        (uri(), context.uri().encode(env)),
        (input_encoding(), context.input_encoding().encode(env)),
        (xml_encoding(), context.xml_encoding().encode(env)),
        (xml_version(), context.xml_version().encode(env)),
        (standalone(), context.is_standalone().encode(env)),
        (namespace_aware(), tree.is_namespace_aware().encode(env)),
        (nodes(), tree.node_count().encode(env)),
        (elements(), tree.element_count().encode(env)),
        (texts(), tree.text_count().encode(env)),
        (attributes(), tree.attribute_count().encode(env)),
    ];
    let mut list = Term::list_new_empty(env);
    for (key, value) in pairs.into_iter().rev() {
        list = list.list_prepend((key, value).encode(env));
    }
    list
}

/// Convert a list of strings to a list of binaries
pub fn strings_to_term<'a>(env: Env<'a>, strings: &[String]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for s in strings.iter().rev() {
        list = list.list_prepend(str_to_binary(env, s));
    }
    list
}

fn element_ordinal(tree: &TreeIndex, pos: usize) -> usize {
    match tree.element_ordinal(pos) {
        Some(e) => e,
        None => panic!("position {} is a text node", pos),
    }
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
