//! SuccinctXML - XML documents held as succinct bit structures
//!
//! A parsed document is a balanced-parenthesis string plus rank/select
//! indexed bit vectors and compact dictionaries. Nodes are addressed by
//! their open-parenthesis position.
//!
//! Layers:
//! - [`bits`]: bit vectors, compact integer arrays, parenthesis topology
//! - [`dict`]: name and content dictionaries
//! - [`tree`]: the frozen [`TreeIndex`](tree::TreeIndex) and node views
//! - [`build`]: event model and the single-pass builder
//! - [`source`]: lenient XML reader feeding the builder
//!
//! The NIFs below expose the tree to `Elixir.SuccinctXML.Native`.

use rustler::{Atom, Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod bits;
pub mod build;
pub mod dict;
pub mod error;
pub mod source;
pub mod tree;

mod resource;
mod term;

use build::BuildOptions;
use resource::{DocumentRef, DocumentResource};
use tree::{batch, Node};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Parsing
// ============================================================================

fn parse_to_term<'a>(env: Env<'a>, input: &[u8], options: BuildOptions) -> NifResult<Term<'a>> {
    match DocumentResource::parse(input, options) {
        Ok(resource) => Ok((term::ok(), ResourceArc::new(resource)).encode(env)),
        Err(err) => {
            let reason = Atom::from_str(env, err.reason())?;
            Ok((term::error(), reason).encode(env))
        }
    }
}

/// Parse XML into a document resource: `{:ok, doc}` or `{:error, reason}`
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    parse_to_term(env, input.as_slice(), BuildOptions::default())
}

/// `parse/3` with a document URI and namespace awareness
#[rustler::nif(name = "parse", schedule = "DirtyCpu")]
fn parse_with_options<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    uri: Option<String>,
    namespace_aware: bool,
) -> NifResult<Term<'a>> {
    let mut options = BuildOptions::default().with_namespace_aware(namespace_aware);
    options.document_uri = uri;
    parse_to_term(env, input.as_slice(), options)
}

// ============================================================================
// Document
// ============================================================================

#[rustler::nif]
fn document_info<'a>(env: Env<'a>, doc_ref: DocumentRef) -> Term<'a> {
    term::document_info_to_term(env, &doc_ref.tree)
}

#[rustler::nif]
fn document(doc_ref: DocumentRef) -> usize {
    doc_ref.tree.document()
}

#[rustler::nif]
fn root(doc_ref: DocumentRef) -> usize {
    doc_ref.tree.document_element()
}

/// Heap bytes held by the frozen tree
#[rustler::nif]
fn memory_usage(doc_ref: DocumentRef) -> usize {
    doc_ref.tree.heap_size()
}

// ============================================================================
// Navigation
// ============================================================================

fn check_node(doc_ref: &DocumentRef, pos: usize) -> NifResult<()> {
    if doc_ref.is_node(pos) {
        Ok(())
    } else {
        Err(rustler::Error::BadArg)
    }
}

fn check_element(doc_ref: &DocumentRef, pos: usize) -> NifResult<()> {
    if doc_ref.is_element(pos) {
        Ok(())
    } else {
        Err(rustler::Error::BadArg)
    }
}

#[rustler::nif]
fn node_kind(doc_ref: DocumentRef, pos: usize) -> NifResult<Atom> {
    check_node(&doc_ref, pos)?;
    Ok(term::kind_to_atom(doc_ref.tree.kind(pos)))
}

#[rustler::nif]
fn parent(doc_ref: DocumentRef, pos: usize) -> NifResult<Option<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.parent(pos))
}

#[rustler::nif]
fn first_child(doc_ref: DocumentRef, pos: usize) -> NifResult<Option<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.first_child(pos))
}

#[rustler::nif]
fn last_child(doc_ref: DocumentRef, pos: usize) -> NifResult<Option<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.last_child(pos))
}

#[rustler::nif]
fn next_sibling(doc_ref: DocumentRef, pos: usize) -> NifResult<Option<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.next_sibling(pos))
}

#[rustler::nif]
fn previous_sibling(doc_ref: DocumentRef, pos: usize) -> NifResult<Option<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.previous_sibling(pos))
}

#[rustler::nif]
fn children(doc_ref: DocumentRef, pos: usize) -> NifResult<Vec<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.child_positions(pos))
}

/// Descendant elements matching a qualified name, `"*"` for all
#[rustler::nif]
fn elements_by_tag_name(doc_ref: DocumentRef, pos: usize, name: &str) -> NifResult<Vec<usize>> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.elements_by_tag_name(pos, name))
}

// ============================================================================
// Node content
// ============================================================================

#[rustler::nif]
fn node_name(doc_ref: DocumentRef, pos: usize) -> NifResult<String> {
    check_node(&doc_ref, pos)?;
    Ok(Node::new(&doc_ref.tree, pos).node_name().into_owned())
}

#[rustler::nif]
fn attributes<'a>(env: Env<'a>, doc_ref: DocumentRef, pos: usize) -> NifResult<Term<'a>> {
    check_element(&doc_ref, pos)?;
    let e = doc_ref.tree.element_ordinal(pos).ok_or(rustler::Error::BadArg)?;
    Ok(term::attributes_to_term(env, &doc_ref.tree, e))
}

/// Attribute value by qualified name, `nil` when absent
#[rustler::nif]
fn get_attribute(doc_ref: DocumentRef, pos: usize, name: &str) -> NifResult<Option<String>> {
    check_element(&doc_ref, pos)?;
    let value = Node::new(&doc_ref.tree, pos)
        .attribute_node(name)
        .map(|attr| attr.value().to_string());
    Ok(value)
}

#[rustler::nif]
fn text_content(doc_ref: DocumentRef, pos: usize) -> NifResult<String> {
    check_node(&doc_ref, pos)?;
    Ok(doc_ref.tree.text_content(pos))
}

/// Byte range of a character node's data, `nil` when `offset` is past the end
#[rustler::nif]
fn substring(doc_ref: DocumentRef, pos: usize, offset: usize, count: usize) -> NifResult<Option<String>> {
    check_node(&doc_ref, pos)?;
    let node = Node::new(&doc_ref.tree, pos);
    if node.data().is_none() {
        return Err(rustler::Error::BadArg);
    }
    Ok(node.substring_data(offset, count).map(str::to_string))
}

#[rustler::nif]
fn node_to_term<'a>(env: Env<'a>, doc_ref: DocumentRef, pos: usize) -> NifResult<Term<'a>> {
    check_node(&doc_ref, pos)?;
    Ok(term::node_to_term(env, &doc_ref.tree, pos))
}

// ============================================================================
// Parallel reads
// ============================================================================

/// `text_content` of many nodes, computed on Rayon's pool
#[rustler::nif(schedule = "DirtyCpu")]
fn text_contents_parallel<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    positions: Vec<usize>,
) -> NifResult<Term<'a>> {
    for &pos in &positions {
        check_node(&doc_ref, pos)?;
    }
    let contents = batch::text_contents(&doc_ref.tree, &positions);
    Ok(term::strings_to_term(env, &contents))
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.SuccinctXML.Native");
