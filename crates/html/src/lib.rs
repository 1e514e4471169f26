pub mod dom_utils;

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::dom_builder::build_dom;
pub use crate::tokenizer::tokenize;
pub use crate::types::{Id, Node, NodeId, Token};

/// Tokenize, build and number a document in one step.
pub fn parse_document(input: &str) -> Node {
    let mut dom = build_dom(&tokenize(input));
    dom_utils::assign_node_ids(&mut dom);
    dom
}
