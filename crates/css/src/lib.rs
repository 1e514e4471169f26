pub mod query;
pub mod syntax;
pub mod values;

// Re-exports so other crates can just use `css::...` nicely.
pub use query::{matches, query_selector, query_selector_all};
pub use syntax::{
    AttrOp, Combinator, ComplexSelector, Compound, SelectorError, SelectorList, SimpleSelector,
    parse_selector_list,
};
pub use values::{Display, Length, background_image_layers, parse_display, parse_length};
