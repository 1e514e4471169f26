use serde::Deserialize;

pub const DEFAULT_SELECTOR: &str = "[data-background-image-url]";
pub const DEFAULT_LOADED_CLASS: &str = "loaded";

/// Which elements to lazy load and how to mark them once loaded.
///
/// Missing fields in a deserialized table fall back to their own default, one field at a
/// time: `{ loaded_class_name = "ready" }` keeps the default selector.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LazyLoadOptions {
    pub selector: String,
    pub loaded_class_name: String,
}

impl Default for LazyLoadOptions {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            loaded_class_name: DEFAULT_LOADED_CLASS.to_string(),
        }
    }
}

impl LazyLoadOptions {
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_loaded_class_name(mut self, class: impl Into<String>) -> Self {
        self.loaded_class_name = class.into();
        self
    }
}
