//! Lazy loading of CSS background images.
//!
//! Elements carrying a `data-background-image-url` attribute start without a background.
//! A [`LazyLoadCoordinator`] subscribes each of them to a [`VisibilityObserver`]; when one
//! scrolls into view its image is fetched through an [`ImageLoader`], and at the next frame
//! the element gets
//!
//! ```text
//! background-image: url(<source>),url(/static/image.png)
//! ```
//!
//! plus the loaded class. Once every element is loaded the observer is disconnected and the
//! coordinator goes inert.
//!
//! The coordinator is driven entirely by its host:
//!
//! ```text
//! observer batch  ──► on_visibility ──► ImageLoader::issue
//! fetch settled   ──► on_image_settled
//! next frame      ──► on_frame ──► style + class, unobserve, maybe disconnect
//! ```
//!
//! [`ViewportObserver`] is a geometry-based observer for hosts without a native one.

mod coordinator;
mod loader;
mod node;
mod observer;
mod options;

pub use coordinator::{LazyLoadCoordinator, LazyLoadError, LoadState, LoaderStats, PendingNode};
pub use loader::{ImageLoader, LoadOutcome};
pub use node::{FALLBACK_IMAGE_URL, LoadableNode, SOURCE_ATTRIBUTE};
pub use observer::{ViewportObserver, VisibilityEntry, VisibilityObserver};
pub use options::{DEFAULT_LOADED_CLASS, DEFAULT_SELECTOR, LazyLoadOptions};
