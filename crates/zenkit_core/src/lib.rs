//! ZenKit Core
//!
//! Foundational pieces shared by every ZenKit widget:
//!
//! - **Document model**: a headless element tree mirroring the host page
//! - **Selectors**: the CSS subset used to resolve roots, items and triggers
//! - **Lifecycle events**: cancelable `show`/`hide` and past-tense notifications
//! - **Instance registry**: node-keyed side table for idempotent construction
//! - **Configuration**: toolkit-wide settings and `data-*` option parsing
//!
//! # Example
//!
//! ```rust
//! use zenkit_core::dom::{element, Document};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let item = doc.append(body, element("div").class("accordion-item"));
//!
//! assert_eq!(doc.query_selector(".accordion-item").unwrap(), Some(item));
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod geometry;
pub mod registry;
pub mod selector;

pub use config::{Dataset, FallbackDurations, ToolkitConfig};
pub use dom::{element, Document, ElementSpec, NodeId, Viewport};
pub use error::{Result, SelectorError, ZenkitError};
pub use events::{
    Direction, EventBus, EventDetail, InputEvent, InputKind, Key, ListenerId, WidgetEvent,
};
pub use geometry::{Point, Rect, Size};
pub use registry::{InstanceId, InstanceRegistry};
pub use selector::SelectorList;
