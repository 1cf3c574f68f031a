//! ZenKit Widgets
//!
//! Interactive widgets that attach behavior to markup through data attributes
//! and class toggling: accordion, carousel, collapse, dropdown, modal,
//! offcanvas, popover, scrollspy, tabs, toast and tooltip.
//!
//! Everything runs against the explicit [`Zenkit`] runtime: it owns the
//! document, the lifecycle event bus and a virtual clock. Hosts mirror layout
//! into the document, forward input with [`Zenkit::dispatch_input`] and move
//! time forward with [`Zenkit::advance`].
//!
//! # Example
//!
//! ```rust
//! use zenkit_widgets::prelude::*;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! doc.append(
//!     body,
//!     element("button")
//!         .id("open")
//!         .data("toggle", "collapse")
//!         .data("target", "#details"),
//! );
//! doc.append(body, element("div").id("details").class("collapse"));
//!
//! let mut zk = Zenkit::new(doc);
//! zk.init_all();
//!
//! let trigger = zk.resolve("#open").unwrap();
//! let details = zk.resolve("#details").unwrap();
//! zk.click(trigger);
//! zk.advance(350);
//! assert_eq!(zk.visibility::<Collapse>(details), Some(Visibility::Shown));
//! ```

mod bindings;
mod context;
mod init;
mod page;
mod query;
mod task;

pub mod position;
pub mod widget;
pub mod widgets;

#[cfg(test)]
mod tests;

pub use context::{MeasureFn, Zenkit};
pub use init::InitReport;
pub use position::{compute_position, menu_placement, FloatingPosition, Placement};
pub use widget::{Registries, Toggle, Widget, WidgetKind};
pub use widgets::*;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::context::Zenkit;
    pub use crate::init::InitReport;
    pub use crate::widget::{Toggle, Widget, WidgetKind};
    pub use crate::widgets::{
        Accordion, Carousel, Collapse, Dropdown, Modal, Offcanvas, Popover, ScrollSpy, Tab,
        Toast, ToastSpec, Tooltip,
    };

    pub use zenkit_animation::Visibility;
    pub use zenkit_core::{
        element, Document, EventDetail, InputEvent, Key, NodeId, Rect, ToolkitConfig,
        WidgetEvent,
    };
}
