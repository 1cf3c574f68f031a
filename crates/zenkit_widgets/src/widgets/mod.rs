//! The eleven ZenKit widgets
//!
//! Every widget is an owned struct registered per node in the runtime's
//! [`Registries`](crate::widget::Registries). Show/hide widgets implement
//! [`Toggle`]; carousel, scrollspy and tabs only implement
//! [`Widget`](crate::widget::Widget).

pub mod accordion;
pub mod carousel;
pub mod collapse;
pub mod dropdown;
pub(crate) mod floating;
pub mod modal;
pub mod offcanvas;
pub(crate) mod overlay;
pub mod popover;
pub mod scrollspy;
pub mod tabs;
pub mod toast;
pub mod tooltip;

pub use accordion::{Accordion, AccordionOptions};
pub use carousel::{Carousel, CarouselOptions, PauseMode};
pub use collapse::{Collapse, CollapseOptions};
pub use dropdown::{AutoClose, Dropdown, DropdownOptions, MenuOffset};
pub use floating::{Delay, FloatingOptions, Triggers};
pub use modal::{Modal, ModalOptions};
pub use offcanvas::{Offcanvas, OffcanvasOptions};
pub use overlay::BackdropMode;
pub use popover::{Popover, PopoverOptions};
pub use scrollspy::{ScrollSpy, ScrollSpyOptions, SpyMethod};
pub use tabs::Tab;
pub use toast::{Toast, ToastOptions, ToastSpec};
pub use tooltip::{Tooltip, TooltipOptions};

use zenkit_animation::Visibility;
use zenkit_core::NodeId;

use crate::context::Zenkit;
use crate::widget::Toggle;

/// Drive `node` to `Hidden` without waiting: land a pending show, hide, and
/// land the hide. Listeners still see the whole event sequence.
pub(crate) fn settle_hidden<W: Toggle>(zk: &mut Zenkit, node: NodeId) {
    let pending = |zk: &Zenkit, phase: Visibility| {
        zk.instance::<W>(node)
            .map(W::transition)
            .filter(|t| t.visibility() == phase)
            .and_then(|t| t.active_token())
    };

    if let Some(token) = pending(zk, Visibility::Showing) {
        W::complete(zk, node, token);
    }
    W::hide(zk, node);
    if let Some(token) = pending(zk, Visibility::Hiding) {
        W::complete(zk, node, token);
    }
}
