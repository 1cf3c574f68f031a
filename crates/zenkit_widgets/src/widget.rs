//! Widget traits and the per-kind instance registries

use zenkit_animation::{TransitionState, TransitionToken, Visibility};
use zenkit_core::{Document, InstanceId, InstanceRegistry, NodeId};

use crate::context::Zenkit;
use crate::query::Lookup;
use crate::widgets::{
    Accordion, Carousel, Collapse, Dropdown, Modal, Offcanvas, Popover, ScrollSpy, Tab, Toast,
    Tooltip,
};

/// The eleven widget families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    Accordion,
    Carousel,
    Collapse,
    Dropdown,
    Modal,
    Offcanvas,
    Popover,
    ScrollSpy,
    Tab,
    Toast,
    Tooltip,
}

impl WidgetKind {
    /// Bulk initialization order
    pub const ALL: [WidgetKind; 11] = [
        WidgetKind::Accordion,
        WidgetKind::Collapse,
        WidgetKind::Tab,
        WidgetKind::Dropdown,
        WidgetKind::Modal,
        WidgetKind::Offcanvas,
        WidgetKind::Toast,
        WidgetKind::Tooltip,
        WidgetKind::Popover,
        WidgetKind::Carousel,
        WidgetKind::ScrollSpy,
    ];

    /// Widget segment of lifecycle event names
    pub fn event_name(&self) -> &'static str {
        match self {
            WidgetKind::Accordion => "accordion",
            WidgetKind::Carousel => "carousel",
            WidgetKind::Collapse => "collapse",
            WidgetKind::Dropdown => "dropdown",
            WidgetKind::Modal => "modal",
            WidgetKind::Offcanvas => "offcanvas",
            WidgetKind::Popover => "popover",
            WidgetKind::ScrollSpy => "scrollspy",
            WidgetKind::Tab => "tab",
            WidgetKind::Toast => "toast",
            WidgetKind::Tooltip => "tooltip",
        }
    }
}

/// A widget instance identified by kind and controlled node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Owner {
    pub kind: WidgetKind,
    pub node: NodeId,
}

impl Owner {
    pub fn of<W: Widget>(node: NodeId) -> Self {
        Self {
            kind: W::KIND,
            node,
        }
    }
}

/// A behavior attached to one controlled node.
///
/// Instances are plain data owned by the runtime's registries; operations are
/// associated functions taking the runtime and the controlled node, so a
/// widget can reach the document, scheduler and sibling instances without
/// holding borrows across notifications.
pub trait Widget: Sized + 'static {
    type Options: Clone + Default + std::fmt::Debug;

    const KIND: WidgetKind;

    /// Default selector scanned by bulk initialization
    const SELECTOR: &'static str;

    fn id(&self) -> InstanceId;

    fn registry(registries: &Registries) -> &InstanceRegistry<Self>;

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self>;

    /// Read declarative options from the node's `data-*` attributes
    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> Self::Options;

    /// Build the instance and wire its input bindings
    fn construct(zk: &mut Zenkit, node: NodeId, options: Self::Options) -> Self;

    /// Runs once the instance is registered
    fn attached(_zk: &mut Zenkit, _node: NodeId) {}

    /// Undo construction side effects before the instance is dropped
    fn teardown(_zk: &mut Zenkit, _node: NodeId) {}

    /// A pending transition finished (transition-finished signal or fallback)
    fn complete(_zk: &mut Zenkit, _node: NodeId, _token: TransitionToken) {}

    /// Animation-frame step of a transition
    fn reveal(_zk: &mut Zenkit, _node: NodeId, _token: TransitionToken) {}

    /// Nodes bulk initialization should construct instances for
    fn discover(zk: &Zenkit) -> Vec<NodeId> {
        zk.doc.find_all_in_document(Self::SELECTOR)
    }
}

/// Widgets driven by the shared show/hide state machine
pub trait Toggle: Widget {
    fn transition(&self) -> &TransitionState;

    fn show(zk: &mut Zenkit, node: NodeId);

    fn hide(zk: &mut Zenkit, node: NodeId);

    /// Hide when `Shown`, otherwise show
    fn toggle(zk: &mut Zenkit, node: NodeId) {
        match zk.visibility::<Self>(node) {
            Some(Visibility::Shown) => Self::hide(zk, node),
            Some(_) => Self::show(zk, node),
            None => {}
        }
    }
}

/// One registry per widget kind
#[derive(Debug, Default)]
pub struct Registries {
    pub(crate) accordions: InstanceRegistry<Accordion>,
    pub(crate) carousels: InstanceRegistry<Carousel>,
    pub(crate) collapses: InstanceRegistry<Collapse>,
    pub(crate) dropdowns: InstanceRegistry<Dropdown>,
    pub(crate) modals: InstanceRegistry<Modal>,
    pub(crate) offcanvases: InstanceRegistry<Offcanvas>,
    pub(crate) popovers: InstanceRegistry<Popover>,
    pub(crate) scrollspies: InstanceRegistry<ScrollSpy>,
    pub(crate) tabs: InstanceRegistry<Tab>,
    pub(crate) toasts: InstanceRegistry<Toast>,
    pub(crate) tooltips: InstanceRegistry<Tooltip>,
}

impl Registries {
    pub fn contains(&self, kind: WidgetKind, node: NodeId) -> bool {
        match kind {
            WidgetKind::Accordion => self.accordions.contains(node),
            WidgetKind::Carousel => self.carousels.contains(node),
            WidgetKind::Collapse => self.collapses.contains(node),
            WidgetKind::Dropdown => self.dropdowns.contains(node),
            WidgetKind::Modal => self.modals.contains(node),
            WidgetKind::Offcanvas => self.offcanvases.contains(node),
            WidgetKind::Popover => self.popovers.contains(node),
            WidgetKind::ScrollSpy => self.scrollspies.contains(node),
            WidgetKind::Tab => self.tabs.contains(node),
            WidgetKind::Toast => self.toasts.contains(node),
            WidgetKind::Tooltip => self.tooltips.contains(node),
        }
    }

    pub fn len(&self, kind: WidgetKind) -> usize {
        match kind {
            WidgetKind::Accordion => self.accordions.len(),
            WidgetKind::Carousel => self.carousels.len(),
            WidgetKind::Collapse => self.collapses.len(),
            WidgetKind::Dropdown => self.dropdowns.len(),
            WidgetKind::Modal => self.modals.len(),
            WidgetKind::Offcanvas => self.offcanvases.len(),
            WidgetKind::Popover => self.popovers.len(),
            WidgetKind::ScrollSpy => self.scrollspies.len(),
            WidgetKind::Tab => self.tabs.len(),
            WidgetKind::Toast => self.toasts.len(),
            WidgetKind::Tooltip => self.tooltips.len(),
        }
    }

    /// Drop instances whose node was destroyed; returns their owners
    pub(crate) fn prune(&mut self, doc: &Document) -> Vec<Owner> {
        fn tag(kind: WidgetKind, nodes: Vec<NodeId>) -> impl Iterator<Item = Owner> {
            nodes.into_iter().map(move |node| Owner { kind, node })
        }

        let mut dead = Vec::new();
        dead.extend(tag(WidgetKind::Accordion, self.accordions.prune(doc)));
        dead.extend(tag(WidgetKind::Carousel, self.carousels.prune(doc)));
        dead.extend(tag(WidgetKind::Collapse, self.collapses.prune(doc)));
        dead.extend(tag(WidgetKind::Dropdown, self.dropdowns.prune(doc)));
        dead.extend(tag(WidgetKind::Modal, self.modals.prune(doc)));
        dead.extend(tag(WidgetKind::Offcanvas, self.offcanvases.prune(doc)));
        dead.extend(tag(WidgetKind::Popover, self.popovers.prune(doc)));
        dead.extend(tag(WidgetKind::ScrollSpy, self.scrollspies.prune(doc)));
        dead.extend(tag(WidgetKind::Tab, self.tabs.prune(doc)));
        dead.extend(tag(WidgetKind::Toast, self.toasts.prune(doc)));
        dead.extend(tag(WidgetKind::Tooltip, self.tooltips.prune(doc)));
        dead
    }
}
