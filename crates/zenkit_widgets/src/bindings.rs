//! Input bindings
//!
//! The runtime's stand-in for DOM event listeners. Constructing a widget binds
//! `(node, input kind)` pairs to [`Action`]s owned by that widget; input
//! forwarded by the host is routed from its target up through the ancestors
//! (for bubbling inputs) and every matching action is performed. Disposing a
//! widget releases all of its bindings at once.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use zenkit_core::{Document, InputEvent, InputKind, NodeId};

use crate::widget::Owner;

/// What a bound input does, interpreted by the owning widget
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    Show,
    Hide,
    Toggle,

    AccordionToggle { item: NodeId },

    CarouselPrev,
    CarouselNext,
    CarouselTo(usize),
    CarouselKey,
    CarouselPause,
    CarouselCycle,
    CarouselTouchStart,
    CarouselTouchEnd,

    DropdownToggle,
    DropdownKey,
    DropdownClickOutside,
    DropdownClickInside,

    /// Click landing directly on the modal root (outside its dialog)
    ModalRootClick,
    BackdropClick,
    Escape,

    ScheduleShow,
    ScheduleHide,
    FloatingClickOutside,

    SpyProcess,
    SpyIntersect { section: NodeId },
    SpyScrollTo { section: NodeId },

    TabShow,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Binding {
    pub owner: Owner,
    pub action: Action,
}

/// `(node, input kind)` -> bindings table
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    table: FxHashMap<(NodeId, InputKind), SmallVec<[Binding; 2]>>,
}

impl Bindings {
    pub fn bind(&mut self, node: NodeId, kind: InputKind, owner: Owner, action: Action) {
        self.table
            .entry((node, kind))
            .or_default()
            .push(Binding { owner, action });
    }

    pub fn bindings_for(&self, node: NodeId, kind: InputKind) -> SmallVec<[Binding; 2]> {
        self.table.get(&(node, kind)).cloned().unwrap_or_default()
    }

    /// Remove every binding owned by `owner`
    pub fn release(&mut self, owner: Owner) {
        self.table.retain(|_, list| {
            list.retain(|b| b.owner != owner);
            !list.is_empty()
        });
    }

    /// Remove bindings on destroyed nodes or owned by destroyed widgets
    pub fn prune(&mut self, doc: &Document) {
        self.table.retain(|(node, _), list| {
            if !doc.exists(*node) {
                return false;
            }
            list.retain(|b| doc.exists(b.owner.node));
            !list.is_empty()
        });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.table.values().map(|l| l.len()).sum()
    }
}

/// Routing state of one forwarded input
#[derive(Clone, Debug)]
pub struct InputContext {
    target: NodeId,
    current: NodeId,
    event: InputEvent,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl InputContext {
    pub(crate) fn new(target: NodeId, event: InputEvent) -> Self {
        Self {
            target,
            current: target,
            event,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Node the host dispatched the input on
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose binding is currently running
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub(crate) fn set_current(&mut self, node: NodeId) {
        self.current = node;
    }

    pub fn event(&self) -> InputEvent {
        self.event
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
