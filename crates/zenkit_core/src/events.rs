//! Lifecycle notifications and host input events
//!
//! Widgets announce every transition with two notifications named
//! `<verb>.<namespace>.<widget>`: a cancelable "about to" event
//! (`show.zk.modal`) and a past-tense completion event (`shown.zk.modal`).
//! Listeners registered on a node through [`EventBus::on`] may call
//! [`WidgetEvent::prevent_default`] on cancelable events to abort the
//! operation.
//!
//! [`InputEvent`] is the other direction: the host forwards pointer, keyboard,
//! scroll, intersection and transition-finished signals into the runtime.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::dom::NodeId;

new_key_type! {
    /// Handle returned by [`EventBus::on`], used to remove the listener
    pub struct ListenerId;
}

/// Slide direction reported by carousel notifications
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Prev => "prev",
        }
    }
}

/// Payload carried by a [`WidgetEvent`]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventDetail {
    #[default]
    None,
    /// The accordion item that changed
    Item(NodeId),
    /// The counterpart element (previous tab, scrollspy section, ...)
    RelatedTarget(Option<NodeId>),
    /// Carousel slide indices
    Slide {
        from: usize,
        to: usize,
        direction: Direction,
    },
}

/// A lifecycle notification dispatched on a widget's node
#[derive(Clone, Debug)]
pub struct WidgetEvent {
    name: String,
    target: NodeId,
    cancelable: bool,
    default_prevented: bool,
    detail: EventDetail,
}

impl WidgetEvent {
    pub fn new(name: impl Into<String>, target: NodeId, cancelable: bool) -> Self {
        Self {
            name: name.into(),
            target,
            cancelable,
            default_prevented: false,
            detail: EventDetail::None,
        }
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Cancel the pending operation; ignored for non-cancelable events
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

type Callback = Box<dyn FnMut(&mut WidgetEvent)>;

struct Listener {
    node: NodeId,
    name: String,
    callback: Callback,
}

/// Per-node listener table for lifecycle notifications
#[derive(Default)]
pub struct EventBus {
    listeners: SlotMap<ListenerId, Listener>,
    index: FxHashMap<(NodeId, String), SmallVec<[ListenerId; 2]>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `name` (e.g. `"shown.zk.modal"`) dispatched on `node`
    pub fn on<F>(&mut self, node: NodeId, name: impl Into<String>, callback: F) -> ListenerId
    where
        F: FnMut(&mut WidgetEvent) + 'static,
    {
        let name = name.into();
        let id = self.listeners.insert(Listener {
            node,
            name: name.clone(),
            callback: Box::new(callback),
        });
        self.index.entry((node, name)).or_default().push(id);
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        let key = (listener.node, listener.name);
        if let Some(ids) = self.index.get_mut(&key) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        true
    }

    /// Drop every listener attached to `node`
    pub fn clear_node(&mut self, node: NodeId) {
        self.retain_nodes(|n| n != node);
    }

    /// Drop listeners on nodes for which `keep` is false
    pub fn retain_nodes(&mut self, keep: impl Fn(NodeId) -> bool) {
        let dead: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, l)| !keep(l.node))
            .map(|(id, _)| id)
            .collect();
        for id in dead {
            self.off(id);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Run every listener for the event's target and name, in registration order
    pub fn dispatch(&mut self, event: &mut WidgetEvent) {
        let key = (event.target, event.name.clone());
        let Some(ids) = self.index.get(&key).cloned() else {
            return;
        };
        tracing::trace!("dispatch {} to {} listener(s)", event.name, ids.len());
        for id in ids {
            if let Some(listener) = self.listeners.get_mut(id) {
                (listener.callback)(event);
            }
        }
    }
}

// ============================================================================
// Host input
// ============================================================================

/// Keys the widgets react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Input forwarded from the host environment
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Click,
    KeyDown(Key),
    MouseEnter,
    MouseLeave,
    Focus,
    Blur,
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    Scroll,
    /// Visibility-intersection signal for an observed element
    Intersect { intersecting: bool },
    /// A CSS transition on the target finished
    TransitionEnd,
}

/// Discriminant of [`InputEvent`], used to key listener bindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    Click,
    KeyDown,
    MouseEnter,
    MouseLeave,
    Focus,
    Blur,
    TouchStart,
    TouchEnd,
    Scroll,
    Intersect,
    TransitionEnd,
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::Click => InputKind::Click,
            InputEvent::KeyDown(_) => InputKind::KeyDown,
            InputEvent::MouseEnter => InputKind::MouseEnter,
            InputEvent::MouseLeave => InputKind::MouseLeave,
            InputEvent::Focus => InputKind::Focus,
            InputEvent::Blur => InputKind::Blur,
            InputEvent::TouchStart { .. } => InputKind::TouchStart,
            InputEvent::TouchEnd { .. } => InputKind::TouchEnd,
            InputEvent::Scroll => InputKind::Scroll,
            InputEvent::Intersect { .. } => InputKind::Intersect,
            InputEvent::TransitionEnd => InputKind::TransitionEnd,
        }
    }

    /// Whether the event propagates to ancestors of its target
    pub fn bubbles(&self) -> bool {
        matches!(
            self,
            InputEvent::Click
                | InputEvent::KeyDown(_)
                | InputEvent::TouchStart { .. }
                | InputEvent::TouchEnd { .. }
        )
    }
}
