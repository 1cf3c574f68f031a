//! The ZenKit runtime
//!
//! [`Zenkit`] is the explicitly passed shared context every widget operates
//! on. It owns the document, the lifecycle event bus, the virtual-time
//! scheduler, the per-kind instance registries, the input binding table and
//! the page-level state (backdrops, body scroll lock). Nothing is global, so
//! independent runtimes (two documents in one test) never interfere.
//!
//! # Example
//!
//! ```ignore
//! use zenkit_widgets::prelude::*;
//!
//! let mut zk = Zenkit::new(doc);
//! zk.init_all();
//!
//! let modal = zk.resolve("#confirm").unwrap();
//! zk.on(modal, "shown.zk.modal", |_| println!("visible"));
//! zk.show::<Modal>(modal);
//! zk.advance(300);
//! assert_eq!(zk.visibility::<Modal>(modal), Some(Visibility::Shown));
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use zenkit_animation::{Scheduler, TimerId, TransitionToken, Visibility};
use zenkit_core::{
    Document, EventBus, EventDetail, InputEvent, InputKind, InstanceId, Key, ListenerId, NodeId,
    Size, ToolkitConfig, WidgetEvent,
};

use crate::bindings::{Action, Binding, Bindings, InputContext};
use crate::page::PageState;
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Registries, Toggle, Widget, WidgetKind};
use crate::widgets::{
    self, Accordion, Carousel, Collapse, Dropdown, Modal, Offcanvas, Popover, ScrollSpy, Tab,
    Toast, Tooltip,
};

/// Host-provided layout measurement for elements the runtime creates
pub type MeasureFn = Box<dyn Fn(&Document, NodeId) -> Size>;

/// Upper bound on chained animation frames flushed in one call
const MAX_FRAME_PASSES: usize = 16;

/// Shared widget runtime
pub struct Zenkit {
    pub(crate) doc: Document,
    pub(crate) events: EventBus,
    pub(crate) scheduler: Scheduler<Task>,
    pub(crate) config: ToolkitConfig,
    pub(crate) registries: Registries,
    pub(crate) bindings: Bindings,
    pub(crate) page: PageState,
    transition_waits: FxHashMap<NodeId, SmallVec<[TimerId; 1]>>,
    measure: Option<MeasureFn>,
}

impl std::fmt::Debug for Zenkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zenkit")
            .field("now", &self.scheduler.now())
            .field("nodes", &self.doc.len())
            .field("scheduler", &self.scheduler)
            .field("events", &self.events)
            .finish()
    }
}

impl Zenkit {
    pub fn new(doc: Document) -> Self {
        Self::with_config(doc, ToolkitConfig::default())
    }

    pub fn with_config(doc: Document, config: ToolkitConfig) -> Self {
        Self {
            doc,
            events: EventBus::new(),
            scheduler: Scheduler::new(),
            config,
            registries: Registries::default(),
            bindings: Bindings::default(),
            page: PageState::default(),
            transition_waits: FxHashMap::default(),
            measure: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for hosts mirroring layout (bounds, scroll, viewport)
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Install a measurement hook used to size tooltips and popovers the
    /// runtime creates. Without one, an element's own bounds are used.
    pub fn set_measure<F>(&mut self, measure: F)
    where
        F: Fn(&Document, NodeId) -> Size + 'static,
    {
        self.measure = Some(Box::new(measure));
    }

    /// Listen for a lifecycle notification on `node`
    pub fn on<F>(&mut self, node: NodeId, name: impl Into<String>, callback: F) -> ListenerId
    where
        F: FnMut(&mut WidgetEvent) + 'static,
    {
        self.events.on(node, name, callback)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Full lifecycle event name for `kind` and `verb`
    pub fn event_name(&self, kind: WidgetKind, verb: &str) -> String {
        self.config.event_name(verb, kind.event_name())
    }

    /// First element matching `selector`; invalid selectors resolve to nothing
    pub fn resolve(&self, selector: &str) -> Option<NodeId> {
        self.doc.find_in_document(selector)
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// Existing instance for `node`, or a new one built from `options`
    /// (declarative `data-*` options when `None`).
    ///
    /// Returns `None` when `node` does not exist: the widget is inert.
    pub fn get_or_create<W: Widget>(
        &mut self,
        node: NodeId,
        options: Option<W::Options>,
    ) -> Option<InstanceId> {
        if !self.doc.exists(node) {
            tracing::trace!("{} skipped: node {:?} is gone", W::KIND.event_name(), node);
            return None;
        }
        if let Some(existing) = W::registry(&self.registries).get(node) {
            return Some(existing.id());
        }

        let options = options.unwrap_or_else(|| W::options_from_dataset(self, node));
        let instance = W::construct(self, node, options);
        let id = W::registry_mut(&mut self.registries)
            .insert(node, instance)
            .id();
        tracing::debug!("{} attached to {:?}", W::KIND.event_name(), node);
        W::attached(self, node);
        Some(id)
    }

    pub fn instance<W: Widget>(&self, node: NodeId) -> Option<&W> {
        W::registry(&self.registries).get(node)
    }

    pub(crate) fn instance_mut<W: Widget>(&mut self, node: NodeId) -> Option<&mut W> {
        W::registry_mut(&mut self.registries).get_mut(node)
    }

    /// Tear down and unregister the instance for `node`
    pub fn dispose<W: Widget>(&mut self, node: NodeId) -> bool {
        if !W::registry(&self.registries).contains(node) {
            return false;
        }
        W::teardown(self, node);

        let owner = Owner::of::<W>(node);
        self.bindings.release(owner);
        self.scheduler.retain(|task| task.owner() != Some(owner));
        self.release_page(owner);
        W::registry_mut(&mut self.registries).remove(node);
        tracing::debug!("{} disposed on {:?}", W::KIND.event_name(), node);
        true
    }

    pub fn show<W: Toggle>(&mut self, node: NodeId) {
        W::show(self, node);
    }

    pub fn hide<W: Toggle>(&mut self, node: NodeId) {
        W::hide(self, node);
    }

    pub fn toggle<W: Toggle>(&mut self, node: NodeId) {
        W::toggle(self, node);
    }

    pub fn visibility<W: Toggle>(&self, node: NodeId) -> Option<Visibility> {
        self.instance::<W>(node)
            .map(|w| w.transition().visibility())
    }

    /// Destroy `node` and drop every instance, binding, listener and page
    /// resource that belonged to the removed subtree
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let removed = self.doc.remove(node);
        if removed == 0 {
            return 0;
        }
        for owner in self.registries.prune(&self.doc) {
            self.bindings.release(owner);
            self.scheduler.retain(|task| task.owner() != Some(owner));
            self.release_page(owner);
        }
        self.bindings.prune(&self.doc);
        let doc = &self.doc;
        self.events.retain_nodes(|n| doc.exists(n));
        self.transition_waits.retain(|n, _| doc.exists(*n));
        removed
    }

    // ========================================================================
    // Input routing
    // ========================================================================

    /// Forward host input on `target`. Returns whether a handler prevented
    /// the default action.
    pub fn dispatch_input(&mut self, target: NodeId, event: InputEvent) -> bool {
        if !self.doc.exists(target) {
            return false;
        }
        match event {
            InputEvent::Focus => self.doc.focus(target),
            InputEvent::Blur if self.doc.active_element() == Some(target) => self.doc.blur(),
            InputEvent::TransitionEnd => self.finish_transitions_on(target),
            _ => {}
        }

        let kind = event.kind();
        let path: SmallVec<[NodeId; 8]> = if event.bubbles() {
            std::iter::once(target)
                .chain(self.doc.ancestors(target))
                .collect()
        } else {
            SmallVec::from_elem(target, 1)
        };

        let mut ctx = InputContext::new(target, event);
        for node in path {
            if !self.doc.exists(node) {
                continue;
            }
            ctx.set_current(node);
            for binding in self.bindings.bindings_for(node, kind) {
                if self
                    .registries
                    .contains(binding.owner.kind, binding.owner.node)
                {
                    self.perform(binding, &mut ctx);
                }
            }
            if ctx.propagation_stopped() {
                break;
            }
        }
        ctx.default_prevented()
    }

    pub fn click(&mut self, target: NodeId) -> bool {
        self.dispatch_input(target, InputEvent::Click)
    }

    pub fn key_down(&mut self, target: NodeId, key: Key) -> bool {
        self.dispatch_input(target, InputEvent::KeyDown(key))
    }

    /// Report that a CSS transition on `target` finished. Like the DOM event
    /// it bubbles, so reporting it on a descendant of a widget also counts.
    pub fn transition_end(&mut self, target: NodeId) {
        self.dispatch_input(target, InputEvent::TransitionEnd);
    }

    fn perform(&mut self, binding: Binding, ctx: &mut InputContext) {
        let Binding { owner, action } = binding;
        tracing::trace!("{:?} -> {:?} on {:?}", ctx.event(), action, owner);
        match owner.kind {
            WidgetKind::Accordion => widgets::accordion::handle(self, owner.node, action, ctx),
            WidgetKind::Carousel => widgets::carousel::handle(self, owner.node, action, ctx),
            WidgetKind::Collapse => widgets::collapse::handle(self, owner.node, action, ctx),
            WidgetKind::Dropdown => widgets::dropdown::handle(self, owner.node, action, ctx),
            WidgetKind::Modal => widgets::modal::handle(self, owner.node, action, ctx),
            WidgetKind::Offcanvas => widgets::offcanvas::handle(self, owner.node, action, ctx),
            WidgetKind::Popover => {
                widgets::floating::handle::<Popover>(self, owner.node, action, ctx)
            }
            WidgetKind::ScrollSpy => widgets::scrollspy::handle(self, owner.node, action, ctx),
            WidgetKind::Tab => widgets::tabs::handle(self, owner.node, action, ctx),
            WidgetKind::Toast => widgets::toast::handle(self, owner.node, action, ctx),
            WidgetKind::Tooltip => {
                widgets::floating::handle::<Tooltip>(self, owner.node, action, ctx)
            }
        }
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Run pending animation-frame work
    pub fn flush_frames(&mut self) {
        for _ in 0..MAX_FRAME_PASSES {
            if !self.scheduler.has_frames() {
                return;
            }
            for task in self.scheduler.take_frame() {
                self.run_task(task);
            }
        }
        if self.scheduler.has_frames() {
            tracing::warn!("frame work still pending after {} passes", MAX_FRAME_PASSES);
        }
    }

    /// Move virtual time forward by `ms`, running frames and due timers in order
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now().saturating_add(ms);
        self.flush_frames();
        while let Some((id, task)) = self.scheduler.pop_due(until) {
            self.forget_wait(id);
            self.run_task(task);
            self.flush_frames();
        }
        self.scheduler.set_now(until);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Complete { kind, node, token } => self.complete_kind(kind, node, token),
            Task::Reveal { kind, node, token } => self.reveal_kind(kind, node, token),
            Task::AddClass(node, class) => self.doc.add_class(node, class),
            Task::RemoveClass(node, class) => self.doc.remove_class(node, class),
            Task::RemoveNode(node) => {
                self.remove_node(node);
            }
            Task::Expand(node) => {
                let height = self.doc.scroll_height(node);
                self.doc.set_style(node, "height", format!("{height}px"));
            }
            Task::Contract(node) => {
                self.doc.add_class(node, "collapsing");
                self.doc.set_style(node, "height", "0px");
            }
            Task::Autohide(node) => Toast::autohide_elapsed(self, node),
            Task::CarouselTick(node) => Carousel::tick(self, node),
            Task::DelayedShow { kind, node } => match kind {
                WidgetKind::Tooltip => widgets::floating::delayed_show::<Tooltip>(self, node),
                WidgetKind::Popover => widgets::floating::delayed_show::<Popover>(self, node),
                _ => {}
            },
            Task::DelayedHide { kind, node } => match kind {
                WidgetKind::Tooltip => widgets::floating::delayed_hide::<Tooltip>(self, node),
                WidgetKind::Popover => widgets::floating::delayed_hide::<Popover>(self, node),
                _ => {}
            },
        }
    }

    fn complete_kind(&mut self, kind: WidgetKind, node: NodeId, token: TransitionToken) {
        match kind {
            WidgetKind::Accordion => Accordion::complete(self, node, token),
            WidgetKind::Carousel => Carousel::complete(self, node, token),
            WidgetKind::Collapse => Collapse::complete(self, node, token),
            WidgetKind::Dropdown => Dropdown::complete(self, node, token),
            WidgetKind::Modal => Modal::complete(self, node, token),
            WidgetKind::Offcanvas => Offcanvas::complete(self, node, token),
            WidgetKind::Popover => Popover::complete(self, node, token),
            WidgetKind::ScrollSpy => ScrollSpy::complete(self, node, token),
            WidgetKind::Tab => Tab::complete(self, node, token),
            WidgetKind::Toast => Toast::complete(self, node, token),
            WidgetKind::Tooltip => Tooltip::complete(self, node, token),
        }
    }

    fn reveal_kind(&mut self, kind: WidgetKind, node: NodeId, token: TransitionToken) {
        match kind {
            WidgetKind::Accordion => Accordion::reveal(self, node, token),
            WidgetKind::Carousel => Carousel::reveal(self, node, token),
            WidgetKind::Collapse => Collapse::reveal(self, node, token),
            WidgetKind::Dropdown => Dropdown::reveal(self, node, token),
            WidgetKind::Modal => Modal::reveal(self, node, token),
            WidgetKind::Offcanvas => Offcanvas::reveal(self, node, token),
            WidgetKind::Popover => Popover::reveal(self, node, token),
            WidgetKind::ScrollSpy => ScrollSpy::reveal(self, node, token),
            WidgetKind::Tab => Tab::reveal(self, node, token),
            WidgetKind::Toast => Toast::reveal(self, node, token),
            WidgetKind::Tooltip => Tooltip::reveal(self, node, token),
        }
    }

    // ========================================================================
    // Crate internals
    // ========================================================================

    /// Dispatch a lifecycle notification; returns `false` when a listener
    /// canceled it
    pub(crate) fn emit(
        &mut self,
        node: NodeId,
        kind: WidgetKind,
        verb: &str,
        cancelable: bool,
        detail: EventDetail,
    ) -> bool {
        let name = self.event_name(kind, verb);
        let mut event = WidgetEvent::new(name, node, cancelable).with_detail(detail);
        self.events.dispatch(&mut event);
        if event.default_prevented() {
            tracing::debug!("{} canceled on {:?}", event.name(), node);
            return false;
        }
        true
    }

    pub(crate) fn bind(&mut self, owner: Owner, node: NodeId, kind: InputKind, action: Action) {
        self.bindings.bind(node, kind, owner, action);
    }

    pub(crate) fn schedule(&mut self, delay_ms: u64, task: Task) -> TimerId {
        self.scheduler.schedule(delay_ms, task)
    }

    pub(crate) fn cancel_timer(&mut self, id: Option<TimerId>) {
        if let Some(id) = id {
            self.scheduler.cancel(id);
            self.forget_wait(id);
        }
    }

    pub(crate) fn request_frame(&mut self, task: Task) {
        self.scheduler.request_frame(task);
    }

    /// Run `task` when `watched` reports a finished transition, or after
    /// `fallback_ms`, whichever happens first
    pub(crate) fn complete_on_transition_end(
        &mut self,
        watched: NodeId,
        fallback_ms: u64,
        task: Task,
    ) {
        let id = self.scheduler.schedule(fallback_ms, task);
        self.transition_waits.entry(watched).or_default().push(id);
    }

    /// `transitionend` bubbles: a finished transition on a descendant also
    /// completes waits registered on its ancestors
    fn finish_transitions_on(&mut self, target: NodeId) {
        let watched: SmallVec<[NodeId; 2]> = std::iter::once(target)
            .chain(self.doc.ancestors(target))
            .filter(|node| self.transition_waits.contains_key(node))
            .collect();
        for node in watched {
            let Some(waits) = self.transition_waits.remove(&node) else {
                continue;
            };
            for id in waits {
                if let Some(task) = self.scheduler.cancel(id) {
                    self.run_task(task);
                }
            }
        }
    }

    fn forget_wait(&mut self, id: TimerId) {
        self.transition_waits.retain(|_, waits| {
            waits.retain(|w| *w != id);
            !waits.is_empty()
        });
    }

    /// Size of an element, via the host hook when installed
    pub(crate) fn measure(&self, node: NodeId) -> Size {
        match &self.measure {
            Some(measure) => measure(&self.doc, node),
            None => self.doc.bounds(node).size(),
        }
    }
}
