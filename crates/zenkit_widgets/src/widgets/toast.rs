//! Toast notifications
//!
//! A toast fades in (`showing` -> `show`), optionally hides itself after a
//! delay, and fades out (`showing` -> `hide`). [`Zenkit::create_toast`]
//! builds the markup for a new toast and shows it.

use zenkit_animation::{TimerId, TransitionState, TransitionToken, Visibility};
use zenkit_core::{
    element, Dataset, EventDetail, InputKind, InstanceId, InstanceRegistry, NodeId, ToolkitConfig,
};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Registries, Toggle, Widget, WidgetKind};

const DEFAULT_CONTAINER: &str = ".toast-container";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToastOptions {
    /// Fade in and out
    pub animation: bool,
    pub autohide: bool,
    /// Autohide delay (ms)
    pub delay: u64,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            animation: true,
            autohide: true,
            delay: ToolkitConfig::default().toast_delay,
        }
    }
}

impl ToastOptions {
    pub fn from_dataset(data: Dataset<'_>, config: &ToolkitConfig) -> Self {
        Self {
            animation: data.flag("animation", true),
            autohide: data.flag("autohide", true),
            delay: data.parse_or("delay", config.toast_delay),
        }
    }
}

#[derive(Debug)]
pub struct Toast {
    id: InstanceId,
    options: ToastOptions,
    state: TransitionState,
    hide_timer: Option<TimerId>,
}

impl Toast {
    pub fn options(&self) -> &ToastOptions {
        &self.options
    }

    pub fn is_shown(&self) -> bool {
        self.state.visibility().is_shown()
    }

    fn schedule_hide(zk: &mut Zenkit, node: NodeId) {
        let Some(toast) = zk.instance::<Toast>(node) else {
            return;
        };
        if !toast.options.autohide {
            return;
        }
        let (delay, previous) = (toast.options.delay, toast.hide_timer);
        zk.cancel_timer(previous);
        let timer = zk.schedule(delay, Task::Autohide(node));
        if let Some(toast) = zk.instance_mut::<Toast>(node) {
            toast.hide_timer = Some(timer);
        }
    }

    fn clear_timer(zk: &mut Zenkit, node: NodeId) {
        let timer = zk
            .instance_mut::<Toast>(node)
            .and_then(|t| t.hide_timer.take());
        zk.cancel_timer(timer);
    }

    pub(crate) fn autohide_elapsed(zk: &mut Zenkit, node: NodeId) {
        if let Some(toast) = zk.instance_mut::<Toast>(node) {
            toast.hide_timer = None;
        }
        Self::hide(zk, node);
    }
}

impl Widget for Toast {
    type Options = ToastOptions;

    const KIND: WidgetKind = WidgetKind::Toast;
    const SELECTOR: &'static str = ".toast";

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.toasts
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.toasts
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> ToastOptions {
        ToastOptions::from_dataset(Dataset::new(&zk.doc, node), &zk.config)
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: ToastOptions) -> Self {
        if let Some(close) = zk.doc.find(node, r#"[data-dismiss="toast"]"#) {
            zk.bind(Owner::of::<Self>(node), close, InputKind::Click, Action::Hide);
        }
        let state = if zk.doc.has_class(node, "show") {
            TransitionState::shown()
        } else {
            TransitionState::new()
        };
        Self {
            id: InstanceId::next(),
            options,
            state,
            hide_timer: None,
        }
    }

    fn attached(zk: &mut Zenkit, node: NodeId) {
        if zk.instance::<Toast>(node).is_some_and(Toast::is_shown) {
            Self::schedule_hide(zk, node);
        }
    }

    /// Disposing a toast removes its element
    fn teardown(zk: &mut Zenkit, node: NodeId) {
        Self::clear_timer(zk, node);
        zk.remove_node(node);
    }

    fn reveal(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let current = zk
            .instance::<Toast>(node)
            .and_then(|t| t.state.active_token());
        if current != Some(token) {
            return;
        }
        zk.doc.remove_class(node, "showing");
        zk.doc.add_class(node, "show");
        Self::complete(zk, node, token);
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some(settled) = zk
            .instance_mut::<Toast>(node)
            .and_then(|t| t.state.finish(token))
        else {
            return;
        };
        if settled == Visibility::Shown {
            Self::schedule_hide(zk, node);
            zk.emit(node, WidgetKind::Toast, "shown", false, EventDetail::None);
        } else {
            zk.doc.remove_class(node, "showing");
            zk.doc.add_class(node, "hide");
            zk.emit(node, WidgetKind::Toast, "hidden", false, EventDetail::None);
        }
    }
}

impl Toggle for Toast {
    fn transition(&self) -> &TransitionState {
        &self.state
    }

    fn show(zk: &mut Zenkit, node: NodeId) {
        let Some(toast) = zk.instance::<Toast>(node) else {
            return;
        };
        if !toast.state.can_show() {
            return;
        }
        let animation = toast.options.animation;
        if !zk.emit(node, WidgetKind::Toast, "show", true, EventDetail::None) {
            return;
        }
        let Some(token) = zk
            .instance_mut::<Toast>(node)
            .and_then(|t| t.state.begin_show())
        else {
            return;
        };
        if animation {
            zk.doc.add_class(node, "fade");
        }
        zk.doc.remove_class(node, "hide");
        zk.doc.add_class(node, "showing");
        zk.request_frame(Task::Reveal {
            kind: WidgetKind::Toast,
            node,
            token,
        });
    }

    fn hide(zk: &mut Zenkit, node: NodeId) {
        let Some(toast) = zk.instance::<Toast>(node) else {
            return;
        };
        if !toast.state.can_hide() {
            return;
        }
        let animation = toast.options.animation;
        if !zk.emit(node, WidgetKind::Toast, "hide", true, EventDetail::None) {
            return;
        }
        Self::clear_timer(zk, node);
        let Some(token) = zk
            .instance_mut::<Toast>(node)
            .and_then(|t| t.state.begin_hide())
        else {
            return;
        };
        zk.doc.add_class(node, "showing");
        zk.doc.remove_class(node, "show");
        if animation {
            let fallback = zk.config.durations.toast;
            zk.complete_on_transition_end(
                node,
                fallback,
                Task::Complete {
                    kind: WidgetKind::Toast,
                    node,
                    token,
                },
            );
        } else {
            Self::complete(zk, node, token);
        }
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, _ctx: &mut InputContext) {
    if action == Action::Hide {
        Toast::hide(zk, node);
    }
}

// ============================================================================
// Programmatic creation
// ============================================================================

/// Description of a toast built by [`Zenkit::create_toast`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToastSpec {
    pub title: Option<String>,
    pub message: String,
    /// Variant suffix: `success` gives the `toast-success` class
    pub kind: Option<String>,
    pub autohide: bool,
    /// Autohide delay (ms); the toolkit default when `None`
    pub delay: Option<u64>,
    /// Selector of the container; `.toast-container`, then the body
    pub container: Option<String>,
}

impl Default for ToastSpec {
    fn default() -> Self {
        Self {
            title: None,
            message: String::new(),
            kind: None,
            autohide: true,
            delay: None,
            container: None,
        }
    }
}

impl ToastSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn autohide(mut self, autohide: bool) -> Self {
        self.autohide = autohide;
        self
    }

    pub fn delay(mut self, delay_ms: u64) -> Self {
        self.delay = Some(delay_ms);
        self
    }

    pub fn container(mut self, selector: impl Into<String>) -> Self {
        self.container = Some(selector.into());
        self
    }
}

impl Zenkit {
    /// Build a toast from `spec`, append it to its container and show it
    pub fn create_toast(&mut self, spec: ToastSpec) -> NodeId {
        let container = self
            .doc
            .find_in_document(spec.container.as_deref().unwrap_or(DEFAULT_CONTAINER))
            .unwrap_or_else(|| self.doc.body());

        let close = element("button")
            .attr("type", "button")
            .class("btn-close")
            .data("dismiss", "toast")
            .attr("aria-label", "Close");
        let mut markup = element("div")
            .class("toast")
            .attr("role", "alert")
            .attr("aria-live", "assertive")
            .attr("aria-atomic", "true");
        if let Some(kind) = spec.kind.as_deref().filter(|k| !k.is_empty()) {
            markup = markup.class(&format!("toast-{kind}"));
        }
        markup = markup.class("fade");
        markup = match spec.title.as_deref() {
            Some(title) => markup
                .child(
                    element("div")
                        .class("toast-header")
                        .child(element("strong").class("me-auto").text(title))
                        .child(close),
                )
                .child(element("div").class("toast-body").text(&spec.message)),
            None => markup.child(
                element("div")
                    .class("toast-body d-flex align-items-center justify-content-between")
                    .child(element("span").text(&spec.message))
                    .child(close),
            ),
        };

        let node = self.doc.append(container, markup);
        let options = ToastOptions {
            animation: true,
            autohide: spec.autohide,
            delay: spec.delay.unwrap_or(self.config.toast_delay),
        };
        self.get_or_create::<Toast>(node, Some(options));
        Toast::show(self, node);
        tracing::debug!("created toast {:?}", node);
        node
    }
}
