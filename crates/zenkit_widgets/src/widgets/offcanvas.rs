//! Offcanvas: a panel sliding in from a page edge
//!
//! Shares the backdrop and scroll-lock plumbing with modals. The panel moves
//! through `showing` -> `show` and `hiding` -> (none), always waiting for the
//! slide transition. Escape is handled at the document level.

use zenkit_animation::{TransitionState, TransitionToken, Visibility};
use zenkit_core::{
    Dataset, EventDetail, InputEvent, InputKind, InstanceId, InstanceRegistry, Key, NodeId,
};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::page::LockStyle;
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Registries, Toggle, Widget, WidgetKind};

use super::overlay::{
    dismiss_others, focus_autofocus, mark_dialog_closed, mark_dialog_open, other_opening,
    BackdropMode,
};
use super::settle_hidden;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffcanvasOptions {
    pub backdrop: BackdropMode,
    pub keyboard: bool,
    /// Keep the page scrollable while open
    pub scroll: bool,
}

impl Default for OffcanvasOptions {
    fn default() -> Self {
        Self {
            backdrop: BackdropMode::Enabled,
            keyboard: true,
            scroll: false,
        }
    }
}

impl OffcanvasOptions {
    pub fn from_dataset(data: Dataset<'_>) -> Self {
        let defaults = Self::default();
        Self {
            backdrop: data.parse_or("backdrop", defaults.backdrop),
            keyboard: data.flag("keyboard", defaults.keyboard),
            scroll: data.flag("scroll", defaults.scroll),
        }
    }
}

#[derive(Debug)]
pub struct Offcanvas {
    id: InstanceId,
    options: OffcanvasOptions,
    state: TransitionState,
}

impl Offcanvas {
    pub fn options(&self) -> &OffcanvasOptions {
        &self.options
    }

    fn await_slide(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let fallback = zk.config.durations.offcanvas;
        zk.complete_on_transition_end(
            node,
            fallback,
            Task::Complete {
                kind: WidgetKind::Offcanvas,
                node,
                token,
            },
        );
    }
}

impl Widget for Offcanvas {
    type Options = OffcanvasOptions;

    const KIND: WidgetKind = WidgetKind::Offcanvas;
    const SELECTOR: &'static str = ".offcanvas";

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.offcanvases
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.offcanvases
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> OffcanvasOptions {
        OffcanvasOptions::from_dataset(Dataset::new(&zk.doc, node))
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: OffcanvasOptions) -> Self {
        let owner = Owner::of::<Self>(node);
        if let Some(id) = zk.doc.id(node).map(str::to_string) {
            let selector = format!(
                r##"[data-toggle="offcanvas"][data-target="#{id}"], [data-toggle="offcanvas"][href="#{id}"]"##
            );
            for trigger in zk.doc.find_all_in_document(&selector) {
                zk.bind(owner, trigger, InputKind::Click, Action::Toggle);
            }
        }
        for button in zk.doc.find_all(node, r#"[data-dismiss="offcanvas"]"#) {
            zk.bind(owner, button, InputKind::Click, Action::Hide);
        }
        let root = zk.doc.root();
        zk.bind(owner, root, InputKind::KeyDown, Action::Escape);

        Self {
            id: InstanceId::next(),
            options,
            state: TransitionState::new(),
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        settle_hidden::<Self>(zk, node);
    }

    fn reveal(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let current = zk
            .instance::<Offcanvas>(node)
            .and_then(|o| o.state.active_token());
        if current == Some(token) {
            zk.doc.add_class(node, "show");
            Self::await_slide(zk, node, token);
        }
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some(settled) = zk
            .instance_mut::<Offcanvas>(node)
            .and_then(|o| o.state.finish(token))
        else {
            return;
        };
        if settled == Visibility::Shown {
            zk.doc.remove_class(node, "showing");
            focus_autofocus(zk, node);
            zk.emit(node, WidgetKind::Offcanvas, "shown", false, EventDetail::None);
        } else {
            zk.doc.remove_class(node, "hiding");
            mark_dialog_closed(zk, node);
            zk.release_page(Owner::of::<Self>(node));
            zk.emit(node, WidgetKind::Offcanvas, "hidden", false, EventDetail::None);
        }
    }
}

impl Toggle for Offcanvas {
    fn transition(&self) -> &TransitionState {
        &self.state
    }

    fn show(zk: &mut Zenkit, node: NodeId) {
        let Some(panel) = zk.instance::<Offcanvas>(node) else {
            return;
        };
        if !panel.state.can_show() {
            return;
        }
        let options = panel.options.clone();
        if other_opening(zk, Owner::of::<Self>(node)) {
            tracing::debug!("offcanvas {:?}: another overlay is still opening", node);
            return;
        }

        if !zk.emit(node, WidgetKind::Offcanvas, "show", true, EventDetail::None) {
            return;
        }
        let owner = Owner::of::<Self>(node);
        dismiss_others(zk, owner);

        let Some(token) = zk
            .instance_mut::<Offcanvas>(node)
            .and_then(|o| o.state.begin_show())
        else {
            return;
        };

        if options.backdrop != BackdropMode::Disabled {
            let backdrop = zk.show_backdrop(owner, "offcanvas-backdrop", true);
            zk.bind(owner, backdrop, InputKind::Click, Action::BackdropClick);
        }
        if !options.scroll {
            zk.lock_scroll(owner, LockStyle::OverflowOnly);
        }
        zk.doc.add_class(node, "showing");
        mark_dialog_open(zk, node);
        zk.request_frame(Task::Reveal {
            kind: WidgetKind::Offcanvas,
            node,
            token,
        });
    }

    fn hide(zk: &mut Zenkit, node: NodeId) {
        if !zk
            .instance::<Offcanvas>(node)
            .is_some_and(|o| o.state.can_hide())
        {
            return;
        }
        if !zk.emit(node, WidgetKind::Offcanvas, "hide", true, EventDetail::None) {
            return;
        }
        let Some(token) = zk
            .instance_mut::<Offcanvas>(node)
            .and_then(|o| o.state.begin_hide())
        else {
            return;
        };
        zk.doc.add_class(node, "hiding");
        zk.doc.remove_class(node, "show");
        Self::await_slide(zk, node, token);
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    let Some(panel) = zk.instance::<Offcanvas>(node) else {
        return;
    };
    let shown = panel.state.visibility().is_shown();
    let options = panel.options.clone();

    match action {
        Action::Toggle => {
            ctx.prevent_default();
            Offcanvas::toggle(zk, node);
        }
        Action::Hide => Offcanvas::hide(zk, node),
        Action::Escape => {
            if shown && options.keyboard && ctx.event() == InputEvent::KeyDown(Key::Escape) {
                Offcanvas::hide(zk, node);
            }
        }
        Action::BackdropClick => match options.backdrop {
            BackdropMode::Enabled => Offcanvas::hide(zk, node),
            BackdropMode::Static => {
                zk.emit(
                    node,
                    WidgetKind::Offcanvas,
                    "hidePrevented",
                    false,
                    EventDetail::None,
                );
            }
            BackdropMode::Disabled => {}
        },
        _ => {}
    }
}
