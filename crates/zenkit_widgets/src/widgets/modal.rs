//! Modal dialog
//!
//! Show sequence: `show` (cancelable) -> other overlays close -> body scroll
//! lock + backdrop -> `display: block` and dialog ARIA -> next frame adds
//! `show` -> transition (only with `.fade`) -> focus -> `shown`. Hiding runs
//! the reverse and releases the backdrop and scroll lock on completion.

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
pub struct ModalOptions {
    pub backdrop: BackdropMode,
    /// Escape closes the modal
    pub keyboard: bool,
    /// Move focus into the dialog once shown
    pub focus: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            backdrop: BackdropMode::Enabled,
            keyboard: true,
            focus: true,
        }
    }
}

impl ModalOptions {
    pub fn from_dataset(data: Dataset<'_>) -> Self {
        let defaults = Self::default();
        Self {
            backdrop: data.parse_or("backdrop", defaults.backdrop),
            keyboard: data.flag("keyboard", defaults.keyboard),
            focus: data.flag("focus", defaults.focus),
        }
    }
}

#[derive(Debug)]
pub struct Modal {
    id: InstanceId,
    options: ModalOptions,
    state: TransitionState,
    dialog: Option<NodeId>,
}

impl Modal {
    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    pub fn dialog(&self) -> Option<NodeId> {
        self.dialog
    }

    /// Re-pad the modal after its content height changed while open
    pub fn handle_update(zk: &mut Zenkit, node: NodeId) {
        let open = zk
            .instance::<Modal>(node)
            .is_some_and(|m| m.state.visibility().is_shown() && m.dialog.is_some());
        if !open {
            return;
        }
        let viewport = *zk.doc.viewport();
        let overflowing = zk.doc.scroll_height(node) > viewport.height;
        let width = format!("{}px", viewport.scrollbar_width);
        let (left, right) = if overflowing {
            (String::new(), width)
        } else {
            (width, String::new())
        };
        zk.doc.set_style(node, "padding-left", left);
        zk.doc.set_style(node, "padding-right", right);
    }

    /// Pulse `modal-static` and announce that closing was refused
    fn refuse_close(zk: &mut Zenkit, node: NodeId) {
        zk.doc.add_class(node, "modal-static");
        let pulse = zk.config.durations.static_pulse;
        zk.schedule(pulse, Task::RemoveClass(node, "modal-static"));
        zk.emit(
            node,
            WidgetKind::Modal,
            "hidePrevented",
            false,
            EventDetail::None,
        );
    }

    fn outside_click(zk: &mut Zenkit, node: NodeId) {
        let Some(modal) = zk.instance::<Modal>(node) else {
            return;
        };
        if !modal.state.visibility().is_shown() {
            return;
        }
        match modal.options.backdrop {
            BackdropMode::Enabled => Self::hide(zk, node),
            BackdropMode::Static => Self::refuse_close(zk, node),
            BackdropMode::Disabled => {}
        }
    }

    fn await_transition(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        if zk.doc.has_class(node, "fade") {
            let fallback = zk.config.durations.modal;
            zk.complete_on_transition_end(
                node,
                fallback,
                Task::Complete {
                    kind: WidgetKind::Modal,
                    node,
                    token,
                },
            );
        } else {
            Self::complete(zk, node, token);
        }
    }
}

impl Widget for Modal {
    type Options = ModalOptions;

    const KIND: WidgetKind = WidgetKind::Modal;
    const SELECTOR: &'static str = ".modal";

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.modals
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.modals
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> ModalOptions {
        ModalOptions::from_dataset(Dataset::new(&zk.doc, node))
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: ModalOptions) -> Self {
        let owner = Owner::of::<Self>(node);
        if let Some(id) = zk.doc.id(node).map(str::to_string) {
            let selector = format!(r##"[data-toggle="modal"][data-target="#{id}"]"##);
            for trigger in zk.doc.find_all_in_document(&selector) {
                zk.bind(owner, trigger, InputKind::Click, Action::Show);
            }
        }
        for button in zk.doc.find_all(node, r#"[data-dismiss="modal"]"#) {
            zk.bind(owner, button, InputKind::Click, Action::Hide);
        }
        zk.bind(owner, node, InputKind::Click, Action::ModalRootClick);
        zk.bind(owner, node, InputKind::KeyDown, Action::Escape);

        Self {
            id: InstanceId::next(),
            options,
            state: TransitionState::new(),
            dialog: zk.doc.find(node, ".modal-dialog"),
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        settle_hidden::<Self>(zk, node);
    }

    fn reveal(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let current = zk
            .instance::<Modal>(node)
            .and_then(|m| m.state.active_token());
        if current != Some(token) {
            return;
        }
        zk.doc.add_class(node, "show");
        Self::await_transition(zk, node, token);
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some((settled, focus, dialog)) = zk.instance_mut::<Modal>(node).and_then(|m| {
            let settled = m.state.finish(token)?;
            Some((settled, m.options.focus, m.dialog))
        }) else {
            return;
        };

        match settled {
            Visibility::Shown => {
                if focus && !focus_autofocus(zk, node) {
                    if let Some(dialog) = dialog {
                        zk.doc.focus(dialog);
                    }
                }
                zk.emit(node, WidgetKind::Modal, "shown", false, EventDetail::None);
            }
            _ => {
                zk.doc.set_style(node, "display", "none");
                mark_dialog_closed(zk, node);
                zk.release_page(Owner::of::<Self>(node));
                zk.emit(node, WidgetKind::Modal, "hidden", false, EventDetail::None);
            }
        }
    }
}

impl Toggle for Modal {
    fn transition(&self) -> &TransitionState {
        &self.state
    }

    fn show(zk: &mut Zenkit, node: NodeId) {
        let Some(modal) = zk.instance::<Modal>(node) else {
            return;
        };
        if !modal.state.can_show() {
            return;
        }
        let backdrop = modal.options.backdrop;
        if other_opening(zk, Owner::of::<Self>(node)) {
            tracing::debug!("modal {:?}: another overlay is still opening", node);
            return;
        }

        if !zk.emit(node, WidgetKind::Modal, "show", true, EventDetail::None) {
            return;
        }
        let owner = Owner::of::<Self>(node);
        dismiss_others(zk, owner);

        let Some(token) = zk
            .instance_mut::<Modal>(node)
            .and_then(|m| m.state.begin_show())
        else {
            return;
        };

        zk.lock_scroll(owner, LockStyle::Modal);
        if backdrop != BackdropMode::Disabled {
            let fade = zk.doc.has_class(node, "fade");
            let element = zk.show_backdrop(owner, "modal-backdrop", fade);
            zk.bind(owner, element, InputKind::Click, Action::BackdropClick);
        }
        zk.doc.set_style(node, "display", "block");
        mark_dialog_open(zk, node);
        zk.request_frame(Task::Reveal {
            kind: WidgetKind::Modal,
            node,
            token,
        });
    }

    fn hide(zk: &mut Zenkit, node: NodeId) {
        if !zk
            .instance::<Modal>(node)
            .is_some_and(|m| m.state.can_hide())
        {
            return;
        }
        if !zk.emit(node, WidgetKind::Modal, "hide", true, EventDetail::None) {
            return;
        }
        let Some(token) = zk
            .instance_mut::<Modal>(node)
            .and_then(|m| m.state.begin_hide())
        else {
            return;
        };
        zk.doc.remove_class(node, "show");
        Self::await_transition(zk, node, token);
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    match action {
        Action::Show => {
            ctx.prevent_default();
            Modal::show(zk, node);
        }
        Action::Hide => Modal::hide(zk, node),
        Action::ModalRootClick if ctx.target() == node => Modal::outside_click(zk, node),
        Action::BackdropClick => Modal::outside_click(zk, node),
        Action::Escape => {
            let keyboard = zk
                .instance::<Modal>(node)
                .is_some_and(|m| m.options.keyboard);
            if keyboard && ctx.event() == InputEvent::KeyDown(Key::Escape) {
                Modal::hide(zk, node);
            }
        }
        _ => {}
    }
}
