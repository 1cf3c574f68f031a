//! Tabs, pills and list-group panes
//!
//! A trigger shows the pane named by its `data-target` or `href`. The
//! previously active trigger is the `.active` toggle in the same
//! `.nav`/`.list-group`; both the hide event on it and the show event on
//! the new trigger are cancelable.

use zenkit_core::{EventDetail, InputKind, InstanceId, InstanceRegistry, NodeId};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Registries, Widget, WidgetKind};

const LIST_SELECTOR: &str = ".nav, .list-group";
const ACTIVE_TOGGLE: &str =
    r#".active[data-toggle="tab"], .active[data-toggle="pill"], .active[data-toggle="list"]"#;

#[derive(Debug)]
pub struct Tab {
    id: InstanceId,
}

impl Tab {
    fn pane(zk: &Zenkit, node: NodeId) -> Option<NodeId> {
        let reference = zk
            .doc
            .data(node, "target")
            .or_else(|| zk.doc.attr(node, "href"))?;
        zk.doc.resolve_target(reference)
    }

    /// Activate this trigger and its pane
    pub fn show(zk: &mut Zenkit, node: NodeId) {
        if !zk.registries.contains(WidgetKind::Tab, node)
            || zk.doc.has_class(node, "active")
            || zk.doc.has_class(node, "disabled")
        {
            return;
        }
        let Some(pane) = Self::pane(zk, node) else {
            return;
        };
        let list = zk.doc.closest_match(node, LIST_SELECTOR);
        let previous = list.and_then(|list| zk.doc.find(list, ACTIVE_TOGGLE));

        let hide_allowed = match previous {
            Some(previous) => zk.emit(
                previous,
                WidgetKind::Tab,
                "hide",
                true,
                EventDetail::RelatedTarget(Some(node)),
            ),
            None => true,
        };
        let show_allowed = zk.emit(
            node,
            WidgetKind::Tab,
            "show",
            true,
            EventDetail::RelatedTarget(previous),
        );
        if !hide_allowed || !show_allowed {
            return;
        }

        if let Some(list) = list {
            Self::activate(zk, node, list);
        }
        if let Some(container) = zk.doc.parent(pane) {
            Self::activate(zk, pane, container);
        }
        tracing::debug!("tab {:?} shown", node);

        if let Some(previous) = previous {
            zk.emit(
                previous,
                WidgetKind::Tab,
                "hidden",
                false,
                EventDetail::RelatedTarget(Some(node)),
            );
        }
        zk.emit(
            node,
            WidgetKind::Tab,
            "shown",
            false,
            EventDetail::RelatedTarget(previous),
        );
    }

    /// Make `element` the only active element in `container`
    fn activate(zk: &mut Zenkit, element: NodeId, container: NodeId) {
        for active in zk.doc.find_all(container, ".active") {
            zk.doc.remove_class(active, "active show");
            if zk.doc.attr(active, "role") == Some("tab") {
                zk.doc.set_attr(active, "aria-selected", "false");
            }
        }
        zk.doc.add_class(element, "active");
        if zk.doc.attr(element, "role") == Some("tab") {
            zk.doc.set_attr(element, "aria-selected", "true");
        }
        if zk.doc.has_class(element, "fade") {
            zk.request_frame(Task::AddClass(element, "show"));
        }
    }
}

impl Widget for Tab {
    type Options = ();

    const KIND: WidgetKind = WidgetKind::Tab;
    const SELECTOR: &'static str =
        r#"[data-toggle="tab"], [data-toggle="pill"], [data-toggle="list"]"#;

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.tabs
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.tabs
    }

    fn options_from_dataset(_zk: &Zenkit, _node: NodeId) {}

    fn construct(zk: &mut Zenkit, node: NodeId, _options: ()) -> Self {
        zk.bind(Owner::of::<Self>(node), node, InputKind::Click, Action::TabShow);
        Self {
            id: InstanceId::next(),
        }
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    if action == Action::TabShow {
        ctx.prevent_default();
        Tab::show(zk, node);
    }
}
