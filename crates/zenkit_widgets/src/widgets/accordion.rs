//! Accordion: a group of collapsible items, at most one open by default
//!
//! Markup: `.accordion` > `.accordion-item` > (`.accordion-button`,
//! `.accordion-collapse`). Each item runs its own transition state machine;
//! the accordion coordinates them. Opening an item first closes its open
//! siblings unless `always_open` is set, and an item cannot start opening
//! while a sibling is still opening, so two items are never both `Shown`.
//!
//! Notifications (`show`, `shown`, `hide`, `hidden`) are dispatched on the
//! accordion root with [`EventDetail::Item`] naming the item.

use zenkit_animation::{TransitionState, TransitionToken, Visibility};
use zenkit_core::{Dataset, EventDetail, InputKind, InstanceId, InstanceRegistry, NodeId};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Registries, Widget, WidgetKind};

use super::collapse::{begin_contract, begin_expand, mark_triggers, settle};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccordionOptions {
    /// Let several items stay open at once
    pub always_open: bool,
}

impl AccordionOptions {
    pub fn from_dataset(data: Dataset<'_>) -> Self {
        Self {
            always_open: data.flag("always-open", false),
        }
    }
}

#[derive(Clone, Debug)]
struct AccordionItem {
    item: NodeId,
    button: NodeId,
    panel: NodeId,
    state: TransitionState,
}

#[derive(Debug)]
pub struct Accordion {
    id: InstanceId,
    options: AccordionOptions,
    items: Vec<AccordionItem>,
}

impl Accordion {
    pub fn options(&self) -> &AccordionOptions {
        &self.options
    }

    /// Item elements in document order
    pub fn items(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().map(|i| i.item)
    }

    pub fn item_visibility(&self, item: NodeId) -> Option<Visibility> {
        self.entry(item).map(|i| i.state.visibility())
    }

    fn entry(&self, item: NodeId) -> Option<&AccordionItem> {
        self.items.iter().find(|i| i.item == item)
    }

    fn entry_mut(&mut self, item: NodeId) -> Option<&mut AccordionItem> {
        self.items.iter_mut().find(|i| i.item == item)
    }

    /// Open `item` when closed, close it when open
    pub fn toggle_item(zk: &mut Zenkit, node: NodeId, item: NodeId) {
        let visibility = zk
            .instance::<Accordion>(node)
            .and_then(|a| a.item_visibility(item));
        match visibility {
            Some(Visibility::Shown) => Self::hide_item(zk, node, item),
            Some(_) => Self::show_item(zk, node, item),
            None => {}
        }
    }

    pub fn show_item(zk: &mut Zenkit, node: NodeId, item: NodeId) {
        let Some(accordion) = zk.instance::<Accordion>(node) else {
            return;
        };
        if !accordion.entry(item).is_some_and(|i| i.state.can_show()) {
            return;
        }
        let always_open = accordion.options.always_open;
        if !always_open
            && accordion
                .items
                .iter()
                .any(|i| i.state.visibility() == Visibility::Showing)
        {
            tracing::debug!("accordion {:?}: an item is still opening", node);
            return;
        }
        let open_siblings: Vec<NodeId> = if always_open {
            Vec::new()
        } else {
            accordion
                .items
                .iter()
                .filter(|i| i.item != item && i.state.visibility().is_shown())
                .map(|i| i.item)
                .collect()
        };

        if !zk.emit(node, WidgetKind::Accordion, "show", true, EventDetail::Item(item)) {
            return;
        }
        for sibling in open_siblings {
            Self::hide_item(zk, node, sibling);
        }

        let Some((token, button, panel)) = zk
            .instance_mut::<Accordion>(node)
            .and_then(|a| a.entry_mut(item))
            .and_then(|i| Some((i.state.begin_show()?, i.button, i.panel)))
        else {
            return;
        };
        mark_triggers(zk, &[button], true);
        begin_expand(zk, panel);
        Self::await_panel(zk, node, panel, token);
    }

    pub fn hide_item(zk: &mut Zenkit, node: NodeId, item: NodeId) {
        let can_hide = zk
            .instance::<Accordion>(node)
            .and_then(|a| a.entry(item))
            .is_some_and(|i| i.state.can_hide());
        if !can_hide {
            return;
        }
        if !zk.emit(node, WidgetKind::Accordion, "hide", true, EventDetail::Item(item)) {
            return;
        }

        let Some((token, button, panel)) = zk
            .instance_mut::<Accordion>(node)
            .and_then(|a| a.entry_mut(item))
            .and_then(|i| Some((i.state.begin_hide()?, i.button, i.panel)))
        else {
            return;
        };
        mark_triggers(zk, &[button], false);
        begin_contract(zk, panel);
        Self::await_panel(zk, node, panel, token);
    }

    fn await_panel(zk: &mut Zenkit, node: NodeId, panel: NodeId, token: TransitionToken) {
        let fallback = zk.config.durations.collapse;
        zk.complete_on_transition_end(
            panel,
            fallback,
            Task::Complete {
                kind: WidgetKind::Accordion,
                node,
                token,
            },
        );
    }
}

impl Widget for Accordion {
    type Options = AccordionOptions;

    const KIND: WidgetKind = WidgetKind::Accordion;
    const SELECTOR: &'static str = ".accordion";

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.accordions
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.accordions
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> AccordionOptions {
        AccordionOptions::from_dataset(Dataset::new(&zk.doc, node))
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: AccordionOptions) -> Self {
        let items: Vec<AccordionItem> = zk
            .doc
            .find_all(node, ".accordion-item")
            .into_iter()
            .filter_map(|item| {
                let button = zk.doc.find(item, ".accordion-button")?;
                let panel = zk.doc.find(item, ".accordion-collapse")?;
                let state = if zk.doc.has_class(panel, "show") {
                    TransitionState::shown()
                } else {
                    TransitionState::new()
                };
                Some(AccordionItem {
                    item,
                    button,
                    panel,
                    state,
                })
            })
            .collect();

        let owner = Owner::of::<Self>(node);
        for entry in &items {
            zk.bind(
                owner,
                entry.button,
                InputKind::Click,
                Action::AccordionToggle { item: entry.item },
            );
        }

        Self {
            id: InstanceId::next(),
            options,
            items,
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        let pending: Vec<(NodeId, bool)> = zk
            .instance::<Accordion>(node)
            .map(|a| {
                a.items
                    .iter()
                    .filter(|i| i.state.visibility().is_transitioning())
                    .map(|i| (i.panel, i.state.visibility() == Visibility::Showing))
                    .collect()
            })
            .unwrap_or_default();
        for (panel, open) in pending {
            settle(zk, panel, open);
        }
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some((item, panel, settled)) = zk.instance_mut::<Accordion>(node).and_then(|a| {
            let entry = a
                .items
                .iter_mut()
                .find(|i| i.state.active_token() == Some(token))?;
            let settled = entry.state.finish(token)?;
            Some((entry.item, entry.panel, settled))
        }) else {
            return;
        };

        let open = settled == Visibility::Shown;
        settle(zk, panel, open);
        let verb = if open { "shown" } else { "hidden" };
        zk.emit(node, WidgetKind::Accordion, verb, false, EventDetail::Item(item));
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    if let Action::AccordionToggle { item } = action {
        ctx.prevent_default();
        Accordion::toggle_item(zk, node, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use zenkit_core::{element, Document, ElementSpec};

    fn item(open: bool) -> ElementSpec {
        let panel = if open {
            "accordion-collapse collapse show"
        } else {
            "accordion-collapse collapse"
        };
        element("div").class("accordion-item").children([
            element("button").class("accordion-button"),
            element("div").class(panel),
        ])
    }

    fn accordion(always_open: bool) -> (Zenkit, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let mut root = element("div")
            .class("accordion")
            .children([item(true), item(false), item(false)]);
        if always_open {
            root = root.data("always-open", "");
        }
        let node = doc.append(body, root);
        let items = doc.query_selector_all(".accordion-item").unwrap();
        let mut zk = Zenkit::new(doc);
        zk.get_or_create::<Accordion>(node, None);
        (zk, node, items)
    }

    fn shown_count(zk: &Zenkit, node: NodeId) -> usize {
        let accordion = zk.instance::<Accordion>(node).unwrap();
        accordion
            .items()
            .filter(|&i| accordion.item_visibility(i) == Some(Visibility::Shown))
            .count()
    }

    #[test]
    fn test_initial_state_from_markup() {
        let (zk, node, items) = accordion(false);
        let accordion = zk.instance::<Accordion>(node).unwrap();
        assert_eq!(accordion.items().count(), 3);
        assert_eq!(accordion.item_visibility(items[0]), Some(Visibility::Shown));
        assert_eq!(accordion.item_visibility(items[1]), Some(Visibility::Hidden));
    }

    #[test]
    fn test_opening_closes_siblings() {
        let (mut zk, node, items) = accordion(false);
        Accordion::show_item(&mut zk, node, items[1]);
        {
            let accordion = zk.instance::<Accordion>(node).unwrap();
            assert_eq!(accordion.item_visibility(items[0]), Some(Visibility::Hiding));
            assert_eq!(accordion.item_visibility(items[1]), Some(Visibility::Showing));
        }
        assert!(shown_count(&zk, node) <= 1);

        zk.advance(350);
        let accordion = zk.instance::<Accordion>(node).unwrap();
        assert_eq!(accordion.item_visibility(items[0]), Some(Visibility::Hidden));
        assert_eq!(accordion.item_visibility(items[1]), Some(Visibility::Shown));
        assert_eq!(shown_count(&zk, node), 1);
    }

    #[test]
    fn test_no_second_item_opens_while_one_is_opening() {
        let (mut zk, node, items) = accordion(false);
        Accordion::show_item(&mut zk, node, items[1]);
        Accordion::show_item(&mut zk, node, items[2]);
        zk.advance(350);
        let accordion = zk.instance::<Accordion>(node).unwrap();
        assert_eq!(accordion.item_visibility(items[2]), Some(Visibility::Hidden));
        assert_eq!(shown_count(&zk, node), 1);
    }

    #[test]
    fn test_always_open_keeps_siblings() {
        let (mut zk, node, items) = accordion(true);
        Accordion::show_item(&mut zk, node, items[1]);
        zk.advance(350);
        assert_eq!(shown_count(&zk, node), 2);
    }

    #[test]
    fn test_button_click_toggles_item() {
        let (mut zk, node, items) = accordion(false);
        let button = zk.document().find(items[0], ".accordion-button").unwrap();
        zk.click(button);
        assert!(zk.document().has_class(button, "collapsed"));
        assert_eq!(zk.document().attr(button, "aria-expanded"), Some("false"));
        zk.advance(350);
        assert_eq!(shown_count(&zk, node), 0);
    }

    #[test]
    fn test_events_carry_item() {
        let (mut zk, node, items) = accordion(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        zk.on(node, "shown.zk.accordion", move |e| {
            log.borrow_mut().push(e.detail().clone())
        });
        Accordion::show_item(&mut zk, node, items[2]);
        let panel = zk
            .document()
            .find(items[2], ".accordion-collapse")
            .unwrap();
        zk.transition_end(panel);
        assert_eq!(*seen.borrow(), vec![EventDetail::Item(items[2])]);
    }
}
