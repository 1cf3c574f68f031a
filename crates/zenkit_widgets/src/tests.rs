//! Cross-widget scenarios run against a full page

use std::cell::RefCell;
use std::rc::Rc;

use crate::prelude::*;
use crate::{compute_position, Placement};
use zenkit_core::{Point, Size, Viewport};

struct Page {
    zk: Zenkit,
    panel: NodeId,
    toggle: NodeId,
    other_toggle: NodeId,
    modal: NodeId,
    offcanvas: NodeId,
    toast: NodeId,
    tooltip: NodeId,
    popover: NodeId,
    accordion: NodeId,
}

fn page() -> Page {
    let mut doc = Document::new();
    let body = doc.body();
    *doc.viewport_mut() = Viewport {
        scroll_height: 2400.0,
        scrollbar_width: 17.0,
        ..Viewport::new(1000.0, 800.0)
    };

    doc.append(
        body,
        element("button")
            .data("toggle", "collapse")
            .data("target", "#panel"),
    );
    doc.append(body, element("div").id("panel").class("collapse"));
    for id in ["menu-a", "menu-b"] {
        doc.append(
            body,
            element("div")
                .class("dropdown")
                .child(element("button").id(id).class("dropdown-toggle"))
                .child(
                    element("ul")
                        .class("dropdown-menu")
                        .child(element("a").class("dropdown-item")),
                ),
        );
    }
    doc.append(
        body,
        element("div")
            .id("dialog")
            .class("modal fade")
            .child(element("div").class("modal-dialog")),
    );
    doc.append(
        body,
        element("div").id("side").class("offcanvas offcanvas-end"),
    );
    doc.append(
        body,
        element("div")
            .id("note")
            .class("toast")
            .child(element("div").class("toast-body").text("Saved")),
    );
    doc.append(
        body,
        element("button")
            .id("hint")
            .data("toggle", "tooltip")
            .attr("title", "Hint")
            .bounds(Rect::new(400.0, 300.0, 100.0, 40.0)),
    );
    doc.append(
        body,
        element("button")
            .id("info")
            .data("toggle", "popover")
            .data("content", "Details")
            .bounds(Rect::new(600.0, 300.0, 100.0, 40.0)),
    );
    let item = |open: bool| {
        element("div")
            .class("accordion-item")
            .child(element("button").class("accordion-button"))
            .child(element("div").class(if open {
                "accordion-collapse collapse show"
            } else {
                "accordion-collapse collapse"
            }))
    };
    doc.append(
        body,
        element("div")
            .id("faq")
            .class("accordion")
            .children([item(true), item(false), item(false)]),
    );

    let mut zk = Zenkit::new(doc);
    zk.init_all();
    let find = |zk: &Zenkit, selector: &str| zk.resolve(selector).unwrap();
    Page {
        panel: find(&zk, "#panel"),
        toggle: find(&zk, "#menu-a"),
        other_toggle: find(&zk, "#menu-b"),
        modal: find(&zk, "#dialog"),
        offcanvas: find(&zk, "#side"),
        toast: find(&zk, "#note"),
        tooltip: find(&zk, "#hint"),
        popover: find(&zk, "#info"),
        accordion: find(&zk, "#faq"),
        zk,
    }
}

fn count(zk: &mut Zenkit, node: NodeId, name: &str) -> Rc<RefCell<usize>> {
    let seen = Rc::new(RefCell::new(0));
    let counter = seen.clone();
    zk.on(node, name, move |_| *counter.borrow_mut() += 1);
    seen
}

fn assert_single_shown<W: Toggle>(node: fn(&Page) -> NodeId) {
    let mut p = page();
    let node = node(&p);
    let name = p.zk.event_name(W::KIND, "shown");
    let shown = count(&mut p.zk, node, &name);

    p.zk.show::<W>(node);
    p.zk.show::<W>(node);
    p.zk.advance(1000);
    p.zk.show::<W>(node);
    p.zk.advance(1000);

    assert_eq!(*shown.borrow(), 1, "{name}");
    assert_eq!(p.zk.visibility::<W>(node), Some(Visibility::Shown), "{name}");
}

fn assert_silent_hide<W: Toggle>(node: fn(&Page) -> NodeId) {
    let mut p = page();
    let node = node(&p);
    let hide = p.zk.event_name(W::KIND, "hide");
    let hidden = p.zk.event_name(W::KIND, "hidden");
    let fired = count(&mut p.zk, node, &hide);
    let done = count(&mut p.zk, node, &hidden);

    p.zk.hide::<W>(node);
    p.zk.advance(1000);

    assert_eq!(*fired.borrow() + *done.borrow(), 0, "{hide}");
    assert_eq!(p.zk.visibility::<W>(node), Some(Visibility::Hidden));
}

#[test]
fn test_repeated_show_notifies_once() {
    assert_single_shown::<Collapse>(|p| p.panel);
    assert_single_shown::<Dropdown>(|p| p.toggle);
    assert_single_shown::<Modal>(|p| p.modal);
    assert_single_shown::<Offcanvas>(|p| p.offcanvas);
    assert_single_shown::<Toast>(|p| p.toast);
    assert_single_shown::<Tooltip>(|p| p.tooltip);
    assert_single_shown::<Popover>(|p| p.popover);
}

#[test]
fn test_hide_when_hidden_is_silent() {
    assert_silent_hide::<Collapse>(|p| p.panel);
    assert_silent_hide::<Dropdown>(|p| p.toggle);
    assert_silent_hide::<Modal>(|p| p.modal);
    assert_silent_hide::<Offcanvas>(|p| p.offcanvas);
    assert_silent_hide::<Toast>(|p| p.toast);
    assert_silent_hide::<Tooltip>(|p| p.tooltip);
    assert_silent_hide::<Popover>(|p| p.popover);
}

#[test]
fn test_get_or_create_reuses_instance() {
    let mut p = page();
    let first = p.zk.get_or_create::<Modal>(p.modal, None);
    let second = p.zk.get_or_create::<Modal>(p.modal, None);
    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(p.zk.registries().len(WidgetKind::Modal), 1);
}

#[test]
fn test_accordion_keeps_one_item_open() {
    let mut p = page();
    let items: Vec<NodeId> = p
        .zk
        .instance::<Accordion>(p.accordion)
        .unwrap()
        .items()
        .collect();
    assert_eq!(items.len(), 3);

    let open = |zk: &Zenkit| {
        let accordion = zk.instance::<Accordion>(p.accordion).unwrap();
        items
            .iter()
            .filter(|item| accordion.item_visibility(**item) == Some(Visibility::Shown))
            .count()
    };
    assert_eq!(open(&p.zk), 1);

    for &item in &[items[1], items[2], items[0]] {
        Accordion::show_item(&mut p.zk, p.accordion, item);
        assert!(open(&p.zk) <= 1);
        p.zk.flush_frames();
        assert!(open(&p.zk) <= 1);
        p.zk.advance(400);
        assert_eq!(open(&p.zk), 1);
        let accordion = p.zk.instance::<Accordion>(p.accordion).unwrap();
        assert_eq!(accordion.item_visibility(item), Some(Visibility::Shown));
    }
}

#[test]
fn test_dropdowns_close_each_other() {
    let mut p = page();
    p.zk.click(p.toggle);
    assert_eq!(p.zk.visibility::<Dropdown>(p.toggle), Some(Visibility::Shown));

    p.zk.click(p.other_toggle);
    assert_eq!(p.zk.visibility::<Dropdown>(p.toggle), Some(Visibility::Hidden));
    assert_eq!(
        p.zk.visibility::<Dropdown>(p.other_toggle),
        Some(Visibility::Shown)
    );
}

#[test]
fn test_fallback_timer_completes_transition() {
    let mut p = page();
    let shown = count(&mut p.zk, p.modal, "shown.zk.modal");
    p.zk.show::<Modal>(p.modal);
    p.zk.flush_frames();
    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Showing));

    p.zk.advance(299);
    assert_eq!(*shown.borrow(), 0);
    p.zk.advance(1);
    assert_eq!(*shown.borrow(), 1);
    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Shown));
}

#[test]
fn test_late_transition_end_is_ignored() {
    let mut p = page();
    let shown = count(&mut p.zk, p.panel, "shown.zk.collapse");
    let hidden = count(&mut p.zk, p.panel, "hidden.zk.collapse");
    p.zk.show::<Collapse>(p.panel);
    p.zk.advance(350);
    assert_eq!(p.zk.visibility::<Collapse>(p.panel), Some(Visibility::Shown));

    p.zk.transition_end(p.panel);
    assert_eq!(p.zk.visibility::<Collapse>(p.panel), Some(Visibility::Shown));
    assert_eq!(*shown.borrow(), 1);

    p.zk.hide::<Collapse>(p.panel);
    assert_eq!(p.zk.visibility::<Collapse>(p.panel), Some(Visibility::Hiding));
    p.zk.advance(350);
    p.zk.transition_end(p.panel);
    assert_eq!(*hidden.borrow(), 1);
    assert_eq!(*shown.borrow(), 1);
}

#[test]
fn test_scroll_lock_outlives_first_overlay() {
    let mut p = page();
    let body = p.zk.document().body();

    p.zk.show::<Modal>(p.modal);
    p.zk.advance(300);
    assert!(p.zk.is_scroll_locked());
    assert_eq!(p.zk.document().style(body, "padding-right"), Some("17px"));

    // opening the offcanvas dismisses the modal
    p.zk.show::<Offcanvas>(p.offcanvas);
    p.zk.advance(300);
    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Hidden));
    assert_eq!(
        p.zk.visibility::<Offcanvas>(p.offcanvas),
        Some(Visibility::Shown)
    );
    assert!(p.zk.is_scroll_locked());
    let doc = p.zk.document();
    assert_eq!(doc.style(body, "overflow"), Some("hidden"));
    assert!(!doc.has_class(body, "modal-open"));

    p.zk.hide::<Offcanvas>(p.offcanvas);
    p.zk.advance(300);
    assert!(!p.zk.is_scroll_locked());
    let doc = p.zk.document();
    assert_eq!(doc.style(body, "overflow"), None);
    assert_eq!(doc.style(body, "padding-right"), None);
}

#[test]
fn test_overlay_waits_for_opening_sibling() {
    let mut p = page();
    p.zk.show::<Modal>(p.modal);
    p.zk.show::<Offcanvas>(p.offcanvas);
    p.zk.advance(1000);

    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Shown));
    assert_eq!(
        p.zk.visibility::<Offcanvas>(p.offcanvas),
        Some(Visibility::Hidden)
    );
    let backdrops = p
        .zk
        .document()
        .query_selector_all(".modal-backdrop, .offcanvas-backdrop")
        .unwrap();
    assert_eq!(backdrops.len(), 1);

    // once the modal has landed it can be dismissed as usual
    p.zk.show::<Offcanvas>(p.offcanvas);
    p.zk.advance(1000);
    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Hidden));
    assert_eq!(
        p.zk.visibility::<Offcanvas>(p.offcanvas),
        Some(Visibility::Shown)
    );
}

#[test]
fn test_transition_end_bubbles_from_descendant() {
    let mut p = page();
    let shown = count(&mut p.zk, p.modal, "shown.zk.modal");
    p.zk.show::<Modal>(p.modal);
    p.zk.flush_frames();
    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Showing));

    let dialog = p
        .zk
        .document()
        .query_selector_from(p.modal, ".modal-dialog")
        .unwrap()
        .unwrap();
    p.zk.transition_end(dialog);
    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Shown));
    assert_eq!(*shown.borrow(), 1);

    p.zk.advance(1000);
    assert_eq!(*shown.borrow(), 1);
}

#[test]
fn test_canceled_show_changes_nothing() {
    let mut p = page();
    p.zk.on(p.modal, "show.zk.modal", |e| e.prevent_default());
    let classes = p.zk.document().classes(p.modal).join(" ");

    p.zk.show::<Modal>(p.modal);
    p.zk.advance(1000);

    assert_eq!(p.zk.visibility::<Modal>(p.modal), Some(Visibility::Hidden));
    assert_eq!(p.zk.document().classes(p.modal).join(" "), classes);
    assert!(!p.zk.is_scroll_locked());
}

#[test]
fn test_custom_namespace_in_event_names() {
    let mut doc = Document::new();
    let body = doc.body();
    let panel = doc.append(body, element("div").id("more").class("collapse"));
    let config = ToolkitConfig {
        namespace: "app".to_string(),
        ..Default::default()
    };
    let mut zk = Zenkit::with_config(doc, config);
    zk.get_or_create::<Collapse>(panel, None);
    let shown = count(&mut zk, panel, "shown.app.collapse");

    zk.show::<Collapse>(panel);
    zk.advance(350);
    assert_eq!(*shown.borrow(), 1);
}

#[test]
fn test_removed_subtree_drops_instances() {
    let mut p = page();
    assert!(p.zk.instance::<Collapse>(p.panel).is_some());
    p.zk.remove_node(p.panel);
    assert!(p.zk.instance::<Collapse>(p.panel).is_none());
    assert_eq!(p.zk.registries().len(WidgetKind::Collapse), 0);

    // the trigger survives and clicking it is harmless
    let trigger = p.zk.resolve(r#"[data-toggle="collapse"]"#).unwrap();
    p.zk.click(trigger);
    p.zk.advance(350);
    assert!(p.zk.resolve("#panel").is_none());
}

#[test]
fn test_runtimes_are_independent() {
    let mut a = page();
    let b = page();
    a.zk.show::<Modal>(a.modal);
    a.zk.advance(300);
    assert!(a.zk.is_scroll_locked());
    assert!(!b.zk.is_scroll_locked());
    assert_eq!(b.zk.visibility::<Modal>(b.modal), Some(Visibility::Hidden));
}

#[test]
fn test_floating_position_stays_in_view() {
    let viewport = Size::new(1000.0, 800.0);
    let floating = Size::new(120.0, 40.0);

    let trigger = Rect::new(400.0, 300.0, 100.0, 40.0);
    let pos = compute_position(trigger, floating, Placement::Top, viewport, Point::ZERO, 8.0);
    assert!(pos.top < trigger.top());
    assert_eq!(pos.placement, Placement::Top);

    let edge = Rect::new(960.0, 300.0, 30.0, 20.0);
    let pos = compute_position(edge, floating, Placement::Top, viewport, Point::ZERO, 8.0);
    assert_eq!(pos.left, 1000.0 - 120.0 - 8.0);

    let start = Rect::new(0.0, 300.0, 20.0, 20.0);
    let pos = compute_position(start, floating, Placement::Bottom, viewport, Point::ZERO, 8.0);
    assert_eq!(pos.left, 8.0);
}
