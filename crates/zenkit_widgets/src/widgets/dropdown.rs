//! Dropdown: toggleable menu with keyboard navigation
//!
//! The toggle (`[data-toggle="dropdown"]` or `.dropdown-toggle`) controls the
//! `.dropdown-menu` that follows it, or failing that the first menu inside its
//! parent. Opening a dropdown closes the open ones in its group: the closest
//! `[data-dropdown-group]` ancestor, or the whole document. Transitions are
//! instantaneous but still run through the state machine, so `show`/`shown`
//! and `hide`/`hidden` fire the same way as for animated widgets.

use std::str::FromStr;

use zenkit_animation::{TransitionState, TransitionToken};
use zenkit_core::{
    Dataset, EventDetail, InputEvent, InputKind, InstanceId, InstanceRegistry, Key, NodeId,
    ZenkitError,
};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::position::{menu_placement, DropDirection};
use crate::query::{is_text_input, Lookup};
use crate::widget::{Owner, Registries, Toggle, Widget, WidgetKind};

const GROUP_SELECTOR: &str = "[data-dropdown-group]";
const WRAPPER_SELECTOR: &str = ".dropdown, .dropup, .dropend, .dropstart";
const ITEM_SELECTOR: &str = ".dropdown-item:not(.disabled):not(:disabled)";

/// Which clicks close an open menu
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutoClose {
    /// Clicks inside and outside the menu
    #[default]
    Always,
    /// Only the toggle, keyboard and API close the menu
    Never,
    /// Clicks inside the menu
    Inside,
    /// Clicks outside the menu
    Outside,
}

impl AutoClose {
    fn closes_on_inside(&self) -> bool {
        matches!(self, AutoClose::Always | AutoClose::Inside)
    }

    fn closes_on_outside(&self) -> bool {
        matches!(self, AutoClose::Always | AutoClose::Outside)
    }
}

impl FromStr for AutoClose {
    type Err = ZenkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "true" => Ok(AutoClose::Always),
            "false" => Ok(AutoClose::Never),
            "inside" => Ok(AutoClose::Inside),
            "outside" => Ok(AutoClose::Outside),
            other => Err(ZenkitError::InvalidOption {
                name: "auto-close".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Menu offset from the toggle, in px
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuOffset {
    /// Shift along the toggle edge
    pub skidding: f32,
    /// Gap between toggle and menu
    pub distance: f32,
}

impl Default for MenuOffset {
    fn default() -> Self {
        Self {
            skidding: 0.0,
            distance: 2.0,
        }
    }
}

impl FromStr for MenuOffset {
    type Err = ZenkitError;

    /// `"skidding,distance"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ZenkitError::InvalidOption {
            name: "offset".to_string(),
            value: s.to_string(),
        };
        let (skidding, distance) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            skidding: skidding.trim().parse().map_err(|_| invalid())?,
            distance: distance.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DropdownOptions {
    pub auto_close: AutoClose,
    pub offset: MenuOffset,
}

impl DropdownOptions {
    pub fn from_dataset(data: Dataset<'_>) -> Self {
        Self {
            auto_close: data.parse_or("auto-close", AutoClose::default()),
            offset: data.parse_or("offset", MenuOffset::default()),
        }
    }
}

#[derive(Debug)]
pub struct Dropdown {
    id: InstanceId,
    options: DropdownOptions,
    state: TransitionState,
    menu: Option<NodeId>,
}

impl Dropdown {
    pub fn options(&self) -> &DropdownOptions {
        &self.options
    }

    pub fn menu(&self) -> Option<NodeId> {
        self.menu
    }

    fn find_menu(zk: &Zenkit, toggle: NodeId) -> Option<NodeId> {
        zk.doc
            .next_element_sibling(toggle)
            .filter(|&next| zk.doc.has_class(next, "dropdown-menu"))
            .or_else(|| {
                let parent = zk.doc.parent(toggle)?;
                zk.doc.find(parent, ".dropdown-menu")
            })
    }

    fn group_of(zk: &Zenkit, node: NodeId) -> Option<NodeId> {
        zk.doc.closest_match(node, GROUP_SELECTOR)
    }

    /// Recompute the menu offsets while open
    pub fn update(zk: &mut Zenkit, node: NodeId) {
        let Some(dropdown) = zk.instance::<Dropdown>(node) else {
            return;
        };
        if let (true, Some(menu)) = (dropdown.state.visibility().is_shown(), dropdown.menu) {
            let offset = dropdown.options.offset;
            Self::position_menu(zk, node, menu, offset);
        }
    }

    fn position_menu(zk: &mut Zenkit, toggle: NodeId, menu: NodeId, offset: MenuOffset) {
        let Some(wrapper) = zk.doc.closest_match(toggle, WRAPPER_SELECTOR) else {
            return;
        };
        for property in ["top", "left", "right", "bottom"] {
            zk.doc.set_style(menu, property, "");
        }

        let direction = DropDirection::from_classes(zk.doc.classes(wrapper));
        let viewport = zk.doc.viewport().size();
        let placement = menu_placement(direction, zk.doc.client_rect(menu), viewport);
        let sides = [
            ("top", placement.top),
            ("left", placement.left),
            ("right", placement.right),
            ("bottom", placement.bottom),
        ];
        for (property, value) in sides {
            if let Some(value) = value {
                zk.doc.set_style(menu, property, value);
            }
        }

        let (gap, shift) = match direction {
            DropDirection::Down => ("margin-top", "margin-left"),
            DropDirection::Up => ("margin-bottom", "margin-left"),
            DropDirection::End => ("margin-left", "margin-top"),
            DropDirection::Start => ("margin-right", "margin-top"),
        };
        zk.doc.set_style(menu, gap, format!("{}px", offset.distance));
        if offset.skidding != 0.0 {
            zk.doc.set_style(menu, shift, format!("{}px", offset.skidding));
        }
    }

    fn on_key(zk: &mut Zenkit, node: NodeId, key: Key, ctx: &mut InputContext) {
        let handled = matches!(
            key,
            Key::ArrowUp | Key::ArrowDown | Key::Escape | Key::Enter | Key::Space
        );
        if !handled {
            return;
        }
        let in_text_input = is_text_input(&zk.doc, ctx.target());
        if in_text_input && !matches!(key, Key::Escape | Key::ArrowUp | Key::ArrowDown) {
            return;
        }
        ctx.prevent_default();
        ctx.stop_propagation();

        if key == Key::Escape {
            Self::hide(zk, node);
            zk.doc.focus(node);
            return;
        }

        let Some((open, menu)) = zk
            .instance::<Dropdown>(node)
            .map(|d| (d.state.visibility().is_shown(), d.menu))
        else {
            return;
        };
        if !open && matches!(key, Key::ArrowUp | Key::ArrowDown) {
            Self::show(zk, node);
            return;
        }
        let Some(menu) = menu else {
            return;
        };

        let items = zk.doc.find_all(menu, ITEM_SELECTOR);
        if items.is_empty() {
            return;
        }
        let last = items.len() - 1;
        let current = zk
            .doc
            .active_element()
            .and_then(|active| items.iter().position(|&i| i == active));

        let next = match (key, current) {
            (Key::ArrowUp, Some(i)) if i > 0 => i - 1,
            (Key::ArrowUp, _) => last,
            (Key::ArrowDown, Some(i)) if i < last => i + 1,
            (Key::ArrowDown, _) => 0,
            (_, Some(i)) => {
                zk.click(items[i]);
                return;
            }
            (_, None) => return,
        };
        zk.doc.focus(items[next]);
    }
}

impl Widget for Dropdown {
    type Options = DropdownOptions;

    const KIND: WidgetKind = WidgetKind::Dropdown;
    const SELECTOR: &'static str = r#"[data-toggle="dropdown"], .dropdown-toggle"#;

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.dropdowns
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.dropdowns
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> DropdownOptions {
        DropdownOptions::from_dataset(Dataset::new(&zk.doc, node))
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: DropdownOptions) -> Self {
        let menu = Self::find_menu(zk, node);
        let owner = Owner::of::<Self>(node);
        let root = zk.doc.root();

        zk.bind(owner, node, InputKind::Click, Action::DropdownToggle);
        zk.bind(owner, node, InputKind::KeyDown, Action::DropdownKey);
        zk.bind(owner, root, InputKind::Click, Action::DropdownClickOutside);
        if let Some(menu) = menu {
            zk.bind(owner, menu, InputKind::KeyDown, Action::DropdownKey);
            zk.bind(owner, menu, InputKind::Click, Action::DropdownClickInside);
        } else {
            tracing::warn!("dropdown {:?} has no .dropdown-menu", node);
        }

        let state = if menu.is_some_and(|m| zk.doc.has_class(m, "show")) {
            TransitionState::shown()
        } else {
            TransitionState::new()
        };

        Self {
            id: InstanceId::next(),
            options,
            state,
            menu,
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        Self::hide(zk, node);
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some(settled) = zk
            .instance_mut::<Dropdown>(node)
            .and_then(|d| d.state.finish(token))
        else {
            return;
        };
        let verb = if settled.is_shown() { "shown" } else { "hidden" };
        zk.emit(node, WidgetKind::Dropdown, verb, false, EventDetail::None);
    }
}

impl Toggle for Dropdown {
    fn transition(&self) -> &TransitionState {
        &self.state
    }

    fn show(zk: &mut Zenkit, node: NodeId) {
        let Some(dropdown) = zk.instance::<Dropdown>(node) else {
            return;
        };
        let (Some(menu), true) = (dropdown.menu, dropdown.state.can_show()) else {
            return;
        };
        let offset = dropdown.options.offset;

        if !zk.emit(node, WidgetKind::Dropdown, "show", true, EventDetail::None) {
            return;
        }

        let group = Self::group_of(zk, node);
        let open_in_group: Vec<NodeId> = zk
            .registries
            .dropdowns
            .iter()
            .filter(|(other, d)| *other != node && d.state.visibility().is_shown())
            .map(|(other, _)| other)
            .collect();
        for other in open_in_group {
            if Self::group_of(zk, other) == group {
                Self::hide(zk, other);
            }
        }

        let Some(token) = zk
            .instance_mut::<Dropdown>(node)
            .and_then(|d| d.state.begin_show())
        else {
            return;
        };
        zk.doc.add_class(menu, "show");
        zk.doc.set_attr(menu, "data-show", "");
        zk.doc.set_attr(node, "aria-expanded", "true");
        Self::position_menu(zk, node, menu, offset);
        Self::complete(zk, node, token);
    }

    fn hide(zk: &mut Zenkit, node: NodeId) {
        let Some(dropdown) = zk.instance::<Dropdown>(node) else {
            return;
        };
        let (Some(menu), true) = (dropdown.menu, dropdown.state.can_hide()) else {
            return;
        };
        if !zk.emit(node, WidgetKind::Dropdown, "hide", true, EventDetail::None) {
            return;
        }
        let Some(token) = zk
            .instance_mut::<Dropdown>(node)
            .and_then(|d| d.state.begin_hide())
        else {
            return;
        };
        zk.doc.remove_class(menu, "show");
        zk.doc.remove_attr(menu, "data-show");
        zk.doc.set_attr(node, "aria-expanded", "false");
        Self::complete(zk, node, token);
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    let Some(dropdown) = zk.instance::<Dropdown>(node) else {
        return;
    };
    let open = dropdown.state.visibility().is_shown();
    let auto_close = dropdown.options.auto_close;
    let menu = dropdown.menu;

    match action {
        Action::DropdownToggle => {
            ctx.prevent_default();
            ctx.stop_propagation();
            Dropdown::toggle(zk, node);
        }
        Action::DropdownKey => {
            if let InputEvent::KeyDown(key) = ctx.event() {
                Dropdown::on_key(zk, node, key, ctx);
            }
        }
        Action::DropdownClickOutside => {
            let target = ctx.target();
            let inside = zk.doc.contains(node, target)
                || menu.is_some_and(|m| zk.doc.contains(m, target));
            if open && !inside && auto_close.closes_on_outside() {
                Dropdown::hide(zk, node);
            }
        }
        Action::DropdownClickInside => {
            if open && auto_close.closes_on_inside() {
                Dropdown::hide(zk, node);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use zenkit_animation::Visibility;
    use zenkit_core::{element, Document, ElementSpec, Rect};

    fn dropdown_markup(id: &str) -> ElementSpec {
        element("div").class("dropdown").children([
            element("button")
                .id(id)
                .class("dropdown-toggle")
                .data("toggle", "dropdown"),
            element("ul").class("dropdown-menu").children([
                element("a").class("dropdown-item").text("One"),
                element("a").class("dropdown-item disabled").text("Skip"),
                element("a").class("dropdown-item").text("Two"),
                element("input").class("dropdown-item").attr("type", "text"),
            ]),
        ])
    }

    struct Page {
        zk: Zenkit,
        toggle: NodeId,
        menu: NodeId,
        outside: NodeId,
    }

    fn page(auto_close: Option<&str>) -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let mut markup = dropdown_markup("a");
        if let Some(value) = auto_close {
            markup = element("div")
                .class("dropdown")
                .child(
                    element("button")
                        .id("a")
                        .class("dropdown-toggle")
                        .data("auto-close", value),
                )
                .child(
                    element("ul")
                        .class("dropdown-menu")
                        .child(element("a").class("dropdown-item")),
                );
        }
        doc.append(body, markup);
        let outside = doc.append(body, element("p"));
        let toggle = doc.by_id("a").unwrap();
        let menu = doc.next_element_sibling(toggle).unwrap();
        let mut zk = Zenkit::new(doc);
        zk.get_or_create::<Dropdown>(toggle, None);
        Page {
            zk,
            toggle,
            menu,
            outside,
        }
    }

    #[test]
    fn test_show_marks_menu_and_toggle() {
        let mut p = page(None);
        let fired = Rc::new(RefCell::new(0));
        let count = fired.clone();
        p.zk.on(p.toggle, "shown.zk.dropdown", move |_| *count.borrow_mut() += 1);

        p.zk.show::<Dropdown>(p.toggle);
        p.zk.show::<Dropdown>(p.toggle);
        let doc = p.zk.document();
        assert!(doc.has_class(p.menu, "show"));
        assert!(doc.has_attr(p.menu, "data-show"));
        assert_eq!(doc.attr(p.toggle, "aria-expanded"), Some("true"));
        assert_eq!(doc.style(p.menu, "top"), Some("100%"));
        assert_eq!(doc.style(p.menu, "margin-top"), Some("2px"));
        assert_eq!(*fired.borrow(), 1);

        p.zk.hide::<Dropdown>(p.toggle);
        assert!(!p.zk.document().has_class(p.menu, "show"));
        assert_eq!(
            p.zk.visibility::<Dropdown>(p.toggle),
            Some(Visibility::Hidden)
        );
    }

    #[test]
    fn test_toggle_click_does_not_count_as_outside() {
        let mut p = page(None);
        assert!(p.zk.click(p.toggle));
        assert_eq!(p.zk.visibility::<Dropdown>(p.toggle), Some(Visibility::Shown));
    }

    #[test]
    fn test_outside_click_closes() {
        let mut p = page(None);
        p.zk.click(p.toggle);
        p.zk.click(p.outside);
        assert_eq!(
            p.zk.visibility::<Dropdown>(p.toggle),
            Some(Visibility::Hidden)
        );
    }

    #[test]
    fn test_auto_close_outside_keeps_menu_on_inside_click() {
        let mut p = page(Some("outside"));
        let item = p.zk.document().find(p.menu, ".dropdown-item").unwrap();
        p.zk.click(p.toggle);
        p.zk.click(item);
        assert_eq!(p.zk.visibility::<Dropdown>(p.toggle), Some(Visibility::Shown));
        p.zk.click(p.outside);
        assert_eq!(
            p.zk.visibility::<Dropdown>(p.toggle),
            Some(Visibility::Hidden)
        );
    }

    #[test]
    fn test_auto_close_inside_ignores_outside_click() {
        let mut p = page(Some("inside"));
        p.zk.click(p.toggle);
        p.zk.click(p.outside);
        assert_eq!(p.zk.visibility::<Dropdown>(p.toggle), Some(Visibility::Shown));
    }

    #[test]
    fn test_arrow_keys_open_then_cycle_focus() {
        let mut p = page(None);
        let items = p.zk.document().find_all(p.menu, ITEM_SELECTOR);
        assert_eq!(items.len(), 3);

        p.zk.key_down(p.toggle, Key::ArrowDown);
        assert_eq!(p.zk.visibility::<Dropdown>(p.toggle), Some(Visibility::Shown));

        p.zk.key_down(p.toggle, Key::ArrowDown);
        assert_eq!(p.zk.document().active_element(), Some(items[0]));
        p.zk.key_down(items[0], Key::ArrowDown);
        assert_eq!(p.zk.document().active_element(), Some(items[1]));
        p.zk.key_down(items[1], Key::ArrowUp);
        p.zk.key_down(items[0], Key::ArrowUp);
        assert_eq!(p.zk.document().active_element(), Some(items[2]));
    }

    #[test]
    fn test_escape_closes_and_refocuses_toggle() {
        let mut p = page(None);
        p.zk.click(p.toggle);
        let item = p.zk.document().find(p.menu, ".dropdown-item").unwrap();
        p.zk.key_down(item, Key::Escape);
        assert_eq!(
            p.zk.visibility::<Dropdown>(p.toggle),
            Some(Visibility::Hidden)
        );
        assert_eq!(p.zk.document().active_element(), Some(p.toggle));
    }

    #[test]
    fn test_enter_clicks_focused_item() {
        let mut p = page(None);
        p.zk.click(p.toggle);
        let item = p.zk.document().find(p.menu, ".dropdown-item").unwrap();
        let clicked = Rc::new(RefCell::new(false));
        let flag = clicked.clone();
        p.zk.on(p.toggle, "hide.zk.dropdown", move |_| *flag.borrow_mut() = true);

        p.zk.dispatch_input(item, InputEvent::Focus);
        p.zk.key_down(item, Key::Enter);
        assert!(*clicked.borrow());
    }

    #[test]
    fn test_text_input_keeps_space() {
        let mut p = page(None);
        p.zk.click(p.toggle);
        let input = p.zk.document().find(p.menu, "input").unwrap();
        assert!(!p.zk.key_down(input, Key::Space));
        assert!(p.zk.key_down(input, Key::ArrowDown));
    }

    #[test]
    fn test_group_closes_other_dropdowns() {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, element("nav").data("dropdown-group", ""));
        doc.append(nav, dropdown_markup("a"));
        doc.append(nav, dropdown_markup("b"));
        doc.append(body, dropdown_markup("c"));
        let [a, b, c] = ["a", "b", "c"].map(|id| doc.by_id(id).unwrap());
        let mut zk = Zenkit::new(doc);
        for toggle in [a, b, c] {
            zk.get_or_create::<Dropdown>(toggle, None);
        }

        zk.show::<Dropdown>(a);
        zk.show::<Dropdown>(c);
        zk.show::<Dropdown>(b);
        assert_eq!(zk.visibility::<Dropdown>(a), Some(Visibility::Hidden));
        assert_eq!(zk.visibility::<Dropdown>(b), Some(Visibility::Shown));
        assert_eq!(zk.visibility::<Dropdown>(c), Some(Visibility::Shown));
    }

    #[test]
    fn test_dropup_overflowing_menu_pins_right() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(
            body,
            element("div").class("dropup").children([
                element("button").id("t").class("dropdown-toggle"),
                element("div")
                    .class("dropdown-menu")
                    .bounds(Rect::new(1200.0, 100.0, 160.0, 90.0)),
            ]),
        );
        let toggle = doc.by_id("t").unwrap();
        let menu = doc.next_element_sibling(toggle).unwrap();
        let mut zk = Zenkit::new(doc);
        zk.get_or_create::<Dropdown>(toggle, None);
        zk.show::<Dropdown>(toggle);

        let doc = zk.document();
        assert_eq!(doc.style(menu, "bottom"), Some("100%"));
        assert_eq!(doc.style(menu, "top"), Some("auto"));
        assert_eq!(doc.style(menu, "right"), Some("0"));
        assert_eq!(doc.style(menu, "left"), Some("auto"));
        assert_eq!(doc.style(menu, "margin-bottom"), Some("2px"));
    }
}
