//! Collapse: height-animated disclosure of a content panel
//!
//! Triggers are `[data-toggle="collapse"]` elements pointing at the panel via
//! `data-target="#id"` or `href="#id"`. The panel animates between
//! `collapse` (closed), `collapsing` (height transition) and `collapse show`
//! (open). With a `parent` option, opening a panel closes the open panels
//! inside that container.

use smallvec::SmallVec;
use zenkit_animation::{TransitionState, TransitionToken, Visibility};
use zenkit_core::{Dataset, EventDetail, InputKind, InstanceId, InstanceRegistry, NodeId};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Registries, Toggle, Widget, WidgetKind};

/// Collapse options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapseOptions {
    /// Toggle once right after construction
    pub toggle: bool,
    /// Selector of the container whose open panels close when this one opens
    pub parent: Option<String>,
}

impl CollapseOptions {
    pub fn from_dataset(data: Dataset<'_>) -> Self {
        Self {
            toggle: data.flag("toggle", false),
            parent: data.string("parent"),
        }
    }
}

#[derive(Debug)]
pub struct Collapse {
    id: InstanceId,
    options: CollapseOptions,
    state: TransitionState,
    triggers: SmallVec<[NodeId; 2]>,
}

impl Collapse {
    pub fn options(&self) -> &CollapseOptions {
        &self.options
    }

    /// Elements that toggle this panel
    pub fn triggers(&self) -> &[NodeId] {
        &self.triggers
    }

    fn open_siblings(zk: &Zenkit, node: NodeId) -> Option<Vec<NodeId>> {
        let parent = zk
            .instance::<Collapse>(node)?
            .options
            .parent
            .as_deref()
            .and_then(|selector| zk.doc.find_in_document(selector))?;
        Some(
            zk.doc
                .find_all(parent, ".collapse, .collapsing")
                .into_iter()
                .filter(|&sibling| sibling != node)
                .collect(),
        )
    }
}

// ============================================================================
// Height animation
// ============================================================================

/// Start opening `panel`: zero height now, content height next frame
pub(crate) fn begin_expand(zk: &mut Zenkit, panel: NodeId) {
    zk.doc.remove_class(panel, "collapse");
    zk.doc.add_class(panel, "collapsing");
    zk.doc.set_style(panel, "height", "0px");
    zk.request_frame(Task::Expand(panel));
}

/// Start closing `panel`: pin its content height, shrink to zero next frame
pub(crate) fn begin_contract(zk: &mut Zenkit, panel: NodeId) {
    let height = zk.doc.scroll_height(panel);
    zk.doc.set_style(panel, "height", format!("{height}px"));
    zk.doc.remove_class(panel, "show");
    zk.request_frame(Task::Contract(panel));
}

/// Final classes once the height transition is over
pub(crate) fn settle(zk: &mut Zenkit, panel: NodeId, open: bool) {
    zk.doc.remove_class(panel, "collapsing");
    zk.doc.add_class(panel, "collapse");
    zk.doc.toggle_class(panel, "show", Some(open));
    zk.doc.set_style(panel, "height", "");
}

/// `collapsed` class and `aria-expanded` on the controls of a panel
pub(crate) fn mark_triggers(zk: &mut Zenkit, triggers: &[NodeId], open: bool) {
    for &trigger in triggers {
        zk.doc.toggle_class(trigger, "collapsed", Some(!open));
        zk.doc
            .set_attr(trigger, "aria-expanded", if open { "true" } else { "false" });
    }
}

// ============================================================================
// Widget
// ============================================================================

impl Widget for Collapse {
    type Options = CollapseOptions;

    const KIND: WidgetKind = WidgetKind::Collapse;
    const SELECTOR: &'static str = r#"[data-toggle="collapse"]"#;

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.collapses
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.collapses
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> CollapseOptions {
        CollapseOptions::from_dataset(Dataset::new(&zk.doc, node))
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: CollapseOptions) -> Self {
        let triggers: SmallVec<[NodeId; 2]> = match zk.doc.id(node) {
            Some(id) => zk
                .doc
                .find_all_in_document(&format!(
                    r##"[data-toggle="collapse"][data-target="#{id}"], [data-toggle="collapse"][href="#{id}"]"##
                ))
                .into_iter()
                .collect(),
            None => SmallVec::new(),
        };

        let owner = Owner::of::<Self>(node);
        for &trigger in &triggers {
            zk.bind(owner, trigger, InputKind::Click, Action::Toggle);
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
            triggers,
        }
    }

    fn attached(zk: &mut Zenkit, node: NodeId) {
        let toggle = zk
            .instance::<Collapse>(node)
            .is_some_and(|c| c.options.toggle);
        if toggle {
            Self::toggle(zk, node);
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        let Some(visibility) = zk.visibility::<Collapse>(node) else {
            return;
        };
        if visibility.is_transitioning() {
            settle(zk, node, visibility == Visibility::Showing);
        }
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some(settled) = zk
            .instance_mut::<Collapse>(node)
            .and_then(|c| c.state.finish(token))
        else {
            return;
        };
        let open = settled == Visibility::Shown;
        settle(zk, node, open);
        let verb = if open { "shown" } else { "hidden" };
        zk.emit(node, WidgetKind::Collapse, verb, false, EventDetail::None);
    }

    /// Panels controlled by a trigger, deduplicated
    fn discover(zk: &Zenkit) -> Vec<NodeId> {
        let mut panels = Vec::new();
        for trigger in zk.doc.find_all_in_document(Self::SELECTOR) {
            let reference = zk
                .doc
                .data(trigger, "target")
                .or_else(|| zk.doc.attr(trigger, "href"))
                .unwrap_or_default();
            if let Some(panel) = zk.doc.resolve_target(reference) {
                if !panels.contains(&panel) {
                    panels.push(panel);
                }
            }
        }
        panels
    }
}

impl Toggle for Collapse {
    fn transition(&self) -> &TransitionState {
        &self.state
    }

    fn show(zk: &mut Zenkit, node: NodeId) {
        if !zk
            .instance::<Collapse>(node)
            .is_some_and(|c| c.state.can_show())
        {
            return;
        }

        let siblings = Self::open_siblings(zk, node).unwrap_or_default();
        let busy = siblings
            .iter()
            .any(|&s| zk.visibility::<Collapse>(s) == Some(Visibility::Showing));
        if busy {
            tracing::debug!("collapse {:?} waits for a sibling still opening", node);
            return;
        }

        if !zk.emit(node, WidgetKind::Collapse, "show", true, EventDetail::None) {
            return;
        }

        for sibling in siblings {
            if zk.doc.has_class(sibling, "show") {
                zk.get_or_create::<Collapse>(sibling, None);
                Self::hide(zk, sibling);
            }
        }

        let Some((token, triggers)) = zk.instance_mut::<Collapse>(node).and_then(|c| {
            let token = c.state.begin_show()?;
            Some((token, c.triggers.clone()))
        }) else {
            return;
        };

        begin_expand(zk, node);
        mark_triggers(zk, &triggers, true);
        let fallback = zk.config.durations.collapse;
        zk.complete_on_transition_end(
            node,
            fallback,
            Task::Complete {
                kind: WidgetKind::Collapse,
                node,
                token,
            },
        );
    }

    fn hide(zk: &mut Zenkit, node: NodeId) {
        if !zk
            .instance::<Collapse>(node)
            .is_some_and(|c| c.state.can_hide())
        {
            return;
        }
        if !zk.emit(node, WidgetKind::Collapse, "hide", true, EventDetail::None) {
            return;
        }

        let Some((token, triggers)) = zk.instance_mut::<Collapse>(node).and_then(|c| {
            let token = c.state.begin_hide()?;
            Some((token, c.triggers.clone()))
        }) else {
            return;
        };

        begin_contract(zk, node);
        mark_triggers(zk, &triggers, false);
        let fallback = zk.config.durations.collapse;
        zk.complete_on_transition_end(
            node,
            fallback,
            Task::Complete {
                kind: WidgetKind::Collapse,
                node,
                token,
            },
        );
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    if action == Action::Toggle {
        ctx.prevent_default();
        Collapse::toggle(zk, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use zenkit_core::{element, Document, Rect};

    struct Page {
        zk: Zenkit,
        trigger: NodeId,
        first: NodeId,
        second: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let group = doc.append(body, element("div").id("group"));
        let trigger = doc.append(
            group,
            element("button")
                .data("toggle", "collapse")
                .data("target", "#first")
                .class("collapsed"),
        );
        doc.append(
            group,
            element("a")
                .data("toggle", "collapse")
                .attr("href", "#second"),
        );
        let first = doc.append(
            group,
            element("div")
                .id("first")
                .class("collapse")
                .data("parent", "#group")
                .bounds(Rect::new(0.0, 0.0, 300.0, 120.0)),
        );
        let second = doc.append(
            group,
            element("div")
                .id("second")
                .class("collapse show")
                .data("parent", "#group"),
        );
        Page {
            zk: Zenkit::new(doc),
            trigger,
            first,
            second,
        }
    }

    #[test]
    fn test_discover_resolves_targets() {
        let p = page();
        assert_eq!(Collapse::discover(&p.zk), vec![p.first, p.second]);
    }

    #[test]
    fn test_show_animates_height() {
        let mut p = page();
        let events = Rc::new(RefCell::new(Vec::new()));
        for name in ["show.zk.collapse", "shown.zk.collapse"] {
            let log = events.clone();
            p.zk.on(p.first, name, move |e| log.borrow_mut().push(e.name().to_string()));
        }

        p.zk.get_or_create::<Collapse>(p.first, None);
        p.zk.show::<Collapse>(p.first);

        let doc = p.zk.document();
        assert!(doc.has_class(p.first, "collapsing"));
        assert!(!doc.has_class(p.first, "collapse"));
        assert_eq!(doc.style(p.first, "height"), Some("0px"));
        assert_eq!(doc.attr(p.trigger, "aria-expanded"), Some("true"));
        assert!(!doc.has_class(p.trigger, "collapsed"));

        p.zk.flush_frames();
        assert_eq!(p.zk.document().style(p.first, "height"), Some("120px"));

        p.zk.transition_end(p.first);
        let doc = p.zk.document();
        assert!(doc.has_class(p.first, "collapse"));
        assert!(doc.has_class(p.first, "show"));
        assert!(!doc.has_class(p.first, "collapsing"));
        assert_eq!(doc.style(p.first, "height"), None);
        assert_eq!(
            *events.borrow(),
            vec!["show.zk.collapse".to_string(), "shown.zk.collapse".to_string()]
        );
    }

    #[test]
    fn test_trigger_click_toggles() {
        let mut p = page();
        p.zk.get_or_create::<Collapse>(p.first, None);
        assert!(p.zk.click(p.trigger));
        assert_eq!(
            p.zk.visibility::<Collapse>(p.first),
            Some(Visibility::Showing)
        );
        p.zk.advance(350);
        assert_eq!(p.zk.visibility::<Collapse>(p.first), Some(Visibility::Shown));

        p.zk.click(p.trigger);
        p.zk.advance(350);
        assert_eq!(p.zk.visibility::<Collapse>(p.first), Some(Visibility::Hidden));
        assert!(p.zk.document().has_class(p.trigger, "collapsed"));
    }

    #[test]
    fn test_parent_closes_open_sibling() {
        let mut p = page();
        p.zk.get_or_create::<Collapse>(p.first, None);
        p.zk.show::<Collapse>(p.first);
        assert_eq!(
            p.zk.visibility::<Collapse>(p.second),
            Some(Visibility::Hiding)
        );
        p.zk.advance(350);
        assert!(!p.zk.document().has_class(p.second, "show"));
        assert!(p.zk.document().has_class(p.first, "show"));
    }

    #[test]
    fn test_prevented_show_changes_nothing() {
        let mut p = page();
        p.zk.on(p.first, "show.zk.collapse", |e| e.prevent_default());
        p.zk.get_or_create::<Collapse>(p.first, None);
        p.zk.show::<Collapse>(p.first);
        assert_eq!(p.zk.visibility::<Collapse>(p.first), Some(Visibility::Hidden));
        assert!(p.zk.document().has_class(p.second, "show"));
        assert!(p.zk.document().has_class(p.first, "collapse"));
    }

    #[test]
    fn test_toggle_option_opens_on_construction() {
        let mut p = page();
        let options = CollapseOptions {
            toggle: true,
            parent: None,
        };
        p.zk.get_or_create::<Collapse>(p.first, Some(options));
        assert_eq!(
            p.zk.visibility::<Collapse>(p.first),
            Some(Visibility::Showing)
        );
    }
}
