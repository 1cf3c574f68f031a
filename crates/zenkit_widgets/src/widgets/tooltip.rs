//! Tooltips
//!
//! The title is read from the trigger's `title` attribute (moved to
//! `data-original-title` so the host's native tooltip stays quiet), then
//! `data-title`, then the options. Without a title nothing is shown.

use zenkit_animation::{TransitionState, TransitionToken};
use zenkit_core::{
    element, Dataset, ElementSpec, InstanceId, InstanceRegistry, NodeId, ToolkitConfig,
};

use super::floating::{self, Floating, FloatingCore, FloatingOptions};
use crate::context::Zenkit;
use crate::widget::{Registries, Toggle, Widget, WidgetKind};

pub type TooltipOptions = FloatingOptions;

/// Options shared by tooltips and popovers, over `defaults`
pub(crate) fn options_from_dataset(
    data: Dataset<'_>,
    defaults: FloatingOptions,
) -> FloatingOptions {
    FloatingOptions {
        placement: data.parse_or("placement", defaults.placement),
        trigger: data.parse_or("trigger", defaults.trigger),
        delay: data.parse_or("delay", defaults.delay),
        animation: data.flag("animation", defaults.animation),
        custom_class: data.string("custom-class").or(defaults.custom_class),
        container: data.string("container").or(defaults.container),
        ..defaults
    }
}

#[derive(Debug)]
pub struct Tooltip {
    id: InstanceId,
    core: FloatingCore,
}

impl Tooltip {
    pub fn options(&self) -> &TooltipOptions {
        &self.core.options
    }

    pub fn title(&self) -> Option<&str> {
        self.core.title.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.core.enabled
    }

    /// The floating element while shown or transitioning
    pub fn tip(&self) -> Option<NodeId> {
        self.core.tip
    }

    pub fn enable(zk: &mut Zenkit, node: NodeId) {
        floating::set_enabled::<Self>(zk, node, Some(true));
    }

    pub fn disable(zk: &mut Zenkit, node: NodeId) {
        floating::set_enabled::<Self>(zk, node, Some(false));
    }

    pub fn toggle_enabled(zk: &mut Zenkit, node: NodeId) {
        floating::set_enabled::<Self>(zk, node, None);
    }

    /// Replace the title, updating the visible tooltip in place
    pub fn set_content(zk: &mut Zenkit, node: NodeId, title: impl Into<String>) {
        floating::set_content::<Self>(zk, node, title.into());
    }

    /// Re-position against the trigger's current bounds
    pub fn update(zk: &mut Zenkit, node: NodeId) {
        floating::update::<Self>(zk, node);
    }
}

impl Floating for Tooltip {
    const CLASS: &'static str = "tooltip";
    const CLICK_STOPS_PROPAGATION: bool = false;
    const CLOSES_ON_OUTSIDE_CLICK: bool = false;
    const CONTENT_SELECTOR: &'static str = ".tooltip-inner";

    fn core(&self) -> &FloatingCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FloatingCore {
        &mut self.core
    }

    fn spacing(config: &ToolkitConfig) -> f32 {
        config.tooltip_spacing
    }

    fn has_content(core: &FloatingCore) -> bool {
        core.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn body(core: &FloatingCore) -> Vec<ElementSpec> {
        vec![element("div")
            .class("tooltip-inner")
            .text(core.title.as_deref().unwrap_or_default())]
    }

    fn store_content(core: &mut FloatingCore, content: String) {
        core.title = Some(content);
    }
}

impl Widget for Tooltip {
    type Options = TooltipOptions;

    const KIND: WidgetKind = WidgetKind::Tooltip;
    const SELECTOR: &'static str = r#"[data-toggle="tooltip"], [data-tooltip]"#;

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.tooltips
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.tooltips
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> TooltipOptions {
        let data = Dataset::new(&zk.doc, node);
        FloatingOptions {
            title: data.string("tooltip"),
            ..options_from_dataset(data, FloatingOptions::default())
        }
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: TooltipOptions) -> Self {
        let native = zk
            .doc
            .remove_attr(node, "title")
            .filter(|t| !t.is_empty());
        if let Some(title) = native.as_deref() {
            zk.doc.set_attr(node, "data-original-title", title);
        }
        let title = native
            .or_else(|| zk.doc.data(node, "title").map(str::to_string))
            .or_else(|| options.title.clone());

        floating::bind_triggers::<Self>(zk, node, options.trigger);
        Self {
            id: InstanceId::next(),
            core: FloatingCore::new(options, title, None),
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        floating::teardown::<Self>(zk, node);
        if let Some(title) = zk.doc.remove_attr(node, "data-original-title") {
            zk.doc.set_attr(node, "title", title);
        }
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        floating::complete::<Self>(zk, node, token);
    }

    fn reveal(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        floating::reveal::<Self>(zk, node, token);
    }
}

impl Toggle for Tooltip {
    fn transition(&self) -> &TransitionState {
        &self.core.state
    }

    fn show(zk: &mut Zenkit, node: NodeId) {
        floating::show::<Self>(zk, node);
    }

    fn hide(zk: &mut Zenkit, node: NodeId) {
        floating::hide::<Self>(zk, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Placement;
    use crate::query::Lookup;
    use zenkit_animation::Visibility;
    use zenkit_core::{Document, InputEvent, Rect, Size};

    fn runtime(trigger: ElementSpec) -> (Zenkit, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.append(body, trigger);
        let mut zk = Zenkit::new(doc);
        zk.set_measure(|doc, node| {
            if doc.has_class(node, "tooltip") {
                Size::new(80.0, 30.0)
            } else {
                doc.bounds(node).size()
            }
        });
        (zk, node)
    }

    fn button() -> ElementSpec {
        element("button")
            .data("toggle", "tooltip")
            .attr("title", "Save changes")
            .bounds(Rect::new(300.0, 200.0, 100.0, 40.0))
    }

    #[test]
    fn test_title_moves_to_original_title() {
        let (mut zk, node) = runtime(button());
        zk.get_or_create::<Tooltip>(node, None);
        assert_eq!(zk.instance::<Tooltip>(node).unwrap().title(), Some("Save changes"));
        assert_eq!(zk.document().attr(node, "title"), None);
        assert_eq!(
            zk.document().attr(node, "data-original-title"),
            Some("Save changes")
        );

        zk.dispose::<Tooltip>(node);
        assert_eq!(zk.document().attr(node, "title"), Some("Save changes"));
        assert!(!zk.document().has_attr(node, "data-original-title"));
    }

    #[test]
    fn test_hover_shows_positioned_tip() {
        let (mut zk, node) = runtime(button());
        zk.get_or_create::<Tooltip>(node, None);
        zk.dispatch_input(node, InputEvent::MouseEnter);

        let tip = zk.instance::<Tooltip>(node).unwrap().tip().unwrap();
        let doc = zk.document();
        assert!(doc.has_class(tip, "tooltip-top"));
        assert!(doc.has_class(tip, "fade"));
        assert_eq!(doc.attr(tip, "role"), Some("tooltip"));
        let inner = doc.find(tip, ".tooltip-inner").unwrap();
        assert_eq!(doc.text(inner), "Save changes");
        // centered above the trigger with 8px spacing
        assert_eq!(doc.style(tip, "top"), Some("162px"));
        assert_eq!(doc.style(tip, "left"), Some("310px"));

        zk.flush_frames();
        assert!(zk.document().has_class(tip, "show"));
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Shown));

        zk.dispatch_input(node, InputEvent::MouseLeave);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hiding));
        zk.transition_end(tip);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hidden));
        assert!(!zk.document().exists(tip));
    }

    #[test]
    fn test_flips_below_near_top_edge() {
        let (mut zk, node) = runtime(
            element("button")
                .attr("title", "Edge")
                .bounds(Rect::new(300.0, 5.0, 100.0, 40.0)),
        );
        zk.get_or_create::<Tooltip>(node, None);
        Tooltip::show(&mut zk, node);
        let tip = zk.instance::<Tooltip>(node).unwrap().tip().unwrap();
        assert!(zk.document().has_class(tip, "tooltip-bottom"));
        assert!(!zk.document().has_class(tip, "tooltip-top"));
    }

    #[test]
    fn test_delayed_show_canceled_by_leave() {
        let (mut zk, node) = runtime(button().data("delay", "200,0"));
        zk.get_or_create::<Tooltip>(node, None);
        zk.dispatch_input(node, InputEvent::MouseEnter);
        zk.advance(100);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hidden));
        zk.dispatch_input(node, InputEvent::MouseLeave);
        zk.advance(500);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hidden));
        assert_eq!(zk.scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_delayed_show_fires() {
        let (mut zk, node) = runtime(button().data("delay", "200"));
        zk.get_or_create::<Tooltip>(node, None);
        zk.dispatch_input(node, InputEvent::Focus);
        zk.advance(200);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Shown));
    }

    #[test]
    fn test_disabled_does_not_show() {
        let (mut zk, node) = runtime(button());
        zk.get_or_create::<Tooltip>(node, None);
        Tooltip::disable(&mut zk, node);
        Tooltip::show(&mut zk, node);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hidden));
        Tooltip::toggle_enabled(&mut zk, node);
        Tooltip::show(&mut zk, node);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Showing));
    }

    #[test]
    fn test_no_title_is_noop() {
        let (mut zk, node) = runtime(element("button").data("toggle", "tooltip"));
        zk.get_or_create::<Tooltip>(node, None);
        Tooltip::show(&mut zk, node);
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hidden));
        assert!(zk.document().query_selector(".tooltip").unwrap().is_none());
    }

    #[test]
    fn test_set_content_updates_visible_tip() {
        let (mut zk, node) = runtime(button());
        zk.get_or_create::<Tooltip>(node, None);
        Tooltip::show(&mut zk, node);
        Tooltip::set_content(&mut zk, node, "Saved");
        let tip = zk.instance::<Tooltip>(node).unwrap().tip().unwrap();
        let inner = zk.document().find(tip, ".tooltip-inner").unwrap();
        assert_eq!(zk.document().text(inner), "Saved");
    }

    #[test]
    fn test_dataset_options() {
        let (mut zk, node) = runtime(
            element("span")
                .data("tooltip", "Hint")
                .data("placement", "right")
                .data("trigger", "click")
                .data("animation", "false")
                .data("custom-class", "tip-wide"),
        );
        zk.get_or_create::<Tooltip>(node, None);
        let options = zk.instance::<Tooltip>(node).unwrap().options().clone();
        assert_eq!(options.placement, Placement::Right);
        assert!(options.trigger.click && !options.trigger.hover);

        zk.click(node);
        let tip = zk.instance::<Tooltip>(node).unwrap().tip().unwrap();
        assert!(zk.document().has_class(tip, "tip-wide"));
        assert!(!zk.document().has_class(tip, "fade"));
        zk.flush_frames();
        zk.click(node);
        // no animation: hidden immediately
        assert_eq!(zk.visibility::<Tooltip>(node), Some(Visibility::Hidden));
    }
}
