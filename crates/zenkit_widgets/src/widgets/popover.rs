//! Popovers
//!
//! Like tooltips but richer: an optional header and a body, opened by click
//! by default, and closed by any click outside trigger and popover.

use zenkit_animation::{TransitionState, TransitionToken};
use zenkit_core::{
    element, Dataset, ElementSpec, InstanceId, InstanceRegistry, NodeId, ToolkitConfig,
};

use super::floating::{self, Floating, FloatingCore, FloatingOptions};
use super::tooltip::options_from_dataset;
use crate::context::Zenkit;
use crate::widget::{Registries, Toggle, Widget, WidgetKind};

pub type PopoverOptions = FloatingOptions;

#[derive(Debug)]
pub struct Popover {
    id: InstanceId,
    core: FloatingCore,
}

impl Popover {
    pub fn options(&self) -> &PopoverOptions {
        &self.core.options
    }

    pub fn title(&self) -> Option<&str> {
        self.core.title.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.core.content.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.core.enabled
    }

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

    /// Replace the body text
    pub fn set_content(zk: &mut Zenkit, node: NodeId, content: impl Into<String>) {
        floating::set_content::<Self>(zk, node, content.into());
    }

    pub fn update(zk: &mut Zenkit, node: NodeId) {
        floating::update::<Self>(zk, node);
    }
}

impl Floating for Popover {
    const CLASS: &'static str = "popover";
    const CLICK_STOPS_PROPAGATION: bool = true;
    const CLOSES_ON_OUTSIDE_CLICK: bool = true;
    const CONTENT_SELECTOR: &'static str = ".popover-body";

    fn core(&self) -> &FloatingCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FloatingCore {
        &mut self.core
    }

    fn spacing(config: &ToolkitConfig) -> f32 {
        config.popover_spacing
    }

    fn has_content(_core: &FloatingCore) -> bool {
        true
    }

    fn body(core: &FloatingCore) -> Vec<ElementSpec> {
        let mut parts = Vec::with_capacity(2);
        if let Some(title) = core.title.as_deref() {
            parts.push(element("h3").class("popover-header").text(title));
        }
        if let Some(content) = core.content.as_deref() {
            parts.push(element("div").class("popover-body").text(content));
        }
        parts
    }

    fn store_content(core: &mut FloatingCore, content: String) {
        core.content = Some(content);
    }
}

impl Widget for Popover {
    type Options = PopoverOptions;

    const KIND: WidgetKind = WidgetKind::Popover;
    const SELECTOR: &'static str = r#"[data-toggle="popover"]"#;

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.popovers
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.popovers
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> PopoverOptions {
        options_from_dataset(Dataset::new(&zk.doc, node), FloatingOptions::popover())
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: PopoverOptions) -> Self {
        let title = zk
            .doc
            .data(node, "title")
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| options.title.clone());
        let content = zk
            .doc
            .data(node, "content")
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| options.content.clone());

        floating::bind_triggers::<Self>(zk, node, options.trigger);
        Self {
            id: InstanceId::next(),
            core: FloatingCore::new(options, title, content),
        }
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        floating::teardown::<Self>(zk, node);
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        floating::complete::<Self>(zk, node, token);
    }

    fn reveal(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        floating::reveal::<Self>(zk, node, token);
    }
}

impl Toggle for Popover {
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
    use crate::query::Lookup;
    use std::cell::RefCell;
    use std::rc::Rc;
    use zenkit_animation::Visibility;
    use zenkit_core::{Document, Rect};

    struct Page {
        zk: Zenkit,
        trigger: NodeId,
        outside: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let trigger = doc.append(
            body,
            element("button")
                .data("toggle", "popover")
                .data("title", "Details")
                .data("content", "More text")
                .data("placement", "bottom")
                .bounds(Rect::new(100.0, 100.0, 80.0, 30.0)),
        );
        let outside = doc.append(body, element("p").text("elsewhere"));
        let mut zk = Zenkit::new(doc);
        zk.get_or_create::<Popover>(trigger, None);
        Page {
            zk,
            trigger,
            outside,
        }
    }

    #[test]
    fn test_click_opens_with_header_and_body() {
        let Page {
            mut zk, trigger, ..
        } = page();
        let inserted = Rc::new(RefCell::new(0));
        let count = inserted.clone();
        zk.on(trigger, "inserted.zk.popover", move |_| *count.borrow_mut() += 1);

        let prevented = zk.click(trigger);
        assert!(prevented);
        assert_eq!(*inserted.borrow(), 1);

        let tip = zk.instance::<Popover>(trigger).unwrap().tip().unwrap();
        let doc = zk.document();
        assert!(doc.has_class(tip, "popover"));
        assert!(doc.has_class(tip, "popover-bottom"));
        assert!(doc.find(tip, ".popover-arrow").is_some());
        let header = doc.find(tip, "h3.popover-header").unwrap();
        assert_eq!(doc.text(header), "Details");
        let body = doc.find(tip, ".popover-body").unwrap();
        assert_eq!(doc.text(body), "More text");
        // 12px below the trigger
        assert_eq!(doc.style(tip, "top"), Some("142px"));
    }

    #[test]
    fn test_click_outside_closes() {
        let Page {
            mut zk,
            trigger,
            outside,
        } = page();
        zk.click(trigger);
        zk.flush_frames();
        assert_eq!(zk.visibility::<Popover>(trigger), Some(Visibility::Shown));

        let tip = zk.instance::<Popover>(trigger).unwrap().tip().unwrap();
        let body = zk.document().find(tip, ".popover-body").unwrap();
        zk.click(body);
        assert_eq!(zk.visibility::<Popover>(trigger), Some(Visibility::Shown));

        zk.click(outside);
        assert_eq!(zk.visibility::<Popover>(trigger), Some(Visibility::Hiding));
        zk.advance(150);
        assert_eq!(zk.visibility::<Popover>(trigger), Some(Visibility::Hidden));
        assert!(zk.document().query_selector(".popover").unwrap().is_none());
    }

    #[test]
    fn test_trigger_click_toggles_closed() {
        let Page {
            mut zk, trigger, ..
        } = page();
        zk.click(trigger);
        zk.flush_frames();
        zk.click(trigger);
        assert_eq!(zk.visibility::<Popover>(trigger), Some(Visibility::Hiding));
    }

    #[test]
    fn test_set_content_and_dispose() {
        let Page {
            mut zk, trigger, ..
        } = page();
        Popover::set_content(&mut zk, trigger, "Updated");
        assert_eq!(
            zk.instance::<Popover>(trigger).unwrap().content(),
            Some("Updated")
        );
        zk.click(trigger);
        zk.flush_frames();
        assert!(zk.dispose::<Popover>(trigger));
        assert!(zk.document().query_selector(".popover").unwrap().is_none());
        assert_eq!(zk.scheduler.pending_timers(), 0);
    }
}
