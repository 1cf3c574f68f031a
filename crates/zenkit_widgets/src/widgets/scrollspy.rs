//! ScrollSpy: highlights the navigation link of the section in view
//!
//! The spied element is the page itself when the spy sits on `<body>`, or a
//! scrolling container otherwise. Section offsets are measured once by
//! [`ScrollSpy::refresh`]; scroll input maps the scroll position onto them
//! and intersection signals activate a section directly.

use std::str::FromStr;

use smallvec::SmallVec;
use zenkit_core::{
    Dataset, EventDetail, InputEvent, InputKind, InstanceId, InstanceRegistry, NodeId,
    ToolkitConfig, ZenkitError,
};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::query::Lookup;
use crate::widget::{Owner, Registries, Widget, WidgetKind};

const LINK_SELECTOR: &str = ".nav-link, .list-group-item, a";

/// Which signals drive activation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpyMethod {
    /// Scroll position and intersection signals
    #[default]
    Auto,
    /// Scroll position only
    Offset,
    /// Intersection signals only
    Observer,
}

impl SpyMethod {
    fn uses_offsets(&self) -> bool {
        matches!(self, SpyMethod::Auto | SpyMethod::Offset)
    }

    fn uses_intersection(&self) -> bool {
        matches!(self, SpyMethod::Auto | SpyMethod::Observer)
    }
}

impl FromStr for SpyMethod {
    type Err = ZenkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(SpyMethod::Auto),
            "offset" => Ok(SpyMethod::Offset),
            "observer" => Ok(SpyMethod::Observer),
            other => Err(ZenkitError::InvalidOption {
                name: "method".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollSpyOptions {
    /// Selector of the navigation whose links are spied
    pub target: Option<String>,
    /// Distance (px) above a section at which it becomes active
    pub offset: f32,
    pub method: SpyMethod,
    /// Clicking a `#section` link scrolls the section into view
    pub smooth_scroll: bool,
}

impl Default for ScrollSpyOptions {
    fn default() -> Self {
        Self {
            target: None,
            offset: ToolkitConfig::default().scrollspy_offset,
            method: SpyMethod::Auto,
            smooth_scroll: false,
        }
    }
}

impl ScrollSpyOptions {
    pub fn from_dataset(data: Dataset<'_>, config: &ToolkitConfig) -> Self {
        Self {
            target: data.string("target"),
            offset: data.parse_or("offset", config.scrollspy_offset),
            method: data.parse_or("method", SpyMethod::Auto),
            smooth_scroll: data.flag("smooth-scroll", false),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SpiedSection {
    link: NodeId,
    section: NodeId,
    offset: f32,
}

#[derive(Debug)]
pub struct ScrollSpy {
    id: InstanceId,
    options: ScrollSpyOptions,
    nav: Option<NodeId>,
    sections: Vec<SpiedSection>,
    active: Option<NodeId>,
}

impl ScrollSpy {
    pub fn options(&self) -> &ScrollSpyOptions {
        &self.options
    }

    /// The section whose link is highlighted
    pub fn active_section(&self) -> Option<NodeId> {
        self.active
    }

    pub fn active_link(&self) -> Option<NodeId> {
        let active = self.active?;
        self.sections
            .iter()
            .find(|s| s.section == active)
            .map(|s| s.link)
    }

    /// Section offsets in ascending order
    pub fn offsets(&self) -> impl Iterator<Item = f32> + '_ {
        self.sections.iter().map(|s| s.offset)
    }

    /// `(scroll position, maximum scroll position)` of the spied element
    fn scroll_metrics(zk: &Zenkit, node: NodeId) -> (f32, f32) {
        if node == zk.doc.body() {
            let viewport = zk.doc.viewport();
            (viewport.scroll_y, viewport.scroll_height - viewport.height)
        } else {
            (
                zk.doc.scroll_top(node),
                zk.doc.scroll_height(node) - zk.doc.client_height(node),
            )
        }
    }

    /// Re-collect the spied links and measure their sections
    pub fn refresh(zk: &mut Zenkit, node: NodeId) {
        let Some(spy) = zk.instance::<ScrollSpy>(node) else {
            return;
        };
        let nav = spy.nav;
        let origin = if node == zk.doc.body() {
            0.0
        } else {
            zk.doc.bounds(node).top()
        };

        let mut sections: Vec<SpiedSection> = nav
            .map(|nav| zk.doc.find_all(nav, LINK_SELECTOR))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|link| {
                let href = zk.doc.attr(link, "href")?;
                if !href.starts_with('#') {
                    return None;
                }
                let section = zk.doc.resolve_target(href)?;
                Some(SpiedSection {
                    link,
                    section,
                    offset: zk.doc.bounds(section).top() - origin,
                })
            })
            .collect();
        sections.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        tracing::debug!("scrollspy {:?} tracks {} sections", node, sections.len());

        if let Some(spy) = zk.instance_mut::<ScrollSpy>(node) {
            spy.sections = sections;
        }
        Self::wire(zk, node);
    }

    fn wire(zk: &mut Zenkit, node: NodeId) {
        let Some(spy) = zk.instance::<ScrollSpy>(node) else {
            return;
        };
        let owner = Owner::of::<Self>(node);
        let method = spy.options.method;
        let smooth = spy.options.smooth_scroll;
        let sections: SmallVec<[SpiedSection; 8]> = spy.sections.iter().copied().collect();

        zk.bindings.release(owner);
        if method.uses_offsets() {
            zk.bind(owner, node, InputKind::Scroll, Action::SpyProcess);
        }
        for spied in sections {
            if method.uses_intersection() {
                let section = spied.section;
                zk.bind(owner, section, InputKind::Intersect, Action::SpyIntersect { section });
            }
            if smooth {
                let section = spied.section;
                zk.bind(owner, spied.link, InputKind::Click, Action::SpyScrollTo { section });
            }
        }
    }

    /// Activate the section matching the current scroll position
    pub fn process(zk: &mut Zenkit, node: NodeId) {
        let Some(spy) = zk.instance::<ScrollSpy>(node) else {
            return;
        };
        let (Some(first), Some(last)) = (spy.sections.first(), spy.sections.last()) else {
            return;
        };
        let (position, max) = Self::scroll_metrics(zk, node);
        let offset = spy.options.offset;

        let target = if max > 0.0 && position >= max {
            Some(last.section)
        } else if position < first.offset - offset {
            None
        } else {
            spy.sections
                .iter()
                .rev()
                .find(|s| position >= s.offset - offset)
                .map(|s| s.section)
        };

        if target == spy.active {
            return;
        }
        match target {
            Some(section) => Self::activate(zk, node, section),
            None => {
                if let Some(spy) = zk.instance_mut::<ScrollSpy>(node) {
                    spy.active = None;
                }
                Self::clear(zk, node);
            }
        }
    }

    /// Highlight the link of `section` and its parent navigation items
    pub fn activate(zk: &mut Zenkit, node: NodeId, section: NodeId) {
        let Some(spy) = zk.instance_mut::<ScrollSpy>(node) else {
            return;
        };
        let Some(link) = spy
            .sections
            .iter()
            .find(|s| s.section == section)
            .map(|s| s.link)
        else {
            return;
        };
        spy.active = Some(section);
        Self::clear(zk, node);

        zk.doc.add_class(link, "active");
        let parents: SmallVec<[NodeId; 4]> = zk
            .doc
            .ancestors(link)
            .take_while(|&p| !zk.doc.has_class(p, "nav") && !zk.doc.has_class(p, "list-group"))
            .filter(|&p| zk.doc.has_class(p, "nav-item") || zk.doc.has_class(p, "dropdown"))
            .collect();
        for parent in parents {
            if let Some(parent_link) = zk.doc.find(parent, ".nav-link, .dropdown-toggle") {
                zk.doc.add_class(parent_link, "active");
            }
        }

        zk.emit(
            node,
            WidgetKind::ScrollSpy,
            "activate",
            false,
            EventDetail::RelatedTarget(Some(section)),
        );
    }

    fn clear(zk: &mut Zenkit, node: NodeId) {
        let Some(nav) = zk.instance::<ScrollSpy>(node).and_then(|s| s.nav) else {
            return;
        };
        for active in zk.doc.find_all(nav, ".active") {
            zk.doc.remove_class(active, "active");
        }
    }
}

impl Widget for ScrollSpy {
    type Options = ScrollSpyOptions;

    const KIND: WidgetKind = WidgetKind::ScrollSpy;
    const SELECTOR: &'static str = r#"[data-spy="scroll"]"#;

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.scrollspies
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.scrollspies
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> ScrollSpyOptions {
        ScrollSpyOptions::from_dataset(Dataset::new(&zk.doc, node), &zk.config)
    }

    fn construct(zk: &mut Zenkit, _node: NodeId, options: ScrollSpyOptions) -> Self {
        let nav = options
            .target
            .as_deref()
            .and_then(|target| zk.doc.find_in_document(target));
        Self {
            id: InstanceId::next(),
            options,
            nav,
            sections: Vec::new(),
            active: None,
        }
    }

    fn attached(zk: &mut Zenkit, node: NodeId) {
        Self::refresh(zk, node);
    }

    fn teardown(zk: &mut Zenkit, node: NodeId) {
        Self::clear(zk, node);
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    match action {
        Action::SpyProcess => ScrollSpy::process(zk, node),
        Action::SpyIntersect { section } => {
            let entering = matches!(ctx.event(), InputEvent::Intersect { intersecting: true });
            let current = zk.instance::<ScrollSpy>(node).and_then(|s| s.active);
            if entering && current != Some(section) {
                ScrollSpy::activate(zk, node, section);
            }
        }
        Action::SpyScrollTo { section } => {
            ctx.prevent_default();
            zk.doc.scroll_into_view(section);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use zenkit_core::{element, Document, Rect};

    /// Page of three 600px sections spied from the body
    fn page(data: &[(&str, &str)]) -> (Zenkit, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_attr(body, "data-spy", "scroll");
        doc.set_attr(body, "data-target", "#toc");
        for (key, value) in data {
            doc.set_attr(body, &format!("data-{key}"), *value);
        }
        doc.append(
            body,
            element("nav").id("toc").class("nav").children([
                element("a").class("nav-link").attr("href", "#intro"),
                element("div").class("nav-item dropdown").children([
                    element("a").class("nav-link dropdown-toggle").attr("href", "#"),
                    element("div").class("dropdown-menu").children([
                        element("a").class("dropdown-item").attr("href", "#usage"),
                        element("a").class("dropdown-item").attr("href", "#api"),
                    ]),
                ]),
                element("a").class("nav-link").attr("href", "#missing"),
            ]),
        );
        let sections = ["api", "intro", "usage"]
            .iter()
            .map(|id| {
                let top = match *id {
                    "intro" => 0.0,
                    "usage" => 600.0,
                    _ => 1200.0,
                };
                doc.append(
                    body,
                    element("section")
                        .id(id)
                        .bounds(Rect::new(0.0, top, 1000.0, 600.0)),
                )
            })
            .collect();
        let viewport = doc.viewport_mut();
        viewport.height = 800.0;
        viewport.scroll_height = 1800.0;

        let mut zk = Zenkit::new(doc);
        zk.get_or_create::<ScrollSpy>(body, None);
        (zk, body, sections)
    }

    fn scroll_to(zk: &mut Zenkit, body: NodeId, y: f32) {
        zk.document_mut().viewport_mut().scroll_y = y;
        zk.dispatch_input(body, InputEvent::Scroll);
    }

    #[test]
    fn test_refresh_sorts_resolvable_links() {
        let (zk, body, _) = page(&[]);
        let spy = zk.instance::<ScrollSpy>(body).unwrap();
        assert_eq!(spy.offsets().collect::<Vec<_>>(), vec![0.0, 600.0, 1200.0]);
    }

    #[test]
    fn test_scroll_activates_section_and_parents() {
        let (mut zk, body, sections) = page(&[]);
        let activated = Rc::new(RefCell::new(Vec::new()));
        let log = activated.clone();
        zk.on(body, "activate.zk.scrollspy", move |e| {
            log.borrow_mut().push(e.detail().clone())
        });

        scroll_to(&mut zk, body, 595.0);
        let usage = sections[2];
        assert_eq!(zk.instance::<ScrollSpy>(body).unwrap().active_section(), Some(usage));

        let doc = zk.document();
        let link = doc.query_selector(r##"[href="#usage"]"##).unwrap().unwrap();
        let toggle = doc.query_selector(".dropdown-toggle").unwrap().unwrap();
        let intro = doc.query_selector(r##"[href="#intro"]"##).unwrap().unwrap();
        assert!(doc.has_class(link, "active"));
        assert!(doc.has_class(toggle, "active"));
        assert!(!doc.has_class(intro, "active"));
        assert_eq!(
            *activated.borrow(),
            vec![EventDetail::RelatedTarget(Some(usage))]
        );

        // same section again fires nothing
        scroll_to(&mut zk, body, 650.0);
        assert_eq!(activated.borrow().len(), 1);
    }

    #[test]
    fn test_bottom_activates_last_section() {
        let (mut zk, body, sections) = page(&[]);
        scroll_to(&mut zk, body, 1000.0);
        assert_eq!(
            zk.instance::<ScrollSpy>(body).unwrap().active_section(),
            Some(sections[0])
        );
    }

    #[test]
    fn test_above_first_section_clears() {
        let (mut zk, body, _) = page(&[]);
        let intro = zk.document().by_id("intro").unwrap();
        let usage = zk.document().by_id("usage").unwrap();
        zk.document_mut().set_bounds(intro, Rect::new(0.0, 100.0, 1000.0, 500.0));
        ScrollSpy::refresh(&mut zk, body);
        ScrollSpy::activate(&mut zk, body, usage);

        scroll_to(&mut zk, body, 50.0);
        let spy = zk.instance::<ScrollSpy>(body).unwrap();
        assert_eq!(spy.active_section(), None);
        assert!(zk.document().query_selector("#toc .active").unwrap().is_none());
    }

    #[test]
    fn test_intersection_activates() {
        let (mut zk, body, sections) = page(&[("method", "observer")]);
        let api = sections[0];
        zk.dispatch_input(api, InputEvent::Intersect { intersecting: true });
        assert_eq!(zk.instance::<ScrollSpy>(body).unwrap().active_section(), Some(api));

        // offset processing is off for the observer method
        scroll_to(&mut zk, body, 0.0);
        assert_eq!(zk.instance::<ScrollSpy>(body).unwrap().active_section(), Some(api));
    }

    #[test]
    fn test_smooth_scroll_link_click() {
        let (mut zk, _, _) = page(&[("smooth-scroll", "true")]);
        let link = zk
            .document()
            .query_selector(r##"[href="#usage"]"##)
            .unwrap()
            .unwrap();
        assert!(zk.click(link));
        assert_eq!(zk.document().viewport().scroll_y, 600.0);
    }

    #[test]
    fn test_container_offsets_relative_to_container() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(
            body,
            element("div")
                .class("list-group")
                .id("list")
                .child(element("a").class("list-group-item").attr("href", "#one"))
                .child(element("a").class("list-group-item").attr("href", "#two")),
        );
        let container = doc.append(
            body,
            element("div")
                .data("spy", "scroll")
                .data("target", "#list")
                .data("offset", "0")
                .bounds(Rect::new(0.0, 100.0, 400.0, 200.0))
                .child(element("div").id("one").bounds(Rect::new(0.0, 100.0, 400.0, 300.0)))
                .child(element("div").id("two").bounds(Rect::new(0.0, 400.0, 400.0, 300.0))),
        );
        doc.set_scroll_metrics(container, 600.0, 200.0);
        let mut zk = Zenkit::new(doc);
        zk.get_or_create::<ScrollSpy>(container, None);
        let spy = zk.instance::<ScrollSpy>(container).unwrap();
        assert_eq!(spy.offsets().collect::<Vec<_>>(), vec![0.0, 300.0]);

        zk.document_mut().set_scroll_top(container, 310.0);
        zk.dispatch_input(container, InputEvent::Scroll);
        let two = zk.document().by_id("two");
        assert_eq!(zk.instance::<ScrollSpy>(container).unwrap().active_section(), two);
    }
}
