//! Bulk initialization
//!
//! [`Zenkit::init_all`] scans the document for each widget's default selector
//! and constructs an instance for every match that is not managed yet, so
//! calling it again after markup changes only picks up the new nodes.

use indexmap::IndexMap;

use crate::context::Zenkit;
use crate::widget::{Widget, WidgetKind};
use crate::widgets::{
    Accordion, Carousel, Collapse, Dropdown, Modal, Offcanvas, Popover, ScrollSpy, Tab, Toast,
    Tooltip,
};

/// Instances created by one [`Zenkit::init_all`] pass, per kind in
/// initialization order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    created: IndexMap<WidgetKind, usize>,
}

impl InitReport {
    pub fn created(&self, kind: WidgetKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.created.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WidgetKind, usize)> + '_ {
        self.created.iter().map(|(kind, count)| (*kind, *count))
    }
}

fn init_kind<W: Widget>(zk: &mut Zenkit) -> usize {
    let mut created = 0;
    for node in W::discover(zk) {
        if !zk.registries.contains(W::KIND, node) && zk.get_or_create::<W>(node, None).is_some() {
            created += 1;
        }
    }
    created
}

impl Zenkit {
    /// Construct instances for every unmanaged widget root in the document
    pub fn init_all(&mut self) -> InitReport {
        let mut report = InitReport::default();
        for kind in WidgetKind::ALL {
            let created = match kind {
                WidgetKind::Accordion => init_kind::<Accordion>(self),
                WidgetKind::Carousel => init_kind::<Carousel>(self),
                WidgetKind::Collapse => init_kind::<Collapse>(self),
                WidgetKind::Dropdown => init_kind::<Dropdown>(self),
                WidgetKind::Modal => init_kind::<Modal>(self),
                WidgetKind::Offcanvas => init_kind::<Offcanvas>(self),
                WidgetKind::Popover => init_kind::<Popover>(self),
                WidgetKind::ScrollSpy => init_kind::<ScrollSpy>(self),
                WidgetKind::Tab => init_kind::<Tab>(self),
                WidgetKind::Toast => init_kind::<Toast>(self),
                WidgetKind::Tooltip => init_kind::<Tooltip>(self),
            };
            report.created.insert(kind, created);
        }
        tracing::info!("init_all created {} widget instances", report.total());
        report
    }
}
