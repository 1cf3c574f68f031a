//! Carousel: slides cycled by controls, indicators, keys, swipes or a timer
//!
//! A slide adds `carousel-item-next`/`carousel-item-prev` to the incoming
//! item and `carousel-item-start`/`carousel-item-end` to both items, then
//! waits for the outgoing item's transition (or the fallback) before moving
//! `active`. While a slide is pending every further slide request is ignored.

use std::str::FromStr;

use zenkit_animation::{TimerId, TransitionToken};
use zenkit_core::{
    Dataset, Direction, EventDetail, InputEvent, InputKind, InstanceId, InstanceRegistry, Key,
    NodeId, Point, ToolkitConfig, ZenkitError,
};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::query::{is_text_input, Lookup};
use crate::task::Task;
use crate::widget::{Owner, Registries, Widget, WidgetKind};

/// Whether hovering the carousel pauses auto-cycling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PauseMode {
    #[default]
    Hover,
    Never,
}

impl FromStr for PauseMode {
    type Err = ZenkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hover" => Ok(PauseMode::Hover),
            "false" => Ok(PauseMode::Never),
            other => Err(ZenkitError::InvalidOption {
                name: "pause".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarouselOptions {
    /// Auto-cycle interval (ms); `None` disables cycling
    pub interval: Option<u64>,
    pub keyboard: bool,
    pub pause: PauseMode,
    /// Start cycling on construction
    pub ride: bool,
    /// `next` on the last item goes to the first (and `prev` the reverse)
    pub wrap: bool,
    pub touch: bool,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            interval: Some(ToolkitConfig::default().carousel_interval),
            keyboard: true,
            pause: PauseMode::Hover,
            ride: false,
            wrap: true,
            touch: true,
        }
    }
}

impl CarouselOptions {
    pub fn from_dataset(data: Dataset<'_>, config: &ToolkitConfig) -> Self {
        let interval = match data.get("interval").map(str::trim) {
            Some("false") => None,
            _ => Some(data.parse_or("interval", config.carousel_interval)),
        };
        Self {
            interval,
            keyboard: data.flag("keyboard", true),
            pause: data.parse_or("pause", PauseMode::Hover),
            ride: matches!(data.get("ride").map(str::trim), Some("carousel" | "true")),
            wrap: data.flag("wrap", true),
            touch: data.flag("touch", true),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Slide {
    from: usize,
    to: usize,
    direction: Direction,
    token: TransitionToken,
}

impl Slide {
    fn classes(&self) -> (&'static str, &'static str) {
        match self.direction {
            Direction::Next => ("carousel-item-next", "carousel-item-start"),
            Direction::Prev => ("carousel-item-prev", "carousel-item-end"),
        }
    }
}

#[derive(Debug)]
pub struct Carousel {
    id: InstanceId,
    options: CarouselOptions,
    items: Vec<NodeId>,
    indicators: Vec<NodeId>,
    active: usize,
    sliding: Option<Slide>,
    cycle_timer: Option<TimerId>,
    touch_start: Option<Point>,
}

impl Carousel {
    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding.is_some()
    }

    /// Whether an auto-cycle tick is scheduled
    pub fn is_cycling(&self) -> bool {
        self.cycle_timer.is_some()
    }

    pub fn next(zk: &mut Zenkit, node: NodeId) {
        Self::slide(zk, node, Direction::Next, None);
    }

    pub fn prev(zk: &mut Zenkit, node: NodeId) {
        Self::slide(zk, node, Direction::Prev, None);
    }

    /// Go to `index`; the direction follows the index comparison
    pub fn to(zk: &mut Zenkit, node: NodeId, index: usize) {
        let Some(carousel) = zk.instance::<Carousel>(node) else {
            return;
        };
        if index == carousel.active || index >= carousel.items.len() {
            return;
        }
        let direction = if index > carousel.active {
            Direction::Next
        } else {
            Direction::Prev
        };
        Self::slide(zk, node, direction, Some(index));
    }

    /// (Re)start auto-cycling
    pub fn cycle(zk: &mut Zenkit, node: NodeId) {
        let Some(carousel) = zk.instance::<Carousel>(node) else {
            return;
        };
        let (interval, previous) = (carousel.options.interval, carousel.cycle_timer);
        zk.cancel_timer(previous);
        let timer = interval.map(|ms| zk.schedule(ms, Task::CarouselTick(node)));
        if let Some(carousel) = zk.instance_mut::<Carousel>(node) {
            carousel.cycle_timer = timer;
        }
    }

    pub fn pause(zk: &mut Zenkit, node: NodeId) {
        let timer = zk
            .instance_mut::<Carousel>(node)
            .and_then(|c| c.cycle_timer.take());
        zk.cancel_timer(timer);
    }

    /// Auto-cycle step: advances only while the page and carousel are visible
    pub(crate) fn tick(zk: &mut Zenkit, node: NodeId) {
        if let Some(carousel) = zk.instance_mut::<Carousel>(node) {
            carousel.cycle_timer = None;
        }
        if !zk.doc.is_hidden() && !zk.measure(node).is_empty() {
            Self::next(zk, node);
        } else {
            tracing::trace!("carousel {:?} tick skipped while not visible", node);
        }
        Self::cycle(zk, node);
    }

    fn slide(zk: &mut Zenkit, node: NodeId, direction: Direction, target: Option<usize>) {
        let Some(carousel) = zk.instance::<Carousel>(node) else {
            return;
        };
        if carousel.sliding.is_some() || carousel.items.is_empty() {
            return;
        }
        let (from, len) = (carousel.active, carousel.items.len());
        let to = match (target, direction) {
            (Some(index), _) => index,
            (None, Direction::Next) if from + 1 < len => from + 1,
            (None, Direction::Prev) if from > 0 => from - 1,
            (None, _) if !carousel.options.wrap => return,
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => len - 1,
        };
        if to == from {
            return;
        }
        let (outgoing, incoming) = (carousel.items[from], carousel.items[to]);

        let detail = EventDetail::Slide {
            from,
            to,
            direction,
        };
        if !zk.emit(node, WidgetKind::Carousel, "slide", true, detail) {
            return;
        }

        let slide = Slide {
            from,
            to,
            direction,
            token: TransitionToken::fresh(),
        };
        if let Some(carousel) = zk.instance_mut::<Carousel>(node) {
            carousel.sliding = Some(slide);
        }
        let (order, directional) = slide.classes();
        zk.doc.add_class(incoming, order);
        zk.doc.add_class(outgoing, directional);
        zk.doc.add_class(incoming, directional);
        tracing::debug!("carousel {:?} sliding {} -> {}", node, from, to);

        let fallback = zk.config.durations.carousel;
        zk.complete_on_transition_end(
            outgoing,
            fallback,
            Task::Complete {
                kind: WidgetKind::Carousel,
                node,
                token: slide.token,
            },
        );
    }

    fn sync_indicators(zk: &mut Zenkit, node: NodeId) {
        let Some(carousel) = zk.instance::<Carousel>(node) else {
            return;
        };
        let active = carousel.active;
        for (index, indicator) in carousel.indicators.clone().into_iter().enumerate() {
            let current = index == active;
            zk.doc.toggle_class(indicator, "active", Some(current));
            if current {
                zk.doc.set_attr(indicator, "aria-current", "true");
            } else {
                zk.doc.remove_attr(indicator, "aria-current");
            }
        }
    }

    fn on_key(zk: &mut Zenkit, node: NodeId, ctx: &mut InputContext) {
        if is_text_input(&zk.doc, ctx.target()) {
            return;
        }
        match ctx.event() {
            InputEvent::KeyDown(Key::ArrowLeft) => {
                ctx.prevent_default();
                Self::prev(zk, node);
            }
            InputEvent::KeyDown(Key::ArrowRight) => {
                ctx.prevent_default();
                Self::next(zk, node);
            }
            _ => {}
        }
    }

    fn on_touch_end(zk: &mut Zenkit, node: NodeId, end: Point) {
        let Some(start) = zk
            .instance_mut::<Carousel>(node)
            .and_then(|c| c.touch_start.take())
        else {
            return;
        };
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        if dx.abs() <= dy.abs() || dx.abs() <= zk.config.swipe_threshold {
            return;
        }
        if dx > 0.0 {
            Self::prev(zk, node);
        } else {
            Self::next(zk, node);
        }
    }
}

impl Widget for Carousel {
    type Options = CarouselOptions;

    const KIND: WidgetKind = WidgetKind::Carousel;
    const SELECTOR: &'static str = ".carousel";

    fn id(&self) -> InstanceId {
        self.id
    }

    fn registry(registries: &Registries) -> &InstanceRegistry<Self> {
        &registries.carousels
    }

    fn registry_mut(registries: &mut Registries) -> &mut InstanceRegistry<Self> {
        &mut registries.carousels
    }

    fn options_from_dataset(zk: &Zenkit, node: NodeId) -> CarouselOptions {
        CarouselOptions::from_dataset(Dataset::new(&zk.doc, node), &zk.config)
    }

    fn construct(zk: &mut Zenkit, node: NodeId, options: CarouselOptions) -> Self {
        let owner = Owner::of::<Self>(node);
        let items = zk.doc.find_all(node, ".carousel-item");
        let indicators = zk
            .doc
            .find_all(node, ".carousel-indicators [data-slide-to]");
        let active = items
            .iter()
            .rposition(|&item| zk.doc.has_class(item, "active"))
            .unwrap_or(0);

        if let Some(prev) = zk.doc.find(node, ".carousel-control-prev") {
            zk.bind(owner, prev, InputKind::Click, Action::CarouselPrev);
        }
        if let Some(next) = zk.doc.find(node, ".carousel-control-next") {
            zk.bind(owner, next, InputKind::Click, Action::CarouselNext);
        }
        for (index, &indicator) in indicators.iter().enumerate() {
            zk.bind(owner, indicator, InputKind::Click, Action::CarouselTo(index));
        }
        if options.keyboard {
            zk.bind(owner, node, InputKind::KeyDown, Action::CarouselKey);
        }
        if options.pause == PauseMode::Hover {
            zk.bind(owner, node, InputKind::MouseEnter, Action::CarouselPause);
            zk.bind(owner, node, InputKind::MouseLeave, Action::CarouselCycle);
        }
        if options.touch {
            zk.bind(owner, node, InputKind::TouchStart, Action::CarouselTouchStart);
            zk.bind(owner, node, InputKind::TouchEnd, Action::CarouselTouchEnd);
        }

        Self {
            id: InstanceId::next(),
            options,
            items,
            indicators,
            active,
            sliding: None,
            cycle_timer: None,
            touch_start: None,
        }
    }

    fn attached(zk: &mut Zenkit, node: NodeId) {
        if zk.instance::<Carousel>(node).is_some_and(|c| c.options.ride) {
            Self::cycle(zk, node);
        }
    }

    /// Stop cycling and land a pending slide
    fn teardown(zk: &mut Zenkit, node: NodeId) {
        Self::pause(zk, node);
        let pending = zk
            .instance::<Carousel>(node)
            .and_then(|c| c.sliding.map(|s| s.token));
        if let Some(token) = pending {
            Self::complete(zk, node, token);
        }
    }

    fn complete(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
        let Some(carousel) = zk.instance_mut::<Carousel>(node) else {
            return;
        };
        let Some(slide) = carousel.sliding.filter(|s| s.token == token) else {
            return;
        };
        carousel.sliding = None;
        carousel.active = slide.to;
        let (outgoing, incoming) = (carousel.items[slide.from], carousel.items[slide.to]);

        let (order, directional) = slide.classes();
        zk.doc.remove_class(incoming, order);
        zk.doc.remove_class(incoming, directional);
        zk.doc.add_class(incoming, "active");
        zk.doc.remove_class(outgoing, "active");
        zk.doc.remove_class(outgoing, directional);
        Self::sync_indicators(zk, node);

        let detail = EventDetail::Slide {
            from: slide.from,
            to: slide.to,
            direction: slide.direction,
        };
        zk.emit(node, WidgetKind::Carousel, "slid", false, detail);
    }
}

pub(crate) fn handle(zk: &mut Zenkit, node: NodeId, action: Action, ctx: &mut InputContext) {
    match action {
        Action::CarouselPrev => {
            ctx.prevent_default();
            Carousel::prev(zk, node);
        }
        Action::CarouselNext => {
            ctx.prevent_default();
            Carousel::next(zk, node);
        }
        Action::CarouselTo(index) => {
            ctx.prevent_default();
            Carousel::to(zk, node, index);
        }
        Action::CarouselKey => Carousel::on_key(zk, node, ctx),
        Action::CarouselPause => Carousel::pause(zk, node),
        Action::CarouselCycle => Carousel::cycle(zk, node),
        Action::CarouselTouchStart => {
            if let InputEvent::TouchStart { x, y } = ctx.event() {
                if let Some(carousel) = zk.instance_mut::<Carousel>(node) {
                    carousel.touch_start = Some(Point::new(x, y));
                }
            }
        }
        Action::CarouselTouchEnd => {
            if let InputEvent::TouchEnd { x, y } = ctx.event() {
                Carousel::on_touch_end(zk, node, Point::new(x, y));
            }
        }
        _ => {}
    }
}
