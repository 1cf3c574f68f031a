//! Shared core of tooltips and popovers
//!
//! Both widgets build a floating element next to their trigger on show,
//! position it with [`compute_position`], reveal it on the next frame and
//! remove it once hidden. They differ in markup, spacing, default trigger and
//! whether clicks outside close them; those differences live behind the
//! [`Floating`] trait, everything else is implemented once here.

use std::str::FromStr;

use zenkit_animation::{TimerId, TransitionState, TransitionToken, Visibility};
use zenkit_core::{ElementSpec, EventDetail, InputKind, NodeId, ToolkitConfig, ZenkitError};

use crate::bindings::{Action, InputContext};
use crate::context::Zenkit;
use crate::position::{compute_position, Placement};
use crate::query::Lookup;
use crate::task::Task;
use crate::widget::{Owner, Toggle};

// ============================================================================
// Options
// ============================================================================

/// Which interactions show and hide the floating element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triggers {
    pub hover: bool,
    pub focus: bool,
    pub click: bool,
}

impl Triggers {
    /// Only the API shows and hides
    pub const MANUAL: Triggers = Triggers {
        hover: false,
        focus: false,
        click: false,
    };

    pub const CLICK: Triggers = Triggers {
        hover: false,
        focus: false,
        click: true,
    };

    pub const HOVER_FOCUS: Triggers = Triggers {
        hover: true,
        focus: true,
        click: false,
    };
}

impl FromStr for Triggers {
    type Err = ZenkitError;

    /// Space separated list of `hover`, `focus`, `click`, `manual`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut triggers = Triggers::MANUAL;
        for word in s.split_ascii_whitespace() {
            match word {
                "hover" => triggers.hover = true,
                "focus" => triggers.focus = true,
                "click" => triggers.click = true,
                "manual" => {}
                other => {
                    return Err(ZenkitError::InvalidOption {
                        name: "trigger".to_string(),
                        value: other.to_string(),
                    })
                }
            }
        }
        Ok(triggers)
    }
}

/// Show and hide delays (ms) for hover and focus triggers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delay {
    pub show: u64,
    pub hide: u64,
}

impl FromStr for Delay {
    type Err = ZenkitError;

    /// `"150"` for both, or `"show,hide"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ZenkitError::InvalidOption {
            name: "delay".to_string(),
            value: s.to_string(),
        };
        let parse = |v: &str| v.trim().parse::<u64>().map_err(|_| invalid());
        match s.split_once(',') {
            Some((show, hide)) => Ok(Delay {
                show: parse(show)?,
                hide: parse(hide)?,
            }),
            None => {
                let both = parse(s)?;
                Ok(Delay {
                    show: both,
                    hide: both,
                })
            }
        }
    }
}

/// Options shared by tooltips and popovers
#[derive(Clone, Debug, PartialEq)]
pub struct FloatingOptions {
    pub placement: Placement,
    pub trigger: Triggers,
    pub title: Option<String>,
    /// Popover body text
    pub content: Option<String>,
    pub delay: Delay,
    /// Fade in and out
    pub animation: bool,
    /// Extra classes for the floating element
    pub custom_class: Option<String>,
    /// Selector of the element the floating element is appended to
    pub container: Option<String>,
}

impl Default for FloatingOptions {
    /// Tooltip defaults
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            trigger: Triggers::HOVER_FOCUS,
            title: None,
            content: None,
            delay: Delay::default(),
            animation: true,
            custom_class: None,
            container: None,
        }
    }
}

impl FloatingOptions {
    /// Popover defaults: opened by click
    pub fn popover() -> Self {
        Self {
            trigger: Triggers::CLICK,
            ..Self::default()
        }
    }
}

// ============================================================================
// Core state
// ============================================================================

#[derive(Debug)]
pub(crate) struct FloatingCore {
    pub options: FloatingOptions,
    pub state: TransitionState,
    pub enabled: bool,
    pub title: Option<String>,
    pub content: Option<String>,
    /// The floating element while it exists
    pub tip: Option<NodeId>,
    show_timer: Option<TimerId>,
    hide_timer: Option<TimerId>,
}

impl FloatingCore {
    pub fn new(options: FloatingOptions, title: Option<String>, content: Option<String>) -> Self {
        Self {
            options,
            state: TransitionState::new(),
            enabled: true,
            title,
            content,
            tip: None,
            show_timer: None,
            hide_timer: None,
        }
    }
}

/// A widget built on [`FloatingCore`]
pub(crate) trait Floating: Toggle {
    /// Base class of the floating element (`tooltip`, `popover`)
    const CLASS: &'static str;

    /// Clicks on the trigger do not reach document-level handlers
    const CLICK_STOPS_PROPAGATION: bool;

    /// Clicks outside trigger and floating element hide it
    const CLOSES_ON_OUTSIDE_CLICK: bool;

    fn core(&self) -> &FloatingCore;

    fn core_mut(&mut self) -> &mut FloatingCore;

    fn spacing(config: &ToolkitConfig) -> f32;

    /// Whether there is anything to show
    fn has_content(core: &FloatingCore) -> bool;

    /// Children of the floating element, after its arrow
    fn body(core: &FloatingCore) -> Vec<ElementSpec>;

    /// Element whose text `set_content` replaces
    const CONTENT_SELECTOR: &'static str;

    fn store_content(core: &mut FloatingCore, content: String);
}

fn core<W: Floating>(zk: &Zenkit, node: NodeId) -> Option<&FloatingCore> {
    zk.instance::<W>(node).map(W::core)
}

fn core_mut<W: Floating>(zk: &mut Zenkit, node: NodeId) -> Option<&mut FloatingCore> {
    zk.instance_mut::<W>(node).map(W::core_mut)
}

/// Bind the trigger interactions named by the options
pub(crate) fn bind_triggers<W: Floating>(zk: &mut Zenkit, node: NodeId, triggers: Triggers) {
    let owner = Owner::of::<W>(node);
    if triggers.hover {
        zk.bind(owner, node, InputKind::MouseEnter, Action::ScheduleShow);
        zk.bind(owner, node, InputKind::MouseLeave, Action::ScheduleHide);
    }
    if triggers.focus {
        zk.bind(owner, node, InputKind::Focus, Action::ScheduleShow);
        zk.bind(owner, node, InputKind::Blur, Action::ScheduleHide);
    }
    if triggers.click {
        zk.bind(owner, node, InputKind::Click, Action::Toggle);
    }
    if W::CLOSES_ON_OUTSIDE_CLICK {
        let root = zk.doc.root();
        zk.bind(owner, root, InputKind::Click, Action::FloatingClickOutside);
    }
}

fn render<W: Floating>(core: &FloatingCore, placement: Placement) -> ElementSpec {
    let mut spec = zenkit_core::element("div")
        .class(W::CLASS)
        .class(&format!("{}-{}", W::CLASS, placement.as_str()));
    if core.options.animation {
        spec = spec.class("fade");
    }
    if let Some(custom) = core.options.custom_class.as_deref() {
        spec = spec.class(custom);
    }
    spec.attr("role", "tooltip")
        .child(zenkit_core::element("div").class(&format!("{}-arrow", W::CLASS)))
        .children(W::body(core))
}

// ============================================================================
// Transitions
// ============================================================================

pub(crate) fn show<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    clear_timers::<W>(zk, node);
    let Some(core) = core::<W>(zk, node) else {
        return;
    };
    if !core.enabled || !core.state.can_show() || !W::has_content(core) {
        return;
    }
    let placement = core.options.placement;
    let spec = render::<W>(core, placement);
    let container = core.options.container.clone();

    if !zk.emit(node, W::KIND, "show", true, EventDetail::None) {
        return;
    }
    let Some(token) = core_mut::<W>(zk, node).and_then(|c| c.state.begin_show()) else {
        return;
    };

    let parent = container
        .as_deref()
        .and_then(|selector| zk.doc.find_in_document(selector))
        .unwrap_or_else(|| zk.doc.body());
    let tip = zk.doc.append(parent, spec);
    if let Some(core) = core_mut::<W>(zk, node) {
        core.tip = Some(tip);
    }
    zk.emit(node, W::KIND, "inserted", false, EventDetail::None);
    position::<W>(zk, node);
    zk.request_frame(Task::Reveal {
        kind: W::KIND,
        node,
        token,
    });
}

pub(crate) fn hide<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    clear_timers::<W>(zk, node);
    let Some(core) = core::<W>(zk, node) else {
        return;
    };
    let (Some(tip), true) = (core.tip, core.state.can_hide()) else {
        return;
    };
    let animation = core.options.animation;

    if !zk.emit(node, W::KIND, "hide", true, EventDetail::None) {
        return;
    }
    let Some(token) = core_mut::<W>(zk, node).and_then(|c| c.state.begin_hide()) else {
        return;
    };
    zk.doc.remove_class(tip, "show");
    if animation {
        let fallback = zk.config.durations.floating;
        zk.complete_on_transition_end(
            tip,
            fallback,
            Task::Complete {
                kind: W::KIND,
                node,
                token,
            },
        );
    } else {
        W::complete(zk, node, token);
    }
}

pub(crate) fn reveal<W: Floating>(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
    let Some(tip) = core::<W>(zk, node)
        .filter(|c| c.state.active_token() == Some(token))
        .and_then(|c| c.tip)
    else {
        return;
    };
    zk.doc.add_class(tip, "show");
    W::complete(zk, node, token);
}

pub(crate) fn complete<W: Floating>(zk: &mut Zenkit, node: NodeId, token: TransitionToken) {
    let Some(settled) = core_mut::<W>(zk, node).and_then(|c| c.state.finish(token)) else {
        return;
    };
    if settled == Visibility::Shown {
        zk.emit(node, W::KIND, "shown", false, EventDetail::None);
        return;
    }
    let tip = core_mut::<W>(zk, node).and_then(|c| c.tip.take());
    if let Some(tip) = tip {
        zk.remove_node(tip);
    }
    zk.emit(node, W::KIND, "hidden", false, EventDetail::None);
}

/// Place the floating element next to its trigger
pub(crate) fn position<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    let Some((tip, placement)) =
        core::<W>(zk, node).and_then(|c| Some((c.tip?, c.options.placement)))
    else {
        return;
    };
    let viewport = *zk.doc.viewport();
    let result = compute_position(
        zk.doc.client_rect(node),
        zk.measure(tip),
        placement,
        viewport.size(),
        viewport.scroll(),
        W::spacing(&zk.config),
    );

    zk.doc.set_style(tip, "top", format!("{}px", result.top));
    zk.doc.set_style(tip, "left", format!("{}px", result.left));
    for side in [
        Placement::Top,
        Placement::Bottom,
        Placement::Left,
        Placement::Right,
    ] {
        zk.doc
            .remove_class(tip, &format!("{}-{}", W::CLASS, side.as_str()));
    }
    zk.doc.add_class(
        tip,
        &format!("{}-{}", W::CLASS, result.placement.as_str()),
    );

    if let Some(arrow_left) = result.arrow_left {
        if let Some(arrow) = zk.doc.find(tip, &format!(".{}-arrow", W::CLASS)) {
            zk.doc.set_style(arrow, "left", format!("{arrow_left}px"));
        }
    }
}

/// Re-position while visible
pub(crate) fn update<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    if core::<W>(zk, node).is_some_and(|c| c.state.visibility().is_visible()) {
        position::<W>(zk, node);
    }
}

pub(crate) fn set_enabled<W: Floating>(zk: &mut Zenkit, node: NodeId, enabled: Option<bool>) {
    if let Some(core) = core_mut::<W>(zk, node) {
        core.enabled = enabled.unwrap_or(!core.enabled);
    }
}

pub(crate) fn set_content<W: Floating>(zk: &mut Zenkit, node: NodeId, content: String) {
    let Some(core) = core_mut::<W>(zk, node) else {
        return;
    };
    let tip = core.tip;
    W::store_content(core, content.clone());
    if let Some(target) = tip.and_then(|tip| zk.doc.find(tip, W::CONTENT_SELECTOR)) {
        zk.doc.set_text(target, content);
    }
}

/// Finish any transition and drop the floating element
pub(crate) fn teardown<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    clear_timers::<W>(zk, node);
    super::settle_hidden::<W>(zk, node);
    let tip = core_mut::<W>(zk, node).and_then(|c| c.tip.take());
    if let Some(tip) = tip {
        zk.remove_node(tip);
    }
}

// ============================================================================
// Delayed triggers
// ============================================================================

fn clear_timers<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    let timers = core_mut::<W>(zk, node)
        .map(|c| (c.show_timer.take(), c.hide_timer.take()))
        .unwrap_or_default();
    zk.cancel_timer(timers.0);
    zk.cancel_timer(timers.1);
}

fn schedule_show<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    clear_timers::<W>(zk, node);
    let Some(delay) = core::<W>(zk, node).map(|c| c.options.delay.show) else {
        return;
    };
    if delay == 0 {
        W::show(zk, node);
        return;
    }
    let timer = zk.schedule(delay, Task::DelayedShow { kind: W::KIND, node });
    if let Some(core) = core_mut::<W>(zk, node) {
        core.show_timer = Some(timer);
    }
}

fn schedule_hide<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    clear_timers::<W>(zk, node);
    let Some(delay) = core::<W>(zk, node).map(|c| c.options.delay.hide) else {
        return;
    };
    if delay == 0 {
        W::hide(zk, node);
        return;
    }
    let timer = zk.schedule(delay, Task::DelayedHide { kind: W::KIND, node });
    if let Some(core) = core_mut::<W>(zk, node) {
        core.hide_timer = Some(timer);
    }
}

pub(crate) fn delayed_show<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    if let Some(core) = core_mut::<W>(zk, node) {
        core.show_timer = None;
    }
    W::show(zk, node);
}

pub(crate) fn delayed_hide<W: Floating>(zk: &mut Zenkit, node: NodeId) {
    if let Some(core) = core_mut::<W>(zk, node) {
        core.hide_timer = None;
    }
    W::hide(zk, node);
}

pub(crate) fn handle<W: Floating>(
    zk: &mut Zenkit,
    node: NodeId,
    action: Action,
    ctx: &mut InputContext,
) {
    match action {
        Action::ScheduleShow => schedule_show::<W>(zk, node),
        Action::ScheduleHide => schedule_hide::<W>(zk, node),
        Action::Toggle => {
            ctx.prevent_default();
            if W::CLICK_STOPS_PROPAGATION {
                ctx.stop_propagation();
            }
            W::toggle(zk, node);
        }
        Action::FloatingClickOutside => {
            let target = ctx.target();
            let Some(core) = core::<W>(zk, node) else {
                return;
            };
            let inside_tip = core.tip.is_some_and(|tip| zk.doc.contains(tip, target));
            let shown = core.state.visibility().is_shown();
            if shown && !inside_tip && !zk.doc.contains(node, target) {
                W::hide(zk, node);
            }
        }
        _ => {}
    }
}
