//! Deferred work run by the scheduler

use zenkit_animation::TransitionToken;
use zenkit_core::NodeId;

use crate::widget::{Owner, WidgetKind};

/// Work queued for an animation frame or a timer
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Task {
    /// Finish the transition identified by `token`
    Complete {
        kind: WidgetKind,
        node: NodeId,
        token: TransitionToken,
    },
    /// Frame step of a show transition
    Reveal {
        kind: WidgetKind,
        node: NodeId,
        token: TransitionToken,
    },
    AddClass(NodeId, &'static str),
    RemoveClass(NodeId, &'static str),
    RemoveNode(NodeId),
    /// Animate a collapsible open: height to its content height
    Expand(NodeId),
    /// Animate a collapsible closed: `collapsing` and zero height
    Contract(NodeId),
    Autohide(NodeId),
    CarouselTick(NodeId),
    DelayedShow {
        kind: WidgetKind,
        node: NodeId,
    },
    DelayedHide {
        kind: WidgetKind,
        node: NodeId,
    },
}

impl Task {
    /// Widget whose disposal cancels this task
    pub fn owner(&self) -> Option<Owner> {
        match *self {
            Task::Complete { kind, node, .. }
            | Task::Reveal { kind, node, .. }
            | Task::DelayedShow { kind, node }
            | Task::DelayedHide { kind, node } => Some(Owner { kind, node }),
            Task::Autohide(node) => Some(Owner {
                kind: WidgetKind::Toast,
                node,
            }),
            Task::CarouselTick(node) => Some(Owner {
                kind: WidgetKind::Carousel,
                node,
            }),
            Task::AddClass(..)
            | Task::RemoveClass(..)
            | Task::RemoveNode(_)
            | Task::Expand(_)
            | Task::Contract(_) => None,
        }
    }
}
