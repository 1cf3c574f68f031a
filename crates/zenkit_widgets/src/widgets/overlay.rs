//! Pieces shared by the backdrop-owning overlays (modal, offcanvas)

use std::str::FromStr;

use zenkit_animation::Visibility;
use zenkit_core::{NodeId, ZenkitError};

use crate::context::Zenkit;
use crate::query::Lookup;
use crate::widget::{Owner, Toggle};

use super::{Modal, Offcanvas};

/// Backdrop behavior of an overlay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackdropMode {
    /// Backdrop shown; clicking it closes the overlay
    #[default]
    Enabled,
    /// No backdrop
    Disabled,
    /// Backdrop shown; clicking it only signals `hidePrevented`
    Static,
}

impl FromStr for BackdropMode {
    type Err = ZenkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "true" => Ok(BackdropMode::Enabled),
            "false" => Ok(BackdropMode::Disabled),
            "static" => Ok(BackdropMode::Static),
            other => Err(ZenkitError::InvalidOption {
                name: "backdrop".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Only one backdrop-owning overlay is open at a time: close every other
/// shown modal and offcanvas
pub(crate) fn dismiss_others(zk: &mut Zenkit, except: Owner) {
    let shown = |v: Visibility| v.is_shown();
    let modals: Vec<NodeId> = zk
        .registries
        .modals
        .iter()
        .filter(|(node, m)| {
            Owner::of::<Modal>(*node) != except && shown(m.transition().visibility())
        })
        .map(|(node, _)| node)
        .collect();
    let panels: Vec<NodeId> = zk
        .registries
        .offcanvases
        .iter()
        .filter(|(node, o)| {
            Owner::of::<Offcanvas>(*node) != except && shown(o.transition().visibility())
        })
        .map(|(node, _)| node)
        .collect();

    for node in modals {
        tracing::debug!("closing modal {:?} for {:?}", node, except);
        Modal::hide(zk, node);
    }
    for node in panels {
        tracing::debug!("closing offcanvas {:?} for {:?}", node, except);
        Offcanvas::hide(zk, node);
    }
}

/// Whether a modal or offcanvas other than `except` is mid-show. It cannot
/// be dismissed until it lands, so a new overlay must not open meanwhile.
pub(crate) fn other_opening(zk: &Zenkit, except: Owner) -> bool {
    let opening = |v: Visibility| v == Visibility::Showing;
    zk.registries.modals.iter().any(|(node, m)| {
        Owner::of::<Modal>(node) != except && opening(m.transition().visibility())
    }) || zk.registries.offcanvases.iter().any(|(node, o)| {
        Owner::of::<Offcanvas>(node) != except && opening(o.transition().visibility())
    })
}

/// Focus the first `[autofocus]` descendant; returns whether one was found
pub(crate) fn focus_autofocus(zk: &mut Zenkit, node: NodeId) -> bool {
    match zk.doc.find(node, "[autofocus]") {
        Some(target) => {
            zk.doc.focus(target);
            true
        }
        None => false,
    }
}

/// ARIA attributes of an open dialog
pub(crate) fn mark_dialog_open(zk: &mut Zenkit, node: NodeId) {
    zk.doc.remove_attr(node, "aria-hidden");
    zk.doc.set_attr(node, "aria-modal", "true");
    zk.doc.set_attr(node, "role", "dialog");
}

pub(crate) fn mark_dialog_closed(zk: &mut Zenkit, node: NodeId) {
    zk.doc.set_attr(node, "aria-hidden", "true");
    zk.doc.remove_attr(node, "aria-modal");
    zk.doc.remove_attr(node, "role");
}
