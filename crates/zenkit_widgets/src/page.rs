//! Page-level state shared by overlay widgets
//!
//! Modals and offcanvas panels take a reference-counted lock on the body's
//! scrolling and may own a backdrop element. The lock saves the body's inline
//! `padding-right` and `overflow` when the first owner acquires it and
//! restores them when the last owner releases it, so overlapping overlays
//! never strand the page in a locked state.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use zenkit_core::NodeId;

use crate::context::Zenkit;
use crate::task::Task;
use crate::widget::Owner;

/// How an owner locks the body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LockStyle {
    /// `overflow: hidden`, scrollbar compensation and the `modal-open` class
    Modal,
    /// `overflow: hidden` only
    OverflowOnly,
}

#[derive(Clone, Debug, Default)]
struct SavedBody {
    padding_right: Option<String>,
    overflow: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct PageState {
    locks: SmallVec<[(Owner, LockStyle); 2]>,
    saved: Option<SavedBody>,
    backdrops: FxHashMap<Owner, NodeId>,
}

impl PageState {
    pub fn is_locked(&self) -> bool {
        !self.locks.is_empty()
    }

    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    pub fn backdrop(&self, owner: Owner) -> Option<NodeId> {
        self.backdrops.get(&owner).copied()
    }
}

impl Zenkit {
    /// Whether any overlay currently holds the body scroll lock
    pub fn is_scroll_locked(&self) -> bool {
        self.page.is_locked()
    }

    pub(crate) fn lock_scroll(&mut self, owner: Owner, style: LockStyle) {
        if self.page.locks.iter().any(|(o, _)| *o == owner) {
            return;
        }
        let body = self.doc.body();
        if self.page.saved.is_none() {
            self.page.saved = Some(SavedBody {
                padding_right: self.doc.style(body, "padding-right").map(str::to_string),
                overflow: self.doc.style(body, "overflow").map(str::to_string),
            });
        }

        if style == LockStyle::Modal {
            let viewport = *self.doc.viewport();
            let padded = self
                .page
                .locks
                .iter()
                .any(|(_, s)| *s == LockStyle::Modal);
            if viewport.is_overflowing() && !padded {
                self.doc.set_style(
                    body,
                    "padding-right",
                    format!("{}px", viewport.scrollbar_width),
                );
            }
            self.doc.add_class(body, "modal-open");
        }
        self.doc.set_style(body, "overflow", "hidden");
        self.page.locks.push((owner, style));
        tracing::debug!("scroll lock acquired by {:?} ({} held)", owner, self.page.locks.len());
    }

    pub(crate) fn unlock_scroll(&mut self, owner: Owner) {
        let before = self.page.locks.len();
        self.page.locks.retain(|(o, _)| *o != owner);
        if self.page.locks.len() == before {
            return;
        }
        let body = self.doc.body();
        if !self.page.locks.iter().any(|(_, s)| *s == LockStyle::Modal) {
            self.doc.remove_class(body, "modal-open");
        }
        if self.page.locks.is_empty() {
            let saved = self.page.saved.take().unwrap_or_default();
            self.doc
                .set_style(body, "padding-right", saved.padding_right.unwrap_or_default());
            self.doc
                .set_style(body, "overflow", saved.overflow.unwrap_or_default());
            tracing::debug!("scroll lock released, body restored");
        }
    }

    /// Append a backdrop for `owner` under the body; `show` lands next frame
    pub(crate) fn show_backdrop(&mut self, owner: Owner, classes: &str, fade: bool) -> NodeId {
        if let Some(existing) = self.page.backdrop(owner) {
            return existing;
        }
        let body = self.doc.body();
        let backdrop = self.doc.create_element("div");
        self.doc.add_class(backdrop, classes);
        if fade {
            self.doc.add_class(backdrop, "fade");
        }
        self.doc.append_child(body, backdrop);
        self.page.backdrops.insert(owner, backdrop);
        self.request_frame(Task::AddClass(backdrop, "show"));
        backdrop
    }

    /// Fade out and remove `owner`'s backdrop
    pub(crate) fn hide_backdrop(&mut self, owner: Owner) {
        let Some(backdrop) = self.page.backdrops.remove(&owner) else {
            return;
        };
        let faded = self.doc.has_class(backdrop, "fade");
        self.doc.remove_class(backdrop, "show");
        if faded {
            let fallback = self.config.durations.backdrop;
            self.complete_on_transition_end(backdrop, fallback, Task::RemoveNode(backdrop));
        } else {
            self.remove_node(backdrop);
        }
    }

    /// Drop every page resource held by `owner`
    pub(crate) fn release_page(&mut self, owner: Owner) {
        self.hide_backdrop(owner);
        self.unlock_scroll(owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;
    use zenkit_core::{element, Document, Viewport};

    fn runtime() -> (Zenkit, Owner, Owner) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_style(body, "padding-right", "3px");
        let a = doc.append(body, element("div"));
        let b = doc.append(body, element("div"));
        *doc.viewport_mut() = Viewport {
            scroll_height: 2000.0,
            scrollbar_width: 15.0,
            ..Viewport::new(1024.0, 768.0)
        };
        let first = Owner {
            kind: WidgetKind::Modal,
            node: a,
        };
        let second = Owner {
            kind: WidgetKind::Offcanvas,
            node: b,
        };
        (Zenkit::new(doc), first, second)
    }

    #[test]
    fn test_lock_is_reference_counted() {
        let (mut zk, first, second) = runtime();
        let body = zk.doc.body();

        zk.lock_scroll(first, LockStyle::Modal);
        zk.lock_scroll(second, LockStyle::OverflowOnly);
        assert_eq!(zk.doc.style(body, "padding-right"), Some("15px"));
        assert!(zk.doc.has_class(body, "modal-open"));

        zk.unlock_scroll(first);
        assert!(zk.is_scroll_locked());
        assert!(!zk.doc.has_class(body, "modal-open"));
        assert_eq!(zk.doc.style(body, "overflow"), Some("hidden"));

        zk.unlock_scroll(second);
        assert!(!zk.is_scroll_locked());
        assert_eq!(zk.doc.style(body, "padding-right"), Some("3px"));
        assert_eq!(zk.doc.style(body, "overflow"), None);
    }

    #[test]
    fn test_double_lock_by_same_owner_counts_once() {
        let (mut zk, first, _) = runtime();
        zk.lock_scroll(first, LockStyle::Modal);
        zk.lock_scroll(first, LockStyle::Modal);
        assert_eq!(zk.page.lock_count(), 1);
        zk.unlock_scroll(first);
        assert!(!zk.is_scroll_locked());
    }

    #[test]
    fn test_backdrop_fades_then_is_removed() {
        let (mut zk, first, _) = runtime();
        let backdrop = zk.show_backdrop(first, "modal-backdrop", true);
        assert!(!zk.doc.has_class(backdrop, "show"));
        zk.flush_frames();
        assert!(zk.doc.has_class(backdrop, "show"));

        zk.hide_backdrop(first);
        assert!(zk.doc.exists(backdrop));
        zk.advance(zk.config.durations.backdrop);
        assert!(!zk.doc.exists(backdrop));
    }
}
