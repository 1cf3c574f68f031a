//! Node resolution for widget code
//!
//! Widgets only ever query with fixed selectors or values read from markup
//! (`data-target`, `href`). A selector that fails to parse resolves to
//! nothing and is logged; it never surfaces as an error.

use zenkit_core::{Document, NodeId};

pub(crate) trait Lookup {
    fn find(&self, scope: NodeId, selector: &str) -> Option<NodeId>;
    fn find_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId>;
    fn find_in_document(&self, selector: &str) -> Option<NodeId>;
    fn find_all_in_document(&self, selector: &str) -> Vec<NodeId>;
    fn closest_match(&self, node: NodeId, selector: &str) -> Option<NodeId>;
    fn is_match(&self, node: NodeId, selector: &str) -> bool;

    /// Resolve a target reference such as `#details`; `#` alone means none
    fn resolve_target(&self, reference: &str) -> Option<NodeId> {
        let reference = reference.trim();
        if reference.is_empty() || reference == "#" {
            return None;
        }
        self.find_in_document(reference)
    }
}

fn log_failure(selector: &str, err: impl std::fmt::Display) {
    tracing::warn!("selector `{}` ignored: {}", selector, err);
}

impl Lookup for Document {
    fn find(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.query_selector_from(scope, selector)
            .unwrap_or_else(|err| {
                log_failure(selector, err);
                None
            })
    }

    fn find_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        self.query_selector_all_from(scope, selector)
            .unwrap_or_else(|err| {
                log_failure(selector, err);
                Vec::new()
            })
    }

    fn find_in_document(&self, selector: &str) -> Option<NodeId> {
        self.query_selector(selector).unwrap_or_else(|err| {
            log_failure(selector, err);
            None
        })
    }

    fn find_all_in_document(&self, selector: &str) -> Vec<NodeId> {
        self.query_selector_all(selector).unwrap_or_else(|err| {
            log_failure(selector, err);
            Vec::new()
        })
    }

    fn closest_match(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        self.closest(node, selector).unwrap_or_else(|err| {
            log_failure(selector, err);
            None
        })
    }

    fn is_match(&self, node: NodeId, selector: &str) -> bool {
        self.matches(node, selector).unwrap_or_else(|err| {
            log_failure(selector, err);
            false
        })
    }
}

/// True for text entry elements, which keep arrow and space keys for themselves
pub(crate) fn is_text_input(doc: &Document, node: NodeId) -> bool {
    matches!(doc.tag(node), Some("input" | "textarea"))
}
