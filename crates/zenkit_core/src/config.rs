//! Toolkit configuration and declarative option parsing
//!
//! Two layers configure widget behavior:
//!
//! - [`ToolkitConfig`]: runtime-wide settings (event namespace, fallback
//!   durations, default delays). Serializable, so hosts can ship it as TOML.
//! - [`Dataset`]: per-element `data-*` attributes read at construction and
//!   mapped onto each widget's typed options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::error::{Result, ZenkitError};

/// Fallback durations (ms) that force a pending transition to complete when
/// the host never reports the transition-finished signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackDurations {
    /// Collapse and accordion height animation
    pub collapse: u64,
    pub modal: u64,
    pub offcanvas: u64,
    pub toast: u64,
    /// Tooltip and popover fade
    pub floating: u64,
    pub carousel: u64,
    /// Backdrop fade-out before the element is removed
    pub backdrop: u64,
    /// How long a static modal keeps its `modal-static` pulse class
    pub static_pulse: u64,
}

impl Default for FallbackDurations {
    fn default() -> Self {
        Self {
            collapse: 350,
            modal: 300,
            offcanvas: 300,
            toast: 250,
            floating: 150,
            carousel: 600,
            backdrop: 150,
            static_pulse: 300,
        }
    }
}

impl FallbackDurations {
    /// Zero-length fallbacks: every transition completes on the next tick
    pub fn instant() -> Self {
        Self {
            collapse: 0,
            modal: 0,
            offcanvas: 0,
            toast: 0,
            floating: 0,
            carousel: 0,
            backdrop: 0,
            static_pulse: 0,
        }
    }
}

/// Runtime-wide configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Middle segment of lifecycle event names (`show.<namespace>.modal`)
    pub namespace: String,
    pub durations: FallbackDurations,
    /// Default toast autohide delay (ms)
    pub toast_delay: u64,
    /// Default carousel auto-cycle interval (ms)
    pub carousel_interval: u64,
    /// Minimum horizontal travel (px) for a carousel swipe
    pub swipe_threshold: f32,
    /// Gap between trigger and tooltip (px)
    pub tooltip_spacing: f32,
    /// Gap between trigger and popover (px)
    pub popover_spacing: f32,
    /// Default scrollspy activation offset (px)
    pub scrollspy_offset: f32,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToolkitConfig {
    /// Standard configuration matching stylesheet transition timings
    pub fn standard() -> Self {
        Self {
            namespace: "zk".to_string(),
            durations: FallbackDurations::default(),
            toast_delay: 5000,
            carousel_interval: 5000,
            swipe_threshold: 50.0,
            tooltip_spacing: 8.0,
            popover_spacing: 12.0,
            scrollspy_offset: 10.0,
        }
    }

    /// Reduced-motion configuration: transitions complete without waiting
    pub fn reduced_motion() -> Self {
        Self {
            durations: FallbackDurations::instant(),
            ..Self::standard()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_durations(mut self, durations: FallbackDurations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_toast_delay(mut self, delay_ms: u64) -> Self {
        self.toast_delay = delay_ms;
        self
    }

    pub fn with_carousel_interval(mut self, interval_ms: u64) -> Self {
        self.carousel_interval = interval_ms;
        self
    }

    /// Parse from TOML; missing keys take their standard values
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Full lifecycle event name, e.g. `event_name("show", "modal")` -> `show.zk.modal`
    pub fn event_name(&self, verb: &str, widget: &str) -> String {
        format!("{verb}.{}.{widget}", self.namespace)
    }
}

/// Read-only view over an element's `data-*` attributes
#[derive(Clone, Copy)]
pub struct Dataset<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> Dataset<'a> {
    pub fn new(doc: &'a Document, node: NodeId) -> Self {
        Self { doc, node }
    }

    /// Raw value of `data-<key>`
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.doc.data(self.node, key)
    }

    /// Non-empty string value
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Boolean flag: absent gives `default`, the literal `false` disables,
    /// any other value (including an empty attribute) enables
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(v) => v.trim() != "false",
        }
    }

    /// Typed value, reporting unparsable input
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ZenkitError::InvalidOption {
                    name: format!("data-{key}"),
                    value: raw.to_string(),
                }),
        }
    }

    /// Typed value with a fallback; unparsable input is logged and ignored
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.parse(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                tracing::warn!("{}; using default", err);
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::element;

    #[test]
    fn test_standard_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.durations.carousel, 600);
        assert_eq!(config.toast_delay, 5000);
        assert_eq!(config.event_name("shown", "modal"), "shown.zk.modal");
        assert_eq!(
            config.with_namespace("ui").event_name("hide", "tab"),
            "hide.ui.tab"
        );
    }

    #[test]
    fn test_toml_partial_override() {
        let config = ToolkitConfig::from_toml_str(
            r#"
            toast_delay = 1500

            [durations]
            modal = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.toast_delay, 1500);
        assert_eq!(config.durations.modal, 120);
        assert_eq!(config.durations.collapse, 350);
        assert_eq!(config.namespace, "zk");
    }

    #[test]
    fn test_toml_round_trip_of_preset() {
        let reduced = ToolkitConfig::reduced_motion();
        let text = reduced.to_toml_string().unwrap();
        assert_eq!(ToolkitConfig::from_toml_str(&text).unwrap(), reduced);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = ToolkitConfig::from_toml_str("toast_delay = \"soon\"").unwrap_err();
        assert!(matches!(err, ZenkitError::Config(_)));
    }

    #[test]
    fn test_dataset_parsing() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.append(
            body,
            element("div")
                .data("interval", "2500")
                .data("wrap", "false")
                .data("keyboard", "")
                .data("offset", "ten"),
        );
        let data = Dataset::new(&doc, node);

        assert_eq!(data.parse::<u64>("interval").unwrap(), Some(2500));
        assert!(!data.flag("wrap", true));
        assert!(data.flag("keyboard", false));
        assert!(data.flag("touch", true));
        assert!(data.parse::<f32>("offset").is_err());
        assert_eq!(data.parse_or("offset", 10.0f32), 10.0);
        assert_eq!(data.string("target"), None);
    }
}
