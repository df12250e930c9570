//! Configuration types — options bags, resolved settings, and merge rules.
//!
//! Callers hand a [`TourOptions`] bag (every field optional, often parsed
//! straight from JSON) to the tour, which merges it over
//! [`TourConfig::default`]. Scalars and nested objects override per key;
//! the `items` list replaces the base list wholesale, it never
//! concatenates. Merging the same options twice yields the same result as
//! merging once.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signal::SignalScope;

/// Side of the anchor a tooltip attaches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

/// Resolved tooltip display options, shared by every step unless the step
/// overrides individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipConfig {
    /// Offset from the anchor edge, in pixels.
    pub offset: i32,
    /// Side of the anchor the tooltip attaches to.
    pub placement: Placement,
    /// Whether the host should animate show and hide.
    pub animation: bool,
    /// Delay before the tooltip becomes visible, in milliseconds.
    pub delay_ms: u64,
    /// Extra style class applied to the tooltip element.
    pub class: String,
    /// Style class applied while the tooltip is active.
    pub active_class: String,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset: 5,
            placement: Placement::Top,
            animation: false,
            delay_ms: 0,
            class: String::new(),
            active_class: "active".to_string(),
        }
    }
}

impl TooltipConfig {
    /// Merge `overrides` over these options, field by field.
    pub fn merged(&self, overrides: &TooltipOverrides) -> TooltipConfig {
        TooltipConfig {
            offset: overrides.offset.unwrap_or(self.offset),
            placement: overrides.placement.unwrap_or(self.placement),
            animation: overrides.animation.unwrap_or(self.animation),
            delay_ms: overrides.delay_ms.unwrap_or(self.delay_ms),
            class: overrides.class.clone().unwrap_or_else(|| self.class.clone()),
            active_class: overrides
                .active_class
                .clone()
                .unwrap_or_else(|| self.active_class.clone()),
        }
    }

    /// Tooltip show delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Per-field tooltip overrides; `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipOverrides {
    pub offset: Option<i32>,
    pub placement: Option<Placement>,
    pub animation: Option<bool>,
    pub delay_ms: Option<u64>,
    pub class: Option<String>,
    pub active_class: Option<String>,
}

/// One link in a step's event chain: a signal name observed on a scope.
///
/// Deserializes from either the structured map form
/// `{"scope": "document", "event": "click"}` or the compact string form
/// `"document click"` carried over from the original options bags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventBindingRepr")]
pub struct EventBinding {
    /// Scope the event is observed on.
    pub scope: SignalScope,
    /// Event name, e.g. `click`.
    pub event: String,
}

impl EventBinding {
    pub fn new(scope: SignalScope, event: impl Into<String>) -> EventBinding {
        EventBinding {
            scope,
            event: event.into(),
        }
    }
}

impl FromStr for EventBinding {
    type Err = ConfigError;

    /// Parse the compact `"<scope> <event>"` form: exactly two
    /// whitespace-separated tokens, scope first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(scope), Some(event), None) => Ok(EventBinding {
                scope: SignalScope::from_token(scope),
                event: event.to_string(),
            }),
            _ => Err(ConfigError::InvalidEventBinding {
                input: s.to_string(),
                reason: "expected exactly two whitespace-separated tokens".to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventBindingRepr {
    Compact(String),
    Full { scope: SignalScope, event: String },
}

impl TryFrom<EventBindingRepr> for EventBinding {
    type Error = ConfigError;

    fn try_from(repr: EventBindingRepr) -> Result<Self, Self::Error> {
        match repr {
            EventBindingRepr::Compact(s) => s.parse(),
            EventBindingRepr::Full { scope, event } => Ok(EventBinding { scope, event }),
        }
    }
}

/// Per-step input: where the callout binds, what must happen before it
/// shows, and what it says.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepOptions {
    /// Selector for the element the tooltip is bound to. The first match
    /// wins; a selector that matches nothing leaves the step inert.
    pub bound_to: String,
    /// Events chain after which the tooltip should be shown.
    pub events: Vec<EventBinding>,
    /// Tooltip message.
    pub message: String,
    /// Per-step tooltip overrides, merged over the tour's tooltip options.
    pub tooltip: Option<TooltipOverrides>,
}

/// Caller-supplied tour options. Every field is optional; absent fields
/// keep the [`TourConfig::default`] value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourOptions {
    /// Do not run the tour twice inside one session.
    pub disable_on_reload: Option<bool>,
    /// Store per-step repeat counts locally.
    pub store_locally: Option<bool>,
    /// Timeout before a shown step hides itself, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Number of times each tooltip may be shown.
    pub times: Option<u32>,
    /// Tooltip display overrides shared by every step.
    pub tooltip: Option<TooltipOverrides>,
    /// Ordered tour steps. Replaces the base list wholesale when present.
    pub items: Option<Vec<StepOptions>>,
}

impl TourOptions {
    /// Parse an options bag from JSON.
    pub fn from_json(json: &str) -> crate::error::Result<TourOptions> {
        Ok(serde_json::from_str::<TourOptions>(json).map_err(ConfigError::Parse)?)
    }
}

/// Fully-resolved tour configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourConfig {
    /// Do not run the tour twice inside one session.
    pub disable_on_reload: bool,
    /// Store per-step repeat counts locally. Carried for the host's
    /// repeat-count layer; the engine itself never reads it.
    pub store_locally: bool,
    /// Timeout before a shown step hides itself, in milliseconds.
    pub timeout_ms: u64,
    /// Number of times each tooltip may be shown. Carried for the host's
    /// repeat-count layer; the engine itself never reads it.
    pub times: u32,
    /// Tooltip display options shared by every step.
    pub tooltip: TooltipConfig,
    /// Ordered tour steps.
    pub items: Vec<StepOptions>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            disable_on_reload: true,
            store_locally: true,
            timeout_ms: 5_000, // 5 seconds
            times: 5,
            tooltip: TooltipConfig::default(),
            items: Vec::new(),
        }
    }
}

impl TourConfig {
    /// Merge caller `options` over these settings, per the module rules.
    pub fn merge(&self, options: &TourOptions) -> TourConfig {
        TourConfig {
            disable_on_reload: options.disable_on_reload.unwrap_or(self.disable_on_reload),
            store_locally: options.store_locally.unwrap_or(self.store_locally),
            timeout_ms: options.timeout_ms.unwrap_or(self.timeout_ms),
            times: options.times.unwrap_or(self.times),
            tooltip: match &options.tooltip {
                Some(overrides) => self.tooltip.merged(overrides),
                None => self.tooltip.clone(),
            },
            items: match &options.items {
                Some(items) => items.clone(),
                None => self.items.clone(),
            },
        }
    }

    /// Auto-hide timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Tour-level settings every step reads.
///
/// One immutable value per tour, shared across its steps: the auto-hide
/// timeout, the repeat hint, and the tooltip display options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourSettings {
    pub timeout_ms: u64,
    pub times: u32,
    pub tooltip: TooltipConfig,
}

impl TourSettings {
    /// Auto-hide timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl From<&TourConfig> for TourSettings {
    fn from(config: &TourConfig) -> TourSettings {
        TourSettings {
            timeout_ms: config.timeout_ms,
            times: config.times,
            tooltip: config.tooltip.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TourConfig::default();

        assert!(config.disable_on_reload);
        assert!(config.store_locally);
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.times, 5);
        assert!(config.items.is_empty());

        assert_eq!(config.tooltip.offset, 5);
        assert_eq!(config.tooltip.placement, Placement::Top);
        assert!(!config.tooltip.animation);
        assert_eq!(config.tooltip.delay_ms, 0);
        assert_eq!(config.tooltip.class, "");
        assert_eq!(config.tooltip.active_class, "active");
    }

    #[test]
    fn empty_options_keep_defaults() {
        let merged = TourConfig::default().merge(&TourOptions::default());
        assert_eq!(merged, TourConfig::default());
    }

    #[test]
    fn scalar_options_override_per_key() {
        let options = TourOptions {
            timeout_ms: Some(1_000),
            disable_on_reload: Some(false),
            ..TourOptions::default()
        };

        let merged = TourConfig::default().merge(&options);
        assert_eq!(merged.timeout_ms, 1_000);
        assert!(!merged.disable_on_reload);
        // Untouched keys keep their defaults.
        assert_eq!(merged.times, 5);
        assert!(merged.store_locally);
    }

    #[test]
    fn tooltip_overrides_merge_field_by_field() {
        let options = TourOptions {
            tooltip: Some(TooltipOverrides {
                offset: Some(12),
                placement: Some(Placement::Bottom),
                ..TooltipOverrides::default()
            }),
            ..TourOptions::default()
        };

        let merged = TourConfig::default().merge(&options);
        assert_eq!(merged.tooltip.offset, 12);
        assert_eq!(merged.tooltip.placement, Placement::Bottom);
        assert_eq!(merged.tooltip.active_class, "active");
        assert_eq!(merged.tooltip.delay_ms, 0);
    }

    #[test]
    fn items_replace_wholesale() {
        let base = TourConfig {
            items: vec![StepOptions {
                bound_to: ".old".to_string(),
                ..StepOptions::default()
            }],
            ..TourConfig::default()
        };

        let options = TourOptions {
            items: Some(vec![
                StepOptions {
                    bound_to: ".a".to_string(),
                    ..StepOptions::default()
                },
                StepOptions {
                    bound_to: ".b".to_string(),
                    ..StepOptions::default()
                },
            ]),
            ..TourOptions::default()
        };

        let merged = base.merge(&options);
        assert_eq!(merged.items.len(), 2);
        assert_eq!(merged.items[0].bound_to, ".a");
        assert_eq!(merged.items[1].bound_to, ".b");
    }

    #[test]
    fn merge_is_idempotent() {
        let options = TourOptions {
            timeout_ms: Some(2_500),
            tooltip: Some(TooltipOverrides {
                placement: Some(Placement::Left),
                class: Some("tour".to_string()),
                ..TooltipOverrides::default()
            }),
            items: Some(vec![StepOptions {
                bound_to: ".menu".to_string(),
                message: "The menu".to_string(),
                ..StepOptions::default()
            }]),
            ..TourOptions::default()
        };

        let once = TourConfig::default().merge(&options);
        let twice = once.merge(&options);
        assert_eq!(once, twice);
    }

    #[test]
    fn compact_event_binding_parses() {
        let binding: EventBinding = "document click".parse().unwrap();
        assert_eq!(binding.scope, SignalScope::Document);
        assert_eq!(binding.event, "click");

        let binding: EventBinding = ".menu mouseenter".parse().unwrap();
        assert_eq!(binding.scope, SignalScope::Selector(".menu".to_string()));
        assert_eq!(binding.event, "mouseenter");

        // The html token addresses the document root.
        let binding: EventBinding = "html scroll".parse().unwrap();
        assert_eq!(binding.scope, SignalScope::Root);
    }

    #[test]
    fn compact_event_binding_rejects_wrong_arity() {
        assert!("click".parse::<EventBinding>().is_err());
        assert!("document click extra".parse::<EventBinding>().is_err());
        assert!("".parse::<EventBinding>().is_err());
    }

    #[test]
    fn options_parse_from_json_with_mixed_event_forms() {
        let json = r#"{
            "timeout_ms": 3000,
            "items": [
                {
                    "bound_to": ".welcome",
                    "message": "Welcome!",
                    "events": [
                        "document app:ready",
                        {"scope": "window", "event": "resize"},
                        {"scope": {"selector": ".menu"}, "event": "click"}
                    ]
                }
            ]
        }"#;

        let options = TourOptions::from_json(json).unwrap();
        assert_eq!(options.timeout_ms, Some(3_000));

        let items = options.items.unwrap();
        let events = &items[0].events;
        assert_eq!(
            events[0],
            EventBinding::new(SignalScope::Document, "app:ready")
        );
        assert_eq!(events[1], EventBinding::new(SignalScope::Window, "resize"));
        assert_eq!(
            events[2],
            EventBinding::new(SignalScope::Selector(".menu".to_string()), "click")
        );
    }

    #[test]
    fn bad_event_binding_fails_json_parse() {
        let json = r#"{"items": [{"bound_to": ".x", "events": ["just-one-token"]}]}"#;
        assert!(TourOptions::from_json(json).is_err());
    }
}
