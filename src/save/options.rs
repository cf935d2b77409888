//! Configuration for the auto-save controller.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::AutoSaveSettings;
use crate::constants::{DEFAULT_SAVE_DELAY, SAVED_STATUS_TTL};

/// Predicate deciding whether a value may be persisted.
pub type ShouldSaveFn<T> = Box<dyn Fn(&T) -> bool>;

/// Comparator returning `true` when two values count as unchanged.
pub type ComparatorFn<T> = Box<dyn Fn(&T, &T) -> bool>;

/// Options for an [`AutoSaveController`](crate::save::AutoSaveController).
pub struct AutoSaveOptions<T> {
    /// Quiet period after the last change before an auto-save fires.
    pub delay: Duration,

    /// When false no automatic or manual saves happen.
    pub enabled: bool,

    /// How long `Saved` is shown before the status reverts to `Idle`.
    pub saved_status_ttl: Duration,

    pub(crate) should_save: ShouldSaveFn<T>,
    pub(crate) comparator: ComparatorFn<T>,
}

impl<T: Serialize + 'static> AutoSaveOptions<T> {
    /// Create options with the default delay, enabled, and change detection
    /// by comparing JSON serializations.
    pub fn new() -> Self {
        Self::with_comparator(serialized_eq)
    }

    /// Build options from the `auto_save` section of the app config.
    pub fn from_config(settings: &AutoSaveSettings) -> Self {
        Self::new()
            .delay(Duration::from_millis(settings.delay_ms))
            .enabled(settings.enabled)
            .saved_status_ttl(Duration::from_millis(settings.saved_status_ttl_ms))
    }
}

impl<T: Serialize + 'static> Default for AutoSaveOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> AutoSaveOptions<T> {
    /// Create options with a caller-supplied change comparator.
    ///
    /// Use this for data that cannot be serialized, or when cheaper
    /// comparisons are available.
    pub fn with_comparator(comparator: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Self {
            delay: DEFAULT_SAVE_DELAY,
            enabled: true,
            saved_status_ttl: SAVED_STATUS_TTL,
            should_save: Box::new(|_| true),
            comparator: Box::new(comparator),
        }
    }

    /// Set the debounce delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set whether auto-save starts enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set how long the `Saved` status lingers.
    pub fn saved_status_ttl(mut self, ttl: Duration) -> Self {
        self.saved_status_ttl = ttl;
        self
    }

    /// Set the predicate gating both automatic and manual saves.
    pub fn should_save(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.should_save = Box::new(predicate);
        self
    }
}

impl<T> fmt::Debug for AutoSaveOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSaveOptions")
            .field("delay", &self.delay)
            .field("enabled", &self.enabled)
            .field("saved_status_ttl", &self.saved_status_ttl)
            .finish_non_exhaustive()
    }
}

/// Structural equality by JSON serialization.
///
/// Values that fail to serialize never compare equal, so they always count as
/// changed.
pub fn serialized_eq<T: Serialize>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Auto-save: change detection could not serialize data: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Doc {
        title: String,
        tags: Vec<&'static str>,
    }

    #[test]
    fn test_serialized_eq_is_structural() {
        let a = Doc {
            title: "Intro".to_string(),
            tags: vec!["a", "b"],
        };
        let b = Doc {
            title: "Intro".to_string(),
            tags: vec!["a", "b"],
        };
        assert!(serialized_eq(&a, &b));

        let c = Doc {
            title: "Intro".to_string(),
            tags: vec!["b", "a"],
        };
        assert!(!serialized_eq(&a, &c));
    }

    #[test]
    fn test_serialized_eq_ignores_map_order() {
        let mut a = HashMap::new();
        a.insert("x", 1);
        a.insert("y", 2);
        let mut b = HashMap::new();
        b.insert("y", 2);
        b.insert("x", 1);
        assert!(serialized_eq(&a, &b));
    }

    #[test]
    fn test_unserializable_counts_as_changed() {
        // Non-string map keys cannot become JSON objects.
        let mut a = HashMap::new();
        a.insert((1, 2), "x");
        assert!(!serialized_eq(&a, &a));
    }

    #[test]
    fn test_defaults() {
        let options = AutoSaveOptions::<u32>::new();
        assert_eq!(options.delay, DEFAULT_SAVE_DELAY);
        assert_eq!(options.saved_status_ttl, SAVED_STATUS_TTL);
        assert!(options.enabled);
        assert!((options.should_save)(&7));
    }

    #[test]
    fn test_from_config() {
        let settings = AutoSaveSettings {
            enabled: false,
            delay_ms: 500,
            saved_status_ttl_ms: 1000,
        };
        let options = AutoSaveOptions::<u32>::from_config(&settings);
        assert!(!options.enabled);
        assert_eq!(options.delay, Duration::from_millis(500));
        assert_eq!(options.saved_status_ttl, Duration::from_millis(1000));
    }
}
