//! Deferred install prompt.
//!
//! The platform announces once that the app is installable. The signal is
//! held until the user clicks the install control, then consumed exactly
//! once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single-slot holder: store once, consume once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredSlot<T> {
    value: Option<T>,
}

impl<T> Default for DeferredSlot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> DeferredSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` if the slot is empty. Returns `false` (and drops the
    /// new value) when a value is already pending.
    pub fn offer(&mut self, value: T) -> bool {
        if self.value.is_some() {
            return false;
        }
        self.value = Some(value);
        true
    }

    /// Consume the pending value. A second call returns `None`.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn is_pending(&self) -> bool {
        self.value.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

/// The platform's installable signal as reported by the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOffer {
    /// Platforms the browser says it can install to.
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl InstallOffer {
    pub fn new(platforms: Vec<String>) -> Self {
        Self {
            platforms,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_is_store_once() {
        let mut slot = DeferredSlot::new();
        assert!(slot.offer(1));
        assert!(!slot.offer(2));
        assert_eq!(slot.peek(), Some(&1));
    }

    #[test]
    fn take_is_consume_once() {
        let mut slot = DeferredSlot::new();
        slot.offer("prompt");
        assert_eq!(slot.take(), Some("prompt"));
        assert_eq!(slot.take(), None);
        assert!(!slot.is_pending());
        assert!(slot.offer("again"));
    }

    #[test]
    fn clear_discards_pending() {
        let mut slot = DeferredSlot::new();
        slot.offer(());
        slot.clear();
        assert!(!slot.is_pending());
    }

    #[test]
    fn offer_deserializes_with_defaults() {
        let offer: InstallOffer = serde_json::from_str(r#"{"platforms": ["web"]}"#).unwrap();
        assert_eq!(offer.platforms, vec!["web"]);
    }
}
