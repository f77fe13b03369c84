//! Slot table - registry of the slots known to the active translator.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Slot;
use crate::components::Variable;

/// Registry of event slots keyed by keyword.
///
/// Lookups by keyword are fail-soft: an unknown keyword yields an empty
/// collection or string. Only [`SlotTable::get_event_slot`] reports absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotTable {
    slots: HashMap<String, Slot>,

    /// Keyword used when a component has no explicit slot binding.
    default_format_keyword: Option<String>,
}

impl SlotTable {
    /// Create an empty slot table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a slot, replacing any slot with the same keyword.
    pub fn add_event_slot(&mut self, slot: Slot) {
        self.slots.insert(slot.keyword.clone(), slot);
    }

    /// Insert slots in iteration order; the last duplicate keyword wins.
    pub fn add_event_slots(&mut self, slots: impl IntoIterator<Item = Slot>) {
        let before = self.slots.len();
        for slot in slots {
            self.add_event_slot(slot);
        }
        debug!(
            "event=slots_loaded added={} total={}",
            self.slots.len().saturating_sub(before),
            self.slots.len()
        );
    }

    /// Implicit variables of a slot, or an empty list when unknown.
    pub fn get_implicits(&self, keyword: &str) -> Vec<Variable> {
        self.slots
            .get(keyword)
            .map(|slot| slot.implicits.clone())
            .unwrap_or_default()
    }

    /// Parameter variables of a slot, or an empty list when unknown.
    pub fn get_parameters(&self, keyword: &str) -> Vec<Variable> {
        self.slots
            .get(keyword)
            .map(|slot| slot.parameters.clone())
            .unwrap_or_default()
    }

    /// Display name of a slot, or `""` when unknown.
    pub fn get_display_name(&self, keyword: &str) -> String {
        self.slots
            .get(keyword)
            .map(|slot| slot.display_name.clone())
            .unwrap_or_default()
    }

    /// Condition of a slot, or `""` when unknown.
    pub fn get_condition(&self, keyword: &str) -> String {
        self.slots
            .get(keyword)
            .map(|slot| slot.condition.clone())
            .unwrap_or_default()
    }

    /// The slot registered under `keyword`, if any.
    pub fn get_event_slot(&self, keyword: &str) -> Option<&Slot> {
        self.slots.get(keyword)
    }

    /// All registered slots, in no particular order.
    pub fn get_event_slots(&self) -> Vec<&Slot> {
        self.slots.values().collect()
    }

    /// Format keyword for a slot: its own, else the default, else `""`.
    pub fn get_format_keyword(&self, keyword: &str) -> String {
        let default = self.default_format_keyword.as_deref().unwrap_or_default();
        self.slots
            .get(keyword)
            .map(|slot| slot.format_keyword_or(default).to_string())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn default_format_keyword(&self) -> Option<&str> {
        self.default_format_keyword.as_deref()
    }

    pub fn set_default_format_keyword(&mut self, keyword: impl Into<String>) {
        self.default_format_keyword = Some(keyword.into());
    }

    /// Remove every registered slot.
    pub fn clear(&mut self) {
        debug!("event=slots_cleared count={}", self.slots.len());
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Display for SlotTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keywords: Vec<_> = self.slots.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        write!(f, "SlotTable [{}]", keywords.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn death_slot() -> Slot {
        Slot::new("onDeath", "When Dies")
            .with_parameter(Variable::new("victim").with_type("creature"))
            .with_implicit(Variable::new("killer").with_type("creature"))
    }

    #[test]
    fn test_add_and_get_slot() {
        let mut table = SlotTable::new();
        let slot = death_slot();
        table.add_event_slot(slot.clone());

        assert_eq!(table.get_event_slot("onDeath"), Some(&slot));
        assert_eq!(table.get_parameters("onDeath"), slot.parameters);
        assert_eq!(table.get_implicits("onDeath"), slot.implicits);
        assert_eq!(table.get_display_name("onDeath"), "When Dies");
    }

    #[test]
    fn test_last_duplicate_wins() {
        let mut table = SlotTable::new();
        table.add_event_slots(vec![
            Slot::new("onUse", "First"),
            death_slot(),
            Slot::new("onUse", "Second"),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get_display_name("onUse"), "Second");
    }

    #[test]
    fn test_bulk_matches_sequential() {
        let slots = vec![
            Slot::new("a", "A"),
            Slot::new("b", "B"),
            Slot::new("a", "A2").with_implicit(Variable::new("x")),
        ];

        let mut bulk = SlotTable::new();
        bulk.add_event_slots(slots.clone());

        let mut sequential = SlotTable::new();
        for slot in slots {
            sequential.add_event_slot(slot);
        }

        assert_eq!(bulk.len(), sequential.len());
        for keyword in ["a", "b"] {
            assert_eq!(bulk.get_event_slot(keyword), sequential.get_event_slot(keyword));
        }
    }

    #[test]
    fn test_unknown_keyword_is_fail_soft() {
        let table = SlotTable::new();
        assert!(table.get_implicits("nonexistent").is_empty());
        assert!(table.get_parameters("nonexistent").is_empty());
        assert_eq!(table.get_display_name("nonexistent"), "");
        assert_eq!(table.get_condition("nonexistent"), "");
        assert!(table.get_event_slot("nonexistent").is_none());
    }

    #[test]
    fn test_clear() {
        let mut table = SlotTable::new();
        table.add_event_slot(death_slot());
        table.clear();

        assert!(table.is_empty());
        assert!(table.get_event_slots().is_empty());
        assert!(table.get_parameters("onDeath").is_empty());
        assert_eq!(table.get_display_name("onDeath"), "");
    }

    #[test]
    fn test_default_format_keyword() {
        let mut table = SlotTable::new();
        assert_eq!(table.default_format_keyword(), None);
        assert_eq!(table.get_format_keyword("onDeath"), "");

        table.set_default_format_keyword("script");
        table.add_event_slot(death_slot());
        table.add_event_slot(Slot::new("onHeartbeat", "Every Round").with_format_keyword("heartbeat"));

        assert_eq!(table.get_format_keyword("onDeath"), "script");
        assert_eq!(table.get_format_keyword("onHeartbeat"), "heartbeat");
        assert_eq!(table.get_format_keyword("nonexistent"), "script");
    }

    #[test]
    fn test_display_lists_sorted_keywords() {
        let mut table = SlotTable::new();
        table.add_event_slot(Slot::new("b", "B"));
        table.add_event_slot(Slot::new("a", "A"));
        assert_eq!(table.to_string(), "SlotTable [a, b]");
    }
}
