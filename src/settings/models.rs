//! Workgroup settings data model.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Address of a remote chat workgroup, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkgroupId(String);

impl WorkgroupId {
    /// Parse a workgroup address.
    ///
    /// Surrounding whitespace is trimmed. Empty input and input with inner
    /// whitespace or control characters is rejected.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        let trimmed = raw.trim();
        let malformed = trimmed.is_empty()
            || trimmed
                .chars()
                .any(|c| c.is_whitespace() || c.is_control());

        if malformed {
            return Err(SettingsError::InvalidWorkgroup(raw.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkgroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WorkgroupId {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One key of a settings bundle. The value may be unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingSlot {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[cfg(test)]
impl SettingSlot {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// All settings of one workgroup, keyed by setting name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsBundle {
    slots: HashMap<String, SettingSlot>,
}

impl SettingsBundle {
    /// Build a bundle from the slot list sent by the settings service.
    /// If a key repeats, the first occurrence wins.
    pub fn from_slots(slots: impl IntoIterator<Item = SettingSlot>) -> Self {
        let mut map = HashMap::new();
        for slot in slots {
            map.entry(slot.key.clone()).or_insert(slot);
        }
        Self { slots: map }
    }

    pub fn get(&self, key: &str) -> Option<&SettingSlot> {
        self.slots.get(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
