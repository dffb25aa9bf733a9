use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the ISO-like slot timestamps, e.g. `2024-03-08 12:00:00.000000`.
pub const SLOT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Normalized provider name used as the availability lookup key.
///
/// Normalization lowercases, treats `_` as a space and collapses runs of
/// whitespace, so `"John  Smith"`, `"john_smith"` and `" JOHN SMITH "` all
/// resolve to `"john smith"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderKey(pub String);

impl ProviderKey {
    pub fn normalize(raw: &str) -> Option<Self> {
        let normalized = raw
            .replace('_', " ")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        (!normalized.is_empty()).then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub doctor_name: String,
    pub datetime: String,
    pub address: String,
}

impl AppointmentSlot {
    pub fn new(
        doctor_name: impl Into<String>,
        datetime: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self { doctor_name: doctor_name.into(), datetime: datetime.into(), address: address.into() }
    }

    pub fn provider_key(&self) -> Option<ProviderKey> {
        ProviderKey::normalize(&self.doctor_name)
    }

    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.datetime.trim(), SLOT_DATETIME_FORMAT).ok()
    }

    /// Spoken-friendly single line: `<provider>, <datetime>, <address>`.
    pub fn render(&self) -> String {
        format!("{}, {}, {}", self.doctor_name, self.datetime, self.address)
    }
}

/// Joins rendered slots the way the agent narrates alternatives.
pub fn render_slots(slots: &[AppointmentSlot]) -> String {
    slots.iter().map(AppointmentSlot::render).collect::<Vec<_>>().join(" | ")
}
