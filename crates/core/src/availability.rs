//! Appointment availability lookup.
//!
//! `AvailabilityProvider` is the seam between the slot-finding action and
//! whatever holds provider schedules. `StaticAvailability` is the in-memory
//! table used today; it is seeded either from the built-in placeholder
//! providers or from the `[[availability.slots]]` config section.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SlotConfig;
use crate::domain::appointment::{AppointmentSlot, ProviderKey};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("availability backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Slots for one provider, or every known slot when `provider` is `None`.
    /// An unknown provider yields an empty list.
    async fn lookup_slots(
        &self,
        provider: Option<&ProviderKey>,
    ) -> Result<Vec<AppointmentSlot>, AvailabilityError>;

    fn provider_count(&self) -> usize;
}

#[derive(Clone, Debug)]
pub struct StaticAvailability {
    slots: Vec<AppointmentSlot>,
}

impl Default for StaticAvailability {
    fn default() -> Self {
        Self::new(placeholder_slots())
    }
}

impl StaticAvailability {
    pub fn new(slots: Vec<AppointmentSlot>) -> Self {
        Self { slots }
    }

    pub fn from_config(slots: &[SlotConfig]) -> Self {
        if slots.is_empty() {
            return Self::default();
        }

        Self::new(
            slots
                .iter()
                .map(|slot| AppointmentSlot::new(&slot.doctor, &slot.datetime, &slot.address))
                .collect(),
        )
    }

    pub fn slots(&self) -> &[AppointmentSlot] {
        &self.slots
    }
}

#[async_trait]
impl AvailabilityProvider for StaticAvailability {
    async fn lookup_slots(
        &self,
        provider: Option<&ProviderKey>,
    ) -> Result<Vec<AppointmentSlot>, AvailabilityError> {
        let matches = self
            .slots
            .iter()
            .filter(|slot| match provider {
                Some(key) => slot.provider_key().as_ref() == Some(key),
                None => true,
            })
            .cloned()
            .collect();

        Ok(matches)
    }

    fn provider_count(&self) -> usize {
        self.slots.iter().filter_map(AppointmentSlot::provider_key).collect::<BTreeSet<_>>().len()
    }
}

/// Placeholder schedule until a real time-indexed store is wired in.
pub fn placeholder_slots() -> Vec<AppointmentSlot> {
    vec![
        AppointmentSlot::new(
            "John Smith",
            "2024-03-08 12:00:00.000000",
            "55 Fruit St, Boston, MA 02114",
        ),
        AppointmentSlot::new(
            "Bobby Bobster",
            "2024-03-08 12:00:00.000000",
            "55 Fruit St, Boston, MA 02114",
        ),
    ]
}
