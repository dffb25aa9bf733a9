use std::sync::Arc;

use async_trait::async_trait;
use callcenter_core::config::FindSlotsConfig;
use callcenter_core::domain::appointment::render_slots;
use callcenter_core::{ActionError, AppointmentSlot, AvailabilityProvider};
use tracing::{info, warn};

use super::params::{Arity, FindSlotsParams};
use super::{Action, ActionInput, ActionKind, ActionResponse, FindSlotsResponse};

pub const NO_SLOTS_MESSAGE: &str = "no appointment slots available";

pub struct FindAppointmentSlots {
    config: FindSlotsConfig,
    availability: Arc<dyn AvailabilityProvider>,
}

impl FindAppointmentSlots {
    pub fn new(config: FindSlotsConfig, availability: Arc<dyn AvailabilityProvider>) -> Self {
        Self { config, availability }
    }

    async fn candidate_slots(
        &self,
        params: &FindSlotsParams,
        correlation_id: &str,
    ) -> Result<Vec<AppointmentSlot>, ActionError> {
        let Some(referral) = params.referral_key() else {
            return Ok(self.availability.lookup_slots(None).await?);
        };

        let referred = self.availability.lookup_slots(Some(&referral)).await?;
        if !referred.is_empty() {
            return Ok(referred);
        }

        info!(
            event_name = "action.find_slots.referral_unmatched",
            correlation_id,
            referral = %referral,
            "referral did not match a known provider; offering all slots"
        );
        Ok(self.availability.lookup_slots(None).await?)
    }
}

#[async_trait]
impl Action for FindAppointmentSlots {
    fn kind(&self) -> ActionKind {
        ActionKind::FindSlots
    }

    async fn run(&self, input: &ActionInput) -> Result<ActionResponse, ActionError> {
        let correlation_id = input.correlation_id.as_str();
        info!(
            event_name = "action.find_slots.received",
            correlation_id,
            input = %input.input_str(),
            "received appointment slot request"
        );

        let (params, arity) = FindSlotsParams::parse(input.input_str());
        if arity != Arity::Exact {
            warn!(
                event_name = "action.find_slots.arity_mismatch",
                correlation_id,
                arity = ?arity,
                "slot request did not have four fields; continuing with defaults"
            );
        }

        let mut slots = self.candidate_slots(&params, correlation_id).await?;
        if self.config.nearest {
            slots = earliest(slots).into_iter().collect();
        }

        if slots.is_empty() {
            return Ok(ActionResponse::FindSlots(FindSlotsResponse {
                success: false,
                message: NO_SLOTS_MESSAGE.to_string(),
            }));
        }

        Ok(ActionResponse::FindSlots(FindSlotsResponse {
            success: true,
            message: render_slots(&slots),
        }))
    }
}

/// Earliest parseable slot; table order breaks ties and unparseable
/// timestamps sort last.
fn earliest(slots: Vec<AppointmentSlot>) -> Option<AppointmentSlot> {
    slots
        .into_iter()
        .enumerate()
        .min_by_key(|(index, slot)| {
            let starts_at = slot.starts_at();
            (starts_at.is_none(), starts_at, *index)
        })
        .map(|(_, slot)| slot)
}
