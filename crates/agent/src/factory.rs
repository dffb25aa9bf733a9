use std::sync::Arc;
use std::time::Duration;

use callcenter_core::config::{AppConfig, FindSlotsConfig, SendTextConfig};
use callcenter_core::{ActionError, AvailabilityProvider, SmsSender};

use crate::actions::{Action, ActionKind, FindAppointmentSlots, SendConfirmationText};

/// Static per-action settings resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSettings {
    pub find_slots: FindSlotsConfig,
    pub send_text: SendTextConfig,
    pub from_number: String,
}

impl ActionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            find_slots: config.actions.find_slots.clone(),
            send_text: config.actions.send_text.clone(),
            from_number: config.sms.from_number.clone(),
        }
    }
}

/// Resolves action identifiers to handlers bound to their settings and
/// shared collaborators.
#[derive(Clone)]
pub struct ActionFactory {
    settings: ActionSettings,
    availability: Arc<dyn AvailabilityProvider>,
    sms: Arc<dyn SmsSender>,
}

impl ActionFactory {
    pub fn new(
        settings: ActionSettings,
        availability: Arc<dyn AvailabilityProvider>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self { settings, availability, sms }
    }

    pub fn create(&self, identifier: &str) -> Result<Box<dyn Action>, ActionError> {
        let kind = identifier.parse::<ActionKind>()?;
        Ok(self.create_kind(kind))
    }

    pub fn create_kind(&self, kind: ActionKind) -> Box<dyn Action> {
        match kind {
            ActionKind::FindSlots => Box::new(FindAppointmentSlots::new(
                self.settings.find_slots.clone(),
                Arc::clone(&self.availability),
            )),
            ActionKind::SendText => Box::new(SendConfirmationText::new(
                self.settings.from_number.clone(),
                Duration::from_secs(self.settings.send_text.timeout_secs),
                Arc::clone(&self.sms),
            )),
        }
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub fn availability(&self) -> &Arc<dyn AvailabilityProvider> {
        &self.availability
    }

    pub fn sms(&self) -> &Arc<dyn SmsSender> {
        &self.sms
    }
}
