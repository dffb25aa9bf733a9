use std::sync::Arc;

use callcenter_core::config::AppConfig;
use callcenter_core::{ActionError, SmsSender, StaticAvailability};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::actions::{ActionInput, ActionKind, ActionOutput};
use crate::factory::{ActionFactory, ActionSettings};

/// Runs one agent turn: resolve the handler, run it, and turn recoverable
/// failures into a failed result so the conversation can continue.
#[derive(Clone)]
pub struct ActionRuntime {
    factory: ActionFactory,
}

impl ActionRuntime {
    pub fn new(factory: ActionFactory) -> Self {
        Self { factory }
    }

    /// Wires the configured availability table and action settings around
    /// an already selected SMS sender.
    pub fn from_config(config: &AppConfig, sms: Arc<dyn SmsSender>) -> Self {
        let availability = Arc::new(StaticAvailability::from_config(&config.availability.slots));
        Self::new(ActionFactory::new(ActionSettings::from_config(config), availability, sms))
    }

    pub fn factory(&self) -> &ActionFactory {
        &self.factory
    }

    pub async fn invoke(
        &self,
        identifier: &str,
        input_str: &str,
    ) -> Result<ActionOutput, ActionError> {
        let correlation_id = Uuid::new_v4().to_string();
        self.invoke_with_correlation(identifier, input_str, &correlation_id).await
    }

    pub async fn invoke_with_correlation(
        &self,
        identifier: &str,
        input_str: &str,
        correlation_id: &str,
    ) -> Result<ActionOutput, ActionError> {
        let action = match self.factory.create(identifier) {
            Ok(action) => action,
            Err(dispatch_error) => {
                error!(
                    event_name = "action.dispatch.unknown",
                    correlation_id,
                    identifier,
                    error = %dispatch_error,
                    "agent requested an action that is not registered"
                );
                return Err(dispatch_error);
            }
        };

        let kind: ActionKind = action.kind();
        let input = ActionInput::new(input_str, correlation_id);
        info!(
            event_name = "action.dispatch.start",
            correlation_id,
            action_type = %kind,
            "dispatching agent action"
        );

        match action.run(&input).await {
            Ok(response) => {
                info!(
                    event_name = "action.dispatch.completed",
                    correlation_id,
                    action_type = %kind,
                    success = response.success(),
                    "agent action completed"
                );
                Ok(ActionOutput::completed(kind, correlation_id, response))
            }
            Err(action_error) if action_error.is_recoverable() => {
                warn!(
                    event_name = "action.dispatch.failed",
                    correlation_id,
                    action_type = %kind,
                    error_class = action_error.error_class(),
                    error = %action_error,
                    "agent action failed; returning failure result"
                );
                Ok(ActionOutput::failed(kind, correlation_id, &action_error))
            }
            Err(action_error) => Err(action_error),
        }
    }
}
