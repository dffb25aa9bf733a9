use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use callcenter_core::{ActionError, SmsMessage, SmsSendError, SmsSender};
use tracing::{info, warn};

use super::params::SendTextParams;
use super::{Action, ActionInput, ActionKind, ActionResponse, SendTextResponse};

pub struct SendConfirmationText {
    from_number: String,
    send_timeout: Duration,
    sms: Arc<dyn SmsSender>,
}

impl SendConfirmationText {
    pub fn new(
        from_number: impl Into<String>,
        send_timeout: Duration,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self { from_number: from_number.into(), send_timeout, sms }
    }
}

#[async_trait]
impl Action for SendConfirmationText {
    fn kind(&self) -> ActionKind {
        ActionKind::SendText
    }

    async fn run(&self, input: &ActionInput) -> Result<ActionResponse, ActionError> {
        let correlation_id = input.correlation_id.as_str();
        let params = SendTextParams::parse(input.input_str())?;

        let message = SmsMessage {
            body: params.confirmation_body(),
            from: self.from_number.clone(),
            to: params.destination(),
        };

        let sent = tokio::time::timeout(self.send_timeout, self.sms.send(&message))
            .await
            .unwrap_or(Err(SmsSendError::Timeout));

        match sent {
            Ok(message_id) => {
                info!(
                    event_name = "action.send_text.sent",
                    correlation_id,
                    provider = self.sms.provider_name(),
                    message_id = %message_id,
                    to = %message.to,
                    "appointment confirmation text sent"
                );
                Ok(ActionResponse::SendText(SendTextResponse { success: true }))
            }
            Err(error) => {
                warn!(
                    event_name = "action.send_text.failed",
                    correlation_id,
                    provider = self.sms.provider_name(),
                    to = %message.to,
                    error = %error,
                    "appointment confirmation text failed"
                );
                Err(error.into())
            }
        }
    }
}
