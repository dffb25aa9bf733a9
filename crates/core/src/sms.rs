use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Country code prepended to the caller's digits before dispatch.
pub const DEFAULT_COUNTRY_PREFIX: &str = "+1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub body: String,
    pub from: String,
    pub to: String,
}

/// Carrier-assigned identifier of an accepted message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SmsSendError {
    #[error("sms send timed out")]
    Timeout,
    #[error("sms provider rejected credentials")]
    Unauthorized,
    #[error("sms provider rejected message with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("sms transport failure: {0}")]
    Transport(String),
    #[error("sms provider response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> Result<MessageId, SmsSendError>;

    /// Short provider label for health and doctor output.
    fn provider_name(&self) -> &'static str;
}

/// Logs the message instead of handing it to a carrier.
#[derive(Clone, Debug, Default)]
pub struct DryRunSmsSender;

#[async_trait]
impl SmsSender for DryRunSmsSender {
    async fn send(&self, message: &SmsMessage) -> Result<MessageId, SmsSendError> {
        let id = MessageId(format!("dry-run-{}", Uuid::new_v4()));
        info!(
            event_name = "egress.sms.dry_run",
            message_id = %id,
            to = %message.to,
            from = %message.from,
            body = %message.body,
            "sms dry run; message not sent"
        );
        Ok(id)
    }

    fn provider_name(&self) -> &'static str {
        "dry_run"
    }
}
