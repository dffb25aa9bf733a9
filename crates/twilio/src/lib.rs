//! Twilio Programmable Messaging client used by the `send_text` action.
//!
//! One `POST /2010-04-01/Accounts/{sid}/Messages.json` per message, HTTP
//! basic auth with the account SID and auth token, form-encoded
//! `To`/`From`/`Body`. No retries; callers decide what a failure means.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use callcenter_core::config::{SmsConfig, SmsProvider};
use callcenter_core::{DryRunSmsSender, MessageId, SmsMessage, SmsSendError, SmsSender};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, warn};

const MESSAGES_API_VERSION: &str = "2010-04-01";

/// Sender selected by `sms.provider`.
pub fn sender_from_config(config: &SmsConfig) -> Result<Arc<dyn SmsSender>, SmsSendError> {
    match config.provider {
        SmsProvider::Twilio => Ok(Arc::new(TwilioSmsClient::from_config(config)?)),
        SmsProvider::DryRun => Ok(Arc::new(DryRunSmsSender)),
    }
}

#[derive(Clone, Debug)]
pub struct TwilioSmsClient {
    client: Client,
    account_sid: String,
    auth_token: SecretString,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResource {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl TwilioSmsClient {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: SecretString,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SmsSendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| SmsSendError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            account_sid: account_sid.into(),
            auth_token,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the `[sms]` section. Credentials are checked by
    /// config validation; a missing one here is reported as unauthorized.
    pub fn from_config(config: &SmsConfig) -> Result<Self, SmsSendError> {
        let account_sid = config.account_sid.clone().ok_or(SmsSendError::Unauthorized)?;
        let auth_token = config.auth_token.clone().ok_or(SmsSendError::Unauthorized)?;

        Self::new(
            account_sid,
            auth_token,
            config.api_base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{MESSAGES_API_VERSION}/Accounts/{}/Messages.json",
            self.api_base_url, self.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsClient {
    async fn send(&self, message: &SmsMessage) -> Result<MessageId, SmsSendError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("To", message.to.as_str()),
                ("From", message.from.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            let resource = response
                .json::<MessageResource>()
                .await
                .map_err(|error| SmsSendError::Decode(error.to_string()))?;
            info!(
                event_name = "egress.sms.accepted",
                message_sid = %resource.sid,
                status = status.as_u16(),
                "twilio accepted outbound message"
            );
            return Ok(MessageId(resource.sid));
        }

        let body = response.text().await.map_err(|error| {
            SmsSendError::Decode(format!("twilio error body (status {status}) unreadable: {error}"))
        })?;
        warn!(
            event_name = "egress.sms.rejected",
            status = status.as_u16(),
            "twilio rejected outbound message"
        );
        Err(status_error(status, &body))
    }

    fn provider_name(&self) -> &'static str {
        "twilio"
    }
}

fn transport_error(error: reqwest::Error) -> SmsSendError {
    if error.is_timeout() {
        SmsSendError::Timeout
    } else {
        SmsSendError::Transport(error.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> SmsSendError {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return SmsSendError::Unauthorized;
    }

    let detail = match serde_json::from_str::<ErrorResource>(body) {
        Ok(ErrorResource { code: Some(code), message: Some(message) }) => {
            format!("{message} (code {code})")
        }
        Ok(ErrorResource { message: Some(message), .. }) => message,
        _ if body.trim().is_empty() => status.canonical_reason().unwrap_or("unknown").to_string(),
        _ => body.trim().to_string(),
    };

    SmsSendError::Rejected { status: status.as_u16(), detail }
}

#[cfg(test)]
mod tests {
    use callcenter_core::config::{AppConfig, SmsProvider};
    use reqwest::StatusCode;
    use secrecy::SecretString;

    use super::{sender_from_config, status_error};
    use callcenter_core::SmsSendError;

    #[test]
    fn provider_setting_selects_the_sender() {
        let mut sms = AppConfig::default().sms;

        sms.provider = SmsProvider::DryRun;
        let sender = sender_from_config(&sms).expect("dry run needs no credentials");
        assert_eq!(sender.provider_name(), "dry_run");

        sms.provider = SmsProvider::Twilio;
        sms.account_sid = Some("AC123".to_string());
        sms.auth_token = Some(SecretString::from("token".to_string()));
        let sender = sender_from_config(&sms).expect("credentials present");
        assert_eq!(sender.provider_name(), "twilio");
    }

    #[test]
    fn twilio_sender_without_credentials_is_unauthorized() {
        let mut sms = AppConfig::default().sms;
        sms.provider = SmsProvider::Twilio;
        sms.account_sid = None;

        let error = sender_from_config(&sms).err().expect("missing sid must fail");
        assert_eq!(error, SmsSendError::Unauthorized);
    }

    #[test]
    fn auth_failures_map_to_unauthorized() {
        assert_eq!(status_error(StatusCode::UNAUTHORIZED, ""), SmsSendError::Unauthorized);
        assert_eq!(status_error(StatusCode::FORBIDDEN, "{}"), SmsSendError::Unauthorized);
    }

    #[test]
    fn rejection_detail_prefers_twilio_message() {
        let error = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"code": 21211, "message": "The 'To' number +1555 is not a valid phone number.", "status": 400}"#,
        );
        assert_eq!(
            error,
            SmsSendError::Rejected {
                status: 400,
                detail: "The 'To' number +1555 is not a valid phone number. (code 21211)"
                    .to_string(),
            }
        );
    }

    #[test]
    fn rejection_without_json_keeps_raw_body_or_reason() {
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "upstream down"),
            SmsSendError::Rejected { status: 502, detail: "upstream down".to_string() }
        );
        assert_eq!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            SmsSendError::Rejected { status: 503, detail: "Service Unavailable".to_string() }
        );
    }
}
