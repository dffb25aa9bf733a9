pub mod find_slots;
pub mod params;
pub mod send_text;

use async_trait::async_trait;
use callcenter_core::ActionError;
use serde::{Deserialize, Serialize};

use self::params::{ParamField, FIND_SLOTS_FIELDS, SEND_TEXT_FIELDS};

pub use find_slots::FindAppointmentSlots;
pub use send_text::SendConfirmationText;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    FindSlots,
    SendText,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::FindSlots, ActionKind::SendText];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindSlots => "find_slots",
            Self::SendText => "send_text",
        }
    }

    pub fn fields(&self) -> &'static [ParamField] {
        match self {
            Self::FindSlots => &FIND_SLOTS_FIELDS,
            Self::SendText => &SEND_TEXT_FIELDS,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::FindSlots => {
                "Retrieves available appointment times for the patient once they have provided \
                 their details. The result is one or more appointments formatted as \
                 \"<Doctor Name>, <Datetime>, <Address>\" separated by \" | \". Read them back in \
                 a patient friendly way and ask the patient to confirm one."
            }
            Self::SendText => {
                "Sends a text message confirming the appointment the patient agreed to, after \
                 they consent to receiving it. The result reports whether the text was sent."
            }
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "find_slots" => Ok(Self::FindSlots),
            "send_text" => Ok(Self::SendText),
            other => Err(ActionError::UnknownAction { identifier: other.to_string() }),
        }
    }
}

/// Wire form of every action parameter: one delimited string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameters {
    pub input_str: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInput {
    pub params: ActionParameters,
    pub correlation_id: String,
}

impl ActionInput {
    pub fn new(input_str: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            params: ActionParameters { input_str: input_str.into() },
            correlation_id: correlation_id.into(),
        }
    }

    pub fn input_str(&self) -> &str {
        &self.params.input_str
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindSlotsResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTextResponse {
    pub success: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionResponse {
    FindSlots(FindSlotsResponse),
    SendText(SendTextResponse),
}

impl ActionResponse {
    pub fn success(&self) -> bool {
        match self {
            Self::FindSlots(response) => response.success,
            Self::SendText(response) => response.success,
        }
    }

    pub fn failed(kind: ActionKind, error: &ActionError) -> Self {
        match kind {
            ActionKind::FindSlots => {
                Self::FindSlots(FindSlotsResponse { success: false, message: error.to_string() })
            }
            ActionKind::SendText => Self::SendText(SendTextResponse { success: false }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub error_class: String,
    pub message: String,
}

impl From<&ActionError> for ActionFailure {
    fn from(error: &ActionError) -> Self {
        Self { error_class: error.error_class().to_string(), message: error.to_string() }
    }
}

/// Result envelope returned to the agent runtime for one invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutput {
    pub action_type: ActionKind,
    pub correlation_id: String,
    pub response: ActionResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionFailure>,
}

impl ActionOutput {
    pub fn completed(kind: ActionKind, correlation_id: &str, response: ActionResponse) -> Self {
        Self { action_type: kind, correlation_id: correlation_id.to_string(), response, error: None }
    }

    pub fn failed(kind: ActionKind, correlation_id: &str, error: &ActionError) -> Self {
        Self {
            action_type: kind,
            correlation_id: correlation_id.to_string(),
            response: ActionResponse::failed(kind, error),
            error: Some(ActionFailure::from(error)),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none() && self.response.success()
    }
}

#[async_trait]
pub trait Action: Send + Sync {
    fn kind(&self) -> ActionKind;
    async fn run(&self, input: &ActionInput) -> Result<ActionResponse, ActionError>;
}

#[cfg(test)]
mod tests {
    use callcenter_core::{ActionError, SmsSendError};
    use serde_json::json;

    use super::{ActionKind, ActionOutput, ActionResponse, FindSlotsResponse};

    #[test]
    fn identifiers_parse_into_closed_set() {
        assert_eq!("find_slots".parse::<ActionKind>(), Ok(ActionKind::FindSlots));
        assert_eq!("send_text".parse::<ActionKind>(), Ok(ActionKind::SendText));

        for unknown in ["best_times", "FIND_SLOTS", "", "send_text "] {
            assert_eq!(
                unknown.parse::<ActionKind>(),
                Err(ActionError::UnknownAction { identifier: unknown.to_string() })
            );
        }
    }

    #[test]
    fn completed_output_serializes_without_error_field() {
        let output = ActionOutput::completed(
            ActionKind::FindSlots,
            "corr-1",
            ActionResponse::FindSlots(FindSlotsResponse {
                success: true,
                message: "John Smith, 2024-03-08 12:00:00.000000, 55 Fruit St".to_string(),
            }),
        );

        let value = serde_json::to_value(&output).expect("output serializes");
        assert_eq!(
            value,
            json!({
                "action_type": "find_slots",
                "correlation_id": "corr-1",
                "response": {
                    "success": true,
                    "message": "John Smith, 2024-03-08 12:00:00.000000, 55 Fruit St"
                }
            })
        );
        assert!(output.success());
    }

    #[test]
    fn failed_send_text_output_carries_classified_error() {
        let error = ActionError::from(SmsSendError::Timeout);
        let output = ActionOutput::failed(ActionKind::SendText, "corr-2", &error);

        let value = serde_json::to_value(&output).expect("output serializes");
        assert_eq!(value["action_type"], "send_text");
        assert_eq!(value["response"], json!({ "success": false }));
        assert_eq!(value["error"]["error_class"], "sms_send");
        assert!(!output.success());
    }
}
