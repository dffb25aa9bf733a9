use thiserror::Error;

use crate::availability::AvailabilityError;
use crate::sms::SmsSendError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("unknown action `{identifier}`")]
    UnknownAction { identifier: String },
    #[error("malformed parameter for `{action}`: {reason}")]
    MalformedParameter { action: &'static str, reason: String },
    #[error(transparent)]
    SmsSend(#[from] SmsSendError),
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

impl ActionError {
    pub fn malformed(action: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedParameter { action, reason: reason.into() }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::UnknownAction { .. } => "unknown_action",
            Self::MalformedParameter { .. } => "malformed_parameter",
            Self::SmsSend(_) => "sms_send",
            Self::Availability(_) => "availability",
        }
    }

    /// Whether the conversation can continue with a failed result.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UnknownAction { .. })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested action is not available.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::ServiceUnavailable { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::NotFound { .. } => "not_found",
            Self::ServiceUnavailable { .. } => "service_unavailable",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let message = self.to_string();
        match self {
            Self::Action(ActionError::UnknownAction { .. }) => {
                InterfaceError::NotFound { message, correlation_id }
            }
            Self::Action(ActionError::MalformedParameter { .. }) | Self::InvalidRequest(_) => {
                InterfaceError::BadRequest { message, correlation_id }
            }
            Self::Action(ActionError::SmsSend(_)) | Self::Action(ActionError::Availability(_)) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ActionError, ApplicationError, InterfaceError};
    use crate::sms::SmsSendError;

    #[test]
    fn unknown_action_maps_to_not_found_interface_error() {
        let interface = ApplicationError::from(ActionError::UnknownAction {
            identifier: "book_flight".to_owned(),
        })
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NotFound {
                ref correlation_id,
                ref message,
            } if correlation_id == "req-1" && message.contains("book_flight")
        ));
        assert_eq!(interface.user_message(), "The requested action is not available.");
    }

    #[test]
    fn malformed_parameter_maps_to_bad_request() {
        let interface =
            ApplicationError::from(ActionError::malformed("send_text", "expected 5 fields"))
                .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn sms_failure_maps_to_service_unavailable() {
        let interface =
            ApplicationError::from(ActionError::from(SmsSendError::Timeout)).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn invalid_request_maps_to_bad_request_with_detail() {
        let interface = ApplicationError::InvalidRequest("missing field `input_str`".to_owned())
            .into_interface("req-4");

        assert_eq!(interface.error_class(), "bad_request");
        assert_eq!(interface.message(), "invalid request: missing field `input_str`");
        assert_eq!(interface.correlation_id(), "req-4");
    }

    #[test]
    fn only_unknown_action_is_terminal() {
        assert!(!ActionError::UnknownAction { identifier: "x".to_owned() }.is_recoverable());
        assert!(ActionError::malformed("find_slots", "bad").is_recoverable());
        assert!(ActionError::from(SmsSendError::Unauthorized).is_recoverable());
        assert_eq!(ActionError::from(SmsSendError::Unauthorized).error_class(), "sms_send");
    }
}
