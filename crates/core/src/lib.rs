pub mod availability;
pub mod config;
pub mod domain;
pub mod errors;
pub mod sms;

pub use availability::{AvailabilityError, AvailabilityProvider, StaticAvailability};
pub use domain::appointment::{AppointmentSlot, ProviderKey};
pub use errors::{ActionError, ApplicationError, InterfaceError};
pub use sms::{DryRunSmsSender, MessageId, SmsMessage, SmsSendError, SmsSender};
