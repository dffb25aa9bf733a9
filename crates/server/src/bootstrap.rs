use callcenter_agent::{ActionRuntime, AgentProfile};
use callcenter_core::config::AppConfig;
use callcenter_core::{AvailabilityProvider, SmsSendError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: ActionRuntime,
    pub profile: AgentProfile,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("sms client initialization failed: {0}")]
    SmsClient(#[source] SmsSendError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let sms =
        callcenter_twilio::sender_from_config(&config.sms).map_err(BootstrapError::SmsClient)?;
    let runtime = ActionRuntime::from_config(&config, sms);
    info!(
        event_name = "system.bootstrap.collaborators_ready",
        correlation_id = "bootstrap",
        sms_provider = runtime.factory().sms().provider_name(),
        providers = runtime.factory().availability().provider_count(),
        "sms sender and availability table initialized"
    );

    let profile = AgentProfile::from_config(&config.agent);

    Ok(Application { runtime, profile, config })
}
