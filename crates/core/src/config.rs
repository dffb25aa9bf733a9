use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::appointment::SLOT_DATETIME_FORMAT;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sms: SmsConfig,
    pub actions: ActionsConfig,
    pub availability: AvailabilityConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SmsConfig {
    pub provider: SmsProvider,
    pub account_sid: Option<String>,
    pub auth_token: Option<SecretString>,
    pub from_number: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ActionsConfig {
    pub find_slots: FindSlotsConfig,
    pub send_text: SendTextConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindSlotsConfig {
    /// Offer only the earliest slot instead of every match.
    pub nearest: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendTextConfig {
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct AvailabilityConfig {
    pub slots: Vec<SlotConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub doctor: String,
    pub datetime: String,
    pub address: String,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub first_message: String,
    pub prompt_preamble: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsProvider {
    Twilio,
    DryRun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub sms_provider: Option<SmsProvider>,
    pub sms_account_sid: Option<String>,
    pub sms_auth_token: Option<String>,
    pub sms_from_number: Option<String>,
    pub sms_api_base_url: Option<String>,
    pub find_slots_nearest: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_FIRST_MESSAGE: &str =
    "Hello, thank you for calling. I can help you book an appointment. May I have your first name?";

pub const DEFAULT_PROMPT_PREAMBLE: &str = "You are a friendly scheduling assistant answering \
phone calls for a medical practice. Collect the caller's first name, address, reason for the \
visit and any referring doctor, look up appointment times, read them back in a patient friendly \
way, and once the caller confirms an appointment and consents, send a confirmation text. Keep \
answers short; everything you say is voice synthesized.";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            sms: SmsConfig {
                provider: SmsProvider::Twilio,
                account_sid: None,
                auth_token: None,
                from_number: String::new(),
                api_base_url: "https://api.twilio.com".to_string(),
                timeout_secs: 10,
            },
            actions: ActionsConfig {
                find_slots: FindSlotsConfig { nearest: false },
                send_text: SendTextConfig { timeout_secs: 10 },
            },
            availability: AvailabilityConfig::default(),
            agent: AgentConfig {
                first_message: DEFAULT_FIRST_MESSAGE.to_string(),
                prompt_preamble: DEFAULT_PROMPT_PREAMBLE.to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for SmsProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "twilio" => Ok(Self::Twilio),
            "dry_run" => Ok(Self::DryRun),
            other => Err(ConfigError::Validation(format!(
                "unsupported sms provider `{other}` (expected twilio|dry_run)"
            ))),
        }
    }
}

impl SmsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twilio => "twilio",
            Self::DryRun => "dry_run",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("callcenter.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(sms) = patch.sms {
            if let Some(provider) = sms.provider {
                self.sms.provider = provider;
            }
            if let Some(account_sid) = sms.account_sid {
                self.sms.account_sid = Some(account_sid);
            }
            if let Some(sms_auth_token_value) = sms.auth_token {
                self.sms.auth_token = Some(secret_value(sms_auth_token_value));
            }
            if let Some(from_number) = sms.from_number {
                self.sms.from_number = from_number;
            }
            if let Some(api_base_url) = sms.api_base_url {
                self.sms.api_base_url = api_base_url;
            }
            if let Some(timeout_secs) = sms.timeout_secs {
                self.sms.timeout_secs = timeout_secs;
            }
        }

        if let Some(actions) = patch.actions {
            if let Some(nearest) = actions.find_slots.and_then(|find_slots| find_slots.nearest) {
                self.actions.find_slots.nearest = nearest;
            }
            if let Some(timeout_secs) =
                actions.send_text.and_then(|send_text| send_text.timeout_secs)
            {
                self.actions.send_text.timeout_secs = timeout_secs;
            }
        }

        if let Some(availability) = patch.availability {
            if let Some(slots) = availability.slots {
                self.availability.slots = slots;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(first_message) = agent.first_message {
                self.agent.first_message = first_message;
            }
            if let Some(prompt_preamble) = agent.prompt_preamble {
                self.agent.prompt_preamble = prompt_preamble;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CALLCENTER_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CALLCENTER_SERVER_PORT") {
            self.server.port = parse_u16("CALLCENTER_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("CALLCENTER_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("CALLCENTER_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("CALLCENTER_SMS_PROVIDER") {
            self.sms.provider = value.parse()?;
        }
        let account_sid =
            read_env("CALLCENTER_SMS_ACCOUNT_SID").or_else(|| read_env("TWILIO_ACCOUNT_SID"));
        if let Some(value) = account_sid {
            self.sms.account_sid = Some(value);
        }
        let auth_token =
            read_env("CALLCENTER_SMS_AUTH_TOKEN").or_else(|| read_env("TWILIO_AUTH_TOKEN"));
        if let Some(value) = auth_token {
            self.sms.auth_token = Some(secret_value(value));
        }
        let from_number =
            read_env("CALLCENTER_SMS_FROM_NUMBER").or_else(|| read_env("PHONE_NUMBER"));
        if let Some(value) = from_number {
            self.sms.from_number = value;
        }
        if let Some(value) = read_env("CALLCENTER_SMS_API_BASE_URL") {
            self.sms.api_base_url = value;
        }
        if let Some(value) = read_env("CALLCENTER_SMS_TIMEOUT_SECS") {
            self.sms.timeout_secs = parse_u64("CALLCENTER_SMS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CALLCENTER_ACTIONS_FIND_SLOTS_NEAREST") {
            self.actions.find_slots.nearest =
                parse_bool("CALLCENTER_ACTIONS_FIND_SLOTS_NEAREST", &value)?;
        }
        if let Some(value) = read_env("CALLCENTER_ACTIONS_SEND_TEXT_TIMEOUT_SECS") {
            self.actions.send_text.timeout_secs =
                parse_u64("CALLCENTER_ACTIONS_SEND_TEXT_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CALLCENTER_AGENT_FIRST_MESSAGE") {
            self.agent.first_message = value;
        }
        if let Some(value) = read_env("CALLCENTER_AGENT_PROMPT_PREAMBLE") {
            self.agent.prompt_preamble = value;
        }

        let log_level =
            read_env("CALLCENTER_LOGGING_LEVEL").or_else(|| read_env("CALLCENTER_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CALLCENTER_LOGGING_FORMAT").or_else(|| read_env("CALLCENTER_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(provider) = overrides.sms_provider {
            self.sms.provider = provider;
        }
        if let Some(account_sid) = overrides.sms_account_sid {
            self.sms.account_sid = Some(account_sid);
        }
        if let Some(auth_token) = overrides.sms_auth_token {
            self.sms.auth_token = Some(secret_value(auth_token));
        }
        if let Some(from_number) = overrides.sms_from_number {
            self.sms.from_number = from_number;
        }
        if let Some(api_base_url) = overrides.sms_api_base_url {
            self.sms.api_base_url = api_base_url;
        }
        if let Some(nearest) = overrides.find_slots_nearest {
            self.actions.find_slots.nearest = nearest;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_sms(&self.sms)?;
        validate_actions(&self.actions)?;
        validate_availability(&self.availability)?;
        validate_agent(&self.agent)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("callcenter.toml"), PathBuf::from("config/callcenter.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_sms(sms: &SmsConfig) -> Result<(), ConfigError> {
    if sms.timeout_secs == 0 || sms.timeout_secs > 120 {
        return Err(ConfigError::Validation("sms.timeout_secs must be in range 1..=120".to_string()));
    }

    if !sms.api_base_url.starts_with("http://") && !sms.api_base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "sms.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if sms.provider == SmsProvider::DryRun {
        return Ok(());
    }

    let account_sid = sms.account_sid.as_deref().map(str::trim).unwrap_or_default();
    if account_sid.is_empty() {
        return Err(ConfigError::Validation(
            "sms.account_sid is required for the twilio provider. Find it on the Twilio console dashboard (Account Info > Account SID)".to_string(),
        ));
    }
    if !account_sid.starts_with("AC") {
        return Err(ConfigError::Validation(
            "sms.account_sid must start with `AC`. Find it on the Twilio console dashboard"
                .to_string(),
        ));
    }

    let missing_token =
        sms.auth_token.as_ref().map(|value| value.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing_token {
        return Err(ConfigError::Validation(
            "sms.auth_token is required for the twilio provider".to_string(),
        ));
    }

    if !is_e164(&sms.from_number) {
        return Err(ConfigError::Validation(
            "sms.from_number must be an E.164 number such as `+15551234567`".to_string(),
        ));
    }

    Ok(())
}

fn is_e164(number: &str) -> bool {
    number
        .strip_prefix('+')
        .map(|digits| {
            (8..=15).contains(&digits.len()) && digits.chars().all(|ch| ch.is_ascii_digit())
        })
        .unwrap_or(false)
}

fn validate_actions(actions: &ActionsConfig) -> Result<(), ConfigError> {
    let timeout_secs = actions.send_text.timeout_secs;
    if timeout_secs == 0 || timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "actions.send_text.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_availability(availability: &AvailabilityConfig) -> Result<(), ConfigError> {
    for (index, slot) in availability.slots.iter().enumerate() {
        let blank = [&slot.doctor, &slot.datetime, &slot.address]
            .iter()
            .any(|value| value.trim().is_empty());
        if blank {
            return Err(ConfigError::Validation(format!(
                "availability.slots[{index}] requires doctor, datetime and address"
            )));
        }

        if NaiveDateTime::parse_from_str(slot.datetime.trim(), SLOT_DATETIME_FORMAT).is_err() {
            return Err(ConfigError::Validation(format!(
                "availability.slots[{index}].datetime must look like `2024-03-08 12:00:00.000000`"
            )));
        }
    }

    Ok(())
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if agent.first_message.trim().is_empty() {
        return Err(ConfigError::Validation("agent.first_message must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    sms: Option<SmsPatch>,
    actions: Option<ActionsPatch>,
    availability: Option<AvailabilityPatch>,
    agent: Option<AgentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SmsPatch {
    provider: Option<SmsProvider>,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionsPatch {
    find_slots: Option<FindSlotsPatch>,
    send_text: Option<SendTextPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct FindSlotsPatch {
    nearest: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SendTextPatch {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AvailabilityPatch {
    slots: Option<Vec<SlotConfig>>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    first_message: Option<String>,
    prompt_preamble: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
