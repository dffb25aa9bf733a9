use std::env;
use std::fs;
use std::path::Path;

use callcenter_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use super::CommandResult;

struct Field {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("config", error),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
    ];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult { exit_code: super::EXIT_OK, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let auth_token = match &config.sms.auth_token {
        Some(token) if !token.expose_secret().trim().is_empty() => "<redacted>",
        Some(_) => "<empty>",
        None => "<unset>",
    };

    vec![
        Field {
            key_path: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["CALLCENTER_SERVER_BIND_ADDRESS"],
        },
        Field {
            key_path: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["CALLCENTER_SERVER_PORT"],
        },
        Field {
            key_path: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["CALLCENTER_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Field {
            key_path: "sms.provider",
            value: config.sms.provider.as_str().to_string(),
            env_keys: &["CALLCENTER_SMS_PROVIDER"],
        },
        Field {
            key_path: "sms.account_sid",
            value: config
                .sms
                .account_sid
                .as_deref()
                .map(redact_account_sid)
                .unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["CALLCENTER_SMS_ACCOUNT_SID", "TWILIO_ACCOUNT_SID"],
        },
        Field {
            key_path: "sms.auth_token",
            value: auth_token.to_string(),
            env_keys: &["CALLCENTER_SMS_AUTH_TOKEN", "TWILIO_AUTH_TOKEN"],
        },
        Field {
            key_path: "sms.from_number",
            value: non_empty_or_unset(&config.sms.from_number),
            env_keys: &["CALLCENTER_SMS_FROM_NUMBER", "PHONE_NUMBER"],
        },
        Field {
            key_path: "sms.api_base_url",
            value: config.sms.api_base_url.clone(),
            env_keys: &["CALLCENTER_SMS_API_BASE_URL"],
        },
        Field {
            key_path: "sms.timeout_secs",
            value: config.sms.timeout_secs.to_string(),
            env_keys: &["CALLCENTER_SMS_TIMEOUT_SECS"],
        },
        Field {
            key_path: "actions.find_slots.nearest",
            value: config.actions.find_slots.nearest.to_string(),
            env_keys: &["CALLCENTER_ACTIONS_FIND_SLOTS_NEAREST"],
        },
        Field {
            key_path: "actions.send_text.timeout_secs",
            value: config.actions.send_text.timeout_secs.to_string(),
            env_keys: &["CALLCENTER_ACTIONS_SEND_TEXT_TIMEOUT_SECS"],
        },
        Field {
            key_path: "availability.slots",
            value: format!("{} configured", config.availability.slots.len()),
            env_keys: &[],
        },
        Field {
            key_path: "agent.first_message",
            value: config.agent.first_message.clone(),
            env_keys: &["CALLCENTER_AGENT_FIRST_MESSAGE"],
        },
        Field {
            key_path: "agent.prompt_preamble",
            value: format!("<{} chars>", config.agent.prompt_preamble.chars().count()),
            env_keys: &["CALLCENTER_AGENT_PROMPT_PREAMBLE"],
        },
        Field {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["CALLCENTER_LOGGING_LEVEL", "CALLCENTER_LOG_LEVEL"],
        },
        Field {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["CALLCENTER_LOGGING_FORMAT", "CALLCENTER_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::display)
                .map(|display| display.to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn non_empty_or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "<unset>".to_string()
    } else {
        value.to_string()
    }
}

/// Keeps the `AC` prefix and the last four characters.
fn redact_account_sid(sid: &str) -> String {
    let trimmed = sid.trim();
    let chars = trimmed.chars().collect::<Vec<_>>();
    if chars.len() <= 6 {
        return "<redacted>".to_string();
    }

    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{}***{tail}", chars[..2].iter().collect::<String>())
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_account_sid};

    #[test]
    fn account_sid_keeps_prefix_and_tail_only() {
        assert_eq!(redact_account_sid("AC0123456789abcdef"), "AC***cdef");
        assert_eq!(redact_account_sid("AC12"), "<redacted>");
    }

    #[test]
    fn nested_key_paths_resolve_against_toml_tables() {
        let doc = "[actions.find_slots]\nnearest = true\n".parse::<Value>().expect("valid toml");
        assert!(contains_path(&doc, "actions.find_slots.nearest"));
        assert!(!contains_path(&doc, "actions.send_text.timeout_secs"));
    }
}
