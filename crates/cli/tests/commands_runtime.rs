use std::env;
use std::sync::{Mutex, OnceLock};

use callcenter_cli::commands::{actions, config, doctor, invoke};
use serde_json::Value;

const DRY_RUN: &[(&str, &str)] = &[("CALLCENTER_SMS_PROVIDER", "dry_run")];

#[test]
fn invoke_find_slots_prints_action_output() {
    with_env(DRY_RUN, || {
        let result = invoke::run("find_slots", "John Smith|415 Mission St|headache|bobby bobster");
        assert_eq!(result.exit_code, 0, "expected successful slot lookup");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["action_type"], "find_slots");
        assert_eq!(payload["response"]["success"], true);
        assert_eq!(
            payload["response"]["message"],
            "Bobby Bobster, 2024-03-08 12:00:00.000000, 55 Fruit St, Boston, MA 02114"
        );
    });
}

#[test]
fn invoke_send_text_succeeds_with_dry_run_provider() {
    with_env(DRY_RUN, || {
        let result = invoke::run(
            "send_text",
            "John|8888888888|Bobby Jones|55 Fruit St, Boston, MA 02114|2024-03-08 12:00:00.000000",
        );
        assert_eq!(result.exit_code, 0, "expected confirmation text to be accepted");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["action_type"], "send_text");
        assert_eq!(payload["response"]["success"], true);
    });
}

#[test]
fn invoke_malformed_send_text_exits_with_action_failure() {
    with_env(DRY_RUN, || {
        let result = invoke::run("send_text", "John|8888888888|Bobby Jones");
        assert_eq!(result.exit_code, 1, "expected failed action exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["response"]["success"], false);
        assert_eq!(payload["error"]["error_class"], "malformed_parameter");
    });
}

#[test]
fn invoke_unknown_action_exits_with_dedicated_code() {
    with_env(DRY_RUN, || {
        let result = invoke::run("best_times", "anything");
        assert_eq!(result.exit_code, 3, "expected unknown action exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "invoke");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "unknown_action");
    });
}

#[test]
fn invoke_returns_config_failure_without_twilio_credentials() {
    with_env(&[], || {
        let result = invoke::run("find_slots", "Ann|1 Main St|rash|");
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("sms.account_sid"), "unexpected message: {message}");
    });
}

#[test]
fn doctor_json_passes_with_twilio_credentials() {
    with_env(
        &[
            ("TWILIO_ACCOUNT_SID", "AC00000000000000000000000000000000"),
            ("TWILIO_AUTH_TOKEN", "test-token"),
            ("PHONE_NUMBER", "+15550001111"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0, "expected all checks to pass");

            let report = parse_payload(&result.output);
            assert_eq!(report["overall_status"], "pass");
            let checks = report["checks"].as_array().cloned().unwrap_or_default();
            let names = checks.iter().filter_map(|check| check["name"].as_str()).collect::<Vec<_>>();
            assert_eq!(names, vec!["config_validation", "sms_readiness", "availability_table"]);
            assert!(checks[2]["details"]
                .as_str()
                .unwrap_or_default()
                .contains("placeholder table with 2 slots across 2 providers"));
        },
    );
}

#[test]
fn doctor_skips_downstream_checks_when_config_fails() {
    with_env(&[], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] sms_readiness"));
        assert!(result.output.contains("- [skip] availability_table"));
    });
}

#[test]
fn config_redacts_auth_token_and_attributes_env_aliases() {
    with_env(
        &[
            ("TWILIO_ACCOUNT_SID", "AC0123456789abcdef0123456789abcdef"),
            ("TWILIO_AUTH_TOKEN", "very-secret-token"),
            ("PHONE_NUMBER", "+15550001111"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);
            assert!(!result.output.contains("very-secret-token"));
            assert!(result
                .output
                .contains("- sms.auth_token = <redacted> (source: env (TWILIO_AUTH_TOKEN))"));
            assert!(result
                .output
                .contains("- sms.account_sid = AC***cdef (source: env (TWILIO_ACCOUNT_SID))"));
            assert!(result.output.contains("- server.port = 3000 (source: default)"));
        },
    );
}

#[test]
fn actions_lists_catalog_as_json() {
    let result = actions::run();
    assert_eq!(result.exit_code, 0);

    let catalog = parse_payload(&result.output);
    let kinds = catalog
        .as_array()
        .map(|entries| {
            entries.iter().filter_map(|entry| entry["action_type"].as_str()).collect::<Vec<_>>()
        })
        .unwrap_or_default();
    assert_eq!(kinds, vec!["find_slots", "send_text"]);
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CALLCENTER_SERVER_BIND_ADDRESS",
        "CALLCENTER_SERVER_PORT",
        "CALLCENTER_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "CALLCENTER_SMS_PROVIDER",
        "CALLCENTER_SMS_ACCOUNT_SID",
        "CALLCENTER_SMS_AUTH_TOKEN",
        "CALLCENTER_SMS_FROM_NUMBER",
        "CALLCENTER_SMS_API_BASE_URL",
        "CALLCENTER_SMS_TIMEOUT_SECS",
        "CALLCENTER_ACTIONS_FIND_SLOTS_NEAREST",
        "CALLCENTER_ACTIONS_SEND_TEXT_TIMEOUT_SECS",
        "CALLCENTER_AGENT_FIRST_MESSAGE",
        "CALLCENTER_AGENT_PROMPT_PREAMBLE",
        "CALLCENTER_LOGGING_LEVEL",
        "CALLCENTER_LOGGING_FORMAT",
        "CALLCENTER_LOG_LEVEL",
        "CALLCENTER_LOG_FORMAT",
        "TWILIO_ACCOUNT_SID",
        "TWILIO_AUTH_TOKEN",
        "PHONE_NUMBER",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
