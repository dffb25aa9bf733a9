use callcenter_agent::ActionRuntime;
use callcenter_core::config::{AppConfig, LoadOptions};
use callcenter_core::ActionError;

use super::{CommandResult, EXIT_ACTION_FAILED, EXIT_OK, EXIT_UNKNOWN_ACTION};

pub fn run(identifier: &str, input_str: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("invoke", error),
    };

    let sms = match callcenter_twilio::sender_from_config(&config.sms) {
        Ok(sms) => sms,
        Err(error) => {
            return CommandResult::failure(
                "invoke",
                "sms_client",
                format!("sms sender could not be built: {error}"),
                EXIT_ACTION_FAILED,
            );
        }
    };
    let runtime = ActionRuntime::from_config(&config, sms);

    let executor = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(executor) => executor,
        Err(error) => {
            return CommandResult::failure(
                "invoke",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_ACTION_FAILED,
            );
        }
    };

    match executor.block_on(runtime.invoke(identifier, input_str)) {
        Ok(output) => {
            let exit_code = if output.success() { EXIT_OK } else { EXIT_ACTION_FAILED };
            match serde_json::to_string_pretty(&output) {
                Ok(rendered) => CommandResult { exit_code, output: rendered },
                Err(error) => CommandResult::failure(
                    "invoke",
                    "serialization",
                    error.to_string(),
                    EXIT_ACTION_FAILED,
                ),
            }
        }
        Err(error @ ActionError::UnknownAction { .. }) => CommandResult::failure(
            "invoke",
            error.error_class(),
            format!("{error}; known actions: find_slots, send_text"),
            EXIT_UNKNOWN_ACTION,
        ),
        Err(error) => CommandResult::failure(
            "invoke",
            error.error_class(),
            error.to_string(),
            EXIT_ACTION_FAILED,
        ),
    }
}
