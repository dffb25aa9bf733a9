use callcenter_agent::profile::catalog;

use super::{CommandResult, EXIT_OK};

pub fn run() -> CommandResult {
    match serde_json::to_string_pretty(&catalog()) {
        Ok(output) => CommandResult { exit_code: EXIT_OK, output },
        Err(error) => CommandResult::failure("actions", "serialization", error.to_string(), 1),
    }
}
