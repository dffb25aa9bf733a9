use callcenter_core::config::{AppConfig, LoadOptions, SmsProvider};
use callcenter_core::{AvailabilityProvider, StaticAvailability};
use callcenter_twilio::TwilioSmsClient;
use serde::Serialize;

use super::{escape_json, CommandResult, EXIT_CONFIG, EXIT_OK};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { EXIT_OK } else { EXIT_CONFIG };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_sms_readiness(&config));
            checks.push(check_availability_table(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["sms_readiness", "availability_table"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_sms_readiness(config: &AppConfig) -> DoctorCheck {
    match config.sms.provider {
        SmsProvider::DryRun => DoctorCheck {
            name: "sms_readiness",
            status: CheckStatus::Pass,
            details: "dry_run provider: confirmation texts are logged, not sent".to_string(),
        },
        SmsProvider::Twilio => match TwilioSmsClient::from_config(&config.sms) {
            Ok(_) => DoctorCheck {
                name: "sms_readiness",
                status: CheckStatus::Pass,
                details: format!(
                    "twilio client ready against `{}` sending from `{}`",
                    config.sms.api_base_url, config.sms.from_number
                ),
            },
            Err(error) => DoctorCheck {
                name: "sms_readiness",
                status: CheckStatus::Fail,
                details: format!("twilio client could not be built: {error}"),
            },
        },
    }
}

fn check_availability_table(config: &AppConfig) -> DoctorCheck {
    let availability = StaticAvailability::from_config(&config.availability.slots);
    let source = if config.availability.slots.is_empty() { "placeholder" } else { "configured" };
    let providers = availability.provider_count();

    DoctorCheck {
        name: "availability_table",
        status: if providers > 0 { CheckStatus::Pass } else { CheckStatus::Fail },
        details: format!(
            "{source} table with {} slots across {providers} providers",
            availability.slots().len()
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
