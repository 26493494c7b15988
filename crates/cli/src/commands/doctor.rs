use glidedesk_agent::{build_runtime, RuntimeDeps};
use glidedesk_core::config::{AppConfig, LoadOptions};
use glidedesk_core::CapabilityName;
use serde::Serialize;

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

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
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
            checks.push(check_support_runtime(&config));
            checks.push(check_ocr_endpoint(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "support_runtime",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "ocr_endpoint",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_ok = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_ok { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ok {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_support_runtime(config: &AppConfig) -> DoctorCheck {
    match build_runtime(config, RuntimeDeps::in_memory(config)) {
        Ok(runtime) => {
            let capabilities = runtime.orchestrator.capabilities();
            if capabilities.len() == CapabilityName::ALL.len() {
                DoctorCheck {
                    name: "support_runtime",
                    status: CheckStatus::Pass,
                    details: format!(
                        "{} capabilities and {} tools registered",
                        capabilities.len(),
                        runtime.tools.len()
                    ),
                }
            } else {
                DoctorCheck {
                    name: "support_runtime",
                    status: CheckStatus::Fail,
                    details: format!("only {} capabilities registered", capabilities.len()),
                }
            }
        }
        Err(error) => DoctorCheck {
            name: "support_runtime",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_ocr_endpoint(config: &AppConfig) -> DoctorCheck {
    match &config.ocr.base_url {
        Some(base_url) => DoctorCheck {
            name: "ocr_endpoint",
            status: CheckStatus::Pass,
            details: format!("remote OCR configured at {base_url}"),
        },
        None => DoctorCheck {
            name: "ocr_endpoint",
            status: CheckStatus::Skipped,
            details: "no remote OCR configured; fixture engine in use".to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("  [{marker}] {}: {}", check.name, check.details));
    }
    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
