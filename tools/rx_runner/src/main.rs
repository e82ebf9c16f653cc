use rx_core::config::PharmacyConfig;
use rx_core::error::{CoreError, CoreResult};
use rx_core::interactions::checker::TableInteractionChecker;
use rx_core::prescription::model::NewPrescription;
use rx_core::prescription::stage::WorkflowStage;
use rx_core::prescription::workflow::PrescriptionWorkflow;
use rx_core::store::InMemoryPrescriptionStore;
use rx_core::telemetry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One prescription to walk from intake to complete.
#[derive(Debug, Deserialize)]
struct Scenario {
    prescription: NewPrescription,
    /// Signs off at pharmacist-approval and owns any acknowledgements.
    #[serde(default)]
    pharmacist: Option<String>,
    #[serde(default)]
    acknowledgements: Vec<ScenarioAcknowledgement>,
}

#[derive(Debug, Deserialize)]
struct ScenarioAcknowledgement {
    finding_key: String,
    reason: String,
}

enum Outcome {
    Completed,
    Rejected(WorkflowStage, String),
}

type Workflow = PrescriptionWorkflow<InMemoryPrescriptionStore, TableInteractionChecker>;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (config_path, scenario_path) = match args.as_slice() {
        [_, flag, cfg, scenario] if flag == "--config" => {
            (Some(PathBuf::from(cfg)), PathBuf::from(scenario))
        }
        [_, scenario] => (None, PathBuf::from(scenario)),
        _ => {
            eprintln!("usage: rx_runner [--config <pharmacy.json>] <scenario.json>");
            std::process::exit(2);
        }
    };

    let cfg = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(2);
        }
    };
    telemetry::init(&cfg.log_filter);

    let scenario = match load_scenario(&scenario_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("scenario error: {}", e);
            std::process::exit(2);
        }
    };

    let wf = match PrescriptionWorkflow::from_config(
        &cfg,
        InMemoryPrescriptionStore::new(),
        TableInteractionChecker::with_builtin_rules(),
    ) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("workflow setup failed: {}", e);
            std::process::exit(1);
        }
    };

    match run(&wf, scenario) {
        Ok(Outcome::Completed) => {}
        Ok(Outcome::Rejected(stage, reason)) => {
            println!("REJECTED {} {}", stage, reason);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("runner error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> CoreResult<PharmacyConfig> {
    let cfg = match path {
        Some(p) => PharmacyConfig::from_json_file(p)?,
        None => PharmacyConfig::default(),
    };
    cfg.with_env_overrides()
}

fn load_scenario(path: &Path) -> CoreResult<Scenario> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn run(wf: &Workflow, scenario: Scenario) -> CoreResult<Outcome> {
    let pharmacist = scenario.pharmacist.as_deref().unwrap_or("pharmacist");
    let rx = wf.intake(scenario.prescription)?;
    println!("STAGE {} {}", rx.id, rx.stage);

    let mut stage = rx.stage;
    while let Some(next) = stage.successor() {
        match stage {
            WorkflowStage::InteractionCheck => {
                for ack in &scenario.acknowledgements {
                    wf.acknowledge_finding(&rx.id, &ack.finding_key, pharmacist, &ack.reason)?;
                }
            }
            WorkflowStage::PharmacistApproval if scenario.pharmacist.is_some() => {
                wf.approve(&rx.id, pharmacist)?;
            }
            _ => {}
        }
        match wf.advance(&rx.id, next) {
            Ok(updated) => {
                stage = updated.stage;
                println!("STAGE {} {}", updated.id, updated.stage);
            }
            Err(CoreError::PreconditionFailed(reason)) => {
                return Ok(Outcome::Rejected(next, reason));
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        prescription_id = %rx.id,
        audit_events = wf.audit_events()?.len(),
        "scenario complete"
    );
    Ok(Outcome::Completed)
}
