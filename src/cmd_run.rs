//! `teller run` and `teller list`.

use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use teller_config::Config;
use teller_core::{ManagerConfig, WorkflowManager, WorkflowRegistry};
use teller_protocols::WorkflowResult;
use teller_workflows_banking::{BankingServices, register_banking_workflows};

use crate::shell::ConsoleSurface;

/// Shell command read from stdin.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Next,
    Dismiss,
    Status,
    Quit,
    Help,
}

impl ShellCommand {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "next" | "n" | "" => Some(ShellCommand::Next),
            "dismiss" | "d" => Some(ShellCommand::Dismiss),
            "status" | "s" => Some(ShellCommand::Status),
            "quit" | "q" | "exit" => Some(ShellCommand::Quit),
            "help" | "h" | "?" => Some(ShellCommand::Help),
            _ => None,
        }
    }
}

const HELP: &str = "Commands: next (n, Enter), dismiss (d), status (s), quit (q)";

/// Holder of the account every interactive session starts with.
const DEMO_HOLDER: &str = "Demo Customer";

/// Services seeded with one checking account so account-level workflows can run.
fn demo_services() -> Arc<BankingServices> {
    let services = BankingServices::new();
    let account = services.accounts.open(DEMO_HOLDER, "checking");
    info!("Seeded demo account {} for {}", account.id, DEMO_HOLDER);
    Arc::new(services)
}

fn manager_config(config: &Config) -> ManagerConfig {
    ManagerConfig {
        event_capacity: config.engine.event_capacity,
        dismiss_message: config.engine.dismiss_message.clone(),
        cascade_message: config.engine.cascade_message.clone(),
        teardown_message: config.engine.teardown_message.clone(),
    }
}

/// Registry holding every enabled banking workflow.
pub(crate) fn build_registry(config: &Config, services: Arc<BankingServices>) -> Arc<WorkflowRegistry> {
    let registry = Arc::new(WorkflowRegistry::new());
    register_banking_workflows(&registry, services, &config.catalog.disabled);
    registry.emit_registration_complete();
    registry
}

/// Print the workflow catalog.
pub(crate) fn list_workflows(config: &Config, format: &str) -> anyhow::Result<()> {
    let registry = build_registry(config, Arc::new(BankingServices::new()));
    let definitions = registry.list();

    match format {
        "json" => {
            let rows: Vec<_> = definitions
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "name": d.name,
                        "description": d.description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        "table" => {
            let width = definitions.iter().map(|d| d.id.len()).max().unwrap_or(0);
            for d in &definitions {
                println!("{:<width$}  {:<20}  {}", d.id, d.name, d.description, width = width);
            }
        }
        other => bail!("Unknown output format: {}", other),
    }
    Ok(())
}

fn print_result(workflow_id: &str, result: &WorkflowResult) {
    let status = if result.success { "completed" } else { "ended" };
    println!(
        "{} {}: {}",
        workflow_id,
        status,
        result.message.as_deref().unwrap_or("-")
    );
    if let Some(data) = &result.data {
        match serde_json::to_string_pretty(data) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Could not render result data: {}", e),
        }
    }
}

fn print_status(manager: &WorkflowManager) {
    let entries = manager.entries();
    if entries.is_empty() {
        println!("(no workflow running)");
        return;
    }
    for (depth, entry) in entries.iter().enumerate() {
        println!(
            "{:indent$}{} [{}] {:?} {}",
            "",
            entry.workflow_id,
            entry.entry,
            entry.state,
            entry.presentation.title,
            indent = depth * 2
        );
    }
}

/// Start `workflow_id` and drive it from stdin until it terminates.
pub(crate) async fn run_workflow(config: &Config, workflow_id: &str, params: &str) -> anyhow::Result<()> {
    let params: serde_json::Value =
        serde_json::from_str(params).context("--params must be a JSON object")?;
    if !params.is_object() {
        bail!("--params must be a JSON object");
    }

    let registry = build_registry(config, demo_services());
    let manager = WorkflowManager::new(registry, manager_config(config));
    manager.attach_surface(Arc::new(ConsoleSurface::new(std::io::stdout())));

    info!("Starting workflow {}", workflow_id);
    let handle = manager.start(workflow_id, params).await?;
    let root = handle.workflow_id().to_string();
    tokio::pin!(handle);

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            result = &mut handle => {
                print_result(&root, &result);
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, shutting down");
                    manager.teardown();
                    print_result(&root, &(&mut handle).await);
                    break;
                };
                match ShellCommand::parse(&line) {
                    Some(ShellCommand::Next) => {
                        // The handler runs detached; its effects arrive through the surface.
                        if let Err(e) = manager.on_primary_action() {
                            println!("   ! {}", e);
                        }
                    }
                    Some(ShellCommand::Dismiss) => {
                        if let Err(e) = manager.on_dismiss() {
                            println!("   ! {}", e);
                        }
                    }
                    Some(ShellCommand::Status) => print_status(&manager),
                    Some(ShellCommand::Quit) => {
                        manager.teardown();
                    }
                    Some(ShellCommand::Help) => println!("{}", HELP),
                    None => println!("Unknown command. {}", HELP),
                }
            }
        }
    }

    let leftover = manager.teardown();
    if leftover > 0 {
        warn!("{} workflows were still running at exit", leftover);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("next"), Some(ShellCommand::Next));
        assert_eq!(ShellCommand::parse(""), Some(ShellCommand::Next));
        assert_eq!(ShellCommand::parse(" D "), Some(ShellCommand::Dismiss));
        assert_eq!(ShellCommand::parse("status"), Some(ShellCommand::Status));
        assert_eq!(ShellCommand::parse("q"), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("?"), Some(ShellCommand::Help));
        assert_eq!(ShellCommand::parse("sign"), None);
    }

    #[test]
    fn test_manager_config_from_engine_section() {
        let mut config = Config::default();
        config.engine.dismiss_message = "Closed".to_string();
        let manager = manager_config(&config);
        assert_eq!(manager.dismiss_message, "Closed");
        assert_eq!(manager.event_capacity, 64);
    }

    #[tokio::test]
    async fn test_demo_services_allow_product_activation() {
        let services = demo_services();
        let registry = build_registry(&Config::default(), services.clone());
        let manager = WorkflowManager::new(registry, ManagerConfig::default());

        let handle = manager
            .start(
                "product-activation",
                serde_json::json!({ "account_id": "A1", "product": "debit-card" }),
            )
            .await
            .unwrap();
        assert_eq!(manager.active_entry().unwrap().entry, handle.entry());
        assert_eq!(services.accounts.get("A1").unwrap().holder, DEMO_HOLDER);
        manager.teardown();
    }

    #[test]
    fn test_build_registry_respects_catalog() {
        let mut config = Config::default();
        config.catalog.disabled = vec!["loan".to_string()];
        let registry = build_registry(&config, Arc::new(BankingServices::new()));
        assert!(!registry.contains("loan"));
        assert!(registry.contains("signing"));
        assert!(registry.is_registration_complete());
    }
}
