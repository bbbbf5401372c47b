//! Subcommand implementations.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use tokio::io::AsyncBufRead;

use concierge_core::{
    AutoApprove, Config, ConfirmationGate, OutcomeReport, RequestOrchestrator, SanitizedConfig,
    ServiceStatus, Services,
};

use crate::console::{Console, ConsoleGate};
use crate::render::render_report;

const EXIT_WORDS: &[&str] = &["exit", "quit", "salir"];

fn print_report(report: &OutcomeReport, json: bool, include_outcome: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        println!("{}", render_report(report, include_outcome));
    }
    Ok(())
}

/// `concierge ask`: resolve one request. Returns whether the session
/// succeeded.
pub async fn ask(services: &Services, request: &str, yes: bool, json: bool) -> Result<bool> {
    let report = if yes {
        services
            .orchestrator(Arc::new(AutoApprove))
            .handle_request(request, false)
            .await
    } else {
        let gate = ConsoleGate::new(Arc::new(Console::stdin()));
        services
            .orchestrator(Arc::new(gate))
            .handle_request(request, true)
            .await
    };

    print_report(&report, json, yes)?;
    Ok(report.success)
}

/// `concierge session`: read requests until an exit word or end of input.
pub async fn session(services: &Services) -> Result<()> {
    let console = Arc::new(Console::stdin());
    let gate: Arc<dyn ConfirmationGate> = Arc::new(ConsoleGate::new(Arc::clone(&console)));
    let orchestrator = services.orchestrator(gate);

    println!(
        "{} Describe the data you need. Type \"exit\" to leave.",
        "concierge".cyan().bold()
    );
    run_session(&orchestrator, &console).await;
    println!("Bye.");
    Ok(())
}

/// The REPL loop. Blank lines are ignored.
pub async fn run_session<R: AsyncBufRead + Unpin>(
    orchestrator: &RequestOrchestrator,
    console: &Console<R>,
) -> usize {
    let mut handled = 0;
    while let Some(line) = console.prompt("\n> ").await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        let report = orchestrator.handle_request(line, true).await;
        println!("{}", render_report(&report, false));
        handled += 1;
    }
    handled
}

fn status_label(status: ServiceStatus) -> colored::ColoredString {
    match status {
        ServiceStatus::Ok => "ok".green().bold(),
        ServiceStatus::Unavailable => "unavailable".red().bold(),
        ServiceStatus::NotConfigured => "not configured".yellow(),
    }
}

fn presence(configured: bool) -> colored::ColoredString {
    if configured {
        "configured".green()
    } else {
        "missing".yellow()
    }
}

/// `concierge diagnose`: configuration presence, then reachability of
/// every configured service. Returns whether everything is healthy.
pub async fn diagnose(config: &Config) -> Result<bool> {
    let sanitized = SanitizedConfig::from(config);

    println!("{}", "Configuration".cyan().bold());
    match &sanitized.catalog {
        Some(catalog) => println!(
            "  catalog: {} ({}, token {})",
            presence(true),
            catalog.url,
            presence(catalog.token_configured)
        ),
        None => println!("  catalog: {}", presence(false)),
    }
    match &sanitized.llm {
        Some(llm) => println!(
            "  llm:     {} ({} {}, api key {})",
            presence(true),
            llm.provider,
            llm.model,
            presence(llm.api_key_configured)
        ),
        None => println!("  llm:     {}", presence(false)),
    }
    match &sanitized.tracker {
        Some(tracker) => println!(
            "  tracker: {} ({}, project {}, api token {})",
            presence(true),
            tracker.url,
            tracker.project_key,
            presence(tracker.api_token_configured)
        ),
        None => println!("  tracker: {}", presence(false)),
    }
    println!("  matcher: {:?}", config.matcher.strategy);

    let services = Services::from_config(config).context("Failed to initialize services")?;
    let health = services.health().await;

    println!("{}", "Connectivity".cyan().bold());
    println!("  catalog: {}", status_label(health.catalog));
    println!("  llm:     {}", status_label(health.llm));
    println!("  tracker: {}", status_label(health.tracker));

    if health.catalog == ServiceStatus::Ok {
        print_databases(&services).await;
    }

    Ok(health.is_healthy())
}

/// Databases visible to the catalog credentials. A listing failure is
/// reported but does not fail the diagnosis.
async fn print_databases(services: &Services) -> usize {
    println!("{}", "Databases".cyan().bold());
    match services.catalog().list_databases().await {
        Ok(databases) if databases.is_empty() => {
            println!("  {}", "none visible".yellow());
            0
        }
        Ok(databases) => {
            for db in &databases {
                match &db.service {
                    Some(service) => println!("  {} ({})", db.name, service),
                    None => println!("  {}", db.name),
                }
            }
            databases.len()
        }
        Err(e) => {
            println!("  {} {}", "unavailable:".red().bold(), e);
            0
        }
    }
}

/// `concierge config`: the configuration without secrets.
pub fn show_config(config: &Config) -> Result<()> {
    let text = serde_json::to_string_pretty(&SanitizedConfig::from(config))
        .context("Failed to serialize config")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::testing::{fixtures, MockCatalog, MockTracker};
    use concierge_core::DatabaseSummary;
    use tokio::io::BufReader;

    async fn services_with(tracker: Arc<MockTracker>) -> Services {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_results(vec![fixtures::raw_asset("orders", "sales", "dw.sales.orders")])
            .await;
        Services::from_parts(catalog, None, Some(tracker), &Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_session_loop_handles_requests_until_exit() {
        colored::control::set_override(false);
        let tracker = Arc::new(MockTracker::new());
        let services = services_with(tracker.clone()).await;

        // Request, accept escalation, blank line, request, decline, exit,
        // then a line that must never be read as a request.
        let input = "refund rate\nsi\n\n   \nweekly refunds\nn\nSALIR\nignored\n";
        let console = Arc::new(Console::new(BufReader::new(input.as_bytes())));
        let gate: Arc<dyn ConfirmationGate> = Arc::new(ConsoleGate::new(Arc::clone(&console)));
        let orchestrator = services.orchestrator(gate);

        let handled = run_session(&orchestrator, &console).await;

        assert_eq!(handled, 2);
        let tickets = tracker.received().await;
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].request, "refund rate");
    }

    #[tokio::test]
    async fn test_session_loop_stops_at_end_of_input() {
        colored::control::set_override(false);
        let tracker = Arc::new(MockTracker::new());
        let services = services_with(tracker.clone()).await;

        // The gate hits end of input and declines.
        let console = Arc::new(Console::new(BufReader::new("refund rate\n".as_bytes())));
        let gate: Arc<dyn ConfirmationGate> = Arc::new(ConsoleGate::new(Arc::clone(&console)));
        let orchestrator = services.orchestrator(gate);

        assert_eq!(run_session(&orchestrator, &console).await, 1);
        assert_eq!(tracker.attempt_count().await, 0);
    }

    #[tokio::test]
    async fn test_ask_with_yes_escalates_without_prompting() {
        colored::control::set_override(false);
        let tracker = Arc::new(MockTracker::new());
        let services = services_with(tracker.clone()).await;

        let success = ask(&services, "refund rate", true, true).await.unwrap();

        assert!(success);
        assert_eq!(tracker.attempt_count().await, 1);
    }

    #[tokio::test]
    async fn test_print_databases_counts_listing() {
        colored::control::set_override(false);
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_databases(vec![
                DatabaseSummary::new("ventas").with_service("postgres_prod"),
                DatabaseSummary::new("crm"),
            ])
            .await;
        let services =
            Services::from_parts(catalog.clone(), None, None, &Config::default()).unwrap();

        assert_eq!(print_databases(&services).await, 2);

        catalog.set_unhealthy(true).await;
        assert_eq!(print_databases(&services).await, 0);
    }

    #[tokio::test]
    async fn test_diagnose_without_catalog_fails() {
        let result = diagnose(&Config::default()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_show_config() {
        assert!(show_config(&Config::default()).is_ok());
    }
}
