//! Console rendering of presentations and reports.

use colored::Colorize;
use std::fmt::Write;

use concierge_core::{AssetRecord, OutcomeReport, Presentation, ResolutionOutcome};

/// Columns listed per asset.
const MAX_COLUMNS: usize = 8;

fn render_asset(out: &mut String, asset: &AssetRecord) {
    let _ = writeln!(out, "  {} ({})", asset.display_name().bold(), asset.qualified_name);
    if !asset.description.is_empty() {
        let _ = writeln!(out, "    {}", asset.description);
    }
    if !asset.columns.is_empty() {
        let columns: Vec<String> = asset
            .columns
            .iter()
            .take(MAX_COLUMNS)
            .map(|c| format!("{} {}", c.name, c.data_type))
            .collect();
        let _ = write!(out, "    columns: {}", columns.join(", "));
        if asset.columns.len() > MAX_COLUMNS {
            let _ = write!(out, ", ... (+{})", asset.columns.len() - MAX_COLUMNS);
        }
        out.push('\n');
    }
}

fn render_related(out: &mut String, related: &[AssetRecord], draft: Option<&str>) {
    if related.is_empty() {
        let _ = writeln!(out, "No related assets were found.");
    } else {
        let _ = writeln!(out, "{}", "Related assets:".cyan().bold());
        for asset in related {
            render_asset(out, asset);
        }
    }

    match draft {
        Some(sql) => {
            let _ = writeln!(out, "{}", "Proposed SQL:".cyan().bold());
            for line in sql.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
        None => {
            let _ = writeln!(out, "No SQL draft could be generated.");
        }
    }
}

/// What the user sees before a yes/no question.
pub fn render_presentation(presentation: &Presentation<'_>) -> String {
    let mut out = String::new();
    match presentation {
        Presentation::Match { asset, .. } => {
            let _ = writeln!(out, "{}", "Existing asset found:".green().bold());
            render_asset(&mut out, asset);
        }
        Presentation::Escalation { related, draft, .. } => {
            let _ = writeln!(out, "{}", "No exact match in the catalog.".yellow().bold());
            render_related(&mut out, related, *draft);
        }
    }
    out
}

/// Final summary of a session. Non-interactive runs never saw a
/// presentation, so the resolution is included.
pub fn render_report(report: &OutcomeReport, include_outcome: bool) -> String {
    let mut out = String::new();

    if include_outcome {
        match &report.outcome {
            Some(ResolutionOutcome::Matched { asset }) => render_asset(&mut out, asset),
            Some(ResolutionOutcome::Unmatched { related, draft }) => {
                render_related(&mut out, related, draft.as_deref())
            }
            None => {}
        }
    }

    let status = if report.success {
        "OK".green().bold()
    } else {
        "error".red().bold()
    };
    let _ = write!(out, "{} {}", status, report.message);
    if let Some(url) = &report.ticket_url {
        let _ = write!(out, "\n  {}", url);
    }
    out
}
