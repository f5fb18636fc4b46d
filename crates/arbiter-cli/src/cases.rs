//! # Cases Subcommand
//!
//! Prints the sample case dashboard.

use anyhow::Result;
use arbiter_core::{sample_cases, Case};
use clap::Args;

/// Arguments for `arbiter cases`.
#[derive(Args, Debug)]
pub struct CasesArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute `arbiter cases`.
pub fn run_cases(args: &CasesArgs) -> Result<u8> {
    let cases = sample_cases();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
    } else {
        for line in render_table(&cases) {
            println!("{line}");
        }
        println!();
        println!("Total: {} cases", cases.len());
    }
    Ok(0)
}

fn render_table(cases: &[Case]) -> Vec<String> {
    let mut lines = vec![format!(
        "  {:<9} {:<32} {:>8}  {:<18} {:<8} {:<11} {}",
        "ID", "TITLE", "AMOUNT", "STATUS", "PRIORITY", "SUBMITTED", "ARBITRATOR"
    )];
    lines.extend(cases.iter().map(|c| {
        format!(
            "  {:<9} {:<32} {:>8}  {:<18} {:<8} {:<11} {}",
            c.id,
            c.title,
            c.amount,
            c.status.label(),
            c.priority.label(),
            c.submitted_at,
            c.arbitrator
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_header_and_one_row_per_case() {
        let lines = render_table(&sample_cases());
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("ARBITRATOR"));
        assert!(lines[1].contains("CASE-001"));
        assert!(lines[1].contains("In Review"));
        assert!(lines[1].contains("0x1234...5678"));
        assert!(lines[2].contains("Pending Assignment"));
    }
}
