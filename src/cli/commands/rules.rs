//! Rules Command - list the active rule set

use anyhow::Result;
use serde::Serialize;

use protoguard_sast::{RuleRepository, Severity};

use crate::cli::context::CliContext;
use crate::cli::exit_codes;
use crate::cli::output::OutputFormat;

#[derive(Debug, Serialize)]
struct RuleSummary<'a> {
    name: &'a str,
    severity: Severity,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct RulesOutput<'a> {
    rules: Vec<RuleSummary<'a>>,
    sensitive_properties: &'a [String],
}

/// Run the rules command
pub fn run(ctx: &CliContext) -> Result<i32> {
    let repository = RuleRepository::from_config(&ctx.config.scan);
    let rules = repository
        .get_all_rules()
        .iter()
        .map(|rule| RuleSummary {
            name: rule.name(),
            severity: rule.severity(),
            description: rule.description(),
        })
        .collect();

    let output = RulesOutput {
        rules,
        sensitive_properties: &ctx.config.scan.sensitive_properties,
    };

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&output)?,
        OutputFormat::Text => {
            for rule in &output.rules {
                ctx.output
                    .print(&format!("{} [{}] {}", rule.name, rule.severity, rule.description));
            }
            ctx.output.print(&format!(
                "Sensitive properties: {}",
                output.sensitive_properties.join(", ")
            ));
        }
    }

    Ok(exit_codes::SUCCESS)
}
