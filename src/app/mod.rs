use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

use boolparse::{Condition, Facts, Tree};

use crate::config::{OutputFormat, Settings};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for printed trees (default from settings)
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the parse tree of an expression
    Tree {
        expression: String,

        /// Split operands into `left operator right` conditions
        #[arg(long)]
        conditions: bool,
    },
    /// Check that an expression parses
    Check {
        expression: String,

        /// Split operands into `left operator right` conditions
        #[arg(long)]
        conditions: bool,
    },
    /// Evaluate conditions against facts; unknown fields are false
    Solve(FactArgs),
    /// Evaluate conditions against facts, leaving out unknown fields
    Fsolve(FactArgs),
    /// Drop conditions on unknown fields and print what remains
    Filter(FactArgs),
}

#[derive(Args)]
pub struct FactArgs {
    /// Expression in the condition syntax
    pub expression: String,

    /// Fact as FIELD=VALUE, overriding settings (repeatable)
    #[arg(short = 'f', long = "fact", value_parser = parse_fact)]
    pub facts: Vec<(String, String)>,
}

fn parse_fact(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid fact '{value}', expected FIELD=VALUE")),
    }
}

/// Run `cli` and return the text to print.
pub fn run(cli: &Cli) -> Result<String> {
    let settings =
        Settings::load(cli.config.as_deref()).context("Config: Failed to load settings")?;
    let format = cli.format.unwrap_or(settings.output);
    let parser = boolparse::Parser::with_grammar(settings.grammar.clone())
        .context("Config: Invalid grammar")?;
    tracing::info!(
        "Grammar: {} / {}, {} facts, {:?} output",
        settings.grammar.and_keyword,
        settings.grammar.or_keyword,
        settings.facts.len(),
        format
    );

    match &cli.command {
        Command::Tree {
            expression,
            conditions: true,
        } => render(&parse_conditions(&parser, expression)?, format),
        Command::Tree { expression, .. } => {
            let tree = parser
                .to_tree(expression)
                .with_context(|| format!("Parse: Invalid expression '{expression}'"))?;
            render(&tree, format)
        }
        Command::Check {
            expression,
            conditions,
        } => {
            let leaves = if *conditions {
                parse_conditions(&parser, expression)?.leaves().len()
            } else {
                parser
                    .to_tree(expression)
                    .with_context(|| format!("Parse: Invalid expression '{expression}'"))?
                    .leaves()
                    .len()
            };
            tracing::info!("Check: {} leaves", leaves);
            Ok("ok".to_string())
        }
        Command::Solve(args) => {
            let tree = parse_conditions(&parser, &args.expression)?;
            let facts = merge_facts(settings.facts, args);
            let result = boolparse::solve(&tree, |c| facts.holds(c));
            Ok(result.to_string())
        }
        Command::Fsolve(args) => {
            let tree = parse_conditions(&parser, &args.expression)?;
            let facts = merge_facts(settings.facts, args);
            let result = boolparse::fsolve(&tree, |c| facts.check(c));
            Ok(match result {
                Some(value) => value.to_string(),
                None => "unknown".to_string(),
            })
        }
        Command::Filter(args) => {
            let tree = parse_conditions(&parser, &args.expression)?;
            let facts = merge_facts(settings.facts, args);
            let kept = boolparse::filter(&tree, |c| facts.knows(c));
            tracing::info!(
                "Filter: kept {} of {} conditions",
                kept.leaves().len(),
                tree.leaves().len()
            );
            // Filtered expressions read best as text unless asked otherwise.
            render(&kept, cli.format.unwrap_or(OutputFormat::Text))
        }
    }
}

fn parse_conditions(parser: &boolparse::Parser, expression: &str) -> Result<Tree<Condition>> {
    parser
        .to_condition_tree(expression)
        .with_context(|| format!("Parse: Invalid condition expression '{expression}'"))
}

fn merge_facts(mut facts: Facts, args: &FactArgs) -> Facts {
    for (field, value) in &args.facts {
        facts.insert(field.clone(), value.clone());
    }
    facts
}

fn render<T: Serialize + Display>(tree: &Tree<T>, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(tree).context("Output: Failed to encode JSON")?
        }
        OutputFormat::Yaml => serde_yaml::to_string(tree)
            .context("Output: Failed to encode YAML")?
            .trim_end()
            .to_string(),
        OutputFormat::Text => tree.to_string(),
    })
}
