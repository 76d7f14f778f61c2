use clap::{Parser, Subcommand};
use flowgate::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::process::ExitCode;

/// Validate, hash, and dry-run flowgate decision graphs from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a graph definition and print every issue found
    Validate {
        /// Path to the graph definition JSON file
        graph_path: String,
    },
    /// Print the canonical drift-detection hash of a graph definition
    Hash {
        /// Path to the graph definition JSON file
        graph_path: String,
    },
    /// Evaluate a graph against a data file and print the gate decision
    Eval {
        /// Path to the graph definition JSON file
        graph_path: String,
        /// Path to a JSON object mapping source names to documents
        data_path: String,
        /// Optional path to a JSON object used as the prior snapshot
        #[arg(long)]
        snapshot: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Validate { graph_path } => {
            let definition = load_definition(&graph_path)?;
            match flowgate::graph::compile(&definition) {
                Ok(graph) => {
                    println!(
                        "OK: {} node(s), final node {}",
                        graph.len(),
                        graph.final_node()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(issues) => {
                    println!("{} issue(s) found:", issues.len());
                    for issue in &issues {
                        println!("  - {issue}");
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Hash { graph_path } => {
            let definition = load_definition(&graph_path)?;
            let hash = hash_definition(&definition)?;
            println!("{hash}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Eval {
            graph_path,
            data_path,
            snapshot,
        } => {
            let definition = load_definition(&graph_path)?;
            let graph = flowgate::graph::compile(&definition)
                .map_err(|issues| format!("graph is invalid ({} issue(s))", issues.len()))?;

            let sources: HashMap<String, Value> =
                serde_json::from_str(&fs::read_to_string(&data_path)?)?;
            let prior: Snapshot = match snapshot {
                Some(path) => serde_json::from_str(&fs::read_to_string(&path)?)?,
                None => Snapshot::new(),
            };

            let mut context = DataContext::new();
            for (name, document) in sources {
                context.insert_source(name, document);
            }
            context.insert_source(SNAPSHOT_SOURCE, Value::Object(prior));

            let outcome = GraphEvaluator::new(&graph).evaluate(&context)?;
            println!("gate: {}", outcome.final_result);
            if let Some(new_snapshot) = outcome.new_snapshot {
                println!(
                    "snapshot: {}",
                    serde_json::to_string_pretty(&Value::Object(new_snapshot))?
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_definition(path: &str) -> Result<GraphDefinition> {
    let json = fs::read_to_string(path)?;
    Ok(GraphDefinition::from_json(&json)?)
}
