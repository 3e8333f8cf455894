//! Inspect command - Print parameters and table diagnostics of a saved agent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::DEFAULT_AGENT_FILE,
    cli::{
        config::StoreFormat,
        output::{format_number, print_section, print_stats_table, print_subsection},
    },
    sarsa::{AgentParameters, RateSchedule, SarsaAgent, TableStats},
    sensing::EncoderSettings,
};

#[derive(Parser, Debug)]
#[command(about = "Show parameters and table statistics of a saved agent")]
pub struct InspectArgs {
    /// Saved agent file
    #[arg(default_value = DEFAULT_AGENT_FILE)]
    pub agent: PathBuf,

    /// Encoding of the saved agent
    #[arg(long, value_enum, default_value_t = StoreFormat::Json)]
    pub format: StoreFormat,

    /// Also list the highest-valued (state, action) pairs
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Print a JSON report instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TopEntry {
    state: String,
    action: usize,
    value: f64,
    eligibility: f64,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    parameters: AgentParameters,
    encoder: EncoderSettings,
    stats: TableStats,
    saved_at: Option<u64>,
    seed: Option<u64>,
    top: Vec<TopEntry>,
}

fn top_entries(agent: &SarsaAgent, count: usize) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = agent
        .table()
        .iter()
        .map(|(state, action, entry)| TopEntry {
            state: state.to_string(),
            action: action.index(),
            value: entry.value,
            eligibility: entry.eligibility,
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(count);
    entries
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let repository = args.format.repository();
    let record = repository
        .load(&args.agent)
        .with_context(|| format!("Failed to load agent {}", args.agent.display()))?;
    let agent = record
        .to_agent(RateSchedule::default(), None)
        .with_context(|| format!("Invalid agent record {}", args.agent.display()))?;

    let report = InspectReport {
        parameters: record.parameters.clone(),
        encoder: record.encoder.clone(),
        stats: agent.stats(),
        saved_at: record.metadata.saved_at,
        seed: record.metadata.seed,
        top: top_entries(&agent, args.top),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section(&format!("Agent {}", args.agent.display()));
    let params = &report.parameters;
    print_stats_table(&[
        ("Alpha", format!("{:.5}", params.alpha)),
        ("Gamma", format!("{}", params.gamma)),
        ("Epsilon", format!("{:.5}", params.epsilon)),
        ("Lambda", format!("{}", params.lambda)),
        ("Eligibility cutoff", format!("{:e}", params.eligibility_cutoff)),
        ("Actions", params.action_count.to_string()),
        ("Episodes", format_number(params.episodes as usize)),
        ("Updates", format_number(params.update_count as usize)),
    ]);

    print_subsection("Encoder");
    print_stats_table(&[
        ("Scent space", format!("{:?}", report.encoder.scent_space)),
        ("Terrain space", format!("{:?}", report.encoder.terrain_space)),
        ("Presence space", format!("{:?}", report.encoder.presence_space)),
        ("Radix", format!("{:?}", report.encoder.radix)),
        ("Food presence", report.encoder.food_presence.to_string()),
    ]);

    print_subsection("Table");
    print_stats_table(&[
        ("Entries", format_number(report.stats.entries)),
        ("Nonzero values", format_number(report.stats.nonzero_values)),
        ("Active traces", format_number(report.stats.active_traces)),
    ]);

    if !report.top.is_empty() {
        print_subsection("Highest values");
        for entry in &report.top {
            println!(
                "  {:24} a={} Q={:.4} e={:.4}",
                entry.state, entry.action, entry.value, entry.eligibility
            );
        }
    }

    Ok(())
}
