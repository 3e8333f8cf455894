//! Train command - Run the agent through meadow episodes

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::{
    adapters::DEFAULT_AGENT_FILE,
    app::{AgentConfig, App},
    cli::{
        config::StoreFormat,
        output::{format_number, format_percent, print_section, print_stats_table},
    },
    pipeline::{JsonlObserver, ProgressObserver, TrainingConfig, TrainingPipeline},
    world::{Meadow, MeadowConfig},
};

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train the agent in the meadow sandbox")]
pub struct TrainArgs {
    /// Saved agent to resume from and write back to
    #[arg(long, short = 'a', default_value = DEFAULT_AGENT_FILE)]
    pub agent: PathBuf,

    /// Encoding of the saved agent
    #[arg(long, value_enum, default_value_t = StoreFormat::Json)]
    pub format: StoreFormat,

    /// Agent configuration file (JSON)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Meadow configuration file (JSON)
    #[arg(long)]
    pub meadow: Option<PathBuf>,

    /// Number of episodes
    #[arg(long, short = 'e', default_value_t = 20_000)]
    pub episodes: usize,

    /// Save the agent every this many episodes (0 disables autosave)
    #[arg(long, default_value_t = 10)]
    pub autosave_interval: usize,

    /// End an episode once the score exceeds this
    #[arg(long, default_value_t = 5000.0)]
    pub score_cap: f64,

    /// Limit on steps per episode
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start from an empty table even if a saved agent exists
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Add the food-presence channel to the state
    #[arg(long, default_value_t = false)]
    pub food_presence: bool,

    /// Optional file for per-episode JSONL summaries
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

fn load_meadow_config(path: Option<&Path>) -> Result<MeadowConfig> {
    let config: MeadowConfig = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read meadow config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid meadow config {}", path.display()))?
        }
        None => MeadowConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut agent_config = match &args.config {
        Some(path) => AgentConfig::from_file(path)
            .with_context(|| format!("Failed to load agent config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if args.food_presence {
        agent_config = agent_config.with_food_presence(true);
    }
    if let Some(seed) = args.seed {
        agent_config = agent_config.with_seed(seed);
    }

    let mut meadow_config = load_meadow_config(args.meadow.as_deref())?;

    let repository = args.format.repository();
    let app = App::with_repository(std::sync::Arc::clone(&repository));

    let mut agent = if args.fresh {
        app.create_agent(agent_config)?
    } else {
        app.load_or_create(agent_config, &args.agent)?
    };
    // a resumed agent keeps the channels it was saved with
    meadow_config.food_presence = agent.encoder().settings().food_presence;

    let training = TrainingConfig {
        episodes: args.episodes,
        autosave_interval: args.autosave_interval,
        score_cap: args.score_cap,
        max_steps: args.max_steps,
        seed: args.seed,
    };

    let mut pipeline =
        TrainingPipeline::new(training).with_checkpoint(repository, args.agent.clone());
    if !args.quiet {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let base_seed = args.seed.unwrap_or_else(rand::random);
    info!(
        "training for {} episodes starting at cumulative episode {}",
        args.episodes,
        agent.cumulative_episodes()
    );
    let result = pipeline.run(&mut agent, |episode| {
        Meadow::new(&meadow_config, base_seed.wrapping_add(episode as u64))
    })?;

    print_section("Training Summary");
    print_stats_table(&[
        ("Episodes", format_number(result.episodes)),
        ("Steps", format_number(result.total_steps)),
        ("High score", format!("{:.1}", result.high_score)),
        ("Mean score", format!("{:.1}", result.mean_score)),
        (
            "Deaths",
            format!(
                "{} ({})",
                format_number(result.deaths),
                format_percent(if result.episodes > 0 {
                    result.deaths as f64 / result.episodes as f64
                } else {
                    0.0
                })
            ),
        ),
        ("Final epsilon", format!("{:.4}", result.final_epsilon)),
        ("Table entries", format_number(result.table_entries)),
        (
            "Total episodes",
            format_number(agent.cumulative_episodes() as usize),
        ),
    ]);
    if result.schedule_exhausted {
        println!("\nRate schedule exhausted; training stopped early.");
    }
    println!("\nAgent saved to {}", args.agent.display());

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        result
            .save(&path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{adapters::JsonRepository, pipeline::TrainingResult, ports::AgentRepository};

    #[test]
    fn test_sanitize_summary_path() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary")),
            PathBuf::from("out/summary.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary.JSON")),
            PathBuf::from("out/summary.JSON")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/")),
            PathBuf::from("out/training_summary.json")
        );
    }

    fn quick_run(agent: &Path, extra: &[&str]) -> TrainArgs {
        let agent = agent.to_string_lossy().to_string();
        let mut argv = vec![
            "train",
            "--agent",
            agent.as_str(),
            "--episodes",
            "2",
            "--max-steps",
            "30",
            "--seed",
            "5",
            "--quiet",
        ];
        argv.extend_from_slice(extra);
        TrainArgs::parse_from(argv)
    }

    #[test]
    fn test_resume_keeps_saved_food_presence_channel() {
        let temp_dir = TempDir::new().unwrap();
        let agent = temp_dir.path().join("mouse.json");

        execute(quick_run(&agent, &["--food-presence"])).unwrap();
        execute(quick_run(&agent, &[])).unwrap();

        let record = JsonRepository::new().load(&agent).unwrap();
        assert!(record.encoder.food_presence);
        assert_eq!(record.parameters.episodes, 4);
    }

    #[test]
    fn test_summary_file_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let agent = temp_dir.path().join("mouse.json");
        let summary = temp_dir.path().join("summary");

        execute(quick_run(
            &agent,
            &["--summary", summary.to_str().unwrap()],
        ))
        .unwrap();

        let result = TrainingResult::load(summary.with_extension("json")).unwrap();
        assert_eq!(result.episodes, 2);
        assert!(result.total_steps > 0);
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = TrainArgs::parse_from(["train"]);
        assert_eq!(args.agent, PathBuf::from(DEFAULT_AGENT_FILE));
        assert_eq!(args.episodes, 20_000);
        assert_eq!(args.autosave_interval, 10);
        assert_eq!(args.format, StoreFormat::Json);
        assert!(!args.fresh);
    }
}
