use anyhow::{Context, Result};
use clap::{Arg, Command};
use felt_execution::registry::GameRegistry;
use felt_randotron::{Config, Engine};
use tracing::info;

fn main() -> Result<()> {
    // Parse arguments
    let matches = Command::new("randotron")
        .about("Randomly play rounds at a felt table and check chip conservation.")
        .arg(Arg::new("config").long("config").required(true))
        .arg(
            Arg::new("seed")
                .long("seed")
                .required(false)
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    // Load from config file
    let config_file = matches
        .get_one::<String>("config")
        .context("missing --config")?;
    let contents = std::fs::read_to_string(config_file)
        .with_context(|| format!("could not read config file {config_file}"))?;
    let mut config: Config =
        serde_yaml::from_str(&contents).context("could not parse config file")?;
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = *seed;
    }

    // Setup logging
    let level = config.level()?;
    tracing_subscriber::fmt().with_max_level(level).init();
    info!(
        game = GameRegistry::get_info(config.game).name,
        seed = config.seed,
        rounds = config.rounds,
        opening_cash = config.opening_cash,
        "Starting randotron"
    );

    // Run engine
    let engine = Engine::new(config.engine_config()?)?;
    let summary = engine.run()?;
    info!(
        game = %summary.game,
        rounds = summary.rounds,
        cashed_in = summary.cashed_in,
        cashed_out = summary.cashed_out,
        rebuys = summary.rebuys,
        refunded = summary.refunded,
        events = summary.events,
        won = summary.stats.bets_won,
        lost = summary.stats.bets_lost,
        pushed = summary.stats.bets_pushed,
        net = summary.stats.net() as i64,
        placed = summary.activity.placed,
        rejected = summary.activity.rejected,
        "Finished randotron"
    );
    Ok(())
}
