mod cli;
mod db;
mod logging;
mod terminal;

use clap::Parser;
use quiz_core::model::MasteryPolicy;
use services::{AppServices, Clock, StartMode};

use crate::cli::{Cli, Command, RunArgs};

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let policy = MasteryPolicy::new(cli.mastery_threshold)?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = db::normalize_sqlite_url(&cli.db_url);
    db::prepare_sqlite_file(&db_url)?;
    let services =
        AppServices::new_sqlite(&db_url, cli.banks_dir.clone(), Clock::system(), policy).await?;
    tracing::debug!(db = %db_url, banks = %cli.banks_dir.display(), "services ready");

    match cli.command {
        Command::Catalog => {
            // A missing or malformed catalog is reported, not fatal.
            let catalog = services.catalog().await;
            print!("{}", terminal::render_catalog(catalog, &cli.banks_dir));
            Ok(())
        }
        Command::Run(args) => run_quiz(&services, args).await,
        Command::Problems { bank } => {
            let (mut controller, _events) = services.controller();
            let loaded = controller.load_bank(&bank).await?;
            let tracker = services.tracker();
            let stats = tracker.snapshot();
            let problems = tracker.problem_set_for(&loaded.id, &loaded.questions);

            println!("{} problem question(s) in {}", problems.len(), loaded.id);
            for question in &problems {
                let streak = stats.streak(&loaded.id, question.number()).unwrap_or(0);
                println!(
                    "  #{} (streak {streak}/{}) {}",
                    question.number(),
                    policy.threshold(),
                    question.text()
                );
            }
            Ok(())
        }
    }
}

async fn run_quiz(
    services: &AppServices,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, mut events) = services.controller();
    controller.load_bank(&args.bank).await?;

    let settings = controller.settings_mut();
    settings.randomize = args.randomize;
    settings.start_from = args.start_from;

    let mode = if args.problems {
        StartMode::ProblemsOnly
    } else {
        StartMode::All
    };
    terminal::run(&mut controller, &mut events, mode).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(logging::level_from_flags(cli.verbose, cli.quiet));

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
