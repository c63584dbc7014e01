//! Command-line arguments for the quiz binary.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "quiz",
    version,
    about = "Run multiple-choice quizzes from CSV question banks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database holding problem statistics.
    #[arg(
        long = "db",
        env = "QUIZ_DB_URL",
        default_value = "sqlite://quiz.sqlite3",
        global = true
    )]
    pub db_url: String,

    /// Directory containing the CSV banks and their `index.json` catalog.
    #[arg(
        long = "banks",
        env = "QUIZ_BANKS_DIR",
        default_value = "banks",
        value_name = "DIR",
        global = true
    )]
    pub banks_dir: PathBuf,

    /// Correct answers in a row needed to clear a problem question.
    #[arg(long = "mastery", default_value_t = 2, value_name = "N", global = true)]
    pub mastery_threshold: u32,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the banks named in the catalog.
    Catalog,

    /// Take a quiz interactively.
    Run(RunArgs),

    /// Show the questions currently tracked as problems for a bank.
    Problems {
        /// Bank file name or path.
        #[arg(value_name = "BANK")]
        bank: String,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Bank file name (resolved under the banks directory) or path.
    #[arg(value_name = "BANK")]
    pub bank: String,

    /// Shuffle question order.
    #[arg(long)]
    pub randomize: bool,

    /// 1-based question to start from; clamped to the bank size.
    #[arg(long = "start-from", default_value_t = 1, value_name = "N")]
    pub start_from: u32,

    /// Only ask questions currently tracked as problems.
    #[arg(long)]
    pub problems: bool,
}
