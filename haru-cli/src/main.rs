mod commands;
mod config;
mod logging;
mod render;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::HaruConfig;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "haru")]
#[command(about = "Turn Korean free-form text into schedules, study plans and exam countdowns")]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one utterance, e.g. "20일 9시 면접, 1시 시험"
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Interactive session that remembers exam dates, subjects and goals
    Chat,
    /// List stored events
    List {
        /// Show at most this many events
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Remove an event by id
    Remove { id: u64 },
    /// Show or reset the remembered fields
    Memory {
        #[command(subcommand)]
        action: Option<MemoryAction>,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MemoryAction {
    Show,
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = HaruConfig::load()?;
    let store = Store::open(config.data_path());

    match cli.command {
        Commands::Ask { text } => {
            commands::ask::run(&config, &store, &text.join(" "), cli.verbose)
        }
        Commands::Chat => commands::chat::run(&config, &store, cli.verbose),
        Commands::List { limit } => commands::list::run(&store, limit),
        Commands::Remove { id } => commands::remove::run(&store, id),
        Commands::Memory { action } => match action.unwrap_or(MemoryAction::Show) {
            MemoryAction::Show => commands::memory::show(&store),
            MemoryAction::Reset => commands::memory::reset(&store),
        },
    }
}
