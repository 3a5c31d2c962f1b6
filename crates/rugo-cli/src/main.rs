//! RuGo command line entry point

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ConfigManager;

#[derive(Parser)]
#[command(name = "rugo", author, version, about = "Build and inspect RuGo worlds")]
struct Cli {
    /// Configuration file (defaults to the OS config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured save directory
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty world and print its name
    New,
    /// List saved worlds
    List,
    /// Print the gadgets of a saved world
    Show {
        name: String,
    },
    /// Replay a recorded pointer script as a drawn path and save the result
    Draw {
        /// RON list of pointer frames
        script: PathBuf,
        /// Add to an existing world instead of creating a new one
        #[arg(long)]
        world: Option<String>,
        /// Height of the table plane the pointer is cast onto
        #[arg(long, default_value_t = 0.0)]
        table_height: f32,
    },
    /// Print the active configuration
    Config {
        /// Write the default configuration back to disk
        #[arg(long)]
        reset: bool,
        /// Persist a new gadget spacing for drawn paths
        #[arg(long)]
        spacing: Option<f32>,
        /// Persist a new default save directory
        #[arg(long)]
        set_save_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rugo_cli=info,rugo_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    let save_dir = cli
        .save_dir
        .unwrap_or_else(|| config.config().save_dir.clone());
    tracing::debug!("Using save directory {:?}", save_dir);

    match cli.command {
        Command::New => {
            let name = commands::new_world(&save_dir, config.config())?;
            println!("{name}");
        }
        Command::List => {
            for name in commands::list_worlds(&save_dir, config.config())? {
                println!("{name}");
            }
        }
        Command::Show { name } => {
            print!("{}", commands::show_world(&save_dir, &name)?);
        }
        Command::Draw {
            script,
            world,
            table_height,
        } => {
            let summary = commands::draw(
                &save_dir,
                config.config(),
                &script,
                world.as_deref(),
                table_height,
            )?;
            println!(
                "{}: placed {} gadgets ({} total)",
                summary.world, summary.placed, summary.total
            );
        }
        Command::Config {
            reset,
            spacing,
            set_save_dir,
        } => {
            if reset {
                config.reset_to_defaults();
            }
            if let Some(spacing) = spacing {
                if !(spacing > 0.0) {
                    anyhow::bail!("Spacing must be positive, got {spacing}");
                }
                config.config_mut().capture.spacing = spacing;
            }
            if let Some(dir) = set_save_dir {
                config.config_mut().save_dir = dir;
            }
            if config.is_dirty() {
                config.save()?;
            }
            println!("# {}", config.config_file_path().display());
            println!("{}", config.to_ron()?);
        }
    }

    Ok(())
}
