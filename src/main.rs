use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use diagram_tag::{build, common, config, generate_commands};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the configured pages and copy generated assets
    Build {
        #[clap(short, long, default_value = "site.yaml")]
        config: String,
        #[clap(short, long)]
        watch: bool,
    },
    /// Write a default site configuration
    Init {
        #[clap(short, long, default_value = "site.yaml")]
        config: String,
    },
    Generate {
        #[clap(subcommand)]
        command: GenerateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum GenerateCommands {
    Sample { sample: String, dir: String },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Build { config, watch } => {
            info!("Building site from: {}", config);
            build::execute_build(config, watch)?;
        }
        Commands::Init { config } => {
            info!("Initializing site config: {}", config);
            let config_file_path = config;
            let config = config::SiteConfig::default();
            let serialized_config = serde_yaml::to_string(&config)?;
            common::write_string_to_file(&config_file_path, &serialized_config)?;
        }
        Commands::Generate { command } => match command {
            GenerateCommands::Sample { sample, dir } => {
                info!("Generating sample: {} in {}", sample, dir);
                generate_commands::generate_sample(sample, dir);
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
