use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use package_script_writer::catalog::Catalog;
use package_script_writer::config::{AppConfig, log_path};
use package_script_writer::logging;
use package_script_writer::marketplace::QueryKind;
use package_script_writer::script::{CommandValidator, ShellDialect};
use package_script_writer::version::lts::LtsResolver;

#[derive(Parser)]
#[command(name = "package-script-writer")]
#[command(version, about = "Package discovery and install-script validation")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a generated script against the command allowlist
    Validate {
        script: PathBuf,
        /// Treat the script as a Windows batch/PowerShell script
        #[arg(long)]
        windows: bool,
    },
    /// List the permitted command shapes
    Grammar,
    /// Print the recommended LTS version
    Lts,
    /// List marketplace packages
    Packages {
        /// List templates instead of packages
        #[arg(long)]
        templates: bool,
    },
    /// List published versions of a package, newest first
    Versions { package_id: String },
    /// List versions published in a package's legacy Atom feed
    Feed { package_url: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&log_path(), cli.log_json)?;

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Validate { script, windows } => {
            let content = std::fs::read_to_string(&script)?;
            let result = CommandValidator::new().validate(&content, ShellDialect::from(windows));

            if !result.is_valid {
                for violation in &result.violations {
                    println!("{}: {}", script.display(), violation);
                }
                anyhow::bail!("{} disallowed command(s)", result.violations.len());
            }
            println!("{}: ok", script.display());
        }
        Command::Grammar => {
            for (pattern, description) in CommandValidator::new().grammar().entries() {
                println!("{:<40} {}", description, pattern);
            }
        }
        Command::Lts => {
            let catalog = Arc::new(Catalog::from_config(&config));
            let resolver = LtsResolver::new(catalog, &config.lts.tracked_package);
            match resolver.latest_lts(&config.lts.lifecycle).await {
                Some(version) => println!("{}", version),
                None => anyhow::bail!("no LTS version available"),
            }
        }
        Command::Packages { templates } => {
            let kind = if templates {
                QueryKind::Templates
            } else {
                QueryKind::Packages
            };
            let records = Catalog::from_config(&config).listing(kind).await;
            info!("Listed {} {}", records.len(), kind.as_str());
            for record in records.iter() {
                println!("{}\t{}\t{}", record.package_id, record.downloads, record.title);
            }
        }
        Command::Versions { package_id } => {
            let catalog = Catalog::from_config(&config);
            for version in catalog.flat_index_versions(&package_id).await.iter() {
                println!("{}", version);
            }
        }
        Command::Feed { package_url } => {
            let catalog = Catalog::from_config(&config);
            for version in catalog.feed_versions(&package_url).await?.iter() {
                println!("{}", version);
            }
        }
    }

    Ok(())
}
