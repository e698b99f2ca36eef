use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;

use gridflow::cli::{self, Target};
use gridflow::config::GridflowConfig;
use gridflow::export::ExportFormat;
use gridflow::logging::init_logging;

#[derive(Parser)]
#[command(name = "gridflow")]
#[command(about = "Detect and extract tables from saved pages and DOM snapshots")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides config and GRIDFLOW_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// CSS selector (snapshots accept only #id)
    #[arg(short, long)]
    selector: Option<String>,

    /// Element id
    #[arg(short, long)]
    node_id: Option<String>,
}

impl TargetArgs {
    fn into_target(self) -> Result<Target> {
        match (self.selector, self.node_id) {
            (Some(selector), _) => Ok(Target::Selector(selector)),
            (None, Some(id)) => Ok(Target::NodeId(id)),
            (None, None) => Err(anyhow!("one of --selector or --node-id is required")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count tables and list every selectable region
    Scan {
        /// HTML file or .json DOM snapshot
        input: PathBuf,
    },

    /// Simulate hovering an element (and clicking it)
    Hover {
        input: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Click after hovering and emit the table
        #[arg(long)]
        click: bool,

        /// Mask emails, phone and card numbers before publishing
        #[arg(long)]
        anonymize: bool,
    },

    /// Extract an element straight to a file or stdout
    Extract {
        input: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Defaults to the output extension, then csv
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mask emails, phone and card numbers
        #[arg(long)]
        anonymize: bool,

        /// Keep the first row as data
        #[arg(long)]
        no_header: bool,
    },

    /// Mask PII in TEXT, or in each line of stdin
    Mask { text: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GridflowConfig::load_from_file(path)?,
        None => GridflowConfig::default(),
    };
    config.apply_env();
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    let _guard = init_logging(&config.logging)?;

    let result = match cli.command {
        Commands::Scan { input } => cli::scan_command(input, &config).await,
        Commands::Hover {
            input,
            target,
            click,
            anonymize,
        } => cli::hover_command(input, target.into_target()?, click, anonymize, &config).await,
        Commands::Extract {
            input,
            target,
            format,
            output,
            anonymize,
            no_header,
        } => {
            let target = target.into_target()?;
            cli::extract_command(input, target, format, output, anonymize, no_header, &config).await
        }
        Commands::Mask { text } => cli::mask_command(text).await,
    };

    if let Err(e) = result {
        error!(error = %e, recoverable = e.is_recoverable(), "command failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
    Ok(())
}
