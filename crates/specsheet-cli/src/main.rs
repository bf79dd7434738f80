mod commands;
mod output;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "specsheet",
    version,
    about = "Import BA, UI/UX and engineering specification workbooks"
)]
struct Cli {
    /// Log progress to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a workbook into a structured document
    Parse {
        /// Path to the .xlsx workbook
        input_file: PathBuf,

        /// Template to use instead of detecting it: BA, UIUX or ENGINEER
        #[arg(short, long, value_name = "KIND")]
        template: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the parsed document to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Save embedded images under DIR/<category>/<id>.<ext>
        #[arg(long, value_name = "DIR")]
        images_dir: Option<PathBuf>,

        /// Parse options as JSON (template, min_detection_score, header_search_rows, extract_images)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Skip image extraction
        #[arg(long)]
        no_images: bool,
    },
    /// Show which template a workbook matches and how well
    Detect {
        /// Path to the .xlsx workbook
        input_file: PathBuf,

        /// Best score must exceed this or the workbook falls back to BA
        #[arg(long, default_value_t = 0.0)]
        min_score: f64,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Check a workbook's sheets against one template or all of them
    Validate {
        /// Path to the .xlsx workbook
        input_file: PathBuf,

        /// Template to check: BA, UIUX or ENGINEER (default: all)
        #[arg(short, long, value_name = "KIND")]
        template: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect the built-in templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List built-in templates
    List,
    /// Describe a template's sheets, fields and columns
    Explain {
        /// Template token: BA, UIUX or ENGINEER
        kind: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            template,
            output,
            out,
            images_dir,
            config,
            no_images,
        } => commands::parse::run(commands::parse::ParseArgs {
            input_file,
            template,
            output_format: output,
            out,
            images_dir,
            config,
            no_images,
        }),
        Commands::Detect {
            input_file,
            min_score,
            output,
        } => commands::detect::run(input_file, min_score, &output),
        Commands::Validate {
            input_file,
            template,
            output,
        } => commands::validate::run(input_file, template.as_deref(), &output),
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(),
            TemplatesAction::Explain { kind } => commands::templates::explain(&kind),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
