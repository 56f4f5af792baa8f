use std::path::PathBuf;

use clap::{Parser, Subcommand};
use starconf::{
    ctx::AppContext,
    editor::{EditorHandler, ListCategory},
    schema_source::SchemaSource,
};
use tomlforms::data::document::SCHEMA_URL;

/// Command-line interface for the `starconf` binary.
#[derive(Parser, Debug)]
#[command(name = "starconf", about = "Edit the starship prompt configuration", version)]
struct Cli {
    /// Optional subcommand; defaults to `edit`.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file; skips the STARSHIP_CONFIG and platform lookup
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Schema URL or local JSON file
    #[arg(long, value_name = "URL|PATH", default_value = SCHEMA_URL, global = true)]
    schema: String,

    /// Never fetch the schema; edit the basic fields only
    #[arg(long, global = true)]
    offline: bool,

    /// Prompt binary used for previews
    #[arg(long, value_name = "BIN", default_value = "starship", global = true)]
    program: String,

    /// Keep a timestamped copy of the previous file on every save
    #[arg(long, global = true)]
    backup: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open the interactive editor.
    Edit,
    /// Print the rendered prompt for the configuration on disk.
    Preview,
    /// List known modules.
    Modules {
        /// Which modules to list.
        #[arg(long, value_enum, default_value_t)]
        category: ListCategory,
        /// Case-insensitive name filter.
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Print the configuration file path.
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Edit);

    // The editor owns the terminal; its log goes to the in-app console.
    if !matches!(command, Commands::Edit) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let schema = (!cli.offline).then(|| SchemaSource::from_arg(&cli.schema));
    let ctx = AppContext::new(cli.config, schema, cli.program, cli.backup);

    match command {
        Commands::Edit => EditorHandler::handle_edit(&ctx).await?,
        Commands::Preview => EditorHandler::handle_preview(&ctx)?,
        Commands::Modules { category, query } => {
            EditorHandler::handle_modules(&ctx, category, &query)?
        }
        Commands::Path => EditorHandler::handle_path(&ctx),
    }
    Ok(())
}
