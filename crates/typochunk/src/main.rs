use crate::prelude::*;
use clap::Parser;

mod config;
mod error;
mod prelude;
mod report;
mod rewrite;
mod source;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Infer heading structure from PDF typography and cut documents into heading chunks"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Settings file (TOML)
    #[clap(long, env = "TYPOCHUNK_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "TYPOCHUNK_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Rank the font styles of a document by frequency
    Styles(crate::report::StylesOptions),

    /// Show the size to tag table and which headings qualify
    Tags(crate::report::TagsOptions),

    /// Cut a document into chunks at every qualifying heading
    Chunks(crate::report::ChunksOptions),

    /// Rewrite heading chunks with a local Ollama model
    Rewrite(crate::rewrite::RewriteOptions),

    /// Dump a PDF as a JSON span tree
    Extract(crate::report::ExtractOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let settings = crate::config::load_settings(app.global.config.as_deref())?;

    match app.command {
        SubCommands::Styles(options) => crate::report::styles(options, settings, app.global).await,
        SubCommands::Tags(options) => crate::report::tags(options, settings, app.global).await,
        SubCommands::Chunks(options) => crate::report::chunks(options, settings, app.global).await,
        SubCommands::Rewrite(options) => crate::rewrite::run(options, settings, app.global).await,
        SubCommands::Extract(options) => crate::report::extract(options, settings, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
