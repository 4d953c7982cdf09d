//! mdfpack: package tabular materials datasets and publish them.
//!
//! mdfpack loads a dataset from a local CSV file or from a remote catalog,
//! derives input/output metadata from the column names (units come from the
//! `Name (unit)` and `Name [unit]` conventions), and publishes the dataset,
//! and optionally a model servable, to a materials data repository. The
//! repository fetches the dataset from a temporary public URL that only exists
//! for the duration of the publish call.
//!
//! # Modules
//!
//! - [`table`]: In-memory tables and the CSV reader
//! - [`metadata`]: Unit extraction and the metadata record
//! - [`catalog`]: Remote catalog interface and the Hugging Face Hub backend
//! - [`loader`]: Ordered dataset and model resolution
//! - [`pack`]: The loaded dataset, metadata and model for one session
//! - [`publish`]: Tunnel, repository client, status log and publish operations
//! - [`error`]: Error types for mdfpack operations

pub mod catalog;
pub mod error;
pub mod loader;
pub mod metadata;
pub mod pack;
pub mod publish;
pub mod table;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

pub use error::PackError;

use loader::model::{CatalogServable, LocalArtifact};
use loader::{DatasetSource, LocalCsv};
use pack::{Pack, PackRequest};
use publish::http::HttpRepository;
use publish::manifest::PublishManifest;
use publish::status::{check_status, StatusLog, DEFAULT_LOG_FILE};
use publish::tunnel::StagingTunnel;
use publish::{PublishResult, Publisher};

/// The mdfpack CLI application.
#[derive(Parser)]
#[command(name = "mdfpack")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Load a dataset and show the metadata that would be published.
    Inspect(InspectArgs),
    /// Publish a dataset to the repository.
    PublishData(PublishDataArgs),
    /// Publish a model servable for a dataset.
    PublishModel(PublishModelArgs),
    /// Check the status of the last dataset publish.
    Status(StatusArgs),
}

/// Options for resolving catalog identifiers.
#[derive(clap::Args)]
struct CatalogArgs {
    /// Catalog revision (branch, tag or commit) for catalog datasets.
    #[arg(long)]
    revision: Option<String>,

    /// Catalog access token.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,
}

/// Options for reaching the repository.
#[derive(clap::Args)]
struct RemoteArgs {
    /// Base URL of the repository publish API.
    #[arg(long, env = "MDF_API_URL")]
    api_url: String,

    /// Repository access token.
    #[arg(long, env = "MDF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Timeout for each repository call, in seconds.
    #[arg(long, env = "MDFPACK_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
}

impl RemoteArgs {
    fn repository(&self) -> Result<HttpRepository, PackError> {
        HttpRepository::new(
            &self.api_url,
            self.token.clone(),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Local CSV path or catalog id.
    data: String,

    /// Target (output) column.
    #[arg(long)]
    target: Option<String>,

    /// Output format for the report.
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    output: String,

    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for the publish-data subcommand.
#[derive(clap::Args)]
struct PublishDataArgs {
    /// Local CSV path or catalog id.
    data: String,

    /// Target (output) column.
    #[arg(long)]
    target: Option<String>,

    /// Dataset title.
    #[arg(long)]
    title: Option<String>,

    /// Dataset author (repeat for several).
    #[arg(long = "author")]
    authors: Vec<String>,

    /// YAML manifest with title and authors.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Directory served at the public URL.
    #[arg(long, env = "MDFPACK_STAGING_DIR")]
    staging_dir: PathBuf,

    /// Public base URL of the staging directory.
    #[arg(long, env = "MDFPACK_PUBLIC_URL")]
    public_url: String,

    /// Status log written after a successful publish.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log: PathBuf,

    #[command(flatten)]
    remote: RemoteArgs,

    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for the publish-model subcommand.
#[derive(clap::Args)]
struct PublishModelArgs {
    /// Local CSV path or catalog id of the training data.
    data: String,

    /// Target (output) column; its distinct values become the class list.
    #[arg(long)]
    target: String,

    /// Local model file or catalog servable id.
    #[arg(long)]
    model: String,

    /// Servable type tag understood by the repository.
    #[arg(long)]
    servable_type: Option<String>,

    /// Model title.
    #[arg(long)]
    title: Option<String>,

    /// Short model name.
    #[arg(long)]
    short_title: Option<String>,

    /// Model author (repeat for several).
    #[arg(long = "author")]
    authors: Vec<String>,

    /// YAML manifest with title, short title, authors and servable type.
    #[arg(long)]
    manifest: Option<PathBuf>,

    #[command(flatten)]
    remote: RemoteArgs,

    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for the status subcommand.
#[derive(clap::Args)]
struct StatusArgs {
    /// Status log written by publish-data.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log: PathBuf,

    #[command(flatten)]
    remote: RemoteArgs,
}

/// Run the mdfpack CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PackError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::PublishData(args)) => run_publish_data(args),
        Some(Commands::PublishModel(args)) => run_publish_model(args),
        Some(Commands::Status(args)) => run_status(args),
        None => {
            println!("mdfpack {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Package tabular materials datasets and publish them.");
            println!();
            println!("Run 'mdfpack --help' for usage information.");
            Ok(())
        }
    }
}

fn load_pack(
    data: &str,
    target: Option<&str>,
    model: Option<&str>,
    catalog_args: &CatalogArgs,
) -> Result<Pack, PackError> {
    #[cfg(feature = "hub")]
    let hub = loader::CatalogSource::new(
        catalog::hub::HubCatalog::new()
            .with_token(catalog_args.hf_token.clone())
            .with_revision(catalog_args.revision.clone()),
    );
    #[cfg(not(feature = "hub"))]
    let _ = catalog_args;

    let mut data_sources: Vec<&dyn DatasetSource> = Vec::new();
    data_sources.push(&LocalCsv);
    #[cfg(feature = "hub")]
    data_sources.push(&hub);

    Pack::load(
        PackRequest {
            data,
            target,
            model,
        },
        &data_sources,
        &[&LocalArtifact, &CatalogServable],
    )
}

fn read_manifest(path: Option<&PathBuf>) -> Result<PublishManifest, PackError> {
    path.map(|path| PublishManifest::read(path))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn print_result(result: &PublishResult) -> Result<(), PackError> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), PackError> {
    let pack = load_pack(&args.data, args.target.as_deref(), None, &args.catalog)?;
    let report = pack.report();

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", report),
    }
    Ok(())
}

/// Execute the publish-data subcommand.
fn run_publish_data(args: PublishDataArgs) -> Result<(), PackError> {
    let manifest = read_manifest(args.manifest.as_ref())?;
    let details = manifest.merge(args.title.as_deref(), None, &args.authors, None);
    if details.title.trim().is_empty() {
        return Err(PackError::PublishPrecondition(
            "a title is required (--title or manifest)".to_string(),
        ));
    }
    if details.authors.is_empty() {
        return Err(PackError::PublishPrecondition(
            "at least one author is required (--author or manifest)".to_string(),
        ));
    }

    let pack = load_pack(&args.data, args.target.as_deref(), None, &args.catalog)?;

    let mut tunnel = StagingTunnel::new(&args.staging_dir, &args.public_url)?;
    let mut repository = args.remote.repository()?;
    let mut sink = StatusLog::new(&args.log);

    let mut publisher = Publisher::new(&mut tunnel, &mut repository, &mut sink);
    let result = publisher.publish_dataset(&pack, &details.title, &details.authors)?;
    print_result(&result)
}

/// Execute the publish-model subcommand.
fn run_publish_model(args: PublishModelArgs) -> Result<(), PackError> {
    let manifest = read_manifest(args.manifest.as_ref())?;
    let details = manifest.merge(
        args.title.as_deref(),
        args.short_title.as_deref(),
        &args.authors,
        args.servable_type.as_deref(),
    );

    let pack = load_pack(
        &args.data,
        Some(&args.target),
        Some(&args.model),
        &args.catalog,
    )?;

    let mut repository = args.remote.repository()?;
    let result = publish::publish_model(&mut repository, &pack, &details)?;
    print_result(&result)
}

/// Execute the status subcommand.
fn run_status(args: StatusArgs) -> Result<(), PackError> {
    let mut repository = args.remote.repository()?;
    let result = check_status(&args.log, &mut repository)?;
    print_result(&result)
}
