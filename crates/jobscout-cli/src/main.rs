use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use jobscout_client::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use jobscout_client::{DescriptionCleaner, JsonClient, OpenAiRoleModel, default_sources};
use jobscout_core::models::{JobFilter, JobPosting, RoleLabel};
use jobscout_core::traits::JobStore;
use jobscout_core::{Aggregator, Classifier, EnrichmentPipeline};
use jobscout_db::{DatabaseConfig, Store};

const DEFAULT_LIMIT: usize = 50;

#[derive(Parser)]
#[command(name = "jobscout", version, about = "Job postings aggregation and enrichment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, classify, tag, and store postings from every source
    Refresh {
        /// Maximum postings taken from each source
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Print all stored postings after the run
        #[arg(long, default_value_t = false)]
        print: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// List stored postings, newest first
    List {
        /// Case-insensitive text matched against title, company, and location
        #[arg(short, long)]
        query: Option<String>,

        /// Role label (e.g. "Backend", "Data/ML")
        #[arg(short, long, value_parser = parse_role)]
        role: Option<RoleLabel>,

        /// Exact skill tag (e.g. "Python")
        #[arg(short, long)]
        skill: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Show one posting by natural key
    Show {
        #[arg(long)]
        source: String,

        #[arg(long)]
        source_id: String,
    },

    /// Skill tag distribution across stored postings
    Skills,

    /// Role labels present in the store
    Roles,
}

#[derive(Args)]
struct ModelArgs {
    /// API key for the remote classifier; rule-based classification when unset
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat model used for remote classification
    #[arg(long, env = "JOBSCOUT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "JOBSCOUT_LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn parse_role(raw: &str) -> Result<RoleLabel, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobscout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = connect_store().await?;

    match cli.command {
        Commands::Refresh {
            limit,
            print,
            model,
        } => cmd_refresh(store, limit, print, &model).await?,
        Commands::List {
            query,
            role,
            skill,
            format,
        } => {
            let filter = JobFilter { query, role, skill };
            cmd_list(&store, &filter, format).await?;
        }
        Commands::Show { source, source_id } => cmd_show(&store, &source, &source_id).await?,
        Commands::Skills => {
            let distribution = store
                .skill_distribution()
                .await
                .context("Failed to compute skill distribution")?;
            println!("{}", serde_json::to_string_pretty(&distribution)?);
        }
        Commands::Roles => {
            let roles = store.roles().await.context("Failed to list roles")?;
            println!("{}", serde_json::to_string_pretty(&roles)?);
        }
    }

    Ok(())
}

/// PostgreSQL when DATABASE_URL is set, otherwise an in-memory store.
async fn connect_store() -> Result<Store> {
    let config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let store = Store::connect(config.as_ref())
        .await
        .context("Failed to open job store")?;
    store
        .health_check()
        .await
        .context("Job store health check failed")?;
    Ok(store)
}

fn build_classifier(args: &ModelArgs) -> Result<Classifier<OpenAiRoleModel>> {
    let model = match args.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(api_key) => Some(
            OpenAiRoleModel::with_base_url(api_key, &args.model, &args.base_url)
                .context("Failed to configure remote classifier")?,
        ),
        None => None,
    };

    let classifier = Classifier::from_model(model);
    if classifier.is_remote() {
        tracing::info!(model = %args.model, "Using remote classifier");
    } else {
        tracing::info!("No API key configured, using rule-based classifier");
    }
    Ok(classifier)
}

async fn cmd_refresh(store: Store, limit: usize, print: bool, model: &ModelArgs) -> Result<()> {
    let client = JsonClient::new().context("Failed to create HTTP client")?;
    let cleaner = DescriptionCleaner::new();
    let aggregator = Aggregator::new(default_sources(&client, &cleaner));
    let classifier = build_classifier(model)?;

    tracing::info!(limit, backend = store.backend(), "Starting refresh");

    let pipeline = EnrichmentPipeline::new(aggregator, classifier, store);
    let report = pipeline.refresh(limit).await.context("Refresh failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if print {
        let postings = pipeline
            .store()
            .find(&JobFilter::default())
            .await
            .context("Failed to list postings")?;
        println!("{}", serde_json::to_string_pretty(&postings)?);
    }

    Ok(())
}

async fn cmd_list(store: &Store, filter: &JobFilter, format: OutputFormat) -> Result<()> {
    let postings = store.find(filter).await.context("Failed to list postings")?;
    tracing::debug!(count = postings.len(), "Listing postings");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&postings)?),
        OutputFormat::Csv => write_csv(std::io::stdout().lock(), &postings)?,
    }
    Ok(())
}

async fn cmd_show(store: &Store, source: &str, source_id: &str) -> Result<()> {
    let posting = store
        .find_one(source, source_id)
        .await
        .context("Failed to look up posting")?
        .with_context(|| format!("Posting not found: source={source} source_id={source_id}"))?;

    println!("{}", serde_json::to_string_pretty(&posting)?);
    Ok(())
}

/// Flat CSV row; tags are `;`-joined.
#[derive(Serialize)]
struct CsvRow<'a> {
    source: &'a str,
    source_id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    remote: bool,
    url: &'a str,
    published_at: Option<String>,
    ai_class: Option<&'static str>,
    tags: String,
}

impl<'a> From<&'a JobPosting> for CsvRow<'a> {
    fn from(p: &'a JobPosting) -> Self {
        CsvRow {
            source: &p.source,
            source_id: &p.source_id,
            title: &p.title,
            company: &p.company,
            location: &p.location,
            remote: p.remote,
            url: &p.url,
            published_at: p.published_at.map(|ts| ts.to_rfc3339()),
            ai_class: p.ai_class.map(|role| role.as_str()),
            tags: p.tags.join(";"),
        }
    }
}

fn write_csv<W: Write>(out: W, postings: &[JobPosting]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for posting in postings {
        writer
            .serialize(CsvRow::from(posting))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
