use clap::{Parser, Subcommand};
use codex_lumina::enrich::{self, HttpSource};
use codex_lumina::query::{self, Query};
use codex_lumina::store::ContentStore;
use codex_lumina::types::Family;
use codex_lumina::{config, generate, output};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "lumina")]
#[command(about = "Static site generator for Codex Lumina")]
#[command(long_about = "\
Static site generator for Codex Lumina

Scrolls, journal entries, reels, and rituals live as JSON files in the
content directory and are rendered to a static site.

Content structure:

  content/
  ├── config.toml      # Site config (optional, layered over defaults)
  ├── about.md         # About page (optional)
  ├── assets/          # Copied to <output>/assets/
  ├── scrolls.json     # Scroll Grove
  ├── journal.json     # Lumina Journal
  ├── reels.json       # Codex Reels
  └── ember.json       # Ember rituals, sequences, resources

Logging: LUMINA_LOG sets the filter (e.g. lumina=debug), LUMINA_LOG_FORMAT=json
switches to JSON lines.

Run 'lumina gen-config' to generate a documented config.toml.")]
#[command(version = env!("LUMINA_VERSION"))]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the content directory and print its inventory
    Check,
    /// Render the full site into the output directory
    Build,
    /// List one family's items through the query engine
    Query(QueryArgs),
    /// Append today's Earthbeat entry to journal.json
    Earthbeat {
        /// Target date (YYYY-MM-DD, default today in UTC)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// scrolls, journal, reels, or rituals (ember)
    family: Family,

    /// Category selector ("all" for every category)
    #[arg(long, default_value = "all")]
    cat: String,

    /// Tag selector ("all" for every tag)
    #[arg(long, default_value = "all")]
    tag: String,

    /// Case-insensitive text search over title, summary, and tags
    #[arg(long, default_value = "")]
    search: String,

    /// Only featured items
    #[arg(long)]
    featured: bool,

    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            config::load_config(&cli.source)?;
            let store = ContentStore::load(&cli.source)?;
            output::print_check_output(&store, &content_extras(&cli.source));
            println!("==> Content is valid");
        }
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            let store = ContentStore::load(&cli.source)?;
            info!(items = store.len(), source = %cli.source.display(), "content loaded");

            println!("==> Generating HTML → {}", cli.output.display());
            let report = generate::generate(&store, &config, &cli.source, &cli.output)?;
            output::print_generate_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Query(args) => {
            let store = ContentStore::load(&cli.source)?;
            let query = Query::all()
                .with_category(args.cat.as_str())
                .with_tag(args.tag.as_str())
                .with_search(args.search)
                .featured(args.featured);
            let items = query::listing(store.get_all(args.family), &query);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                output::print_query_output(args.family, &items);
            }
        }
        Command::Earthbeat { date } => {
            let config = config::load_config(&cli.source)?;
            let today = chrono::Utc::now().date_naive();
            let date = enrich::parse_target_date(date.as_deref(), today)?;
            let source = HttpSource {
                url: config.earthbeat.source_url.clone(),
            };
            let outcome = enrich::run(&cli.source, &config.earthbeat, date, &source)?;
            output::print_earthbeat_output(&outcome);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LUMINA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "codex_lumina=debug,lumina=debug,info"
        } else {
            "codex_lumina=info,lumina=info,warn"
        })
    });

    let format = env::var("LUMINA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Optional non-data entries present in the content root.
fn content_extras(source: &Path) -> Vec<&'static str> {
    ["config.toml", "about.md", "assets/"]
        .into_iter()
        .filter(|name| source.join(name.trim_end_matches('/')).exists())
        .collect()
}
