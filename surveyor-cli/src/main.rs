use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use surveyor_aws::{CloudControl, adapters, validate_account_id, validate_region};
use surveyor_core::adapter::Adapter;
use surveyor_core::error::{DiscoveryError, DiscoveryResult};
use surveyor_core::item::Item;
use surveyor_core::provider::{ControlPlane, ResourceDescription, ResourcePage};
use surveyor_core::scope::Scope;

#[derive(Parser)]
#[command(name = "surveyor")]
#[command(about = "Discover cloud resources as a graph of linked items", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScopeArgs {
    /// Twelve-digit account id the items are scoped to
    #[arg(long)]
    account: String,

    /// Region, e.g. us-east-1
    #[arg(long)]
    region: String,
}

impl ScopeArgs {
    fn validated(&self) -> DiscoveryResult<Scope> {
        validate_account_id(&self.account)?;
        validate_region(&self.region)?;
        Ok(Scope::new(&self.account, &self.region))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one item by its unique attribute value
    Get {
        /// Item type, e.g. ec2-vpc
        item_type: String,
        /// Unique attribute value, e.g. vpc-0a1b2c3d
        query: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// List every item of a type in scope
    List {
        /// Item type, e.g. ec2-instance
        item_type: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Search by an adapter-defined query, usually an ARN
    Search {
        /// Item type, e.g. kms-key
        item_type: String,
        /// Search query, e.g. an ARN
        query: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Show every supported item type and its potential links
    Types,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Get {
            item_type,
            query,
            scope,
        } => run_query(&item_type, &scope, Request::Get(query)).await,
        Commands::List { item_type, scope } => run_query(&item_type, &scope, Request::List).await,
        Commands::Search {
            item_type,
            query,
            scope,
        } => run_query(&item_type, &scope, Request::Search(query)).await,
        Commands::Types => run_types(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "surveyor", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

enum Request {
    Get(String),
    List,
    Search(String),
}

async fn run_query(item_type: &str, scope_args: &ScopeArgs, request: Request) -> DiscoveryResult<()> {
    let scope = scope_args.validated()?;
    let control = Arc::new(CloudControl::connect(&scope.account_id, &scope.region).await);
    let registry = adapters(control, &scope);
    let adapter = find_adapter(&registry, item_type)?;

    let items = match request {
        Request::Get(query) => vec![adapter.get(&scope, &query).await?],
        Request::List => adapter.list(&scope).await?,
        Request::Search(query) => adapter.search(&scope, &query).await?,
    };

    print_items(&items)?;
    eprintln!("{}", format!("{} item(s) in {}", items.len(), scope).dimmed());
    Ok(())
}

fn run_types() -> DiscoveryResult<()> {
    // metadata is static; no client is needed to report it
    let scope = Scope::new("000000000000", "us-east-1");
    for adapter in adapters(Arc::new(Offline), &scope) {
        let metadata = adapter.metadata();
        println!("{}  {}", metadata.item_type.bold(), metadata.descriptive_name);
        if !metadata.potential_links.is_empty() {
            println!("    links: {}", metadata.potential_links.join(", "));
        }
    }
    Ok(())
}

fn find_adapter<'a>(
    registry: &'a [Box<dyn Adapter>],
    item_type: &str,
) -> DiscoveryResult<&'a dyn Adapter> {
    registry
        .iter()
        .find(|adapter| adapter.item_type() == item_type)
        .map(|adapter| adapter.as_ref())
        .ok_or_else(|| {
            DiscoveryError::invalid_query(format!(
                "unknown item type {item_type:?}; run `surveyor types` for the supported set"
            ))
        })
}

fn print_items(items: &[Item]) -> DiscoveryResult<()> {
    for item in items {
        let rendered = serde_json::to_string_pretty(item)
            .map_err(|e| DiscoveryError::mapping(&item.item_type, e.to_string()))?;
        println!("{rendered}");
    }
    Ok(())
}

/// Control plane that refuses every call; used where only metadata is read
struct Offline;

#[async_trait]
impl ControlPlane for Offline {
    async fn get(
        &self,
        type_name: &str,
        _identifier: &str,
    ) -> DiscoveryResult<Option<ResourceDescription>> {
        Err(DiscoveryError::invalid_query(format!(
            "no control plane configured for {type_name}"
        )))
    }

    async fn list_page(
        &self,
        type_name: &str,
        _next_token: Option<&str>,
    ) -> DiscoveryResult<ResourcePage> {
        Err(DiscoveryError::invalid_query(format!(
            "no control plane configured for {type_name}"
        )))
    }
}
