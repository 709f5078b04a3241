use anyhow::Context;
use dossier::cli::{load_config, output::Output, Cli, Commands};
use dossier::research::WarningTooFewDocs;
use dossier::web::DuckDuckGoProvider;
use dossier::{Query, ResearchConfig, ResearchSession, SearchClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = load_config(&cli.config).context("failed to load configuration")?;
    init_tracing(&config, cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Search { query, max_hits } => search(config, &output, query, max_hits).await,
        Commands::Fetch { urls, goal } => fetch(config, &output, urls, goal).await,
        Commands::Config { validate } => {
            if !validate {
                let rendered =
                    toml::to_string_pretty(&config).context("failed to render configuration")?;
                println!("{}", rendered);
            }
            output.success("Configuration is valid");
            Ok(())
        }
    }
}

fn init_tracing(config: &ResearchConfig, verbose: bool, json: bool) {
    let default_level = if verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dossier={}", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn search(
    mut config: ResearchConfig,
    output: &Output,
    query: String,
    max_hits: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(max_hits) = max_hits {
        config.search.max_hits = max_hits;
        config.validate()?;
    }

    let client = SearchClient::new(Arc::new(DuckDuckGoProvider::new()), &config.search);
    let results = client.search(&Query::new(query.as_str())).await?;

    output.header(&format!("Results for '{}'", query));
    if results.is_empty() {
        output.warning("No results");
    }
    for (i, result) in results.iter().enumerate() {
        output.search_result(i + 1, result);
    }
    Ok(())
}

async fn fetch(
    config: ResearchConfig,
    output: &Output,
    urls: Vec<String>,
    goal: Option<String>,
) -> anyhow::Result<()> {
    let session = ResearchSession::connect(config)
        .await
        .context("failed to start research session")?;

    output.header("Acquiring documents");
    for url in urls {
        let outcome = session.fetch_online_doc(url).await;
        if outcome.is_added() {
            output.success(&outcome.to_string());
        } else {
            output.warning(&outcome.to_string());
        }
    }

    output.header("Knowledge base");
    output.info(&session.n_docs_downloaded().await);
    let readiness = session.readiness().await;
    output.readiness(&readiness);

    if let (false, Some(goal)) = (readiness.is_sufficient(), goal) {
        let warning = WarningTooFewDocs::new(goal, readiness.n_docs());
        output.hint(&warning.to_string());
    }
    Ok(())
}
