mod args;

use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use tracing::{error, info, Level};
use visual_discovery::network::{CatalogStore, SimilaritySearch};
use visual_discovery::pipeline::services::query::NO_RESULTS_MESSAGE;
use visual_discovery::pipeline::types::{Candidate, ImageSource, Threshold};
use visual_discovery::{AppError, CatalogClient, Configuration, DiscoverySession};

use crate::args::{Cli, Commands, ProductCommands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_candidate(candidate: &Candidate) {
    let badge = match (candidate.match_percent(), candidate.match_tier()) {
        (Some(percent), Some(tier)) => format!("{:>3}% {:<5}", percent, tier.as_str()),
        _ => " ".repeat(10),
    };
    println!(
        "{} {} [{}] {}",
        badge, candidate.name, candidate.category, candidate.image_url
    );
}

async fn discover(
    configuration: &Configuration,
    client: Arc<CatalogClient>,
    image: &str,
    min_score: Option<f64>,
    save: bool,
) -> Result<(), AppError> {
    let session = DiscoverySession::with_backend(configuration, client);
    let flow_id = session.inspect(|flow| flow.id()).await;
    info!("Starting discovery flow {}", flow_id);

    session.select_image(&ImageSource::parse(image)).await?;
    session.analyze().await?;

    let profile = session.inspect(|flow| flow.profile().clone()).await;
    println!("Name:     {}", profile.name);
    println!("Category: {}", profile.category.as_deref().unwrap_or("-"));
    println!("Color:    {}", profile.color.as_deref().unwrap_or("-"));

    session.search().await?;
    if let Some(query) = session.inspect(|flow| flow.last_query().cloned()).await {
        println!("Keywords: {}", query.keywords.join(", "));
    }
    let mut results = session.visible_results().await;
    if let Some(score) = min_score {
        results = session.set_threshold(Threshold::new(score)?).await?;
    }

    println!();
    if results.is_empty() {
        println!("{}", NO_RESULTS_MESSAGE);
    } else {
        println!(
            "{} of {} candidates at threshold {}",
            results.kept(),
            results.total,
            results.threshold
        );
        results.candidates.iter().for_each(print_candidate);
    }

    if save {
        session.save().await?;
        if let Some(message) = session.inspect(|flow| flow.save_message()).await {
            println!();
            println!("{}", message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut configuration = Configuration::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        configuration = configuration.with_api_base_url(api_url);
        configuration.validate()?;
    }
    let client = Arc::new(CatalogClient::from_configuration(&configuration)?);

    match cli.command {
        Commands::Discover {
            image,
            min_score,
            limit,
            save,
        } => {
            if let Some(limit) = limit {
                configuration.search_limit = limit;
                configuration.validate()?;
            }
            discover(&configuration, client, &image, min_score, save).await?;
        }
        Commands::Related { id, limit } => {
            let limit = limit.unwrap_or(configuration.related_limit);
            let related = client.related(&id, limit).await?;
            if related.is_empty() {
                println!("{}", NO_RESULTS_MESSAGE);
            }
            related.iter().for_each(print_candidate);
        }
        Commands::Products { action } => match action {
            ProductCommands::List => {
                for product in client.list().await? {
                    println!("{}  {} [{}]", product.record_id, product.name, product.category);
                }
            }
            ProductCommands::Delete { ids } => {
                let outcomes = join_all(ids.iter().map(|id| client.delete(id))).await;
                let mut failure = None;
                for (id, outcome) in ids.iter().zip(outcomes) {
                    match outcome {
                        Ok(()) => println!("Deleted {}", id),
                        Err(e) => {
                            error!("Could not delete {}: {}", id, e);
                            failure = Some(e);
                        }
                    }
                }
                if let Some(e) = failure {
                    return Err(e);
                }
            }
        },
    }

    Ok(())
}
