//! SPICEsense — event classification server and CLI.

use std::path::PathBuf;
use std::sync::Arc;

use spicesense_classify::{no_embedder, SpicesClassifier};
use spicesense_core::{SpiceSenseConfig, Taxonomy};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("SPICESENSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Build the classifier once: taxonomy file (or built-in SPICES) plus the
/// best available embedder.
fn build_classifier(config: &SpiceSenseConfig) -> anyhow::Result<SpicesClassifier> {
    let taxonomy = Taxonomy::load_or_default(&config.data_paths.taxonomy_file)?;

    // Skip model loading entirely when semantic scoring is switched off.
    let embedder = if config.classifier.use_semantic {
        spicesense_infer::create_embedder(&config.data_paths.models)
    } else {
        no_embedder()
    };

    let classifier = SpicesClassifier::new(taxonomy, embedder, config.classifier.clone())?;
    info!(
        "Classifier ready: {} categories, semantic={}",
        classifier.taxonomy().len(),
        classifier.semantic_enabled()
    );
    Ok(classifier)
}

fn print_help() {
    println!("SPICEsense — SPICES event classifier");
    println!();
    println!("Usage: spicesense [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Start the HTTP server");
    println!("  classify <title> [description]  Classify one event and print scores as JSON");
    println!("  help                            Show this help message");
    println!();
    println!("Environment:");
    println!("  SPICESENSE_DATA_DIR        Data directory (models/, taxonomy.json); default 'data'");
    println!("  SPICESENSE_USE_SEMANTIC    Enable semantic fallback (default true)");
    println!("  SPICESENSE_THRESHOLD       Minimum similarity for semantic matches (default 0.45)");
    println!("  SPICESENSE_FALLBACK_TOP_K  Suggestions when nothing clears the threshold (default 2)");
    println!("  PORT                       HTTP port (default 3004)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `classify` output stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = resolve_data_dir();
    let config = SpiceSenseConfig::from_env(&data_dir)?;

    if args.len() > 1 {
        match args[1].as_str() {
            "classify" => {
                if args.len() < 3 {
                    eprintln!("Usage: spicesense classify <title> [description]");
                    std::process::exit(1);
                }
                let description = args.get(3).map(String::as_str).unwrap_or("");
                let classifier = build_classifier(&config)?;
                let scores = classifier.classify(&args[2], description);
                println!("{}", serde_json::to_string_pretty(&scores)?);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'spicesense help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", config.data_paths.root.display());

    let classifier = build_classifier(&config)?;
    let port = config.port;
    let state = Arc::new(AppState::new(config, classifier));

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("SPICEsense server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
