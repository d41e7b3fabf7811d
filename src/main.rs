use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recycool::{
    AppState, Args, Classifier, DEFAULT_LABELS, OnnxBackend, OnnxModel, PreprocessConfig,
    Processor, ResultStore, load_labels, router,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let labels = match &args.labels {
        Some(path) => load_labels(path)?,
        None => DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
    };
    tracing::info!(model = %args.model, classes = labels.len(), "loading classifier");

    let session = OnnxModel::new(args.cuda).load_model(&args.model)?;
    let classifier = Classifier::new(Box::new(OnnxBackend::new(session)), labels)?;

    let state = AppState::new(
        Processor::new(PreprocessConfig::default()),
        classifier,
        ResultStore::new(),
    );
    let app = router(state);

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
