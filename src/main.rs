use std::sync::Arc;

use clap::Parser;

use templix::config::{Config, Opt};
use templix::engine::PassthroughCompiler;
use templix::orchestration::TemplateExecutor;
use templix::service::{build_router, TemplateService};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Read command-line arguments
    let opt = Opt::parse();

    // Load configuration with optional override
    let config = Config::load_with_opt(&opt).expect("Failed to load configuration");

    log::info!(
        "Serving templates from {} (default document: {})",
        config.templates.root.display(),
        config.templates.default_document
    );

    let service = Arc::new(TemplateService {
        executor: Arc::new(TemplateExecutor::new(Arc::new(PassthroughCompiler))),
        settings: Arc::new(config.templates.clone()),
    });

    let app = build_router(service);

    log::info!("Listening on {}", config.listen);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .expect("Failed to bind listen address");

    axum::serve(listener, app).await.expect("Server error");
}
