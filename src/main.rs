use std::sync::Arc;

use anyhow::Context;

use line_storyteller::channels::{LineMessagingClient, SignatureVerifier};
use line_storyteller::config::{AppConfig, Environment};
use line_storyteller::gateway::{AppState, app_routes};
use line_storyteller::llm::GeminiClient;
use line_storyteller::news::{NewsApiClient, NewsResponder};
use line_storyteller::pipeline::{EventProcessor, IntentClassifier, ReplyDispatcher};
use line_storyteller::story::StoryResponder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Outside production, pick up a local .env file
    let api_env = std::env::var("API_ENV").unwrap_or_default();
    if !Environment::parse(&api_env).is_production() {
        dotenvy::dotenv().ok();
    }

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!(
            "  Specify LINE_CHANNEL_SECRET and LINE_CHANNEL_ACCESS_TOKEN as environment variables."
        );
        std::process::exit(1);
    });

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_directive())),
        )
        .with_ansi(!config.environment.is_production())
        .with_target(false)
        .init();

    let http = config.http_client()?;

    // ── Collaborators ────────────────────────────────────────────────────
    let news_source = Arc::new(NewsApiClient::new(
        config.news.api_key.clone(),
        &config.news.api_base_url,
        http.clone(),
    ));
    let generator = Arc::new(GeminiClient::new(
        config.gemini.api_key.as_ref(),
        &config.gemini.api_base_url,
        &config.gemini.model,
        config.http_timeout,
    )?);
    let line_client = Arc::new(LineMessagingClient::new(
        config.line.channel_access_token.clone(),
        &config.line.api_base_url,
        http,
    ));

    // ── Responders ───────────────────────────────────────────────────────
    let news = Arc::new(NewsResponder::new(
        news_source,
        config.news.page_size,
        config.news.index_bound,
    ));
    let story = Arc::new(StoryResponder::new(
        generator,
        Arc::clone(&news),
        config.news.query.clone(),
    ));

    let processor = Arc::new(EventProcessor::new(
        IntentClassifier::default_rules(),
        news,
        story,
        ReplyDispatcher::new(line_client),
        config.news.query.clone(),
        config.general_reply_mode,
    ));

    let state = AppState::new(
        SignatureVerifier::new(config.line.channel_secret.clone()),
        processor,
    );
    let app = app_routes(state);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        environment = ?config.environment,
        news = config.news.api_key.is_some(),
        gemini = config.gemini.api_key.is_some(),
        model = %config.gemini.model,
        general_replies = ?config.general_reply_mode,
        index_bound = ?config.news.index_bound,
        state_store = config.firebase_url.is_some(),
        "Application will start"
    );
    if config.news.api_key.is_none() {
        tracing::warn!("NEWS_API_KEY not set; news replies will use the fallback text");
    }
    if config.gemini.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; story replies will use the fallback text");
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
