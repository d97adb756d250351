//! Pulse: engagement analytics service.
//!
//! Single `serve` subcommand: builds the entity store and analytics engine,
//! then serves the JSON API until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_core::{EngineConfig, EntityStore, ScoreWeights, TierThresholds};
use pulse_engine::AnalyticsEngine;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Engagement analytics service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analytics API server
    Serve {
        /// Address to bind
        #[arg(long, env = "PULSE_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Weight of a like in the engagement score
        #[arg(long, env = "PULSE_LIKE_WEIGHT", default_value = "1.0")]
        like_weight: f64,

        /// Weight of a comment in the engagement score
        #[arg(long, env = "PULSE_COMMENT_WEIGHT", default_value = "2.0")]
        comment_weight: f64,

        /// Minimum average engagement for the High tier
        #[arg(long, env = "PULSE_TIER_HIGH", default_value = "10.0")]
        tier_high: f64,

        /// Minimum average engagement for the Medium tier
        #[arg(long, env = "PULSE_TIER_MEDIUM", default_value = "3.0")]
        tier_medium: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "pulse=info,pulse_core=info,pulse_engine=info,pulse_web=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            like_weight,
            comment_weight,
            tier_high,
            tier_medium,
        } => {
            let config = EngineConfig {
                weights: ScoreWeights {
                    like_weight,
                    comment_weight,
                },
                tiers: TierThresholds {
                    high: tier_high,
                    medium: tier_medium,
                },
            };

            serve(bind, config).await
        }
    }
}

async fn serve(bind: SocketAddr, config: EngineConfig) -> Result<()> {
    let store = Arc::new(EntityStore::new(config.weights));
    let engine = Arc::new(AnalyticsEngine::new(store, config));
    let router = pulse_web::create_router(engine);

    let listener = tokio::net::TcpListener::bind(bind).await.into_diagnostic()?;
    info!(
        addr = %bind,
        like_weight = config.weights.like_weight,
        comment_weight = config.weights.comment_weight,
        "pulse listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    info!("pulse stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}
