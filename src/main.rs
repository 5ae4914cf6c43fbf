//! Presence node: runs one presence engine for a subject as a headless
//! observer and logs what it sees.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use presence_core::config::AppConfig;
use presence_core::error::AppError;
use presence_core::traits::{EventBus, HostSignals, ManualHost, NoDrafts, SystemClock};
use presence_core::types::{ActorId, SubjectId};
use presence_realtime::notification::ChannelSink;
use presence_realtime::{EngineDeps, EngineIdentity, MemoryPubSub, PresenceEngine};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "presence-node", version, about = "Subject presence node")]
struct Args {
    /// Configuration file (TOML). Missing or invalid files fall back to defaults.
    #[arg(short, long)]
    config: Option<String>,

    /// Subject to track.
    #[arg(short, long)]
    subject: SubjectId,

    /// Actor this node speaks for; random when omitted.
    #[arg(short, long)]
    actor: Option<ActorId>,

    /// Announce this node as a constrained device.
    #[arg(long)]
    constrained: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = AppConfig::load_or_default(args.config.as_deref());
    if args.constrained {
        config.presence.constrained_device = true;
    }

    init_logging(&config);

    if let Err(e) = run(args, config).await {
        tracing::error!("Presence node error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Select the event bus backend
fn build_bus(config: &AppConfig) -> Result<Arc<dyn EventBus>, AppError> {
    match config.bus.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryPubSub::new(config.bus.channel_buffer_size))),
        #[cfg(feature = "redis-pubsub")]
        "redis" => Ok(Arc::new(presence_realtime::bridge::RedisPubSub::new(
            &config.bus.redis_url,
            config.bus.channel_buffer_size,
        )?)),
        other => {
            tracing::warn!(backend = other, "Unsupported bus backend; using in-memory bus");
            Ok(Arc::new(MemoryPubSub::new(config.bus.channel_buffer_size)))
        }
    }
}

/// Main run function
async fn run(args: Args, config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting presence node v{}", env!("CARGO_PKG_VERSION"));

    let identity = EngineIdentity::new(args.actor.unwrap_or_default(), args.subject);
    let (sink, mut intents) = ChannelSink::new(config.bus.channel_buffer_size);

    let deps = EngineDeps {
        bus: build_bus(&config)?,
        clock: Arc::new(SystemClock),
        host: Arc::new(ManualHost::new(HostSignals::ACTIVE)),
        drafts: Arc::new(NoDrafts),
        sink: Arc::new(sink),
    };

    let engine = PresenceEngine::start(&config, identity, deps).await?;
    let mut display = engine.subscribe_display();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(intent) = intents.recv() => {
                tracing::info!(
                    kind = intent.kind.as_str(),
                    actor_id = %intent.actor_id,
                    "Presence notification"
                );
            }
            Ok(()) = display.changed() => {
                let list = display.borrow_and_update().clone();
                let shown: Vec<String> = list
                    .capped()
                    .iter()
                    .map(|entry| format!("{} ({})", entry.actor_id, entry.label))
                    .collect();
                tracing::info!(present = list.entries.len(), overflow = list.overflow, "Present: {}", shown.join(", "));
            }
        }
    }

    engine.shutdown().await;
    // let the detached departure reach the bus before the runtime stops
    tokio::task::yield_now().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
