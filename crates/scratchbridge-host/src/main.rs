//! scratchbridge harness
//!
//! Drives one bridge over stdio: peer messages arrive as JSON lines on
//! stdin, host commands leave as JSON lines on stdout, logs go to stderr.
//!
//! Usage: `scratchbridge-host [config.yaml] [project-file]`

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use scratchbridge_core::error::{BridgeError, Result};
use scratchbridge_core::ProjectPayload;
use scratchbridge_host::config;
use scratchbridge_host::obs::BridgeMetrics;
use scratchbridge_host::projects::{RestProjectStore, SaveCoordinator, SaveOutcome};
use scratchbridge_host::registry;
use scratchbridge_host::transport::{stdio, QueuedPeer};
use scratchbridge_host::{BridgeHandle, BridgeRuntime, ChannelHost, HostEvent};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(true)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "scratchbridge-host failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "scratchbridge.yaml".to_string());
    let project_file = args.next();

    let cfg = config::load_from_file(&config_path)?;
    let metrics = Arc::new(BridgeMetrics::default());

    let coordinator = match &cfg.store {
        Some(section) => {
            let store = RestProjectStore::from_section(section)?;
            Some(Arc::new(SaveCoordinator::new(
                Arc::new(store),
                section.title.clone(),
                section.project_id.clone(),
            )))
        }
        None => None,
    };

    let (peer, outbound) = QueuedPeer::new(cfg.bridge.queue_capacity);
    let (host, mut events) = ChannelHost::new();
    let (handle, task) = BridgeRuntime::spawn(&cfg.bridge, host, peer, Arc::clone(&metrics));
    let _registration = registry::install(Arc::new(handle.clone()));

    if let Some(payload) = initial_payload(project_file.as_deref(), coordinator.as_deref()).await? {
        handle.load(payload);
    }

    let writer = tokio::spawn(stdio::pump_outbound(outbound, tokio::io::stdout()));
    let mut reader = tokio::spawn(stdio::pump_inbound(
        BufReader::new(tokio::io::stdin()),
        handle.clone(),
    ));

    tracing::info!(bridge = handle.id(), config = %config_path, "scratchbridge-host started");

    let mut input_open = true;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => on_event(event, &handle, coordinator.as_ref()),
                None => break,
            },

            res = &mut reader, if input_open => {
                input_open = false;
                match res {
                    Ok(Ok(lines)) => tracing::info!(lines, "peer input closed"),
                    Ok(Err(e)) => tracing::warn!(error = %e, "peer input failed"),
                    Err(e) => tracing::warn!(error = %e, "inbound pump aborted"),
                }
                handle.unmount();
            }

            _ = tokio::signal::ctrl_c(), if input_open => {
                input_open = false;
                tracing::info!("interrupted");
                reader.abort();
                handle.unmount();
            }
        }
    }

    if let Err(e) = task.await {
        tracing::warn!(error = %e, "bridge task aborted");
    }
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "peer output failed"),
        Err(e) => tracing::warn!(error = %e, "outbound pump aborted"),
    }
    tracing::debug!(metrics = %metrics.render(), "final bridge metrics");
    Ok(())
}

/// A project file on the command line wins over the configured stored project.
async fn initial_payload(
    project_file: Option<&str>,
    coordinator: Option<&SaveCoordinator>,
) -> Result<Option<ProjectPayload>> {
    if let Some(path) = project_file {
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BridgeError::Internal(format!("read project file failed ({path}): {e}")))?;
        return Ok(Some(ProjectPayload::from(data.trim_end())));
    }
    match coordinator {
        Some(coordinator) => coordinator.open().await,
        None => Ok(None),
    }
}

fn on_event(event: HostEvent, handle: &BridgeHandle, coordinator: Option<&Arc<SaveCoordinator>>) {
    match event {
        HostEvent::RuntimeLoaded => tracing::info!("editor runtime loaded"),
        HostEvent::Ready => tracing::info!("editor ready"),
        HostEvent::Changed => tracing::debug!("project changed"),
        HostEvent::Thumbnail(image) => tracing::info!(len = image.len(), "thumbnail received"),
        HostEvent::Saved(payload) => match coordinator {
            Some(coordinator) => {
                let coordinator = Arc::clone(coordinator);
                tokio::spawn(async move {
                    match coordinator.persist(payload).await {
                        Ok(SaveOutcome::Skipped) => tracing::info!("save skipped, previous save still running"),
                        Ok(outcome) => tracing::debug!(?outcome, "save persisted"),
                        Err(e) => tracing::error!(code = e.code().as_str(), error = %e, "save failed"),
                    }
                });
            }
            None => tracing::info!(len = payload.len(), "project saved (no store configured)"),
        },
        HostEvent::Error { fatal, .. } => {
            // Already logged by the router.
            if fatal {
                handle.unmount();
            }
        }
    }
}
