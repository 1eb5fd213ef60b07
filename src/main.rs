use tracing::{info, warn, Instrument};
use waker::clients::Controller;
use waker::lifecycle::{setup_tracing, WakerConfig, WakerService};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = WakerConfig::load().map_err(|e| e.to_string())?;
    let timeout = config.reply_timeout();
    info!(?config, "Starting waker");

    let mut service = WakerService::simulated(config);
    let controller = service.bind();

    // A toggle comes up disabled until it knows the current state.
    let span = tracing::info_span!("toggle_connected");
    let checked = async {
        info!("Querying current state");
        controller
            .keep_awake_state(timeout)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    info!(checked, "Toggle enabled");

    let span = tracing::info_span!("toggle_clicked", keep_awake = true);
    let held = async {
        controller.set_keep_awake(true);
        controller.keep_awake_state(timeout).await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;
    info!(held, "Keeping awake");

    // The callback form: the reply arrives on the actor's task.
    let (tx, rx) = tokio::sync::oneshot::channel();
    controller.is_keeping_awake(Box::new(move |held| {
        let _ = tx.send(held);
    }));
    match rx.await {
        Ok(held) => info!(held, "Callback reply"),
        Err(_) => warn!("Owner went away before replying"),
    }

    let span = tracing::info_span!("toggle_clicked", keep_awake = false);
    async { controller.set_keep_awake(false) }.instrument(span).await;

    // Toggle goes to the background: unbind, then let the hint decide.
    drop(controller);
    while service.next_stop_hint().await.is_some() {
        if service.should_stop() {
            let report = service.shutdown().await.map_err(|e| e.to_string())?;
            info!(?report, "Application completed successfully");
            return Ok(());
        }
    }

    warn!("Actor exited without a stop hint");
    Ok(())
}
