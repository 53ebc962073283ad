// OS signal interception: SIGINT/SIGTERM become a graceful shutdown request

use super::shutdown::{Control, Lifecycle};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Install the signal handlers and spawn the listener task.
///
/// Handlers are registered before this returns, so a signal raised right
/// after `Logger::start` is already routed to the logger. The listener exits
/// after the first signal or once `stop` is cancelled, which happens when
/// shutdown begins or the last `Logger` handle is dropped.
#[cfg(unix)]
pub(crate) fn install(
    lifecycle: Arc<Lifecycle>,
    control: mpsc::Sender<Control>,
    stop: CancellationToken,
) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            _ = stop.cancelled() => return,
        };
        if lifecycle.claim() {
            let _ = control.try_send(Control::Interrupt(name));
        }
    });
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn install(
    lifecycle: Arc<Lifecycle>,
    control: mpsc::Sender<Control>,
    stop: CancellationToken,
) -> std::io::Result<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_err() {
                    return;
                }
            }
            _ = stop.cancelled() => return,
        }
        if lifecycle.claim() {
            let _ = control.try_send(Control::Interrupt("Ctrl-C"));
        }
    });
    Ok(())
}
