//! Helpers shared across CLI commands.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

/// Cancels `token` on Ctrl-C (SIGINT) or SIGTERM.
pub fn cancel_on_ctrlc(token: CancellationToken, message: &'static str) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        if !token.is_cancelled() {
            info!("{}", message);
            println!();
            println!("{}", message);
        }
        token.cancel();
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))
}
