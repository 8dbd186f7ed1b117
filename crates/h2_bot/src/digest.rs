use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::commands::Dispatcher;

/// Fire the digest on a fixed interval until the process exits. A failed
/// cycle is logged and the schedule keeps running.
pub async fn digest_loop(dispatcher: Arc<Dispatcher>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "digest schedule started");
    loop {
        tokio::time::sleep(interval).await;
        info!("starting digest cycle");
        if let Err(e) = dispatcher.run_digest().await {
            error!("digest cycle failed: {}", e);
        }
    }
}
