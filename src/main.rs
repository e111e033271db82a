//! # Publishing Profile Controller
//!
//! A Kubernetes controller that performs the one-time fetch of an Azure App
//! Service publishing profile and publishes it as a connection secret.
//!
//! ## Overview
//!
//! 1. **Watching PublishingProfile objects** - cluster-scoped custom resources
//!    naming an existing App Service
//! 2. **Connecting per reconciliation** - ProviderConfig usage tracking,
//!    credential extraction, and ARM client construction on every cycle
//! 3. **Fetch-once semantics** - the publishing profile is fetched at most
//!    once per object and written to the configured connection secret
//! 4. **Virtual deletion** - deleting the object only retires it locally;
//!    the fetched document cannot be revoked provider-side
//!
//! ## Usage
//!
//! See the [README.md](../README.md) for deployment instructions.

use anyhow::Result;
use futures::StreamExt;
use kube_runtime::{watcher, Controller};
use tracing::{info, warn};

use publishing_profile_controller::controller::reconciler;
use publishing_profile_controller::runtime::{error_policy, initialization};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialization::initialize().await?;

    // Mark as ready once the client and reconciler are up
    init.server_state
        .is_ready
        .store(true, std::sync::atomic::Ordering::Relaxed);

    Controller::new(init.profiles, watcher::Config::default())
        .shutdown_on_signal()
        .run(
            reconciler::reconcile,
            error_policy::handle_reconciliation_error,
            init.reconciler,
        )
        .for_each(|reconciliation| {
            if let Err(error) = reconciliation {
                warn!("Reconciliation attempt failed: {error:?}");
            }
            std::future::ready(())
        })
        .await;

    info!("Controller stopped");

    Ok(())
}
