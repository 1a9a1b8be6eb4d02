// nm-reconcile - Reconciliation Driver
// SPDX-License-Identifier: MIT

//! Reconciliation of desired connections against the service's inventory.
//!
//! The driver takes one snapshot of the existing connection identifiers,
//! then walks the desired list in configuration order. Entries whose name
//! is already stored are skipped, which makes a re-run against unchanged
//! state a no-op. Missing entries are built into a profile and activated
//! one at a time; entry N+1 is never submitted before entry N's outcome
//! is known. Per-entry failures are logged and never abort the run.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};
use zbus::zvariant::OwnedObjectPath;

use crate::models::{ConnectionProfile, DesiredConnection, Error, Result};
use crate::service::{ActivationHandle, NetworkService};

/// Deadline for one create-and-activate request. A request that exceeds it
/// is failed and the run moves on; the service may still complete the
/// activation in the background.
pub const DEFAULT_ACTIVATION_TIMEOUT: Duration = Duration::from_secs(90);

/// Per-entry outcome counts for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries created and activated.
    pub activated: usize,
    /// Entries whose activation was submitted but failed or timed out,
    /// plus entries rejected before submission (empty name, resolve error).
    pub failed: usize,
    /// Entries skipped because a stored connection already carries the name.
    pub skipped_existing: usize,
    /// Entries skipped because no device matches the interface name.
    pub skipped_no_device: usize,
}

/// Orchestrates one run against a network service.
pub struct Reconciler<'a, S: NetworkService> {
    service: &'a S,
    activation_timeout: Duration,
}

impl<'a, S: NetworkService> Reconciler<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self::with_timeout(service, DEFAULT_ACTIVATION_TIMEOUT)
    }

    pub fn with_timeout(service: &'a S, activation_timeout: Duration) -> Self {
        Self {
            service,
            activation_timeout,
        }
    }

    /// Reconcile the desired list against the service's stored connections.
    ///
    /// Fatal only when the inventory itself cannot be read; everything
    /// after that point is per-entry and reflected in the summary.
    pub async fn run(&self, desired: &[DesiredConnection]) -> Result<RunSummary> {
        self.log_device_inventory().await?;

        let existing: HashSet<String> = self
            .service
            .list_connection_ids()
            .await?
            .into_iter()
            .collect();
        info!("Found {} existing connection(s)", existing.len());

        let mut summary = RunSummary::default();
        for entry in dedup_desired(desired) {
            if entry.name.is_empty() {
                error!(
                    "Desired connection for iface {:?} has an empty name; skipping",
                    entry.iface
                );
                summary.failed += 1;
                continue;
            }

            if existing.contains(&entry.name) {
                info!("Connection {:?} already exists; skipping", entry.name);
                summary.skipped_existing += 1;
                continue;
            }

            let device = match self.service.resolve_device(&entry.iface).await {
                Ok(Some(device)) => device,
                Ok(None) => {
                    error!("Could not get device by iface: {}", entry.iface);
                    summary.skipped_no_device += 1;
                    continue;
                }
                Err(e) => {
                    error!("Failed to resolve device {:?}: {}", entry.iface, e);
                    summary.failed += 1;
                    continue;
                }
            };

            match self.activate(entry, &device).await {
                Ok(handle) => {
                    info!(
                        "Activated {:?}: {} ({})",
                        entry.name,
                        handle.path.as_str(),
                        handle.state.as_str()
                    );
                    summary.activated += 1;
                }
                Err(e) => {
                    error!("Failed activating {:?}: {}", entry.name, e);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Submit one create-and-activate request and wait for its outcome.
    ///
    /// The await is bounded by the activation deadline; on expiry the
    /// pending request is dropped and reported as a per-entry failure.
    async fn activate(
        &self,
        entry: &DesiredConnection,
        device: &OwnedObjectPath,
    ) -> Result<ActivationHandle> {
        let profile = ConnectionProfile::build(entry);
        match timeout(
            self.activation_timeout,
            self.service.add_and_activate(&profile, device),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::ActivationTimeout {
                name: entry.name.clone(),
                seconds: self.activation_timeout.as_secs(),
            }),
        }
    }

    /// Diagnostic listing of all devices; reconciliation never depends on it.
    async fn log_device_inventory(&self) -> Result<()> {
        let devices = self.service.list_devices().await?;
        info!("=== Network devices:");
        for device in &devices {
            info!("  - name:  {}", device.iface);
            info!("    type:  {}", device.type_description);
            info!("    state: {}", device.state.as_str());
            if let Some(id) = &device.active_connection_id {
                info!("    conn:  {}", id);
            }
        }
        Ok(())
    }
}

/// Drop duplicate names within one desired list, keeping the first
/// occurrence. The existing-set snapshot is taken once per run, so without
/// this a duplicate would be created twice.
fn dedup_desired(desired: &[DesiredConnection]) -> Vec<&DesiredConnection> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(desired.len());
    for entry in desired {
        if seen.insert(entry.name.as_str()) {
            unique.push(entry);
        } else {
            warn!(
                "Duplicate desired connection {:?}; keeping the first occurrence",
                entry.name
            );
        }
    }
    unique
}
