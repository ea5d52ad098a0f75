// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Waiting for a browser pod to report Ready.

use std::time::Duration;

use selkie_k8s::{K8sClient, Pod};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ProvisionerError;

/// How a successful wait went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessReport {
	/// Number of times the pod was fetched, including the final Ready one
	pub observations: u32,
	/// Number of interval sleeps between observations
	pub sleeps: u32,
	pub elapsed: Duration,
}

/// Whether the pod carries a `Ready` condition with status `True`.
pub fn is_pod_ready(pod: &Pod) -> bool {
	pod
		.status
		.as_ref()
		.and_then(|s| s.conditions.as_ref())
		.map(|conditions| {
			conditions
				.iter()
				.any(|c| c.type_ == "Ready" && c.status == "True")
		})
		.unwrap_or(false)
}

/// Polls a pod until it is Ready.
///
/// Fetch errors are logged and treated as "not ready yet"; the cluster API may
/// briefly lag behind a freshly created pod. With a timeout, the last sleep is
/// shortened so that the final observation happens at the deadline.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPoller {
	interval: Duration,
	timeout: Option<Duration>,
}

impl ReadinessPoller {
	pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
		Self { interval, timeout }
	}

	pub async fn wait_until_ready(
		&self,
		client: &dyn K8sClient,
		namespace: &str,
		pod_name: &str,
	) -> Result<ReadinessReport, ProvisionerError> {
		let start = Instant::now();
		let mut observations = 0u32;
		let mut sleeps = 0u32;

		loop {
			observations += 1;
			match client.get_pod(pod_name, namespace).await {
				Ok(pod) if is_pod_ready(&pod) => {
					let elapsed = start.elapsed();
					debug!(pod_name, observations, ?elapsed, "Pod is ready");
					return Ok(ReadinessReport {
						observations,
						sleeps,
						elapsed,
					});
				}
				Ok(_) => {
					debug!(pod_name, observations, "Pod not ready yet");
				}
				Err(e) => {
					warn!(pod_name, namespace, error = %e, "Failed to fetch pod while waiting for readiness");
				}
			}

			let mut pause = self.interval;
			if let Some(timeout) = self.timeout {
				let elapsed = start.elapsed();
				if elapsed >= timeout {
					return Err(ProvisionerError::ReadyTimeout {
						pod_name: pod_name.to_string(),
						waited_secs: elapsed.as_secs(),
					});
				}
				pause = pause.min(timeout - elapsed);
			}

			tokio::time::sleep(pause).await;
			sleeps += 1;
		}
	}
}
