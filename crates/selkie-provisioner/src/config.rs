// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Browser provisioner configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How pod names and request-id labels are derived for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingStrategy {
	/// A fresh UUIDv7 per session.
	#[default]
	Generated,
	/// Derived from the caller's request identifier. The caller must keep
	/// request identifiers unique across concurrent sessions.
	RequestId,
}

/// Memory and CPU quantities for the browser container.
///
/// Each value is a Kubernetes quantity string. `None` or an empty string
/// omits the entry from the resource map entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserResources {
	pub memory_limit: Option<String>,
	pub memory_request: Option<String>,
	pub cpu_limit: Option<String>,
	pub cpu_request: Option<String>,
}

impl Default for BrowserResources {
	fn default() -> Self {
		Self {
			memory_limit: Some("1500Mi".to_string()),
			memory_request: Some("1500Mi".to_string()),
			cpu_limit: None,
			cpu_request: Some("300m".to_string()),
		}
	}
}

/// Identity of the parent pod that browser pods should be owned by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerReferenceConfig {
	pub enabled: bool,
	pub uid: Option<String>,
	pub name: Option<String>,
}

/// DNS naming used when publishing session addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
	/// Suffix appended after the namespace (e.g. "svc.cluster.local")
	pub cluster_domain: String,
	/// Namespace used for the session origin address
	pub origin_namespace: String,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			cluster_domain: "svc.cluster.local".to_string(),
			origin_namespace: "selenoid".to_string(),
		}
	}
}

/// Configuration for the browser provisioner.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
	/// Namespace used when a request does not name one
	pub namespace: String,
	pub resources: BrowserResources,
	/// Mount a memory-backed emptyDir at /dev/shm
	pub shm_volume_enabled: bool,
	pub owner_reference: OwnerReferenceConfig,
	pub naming: NamingStrategy,
	/// Delay between readiness observations
	pub poll_interval: Duration,
	/// Upper bound on the readiness wait; `None` waits indefinitely
	pub ready_timeout: Option<Duration>,
	pub network: NetworkConfig,
	/// Zone used for TZ when the capabilities carry none (or an invalid one)
	pub default_time_zone: String,
}

impl Default for ProvisionerConfig {
	fn default() -> Self {
		Self {
			namespace: "default".to_string(),
			resources: BrowserResources::default(),
			shm_volume_enabled: true,
			owner_reference: OwnerReferenceConfig::default(),
			naming: NamingStrategy::default(),
			poll_interval: Duration::from_secs(10),
			ready_timeout: None,
			network: NetworkConfig::default(),
			default_time_zone: "UTC".to_string(),
		}
	}
}
