// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioner error types.

use selkie_k8s::K8sError;

use crate::types::CreatedResources;

/// The kind of cluster object an operation acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	Pod,
	Service,
}

impl std::fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ResourceKind::Pod => write!(f, "pod"),
			ResourceKind::Service => write!(f, "service"),
		}
	}
}

/// Errors that can occur during browser session provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionerError {
	/// Deployment identity values are missing while owner references were requested
	#[error("Configuration error: {message}")]
	Configuration { message: String },

	/// The caller-supplied pod template could not be merged with the default
	#[error("Invalid pod template: {message}")]
	Template { message: String },

	/// The cluster rejected creating a resource
	#[error("Failed to create {kind}: {source}")]
	Creation {
		kind: ResourceKind,
		#[source]
		source: K8sError,
	},

	/// A resource could not be read back after creation
	#[error("Failed to fetch {kind} {name}: {source}")]
	Observation {
		kind: ResourceKind,
		name: String,
		#[source]
		source: K8sError,
	},

	/// The pod did not report Ready within the configured bound
	#[error("Pod {pod_name} not ready after {waited_secs}s")]
	ReadyTimeout { pod_name: String, waited_secs: u64 },

	/// The session address could not be turned into a URL
	#[error("Invalid session address {address}: {message}")]
	InvalidAddress { address: String, message: String },

	/// Deleting a resource failed
	#[error("Failed to delete {kind} {name}: {source}")]
	Teardown {
		kind: ResourceKind,
		name: String,
		#[source]
		source: K8sError,
	},

	/// Namespace not found
	#[error("Namespace not found: {name}")]
	NamespaceNotFound { name: String },

	/// Kubernetes error
	#[error(transparent)]
	K8sError(#[from] K8sError),
}

/// A failed `start`, together with whatever it had already created.
///
/// No rollback happens automatically; pass `created` to
/// [`Provisioner::cleanup`](crate::Provisioner::cleanup) to remove it.
#[derive(Debug, thiserror::Error)]
#[error("browser session start failed")]
pub struct StartError {
	#[source]
	pub source: ProvisionerError,
	pub created: CreatedResources,
}

impl StartError {
	pub(crate) fn new(source: ProvisionerError, created: CreatedResources) -> Self {
		Self { source, created }
	}

	/// Whether anything is left behind in the cluster.
	pub fn has_leftovers(&self) -> bool {
		!self.created.is_empty()
	}
}
