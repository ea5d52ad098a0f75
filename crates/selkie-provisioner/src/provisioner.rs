// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Browser session lifecycle: start, readiness, addresses and teardown.

use std::fmt;
use std::sync::Arc;

use selkie_k8s::{K8sClient, K8sError};
use url::Url;

use crate::config::{NamingStrategy, ProvisionerConfig};
use crate::error::{ProvisionerError, ResourceKind, StartError};
use crate::identity::{self, ObservedSession};
use crate::pod::PodBuilder;
use crate::readiness::ReadinessPoller;
use crate::service::build_service;
use crate::types::{ContainerInfo, CreatedResources, HostPort, RequestId, SessionId, SessionRequest};

/// Grace period for pod and service deletion.
pub const DELETE_GRACE_PERIOD_SECS: u32 = 60;

/// A running browser session.
#[derive(Debug)]
pub struct SessionHandle {
	/// WebDriver control URL
	pub url: Url,
	/// `host:port` of the session under the origin namespace
	pub origin: String,
	pub container: ContainerInfo,
	pub host_port: HostPort,
	pub session_id: SessionId,
	pub pod_name: String,
	pub service_name: String,
	pub namespace: String,
	pub teardown: Teardown,
}

/// Deletes the resources of one session.
///
/// Bound at start time; the caller decides when to run it.
pub struct Teardown {
	client: Arc<dyn K8sClient>,
	request_id: RequestId,
	namespace: String,
	pod_name: String,
	service_name: String,
}

impl fmt::Debug for Teardown {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Teardown")
			.field("request_id", &self.request_id)
			.field("namespace", &self.namespace)
			.field("pod_name", &self.pod_name)
			.field("service_name", &self.service_name)
			.finish()
	}
}

impl Teardown {
	/// Delete the session, logging any failure.
	pub async fn run(self) {
		let request_id = self.request_id.clone();
		let pod_name = self.pod_name.clone();
		if let Err(e) = self.try_run().await {
			tracing::error!(%request_id, %pod_name, error = %e, "Failed to tear down browser session");
		}
	}

	/// Delete the session, returning the first failure.
	pub async fn try_run(self) -> Result<(), ProvisionerError> {
		delete_session(
			self.client.as_ref(),
			&self.request_id,
			&self.namespace,
			&self.pod_name,
			&self.service_name,
		)
		.await
	}
}

/// Delete the pod, then the service. The service is left alone if the pod
/// deletion fails.
async fn delete_session(
	client: &dyn K8sClient,
	request_id: &RequestId,
	namespace: &str,
	pod_name: &str,
	service_name: &str,
) -> Result<(), ProvisionerError> {
	tracing::info!(%request_id, namespace, pod_name, "Deleting browser pod");
	client
		.delete_pod(pod_name, namespace, DELETE_GRACE_PERIOD_SECS)
		.await
		.map_err(|source| ProvisionerError::Teardown {
			kind: ResourceKind::Pod,
			name: pod_name.to_string(),
			source,
		})?;

	tracing::info!(%request_id, namespace, service_name, "Deleting browser service");
	client
		.delete_service(service_name, namespace, DELETE_GRACE_PERIOD_SECS)
		.await
		.map_err(|source| ProvisionerError::Teardown {
			kind: ResourceKind::Service,
			name: service_name.to_string(),
			source,
		})
}

/// Provisions browser sessions as a pod plus a service.
pub struct Provisioner {
	client: Arc<dyn K8sClient>,
	config: ProvisionerConfig,
	pods: PodBuilder,
	poller: ReadinessPoller,
}

impl Provisioner {
	/// Create a new provisioner with the given K8s client and configuration.
	pub fn new(client: Arc<dyn K8sClient>, config: ProvisionerConfig) -> Self {
		let pods = PodBuilder::new(&config);
		let poller = ReadinessPoller::new(config.poll_interval, config.ready_timeout);
		Self {
			client,
			config,
			pods,
			poller,
		}
	}

	/// Get the default namespace of this provisioner.
	pub fn namespace(&self) -> &str {
		&self.config.namespace
	}

	/// Validate that the default namespace exists in the cluster.
	///
	/// This should be called on startup to fail fast if the namespace
	/// is not properly configured.
	pub async fn validate_namespace(&self) -> Result<(), ProvisionerError> {
		match self.client.get_namespace(&self.config.namespace).await {
			Ok(_) => {
				tracing::info!(namespace = %self.config.namespace, "Validated namespace exists");
				Ok(())
			}
			Err(K8sError::NamespaceNotFound { .. }) => Err(ProvisionerError::NamespaceNotFound {
				name: self.config.namespace.clone(),
			}),
			Err(e) => Err(e.into()),
		}
	}

	fn session_id(&self, req: &SessionRequest) -> SessionId {
		match self.config.naming {
			NamingStrategy::Generated => SessionId::generate(),
			NamingStrategy::RequestId => SessionId::from_request_id(&req.request_id),
		}
	}

	fn target_namespace<'a>(&'a self, req: &'a SessionRequest) -> &'a str {
		if req.namespace.is_empty() {
			&self.config.namespace
		} else {
			&req.namespace
		}
	}

	/// Start a browser session and wait until it is ready.
	///
	/// Nothing is rolled back on failure. The returned [`StartError`] lists
	/// what was created; pass it to [`Provisioner::cleanup`] to remove it.
	#[tracing::instrument(
		skip(self, req),
		fields(request_id = %req.request_id, image = %req.service.image)
	)]
	pub async fn start(&self, req: &SessionRequest) -> Result<SessionHandle, StartError> {
		let namespace = self.target_namespace(req).to_string();
		let mut created = CreatedResources {
			namespace: namespace.clone(),
			..Default::default()
		};

		let id = self.session_id(req);
		let pod = self
			.pods
			.build(req, &id)
			.map_err(|e| StartError::new(e, created.clone()))?;
		let pod_name = pod
			.metadata
			.name
			.clone()
			.unwrap_or_else(|| id.as_k8s_name());

		tracing::info!(session_id = %id, %pod_name, %namespace, "Creating browser pod");
		let created_pod = self
			.client
			.create_pod(&namespace, pod)
			.await
			.map_err(|source| {
				StartError::new(
					ProvisionerError::Creation {
						kind: ResourceKind::Pod,
						source,
					},
					created.clone(),
				)
			})?;
		created.pod_name = Some(pod_name.clone());

		let report = self
			.poller
			.wait_until_ready(self.client.as_ref(), &namespace, &pod_name)
			.await
			.map_err(|e| StartError::new(e, created.clone()))?;
		tracing::info!(
			%pod_name,
			observations = report.observations,
			elapsed_secs = report.elapsed.as_secs(),
			"Browser pod is ready"
		);

		let service_name = pod_name.clone();
		let service = build_service(&id, &service_name, &created_pod);
		tracing::info!(%service_name, %namespace, "Creating browser service");
		self
			.client
			.create_service(&namespace, service)
			.await
			.map_err(|source| {
				StartError::new(
					ProvisionerError::Creation {
						kind: ResourceKind::Service,
						source,
					},
					created.clone(),
				)
			})?;
		created.service_name = Some(service_name.clone());

		let pod = self
			.client
			.get_pod(&pod_name, &namespace)
			.await
			.map_err(|source| {
				StartError::new(
					ProvisionerError::Observation {
						kind: ResourceKind::Pod,
						name: pod_name.clone(),
						source,
					},
					created.clone(),
				)
			})?;
		let service = self
			.client
			.get_service(&service_name, &namespace)
			.await
			.map_err(|source| {
				StartError::new(
					ProvisionerError::Observation {
						kind: ResourceKind::Service,
						name: service_name.clone(),
						source,
					},
					created.clone(),
				)
			})?;

		let pod_uid = pod.metadata.uid.unwrap_or_default();
		let cluster_ip = service
			.spec
			.and_then(|s| s.cluster_ip)
			.unwrap_or_default();

		let identity = identity::resolve(
			&ObservedSession {
				pod_name: &pod_name,
				namespace: &namespace,
				pod_uid: &pod_uid,
				cluster_ip: &cluster_ip,
				base_path: &req.service.path,
			},
			&self.config.network,
		)
		.map_err(|e| StartError::new(e, created.clone()))?;

		tracing::info!(session_id = %id, url = %identity.url, %cluster_ip, "Browser session started");

		Ok(SessionHandle {
			url: identity.url,
			origin: identity.origin,
			container: identity.container,
			host_port: identity.host_port,
			session_id: id,
			teardown: Teardown {
				client: Arc::clone(&self.client),
				request_id: req.request_id.clone(),
				namespace: namespace.clone(),
				pod_name: pod_name.clone(),
				service_name: service_name.clone(),
			},
			pod_name,
			service_name,
			namespace,
		})
	}

	/// Delete a session's pod, then its service, each with a 60s grace period.
	///
	/// The service deletion is not attempted if the pod deletion fails.
	#[tracing::instrument(skip(self, request_id), fields(request_id = %request_id))]
	pub async fn cancel(
		&self,
		request_id: &RequestId,
		namespace: &str,
		pod_name: &str,
		service_name: &str,
	) -> Result<(), ProvisionerError> {
		delete_session(
			self.client.as_ref(),
			request_id,
			namespace,
			pod_name,
			service_name,
		)
		.await
	}

	/// Remove what a failed start left behind.
	///
	/// Objects that are already gone are skipped. The pod goes first; the
	/// service is only deleted once the pod deletion succeeded.
	pub async fn cleanup(&self, created: &CreatedResources) -> Result<(), ProvisionerError> {
		if let Some(pod_name) = &created.pod_name {
			match self
				.client
				.delete_pod(pod_name, &created.namespace, DELETE_GRACE_PERIOD_SECS)
				.await
			{
				Ok(()) => tracing::info!(%pod_name, namespace = %created.namespace, "Cleaned up browser pod"),
				Err(e) if e.is_not_found() => {
					tracing::debug!(%pod_name, "Browser pod already gone")
				}
				Err(source) => {
					return Err(ProvisionerError::Teardown {
						kind: ResourceKind::Pod,
						name: pod_name.clone(),
						source,
					})
				}
			}
		}

		if let Some(service_name) = &created.service_name {
			match self
				.client
				.delete_service(service_name, &created.namespace, DELETE_GRACE_PERIOD_SECS)
				.await
			{
				Ok(()) => tracing::info!(%service_name, namespace = %created.namespace, "Cleaned up browser service"),
				Err(e) if e.is_not_found() => {
					tracing::debug!(%service_name, "Browser service already gone")
				}
				Err(source) => {
					return Err(ProvisionerError::Teardown {
						kind: ResourceKind::Service,
						name: service_name.clone(),
						source,
					})
				}
			}
		}

		Ok(())
	}
}
