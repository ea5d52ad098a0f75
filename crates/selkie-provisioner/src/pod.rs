// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pod specification for a browser session.

use std::collections::BTreeMap;

use selkie_k8s::{
	Container, ContainerPort, EmptyDirVolumeSource, EnvVar, HTTPGetAction, IntOrString,
	ObjectMeta, OwnerReference, Pod, PodSpec, Probe, Quantity, ResourceRequirements, Volume,
	VolumeMount,
};

use crate::config::{BrowserResources, OwnerReferenceConfig, ProvisionerConfig};
use crate::env::compose_env;
use crate::error::ProvisionerError;
use crate::merge::merge_pod;
use crate::types::{SessionId, SessionRequest};

pub const REQUEST_ID_LABEL: &str = "selenoid-request-id";
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "selkie";
pub const CONTAINER_NAME: &str = "browser";
const SHM_VOLUME: &str = "devshm";
const SHM_PATH: &str = "/dev/shm";
const PROBE_INITIAL_DELAY_SECS: i32 = 20;
const PROBE_TIMEOUT_SECS: i32 = 10;
const PROBE_PERIOD_SECS: i32 = 10;
const PROBE_FAILURE_THRESHOLD: i32 = 20;

/// Ports exposed by the browser runtime, by name.
pub const BROWSER_PORTS: [(&str, i32); 5] = [
	("browser", 4444),
	("vnc", 5900),
	("devtools", 7070),
	("fileserver", 8080),
	("clipboard", 9090),
];

pub const CONTROL_PORT: i32 = 4444;

/// Status endpoint under the service base path.
///
/// `"/wd/hub"` and `"/wd/hub/"` both give `"/wd/hub/status"`.
pub fn status_path(base_path: &str) -> String {
	if base_path.ends_with('/') {
		format!("{base_path}status")
	} else {
		format!("{base_path}/status")
	}
}

/// Owner references for browser pods.
///
/// Always returns a list; it is empty unless owner references are enabled.
pub fn owner_references(
	config: &OwnerReferenceConfig,
) -> Result<Vec<OwnerReference>, ProvisionerError> {
	if !config.enabled {
		return Ok(Vec::new());
	}

	let uid = config
		.uid
		.clone()
		.filter(|s| !s.is_empty())
		.ok_or_else(|| ProvisionerError::Configuration {
			message: "set the parent pod UID to set an owner reference".to_string(),
		})?;
	let name = config
		.name
		.clone()
		.filter(|s| !s.is_empty())
		.ok_or_else(|| ProvisionerError::Configuration {
			message: "set the parent pod name to set an owner reference".to_string(),
		})?;

	Ok(vec![OwnerReference {
		api_version: "v1".to_string(),
		kind: "Pod".to_string(),
		name,
		uid,
		..Default::default()
	}])
}

fn resource_map(entries: [(&str, &Option<String>); 2]) -> BTreeMap<String, Quantity> {
	entries
		.into_iter()
		.filter_map(|(key, value)| {
			value
				.as_deref()
				.filter(|v| !v.is_empty())
				.map(|v| (key.to_string(), Quantity(v.to_string())))
		})
		.collect()
}

fn resource_requirements(resources: &BrowserResources) -> ResourceRequirements {
	ResourceRequirements {
		limits: Some(resource_map([
			("memory", &resources.memory_limit),
			("cpu", &resources.cpu_limit),
		])),
		requests: Some(resource_map([
			("memory", &resources.memory_request),
			("cpu", &resources.cpu_request),
		])),
		claims: None,
	}
}

fn status_probe(path: &str) -> Probe {
	Probe {
		initial_delay_seconds: Some(PROBE_INITIAL_DELAY_SECS),
		timeout_seconds: Some(PROBE_TIMEOUT_SECS),
		period_seconds: Some(PROBE_PERIOD_SECS),
		failure_threshold: Some(PROBE_FAILURE_THRESHOLD),
		http_get: Some(HTTPGetAction {
			path: Some(path.to_string()),
			port: IntOrString::String(CONTAINER_NAME.to_string()),
			..Default::default()
		}),
		..Default::default()
	}
}

/// Builds pod specifications for browser sessions.
#[derive(Debug, Clone)]
pub struct PodBuilder {
	resources: BrowserResources,
	shm_volume_enabled: bool,
	owner_reference: OwnerReferenceConfig,
	default_time_zone: String,
}

impl PodBuilder {
	pub fn new(config: &ProvisionerConfig) -> Self {
		Self {
			resources: config.resources.clone(),
			shm_volume_enabled: config.shm_volume_enabled,
			owner_reference: config.owner_reference.clone(),
			default_time_zone: config.default_time_zone.clone(),
		}
	}

	/// Build the pod for `req`, merged with the request's pod template.
	///
	/// The request-id label is reapplied after the merge so that the service
	/// selector always matches the pod.
	pub fn build(&self, req: &SessionRequest, id: &SessionId) -> Result<Pod, ProvisionerError> {
		let owner_refs = owner_references(&self.owner_reference)?;
		let env = compose_env(&req.service, &req.caps, &self.default_time_zone);
		let default = self.default_pod(req, id, env, owner_refs);

		let mut pod = merge_pod(req.service.pod_template.as_ref(), default, CONTAINER_NAME)?;
		pod
			.metadata
			.labels
			.get_or_insert_with(BTreeMap::new)
			.insert(REQUEST_ID_LABEL.to_string(), id.to_string());
		Ok(pod)
	}

	/// The generated pod, before any template is applied.
	pub fn default_pod(
		&self,
		req: &SessionRequest,
		id: &SessionId,
		env: Vec<EnvVar>,
		owner_refs: Vec<OwnerReference>,
	) -> Pod {
		let mut labels = BTreeMap::new();
		labels.insert(REQUEST_ID_LABEL.to_string(), id.to_string());
		labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

		let ports = BROWSER_PORTS
			.iter()
			.map(|(name, port)| ContainerPort {
				name: Some(name.to_string()),
				protocol: Some("TCP".to_string()),
				container_port: *port,
				..Default::default()
			})
			.collect();

		let status = status_path(&req.service.path);

		let (volumes, volume_mounts) = if self.shm_volume_enabled {
			(
				Some(vec![Volume {
					name: SHM_VOLUME.to_string(),
					empty_dir: Some(EmptyDirVolumeSource {
						medium: Some("Memory".to_string()),
						size_limit: None,
					}),
					..Default::default()
				}]),
				Some(vec![VolumeMount {
					name: SHM_VOLUME.to_string(),
					mount_path: SHM_PATH.to_string(),
					..Default::default()
				}]),
			)
		} else {
			(None, None)
		};

		let container = Container {
			name: CONTAINER_NAME.to_string(),
			image: Some(req.service.image.clone()),
			env: Some(env),
			ports: Some(ports),
			resources: Some(resource_requirements(&self.resources)),
			liveness_probe: Some(status_probe(&status)),
			readiness_probe: Some(status_probe(&status)),
			volume_mounts,
			..Default::default()
		};

		Pod {
			metadata: ObjectMeta {
				name: Some(id.as_k8s_name()),
				labels: Some(labels),
				owner_references: Some(owner_refs),
				..Default::default()
			},
			spec: Some(PodSpec {
				containers: vec![container],
				volumes,
				..Default::default()
			}),
			status: None,
		}
	}
}
