// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Browser session provisioning types.

use std::collections::BTreeMap;

use selkie_k8s::Pod;
use serde::{Deserialize, Serialize};

const MAX_LABEL_LENGTH: usize = 63;
const POD_NAME_PREFIX: &str = "browser-";

/// Caller-assigned identifier of an automation session request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
	Numeric(u64),
	Text(String),
}

impl std::fmt::Display for RequestId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RequestId::Numeric(id) => write!(f, "{id}"),
			RequestId::Text(id) => f.write_str(id),
		}
	}
}

impl From<u64> for RequestId {
	fn from(id: u64) -> Self {
		RequestId::Numeric(id)
	}
}

impl From<&str> for RequestId {
	fn from(id: &str) -> Self {
		RequestId::Text(id.to_string())
	}
}

/// Token shared by a session's pod label, service selector and resource names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
	/// Create a new, globally unique session ID with UUID7.
	pub fn generate() -> Self {
		Self(uuid7::uuid7().to_string())
	}

	/// Derive the session ID from the request identifier.
	///
	/// Two requests with the same identifier map to the same session ID.
	pub fn from_request_id(request_id: &RequestId) -> Self {
		let value = sanitize_label_value(&request_id.to_string().to_ascii_lowercase());
		if value.is_empty() {
			return Self("unnamed".to_string());
		}
		Self(value)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Get the Kubernetes name used for the pod and service of this session.
	pub fn as_k8s_name(&self) -> String {
		format!("{POD_NAME_PREFIX}{}", self.0)
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Sanitize a string to be a valid Kubernetes label value.
///
/// K8s label values must:
/// - Be 63 characters or less
/// - Begin and end with an alphanumeric character
/// - Contain only alphanumeric characters, dashes, underscores, and dots
///
/// Dots and underscores are replaced as well, and the length leaves room for
/// the pod name prefix, so that the derived pod and service names stay valid
/// DNS labels.
pub(crate) fn sanitize_label_value(value: &str) -> String {
	let max = MAX_LABEL_LENGTH - POD_NAME_PREFIX.len();
	let sanitized: String = value
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || c == '-' {
				c
			} else {
				'-'
			}
		})
		.collect();

	let trimmed = sanitized
		.trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
		.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());

	if trimmed.len() > max {
		trimmed[..max]
			.trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
			.to_string()
	} else {
		trimmed.to_string()
	}
}

/// Browser capabilities requested by the automation client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
	pub screen_resolution: String,
	#[serde(rename = "enableVNC")]
	pub vnc: bool,
	#[serde(rename = "enableVideo")]
	pub video: bool,
	pub skin: String,
	pub video_codec: String,
	pub time_zone: String,
	/// Extra `KEY=VALUE` assignments
	pub env: Vec<String>,
}

/// The browser image and how to talk to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
	pub image: String,
	/// Base path of the WebDriver endpoint (e.g. "/wd/hub")
	#[serde(default)]
	pub path: String,
	/// Extra `KEY=VALUE` assignments
	#[serde(default)]
	pub env: Vec<String>,
	/// Partial pod spec merged over the generated default
	#[serde(default)]
	pub pod_template: Option<Pod>,
}

/// Everything needed to provision one browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
	pub request_id: RequestId,
	#[serde(default)]
	pub caps: Capabilities,
	pub service: ServiceDescriptor,
	/// Target namespace; empty means the provisioner's default
	#[serde(default)]
	pub namespace: String,
}

/// host:port records for every port exposed by the browser runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPort {
	pub control: String,
	pub vnc: String,
	pub devtools: String,
	pub fileserver: String,
	pub clipboard: String,
}

/// What the caller needs to know about the running browser container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
	/// Cluster-assigned pod UID
	pub id: String,
	/// Cluster IP of the session service
	pub ip_address: String,
	pub ports: BTreeMap<String, String>,
}

/// Resources a (possibly failed) start left in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResources {
	pub namespace: String,
	pub pod_name: Option<String>,
	pub service_name: Option<String>,
}

impl CreatedResources {
	pub fn is_empty(&self) -> bool {
		self.pod_name.is_none() && self.service_name.is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_id_accepts_numbers_and_strings() {
		let numeric: RequestId = serde_json::from_str("42").unwrap();
		assert_eq!(numeric, RequestId::Numeric(42));
		let text: RequestId = serde_json::from_str("\"abc\"").unwrap();
		assert_eq!(text, RequestId::Text("abc".to_string()));
		assert_eq!(numeric.to_string(), "42");
	}

	#[test]
	fn session_id_from_request_id_is_deterministic() {
		let a = SessionId::from_request_id(&RequestId::Numeric(7));
		let b = SessionId::from_request_id(&RequestId::Numeric(7));
		assert_eq!(a, b);
		assert_eq!(a.as_k8s_name(), "browser-7");
	}

	#[test]
	fn session_id_from_messy_request_id() {
		let id = SessionId::from_request_id(&RequestId::Text("Team A/Run#12".to_string()));
		assert_eq!(id.as_str(), "team-a-run-12");
	}

	#[test]
	fn session_id_from_unusable_request_id() {
		let id = SessionId::from_request_id(&RequestId::Text("__".to_string()));
		assert_eq!(id.as_str(), "unnamed");
	}

	#[test]
	fn generated_session_ids_differ() {
		assert_ne!(SessionId::generate(), SessionId::generate());
	}

	#[test]
	fn sanitize_truncates_to_fit_pod_name() {
		let long = "a".repeat(100);
		let id = SessionId::from_request_id(&RequestId::Text(long));
		assert!(id.as_k8s_name().len() <= MAX_LABEL_LENGTH);
	}

	#[test]
	fn session_request_from_json() {
		let req: SessionRequest = serde_json::from_str(
			r#"{
				"requestId": 1,
				"caps": {"screenResolution": "1920x1080x24", "enableVNC": true},
				"service": {"image": "selenoid/chrome:latest", "path": "/"},
				"namespace": "browsers"
			}"#,
		)
		.unwrap();
		assert!(req.caps.vnc);
		assert!(!req.caps.video);
		assert_eq!(req.service.path, "/");
		assert!(req.service.pod_template.is_none());
	}
}
