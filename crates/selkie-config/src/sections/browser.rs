// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Browser session configuration section.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_MEMORY: &str = "1500Mi";
const DEFAULT_CPU_REQUEST: &str = "300m";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_CLUSTER_DOMAIN: &str = "svc.cluster.local";
const DEFAULT_ORIGIN_NAMESPACE: &str = "selenoid";
const DEFAULT_TIME_ZONE: &str = "UTC";

/// How session names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingMode {
	#[default]
	Generated,
	RequestId,
}

impl std::str::FromStr for NamingMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"generated" => Ok(NamingMode::Generated),
			"request-id" | "request_id" => Ok(NamingMode::RequestId),
			other => Err(format!(
				"unknown naming mode '{other}', expected 'generated' or 'request-id'"
			)),
		}
	}
}

/// Browser configuration layer (for merging).
///
/// Quantity fields keep explicitly empty strings: an empty quantity removes
/// the corresponding resource entry from the browser pod.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrowserConfigLayer {
	pub namespace: Option<String>,
	pub memory_limit: Option<String>,
	pub memory_request: Option<String>,
	pub cpu_limit: Option<String>,
	pub cpu_request: Option<String>,
	pub shm_enabled: Option<bool>,
	pub naming: Option<NamingMode>,
	pub poll_interval_secs: Option<u64>,
	/// 0 waits indefinitely
	pub ready_timeout_secs: Option<u64>,
	pub cluster_domain: Option<String>,
	pub origin_namespace: Option<String>,
	pub default_time_zone: Option<String>,
	pub set_owner_ref: Option<bool>,
	pub pod_uid: Option<String>,
	pub pod_name: Option<String>,
}

impl BrowserConfigLayer {
	/// Merges another layer on top of this one.
	/// Values from `other` take precedence when present.
	pub fn merge(&mut self, other: BrowserConfigLayer) {
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
		if other.memory_limit.is_some() {
			self.memory_limit = other.memory_limit;
		}
		if other.memory_request.is_some() {
			self.memory_request = other.memory_request;
		}
		if other.cpu_limit.is_some() {
			self.cpu_limit = other.cpu_limit;
		}
		if other.cpu_request.is_some() {
			self.cpu_request = other.cpu_request;
		}
		if other.shm_enabled.is_some() {
			self.shm_enabled = other.shm_enabled;
		}
		if other.naming.is_some() {
			self.naming = other.naming;
		}
		if other.poll_interval_secs.is_some() {
			self.poll_interval_secs = other.poll_interval_secs;
		}
		if other.ready_timeout_secs.is_some() {
			self.ready_timeout_secs = other.ready_timeout_secs;
		}
		if other.cluster_domain.is_some() {
			self.cluster_domain = other.cluster_domain;
		}
		if other.origin_namespace.is_some() {
			self.origin_namespace = other.origin_namespace;
		}
		if other.default_time_zone.is_some() {
			self.default_time_zone = other.default_time_zone;
		}
		if other.set_owner_ref.is_some() {
			self.set_owner_ref = other.set_owner_ref;
		}
		if other.pod_uid.is_some() {
			self.pod_uid = other.pod_uid;
		}
		if other.pod_name.is_some() {
			self.pod_name = other.pod_name;
		}
	}

	/// Resolves this layer into a runtime configuration.
	pub fn resolve(self) -> Result<BrowserConfig, ConfigError> {
		let poll_interval_secs = self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
		if poll_interval_secs == 0 {
			return Err(ConfigError::InvalidValue {
				key: "browser.poll_interval_secs".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		let default_time_zone = self
			.default_time_zone
			.unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
		if default_time_zone.parse::<Tz>().is_err() {
			return Err(ConfigError::InvalidValue {
				key: "browser.default_time_zone".to_string(),
				message: format!("unknown time zone '{default_time_zone}'"),
			});
		}

		let set_owner_ref = self.set_owner_ref.unwrap_or(false);
		let pod_uid = self.pod_uid.filter(|s| !s.is_empty());
		let pod_name = self.pod_name.filter(|s| !s.is_empty());
		if set_owner_ref && (pod_uid.is_none() || pod_name.is_none()) {
			return Err(ConfigError::Validation(
				"owner references are enabled but the parent pod UID or name is missing \
				 (set SELKIE_POD_UID and SELKIE_POD_NAME)"
					.to_string(),
			));
		}

		let namespace = self
			.namespace
			.filter(|s| !s.is_empty())
			.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

		Ok(BrowserConfig {
			namespace,
			memory_limit: self.memory_limit.unwrap_or_else(|| DEFAULT_MEMORY.to_string()),
			memory_request: self
				.memory_request
				.unwrap_or_else(|| DEFAULT_MEMORY.to_string()),
			cpu_limit: self.cpu_limit.unwrap_or_default(),
			cpu_request: self
				.cpu_request
				.unwrap_or_else(|| DEFAULT_CPU_REQUEST.to_string()),
			shm_enabled: self.shm_enabled.unwrap_or(true),
			naming: self.naming.unwrap_or_default(),
			poll_interval_secs,
			ready_timeout_secs: self.ready_timeout_secs.filter(|secs| *secs > 0),
			cluster_domain: self
				.cluster_domain
				.unwrap_or_else(|| DEFAULT_CLUSTER_DOMAIN.to_string()),
			origin_namespace: self
				.origin_namespace
				.unwrap_or_else(|| DEFAULT_ORIGIN_NAMESPACE.to_string()),
			default_time_zone,
			set_owner_ref,
			pod_uid,
			pod_name,
		})
	}
}

/// Browser configuration (runtime, resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserConfig {
	/// Namespace for sessions whose request does not name one
	pub namespace: String,
	/// Empty means no memory limit
	pub memory_limit: String,
	pub memory_request: String,
	pub cpu_limit: String,
	pub cpu_request: String,
	pub shm_enabled: bool,
	pub naming: NamingMode,
	pub poll_interval_secs: u64,
	/// `None` waits for readiness indefinitely
	pub ready_timeout_secs: Option<u64>,
	pub cluster_domain: String,
	pub origin_namespace: String,
	pub default_time_zone: String,
	pub set_owner_ref: bool,
	pub pod_uid: Option<String>,
	pub pod_name: Option<String>,
}

impl Default for BrowserConfig {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_string(),
			memory_limit: DEFAULT_MEMORY.to_string(),
			memory_request: DEFAULT_MEMORY.to_string(),
			cpu_limit: String::new(),
			cpu_request: DEFAULT_CPU_REQUEST.to_string(),
			shm_enabled: true,
			naming: NamingMode::Generated,
			poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
			ready_timeout_secs: None,
			cluster_domain: DEFAULT_CLUSTER_DOMAIN.to_string(),
			origin_namespace: DEFAULT_ORIGIN_NAMESPACE.to_string(),
			default_time_zone: DEFAULT_TIME_ZONE.to_string(),
			set_owner_ref: false,
			pod_uid: None,
			pod_name: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_layer_resolves_to_defaults() {
		let config = BrowserConfigLayer::default().resolve().unwrap();
		assert_eq!(config, BrowserConfig::default());
	}

	#[test]
	fn merge_preserves_base_when_overlay_is_none() {
		let mut base = BrowserConfigLayer {
			namespace: Some("browsers".to_string()),
			poll_interval_secs: Some(5),
			..Default::default()
		};
		base.merge(BrowserConfigLayer::default());
		assert_eq!(base.namespace.as_deref(), Some("browsers"));
		assert_eq!(base.poll_interval_secs, Some(5));
	}

	#[test]
	fn merge_overlay_wins() {
		let mut base = BrowserConfigLayer {
			namespace: Some("browsers".to_string()),
			cpu_limit: Some("1".to_string()),
			..Default::default()
		};
		base.merge(BrowserConfigLayer {
			cpu_limit: Some(String::new()),
			naming: Some(NamingMode::RequestId),
			..Default::default()
		});
		assert_eq!(base.namespace.as_deref(), Some("browsers"));
		assert_eq!(base.cpu_limit.as_deref(), Some(""));
		assert_eq!(base.naming, Some(NamingMode::RequestId));
	}

	#[test]
	fn explicit_empty_quantity_survives_resolution() {
		let config = BrowserConfigLayer {
			memory_limit: Some(String::new()),
			..Default::default()
		}
		.resolve()
		.unwrap();
		assert_eq!(config.memory_limit, "");
		assert_eq!(config.memory_request, "1500Mi");
	}

	#[test]
	fn zero_ready_timeout_means_unbounded() {
		let config = BrowserConfigLayer {
			ready_timeout_secs: Some(0),
			..Default::default()
		}
		.resolve()
		.unwrap();
		assert_eq!(config.ready_timeout_secs, None);

		let config = BrowserConfigLayer {
			ready_timeout_secs: Some(120),
			..Default::default()
		}
		.resolve()
		.unwrap();
		assert_eq!(config.ready_timeout_secs, Some(120));
	}

	#[test]
	fn zero_poll_interval_is_rejected() {
		let err = BrowserConfigLayer {
			poll_interval_secs: Some(0),
			..Default::default()
		}
		.resolve()
		.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn unknown_default_time_zone_is_rejected() {
		let err = BrowserConfigLayer {
			default_time_zone: Some("Atlantis/Central".to_string()),
			..Default::default()
		}
		.resolve()
		.unwrap_err();
		assert!(err.to_string().contains("Atlantis/Central"));
	}

	#[test]
	fn owner_ref_requires_parent_identity() {
		let err = BrowserConfigLayer {
			set_owner_ref: Some(true),
			pod_uid: Some("uid".to_string()),
			..Default::default()
		}
		.resolve()
		.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));

		let config = BrowserConfigLayer {
			set_owner_ref: Some(true),
			pod_uid: Some("uid".to_string()),
			pod_name: Some("selenoid-0".to_string()),
			..Default::default()
		}
		.resolve()
		.unwrap();
		assert!(config.set_owner_ref);
		assert_eq!(config.pod_name.as_deref(), Some("selenoid-0"));
	}

	#[test]
	fn naming_mode_parsing() {
		assert_eq!("generated".parse::<NamingMode>(), Ok(NamingMode::Generated));
		assert_eq!("Request-Id".parse::<NamingMode>(), Ok(NamingMode::RequestId));
		assert!("random".parse::<NamingMode>().is_err());
	}

	#[test]
	fn deserialize_layer_partial() {
		let toml_str = r#"
namespace = "browsers"
naming = "request-id"
cpu_limit = ""
ready_timeout_secs = 300
"#;
		let layer: BrowserConfigLayer = toml::from_str(toml_str).unwrap();
		assert_eq!(layer.namespace.as_deref(), Some("browsers"));
		assert_eq!(layer.naming, Some(NamingMode::RequestId));
		assert_eq!(layer.cpu_limit.as_deref(), Some(""));
		assert_eq!(layer.ready_timeout_secs, Some(300));
		assert!(layer.memory_limit.is_none());
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	fn quantity() -> impl Strategy<Value = Option<String>> {
		proptest::option::of("(|[0-9]{1,4}(m|Mi|Gi)?)")
	}

	proptest! {
		#[test]
		fn overlay_quantities_always_win(
			base_limit in quantity(),
			overlay_limit in quantity(),
		) {
			let mut base = BrowserConfigLayer { memory_limit: base_limit.clone(), ..Default::default() };
			base.merge(BrowserConfigLayer { memory_limit: overlay_limit.clone(), ..Default::default() });
			let expected = overlay_limit.or(base_limit);
			prop_assert_eq!(&base.memory_limit, &expected);

			let resolved = base.resolve().unwrap();
			prop_assert_eq!(resolved.memory_limit, expected.unwrap_or_else(|| "1500Mi".to_string()));
		}

		#[test]
		fn ready_timeout_zero_is_the_only_unbounded_value(secs in any::<u64>()) {
			let config = BrowserConfigLayer { ready_timeout_secs: Some(secs), ..Default::default() }
				.resolve()
				.unwrap();
			prop_assert_eq!(config.ready_timeout_secs.is_none(), secs == 0);
		}
	}
}
