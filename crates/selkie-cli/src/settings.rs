// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Turning loaded configuration into provisioner settings.

use std::time::Duration;

use selkie_config::{BrowserConfig, NamingMode};
use selkie_provisioner::{
	BrowserResources, NamingStrategy, NetworkConfig, OwnerReferenceConfig, ProvisionerConfig,
};

fn quantity(value: &str) -> Option<String> {
	if value.is_empty() {
		None
	} else {
		Some(value.to_string())
	}
}

pub fn provisioner_config(browser: &BrowserConfig) -> ProvisionerConfig {
	ProvisionerConfig {
		namespace: browser.namespace.clone(),
		resources: BrowserResources {
			memory_limit: quantity(&browser.memory_limit),
			memory_request: quantity(&browser.memory_request),
			cpu_limit: quantity(&browser.cpu_limit),
			cpu_request: quantity(&browser.cpu_request),
		},
		shm_volume_enabled: browser.shm_enabled,
		owner_reference: OwnerReferenceConfig {
			enabled: browser.set_owner_ref,
			uid: browser.pod_uid.clone(),
			name: browser.pod_name.clone(),
		},
		naming: match browser.naming {
			NamingMode::Generated => NamingStrategy::Generated,
			NamingMode::RequestId => NamingStrategy::RequestId,
		},
		poll_interval: Duration::from_secs(browser.poll_interval_secs),
		ready_timeout: browser.ready_timeout_secs.map(Duration::from_secs),
		network: NetworkConfig {
			cluster_domain: browser.cluster_domain.clone(),
			origin_namespace: browser.origin_namespace.clone(),
		},
		default_time_zone: browser.default_time_zone.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_line_up() {
		let config = provisioner_config(&BrowserConfig::default());
		let expected = ProvisionerConfig::default();
		assert_eq!(config.namespace, expected.namespace);
		assert_eq!(config.resources, expected.resources);
		assert_eq!(config.shm_volume_enabled, expected.shm_volume_enabled);
		assert_eq!(config.owner_reference, expected.owner_reference);
		assert_eq!(config.naming, expected.naming);
		assert_eq!(config.poll_interval, expected.poll_interval);
		assert_eq!(config.ready_timeout, expected.ready_timeout);
		assert_eq!(config.network, expected.network);
		assert_eq!(config.default_time_zone, expected.default_time_zone);
	}

	#[test]
	fn empty_quantities_become_none() {
		let browser = BrowserConfig {
			memory_limit: String::new(),
			cpu_limit: "2".to_string(),
			..Default::default()
		};
		let resources = provisioner_config(&browser).resources;
		assert_eq!(resources.memory_limit, None);
		assert_eq!(resources.cpu_limit.as_deref(), Some("2"));
	}

	#[test]
	fn timeouts_and_naming() {
		let browser = BrowserConfig {
			ready_timeout_secs: Some(90),
			poll_interval_secs: 3,
			naming: NamingMode::RequestId,
			..Default::default()
		};
		let config = provisioner_config(&browser);
		assert_eq!(config.ready_timeout, Some(Duration::from_secs(90)));
		assert_eq!(config.poll_interval, Duration::from_secs(3));
		assert_eq!(config.naming, NamingStrategy::RequestId);
	}
}
