// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Addresses under which a running session is reachable.

use std::collections::BTreeMap;

use url::Url;

use crate::config::NetworkConfig;
use crate::error::ProvisionerError;
use crate::pod::{BROWSER_PORTS, CONTROL_PORT};
use crate::types::{ContainerInfo, HostPort};

/// What is known about a session once its pod and service exist.
#[derive(Debug, Clone, Copy)]
pub struct ObservedSession<'a> {
	pub pod_name: &'a str,
	pub namespace: &'a str,
	pub pod_uid: &'a str,
	pub cluster_ip: &'a str,
	pub base_path: &'a str,
}

/// Resolved addresses of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
	/// `<pod>.<namespace>.<cluster domain>`
	pub host: String,
	pub url: Url,
	pub origin: String,
	pub host_port: HostPort,
	pub container: ContainerInfo,
}

/// Join a host and port, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: i32) -> String {
	if host.contains(':') && !host.starts_with('[') {
		format!("[{host}]:{port}")
	} else {
		format!("{host}:{port}")
	}
}

fn port_of(name: &str) -> i32 {
	BROWSER_PORTS
		.iter()
		.find(|(port_name, _)| *port_name == name)
		.map(|(_, port)| *port)
		.unwrap_or(CONTROL_PORT)
}

pub fn resolve(
	session: &ObservedSession<'_>,
	network: &NetworkConfig,
) -> Result<NetworkIdentity, ProvisionerError> {
	let host = format!(
		"{}.{}.{}",
		session.pod_name, session.namespace, network.cluster_domain
	);
	let control = join_host_port(&host, CONTROL_PORT);

	let path = if session.base_path.starts_with('/') || session.base_path.is_empty() {
		session.base_path.to_string()
	} else {
		format!("/{}", session.base_path)
	};
	let address = format!("http://{control}{path}");
	let url = Url::parse(&address).map_err(|e| ProvisionerError::InvalidAddress {
		address: address.clone(),
		message: e.to_string(),
	})?;

	let origin_host = format!(
		"{}.{}.{}",
		session.pod_name, network.origin_namespace, network.cluster_domain
	);
	let origin = join_host_port(&origin_host, CONTROL_PORT);

	let host_port = HostPort {
		control: control.clone(),
		vnc: join_host_port(&host, port_of("vnc")),
		devtools: join_host_port(&host, port_of("devtools")),
		fileserver: join_host_port(&host, port_of("fileserver")),
		clipboard: join_host_port(&host, port_of("clipboard")),
	};

	let mut ports = BTreeMap::new();
	ports.insert(CONTROL_PORT.to_string(), CONTROL_PORT.to_string());

	Ok(NetworkIdentity {
		host,
		url,
		origin,
		host_port,
		container: ContainerInfo {
			id: session.pod_uid.to_string(),
			ip_address: session.cluster_ip.to_string(),
			ports,
		},
	})
}
