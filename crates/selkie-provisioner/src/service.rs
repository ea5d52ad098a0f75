// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service specification fronting a browser pod.

use std::collections::BTreeMap;

use selkie_k8s::{IntOrString, ObjectMeta, OwnerReference, Pod, Service, ServicePort, ServiceSpec};

use crate::pod::{BROWSER_PORTS, MANAGED_BY_LABEL, MANAGED_BY_VALUE, REQUEST_ID_LABEL};
use crate::types::SessionId;

/// Build the service selecting the session pod.
///
/// The service carries an owner reference to `pod`, so it is garbage
/// collected with the pod even when explicit deletion fails. `pod` must be the
/// object returned by the cluster, since its UID is only known after creation.
pub fn build_service(id: &SessionId, name: &str, pod: &Pod) -> Service {
	let mut selector = BTreeMap::new();
	selector.insert(REQUEST_ID_LABEL.to_string(), id.to_string());

	let mut labels = selector.clone();
	labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

	let owner_references = match (&pod.metadata.name, &pod.metadata.uid) {
		(Some(pod_name), Some(uid)) => Some(vec![OwnerReference {
			api_version: "v1".to_string(),
			kind: "Pod".to_string(),
			name: pod_name.clone(),
			uid: uid.clone(),
			..Default::default()
		}]),
		_ => None,
	};

	let ports = BROWSER_PORTS
		.iter()
		.map(|(port_name, port)| ServicePort {
			name: Some(port_name.to_string()),
			protocol: Some("TCP".to_string()),
			port: *port,
			target_port: Some(IntOrString::Int(*port)),
			..Default::default()
		})
		.collect();

	Service {
		metadata: ObjectMeta {
			name: Some(name.to_string()),
			labels: Some(labels),
			owner_references,
			..Default::default()
		},
		spec: Some(ServiceSpec {
			selector: Some(selector),
			ports: Some(ports),
			..Default::default()
		}),
		status: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn created_pod(name: &str, uid: Option<&str>) -> Pod {
		Pod {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				uid: uid.map(str::to_string),
				..Default::default()
			},
			..Default::default()
		}
	}

	#[test]
	fn selector_matches_request_id_label() {
		let id = SessionId::generate();
		let svc = build_service(&id, &id.as_k8s_name(), &created_pod("browser-x", Some("u1")));
		let selector = svc.spec.unwrap().selector.unwrap();
		assert_eq!(selector.len(), 1);
		assert_eq!(selector.get(REQUEST_ID_LABEL), Some(&id.to_string()));
	}

	#[test]
	fn exposes_all_browser_ports() {
		let id = SessionId::generate();
		let svc = build_service(&id, "browser-1", &created_pod("browser-1", Some("u1")));
		let ports = svc.spec.unwrap().ports.unwrap();
		let named: Vec<(String, i32)> = ports
			.iter()
			.map(|p| (p.name.clone().unwrap(), p.port))
			.collect();
		assert_eq!(
			named,
			vec![
				("browser".to_string(), 4444),
				("vnc".to_string(), 5900),
				("devtools".to_string(), 7070),
				("fileserver".to_string(), 8080),
				("clipboard".to_string(), 9090),
			]
		);
		assert!(ports.iter().all(|p| p.protocol.as_deref() == Some("TCP")));
		assert!(ports
			.iter()
			.all(|p| p.target_port == Some(IntOrString::Int(p.port))));
	}

	#[test]
	fn owned_by_the_pod() {
		let id = SessionId::generate();
		let svc = build_service(&id, "browser-1", &created_pod("browser-1", Some("uid-123")));
		let refs = svc.metadata.owner_references.unwrap();
		assert_eq!(refs.len(), 1);
		assert_eq!(refs[0].kind, "Pod");
		assert_eq!(refs[0].api_version, "v1");
		assert_eq!(refs[0].name, "browser-1");
		assert_eq!(refs[0].uid, "uid-123");
	}

	#[test]
	fn no_owner_reference_without_pod_uid() {
		let id = SessionId::generate();
		let svc = build_service(&id, "browser-1", &created_pod("browser-1", None));
		assert!(svc.metadata.owner_references.is_none());
	}

	#[test]
	fn service_name_is_used_verbatim() {
		let id = SessionId::generate();
		let svc = build_service(&id, "browser-custom", &created_pod("p", Some("u")));
		assert_eq!(svc.metadata.name.as_deref(), Some("browser-custom"));
	}
}
