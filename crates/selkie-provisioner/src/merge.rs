// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Merging a caller-supplied pod template over the generated default.
//!
//! The template wins for every field it sets. Fields it leaves unset (absent,
//! `null` or an empty string) are filled from the default, recursively.
//!
//! Lists need per-field rules, otherwise a template touching one container
//! property would erase the default ports and probes:
//!
//! - keyed lists (`containers`, `volumes`, `ports`, `volumeMounts`, ...) are
//!   merged entry by entry on their key; default entries the template does not
//!   mention are kept, template-only entries are appended
//! - `env` lists are concatenated, default first, so template entries shadow
//!   generated ones without anything being dropped
//! - any other list set in the template replaces the default list
//!
//! Some objects allow only one of a group of fields: a probe or lifecycle
//! handler has one action, a volume has one source. When the template sets a
//! member of such a group, the default's other members are dropped.

use selkie_k8s::Pod;
use serde_json::{Map, Value};

use crate::error::ProvisionerError;

/// Merge `template` over `default`. `None` yields `default` unchanged.
pub fn merge_pod(
	template: Option<&Pod>,
	default: Pod,
	primary_container: &str,
) -> Result<Pod, ProvisionerError> {
	let Some(template) = template else {
		return Ok(default);
	};

	let mut template = template.clone();
	if let Some(spec) = template.spec.as_mut() {
		if let Some(first) = spec.containers.first_mut() {
			if first.name.is_empty() {
				first.name = primary_container.to_string();
			}
		}
	}

	let mut merged = to_value(&template)?;
	merge_value(&mut merged, to_value(&default)?, None);

	serde_json::from_value(merged).map_err(|e| ProvisionerError::Template {
		message: e.to_string(),
	})
}

fn to_value(pod: &Pod) -> Result<Value, ProvisionerError> {
	serde_json::to_value(pod).map_err(|e| ProvisionerError::Template {
		message: e.to_string(),
	})
}

fn is_unset(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		_ => false,
	}
}

/// Key identifying entries of a list field, if the list is merged by key.
fn list_key(field: &str) -> Option<&'static str> {
	match field {
		"containers" | "initContainers" | "ephemeralContainers" | "volumes"
		| "imagePullSecrets" => Some("name"),
		"ports" => Some("containerPort"),
		"volumeMounts" => Some("mountPath"),
		_ => None,
	}
}

/// Handler actions of probes and lifecycle hooks.
const HANDLER_ACTIONS: &[&str] = &["exec", "httpGet", "tcpSocket", "grpc", "sleep"];

/// Volume sources.
const VOLUME_SOURCES: &[&str] = &[
	"awsElasticBlockStore",
	"azureDisk",
	"azureFile",
	"cephfs",
	"cinder",
	"configMap",
	"csi",
	"downwardAPI",
	"emptyDir",
	"ephemeral",
	"fc",
	"flexVolume",
	"flocker",
	"gcePersistentDisk",
	"gitRepo",
	"glusterfs",
	"hostPath",
	"iscsi",
	"nfs",
	"persistentVolumeClaim",
	"photonPersistentDisk",
	"portworxVolume",
	"projected",
	"quobyte",
	"rbd",
	"scaleIO",
	"secret",
	"storageos",
	"vsphereVolume",
];

const EXCLUSIVE_GROUPS: &[&[&str]] = &[HANDLER_ACTIONS, VOLUME_SOURCES];

/// Drop default members of a one-of group the template already chose from.
fn drop_exclusive_defaults(target: &Map<String, Value>, default: &mut Map<String, Value>) {
	for group in EXCLUSIVE_GROUPS {
		let is_set = |key: &str| target.get(key).is_some_and(|v| !is_unset(v));
		if group.iter().any(|key| is_set(key)) {
			for key in group.iter() {
				if !is_set(key) {
					default.remove(*key);
				}
			}
		}
	}
}

fn merge_value(target: &mut Value, default: Value, field: Option<&str>) {
	if is_unset(target) {
		*target = default;
		return;
	}

	match (target, default) {
		(Value::Object(target), Value::Object(default)) => merge_object(target, default),
		(Value::Array(target), Value::Array(default)) => merge_list(target, default, field),
		_ => {}
	}
}

fn merge_object(target: &mut Map<String, Value>, mut default: Map<String, Value>) {
	drop_exclusive_defaults(target, &mut default);
	for (key, default_value) in default {
		match target.get_mut(&key) {
			Some(value) => merge_value(value, default_value, Some(&key)),
			None => {
				target.insert(key, default_value);
			}
		}
	}
}

fn merge_list(target: &mut Vec<Value>, default: Vec<Value>, field: Option<&str>) {
	if target.is_empty() {
		*target = default;
		return;
	}

	if field == Some("env") {
		let overrides = std::mem::replace(target, default);
		target.extend(overrides);
		return;
	}

	let Some(key) = field.and_then(list_key) else {
		return;
	};

	let key_of = |v: &Value| -> Option<String> {
		match v.get(key)? {
			Value::String(s) if !s.is_empty() => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			_ => None,
		}
	};

	if target.iter().chain(default.iter()).any(|v| key_of(v).is_none()) {
		return;
	}

	let mut overrides: Vec<Option<Value>> = std::mem::take(target).into_iter().map(Some).collect();
	for default_entry in default {
		let default_key = key_of(&default_entry);
		let matching = overrides
			.iter_mut()
			.find(|slot| slot.as_ref().is_some_and(|v| key_of(v) == default_key))
			.and_then(Option::take);

		match matching {
			Some(mut entry) => {
				merge_value(&mut entry, default_entry, None);
				target.push(entry);
			}
			None => target.push(default_entry),
		}
	}
	target.extend(overrides.into_iter().flatten());
}
