// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment variables for the browser container.

use chrono_tz::Tz;
use selkie_k8s::EnvVar;

use crate::types::{Capabilities, ServiceDescriptor};

fn env_var(name: impl Into<String>, value: impl Into<String>) -> EnvVar {
	EnvVar {
		name: name.into(),
		value: Some(value.into()),
		value_from: None,
	}
}

/// Split a `KEY=VALUE` assignment on the first `=`.
///
/// An entry without `=` becomes a variable with an empty value.
pub fn split_assignment(entry: &str) -> EnvVar {
	match entry.split_once('=') {
		Some((name, value)) => env_var(name, value),
		None => env_var(entry, ""),
	}
}

/// Resolve the TZ value for a session.
///
/// The capability zone wins when it names a known IANA zone; otherwise
/// `default_zone` is used.
pub fn resolve_time_zone(caps: &Capabilities, default_zone: &str) -> String {
	if caps.time_zone.is_empty() {
		return default_zone.to_string();
	}
	match caps.time_zone.parse::<Tz>() {
		Ok(tz) => tz.name().to_string(),
		Err(_) => {
			tracing::warn!(time_zone = %caps.time_zone, "Unknown time zone in capabilities, using default");
			default_zone.to_string()
		}
	}
}

/// Compose the ordered environment for the browser container.
///
/// Order: TZ, SCREEN_RESOLUTION, ENABLE_VNC, ENABLE_VIDEO, SKIN (if set),
/// CODEC (if set), service extras, capability extras. Later entries shadow
/// earlier ones in the container runtime; nothing is deduplicated here.
pub fn compose_env(
	service: &ServiceDescriptor,
	caps: &Capabilities,
	default_zone: &str,
) -> Vec<EnvVar> {
	let mut env = vec![
		env_var("TZ", resolve_time_zone(caps, default_zone)),
		env_var("SCREEN_RESOLUTION", caps.screen_resolution.clone()),
		env_var("ENABLE_VNC", caps.vnc.to_string()),
		env_var("ENABLE_VIDEO", caps.video.to_string()),
	];

	if !caps.skin.is_empty() {
		env.push(env_var("SKIN", caps.skin.clone()));
	}
	if !caps.video_codec.is_empty() {
		env.push(env_var("CODEC", caps.video_codec.clone()));
	}

	env.extend(service.env.iter().map(|e| split_assignment(e)));
	env.extend(caps.env.iter().map(|e| split_assignment(e)));

	env
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pairs(env: &[EnvVar]) -> Vec<(String, String)> {
		env
			.iter()
			.map(|e| (e.name.clone(), e.value.clone().unwrap_or_default()))
			.collect()
	}

	fn p(name: &str, value: &str) -> (String, String) {
		(name.to_string(), value.to_string())
	}

	#[test]
	fn mandatory_entries_only() {
		let caps = Capabilities {
			screen_resolution: "1920x1080x24".to_string(),
			vnc: true,
			..Default::default()
		};
		let env = compose_env(&ServiceDescriptor::default(), &caps, "UTC");
		assert_eq!(
			pairs(&env),
			vec![
				p("TZ", "UTC"),
				p("SCREEN_RESOLUTION", "1920x1080x24"),
				p("ENABLE_VNC", "true"),
				p("ENABLE_VIDEO", "false"),
			]
		);
	}

	#[test]
	fn empty_resolution_is_kept() {
		let env = compose_env(
			&ServiceDescriptor::default(),
			&Capabilities::default(),
			"UTC",
		);
		assert_eq!(env[1].name, "SCREEN_RESOLUTION");
		assert_eq!(env[1].value.as_deref(), Some(""));
	}

	#[test]
	fn full_ordering() {
		let service = ServiceDescriptor {
			env: vec!["LANG=en_US.UTF-8".to_string(), "FOO=service".to_string()],
			..Default::default()
		};
		let caps = Capabilities {
			screen_resolution: "1280x1024x24".to_string(),
			video: true,
			skin: "WXGA800".to_string(),
			video_codec: "libx264".to_string(),
			time_zone: "Europe/Berlin".to_string(),
			env: vec!["FOO=caps".to_string()],
			..Default::default()
		};
		let env = compose_env(&service, &caps, "UTC");
		assert_eq!(
			pairs(&env),
			vec![
				p("TZ", "Europe/Berlin"),
				p("SCREEN_RESOLUTION", "1280x1024x24"),
				p("ENABLE_VNC", "false"),
				p("ENABLE_VIDEO", "true"),
				p("SKIN", "WXGA800"),
				p("CODEC", "libx264"),
				p("LANG", "en_US.UTF-8"),
				p("FOO", "service"),
				p("FOO", "caps"),
			]
		);
	}

	#[test]
	fn codec_without_skin() {
		let caps = Capabilities {
			video_codec: "mpeg4".to_string(),
			..Default::default()
		};
		let env = compose_env(&ServiceDescriptor::default(), &caps, "UTC");
		assert_eq!(env.len(), 5);
		assert_eq!(env[4].name, "CODEC");
	}

	#[test]
	fn split_on_first_equals_only() {
		let e = split_assignment("JAVA_OPTS=-Dx=y");
		assert_eq!(e.name, "JAVA_OPTS");
		assert_eq!(e.value.as_deref(), Some("-Dx=y"));
	}

	#[test]
	fn malformed_assignment_gets_empty_value() {
		let e = split_assignment("NO_EQUALS");
		assert_eq!(e.name, "NO_EQUALS");
		assert_eq!(e.value.as_deref(), Some(""));
	}

	#[test]
	fn invalid_time_zone_falls_back_to_default() {
		let caps = Capabilities {
			time_zone: "Mars/Olympus".to_string(),
			..Default::default()
		};
		assert_eq!(resolve_time_zone(&caps, "Asia/Tokyo"), "Asia/Tokyo");
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn split_never_loses_the_key(key in "[A-Z_]{1,16}", value in ".*") {
			let e = split_assignment(&format!("{key}={value}"));
			prop_assert_eq!(e.name, key);
			prop_assert_eq!(e.value, Some(value));
		}

		#[test]
		fn extras_are_all_emitted(
			service_env in proptest::collection::vec("[A-Z]{1,4}=[a-z]{0,4}", 0..5),
			caps_env in proptest::collection::vec("[A-Z]{1,4}=[a-z]{0,4}", 0..5),
		) {
			let service = ServiceDescriptor { env: service_env.clone(), ..Default::default() };
			let caps = Capabilities { env: caps_env.clone(), ..Default::default() };
			let env = compose_env(&service, &caps, "UTC");
			prop_assert_eq!(env.len(), 4 + service_env.len() + caps_env.len());
		}
	}
}
