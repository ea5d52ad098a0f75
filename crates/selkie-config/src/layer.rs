// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{BrowserConfigLayer, LoggingConfigLayer};

/// Selkie configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelkieConfigLayer {
	#[serde(default)]
	pub browser: Option<BrowserConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl SelkieConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: SelkieConfigLayer) {
		merge_option(&mut self.browser, other.browser, BrowserConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = SelkieConfigLayer::default();
		base.merge(SelkieConfigLayer::default());
		assert!(base.browser.is_none());
		assert!(base.logging.is_none());
	}

	#[test]
	fn test_merge_fills_missing_section() {
		let mut base = SelkieConfigLayer::default();
		base.merge(SelkieConfigLayer {
			browser: Some(BrowserConfigLayer {
				namespace: Some("browsers".to_string()),
				..Default::default()
			}),
			logging: None,
		});
		assert_eq!(
			base.browser.unwrap().namespace.as_deref(),
			Some("browsers")
		);
	}

	#[test]
	fn test_merge_sections_field_by_field() {
		let mut base = SelkieConfigLayer {
			browser: Some(BrowserConfigLayer {
				namespace: Some("browsers".to_string()),
				memory_limit: Some("2Gi".to_string()),
				..Default::default()
			}),
			logging: None,
		};
		base.merge(SelkieConfigLayer {
			browser: Some(BrowserConfigLayer {
				memory_limit: Some("4Gi".to_string()),
				..Default::default()
			}),
			logging: None,
		});
		let browser = base.browser.unwrap();
		assert_eq!(browser.namespace.as_deref(), Some("browsers"));
		assert_eq!(browser.memory_limit.as_deref(), Some("4Gi"));
	}

	#[test]
	fn test_deserialize_full_file() {
		let layer: SelkieConfigLayer = toml::from_str(
			r#"
[browser]
namespace = "browsers"
shm_enabled = false

[logging]
level = "debug"
"#,
		)
		.unwrap();
		assert_eq!(layer.browser.unwrap().shm_enabled, Some(false));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
	}
}
