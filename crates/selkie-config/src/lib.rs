// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for selkie.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`SELKIE_*`)
//!
//! # Usage
//!
//! ```ignore
//! use selkie_config::load_config;
//!
//! let config = load_config()?;
//! println!("Browsers go to namespace {}", config.browser.namespace);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::SelkieConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved selkie configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelkieConfig {
	pub browser: BrowserConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SELKIE_*`)
/// 2. Config file (`/etc/selkie/selkie.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<SelkieConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
///
/// Unlike the system path, an explicitly given file must exist.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<SelkieConfig, ConfigError> {
	let config_path = config_path.into();
	if !config_path.exists() {
		return Err(ConfigError::FileRead {
			source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
			path: config_path,
		});
	}

	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<SelkieConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = SelkieConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: SelkieConfigLayer) -> Result<SelkieConfig, ConfigError> {
	let browser = layer.browser.unwrap_or_default().resolve()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		namespace = %browser.namespace,
		naming = ?browser.naming,
		poll_interval_secs = browser.poll_interval_secs,
		ready_timeout_secs = ?browser.ready_timeout_secs,
		shm_enabled = browser.shm_enabled,
		owner_ref = browser.set_owner_ref,
		"Selkie configuration loaded"
	);

	Ok(SelkieConfig { browser, logging })
}
