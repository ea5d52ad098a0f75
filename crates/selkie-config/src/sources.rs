// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::SelkieConfigLayer;
use crate::sections::{BrowserConfigLayer, LogFormat, LoggingConfigLayer, NamingMode};

/// Default location of the configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/selkie/selkie.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<SelkieConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<SelkieConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(SelkieConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<SelkieConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(SelkieConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: SelkieConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SELKIE_<SECTION>_<FIELD>. The owner reference triple
/// (`SELKIE_SET_OWNER_REF`, `SELKIE_POD_UID`, `SELKIE_POD_NAME`) is unprefixed
/// by section since it describes the pod selkie itself runs in.
pub struct EnvSource;

impl EnvSource {
	/// Build a layer from an arbitrary variable lookup.
	pub fn load_from<F>(lookup: F) -> Result<SelkieConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		Ok(SelkieConfigLayer {
			browser: Some(load_browser_from_env(&lookup)?),
			logging: Some(load_logging_from_env(&lookup)),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<SelkieConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_from(|name| std::env::var(name).ok())
	}
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_var(lookup: Lookup<'_>, name: &str) -> Option<String> {
	lookup(name).filter(|s| !s.is_empty())
}

/// Like [`env_var`], but an explicitly empty value is kept.
fn env_var_allow_empty(lookup: Lookup<'_>, name: &str) -> Option<String> {
	lookup(name)
}

fn env_bool(lookup: Lookup<'_>, name: &str) -> Option<bool> {
	env_var(lookup, name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u64(lookup: Lookup<'_>, name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(lookup, name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_browser_from_env(lookup: Lookup<'_>) -> Result<BrowserConfigLayer, ConfigError> {
	let naming = match env_var(lookup, "SELKIE_BROWSER_NAMING") {
		Some(v) => Some(
			v.parse::<NamingMode>()
				.map_err(|message| ConfigError::InvalidValue {
					key: "SELKIE_BROWSER_NAMING".to_string(),
					message,
				})?,
		),
		None => None,
	};

	Ok(BrowserConfigLayer {
		namespace: env_var(lookup, "SELKIE_BROWSER_NAMESPACE"),
		memory_limit: env_var_allow_empty(lookup, "SELKIE_BROWSER_MEMORY_LIMIT"),
		memory_request: env_var_allow_empty(lookup, "SELKIE_BROWSER_MEMORY_REQUEST"),
		cpu_limit: env_var_allow_empty(lookup, "SELKIE_BROWSER_CPU_LIMIT"),
		cpu_request: env_var_allow_empty(lookup, "SELKIE_BROWSER_CPU_REQUEST"),
		shm_enabled: env_bool(lookup, "SELKIE_BROWSER_SHM_ENABLED"),
		naming,
		poll_interval_secs: env_u64(lookup, "SELKIE_BROWSER_POLL_INTERVAL_SECS")?,
		ready_timeout_secs: env_u64(lookup, "SELKIE_BROWSER_READY_TIMEOUT_SECS")?,
		cluster_domain: env_var(lookup, "SELKIE_BROWSER_CLUSTER_DOMAIN"),
		origin_namespace: env_var(lookup, "SELKIE_BROWSER_ORIGIN_NAMESPACE"),
		default_time_zone: env_var(lookup, "SELKIE_BROWSER_DEFAULT_TIME_ZONE"),
		set_owner_ref: env_bool(lookup, "SELKIE_SET_OWNER_REF"),
		pod_uid: env_var(lookup, "SELKIE_POD_UID"),
		pod_name: env_var(lookup, "SELKIE_POD_NAME"),
	})
}

fn load_logging_from_env(lookup: Lookup<'_>) -> LoggingConfigLayer {
	let format = env_var(lookup, "SELKIE_LOG_FORMAT").map(|v| match v.to_lowercase().as_str() {
		"json" => LogFormat::Json,
		_ => LogFormat::Text,
	});

	LoggingConfigLayer {
		level: env_var(lookup, "SELKIE_LOG_LEVEL"),
		format,
	}
}
