// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reporter configuration.
//!
//! Configuration comes from an optional TOML file with environment variable
//! overrides on top:
//!
//! | Variable                      | Overrides           |
//! |-------------------------------|---------------------|
//! | `OUTLINE_REPORT_DSN`          | `dsn`               |
//! | `OUTLINE_REPORT_DSN_FILE`     | `dsn` (file wins)   |
//! | `OUTLINE_REPORT_ENVIRONMENT`  | `host.environment`  |
//! | `OUTLINE_REPORT_RELEASE`      | `host.release`      |
//! | `OUTLINE_REPORT_LABEL`        | `report_label`      |
//! | `OUTLINE_REPORT_APP_NAME`     | `host.app_name` when the file has no `[host]` |
//!
//! ```toml
//! dsn = "https://public@o0.ingest.sentry.io/42"
//! report_label = "Android"
//!
//! [host]
//! app_name = "outline-client"
//! release = "1.12.0"
//! environment = "production"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use outline_report_core::DEFAULT_REPORT_LABEL;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use zeroize::Zeroize;

const ENV_PREFIX: &str = "OUTLINE_REPORT_";

/// Default cap on breadcrumbs the sink keeps for the next report.
pub const DEFAULT_MAX_BREADCRUMBS: usize = 100;

/// Default time allowed for delivering queued events on flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

const DEFAULT_ENVIRONMENT: &str = "production";

/// The redaction placeholder used when a credential is printed.
pub const REDACTED: &str = "[REDACTED]";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// I/O error reading the config file
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Missing required field
	#[error("Missing required field: {0}")]
	MissingField(String),

	/// Invalid value
	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },

	/// The secret file named by a `*_FILE` variable could not be read
	#[error("failed to read secret file at {path}: {source}")]
	SecretFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A `*_FILE` variable was set but empty
	#[error("secret file path in {var} is empty")]
	EmptySecretPath { var: String },
}

impl ConfigError {
	pub fn missing_field(field: impl Into<String>) -> Self {
		Self::MissingField(field.into())
	}

	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// The reporting credential (a DSN for the sentry sink).
///
/// Debug and Display print `[REDACTED]`. The value is zeroed on drop and is
/// only reachable through [`expose`](Self::expose).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl Drop for Credential {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Credential").field(&REDACTED).finish()
	}
}

impl fmt::Display for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for Credential {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self)
	}
}

/// Describes the host application to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostContext {
	pub app_name: String,
	#[serde(default)]
	pub release: Option<String>,
	#[serde(default = "default_environment")]
	pub environment: String,
}

impl HostContext {
	pub fn new(app_name: impl Into<String>) -> Self {
		Self {
			app_name: app_name.into(),
			release: None,
			environment: default_environment(),
		}
	}

	pub fn with_release(mut self, release: impl Into<String>) -> Self {
		self.release = Some(release.into());
		self
	}

	pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
		self.environment = environment.into();
		self
	}
}

fn default_environment() -> String {
	DEFAULT_ENVIRONMENT.to_string()
}

/// Everything a sink needs to start, plus reporter settings.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
	pub credential: Credential,
	pub host: HostContext,
	/// Prefix of report messages, as in `"<label> report (<id>)"`.
	pub report_label: String,
	/// Breadcrumbs the sink keeps for the next report.
	pub max_breadcrumbs: usize,
	pub flush_timeout: Duration,
}

impl ReporterConfig {
	pub fn new(credential: Credential, host: HostContext) -> Self {
		Self {
			credential,
			host,
			report_label: DEFAULT_REPORT_LABEL.to_string(),
			max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
			flush_timeout: DEFAULT_FLUSH_TIMEOUT,
		}
	}

	pub fn with_report_label(mut self, label: impl Into<String>) -> Self {
		self.report_label = label.into();
		self
	}

	pub fn with_max_breadcrumbs(mut self, max: usize) -> Self {
		self.max_breadcrumbs = max;
		self
	}

	pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
		self.flush_timeout = timeout;
		self
	}

	/// Parses a TOML document without consulting the environment.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		ConfigFile::parse(content, Path::new("<inline>"))?.resolve()
	}

	/// Loads `path` and applies environment overrides.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		load_with(Some(path.as_ref()), |var| std::env::var(var).ok())
	}

	/// Builds a config from environment variables alone.
	///
	/// The application name comes from `OUTLINE_REPORT_APP_NAME`, falling
	/// back to this crate's name.
	pub fn from_env() -> Result<Self, ConfigError> {
		load_with(None, |var| std::env::var(var).ok())
	}

	/// Rejects configurations no sink could start from.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.credential.is_empty() {
			return Err(ConfigError::invalid_value("dsn", "must not be empty"));
		}
		if self.host.app_name.trim().is_empty() {
			return Err(ConfigError::invalid_value("host.app_name", "must not be empty"));
		}
		if self.max_breadcrumbs == 0 {
			return Err(ConfigError::invalid_value(
				"max_breadcrumbs",
				"must be greater than zero",
			));
		}
		Ok(())
	}
}

/// Loads an optional file then applies overrides read through `lookup`.
pub(crate) fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<ReporterConfig, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let mut file = match path {
		Some(path) => {
			let content = fs::read_to_string(path)?;
			ConfigFile::parse(&content, path)?
		}
		None => ConfigFile::default(),
	};

	file.apply_env(lookup)?;
	file.resolve()
}

/// On-disk shape. Every field is optional so the environment can fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
	dsn: Option<Credential>,
	host: Option<HostContext>,
	report_label: Option<String>,
	max_breadcrumbs: Option<usize>,
	flush_timeout_secs: Option<u64>,
}

impl ConfigFile {
	fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})
	}

	fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

		if let Some(dsn) = read_secret(&lookup, &format!("{ENV_PREFIX}DSN"))? {
			self.dsn = Some(dsn);
		}

		if self.host.is_none() {
			let app_name = var("APP_NAME").unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
			self.host = Some(HostContext::new(app_name));
		}
		if let Some(host) = self.host.as_mut() {
			if let Some(environment) = var("ENVIRONMENT") {
				host.environment = environment;
			}
			if let Some(release) = var("RELEASE") {
				host.release = Some(release);
			}
		}

		if let Some(label) = var("LABEL") {
			self.report_label = Some(label);
		}

		Ok(())
	}

	fn resolve(self) -> Result<ReporterConfig, ConfigError> {
		let credential = self.dsn.ok_or_else(|| ConfigError::missing_field("dsn"))?;
		let host = self.host.ok_or_else(|| ConfigError::missing_field("host"))?;

		let mut config = ReporterConfig::new(credential, host);
		if let Some(label) = self.report_label {
			config.report_label = label;
		}
		if let Some(max) = self.max_breadcrumbs {
			config.max_breadcrumbs = max;
		}
		if let Some(secs) = self.flush_timeout_secs {
			config.flush_timeout = Duration::from_secs(secs);
		}

		config.validate()?;
		Ok(config)
	}
}

/// Reads `var`, or the file named by `{var}_FILE` when that is set.
///
/// A single trailing newline is stripped from file contents.
fn read_secret<F>(lookup: &F, var: &str) -> Result<Option<Credential>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path_str) = lookup(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::EmptySecretPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
			path: path.clone(),
			source,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(Credential::new(secret)));
	}

	Ok(lookup(var).map(Credential::new))
}
