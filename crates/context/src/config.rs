//! Context configuration.
//!
//! Configuration is written in KDL (v2):
//!
//! ```kdl
//! context "ui" {
//!     drain-max-jobs 256
//!     drain-time-ms 8
//!     backlog-warn 1024
//! }
//! ```
//!
//! Every entry is optional. A document without a `context` node yields
//! [`ContextConfig::default`].

use std::path::Path;
use std::time::Duration;

use kdl::{KdlDocument, KdlNode};

use crate::budget::DrainBudget;
use crate::error::{ConfigError, Result};

/// Option keys accepted inside a `context` block.
const OPTION_KEYS: &[&str] = &["drain-max-jobs", "drain-time-ms", "backlog-warn"];

/// Settings for one [`OwningContext`](crate::OwningContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
	/// Name used in logs and errors.
	pub name: String,
	/// Budget used by [`drain`](crate::OwningContext::drain).
	pub drain_budget: DrainBudget,
	/// Queue length at which a drain pass logs a backlog warning.
	pub backlog_warn: usize,
}

impl Default for ContextConfig {
	fn default() -> Self {
		Self {
			name: "main".to_string(),
			drain_budget: DrainBudget::default(),
			backlog_warn: 4096,
		}
	}
}

impl ContextConfig {
	/// Creates a default configuration with the given context name.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Parse a KDL string into a [`ContextConfig`].
	pub fn parse(input: &str) -> Result<Self> {
		let doc: KdlDocument = input.parse()?;
		match doc.get("context") {
			Some(node) => parse_context_node(node),
			None => Ok(Self::default()),
		}
	}

	/// Reads and parses a KDL configuration file.
	pub fn load(path: &Path) -> Result<Self> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&input)
	}
}

fn parse_context_node(node: &KdlNode) -> Result<ContextConfig> {
	let mut config = ContextConfig::default();

	if let Some(name) = node.get(0).and_then(|v| v.as_string()) {
		config.name = name.to_string();
	}

	let Some(children) = node.children() else {
		return Ok(config);
	};

	for opt_node in children.nodes() {
		let key = opt_node.name().value();
		match key {
			"drain-max-jobs" => {
				let jobs = get_count(opt_node)?;
				if jobs == 0 {
					return Err(ConfigError::InvalidValue {
						option: key.to_string(),
						expected: "an integer greater than zero",
						got: "0".to_string(),
					});
				}
				config.drain_budget.max_jobs = jobs;
			}
			"drain-time-ms" => {
				config.drain_budget.duration = Duration::from_millis(get_count(opt_node)? as u64);
			}
			"backlog-warn" => config.backlog_warn = get_count(opt_node)?,
			_ => {
				return Err(ConfigError::UnknownOption {
					key: key.to_string(),
					suggestion: suggest_option(key),
				});
			}
		}
	}

	Ok(config)
}

/// Reads the first argument of `node` as a non-negative integer.
fn get_count(node: &KdlNode) -> Result<usize> {
	let option = node.name().value();
	let invalid = |got: String| ConfigError::InvalidValue {
		option: option.to_string(),
		expected: "a non-negative integer",
		got,
	};

	let Some(entry) = node.entries().first() else {
		return Err(invalid("nothing".to_string()));
	};
	let value = entry.value();
	value
		.as_integer()
		.and_then(|n| usize::try_from(n).ok())
		.ok_or_else(|| invalid(value.to_string()))
}

/// Suggests a similar option key using fuzzy matching.
fn suggest_option(key: &str) -> Option<String> {
	OPTION_KEYS
		.iter()
		.min_by_key(|k| strsim::levenshtein(key, k))
		.filter(|k| strsim::levenshtein(key, k) <= 3)
		.map(|k| k.to_string())
}
