//! Error types for context driving and configuration parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while driving an [`OwningContext`](crate::OwningContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
	/// The context was drained or run from a thread other than the one that created it.
	#[error("context '{name}' driven from a thread other than its owner")]
	NotOwner {
		/// Name of the context.
		name: String,
	},
}

/// Errors that can occur when parsing context configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing KDL syntax.
	#[error("KDL parse error: {0}")]
	Kdl(#[from] kdl::KdlError),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// An unknown option was specified in the `context` block.
	#[error("unknown option: {key}{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
	UnknownOption {
		/// The unrecognized option key.
		key: String,
		/// A suggested alternative, if one is close enough.
		suggestion: Option<String>,
	},

	/// An option value has the wrong type or is out of range.
	#[error("invalid value for option '{option}': expected {expected}, got {got}")]
	InvalidValue {
		/// The option's KDL key.
		option: String,
		/// Description of the accepted values.
		expected: &'static str,
		/// The offending value as written.
		got: String,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
