// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the reporting client.

use thiserror::Error;

/// Result type alias for reporting operations.
pub type Result<T> = std::result::Result<T, ReportingError>;

/// Errors returned by the reporter's caller-facing operations.
///
/// `AlreadyInitialized` and `NotInitialized` are contract violations by the
/// caller. They are not meant to be retried.
#[derive(Debug, Error)]
pub enum ReportingError {
	/// `initialize` was called more than once.
	#[error("error reporting already initialized")]
	AlreadyInitialized,

	/// A report was requested before `initialize`.
	#[error("error reporting not initialized")]
	NotInitialized,

	/// The sink could not be constructed.
	#[error("failed to start reporting sink: {0}")]
	Sink(#[from] SinkError),
}

/// Errors raised while constructing a sink.
#[derive(Debug, Error)]
pub enum SinkError {
	/// The credential could not be parsed by the sink.
	#[error("invalid credential: {0}")]
	InvalidCredential(String),

	/// The sink's backend is not usable in this process.
	#[error("sink unavailable: {0}")]
	Unavailable(String),
}
