// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core reporting types.

use thiserror::Error;

/// Errors produced while parsing or building core reporting types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid severity: {0}")]
	InvalidSeverity(String),
}

/// Result type for core reporting operations.
pub type Result<T> = std::result::Result<T, CoreError>;
