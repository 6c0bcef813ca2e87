// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb records produced by the host application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// A breadcrumb recorded by the host, possibly before any sink exists.
///
/// The timestamp is taken when the host records the message, so a record
/// replayed after initialization keeps the time it actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
	pub text: String,
	pub severity: Severity,
	pub recorded_at: DateTime<Utc>,
}

impl PendingRecord {
	pub fn new(text: impl Into<String>, severity: Severity) -> Self {
		Self {
			text: text.into(),
			severity,
			recorded_at: Utc::now(),
		}
	}
}
