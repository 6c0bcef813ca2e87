// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report messages handed to a sink's capture operation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::correlation::CorrelationId;
use crate::severity::Severity;

/// Tag key carrying the correlation identifier on every report.
pub const CORRELATION_TAG: &str = "user_event_id";

/// Label used in the report message when none is configured.
pub const DEFAULT_REPORT_LABEL: &str = "Client";

/// A user-initiated report, ready to be captured by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
	pub message: String,
	pub severity: Severity,
	pub tags: BTreeMap<String, String>,
}

impl ReportMessage {
	/// Builds the report for `correlation`.
	///
	/// The identifier goes into both the message and the [`CORRELATION_TAG`]
	/// tag, so every report has a distinct message and is searchable by id.
	pub fn for_correlation(label: &str, correlation: &CorrelationId) -> Self {
		let mut tags = BTreeMap::new();
		tags.insert(CORRELATION_TAG.to_string(), correlation.to_string());

		Self {
			message: format!("{label} report ({correlation})"),
			severity: Severity::Error,
			tags,
		}
	}

	/// Returns the correlation identifier this report carries, if any.
	pub fn correlation_id(&self) -> Option<&str> {
		self.tags.get(CORRELATION_TAG).map(String::as_str)
	}
}
