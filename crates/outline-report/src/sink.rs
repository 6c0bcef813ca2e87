// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The boundary between the reporter and the backend that delivers reports.

use std::sync::Arc;
use std::time::Duration;

use outline_report_core::{PendingRecord, ReportMessage};

use crate::config::ReporterConfig;
use crate::error::SinkError;

/// A reporting backend that receives breadcrumbs and reports.
///
/// Calls are fire-and-forget: the reporter never observes whether a
/// breadcrumb or report was delivered. Implementations must not block for
/// long, since breadcrumbs are forwarded from arbitrary host threads.
pub trait ReportSink: Send + Sync {
	/// Attaches a breadcrumb to future reports.
	fn record_breadcrumb(&self, record: PendingRecord);

	/// Sends a report.
	fn capture_report(&self, report: ReportMessage);

	/// Waits up to `timeout` for queued events to be delivered.
	///
	/// Returns `false` if delivery did not finish in time.
	fn flush(&self, _timeout: Duration) -> bool {
		true
	}
}

/// Constructs a sink from the reporter configuration.
pub trait SinkFactory {
	fn connect(&self, config: &ReporterConfig) -> Result<Arc<dyn ReportSink>, SinkError>;
}

impl<F> SinkFactory for F
where
	F: Fn(&ReporterConfig) -> Result<Arc<dyn ReportSink>, SinkError>,
{
	fn connect(&self, config: &ReporterConfig) -> Result<Arc<dyn ReportSink>, SinkError> {
		self(config)
	}
}
