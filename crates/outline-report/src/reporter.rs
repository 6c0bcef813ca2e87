// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller-facing error reporter.

use std::error::Error;
use std::fmt::Write as _;
use std::time::Duration;

use outline_report_core::{CorrelationId, PendingRecord, ReportMessage, Severity};
use tracing::{error, info, warn};

use crate::buffer::DeferredBuffer;
use crate::config::ReporterConfig;
use crate::error::{ReportingError, Result};
use crate::sink::SinkFactory;

/// Error reporter for the host application.
///
/// Construct one per process and share it (for example behind an `Arc`) with
/// every call site. Messages recorded before [`initialize`](Self::initialize)
/// are held and delivered, in order, once the sink is up.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use outline_report::{ErrorReporter, ReporterConfig, SentrySinkFactory};
///
/// let reporter = Arc::new(ErrorReporter::new());
/// reporter.record_info("VPN service starting");
///
/// let config = ReporterConfig::from_env()?;
/// reporter.initialize(&config, &SentrySinkFactory::new())?;
///
/// // Later, from a user-triggered "send feedback" path:
/// let id = reporter.report_now(Some("web-event-1234"))?;
/// ```
pub struct ErrorReporter {
	buffer: DeferredBuffer,
}

impl ErrorReporter {
	pub fn new() -> Self {
		Self {
			buffer: DeferredBuffer::new(),
		}
	}

	/// Records a breadcrumb to be attached to the next report. Never fails.
	pub fn record(&self, text: impl Into<String>, severity: Severity) {
		self.buffer.record(PendingRecord::new(text, severity));
	}

	pub fn record_info(&self, text: impl Into<String>) {
		self.record(text, Severity::Info);
	}

	pub fn record_warning(&self, text: impl Into<String>) {
		self.record(text, Severity::Warning);
	}

	pub fn record_error(&self, text: impl Into<String>) {
		self.record(text, Severity::Error);
	}

	/// Records `err` and its chain of sources as a single error breadcrumb.
	pub fn record_exception(&self, err: &(dyn Error + 'static)) {
		self.record_error(describe_error(err));
	}

	/// Starts the sink and delivers everything recorded so far.
	///
	/// Must be called exactly once per reporter. A second call fails with
	/// [`ReportingError::AlreadyInitialized`] and changes nothing. If the
	/// factory fails, recorded messages stay queued.
	///
	/// The factory runs without any lock held, so it may log or record.
	/// Anything recorded while it runs is delivered after the earlier queue.
	pub fn initialize<F>(&self, config: &ReporterConfig, factory: &F) -> Result<()>
	where
		F: SinkFactory + ?Sized,
	{
		let replayed = self
			.buffer
			.initialize_with(config.report_label.as_str(), || factory.connect(config))
			.map_err(|e| {
				if let ReportingError::Sink(ref sink_err) = e {
					error!(
						error = %sink_err,
						app = %config.host.app_name,
						"Failed to start reporting sink"
					);
				}
				e
			})?;

		info!(
			app = %config.host.app_name,
			environment = %config.host.environment,
			replayed,
			"Error reporter ready"
		);
		Ok(())
	}

	/// Sends a report tagged with `correlation_id`.
	///
	/// Without an identifier a random one is generated so the report is not
	/// grouped with unrelated reports. The identifier used is returned.
	pub fn report_now(&self, correlation_id: Option<&str>) -> Result<CorrelationId> {
		let Some(active) = self.buffer.active() else {
			warn!("Report requested before error reporting was initialized");
			return Err(ReportingError::NotInitialized);
		};

		let correlation = CorrelationId::from_optional(correlation_id);
		let report = ReportMessage::for_correlation(&active.report_label, &correlation);
		active.sink.capture_report(report);

		info!(
			correlation_id = %correlation,
			generated = correlation_id.is_none(),
			"Report sent"
		);
		Ok(correlation)
	}

	/// Waits up to `timeout` for the sink to deliver queued events.
	///
	/// Returns `false` before initialization or if the sink timed out.
	pub fn flush(&self, timeout: Duration) -> bool {
		match self.buffer.sink() {
			Some(sink) => sink.flush(timeout),
			None => false,
		}
	}

	pub fn is_initialized(&self) -> bool {
		self.buffer.is_initialized()
	}

	/// Number of messages waiting for initialization.
	pub fn pending_len(&self) -> usize {
		self.buffer.pending_len()
	}
}

impl Default for ErrorReporter {
	fn default() -> Self {
		Self::new()
	}
}

/// Formats an error followed by its sources, one per line.
fn describe_error(err: &(dyn Error + 'static)) -> String {
	let mut out = err.to_string();
	let mut source = err.source();
	if source.is_some() {
		out.push_str("\n\nCaused by:");
	}
	let mut depth = 0;
	while let Some(cause) = source {
		let _ = write!(out, "\n    {depth}: {cause}");
		depth += 1;
		source = cause.source();
	}
	out
}
