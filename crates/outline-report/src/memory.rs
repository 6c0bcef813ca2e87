// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process sink that keeps everything it receives.

use std::sync::Arc;

use outline_report_core::{PendingRecord, ReportMessage};
use parking_lot::Mutex;

use crate::config::ReporterConfig;
use crate::error::SinkError;
use crate::sink::{ReportSink, SinkFactory};

/// A sink that stores breadcrumbs and reports in arrival order.
///
/// Useful for hosts running without a reporting backend, and for inspecting
/// what the reporter delivered.
#[derive(Default)]
pub struct MemorySink {
	breadcrumbs: Mutex<Vec<PendingRecord>>,
	reports: Mutex<Vec<ReportMessage>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a shared sink and a factory that hands out that same sink.
	pub fn factory() -> (Arc<MemorySink>, MemorySinkFactory) {
		let sink = Arc::new(Self::new());
		let factory = MemorySinkFactory {
			sink: Arc::clone(&sink),
		};
		(sink, factory)
	}

	pub fn breadcrumbs(&self) -> Vec<PendingRecord> {
		self.breadcrumbs.lock().clone()
	}

	pub fn reports(&self) -> Vec<ReportMessage> {
		self.reports.lock().clone()
	}
}

impl ReportSink for MemorySink {
	fn record_breadcrumb(&self, record: PendingRecord) {
		self.breadcrumbs.lock().push(record);
	}

	fn capture_report(&self, report: ReportMessage) {
		self.reports.lock().push(report);
	}
}

/// Factory returned by [`MemorySink::factory`].
#[derive(Clone)]
pub struct MemorySinkFactory {
	sink: Arc<MemorySink>,
}

impl SinkFactory for MemorySinkFactory {
	fn connect(&self, _config: &ReporterConfig) -> Result<Arc<dyn ReportSink>, SinkError> {
		Ok(Arc::clone(&self.sink) as Arc<dyn ReportSink>)
	}
}
