// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: record breadcrumbs before and after initializing the reporter.
//!
//! Run with:
//!   OUTLINE_REPORT_DSN=https://key@o0.ingest.sentry.io/42 \
//!     cargo run --example report -p outline-report
//!
//! Without `OUTLINE_REPORT_DSN` the example reports into memory and prints
//! what was delivered.

use std::sync::Arc;

use outline_report::{
	BreadcrumbLayer, Credential, ErrorReporter, HostContext, MemorySink, ReporterConfig,
	SentrySinkFactory,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let reporter = Arc::new(ErrorReporter::new());

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.with(BreadcrumbLayer::new(Arc::clone(&reporter)))
		.init();

	tracing::info!(target: "example", "application starting");
	reporter.record_warning("settings file missing, using defaults");

	println!("Queued before initialize: {}", reporter.pending_len());

	match ReporterConfig::from_env() {
		Ok(config) => {
			reporter.initialize(&config, &SentrySinkFactory::new())?;
			let id = reporter.report_now(None)?;
			println!("Report sent with correlation id {id}");
			reporter.flush(config.flush_timeout);
		}
		Err(e) => {
			println!("No reporting credentials ({e}); using an in-memory sink");
			let config = ReporterConfig::new(Credential::new("memory"), HostContext::new("example"))
				.with_report_label("Example");
			let (sink, factory) = MemorySink::factory();
			reporter.initialize(&config, &factory)?;

			tracing::error!(target: "example", code = 42, "tunnel failed");
			let id = reporter.report_now(Some("example-event"))?;

			for record in sink.breadcrumbs() {
				println!("  [{}] {}", record.severity, record.text);
			}
			for report in sink.reports() {
				println!("  report: {}", report.message);
			}
			println!("Correlation id: {id}");
		}
	}

	Ok(())
}
