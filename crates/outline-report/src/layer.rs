// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing layer that records the host's log events as breadcrumbs.

use std::fmt;
use std::sync::Arc;

use outline_report_core::Severity;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::reporter::ErrorReporter;

/// Targets under this prefix belong to the reporter itself and are skipped.
const OWN_TARGET_PREFIX: &str = "outline_report";

/// A tracing Layer that turns `INFO`, `WARN` and `ERROR` events into
/// breadcrumbs on an [`ErrorReporter`].
///
/// Events logged before the reporter is initialized are queued like any
/// other record.
///
/// ```ignore
/// use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
///
/// let reporter = Arc::new(ErrorReporter::new());
/// tracing_subscriber::registry()
///     .with(tracing_subscriber::fmt::layer())
///     .with(BreadcrumbLayer::new(Arc::clone(&reporter)))
///     .init();
/// ```
#[derive(Clone)]
pub struct BreadcrumbLayer {
	reporter: Arc<ErrorReporter>,
}

impl BreadcrumbLayer {
	pub fn new(reporter: Arc<ErrorReporter>) -> Self {
		Self { reporter }
	}
}

impl<S> Layer<S> for BreadcrumbLayer
where
	S: Subscriber + for<'a> LookupSpan<'a>,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();
		if metadata.target().starts_with(OWN_TARGET_PREFIX) {
			return;
		}
		let Some(severity) = severity_for(metadata.level()) else {
			return;
		};

		let mut visitor = BreadcrumbVisitor::default();
		event.record(&mut visitor);

		self.reporter.record(visitor.into_text(), severity);
	}
}

fn severity_for(level: &Level) -> Option<Severity> {
	if *level == Level::ERROR {
		Some(Severity::Error)
	} else if *level == Level::WARN {
		Some(Severity::Warning)
	} else if *level == Level::INFO {
		Some(Severity::Info)
	} else {
		None
	}
}

#[derive(Default)]
struct BreadcrumbVisitor {
	message: Option<String>,
	fields: Vec<(String, String)>,
}

impl BreadcrumbVisitor {
	/// Message first, then remaining fields as `key=value`.
	fn into_text(self) -> String {
		let mut parts = Vec::with_capacity(self.fields.len() + 1);
		if let Some(message) = self.message {
			parts.push(message);
		}
		for (name, value) in self.fields {
			parts.push(format!("{name}={value}"));
		}
		parts.join(" ")
	}
}

impl Visit for BreadcrumbVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		let value = format!("{value:?}");
		if field.name() == "message" {
			self.message = Some(value);
		} else {
			self.fields.push((field.name().to_string(), value));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = Some(value.to_string());
		} else {
			self.fields.push((field.name().to_string(), value.to_string()));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Credential, HostContext, ReporterConfig};
	use crate::memory::MemorySink;
	use tracing_subscriber::layer::SubscriberExt;

	fn reporter_with_sink() -> (Arc<ErrorReporter>, Arc<MemorySink>) {
		let reporter = Arc::new(ErrorReporter::new());
		let (sink, factory) = MemorySink::factory();
		let config = ReporterConfig::new(Credential::new("memory"), HostContext::new("test"));
		reporter.initialize(&config, &factory).unwrap();
		(reporter, sink)
	}

	#[test]
	fn maps_levels() {
		assert_eq!(severity_for(&Level::ERROR), Some(Severity::Error));
		assert_eq!(severity_for(&Level::WARN), Some(Severity::Warning));
		assert_eq!(severity_for(&Level::INFO), Some(Severity::Info));
		assert_eq!(severity_for(&Level::DEBUG), None);
		assert_eq!(severity_for(&Level::TRACE), None);
	}

	#[test]
	fn records_message_and_fields() {
		let (reporter, sink) = reporter_with_sink();
		let subscriber = tracing_subscriber::registry().with(BreadcrumbLayer::new(reporter));

		tracing::subscriber::with_default(subscriber, || {
			tracing::warn!(target: "vpn", attempt = 3, "reconnecting");
		});

		let breadcrumbs = sink.breadcrumbs();
		assert_eq!(breadcrumbs.len(), 1);
		assert_eq!(breadcrumbs[0].severity, Severity::Warning);
		assert_eq!(breadcrumbs[0].text, "reconnecting attempt=3");
	}

	#[test]
	fn skips_debug_events() {
		let (reporter, sink) = reporter_with_sink();
		let subscriber = tracing_subscriber::registry().with(BreadcrumbLayer::new(reporter));

		tracing::subscriber::with_default(subscriber, || {
			tracing::debug!(target: "vpn", "noisy detail");
		});

		assert!(sink.breadcrumbs().is_empty());
	}

	#[test]
	fn skips_own_events() {
		let (reporter, sink) = reporter_with_sink();
		let layer = BreadcrumbLayer::new(Arc::clone(&reporter));
		let subscriber = tracing_subscriber::registry().with(layer);

		tracing::subscriber::with_default(subscriber, || {
			reporter.report_now(Some("evt")).unwrap();
		});

		assert!(sink.breadcrumbs().is_empty());
		assert_eq!(sink.reports().len(), 1);
	}

	#[test]
	fn events_before_initialize_are_queued() {
		let reporter = Arc::new(ErrorReporter::new());
		let layer = BreadcrumbLayer::new(Arc::clone(&reporter));
		let subscriber = tracing_subscriber::registry().with(layer);

		tracing::subscriber::with_default(subscriber, || {
			tracing::error!(target: "vpn", "startup failed");
		});

		assert_eq!(reporter.pending_len(), 1);
	}
}
