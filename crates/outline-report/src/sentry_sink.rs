// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sink backed by the Sentry SDK.
//!
//! The SDK owns transport, event serialization, platform context collection
//! and panic capture. This module only translates the reporter's types into
//! the SDK's and strips identifying data before events leave the process.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use outline_report_core::{PendingRecord, ReportMessage, Severity};
use sentry::protocol::{Breadcrumb, Event};
use sentry::types::Dsn;
use sentry::{Client, ClientOptions, Hub, Level, TransportFactory};
use tracing::{debug, info};

use crate::config::ReporterConfig;
use crate::error::SinkError;
use crate::sink::{ReportSink, SinkFactory};

/// Category given to every breadcrumb the reporter forwards.
const BREADCRUMB_CATEGORY: &str = "log";

/// Builds [`SentrySink`]s from a [`ReporterConfig`].
///
/// The credential is parsed as a DSN. By default the client is bound to the
/// SDK's main hub and uses the SDK's HTTP transport. Breadcrumbs land on the
/// bound hub only: the SDK's panic integration captures a panic on the
/// panicking thread's hub, which other threads copy from the main hub when
/// they first touch the SDK, so a panic there may miss later breadcrumbs.
#[derive(Clone, Default)]
pub struct SentrySinkFactory {
	hub: Option<Arc<Hub>>,
	transport: Option<Arc<dyn TransportFactory>>,
}

impl SentrySinkFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds the client to `hub` instead of the main hub.
	pub fn with_hub(mut self, hub: Arc<Hub>) -> Self {
		self.hub = Some(hub);
		self
	}

	/// Sends events through `transport` instead of the SDK's default.
	pub fn with_transport(mut self, transport: Arc<dyn TransportFactory>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Builds the SDK options for `config`.
	fn client_options(&self, config: &ReporterConfig) -> Result<ClientOptions, SinkError> {
		let dsn = config
			.credential
			.expose()
			.trim()
			.parse::<Dsn>()
			.map_err(|e| SinkError::InvalidCredential(e.to_string()))?;

		Ok(ClientOptions {
			dsn: Some(dsn),
			release: config.host.release.clone().map(Cow::Owned),
			environment: Some(Cow::Owned(config.host.environment.clone())),
			max_breadcrumbs: config.max_breadcrumbs,
			send_default_pii: false,
			before_send: Some(Arc::new(scrub_identifying_data)),
			transport: self.transport.clone(),
			..Default::default()
		})
	}
}

impl SinkFactory for SentrySinkFactory {
	fn connect(&self, config: &ReporterConfig) -> Result<Arc<dyn ReportSink>, SinkError> {
		let options = self.client_options(config)?;
		let client = Arc::new(Client::with_options(sentry::apply_defaults(options)));

		let hub = self.hub.clone().unwrap_or_else(Hub::main);
		hub.bind_client(Some(Arc::clone(&client)));

		info!(
			app = %config.host.app_name,
			environment = %config.host.environment,
			"Sentry sink connected"
		);

		Ok(Arc::new(SentrySink {
			client,
			hub,
			close_timeout: config.flush_timeout,
		}))
	}
}

/// Removes data that identifies the device or its user from an event.
fn scrub_identifying_data(mut event: Event<'static>) -> Option<Event<'static>> {
	event.server_name = None;
	event.user = None;
	Some(event)
}

/// A sink that forwards to a Sentry client.
pub struct SentrySink {
	client: Arc<Client>,
	hub: Arc<Hub>,
	close_timeout: Duration,
}

impl ReportSink for SentrySink {
	fn record_breadcrumb(&self, record: PendingRecord) {
		self.hub.add_breadcrumb(to_breadcrumb(record));
	}

	fn capture_report(&self, report: ReportMessage) {
		let event_id = self.hub.capture_event(to_event(report));
		debug!(%event_id, "Report handed to sentry");
	}

	fn flush(&self, timeout: Duration) -> bool {
		self.client.flush(Some(timeout))
	}
}

impl Drop for SentrySink {
	fn drop(&mut self) {
		self.client.close(Some(self.close_timeout));
	}
}

fn to_level(severity: Severity) -> Level {
	match severity {
		Severity::Info => Level::Info,
		Severity::Warning => Level::Warning,
		Severity::Error => Level::Error,
	}
}

fn to_breadcrumb(record: PendingRecord) -> Breadcrumb {
	Breadcrumb {
		timestamp: SystemTime::from(record.recorded_at),
		category: Some(BREADCRUMB_CATEGORY.to_string()),
		level: to_level(record.severity),
		message: Some(record.text),
		..Default::default()
	}
}

fn to_event(report: ReportMessage) -> Event<'static> {
	Event {
		message: Some(report.message),
		level: to_level(report.severity),
		tags: report.tags.into_iter().collect(),
		..Default::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::buffer::DeferredBuffer;
	use crate::config::{Credential, HostContext};
	use outline_report_core::{CorrelationId, CORRELATION_TAG};
	use sentry::protocol::User;
	use sentry::test::TestTransport;
	use sentry::Scope;

	const DSN: &str = "https://public@o0.ingest.sentry.io/42";

	fn config(dsn: &str) -> ReporterConfig {
		ReporterConfig::new(
			Credential::new(dsn),
			HostContext::new("outline-client")
				.with_release("1.12.0")
				.with_environment("staging"),
		)
		.with_max_breadcrumbs(25)
	}

	#[test]
	fn severities_map_to_sentry_levels() {
		assert_eq!(to_level(Severity::Info), Level::Info);
		assert_eq!(to_level(Severity::Warning), Level::Warning);
		assert_eq!(to_level(Severity::Error), Level::Error);
	}

	#[test]
	fn breadcrumb_keeps_text_level_and_time() {
		let record = PendingRecord::new("tunnel up", Severity::Warning);
		let expected_time = SystemTime::from(record.recorded_at);

		let breadcrumb = to_breadcrumb(record);

		assert_eq!(breadcrumb.message.as_deref(), Some("tunnel up"));
		assert_eq!(breadcrumb.level, Level::Warning);
		assert_eq!(breadcrumb.timestamp, expected_time);
		assert_eq!(breadcrumb.category.as_deref(), Some(BREADCRUMB_CATEGORY));
	}

	#[test]
	fn event_carries_message_and_correlation_tag() {
		let report =
			ReportMessage::for_correlation("Android", &CorrelationId::from("evt-1"));

		let event = to_event(report);

		assert_eq!(event.message.as_deref(), Some("Android report (evt-1)"));
		assert_eq!(event.level, Level::Error);
		assert_eq!(event.tags.get(CORRELATION_TAG).map(String::as_str), Some("evt-1"));
	}

	#[test]
	fn scrub_removes_user_and_server_name() {
		let event = Event {
			server_name: Some("pixel-7".into()),
			user: Some(User {
				id: Some("device-id".to_string()),
				..Default::default()
			}),
			message: Some("kept".to_string()),
			..Default::default()
		};

		let scrubbed = scrub_identifying_data(event).unwrap();

		assert!(scrubbed.server_name.is_none());
		assert!(scrubbed.user.is_none());
		assert_eq!(scrubbed.message.as_deref(), Some("kept"));
	}

	#[test]
	fn options_follow_config() {
		let options = SentrySinkFactory::new().client_options(&config(DSN)).unwrap();

		assert!(options.dsn.is_some());
		assert_eq!(options.release.as_deref(), Some("1.12.0"));
		assert_eq!(options.environment.as_deref(), Some("staging"));
		assert_eq!(options.max_breadcrumbs, 25);
		assert!(!options.send_default_pii);
		assert!(options.before_send.is_some());
		assert!(options.transport.is_none());
	}

	#[test]
	fn invalid_dsn_is_rejected() {
		let result = SentrySinkFactory::new().connect(&config("not a dsn"));
		assert!(matches!(result, Err(SinkError::InvalidCredential(_))));
	}

	fn isolated_factory() -> (SentrySinkFactory, Arc<Hub>, Arc<TestTransport>) {
		let transport = TestTransport::new();
		let hub = Arc::new(Hub::new(None, Arc::new(Scope::default())));
		let factory = SentrySinkFactory::new()
			.with_hub(Arc::clone(&hub))
			.with_transport(Arc::new(Arc::clone(&transport)));
		(factory, hub, transport)
	}

	#[test]
	fn replayed_breadcrumbs_reach_the_captured_report() {
		let (factory, _hub, transport) = isolated_factory();
		let buffer = DeferredBuffer::new();
		let record = PendingRecord::new("tunnel up", Severity::Warning);
		let recorded_at = SystemTime::from(record.recorded_at);
		buffer.record(record);

		let replayed = buffer
			.initialize_with("Android", || factory.connect(&config(DSN)))
			.unwrap();
		let active = buffer.active().unwrap();
		active.sink.capture_report(ReportMessage::for_correlation(
			&active.report_label,
			&CorrelationId::from("evt-9"),
		));

		assert_eq!(replayed, 1);
		let events = transport.fetch_and_clear_events();
		assert_eq!(events.len(), 1);
		let event = &events[0];
		assert_eq!(event.message.as_deref(), Some("Android report (evt-9)"));
		assert_eq!(event.level, Level::Error);
		assert_eq!(event.tags.get(CORRELATION_TAG).map(String::as_str), Some("evt-9"));

		let breadcrumbs = &event.breadcrumbs.values;
		assert_eq!(breadcrumbs.len(), 1);
		assert_eq!(breadcrumbs[0].message.as_deref(), Some("tunnel up"));
		assert_eq!(breadcrumbs[0].level, Level::Warning);
		assert_eq!(breadcrumbs[0].timestamp, recorded_at);
	}

	#[test]
	fn captured_reports_are_scrubbed() {
		let (factory, hub, transport) = isolated_factory();
		let sink = factory.connect(&config(DSN)).unwrap();
		hub.configure_scope(|scope| {
			scope.set_user(Some(User {
				id: Some("device-id".to_string()),
				..Default::default()
			}));
		});

		sink.capture_report(ReportMessage::for_correlation(
			"Android",
			&CorrelationId::from("evt-10"),
		));

		let events = transport.fetch_and_clear_events();
		assert_eq!(events.len(), 1);
		assert!(events[0].server_name.is_none());
		assert!(events[0].user.is_none());
		assert_eq!(events[0].release.as_deref(), Some("1.12.0"));
		assert_eq!(events[0].environment.as_deref(), Some("staging"));
	}

	#[test]
	fn breadcrumbs_stay_on_the_bound_hub() {
		let (factory, hub, transport) = isolated_factory();
		let sink = factory.connect(&config(DSN)).unwrap();

		sink.record_breadcrumb(PendingRecord::new("live", Severity::Info));
		hub.capture_message("host event", Level::Info);

		let events = transport.fetch_and_clear_events();
		assert_eq!(events.len(), 1);
		let messages: Vec<_> = events[0]
			.breadcrumbs
			.values
			.iter()
			.filter_map(|b| b.message.as_deref())
			.collect();
		assert_eq!(messages, vec!["live"]);
	}
}
