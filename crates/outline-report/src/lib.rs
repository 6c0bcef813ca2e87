// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error reporting client with deferred breadcrumb delivery.
//!
//! Hosts usually start logging long before they have the credentials needed
//! to talk to a reporting backend. This crate lets them record breadcrumbs
//! from the first line of `main`: anything recorded before
//! [`ErrorReporter::initialize`] is held in memory and replayed, in order and
//! exactly once, when the sink starts. After that, breadcrumbs go straight to
//! the sink.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use outline_report::{ErrorReporter, ReporterConfig, SentrySinkFactory};
//!
//! let reporter = Arc::new(ErrorReporter::new());
//! reporter.record_info("service starting");
//!
//! let config = ReporterConfig::load("/etc/outline/report.toml")?;
//! reporter.initialize(&config, &SentrySinkFactory::new())?;
//!
//! reporter.record_warning("tunnel reconnecting");
//! let id = reporter.report_now(None)?;
//! println!("report sent as {id}");
//! ```
//!
//! # Sinks
//!
//! - [`SentrySinkFactory`]: forwards to the Sentry SDK, which owns transport,
//!   platform context and panic capture
//! - [`MemorySink`]: keeps everything in memory
//!
//! Any type implementing [`SinkFactory`], including a closure, can be passed
//! to [`ErrorReporter::initialize`].
//!
//! # Logging
//!
//! The crate logs through `tracing`. [`BreadcrumbLayer`] turns the host's own
//! `tracing` events into breadcrumbs.

mod buffer;
mod config;
mod error;
mod layer;
mod memory;
mod reporter;
mod sentry_sink;
mod sink;

pub use buffer::{ActiveSink, DeferredBuffer};
pub use config::{
	ConfigError, Credential, HostContext, ReporterConfig, DEFAULT_FLUSH_TIMEOUT,
	DEFAULT_MAX_BREADCRUMBS, REDACTED,
};
pub use error::{ReportingError, Result, SinkError};
pub use layer::BreadcrumbLayer;
pub use memory::{MemorySink, MemorySinkFactory};
pub use reporter::ErrorReporter;
pub use sentry_sink::{SentrySink, SentrySinkFactory};
pub use sink::{ReportSink, SinkFactory};

// Re-export core types for convenience
pub use outline_report_core::{
	CorrelationId, PendingRecord, ReportMessage, Severity, CORRELATION_TAG, DEFAULT_REPORT_LABEL,
};
