// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Outline error reporting client.
//!
//! This crate holds the types shared between the reporting client and the
//! sinks it delivers to:
//!
//! - [`Severity`]: the closed set of breadcrumb levels the client owns
//! - [`PendingRecord`]: a breadcrumb recorded by the host application
//! - [`CorrelationId`]: the token linking a report to a client-side event
//! - [`ReportMessage`]: the structured message handed to a sink on report
//!
//! None of these types know about a particular reporting backend. Sinks
//! translate them into their native representation at the boundary.

pub mod correlation;
pub mod error;
pub mod record;
pub mod report;
pub mod severity;

pub use correlation::CorrelationId;
pub use error::{CoreError, Result};
pub use record::PendingRecord;
pub use report::{ReportMessage, CORRELATION_TAG, DEFAULT_REPORT_LABEL};
pub use severity::Severity;
