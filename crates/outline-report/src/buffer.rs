// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deferred delivery of breadcrumbs recorded before the sink exists.

use std::collections::VecDeque;
use std::sync::Arc;

use outline_report_core::PendingRecord;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ReportingError, Result, SinkError};
use crate::sink::ReportSink;

/// A connected sink together with the label its reports carry.
#[derive(Clone)]
pub struct ActiveSink {
	pub sink: Arc<dyn ReportSink>,
	pub report_label: Arc<str>,
}

/// Buffer state. The queue only exists until the sink is ready.
enum BufferState {
	Pending(VecDeque<PendingRecord>),
	/// A sink is being connected or replayed into. Records keep queueing.
	Initializing(VecDeque<PendingRecord>),
	Ready(ActiveSink),
}

/// Where [`DeferredBuffer::record`] sent a record.
enum Route {
	Queued(usize),
	Forward(Arc<dyn ReportSink>, PendingRecord),
}

/// Holds records produced before initialization and replays them, in order
/// and exactly once, when the sink becomes ready.
///
/// After initialization the buffer is bypassed: records are forwarded to the
/// sink as they arrive. The transition is one-way.
///
/// The lock only guards state changes. Sink calls, factory calls and logging
/// all happen with it released, so a factory or sink that logs through
/// [`BreadcrumbLayer`](crate::BreadcrumbLayer) records into the queue instead
/// of blocking.
pub struct DeferredBuffer {
	state: Mutex<BufferState>,
}

impl DeferredBuffer {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(BufferState::Pending(VecDeque::new())),
		}
	}

	/// Queues `record` or forwards it to the ready sink. Never fails.
	pub fn record(&self, record: PendingRecord) {
		let severity = record.severity;
		let route = {
			let mut state = self.state.lock();
			match &mut *state {
				BufferState::Pending(queue) | BufferState::Initializing(queue) => {
					queue.push_back(record);
					Route::Queued(queue.len())
				}
				BufferState::Ready(active) => Route::Forward(Arc::clone(&active.sink), record),
			}
		};

		match route {
			Route::Queued(queued) => {
				debug!(%severity, queued, "Queued breadcrumb until reporting is initialized");
			}
			Route::Forward(sink, record) => sink.record_breadcrumb(record),
		}
	}

	/// Connects the sink and drains the queue into it.
	///
	/// The buffer moves to an initializing state before `connect` runs, so a
	/// second call fails with [`ReportingError::AlreadyInitialized`] while the
	/// first is still in progress. Records arriving meanwhile are queued. The
	/// queue is replayed in batches until it is empty, and the ready state is
	/// published under the same lock that observed the empty queue, so every
	/// record lands either in the replay or at the sink after it.
	///
	/// If `connect` fails (or panics) the buffer returns to uninitialized with
	/// its queue intact.
	///
	/// Returns the number of records replayed.
	pub fn initialize_with<F>(&self, report_label: impl Into<Arc<str>>, connect: F) -> Result<usize>
	where
		F: FnOnce() -> std::result::Result<Arc<dyn ReportSink>, SinkError>,
	{
		if !self.begin_initialization() {
			warn!("Error reporting initialization attempted twice");
			return Err(ReportingError::AlreadyInitialized);
		}
		let mut guard = InitializingGuard {
			buffer: self,
			finished: false,
		};

		let active = ActiveSink {
			sink: connect()?,
			report_label: report_label.into(),
		};

		let mut replayed = 0;
		loop {
			let batch = {
				let mut state = self.state.lock();
				let batch = match &mut *state {
					BufferState::Initializing(queue) => std::mem::take(queue),
					_ => VecDeque::new(),
				};
				if batch.is_empty() {
					*state = BufferState::Ready(active.clone());
				}
				batch
			};
			if batch.is_empty() {
				break;
			}
			for record in batch {
				active.sink.record_breadcrumb(record);
				replayed += 1;
			}
		}
		guard.finished = true;

		info!(replayed, "Error reporting initialized");
		Ok(replayed)
	}

	/// Claims the buffer for initialization. False if already claimed or ready.
	fn begin_initialization(&self) -> bool {
		let mut state = self.state.lock();
		match &mut *state {
			BufferState::Pending(queue) => {
				let queue = std::mem::take(queue);
				*state = BufferState::Initializing(queue);
				true
			}
			BufferState::Initializing(_) | BufferState::Ready(_) => false,
		}
	}

	fn abandon_initialization(&self) {
		let mut state = self.state.lock();
		if let BufferState::Initializing(queue) = &mut *state {
			let queue = std::mem::take(queue);
			*state = BufferState::Pending(queue);
		}
	}

	/// Returns the sink and report label once initialized.
	pub fn active(&self) -> Option<ActiveSink> {
		match &*self.state.lock() {
			BufferState::Ready(active) => Some(active.clone()),
			BufferState::Pending(_) | BufferState::Initializing(_) => None,
		}
	}

	/// Returns the sink once initialized.
	pub fn sink(&self) -> Option<Arc<dyn ReportSink>> {
		self.active().map(|active| active.sink)
	}

	pub fn is_initialized(&self) -> bool {
		matches!(&*self.state.lock(), BufferState::Ready(_))
	}

	/// Number of records waiting for initialization. Always zero afterwards.
	pub fn pending_len(&self) -> usize {
		match &*self.state.lock() {
			BufferState::Pending(queue) | BufferState::Initializing(queue) => queue.len(),
			BufferState::Ready(_) => 0,
		}
	}
}

impl Default for DeferredBuffer {
	fn default() -> Self {
		Self::new()
	}
}

/// Puts the queue back into the pending state unless initialization finished.
struct InitializingGuard<'a> {
	buffer: &'a DeferredBuffer,
	finished: bool,
}

impl Drop for InitializingGuard<'_> {
	fn drop(&mut self) {
		if !self.finished {
			self.buffer.abandon_initialization();
		}
	}
}
