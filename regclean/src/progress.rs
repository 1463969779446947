//! Progress events and their hand-off from worker threads to one consumer.
//!
//! Validators run on a worker thread while the caller (a UI, the CLI) watches
//! from another. Events travel through an `mpsc` queue: producers never touch
//! consumer state directly, and a consumer that has gone away is not an error.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::finding::Finding;

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScanEvent {
    /// The session is about to dispatch `total_sections` validators.
    SessionStarted { total_sections: usize },
    /// A validator for the labelled section is starting.
    SectionChanged { label: String },
    /// A store path was visited; `items_scanned` is the running total.
    PathVisited { path: String, items_scanned: u64 },
    /// A finding passed the insertion checks and was recorded.
    FindingRecorded(Finding),
    /// A validator joined.
    SectionCompleted { completed: usize, total: usize },
}

/// Producer side of the event queue.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Sender<ScanEvent>,
}

/// Create a connected sink/receiver pair.
#[must_use]
pub fn channel() -> (ProgressSink, Receiver<ScanEvent>) {
    let (tx, rx) = mpsc::channel();
    (ProgressSink { tx }, rx)
}

impl ProgressSink {
    /// A sink whose events are dropped.
    #[must_use]
    pub fn detached() -> Self {
        channel().0
    }

    pub fn session_started(&self, total_sections: usize) {
        self.emit(ScanEvent::SessionStarted { total_sections });
    }

    pub fn section_changed(&self, label: &str) {
        self.emit(ScanEvent::SectionChanged {
            label: label.to_owned(),
        });
    }

    pub fn path_visited(&self, path: &str, items_scanned: u64) {
        self.emit(ScanEvent::PathVisited {
            path: path.to_owned(),
            items_scanned,
        });
    }

    pub fn finding_recorded(&self, finding: &Finding) {
        self.emit(ScanEvent::FindingRecorded(finding.clone()));
    }

    pub fn section_completed(&self, completed: usize, total: usize) {
        self.emit(ScanEvent::SectionCompleted { completed, total });
    }

    fn emit(&self, event: ScanEvent) {
        // Receiver dropped: nobody is watching, the scan goes on.
        let _ = self.tx.send(event);
    }
}

/// Callbacks for a running session, invoked on the dispatcher thread in the
/// order events were produced.
#[allow(unused_variables)]
pub trait ScanObserver: Send {
    fn on_session_started(&mut self, total_sections: usize) {}
    fn on_section_changed(&mut self, label: &str) {}
    fn on_path_visited(&mut self, path: &str, items_scanned: u64) {}
    fn on_finding_recorded(&mut self, finding: &Finding) {}
    fn on_section_completed(&mut self, completed: usize, total: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ScanObserver for NullObserver {}

/// Drain `rx` into `observer` until every sink has been dropped.
pub fn dispatch(rx: &Receiver<ScanEvent>, observer: &mut dyn ScanObserver) {
    for event in rx {
        match event {
            ScanEvent::SessionStarted { total_sections } => observer.on_session_started(total_sections),
            ScanEvent::SectionChanged { label } => observer.on_section_changed(&label),
            ScanEvent::PathVisited {
                path,
                items_scanned,
            } => observer.on_path_visited(&path, items_scanned),
            ScanEvent::FindingRecorded(finding) => observer.on_finding_recorded(&finding),
            ScanEvent::SectionCompleted { completed, total } => {
                observer.on_section_completed(completed, total);
            }
        }
    }
}
