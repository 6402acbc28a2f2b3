use std::thread::ThreadId;

use log::trace;

/// Lifecycle markers of one column scan, for external profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanEvent {
    Begin,
    Sorted,
    Complete
}

impl ScanEvent {
    pub fn marker(&self) -> char {
        match self {
            ScanEvent::Begin => 'B',
            ScanEvent::Sorted => 'O',
            ScanEvent::Complete => 'C'
        }
    }
}

/// Best-effort receiver of scan lifecycle markers. Implementations must not
/// fail the scan and are shared across scanning threads.
pub trait ScanEventSink: Send + Sync {
    fn mark_event(&self, lbid: u64, thread: ThreadId, session_id: u32, event: ScanEvent);
}

/// Forwards markers to the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl ScanEventSink for LogEventSink {
    fn mark_event(&self, lbid: u64, thread: ThreadId, session_id: u32, event: ScanEvent) {
        trace!("scan event {} lbid={} session={} thread={:?}", event.marker(), lbid, session_id, thread);
    }
}
