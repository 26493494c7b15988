use std::sync::atomic::{AtomicBool, Ordering};

use axum::response::sse::Event;
use glidedesk_core::{EventSink, StreamEvent};
use serde_json::json;
use tokio::sync::mpsc;

/// Channel-backed event sink with a close-once termination contract.
///
/// The first terminal event (`stream_end` or `error`) closes the sink;
/// anything emitted afterwards is dropped. A dropped receiver (client
/// disconnect) also closes the sink, so producers stop forwarding without
/// rolling back side effects already committed.
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<StreamEvent>,
    closed: AtomicBool,
}

impl ChannelEventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, closed: AtomicBool::new(false) }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: StreamEvent) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        if event.is_terminal() {
            self.closed.store(true, Ordering::Release);
        }
        if let Err(dropped) = self.sender.send(event) {
            self.closed.store(true, Ordering::Release);
            tracing::warn!(
                event_name = "transport.stream.consumer_gone",
                last_event_type = dropped.0.event_type(),
                "stream consumer disconnected mid-flight, dropping remaining events"
            );
        }
    }
}

/// Maps a stream event onto the SSE wire: the event name is the type tag
/// and the data line carries the JSON payload, matching the
/// `event: <type>\ndata: <json>` relay contract.
pub fn sse_event(event: &StreamEvent) -> Event {
    let wire = serde_json::to_value(event).unwrap_or_else(|_| json!({"type": "error"}));
    let payload = wire.get("data").cloned().unwrap_or(serde_json::Value::Null);
    Event::default().event(event.event_type()).data(payload.to_string())
}
