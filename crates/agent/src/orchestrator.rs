use std::collections::HashMap;
use std::sync::Arc;

use glidedesk_core::{AgentResponse, CapabilityName, EventSink, StreamEvent, SupportRequest};
use tracing::{info, warn};

use crate::capabilities::CapabilityAgent;
use crate::classify::IntentClassifier;

/// Owns the capability registry and routes each request to exactly one
/// agent. Registration happens once at startup; dispatch only reads.
pub struct Orchestrator {
    classifier: IntentClassifier,
    registry: HashMap<CapabilityName, Arc<dyn CapabilityAgent>>,
}

impl Orchestrator {
    pub fn new(classifier: IntentClassifier) -> Self {
        Self { classifier, registry: HashMap::new() }
    }

    /// Last-write-wins by capability name.
    pub fn register(&mut self, agent: Arc<dyn CapabilityAgent>) {
        self.registry.insert(agent.name(), agent);
    }

    pub fn is_registered(&self, capability: CapabilityName) -> bool {
        self.registry.contains_key(&capability)
    }

    pub fn capabilities(&self) -> Vec<CapabilityName> {
        let mut capabilities = self.registry.keys().copied().collect::<Vec<_>>();
        capabilities.sort();
        capabilities
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Classifies and delegates. Never fails for a well-formed request: an
    /// unregistered classified capability falls back to the FAQ agent, and
    /// an empty registry yields a synthesized user-safe response.
    pub async fn dispatch(&self, request: &SupportRequest) -> AgentResponse {
        let capability = self.classifier.classify(request);
        info!(
            event_name = "support.dispatch",
            capability = %capability,
            user_id = %request.user_id,
            "dispatching support request"
        );

        let agent = self
            .registry
            .get(&capability)
            .or_else(|| self.registry.get(&CapabilityName::Faq));

        match agent {
            Some(agent) => agent.handle(request).await,
            None => {
                warn!(
                    event_name = "support.dispatch.unroutable",
                    capability = %capability,
                    user_id = %request.user_id,
                    "no agent registered for capability and no FAQ fallback"
                );
                AgentResponse::text_only(
                    "Orchestrator",
                    "Support is temporarily unavailable. Please try again shortly.",
                )
            }
        }
    }

    /// Streamed dispatch: ordered thoughts, the reply text as a message
    /// chunk, the full response as a domain event, then exactly one
    /// `stream_end`. The sink drops anything emitted after its terminal
    /// event, so a cancelled consumer simply stops receiving.
    pub async fn dispatch_streamed(&self, request: &SupportRequest, sink: &dyn EventSink) {
        let capability = self.classifier.classify(request);
        sink.emit(StreamEvent::Thought(format!(
            "--- Initiating {} Request ---",
            capability_title(capability)
        )));
        sink.emit(StreamEvent::Thought(format!("User ID: {}", request.user_id)));

        let response = self.dispatch(request).await;
        sink.emit(StreamEvent::AgentMessageChunk(response.text.clone()));
        sink.emit(StreamEvent::AgentResponse(response));
        sink.emit(StreamEvent::StreamEnd { message: "stream finished".to_string() });
    }
}

fn capability_title(capability: CapabilityName) -> &'static str {
    match capability {
        CapabilityName::Faq => "FAQ",
        CapabilityName::Booking => "Booking",
        CapabilityName::Tracking => "Tracking",
        CapabilityName::Onboarding => "Onboarding",
        CapabilityName::IdValidation => "ID Verification",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use glidedesk_core::{
        AgentResponse, CapabilityName, EventSink, StreamEvent, SupportRequest,
    };

    use super::Orchestrator;
    use crate::capabilities::CapabilityAgent;
    use crate::classify::IntentClassifier;

    struct CannedAgent {
        capability: CapabilityName,
        reply: &'static str,
    }

    #[async_trait]
    impl CapabilityAgent for CannedAgent {
        fn name(&self) -> CapabilityName {
            self.capability
        }

        async fn handle(&self, _request: &SupportRequest) -> AgentResponse {
            AgentResponse::text_only(self.capability.agent_label(), self.reply)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<StreamEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: StreamEvent) {
            self.events.lock().expect("sink lock").push(event);
        }
    }

    fn canned(capability: CapabilityName, reply: &'static str) -> Arc<dyn CapabilityAgent> {
        Arc::new(CannedAgent { capability, reply })
    }

    #[tokio::test]
    async fn registration_is_last_write_wins() {
        let mut orchestrator = Orchestrator::new(IntentClassifier::default());
        orchestrator.register(canned(CapabilityName::Booking, "first"));
        orchestrator.register(canned(CapabilityName::Booking, "second"));

        let response =
            orchestrator.dispatch(&SupportRequest::with_text("u1", "book it")).await;
        assert_eq!(response.text, "second");
        assert_eq!(orchestrator.capabilities(), vec![CapabilityName::Booking]);
    }

    #[tokio::test]
    async fn unregistered_capability_falls_back_to_faq() {
        let mut orchestrator = Orchestrator::new(IntentClassifier::default());
        orchestrator.register(canned(CapabilityName::Faq, "faq fallback"));

        let response =
            orchestrator.dispatch(&SupportRequest::with_text("u1", "book a shipment")).await;
        assert_eq!(response.agent, "FAQAgent");
        assert_eq!(response.text, "faq fallback");
    }

    #[tokio::test]
    async fn empty_registry_yields_a_synthesized_response() {
        let orchestrator = Orchestrator::new(IntentClassifier::default());
        let response = orchestrator.dispatch(&SupportRequest::with_text("u1", "hello")).await;
        assert_eq!(response.agent, "Orchestrator");
        assert!(response.text.contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn streamed_dispatch_emits_ordered_events_with_one_terminal() {
        let mut orchestrator = Orchestrator::new(IntentClassifier::default());
        orchestrator.register(canned(CapabilityName::Booking, "Booking: details please"));

        let sink = RecordingSink::default();
        orchestrator
            .dispatch_streamed(&SupportRequest::with_text("u7", "book a crate"), &sink)
            .await;

        let events = sink.events.into_inner().expect("sink lock");
        let types = events.iter().map(StreamEvent::event_type).collect::<Vec<_>>();
        assert_eq!(
            types,
            vec!["thought", "thought", "agent_message_chunk", "agent_response", "stream_end"]
        );
        assert_eq!(events.iter().filter(|event| event.is_terminal()).count(), 1);

        assert_eq!(
            events[0],
            StreamEvent::Thought("--- Initiating Booking Request ---".to_string())
        );
        assert_eq!(events[1], StreamEvent::Thought("User ID: u7".to_string()));
    }
}
