//! Host runtime for the registration flow.
//!
//! The dispatcher owns one `RegistrationFlow` per actor, turns transport
//! messages into flow events, executes the effects the flow emits against
//! the gateways and feeds gateway outcomes back into the flow. Inputs for one
//! actor are serialized by that actor's mutex; different actors proceed in
//! parallel.

use moka::future::Cache;
use statig::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn, Instrument};

use super::state_machine::{Effect, FlowEvent, Outbox, RegistrationFlow, START_HINT};
use super::steps::Step;
use super::types::{ActorId, Input};
use crate::external::{Gateways, ImageMetadata};
use crate::observability::{create_transaction_span, flow_metrics, OperationTimer};
use crate::telemetry::generate_correlation_id;

const IMAGE_FAILED: &str = "⚠️ No se pudo guardar la foto. Envíela nuevamente.";
const FOLLOW_STEP: &str = "⚠️ Por favor siga las instrucciones del paso actual.";

type SharedFlow = Arc<Mutex<StateMachine<RegistrationFlow>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Start,
    Text(String),
    Photo(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub actor: ActorId,
    pub content: MessageContent,
}

impl IncomingMessage {
    pub fn start(actor: ActorId) -> Self {
        Self {
            actor,
            content: MessageContent::Start,
        }
    }

    pub fn text(actor: ActorId, text: impl Into<String>) -> Self {
        Self {
            actor,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn photo(actor: ActorId, bytes: Vec<u8>) -> Self {
        Self {
            actor,
            content: MessageContent::Photo(bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub idle_timeout: Duration,
    pub max_sessions: u64,
    pub broadcast_target: Option<String>,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
            broadcast_target: None,
        }
    }
}

pub struct WeighingDispatcher {
    sessions: Cache<ActorId, SharedFlow>,
    gateways: Gateways,
    broadcast_target: Option<String>,
}

impl WeighingDispatcher {
    pub fn new(gateways: Gateways, settings: DispatcherSettings) -> Self {
        let sessions = Cache::builder()
            .max_capacity(settings.max_sessions)
            .time_to_idle(settings.idle_timeout)
            .eviction_listener(|actor, _flow, cause| {
                debug!(actor = %actor, cause = ?cause, "Session evicted");
            })
            .build();

        Self {
            sessions,
            gateways,
            broadcast_target: settings.broadcast_target,
        }
    }

    /// Handle one message and return the replies for the actor, in order
    pub async fn handle(&self, message: IncomingMessage) -> Vec<String> {
        let span = create_transaction_span(message.actor.0, &generate_correlation_id());
        self.handle_inner(message).instrument(span).await
    }

    /// Step the actor is currently on, if a transaction is in progress
    pub async fn current_step(&self, actor: ActorId) -> Option<Step> {
        let flow = self.sessions.get(&actor).await?;
        let sm = flow.lock().await;
        sm.inner().current_step()
    }

    pub async fn active_sessions(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    async fn handle_inner(&self, message: IncomingMessage) -> Vec<String> {
        let IncomingMessage { actor, content } = message;

        let flow = match content {
            MessageContent::Start => {
                self.sessions
                    .get_with(actor, async move {
                        Arc::new(Mutex::new(RegistrationFlow::new(actor).state_machine()))
                    })
                    .await
            }
            _ => match self.sessions.get(&actor).await {
                Some(flow) => flow,
                None => return vec![START_HINT.to_string()],
            },
        };

        let mut sm = flow.lock().await;
        let event = match content {
            MessageContent::Start => FlowEvent::Start,
            MessageContent::Text(text) => sm.inner().event_for(Input::Text(text)),
            MessageContent::Photo(bytes) => match self.photo_event(actor, &sm, &bytes).await {
                Ok(event) => event,
                Err(reply) => return vec![reply],
            },
        };

        let replies = self.run(&mut sm, event).await;

        if let Some(step) = sm.inner().current_step() {
            tracing::Span::current().record("step", step.name());
        }
        if sm.inner().is_idle() {
            self.sessions.invalidate(&actor).await;
        }
        replies
    }

    /// Store an incoming photo when the active step expects one
    async fn photo_event(
        &self,
        actor: ActorId,
        sm: &StateMachine<RegistrationFlow>,
        bytes: &[u8],
    ) -> Result<FlowEvent, String> {
        let Some(session) = sm.inner().session() else {
            return Err(START_HINT.to_string());
        };
        let step = session.current_step;
        let Some(kind) = step.image_kind() else {
            debug!(step = step.name(), "Photo received at a text step");
            return Err(format!("{FOLLOW_STEP}\n\n{}", step.prompt(&session.fields)));
        };

        let metadata = ImageMetadata {
            actor,
            transaction_id: session.transaction_id,
            plate: session.fields.vehicle_plate.clone(),
            kind,
            received_at: chrono::Utc::now(),
        };
        match self.gateways.images.store(bytes, &metadata).await {
            Ok(reference) => Ok(FlowEvent::Input(Input::Image(reference))),
            Err(e) => {
                error!(error = %e, step = step.name(), "Failed to store photo");
                flow_metrics().record_gateway_failure("image_store");
                Err(IMAGE_FAILED.to_string())
            }
        }
    }

    /// Drive the flow with `event` and execute every effect it produces
    async fn run(&self, sm: &mut StateMachine<RegistrationFlow>, event: FlowEvent) -> Vec<String> {
        let mut outbox = Outbox::new();
        sm.handle_with_context(&event, &mut outbox);

        let mut queue: VecDeque<Effect> = outbox.drain().into();
        let mut replies = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Reply(text) => replies.push(text),
                Effect::Alert(text) => {
                    flow_metrics().record_critical_alert();
                    self.notify(&text).await;
                }
                Effect::Persist(record) => {
                    let timer = OperationTimer::new("record_store.save");
                    let outcome = match self.gateways.records.save(&record).await {
                        Ok(()) => FlowEvent::Persisted,
                        Err(e) => {
                            error!(record_id = %record.id, error = %e, "Failed to save weighing record");
                            flow_metrics().record_gateway_failure("record_store");
                            FlowEvent::PersistFailed {
                                reason: e.to_string(),
                            }
                        }
                    };
                    timer.finish();

                    sm.handle_with_context(&outcome, &mut outbox);
                    queue.extend(outbox.drain());
                }
                Effect::Broadcast(text) => self.notify(&text).await,
            }
        }

        replies
    }

    /// Best effort: a failed notification is logged and never undoes a save
    async fn notify(&self, text: &str) {
        if let Err(e) = self
            .gateways
            .notifier
            .broadcast(text, self.broadcast_target.clone())
            .await
        {
            warn!(error = %e, "Notification not delivered");
            flow_metrics().record_gateway_failure("notifier");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::images::MockImageStore;
    use crate::external::notifier::MockNotifier;
    use crate::external::records::MockRecordStore;
    use crate::external::GatewayError;
    use crate::weighing::types::ImageRef;

    fn dispatcher(
        records: MockRecordStore,
        images: MockImageStore,
        notifier: MockNotifier,
    ) -> WeighingDispatcher {
        let gateways = Gateways {
            records: Arc::new(records),
            images: Arc::new(images),
            notifier: Arc::new(notifier),
        };
        WeighingDispatcher::new(
            gateways,
            DispatcherSettings {
                broadcast_target: Some("-100200".to_string()),
                ..Default::default()
            },
        )
    }

    fn stored_images() -> MockImageStore {
        let mut images = MockImageStore::new();
        images
            .expect_store()
            .returning(|_, metadata| Ok(ImageRef::new(format!("/fotos/{}", metadata.file_name()))));
        images
    }

    async fn fuel_run_to_confirmation(dispatcher: &WeighingDispatcher, actor: ActorId) {
        dispatcher.handle(IncomingMessage::start(actor)).await;
        for answer in ["1234567890", "NHU982", "4", "1", "320,5", "1", "15000"] {
            dispatcher.handle(IncomingMessage::text(actor, answer)).await;
        }
        dispatcher.handle(IncomingMessage::photo(actor, vec![0xFF, 0xD8])).await;
    }

    #[tokio::test]
    async fn test_text_without_session_gets_start_hint() {
        let dispatcher = dispatcher(MockRecordStore::new(), MockImageStore::new(), MockNotifier::new());
        let replies = dispatcher.handle(IncomingMessage::text(ActorId(1), "hola")).await;

        assert_eq!(replies, vec![START_HINT.to_string()]);
        assert_eq!(dispatcher.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_confirm_saves_then_broadcasts_to_group() {
        let mut records = MockRecordStore::new();
        records
            .expect_save()
            .withf(|record| record.fuel_volume == Some(320.5) && record.weight_kg == 15000.0)
            .times(1)
            .returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_broadcast()
            .withf(|text, target| {
                text.contains("NUEVO REGISTRO DE PESAJE") && target.as_deref() == Some("-100200")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let dispatcher = dispatcher(records, stored_images(), notifier);
        let actor = ActorId(5);
        fuel_run_to_confirmation(&dispatcher, actor).await;

        let replies = dispatcher.handle(IncomingMessage::text(actor, "1")).await;
        assert!(replies[0].starts_with("✅ Registro completado"));
        assert_eq!(dispatcher.current_step(actor).await, None);
        assert_eq!(dispatcher.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_session_and_skips_broadcast() {
        let mut records = MockRecordStore::new();
        records.expect_save().times(1).returning(|_| {
            Err(GatewayError::Database {
                message: "database is locked".to_string(),
            })
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_broadcast().never();

        let dispatcher = dispatcher(records, stored_images(), notifier);
        let actor = ActorId(6);
        fuel_run_to_confirmation(&dispatcher, actor).await;

        let replies = dispatcher.handle(IncomingMessage::text(actor, "1")).await;
        assert!(replies[0].starts_with("⚠️ No se pudo guardar el registro"));
        assert_eq!(dispatcher.current_step(actor).await, Some(Step::Confirmation));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_undo_save() {
        let mut records = MockRecordStore::new();
        records.expect_save().times(1).returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier.expect_broadcast().times(1).returning(|_, _| {
            Err(GatewayError::Delivery {
                message: "chat unreachable".to_string(),
            })
        });

        let dispatcher = dispatcher(records, stored_images(), notifier);
        let actor = ActorId(7);
        fuel_run_to_confirmation(&dispatcher, actor).await;

        let replies = dispatcher.handle(IncomingMessage::text(actor, "1")).await;
        assert!(replies[0].starts_with("✅"));
        assert_eq!(dispatcher.current_step(actor).await, None);
    }

    #[tokio::test]
    async fn test_image_store_failure_stays_on_photo_step() {
        let mut images = MockImageStore::new();
        images.expect_store().times(1).returning(|_, _| {
            Err(GatewayError::Io {
                source: std::io::Error::other("disk full"),
            })
        });

        let dispatcher = dispatcher(MockRecordStore::new(), images, MockNotifier::new());
        let actor = ActorId(8);
        dispatcher.handle(IncomingMessage::start(actor)).await;
        for answer in ["1234567890", "NHU982", "4", "1", "320,5", "1", "15000"] {
            dispatcher.handle(IncomingMessage::text(actor, answer)).await;
        }

        let replies = dispatcher.handle(IncomingMessage::photo(actor, vec![1, 2, 3])).await;
        assert_eq!(replies, vec![IMAGE_FAILED.to_string()]);
        assert_eq!(dispatcher.current_step(actor).await, Some(Step::WeightPhoto));
    }

    #[tokio::test]
    async fn test_photo_at_text_step_is_not_stored() {
        let mut images = MockImageStore::new();
        images.expect_store().never();

        let dispatcher = dispatcher(MockRecordStore::new(), images, MockNotifier::new());
        let actor = ActorId(9);
        dispatcher.handle(IncomingMessage::start(actor)).await;

        let replies = dispatcher.handle(IncomingMessage::photo(actor, vec![1])).await;
        assert!(replies[0].starts_with(FOLLOW_STEP));
        assert!(replies[0].contains("cédula"));
        assert_eq!(dispatcher.current_step(actor).await, Some(Step::Identity));
    }

    #[tokio::test]
    async fn test_sessions_are_independent_per_actor() {
        let dispatcher = dispatcher(MockRecordStore::new(), MockImageStore::new(), MockNotifier::new());
        let (a, b) = (ActorId(10), ActorId(11));

        dispatcher.handle(IncomingMessage::start(a)).await;
        dispatcher.handle(IncomingMessage::start(b)).await;
        dispatcher.handle(IncomingMessage::text(a, "1234567890")).await;

        assert_eq!(dispatcher.current_step(a).await, Some(Step::VehiclePlate));
        assert_eq!(dispatcher.current_step(b).await, Some(Step::Identity));

        dispatcher.handle(IncomingMessage::text(b, "0")).await;
        assert_eq!(dispatcher.current_step(b).await, None);
        assert_eq!(dispatcher.current_step(a).await, Some(Step::VehiclePlate));
    }
}
