use chrono::Utc;
use statig::prelude::*;
use tracing::{debug, error, info, warn};

use super::alert;
use super::record::WeighingRecord;
use super::session::SessionState;
use super::steps::{Capture, Step, CANCEL_COMMAND};
use super::summary;
use super::types::{ActorId, Decision, Input};
use crate::observability::flow_metrics;

pub const START_HINT: &str = "Escriba /start para registrar un nuevo pesaje.";
pub const CANCELLED: &str = "❌ Operación cancelada. Escriba /start para registrar un nuevo pesaje.";
const WELCOME: &str = "🚛 *Registro de pesaje*";
const CANCEL_FOOTER: &str = "💡 Escriba 0 o /cancelar en cualquier momento para cancelar.";
const SAVE_FAILED: &str = "⚠️ No se pudo guardar el registro. Intente confirmar nuevamente.";

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// Explicit start command
    Start,
    /// Cancellation request; checked before the step validator
    Cancel,
    Input(Input),
    /// The record store accepted the pending record
    Persisted,
    PersistFailed { reason: String },
}

/// Side effect requested by the flow; the dispatcher executes them in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Reply(String),
    Alert(String),
    Persist(WeighingRecord),
    Broadcast(String),
}

/// Effects collected while handling one event
#[derive(Debug, Default)]
pub struct Outbox {
    effects: Vec<Effect>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&mut self, text: impl Into<String>) {
        self.effects.push(Effect::Reply(text.into()));
    }

    pub fn alert(&mut self, text: impl Into<String>) {
        self.effects.push(Effect::Alert(text.into()));
    }

    pub fn persist(&mut self, record: WeighingRecord) {
        self.effects.push(Effect::Persist(record));
    }

    pub fn broadcast(&mut self, text: impl Into<String>) {
        self.effects.push(Effect::Broadcast(text.into()));
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

/// Registration dialogue for one actor
#[derive(Debug)]
pub struct RegistrationFlow {
    pub actor_id: ActorId,
    session: Option<SessionState>,
    pending: Option<WeighingRecord>,
}

impl RegistrationFlow {
    pub fn new(actor_id: ActorId) -> Self {
        Self {
            actor_id,
            session: None,
            pending: None,
        }
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn current_step(&self) -> Option<Step> {
        self.session.as_ref().map(|session| session.current_step)
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Classify a raw input; cancellation takes priority over the active step
    pub fn event_for(&self, input: Input) -> FlowEvent {
        let cancels = match self.current_step() {
            Some(step) => step.is_cancel(&input),
            None => input
                .as_text()
                .is_some_and(|text| text.trim().eq_ignore_ascii_case(CANCEL_COMMAND)),
        };

        if cancels {
            FlowEvent::Cancel
        } else {
            FlowEvent::Input(input)
        }
    }

    fn begin(&mut self, outbox: &mut Outbox) {
        let session = SessionState::new();
        info!(
            actor = %self.actor_id,
            transaction_id = %session.transaction_id,
            "Weighing registration started"
        );
        outbox.reply(format!(
            "{WELCOME}\n\n{}\n\n{CANCEL_FOOTER}",
            session.current_step.prompt(&session.fields)
        ));
        self.session = Some(session);
        self.pending = None;
        flow_metrics().record_started();
    }

    fn discard(&mut self, outbox: &mut Outbox) {
        if let Some(session) = self.session.take() {
            info!(
                actor = %self.actor_id,
                transaction_id = %session.transaction_id,
                step = session.current_step.name(),
                "Weighing registration cancelled"
            );
            flow_metrics().record_cancelled();
        }
        self.pending = None;
        outbox.reply(CANCELLED);
    }

    fn advance(&mut self, outbox: &mut Outbox, input: &Input) -> Outcome<State> {
        let actor_id = self.actor_id;
        let Some(session) = self.session.as_mut() else {
            outbox.reply(START_HINT);
            return Transition(State::idle());
        };
        let step = session.current_step;

        match step.accept(input, &session.fields) {
            Err(err) => {
                debug!(actor = %actor_id, step = step.name(), error = %err, "Input rejected");
                flow_metrics().record_validation_failure();
                outbox.reply(format!("{err}\n\n{}", step.prompt(&session.fields)));
                Handled
            }
            Ok(Capture::Decision(Decision::Cancel)) => {
                self.discard(outbox);
                Transition(State::idle())
            }
            Ok(Capture::Decision(Decision::Confirm)) => {
                match WeighingRecord::from_session(actor_id, session, Utc::now()) {
                    Ok(record) => {
                        self.pending = Some(record.clone());
                        outbox.persist(record);
                        Transition(State::submitting())
                    }
                    Err(err) => {
                        error!(actor = %actor_id, error = %err, "Confirmed session is incomplete");
                        outbox.reply(format!(
                            "{SAVE_FAILED}\n\n{}",
                            Step::Confirmation.prompt(&session.fields)
                        ));
                        Handled
                    }
                }
            }
            Ok(capture) => {
                session.fields.record(capture);
                if step == Step::DeadCount {
                    if let Some(alert) = alert::evaluate(&session.fields) {
                        warn!(
                            actor = %actor_id,
                            dead_count = alert.dead_count,
                            "Dead units reported"
                        );
                        outbox.alert(alert.text());
                    }
                }
                let next = step.next(&session.fields);
                debug!(actor = %actor_id, from = step.name(), to = next.name(), "Step advanced");
                session.current_step = next;
                outbox.reply(next.prompt(&session.fields));
                Handled
            }
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl RegistrationFlow {
    #[state]
    fn idle(&mut self, context: &mut Outbox, event: &FlowEvent) -> Outcome<State> {
        match event {
            FlowEvent::Start => {
                self.begin(context);
                Transition(State::collecting())
            }
            FlowEvent::Input(_) | FlowEvent::Cancel => {
                context.reply(START_HINT);
                Handled
            }
            FlowEvent::Persisted | FlowEvent::PersistFailed { .. } => Handled,
        }
    }

    #[state(superstate = "active")]
    fn collecting(&mut self, context: &mut Outbox, event: &FlowEvent) -> Outcome<State> {
        match event {
            FlowEvent::Input(input) => self.advance(context, input),
            _ => Super,
        }
    }

    #[state]
    fn submitting(&mut self, context: &mut Outbox, event: &FlowEvent) -> Outcome<State> {
        match event {
            FlowEvent::Persisted => {
                if let Some(record) = self.pending.take() {
                    info!(
                        actor = %self.actor_id,
                        record_id = %record.id,
                        plate = %record.vehicle_plate,
                        "Weighing record saved"
                    );
                    context.broadcast(summary::broadcast(&record));
                    context.reply(summary::completed(&record));
                    flow_metrics().record_completed();
                }
                self.session = None;
                Transition(State::idle())
            }
            FlowEvent::PersistFailed { reason } => {
                warn!(actor = %self.actor_id, reason = %reason, "Keeping session for retry");
                self.pending = None;
                if let Some(session) = self.session.as_mut() {
                    session.current_step = Step::Confirmation;
                    context.reply(format!(
                        "{SAVE_FAILED}\n\n{}",
                        Step::Confirmation.prompt(&session.fields)
                    ));
                }
                Transition(State::collecting())
            }
            _ => {
                warn!(actor = %self.actor_id, event = ?event, "Event ignored while saving");
                Handled
            }
        }
    }

    #[superstate]
    fn active(&mut self, context: &mut Outbox, event: &FlowEvent) -> Outcome<State> {
        match event {
            FlowEvent::Cancel => {
                self.discard(context);
                Transition(State::idle())
            }
            FlowEvent::Start => {
                info!(actor = %self.actor_id, "Start command during a transaction, restarting");
                self.session = None;
                self.begin(context);
                Transition(State::collecting())
            }
            _ => Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighing::types::ImageRef;

    fn drive(sm: &mut StateMachine<RegistrationFlow>, event: FlowEvent) -> Vec<Effect> {
        let mut outbox = Outbox::new();
        sm.handle_with_context(&event, &mut outbox);
        outbox.drain()
    }

    fn say(sm: &mut StateMachine<RegistrationFlow>, text: &str) -> Vec<Effect> {
        let event = sm.inner().event_for(Input::text(text));
        drive(sm, event)
    }

    fn replies(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Reply(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn started() -> StateMachine<RegistrationFlow> {
        let mut sm = RegistrationFlow::new(ActorId(42)).state_machine();
        drive(&mut sm, FlowEvent::Start);
        sm
    }

    #[test]
    fn test_start_asks_for_identity() {
        let mut sm = RegistrationFlow::new(ActorId(42)).state_machine();
        let effects = drive(&mut sm, FlowEvent::Start);

        assert_eq!(sm.inner().current_step(), Some(Step::Identity));
        assert!(replies(&effects)[0].contains("cédula"));
    }

    #[test]
    fn test_input_without_session_gets_start_hint() {
        let mut sm = RegistrationFlow::new(ActorId(42)).state_machine();
        let effects = say(&mut sm, "1234567890");
        assert_eq!(replies(&effects), vec![START_HINT]);
        assert!(sm.inner().is_idle());
    }

    #[test]
    fn test_invalid_input_reprompts_same_step() {
        let mut sm = started();
        let effects = say(&mut sm, "12a45");

        assert_eq!(sm.inner().current_step(), Some(Step::Identity));
        let reply = replies(&effects)[0];
        assert!(reply.starts_with("⚠️ Ingrese solo números"));
        assert!(reply.contains("cédula"));
    }

    #[test]
    fn test_zero_cancels_and_discards_fields() {
        let mut sm = started();
        say(&mut sm, "1234567890");
        say(&mut sm, "NHU982");

        let effects = say(&mut sm, "0");
        assert_eq!(replies(&effects), vec![CANCELLED]);
        assert!(sm.inner().is_idle());

        drive(&mut sm, FlowEvent::Start);
        let session = sm.inner().session().unwrap();
        assert_eq!(session.current_step, Step::Identity);
        assert_eq!(session.fields.identity_number, None);
        assert_eq!(session.fields.vehicle_plate, None);
    }

    #[test]
    fn test_restart_during_transaction_begins_fresh() {
        let mut sm = started();
        say(&mut sm, "1234567890");
        let first = sm.inner().session().unwrap().transaction_id;

        drive(&mut sm, FlowEvent::Start);
        let session = sm.inner().session().unwrap();
        assert_ne!(session.transaction_id, first);
        assert_eq!(session.current_step, Step::Identity);
    }

    #[test]
    fn test_confirm_requests_persist_then_completes() {
        let mut sm = started();
        for answer in ["1234567890", "NHU982", "4", "2", "320,5", "1", "15000"] {
            say(&mut sm, answer);
        }
        drive(
            &mut sm,
            FlowEvent::Input(Input::Image(ImageRef::new("/img/pesaje.jpg"))),
        );
        assert_eq!(sm.inner().current_step(), Some(Step::Confirmation));

        let effects = say(&mut sm, "1");
        let record = match effects.as_slice() {
            [Effect::Persist(record)] => record.clone(),
            other => panic!("unexpected effects: {other:?}"),
        };
        assert_eq!(record.fuel_volume, Some(320.5));
        assert!(!sm.inner().is_idle());

        let effects = drive(&mut sm, FlowEvent::Persisted);
        assert!(matches!(effects[0], Effect::Broadcast(_)));
        assert!(replies(&effects)[0].starts_with("✅"));
        assert!(sm.inner().is_idle());
    }

    #[test]
    fn test_persist_failure_keeps_session_at_confirmation() {
        let mut sm = started();
        for answer in ["1234567890", "NHU982", "4", "1", "100", "1", "2500"] {
            say(&mut sm, answer);
        }
        drive(
            &mut sm,
            FlowEvent::Input(Input::Image(ImageRef::new("/img/pesaje.jpg"))),
        );
        say(&mut sm, "1");

        let effects = drive(
            &mut sm,
            FlowEvent::PersistFailed {
                reason: "disk full".to_string(),
            },
        );
        assert!(replies(&effects)[0].starts_with("⚠️"));
        let session = sm.inner().session().unwrap();
        assert_eq!(session.current_step, Step::Confirmation);
        assert_eq!(session.fields.weight_kg, Some(2500.0));

        // the retry issues a new persist request without re-asking anything
        let effects = say(&mut sm, "1");
        assert!(matches!(effects.as_slice(), [Effect::Persist(_)]));
    }
}
