pub mod alert;
pub mod dispatcher;
pub mod errors;
pub mod record;
pub mod session;
pub mod state_machine;
pub mod steps;
pub mod summary;
pub mod types;
pub mod validators;


pub use dispatcher::{DispatcherSettings, IncomingMessage, MessageContent, WeighingDispatcher};
pub use errors::{IncompleteRecord, StepError, ValidationError};
pub use record::{Invoice, WeighingRecord};
pub use session::{Fields, SessionState};
pub use state_machine::{Effect, FlowEvent, Outbox, RegistrationFlow};
pub use steps::Step;
pub use types::{ActorId, CargoType, FuelType, ImageKind, ImageRef, Input, Scale};
