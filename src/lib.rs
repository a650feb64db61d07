// Pesajes Library - weighing registration flow
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod database;
pub mod external;
pub mod observability;
pub mod telemetry;
pub mod weighing;

// Re-export key types for easy access
pub use config::{config, init_config, PesajesConfig};
#[cfg(feature = "database")]
pub use database::DatabaseManager;
pub use external::{
    ConsoleNotifier, GatewayError, Gateways, ImageMetadata, ImageStore, JsonLinesRecordStore,
    LocalImageStore, Notifier, RecordStore,
};
pub use observability::{create_transaction_span, flow_metrics, FlowMetrics, OperationTimer};
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use weighing::{
    ActorId, CargoType, DispatcherSettings, FuelType, IncomingMessage, Scale, Step,
    WeighingDispatcher, WeighingRecord,
};
