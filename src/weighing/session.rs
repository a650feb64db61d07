// Per-actor session state for one in-flight weighing transaction

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::steps::{Capture, Step};
use super::types::{CargoType, FuelType, ImageRef, Scale};

/// Values collected so far; one slot per field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fields {
    pub identity_number: Option<String>,
    pub vehicle_plate: Option<String>,
    pub cargo_type: Option<CargoType>,
    pub unit_count: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub fuel_volume: Option<f64>,
    pub invoice_number: Option<String>,
    pub invoice_supplier: Option<String>,
    pub invoice_product: Option<String>,
    pub invoice_photo: Option<ImageRef>,
    pub scale: Option<Scale>,
    pub live_count: Option<u32>,
    pub dead_count: Option<u32>,
    pub weight_kg: Option<f64>,
    pub weight_photo: Option<ImageRef>,
}

impl Fields {
    /// Store a validated value, overwriting any earlier value for the same field
    pub fn record(&mut self, capture: Capture) {
        match capture {
            Capture::IdentityNumber(value) => self.identity_number = Some(value),
            Capture::VehiclePlate(value) => self.vehicle_plate = Some(value),
            Capture::CargoType(value) => self.cargo_type = Some(value),
            Capture::UnitCount(value) => self.unit_count = Some(value),
            Capture::FuelType(value) => self.fuel_type = Some(value),
            Capture::FuelVolume(value) => self.fuel_volume = Some(value),
            Capture::InvoiceNumber(value) => self.invoice_number = Some(value),
            Capture::InvoiceSupplier(value) => self.invoice_supplier = Some(value),
            Capture::InvoiceProduct(value) => self.invoice_product = Some(value),
            Capture::InvoicePhoto(value) => self.invoice_photo = Some(value),
            Capture::Scale(value) => self.scale = Some(value),
            Capture::LiveCount(value) => self.live_count = Some(value),
            Capture::DeadCount(value) => self.dead_count = Some(value),
            Capture::Weight(value) => self.weight_kg = Some(value),
            Capture::WeightPhoto(value) => self.weight_photo = Some(value),
            // The decision drives the terminal transition and is not stored
            Capture::Decision(_) => {}
        }
    }
}

/// Progress of one transaction; created by the start command and dropped on
/// confirmation or cancellation
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub transaction_id: Uuid,
    pub current_step: Step,
    pub fields: Fields,
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            current_step: Step::Identity,
            fields: Fields::default(),
            started_at: Utc::now(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
