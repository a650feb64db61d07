// Weighing record: the immutable projection handed to the record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::IncompleteRecord;
use super::session::{Fields, SessionState};
use super::types::{ActorId, CargoType, FuelType, ImageRef, Scale};

/// Invoice captured for feed-concentrate loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub supplier: String,
    pub product: String,
    pub photo: ImageRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeighingRecord {
    pub id: Uuid,
    pub actor_id: ActorId,
    pub identity_number: String,
    pub vehicle_plate: String,
    pub cargo_type: CargoType,
    pub unit_count: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub fuel_volume: Option<f64>,
    pub invoice: Option<Invoice>,
    pub scale: Scale,
    pub live_count: Option<u32>,
    pub dead_count: Option<u32>,
    pub weight_kg: f64,
    pub weight_photo: ImageRef,
    pub recorded_at: DateTime<Utc>,
}

fn required<T: Clone>(value: &Option<T>, missing: &'static str) -> Result<T, IncompleteRecord> {
    value.clone().ok_or(IncompleteRecord { missing })
}

impl WeighingRecord {
    /// Project a finished session into a record.
    ///
    /// Branch-specific fields are copied only when the cargo type or scale
    /// calls for them, and are required in that case.
    pub fn from_session(
        actor_id: ActorId,
        session: &SessionState,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, IncompleteRecord> {
        let fields: &Fields = &session.fields;
        let cargo_type = required(&fields.cargo_type, "cargo_type")?;
        let scale = required(&fields.scale, "scale")?;

        let unit_count = if cargo_type.is_livestock() {
            Some(required(&fields.unit_count, "unit_count")?)
        } else {
            None
        };

        let (fuel_type, fuel_volume) = if cargo_type == CargoType::Fuel {
            (
                Some(required(&fields.fuel_type, "fuel_type")?),
                Some(required(&fields.fuel_volume, "fuel_volume")?),
            )
        } else {
            (None, None)
        };

        let invoice = if cargo_type == CargoType::FeedConcentrate {
            Some(Invoice {
                number: required(&fields.invoice_number, "invoice_number")?,
                supplier: required(&fields.invoice_supplier, "invoice_supplier")?,
                product: required(&fields.invoice_product, "invoice_product")?,
                photo: required(&fields.invoice_photo, "invoice_photo")?,
            })
        } else {
            None
        };

        let (live_count, dead_count) = if scale.requires_unit_audit() {
            (
                Some(required(&fields.live_count, "live_count")?),
                Some(required(&fields.dead_count, "dead_count")?),
            )
        } else {
            (None, None)
        };

        Ok(Self {
            id: session.transaction_id,
            actor_id,
            identity_number: required(&fields.identity_number, "identity_number")?,
            vehicle_plate: required(&fields.vehicle_plate, "vehicle_plate")?,
            cargo_type,
            unit_count,
            fuel_type,
            fuel_volume,
            invoice,
            scale,
            live_count,
            dead_count,
            weight_kg: required(&fields.weight_kg, "weight_kg")?,
            weight_photo: required(&fields.weight_photo, "weight_photo")?,
            recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuel_session() -> SessionState {
        let mut session = SessionState::new();
        session.fields = Fields {
            identity_number: Some("1234567890".to_string()),
            vehicle_plate: Some("NHU982".to_string()),
            cargo_type: Some(CargoType::Fuel),
            fuel_type: Some(FuelType::Diesel),
            fuel_volume: Some(320.5),
            scale: Some(Scale::FincaTranquera),
            weight_kg: Some(15000.0),
            weight_photo: Some(ImageRef::new("/img/pesaje.jpg")),
            ..Default::default()
        };
        session
    }

    #[test]
    fn test_fuel_record_has_only_fuel_details() {
        let session = fuel_session();
        let record = WeighingRecord::from_session(ActorId(7), &session, Utc::now()).unwrap();

        assert_eq!(record.id, session.transaction_id);
        assert_eq!(record.fuel_type, Some(FuelType::Diesel));
        assert_eq!(record.fuel_volume, Some(320.5));
        assert_eq!(record.unit_count, None);
        assert_eq!(record.invoice, None);
        assert_eq!(record.live_count, None);
        assert_eq!(record.dead_count, None);
    }

    #[test]
    fn test_stray_fields_outside_the_branch_are_dropped() {
        let mut session = fuel_session();
        session.fields.dead_count = Some(3);
        let record = WeighingRecord::from_session(ActorId(7), &session, Utc::now()).unwrap();
        assert_eq!(record.dead_count, None);
    }

    #[test]
    fn test_missing_branch_field_is_reported() {
        let mut session = fuel_session();
        session.fields.fuel_volume = None;
        let err = WeighingRecord::from_session(ActorId(7), &session, Utc::now()).unwrap_err();
        assert_eq!(err.missing, "fuel_volume");
    }

    #[test]
    fn test_bogota_requires_counts() {
        let mut session = fuel_session();
        session.fields.cargo_type = Some(CargoType::MatureLivestock);
        session.fields.unit_count = Some(150);
        session.fields.scale = Some(Scale::Bogota);
        session.fields.live_count = Some(148);

        let err = WeighingRecord::from_session(ActorId(7), &session, Utc::now()).unwrap_err();
        assert_eq!(err.missing, "dead_count");
    }
}
