//! Dialogue steps and the transition table.
//!
//! Each step is bound to exactly one validator and one prompt. `Step::next`
//! is the full table of legal moves (current step x branch condition), so
//! every transition can be checked without running a conversation.

use serde::Serialize;

use super::errors::{StepError, ValidationError};
use super::session::Fields;
use super::summary;
use super::types::{CargoType, Choice, Decision, FuelType, ImageKind, ImageRef, Input, Scale};
use super::validators::{self, DEAD_COUNT_RANGE, LIVE_COUNT_RANGE, UNIT_COUNT_RANGE, WEIGHT_RANGE_KG};

/// Input that aborts the transaction at any step where zero is not an answer
pub const CANCEL_TOKEN: &str = "0";
/// Input that aborts the transaction at every step
pub const CANCEL_COMMAND: &str = "/cancelar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Identity,
    VehiclePlate,
    CargoSelection,
    UnitCount,
    FuelSelection,
    FuelVolume,
    InvoiceNumber,
    InvoiceSupplier,
    InvoiceProduct,
    InvoicePhoto,
    ScaleSelection,
    LiveCount,
    DeadCount,
    Weight,
    WeightPhoto,
    Confirmation,
}

/// A validated value produced by one step
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    IdentityNumber(String),
    VehiclePlate(String),
    CargoType(CargoType),
    UnitCount(u32),
    FuelType(FuelType),
    FuelVolume(f64),
    InvoiceNumber(String),
    InvoiceSupplier(String),
    InvoiceProduct(String),
    InvoicePhoto(ImageRef),
    Scale(Scale),
    LiveCount(u32),
    DeadCount(u32),
    Weight(f64),
    WeightPhoto(ImageRef),
    Decision(Decision),
}

impl Step {
    /// Field name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Step::Identity => "identity",
            Step::VehiclePlate => "vehicle_plate",
            Step::CargoSelection => "cargo_type",
            Step::UnitCount => "unit_count",
            Step::FuelSelection => "fuel_type",
            Step::FuelVolume => "fuel_volume",
            Step::InvoiceNumber => "invoice_detail_1",
            Step::InvoiceSupplier => "invoice_detail_2",
            Step::InvoiceProduct => "invoice_detail_3",
            Step::InvoicePhoto => "invoice_photo",
            Step::ScaleSelection => "scale_selection",
            Step::LiveCount => "live_count",
            Step::DeadCount => "dead_count",
            Step::Weight => "weight",
            Step::WeightPhoto => "weight_photo",
            Step::Confirmation => "confirmation",
        }
    }

    /// Photo kind expected by this step, if it takes an image
    pub fn image_kind(self) -> Option<ImageKind> {
        match self {
            Step::InvoicePhoto => Some(ImageKind::Invoice),
            Step::WeightPhoto => Some(ImageKind::Weight),
            _ => None,
        }
    }

    /// Steps where "0" is a legal answer and therefore not a cancel request
    pub fn accepts_zero(self) -> bool {
        matches!(self, Step::LiveCount | Step::DeadCount)
    }

    /// Cancellation check, evaluated before the step validator
    pub fn is_cancel(self, input: &Input) -> bool {
        let Some(text) = input.as_text().map(str::trim) else {
            return false;
        };
        if text.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return true;
        }
        text == CANCEL_TOKEN && !self.accepts_zero()
    }

    /// Validate `input` for this step
    pub fn accept(self, input: &Input, fields: &Fields) -> Result<Capture, StepError> {
        let raw = || validators::text(input);

        let capture = match self {
            Step::Identity => Capture::IdentityNumber(validators::identity_number(raw()?)?),
            Step::VehiclePlate => Capture::VehiclePlate(validators::vehicle_plate(raw()?)?),
            Step::CargoSelection => Capture::CargoType(validators::choice(raw()?, &CargoType::ALL)?),
            Step::UnitCount => {
                Capture::UnitCount(validators::integer_in_range(raw()?, UNIT_COUNT_RANGE)?)
            }
            Step::FuelSelection => Capture::FuelType(validators::choice(raw()?, &FuelType::ALL)?),
            Step::FuelVolume => Capture::FuelVolume(validators::positive_decimal(raw()?)?),
            Step::InvoiceNumber => Capture::InvoiceNumber(validators::free_text(raw()?)?),
            Step::InvoiceSupplier => Capture::InvoiceSupplier(validators::free_text(raw()?)?),
            Step::InvoiceProduct => Capture::InvoiceProduct(validators::free_text(raw()?)?),
            Step::InvoicePhoto => Capture::InvoicePhoto(validators::image(input)?),
            Step::ScaleSelection => Capture::Scale(select_scale(raw()?, fields)?),
            Step::LiveCount => {
                Capture::LiveCount(validators::integer_in_range(raw()?, LIVE_COUNT_RANGE)?)
            }
            Step::DeadCount => {
                Capture::DeadCount(validators::integer_in_range(raw()?, DEAD_COUNT_RANGE)?)
            }
            Step::Weight => Capture::Weight(validators::decimal_in_range(raw()?, WEIGHT_RANGE_KG)?),
            Step::WeightPhoto => Capture::WeightPhoto(validators::image(input)?),
            Step::Confirmation => Capture::Decision(validators::choice(raw()?, &Decision::ALL)?),
        };
        Ok(capture)
    }

    /// Transition table: the step that follows once this one has been captured
    pub fn next(self, fields: &Fields) -> Step {
        match (self, fields.cargo_type, fields.scale) {
            (Step::Identity, ..) => Step::VehiclePlate,
            (Step::VehiclePlate, ..) => Step::CargoSelection,

            (Step::CargoSelection, Some(cargo), _) if cargo.is_livestock() => Step::UnitCount,
            (Step::CargoSelection, Some(CargoType::Fuel), _) => Step::FuelSelection,
            (Step::CargoSelection, Some(CargoType::FeedConcentrate), _) => Step::InvoiceNumber,
            (Step::CargoSelection, ..) => Step::CargoSelection,

            (Step::FuelSelection, ..) => Step::FuelVolume,
            (Step::InvoiceNumber, ..) => Step::InvoiceSupplier,
            (Step::InvoiceSupplier, ..) => Step::InvoiceProduct,
            (Step::InvoiceProduct, ..) => Step::InvoicePhoto,
            (Step::UnitCount | Step::FuelVolume | Step::InvoicePhoto, ..) => Step::ScaleSelection,

            (Step::ScaleSelection, _, Some(scale)) if scale.requires_unit_audit() => Step::LiveCount,
            (Step::ScaleSelection, _, Some(_)) => Step::Weight,
            (Step::ScaleSelection, _, None) => Step::ScaleSelection,

            (Step::LiveCount, ..) => Step::DeadCount,
            (Step::DeadCount, ..) => Step::Weight,
            (Step::Weight, ..) => Step::WeightPhoto,
            (Step::WeightPhoto, ..) => Step::Confirmation,
            (Step::Confirmation, ..) => Step::Confirmation,
        }
    }

    /// Question asked when the step becomes active or is re-asked
    pub fn prompt(self, fields: &Fields) -> String {
        match self {
            Step::Identity => "Por favor, ingrese su cédula:".to_string(),
            Step::VehiclePlate => "Ingrese la placa del camión (3 letras y 3 números):".to_string(),
            Step::CargoSelection => menu("🚛 Seleccione el tipo de carga:", &CargoType::ALL),
            Step::UnitCount => format!(
                "¿Cuántos animales transporta? ({} a {}):",
                UNIT_COUNT_RANGE.start(),
                UNIT_COUNT_RANGE.end()
            ),
            Step::FuelSelection => menu("⛽ Seleccione el tipo de combustible:", &FuelType::ALL),
            Step::FuelVolume => {
                "Ingrese el volumen de combustible en galones (use coma para decimales):".to_string()
            }
            Step::InvoiceNumber => "🧾 Ingrese el número de la factura:".to_string(),
            Step::InvoiceSupplier => "Ingrese el proveedor que aparece en la factura:".to_string(),
            Step::InvoiceProduct => "Ingrese la referencia del producto de la factura:".to_string(),
            Step::InvoicePhoto => "📷 Envíe la foto de la factura:".to_string(),
            Step::ScaleSelection => {
                let offered = fields
                    .cargo_type
                    .map(Scale::offered_for)
                    .unwrap_or_else(|| Scale::ALL.to_vec());
                menu("⚖️ Seleccione la báscula:", &offered)
            }
            Step::LiveCount => format!(
                "¿Cuántos animales llegaron vivos? ({} a {}):",
                LIVE_COUNT_RANGE.start(),
                LIVE_COUNT_RANGE.end()
            ),
            Step::DeadCount => format!(
                "¿Cuántos animales llegaron muertos? ({} a {}):",
                DEAD_COUNT_RANGE.start(),
                DEAD_COUNT_RANGE.end()
            ),
            Step::Weight => "Ingrese el peso en kg (use coma para decimales):".to_string(),
            Step::WeightPhoto => "📷 Envíe la foto del pesaje:".to_string(),
            Step::Confirmation => format!(
                "{}\n\n¿Es correcto?\n\n{}",
                summary::confirmation(fields),
                options(&Decision::ALL)
            ),
        }
    }
}

fn select_scale(raw: &str, fields: &Fields) -> Result<Scale, StepError> {
    let cargo = fields.cargo_type.ok_or(ValidationError::UnknownOption)?;
    let offered = Scale::offered_for(cargo);

    match validators::choice(raw, &offered) {
        Ok(scale) => Ok(scale),
        Err(invalid) => match validators::named(raw, &Scale::ALL) {
            Some(scale) => Err(StepError::IllegalTransition { scale, cargo }),
            None => Err(invalid.into()),
        },
    }
}

fn menu<T: Choice>(title: &str, offered: &[T]) -> String {
    format!("{title}\n\n{}", options(offered))
}

fn options<T: Choice>(offered: &[T]) -> String {
    let lines: Vec<String> = offered
        .iter()
        .enumerate()
        .map(|(index, option)| format!("{}\u{fe0f}\u{20e3} {}", index + 1, option.label()))
        .collect();
    format!("{}\n\nEscriba el número de la opción:", lines.join("\n"))
}
