// Error taxonomy for the registration flow
//
// Validation and illegal-transition errors are ordinary outcomes: the flow
// re-asks the same step. Gateway failures live in `crate::external`.

use thiserror::Error;

use super::types::{CargoType, Scale};

/// Input rejected by a step validator; the message is shown to the actor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("⚠️ Ingrese solo números (sin letras ni símbolos).")]
    NotDigits,
    #[error("⚠️ Placa inválida. Debe tener 3 letras y 3 números, por ejemplo: NHU982.")]
    InvalidPlate,
    #[error("⚠️ Ingrese un número entero.")]
    NotAnInteger,
    #[error("⚠️ El valor debe estar entre {min} y {max}.")]
    OutOfRange { min: u32, max: u32 },
    #[error("⚠️ Ingrese un valor numérico mayor que cero (use coma para decimales).")]
    NotAPositiveQuantity,
    #[error("⚠️ El valor debe estar entre {min} y {max}.")]
    QuantityOutOfRange { min: f64, max: f64 },
    #[error("⚠️ Este campo no puede estar vacío.")]
    Empty,
    #[error("⚠️ Por favor envíe una FOTO (no texto).")]
    ExpectedImage,
    #[error("⚠️ Por favor responda con texto.")]
    ExpectedText,
    #[error("⚠️ Opción no válida. Escriba el número de una de las opciones.")]
    UnknownOption,
}

/// Why a step did not accept its input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// A known option that the current branch does not permit
    #[error("⚠️ La báscula {scale} no está disponible para la carga {cargo}.")]
    IllegalTransition { scale: Scale, cargo: CargoType },
}

/// Collected fields do not satisfy the record invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incomplete weighing record: missing {missing}")]
pub struct IncompleteRecord {
    pub missing: &'static str,
}
