// Core types for the weighing registration flow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chat identity of the driver operating a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub i64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference returned by the image store; records never hold raw image bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw input handed to the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    /// An image that has already been stored
    Image(ImageRef),
}

impl Input {
    pub fn text(value: impl Into<String>) -> Self {
        Input::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text),
            Input::Image(_) => None,
        }
    }
}

/// Which photo a stored image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Invoice,
    Weight,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Invoice => "factura",
            ImageKind::Weight => "pesaje",
        }
    }
}

/// An option of an enumerated-choice step
pub trait Choice: Copy + PartialEq + fmt::Debug + 'static {
    /// Label shown to the actor
    fn label(&self) -> &'static str;

    /// Extra spellings accepted besides the label and the option number
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Error returned when a stored code does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    YoungLivestock,
    FeedConcentrate,
    MatureLivestock,
    Fuel,
}

impl CargoType {
    pub const ALL: [CargoType; 4] = [
        CargoType::YoungLivestock,
        CargoType::FeedConcentrate,
        CargoType::MatureLivestock,
        CargoType::Fuel,
    ];

    /// Stable code used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CargoType::YoungLivestock => "young_livestock",
            CargoType::FeedConcentrate => "feed_concentrate",
            CargoType::MatureLivestock => "mature_livestock",
            CargoType::Fuel => "fuel",
        }
    }

    pub fn is_livestock(&self) -> bool {
        matches!(self, CargoType::YoungLivestock | CargoType::MatureLivestock)
    }
}

impl Choice for CargoType {
    fn label(&self) -> &'static str {
        match self {
            CargoType::YoungLivestock => "Ganado de levante",
            CargoType::FeedConcentrate => "Concentrado",
            CargoType::MatureLivestock => "Ganado gordo",
            CargoType::Fuel => "Combustible",
        }
    }
}

impl fmt::Display for CargoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CargoType {
    type Err = UnknownCode;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        CargoType::ALL
            .into_iter()
            .find(|cargo| cargo.as_str() == code)
            .ok_or_else(|| UnknownCode {
                kind: "cargo type",
                code: code.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Diesel,
    Regular,
}

impl FuelType {
    pub const ALL: [FuelType; 2] = [FuelType::Diesel, FuelType::Regular];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Diesel => "diesel",
            FuelType::Regular => "regular",
        }
    }
}

impl Choice for FuelType {
    fn label(&self) -> &'static str {
        match self {
            FuelType::Diesel => "Diésel",
            FuelType::Regular => "Corriente",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            FuelType::Diesel => &["acpm"],
            FuelType::Regular => &["gasolina"],
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FuelType {
    type Err = UnknownCode;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str() == code)
            .ok_or_else(|| UnknownCode {
                kind: "fuel type",
                code: code.to_string(),
            })
    }
}

/// Weighing station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Italcol,
    Bogota,
    FincaTranquera,
}

impl Scale {
    pub const ALL: [Scale; 3] = [Scale::Italcol, Scale::Bogota, Scale::FincaTranquera];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Italcol => "italcol",
            Scale::Bogota => "bogota",
            Scale::FincaTranquera => "finca_tranquera",
        }
    }

    /// Whether this scale may be selected for the given cargo
    pub fn allows(&self, cargo: CargoType) -> bool {
        match self {
            Scale::Italcol => cargo == CargoType::FeedConcentrate,
            Scale::Bogota => cargo == CargoType::MatureLivestock,
            Scale::FincaTranquera => true,
        }
    }

    /// Scales offered for a cargo type, in display order
    pub fn offered_for(cargo: CargoType) -> Vec<Scale> {
        Scale::ALL
            .into_iter()
            .filter(|scale| scale.allows(cargo))
            .collect()
    }

    /// The Bogotá scale requires live/dead unit counts
    pub fn requires_unit_audit(&self) -> bool {
        matches!(self, Scale::Bogota)
    }
}

impl Choice for Scale {
    fn label(&self) -> &'static str {
        match self {
            Scale::Italcol => "Italcol",
            Scale::Bogota => "Bogotá",
            Scale::FincaTranquera => "Finca Tranquera",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Scale::FincaTranquera => &["tranquera"],
            _ => &[],
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scale {
    type Err = UnknownCode;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Scale::ALL
            .into_iter()
            .find(|scale| scale.as_str() == code)
            .ok_or_else(|| UnknownCode {
                kind: "scale",
                code: code.to_string(),
            })
    }
}

/// Answer to the final confirmation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

impl Decision {
    pub const ALL: [Decision; 2] = [Decision::Confirm, Decision::Cancel];
}

impl Choice for Decision {
    fn label(&self) -> &'static str {
        match self {
            Decision::Confirm => "Sí, confirmar",
            Decision::Cancel => "Cancelar",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Decision::Confirm => &["si", "confirmar", "ok"],
            Decision::Cancel => &["no"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_offer_depends_on_cargo() {
        assert_eq!(
            Scale::offered_for(CargoType::FeedConcentrate),
            vec![Scale::Italcol, Scale::FincaTranquera]
        );
        assert_eq!(
            Scale::offered_for(CargoType::MatureLivestock),
            vec![Scale::Bogota, Scale::FincaTranquera]
        );
        assert_eq!(Scale::offered_for(CargoType::Fuel), vec![Scale::FincaTranquera]);
        assert_eq!(
            Scale::offered_for(CargoType::YoungLivestock),
            vec![Scale::FincaTranquera]
        );
    }

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for cargo in CargoType::ALL {
            assert_eq!(cargo.as_str().parse::<CargoType>().unwrap(), cargo);
        }
        for scale in Scale::ALL {
            assert_eq!(scale.as_str().parse::<Scale>().unwrap(), scale);
        }
        assert!("camion".parse::<FuelType>().is_err());
    }
}
