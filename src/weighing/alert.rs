// Alert policy: dead units reported at the Bogotá scale

use super::session::Fields;

const FRAME: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Critical alert raised when animals arrive dead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalAlert {
    pub dead_count: u32,
    pub vehicle_plate: Option<String>,
    pub identity_number: Option<String>,
    pub scale: Option<String>,
}

impl CriticalAlert {
    pub fn text(&self) -> String {
        format!(
            "🚨🚨🚨 ALERTA CRÍTICA 🚨🚨🚨\n\
             {FRAME}\n\
             ☠️ *SE REPORTARON {dead} ANIMALES MUERTOS*\n\
             🚚 *Placa:* `{plate}`\n\
             👤 *Cédula:* `{identity}`\n\
             ⚖️ *Báscula:* {scale}\n\
             {FRAME}\n\
             ⚠️ *REVISAR DE INMEDIATO*",
            dead = self.dead_count,
            plate = self.vehicle_plate.as_deref().unwrap_or("—"),
            identity = self.identity_number.as_deref().unwrap_or("—"),
            scale = self.scale.as_deref().unwrap_or("—"),
        )
    }
}

/// Decide whether the collected fields call for a critical alert
pub fn evaluate(fields: &Fields) -> Option<CriticalAlert> {
    let dead_count = fields.dead_count.filter(|count| *count > 0)?;

    Some(CriticalAlert {
        dead_count,
        vehicle_plate: fields.vehicle_plate.clone(),
        identity_number: fields.identity_number.clone(),
        scale: fields.scale.map(|scale| scale.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighing::types::Scale;

    fn fields_with_dead(dead: Option<u32>) -> Fields {
        Fields {
            identity_number: Some("1234567890".to_string()),
            vehicle_plate: Some("NHU982".to_string()),
            scale: Some(Scale::Bogota),
            live_count: Some(148),
            dead_count: dead,
            ..Default::default()
        }
    }

    #[test]
    fn test_dead_units_raise_alert() {
        let alert = evaluate(&fields_with_dead(Some(2))).expect("alert expected");
        assert_eq!(alert.dead_count, 2);

        let text = alert.text();
        assert!(text.contains("ALERTA CRÍTICA"));
        assert!(text.contains("SE REPORTARON 2 ANIMALES MUERTOS"));
        assert!(text.contains("NHU982"));
        assert!(text.contains("Bogotá"));
    }

    #[test]
    fn test_zero_or_missing_dead_count_is_quiet() {
        assert_eq!(evaluate(&fields_with_dead(Some(0))), None);
        assert_eq!(evaluate(&fields_with_dead(None)), None);
    }
}
