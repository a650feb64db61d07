// Message formatting for confirmation, completion and group broadcast

use chrono::Local;

use super::record::WeighingRecord;
use super::session::Fields;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Decimal with comma separator, the way drivers type it
fn decimal(value: f64) -> String {
    value.to_string().replace('.', ",")
}

/// Summary shown before the actor confirms
pub fn confirmation(fields: &Fields) -> String {
    let mut lines = vec!["📋 *Resumen del registro*".to_string(), RULE.to_string()];

    if let Some(identity) = &fields.identity_number {
        lines.push(format!("👤 Cédula: {identity}"));
    }
    if let Some(plate) = &fields.vehicle_plate {
        lines.push(format!("🚚 Placa: {plate}"));
    }
    if let Some(cargo) = fields.cargo_type {
        lines.push(format!("📦 Carga: {cargo}"));
    }
    if let Some(units) = fields.unit_count {
        lines.push(format!("🐄 Animales: {units}"));
    }
    if let Some(fuel) = fields.fuel_type {
        lines.push(format!("⛽ Combustible: {fuel}"));
    }
    if let Some(volume) = fields.fuel_volume {
        lines.push(format!("🛢️ Volumen: {} gal", decimal(volume)));
    }
    if let Some(number) = &fields.invoice_number {
        lines.push(format!("🧾 Factura: {number}"));
    }
    if let Some(supplier) = &fields.invoice_supplier {
        lines.push(format!("🏭 Proveedor: {supplier}"));
    }
    if let Some(product) = &fields.invoice_product {
        lines.push(format!("🏷️ Producto: {product}"));
    }
    if fields.invoice_photo.is_some() {
        lines.push("📷 Foto de factura: recibida".to_string());
    }
    if let Some(scale) = fields.scale {
        lines.push(format!("⚖️ Báscula: {scale}"));
    }
    if let Some(live) = fields.live_count {
        lines.push(format!("✅ Vivos: {live}"));
    }
    if let Some(dead) = fields.dead_count {
        lines.push(format!("☠️ Muertos: {dead}"));
    }
    if let Some(weight) = fields.weight_kg {
        lines.push(format!("🏋️ Peso: {} kg", decimal(weight)));
    }
    if fields.weight_photo.is_some() {
        lines.push("📷 Foto del pesaje: recibida".to_string());
    }

    lines.push(RULE.to_string());
    lines.join("\n")
}

fn record_lines(record: &WeighingRecord, markdown: bool) -> Vec<String> {
    let label = |text: &str| {
        if markdown {
            format!("*{text}:*")
        } else {
            format!("{text}:")
        }
    };

    let mut lines = vec![
        format!("👤 {} {}", label("Cédula"), record.identity_number),
        format!("🚚 {} {}", label("Placa"), record.vehicle_plate),
        format!("📦 {} {}", label("Carga"), record.cargo_type),
    ];
    if let Some(units) = record.unit_count {
        lines.push(format!("🐄 {} {units}", label("Animales")));
    }
    if let (Some(fuel), Some(volume)) = (record.fuel_type, record.fuel_volume) {
        lines.push(format!("⛽ {} {fuel}, {} gal", label("Combustible"), decimal(volume)));
    }
    if let Some(invoice) = &record.invoice {
        lines.push(format!(
            "🧾 {} {} ({}, {})",
            label("Factura"),
            invoice.number,
            invoice.supplier,
            invoice.product
        ));
        lines.push(format!("📷 {} {}", label("Foto factura"), invoice.photo));
    }
    lines.push(format!("⚖️ {} {}", label("Báscula"), record.scale));
    if let (Some(live), Some(dead)) = (record.live_count, record.dead_count) {
        lines.push(format!("🐂 {} {live} vivos / {dead} muertos", label("Animales")));
    }
    lines.push(format!("🏋️ {} {} kg", label("Peso"), decimal(record.weight_kg)));
    lines.push(format!("📷 {} {}", label("Foto pesaje"), record.weight_photo));
    lines.push(format!(
        "🕒 {} {}",
        label("Fecha"),
        record.recorded_at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
    ));
    lines
}

/// Reply sent to the actor once the record is stored
pub fn completed(record: &WeighingRecord) -> String {
    let mut lines = vec!["✅ Registro completado".to_string()];
    lines.extend(record_lines(record, false));
    lines.join("\n")
}

/// Full summary broadcast to the operations group after confirmation
pub fn broadcast(record: &WeighingRecord) -> String {
    let mut lines = vec!["🚨 *NUEVO REGISTRO DE PESAJE*".to_string(), RULE.to_string()];
    lines.extend(record_lines(record, true));
    lines.push(RULE.to_string());
    lines.join("\n")
}
