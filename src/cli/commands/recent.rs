use anyhow::Result;
use chrono::Local;

use crate::cli::commands::Command;
use crate::config::init_config;
use crate::external::records::RecordStore;
use crate::weighing::WeighingRecord;

pub struct RecentCommand {
    limit: usize,
}

impl RecentCommand {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Command for RecentCommand {
    async fn execute(&self) -> Result<()> {
        let config = init_config()?;
        let store = crate::external::record_store(config).await?;
        let listed = print_recent(store.as_ref(), self.limit).await;
        store.close().await;
        listed
    }
}

async fn print_recent(store: &dyn RecordStore, limit: usize) -> Result<()> {
    let records = store.recent(limit).await?;
    if records.is_empty() {
        println!("📋 No hay pesajes registrados");
        return Ok(());
    }

    println!("📋 Últimos {} pesajes:", records.len());
    for record in &records {
        println!("   {}", record_line(record));
    }
    Ok(())
}

/// One-line listing of a stored weighing
pub fn record_line(record: &WeighingRecord) -> String {
    let mut line = format!(
        "{}  {}  {}  {}  {} kg",
        record.recorded_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
        record.vehicle_plate,
        record.cargo_type,
        record.scale,
        record.weight_kg
    );
    if let Some(dead) = record.dead_count.filter(|dead| *dead > 0) {
        line.push_str(&format!("  ☠️ {dead}"));
    }
    line
}
