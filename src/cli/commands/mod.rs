use anyhow::Result;

pub mod console;
pub mod init_config;
pub mod recent;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub async fn show_how_to_start() -> Result<()> {
    println!("⚖️  Pesajes - Registro de pesajes");
    println!();
    println!("Comandos:");
    println!("  💬 pesajes console       # Registrar un pesaje desde la terminal");
    println!("  📋 pesajes recent        # Ver los últimos pesajes guardados");
    println!("  ⚙️  pesajes init-config   # Crear pesajes.toml con valores por defecto");
    println!();
    println!("💡 Empiece con 'pesajes console' y escriba /start");
    Ok(())
}
