use anyhow::Result;
use icsig_acquire::{available_ports, Config};

pub fn list_ports(config: &Config) -> Result<()> {
    let ports = available_ports()?;

    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    println!("Serial ports:");
    for port in ports {
        let marker = if port == config.serial_port {
            " (configured)"
        } else {
            ""
        };
        println!("  {port}{marker}");
    }
    Ok(())
}
