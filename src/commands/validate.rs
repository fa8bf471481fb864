use std::error::Error;

use super::run::start;

pub(crate) fn validate(config_path: &str) -> Result<(), Box<dyn Error>> {
    let session = start(config_path)?;
    let config = &session.config;

    for device in &config.devices {
        println!(
            "{} v{} '{}': {} entities",
            device.descriptor.kind,
            device.descriptor.version,
            device.id,
            device.entities.len()
        );
    }
    println!(
        "Configuration of '{}' is valid ({} buses, {} devices, {} platform blocks).",
        session.core.espcompose.name,
        config.buses.len(),
        config.devices.len(),
        config.platforms.len()
    );
    Ok(())
}
