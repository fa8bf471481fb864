use std::error::Error;

use espcompose_core::Composer;
use log::info;

use super::run::start;

pub(crate) fn compose(config_path: &str) -> Result<(), Box<dyn Error>> {
    let session = start(config_path)?;

    let graphs = Composer::new().compose_config(&session.config)?;
    let calls: usize = graphs.iter().map(|g| g.calls.len()).sum();
    info!("Composed {} devices with {} setter calls", graphs.len(), calls);

    print!("{}", serde_yaml::to_string(&graphs)?);
    Ok(())
}
