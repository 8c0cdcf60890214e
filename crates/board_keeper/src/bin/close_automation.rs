use anyhow::Result;
use board_keeper::{
    App, config, fatal,
    keepers::close_automation::{self, CloseOutcome},
};
use tracing::{info, warn};

fn main() -> Result<()> {
    let cfg = config::load()?;
    board_keeper::logging::init_tracing(&cfg);

    let app = App::init_from(&cfg)?;

    match close_automation::run_one(&app) {
        Ok(CloseOutcome::NoSigner) => warn!("SIGNER_KEYPAIR_PATH must be set to close automation"),
        Ok(outcome) => info!(?outcome, "close automation finished"),
        Err(e) => {
            fatal::report(&e);
            return Err(e.into());
        }
    }

    Ok(())
}
