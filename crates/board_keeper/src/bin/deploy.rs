use anyhow::Result;
use board_keeper::{
    App, config, fatal,
    keepers::deploy::{self, DeployRequest},
};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    board_keeper::logging::init_tracing(&cfg);

    let period = Duration::from_secs(cfg.deploy_period_in_secs);
    let start = Instant::now();
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let app = App::init_from(&cfg)?;
    let mut last_round: Option<u64> = None;

    loop {
        ticker.tick().await;

        let round_id = match app.current_round() {
            Ok(Some(round_id)) => round_id,
            Ok(None) => {
                info!("board not initialized yet");
                continue;
            }
            Err(e) => {
                error!(error = %e, "failed to read board");
                continue;
            }
        };
        if last_round != Some(round_id) {
            info!(round_id, "tracking round");
            last_round = Some(round_id);
        }

        let request = DeployRequest {
            round_id,
            stake_per_square_sol: cfg.stake_per_square_sol,
            selection: &cfg.target_squares,
        };

        match deploy::run_one(&app, &request) {
            Ok(outcome) => debug!(round_id, ?outcome, "cycle finished"),
            Err(e) if e.is_fatal() => {
                fatal::report(&e);
                return Err(e.into());
            }
            Err(e) => error!(round_id, error = %e, "cycle failed, retrying next tick"),
        }
    }
}
