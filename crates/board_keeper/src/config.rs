use anyhow::{Context, Result, bail};
use board_lib::instruction::Target;
use solana_commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;
use std::{env, str::FromStr};

pub const DEFAULT_CU_LIMIT: u32 = 1_400_000;
pub const DEFAULT_CU_PRICE_MICRO_LAMPORTS: u64 = 1_000;

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub solana_rpc_url: String,
    pub commitment: CommitmentLevel,
    pub rpc_timeout_ms: u64,
    pub tx_max_retries: usize,
    pub preflight: bool,

    pub signer_keypair_path: Option<String>,

    pub program_id: Pubkey,
    pub fee_collector: Pubkey,

    pub stake_per_square_sol: f64,
    pub target_squares: Vec<Target>,
    pub cu_limit: u32,
    pub cu_price_micro_lamports: u64,

    pub deploy_period_in_secs: u64,

    pub log_level: String,
    pub log_format: String,
    pub log_color: bool,

    pub journal_path: Option<String>,
    pub journal_retention_days: u64,
}

pub fn load() -> Result<RuntimeConfig> {
    let _ = dotenvy::dotenv();

    let solana_rpc_url = env_str("SOLANA_RPC_URL", None).context("SOLANA_RPC_URL must be set")?;
    let commitment = env_commitment("COMMITMENT", None).context("COMMITMENT must be set")?;
    let rpc_timeout_ms = env_u64("RPC_TIMEOUT_MS", None).context("RPC_TIMEOUT_MS must be set")?;
    let tx_max_retries = env_usize("TX_MAX_RETRIES", None).context("TX_MAX_RETRIES must be set")?;
    let preflight = env_bool("PREFLIGHT", None).context("PREFLIGHT must be set")?;

    let signer_keypair_path = env_str("SIGNER_KEYPAIR_PATH", None);

    let program_id = env_pubkey("PROGRAM_ID", None).context("PROGRAM_ID must be set")?;
    let fee_collector = env_pubkey("FEE_COLLECTOR", None).context("FEE_COLLECTOR must be set")?;

    let stake_per_square_sol =
        env_f64("STAKE_PER_SQUARE_SOL", None).context("STAKE_PER_SQUARE_SOL must be set")?;
    if !stake_per_square_sol.is_finite() || stake_per_square_sol < 0.0 {
        bail!("STAKE_PER_SQUARE_SOL must be a non-negative number");
    }
    let target_squares = parse_squares(
        &env_str("TARGET_SQUARES", None).context("TARGET_SQUARES must be set")?,
    )
    .context("TARGET_SQUARES is invalid")?;
    let cu_limit = env_u32("CU_LIMIT", Some(DEFAULT_CU_LIMIT)).context("CU_LIMIT is invalid")?;
    let cu_price_micro_lamports =
        env_u64("CU_PRICE_MICRO_LAMPORTS", Some(DEFAULT_CU_PRICE_MICRO_LAMPORTS))
            .context("CU_PRICE_MICRO_LAMPORTS is invalid")?;

    let deploy_period_in_secs =
        env_u64("DEPLOY_PERIOD_IN_SECS", None).context("DEPLOY_PERIOD_IN_SECS must be set")?;

    let log_level = env_str("LOG_LEVEL", Some("info".to_string())).unwrap_or_default();
    let log_format = env_str("LOG_FORMAT", Some("json".to_string())).unwrap_or_default();
    let log_color = env_bool("LOG_COLOR", Some(false)).unwrap_or(false);

    let journal_path = env_str("JOURNAL_PATH", None);
    let journal_retention_days =
        env_u64("JOURNAL_RETENTION_DAYS", Some(30)).context("JOURNAL_RETENTION_DAYS is invalid")?;

    Ok(RuntimeConfig {
        solana_rpc_url,
        commitment,
        rpc_timeout_ms,
        tx_max_retries,
        preflight,
        signer_keypair_path,
        program_id,
        fee_collector,
        stake_per_square_sol,
        target_squares,
        cu_limit,
        cu_price_micro_lamports,
        deploy_period_in_secs,
        log_level,
        log_format,
        log_color,
        journal_path,
        journal_retention_days,
    })
}

/// Parse a comma separated list of 1-based square ids, e.g. `"1, 7,25"`.
pub fn parse_squares(value: &str) -> Result<Vec<Target>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| -> Result<Target> {
            let id: u8 = s
                .parse()
                .with_context(|| format!("invalid square id {:?}", s))?;
            let target = Target::new(id);
            if !target.in_range() {
                bail!("square id {} out of range 1..=25", id);
            }
            Ok(target)
        })
        .collect()
}

fn env_str(key: &str, default: Option<String>) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty()).or(default)
}

fn env_bool(key: &str, default: Option<bool>) -> Option<bool> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_u32(key: &str, default: Option<u32>) -> Option<u32> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_u64(key: &str, default: Option<u64>) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_usize(key: &str, default: Option<usize>) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_f64(key: &str, default: Option<f64>) -> Option<f64> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_pubkey(key: &str, default: Option<Pubkey>) -> Option<Pubkey> {
    env::var(key)
        .ok()
        .and_then(|v| Pubkey::from_str(&v).ok())
        .or(default)
}

fn env_commitment(key: &str, default: Option<CommitmentLevel>) -> Option<CommitmentLevel> {
    match env::var(key).unwrap_or_default().to_lowercase().as_str() {
        "finalized" => Some(CommitmentLevel::Finalized),
        "confirmed" => Some(CommitmentLevel::Confirmed),
        "processed" => Some(CommitmentLevel::Processed),
        _ => None,
    }
    .or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_square_list() {
        let squares = parse_squares(" 1, 7,25 ,").unwrap();
        assert_eq!(
            squares,
            vec![Target::new(1), Target::new(7), Target::new(25)]
        );
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(parse_squares("0").is_err());
        assert!(parse_squares("26").is_err());
        assert!(parse_squares("1,x").is_err());
    }

    #[test]
    fn empty_list_is_empty_selection() {
        assert!(parse_squares("").unwrap().is_empty());
    }
}
