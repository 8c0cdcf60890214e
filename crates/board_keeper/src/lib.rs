use crate::config::RuntimeConfig;
use anyhow::{Result, bail};
use board_lib::{
    client::{program::get_board_account, rpc::Rpc, transport::Transport},
    storage::{Journal, SubmissionRecord},
    types::Decoded,
    wallet::load_signer,
};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use std::sync::Arc;
use tracing::{info, warn};

pub mod config;
pub mod fatal;
pub mod keepers;
pub mod logging;

/// Static per-process deployment parameters.
#[derive(Clone, Debug)]
pub struct DeploySettings {
    pub program_id: Pubkey,
    pub fee_collector: Pubkey,
    pub cu_limit: u32,
    pub cu_price_micro_lamports: u64,
}

impl DeploySettings {
    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        Self {
            program_id: cfg.program_id,
            fee_collector: cfg.fee_collector,
            cu_limit: cfg.cu_limit,
            cu_price_micro_lamports: cfg.cu_price_micro_lamports,
        }
    }
}

pub struct App<T: Transport = Rpc> {
    transport: T,
    signer: Option<Arc<Keypair>>,
    settings: DeploySettings,
    journal: Option<Journal>,
}

impl App<Rpc> {
    pub fn init_from(cfg: &RuntimeConfig) -> Result<Self> {
        let rpc = Rpc::new(
            &cfg.solana_rpc_url,
            cfg.rpc_timeout_ms,
            cfg.commitment,
            cfg.preflight,
            cfg.tx_max_retries,
        );
        let signer = load_signer(cfg.signer_keypair_path.as_deref())?;
        if signer.is_none() {
            warn!("SIGNER_KEYPAIR_PATH not set, deploy cycles will be skipped");
        }

        let mut app = App::new(rpc, signer, DeploySettings::from_config(cfg));

        if let Some(path) = cfg.journal_path.as_deref() {
            let journal = Journal::open(path)?;
            let pruned = journal.prune_older_than(cfg.journal_retention_days)?;
            info!(path, pruned, "submission journal opened");
            app = app.with_journal(journal);
        }

        Ok(app)
    }
}

impl<T: Transport> App<T> {
    pub fn new(transport: T, signer: Option<Keypair>, settings: DeploySettings) -> Self {
        Self {
            transport,
            signer: signer.map(Arc::new),
            settings,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn signer(&self) -> Option<&Keypair> {
        self.signer.as_deref()
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// Current round according to the board, `None` while the board is not
    /// initialized.
    pub fn current_round(&self) -> Result<Option<u64>> {
        match get_board_account(&self.transport, &self.settings.program_id)? {
            Decoded::Ready(board) => Ok(Some(board.round_id)),
            Decoded::NotYetInitialized => Ok(None),
            Decoded::Malformed(reason) => bail!("board account malformed: {}", reason),
        }
    }

    pub(crate) fn journal_record(&self, entry: &SubmissionRecord) {
        if let Some(journal) = &self.journal {
            if let Err(err) = journal.record(entry) {
                warn!(error = %err, op = %entry.op, "failed to write submission journal");
            }
        }
    }
}

/// Shortened signature for log lines.
pub fn short_signature(signature: &Signature) -> String {
    let full = signature.to_string();
    match full.get(..8) {
        Some(head) => format!("{}...", head),
        None => full,
    }
}
