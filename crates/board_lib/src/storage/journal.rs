use anyhow::{Context, Result};
use chrono::{SecondsFormat, TimeDelta, Utc};
use rusqlite::{Connection, Row, params};
use std::fs::create_dir_all;
use std::path::Path;

use super::schema::create_tables;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success,
    /// Rejected by the program with an error that is treated as success.
    Benign,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Success => "success",
            SubmissionStatus::Benign => "benign",
            SubmissionStatus::Failed => "failed",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "success" => SubmissionStatus::Success,
            "benign" => SubmissionStatus::Benign,
            _ => SubmissionStatus::Failed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub op: String,
    pub round_id: Option<u64>,
    pub checkpoint_round_id: Option<u64>,
    pub squares_mask: Option<u32>,
    pub stake_lamports: Option<u64>,
    pub fee_lamports: Option<u64>,
    pub signature: Option<String>,
    pub status: SubmissionStatus,
    pub error_code: Option<u32>,
    pub error_message: Option<String>,
}

impl SubmissionRecord {
    pub fn new(op: &str, status: SubmissionStatus) -> Self {
        Self {
            op: op.to_string(),
            round_id: None,
            checkpoint_round_id: None,
            squares_mask: None,
            stake_lamports: None,
            fee_lamports: None,
            signature: None,
            status,
            error_code: None,
            error_message: None,
        }
    }
}

/// Append-only SQLite log of submission outcomes.
pub struct Journal {
    conn: Connection,
}

impl Journal {
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create journal directory for {}", path))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("Failed to open journal {}", path))?;
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
        let _ = conn.pragma_update(None, "busy_timeout", 5000);

        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory journal")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        create_tables(&conn).context("Failed to create journal tables")?;
        Ok(Self { conn })
    }

    pub fn record(&self, entry: &SubmissionRecord) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn
            .execute(
                "INSERT INTO submission_logs (
                    timestamp, op, round_id, checkpoint_round_id, squares_mask,
                    stake_lamports, fee_lamports, transaction_signature, status,
                    error_code, error_message
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    timestamp,
                    entry.op,
                    entry.round_id.map(to_i64),
                    entry.checkpoint_round_id.map(to_i64),
                    entry.squares_mask,
                    entry.stake_lamports.map(to_i64),
                    entry.fee_lamports.map(to_i64),
                    entry.signature,
                    entry.status.as_str(),
                    entry.error_code,
                    entry.error_message,
                ],
            )
            .context("Failed to insert submission log")?;
        Ok(())
    }

    /// Most recent entries first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SubmissionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT op, round_id, checkpoint_round_id, squares_mask, stake_lamports,
                    fee_lamports, transaction_signature, status, error_code, error_message
             FROM submission_logs ORDER BY id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map([limit as i64], read_record)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read submission logs")
    }

    /// Delete entries older than `days`; returns the number removed.
    ///
    /// A retention reaching past the earliest representable time prunes nothing.
    pub fn prune_older_than(&self, days: u64) -> Result<usize> {
        let cutoff = i64::try_from(days)
            .ok()
            .and_then(TimeDelta::try_days)
            .and_then(|retention| Utc::now().checked_sub_signed(retention));
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        self.conn
            .execute(
                "DELETE FROM submission_logs WHERE timestamp < ?",
                [cutoff.to_rfc3339_opts(SecondsFormat::Millis, true)],
            )
            .context("Failed to prune submission logs")
    }
}

fn to_i64(value: u64) -> i64 {
    value as i64
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<SubmissionRecord> {
    let status: String = row.get(7)?;
    Ok(SubmissionRecord {
        op: row.get(0)?,
        round_id: row.get::<_, Option<i64>>(1)?.map(|v| v as u64),
        checkpoint_round_id: row.get::<_, Option<i64>>(2)?.map(|v| v as u64),
        squares_mask: row.get(3)?,
        stake_lamports: row.get::<_, Option<i64>>(4)?.map(|v| v as u64),
        fee_lamports: row.get::<_, Option<i64>>(5)?.map(|v| v as u64),
        signature: row.get(6)?,
        status: SubmissionStatus::parse(&status),
        error_code: row.get(8)?,
        error_message: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_reads_back_newest_first() {
        let journal = Journal::open_in_memory().unwrap();

        let mut deploy = SubmissionRecord::new("deploy", SubmissionStatus::Success);
        deploy.round_id = Some(10);
        deploy.checkpoint_round_id = Some(8);
        deploy.squares_mask = Some(0b101);
        deploy.stake_lamports = Some(500_000_000);
        deploy.fee_lamports = Some(10_000_000);
        deploy.signature = Some("5xSig".to_string());
        journal.record(&deploy).unwrap();

        let mut failed = SubmissionRecord::new("deploy", SubmissionStatus::Failed);
        failed.round_id = Some(11);
        failed.error_code = Some(0x2a);
        failed.error_message = Some("custom program error: 0x2a".to_string());
        journal.record(&failed).unwrap();

        let recent = journal.recent(10).unwrap();
        assert_eq!(recent, vec![failed, deploy]);
    }

    #[test]
    fn prune_keeps_fresh_entries() {
        let journal = Journal::open_in_memory().unwrap();
        journal
            .record(&SubmissionRecord::new(
                "close_automation",
                SubmissionStatus::Benign,
            ))
            .unwrap();

        assert_eq!(journal.prune_older_than(7).unwrap(), 0);
        assert_eq!(journal.recent(1).unwrap().len(), 1);
    }

    #[test]
    fn prune_with_unrepresentable_retention_keeps_everything() {
        let journal = Journal::open_in_memory().unwrap();
        journal
            .record(&SubmissionRecord::new("deploy", SubmissionStatus::Success))
            .unwrap();

        assert_eq!(journal.prune_older_than(100_000_000).unwrap(), 0);
        assert_eq!(journal.prune_older_than(u64::MAX).unwrap(), 0);
        assert_eq!(journal.recent(1).unwrap().len(), 1);
    }
}
