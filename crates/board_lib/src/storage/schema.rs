use rusqlite::{Connection, Result};

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS submission_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,                  -- RFC 3339, UTC
            op TEXT NOT NULL,                         -- deploy|close_automation
            round_id INTEGER,
            checkpoint_round_id INTEGER,
            squares_mask INTEGER,
            stake_lamports INTEGER,
            fee_lamports INTEGER,
            transaction_signature TEXT,
            status TEXT NOT NULL,                     -- success|benign|failed
            error_code INTEGER,
            error_message TEXT
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sublogs_ts ON submission_logs(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sublogs_round ON submission_logs(round_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sublogs_sig ON submission_logs(transaction_signature)",
        [],
    )?;

    Ok(())
}
