use chrono::{DateTime, Local};
use itertools::Itertools;
use rusqlite::{params, Connection, Result};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::app_dirs::AppDirs;
use crate::math::{Difficulty, Operator};

/// One submitted answer, as recorded for analytics
#[derive(Debug, Clone)]
pub struct AnswerStat {
    pub operator: Operator,
    pub difficulty: Difficulty,
    pub was_correct: bool,
    pub response_ms: u64,
    pub timestamp: DateTime<Local>,
}

/// Aggregated performance for one operator, across all recorded sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSummary {
    pub operator: String,
    pub avg_response_ms: f64,
    pub miss_rate: f64,
    pub attempts: i64,
}

/// Database manager for answer statistics
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Initialize the database connection and create tables if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("mathflash_answers.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::with_connection(Connection::open(&db_path)?)
    }

    /// In-memory database, used by tests and available to callers that want
    /// analytics without touching disk.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS answer_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                operator TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                was_correct BOOLEAN NOT NULL,
                response_ms INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_answer_stats_operator ON answer_stats(operator)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_answer_stats_timestamp ON answer_stats(timestamp)",
            [],
        )?;

        Ok(StatsDb { conn })
    }

    /// Record a single answer
    pub fn record_answer(&self, stat: &AnswerStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO answer_stats
            (operator, difficulty, was_correct, response_ms, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stat.operator.to_string(),
                stat.difficulty.to_string(),
                stat.was_correct,
                stat.response_ms,
                stat.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Record a batch of answers in one transaction
    pub fn record_answers_batch(&mut self, stats: &[AnswerStat]) -> Result<()> {
        let tx = self.conn.transaction()?;

        for stat in stats {
            tx.execute(
                r#"
                INSERT INTO answer_stats
                (operator, difficulty, was_correct, response_ms, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    stat.operator.to_string(),
                    stat.difficulty.to_string(),
                    stat.was_correct,
                    stat.response_ms,
                    stat.timestamp.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Per-operator aggregates, weakest operator (highest miss rate) first.
    pub fn operator_summary(&self) -> Result<Vec<OperatorSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                operator,
                AVG(response_ms) as avg_response,
                (SUM(CASE WHEN was_correct = 0 THEN 1 ELSE 0 END) * 100.0) / COUNT(*) as miss_rate,
                COUNT(*) as attempts
            FROM answer_stats
            GROUP BY operator
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(OperatorSummary {
                operator: row.get(0)?,
                avg_response_ms: row.get(1)?,
                miss_rate: row.get(2)?,
                attempts: row.get(3)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }

        Ok(summaries
            .into_iter()
            .sorted_by(|a, b| {
                b.miss_rate
                    .partial_cmp(&a.miss_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .collect())
    }

    /// Total number of recorded answers
    pub fn total_answers(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM answer_stats", [], |row| row.get(0))
    }
}

/// Milliseconds between two timestamps; zero when the clock went backwards.
pub fn time_diff_ms(start: SystemTime, end: SystemTime) -> u64 {
    end.duration_since(start)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(operator: Operator, was_correct: bool, response_ms: u64) -> AnswerStat {
        AnswerStat {
            operator,
            difficulty: Difficulty::Medium,
            was_correct,
            response_ms,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn record_and_count() {
        let db = StatsDb::open_in_memory().unwrap();
        db.record_answer(&stat(Operator::Add, true, 500)).unwrap();
        db.record_answer(&stat(Operator::Sub, false, 900)).unwrap();
        assert_eq!(db.total_answers().unwrap(), 2);
    }

    #[test]
    fn batch_recording_commits_all_rows() {
        let mut db = StatsDb::open_in_memory().unwrap();
        let batch: Vec<AnswerStat> = (0..10)
            .map(|i| stat(Operator::Mul, i % 2 == 0, 300 + i * 10))
            .collect();
        db.record_answers_batch(&batch).unwrap();
        assert_eq!(db.total_answers().unwrap(), 10);
    }

    #[test]
    fn summary_aggregates_per_operator() {
        let db = StatsDb::open_in_memory().unwrap();
        db.record_answer(&stat(Operator::Add, true, 400)).unwrap();
        db.record_answer(&stat(Operator::Add, true, 600)).unwrap();
        db.record_answer(&stat(Operator::Sub, false, 1000)).unwrap();

        let summary = db.operator_summary().unwrap();
        assert_eq!(summary.len(), 2);

        // Weakest first: subtraction missed 100% of one attempt
        assert_eq!(summary[0].operator, "-");
        assert_eq!(summary[0].attempts, 1);
        assert!((summary[0].miss_rate - 100.0).abs() < 1e-9);

        assert_eq!(summary[1].operator, "+");
        assert_eq!(summary[1].attempts, 2);
        assert!((summary[1].avg_response_ms - 500.0).abs() < 1e-9);
        assert!(summary[1].miss_rate.abs() < 1e-9);
    }

    #[test]
    fn empty_db_has_empty_summary() {
        let db = StatsDb::open_in_memory().unwrap();
        assert!(db.operator_summary().unwrap().is_empty());
        assert_eq!(db.total_answers().unwrap(), 0);
    }

    #[test]
    fn time_diff_is_zero_for_reversed_clock() {
        let now = SystemTime::now();
        let earlier = now - std::time::Duration::from_millis(50);
        assert_eq!(time_diff_ms(now, earlier), 0);
        assert!(time_diff_ms(earlier, now) >= 50);
    }
}
