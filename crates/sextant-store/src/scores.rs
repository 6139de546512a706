use chrono::Utc;
use serde::{Deserialize, Serialize};

use sextant_core::{Complexity, OrchestrationSignals, QualityTier, ScoreId, SessionScore};

use crate::database::Database;
use crate::error::StoreError;

/// Signal counts recorded alongside a score for later reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub skills: usize,
    pub agents: usize,
    pub decisions: usize,
    pub errors: usize,
    pub learnings: usize,
}

impl SignalCounts {
    pub fn from_signals(signals: &OrchestrationSignals) -> Self {
        Self {
            skills: signals.skills_invoked.len(),
            agents: signals.agents_spawned.len(),
            decisions: signals.decision_points.len(),
            errors: signals.errors_recovered.len(),
            learnings: signals.compound_learnings.len(),
        }
    }
}

/// One persisted score entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: ScoreId,
    pub session_id: String,
    pub file: String,
    pub overall_score: f64,
    pub tier: QualityTier,
    pub breakdown_json: String,
    pub weights_json: String,
    pub counts: SignalCounts,
    pub complexity: Complexity,
    pub scored_at: String,
}

impl ScoreRow {
    /// Build a row from a score result and the signals it came from.
    pub fn from_score(
        file: &str,
        score: &SessionScore,
        tier: QualityTier,
        signals: &OrchestrationSignals,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id: ScoreId::new(),
            session_id: score.session_id.to_string(),
            file: file.to_string(),
            overall_score: score.overall_score,
            tier,
            breakdown_json: serde_json::to_string(&score.breakdown)?,
            weights_json: serde_json::to_string(&score.weights)?,
            counts: SignalCounts::from_signals(signals),
            complexity: signals.metadata.complexity,
            scored_at: score.scored_at.to_rfc3339(),
        })
    }
}

/// Repository over the `scores` table.
pub struct ScoreRepo {
    db: Database,
}

impl ScoreRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist one score entry.
    pub fn insert(&self, row: &ScoreRow) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO scores (id, session_id, file, overall_score, tier, breakdown, weights,
                                     skills, agents, decisions, errors, learnings, complexity,
                                     scored_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                rusqlite::params![
                    row.id.as_str(),
                    row.session_id,
                    row.file,
                    row.overall_score,
                    row.tier.to_string(),
                    row.breakdown_json,
                    row.weights_json,
                    row.counts.skills,
                    row.counts.agents,
                    row.counts.decisions,
                    row.counts.errors,
                    row.counts.learnings,
                    row.complexity.to_string(),
                    row.scored_at,
                    now,
                ],
            )?;
            Ok(())
        })
    }

    /// Most recent entries, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<ScoreRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, file, overall_score, tier, breakdown, weights,
                        skills, agents, decisions, errors, learnings, complexity, scored_at
                 FROM scores ORDER BY scored_at DESC, created_at DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit], row_from_sql)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
        })
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))
                .map_err(StoreError::from)
        })
    }
}

fn row_from_sql(row: &rusqlite::Row<'_>) -> Result<ScoreRow, rusqlite::Error> {
    let tier_raw: String = row.get(4)?;
    let complexity_raw: String = row.get(12)?;
    Ok(ScoreRow {
        id: ScoreId::from_raw(row.get::<_, String>(0)?),
        session_id: row.get(1)?,
        file: row.get(2)?,
        overall_score: row.get(3)?,
        tier: tier_raw.parse().unwrap_or(QualityTier::Poor),
        breakdown_json: row.get(5)?,
        weights_json: row.get(6)?,
        counts: SignalCounts {
            skills: row.get::<_, i64>(7)? as usize,
            agents: row.get::<_, i64>(8)? as usize,
            decisions: row.get::<_, i64>(9)? as usize,
            errors: row.get::<_, i64>(10)? as usize,
            learnings: row.get::<_, i64>(11)? as usize,
        },
        complexity: complexity_raw.parse().unwrap_or_default(),
        scored_at: row.get(13)?,
    })
}
