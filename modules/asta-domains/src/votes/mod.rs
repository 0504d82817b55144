use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use asta_core::AstaError;

/// Community trust verdict on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Confirmed,
    Suspicious,
    Scam,
}

impl VoteKind {
    /// Parse a client-supplied kind string. `None` means the vote is
    /// rejected before the store is touched.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Some(Self::Confirmed),
            "suspicious" => Some(Self::Suspicious),
            "scam" => Some(Self::Scam),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Suspicious => "suspicious",
            Self::Scam => "scam",
        }
    }

    /// Aggregate counter column this kind maps to.
    pub fn counter_column(self) -> &'static str {
        match self {
            Self::Confirmed => "votes_good",
            Self::Suspicious => "votes_bad",
            Self::Scam => "votes_scam",
        }
    }

    /// Single-statement atomic increment; no read-then-write, so
    /// concurrent voters on one property cannot lose updates.
    fn increment_sql(self) -> &'static str {
        match self {
            Self::Confirmed => {
                "UPDATE properties SET votes_good = votes_good + 1 WHERE id = $1 RETURNING votes_good"
            }
            Self::Suspicious => {
                "UPDATE properties SET votes_bad = votes_bad + 1 WHERE id = $1 RETURNING votes_bad"
            }
            Self::Scam => {
                "UPDATE properties SET votes_scam = votes_scam + 1 WHERE id = $1 RETURNING votes_scam"
            }
        }
    }
}

/// Business outcome of a vote attempt. These are expected results, not
/// faults — only genuine store errors surface as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded(i32),
    Duplicate,
    NotFound,
    InvalidKind,
}

/// Record one vote and bump the matching counter, at most once per
/// (property, device) pair.
///
/// Dedup rides on the store's `UNIQUE (property_id, device_id)` constraint
/// rather than a check-then-insert, so two simultaneous first votes from
/// the same device cannot both land. Ballot and counter update share one
/// transaction.
pub async fn cast_vote(
    pool: &PgPool,
    property_id: Uuid,
    device_id: &str,
    kind: &str,
) -> Result<VoteOutcome, AstaError> {
    let Some(kind) = VoteKind::parse(kind) else {
        return Ok(VoteOutcome::InvalidKind);
    };

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO ballots (property_id, device_id, kind) VALUES ($1, $2, $3)")
        .bind(property_id)
        .bind(device_id)
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await;

    if let Err(e) = inserted {
        if let sqlx::Error::Database(db_err) = &e {
            match db_err.code().as_deref() {
                // unique_violation: this device already voted on this property
                Some("23505") => return Ok(VoteOutcome::Duplicate),
                // foreign_key_violation: no such property
                Some("23503") => return Ok(VoteOutcome::NotFound),
                _ => {}
            }
        }
        return Err(e.into());
    }

    let updated: Option<(i32,)> = sqlx::query_as(kind.increment_sql())
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?;

    match updated {
        Some((count,)) => {
            tx.commit().await?;
            info!(%property_id, kind = kind.as_str(), count, "Vote recorded");
            Ok(VoteOutcome::Recorded(count))
        }
        None => {
            tx.rollback().await?;
            Ok(VoteOutcome::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_kinds() {
        assert_eq!(VoteKind::parse("confirmed"), Some(VoteKind::Confirmed));
        assert_eq!(VoteKind::parse(" SCAM "), Some(VoteKind::Scam));
        assert_eq!(VoteKind::parse("suspicious"), Some(VoteKind::Suspicious));
    }

    #[test]
    fn parse_rejects_unknown_kinds() {
        assert_eq!(VoteKind::parse("upvote"), None);
        assert_eq!(VoteKind::parse(""), None);
        assert_eq!(VoteKind::parse("scams"), None);
    }

    #[test]
    fn counter_column_mapping() {
        assert_eq!(VoteKind::Confirmed.counter_column(), "votes_good");
        assert_eq!(VoteKind::Suspicious.counter_column(), "votes_bad");
        assert_eq!(VoteKind::Scam.counter_column(), "votes_scam");
    }

    #[test]
    fn increment_sql_touches_only_its_column() {
        for kind in [VoteKind::Confirmed, VoteKind::Suspicious, VoteKind::Scam] {
            let sql = kind.increment_sql();
            assert!(sql.contains(kind.counter_column()));
            assert!(sql.contains("+ 1"));
            for other in [VoteKind::Confirmed, VoteKind::Suspicious, VoteKind::Scam] {
                if other != kind {
                    assert!(!sql.contains(other.counter_column()));
                }
            }
        }
    }
}
