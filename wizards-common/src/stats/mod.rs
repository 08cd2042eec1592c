//! Aggregate statistics engine
//!
//! Course and professor aggregate columns are derived state: they are
//! always a full recomputation over the current review rows for a scope,
//! never a running update. Recomputing twice with no intervening writes
//! yields identical values, and a per-review sequence of scoped recomputes
//! ends in the same state as one sweep.
//!
//! The fold itself ([`ReviewTotals`]) is pure so the numeric policy can be
//! tested without a store:
//! - ratings are rounded to 2 decimal places (half away from zero)
//! - difficulty and workload are unrounded means
//! - a scope with no reviews reports exactly 0 everywhere

mod recompute;

pub use recompute::{recompute_all, recompute_course, recompute_professor, RefreshSummary};

use serde::Serialize;
use sqlx::FromRow;

/// The three numeric fields of one review that feed the aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ReviewScore {
    pub difficulty: i64,
    pub overall_rating: i64,
    pub workload_rating: i64,
}

impl ReviewScore {
    pub fn new(difficulty: i64, overall_rating: i64, workload_rating: i64) -> Self {
        Self {
            difficulty,
            overall_rating,
            workload_rating,
        }
    }
}

/// Count and integer sums over a set of reviews
///
/// Sums stay integral until a mean is asked for, so the division happens
/// once per field exactly as `AVG` over an integer column does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewTotals {
    pub count: i64,
    pub difficulty_sum: i64,
    pub rating_sum: i64,
    pub workload_sum: i64,
}

impl ReviewTotals {
    pub fn add(&mut self, score: &ReviewScore) {
        self.count += 1;
        self.difficulty_sum += score.difficulty;
        self.rating_sum += score.overall_rating;
        self.workload_sum += score.workload_rating;
    }

    pub fn mean_difficulty(&self) -> f64 {
        mean(self.difficulty_sum, self.count)
    }

    /// Mean rating rounded to 2 places, computed from the integer sum
    pub fn rounded_rating(&self) -> f64 {
        round2_ratio(self.rating_sum, self.count)
    }

    pub fn mean_workload(&self) -> f64 {
        mean(self.workload_sum, self.count)
    }
}

impl<'a> Extend<&'a ReviewScore> for ReviewTotals {
    fn extend<I: IntoIterator<Item = &'a ReviewScore>>(&mut self, iter: I) {
        for score in iter {
            self.add(score);
        }
    }
}

impl<'a> FromIterator<&'a ReviewScore> for ReviewTotals {
    fn from_iter<I: IntoIterator<Item = &'a ReviewScore>>(iter: I) -> Self {
        let mut totals = Self::default();
        totals.extend(iter);
        totals
    }
}

/// Aggregate values persisted on a course row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CourseAggregate {
    pub avg_rating: f64,
    pub avg_workload: f64,
    /// Not persisted on the course row; reported for logging and callers
    pub review_count: i64,
}

impl CourseAggregate {
    pub fn from_totals(totals: &ReviewTotals) -> Self {
        Self {
            avg_rating: totals.rounded_rating(),
            avg_workload: totals.mean_workload(),
            review_count: totals.count,
        }
    }
}

/// Aggregate values persisted on a professor row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfessorAggregate {
    pub avg_rating: f64,
    pub avg_difficulty: f64,
    pub avg_workload: f64,
    pub total_reviews: i64,
}

impl ProfessorAggregate {
    pub fn from_totals(totals: &ReviewTotals) -> Self {
        Self {
            avg_rating: totals.rounded_rating(),
            avg_difficulty: totals.mean_difficulty(),
            avg_workload: totals.mean_workload(),
            total_reviews: totals.count,
        }
    }
}

fn mean(sum: i64, count: i64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// `sum / count` rounded to 2 decimal places, half away from zero
///
/// Works in integer hundredths so exact halves such as 41/40 = 1.025 round
/// up; scaling an `f64` mean by 100 would land just below the half.
pub fn round2_ratio(sum: i64, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let (sum, count) = if count < 0 {
        (-(sum as i128), -(count as i128))
    } else {
        (sum as i128, count as i128)
    };
    let doubled = 200 * sum;
    let hundredths = if doubled >= 0 {
        (doubled + count) / (2 * count)
    } else {
        (doubled - count) / (2 * count)
    };
    hundredths as f64 / 100.0
}
