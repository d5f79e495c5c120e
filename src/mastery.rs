// src/mastery.rs
//
// Pure mastery-tracking core: accuracy aggregation over bank-sourced quiz
// attempts and the threshold classification behind the learning path.
// No database access happens here; handlers feed in pre-grouped rows.

use serde::Serialize;
use sqlx::prelude::FromRow;

/// Accuracy at or above this is a strength / `strong` tier.
pub const STRONG_THRESHOLD: i64 = 80;

/// Accuracy at or below this is a weakness / `weak` tier.
pub const WEAK_THRESHOLD: i64 = 50;

/// One GROUP BY result row: attempts on a single topic.
#[derive(Debug, FromRow)]
pub struct TopicRow {
    pub topic: String,
    pub correct: i64,
    pub total: i64,
}

/// Per-topic accuracy as reported to dashboards.
#[derive(Debug, Serialize)]
pub struct TopicStat {
    pub name: String,
    pub accuracy: i64,
    pub correct: i64,
    pub total: i64,
}

/// Aggregated progress for one user. Built only from `bank`-sourced
/// attempts; `manual` attempts are history, not analytics.
#[derive(Debug)]
pub struct ProgressSummary {
    pub overall_accuracy: i64,
    pub total_attempts: i64,
    /// In grouping order; `weaknesses` and the learning path follow it.
    pub topic_stats: Vec<TopicStat>,
    pub weaknesses: Vec<String>,
}

impl ProgressSummary {
    /// Topics the student has mastered. Derived here by the caller of the
    /// learning path, which itself only knows tiers.
    pub fn strengths(&self) -> Vec<String> {
        self.topic_stats
            .iter()
            .filter(|t| t.accuracy >= STRONG_THRESHOLD)
            .map(|t| t.name.clone())
            .collect()
    }
}

/// One step of the recommended learning path.
#[derive(Debug, Serialize)]
pub struct PathEntry {
    pub topic_name: String,
    pub mastery: String,
    pub action: String,
}

/// Integer percentage with truncation. 1/3 is 33, 2/3 is 66; zero attempts
/// report 0 rather than an error. The truncation is contractual, so no
/// rounding here.
pub fn accuracy_pct(correct: i64, total: i64) -> i64 {
    if total == 0 { 0 } else { correct * 100 / total }
}

/// Assemble the progress summary from the overall counts and per-topic rows.
pub fn summarize(correct: i64, total: i64, topics: Vec<TopicRow>) -> ProgressSummary {
    let mut topic_stats = Vec::with_capacity(topics.len());
    let mut weaknesses = Vec::new();

    for row in topics {
        let accuracy = accuracy_pct(row.correct, row.total);
        if accuracy <= WEAK_THRESHOLD {
            weaknesses.push(row.topic.clone());
        }
        topic_stats.push(TopicStat {
            name: row.topic,
            accuracy,
            correct: row.correct,
            total: row.total,
        });
    }

    ProgressSummary {
        overall_accuracy: accuracy_pct(correct, total),
        total_attempts: total,
        topic_stats,
        weaknesses,
    }
}

/// Map an accuracy percentage to its mastery tier and recommended action.
pub fn classify(accuracy: i64) -> (&'static str, &'static str) {
    if accuracy >= STRONG_THRESHOLD {
        ("strong", "Move to tougher problems and mixed-topic quizzes.")
    } else if accuracy <= WEAK_THRESHOLD {
        ("weak", "Revisit basics and complete easy-level quizzes.")
    } else {
        ("medium", "Do a mix of revision and moderate problems.")
    }
}

/// Build the learning path in the same order the topics were grouped.
/// With no attempt data at all, a single sentinel entry tells the student
/// to take a first quiz instead of returning an empty list.
pub fn learning_path(topic_stats: &[TopicStat]) -> Vec<PathEntry> {
    if topic_stats.is_empty() {
        return vec![PathEntry {
            topic_name: "No data yet".to_string(),
            mastery: "unknown".to_string(),
            action: "Start by taking your first smart quiz.".to_string(),
        }];
    }

    topic_stats
        .iter()
        .map(|t| {
            let (mastery, action) = classify(t.accuracy);
            PathEntry {
                topic_name: t.name.clone(),
                mastery: mastery.to_string(),
                action: action.to_string(),
            }
        })
        .collect()
}
