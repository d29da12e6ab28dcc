//! Transient priority ranking for the admin feed.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use hostel_db::entities::complaint::{self, ComplaintStatus, Urgency};

const CRITICAL_WEIGHT: f64 = 1000.0;
const HIGH_WEIGHT: f64 = 500.0;
const MEDIUM_WEIGHT: f64 = 250.0;
const AGE_WEIGHT_PER_HOUR: f64 = 2.0;

/// Weight contributed by status and urgency alone.
#[must_use]
pub fn base_weight(status: ComplaintStatus, urgency: Urgency) -> f64 {
    if status == ComplaintStatus::Critical {
        return CRITICAL_WEIGHT;
    }
    match urgency {
        Urgency::High => HIGH_WEIGHT,
        Urgency::Medium => MEDIUM_WEIGHT,
        Urgency::Low => 0.0,
    }
}

/// Fractional hours since the complaint was filed, never negative.
#[must_use]
pub fn hours_since_filed(complaint: &complaint::Model, now: DateTime<Utc>) -> f64 {
    let created = complaint.created_at.with_timezone(&Utc);
    let millis = (now - created).num_milliseconds().max(0);
    millis as f64 / 3_600_000.0
}

/// `base_weight + 2 * hours_since_filed`.
#[must_use]
pub fn score(complaint: &complaint::Model, now: DateTime<Utc>) -> f64 {
    base_weight(complaint.status, complaint.urgency)
        + AGE_WEIGHT_PER_HOUR * hours_since_filed(complaint, now)
}

/// Score every complaint and sort highest first.
///
/// Ties go to the older complaint, then to the smaller id.
#[must_use]
pub fn rank(complaints: Vec<complaint::Model>, now: DateTime<Utc>) -> Vec<(complaint::Model, f64)> {
    let mut scored: Vec<_> = complaints
        .into_iter()
        .map(|c| {
            let s = score(&c, now);
            (c, s)
        })
        .collect();

    scored.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    scored
}
