//! Admin analytics and hotspot detection.

use std::collections::{BTreeSet, HashMap};

use hostel_common::AppResult;
use hostel_db::{
    entities::complaint::{Category, ComplaintStatus},
    repositories::{ComplaintRepository, ResolutionSpan},
};
use sea_orm::Iterable;
use serde::Serialize;

/// Count of complaints in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: Category,
    pub count: i64,
}

/// Count of complaints in one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockStat {
    pub block: String,
    pub count: i64,
}

/// Count of complaints in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusStat {
    pub status: ComplaintStatus,
    pub count: i64,
}

/// Dashboard figures for admins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintAnalytics {
    pub category_stats: Vec<CategoryStat>,
    pub block_stats: Vec<BlockStat>,
    pub status_stats: Vec<StatusStat>,
    /// Mean hours from filing to resolution, 0 when nothing is resolved.
    pub avg_resolution_hours: f64,
}

/// Density band of a hotspot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotLevel {
    Quiet,
    Active,
    Busy,
    Hot,
}

impl HotspotLevel {
    /// Band for a complaint count.
    #[must_use]
    pub const fn from_count(count: i64) -> Self {
        match count {
            i64::MIN..=0 => Self::Quiet,
            1..=2 => Self::Active,
            3..=5 => Self::Busy,
            _ => Self::Hot,
        }
    }
}

/// One block x category cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hotspot {
    pub block: String,
    pub category: Category,
    pub count: i64,
    pub level: HotspotLevel,
}

/// Analytics service.
#[derive(Clone)]
pub struct AnalyticsService {
    complaint_repo: ComplaintRepository,
}

impl AnalyticsService {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(complaint_repo: ComplaintRepository) -> Self {
        Self { complaint_repo }
    }

    /// Counts per category, block and status plus mean resolution time.
    pub async fn analytics(&self) -> AppResult<ComplaintAnalytics> {
        let category_stats = self
            .complaint_repo
            .count_by_category()
            .await?
            .into_iter()
            .map(|row| CategoryStat {
                category: row.category,
                count: row.count,
            })
            .collect();

        let block_stats = self
            .complaint_repo
            .count_by_block()
            .await?
            .into_iter()
            .map(|row| BlockStat {
                block: row.block,
                count: row.count,
            })
            .collect();

        let status_stats = self
            .complaint_repo
            .count_by_status()
            .await?
            .into_iter()
            .map(|row| StatusStat {
                status: row.status,
                count: row.count,
            })
            .collect();

        let spans = self.complaint_repo.find_resolution_spans().await?;

        Ok(ComplaintAnalytics {
            category_stats,
            block_stats,
            status_stats,
            avg_resolution_hours: average_resolution_hours(&spans),
        })
    }

    /// Full block x category grid, including empty cells.
    pub async fn hotspots(&self) -> AppResult<Vec<Hotspot>> {
        let rows = self.complaint_repo.count_by_block_and_category().await?;

        let blocks: BTreeSet<String> = rows.iter().map(|r| r.block.clone()).collect();
        let counts: HashMap<(String, Category), i64> = rows
            .into_iter()
            .map(|r| ((r.block, r.category), r.count))
            .collect();

        let mut grid = Vec::new();
        for block in blocks {
            for category in Category::iter() {
                let count = counts
                    .get(&(block.clone(), category))
                    .copied()
                    .unwrap_or(0);
                grid.push(Hotspot {
                    block: block.clone(),
                    category,
                    count,
                    level: HotspotLevel::from_count(count),
                });
            }
        }
        Ok(grid)
    }
}

fn average_resolution_hours(spans: &[ResolutionSpan]) -> f64 {
    let hours: Vec<f64> = spans
        .iter()
        .filter_map(|s| {
            let resolved = s.resolved_at?;
            let millis = (resolved - s.created_at).num_milliseconds().max(0);
            Some(millis as f64 / 3_600_000.0)
        })
        .collect();

    if hours.is_empty() {
        return 0.0;
    }
    let mean = hours.iter().sum::<f64>() / hours.len() as f64;
    (mean * 100.0).round() / 100.0
}
