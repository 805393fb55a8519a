use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::model::Record;
use crate::time::to_date;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// How many companies/positions the distribution charts show.
const TOP_GROUPS: usize = 8;

/// Time window applied to the dashboard's chart data. KPI cards always
/// reflect the full record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    AllTime,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl Period {
    fn cutoff_ms(self, now_ms: i64) -> Option<i64> {
        let days = match self {
            Period::AllTime => return None,
            Period::Last7Days => 7,
            Period::Last30Days => 30,
            Period::Last90Days => 90,
        };
        Some(now_ms - days * DAY_MS)
    }
}

/// Aggregates behind the dashboard's KPI cards and charts. Pure data; the
/// rendering layer decides how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Total record count.
    pub total: usize,
    /// Records created within the last seven days.
    pub recent: usize,
    /// Records per day, averaged over the span since the oldest record.
    pub daily_average: f64,
    /// Most frequent non-empty company, if any.
    pub top_company: Option<String>,
    /// Per-day creation counts within the selected period.
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    /// Company distribution within the period, count-descending, top 8.
    pub company_counts: Vec<(String, usize)>,
    /// Position distribution within the period, count-descending, top 8.
    pub position_counts: Vec<(String, usize)>,
}

/// Reduce a record list to dashboard aggregates. `now_ms` is passed in so
/// callers (and tests) control the clock.
pub fn compute(records: &[Record], period: Period, now_ms: i64) -> DashboardStats {
    let total = records.len();

    let week_ago = now_ms - 7 * DAY_MS;
    let recent = records
        .iter()
        .filter(|r| r.created_at >= week_ago)
        .count();

    let daily_average = match records.iter().map(|r| r.created_at).min() {
        Some(oldest) => {
            let span_days = ((now_ms - oldest) / DAY_MS).max(1);
            total as f64 / span_days as f64
        }
        None => 0.0,
    };

    let top_company = ranked(records.iter().filter_map(|r| non_empty(&r.company)), usize::MAX)
        .into_iter()
        .next()
        .map(|(name, _)| name);

    let cutoff = period.cutoff_ms(now_ms);
    let in_period: Vec<&Record> = records
        .iter()
        .filter(|r| cutoff.map_or(true, |cut| r.created_at >= cut))
        .collect();

    let mut daily_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in &in_period {
        let day = to_date(record.created_at).date_naive();
        *daily_counts.entry(day).or_insert(0) += 1;
    }

    let company_counts = ranked(
        in_period.iter().filter_map(|r| non_empty(&r.company)),
        TOP_GROUPS,
    );
    let position_counts = ranked(
        in_period.iter().filter_map(|r| non_empty(&r.position)),
        TOP_GROUPS,
    );

    DashboardStats {
        total,
        recent,
        daily_average,
        top_company,
        daily_counts,
        company_counts,
        position_counts,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Count occurrences and rank count-descending, name-ascending on ties,
/// keeping the first `limit` groups.
fn ranked(values: impl Iterator<Item = String>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, company: Option<&str>, position: Option<&str>, created_at: i64) -> Record {
        Record {
            name: name.to_string(),
            company: company.map(str::to_string),
            position: position.map(str::to_string),
            created_at,
            updated_at: created_at,
            ..Record::named(name)
        }
    }

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = compute(&[], Period::AllTime, NOW);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.recent, 0);
        assert_eq!(stats.daily_average, 0.0);
        assert!(stats.top_company.is_none());
        assert!(stats.daily_counts.is_empty());
        assert!(stats.company_counts.is_empty());
    }

    #[test]
    fn kpis_cover_full_set() {
        let records = vec![
            record("Alice", Some("Acme"), Some("Engineer"), NOW - DAY_MS),
            record("Bob", Some("Acme"), Some("Manager"), NOW - 2 * DAY_MS),
            record("Cara", Some("Globex"), None, NOW - 40 * DAY_MS),
        ];
        let stats = compute(&records, Period::Last30Days, NOW);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.top_company.as_deref(), Some("Acme"));
        // Span is 40 days, three records overall.
        assert!((stats.daily_average - 3.0 / 40.0).abs() < 1e-9);
    }

    #[test]
    fn charts_respect_the_period_filter() {
        let records = vec![
            record("Alice", Some("Acme"), Some("Engineer"), NOW - DAY_MS),
            record("Cara", Some("Globex"), Some("Director"), NOW - 40 * DAY_MS),
        ];
        let stats = compute(&records, Period::Last30Days, NOW);

        // Cara falls outside the window: one chart bucket, one company.
        assert_eq!(stats.daily_counts.values().sum::<usize>(), 1);
        assert_eq!(stats.company_counts, vec![("Acme".to_string(), 1)]);
        assert_eq!(stats.position_counts, vec![("Engineer".to_string(), 1)]);
    }

    #[test]
    fn ranking_breaks_ties_by_name() {
        let records = vec![
            record("A", Some("Zeta"), None, NOW),
            record("B", Some("Alpha"), None, NOW),
        ];
        let stats = compute(&records, Period::AllTime, NOW);
        assert_eq!(stats.company_counts[0].0, "Alpha");
        assert_eq!(stats.top_company.as_deref(), Some("Alpha"));
    }

    #[test]
    fn blank_companies_are_not_counted() {
        let records = vec![
            record("A", Some("   "), None, NOW),
            record("B", None, None, NOW),
        ];
        let stats = compute(&records, Period::AllTime, NOW);
        assert!(stats.top_company.is_none());
        assert!(stats.company_counts.is_empty());
    }

    #[test]
    fn daily_counts_bucket_by_day() {
        let records = vec![
            record("A", None, None, NOW),
            record("B", None, None, NOW - 1000),
            record("C", None, None, NOW - 3 * DAY_MS),
        ];
        let stats = compute(&records, Period::AllTime, NOW);
        assert_eq!(stats.daily_counts.len(), 2);
        assert_eq!(stats.daily_counts.values().sum::<usize>(), 3);
    }
}
