use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Half-open time range `[start, end)` of matches that count towards the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RankingWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Calendar month (UTC) containing `now`
    pub fn month_of(now: DateTime<Utc>) -> Self {
        let start = first_of_month(now.year(), now.month());
        let end = if now.month() == 12 {
            first_of_month(now.year() + 1, 1)
        } else {
            first_of_month(now.year(), now.month() + 1)
        };
        Self { start, end }
    }

    pub fn current_month() -> Self {
        Self::month_of(Utc::now())
    }

    /// Window covering every representable timestamp
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

fn first_of_month(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
