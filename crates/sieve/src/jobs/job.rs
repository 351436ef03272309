//! Recurring correction jobs and their run history.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transform::CorrectionPlan;

/// How often a job repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// iCalendar `FREQ` value.
    pub fn rrule(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }

    /// The `n`th occurrence counted from `anchor` (the 0th).
    ///
    /// Monthly occurrences keep the anchor's day of month, clamped to the
    /// last day of shorter months.
    pub fn occurrence(&self, anchor: DateTime<Utc>, n: u32) -> DateTime<Utc> {
        match self {
            Self::Daily => anchor + Duration::days(i64::from(n)),
            Self::Weekly => anchor + Duration::days(7 * i64::from(n)),
            Self::Monthly => anchor
                .checked_add_months(Months::new(n))
                .unwrap_or(anchor + Duration::days(30 * i64::from(n))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of a job or a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// First occurrence of `time` (UTC) strictly after `now`.
pub fn next_run_after(time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive().and_time(time).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// A stored plan applied to a source on a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Time of day, UTC.
    pub time: NaiveTime,
    /// Passed verbatim to the dataset loader.
    pub source: String,
    pub plan: CorrectionPlan,
    pub created_at: DateTime<Utc>,
    /// First scheduled run; later runs are counted from it.
    pub anchor: DateTime<Utc>,
    pub next_run: DateTime<Utc>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a pending job whose first run is the next `time` after `now`.
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        time: NaiveTime,
        source: impl Into<String>,
        plan: CorrectionPlan,
        now: DateTime<Utc>,
    ) -> Self {
        let first = next_run_after(time, now);
        Self {
            id: generate_id("job"),
            name: name.into(),
            frequency,
            time,
            source: source.into(),
            plan,
            created_at: now,
            anchor: first,
            next_run: first,
            status: JobStatus::Pending,
            last_run: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run <= now
    }

    /// Move `next_run` to the first occurrence strictly after `now`.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        let mut n = 0;
        while self.next_run <= now {
            n += 1;
            self.next_run = self.frequency.occurrence(self.anchor, n);
        }
    }

    /// The schedule as an iCalendar document.
    pub fn to_ics(&self) -> String {
        let stamp = |dt: DateTime<Utc>| dt.format("%Y%m%dT%H%M%SZ").to_string();
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//Sieve//EN".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}@sieve", self.id),
            format!("DTSTAMP:{}", stamp(self.created_at)),
            format!("DTSTART:{}", stamp(self.anchor)),
            format!("RRULE:FREQ={}", self.frequency.rrule()),
            format!("SUMMARY:{}", escape_ics(&self.name)),
            format!("DESCRIPTION:{}", escape_ics(&format!("Source: {}", self.source))),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];
        let mut ics = lines.join("\r\n");
        ics.push_str("\r\n");
        ics
    }
}

/// One execution of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    pub id: String,
    pub job_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: JobStatus,
    pub log: Vec<String>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub score_before: f64,
    pub score_after: f64,
    /// Error text for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl JobRun {
    pub(crate) fn started(job_id: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_id("run"),
            job_id: job_id.to_string(),
            started_at,
            finished_at: started_at,
            status: JobStatus::Running,
            log: Vec::new(),
            rows_before: 0,
            rows_after: 0,
            score_before: 0.0,
            score_after: 0.0,
            note: None,
        }
    }
}

fn generate_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("{}_{:03}", prefix, COUNTER.fetch_add(1, Ordering::SeqCst))
}

fn escape_ics(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
