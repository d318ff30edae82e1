//! Import driver
//!
//! Determines the import cursor, then walks calendar days forward from the
//! cursor's day to the last import date: fetch, normalize, reconcile, filter
//! and submit. Days run strictly in order on one task because the
//! reconciliation carry links each day to the previous one.
//!
//! Errors are not caught per day. The next invocation resumes from the
//! destination's latest play.

use crate::error::{ImportError, ImportResult};
use crate::locator::find_earliest;
use crate::normalizer::normalize_day;
use crate::reconcile::{Carry, Reconciler};
use crate::types::{DetectionSource, PlayStore};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use playsync_common::config::{ImporterSettings, DEFAULT_INITIAL_STEP};
use playsync_common::time::{dates_between, day_start};
use playsync_common::{Error, Play};
use tracing::{debug, info};

/// Per-run import parameters
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Plays must last strictly longer than this to be submitted
    pub minimum_duration: Duration,
    /// Initial probe step of the earliest-date search, in days
    pub initial_step: u32,
    /// Last date to import (inclusive), normally today
    pub until: NaiveDate,
}

impl ImportOptions {
    pub fn from_settings(settings: &ImporterSettings, until: NaiveDate) -> ImportResult<Self> {
        let out_of_range = || {
            ImportError::Common(Error::InvalidInput(format!(
                "minimum_duration out of range: {}",
                settings.minimum_duration
            )))
        };
        let millis = (settings.minimum_duration * 1000.0).round();
        // i64::MAX as f64 rounds up, so `>=` excludes every saturating cast
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        let minimum_duration = Duration::try_milliseconds(millis as i64).ok_or_else(out_of_range)?;

        Ok(Self {
            minimum_duration,
            initial_step: settings.initial_step,
            until,
        })
    }

    /// No threshold, default step
    pub fn until(until: NaiveDate) -> Self {
        Self {
            minimum_duration: Duration::zero(),
            initial_step: DEFAULT_INITIAL_STEP,
            until,
        }
    }
}

/// Outcome of one imported day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub date: NaiveDate,
    /// Plays normalized from the source for this date
    pub fetched: usize,
    /// Plays the pipeline emitted
    pub emitted: usize,
    /// Plays submitted to the destination
    pub submitted: usize,
}

/// Outcome of a complete run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Cursor: only plays starting after this were submitted
    pub since: DateTime<Utc>,
    pub days: Vec<DayReport>,
    /// Held by the pipeline when the run ended; picked up again next run
    pub withheld: Option<Play>,
}

impl ImportSummary {
    pub fn total_submitted(&self) -> usize {
        self.days.iter().map(|d| d.submitted).sum()
    }
}

/// Whether a reconciled play passes the cursor and duration filters
pub fn should_submit(play: &Play, since: DateTime<Utc>, minimum_duration: Duration) -> bool {
    play.started_at > since && play.duration() > minimum_duration
}

/// Source → pipeline → destination driver
pub struct Importer<S, D> {
    source: S,
    destination: D,
    options: ImportOptions,
}

impl<S, D> Importer<S, D>
where
    S: DetectionSource,
    D: PlayStore,
{
    pub fn new(source: S, destination: D, options: ImportOptions) -> Self {
        Self {
            source,
            destination,
            options,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Import everything after the destination's latest play
    pub async fn run(&self) -> ImportResult<ImportSummary> {
        let since = self.determine_since().await?;
        info!(%since, until = %self.options.until, "Importing all plays since cursor");

        let mut carry = Carry::empty();
        let mut days = Vec::new();
        for date in dates_between(since.date_naive(), self.options.until) {
            days.push(self.import_day(date, since, &mut carry).await?);
        }

        if let Some(play) = carry.held() {
            debug!(
                title = %play.title,
                started_at = %play.started_at,
                "Withholding trailing play until the next run"
            );
        }

        Ok(ImportSummary {
            since,
            days,
            withheld: carry.held().cloned(),
        })
    }

    /// Cursor from the destination, or the source's first day when empty
    pub async fn determine_since(&self) -> ImportResult<DateTime<Utc>> {
        if let Some(latest) = self.destination.fetch_latest().await? {
            debug!(title = %latest.title, started_at = %latest.started_at, "Latest stored play");
            return Ok(latest.started_at);
        }

        info!("Destination is empty, searching earliest source data");
        let earliest =
            find_earliest(&self.source, self.options.until, self.options.initial_step).await?;
        Ok(day_start(earliest))
    }

    /// Import one date, continuing from (and updating) `carry`
    pub async fn import_day(
        &self,
        date: NaiveDate,
        since: DateTime<Utc>,
        carry: &mut Carry,
    ) -> ImportResult<DayReport> {
        let events = self.source.fetch_events(date).await?;
        let plays = normalize_day(&events)?;
        let fetched = plays.len();

        let mut reconciler = Reconciler::new(plays, std::mem::take(carry));
        let mut emitted = 0;
        let mut submitted = 0;
        for play in reconciler.by_ref() {
            emitted += 1;
            if should_submit(&play, since, self.options.minimum_duration) {
                self.destination.create(&play).await?;
                submitted += 1;
            }
        }
        *carry = reconciler.into_carry();

        info!(
            %date,
            submitted,
            emitted,
            "Imported {} of {} plays for {}",
            submitted,
            fetched,
            date
        );

        Ok(DayReport {
            date,
            fetched,
            emitted,
            submitted,
        })
    }
}
