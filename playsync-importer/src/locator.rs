//! Earliest-date locator
//!
//! Finds the first calendar day the source has any record for, without
//! knowing how far back its history goes. The search steps backwards from an
//! anchor by a fixed number of days until it hits a day without data, then
//! restarts one step ahead of that day with half the step. When a day without
//! data is found at step 1, the following day is the answer.
//!
//! Assumes the source has no data gaps between its first day and the anchor.

use crate::types::{DetectionSource, SourceError};
use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("probing {step} days back from {date} leaves the supported calendar")]
    OutOfRange { date: NaiveDate, step: u32 },
}

/// First date (inclusive) with at least one source record
///
/// `initial_step` below 1 is treated as 1. A persistent source error aborts
/// the search.
pub async fn find_earliest<S>(
    source: &S,
    anchor: NaiveDate,
    initial_step: u32,
) -> Result<NaiveDate, LocatorError>
where
    S: DetectionSource + ?Sized,
{
    let mut anchor = anchor;
    let mut step = initial_step.max(1);

    loop {
        let empty = first_empty_before(source, anchor, step).await?;
        if step == 1 {
            let earliest = empty
                .checked_add_days(Days::new(1))
                .ok_or(LocatorError::OutOfRange { date: empty, step })?;
            info!(%earliest, "Located earliest source data");
            return Ok(earliest);
        }

        anchor = empty
            .checked_add_days(Days::new(u64::from(step)))
            .ok_or(LocatorError::OutOfRange { date: empty, step })?;
        step /= 2;
    }
}

/// Step back from `anchor` until a date without data turns up
async fn first_empty_before<S>(
    source: &S,
    anchor: NaiveDate,
    step: u32,
) -> Result<NaiveDate, LocatorError>
where
    S: DetectionSource + ?Sized,
{
    let mut date = anchor;
    loop {
        date = date
            .checked_sub_days(Days::new(u64::from(step)))
            .ok_or(LocatorError::OutOfRange { date, step })?;

        let events = source.fetch_events(date).await?;
        debug!(%date, step, events = events.len(), "Probed source");
        if events.is_empty() {
            return Ok(date);
        }
    }
}
