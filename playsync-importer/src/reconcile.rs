//! Reconciliation pipeline
//!
//! Turns a chronologically sorted stream of detected plays into clean,
//! non-overlapping plays using a single held candidate:
//!
//! - **Duplicate**: the incoming play reports the same track as the held one.
//!   The held play is dropped and the incoming play inherits its start.
//! - **Overlap**: the incoming play starts before the held one ends. The held
//!   play is cut at the incoming start; the later play is never shortened.
//! - **Empty**: a held play that ends up with no positive duration is dropped.
//!
//! The last held play is never emitted by a run. It is handed back as a
//! [`Carry`] and seeds the next day's run, so a track playing across midnight
//! is reconciled against its continuation.

use playsync_common::Play;
use tracing::debug;

/// Play withheld at the end of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carry {
    held: Option<Play>,
}

impl Carry {
    /// Nothing held; the state at the start of an import
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed a run with an explicit held play
    pub fn holding(play: Play) -> Self {
        Self { held: Some(play) }
    }

    pub fn held(&self) -> Option<&Play> {
        self.held.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }
}

/// Lazy reconciliation over one day's sorted plays
///
/// Input must be sorted by `(started_at, finished_at)`; this is not checked.
pub struct Reconciler<I> {
    input: I,
    held: Option<Play>,
}

impl<I> Reconciler<I>
where
    I: Iterator<Item = Play>,
{
    pub fn new<T>(plays: T, carry: Carry) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            input: plays.into_iter(),
            held: carry.held,
        }
    }

    /// Finish the run and hand back the trailing held play
    ///
    /// Any input not yet pulled through the iterator is discarded.
    pub fn into_carry(self) -> Carry {
        Carry { held: self.held }
    }
}

impl<I> Iterator for Reconciler<I>
where
    I: Iterator<Item = Play>,
{
    type Item = Play;

    fn next(&mut self) -> Option<Play> {
        for mut current in self.input.by_ref() {
            let Some(mut held) = self.held.take() else {
                self.held = Some(current);
                continue;
            };

            if held.is_same(&current) {
                current.started_at = held.started_at;
                debug!(
                    title = %current.title,
                    started_at = %current.started_at,
                    "Ignoring duplicate play"
                );
                self.held = Some(current);
                continue;
            }

            if current.started_at < held.finished_at {
                debug!(
                    title = %held.title,
                    at = %current.started_at,
                    trimmed_secs = (held.finished_at - current.started_at).num_seconds(),
                    "Trimming overlapping play"
                );
                held.finished_at = current.started_at;
            }

            self.held = Some(current);
            if held.has_positive_duration() {
                return Some(held);
            }
        }
        None
    }
}

/// Reconcile a whole day eagerly, updating `carry` in place
pub fn reconcile_day(plays: Vec<Play>, carry: &mut Carry) -> Vec<Play> {
    let mut reconciler = Reconciler::new(plays, std::mem::take(carry));
    let emitted: Vec<Play> = reconciler.by_ref().collect();
    *carry = reconciler.into_carry();
    emitted
}
