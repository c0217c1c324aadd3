//! Schedule session: one municipality, one batch, memoized derived views.
//!
//! The session is the only mutable state in the engine. It runs on a
//! single-threaded cooperative model: the awaited provider fetch is the
//! only suspension point, and a fetch epoch guards against a superseded
//! request overwriting a newer one. Aggregation and partitioning operate
//! on an immutable batch snapshot, so no locking is involved.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::aggregate::{Aggregation, aggregate};
use crate::model::{MunicipalityId, RawPickup};
use crate::partition::{Partitions, partition};
use crate::ports::{ProviderError, ScheduleProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lifecycle phase of a [`ScheduleSession`].
pub enum SessionPhase {
    /// No municipality has been selected yet.
    Empty,
    /// A fetch is in flight.
    Loading,
    /// A batch is installed and its views are current.
    Ready,
    /// The most recent fetch failed; any previously installed batch is
    /// still readable.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a completed fetch was applied to the session.
pub enum SelectOutcome {
    /// The fetched batch was installed and derived views reset.
    Installed,
    /// A newer selection superseded this fetch; its result was discarded.
    Superseded,
}

#[derive(Debug)]
/// Token tying an in-flight fetch to the selection that issued it.
///
/// Returned by [`ScheduleSession::begin_select`] and consumed by
/// [`ScheduleSession::apply_fetch`]; a ticket whose epoch is no longer
/// current marks its fetch as superseded.
pub struct FetchTicket {
    municipality: MunicipalityId,
    epoch: u64,
}

impl FetchTicket {
    /// Municipality the fetch was issued for.
    #[must_use]
    pub fn municipality(&self) -> &MunicipalityId {
        &self.municipality
    }
}

/// Most recently fetched batch for one municipality.
#[derive(Debug)]
struct Batch {
    municipality: MunicipalityId,
    records: Vec<RawPickup>,
}

/// State machine orchestrating fetches and the derived schedule views.
///
/// Holds at most one batch at a time; installing a new batch atomically
/// replaces the previous one together with every memoized view, so
/// markers and partitions always describe the same municipality.
pub struct ScheduleSession {
    provider: Arc<dyn ScheduleProvider>,
    phase: SessionPhase,
    epoch: u64,
    selected: Option<MunicipalityId>,
    batch: Option<Batch>,
    aggregation_memo: Option<Arc<Aggregation>>,
    partition_memos: HashMap<NaiveDate, Arc<Partitions>>,
}

impl ScheduleSession {
    /// Create an empty session bound to the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn ScheduleProvider>) -> Self {
        Self {
            provider,
            phase: SessionPhase::Empty,
            epoch: 0,
            selected: None,
            batch: None,
            aggregation_memo: None,
            partition_memos: HashMap::new(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Municipality of the most recent selection, in-flight or applied.
    #[must_use]
    pub fn selected_municipality(&self) -> Option<&MunicipalityId> {
        self.selected.as_ref()
    }

    /// Select a municipality and fetch its schedule.
    ///
    /// On success the new batch replaces the previous one wholesale. On
    /// failure the previous batch (if any) stays readable; the caller can
    /// retry by selecting again. A selection issued while an earlier
    /// fetch is still in flight supersedes it.
    ///
    /// # Errors
    ///
    /// Returns the [`ProviderError`] of a failed fetch. The session keeps
    /// its last good batch in that case.
    pub async fn select_municipality(
        &mut self,
        municipality: MunicipalityId,
    ) -> Result<SelectOutcome, ProviderError> {
        let ticket = self.begin_select(municipality.clone());
        let outcome = self.provider.fetch_schedule(&municipality).await;
        self.apply_fetch(ticket, outcome)
    }

    /// Start a selection: bump the fetch epoch and enter `Loading`.
    ///
    /// Derived views of a previously installed batch stay readable while
    /// the fetch is in flight.
    pub fn begin_select(&mut self, municipality: MunicipalityId) -> FetchTicket {
        self.epoch += 1;
        self.selected = Some(municipality.clone());
        self.phase = SessionPhase::Loading;
        debug!(municipality = %municipality, epoch = self.epoch, "schedule fetch started");
        FetchTicket {
            municipality,
            epoch: self.epoch,
        }
    }

    /// Apply the outcome of a fetch started with [`Self::begin_select`].
    ///
    /// A ticket from a superseded selection is discarded silently and the
    /// session state is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure after recording the `Failed` phase;
    /// the last good batch is retained.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<RawPickup>, ProviderError>,
    ) -> Result<SelectOutcome, ProviderError> {
        if ticket.epoch != self.epoch {
            debug!(
                municipality = %ticket.municipality,
                stale_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "discarding superseded schedule fetch"
            );
            return Ok(SelectOutcome::Superseded);
        }

        match outcome {
            Ok(records) => {
                debug!(
                    municipality = %ticket.municipality,
                    records = records.len(),
                    "schedule batch installed"
                );
                self.batch = Some(Batch {
                    municipality: ticket.municipality,
                    records,
                });
                self.aggregation_memo = None;
                self.partition_memos.clear();
                self.phase = SessionPhase::Ready;
                Ok(SelectOutcome::Installed)
            }
            Err(err) => {
                warn!(
                    municipality = %ticket.municipality,
                    error = %err,
                    retained_batch = self.batch.is_some(),
                    "schedule fetch failed"
                );
                self.phase = SessionPhase::Failed;
                Err(err)
            }
        }
    }

    /// Calendar multi-marker map for the current batch.
    ///
    /// Memoized per batch; without a batch this is an empty aggregation.
    pub fn markers(&mut self) -> Arc<Aggregation> {
        if let Some(memo) = &self.aggregation_memo {
            return Arc::clone(memo);
        }
        let aggregation = match &self.batch {
            Some(batch) => aggregate(&batch.records),
            None => Aggregation::default(),
        };
        let aggregation = Arc::new(aggregation);
        self.aggregation_memo = Some(Arc::clone(&aggregation));
        aggregation
    }

    /// Today/upcoming/past partitions relative to `reference`.
    ///
    /// Memoized per batch and per distinct reference date; without a
    /// batch all three partitions are empty.
    pub fn partitions(&mut self, reference: NaiveDate) -> Arc<Partitions> {
        if let Some(memo) = self.partition_memos.get(&reference) {
            return Arc::clone(memo);
        }
        let partitions = match &self.batch {
            Some(batch) => partition(&batch.records, reference),
            None => Partitions::default(),
        };
        let partitions = Arc::new(partitions);
        self.partition_memos
            .insert(reference, Arc::clone(&partitions));
        partitions
    }

    /// Number of malformed records skipped in the current batch.
    pub fn warnings(&mut self) -> u32 {
        self.markers().warnings
    }

    /// Municipality of the installed batch, if any.
    ///
    /// Can differ from [`Self::selected_municipality`] while a fetch for
    /// a newly selected municipality is still in flight.
    #[must_use]
    pub fn batch_municipality(&self) -> Option<&MunicipalityId> {
        self.batch.as_ref().map(|batch| &batch.municipality)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::{ScheduleSession, SelectOutcome, SessionPhase};
    use crate::model::{DateKey, MunicipalityId, RawPickup};
    use crate::ports::{ProviderError, ScheduleProvider};

    /// Provider that replays a scripted sequence of fetch outcomes.
    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<Result<Vec<RawPickup>, ProviderError>>>,
    }

    impl ScriptedProvider {
        fn new(outcomes: Vec<Result<Vec<RawPickup>, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
            })
        }
    }

    #[async_trait]
    impl ScheduleProvider for ScriptedProvider {
        async fn fetch_schedule(
            &self,
            municipality: &MunicipalityId,
        ) -> Result<Vec<RawPickup>, ProviderError> {
            self.outcomes
                .lock()
                .expect("scripted provider lock")
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ProviderError::Internal(format!(
                        "no scripted outcome left for {municipality}"
                    )))
                })
        }
    }

    fn zagreb() -> MunicipalityId {
        MunicipalityId("zagreb".to_owned())
    }

    fn split() -> MunicipalityId {
        MunicipalityId("split".to_owned())
    }

    fn sample_records() -> Vec<RawPickup> {
        vec![
            RawPickup::new("2024-06-01", "Papir"),
            RawPickup::new("2024-06-02", "Bio"),
            RawPickup::new("2024-06-03", "Plastika"),
        ]
    }

    #[test]
    fn empty_session_answers_with_empty_views() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ScheduleSession::new(provider);

        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.markers().markers.is_empty());

        let reference = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let partitions = session.partitions(reference);
        assert!(partitions.today.is_empty());
        assert!(partitions.upcoming.is_empty());
        assert!(partitions.past.is_empty());
        assert_eq!(session.warnings(), 0);
    }

    #[tokio::test]
    async fn successful_select_installs_batch() {
        let provider = ScriptedProvider::new(vec![Ok(sample_records())]);
        let mut session = ScheduleSession::new(provider);

        let outcome = session.select_municipality(zagreb()).await.unwrap();
        assert_eq!(outcome, SelectOutcome::Installed);
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.batch_municipality(), Some(&zagreb()));
        assert_eq!(session.markers().markers.len(), 3);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_last_good_views() {
        let provider = ScriptedProvider::new(vec![
            Ok(sample_records()),
            Err(ProviderError::Internal("backend down".to_owned())),
        ]);
        let mut session = ScheduleSession::new(provider);

        session.select_municipality(zagreb()).await.unwrap();
        let markers_before = session.markers();

        let err = session.select_municipality(zagreb()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Internal(_)));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert_eq!(*session.markers(), *markers_before);
        assert_eq!(session.batch_municipality(), Some(&zagreb()));
    }

    #[tokio::test]
    async fn replacing_municipality_swaps_views_atomically() {
        let split_records = vec![RawPickup::new("2024-07-01", "Komunalni")];
        let provider =
            ScriptedProvider::new(vec![Ok(sample_records()), Ok(split_records)]);
        let mut session = ScheduleSession::new(provider);

        session.select_municipality(zagreb()).await.unwrap();
        session.select_municipality(split()).await.unwrap();

        let markers = session.markers();
        assert_eq!(markers.markers.len(), 1);
        let key = DateKey::from_raw("2024-07-01").unwrap();
        assert!(markers.markers.contains_key(&key));
        assert_eq!(session.batch_municipality(), Some(&split()));
    }

    #[test]
    fn late_fetch_for_superseded_selection_is_discarded() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ScheduleSession::new(provider);

        let ticket_a = session.begin_select(zagreb());
        let ticket_b = session.begin_select(split());
        assert_eq!(session.selected_municipality(), Some(&split()));

        let records_b = vec![RawPickup::new("2024-07-01", "Bio")];
        let applied_b = session.apply_fetch(ticket_b, Ok(records_b)).unwrap();
        assert_eq!(applied_b, SelectOutcome::Installed);

        // A's fetch resolves after B's; its batch must not win.
        let applied_a = session.apply_fetch(ticket_a, Ok(sample_records())).unwrap();
        assert_eq!(applied_a, SelectOutcome::Superseded);

        assert_eq!(session.batch_municipality(), Some(&split()));
        assert_eq!(session.markers().markers.len(), 1);
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[test]
    fn loading_without_prior_batch_reads_empty_not_error() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ScheduleSession::new(provider);

        let _ticket = session.begin_select(zagreb());
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.markers().markers.is_empty());
    }

    #[tokio::test]
    async fn warnings_report_skipped_records_of_current_batch() {
        let mut records = sample_records();
        records.push(RawPickup::new("??", "Bio"));
        let provider = ScriptedProvider::new(vec![Ok(records)]);
        let mut session = ScheduleSession::new(provider);

        session.select_municipality(zagreb()).await.unwrap();
        assert_eq!(session.warnings(), 1);

        let reference = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(session.partitions(reference).warnings, 1);
    }

    #[tokio::test]
    async fn memoized_views_are_reused_per_batch_and_reference() {
        let provider = ScriptedProvider::new(vec![Ok(sample_records())]);
        let mut session = ScheduleSession::new(provider);
        session.select_municipality(zagreb()).await.unwrap();

        let first = session.markers();
        let second = session.markers();
        assert!(Arc::ptr_eq(&first, &second));

        let reference = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let parts_first = session.partitions(reference);
        let parts_second = session.partitions(reference);
        assert!(Arc::ptr_eq(&parts_first, &parts_second));

        let other_reference = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let parts_other = session.partitions(other_reference);
        assert!(!Arc::ptr_eq(&parts_first, &parts_other));
    }
}
