//! Batch submission with pruning of rejected actions
//!
//! A bulk endpoint may refuse some items of a batch. The submitter removes
//! exactly the refused identities and sends what is left, until the batch is
//! accepted in full. A batch reduced to one refused action is dropped rather
//! than sent again unchanged.

use super::action::{Action, Batch};
use super::pacing::Pacer;
use super::types::{BatchOutcome, LoadError};
use crate::sink::{BulkResponse, BulkSink, ItemFailure};
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Sends batches to a sink and resolves partial failures
pub struct BulkSubmitter<'a> {
    sink: &'a mut dyn BulkSink,
    pacer: Pacer,
}

impl<'a> BulkSubmitter<'a> {
    pub fn new(sink: &'a mut dyn BulkSink, pacer: Pacer) -> Self {
        Self { sink, pacer }
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Submit one batch until it is accepted, dropped, or fails fatally.
    ///
    /// Transport errors are returned as-is and never retried.
    pub fn submit(&mut self, batch: Batch) -> Result<BatchOutcome, LoadError> {
        let mut outcome = BatchOutcome::default();
        let mut pending = batch;

        while !pending.is_empty() {
            outcome.submissions += 1;
            info!("Sending {} actions ...", pending.len());

            let response = self.sink.submit(&pending).map_err(|e| {
                error!("Bulk request of {} actions failed: {}", pending.len(), e);
                e
            })?;

            let failures = match response {
                BulkResponse::Success => {
                    outcome.indexed += pending.len();
                    self.pacer.pace();
                    break;
                }
                BulkResponse::PartialFailure(failures) => failures,
            };

            for failure in &failures {
                error!(
                    id = %failure.id,
                    status = failure.status,
                    "Action rejected: {}",
                    failure.reason
                );
            }

            if pending.len() == 1 {
                warn!("Dropping action {} after rejection", pending[0].id);
                outcome.rejected += 1;
                outcome.dropped_single = true;
                break;
            }

            let before = pending.len();
            pending = prune(pending, &failures);
            let removed = before - pending.len();

            if removed == 0 {
                error!(
                    "None of the {} reported failures match the pending batch",
                    failures.len()
                );
                return Err(LoadError::UnmatchedFailures {
                    pending: before,
                    reported: failures.len(),
                });
            }

            outcome.rejected += removed;
            if !pending.is_empty() {
                warn!(
                    "Resending reduced bulk of {} actions ({} removed)",
                    pending.len(),
                    removed
                );
            }
        }

        Ok(outcome)
    }
}

/// Remove the actions named in `failures`, keeping the order of the rest
pub fn prune(batch: Batch, failures: &[ItemFailure]) -> Batch {
    let failed: HashSet<&str> = failures.iter().map(|f| f.id.as_str()).collect();
    batch
        .into_iter()
        .filter(|action: &Action| !failed.contains(action.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{SinkError, SinkResult};
    use indexmap::IndexMap;
    use std::collections::VecDeque;

    /// Sink answering from a script and recording the identities of every request
    #[derive(Debug, Default)]
    struct ScriptedSink {
        responses: VecDeque<SinkResult<BulkResponse>>,
        requests: Vec<Vec<String>>,
    }

    impl ScriptedSink {
        fn new(responses: Vec<SinkResult<BulkResponse>>) -> Self {
            Self {
                responses: responses.into(),
                requests: Vec::new(),
            }
        }
    }

    impl BulkSink for ScriptedSink {
        fn submit(&mut self, actions: &[Action]) -> SinkResult<BulkResponse> {
            self.requests
                .push(actions.iter().map(|a| a.id.clone()).collect());
            self.responses
                .pop_front()
                .unwrap_or(Ok(BulkResponse::Success))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn batch(ids: std::ops::Range<usize>) -> Batch {
        ids.map(|i| Action {
            id: i.to_string(),
            index: "test-submit".to_string(),
            doc_type: "default".to_string(),
            source: IndexMap::new(),
        })
        .collect()
    }

    fn rejected(ids: &[&str]) -> SinkResult<BulkResponse> {
        Ok(BulkResponse::PartialFailure(
            ids.iter()
                .map(|id| ItemFailure {
                    id: id.to_string(),
                    status: 400,
                    reason: "mapper_parsing_exception".to_string(),
                })
                .collect(),
        ))
    }

    #[test]
    fn test_full_success_single_request() {
        let mut sink = ScriptedSink::new(vec![]);
        let outcome = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..2))
            .unwrap();

        assert_eq!(outcome.indexed, 2);
        assert_eq!(outcome.rejected, 0);
        assert_eq!(outcome.submissions, 1);
        assert_eq!(sink.requests.len(), 1);
    }

    #[test]
    fn test_partial_failure_resubmits_remainder() {
        let mut sink = ScriptedSink::new(vec![rejected(&["1"])]);
        let outcome = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..3))
            .unwrap();

        assert_eq!(outcome.indexed, 2);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.submissions, 2);
        assert!(!outcome.dropped_single);
        assert_eq!(sink.requests[1], vec!["0", "2"]);
    }

    #[test]
    fn test_single_failing_action_is_dropped_once() {
        let mut sink = ScriptedSink::new(vec![rejected(&["0"])]);
        let outcome = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..1))
            .unwrap();

        assert_eq!(outcome.indexed, 0);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.submissions, 1);
        assert!(outcome.dropped_single);
        assert_eq!(sink.requests.len(), 1);
    }

    #[test]
    fn test_repeated_failures_converge() {
        // One new offender per round
        let mut sink =
            ScriptedSink::new(vec![rejected(&["4"]), rejected(&["0"]), rejected(&["2"])]);
        let outcome = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..6))
            .unwrap();

        assert_eq!(outcome.indexed, 3);
        assert_eq!(outcome.rejected, 3);
        assert_eq!(outcome.submissions, 4);
        assert_eq!(sink.requests.last().unwrap(), &vec!["1", "3", "5"]);
    }

    #[test]
    fn test_reduction_to_single_then_drop() {
        let mut sink = ScriptedSink::new(vec![rejected(&["0"]), rejected(&["1"])]);
        let outcome = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..2))
            .unwrap();

        assert_eq!(outcome.indexed, 0);
        assert_eq!(outcome.rejected, 2);
        assert_eq!(outcome.submissions, 2);
        assert!(outcome.dropped_single);
    }

    #[test]
    fn test_everything_rejected_stops_without_empty_request() {
        let mut sink = ScriptedSink::new(vec![rejected(&["0", "1", "2"])]);
        let outcome = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..3))
            .unwrap();

        assert_eq!(outcome.indexed, 0);
        assert_eq!(outcome.rejected, 3);
        assert_eq!(sink.requests.len(), 1);
    }

    #[test]
    fn test_unmatched_failures_are_fatal() {
        let mut sink = ScriptedSink::new(vec![rejected(&["99"])]);
        let err = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..3))
            .unwrap_err();

        assert!(matches!(
            err,
            LoadError::UnmatchedFailures {
                pending: 3,
                reported: 1
            }
        ));
    }

    #[test]
    fn test_transport_error_is_not_retried() {
        let mut sink = ScriptedSink::new(vec![Err(SinkError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })]);
        let err = BulkSubmitter::new(&mut sink, Pacer::disabled())
            .submit(batch(0..3))
            .unwrap_err();

        assert!(matches!(err, LoadError::Sink(SinkError::Status { status: 503, .. })));
        assert_eq!(sink.requests.len(), 1);
    }

    #[test]
    fn test_pacing_only_after_success() {
        let mut sink = ScriptedSink::new(vec![
            rejected(&["0"]),
            rejected(&["1"]),
            Ok(BulkResponse::Success),
            rejected(&["0"]),
        ]);
        let mut submitter =
            BulkSubmitter::new(&mut sink, Pacer::new(std::time::Duration::ZERO, true));

        submitter.submit(batch(0..3)).unwrap();
        assert_eq!(submitter.pacer().pauses(), 1);

        // Single dropped action: nothing was indexed, no pause
        submitter.submit(batch(0..1)).unwrap();
        assert_eq!(submitter.pacer().pauses(), 1);
    }

    #[test]
    fn test_prune_keeps_order() {
        let failures: Vec<ItemFailure> = ["5", "1", "3"]
            .iter()
            .map(|id| ItemFailure {
                id: id.to_string(),
                status: 400,
                reason: String::new(),
            })
            .collect();

        let pruned = prune(batch(0..7), &failures);
        let ids: Vec<&str> = pruned.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "2", "4", "6"]);
    }
}
