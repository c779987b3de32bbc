//! Submission sinks: where completed pledges are recorded.

use std::future::Future;

use tracing::info;

use crate::errors::SubmissionError;
use crate::form::PledgeRecord;

/// External system of record for completed pledges.
pub trait SubmissionSink {
    fn submit(
        &self,
        record: &PledgeRecord,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send;
}

impl<S: SubmissionSink + Sync> SubmissionSink for &S {
    fn submit(
        &self,
        record: &PledgeRecord,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send {
        (**self).submit(record)
    }
}

/// Writes the pledge to the log and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    async fn submit(&self, record: &PledgeRecord) -> Result<(), SubmissionError> {
        info!(
            full_name = %record.full_name,
            amount = %record.faith_promise,
            payment_method = %record.payment_method,
            proof = record.proof_of_transfer.as_deref().unwrap_or("-"),
            "Pledge recorded (log sink)"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Records every submission and answers with a scripted result.
    #[derive(Default)]
    pub struct RecordingSink {
        pub records: Mutex<Vec<PledgeRecord>>,
        pub fail_with: Mutex<Option<SubmissionError>>,
    }

    impl RecordingSink {
        pub fn failing(err: SubmissionError) -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail_with: Mutex::new(Some(err)),
            }
        }

        pub fn count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    /// Takes `delay` to accept each pledge.
    pub struct SlowSink {
        delay: Duration,
        completed: AtomicUsize,
    }

    impl SlowSink {
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                completed: AtomicUsize::new(0),
            }
        }

        pub fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }
    }

    impl SubmissionSink for SlowSink {
        async fn submit(&self, _record: &PledgeRecord) -> Result<(), SubmissionError> {
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl SubmissionSink for RecordingSink {
        async fn submit(&self, record: &PledgeRecord) -> Result<(), SubmissionError> {
            self.records.lock().unwrap().push(record.clone());
            match self.fail_with.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }
}
