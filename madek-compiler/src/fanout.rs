//! Fan-out/fan-in barrier
//!
//! Spawns one tokio task per future and waits for every one of them. Each
//! task reports into its own slot, so results come back in submission order
//! no matter which task finishes first. Siblings of a failed task are never
//! cancelled; the barrier drains them all and then reports the first error
//! it saw.

use crate::error::{Error, Result};
use std::future::Future;
use tokio::task::JoinSet;
use tracing::warn;

/// Run all `futures` as parallel tasks and collect their values
///
/// # Errors
/// The first error drained from the task set. Which of several concurrent
/// failures that is depends on completion order.
pub(crate) async fn join_all_tasks<I, F, T>(futures: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut set = JoinSet::new();
    let mut total = 0;
    for (index, future) in futures.into_iter().enumerate() {
        set.spawn(async move { (index, future.await) });
        total += 1;
    }

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut first_error: Option<Error> = None;

    while let Some(joined) = set.join_next().await {
        let outcome = match joined {
            Ok((index, Ok(value))) => {
                slots[index] = Some(value);
                continue;
            }
            Ok((_, Err(err))) => err,
            Err(join_error) => {
                warn!(error = %join_error, "Worker task did not complete");
                Error::Internal(join_error.to_string())
            }
        };
        first_error.get_or_insert(outcome);
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(slots.into_iter().flatten().collect()),
    }
}
