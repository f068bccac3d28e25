use futures::future::join_all;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Outcome of [`run_chunked`].
#[derive(Debug)]
pub struct ChunkedRun<T, R> {
    /// Results of every item that was started, in input order.
    pub completed: Vec<R>,
    /// Items that were never started because the token was cancelled.
    pub remaining: Vec<T>,
}
impl<T, R> ChunkedRun<T, R> {
    pub fn was_interrupted(&self) -> bool {
        !self.remaining.is_empty()
    }
}

/// Drive `items` through `f` in sequential chunks of at most `limit` items.
///
/// Every future inside a chunk is polled concurrently (on the current task,
/// no spawning) and the next chunk only starts once the whole chunk has
/// finished, so at most `limit` futures are ever in flight. The token is
/// checked before each chunk: a chunk in flight always finishes, and the
/// unstarted items are handed back in [`ChunkedRun::remaining`].
///
/// A `limit` of zero is treated as one.
pub async fn run_chunked<T, R, F, Fut>(
    items: Vec<T>,
    limit: usize,
    cancel: &CancellationToken,
    mut f: F,
) -> ChunkedRun<T, R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let limit = limit.max(1);
    let mut completed = Vec::with_capacity(items.len());
    let mut items = items.into_iter();
    while !cancel.is_cancelled() {
        let chunk = items.by_ref().take(limit).map(&mut f).collect::<Vec<_>>();
        if chunk.is_empty() {
            break;
        }
        completed.extend(join_all(chunk).await);
    }
    ChunkedRun { completed, remaining: items.collect() }
}
