// ABOUTME: Round-robin combinator that interleaves lazy sequences into one.
// ABOUTME: Exhausted cursors are released in place; faults propagate after cleanup.

use futures::stream::{Stream, StreamExt};

/// Interleave a fixed set of sequences into one, round-robin.
///
/// One live cursor is kept per input. Each pass over the live set advances
/// every cursor exactly once, in order, yielding each produced value
/// immediately; the consumer pulls one combined value per underlying advance.
/// A cursor that reports exhaustion is dropped and removed without disturbing
/// the relative order of the rest, so no live source advances twice before
/// every other live source has had its chance. The combined sequence ends
/// when the live set is empty.
///
/// If a cursor advance faults, every remaining cursor is dropped before the
/// fault is handed to the consumer; abandoning the combined stream early
/// drops all live cursors as well.
pub fn combine<T, E, S>(sources: Vec<S>) -> impl Stream<Item = Result<T, E>>
where
    S: Stream<Item = Result<T, E>>,
{
    async_stream::stream! {
        let mut cursors: Vec<_> = sources.into_iter().map(Box::pin).collect();
        while !cursors.is_empty() {
            let mut index = 0;
            while index < cursors.len() {
                match cursors[index].next().await {
                    Some(Ok(value)) => {
                        yield Ok(value);
                        index += 1;
                    }
                    Some(Err(fault)) => {
                        // Release every live cursor before the fault escapes.
                        cursors.clear();
                        yield Err(fault);
                        return;
                    }
                    None => {
                        // Exhausted: the next cursor shifts into this slot and
                        // takes its turn in the same pass.
                        drop(cursors.remove(index));
                    }
                }
            }
        }
    }
}
