//! Stream throttling utilities

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Throttle the stream to emit at most once per interval
    ///
    /// Uses "latest-wins" semantics - if multiple items arrive
    /// during an interval, only the latest is emitted.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that throttles emission rate
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        period: Duration,
        // Created on first poll so construction does not need a runtime
        interval: Option<Interval>,
        pending: Option<S::Item>,
        done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    /// Create a new throttled stream
    pub fn new(stream: S, duration: Duration) -> Self {
        Self { stream, period: duration, interval: None, pending: None, done: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain all available items, keeping only the latest
        while !*this.done {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.pending = Some(item),
                Poll::Ready(None) => *this.done = true,
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            return if *this.done { Poll::Ready(None) } else { Poll::Pending };
        }

        let period = *this.period;
        let interval = this.interval.get_or_insert_with(|| {
            let mut interval = interval(period);
            // Delay rather than burst after a slow consumer
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        match interval.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(this.pending.take()),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::stream;

    #[tokio::test]
    async fn finite_stream_yields_latest_then_ends() {
        let throttled = stream::iter(1..=5).throttle(Duration::from_millis(10));
        let items: Vec<_> = throttled.collect().await;
        assert_eq!(items, vec![5]);
    }

    #[tokio::test]
    async fn empty_stream_ends() {
        let mut throttled = stream::iter(Vec::<u32>::new()).throttle(Duration::from_millis(10));
        assert_eq!(throttled.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn items_are_spaced_by_the_period() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<u32>();
        let mut throttled = rx.throttle(Duration::from_millis(100));

        tx.unbounded_send(1).unwrap();
        let start = tokio::time::Instant::now();
        assert_eq!(throttled.next().await, Some(1));

        tx.unbounded_send(2).unwrap();
        tx.unbounded_send(3).unwrap();
        assert_eq!(throttled.next().await, Some(3));
        assert!(start.elapsed() >= Duration::from_millis(100));

        drop(tx);
        assert_eq!(throttled.next().await, None);
    }
}
