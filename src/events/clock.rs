/// Event clock - synthetic event producer
///
/// Emits one event per interval with a sequential id (starting at 1) and a
/// random kind, and hands it to the hub. The first event is emitted one full
/// interval after start.
use super::types::{Event, EventKind};
use crate::hub::DistributionHub;
use crate::logger::{self, LogTag};
use chrono::Utc;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct EventClock {
    interval: Duration,
    counter: u64,
}

impl EventClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            counter: 1,
        }
    }

    /// Build the next event and advance the counter
    pub fn next_event(&mut self) -> Event {
        let kind = EventKind::ALL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(EventKind::Info);

        let event = Event::new(
            self.counter.to_string(),
            kind.as_str(),
            format!("Event number {}", self.counter),
            Utc::now(),
        );
        self.counter += 1;
        event
    }

    /// Produce events until `cancel` fires
    pub async fn run(mut self, hub: Arc<DistributionHub>, cancel: CancellationToken) {
        logger::info(
            LogTag::Clock,
            &format!("Event clock started (interval={:?})", self.interval),
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let event = Arc::new(self.next_event());
                    let report = hub.broadcast(event.clone());
                    logger::info(
                        LogTag::Clock,
                        &format!(
                            "Generated event {} (delivered={}, evicted={})",
                            event, report.delivered, report.evicted
                        ),
                    );
                }
            }
        }

        logger::info(LogTag::Clock, "Event clock stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_and_known_kinds() {
        let mut clock = EventClock::new(Duration::from_secs(5));

        for expected in 1..=20u64 {
            let event = clock.next_event();
            assert_eq!(event.id, expected.to_string());
            assert_eq!(event.message, format!("Event number {}", expected));
            assert!(EventKind::ALL.iter().any(|k| k.as_str() == event.kind));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_emits_per_interval_until_cancelled() {
        let hub = DistributionHub::new(16);
        let (_id, mut rx) = hub.subscribe();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(EventClock::new(Duration::from_secs(5)).run(hub.clone(), cancel.clone()));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(10_200)).await;
        assert_eq!(rx.recv().await.unwrap().id, "1");
        assert_eq!(rx.recv().await.unwrap().id, "2");
        assert_eq!(rx.recv().await.unwrap().id, "3");

        cancel.cancel();
        handle.await.unwrap();
    }
}
