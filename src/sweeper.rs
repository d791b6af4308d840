//! Background purge of expired tokens
//!
//! A generator already drops expired tokens whenever it claims a new one.
//! The sweeper covers idle periods, so memory held by old tokens is released
//! even when nobody is generating.

use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::algorithm::{Clock, Entropy, Hasher, UniqueHashGenerator};

/// Spawn a task that purges `generator` every `interval`.
///
/// The task only keeps a weak reference and ends on the first tick after the
/// last strong reference to the generator is dropped.
pub fn spawn_sweeper<H, C, R>(
    generator: &Arc<UniqueHashGenerator<H, C, R>>,
    interval: Duration,
) -> JoinHandle<()>
where
    H: Hasher + 'static,
    C: Clock + 'static,
    R: Entropy + 'static,
{
    let weak = Arc::downgrade(generator);
    tokio::spawn(sweep(weak, interval))
}

async fn sweep<H, C, R>(weak: Weak<UniqueHashGenerator<H, C, R>>, interval: Duration)
where
    H: Hasher,
    C: Clock,
    R: Entropy,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(generator) = weak.upgrade() else {
            debug!("generator dropped, sweeper exiting");
            break;
        };

        match generator.purge_expired() {
            Ok(0) => {}
            Ok(removed) => debug!(
                "purged {} expired tokens, {} remain",
                removed,
                generator.held_count()
            ),
            Err(e) => warn!("sweep failed: {}", e),
        }
    }
}
