//! Broadcast channel implementation

use breakwatch_api::{BroadcastMessage, TimerState};
use breakwatch_store::{StorageEvent, StorageRecvError, StorageSubscription, TimerStateStore};
use tracing::{debug, warn};

use crate::{BroadcastError, BroadcastResult};

/// Receives timer state changes made by the other tabs of the origin
pub struct BroadcastChannel {
    store: TimerStateStore,
    events: StorageSubscription,
}

impl BroadcastChannel {
    /// Start listening. Only changes made after this call are delivered.
    pub fn open(store: &TimerStateStore) -> Self {
        Self {
            store: store.clone(),
            events: store.subscribe(),
        }
    }

    /// Wait for the next change made by another tab
    pub async fn next(&mut self) -> BroadcastResult<BroadcastMessage> {
        loop {
            let result = self.events.recv().await;
            if let Some(message) = self.handle(result)? {
                return Ok(message);
            }
        }
    }

    /// Take the next pending change without waiting
    pub fn try_next(&mut self) -> Option<BroadcastResult<BroadcastMessage>> {
        loop {
            let result = self.events.try_recv()?;
            match self.handle(result) {
                Ok(Some(message)) => return Some(Ok(message)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    fn handle(
        &self,
        result: Result<StorageEvent, StorageRecvError>,
    ) -> BroadcastResult<Option<BroadcastMessage>> {
        match result {
            Ok(event) if event.key != self.store.key() => Ok(None),
            Ok(event) => Ok(Some(self.message_for(&event))),
            Err(StorageRecvError::Lagged(missed)) => {
                // Last write wins: the current value supersedes everything missed
                let message = match self.store.read() {
                    Some(state) => BroadcastMessage::State(state),
                    None => BroadcastMessage::Ended,
                };
                warn!(
                    tab_id = %self.store.tab_id().short(),
                    missed,
                    ?message,
                    "Broadcast receiver lagged, resynchronized from storage"
                );
                Ok(Some(message))
            }
            Err(StorageRecvError::Closed) => Err(BroadcastError::Closed),
        }
    }

    fn message_for(&self, event: &StorageEvent) -> BroadcastMessage {
        let message = match &event.new_value {
            None => BroadcastMessage::Ended,
            Some(raw) => match TimerState::decode(raw) {
                Ok(state) => BroadcastMessage::State(state),
                Err(e) => {
                    warn!(
                        tab_id = %self.store.tab_id().short(),
                        error = %e,
                        "Malformed timer state broadcast, treating as ended"
                    );
                    BroadcastMessage::Ended
                }
            },
        };

        debug!(
            tab_id = %self.store.tab_id().short(),
            from = %event.origin.short(),
            ?message,
            "Broadcast received"
        );

        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakwatch_store::SharedStorage;
    use breakwatch_util::{EpochMillis, TabId};

    const KEY: &str = "breakTimerState";

    fn tab(storage: &SharedStorage) -> TimerStateStore {
        TimerStateStore::new(storage.attach(TabId::new()), KEY)
    }

    #[tokio::test]
    async fn test_write_reaches_other_tab_once() {
        let storage = SharedStorage::in_memory();
        let a = tab(&storage);
        let b = tab(&storage);
        let mut b_channel = BroadcastChannel::open(&b);

        let state = TimerState::running(EpochMillis::from_millis(1_000));
        a.write(&state).unwrap();

        assert_eq!(b_channel.next().await.unwrap(), BroadcastMessage::State(state));
        assert!(b_channel.try_next().is_none());
    }

    #[tokio::test]
    async fn test_clear_is_ended() {
        let storage = SharedStorage::in_memory();
        let a = tab(&storage);
        let b = tab(&storage);
        let mut b_channel = BroadcastChannel::open(&b);

        a.clear().unwrap();
        assert_eq!(b_channel.next().await.unwrap(), BroadcastMessage::Ended);
    }

    #[tokio::test]
    async fn test_no_self_notification() {
        let storage = SharedStorage::in_memory();
        let a = tab(&storage);
        let mut a_channel = BroadcastChannel::open(&a);

        a.write(&TimerState::running(EpochMillis::from_millis(1))).unwrap();
        a.clear().unwrap();

        assert!(a_channel.try_next().is_none());
    }

    #[tokio::test]
    async fn test_other_keys_ignored() {
        let storage = SharedStorage::in_memory();
        let raw = storage.attach(TabId::new());
        let b = tab(&storage);
        let mut b_channel = BroadcastChannel::open(&b);

        raw.set("theme", "dark").unwrap();
        raw.set(KEY, r#"{"isRunning":false}"#).unwrap();

        assert_eq!(
            b_channel.next().await.unwrap(),
            BroadcastMessage::State(TimerState::idle())
        );
    }

    #[tokio::test]
    async fn test_malformed_broadcast_is_ended() {
        let storage = SharedStorage::in_memory();
        let raw = storage.attach(TabId::new());
        let b = tab(&storage);
        let mut b_channel = BroadcastChannel::open(&b);

        raw.set(KEY, "garbage").unwrap();
        assert_eq!(b_channel.next().await.unwrap(), BroadcastMessage::Ended);
    }

    #[tokio::test]
    async fn test_lag_resyncs_to_last_write() {
        let storage = SharedStorage::in_memory();
        let a = tab(&storage);
        let b = tab(&storage);
        let mut b_channel = BroadcastChannel::open(&b);

        for i in 0..200 {
            a.write(&TimerState::running(EpochMillis::from_millis(i))).unwrap();
        }

        let last = TimerState::running(EpochMillis::from_millis(199));
        assert_eq!(b_channel.next().await.unwrap(), BroadcastMessage::State(last));
    }
}
