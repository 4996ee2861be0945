use std::time::Duration;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::watch;

use crate::state::room::Room;

/// Shared store holding one record per active room.
///
/// Every room lives behind its own watch channel: mutations go through
/// [`RoomStore::transact`], which serialises writers per room and commits the
/// whole document as one write, and [`RoomStore::watch`] hands out receivers
/// that observe those commits in order. A delivered `None` means the record
/// was removed ("room closed"); dropping a receiver is the unsubscribe.
pub struct RoomStore {
    rooms: DashMap<String, watch::Sender<Option<Room>>>,
}

impl RoomStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Insert a freshly created room, failing when the code is taken.
    ///
    /// The existence check and the insert are one atomic step, so two hosts
    /// racing for the same code cannot both win it.
    pub fn insert(&self, room: Room) -> bool {
        match self.rooms.entry(room.code.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let (sender, _receiver) = watch::channel(Some(room));
                slot.insert(sender);
                true
            }
        }
    }

    /// Point-in-time read of a room record.
    pub fn read(&self, code: &str) -> Option<Room> {
        let entry = self.rooms.get(code)?;
        let value = entry.value().borrow().clone();
        value
    }

    /// Subscribe to a room. The receiver starts at the current value and then
    /// observes every committed write in commit order.
    pub fn watch(&self, code: &str) -> Option<watch::Receiver<Option<Room>>> {
        self.rooms.get(code).map(|entry| entry.value().subscribe())
    }

    /// Atomic read-modify-write against one room record.
    ///
    /// The closure runs on a draft of the current document; returning `Ok`
    /// commits the draft as a single write (waking subscribers once),
    /// returning `Err` discards it and leaves the record untouched. Returns
    /// `None` when the room does not exist.
    pub fn transact<T, E>(
        &self,
        code: &str,
        mutate: impl FnOnce(&mut Room) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let entry = self.rooms.get(code)?;
        let mut mutate = Some(mutate);
        let mut outcome = None;

        entry.value().send_if_modified(|slot| {
            let Some(room) = slot.as_mut() else {
                return false;
            };
            let Some(mutate) = mutate.take() else {
                return false;
            };

            let mut draft = room.clone();
            match mutate(&mut draft) {
                Ok(value) => {
                    *room = draft;
                    outcome = Some(Ok(value));
                    true
                }
                Err(err) => {
                    outcome = Some(Err(err));
                    false
                }
            }
        });

        outcome
    }

    /// Delete a room record. Live watchers observe `None` before the channel
    /// closes.
    pub fn remove(&self, code: &str) -> bool {
        match self.rooms.remove(code) {
            Some((_code, sender)) => {
                sender.send_replace(None);
                true
            }
            None => false,
        }
    }

    /// Codes of rooms created at least `ttl` ago, for the expiry sweep.
    pub fn expired(&self, ttl: Duration) -> Vec<String> {
        self.rooms
            .iter()
            .filter_map(|entry| {
                let created_at = entry.value().borrow().as_ref().map(|room| room.created_at)?;
                let old_enough = created_at.elapsed().map(|age| age >= ttl).unwrap_or(false);
                old_enough.then(|| entry.key().clone())
            })
            .collect()
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
