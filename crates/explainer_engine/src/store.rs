use std::collections::{BTreeMap, HashMap};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use engine_logging::engine_debug;
use explainer_core::{Deck, DeckId, EntryId, EntryPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    DeckInserted { deck_id: DeckId },
    EntryUpdated { deck_id: DeckId, entry_id: EntryId },
    EntryRemoved { deck_id: DeckId, entry_id: EntryId },
}

/// Receiver side of a store subscription. Unregisters itself when dropped.
pub struct Subscription {
    rx: mpsc::Receiver<StoreEvent>,
    disposer: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<StoreEvent>, disposer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            rx,
            disposer: Some(Box::new(disposer)),
        }
    }

    /// Drain everything delivered so far.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.rx.try_iter().collect()
    }

    pub fn dispose(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

/// Shared collection of decks. The pipeline reads and mutates it only through this trait.
pub trait EntryStore: Send + Sync {
    /// Snapshot of the deck, entries in order.
    fn get_deck(&self, deck_id: DeckId) -> Option<Deck>;

    /// Patch one entry in place. Returns `false` if the deck or entry no longer exists.
    fn update_item(&self, deck_id: DeckId, entry_id: EntryId, patch: EntryPatch) -> bool;

    fn remove_item(&self, deck_id: DeckId, entry_id: EntryId) -> bool;

    /// Notified after every successful mutation.
    fn subscribe(&self) -> Subscription;
}

#[derive(Debug, Default)]
struct Decks {
    decks: BTreeMap<DeckId, Deck>,
    last_deck_id: DeckId,
    last_entry_id: EntryId,
}

#[derive(Debug, Default)]
struct Subscribers {
    last_id: u64,
    senders: HashMap<u64, mpsc::Sender<StoreEvent>>,
}

#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    decks: Mutex<Decks>,
    subscribers: Arc<Mutex<Subscribers>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deck, assigning fresh ids to the deck and each of its entries.
    pub fn insert_deck(&self, mut deck: Deck) -> DeckId {
        let deck_id = {
            let mut guard = lock(&self.decks);
            guard.last_deck_id += 1;
            let deck_id = guard.last_deck_id;
            for entry in &mut deck.entries {
                guard.last_entry_id += 1;
                entry.id = guard.last_entry_id;
            }
            guard.decks.insert(deck_id, deck);
            deck_id
        };
        self.notify(StoreEvent::DeckInserted { deck_id });
        deck_id
    }

    fn notify(&self, event: StoreEvent) {
        let mut guard = lock(&self.subscribers);
        guard
            .senders
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }
}

impl EntryStore for InMemoryEntryStore {
    fn get_deck(&self, deck_id: DeckId) -> Option<Deck> {
        lock(&self.decks).decks.get(&deck_id).cloned()
    }

    fn update_item(&self, deck_id: DeckId, entry_id: EntryId, patch: EntryPatch) -> bool {
        let updated = {
            let mut guard = lock(&self.decks);
            match guard
                .decks
                .get_mut(&deck_id)
                .and_then(|deck| deck.entries.iter_mut().find(|entry| entry.id == entry_id))
            {
                Some(entry) => {
                    patch.apply_to(entry);
                    true
                }
                None => false,
            }
        };

        if updated {
            self.notify(StoreEvent::EntryUpdated { deck_id, entry_id });
        } else {
            engine_debug!("Update for missing entry {} in deck {} ignored", entry_id, deck_id);
        }
        updated
    }

    fn remove_item(&self, deck_id: DeckId, entry_id: EntryId) -> bool {
        let removed = {
            let mut guard = lock(&self.decks);
            match guard.decks.get_mut(&deck_id) {
                Some(deck) => {
                    let before = deck.entries.len();
                    deck.entries.retain(|entry| entry.id != entry_id);
                    deck.entries.len() != before
                }
                None => false,
            }
        };

        if removed {
            self.notify(StoreEvent::EntryRemoved { deck_id, entry_id });
        }
        removed
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = {
            let mut guard = lock(&self.subscribers);
            guard.last_id += 1;
            let id = guard.last_id;
            guard.senders.insert(id, tx);
            id
        };

        let subscribers = Arc::downgrade(&self.subscribers);
        Subscription::new(rx, move || {
            if let Some(subscribers) = subscribers.upgrade() {
                lock(&subscribers).senders.remove(&id);
            }
        })
    }
}
