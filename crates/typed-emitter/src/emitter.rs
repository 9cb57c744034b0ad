//! EventEmitter<A> — listener registry keyed by [`EventKey`].
//!
//! Each key owns a sequence of entries kept in registration order; a key
//! disappears with its last entry. `emit` copies the sequence for the key
//! and then calls every copied entry, whatever happens to the registry
//! meanwhile: entries registered by a listener wait for the next emit, and
//! entries removed by a listener (persistent or one-shot alike) still run in
//! the current one.
//!
//! A one-shot entry carries a shared `fired` flag. The first dispatch that
//! flips it removes the entry by id and calls the handler; any later copy of
//! the same entry (from a re-entrant emit) sees the flag and is skipped.
//!
//! The registry lock is released before any listener runs, so listeners may
//! register, remove or emit on the same emitter. A panic in a listener
//! unwinds out of `emit` and the rest of that round is skipped.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::EmitterOptions;
use crate::key::EventKey;
use crate::listener::Listener;

/// Untyped listener payload: an ordered sequence of opaque arguments.
pub type Args = [Value];

type EntryId = u64;

// ============================================================================
// Registry internals
// ============================================================================

#[derive(Debug, Clone)]
enum Dispatch {
    Persistent,
    /// Set by the first dispatch, which also removes the entry by id.
    Once { fired: Arc<AtomicBool> },
}

struct Entry<A: ?Sized + 'static> {
    id: EntryId,
    listener: Listener<A>,
    dispatch: Dispatch,
}

impl<A: ?Sized + 'static> Clone for Entry<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: self.listener.clone(),
            dispatch: self.dispatch.clone(),
        }
    }
}

/// Listeners for one event. Never left empty in the registry.
struct Sequence<A: ?Sized + 'static> {
    /// Creation rank, used to report event names in first-registration order.
    order: u64,
    entries: Vec<Entry<A>>,
    /// Set once the leak warning has been logged for this sequence.
    warned: bool,
}

struct Registry<A: ?Sized + 'static> {
    events: HashMap<EventKey, Sequence<A>>,
    next_order: u64,
}

impl<A: ?Sized + 'static> Registry<A> {
    fn new() -> Self {
        Self {
            events: HashMap::new(),
            next_order: 0,
        }
    }

    /// Remove every entry for `event` matching `pred`, dropping the sequence
    /// if it ends up empty. Returns the number of removed entries.
    fn remove_where(&mut self, event: &EventKey, pred: impl Fn(&Entry<A>) -> bool) -> usize {
        let (removed, now_empty) = match self.events.get_mut(event) {
            Some(seq) => {
                let before = seq.entries.len();
                seq.entries.retain(|entry| !pred(entry));
                (before - seq.entries.len(), seq.entries.is_empty())
            }
            None => return 0,
        };
        if now_empty {
            self.events.remove(event);
        }
        removed
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// Synchronous event emitter keyed by [`EventKey`].
///
/// `A` is the payload every listener receives by reference. Methods that
/// mutate the registry return `&Self` so calls can be chained.
pub struct EventEmitter<A: ?Sized + 'static = Args> {
    registry: Mutex<Registry<A>>,
    next_id: AtomicU64,
    max_listeners: AtomicUsize,
}

impl<A: ?Sized + 'static> EventEmitter<A> {
    /// Create a new, empty emitter with default options.
    pub fn new() -> Self {
        Self::with_options(EmitterOptions::default())
    }

    /// Create a new, empty emitter.
    pub fn with_options(options: EmitterOptions) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            next_id: AtomicU64::new(1),
            max_listeners: AtomicUsize::new(options.max_listeners),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Append `listener` to the listeners of `event`.
    ///
    /// Registering the same listener twice creates two independent entries.
    pub fn on(&self, event: impl Into<EventKey>, listener: Listener<A>) -> &Self {
        self.add(event.into(), listener, Dispatch::Persistent);
        self
    }

    /// Alias of [`on`](Self::on).
    pub fn add_listener(&self, event: impl Into<EventKey>, listener: Listener<A>) -> &Self {
        self.on(event, listener)
    }

    /// Append `listener` so that it runs on the next emit of `event` only.
    ///
    /// The pending registration can be cancelled with [`off`](Self::off)
    /// using the same `listener`.
    pub fn once(&self, event: impl Into<EventKey>, listener: Listener<A>) -> &Self {
        self.add(
            event.into(),
            listener,
            Dispatch::Once {
                fired: Arc::new(AtomicBool::new(false)),
            },
        );
        self
    }

    fn add(&self, event: EventKey, listener: Listener<A>, dispatch: Dispatch) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let max = self.max_listeners.load(Ordering::Relaxed);

        let exceeded = {
            let mut guard = self.registry.lock();
            let Registry { events, next_order } = &mut *guard;
            let seq = events.entry(event.clone()).or_insert_with(|| {
                let order = *next_order;
                *next_order += 1;
                Sequence {
                    order,
                    entries: Vec::new(),
                    warned: false,
                }
            });
            seq.entries.push(Entry {
                id,
                listener,
                dispatch,
            });
            if max > 0 && seq.entries.len() > max && !seq.warned {
                seq.warned = true;
                Some(seq.entries.len())
            } else {
                None
            }
        };

        if let Some(count) = exceeded {
            tracing::warn!(
                event = %event,
                count,
                max_listeners = max,
                "possible listener leak: listener count exceeds max_listeners"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Call every listener of `event` with `args`, in registration order.
    ///
    /// Returns `false` (doing nothing) if `event` has no listeners, `true`
    /// once every snapshotted listener has run.
    pub fn emit(&self, event: impl Into<EventKey>, args: &A) -> bool {
        let event = event.into();
        // Copy the entries; the lock is released before any listener runs.
        let snapshot: Vec<Entry<A>> = {
            let guard = self.registry.lock();
            match guard.events.get(&event) {
                Some(seq) => seq.entries.clone(),
                None => return false,
            }
        };

        tracing::trace!(event = %event, listeners = snapshot.len(), "emit");

        for entry in snapshot {
            match &entry.dispatch {
                Dispatch::Persistent => entry.listener.call(args),
                Dispatch::Once { fired } => {
                    if !fired.swap(true, Ordering::SeqCst) {
                        self.forget_entry(&event, entry.id);
                        entry.listener.call(args);
                    }
                }
            }
        }
        true
    }

    /// Remove entry `id` if it is still registered.
    fn forget_entry(&self, event: &EventKey, id: EntryId) {
        self.registry
            .lock()
            .remove_where(event, |entry| entry.id == id);
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove every entry of `event` registered with `listener`, including
    /// pending one-shot entries. Does nothing if there is no match.
    pub fn off(&self, event: impl Into<EventKey>, listener: &Listener<A>) -> &Self {
        let event = event.into();
        self.registry
            .lock()
            .remove_where(&event, |entry| entry.listener.ptr_eq(listener));
        self
    }

    /// Alias of [`off`](Self::off).
    pub fn remove_listener(&self, event: impl Into<EventKey>, listener: &Listener<A>) -> &Self {
        self.off(event, listener)
    }

    /// With `Some(event)`, drop every listener of that event; with `None`,
    /// clear the whole registry.
    pub fn remove_all_listeners(&self, event: Option<EventKey>) -> &Self {
        let mut guard = self.registry.lock();
        match event {
            Some(event) => {
                let removed = guard.events.remove(&event).map_or(0, |seq| seq.entries.len());
                tracing::debug!(event = %event, removed, "removed all listeners for event");
            }
            None => {
                let events = guard.events.len();
                guard.events.clear();
                tracing::debug!(events, "removed all listeners");
            }
        }
        drop(guard);
        self
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// The listeners of `event` in invocation order, as originally registered.
    pub fn listeners(&self, event: impl Into<EventKey>) -> Vec<Listener<A>> {
        let event = event.into();
        let guard = self.registry.lock();
        guard.events.get(&event).map_or_else(Vec::new, |seq| {
            seq.entries.iter().map(|entry| entry.listener.clone()).collect()
        })
    }

    /// Same as [`listeners`](Self::listeners); one-shot wrappers are never
    /// exposed.
    pub fn raw_listeners(&self, event: impl Into<EventKey>) -> Vec<Listener<A>> {
        self.listeners(event)
    }

    /// Number of entries registered for `event`.
    pub fn listener_count(&self, event: impl Into<EventKey>) -> usize {
        let event = event.into();
        self.registry
            .lock()
            .events
            .get(&event)
            .map_or(0, |seq| seq.entries.len())
    }

    /// Keys that currently have at least one listener, in the order they were
    /// first registered.
    pub fn event_names(&self) -> Vec<EventKey> {
        let guard = self.registry.lock();
        let mut names: Vec<(u64, EventKey)> = guard
            .events
            .iter()
            .map(|(key, seq)| (seq.order, key.clone()))
            .collect();
        names.sort_unstable_by_key(|(order, _)| *order);
        names.into_iter().map(|(_, key)| key).collect()
    }

    /// `true` if no event has any listener.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().events.is_empty()
    }

    // -----------------------------------------------------------------------
    // Options
    // -----------------------------------------------------------------------

    /// Set the per-event leak warning threshold. `0` disables it.
    pub fn set_max_listeners(&self, max: usize) -> &Self {
        self.max_listeners.store(max, Ordering::Relaxed);
        self
    }

    pub fn max_listeners(&self) -> usize {
        self.max_listeners.load(Ordering::Relaxed)
    }
}

impl<A: ?Sized + 'static> Default for EventEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(String, usize)> = {
            let guard = self.registry.lock();
            let mut counts: Vec<(u64, String, usize)> = guard
                .events
                .iter()
                .map(|(key, seq)| (seq.order, key.to_string(), seq.entries.len()))
                .collect();
            counts.sort_unstable_by_key(|(order, _, _)| *order);
            counts.into_iter().map(|(_, key, n)| (key, n)).collect()
        };
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .field("max_listeners", &self.max_listeners())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
