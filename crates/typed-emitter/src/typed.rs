//! Typed facade — compile-time checked events over the untyped emitter.
//!
//! An [`EventMap`] is declared once, together with one marker type per event
//! implementing [`Event`] (its key literal and argument type). A
//! [`TypedEmitter<M>`] only accepts events whose `Map` is `M`, and only
//! listeners and payloads of the declared argument type; anything else is a
//! compile error.
//!
//! At runtime every call forwards unchanged to an inner
//! [`EventEmitter`] keyed by [`Event::NAME`], so ordering, `once` and
//! snapshot semantics are exactly those of the untyped emitter.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use typed_emitter::{event_map, TypedEmitter, TypedListener};
//!
//! event_map! {
//!     pub struct Session {
//!         Login = "login" => (String,),
//!         Ready = "ready" => (),
//!     }
//! }
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = Arc::clone(&seen);
//!
//! let emitter: TypedEmitter<Session> = TypedEmitter::new();
//! emitter.on::<Login>(TypedListener::new(move |args: &(String,)| {
//!     seen_clone.lock().unwrap().push(args.0.clone());
//! }));
//!
//! assert!(emitter.emit::<Login>(&("alice".to_string(),)));
//! assert!(!emitter.emit::<Ready>(&()));
//! assert_eq!(*seen.lock().unwrap(), vec!["alice".to_string()]);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::config::EmitterOptions;
use crate::emitter::EventEmitter;
use crate::key::EventKey;
use crate::listener::Listener;

/// Payload type of the emitter underneath a [`TypedEmitter`].
type ErasedArgs = dyn Any + Send + Sync;

// ============================================================================
// Declarations
// ============================================================================

/// Marker for a declared set of events. See [`event_map!`](crate::event_map).
pub trait EventMap: 'static {}

/// One declared event: its map, its argument type and its key literal.
pub trait Event: 'static {
    type Map: EventMap;
    /// The payload listeners receive by reference. Use a tuple for several
    /// arguments and `()` for none.
    type Args: Send + Sync + 'static;
    const NAME: &'static str;

    fn key() -> EventKey {
        EventKey::from(Self::NAME)
    }
}

/// Declare an [`EventMap`] and its [`Event`]s.
///
/// ```
/// typed_emitter::event_map! {
///     /// Events of a chat room.
///     pub struct Room {
///         Joined = "joined" => (String, u32),
///         Left = "left" => (String,),
///     }
/// }
///
/// use typed_emitter::Event;
/// assert_eq!(Joined::NAME, "joined");
/// ```
#[macro_export]
macro_rules! event_map {
    (
        $(#[$map_meta:meta])*
        $vis:vis struct $map:ident {
            $(
                $(#[$event_meta:meta])*
                $event:ident = $name:literal => $args:ty
            ),* $(,)?
        }
    ) => {
        $(#[$map_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        $vis struct $map;

        impl $crate::typed::EventMap for $map {}

        $(
            $(#[$event_meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            $vis struct $event;

            impl $crate::typed::Event for $event {
                type Map = $map;
                type Args = $args;
                const NAME: &'static str = $name;
            }
        )*
    };
}

// ============================================================================
// TypedListener
// ============================================================================

/// A listener for event `E`. Clones share identity, as with [`Listener`].
pub struct TypedListener<E: Event> {
    inner: Listener<ErasedArgs>,
    _event: PhantomData<fn() -> E>,
}

impl<E: Event> TypedListener<E> {
    pub fn new(callback: impl Fn(&E::Args) + Send + Sync + 'static) -> Self {
        let inner = Listener::new(move |args: &ErasedArgs| match args.downcast_ref::<E::Args>() {
            Some(args) => callback(args),
            // The inner emitter is private and every typed call passes `E::Args`, so this
            // needs two events of one map declaring the same key literal.
            None => tracing::debug!(event = E::NAME, "skipping listener: payload type differs"),
        });
        Self::from_erased(inner)
    }

    fn from_erased(inner: Listener<ErasedArgs>) -> Self {
        Self {
            inner,
            _event: PhantomData,
        }
    }

    /// Invoke the handler directly.
    pub fn call(&self, args: &E::Args) {
        self.inner.call(args);
    }
}

impl<E: Event> Clone for TypedListener<E> {
    fn clone(&self) -> Self {
        Self::from_erased(self.inner.clone())
    }
}

impl<E: Event> PartialEq for TypedListener<E> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl<E: Event> Eq for TypedListener<E> {}

impl<E: Event> fmt::Debug for TypedListener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedListener")
            .field(&E::NAME)
            .field(&self.inner)
            .finish()
    }
}

// ============================================================================
// TypedEmitter
// ============================================================================

/// An [`EventEmitter`] restricted to the events declared in `M`.
///
/// The untyped emitter underneath is private: every operation goes through
/// an `E: Event<Map = M>` bound or clears the whole registry.
///
/// An event declared in another map does not compile:
///
/// ```compile_fail
/// use typed_emitter::{event_map, TypedEmitter};
///
/// event_map! { struct Chat { Message = "message" => (String,) } }
/// event_map! { struct Audio { Volume = "volume" => (u8,) } }
///
/// let emitter: TypedEmitter<Chat> = TypedEmitter::new();
/// emitter.emit::<Volume>(&(3,));
/// ```
///
/// Nor does a payload that differs from the declared arguments:
///
/// ```compile_fail
/// use typed_emitter::{event_map, TypedEmitter};
///
/// event_map! { struct Chat { Message = "message" => (String,) } }
///
/// let emitter: TypedEmitter<Chat> = TypedEmitter::new();
/// emitter.emit::<Message>(&42u32);
/// ```
///
/// Nor a listener declared for a different event of the same map:
///
/// ```compile_fail
/// use typed_emitter::{event_map, TypedEmitter, TypedListener};
///
/// event_map! {
///     struct Chat {
///         Message = "message" => (String,),
///         Typing = "typing" => (),
///     }
/// }
///
/// let emitter: TypedEmitter<Chat> = TypedEmitter::new();
/// let on_typing: TypedListener<Typing> = TypedListener::new(|_: &()| {});
/// emitter.on::<Message>(on_typing);
/// ```
///
/// The same calls with matching types compile:
///
/// ```
/// use typed_emitter::{event_map, TypedEmitter, TypedListener};
///
/// event_map! {
///     struct Chat {
///         Message = "message" => (String,),
///         Typing = "typing" => (),
///     }
/// }
///
/// let emitter: TypedEmitter<Chat> = TypedEmitter::new();
/// let on_typing: TypedListener<Typing> = TypedListener::new(|_: &()| {});
/// emitter.on::<Typing>(on_typing);
/// assert!(emitter.emit::<Typing>(&()));
/// assert!(!emitter.emit::<Message>(&("hi".to_string(),)));
/// ```
pub struct TypedEmitter<M: EventMap> {
    inner: EventEmitter<ErasedArgs>,
    _map: PhantomData<fn() -> M>,
}

impl<M: EventMap> TypedEmitter<M> {
    pub fn new() -> Self {
        Self::with_options(EmitterOptions::default())
    }

    pub fn with_options(options: EmitterOptions) -> Self {
        Self {
            inner: EventEmitter::with_options(options),
            _map: PhantomData,
        }
    }

    pub fn on<E: Event<Map = M>>(&self, listener: TypedListener<E>) -> &Self {
        self.inner.on(E::key(), listener.inner);
        self
    }

    pub fn add_listener<E: Event<Map = M>>(&self, listener: TypedListener<E>) -> &Self {
        self.on(listener)
    }

    pub fn once<E: Event<Map = M>>(&self, listener: TypedListener<E>) -> &Self {
        self.inner.once(E::key(), listener.inner);
        self
    }

    /// See [`EventEmitter::emit`].
    pub fn emit<E: Event<Map = M>>(&self, args: &E::Args) -> bool {
        self.inner.emit(E::key(), args)
    }

    pub fn off<E: Event<Map = M>>(&self, listener: &TypedListener<E>) -> &Self {
        self.inner.off(E::key(), &listener.inner);
        self
    }

    pub fn remove_listener<E: Event<Map = M>>(&self, listener: &TypedListener<E>) -> &Self {
        self.off(listener)
    }

    /// Drop every listener of every event.
    pub fn remove_all_listeners(&self) -> &Self {
        self.inner.remove_all_listeners(None);
        self
    }

    /// Drop every listener of `E`.
    pub fn remove_all_listeners_of<E: Event<Map = M>>(&self) -> &Self {
        self.inner.remove_all_listeners(Some(E::key()));
        self
    }

    pub fn listeners<E: Event<Map = M>>(&self) -> Vec<TypedListener<E>> {
        self.inner
            .listeners(E::key())
            .into_iter()
            .map(TypedListener::from_erased)
            .collect()
    }

    pub fn raw_listeners<E: Event<Map = M>>(&self) -> Vec<TypedListener<E>> {
        self.listeners::<E>()
    }

    pub fn listener_count<E: Event<Map = M>>(&self) -> usize {
        self.inner.listener_count(E::key())
    }

    pub fn event_names(&self) -> Vec<EventKey> {
        self.inner.event_names()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn set_max_listeners(&self, max: usize) -> &Self {
        self.inner.set_max_listeners(max);
        self
    }

    pub fn max_listeners(&self) -> usize {
        self.inner.max_listeners()
    }
}

impl<M: EventMap> Default for TypedEmitter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: EventMap> fmt::Debug for TypedEmitter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedEmitter").field(&self.inner).finish()
    }
}
