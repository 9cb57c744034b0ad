//! Synchronous event emitter keyed by string names or unique symbols.
//!
//! # Overview
//!
//! [`EventEmitter`] keeps, per [`EventKey`], an ordered list of listeners and
//! calls them in registration order on [`emit`](EventEmitter::emit). The
//! untyped emitter passes each listener a slice of `serde_json::Value`
//! arguments; [`TypedEmitter`] layers compile-time checked event names and
//! argument types on top of it.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use serde_json::{json, Value};
//! use typed_emitter::{EventEmitter, Listener};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let log_clone = Arc::clone(&log);
//! let greet = Listener::new(move |args: &[Value]| {
//!     log_clone.lock().unwrap().push(args[0].clone());
//! });
//!
//! let emitter: EventEmitter = EventEmitter::new();
//! emitter.on("login", greet.clone());
//! assert!(emitter.emit("login", &[json!("alice")]));
//!
//! emitter.off("login", &greet);
//! assert!(!emitter.emit("login", &[json!("bob")]));
//! assert_eq!(*log.lock().unwrap(), vec![json!("alice")]);
//! ```
//!
//! # Modules
//!
//! - [`key`] — [`EventKey`] and [`Symbol`].
//! - [`listener`] — [`Listener<A>`] handles.
//! - [`emitter`] — [`EventEmitter<A>`].
//! - [`typed`] — [`TypedEmitter<M>`], [`TypedListener<E>`] and [`event_map!`].
//! - [`config`] — [`EmitterOptions`].
//! - [`error`] — [`EmitterError`].

pub mod config;
pub mod emitter;
pub mod error;
pub mod key;
pub mod listener;
pub mod typed;

pub use config::{EmitterOptions, DEFAULT_MAX_LISTENERS};
pub use emitter::{Args, EventEmitter};
pub use error::{EmitterError, Result};
pub use key::{EventKey, Symbol};
pub use listener::Listener;
pub use typed::{Event, EventMap, TypedEmitter, TypedListener};
