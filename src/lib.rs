#![cfg_attr(not(test), no_std)]
#![feature(generic_const_exprs)]
#![allow(incomplete_features)]
#![doc = include_str!("../README.md")]

//! Firmware core for a networked, addressable LED lamp controller.
//!
//! This crate implements the interactive control pipeline and rendering
//! pipeline described in the project specification: input decoding, event
//! multiplexing, the interaction state machine, the effects engine, the LED
//! controller, peer mirroring between a master and its slaves, and
//! configuration persistence. Raw GPIO/capacitive/wireless peripheral access,
//! the LED wire protocol, the non-volatile blob store, and OTA firmware
//! upload are external collaborators; this crate only depends on the trait
//! boundaries in [`hw`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;

pub mod color;
pub mod command;
pub mod config;
pub mod effects;
pub mod fsm;
pub mod hw;
pub mod input;
pub mod led;
pub mod math;
pub mod mux;
pub mod peer;
pub mod storage;

/// The mutex type shared by every synchronization primitive in this crate.
///
/// `CriticalSectionRawMutex` is used rather than a thread-mode mutex so that
/// the core stays usable regardless of which executor/MCU a concrete lamp
/// board chooses; see [`hw::platform`].
pub type RawMutex = CriticalSectionRawMutex;

/// Data structure that holds a value and notifies listeners about changes to
/// it. Used to hold the hot ([`config::VolatileConfig`]) and cold
/// ([`config::StaticConfig`]) configuration slices so that the persistence
/// task can debounce writes without polling.
pub struct State<'a, T: Clone + PartialEq> {
    data: Mutex<RawMutex, T>,
    listeners: &'a [&'a Signal<RawMutex, ()>],
}

impl<'a, T: Clone + PartialEq> State<'a, T> {
    /// Create some new state, with the specified listeners.
    pub const fn new(data: T, listeners: &'a [&'a Signal<RawMutex, ()>]) -> State<'a, T> {
        Self {
            data: Mutex::new(data),
            listeners,
        }
    }

    /// Obtain the state's current value.
    pub async fn get(&self) -> T {
        self.data.lock().await.clone()
    }

    async fn set_inner(&self, value: T) -> bool {
        let mut data = self.data.lock().await;
        let changed = *data != value;
        *data = value;
        changed
    }

    /// Update state and notify listeners.
    pub async fn set(&self, value: T) {
        if self.set_inner(value).await {
            self.notify_listeners();
        }
    }

    /// Update state without notifying listeners.
    pub async fn quiet_set(&self, value: T) {
        self.set_inner(value).await;
    }

    async fn update_inner<R>(
        &self,
        updater: impl FnOnce(&mut MutexGuard<'_, RawMutex, T>) -> R,
    ) -> (bool, R) {
        let mut data = self.data.lock().await;
        let old = data.clone();
        let result = updater(&mut data);
        (old != *data, result)
    }

    /// Update state using a function, and notify listeners if it changed.
    pub async fn update<R>(
        &self,
        updater: impl FnOnce(&mut MutexGuard<'_, RawMutex, T>) -> R,
    ) -> R {
        let (changed, result) = self.update_inner(updater).await;
        if changed {
            self.notify_listeners();
        }
        result
    }

    fn notify_listeners(&self) {
        for listener in self.listeners.iter() {
            listener.signal(());
        }
    }
}

/// A single-slot "latest wins" mailbox.
///
/// Used for the renderer-to-driver pixel buffer handoff: the renderer
/// publishes by overwriting, and the driver always observes the most recent
/// frame rather than a queue of stale ones (spec §5, "overwrite-on-full").
pub struct Mailbox<T: Clone> {
    slot: Mutex<RawMutex, Option<T>>,
    ready: Signal<RawMutex, ()>,
}

impl<T: Clone> Mailbox<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Signal::new(),
        }
    }

    /// Publish a new value, overwriting whatever was previously unread.
    pub async fn publish(&self, value: T) {
        *self.slot.lock().await = Some(value);
        self.ready.signal(());
    }

    /// Wait until a value has been published, then take it.
    pub async fn receive(&self) -> T {
        loop {
            if let Some(value) = self.slot.lock().await.take() {
                return value;
            }
            self.ready.wait().await;
        }
    }

    /// Non-blocking read of the latest published value, if any.
    pub async fn try_receive(&self) -> Option<T> {
        self.slot.lock().await.take()
    }
}

impl<T: Clone> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
