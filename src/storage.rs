//! Persistence (C10): loads and saves the two configuration blobs from the
//! non-volatile key/value store (spec §4.10, §6, §7).
//!
//! The store itself is an external collaborator behind [`crate::hw::BlobStore`];
//! this module only owns the namespace/key convention, the postcard
//! encode/decode, and the defaults-on-miss policy. It mirrors the teacher's
//! `StorageService`/`StorageClient` split (read/write against an opaque
//! backing store, failures logged and surfaced rather than panicking)
//! without the TicKV-specific key/metadata bookkeeping, since `BlobStore` is
//! already the abstraction boundary here instead of a raw flash peripheral.

use defmt::{info, warn, Debug2Format};
use postcard::experimental::max_size::MaxSize;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{StaticConfig, VolatileConfig};
use crate::hw::{BlobStore, BlobStoreError};

/// Namespace/key convention from spec §6.
pub const NAMESPACE: &str = "led_config";
pub const KEY_VOLATILE: &str = "volatile";
pub const KEY_STATIC: &str = "static";

/// A third, optional blob written by the OTA collaborator (spec §6): the
/// core's only interaction with it is clearing the "start OTA" flag.
pub const KEY_OTA: &str = "ota";

/// Errors surfaced by [`save`] to its caller (spec §7: "Surface error to
/// caller; state in memory remains authoritative").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError<E> {
    Driver(E),
    SerializationError,
}

/// Outcome of a boot-time load: whether the stored blob was usable or the
/// caller received compiled-in defaults (spec §4.10, §7: "first-run" /
/// "defaults loaded").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    DefaultsInstalled,
}

/// Read and deserialize one blob into `buf`, falling back to `default` and
/// reporting [`LoadOutcome::DefaultsInstalled`] if the key is missing, its
/// stored size doesn't match the current layout, or it fails to deserialize
/// (spec §4.10: "If either is missing or its stored size does not match the
/// current layout, populate the corresponding struct with defaults... and
/// treat the boot as first-run").
async fn load_or_default<T, S>(
    store: &mut S,
    key: &str,
    default: T,
    buf: &mut [u8],
) -> (T, LoadOutcome)
where
    T: DeserializeOwned,
    S: BlobStore,
{
    match store.read(key, buf).await {
        Ok(len) => match postcard::from_bytes::<T>(&buf[..len]) {
            Ok(value) => {
                info!("[STORAGE] loaded '{}'", key);
                (value, LoadOutcome::Loaded)
            }
            Err(error) => {
                warn!(
                    "[STORAGE] '{}' failed to deserialize ({}); installing defaults",
                    key,
                    Debug2Format(&error)
                );
                (default, LoadOutcome::DefaultsInstalled)
            }
        },
        Err(BlobStoreError::Missing) => {
            info!(
                "[STORAGE] '{}' missing (first boot); installing defaults",
                key
            );
            (default, LoadOutcome::DefaultsInstalled)
        }
        Err(BlobStoreError::SizeMismatch { expected, actual }) => {
            warn!(
                "[STORAGE] '{}' size mismatch (expected {}, got {}); installing defaults",
                key, expected, actual
            );
            (default, LoadOutcome::DefaultsInstalled)
        }
        Err(BlobStoreError::Driver(error)) => {
            warn!(
                "[STORAGE] '{}' read failed ({}); installing defaults",
                key,
                Debug2Format(&error)
            );
            (default, LoadOutcome::DefaultsInstalled)
        }
    }
}

/// Serialize and write one blob through `buf`, atomically committing the
/// full blob on success (spec §4.10: "write the full blob atomically").
async fn save<T, S>(
    store: &mut S,
    key: &str,
    value: &T,
    buf: &mut [u8],
) -> Result<(), StorageError<S::DriverError>>
where
    T: Serialize,
    S: BlobStore,
{
    let serialized = postcard::to_slice(value, buf).map_err(|error| {
        warn!(
            "[STORAGE] '{}' failed to serialize: {}",
            key,
            Debug2Format(&error)
        );
        StorageError::SerializationError
    })?;

    store.write(key, serialized).await.map_err(|error| {
        warn!(
            "[STORAGE] '{}' write failed: {}",
            key,
            Debug2Format(&error)
        );
        match error {
            BlobStoreError::Driver(e) => StorageError::Driver(e),
            BlobStoreError::Missing | BlobStoreError::SizeMismatch { .. } => {
                unreachable!("write() never returns these variants")
            }
        }
    })
}

/// Load [`VolatileConfig`] at boot (spec §4.10, "Load").
pub async fn load_volatile<S: BlobStore>(store: &mut S) -> (VolatileConfig, LoadOutcome)
where
    [(); VolatileConfig::POSTCARD_MAX_SIZE]:,
{
    let mut buf = [0u8; VolatileConfig::POSTCARD_MAX_SIZE];
    load_or_default(store, KEY_VOLATILE, VolatileConfig::default(), &mut buf).await
}

/// Save [`VolatileConfig`], issued by the FSM periodically and on
/// mode-returning transitions (spec §4.10).
pub async fn save_volatile<S: BlobStore>(
    store: &mut S,
    cfg: &VolatileConfig,
) -> Result<(), StorageError<S::DriverError>>
where
    [(); VolatileConfig::POSTCARD_MAX_SIZE]:,
{
    let mut buf = [0u8; VolatileConfig::POSTCARD_MAX_SIZE];
    save(store, KEY_VOLATILE, cfg, &mut buf).await
}

/// Load a [`StaticConfig`] at boot, given the compiled-in per-effect
/// defaults to fall back to (spec §4.10, "Load"). `BUF` must be at least
/// `StaticConfig::<EFFECTS, PARAMS>::max_encoded_size()`; callers generally
/// want that exact value.
pub async fn load_static<const EFFECTS: usize, const PARAMS: usize, const BUF: usize, S: BlobStore>(
    store: &mut S,
    default: StaticConfig<EFFECTS, PARAMS>,
) -> (StaticConfig<EFFECTS, PARAMS>, LoadOutcome) {
    let mut buf = [0u8; BUF];
    load_or_default(store, KEY_STATIC, default, &mut buf).await
}

/// Save a [`StaticConfig`], issued on explicit user save of
/// `EffectSetup`/`SystemSetup` (spec §4.10).
pub async fn save_static<const EFFECTS: usize, const PARAMS: usize, const BUF: usize, S: BlobStore>(
    store: &mut S,
    cfg: &StaticConfig<EFFECTS, PARAMS>,
) -> Result<(), StorageError<S::DriverError>> {
    let mut buf = [0u8; BUF];
    save(store, KEY_STATIC, cfg, &mut buf).await
}

/// Clear the OTA collaborator's "start OTA" flag once the boot sequence has
/// acted on it (spec §6: "The core's only interaction is to clear the flag
/// on OTA start"). The core never reads this blob's contents otherwise.
pub async fn clear_ota_flag<S: BlobStore>(store: &mut S) -> Result<(), StorageError<S::DriverError>> {
    let mut buf = [0u8; bool::POSTCARD_MAX_SIZE];
    save(store, KEY_OTA, &false, &mut buf).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        blobs: HashMap<&'static str, heapless::Vec<u8, 128>>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Never;

    impl BlobStore for MemoryStore {
        type DriverError = Never;

        async fn read(
            &mut self,
            key: &str,
            buf: &mut [u8],
        ) -> Result<usize, BlobStoreError<Self::DriverError>> {
            let data = self.blobs.get(key).ok_or(BlobStoreError::Missing)?;
            if data.len() > buf.len() {
                return Err(BlobStoreError::SizeMismatch {
                    expected: buf.len(),
                    actual: data.len(),
                });
            }
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        async fn write(
            &mut self,
            key: &str,
            data: &[u8],
        ) -> Result<(), BlobStoreError<Self::DriverError>> {
            let mut v = heapless::Vec::new();
            v.extend_from_slice(data).unwrap();
            let key = match key {
                KEY_VOLATILE => KEY_VOLATILE,
                KEY_STATIC => KEY_STATIC,
                KEY_OTA => KEY_OTA,
                _ => unreachable!(),
            };
            self.blobs.insert(key, v);
            Ok(())
        }
    }

    fn block<F: core::future::Future>(f: F) -> F::Output {
        embassy_futures::block_on(f)
    }

    #[test]
    fn missing_volatile_blob_falls_back_to_defaults() {
        let mut store = MemoryStore::default();
        let (cfg, outcome) = block(load_volatile(&mut store));
        assert_eq!(cfg, VolatileConfig::default());
        assert_eq!(outcome, LoadOutcome::DefaultsInstalled);
    }

    #[test]
    fn volatile_save_then_load_round_trips() {
        let mut store = MemoryStore::default();
        let cfg = VolatileConfig {
            is_on: true,
            master_brightness: 200,
            effect_index: 2,
        };
        block(save_volatile(&mut store, &cfg)).unwrap();
        let (loaded, outcome) = block(load_volatile(&mut store));
        assert_eq!(loaded, cfg);
        assert_eq!(outcome, LoadOutcome::Loaded);
    }

    const STATIC_BUF: usize = StaticConfig::<2, 2>::max_encoded_size();

    #[test]
    fn static_config_round_trips_with_effect_params() {
        let mut store = MemoryStore::default();
        let default = StaticConfig::<2, 2>::default_with([[0, 0], [0, 0]]);
        let mut cfg = default;
        cfg.min_brightness = 42;
        cfg.effect_params[1][0] = 77;
        block(save_static::<2, 2, STATIC_BUF, _>(&mut store, &cfg)).unwrap();
        let (loaded, outcome) =
            block(load_static::<2, 2, STATIC_BUF, _>(&mut store, default));
        assert_eq!(loaded, cfg);
        assert_eq!(outcome, LoadOutcome::Loaded);
    }

    #[test]
    fn static_blob_missing_falls_back_to_defaults() {
        let mut store = MemoryStore::default();
        let default = StaticConfig::<2, 2>::default_with([[5, 5], [5, 5]]);
        let (loaded, outcome) =
            block(load_static::<2, 2, STATIC_BUF, _>(&mut store, default));
        assert_eq!(loaded, default);
        assert_eq!(outcome, LoadOutcome::DefaultsInstalled);
    }

    #[test]
    fn clear_ota_flag_writes_false() {
        let mut store = MemoryStore::default();
        block(clear_ota_flag(&mut store)).unwrap();
        assert!(store.blobs.contains_key(KEY_OTA));
    }
}
