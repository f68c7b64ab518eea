//! Lock helpers for consistent poisoning behaviour
//!
//! Two flavours are offered. `handle_rwlock_write` turns a poisoned lock
//! into a domain error so that mutating operations can report the failure.
//! The `*_recover` functions take the guard out of the poison error instead,
//! for read paths that are documented as infallible (directory lookups,
//! statistics) and for bookkeeping that must run even after a panic
//! elsewhere (worker accounting in `Drop`).

use std::sync::{
    LockResult, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

fn poison_message(kind: &str, detail: &dyn std::fmt::Debug) -> String {
    format!(
        "Internal synchronisation error ({kind} poisoned). A panic occurred while the lock was held. PoisonError: {detail:?}"
    )
}

/// Convert a poisoned RwLock write into an application error
///
/// # Examples
/// ```
/// use std::sync::RwLock;
/// use remcache::core::sync::handle_rwlock_write;
/// use remcache::listeners::api::RegistryError;
///
/// let lock = RwLock::new(42);
/// let mut guard = handle_rwlock_write(lock.write(), |message| {
///     RegistryError::Synchronisation { message }
/// })
/// .unwrap();
/// *guard += 1;
/// assert_eq!(*guard, 43);
/// ```
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<T>, E> {
    result.map_err(|poison_err| error_constructor(poison_message("RwLock write", &poison_err)))
}

/// Lock a mutex, recovering the guard if the mutex is poisoned
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned mutex");
        PoisonError::into_inner(poisoned)
    })
}

/// Read-lock an RwLock, recovering the guard if the lock is poisoned
pub fn read_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned RwLock (read)");
        PoisonError::into_inner(poisoned)
    })
}

/// Write-lock an RwLock, recovering the guard if the lock is poisoned
pub fn write_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned RwLock (write)");
        PoisonError::into_inner(poisoned)
    })
}
