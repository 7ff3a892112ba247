//! The lazily resolved field cell used by every metadata-backed entity.
//!
//! A [`UserValue`] starts out unresolved. The first read runs the resolver handed to
//! [`UserValue::get_or_resolve`] and caches its result, whatever it is (including `None`);
//! every later read returns the cached value. Writing with [`UserValue::set`] stores a value
//! directly and the resolver never runs afterwards, even if the cell was never read.
//!
//! The cell is safe to share between threads: first resolution happens under a write lock that
//! re-checks the state, so concurrent first readers still run the resolver only once.

use std::{fmt, sync::RwLock};

enum CellState<T> {
    Unresolved,
    Resolved(T),
}

/// A field that is resolved on first access or set explicitly.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::lazy::UserValue;
///
/// let cell: UserValue<u32> = UserValue::new();
/// assert_eq!(cell.get_or_resolve(|| 7), 7);
/// // The resolver does not run again
/// assert_eq!(cell.get_or_resolve(|| unreachable!()), 7);
///
/// cell.set(9);
/// assert_eq!(cell.get_or_resolve(|| unreachable!()), 9);
/// ```
pub struct UserValue<T> {
    state: RwLock<CellState<T>>,
}

impl<T: Clone> UserValue<T> {
    /// An unresolved cell
    #[must_use]
    pub fn new() -> Self {
        UserValue {
            state: RwLock::new(CellState::Unresolved),
        }
    }

    /// A cell that already holds `value`
    #[must_use]
    pub fn resolved(value: T) -> Self {
        UserValue {
            state: RwLock::new(CellState::Resolved(value)),
        }
    }

    /// The cached value, resolving it with `resolver` on first access
    pub fn get_or_resolve<F>(&self, resolver: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let CellState::Resolved(value) = &*read_lock!(self.state) {
            return value.clone();
        }

        let mut state = write_lock!(self.state);
        match &*state {
            CellState::Resolved(value) => value.clone(),
            CellState::Unresolved => {
                let value = resolver();
                *state = CellState::Resolved(value.clone());
                value
            }
        }
    }

    /// Like [`UserValue::get_or_resolve`], but a resolver returning `None` leaves the cell
    /// unresolved so that a later read tries again
    pub fn get_or_try_resolve<F>(&self, resolver: F) -> Option<T>
    where
        F: FnOnce() -> Option<T>,
    {
        if let CellState::Resolved(value) = &*read_lock!(self.state) {
            return Some(value.clone());
        }

        let mut state = write_lock!(self.state);
        match &*state {
            CellState::Resolved(value) => Some(value.clone()),
            CellState::Unresolved => {
                let value = resolver()?;
                *state = CellState::Resolved(value.clone());
                Some(value)
            }
        }
    }

    /// Store `value`, replacing whatever the cell held; the resolver will never run
    pub fn set(&self, value: T) {
        *write_lock!(self.state) = CellState::Resolved(value);
    }

    /// `true` once the cell was read or set
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(&*read_lock!(self.state), CellState::Resolved(_))
    }

    /// The cached value without resolving
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        match &*read_lock!(self.state) {
            CellState::Resolved(value) => Some(value.clone()),
            CellState::Unresolved => None,
        }
    }
}

impl<T: Clone> Default for UserValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for UserValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(value) => f.debug_tuple("Resolved").field(&value).finish(),
            None => f.write_str("Unresolved"),
        }
    }
}
