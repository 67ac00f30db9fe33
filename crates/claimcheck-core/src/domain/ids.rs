//! Task identifiers.
//!
//! Two kinds of identifier follow a task around:
//! - the **local id**, generated on this side before anything is sent
//!   (ULID, sortable by creation time, so listing order is stable);
//! - the **backend id**, assigned by the verification service on upload.
//!
//! Local ids use the phantom-typed `Id<T>` so they cannot be mixed up with
//! other ULID-based ids, and print with a `local-` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// Marker trait for each id flavour. Provides the display prefix.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic ULID-backed id. `T` only exists at compile time.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    /// Does the display form of this id start with `prefix`?
    ///
    /// Accepts the prefix with or without the marker prefix, case-insensitive,
    /// so `local-01J8`, `01j8` and the full id all match.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim();
        let bare = prefix.strip_prefix(T::prefix()).unwrap_or(prefix);
        if bare.is_empty() {
            return false;
        }
        self.ulid
            .to_string()
            .to_ascii_uppercase()
            .starts_with(&bare.to_ascii_uppercase())
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(bare).map(Self::from_ulid)
    }
}

/// Marker for tasks created on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Local {}

impl IdMarker for Local {
    fn prefix() -> &'static str {
        "local-"
    }
}

/// Identifier of a task record in the local store.
pub type LocalTaskId = Id<Local>;

/// Identifier assigned by the verification service (opaque string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendTaskId(String);

impl BackendTaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
