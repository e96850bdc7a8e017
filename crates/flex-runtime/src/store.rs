//! Configuration store.
//!
//! Holds the active component list of every [`Slot`] and persists each one as
//! `<dir>/<slot>-config.json`. Renderers read a slot through
//! [`ConfigurationStore::snapshot`], a cheap `Arc` clone taken under a
//! momentary read lock. Reload and reset prepare the replacement list first
//! (file I/O, parsing, handler validation) and only then swap it in, so a
//! renderer sees either the old list or the new one and a failed attempt
//! changes nothing.

use std::collections::BTreeSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use flex_core::builtin::{MESSAGE, NAME, NAME_COLORED};
use flex_core::{Component, DEFAULT_PLACEHOLDER, HandlerSource, decode_components, encode_components};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Slots
// =============================================================================

/// A named configuration slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Player display name, applied on connect.
    Name,
    /// Chat line.
    Chat,
    /// Connect announcement.
    Join,
    /// Disconnect announcement.
    Left,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Name, Slot::Chat, Slot::Join, Slot::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Chat => "chat",
            Self::Join => "join",
            Self::Left => "left",
        }
    }

    /// File name of this slot inside the storage directory.
    pub fn file_name(self) -> String {
        format!("{}-config.json", self.as_str())
    }

    /// Built-in components of this slot, written with `placeholder`.
    pub fn defaults(self, placeholder: &str) -> Vec<Component> {
        let templates: &[(&str, &str)] = match self {
            Self::Name => &[(NAME_COLORED, "%VALUE%")],
            Self::Chat => &[
                (NAME_COLORED, "[coral][[%VALUE%[coral]]:[white] "),
                (MESSAGE, "%VALUE%"),
            ],
            Self::Join => &[(NAME, "[accent]%VALUE%[accent] has connected.")],
            Self::Left => &[(NAME, "[accent]%VALUE%[accent] has disconnected.")],
        };
        templates
            .iter()
            .map(|(handler, template)| {
                Component::new(*handler, template.replace(DEFAULT_PLACEHOLDER, placeholder))
            })
            .collect()
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator input that names neither a slot nor `all`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown slot '{0}', expected one of: name, chat, join, left, all")]
pub struct ParseSlotError(String);

impl FromStr for Slot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSlotError(s.to_string()))
    }
}

/// The slots an operator command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTarget {
    All,
    One(Slot),
}

impl SlotTarget {
    pub fn slots(self) -> Vec<Slot> {
        match self {
            Self::All => Slot::ALL.to_vec(),
            Self::One(slot) => vec![slot],
        }
    }
}

impl FromStr for SlotTarget {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

impl fmt::Display for SlotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::One(slot) => slot.fmt(f),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handler ids used by `components` that `source` cannot resolve, sorted and
/// de-duplicated.
pub fn unresolved_handlers<S>(components: &[Component], source: &S) -> Vec<String>
where
    S: HandlerSource + ?Sized,
{
    components
        .iter()
        .map(Component::handler)
        .filter(|handler| !source.contains(handler))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Active component lists of every slot, backed by one JSON file per slot.
pub struct ConfigurationStore {
    dir: PathBuf,
    placeholder: String,
    slots: [RwLock<Arc<[Component]>>; 4],
    /// Serializes reloads and resets. Never taken by renderers.
    update_lock: Mutex<()>,
}

impl ConfigurationStore {
    /// Creates a store holding the built-in defaults. Nothing is read yet.
    pub fn new(dir: impl Into<PathBuf>, placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        let slots = Slot::ALL.map(|slot| RwLock::new(Arc::from(slot.defaults(&placeholder))));
        Self {
            dir: dir.into(),
            placeholder,
            slots,
            update_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Location of `slot`'s persisted configuration.
    pub fn path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    /// The active components of `slot`.
    pub fn snapshot(&self, slot: Slot) -> Arc<[Component]> {
        Arc::clone(&self.slots[slot.index()].read())
    }

    fn swap(&self, slot: Slot, components: Vec<Component>) {
        *self.slots[slot.index()].write() = Arc::from(components);
    }

    /// First-run load of `slot`.
    ///
    /// A missing file is created from the built-in defaults. An existing file
    /// is loaded like [`reload`](Self::reload).
    pub async fn initialize<S>(&self, slot: Slot, source: &S) -> StoreResult<usize>
    where
        S: HandlerSource + ?Sized,
    {
        let _guard = self.update_lock.lock().await;
        let path = self.path(slot);

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        if exists {
            return self.reload_locked(slot, source).await;
        }

        let defaults = slot.defaults(&self.placeholder);
        let count = defaults.len();
        self.write(slot, &defaults).await?;
        self.swap(slot, defaults);
        info!(slot = %slot, path = %path.display(), "Created default configuration");
        Ok(count)
    }

    /// Re-reads `slot` from disk and swaps it in if every handler resolves.
    ///
    /// Returns the number of components now active.
    pub async fn reload<S>(&self, slot: Slot, source: &S) -> StoreResult<usize>
    where
        S: HandlerSource + ?Sized,
    {
        let _guard = self.update_lock.lock().await;
        self.reload_locked(slot, source).await
    }

    async fn reload_locked<S>(&self, slot: Slot, source: &S) -> StoreResult<usize>
    where
        S: HandlerSource + ?Sized,
    {
        let path = self.path(slot);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing { path });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let candidate = decode_components(&text, &self.placeholder)
            .map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;

        let ids = unresolved_handlers(&candidate, source);
        if !ids.is_empty() {
            return Err(StoreError::Unresolved { slot, ids });
        }

        let count = candidate.len();
        self.swap(slot, candidate);
        info!(slot = %slot, components = count, "Loaded configuration");
        Ok(count)
    }

    /// Restores the built-in defaults of `slot`, on disk and in memory.
    ///
    /// The active list is only replaced once the file is written.
    pub async fn reset(&self, slot: Slot) -> StoreResult<()> {
        let _guard = self.update_lock.lock().await;
        let defaults = slot.defaults(&self.placeholder);
        self.write(slot, &defaults).await?;
        self.swap(slot, defaults);
        info!(slot = %slot, "Reset configuration to defaults");
        Ok(())
    }

    async fn write(&self, slot: Slot, components: &[Component]) -> StoreResult<()> {
        let json =
            encode_components(components).map_err(|source| StoreError::Encode { slot, source })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path(slot);
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(slot = %slot, path = %path.display(), "Wrote configuration file");
        Ok(())
    }
}

impl fmt::Debug for ConfigurationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationStore")
            .field("dir", &self.dir)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}
