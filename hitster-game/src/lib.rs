//! # hitster-game
//!
//! Game session state for the guessing game: which playlist tracks are
//! left, which one comes next (with its reconciled release year), and
//! how progress is saved between visits.
//!
//! The streaming platform, the year reconciler and snapshot storage are
//! all injected, so the engine runs the same against the real services
//! and against in-memory fakes.

pub mod catalog;
pub mod dates;
pub mod devices;
pub mod draw;
pub mod error;
pub mod session;
pub mod snapshot;
pub mod storage;

pub use catalog::{CatalogClient, Device, Playback, PlaybackState, Playlist, PlaylistItem, TracksPage};
pub use dates::DatesResolver;
pub use devices::DeviceSelection;
pub use draw::{Draw, DrawEngine, PAGE_SIZE};
pub use error::{CatalogError, CatalogErrorKind, GameError, Result};
pub use session::{DrawPhase, Session};
pub use snapshot::GameSnapshot;
pub use storage::{JsonFileStore, MemoryStore, SnapshotStore};
