//! Canvas Hub Core Library
//!
//! Platform-agnostic entity model, camera, drag engine and persistence for the
//! Canvas Hub spatial board.

pub mod camera;
pub mod config;
pub mod debounce;
pub mod drag;
pub mod envelope;
pub mod input;
pub mod launcher;
pub mod legacy;
pub mod literal;
pub mod persistence;
pub mod storage;
pub mod store;

pub use camera::{Camera, PanGesture};
pub use config::Config;
pub use debounce::Debouncer;
pub use drag::{DragEngine, DragOutcome, DragPayload, DragUpdate, Ghost, HitTest};
pub use envelope::{Envelope, EnvelopeId, PALETTE, Tag, TagId, TeamMember};
pub use input::{Modifiers, MouseButton, PointerEvent, PointerTarget};
pub use launcher::{LaunchError, LinkLauncher, LinkOpener};
pub use legacy::{ImportError, ImportReport, import_legacy};
pub use persistence::{ArtifactError, Persistence, export_artifact, load_artifact};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use store::{Board, BoardError};

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};
