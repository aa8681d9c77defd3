//! Mask painter session layer
//!
//! Wraps the painting core into a single [`PaintSession`] a host drives with
//! pointer, keyboard and frame events:
//! - [`input`] - Pointer gesture state machine and keyboard shortcuts
//! - [`scene`] - Displayed model, asset load gating, entry animation, navigation
//! - [`progress`] - Mask unlocks and the design gallery
//! - [`storage`] - Key/value persistence for progress
//! - [`export`] - Square PNG data URLs of the rendered view
//! - [`session`] - The session context object

pub mod error;
pub mod export;
pub mod input;
pub mod progress;
pub mod scene;
pub mod session;
pub mod storage;

pub use error::{AssetLoadError, SessionError};
pub use export::{ExportError, ViewportFrame};
pub use input::{InputAction, KeyInput, Modifiers, MouseButton, PointerEvent, PointerFsm, PointerState, Shortcut, TouchPhase, ToolMode};
pub use progress::{GalleryItem, UserProgress};
pub use scene::{ModelSlot, SceneController};
pub use session::PaintSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
