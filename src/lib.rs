#![doc = include_str!("../README.md")]

pub mod attribution;
pub mod directory;
pub mod error;
pub mod gate;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod navigation;
pub mod page;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use attribution::{AttributionRecord, AttributionTracker, Classifier, Landing, TrafficType};
pub use directory::{UserDirectory, UserProfile};
pub use error::Error;
pub use gate::SessionGate;
pub use navigation::{DeferredNavigator, Navigator};
pub use page::{MountState, PageMount, PageView};
pub use storage::{KeyValueStore, MemoryStore};
pub use types::{GateMode, SessionResult, UserId};
