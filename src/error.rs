/// Failures reported by the storage and navigation ports.
///
/// None of these escape the gate or the tracker: they are logged and
/// collapsed into `Unauthenticated` or a locally held attribution record.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("storage read failed: {0}")]
    StorageRead(String),
    #[error("storage write failed: {0}")]
    StorageWrite(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
}
