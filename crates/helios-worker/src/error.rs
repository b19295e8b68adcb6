use helios_ephemeris::EphemerisError;

/// Worker-side failures. Each one surfaces to the caller as an `ERROR`
/// response, never as a dead worker.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),

    /// A computed quantity came out NaN or infinite.
    #[error("non-finite {0}")]
    NonFinite(&'static str),

    /// The request handler panicked.
    #[error("request handler panicked: {0}")]
    Panicked(String),

    /// The request queue is at capacity.
    #[error("request queue is full ({0} pending)")]
    QueueFull(usize),

    #[error("scheduler has been shut down")]
    ShutDown,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
