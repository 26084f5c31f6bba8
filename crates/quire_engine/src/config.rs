//! Engine configuration.

/// Default ceiling on nested room expansion.
pub const DEFAULT_RECURSION_LIMIT: u32 = 1000;

/// Stack reserved for a traversal thread before any room is entered.
pub const BASE_STACK_BYTES: usize = 8 * 1024 * 1024;

/// Stack reserved per nested room handler. Covers the room body, a chain of
/// nested blocks and the option that leads to the next room.
pub const STACK_BYTES_PER_ROOM: usize = 256 * 1024;

/// Settings for one traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of room handlers that may be active at once before the
    /// run is aborted as an unbounded expansion.
    pub recursion_limit: u32,
    /// Base seed for every room's random stream.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recursion ceiling.
    #[must_use]
    pub const fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Sets the base seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stack size for the thread that runs a traversal, large enough for
    /// `recursion_limit` nested room handlers.
    #[must_use]
    pub const fn stack_bytes(&self) -> usize {
        let rooms = (self.recursion_limit as usize).saturating_mul(STACK_BYTES_PER_ROOM);
        BASE_STACK_BYTES.saturating_add(rooms)
    }

    /// The seed for the room at `index` in the program's room arena.
    #[must_use]
    pub const fn room_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64 + 1)
    }
}
