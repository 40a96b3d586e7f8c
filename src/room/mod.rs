// Public API
pub use directory::{JoinOutcome, RoomDirectory};

// Internal modules
pub mod directory;
