pub mod pacing;
pub mod scheduler;
pub mod state;
