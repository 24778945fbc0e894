pub mod classify;
pub mod transform;
pub mod window;
