//! Interactive edit operations: an explicit selection state machine over a scene document.

/// Ready-made placeholder fields.
pub mod presets;
/// The editing session.
pub mod session;
