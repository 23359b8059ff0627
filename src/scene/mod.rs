//! Scene document and element model.
//!
//! A [`SceneDocument`] is a plain value: cloning it yields a fully independent template, which the
//! binding engine relies on.

/// Paint values (`#rrggbb`, `none`, ...).
pub mod color;
/// The scene document arena and z-order.
pub mod document;
/// Element variants and their shared placement contract.
pub mod element;
/// Typed property updates.
pub mod update;
