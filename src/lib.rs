//! Kroppit: crop a photo to a rectangle or circle, then download it or share
//! it to Farcaster.
//!
//! The selection lives in display space, the scaled-down canvas the pointer
//! reports in; [`transform`] maps it back to source pixels for [`extract`].

pub mod app;
pub mod config;
pub mod extract;
pub mod gesture;
pub mod guard;
pub mod region;
pub mod render;
pub mod session;
pub mod share;
pub mod source;
pub mod transform;

pub use app::KroppitApp;
pub use config::{Cli, EditorConfig};
