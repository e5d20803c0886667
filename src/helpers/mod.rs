//! Installer building blocks
//!
//! - **acquire**: download, verify and unpack package artifacts
//! - **discover**: locate an installer binary inside an extracted archive
//! - **script**: render and run phase scripts under the platform shell
//! - **template**: `{placeholder}` substitution for script bodies
//! - **progress**: spinner and byte-counter styling

pub mod acquire;
pub mod discover;
pub mod progress;
pub mod script;
pub mod template;
