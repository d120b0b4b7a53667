//! Tag Limit Library
//!
//! Caps the number of tags an editor may assign to a content item.
//! The settings side stores the limit and the content types it applies to;
//! the guard side keeps a tag editor's controls in step with that limit.
//! The `tag-limit` binary is an admin CLI over the settings file.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod settings;
