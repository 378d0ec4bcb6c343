//! A fake portfolio terminal: a handful of literal commands, persisted
//! history, and DnD avatar generation through an image provider.

pub mod app;
pub mod avatar;
pub mod avatar_store;
pub mod config;
pub mod display;
pub mod error;
pub mod history;
pub mod image_generator;
pub mod interpreter;
pub mod logging;
pub mod scrollback;
pub mod session;
pub mod storage;
pub mod terminal;
pub mod toast;

#[cfg(test)]
mod test_support;
