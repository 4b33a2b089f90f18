//! Core processing modules
//!
//! The completion client and the prompt actions built on captured selections.

pub mod actions;
pub mod completion;

pub use actions::Action;
pub use completion::CompletionClient;
