//! Completion providers for tagtty.
//!
//! All providers implement the `tagtty_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
