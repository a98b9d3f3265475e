//! Question answering with shared, bounded context.
//!
//! A question moves through the session pipeline:
//!
//! 1. **Parse** an optional `[tag]` prefix ([`tag`])
//! 2. **Assemble** a prompt from tagged history within the word budget ([`context`])
//! 3. **Complete** it with the configured provider
//! 4. **Log** the exchange so later questions with the same tag can use it ([`session`])

pub mod context;
pub mod session;
pub mod tag;

pub use context::{
    AssemblyInput, AssemblyReport, CharHeuristic, ContextAssembler, LengthMeasure, TokenCounter,
    WordCount, extract_ranked_phrases,
};
pub use session::{ChatSession, Exchange, SessionSettings};
pub use tag::parse_tagged_input;
