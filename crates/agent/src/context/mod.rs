//! Bounded context assembly.
//!
//! Builds the prompt for a tagged question from the conversation log,
//! keeping it within a word budget.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`assembler`] | Chooses history, clips additional context, shapes the prompt |
//! | [`keywords`] | Chunks history into noun phrases and ranks them |
//! | [`token`] | Word and token measures |
//! | [`stopwords`] | Closed-class word lists for the chunker |

pub mod assembler;
pub mod keywords;
pub mod stopwords;
pub mod token;

pub use assembler::{AssemblyInput, AssemblyReport, ContextAssembler};
pub use keywords::extract_ranked_phrases;
pub use token::{CharHeuristic, LengthMeasure, TokenCounter, WordCount};
