//! Context assembly: turning a tagged question into a bounded prompt.
//!
//! Two cases, each in two shapes:
//!
//! 1. **Untagged** (empty tag): no shared history. The log is never read;
//!    only the question and a clipped slice of the additional context.
//! 2. **Tagged**: history for the tag comes from the conversation log.
//!    - *Structured* prompts walk the log newest first and stop at the
//!      first record that would overflow the budget.
//!    - *Flat* prompts concatenate all matching history, then either keep
//!      the top-ranked key phrases or truncate the verbatim transcript.
//!
//! The budget bounds history and additional context. The live question is
//! always included, even when it alone exceeds the budget.
//!
//! # Determinism
//!
//! Assembly reads the log once per call and holds no mutable state, so
//! identical inputs over an unchanged log give identical prompts.

use std::sync::Arc;

use tagtty_core::error::ContextError;
use tagtty_core::log::{LogReader, LogRecord, LogSnapshot};
use tagtty_core::message::{Prompt, Turn, TurnFormat};
use tracing::{debug, info};

use crate::context::keywords::extract_ranked_phrases;
use crate::context::token::{CharHeuristic, LengthMeasure, TokenCounter, WordCount};

// ── Types ─────────────────────────────────────────────────────────────────

/// All inputs for assembling one prompt.
#[derive(Debug, Clone)]
pub struct AssemblyInput<'a> {
    /// Topic tag. Empty means no shared history.
    pub tag: &'a str,
    /// Budget, in length-measure units (words by default).
    pub max_length: usize,
    /// Model name. Only reported in debug mode.
    pub model_name: &'a str,
    /// Reduce flat history to ranked key phrases instead of verbatim text.
    pub keywords_only: bool,
    /// Free text the caller wants in the prompt, clipped to what remains.
    pub additional_context: &'a str,
    pub turn_format: TurnFormat,
    /// The live question. Always present in the result.
    pub question: &'a str,
    /// Emit an assembly report through `tracing`.
    pub debug: bool,
}

impl<'a> AssemblyInput<'a> {
    /// Inputs with the usual defaults: keyword-only, flat, no extra context.
    pub fn new(tag: &'a str, question: &'a str, max_length: usize) -> Self {
        Self {
            tag,
            max_length,
            model_name: "",
            keywords_only: true,
            additional_context: "",
            turn_format: TurnFormat::Flat,
            question,
            debug: false,
        }
    }
}

/// Diagnostics describing an assembled prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    pub model: String,
    pub format: TurnFormat,
    pub budget: usize,
    /// Prompt length in budget units.
    pub words: usize,
    /// Estimated token count for `model`.
    pub tokens: usize,
    /// Log lines ignored because they were malformed.
    pub skipped_records: usize,
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The context assembler. Stateless apart from its collaborators; create
/// one and reuse it.
#[derive(Clone)]
pub struct ContextAssembler {
    log: Option<Arc<dyn LogReader>>,
    measure: Arc<dyn LengthMeasure>,
    tokens: Arc<dyn TokenCounter>,
}

impl ContextAssembler {
    /// Create an assembler reading history from `log`.
    pub fn new(log: Arc<dyn LogReader>) -> Self {
        Self {
            log: Some(log),
            measure: Arc::new(WordCount),
            tokens: Arc::new(CharHeuristic),
        }
    }

    /// Create an assembler with no log. Tagged requests fail with
    /// [`ContextError::MissingLog`].
    pub fn without_log() -> Self {
        Self {
            log: None,
            measure: Arc::new(WordCount),
            tokens: Arc::new(CharHeuristic),
        }
    }

    /// Replace the length measure used for budgeting.
    pub fn with_measure(mut self, measure: impl LengthMeasure + 'static) -> Self {
        self.measure = Arc::new(measure);
        self
    }

    /// Replace the token counter used for debug reports.
    pub fn with_token_counter(mut self, counter: impl TokenCounter + 'static) -> Self {
        self.tokens = Arc::new(counter);
        self
    }

    /// Assemble the prompt for one question.
    pub fn assemble(&self, input: &AssemblyInput<'_>) -> Result<Prompt, ContextError> {
        let (prompt, skipped) = if input.tag.is_empty() {
            (self.untagged(input), 0)
        } else {
            let snapshot = self.read_log(input.tag)?;
            let history: Vec<&LogRecord> = snapshot.tagged(input.tag).collect();
            debug!(tag = %input.tag, records = history.len(), "Loaded tagged history");

            let prompt = match input.turn_format {
                TurnFormat::Structured => self.structured_with_history(input, &history),
                TurnFormat::Flat => self.flat_with_history(input, &history),
            };
            (prompt, snapshot.skipped)
        };

        if input.debug {
            let report = self.report(input.model_name, input.max_length, &prompt, skipped);
            info!(
                model = %report.model,
                format = ?report.format,
                budget = report.budget,
                words = report.words,
                tokens = report.tokens,
                skipped = report.skipped_records,
                prompt = %prompt.render(),
                "Assembled context"
            );
        }

        Ok(prompt)
    }

    /// Measure an assembled prompt.
    pub fn report(
        &self,
        model_name: &str,
        budget: usize,
        prompt: &Prompt,
        skipped_records: usize,
    ) -> AssemblyReport {
        AssemblyReport {
            model: model_name.to_string(),
            format: prompt.format(),
            budget,
            words: prompt.contents().map(|c| self.measure.length_of(c)).sum(),
            tokens: prompt
                .contents()
                .map(|c| self.tokens.count_tokens(model_name, c))
                .sum(),
            skipped_records,
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn read_log(&self, tag: &str) -> Result<LogSnapshot, ContextError> {
        let log = self.log.as_ref().ok_or_else(|| ContextError::MissingLog {
            tag: tag.to_string(),
        })?;
        let snapshot = log.read_records()?;
        if snapshot.skipped > 0 {
            debug!(skipped = snapshot.skipped, "Ignored malformed log lines");
        }
        Ok(snapshot)
    }

    fn untagged(&self, input: &AssemblyInput<'_>) -> Prompt {
        let remaining = input
            .max_length
            .saturating_sub(self.measure.length_of(input.question));
        let extra = self.clip(input.additional_context, remaining);

        match input.turn_format {
            TurnFormat::Structured => {
                let mut turns = Vec::with_capacity(2);
                if let Some(extra) = extra {
                    turns.push(Turn::system(extra));
                }
                turns.push(Turn::user(input.question));
                Prompt::Turns(turns)
            }
            TurnFormat::Flat => match extra {
                Some(extra) => Prompt::Text(format!("{extra} {}", input.question)),
                None => Prompt::Text(input.question.to_string()),
            },
        }
    }

    fn structured_with_history(&self, input: &AssemblyInput<'_>, history: &[&LogRecord]) -> Prompt {
        let question_len = self.measure.length_of(input.question);
        let mut included: Vec<&LogRecord> = Vec::new();
        let mut total = 0;

        // Newest first; the first record that overflows ends the walk
        for record in history.iter().copied().rev() {
            let cost = self.measure.length_of(&record.question)
                + self.measure.length_of(&record.response);
            if total + cost + question_len > input.max_length {
                break;
            }
            total += cost;
            included.push(record);
        }
        total += question_len;

        let mut turns = Vec::with_capacity(included.len() * 2 + 2);
        if let Some(extra) = self.clip(
            input.additional_context,
            input.max_length.saturating_sub(total),
        ) {
            turns.push(Turn::system(extra));
        }
        for record in included.iter().rev() {
            turns.push(Turn::user(record.question.as_str()));
            turns.push(Turn::assistant(record.response.as_str()));
        }
        turns.push(Turn::user(input.question));

        Prompt::Turns(turns)
    }

    fn flat_with_history(&self, input: &AssemblyInput<'_>, history: &[&LogRecord]) -> Prompt {
        let transcript = history
            .iter()
            .map(|r| format!("{} {}", r.question, r.response))
            .collect::<Vec<_>>()
            .join(" ");
        let question_len = self.measure.length_of(input.question);

        let context = if input.keywords_only {
            let source = if input.additional_context.trim().is_empty() {
                transcript
            } else {
                format!("{} {}", input.additional_context, transcript)
            };
            self.key_phrases(&source, question_len, input.max_length)
        } else {
            // Strictly under the budget: history + question < max_length
            let kept = self.measure.truncate(
                &transcript,
                input.max_length.saturating_sub(question_len + 1),
            );
            let used = self.measure.length_of(&kept) + question_len;
            match self.clip(input.additional_context, input.max_length.saturating_sub(used)) {
                Some(extra) => format!("{extra} {kept}"),
                None => kept,
            }
        };

        let context = context.trim();
        if context.is_empty() {
            Prompt::Text(input.question.to_string())
        } else {
            Prompt::Text(format!("{context} {}", input.question))
        }
    }

    /// Greedily keep ranked phrases until the next one would overflow.
    fn key_phrases(&self, source: &str, question_len: usize, max_length: usize) -> String {
        let mut kept = Vec::new();
        let mut used = 0;

        for phrase in extract_ranked_phrases(source, true) {
            let len = self.measure.length_of(&phrase);
            if used + len + question_len > max_length {
                break;
            }
            used += len;
            kept.push(phrase);
        }

        kept.join(" ")
    }

    /// The first `budget` units of `text`, if there is anything to add.
    fn clip(&self, text: &str, budget: usize) -> Option<String> {
        if budget == 0 || text.trim().is_empty() {
            return None;
        }
        let clipped = self.measure.truncate(text, budget);
        (!clipped.is_empty()).then_some(clipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::token::{first_words, word_count};
    use std::io::Write as _;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tagtty_core::error::LogError;
    use tagtty_core::message::Role;
    use tagtty_memory::{FileLog, InMemoryLog};

    const MAYOR: &str = "Who is its mayor?";

    fn record(tag: &str, question: &str, response: &str) -> LogRecord {
        LogRecord {
            timestamp: "2023-03-12 10:00:00".into(),
            tag: tag.into(),
            question: question.into(),
            response: response.into(),
        }
    }

    fn canberra_records() -> Vec<LogRecord> {
        vec![
            record(
                "Tag1",
                "what is the capital of australia?",
                "The capital of Australia is Canberra.",
            ),
            record("Tag2", "what is rust?", "A systems programming language."),
            record(
                "Tag1",
                "when was it founded?",
                "Canberra was founded in 1913 as the site for Australia's capital city.",
            ),
        ]
    }

    fn canberra() -> ContextAssembler {
        ContextAssembler::new(Arc::new(InMemoryLog::with_records(canberra_records())))
    }

    fn text(prompt: Prompt) -> String {
        match prompt {
            Prompt::Text(text) => text,
            Prompt::Turns(turns) => panic!("expected flat prompt, got {turns:?}"),
        }
    }

    fn turns(prompt: Prompt) -> Vec<Turn> {
        match prompt {
            Prompt::Turns(turns) => turns,
            Prompt::Text(text) => panic!("expected turns, got {text:?}"),
        }
    }

    fn total_words(turns: &[Turn]) -> usize {
        turns.iter().map(|t| word_count(&t.content)).sum()
    }

    /// Counts reads so tests can assert the log was never touched.
    #[derive(Default)]
    struct CountingLog {
        reads: AtomicUsize,
    }

    impl LogReader for CountingLog {
        fn read_records(&self) -> Result<LogSnapshot, LogError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(LogSnapshot::default())
        }
    }

    // ── Flat, tagged ──────────────────────────────────────────────────────

    #[test]
    fn keyword_context_follows_phrase_rank() {
        let prompt = canberra()
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 50))
            .unwrap();
        assert_eq!(text(prompt), "australia canberra 's capital city Who is its mayor?");
    }

    #[test]
    fn keyword_context_stops_before_overflowing_phrase() {
        // "'s capital city" would bring the total to 9
        let prompt = canberra()
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 8))
            .unwrap();
        assert_eq!(text(prompt), "australia canberra Who is its mayor?");

        let prompt = canberra()
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 9))
            .unwrap();
        assert_eq!(text(prompt), "australia canberra 's capital city Who is its mayor?");
    }

    #[test]
    fn verbatim_context_keeps_full_history() {
        let input = AssemblyInput {
            keywords_only: false,
            ..AssemblyInput::new("Tag1", MAYOR, 50)
        };
        let prompt = canberra().assemble(&input).unwrap();
        assert_eq!(
            text(prompt),
            "what is the capital of australia? The capital of Australia is Canberra. \
             when was it founded? Canberra was founded in 1913 as the site for Australia's \
             capital city. Who is its mayor?"
        );
    }

    #[test]
    fn verbatim_truncation_stays_strictly_under_budget() {
        let log = InMemoryLog::with_records(vec![record(
            "t",
            "one two three four five",
            "six seven eight nine ten",
        )]);
        let assembler = ContextAssembler::new(Arc::new(log));
        let input = AssemblyInput {
            keywords_only: false,
            ..AssemblyInput::new("t", "a b", 10)
        };

        let prompt = text(assembler.assemble(&input).unwrap());
        assert_eq!(prompt, "one two three four five six seven a b");
        assert_eq!(word_count(&prompt), 9);

        // the one word left over goes to additional context
        let input = AssemblyInput {
            additional_context: "x y z",
            ..input
        };
        let prompt = text(assembler.assemble(&input).unwrap());
        assert_eq!(prompt, "x one two three four five six seven a b");
    }

    #[test]
    fn keyword_mode_reads_additional_context() {
        let input = AssemblyInput {
            additional_context: "Rust ownership rules.",
            ..AssemblyInput::new("unused-tag", MAYOR, 20)
        };
        let prompt = canberra().assemble(&input).unwrap();
        assert_eq!(text(prompt), "rust ownership rules Who is its mayor?");
    }

    #[test]
    fn tag_without_history_is_question_alone() {
        let prompt = canberra()
            .assemble(&AssemblyInput::new("Tag9", MAYOR, 50))
            .unwrap();
        assert_eq!(text(prompt), MAYOR);
    }

    // ── Structured, tagged ────────────────────────────────────────────────

    #[test]
    fn structured_history_is_chronological() {
        let question = "What is the population of Australia?";
        let input = AssemblyInput {
            turn_format: TurnFormat::Structured,
            ..AssemblyInput::new("Tag1", question, 50)
        };
        let turns = turns(canberra().assemble(&input).unwrap());

        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(turns[0].content, "what is the capital of australia?");
        assert_eq!(turns[3].content, canberra_records()[2].response);
        assert_eq!(turns[4].content, question);
        assert!(total_words(&turns) <= 50);
    }

    #[test]
    fn structured_drops_older_records_first() {
        let question = "What is the population of Australia?";
        let input = AssemblyInput {
            turn_format: TurnFormat::Structured,
            additional_context: "alpha beta gamma delta",
            ..AssemblyInput::new("Tag1", question, 25)
        };
        let turns = turns(canberra().assemble(&input).unwrap());

        // 16 words of recent history + 6 for the question leaves 3
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0], Turn::system("alpha beta gamma"));
        assert_eq!(turns[1].content, "when was it founded?");
        assert_eq!(total_words(&turns), 25);
    }

    #[test]
    fn structured_walk_stops_at_first_overflow() {
        let log = InMemoryLog::with_records(vec![
            record("t", "old", "short"),
            record("t", "new", &"word ".repeat(30)),
        ]);
        let input = AssemblyInput {
            turn_format: TurnFormat::Structured,
            ..AssemblyInput::new("t", "q", 10)
        };
        let turns = turns(ContextAssembler::new(Arc::new(log)).assemble(&input).unwrap());
        assert_eq!(turns, vec![Turn::user("q")]);
    }

    // ── Untagged ──────────────────────────────────────────────────────────

    #[test]
    fn untagged_never_reads_log() {
        let log = Arc::new(CountingLog::default());
        let assembler = ContextAssembler::new(log.clone());

        for format in [TurnFormat::Flat, TurnFormat::Structured] {
            let input = AssemblyInput {
                turn_format: format,
                ..AssemblyInput::new("", MAYOR, 50)
            };
            assembler.assemble(&input).unwrap();
        }
        assert_eq!(log.reads.load(Ordering::SeqCst), 0);

        let prompt = ContextAssembler::without_log()
            .assemble(&AssemblyInput::new("", MAYOR, 50))
            .unwrap();
        assert_eq!(text(prompt), MAYOR);
    }

    #[test]
    fn untagged_flat_prefixes_clipped_context() {
        let input = AssemblyInput {
            additional_context: "alpha beta gamma delta",
            ..AssemblyInput::new("", MAYOR, 6)
        };
        let prompt = ContextAssembler::without_log().assemble(&input).unwrap();
        assert_eq!(text(prompt), "alpha beta Who is its mayor?");

        let input = AssemblyInput { max_length: 4, ..input };
        let prompt = ContextAssembler::without_log().assemble(&input).unwrap();
        assert_eq!(text(prompt), MAYOR);
    }

    #[test]
    fn untagged_structured_respects_budget() {
        let long_context = "lorem ".repeat(200);
        for budget in [0, 2, 4, 5, 30] {
            let input = AssemblyInput {
                turn_format: TurnFormat::Structured,
                additional_context: &long_context,
                ..AssemblyInput::new("", MAYOR, budget)
            };
            let turns = turns(ContextAssembler::without_log().assemble(&input).unwrap());

            assert_eq!(turns.last(), Some(&Turn::user(MAYOR)));
            if budget > 4 {
                assert_eq!(turns[0].role, Role::System);
                assert_eq!(total_words(&turns), budget);
            } else {
                assert_eq!(turns.len(), 1);
            }
        }
    }

    // ── Budgets and failures ──────────────────────────────────────────────

    #[test]
    fn zero_budget_keeps_the_question() {
        let assembler = canberra();
        for keywords_only in [true, false] {
            let input = AssemblyInput {
                keywords_only,
                ..AssemblyInput::new("Tag1", MAYOR, 0)
            };
            assert_eq!(text(assembler.assemble(&input).unwrap()), MAYOR);
        }

        let input = AssemblyInput {
            turn_format: TurnFormat::Structured,
            ..AssemblyInput::new("Tag1", MAYOR, 0)
        };
        assert_eq!(turns(assembler.assemble(&input).unwrap()), vec![Turn::user(MAYOR)]);
    }

    #[test]
    fn tag_without_log_is_a_configuration_error() {
        let err = ContextAssembler::without_log()
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 50))
            .unwrap_err();
        assert!(matches!(err, ContextError::MissingLog { tag } if tag == "Tag1"));
    }

    #[test]
    fn unreadable_log_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = ContextAssembler::new(Arc::new(FileLog::new(dir.path())));
        let err = assembler
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 50))
            .unwrap_err();
        assert!(matches!(err, ContextError::Log(LogError::Io { .. })));
    }

    #[test]
    fn absent_log_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileLog::new(dir.path().join("output.txt"));
        let prompt = ContextAssembler::new(Arc::new(log))
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 50))
            .unwrap();
        assert_eq!(text(prompt), MAYOR);
    }

    #[test]
    fn malformed_log_lines_are_skipped() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "2023-03-12 10:00:00|Tag1|what is the capital of australia?|The capital of Australia is Canberra.").unwrap();
        writeln!(tmp, "garbage without delimiters").unwrap();
        writeln!(tmp, "2023-03-12 10:01:00|Tag1|truncated").unwrap();
        writeln!(tmp, "2023-03-12 10:02:00|Tag1|when was it founded?|Canberra was founded in 1913 as the site for Australia's capital city.").unwrap();

        let assembler = ContextAssembler::new(Arc::new(FileLog::new(tmp.path())));
        let prompt = assembler
            .assemble(&AssemblyInput::new("Tag1", MAYOR, 50))
            .unwrap();
        assert_eq!(text(prompt), "australia canberra 's capital city Who is its mayor?");
    }

    // ── Properties ────────────────────────────────────────────────────────

    #[test]
    fn assembly_is_idempotent() {
        let assembler = canberra();
        for format in [TurnFormat::Flat, TurnFormat::Structured] {
            for keywords_only in [true, false] {
                let input = AssemblyInput {
                    turn_format: format,
                    keywords_only,
                    additional_context: "Canberra is inland.",
                    ..AssemblyInput::new("Tag1", MAYOR, 20)
                };
                assert_eq!(
                    assembler.assemble(&input).unwrap(),
                    assembler.assemble(&input).unwrap()
                );
            }
        }
    }

    #[test]
    fn debug_mode_does_not_change_output() {
        let assembler = canberra();
        let quiet = AssemblyInput::new("Tag1", MAYOR, 9);
        let loud = AssemblyInput {
            debug: true,
            model_name: "text-davinci-003",
            ..quiet.clone()
        };
        assert_eq!(
            assembler.assemble(&quiet).unwrap(),
            assembler.assemble(&loud).unwrap()
        );
    }

    #[test]
    fn report_measures_prompt() {
        let prompt = Prompt::Turns(vec![Turn::system("be brief"), Turn::user("Who is its mayor?")]);
        let report = canberra().report("gpt-3.5-turbo", 50, &prompt, 2);
        assert_eq!(report.words, 6);
        assert_eq!(report.tokens, 2 + 5);
        assert_eq!(report.format, TurnFormat::Structured);
        assert_eq!(report.skipped_records, 2);
    }

    #[test]
    fn report_uses_configured_token_counter() {
        struct PerWord;

        impl TokenCounter for PerWord {
            fn count_tokens(&self, _model: &str, text: &str) -> usize {
                word_count(text)
            }
        }

        let prompt = Prompt::Text("australia canberra Who is its mayor?".into());
        let report = ContextAssembler::without_log()
            .with_token_counter(PerWord)
            .report("text-davinci-003", 9, &prompt, 0);
        assert_eq!(report.tokens, 6);
        assert_eq!(report.format, TurnFormat::Flat);
    }

    #[test]
    fn custom_measure_drives_budget() {
        /// Every word costs two units.
        struct DoubleWords;

        impl LengthMeasure for DoubleWords {
            fn length_of(&self, text: &str) -> usize {
                word_count(text) * 2
            }

            fn truncate(&self, text: &str, budget: usize) -> String {
                first_words(text, budget / 2)
            }
        }

        let input = AssemblyInput {
            additional_context: "alpha beta gamma",
            ..AssemblyInput::new("", MAYOR, 10)
        };
        let prompt = ContextAssembler::without_log()
            .with_measure(DoubleWords)
            .assemble(&input)
            .unwrap();
        assert_eq!(text(prompt), "alpha Who is its mayor?");
    }
}
