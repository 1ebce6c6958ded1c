//! What to do when a target file is already in the download directory.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tracing::warn;

/// Configured policy (`existing_file_action`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingFileAction {
    /// Prompt for each conflict.
    #[default]
    Ask,
    /// Leave the local file and skip the link.
    Skip,
    /// Delete the local file and queue the link.
    Overwrite,
}

impl ExistingFileAction {
    /// Config-facing name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ExistingFileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised `existing_file_action` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExistingFileAction(pub String);

impl fmt::Display for UnknownExistingFileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown existing_file_action '{}'", self.0)
    }
}

impl std::error::Error for UnknownExistingFileAction {}

impl FromStr for ExistingFileAction {
    type Err = UnknownExistingFileAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(UnknownExistingFileAction(other.to_string())),
        }
    }
}

/// Answer to one conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingFileDecision {
    /// `s`
    SkipOnce,
    /// `o`
    OverwriteOnce,
    /// `k`: skip this and every later conflict
    SkipAll,
    /// `a`: overwrite this and every later conflict
    OverwriteAll,
}

impl ExistingFileDecision {
    /// Parses a prompt answer; `None` for anything unrecognised.
    #[must_use]
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "s" => Some(Self::SkipOnce),
            "o" => Some(Self::OverwriteOnce),
            "k" => Some(Self::SkipAll),
            "a" => Some(Self::OverwriteAll),
            _ => None,
        }
    }

    /// True when the link should be overwritten.
    #[must_use]
    pub fn overwrites(self) -> bool {
        matches!(self, Self::OverwriteOnce | Self::OverwriteAll)
    }

    fn is_sticky(self) -> bool {
        matches!(self, Self::SkipAll | Self::OverwriteAll)
    }
}

/// Source of answers for the `ask` policy.
///
/// `ask` may block; [`ExistingFileResolver`] calls it on the blocking pool.
pub trait ExistingFilePrompt: Send {
    /// Asks what to do with `filename`.
    fn ask(&mut self, filename: &str) -> ExistingFileDecision;
}

/// Prompts on stdout and reads answers from any line source.
///
/// Invalid answers re-prompt; end of input means skip once.
pub struct TerminalPrompt<R> {
    input: R,
}

impl TerminalPrompt<io::BufReader<io::Stdin>> {
    /// Reads from standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> TerminalPrompt<R> {
    /// Reads answers from `input`.
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead + Send> ExistingFilePrompt for TerminalPrompt<R> {
    fn ask(&mut self, filename: &str) -> ExistingFileDecision {
        loop {
            print!(
                "File '{filename}' already exists. [s] skip once, [o] overwrite once, [k] skip all, [a] overwrite all: "
            );
            let _ = io::stdout().flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    println!();
                    return ExistingFileDecision::SkipOnce;
                }
                Ok(_) => {}
            }
            if let Some(decision) = ExistingFileDecision::from_answer(&line) {
                return decision;
            }
            println!("Invalid choice. Please enter s, o, k, or a.");
        }
    }
}

/// Applies the policy across a run, remembering "all" answers.
pub struct ExistingFileResolver {
    action: ExistingFileAction,
    sticky: Option<ExistingFileDecision>,
    prompt: Option<Box<dyn ExistingFilePrompt>>,
}

impl ExistingFileResolver {
    /// Creates a resolver for one run.
    #[must_use]
    pub fn new(action: ExistingFileAction, prompt: Box<dyn ExistingFilePrompt>) -> Self {
        Self {
            action,
            sticky: None,
            prompt: Some(prompt),
        }
    }

    /// Decides for one conflicting `filename`.
    ///
    /// The prompt runs under `spawn_blocking`, leaving the runtime free to
    /// observe Ctrl+C while an answer is pending. A prompt that panics is
    /// dropped and every later conflict is skipped.
    pub async fn decide(&mut self, filename: &str) -> ExistingFileDecision {
        match self.action {
            ExistingFileAction::Skip => return ExistingFileDecision::SkipOnce,
            ExistingFileAction::Overwrite => return ExistingFileDecision::OverwriteOnce,
            ExistingFileAction::Ask => {}
        }
        if let Some(sticky) = self.sticky {
            return sticky;
        }
        let Some(mut prompt) = self.prompt.take() else {
            return ExistingFileDecision::SkipOnce;
        };
        let filename = filename.to_string();
        let answered = tokio::task::spawn_blocking(move || {
            let decision = prompt.ask(&filename);
            (prompt, decision)
        })
        .await;
        let decision = match answered {
            Ok((prompt, decision)) => {
                self.prompt = Some(prompt);
                decision
            }
            Err(err) => {
                warn!(error = %err, "Existing-file prompt failed; skipping");
                ExistingFileDecision::SkipOnce
            }
        };
        if decision.is_sticky() {
            self.sticky = Some(decision);
        }
        decision
    }
}

impl fmt::Debug for ExistingFileResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExistingFileResolver")
            .field("action", &self.action)
            .field("sticky", &self.sticky)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Replays fixed answers; panics if asked more often than scripted.
    struct Scripted {
        answers: Vec<ExistingFileDecision>,
    }

    impl ExistingFilePrompt for Scripted {
        fn ask(&mut self, _filename: &str) -> ExistingFileDecision {
            self.answers.remove(0)
        }
    }

    #[test]
    fn test_existing_file_action_from_str() {
        assert_eq!("Overwrite".parse::<ExistingFileAction>().unwrap(), ExistingFileAction::Overwrite);
        assert_eq!(" skip ".parse::<ExistingFileAction>().unwrap(), ExistingFileAction::Skip);
        assert!("maybe".parse::<ExistingFileAction>().is_err());
    }

    #[test]
    fn test_terminal_prompt_reprompts_then_accepts() {
        let mut prompt = TerminalPrompt::new(Cursor::new("x\n\nK\n"));
        assert_eq!(prompt.ask("a.rar"), ExistingFileDecision::SkipAll);
    }

    #[test]
    fn test_terminal_prompt_eof_skips_once() {
        let mut prompt = TerminalPrompt::new(Cursor::new(""));
        assert_eq!(prompt.ask("a.rar"), ExistingFileDecision::SkipOnce);
    }

    #[tokio::test]
    async fn test_resolver_fixed_policies_never_prompt() {
        let mut skip = ExistingFileResolver::new(
            ExistingFileAction::Skip,
            Box::new(TerminalPrompt::new(Cursor::new(""))),
        );
        assert_eq!(skip.decide("a").await, ExistingFileDecision::SkipOnce);
        let mut overwrite = ExistingFileResolver::new(
            ExistingFileAction::Overwrite,
            Box::new(TerminalPrompt::new(Cursor::new(""))),
        );
        assert!(overwrite.decide("a").await.overwrites());
    }

    #[tokio::test]
    async fn test_resolver_all_answers_are_sticky() {
        let mut resolver = ExistingFileResolver::new(
            ExistingFileAction::Ask,
            Box::new(Scripted {
                answers: vec![
                    ExistingFileDecision::OverwriteOnce,
                    ExistingFileDecision::OverwriteAll,
                ],
            }),
        );
        assert_eq!(resolver.decide("a").await, ExistingFileDecision::OverwriteOnce);
        assert_eq!(resolver.decide("b").await, ExistingFileDecision::OverwriteAll);
        assert_eq!(resolver.decide("c").await, ExistingFileDecision::OverwriteAll);
        assert_eq!(resolver.decide("d").await, ExistingFileDecision::OverwriteAll);
    }

    /// Blocks until a task on the runtime sends the answer.
    struct WaitsForRuntime {
        answers: mpsc::Receiver<ExistingFileDecision>,
    }

    impl ExistingFilePrompt for WaitsForRuntime {
        fn ask(&mut self, _filename: &str) -> ExistingFileDecision {
            self.answers
                .recv_timeout(Duration::from_secs(5))
                .unwrap_or(ExistingFileDecision::SkipOnce)
        }
    }

    #[tokio::test]
    async fn test_pending_prompt_leaves_runtime_running() {
        let (tx, rx) = mpsc::channel();
        let mut resolver =
            ExistingFileResolver::new(ExistingFileAction::Ask, Box::new(WaitsForRuntime { answers: rx }));
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(ExistingFileDecision::OverwriteOnce).unwrap();
        });

        assert_eq!(resolver.decide("a.rar").await, ExistingFileDecision::OverwriteOnce);
        assert!(resolver.prompt.is_some());
    }

    #[tokio::test]
    async fn test_panicking_prompt_skips_remaining_conflicts() {
        struct Panics;
        impl ExistingFilePrompt for Panics {
            fn ask(&mut self, _filename: &str) -> ExistingFileDecision {
                panic!("terminal gone");
            }
        }

        let mut resolver = ExistingFileResolver::new(ExistingFileAction::Ask, Box::new(Panics));
        assert_eq!(resolver.decide("a.rar").await, ExistingFileDecision::SkipOnce);
        assert_eq!(resolver.decide("b.rar").await, ExistingFileDecision::SkipOnce);
    }
}
