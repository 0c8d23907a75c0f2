//! The prompt collaborator of the executor
//!
//! [`Unattended`] backs `--yes`, [`Scripted`] replays canned answers.
//! The cliclack front end lives in the `tui` module.

use crate::blueprint::{Options, Question};
use crate::diff::FileDiff;
use crate::error::BlueprintError;
use crate::summary::BlueprintSummary;
use async_trait::async_trait;
use colored::Colorize;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Answer to the confirmation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Apply,
    Cancel,
    /// Preview the diff of one file, then ask again
    Show(PathBuf),
}

/// Everything the executor needs from the user
#[async_trait]
pub trait Interaction: Send {
    /// Ask every question, returning an answer per parameter name
    async fn ask(&mut self, questions: &[Question]) -> Result<Options, BlueprintError>;

    /// Present the plan and ask what to do with it
    async fn confirm(&mut self, summary: &BlueprintSummary) -> Result<Decision, BlueprintError>;

    async fn show_diff(&mut self, diff: &FileDiff) -> Result<(), BlueprintError>;

    fn info(&mut self, message: &str) -> Result<(), BlueprintError>;

    fn success(&mut self, message: &str) -> Result<(), BlueprintError>;

    fn error(&mut self, message: &str) -> Result<(), BlueprintError>;
}

/// Non-interactive mode: answers with defaults and applies without asking
#[derive(Debug, Default)]
pub struct Unattended;

#[async_trait]
impl Interaction for Unattended {
    async fn ask(&mut self, questions: &[Question]) -> Result<Options, BlueprintError> {
        Ok(questions
            .iter()
            .filter_map(|q| {
                q.default
                    .clone()
                    .map(|value| (q.parameter.name.clone(), value))
            })
            .collect())
    }

    async fn confirm(&mut self, summary: &BlueprintSummary) -> Result<Decision, BlueprintError> {
        println!("{}", "Plan of operation:".magenta());
        println!("{}", summary.render(true));
        Ok(Decision::Apply)
    }

    async fn show_diff(&mut self, diff: &FileDiff) -> Result<(), BlueprintError> {
        eprintln!("{}", diff.path.display().to_string().cyan());
        eprintln!("{}", diff.render(true));
        Ok(())
    }

    fn info(&mut self, message: &str) -> Result<(), BlueprintError> {
        println!("{}", message.blue());
        Ok(())
    }

    fn success(&mut self, message: &str) -> Result<(), BlueprintError> {
        println!("{}", message.green());
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<(), BlueprintError> {
        eprintln!("{}", message.red());
        Ok(())
    }
}

/// Replays prepared answers and decisions, recording what it was shown
///
/// Once the decisions run out every further confirmation is a cancel.
#[derive(Debug, Default)]
pub struct Scripted {
    answers: Options,
    decisions: VecDeque<Decision>,
    pub asked: Vec<Question>,
    pub summaries: Vec<BlueprintSummary>,
    pub diffs: Vec<FileDiff>,
    pub messages: Vec<String>,
}

impl Scripted {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Answer the wizard with `answers`
    pub fn with_answers(mut self, answers: Options) -> Self {
        self.answers = answers;
        self
    }
}

#[async_trait]
impl Interaction for Scripted {
    async fn ask(&mut self, questions: &[Question]) -> Result<Options, BlueprintError> {
        self.asked.extend_from_slice(questions);
        Ok(questions
            .iter()
            .filter_map(|q| {
                let value = self
                    .answers
                    .get(&q.parameter.name)
                    .cloned()
                    .or_else(|| q.default.clone())?;
                Some((q.parameter.name.clone(), value))
            })
            .collect())
    }

    async fn confirm(&mut self, summary: &BlueprintSummary) -> Result<Decision, BlueprintError> {
        self.summaries.push(summary.clone());
        Ok(self.decisions.pop_front().unwrap_or(Decision::Cancel))
    }

    async fn show_diff(&mut self, diff: &FileDiff) -> Result<(), BlueprintError> {
        self.diffs.push(diff.clone());
        Ok(())
    }

    fn info(&mut self, message: &str) -> Result<(), BlueprintError> {
        self.messages.push(message.to_string());
        Ok(())
    }

    fn success(&mut self, message: &str) -> Result<(), BlueprintError> {
        self.messages.push(message.to_string());
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<(), BlueprintError> {
        self.messages.push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Parameter;

    #[tokio::test]
    async fn test_unattended_answers_with_defaults() {
        let mut options = Options::new();
        options.insert("name".into(), "orders".into());
        let questions = vec![
            Question::new(&Parameter::string("name", "").required().askable(), &options),
            Question::new(&Parameter::string("path", "").askable(), &Options::new()),
        ];

        let answers = Unattended.ask(&questions).await.unwrap();

        assert_eq!(answers.get("name"), Some(&"orders".into()));
        assert!(!answers.contains_key("path"));
    }

    #[tokio::test]
    async fn test_scripted_prefers_answers_over_defaults() {
        let mut answers = Options::new();
        answers.insert("name".into(), "billing".into());
        let mut scripted = Scripted::default().with_answers(answers);
        let questions = vec![Question::new(
            &Parameter::string("name", "").with_default("orders").askable(),
            &Options::new(),
        )];

        let options = scripted.ask(&questions).await.unwrap();

        assert_eq!(options.get("name"), Some(&"billing".into()));
        assert_eq!(scripted.asked.len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_cancels_when_out_of_decisions() {
        let mut scripted = Scripted::new([Decision::Apply]);
        let summary = BlueprintSummary::default();

        assert_eq!(scripted.confirm(&summary).await.unwrap(), Decision::Apply);
        assert_eq!(scripted.confirm(&summary).await.unwrap(), Decision::Cancel);
    }
}
