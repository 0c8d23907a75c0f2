//! Drives one blueprint from option gathering to post-apply

pub mod interaction;

use crate::blueprint::{missing_required, BlueprintRun, Options, Question};
use crate::change::Host;
use crate::diff::FileDiff;
use crate::discovery::{BlueprintMetadata, DiscoveredBlueprint};
use crate::error::BlueprintError;
use crate::summary::BlueprintSummary;

pub use interaction::{Decision, Interaction, Scripted, Unattended};

/// How an execution ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Changes applied and post-apply done
    Applied,
    /// The user declined at confirmation
    Aborted,
    /// A validation error stopped the run before any change was applied
    Rejected,
    /// Dry run: diffs shown, nothing written
    Previewed,
}

/// Runs a discovered blueprint against a host
pub struct BlueprintExecutor<'a> {
    run: BlueprintRun,
    metadata: BlueprintMetadata,
    host: &'a dyn Host,
    interaction: &'a mut dyn Interaction,
    dry_run: bool,
}

impl<'a> BlueprintExecutor<'a> {
    pub fn new(
        entry: DiscoveredBlueprint,
        host: &'a dyn Host,
        interaction: &'a mut dyn Interaction,
    ) -> Self {
        let (blueprint, metadata) = entry.into_parts();
        Self {
            run: BlueprintRun::new(blueprint),
            metadata,
            host,
            interaction,
            dry_run: false,
        }
    }

    /// Preview every diff instead of confirming and applying
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run(&self) -> &BlueprintRun {
        &self.run
    }

    /// Execute the blueprint with the options given on the command line
    ///
    /// Validation errors raised up to and including apply are reported and
    /// end the run with [`ExecutionOutcome::Rejected`]. Every other error,
    /// user errors and post-apply failures included, is returned.
    pub async fn execute(&mut self, options: Options) -> Result<ExecutionOutcome, BlueprintError> {
        let outcome = match self.apply_confirmed(options).await {
            Ok(outcome) => outcome,
            Err(e @ BlueprintError::Validation(_)) => {
                tracing::debug!(blueprint = self.run.name(), error = %e, "blueprint rejected");
                self.interaction.error(&format!("Cannot proceed: {}", e))?;
                return Ok(ExecutionOutcome::Rejected);
            }
            Err(e) => return Err(self.fail(e)),
        };

        if outcome != ExecutionOutcome::Applied {
            return Ok(outcome);
        }

        if let Err(e) = self.run.post_apply().await {
            return Err(self.fail(e));
        }
        self.interaction.success("Completed, have a productive day!")?;
        Ok(ExecutionOutcome::Applied)
    }

    fn fail(&mut self, error: BlueprintError) -> BlueprintError {
        if error.is_user_facing() {
            tracing::warn!(blueprint = self.run.name(), error = %error, "blueprint stopped");
        } else {
            tracing::error!(
                blueprint = self.run.name(),
                state = %self.run.state(),
                error = %error,
                "blueprint execution failed"
            );
        }
        if let Err(report) = self.interaction.error(&error.to_string()) {
            tracing::warn!(error = %report, "failed to report error");
        }
        error
    }

    async fn apply_confirmed(&mut self, options: Options) -> Result<ExecutionOutcome, BlueprintError> {
        self.run.check_precondition(self.metadata.is_active)?;
        let options = self.ensure_options(options).await?;
        self.run.accept_options(options)?;
        self.run.prepare(self.host).await?;

        if self.dry_run {
            return self.preview().await;
        }

        if !self.confirm().await? {
            self.run.abort()?;
            self.interaction.info("Aborted, nothing was changed")?;
            return Ok(ExecutionOutcome::Aborted);
        }

        self.interaction.info("Applying changes...")?;
        self.run.apply(self.host).await?;
        Ok(ExecutionOutcome::Applied)
    }

    /// Fill missing required options through the wizard
    ///
    /// Required options that cannot be asked for must come from flags. When
    /// anything is missing the wizard asks every askable parameter, pre-filled
    /// with the value already known.
    async fn ensure_options(&mut self, mut options: Options) -> Result<Options, BlueprintError> {
        let parameters = self.run.parameters();
        let missing: Vec<_> = missing_required(parameters, &options)
            .into_iter()
            .filter(|p| p.default.is_none())
            .collect();

        if let Some(flag_only) = missing.iter().find(|p| p.flag_only_required()) {
            return Err(BlueprintError::validation(format!(
                "--{} must be specified",
                flag_only.name
            )));
        }
        if missing.is_empty() {
            return Ok(options);
        }

        let questions: Vec<Question> = parameters
            .iter()
            .filter(|p| p.ask)
            .map(|p| Question::new(p, &options))
            .collect();
        let answers = self.interaction.ask(&questions).await?;
        options.extend(answers);
        Ok(options)
    }

    /// Confirmation loop; `true` when the user chose to apply
    async fn confirm(&mut self) -> Result<bool, BlueprintError> {
        let cluster = self.run.cluster(self.host).await?;
        let summary = BlueprintSummary::generate(cluster, self.host).await;

        loop {
            match self.interaction.confirm(&summary).await? {
                Decision::Apply => return Ok(true),
                Decision::Cancel => return Ok(false),
                Decision::Show(path) => {
                    let diff = FileDiff::preview(cluster, self.host, &path).await?;
                    self.interaction.show_diff(&diff).await?;
                }
            }
        }
    }

    async fn preview(&mut self) -> Result<ExecutionOutcome, BlueprintError> {
        let cluster = self.run.cluster(self.host).await?;
        let summary = BlueprintSummary::generate(cluster, self.host).await;
        self.interaction
            .info(&format!("Plan of operation:\n{}", summary.render(true)))?;

        for diff in FileDiff::preview_all(cluster, self.host).await? {
            self.interaction.show_diff(&diff).await?;
        }

        self.run.abort()?;
        self.interaction.info("Dry run, nothing was changed")?;
        Ok(ExecutionOutcome::Previewed)
    }
}
