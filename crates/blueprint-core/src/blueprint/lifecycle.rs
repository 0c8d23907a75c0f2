//! Lifecycle state machine of a single blueprint execution

use super::parameter::{Options, Parameter};
use super::Blueprint;
use crate::change::{ChangeCluster, Host};
use crate::error::BlueprintError;
use std::fmt;
use tokio::sync::OnceCell;

/// Where a [`BlueprintRun`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    PreconditionChecked,
    OptionsGathered,
    Prepared,
    Aborted,
    Applying,
    Applied,
    PostApplied,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::PreconditionChecked => "precondition-checked",
            LifecycleState::OptionsGathered => "options-gathered",
            LifecycleState::Prepared => "prepared",
            LifecycleState::Aborted => "aborted",
            LifecycleState::Applying => "applying",
            LifecycleState::Applied => "applied",
            LifecycleState::PostApplied => "post-applied",
        };
        f.write_str(name)
    }
}

/// One execution of one blueprint instance
///
/// Owns the instance, tracks its lifecycle state and holds the change cluster,
/// which is generated on first request and never recomputed afterwards.
pub struct BlueprintRun {
    blueprint: Box<dyn Blueprint>,
    state: LifecycleState,
    options: Options,
    cluster: OnceCell<ChangeCluster>,
}

impl BlueprintRun {
    pub fn new(blueprint: Box<dyn Blueprint>) -> Self {
        Self {
            blueprint,
            state: LifecycleState::Created,
            options: Options::new(),
            cluster: OnceCell::new(),
        }
    }

    pub fn blueprint(&self) -> &dyn Blueprint {
        self.blueprint.as_ref()
    }

    pub fn name(&self) -> &str {
        self.blueprint.name()
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.blueprint.parameters()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Options accepted in the options-gathered step
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn transition(&mut self, from: LifecycleState, to: LifecycleState) -> Result<(), BlueprintError> {
        if self.state != from {
            return Err(BlueprintError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(blueprint = self.blueprint.name(), %from, %to, "lifecycle transition");
        self.state = to;
        Ok(())
    }

    /// Record the availability evaluated at discovery
    pub fn check_precondition(&mut self, is_active: bool) -> Result<(), BlueprintError> {
        if !is_active {
            return Err(BlueprintError::validation(format!(
                "Blueprint {} is not available in this project",
                self.blueprint.name()
            )));
        }
        self.transition(LifecycleState::Created, LifecycleState::PreconditionChecked)
    }

    /// Validate gathered options: apply defaults, require every required
    /// parameter and check values against their declared types
    pub fn accept_options(&mut self, mut options: Options) -> Result<(), BlueprintError> {
        if self.state != LifecycleState::PreconditionChecked {
            return Err(BlueprintError::InvalidTransition {
                from: self.state,
                to: LifecycleState::OptionsGathered,
            });
        }

        for parameter in self.blueprint.parameters() {
            if !options.contains_key(&parameter.name) {
                if let Some(default) = &parameter.default {
                    options.insert(parameter.name.clone(), default.clone());
                }
            }
            match options.get(&parameter.name) {
                Some(value) => parameter.check(value).map_err(BlueprintError::Validation)?,
                None if parameter.require => {
                    return Err(BlueprintError::validation(format!(
                        "--{} must be specified",
                        parameter.name
                    )))
                }
                None => {}
            }
        }

        self.options = options;
        self.transition(LifecycleState::PreconditionChecked, LifecycleState::OptionsGathered)
    }

    /// Let the blueprint validate and normalize the accepted options
    pub async fn prepare(&mut self, host: &dyn Host) -> Result<(), BlueprintError> {
        if self.state != LifecycleState::OptionsGathered {
            return Err(BlueprintError::InvalidTransition {
                from: self.state,
                to: LifecycleState::Prepared,
            });
        }
        self.blueprint.prepare(&self.options, host).await?;
        self.transition(LifecycleState::OptionsGathered, LifecycleState::Prepared)
    }

    /// The memoized change cluster, generating it on first request
    pub async fn cluster(&self, host: &dyn Host) -> Result<&ChangeCluster, BlueprintError> {
        if !matches!(self.state, LifecycleState::Prepared | LifecycleState::Applying) {
            return Err(BlueprintError::NotPrepared(self.state));
        }
        self.cluster
            .get_or_try_init(|| async {
                let changes = self.blueprint.generate_changes(host).await?;
                Ok::<_, BlueprintError>(ChangeCluster::new(changes))
            })
            .await
    }

    /// User declined at confirmation
    pub fn abort(&mut self) -> Result<(), BlueprintError> {
        self.transition(LifecycleState::Prepared, LifecycleState::Aborted)
    }

    /// Apply every change of the cluster through `host`, one at a time
    ///
    /// Every touched file is created empty first so inserts into new files are
    /// well defined. There is no rollback: a failure leaves the changes applied
    /// so far in place.
    pub async fn apply(&mut self, host: &dyn Host) -> Result<(), BlueprintError> {
        self.cluster(host).await?;
        self.transition(LifecycleState::Prepared, LifecycleState::Applying)?;

        let cluster = self.cluster(host).await?;
        for path in cluster.files() {
            host.ensure_file(path).await?;
        }
        for change in cluster.changes() {
            tracing::debug!(
                path = ?change.path(),
                order = change.order(),
                kind = change.kind().label(),
                "applying change"
            );
            change.apply(host).await?;
        }

        self.transition(LifecycleState::Applying, LifecycleState::Applied)
    }

    /// Run the blueprint's post-apply hook after a successful apply
    pub async fn post_apply(&mut self) -> Result<(), BlueprintError> {
        if self.state != LifecycleState::Applied {
            return Err(BlueprintError::InvalidTransition {
                from: self.state,
                to: LifecycleState::PostApplied,
            });
        }
        self.blueprint.post_apply().await?;
        self.transition(LifecycleState::Applied, LifecycleState::PostApplied)
    }
}
