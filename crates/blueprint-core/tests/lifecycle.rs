use async_trait::async_trait;
use blueprint_core::executor::Scripted;
use blueprint_core::{
    create_file, Blueprint, BlueprintError, BlueprintExecutor, BlueprintMetadata, Change,
    DiscoveredBlueprint, Decision, ExecutionOutcome, Host, LifecycleState, MemoryHost, Options,
    Parameter,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const MODULES: &str = "src/features/mod.rs";

#[derive(Default)]
struct Calls {
    generated: AtomicUsize,
    post_applied: AtomicUsize,
}

/// Creates a model, a service and a handler, and registers the module
struct Scaffold {
    parameters: Vec<Parameter>,
    calls: Arc<Calls>,
    name: String,
    type_name: String,
}

impl Scaffold {
    fn entry(calls: Arc<Calls>) -> DiscoveredBlueprint {
        DiscoveredBlueprint {
            blueprint: Box::new(Self {
                parameters: vec![Parameter::string("name", "Feature name").required().askable()],
                calls,
                name: String::new(),
                type_name: String::new(),
            }),
            metadata: BlueprintMetadata {
                tag: None,
                is_active: true,
            },
        }
    }
}

#[async_trait]
impl Blueprint for Scaffold {
    fn name(&self) -> &str {
        "scaffold"
    }

    fn description(&self) -> &str {
        "Scaffold a feature"
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn prepare(&mut self, options: &Options, host: &dyn Host) -> Result<(), BlueprintError> {
        let type_name = options
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let name = type_name.to_lowercase();
        if host.exists(format!("src/features/{}", name).as_ref()).await {
            return Err(BlueprintError::validation("This feature already exists"));
        }
        self.name = name;
        self.type_name = type_name;
        Ok(())
    }

    async fn generate_changes(&self, host: &dyn Host) -> Result<Vec<Change>, BlueprintError> {
        self.calls.generated.fetch_add(1, Ordering::SeqCst);
        let dir = format!("src/features/{}", self.name);
        let modules = host.read(MODULES.as_ref()).await?;
        Ok(vec![
            create_file(
                host,
                format!("{}/model.rs", dir),
                format!("pub struct {}Model;\n", self.type_name),
            )
            .await?,
            create_file(host, format!("{}/service.rs", dir), "pub struct Service;\n").await?,
            create_file(host, format!("{}/handler.rs", dir), "pub fn handle() {}\n").await?,
            Change::insert(MODULES, modules.len(), format!("pub mod {};\n", self.name)),
        ])
    }

    async fn post_apply(&self) -> Result<(), BlueprintError> {
        self.calls.post_applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn name(value: &str) -> Options {
    let mut options = Options::new();
    options.insert("name".into(), value.into());
    options
}

#[tokio::test]
async fn test_scaffold_on_simulated_filesystem() {
    let calls = Arc::new(Calls::default());
    let host = MemoryHost::with_files([(MODULES, "pub mod users;\n")]);
    let mut interaction = Scripted::new([Decision::Apply]);
    let mut executor = BlueprintExecutor::new(Scaffold::entry(calls.clone()), &host, &mut interaction);

    let outcome = executor.execute(name("Orders")).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Applied);
    assert_eq!(executor.run().state(), LifecycleState::PostApplied);
    let model = PathBuf::from("src/features/orders/model.rs");
    assert!(host.writes().await.contains(&model));
    assert_eq!(
        host.content(&model).await.as_deref(),
        Some("pub struct OrdersModel;\n")
    );
    assert_eq!(
        host.content("src/features/orders/service.rs").await.as_deref(),
        Some("pub struct Service;\n")
    );
    assert_eq!(
        host.content("src/features/orders/handler.rs").await.as_deref(),
        Some("pub fn handle() {}\n")
    );
    assert_eq!(
        host.content(MODULES).await.as_deref(),
        Some("pub mod users;\npub mod orders;\n")
    );
    assert_eq!(calls.generated.load(Ordering::SeqCst), 1);
    assert_eq!(calls.post_applied.load(Ordering::SeqCst), 1);
    assert_eq!(
        interaction.messages.last().map(String::as_str),
        Some("Completed, have a productive day!")
    );
}

#[tokio::test]
async fn test_cancel_leaves_host_untouched() {
    let calls = Arc::new(Calls::default());
    let host = MemoryHost::with_files([(MODULES, "pub mod users;\n")]);
    let mut interaction = Scripted::new([Decision::Cancel]);
    let mut executor = BlueprintExecutor::new(Scaffold::entry(calls.clone()), &host, &mut interaction);

    let outcome = executor.execute(name("Orders")).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Aborted);
    assert_eq!(executor.run().state(), LifecycleState::Aborted);
    assert!(host.writes().await.is_empty());
    assert_eq!(host.content(MODULES).await.as_deref(), Some("pub mod users;\n"));
    assert_eq!(calls.post_applied.load(Ordering::SeqCst), 0);
    assert_eq!(interaction.summaries[0].rows().len(), 4);
}

#[tokio::test]
async fn test_validation_stops_before_generation() {
    let calls = Arc::new(Calls::default());
    let host = MemoryHost::with_files([("src/features/orders", "")]);
    let mut interaction = Scripted::new([Decision::Apply]);
    let mut executor = BlueprintExecutor::new(Scaffold::entry(calls.clone()), &host, &mut interaction);

    let outcome = executor.execute(name("Orders")).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Rejected);
    assert_eq!(calls.generated.load(Ordering::SeqCst), 0);
    assert!(interaction.summaries.is_empty());
    assert!(host.writes().await.is_empty());
    assert_eq!(
        interaction.messages.last().map(String::as_str),
        Some("Cannot proceed: This feature already exists")
    );
}

#[tokio::test]
async fn test_show_diff_then_apply() {
    let calls = Arc::new(Calls::default());
    let host = MemoryHost::with_files([(MODULES, "pub mod users;\n")]);
    let mut interaction = Scripted::new([
        Decision::Show(PathBuf::from(MODULES)),
        Decision::Show(PathBuf::from("src/features/orders/model.rs")),
        Decision::Apply,
    ]);
    let mut executor = BlueprintExecutor::new(Scaffold::entry(calls.clone()), &host, &mut interaction);

    let outcome = executor.execute(name("Orders")).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Applied);
    assert_eq!(calls.generated.load(Ordering::SeqCst), 1);
    assert_eq!(interaction.summaries.len(), 3);
    assert_eq!(interaction.diffs.len(), 2);
    assert_eq!(interaction.diffs[0].before, "pub mod users;\n");
    assert_eq!(interaction.diffs[0].after, "pub mod users;\npub mod orders;\n");
    assert_eq!(interaction.diffs[1].before, "");
    assert_eq!(interaction.diffs[1].after, "pub struct OrdersModel;\n");
}

#[tokio::test]
async fn test_wizard_asks_for_missing_name() {
    let calls = Arc::new(Calls::default());
    let host = MemoryHost::new();
    let mut interaction = Scripted::new([Decision::Apply]).with_answers(name("billing"));
    let mut executor = BlueprintExecutor::new(Scaffold::entry(calls.clone()), &host, &mut interaction);

    let outcome = executor.execute(Options::new()).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Applied);
    assert_eq!(interaction.asked.len(), 1);
    assert!(host.content("src/features/billing/model.rs").await.is_some());
    assert_eq!(host.content(MODULES).await.as_deref(), Some("pub mod billing;\n"));
}
