//! `feature`: a feature module with model, service, handlers and tests

use async_trait::async_trait;
use blueprint_core::{
    create_file, Blueprint, BlueprintError, Change, FileTemplate, Host, Options, Parameter,
    Replacements,
};
use std::path::{Path, PathBuf};

const FEATURES_DIR: &str = "src/features";
const FEATURES_MODULE: &str = "src/features/mod.rs";

const TEMPLATES: &[(&str, &str)] = &[
    ("mod.rs", include_str!("../../templates/feature/mod.rs.txt")),
    ("model.rs", include_str!("../../templates/feature/model.rs.txt")),
    ("service.rs", include_str!("../../templates/feature/service.rs.txt")),
    ("handlers.rs", include_str!("../../templates/feature/handlers.rs.txt")),
    ("tests.rs", include_str!("../../templates/feature/tests.rs.txt")),
];

pub struct FeatureBlueprint {
    parameters: Vec<Parameter>,
    replacements: Replacements,
    dir: String,
}

impl FeatureBlueprint {
    pub fn boxed() -> Box<dyn Blueprint> {
        Box::new(Self {
            parameters: vec![Parameter::string("name", "Name of created feature")
                .required()
                .askable()],
            replacements: Replacements::new(),
            dir: String::new(),
        })
    }

    fn feature_dir(&self) -> PathBuf {
        Path::new(FEATURES_DIR).join(&self.dir)
    }

    /// Declare and re-export the new module in `src/features/mod.rs`
    fn register(&self, modules: &str) -> Change {
        let type_name = self.replacements.get("__feature_type__").unwrap_or_default();
        let mod_at = after_last_line(modules, "pub mod ").unwrap_or(0);
        let use_at = after_last_line(modules, "pub use ").unwrap_or(mod_at);
        let newline = |at: usize| {
            if at == modules.len() && !modules.is_empty() && !modules.ends_with('\n') {
                "\n"
            } else {
                ""
            }
        };

        // On equal offsets the later insert lands first, so `pub use` goes before `pub mod`
        let mut children = vec![
            Change::insert(
                FEATURES_MODULE,
                use_at,
                format!("{}pub use {}::{}Feature;\n", newline(use_at), self.dir, type_name),
            ),
            Change::insert(
                FEATURES_MODULE,
                mod_at,
                format!("{}pub mod {};\n", newline(mod_at), self.dir),
            ),
        ];
        children.sort_by(|a, b| b.order().cmp(&a.order()));
        Change::multi(FEATURES_MODULE, children)
    }
}

/// Byte offset just past the last line starting with `prefix`
fn after_last_line(content: &str, prefix: &str) -> Option<usize> {
    let mut offset = 0;
    let mut found = None;
    for line in content.split_inclusive('\n') {
        offset += line.len();
        if line.trim_start().starts_with(prefix) {
            found = Some(offset);
        }
    }
    found
}

/// Split an identifier into lowercase words on separators and case changes
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in input.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `orderItems` -> `order_items`
pub fn snake_case(input: &str) -> String {
    words(input).join("_")
}

/// `order-items` -> `OrderItems`
pub fn pascal_case(input: &str) -> String {
    words(input).iter().map(|w| capitalize(w)).collect()
}

#[async_trait]
impl Blueprint for FeatureBlueprint {
    fn name(&self) -> &str {
        "feature"
    }

    fn description(&self) -> &str {
        "Generate new feature"
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn availability(&self) -> bool {
        tokio::fs::try_exists("src").await.unwrap_or(false)
    }

    async fn prepare(&mut self, options: &Options, host: &dyn Host) -> Result<(), BlueprintError> {
        let name = options
            .get("name")
            .and_then(|v| v.as_str())
            .map(snake_case)
            .unwrap_or_default();
        if name.is_empty() || name.starts_with(|c: char| c.is_numeric()) {
            return Err(BlueprintError::validation("--name must be specified"));
        }

        let mut replacements = Replacements::new();
        replacements.insert("__feature_type__", pascal_case(&name));
        replacements.insert("__feature_name__", name.clone());
        self.replacements = replacements;
        self.dir = name;

        if host.exists(&self.feature_dir()).await {
            return Err(BlueprintError::validation("This feature already exists"));
        }
        Ok(())
    }

    async fn generate_changes(&self, host: &dyn Host) -> Result<Vec<Change>, BlueprintError> {
        let dir = self.feature_dir();
        let mut changes = Vec::with_capacity(TEMPLATES.len() + 1);
        for (file, template) in TEMPLATES {
            let content = FileTemplate::new(*template).render(&self.replacements);
            changes.push(create_file(host, dir.join(file), content).await?);
        }

        let modules = host.read(Path::new(FEATURES_MODULE)).await?;
        changes.push(self.register(&modules));
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::{ChangeCluster, MemoryHost};

    fn options(name: &str) -> Options {
        let mut options = Options::new();
        options.insert("name".into(), name.into());
        options
    }

    async fn apply(host: &MemoryHost, name: &str) {
        let mut blueprint = FeatureBlueprint::boxed();
        blueprint.prepare(&options(name), host).await.unwrap();
        let cluster = ChangeCluster::new(blueprint.generate_changes(host).await.unwrap());
        for path in cluster.files() {
            host.ensure_file(path).await.unwrap();
        }
        for change in cluster.changes() {
            change.apply(host).await.unwrap();
        }
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(snake_case("orderItems"), "order_items");
        assert_eq!(snake_case("Order Items"), "order_items");
        assert_eq!(snake_case("order-items"), "order_items");
        assert_eq!(pascal_case("order_items"), "OrderItems");
        assert_eq!(pascal_case("orders"), "Orders");
    }

    #[test]
    fn test_after_last_line() {
        let content = "pub mod a;\npub mod b;\n\npub use a::A;\n";
        assert_eq!(after_last_line(content, "pub mod "), Some(22));
        assert_eq!(after_last_line(content, "pub use "), Some(content.len()));
        assert_eq!(after_last_line(content, "fn "), None);
    }

    #[tokio::test]
    async fn test_creates_feature_files() {
        let host = MemoryHost::new();
        apply(&host, "orderItems").await;

        let module = host
            .content("src/features/order_items/mod.rs")
            .await
            .unwrap();
        assert!(module.contains("pub struct OrderItemsFeature;"));
        assert!(module.contains("\"order_items\""));
        for file in ["model.rs", "service.rs", "handlers.rs", "tests.rs"] {
            let path = format!("src/features/order_items/{}", file);
            let content = host.content(&path).await.unwrap();
            assert!(!content.contains("__feature_"), "{} has placeholders", path);
        }
    }

    #[tokio::test]
    async fn test_registers_module() {
        let host = MemoryHost::with_files([(
            FEATURES_MODULE,
            "pub mod users;\n\npub use users::UsersFeature;\n",
        )]);
        apply(&host, "orders").await;

        assert_eq!(
            host.content(FEATURES_MODULE).await.unwrap(),
            "pub mod users;\npub mod orders;\n\npub use users::UsersFeature;\npub use orders::OrdersFeature;\n"
        );
    }

    #[tokio::test]
    async fn test_registers_in_empty_module() {
        let host = MemoryHost::new();
        apply(&host, "orders").await;

        assert_eq!(
            host.content(FEATURES_MODULE).await.unwrap(),
            "pub mod orders;\npub use orders::OrdersFeature;\n"
        );
    }

    #[tokio::test]
    async fn test_existing_feature_is_rejected() {
        let host = MemoryHost::with_files([("src/features/orders", "")]);
        let mut blueprint = FeatureBlueprint::boxed();

        let err = blueprint.prepare(&options("Orders"), &host).await.unwrap_err();
        assert_eq!(err.to_string(), "This feature already exists");
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let host = MemoryHost::new();
        let mut blueprint = FeatureBlueprint::boxed();

        let err = blueprint.prepare(&options("--"), &host).await.unwrap_err();
        assert_eq!(err.to_string(), "--name must be specified");
    }
}
