mod gitignore;
mod hooks;
mod injection;
mod permissions;
mod plaintext_env;
mod secrets;
mod tools;
mod transport;

pub use gitignore::MissingGitignore;
pub use hooks::MissingHooks;
pub use injection::CommandInjection;
pub use permissions::FilePermissions;
pub use plaintext_env::PlaintextEnv;
pub use secrets::HardcodedSecrets;
pub use tools::ToolPermissions;
pub use transport::TransportSecurity;

use crate::rules::types::Rule;
use std::sync::LazyLock;

static ALL_RULES: LazyLock<Vec<Box<dyn Rule>>> = LazyLock::new(|| {
    let rules: Vec<Box<dyn Rule>> = vec![
        Box::new(HardcodedSecrets),
        Box::new(PlaintextEnv),
        Box::new(FilePermissions),
        Box::new(MissingHooks),
        Box::new(CommandInjection),
        Box::new(TransportSecurity),
        Box::new(ToolPermissions),
        Box::new(MissingGitignore),
    ];
    rules
});

/// Every built-in rule, in registration order.
pub fn all_rules() -> &'static [Box<dyn Rule>] {
    &ALL_RULES
}

/// Built-in rules whose ids appear in `ids`, preserving registration order.
/// Unknown ids are silently ignored.
pub fn select_rules(ids: &[String]) -> Vec<&'static dyn Rule> {
    ALL_RULES
        .iter()
        .filter(|rule| ids.iter().any(|id| id == rule.id()))
        .map(|rule| rule.as_ref())
        .collect()
}
