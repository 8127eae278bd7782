pub mod builtin;
pub mod custom;
pub mod types;

pub use builtin::{all_rules, select_rules};
pub use custom::{CustomRule, CustomRuleError, CustomRuleLoader};
pub use types::*;
