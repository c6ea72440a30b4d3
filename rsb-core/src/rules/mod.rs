// Rule system
// - rule.rs: the Rule trait and shared handles
// - registry.rs: name -> rule lookup
// - binder.rs: resolves configured rule entries against the registry
// - engine.rs: Matcher and the two aggregation modes
// - ram_under_price.rs: RAM price ceiling rules

pub mod binder;
pub mod engine;
pub mod ram_under_price;
pub mod registry;
pub mod rule;

pub use binder::bind;
pub use engine::{MatchMode, MatchResult, Matcher};
pub use ram_under_price::{RamUnderPriceConfig, RamUnderPriceRule};
pub use registry::RuleRegistry;
pub use rule::{read_rule, rule_name, share, write_rule, Rule, RuleHandle};
