//! Rule repository
//!
//! Owns the active rule set. The default set holds the prototype-pollution
//! rule; callers can register further [`Rule`] implementations without
//! touching the traversal engine.

pub mod prototype_pollution;

use std::sync::Arc;

use protoguard_core::config::ScanConfig;
use tracing::debug;

use crate::domain::Rule;

pub use prototype_pollution::PrototypePollutionRule;

/// Ordered collection of rules applied by the traversal engine
#[derive(Debug, Clone)]
pub struct RuleRepository {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRepository {
    /// Default rule set
    pub fn new() -> Self {
        Self::empty().with_rule(PrototypePollutionRule::new())
    }

    /// Default rule set configured from scan settings
    pub fn from_config(config: &ScanConfig) -> Self {
        let rule = PrototypePollutionRule::with_properties(config.sensitive_properties.iter().cloned());
        debug!(properties = ?rule.properties(), "Configured prototype pollution rule");
        Self::empty().with_rule(rule)
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule; rules run in registration order
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn with_shared_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn get_all_rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn get_rule(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRepository {
    fn default() -> Self {
        Self::new()
    }
}
