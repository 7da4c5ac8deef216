use crate::agent::AgentKind;
use crate::algo::decompose::SearchStrategy;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use serde_json as json;

/// House rules that affect legality and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct RuleConfig {
    /// Hands below this fan cannot win even when complete.
    #[derivative(Default(value = "3"))]
    pub min_fan: u8,
    pub search: SearchStrategy,
    #[derivative(Default(value = "true"))]
    pub thirteen_orphans: bool,
    /// Offer concealed kongs and pong upgrades on a draw.
    #[derivative(Default(value = "true"))]
    pub allow_self_kong: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct TableConfig {
    pub rules: RuleConfig,
    pub seed: u64,
    /// Upper bound on hands per table, so that a run of draws cannot keep a
    /// table going forever.
    #[derivative(Default(value = "64"))]
    pub max_hands: u32,
    #[derivative(Default(value = "[AgentKind::Basic; 4]"))]
    pub agents: [AgentKind; 4],
}

impl TableConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        json::from_str(raw).context("failed to parse table config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let rules = RuleConfig::default();
        assert_eq!(rules.min_fan, 3);
        assert_eq!(rules.search, SearchStrategy::Greedy);
        assert!(rules.thirteen_orphans);
        let table = TableConfig::default();
        assert_eq!(table.max_hands, 64);
        assert_eq!(table.agents, [AgentKind::Basic; 4]);
    }

    #[test]
    fn partial_json() {
        let config = TableConfig::from_json_str(
            r#"{"seed": 7, "rules": {"min_fan": 1, "search": "backtracking"}, "agents": ["basic", "random", "yes", "passive"]}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_hands, 64);
        assert_eq!(config.rules.min_fan, 1);
        assert_eq!(config.rules.search, SearchStrategy::Backtracking);
        assert!(config.rules.allow_self_kong);
        assert_eq!(config.agents[3], AgentKind::Passive);
        assert!(TableConfig::from_json_str(r#"{"max_hands": "many"}"#).is_err());
    }
}
