//! Per-level asteroid spawn rules.
//!
//! A [`SpawnRule`] describes the three fragmentation tiers of a level: how many
//! parent clusters to place, and for each tier its size, fan-out, health, point
//! value and contact damage. [`SpawnRuleTable`] maps level numbers to rules and
//! extrapolates past the last configured level by adding one to every count.

use crate::error::{GameError, GameResult};
use serde::Deserialize;

/// One tier of a spawn rule (parent, child, or grandchild).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tier {
    pub size: u32,
    pub count: u32,
    pub health: u32,
    pub points: u32,
    pub damage: u32,
}

impl Tier {
    /// The terminator tier: spawning it is a no-op.
    pub const NONE: Tier = Tier {
        size: 0,
        count: 0,
        health: 0,
        points: 0,
        damage: 0,
    };

    /// `true` when this tier spawns nothing (zero count or zero size).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.size == 0
    }
}

/// Spawn configuration for a single level.
///
/// Field names match the TOML keys, e.g. `parent_size = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpawnRule {
    // ── Parent ──
    pub parent_size: u32,
    pub parent_count: u32,
    pub parent_health: u32,
    #[serde(default)]
    pub parent_points: u32,
    #[serde(default)]
    pub parent_damage: u32,

    // ── Child ──
    pub child_size: u32,
    pub child_count: u32,
    pub child_health: u32,
    #[serde(default)]
    pub child_points: u32,
    #[serde(default)]
    pub child_damage: u32,

    // ── Grandchild ──
    pub grandchild_size: u32,
    pub grandchild_count: u32,
    pub grandchild_health: u32,
    #[serde(default)]
    pub grandchild_points: u32,
    #[serde(default)]
    pub grandchild_damage: u32,
}

impl SpawnRule {
    pub fn parent(&self) -> Tier {
        Tier {
            size: self.parent_size,
            count: self.parent_count,
            health: self.parent_health,
            points: self.parent_points,
            damage: self.parent_damage,
        }
    }

    pub fn child(&self) -> Tier {
        Tier {
            size: self.child_size,
            count: self.child_count,
            health: self.child_health,
            points: self.child_points,
            damage: self.child_damage,
        }
    }

    pub fn grandchild(&self) -> Tier {
        Tier {
            size: self.grandchild_size,
            count: self.grandchild_count,
            health: self.grandchild_health,
            points: self.grandchild_points,
            damage: self.grandchild_damage,
        }
    }

    /// Copy of this rule with every count raised by one.
    pub fn ramped(mut self) -> Self {
        self.parent_count = self.parent_count.saturating_add(1);
        self.child_count = self.child_count.saturating_add(1);
        self.grandchild_count = self.grandchild_count.saturating_add(1);
        self
    }

    /// Total asteroids a single level built from this rule will register.
    pub fn total_asteroids(&self) -> u32 {
        let per_child = 1 + self.grandchild().count * u32::from(!self.grandchild().is_empty());
        let per_parent = 1 + self.child().count * u32::from(!self.child().is_empty()) * per_child;
        self.parent_count * per_parent
    }

    fn validate(&self, level: u32) -> GameResult<()> {
        let checks: [(&'static str, u32); 6] = [
            ("parent_size", self.parent_size),
            ("parent_health", self.parent_health),
            ("child_size", self.child_size),
            ("child_health", self.child_health),
            ("grandchild_size", self.grandchild_size),
            ("grandchild_health", self.grandchild_health),
        ];
        for (field, value) in checks {
            if value < 1 {
                return Err(GameError::InvalidSpawnRule {
                    level,
                    field,
                    value: value as f32,
                });
            }
        }
        Ok(())
    }
}

/// A rule bound to the level it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LevelSpawnRule {
    pub level_number: u32,
    #[serde(flatten)]
    pub rule: SpawnRule,
}

/// Ordered collection of [`LevelSpawnRule`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct SpawnRuleTable {
    rules: Vec<LevelSpawnRule>,
}

impl SpawnRuleTable {
    pub fn new(rules: Vec<LevelSpawnRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelSpawnRule> {
        self.rules.iter()
    }

    /// Highest configured level number, or `None` for an empty table.
    pub fn max_level(&self) -> Option<u32> {
        self.rules.iter().map(|r| r.level_number).max()
    }

    /// Look up the rule for `level`.
    ///
    /// An exact match wins. Past the highest configured level the highest rule is
    /// returned with all three counts raised by one. Anything else is `None`.
    /// The stored rules are never modified.
    pub fn try_get_rule(&self, level: u32) -> Option<SpawnRule> {
        if let Some(exact) = self.rules.iter().find(|r| r.level_number == level) {
            return Some(exact.rule);
        }

        let highest = self.rules.iter().max_by_key(|r| r.level_number)?;
        if level > highest.level_number {
            return Some(highest.rule.ramped());
        }

        None
    }

    /// Largest parent size across all configured levels (at least 1).
    pub fn global_max_parent_size(&self) -> u32 {
        self.rules
            .iter()
            .map(|r| r.rule.parent_size)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Check every rule against the size ≥ 1 / health ≥ 1 invariant.
    pub fn validate(&self) -> GameResult<()> {
        for entry in &self.rules {
            entry.rule.validate(entry.level_number)?;
        }
        Ok(())
    }
}

impl Default for SpawnRule {
    fn default() -> Self {
        Self {
            parent_size: 3,
            parent_count: 3,
            parent_health: 3,
            parent_points: 100,
            parent_damage: 1,
            child_size: 2,
            child_count: 2,
            child_health: 2,
            child_points: 200,
            child_damage: 1,
            grandchild_size: 1,
            grandchild_count: 2,
            grandchild_health: 1,
            grandchild_points: 400,
            grandchild_damage: 1,
        }
    }
}

/// The table shipped with the game: three hand-tuned levels, ramped beyond.
pub fn default_spawn_rules() -> SpawnRuleTable {
    let base = SpawnRule::default();
    SpawnRuleTable::new(vec![
        LevelSpawnRule {
            level_number: 1,
            rule: SpawnRule {
                parent_count: 2,
                ..base
            },
        },
        LevelSpawnRule {
            level_number: 2,
            rule: base,
        },
        LevelSpawnRule {
            level_number: 3,
            rule: SpawnRule {
                parent_count: 4,
                child_count: 3,
                ..base
            },
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_with_counts(parent: u32, child: u32, grandchild: u32) -> SpawnRule {
        SpawnRule {
            parent_count: parent,
            child_count: child,
            grandchild_count: grandchild,
            ..SpawnRule::default()
        }
    }

    fn table() -> SpawnRuleTable {
        SpawnRuleTable::new(vec![
            LevelSpawnRule {
                level_number: 1,
                rule: rule_with_counts(1, 2, 0),
            },
            LevelSpawnRule {
                level_number: 2,
                rule: rule_with_counts(2, 2, 1),
            },
            LevelSpawnRule {
                level_number: 3,
                rule: rule_with_counts(3, 3, 2),
            },
        ])
    }

    #[test]
    fn exact_levels_return_configured_rule() {
        let t = table();
        for entry in t.iter() {
            assert_eq!(t.try_get_rule(entry.level_number), Some(entry.rule));
        }
    }

    #[test]
    fn levels_past_table_ramp_counts_by_one() {
        let t = table();
        for level in [4, 5, 100] {
            let rule = t.try_get_rule(level).expect("ramped rule");
            assert_eq!(rule.parent_count, 4);
            assert_eq!(rule.child_count, 4);
            assert_eq!(rule.grandchild_count, 3);
            assert_eq!(rule.parent_size, 3, "sizes are not ramped");
        }
    }

    #[test]
    fn ramping_does_not_mutate_table() {
        let t = table();
        let _ = t.try_get_rule(10);
        assert_eq!(t.try_get_rule(3).map(|r| r.parent_count), Some(3));
    }

    #[test]
    fn empty_table_finds_nothing() {
        let t = SpawnRuleTable::default();
        assert!(t.try_get_rule(1).is_none());
        assert_eq!(t.global_max_parent_size(), 1);
    }

    #[test]
    fn gap_below_highest_level_finds_nothing() {
        let t = SpawnRuleTable::new(vec![LevelSpawnRule {
            level_number: 5,
            rule: SpawnRule::default(),
        }]);
        assert!(t.try_get_rule(2).is_none());
        assert!(t.try_get_rule(5).is_some());
    }

    #[test]
    fn unordered_table_ramps_from_highest_level() {
        let t = SpawnRuleTable::new(vec![
            LevelSpawnRule {
                level_number: 7,
                rule: rule_with_counts(9, 0, 0),
            },
            LevelSpawnRule {
                level_number: 2,
                rule: rule_with_counts(1, 1, 1),
            },
        ]);
        assert_eq!(t.try_get_rule(8).map(|r| r.parent_count), Some(10));
    }

    #[test]
    fn validate_rejects_zero_health() {
        let t = SpawnRuleTable::new(vec![LevelSpawnRule {
            level_number: 2,
            rule: SpawnRule {
                child_health: 0,
                ..SpawnRule::default()
            },
        }]);
        match t.validate() {
            Err(GameError::InvalidSpawnRule { level, field, .. }) => {
                assert_eq!(level, 2);
                assert_eq!(field, "child_health");
            }
            other => panic!("expected InvalidSpawnRule, got {other:?}"),
        }
    }

    #[test]
    fn default_table_is_valid() {
        assert!(default_spawn_rules().validate().is_ok());
        assert_eq!(default_spawn_rules().global_max_parent_size(), 3);
    }

    #[test]
    fn total_asteroids_counts_all_tiers() {
        assert_eq!(rule_with_counts(1, 2, 0).total_asteroids(), 3);
        assert_eq!(rule_with_counts(2, 2, 2).total_asteroids(), 14);
    }

    #[test]
    fn parses_flat_toml_rules() {
        let src = r#"
            level_number = 1
            parent_size = 3
            parent_count = 1
            parent_health = 2
            child_size = 2
            child_count = 2
            child_health = 1
            grandchild_size = 1
            grandchild_count = 0
            grandchild_health = 1
        "#;
        let parsed: LevelSpawnRule = toml::from_str(src).expect("valid rule");
        assert_eq!(parsed.level_number, 1);
        assert_eq!(parsed.rule.child().count, 2);
        assert_eq!(parsed.rule.parent().points, 0);
    }
}
