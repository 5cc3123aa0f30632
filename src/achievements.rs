//! Data-driven achievements.
//!
//! Each [`AchievementDef`] pairs display text with a [`Condition`] over the
//! stream of [`GameEvent`]s. Conditions are a closed sum type, so adding a new
//! kind of achievement means adding a variant, not a new listener type.
//!
//! Unlocks are queued and presented one at a time: the next one is only handed
//! out after the current one has been acknowledged.

use crate::config::GameConfig;
use crate::events::{AsteroidDestroyed, LevelStarted};
use crate::scheduler::{GameTask, TaskQueue};
use bevy::prelude::*;
use serde::Deserialize;
use std::collections::VecDeque;

/// Category of a [`GameEvent`], used by conditions to pick what they listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEventKind {
    AsteroidDestroyed,
    BulletFired,
    LevelReached,
    ScoreChanged,
    PlayerJumped,
}

/// Gameplay occurrences that achievements observe.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    AsteroidDestroyed { size: u32 },
    BulletFired,
    LevelReached { level: u32 },
    ScoreChanged { total: u32 },
    PlayerJumped { jumps_left: u32 },
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::AsteroidDestroyed { .. } => GameEventKind::AsteroidDestroyed,
            GameEvent::BulletFired => GameEventKind::BulletFired,
            GameEvent::LevelReached { .. } => GameEventKind::LevelReached,
            GameEvent::ScoreChanged { .. } => GameEventKind::ScoreChanged,
            GameEvent::PlayerJumped { .. } => GameEventKind::PlayerJumped,
        }
    }

    /// Numeric payload compared by [`Condition::Threshold`].
    pub fn value(&self) -> Option<f32> {
        match *self {
            GameEvent::AsteroidDestroyed { size } => Some(size as f32),
            GameEvent::BulletFired => None,
            GameEvent::LevelReached { level } => Some(level as f32),
            GameEvent::ScoreChanged { total } => Some(total as f32),
            GameEvent::PlayerJumped { jumps_left } => Some(jumps_left as f32),
        }
    }
}

/// When an achievement unlocks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Condition {
    /// `required` occurrences of `event`.
    Count { event: GameEventKind, required: u32 },
    /// One occurrence of `event` whose value reaches `required`.
    Threshold { event: GameEventKind, required: f32 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AchievementDef {
    pub title: String,
    pub description: String,
    pub condition: Condition,
}

impl AchievementDef {
    fn new(title: &str, description: &str, condition: Condition) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            condition,
        }
    }
}

pub fn default_achievements() -> Vec<AchievementDef> {
    use Condition::{Count, Threshold};
    use GameEventKind as K;
    vec![
        AchievementDef::new(
            "First Contact",
            "Destroy your first asteroid.",
            Count { event: K::AsteroidDestroyed, required: 1 },
        ),
        AchievementDef::new(
            "Rock Breaker",
            "Destroy 100 asteroids.",
            Count { event: K::AsteroidDestroyed, required: 100 },
        ),
        AchievementDef::new(
            "Trigger Happy",
            "Fire 500 bullets.",
            Count { event: K::BulletFired, required: 500 },
        ),
        AchievementDef::new(
            "Deep Field",
            "Reach level 5.",
            Threshold { event: K::LevelReached, required: 5.0 },
        ),
        AchievementDef::new(
            "High Score",
            "Reach 10000 points.",
            Threshold { event: K::ScoreChanged, required: 10_000.0 },
        ),
        AchievementDef::new(
            "Close Call",
            "Jump away from a collision.",
            Count { event: K::PlayerJumped, required: 1 },
        ),
    ]
}

/// Sent when an unlocked achievement reaches the front of the display queue.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct AchievementUnlocked {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
struct AchievementState {
    def: AchievementDef,
    progress: u32,
    unlocked: bool,
}

impl AchievementState {
    fn observe(&mut self, event: &GameEvent) -> bool {
        if self.unlocked {
            return false;
        }
        let met = match self.def.condition {
            Condition::Count { event: kind, required } => {
                if event.kind() != kind {
                    return false;
                }
                self.progress = self.progress.saturating_add(1);
                self.progress >= required
            }
            Condition::Threshold { event: kind, required } => {
                event.kind() == kind && event.value().is_some_and(|v| v >= required)
            }
        };
        self.unlocked = met;
        met
    }
}

#[derive(Resource, Debug, Default)]
pub struct AchievementTracker {
    states: Vec<AchievementState>,
    pending: VecDeque<usize>,
    showing: Option<usize>,
}

impl AchievementTracker {
    pub fn new(defs: &[AchievementDef]) -> Self {
        Self {
            states: defs
                .iter()
                .cloned()
                .map(|def| AchievementState {
                    def,
                    progress: 0,
                    unlocked: false,
                })
                .collect(),
            pending: VecDeque::new(),
            showing: None,
        }
    }

    /// Feed one event to every locked achievement. Returns the titles that
    /// unlocked, which are also queued for display.
    pub fn record(&mut self, event: &GameEvent) -> Vec<String> {
        let mut unlocked = Vec::new();
        for (index, state) in self.states.iter_mut().enumerate() {
            if state.observe(event) {
                self.pending.push_back(index);
                unlocked.push(state.def.title.clone());
            }
        }
        unlocked
    }

    /// Hand out the next queued unlock, unless one is still being shown.
    pub fn show_next(&mut self) -> Option<&AchievementDef> {
        if self.showing.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.showing = Some(next);
        self.states.get(next).map(|s| &s.def)
    }

    /// The current unlock has been displayed; allow the next one.
    pub fn acknowledge(&mut self) {
        self.showing = None;
    }

    pub fn showing(&self) -> Option<&AchievementDef> {
        self.showing.and_then(|i| self.states.get(i)).map(|s| &s.def)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_unlocked(&self, title: &str) -> bool {
        self.states
            .iter()
            .any(|s| s.unlocked && s.def.title == title)
    }

    pub fn unlocked_count(&self) -> usize {
        self.states.iter().filter(|s| s.unlocked).count()
    }
}

/// Translate gameplay messages into [`GameEvent`]s.
pub fn forward_game_events(
    mut destroyed: MessageReader<AsteroidDestroyed>,
    mut started: MessageReader<LevelStarted>,
    mut events: MessageWriter<GameEvent>,
) {
    for d in destroyed.read() {
        events.write(GameEvent::AsteroidDestroyed { size: d.size });
    }
    for s in started.read() {
        events.write(GameEvent::LevelReached { level: s.level });
    }
}

pub fn track_achievements(
    mut events: MessageReader<GameEvent>,
    mut tracker: ResMut<AchievementTracker>,
) {
    for event in events.read() {
        for title in tracker.record(event) {
            info!("Achievement unlocked: {title}");
        }
    }
}

/// Present the next queued unlock and schedule its acknowledgement. Runs only
/// while a level is being played.
pub fn present_achievements(
    config: Res<GameConfig>,
    mut tracker: ResMut<AchievementTracker>,
    mut queue: ResMut<TaskQueue>,
    mut unlocked: MessageWriter<AchievementUnlocked>,
) {
    if let Some(def) = tracker.show_next() {
        unlocked.write(AchievementUnlocked {
            title: def.title.clone(),
            description: def.description.clone(),
        });
        queue.schedule(
            config.achievement_display_time,
            None,
            GameTask::AcknowledgeAchievement,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(kind: GameEventKind, required: u32) -> AchievementDef {
        AchievementDef::new("count", "", Condition::Count { event: kind, required })
    }

    #[test]
    fn count_condition_unlocks_on_nth_event_only_once() {
        let mut t = AchievementTracker::new(&[count(GameEventKind::BulletFired, 3)]);
        assert!(t.record(&GameEvent::BulletFired).is_empty());
        assert!(t.record(&GameEvent::AsteroidDestroyed { size: 1 }).is_empty());
        assert!(t.record(&GameEvent::BulletFired).is_empty());
        assert_eq!(t.record(&GameEvent::BulletFired), vec!["count".to_string()]);
        assert!(t.record(&GameEvent::BulletFired).is_empty());
        assert_eq!(t.pending(), 1);
    }

    #[test]
    fn threshold_condition_compares_event_value() {
        let def = AchievementDef::new(
            "lvl",
            "",
            Condition::Threshold {
                event: GameEventKind::LevelReached,
                required: 3.0,
            },
        );
        let mut t = AchievementTracker::new(&[def]);
        t.record(&GameEvent::LevelReached { level: 2 });
        assert!(!t.is_unlocked("lvl"));
        t.record(&GameEvent::ScoreChanged { total: 99 });
        assert!(!t.is_unlocked("lvl"));
        t.record(&GameEvent::LevelReached { level: 3 });
        assert!(t.is_unlocked("lvl"));
    }

    #[test]
    fn unlocks_are_shown_one_at_a_time() {
        let mut t = AchievementTracker::new(&[
            AchievementDef::new("a", "", Condition::Count { event: GameEventKind::BulletFired, required: 1 }),
            AchievementDef::new("b", "", Condition::Count { event: GameEventKind::BulletFired, required: 1 }),
        ]);
        t.record(&GameEvent::BulletFired);
        assert_eq!(t.show_next().map(|d| d.title.clone()), Some("a".into()));
        assert!(t.show_next().is_none(), "blocked until acknowledged");
        assert_eq!(t.showing().map(|d| d.title.as_str()), Some("a"));
        t.acknowledge();
        assert_eq!(t.show_next().map(|d| d.title.clone()), Some("b".into()));
        t.acknowledge();
        assert!(t.show_next().is_none());
        assert_eq!(t.unlocked_count(), 2);
    }

    #[test]
    fn conditions_parse_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            achievements: Vec<AchievementDef>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[achievements]]
            title = "Sharpshooter"
            description = "Destroy 10 asteroids."
            condition = { mode = "count", event = "asteroid_destroyed", required = 10 }

            [[achievements]]
            title = "Rich"
            description = "Score 500."
            condition = { mode = "threshold", event = "score_changed", required = 500.0 }
            "#,
        )
        .expect("valid achievements");
        assert_eq!(
            doc.achievements[0].condition,
            Condition::Count {
                event: GameEventKind::AsteroidDestroyed,
                required: 10
            }
        );
        assert!(matches!(
            doc.achievements[1].condition,
            Condition::Threshold { event: GameEventKind::ScoreChanged, .. }
        ));
    }

    #[test]
    fn default_set_is_not_empty() {
        let t = AchievementTracker::new(&default_achievements());
        assert_eq!(t.unlocked_count(), 0);
        assert!(!default_achievements().is_empty());
    }
}
