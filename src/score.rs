//! Score accumulation.

use crate::achievements::GameEvent;
use crate::events::AddScore;
use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub value: u32,
}

impl Score {
    pub fn add(&mut self, amount: u32) -> u32 {
        self.value = self.value.saturating_add(amount);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

/// Sum this frame's [`AddScore`] messages into the [`Score`] resource.
pub fn apply_score(
    mut adds: MessageReader<AddScore>,
    mut score: ResMut<Score>,
    mut events: MessageWriter<GameEvent>,
) {
    let mut changed = false;
    for add in adds.read() {
        if add.amount > 0 {
            score.add(add.amount);
            changed = true;
        }
    }
    if changed {
        events.write(GameEvent::ScoreChanged { total: score.value });
    }
}
