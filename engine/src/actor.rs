//! Player and enemy state

use std::fmt;

use serde::{Deserialize, Serialize};
use util::Dice;
use world::{EnemyKind, Monster, SpellId, StatusKind};

use crate::prelude::*;

/// Stable enemy identifier, never reused within a session.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct EnemyId(pub u64);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
pub enum Movement {
    #[default]
    Idle,
    /// Animating a step between two cells.
    Moving {
        from: IVec2,
        to: IVec2,
        elapsed: f32,
        duration: f32,
    },
}

/// Timed effect on an actor.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub turns_left: u32,
    pub magnitude: i32,
}

/// Physical state shared by the player and enemies.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Body {
    /// Logical cell, the actor occupies this for gameplay purposes.
    pub(crate) pos: IVec2,
    /// Smoothed display position in cell units.
    pub(crate) visual: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub(crate) movement: Movement,
    pub(crate) statuses: Vec<StatusEffect>,
}

impl Body {
    pub fn new(pos: IVec2, health: i32) -> Self {
        Body {
            pos,
            visual: pos.as_vec2(),
            health,
            max_health: health,
            movement: Movement::Idle,
            statuses: Vec::new(),
        }
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn visual(&self) -> Vec2 {
        self.visual
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    pub fn statuses(&self) -> &[StatusEffect] {
        &self.statuses
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.movement, Movement::Moving { .. })
    }

    /// Move the logical position to a new cell and start animating there.
    pub(crate) fn begin_move(&mut self, to: IVec2, duration: f32) {
        let from = self.pos;
        self.pos = to;
        if duration <= 0.0 {
            self.visual = to.as_vec2();
            self.movement = Movement::Idle;
        } else {
            self.movement = Movement::Moving {
                from,
                to,
                elapsed: 0.0,
                duration,
            };
        }
    }

    /// Jump to a cell with no animation.
    pub(crate) fn teleport(&mut self, to: IVec2) {
        self.pos = to;
        self.visual = to.as_vec2();
        self.movement = Movement::Idle;
    }

    /// Advance movement animation.
    pub(crate) fn update(&mut self, dt: f32) {
        let Movement::Moving {
            from,
            to,
            elapsed,
            duration,
        } = self.movement
        else {
            return;
        };

        let elapsed = elapsed + dt;
        if elapsed >= duration {
            self.visual = to.as_vec2();
            self.movement = Movement::Idle;
        } else {
            self.visual =
                from.as_vec2().lerp(to.as_vec2(), elapsed / duration);
            self.movement = Movement::Moving {
                from,
                to,
                elapsed,
                duration,
            };
        }
    }

    pub fn status(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.statuses.iter().find(|s| s.kind == kind)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status(kind).is_some()
    }

    /// Magnitude of an active status, zero if it isn't active.
    pub fn status_magnitude(&self, kind: StatusKind) -> i32 {
        self.status(kind).map_or(0, |s| s.magnitude)
    }

    /// Apply a status effect, refreshing an existing one of the same kind.
    ///
    /// Returns false if the effect would do nothing. Zero-turn effects and
    /// shields that absorb nothing are not applied.
    pub(crate) fn apply_status(
        &mut self,
        kind: StatusKind,
        turns: u32,
        magnitude: i32,
    ) -> bool {
        if turns == 0 || (kind == StatusKind::Shield && magnitude <= 0) {
            return false;
        }
        if let Some(s) = self.statuses.iter_mut().find(|s| s.kind == kind) {
            s.turns_left = s.turns_left.max(turns);
            s.magnitude = s.magnitude.max(magnitude);
        } else {
            self.statuses.push(StatusEffect {
                kind,
                turns_left: turns,
                magnitude,
            });
        }
        true
    }

    /// Count down status effects at the end of a turn.
    pub(crate) fn tick_statuses(&mut self) {
        for s in self.statuses.iter_mut() {
            s.turns_left = s.turns_left.saturating_sub(1);
        }
        self.statuses.retain(|s| s.turns_left > 0);
    }

    /// Take damage, shields absorb it first.
    ///
    /// Returns the amount of health lost.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        let mut amount = amount.max(0);

        if let Some(s) = self
            .statuses
            .iter_mut()
            .find(|s| s.kind == StatusKind::Shield)
        {
            let absorbed = amount.min(s.magnitude);
            s.magnitude -= absorbed;
            amount -= absorbed;
        }
        self.statuses
            .retain(|s| s.kind != StatusKind::Shield || s.magnitude > 0);

        self.health -= amount;
        amount
    }

    /// Heal up to max health, returns the amount healed.
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub(crate) body: Body,
    pub mana: i32,
    pub max_mana: i32,
    pub gold: i32,
    pub melee: Dice,
    /// Known spells in menu order.
    pub(crate) spells: Vec<SpellId>,
}

impl Player {
    pub fn new(pos: IVec2, settings: &world::Settings) -> Self {
        Player {
            body: Body::new(pos, settings.player_health),
            mana: settings.player_mana,
            max_mana: settings.player_mana,
            gold: 0,
            melee: settings.player_melee,
            spells: Vec::new(),
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_health(&mut self, health: i32) {
        self.body.health = health.min(self.body.max_health);
    }

    pub fn spells(&self) -> &[SpellId] {
        &self.spells
    }

    /// Add a spell to the end of the known list if it isn't there yet.
    pub fn learn(&mut self, spell: SpellId) -> bool {
        if self.spells.contains(&spell) {
            false
        } else {
            self.spells.push(spell);
            true
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    pub(crate) body: Body,
    pub damage: Dice,
    pub size: f32,
    pub loot: i32,
    /// Set once the enemy has started its action for the current turn.
    pub(crate) has_acted: bool,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, stats: &Monster, pos: IVec2) -> Self {
        Enemy {
            id,
            kind,
            body: Body::new(pos, stats.health),
            damage: stats.damage,
            size: stats.size,
            loot: stats.loot,
            has_acted: false,
        }
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn has_acted(&self) -> bool {
        self.has_acted
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn movement_animates_visual_position() {
        let mut body = Body::new(ivec2(2, 2), 10);
        body.begin_move(ivec2(3, 2), 0.2);
        assert_eq!(body.pos(), ivec2(3, 2));
        assert!(body.is_moving());
        assert_eq!(body.visual(), vec2(2.0, 2.0));

        body.update(0.1);
        assert!((body.visual().x - 2.5).abs() < 1e-4);
        body.update(0.1);
        assert!(!body.is_moving());
        assert_eq!(body.visual(), vec2(3.0, 2.0));

        body.begin_move(ivec2(4, 2), 0.0);
        assert!(!body.is_moving());
        assert_eq!(body.visual(), vec2(4.0, 2.0));
    }

    #[test]
    fn shield_absorbs_damage() {
        let mut body = Body::new(IVec2::ZERO, 10);
        body.apply_status(StatusKind::Shield, 3, 4);
        assert_eq!(body.take_damage(3), 0);
        assert_eq!(body.health, 10);
        assert_eq!(body.take_damage(3), 2);
        assert_eq!(body.health, 8);
        assert!(!body.has_status(StatusKind::Shield));
    }

    #[test]
    fn statuses_expire() {
        let mut body = Body::new(IVec2::ZERO, 10);
        body.apply_status(StatusKind::Stun, 2, 0);
        body.apply_status(StatusKind::Stun, 1, 0);
        body.tick_statuses();
        assert!(body.has_status(StatusKind::Stun));
        body.tick_statuses();
        assert!(!body.has_status(StatusKind::Stun));
    }

    #[test]
    fn empty_statuses_are_not_applied() {
        let mut body = Body::new(IVec2::ZERO, 10);
        assert!(!body.apply_status(StatusKind::Stun, 0, 0));
        assert!(!body.apply_status(StatusKind::Shield, 3, 0));
        assert!(body.statuses().is_empty());
        assert!(body.apply_status(StatusKind::Empower, 1, 0));
        assert!(body.has_status(StatusKind::Empower));
    }

    #[test]
    fn healing_is_capped() {
        let mut body = Body::new(IVec2::ZERO, 10);
        body.health = 7;
        assert_eq!(body.heal(5), 3);
        assert_eq!(body.health, 10);
    }
}
