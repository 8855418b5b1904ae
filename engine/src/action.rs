//! Actors doing things

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use world::TargetType;

use crate::{prelude::*, CastOutcome, EnemyId};

/// Planned action of an actor, consumed when the action resolves.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Action {
    /// Busy with something else, nothing to do.
    #[default]
    None,
    Wait,
    /// Step into an adjacent cell.
    Move(IVec2),
    /// Melee attack on a cell, `target` is `None` when attacking the player.
    Attack {
        tile: IVec2,
        target: Option<EnemyId>,
    },
    /// Cast a known spell by menu index at a cell.
    CastSpell { spell: usize, target: IVec2 },
    /// Use the cell.
    Interact(IVec2),
}

impl Runtime {
    /// Handle a command while waiting for the player's decision.
    pub(crate) fn player_input(&mut self, input: Input) {
        let pos = self.player.body.pos();

        match input {
            Input::Step(dir) => {
                let dest = pos + dir;
                let action = match self.living_enemy_at(dest) {
                    Some(id) => Action::Attack {
                        tile: dest,
                        target: Some(id),
                    },
                    None => Action::Move(dest),
                };
                self.execute_player(action);
            }
            Input::Wait => self.execute_player(Action::Wait),
            Input::Interact => self.execute_player(Action::Interact(pos)),
            Input::OpenSpellMenu => {
                let names: Vec<String> = self
                    .player
                    .spells
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &id)| {
                        let spell = self.data.spell(id)?;
                        Some(format!("{}) {} ({})", i + 1, spell.name, spell.mana_cost))
                    })
                    .collect();
                if names.is_empty() {
                    msg!(self, "you don't know any spells");
                } else {
                    msg!(self, "spells: {}", names.join(", "));
                }
            }
            Input::SelectSpell(i) => {
                let Some((target, name)) = self
                    .player
                    .spells
                    .get(i)
                    .and_then(|&id| self.data.spell(id))
                    .map(|s| (s.target, s.name.clone()))
                else {
                    log::warn!("player_input: no spell at menu index {i}");
                    return;
                };

                if target == TargetType::Caster {
                    self.execute_player(Action::CastSpell {
                        spell: i,
                        target: pos,
                    });
                } else {
                    let cursor = self.nearest_visible_enemy_cell().unwrap_or(pos);
                    msg!(self, "aiming {name}");
                    self.set_phase(TurnPhase::PlayerTargeting { spell: i, cursor });
                }
            }
            Input::Confirm | Input::Cancel | Input::Restart => {}
        }
    }

    /// Handle a command while aiming a spell.
    pub(crate) fn targeting_input(
        &mut self,
        spell: usize,
        cursor: IVec2,
        input: Input,
    ) {
        match input {
            Input::Step(dir) => {
                let cursor = (cursor + dir)
                    .clamp(IVec2::ZERO, self.level.dim() - IVec2::ONE);
                self.phase = TurnPhase::PlayerTargeting { spell, cursor };
            }
            Input::Confirm => self.execute_player(Action::CastSpell {
                spell,
                target: cursor,
            }),
            Input::Cancel => self.set_phase(TurnPhase::PlayerInput),
            _ => {}
        }
    }

    fn execute_player(&mut self, action: Action) {
        use Action::*;

        match action {
            None => {}
            Wait => self.begin_enemy_phase(),
            Move(dest) => {
                let pos = self.player.body.pos();

                if !(dest - pos).is_adjacent() || !self.level.is_walkable(dest) {
                    log::debug!("execute_player: can't move to {dest}");
                    msg!(self, "you can't go there");
                    return;
                }

                if self.occupancy.occupied(dest) {
                    log::debug!("execute_player: {dest} is occupied");
                    // Living enemies get bumped, so this one died this turn
                    // and waits for cleanup.
                    let fallen = self
                        .occupancy
                        .enemy_at(dest)
                        .and_then(|id| self.enemies.get(&id))
                        .map(|e| e.kind());
                    match fallen {
                        Some(kind) => msg!(self, "the fallen {kind} is in the way"),
                        Option::None => msg!(self, "something is in the way"),
                    }
                    return;
                }

                self.occupancy.move_occupant(pos, dest);
                self.player
                    .body
                    .begin_move(dest, self.data.settings.move_duration);
                self.visibility.recompute(&self.level, dest);
                self.set_phase(TurnPhase::PlayerAction);
            }
            Attack {
                target: Some(id), ..
            } => {
                let dmg = self.player.melee.sample(&mut self.rng);
                self.damage_enemy(id, dmg);
                self.begin_enemy_phase();
            }
            Attack { target: Option::None, .. } => {}
            CastSpell { spell, target } => match self.cast(spell, target) {
                Ok(CastOutcome::Applied) => self.begin_enemy_phase(),
                Ok(CastOutcome::Launched) => {
                    self.set_phase(TurnPhase::ProjectileResolution)
                }
                Ok(CastOutcome::Rejected(reason)) => {
                    // Stay in the current phase so the player can retry.
                    msg!(self, "{reason}");
                }
                Err(e) => {
                    log::error!("execute_player: {e}");
                    self.set_phase(TurnPhase::PlayerInput);
                }
            },
            Interact(p) => {
                if p == self.level.end() {
                    self.descend();
                } else {
                    msg!(self, "there's nothing here");
                }
            }
        }
    }

    /// Resolve an enemy's planned action.
    pub(crate) fn execute_enemy(&mut self, id: EnemyId, action: Action) {
        let Some(enemy) = self.enemies.get_mut(&id) else {
            return;
        };

        match action {
            Action::Move(dest) => {
                let pos = enemy.body.pos();
                debug_assert!((dest - pos).is_adjacent());
                self.occupancy.move_occupant(pos, dest);
                enemy
                    .body
                    .begin_move(dest, self.data.settings.move_duration);
            }
            Action::Attack { tile, .. } => {
                if tile != self.player.body.pos() || !self.player.body.is_alive() {
                    return;
                }
                let dmg = enemy.damage.sample(&mut self.rng);
                let kind = enemy.kind();
                let lost = self.player.body.take_damage(dmg);
                self.send_msg(Msg::Hurt(tile, lost));
                if lost > 0 {
                    msg!(self, "the {kind} hits you for {lost}");
                } else {
                    msg!(self, "the {kind} hits your shield");
                }
            }
            Action::None
            | Action::Wait
            | Action::CastSpell { .. }
            | Action::Interact(_) => {}
        }
    }
}
