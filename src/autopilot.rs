//! Scripted player for headless runs

use engine::prelude::*;
use pathfinding::prelude::astar;
use world::{Spell, SpellEffect, TargetType};

#[derive(Clone, Default, Debug)]
pub struct Autopilot {
    /// Turn on which a cast didn't go through, don't retry until the next.
    failed_cast: Option<u64>,
    /// Already confirmed a target in the current targeting phase.
    confirmed: bool,
}

impl Autopilot {
    /// Pick the next input, `None` when the game isn't asking for one.
    pub fn decide(&mut self, r: &Runtime) -> Option<Input> {
        match r.phase() {
            TurnPhase::PlayerInput => {
                self.confirmed = false;
            }
            TurnPhase::PlayerTargeting { .. } => {
                if self.confirmed {
                    // Confirm got rejected, give up on the spell.
                    self.confirmed = false;
                    self.failed_cast = Some(r.turn());
                    return Some(Input::Cancel);
                }
                self.confirmed = true;
                return Some(Input::Confirm);
            }
            _ => return None,
        }

        let pos = r.player().body().pos();

        if self.failed_cast != Some(r.turn()) {
            if let Some(input) = self.cast(r) {
                return Some(input);
            }
        }

        if let Some(e) = r
            .enemies()
            .find(|e| {
                e.body().is_alive() && (e.body().pos() - pos).is_neighbor_8()
            })
        {
            return Some(Input::Step(e.body().pos() - pos));
        }

        if pos == r.level().end() {
            return Some(Input::Interact);
        }

        match path_to(r, r.level().end()) {
            Some(step) => Some(Input::Step(step - pos)),
            None => Some(Input::Wait),
        }
    }

    fn cast(&mut self, r: &Runtime) -> Option<Input> {
        let player = r.player();
        let body = player.body();
        let affordable = |s: &Spell| s.mana_cost <= player.mana;

        if body.health * 3 < body.max_health {
            if let Some(i) = known_spell(r, |s| {
                s.effect == SpellEffect::Heal && affordable(s)
            }) {
                return Some(Input::SelectSpell(i));
            }
        }

        // Only aim at the enemy the targeting cursor will start on.
        let pos = body.pos();
        let target = r
            .enemies()
            .filter(|e| {
                e.body().is_alive() && r.visibility().is_visible(e.body().pos())
            })
            .map(|e| e.body().pos())
            .min_by_key(|p| (*p - pos).taxi_len())?;
        let dist = (target - pos).taxi_len();

        if r.orbitals().is_empty() && dist > 2 {
            if let Some(i) = known_spell(r, |s| {
                s.effect == SpellEffect::SummonOrbital && affordable(s)
            }) {
                return Some(Input::SelectSpell(i));
            }
        }

        known_spell(r, |s| {
            s.effect == SpellEffect::Damage
                && s.target == TargetType::Enemy
                && s.range >= dist
                && affordable(s)
        })
        .map(Input::SelectSpell)
    }
}

/// Menu index of the first known spell that matches.
fn known_spell(r: &Runtime, pred: impl Fn(&Spell) -> bool) -> Option<usize> {
    r.player()
        .spells()
        .iter()
        .position(|&id| r.data().spell(id).is_some_and(&pred))
}

/// First step on a shortest path to the destination.
///
/// Cells held by enemies are avoided.
fn path_to(r: &Runtime, dest: IVec2) -> Option<IVec2> {
    let start = r.player().body().pos();
    let (path, _) = astar(
        &start,
        |&p| {
            DIR_4
                .iter()
                .map(move |&d| p + d)
                .filter(|&q| {
                    r.level().is_walkable(q)
                        && (q == dest || !r.occupancy().occupied(q))
                })
                .map(|q| (q, 1))
                .collect::<Vec<_>>()
        },
        |&p| (dest - p).taxi_len(),
        |&p| p == dest,
    )?;
    path.get(1).copied()
}
