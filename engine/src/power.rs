//! Spellcasting

use rand::prelude::*;
use thiserror::Error;
use world::{Spell, SpellEffect, SpellId, StatusKind, TargetType};

use crate::{prelude::*, Aim, OrbitalMissile, Payload, Projectile};

/// Casting failed because the caller asked for something impossible.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum CastError {
    #[error("no known spell at menu index {0}")]
    UnknownSpell(usize),
    #[error("known spell {0:?} missing from spellbook")]
    MissingSpell(SpellId),
}

/// Why a valid cast request didn't go through.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum Rejection {
    #[error("not enough mana")]
    InsufficientMana,
    #[error("target is out of range")]
    OutOfRange,
    #[error("there's no enemy there")]
    NoTarget,
    #[error("the spell fizzles")]
    MissingResource,
    #[error("can't aim at your own position")]
    DegenerateTarget,
    #[error("the spell has no effect")]
    NoEffect,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CastOutcome {
    /// Effect took place immediately.
    Applied,
    /// A projectile is on its way.
    Launched,
    /// Nothing happened and no mana was spent.
    Rejected(Rejection),
}

impl Runtime {
    /// Have the player cast a known spell at a target cell.
    ///
    /// Spells that target the caster ignore `target`. Mana is only spent
    /// when the spell takes effect.
    pub fn cast(
        &mut self,
        spell_index: usize,
        target: IVec2,
    ) -> Result<CastOutcome, CastError> {
        let &id = self
            .player
            .spells
            .get(spell_index)
            .ok_or(CastError::UnknownSpell(spell_index))?;
        let data = self.data.clone();
        let spell = data.spell(id).ok_or(CastError::MissingSpell(id))?;

        let outcome = match self.validate_cast(spell, target) {
            Ok(()) => self.apply_spell(spell, target),
            Err(reason) => CastOutcome::Rejected(reason),
        };

        match outcome {
            CastOutcome::Rejected(reason) => {
                log::debug!("cast {}: rejected, {reason}", spell.name);
            }
            _ => {
                self.player.mana -= spell.mana_cost;
                log::debug!("cast {} at {target}", spell.name);
            }
        }
        Ok(outcome)
    }

    fn validate_cast(&self, spell: &Spell, target: IVec2) -> Result<(), Rejection> {
        if self.player.mana < spell.mana_cost {
            return Err(Rejection::InsufficientMana);
        }

        if spell.target != TargetType::Caster {
            let caster = self.player.body.pos();
            if !self.level.contains(target)
                || (target - caster).taxi_len() > spell.range
            {
                return Err(Rejection::OutOfRange);
            }
        }

        if spell.target == TargetType::Enemy
            && self.living_enemy_at(target).is_none()
        {
            return Err(Rejection::NoTarget);
        }

        Ok(())
    }

    fn apply_spell(&mut self, spell: &Spell, target: IVec2) -> CastOutcome {
        use SpellEffect::*;

        let settings = &self.data.settings;
        let empower = self.player.body.status_magnitude(StatusKind::Empower);
        let payload = Payload {
            damage: spell.damage,
            bonus: empower,
            radius: if spell.effect == AreaDamage {
                spell.area_radius.max(0)
            } else {
                0
            },
        };

        match spell.effect {
            Heal => {
                let amount = spell.damage.sample(&mut self.rng);
                let healed = self.player.body.heal(amount);
                msg!(self, "you heal {healed} health");
                CastOutcome::Applied
            }
            Damage | AreaDamage => {
                let Some(resource) = self.assets.handle(&spell.asset) else {
                    log::warn!("cast {}: no asset {:?}", spell.name, spell.asset);
                    return CastOutcome::Rejected(Rejection::MissingResource);
                };

                let origin = self.player.body.visual();
                let projectile = Projectile::new(
                    origin,
                    target.as_vec2(),
                    settings.projectile_speed,
                    Aim::Tile(target),
                    payload,
                    resource,
                );
                if !projectile.is_active() {
                    return CastOutcome::Rejected(Rejection::DegenerateTarget);
                }

                self.projectiles.push(projectile);
                self.send_msg(Msg::Fire(origin, target.as_vec2()));
                CastOutcome::Launched
            }
            SummonOrbital => {
                let Some(resource) = self.assets.handle(&spell.asset) else {
                    log::warn!("cast {}: no asset {:?}", spell.name, spell.asset);
                    return CastOutcome::Rejected(Rejection::MissingResource);
                };

                let n = spell.orbitals.max(1);
                let anchor = self.player.body.visual();
                for i in 0..n {
                    let mut orbital =
                        OrbitalMissile::new(i, n, settings, payload, resource);
                    orbital.hover(
                        anchor,
                        settings.orbital_spacing,
                        settings.orbital_height,
                    );
                    self.orbitals.push(orbital);
                }
                msg!(self, "{n} orbitals appear around you");
                CastOutcome::Applied
            }
            ApplyShield | Buff => {
                let Some(kind) = spell.effect.status() else {
                    return CastOutcome::Rejected(Rejection::NoEffect);
                };
                if !self
                    .player
                    .body
                    .apply_status(kind, spell.duration, spell.magnitude)
                {
                    return CastOutcome::Rejected(Rejection::NoEffect);
                }
                msg!(self, "you cast {}", spell.name);
                CastOutcome::Applied
            }
            Debuff => {
                let Some(kind) = spell.effect.status() else {
                    return CastOutcome::Rejected(Rejection::NoEffect);
                };
                let id = self.living_enemy_at(target);
                let Some(e) = id.and_then(|id| self.enemies.get_mut(&id)) else {
                    return CastOutcome::Rejected(Rejection::NoTarget);
                };
                if !e.body.apply_status(kind, spell.duration, spell.magnitude) {
                    return CastOutcome::Rejected(Rejection::NoEffect);
                }
                let name = e.kind();
                msg!(self, "the {name} is stunned");
                CastOutcome::Applied
            }
        }
    }
}
