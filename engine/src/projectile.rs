//! Things flying through the air

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use util::Dice;
use world::Settings;

use crate::{prelude::*, EnemyId, ResourceId, ORBITAL_BOLT_ASSET};

/// Where a projectile is headed.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Aim {
    /// Fixed cell, hits whatever is there on arrival.
    Tile(IVec2),
    /// Follows an enemy and fizzles if the enemy is gone.
    Enemy(EnemyId),
}

/// What a projectile does when it lands.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Payload {
    pub damage: Dice,
    /// Flat bonus added to every damage roll.
    pub bonus: i32,
    /// Chebyshev splash radius, zero only hits the target cell.
    pub radius: i32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Projectile {
    origin: Vec2,
    target: Vec2,
    pos: Vec2,
    dir: Vec2,
    speed: f32,
    pub aim: Aim,
    pub payload: Payload,
    active: bool,
    pub resource: ResourceId,
}

impl Projectile {
    /// Create a projectile flying from origin to target.
    ///
    /// A projectile with no distance to travel is inert from the start and
    /// never arrives.
    pub fn new(
        origin: Vec2,
        target: Vec2,
        speed: f32,
        aim: Aim,
        payload: Payload,
        resource: ResourceId,
    ) -> Self {
        let d = target - origin;
        let active = d.length_squared() > 0.0;
        Projectile {
            origin,
            target,
            pos: origin,
            dir: if active { d.normalize() } else { Vec2::ZERO },
            speed,
            aim,
            payload,
            active,
            resource,
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fly for `dt` seconds, returns true on the tick the target is reached.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }

        let step = self.speed * dt;
        let remaining = self.target - self.pos;
        if remaining.length_squared() <= step * step {
            self.pos = self.target;
            self.active = false;
            true
        } else {
            self.pos += self.dir * step;
            false
        }
    }

    /// Steer towards a moved target.
    pub fn retarget(&mut self, target: Vec2) {
        self.target = target;
        let d = target - self.pos;
        if d.length_squared() > 0.0 {
            self.dir = d.normalize();
        }
    }

    /// Deactivate without a hit.
    pub fn fizzle(&mut self) {
        self.active = false;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum OrbitalState {
    /// Hovering near the player looking for a target.
    Waiting,
    /// Has fired its missile and is about to be removed.
    Launched,
}

/// What an orbital wants done this tick.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OrbitalEvent {
    Nothing,
    /// Time to look for a target.
    Scan,
    /// Lifetime ran out.
    Expired,
}

/// Summoned missile that hovers above the player until it sees a target.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct OrbitalMissile {
    /// Position in formation.
    pub index: u32,
    /// Number of orbitals in formation.
    pub size: u32,
    pub state: OrbitalState,
    pos: Vec2,
    scan_interval: f32,
    scan_timer: f32,
    lifetime: f32,
    pub range: f32,
    pub payload: Payload,
    pub resource: ResourceId,
}

impl OrbitalMissile {
    pub fn new(
        index: u32,
        size: u32,
        settings: &Settings,
        payload: Payload,
        resource: ResourceId,
    ) -> Self {
        OrbitalMissile {
            index,
            size,
            state: OrbitalState::Waiting,
            pos: Vec2::ZERO,
            scan_interval: settings.orbital_scan_interval,
            scan_timer: settings.orbital_scan_interval,
            lifetime: settings.orbital_lifetime,
            range: settings.orbital_range,
            payload,
            resource,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Horizontal offset from formation center.
    pub fn formation_offset(&self, spacing: f32) -> f32 {
        (self.index as f32 - (self.size.max(1) - 1) as f32 / 2.0) * spacing
    }

    /// Center above the anchor point at the orbital's formation slot.
    pub fn hover(&mut self, anchor: Vec2, spacing: f32, height: f32) {
        self.pos = anchor + vec2(self.formation_offset(spacing), -height);
    }

    /// Run timers for `dt` seconds.
    pub fn update(&mut self, dt: f32) -> OrbitalEvent {
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            return OrbitalEvent::Expired;
        }

        self.scan_timer -= dt;
        if self.scan_timer <= 0.0 {
            self.scan_timer += self.scan_interval.max(f32::EPSILON);
            OrbitalEvent::Scan
        } else {
            OrbitalEvent::Nothing
        }
    }
}

impl Runtime {
    /// Fly projectiles and resolve the ones that land.
    pub(crate) fn update_projectiles(&mut self, dt: f32) {
        for i in 0..self.projectiles.len() {
            if !self.projectiles[i].is_active() {
                continue;
            }

            if let Aim::Enemy(id) = self.projectiles[i].aim {
                match self.enemies.get(&id).filter(|e| e.body.is_alive()) {
                    Some(e) => {
                        let target = e.body.visual();
                        self.projectiles[i].retarget(target);
                    }
                    None => {
                        log::trace!("projectile target {id} is gone");
                        self.projectiles[i].fizzle();
                        continue;
                    }
                }
            }

            if self.projectiles[i].update(dt) {
                let (aim, payload) =
                    (self.projectiles[i].aim, self.projectiles[i].payload);
                self.projectile_hit(aim, payload);
            }
        }

        self.projectiles.retain(|p| p.is_active());
    }

    fn projectile_hit(&mut self, aim: Aim, payload: Payload) {
        let victims: Vec<EnemyId> = match aim {
            Aim::Enemy(id) => vec![id],
            Aim::Tile(p) if payload.radius > 0 => {
                self.send_msg(Msg::Explosion(p, payload.radius));
                self.enemies
                    .values()
                    .filter(|e| {
                        e.body.is_alive()
                            && (e.body.pos() - p).chess_len() <= payload.radius
                    })
                    .map(|e| e.id())
                    .collect()
            }
            Aim::Tile(p) => self.living_enemy_at(p).into_iter().collect(),
        };

        for id in victims {
            let dmg = payload.damage.sample(&mut self.rng) + payload.bonus;
            self.damage_enemy(id, dmg);
        }
    }

    /// Keep orbitals in formation and fire them at targets.
    pub(crate) fn update_orbitals(&mut self, dt: f32) {
        let settings = &self.data.settings;
        let (spacing, height, speed) = (
            settings.orbital_spacing,
            settings.orbital_height,
            settings.projectile_speed,
        );
        let anchor = self.player.body.visual();

        for i in 0..self.orbitals.len() {
            let orbital = &mut self.orbitals[i];
            if orbital.state != OrbitalState::Waiting {
                continue;
            }
            orbital.hover(anchor, spacing, height);

            match orbital.update(dt) {
                OrbitalEvent::Nothing | OrbitalEvent::Expired => continue,
                OrbitalEvent::Scan => {}
            }

            let (pos, range, payload) = (orbital.pos(), orbital.range, orbital.payload);
            let Some((id, target)) = self.nearest_enemy_in_sight(pos, range) else {
                continue;
            };
            let Some(resource) = self.assets.handle(ORBITAL_BOLT_ASSET) else {
                log::warn!("update_orbitals: no asset {ORBITAL_BOLT_ASSET:?}");
                continue;
            };

            let bolt = Projectile::new(
                pos,
                target,
                speed,
                Aim::Enemy(id),
                payload,
                resource,
            );
            if bolt.is_active() {
                self.projectiles.push(bolt);
                self.orbitals[i].state = OrbitalState::Launched;
                self.send_msg(Msg::Fire(pos, target));
            }
        }

        self.orbitals
            .retain(|o| o.state == OrbitalState::Waiting && o.lifetime() > 0.0);
    }

    /// Closest visible living enemy within range of a point.
    fn nearest_enemy_in_sight(&self, from: Vec2, range: f32) -> Option<(EnemyId, Vec2)> {
        self.enemies
            .values()
            .filter(|e| {
                e.body.is_alive() && self.visibility.is_visible(e.body.pos())
            })
            .map(|e| (e.id(), e.body.visual()))
            .filter(|(_, p)| p.distance(from) <= range)
            .min_by(|(_, a), (_, b)| a.distance(from).total_cmp(&b.distance(from)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn bolt(origin: Vec2, target: Vec2) -> Projectile {
        Projectile::new(
            origin,
            target,
            10.0,
            Aim::Tile(target.as_ivec2()),
            Payload::default(),
            ResourceId(0),
        )
    }

    #[test]
    fn zero_length_projectile_is_inert() {
        let mut p = bolt(vec2(3.0, 3.0), vec2(3.0, 3.0));
        assert!(!p.is_active());
        for _ in 0..10 {
            assert!(!p.update(0.1));
        }
        assert_eq!(p.pos(), vec2(3.0, 3.0));
    }

    #[test]
    fn projectile_snaps_to_target() {
        let mut p = bolt(vec2(0.0, 0.0), vec2(2.5, 0.0));
        assert_eq!(p.dir(), vec2(1.0, 0.0));
        assert!(!p.update(0.1));
        assert_eq!(p.pos(), vec2(1.0, 0.0));
        assert!(!p.update(0.1));
        // Within one step, snap to target.
        assert!(p.update(0.1));
        assert_eq!(p.pos(), vec2(2.5, 0.0));
        assert!(!p.is_active());
        assert!(!p.update(0.1));
    }

    #[test]
    fn retargeting() {
        let mut p = bolt(vec2(0.0, 0.0), vec2(5.0, 0.0));
        p.retarget(vec2(0.0, 5.0));
        assert_eq!(p.dir(), vec2(0.0, 1.0));
        p.fizzle();
        assert!(!p.update(1.0));
    }

    #[test]
    fn formation_is_symmetric() {
        let settings = Settings::default();
        for size in 1..6 {
            let offsets: Vec<f32> = (0..size)
                .map(|i| {
                    OrbitalMissile::new(
                        i,
                        size,
                        &settings,
                        Payload::default(),
                        ResourceId(0),
                    )
                    .formation_offset(1.0)
                })
                .collect();
            let sum: f32 = offsets.iter().sum();
            assert!(sum.abs() < 1e-4, "{offsets:?}");
            assert!(offsets.windows(2).all(|w| (w[1] - w[0] - 1.0).abs() < 1e-4));
        }
    }

    #[test]
    fn orbital_timers() {
        let settings = Settings {
            orbital_scan_interval: 0.25,
            orbital_lifetime: 1.0,
            ..Default::default()
        };
        let mut o =
            OrbitalMissile::new(0, 1, &settings, Payload::default(), ResourceId(0));
        o.hover(vec2(4.0, 4.0), 1.0, 0.5);
        assert_eq!(o.pos(), vec2(4.0, 3.5));

        assert_eq!(o.update(0.2), OrbitalEvent::Nothing);
        assert_eq!(o.update(0.1), OrbitalEvent::Scan);
        assert_eq!(o.update(0.1), OrbitalEvent::Nothing);
        assert_eq!(o.update(0.7), OrbitalEvent::Expired);
    }
}
