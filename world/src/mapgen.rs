//! Level generation.

use anyhow::bail;
use glam::IVec2;
use pathfinding::prelude::astar;
use rand::prelude::*;
use util::{s4, srng, GameRng, DIR_8};

use crate::{Level, Room, TileKind};

/// Source of levels for successive dungeon depths.
pub trait LevelProvider {
    /// Produce the level for the given depth.
    ///
    /// The returned level must have walkable start and end tiles.
    fn level(&mut self, depth: u32) -> anyhow::Result<Level>;
}

/// Serves a fixed list of prebuilt levels, cycling when it runs out.
impl LevelProvider for Vec<Level> {
    fn level(&mut self, depth: u32) -> anyhow::Result<Level> {
        if self.is_empty() {
            bail!("no levels available");
        }
        let mut ret = self[(depth.max(1) - 1) as usize % self.len()].clone();
        ret.set_depth(depth);
        Ok(ret)
    }
}

/// Procedural generator that digs rectangular rooms connected by corridors.
///
/// Every depth gets its own random stream derived from the generator seed,
/// so the same seed always produces the same dungeon.
#[derive(Copy, Clone, Debug)]
pub struct RoomsAndCorridors {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
}

const MIN_MAP_SIZE: i32 = 12;

impl RoomsAndCorridors {
    pub fn new(seed: u64, width: i32, height: i32) -> Self {
        RoomsAndCorridors {
            seed,
            width,
            height,
        }
    }
}

impl LevelProvider for RoomsAndCorridors {
    fn level(&mut self, depth: u32) -> anyhow::Result<Level> {
        if self.width < MIN_MAP_SIZE || self.height < MIN_MAP_SIZE {
            bail!(
                "map size {}x{} is too small, must be at least {MIN_MAP_SIZE}x{MIN_MAP_SIZE}",
                self.width,
                self.height
            );
        }

        let mut rng: GameRng = srng(&(self.seed, depth));
        let blueprint = Blueprint {
            width: self.width,
            height: self.height,
            depth,
        };

        for _ in 0..16 {
            let level: Level = rng.sample(&blueprint);
            if level.rooms().len() >= 2 {
                log::debug!(
                    "generated depth {depth} level with {} rooms",
                    level.rooms().len()
                );
                return Ok(level);
            }
        }
        bail!("failed to generate level for depth {depth}")
    }
}

struct Blueprint {
    width: i32,
    height: i32,
    depth: u32,
}

impl Blueprint {
    /// Generate a random room size that fits in the map with a wall rim.
    fn room(&self, rng: &mut (impl Rng + ?Sized)) -> Room {
        let w = rng.gen_range(4..=i32::min(10, self.width - 4));
        let h = rng.gen_range(3..=i32::min(7, self.height - 4));
        let x = rng.gen_range(1..self.width - w - 1);
        let y = rng.gen_range(1..self.height - h - 1);
        Room::new([x, y], [x + w, y + h])
    }

    fn dig_corridor(&self, level: &mut Level, a: IVec2, b: IVec2) {
        let inside = |p: IVec2| {
            p.x > 0 && p.y > 0 && p.x < self.width - 1 && p.y < self.height - 1
        };

        // Prefer running through already dug space to cut fewer tunnels.
        let view: &Level = level;
        let Some((path, _)) = astar(
            &a,
            move |&p| {
                s4::ns(p)
                    .filter(move |&q| inside(q))
                    .map(move |q| (q, if view.is_walkable(q) { 1 } else { 3 }))
            },
            |p| s4::d(p, &b),
            |&p| p == b,
        ) else {
            return;
        };

        for p in path {
            level.set_tile(p, TileKind::Floor);
        }
    }
}

impl Distribution<Level> for Blueprint {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Level {
        let mut ret = Level::new(self.width, self.height);
        ret.set_depth(self.depth);

        let target = rng.gen_range(5..=9);
        for _ in 0..200 {
            if ret.rooms().len() >= target {
                break;
            }

            let room = self.room(rng);
            if ret.rooms().iter().any(|r| r.intersects(&room, 2)) {
                continue;
            }

            for p in room.cells() {
                ret.set_tile(p, TileKind::Floor);
            }
            if let Some(prev) = ret.rooms().last() {
                let a = prev.center();
                self.dig_corridor(&mut ret, a, room.center());
            }
            ret.add_room(room);
        }

        // Wall in all dug space.
        let floor: Vec<IVec2> =
            ret.positions().filter(|&p| ret.is_walkable(p)).collect();
        for p in floor {
            for d in DIR_8 {
                if ret.tile(p + d) == TileKind::Void {
                    ret.set_tile(p + d, TileKind::Wall);
                }
            }
        }

        if let (Some(first), Some(last)) = (ret.rooms().first(), ret.rooms().last())
        {
            let (start, end) = (first.center(), last.center());
            ret.set_start(start);
            ret.set_end(end);
        }

        ret
    }
}

/// Check that every walkable cell of the level is reachable from the start.
pub fn is_connected(level: &Level) -> bool {
    let reached = pathfinding::prelude::bfs_reach(level.start(), |&p| {
        s4::ns(p).filter(|&q| level.is_walkable(q)).collect::<Vec<_>>()
    })
    .count();
    reached == level.positions().filter(|&p| level.is_walkable(p)).count()
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;

    #[test]
    fn generated_levels_are_playable() {
        let mut gen = RoomsAndCorridors::new(123, 60, 36);
        for depth in 1..=5 {
            let level = gen.level(depth).unwrap();
            assert_eq!(level.depth(), depth);
            assert!(level.rooms().len() >= 2);
            assert!(level.is_walkable(level.start()));
            assert!(level.is_walkable(level.end()));
            assert_ne!(level.start(), level.end());
            assert!(is_connected(&level));

            // Map rim is never walkable.
            for p in level.positions() {
                if p.x == 0 || p.y == 0 || p.x == 59 || p.y == 35 {
                    assert!(!level.is_walkable(p));
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = RoomsAndCorridors::new(7, 40, 24).level(3).unwrap();
        let b = RoomsAndCorridors::new(7, 40, 24).level(3).unwrap();
        assert_eq!(a, b);
        let c = RoomsAndCorridors::new(7, 40, 24).level(4).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn tiny_maps_are_rejected() {
        assert!(RoomsAndCorridors::new(1, 8, 40).level(1).is_err());
    }

    #[test]
    fn fixed_level_list() {
        let level = Level::from_ascii("#<.>#").unwrap();
        let mut levels = vec![level];
        let l = levels.level(3).unwrap();
        assert_eq!(l.depth(), 3);
        assert_eq!(l.start(), ivec2(1, 0));
        assert!(Vec::<Level>::new().level(1).is_err());
    }
}
