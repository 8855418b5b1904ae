use serde::{Deserialize, Serialize};
use world::Level;

use crate::{prelude::*, EnemyId};

/// What is blocking a map cell.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum Occupant {
    #[default]
    Empty,
    /// Static terrain that can't be entered.
    Terrain,
    Player,
    Enemy(EnemyId),
}

impl Occupant {
    pub fn is_actor(self) -> bool {
        matches!(self, Occupant::Player | Occupant::Enemy(_))
    }
}

/// Grid of blocked cells for the current level.
///
/// Terrain blocks are set when the grid is built. Actor cells change only
/// when a move is committed or when dead actors are removed at cleanup.
/// No cell ever holds more than one actor.
#[derive(Clone, Default, Debug)]
pub struct Occupancy {
    width: i32,
    height: i32,
    cells: Vec<Occupant>,
}

impl Occupancy {
    /// Build a grid with the static terrain blockers of a level.
    pub fn new(level: &Level) -> Self {
        let cells = level
            .positions()
            .map(|p| {
                if level.is_walkable(p) {
                    Occupant::Empty
                } else {
                    Occupant::Terrain
                }
            })
            .collect();

        Occupancy {
            width: level.width(),
            height: level.height(),
            cells,
        }
    }

    fn index(&self, p: IVec2) -> Option<usize> {
        (p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    /// Occupant of a cell, cells outside the grid count as terrain.
    pub fn occupant(&self, p: IVec2) -> Occupant {
        self.index(p).map_or(Occupant::Terrain, |i| self.cells[i])
    }

    pub fn occupied(&self, p: IVec2) -> bool {
        self.occupant(p) != Occupant::Empty
    }

    pub fn enemy_at(&self, p: IVec2) -> Option<EnemyId> {
        match self.occupant(p) {
            Occupant::Enemy(id) => Some(id),
            _ => None,
        }
    }

    /// Mark an empty cell as occupied by an actor.
    ///
    /// Returns false and leaves the grid unchanged if the cell is taken.
    pub fn place(&mut self, p: IVec2, occupant: Occupant) -> bool {
        debug_assert!(occupant.is_actor(), "place: {occupant:?} is not an actor");
        match self.index(p) {
            Some(i) if self.cells[i] == Occupant::Empty => {
                self.cells[i] = occupant;
                true
            }
            _ => false,
        }
    }

    /// Commit an actor's move from one cell to another.
    pub fn move_occupant(&mut self, from: IVec2, to: IVec2) {
        let (Some(i), Some(j)) = (self.index(from), self.index(to)) else {
            debug_assert!(false, "move_occupant: {from} -> {to} out of bounds");
            return;
        };
        debug_assert!(self.cells[i].is_actor(), "move_occupant: no actor at {from}");
        debug_assert!(
            self.cells[j] == Occupant::Empty,
            "move_occupant: {to} is already occupied"
        );
        self.cells[j] = std::mem::take(&mut self.cells[i]);
    }

    /// Free a cell held by an actor.
    pub fn clear(&mut self, p: IVec2) {
        if let Some(i) = self.index(p) {
            if self.cells[i].is_actor() {
                self.cells[i] = Occupant::Empty;
            }
        }
    }

    /// Iterate all cells that hold an actor.
    pub fn actors(&self) -> impl Iterator<Item = (IVec2, Occupant)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, &o)| {
            let i = i as i32;
            o.is_actor()
                .then(|| (ivec2(i % self.width, i / self.width), o))
        })
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    fn room() -> Level {
        Level::from_ascii(
            "
            ######
            #<...#
            #....#
            #...>#
            ######",
        )
        .unwrap()
    }

    #[test]
    fn terrain_and_bounds() {
        let occ = Occupancy::new(&room());
        assert_eq!(occ.occupant(ivec2(0, 0)), Occupant::Terrain);
        assert_eq!(occ.occupant(ivec2(-1, 2)), Occupant::Terrain);
        assert_eq!(occ.occupant(ivec2(99, 2)), Occupant::Terrain);
        assert!(!occ.occupied(ivec2(2, 2)));
    }

    #[test]
    fn place_and_move() {
        let mut occ = Occupancy::new(&room());
        assert!(occ.place(ivec2(1, 1), Occupant::Player));
        assert!(occ.place(ivec2(2, 2), Occupant::Enemy(EnemyId(1))));
        assert!(!occ.place(ivec2(2, 2), Occupant::Enemy(EnemyId(2))));
        assert!(!occ.place(ivec2(0, 0), Occupant::Enemy(EnemyId(2))));

        occ.move_occupant(ivec2(2, 2), ivec2(3, 2));
        assert!(!occ.occupied(ivec2(2, 2)));
        assert_eq!(occ.enemy_at(ivec2(3, 2)), Some(EnemyId(1)));

        occ.clear(ivec2(3, 2));
        assert!(!occ.occupied(ivec2(3, 2)));
        // Clearing terrain does nothing.
        occ.clear(ivec2(0, 0));
        assert!(occ.occupied(ivec2(0, 0)));
        assert_eq!(occ.actors().count(), 1);
    }

    #[quickcheck]
    fn random_walks_never_stack(moves: Vec<(u8, u8)>) -> bool {
        let level = room();
        let mut occ = Occupancy::new(&level);
        let mut actors = vec![ivec2(1, 1), ivec2(4, 1), ivec2(1, 3)];
        for (i, &p) in actors.iter().enumerate() {
            occ.place(p, Occupant::Enemy(EnemyId(i as u64)));
        }

        for (who, dir) in moves {
            let who = who as usize % actors.len();
            let to = actors[who] + DIR_4[dir as usize % 4];
            if !occ.occupied(to) {
                occ.move_occupant(actors[who], to);
                actors[who] = to;
            }
        }

        let mut seen = HashSet::default();
        actors.iter().all(|&p| seen.insert(p) && occ.occupant(p).is_actor())
            && occ.actors().count() == actors.len()
    }
}
