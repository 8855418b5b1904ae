use anyhow::{bail, Context};
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use util::StrExt;

/// Terrain in a single map cell.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(try_from = "char", into = "char")]
pub enum TileKind {
    /// Bottomless nothing outside the dug-out dungeon.
    #[default]
    Void,
    Wall,
    Floor,
}

use TileKind::*;

impl TileKind {
    pub fn is_walkable(self) -> bool {
        matches!(self, Floor)
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, Wall | Void)
    }
}

impl TryFrom<char> for TileKind {
    type Error = anyhow::Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '~' => Ok(Void),
            '#' => Ok(Wall),
            '.' => Ok(Floor),
            _ => bail!("invalid tile char {value:?}"),
        }
    }
}

impl From<TileKind> for char {
    fn from(value: TileKind) -> Self {
        match value {
            Void => '~',
            Wall => '#',
            Floor => '.',
        }
    }
}

/// Rectangular room, `min` inclusive and `max` exclusive.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub struct Room {
    pub min: IVec2,
    pub max: IVec2,
}

impl Room {
    pub fn new(min: impl Into<IVec2>, max: impl Into<IVec2>) -> Self {
        Room {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn dim(&self) -> IVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> IVec2 {
        self.min + self.dim() / 2
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    /// Rooms overlap when they're closer to each other than `margin`.
    pub fn intersects(&self, other: &Room, margin: i32) -> bool {
        let m = IVec2::splat(margin);
        (self.min - m).cmplt(other.max).all()
            && (other.min - m).cmplt(self.max).all()
    }

    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.min.y..self.max.y)
            .flat_map(move |y| (self.min.x..self.max.x).map(move |x| ivec2(x, y)))
    }
}

/// A single dungeon level.
///
/// Levels are immutable for the duration of a turn and replaced wholesale
/// when the player descends.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Level {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
    rooms: Vec<Room>,
    start: IVec2,
    end: IVec2,
    depth: u32,
}

impl Level {
    /// Create a level filled with void.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "Level::new: empty level");
        Level {
            width,
            height,
            tiles: vec![Void; (width * height) as usize],
            rooms: Vec::new(),
            start: IVec2::ZERO,
            end: IVec2::ZERO,
            depth: 1,
        }
    }

    /// Parse a level from an ASCII map.
    ///
    /// `#` is wall, `.` is floor, `~` and whitespace are void, `<` is the
    /// floor tile where the player enters and `>` is the floor tile of the
    /// exit.
    pub fn from_ascii(map: &str) -> anyhow::Result<Self> {
        let cells: Vec<(IVec2, char)> = map.char_grid().collect();
        let dim = cells
            .iter()
            .fold(IVec2::ZERO, |acc, (p, _)| acc.max(*p + IVec2::ONE));
        if dim.x == 0 || dim.y == 0 {
            bail!("empty level map");
        }

        let mut ret = Level::new(dim.x, dim.y);
        let (mut start, mut end) = (None, None);

        for (p, c) in cells {
            let tile = match c {
                '<' => {
                    start = Some(p);
                    Floor
                }
                '>' => {
                    end = Some(p);
                    Floor
                }
                c => TileKind::try_from(c)
                    .with_context(|| format!("at {}, {}", p.x, p.y))?,
            };
            ret.set_tile(p, tile);
        }

        let Some(start) = start else {
            bail!("level map has no start tile");
        };
        let Some(end) = end else {
            bail!("level map has no end tile");
        };

        ret.start = start;
        ret.end = end;
        Ok(ret)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn dim(&self) -> IVec2 {
        ivec2(self.width, self.height)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    pub fn start(&self) -> IVec2 {
        self.start
    }

    pub fn end(&self) -> IVec2 {
        self.end
    }

    pub fn set_start(&mut self, p: IVec2) {
        self.start = p;
    }

    pub fn set_end(&mut self, p: IVec2) {
        self.end = p;
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Row-major index of a cell, `None` if out of bounds.
    pub fn index(&self, p: IVec2) -> Option<usize> {
        self.contains(p)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    /// Number of cells in the level.
    pub fn area(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Terrain at a position, cells outside the level are void.
    pub fn tile(&self, p: IVec2) -> TileKind {
        self.index(p).map_or(Void, |i| self.tiles[i])
    }

    pub fn set_tile(&mut self, p: IVec2, tile: TileKind) {
        if let Some(i) = self.index(p) {
            self.tiles[i] = tile;
        }
    }

    pub fn is_walkable(&self, p: IVec2) -> bool {
        self.tile(p).is_walkable()
    }

    pub fn blocks_sight(&self, p: IVec2) -> bool {
        self.tile(p).blocks_sight()
    }

    /// Iterate all cell positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| ivec2(x, y)))
    }

    /// Room containing the position, if any.
    pub fn room_at(&self, p: IVec2) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_ascii_level() {
        let level = Level::from_ascii(
            "
            #####
            #<.>#
            #####",
        )
        .unwrap();

        assert_eq!(level.dim(), ivec2(5, 3));
        assert_eq!(level.start(), ivec2(1, 1));
        assert_eq!(level.end(), ivec2(3, 1));
        assert_eq!(level.tile(ivec2(0, 0)), Wall);
        assert_eq!(level.tile(ivec2(2, 1)), Floor);
        assert_eq!(level.tile(ivec2(-1, 1)), Void);
        assert_eq!(level.tile(ivec2(9, 9)), Void);
        assert!(level.is_walkable(ivec2(3, 1)));
        assert!(!level.is_walkable(ivec2(4, 1)));
        assert!(level.blocks_sight(ivec2(20, 20)));
    }

    #[test]
    fn bad_ascii_levels() {
        assert!(Level::from_ascii("").is_err());
        assert!(Level::from_ascii("#.>#").is_err());
        assert!(Level::from_ascii("#<.#").is_err());
        assert!(Level::from_ascii("#<x>#").is_err());
    }

    #[test]
    fn room_geometry() {
        let room = Room::new([2, 2], [6, 5]);
        assert_eq!(room.dim(), ivec2(4, 3));
        assert_eq!(room.center(), ivec2(4, 3));
        assert!(room.contains(ivec2(2, 2)));
        assert!(!room.contains(ivec2(6, 2)));
        assert_eq!(room.cells().count(), 12);

        assert!(room.intersects(&Room::new([6, 2], [8, 4]), 1));
        assert!(!room.intersects(&Room::new([7, 2], [9, 4]), 1));
    }
}
