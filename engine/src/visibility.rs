use fov::{Falloff, RaycastFov};
use world::{Level, Settings};

use crate::prelude::*;

/// Per-cell brightness of what the player can currently see.
///
/// There is no memory of previously seen cells, every recompute starts from
/// darkness.
#[derive(Clone, Default, Debug)]
pub struct Visibility {
    fov: RaycastFov,
    width: i32,
    height: i32,
    light: Vec<f32>,
}

impl Visibility {
    pub fn new(settings: &Settings) -> Self {
        Visibility {
            fov: RaycastFov::new(Falloff::new(
                settings.bright_radius,
                settings.dim_radius,
            )),
            ..Default::default()
        }
    }

    /// Rescan visibility from the origin cell.
    pub fn recompute(&mut self, level: &Level, origin: IVec2) {
        self.width = level.width();
        self.height = level.height();
        self.light.clear();
        self.light.resize(level.area(), 0.0);

        for (p, b) in self.fov.scan(origin, |p: IVec2| level.blocks_sight(p)) {
            if let Some(i) = level.index(p) {
                self.light[i] = b;
            }
        }
    }

    /// Brightness of a cell in `[0, 1]`.
    pub fn at(&self, p: IVec2) -> f32 {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return 0.0;
        }
        self.light
            .get((p.y * self.width + p.x) as usize)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_visible(&self, p: IVec2) -> bool {
        self.at(p) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    fn open_field() -> Level {
        let mut level = Level::new(40, 40);
        for p in level.positions().collect::<Vec<_>>() {
            level.set_tile(p, world::TileKind::Floor);
        }
        level
    }

    #[test]
    fn wall_shadows_cells_behind_it() {
        let level = Level::from_ascii(
            "
            ###############
            #.............#
            #.<..#.......>#
            #.............#
            ###############",
        )
        .unwrap();

        let mut vis = Visibility::new(&Settings::default());
        vis.recompute(&level, level.start());

        assert_eq!(vis.at(ivec2(2, 2)), 1.0);
        assert_eq!(vis.at(ivec2(4, 2)), 1.0);
        // The wall itself is seen.
        assert!(vis.is_visible(ivec2(5, 2)));
        // Straight behind it is not, even though it's close.
        assert_eq!(vis.at(ivec2(6, 2)), 0.0);
        assert_eq!(vis.at(ivec2(8, 2)), 0.0);
        // Outer walls block the view out.
        assert_eq!(vis.at(ivec2(2, 5)), 0.0);
    }

    #[test]
    fn recompute_forgets_old_view() {
        let level = open_field();
        let mut vis = Visibility::new(&Settings::default());
        vis.recompute(&level, ivec2(5, 5));
        assert!(vis.is_visible(ivec2(6, 5)));
        vis.recompute(&level, ivec2(30, 30));
        assert!(!vis.is_visible(ivec2(6, 5)));
        assert_eq!(vis.at(ivec2(30, 30)), 1.0);
    }

    #[quickcheck]
    fn visibility_stays_within_dim_radius(x: u8, y: u8) -> bool {
        let level = open_field();
        let origin = ivec2(20, 20);
        let mut vis = Visibility::new(&Settings::default());
        vis.recompute(&level, origin);

        let p = ivec2(x as i32 % 40, y as i32 % 40);
        let d = (p - origin).as_vec2().length();
        let b = vis.at(p);

        (0.0..=1.0).contains(&b)
            && (d < 9.0 || b == 0.0)
            && (d >= 4.0 || b == 1.0)
    }
}
