use crate::{perimeter, Falloff};

/// Integer line from the origin towards an endpoint offset.
///
/// Yields the cells after the origin up to and including the endpoint.
#[derive(Clone, Debug)]
pub struct Ray {
    p: [i32; 2],
    end: [i32; 2],
    step: [i32; 2],
    delta: [i32; 2],
    err: i32,
}

impl Ray {
    pub fn new(end: [i32; 2]) -> Self {
        let delta = [end[0].abs(), -end[1].abs()];
        Ray {
            p: [0, 0],
            end,
            step: [end[0].signum(), end[1].signum()],
            delta,
            err: delta[0] + delta[1],
        }
    }
}

impl Iterator for Ray {
    type Item = [i32; 2];

    fn next(&mut self) -> Option<Self::Item> {
        if self.p == self.end {
            return None;
        }

        let e2 = 2 * self.err;
        if e2 >= self.delta[1] {
            self.err += self.delta[1];
            self.p[0] += self.step[0];
        }
        if e2 <= self.delta[0] {
            self.err += self.delta[0];
            self.p[1] += self.step[1];
        }
        Some(self.p)
    }
}

/// Raycasting field of view with distance-based light falloff.
///
/// Rays are traced from the origin to every cell on the square perimeter
/// enclosing the dim radius. Each ray is doubled with the two endpoints next
/// to it across the ray's minor axis, so that rays that graze a diagonal wall
/// corner still get a chance to pass on either side. A ray stops at the
/// first blocking cell, the blocking cell itself is lit. Cells hit by
/// multiple rays keep the brightest value.
#[derive(Copy, Clone, Default, Debug)]
pub struct RaycastFov {
    pub falloff: Falloff,
}

impl RaycastFov {
    pub fn new(falloff: Falloff) -> Self {
        RaycastFov { falloff }
    }

    /// Scan visibility from `origin` given a cell blocking predicate.
    ///
    /// Returns every cell with nonzero brightness. The origin cell is always
    /// fully lit.
    pub fn scan<V>(&self, origin: V, blocks: impl Fn(V) -> bool) -> Vec<(V, f32)>
    where
        V: From<[i32; 2]> + Into<[i32; 2]> + Copy,
    {
        let reach = self.falloff.reach() as i32;
        let side = (2 * reach + 1) as usize;
        let mut light = vec![0.0f32; side * side];

        let idx = |[x, y]: [i32; 2]| -> Option<usize> {
            if x.abs() > reach || y.abs() > reach {
                None
            } else {
                Some((y + reach) as usize * side + (x + reach) as usize)
            }
        };

        let o: [i32; 2] = origin.into();
        let at = |[x, y]: [i32; 2]| V::from([o[0] + x, o[1] + y]);

        if let Some(i) = idx([0, 0]) {
            light[i] = 1.0;
        }

        for end in perimeter(reach as u32) {
            let minor = if end[0].abs() >= end[1].abs() {
                [0, 1]
            } else {
                [1, 0]
            };

            for k in [0, -1, 1] {
                let end = [end[0] + k * minor[0], end[1] + k * minor[1]];

                for p in Ray::new(end) {
                    let dist = ((p[0] * p[0] + p[1] * p[1]) as f32).sqrt();
                    let b = self.falloff.brightness(dist);
                    if b <= 0.0 {
                        break;
                    }

                    if let Some(i) = idx(p) {
                        light[i] = light[i].max(b);
                    }

                    if blocks(at(p)) {
                        break;
                    }
                }
            }
        }

        let mut ret = Vec::new();
        for y in -reach..=reach {
            for x in -reach..=reach {
                if let Some(i) = idx([x, y]) {
                    if light[i] > 0.0 {
                        ret.push((at([x, y]), light[i]));
                    }
                }
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn lit(
        fov: &RaycastFov,
        walls: &BTreeSet<[i32; 2]>,
        origin: [i32; 2],
    ) -> BTreeMap<[i32; 2], f32> {
        fov.scan(origin, |p: [i32; 2]| walls.contains(&p))
            .into_iter()
            .collect()
    }

    #[test]
    fn ray_reaches_endpoint() {
        assert_eq!(Ray::new([3, 0]).collect::<Vec<_>>(), vec![
            [1, 0],
            [2, 0],
            [3, 0]
        ]);
        assert_eq!(Ray::new([-2, -2]).collect::<Vec<_>>(), vec![
            [-1, -1],
            [-2, -2]
        ]);
        assert_eq!(Ray::new([0, 0]).count(), 0);
        assert_eq!(Ray::new([7, 3]).last(), Some([7, 3]));
    }

    #[test]
    fn open_field() {
        let fov = RaycastFov::new(Falloff::new(4.0, 9.0));
        let light = lit(&fov, &Default::default(), [0, 0]);

        assert_eq!(light[&[0, 0]], 1.0);
        assert_eq!(light[&[3, 0]], 1.0);
        assert_eq!(light[&[2, 2]], 1.0);
        assert!(light[&[6, 0]] < 1.0 && light[&[6, 0]] > 0.0);
        // Exactly at dim radius is dark.
        assert!(!light.contains_key(&[9, 0]));
        assert!(!light.contains_key(&[7, 7]));

        // Every lit cell is within the dim radius.
        assert!(light
            .keys()
            .all(|[x, y]| ((x * x + y * y) as f32).sqrt() < 9.0));
    }

    #[test]
    fn walls_cast_shadows() {
        let fov = RaycastFov::new(Falloff::new(4.0, 9.0));
        let walls: BTreeSet<[i32; 2]> =
            (-3..=3).map(|y| [2, y]).collect();
        let light = lit(&fov, &walls, [0, 0]);

        // Wall itself is visible.
        assert_eq!(light[&[2, 0]], 1.0);
        // Directly behind it is not.
        assert!(!light.contains_key(&[3, 0]));
        assert!(!light.contains_key(&[5, 0]));
        // Other directions are unaffected.
        assert_eq!(light[&[-3, 0]], 1.0);
    }

    #[test]
    fn single_pillar_shadow() {
        let fov = RaycastFov::new(Falloff::new(4.0, 9.0));
        let walls: BTreeSet<[i32; 2]> = [[2, 0]].into_iter().collect();
        let light = lit(&fov, &walls, [0, 0]);
        assert!(!light.contains_key(&[4, 0]));
        assert!(light.contains_key(&[4, 2]));
    }
}
