/// Light intensity as a function of distance from the viewer.
///
/// Full brightness inside `bright_radius`, linear fade to zero at
/// `dim_radius`, darkness beyond.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Falloff {
    pub bright_radius: f32,
    pub dim_radius: f32,
}

impl Default for Falloff {
    fn default() -> Self {
        Falloff {
            bright_radius: 4.0,
            dim_radius: 9.0,
        }
    }
}

impl Falloff {
    pub fn new(bright_radius: f32, dim_radius: f32) -> Self {
        Falloff {
            bright_radius,
            dim_radius,
        }
    }

    pub fn brightness(&self, dist: f32) -> f32 {
        if dist < self.bright_radius {
            1.0
        } else if dist >= self.dim_radius {
            0.0
        } else {
            let span = self.dim_radius - self.bright_radius;
            (1.0 - (dist - self.bright_radius) / span).clamp(0.0, 1.0)
        }
    }

    /// Integer radius of the square that encloses every lit cell.
    pub fn reach(&self) -> u32 {
        self.dim_radius.max(0.0).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_curve() {
        let f = Falloff::new(4.0, 9.0);
        assert_eq!(f.brightness(0.0), 1.0);
        assert_eq!(f.brightness(3.99), 1.0);
        assert_eq!(f.brightness(4.0), 1.0);
        assert!((f.brightness(6.5) - 0.5).abs() < 1e-6);
        assert_eq!(f.brightness(9.0), 0.0);
        assert_eq!(f.brightness(12.0), 0.0);
        assert_eq!(f.reach(), 9);
    }

    #[test]
    fn degenerate_falloff_is_a_hard_edge() {
        let f = Falloff::new(5.0, 5.0);
        assert_eq!(f.brightness(4.9), 1.0);
        assert_eq!(f.brightness(5.0), 0.0);
    }
}
