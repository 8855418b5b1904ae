use glam::IVec2;

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// 4 directions, clock face order.
pub const DIR_4: [IVec2; 4] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 0]),
];

/// Square grid with 4-connectivity.
pub mod s4 {
    use glam::IVec2;

    use super::{VecExt, DIR_4};

    pub const DIR: [IVec2; 4] = DIR_4;

    /// Cardinal neighbors of a point.
    pub fn ns(p: IVec2) -> impl Iterator<Item = IVec2> {
        DIR.into_iter().map(move |d| p + d)
    }

    /// Distance metric for 4-connected grid.
    pub fn d(a: &IVec2, b: &IVec2) -> i32 {
        (*b - *a).taxi_len()
    }
}

pub trait VecExt: Sized + Default {
    /// Absolute size of vector in taxicab metric.
    fn taxi_len(&self) -> i32;

    /// Absolute size of vector in chessboard metric.
    fn chess_len(&self) -> i32;

    /// Vec points to an adjacent cell, left, right, up or down.
    fn is_adjacent(&self) -> bool {
        self.taxi_len() == 1
    }

    /// Vec points to one of the 8 cells surrounding the origin.
    fn is_neighbor_8(&self) -> bool {
        self.chess_len() == 1
    }
}

impl VecExt for IVec2 {
    fn taxi_len(&self) -> i32 {
        self[0].abs() + self[1].abs()
    }

    fn chess_len(&self) -> i32 {
        self[0].abs().max(self[1].abs())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;

    #[test]
    fn metrics() {
        assert_eq!(ivec2(3, -4).taxi_len(), 7);
        assert_eq!(ivec2(3, -4).chess_len(), 4);
        assert!(ivec2(0, -1).is_adjacent());
        assert!(!ivec2(1, 1).is_adjacent());
        assert!(ivec2(1, 1).is_neighbor_8());
        assert_eq!(s4::ns(ivec2(1, 1)).count(), 4);
        assert_eq!(s4::d(&ivec2(0, 0), &ivec2(-2, 3)), 5);
    }
}
