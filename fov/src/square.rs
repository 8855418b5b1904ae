/// Points on the perimeter of a square with the given radius.
///
/// For each square with radius `r` (distance from origin cell to cell on
/// square perimeter along a coordinate axis), there are `8r` perimeter
/// points. The points are indexed starting from the bottom right (r, r)
/// corner and going counterclockwise.
///
/// ```notrust
/// |-----+-----+-----|
/// | 4   | 3   | 2   |
/// |-----+-----+-----|
/// | 5   | 0,0 | 1   |
/// |-----+-----+-----|
/// | 6   | 7   | 0   |
/// |-----+-----+-----|
/// ```
///
/// Radius zero yields the origin only.
pub fn perimeter(radius: u32) -> impl Iterator<Item = [i32; 2]> {
    let r = radius as i32;
    let len = if r == 0 { 1 } else { 8 * r };

    (0..len).map(move |index| {
        if r == 0 {
            return [0, 0];
        }

        let quadrant = index / (2 * r);
        let a = index % (2 * r);

        match quadrant {
            0 => [r, r - a],
            1 => [r - a, -r],
            2 => [-r, a - r],
            3 => [a - r, r],
            _ => unreachable!(),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn perimeter_cells() {
        assert_eq!(perimeter(0).collect::<Vec<_>>(), vec![[0, 0]]);

        for r in 1..6 {
            let cells: BTreeSet<[i32; 2]> = perimeter(r).collect();
            // No duplicates.
            assert_eq!(cells.len(), 8 * r as usize);
            // Every cell is exactly on the square edge.
            assert!(cells
                .iter()
                .all(|[x, y]| x.abs().max(y.abs()) == r as i32));
        }
    }
}
