use glam::{ivec2, IVec2};

pub trait StrExt {
    fn capitalize(&self) -> String;

    /// Get the smallest common indentation depth of nonempty lines of text.
    ///
    /// Both tabs and spaces are treated as a single unit of indentation.
    fn indentation(&self) -> usize;

    /// Return non-whitespace chars from a block of text mapped to their
    /// coordinates.
    ///
    /// The text is trimmed so that the result set will have a minimum x
    /// coordinate and a minimum y coordinate at 0.
    fn char_grid(&self) -> impl Iterator<Item = (IVec2, char)> + '_;
}

impl StrExt for str {
    fn capitalize(&self) -> String {
        let mut chars = self.chars();
        match chars.next() {
            None => String::new(),
            Some(c) => c.to_uppercase().chain(chars).collect(),
        }
    }

    fn indentation(&self) -> usize {
        self.lines()
            .filter(|a| !a.trim().is_empty())
            .map(|a| a.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0)
    }

    fn char_grid(&self) -> impl Iterator<Item = (IVec2, char)> + '_ {
        let x_skip = self.indentation();

        self.lines()
            .skip_while(|a| a.trim().is_empty())
            .enumerate()
            .flat_map(move |(y, line)| {
                line.chars()
                    .skip(x_skip)
                    .enumerate()
                    .filter(|(_, c)| !c.is_whitespace())
                    .map(move |(x, c)| (ivec2(x as i32, y as i32), c))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_grid() {
        let grid: Vec<(IVec2, char)> = "
            ##
             .#"
        .char_grid()
        .collect();

        assert_eq!(
            grid,
            vec![
                (ivec2(0, 0), '#'),
                (ivec2(1, 0), '#'),
                (ivec2(1, 1), '.'),
                (ivec2(2, 1), '#'),
            ]
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!("goblin".capitalize(), "Goblin");
        assert_eq!("".capitalize(), "");
    }
}
