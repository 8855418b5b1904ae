use std::{fmt, str::FromStr};

use anyhow::bail;
use rand::prelude::*;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::parse::{end, number, symbol};

/// Dice roll expression like `2d6+1`.
///
/// A bare number is a constant roll. Dice with zero count or zero sides
/// contribute nothing, so `0d0+5` always rolls 5.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl Dice {
    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Dice {
            count,
            sides,
            bonus,
        }
    }

    /// Dice that always roll the given value.
    pub const fn constant(n: i32) -> Self {
        Dice::new(0, 0, n)
    }

    pub fn min(&self) -> i32 {
        if self.sides == 0 {
            self.bonus
        } else {
            self.count as i32 + self.bonus
        }
    }

    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.bonus
    }
}

impl Distribution<i32> for Dice {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let mut ret = self.bonus;
        if self.sides > 0 {
            for _ in 0..self.count {
                ret += rng.gen_range(1..=self.sides) as i32;
            }
        }
        ret
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 || self.sides == 0 {
            return write!(f, "{}", self.bonus);
        }

        write!(f, "{}d{}", self.count, self.sides)?;
        if self.bonus > 0 {
            write!(f, "+{}", self.bonus)?;
        } else if self.bonus < 0 {
            write!(f, "{}", self.bonus)?;
        }
        Ok(())
    }
}

impl FromStr for Dice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn parse(s: &str) -> crate::parse::Result<Dice> {
            let s = s.trim();
            let (lead, rest) = number(s)?;

            // Bare constant.
            if let Ok((_, rest)) = end(rest) {
                return Ok((Dice::constant(lead), rest));
            }

            let (_, rest) = symbol("d", rest)?;
            let (sides, rest) = number(rest)?;

            let (bonus, rest) = if let Ok((_, rest)) = symbol("+", rest) {
                number(rest)?
            } else if let Ok((_, rest)) = symbol("-", rest) {
                let (n, rest) = number(rest)?;
                (-n, rest)
            } else {
                (0, rest)
            };
            let (_, rest) = end(rest)?;

            Ok((Dice::new(lead as u32, sides as u32, bonus), rest))
        }

        match parse(s) {
            Ok((dice, _)) => Ok(dice),
            Err(_) => bail!("bad dice expression {s:?}"),
        }
    }
}
