//! Enemy decision making

use rand::{seq::SliceRandom, Rng};
use world::{Level, StatusKind};

use crate::{prelude::*, Body, Enemy, Occupancy, Visibility};

/// Decide what an enemy wants to do this turn.
///
/// Enemies that stand in the player's light know where the player is and
/// close in to attack, the rest wander randomly. Only reads the world, moves
/// planned by earlier enemies are already committed to the occupancy grid.
pub fn plan(
    enemy: &Enemy,
    player: &Body,
    level: &Level,
    occupancy: &Occupancy,
    visibility: &Visibility,
    rng: &mut (impl Rng + ?Sized),
) -> Action {
    let body = enemy.body();

    if body.is_moving() {
        return Action::None;
    }

    if body.has_status(StatusKind::Stun) {
        log::trace!("enemy {} is stunned", enemy.id());
        return Action::Wait;
    }

    let pos = body.pos();
    let can_enter = |p: IVec2| level.is_walkable(p) && !occupancy.occupied(p);

    if visibility.is_visible(pos) {
        let delta = player.pos() - pos;

        if delta.is_neighbor_8() {
            log::trace!("enemy {} attacks player at {}", enemy.id(), player.pos());
            return Action::Attack {
                tile: player.pos(),
                target: None,
            };
        }

        let (horizontal, vertical) = (
            ivec2(delta.x.signum(), 0),
            ivec2(0, delta.y.signum()),
        );

        // Close in along the longer axis, fall back to the other one.
        let (primary, secondary) = if delta.x.abs() > delta.y.abs()
            || (delta.x.abs() == delta.y.abs() && delta.x != 0)
        {
            (horizontal, vertical)
        } else {
            (vertical, horizontal)
        };

        for step in [primary, secondary] {
            if step != IVec2::ZERO && can_enter(pos + step) {
                log::trace!("enemy {} chases to {}", enemy.id(), pos + step);
                return Action::Move(pos + step);
            }
        }
        return Action::Wait;
    }

    // Wander.
    let Some(&dir) = DIR_4.choose(rng) else {
        return Action::Wait;
    };
    if can_enter(pos + dir) {
        Action::Move(pos + dir)
    } else {
        Action::Wait
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use util::GameRng;
    use world::{Data, EnemyKind, Settings};

    use super::*;
    use crate::{occupancy::Occupant, EnemyId};

    struct Setup {
        level: Level,
        occupancy: Occupancy,
        visibility: Visibility,
        player: Body,
    }

    fn setup(map: &str) -> Setup {
        let level = Level::from_ascii(map).unwrap();
        let mut occupancy = Occupancy::new(&level);
        let player = Body::new(level.start(), 10);
        occupancy.place(player.pos(), Occupant::Player);
        let mut visibility = Visibility::new(&Settings::default());
        visibility.recompute(&level, player.pos());
        Setup {
            level,
            occupancy,
            visibility,
            player,
        }
    }

    fn enemy(s: &mut Setup, id: u64, pos: IVec2) -> Enemy {
        let stats = Data::default().monster(EnemyKind::Goblin);
        assert!(s.occupancy.place(pos, Occupant::Enemy(EnemyId(id))));
        Enemy::new(EnemyId(id), EnemyKind::Goblin, &stats, pos)
    }

    fn plan_in(s: &Setup, e: &Enemy, seed: u64) -> Action {
        let mut rng = GameRng::seed_from_u64(seed);
        plan(e, &s.player, &s.level, &s.occupancy, &s.visibility, &mut rng)
    }

    const ROOM: &str = "
        ##########
        #........#
        #........#
        #...<....#
        #........#
        #.......>#
        ##########";

    #[test]
    fn adjacent_enemy_attacks() {
        let mut s = setup(ROOM);
        let p = s.player.pos();
        for (i, d) in DIR_8.into_iter().enumerate() {
            let e = enemy(&mut s, i as u64, p + d);
            assert_eq!(plan_in(&s, &e, 1), Action::Attack {
                tile: p,
                target: None
            });
        }
    }

    #[test]
    fn chase_along_longer_axis() {
        let mut s = setup(ROOM);
        let p = s.player.pos();

        let e = enemy(&mut s, 1, p + ivec2(3, 1));
        assert_eq!(plan_in(&s, &e, 1), Action::Move(p + ivec2(2, 1)));

        let e = enemy(&mut s, 2, p + ivec2(-1, -2));
        assert_eq!(plan_in(&s, &e, 1), Action::Move(p + ivec2(-1, -1)));

        // Ties go horizontal.
        let e = enemy(&mut s, 3, p + ivec2(-2, 2));
        assert_eq!(plan_in(&s, &e, 1), Action::Move(p + ivec2(-1, 2)));
    }

    #[test]
    fn blocked_chase_tries_other_axis() {
        let mut s = setup(ROOM);
        let p = s.player.pos();

        enemy(&mut s, 1, p + ivec2(2, 1));
        let e = enemy(&mut s, 2, p + ivec2(3, 1));
        assert_eq!(plan_in(&s, &e, 1), Action::Move(p + ivec2(3, 0)));

        // Straight line with the way blocked, no sideways step.
        let e = enemy(&mut s, 3, p + ivec2(-3, 0));
        enemy(&mut s, 4, p + ivec2(-2, 0));
        assert_eq!(plan_in(&s, &e, 1), Action::Wait);
    }

    #[test]
    fn moving_and_stunned_enemies() {
        let mut s = setup(ROOM);
        let p = s.player.pos();

        let mut e = enemy(&mut s, 1, p + ivec2(1, 0));
        e.body.apply_status(StatusKind::Stun, 1, 0);
        assert_eq!(plan_in(&s, &e, 1), Action::Wait);

        let mut e = enemy(&mut s, 2, p + ivec2(3, 0));
        s.occupancy.move_occupant(p + ivec2(3, 0), p + ivec2(3, 1));
        e.body.begin_move(p + ivec2(3, 1), 1.0);
        assert_eq!(plan_in(&s, &e, 1), Action::None);
    }

    #[test]
    fn unseen_enemy_wanders() {
        // Open strip, player at the left edge and enemy out of sight.
        let mut s = setup(
            "
            <..........>....
            ................",
        );
        assert_eq!(s.player.pos(), ivec2(0, 0));
        let e = enemy(&mut s, 1, ivec2(10, 0));
        assert!(!s.visibility.is_visible(ivec2(10, 0)));

        let mut seen = HashSet::default();
        for seed in 0..200 {
            let act = plan_in(&s, &e, seed);
            assert!(
                [
                    Action::Move(ivec2(9, 0)),
                    Action::Move(ivec2(11, 0)),
                    Action::Move(ivec2(10, 1)),
                    Action::Wait
                ]
                .contains(&act),
                "unexpected {act:?}"
            );
            seen.insert(format!("{act:?}"));
        }
        // Stepping north runs off the map and turns into a wait.
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn boxed_in_enemy_waits() {
        let mut s = setup(
            "
            <...####....
            ....#..#...>
            ....####....",
        );
        let e = enemy(&mut s, 1, ivec2(5, 1));
        enemy(&mut s, 2, ivec2(6, 1));
        for seed in 0..20 {
            assert_eq!(plan_in(&s, &e, seed), Action::Wait);
        }
    }
}
