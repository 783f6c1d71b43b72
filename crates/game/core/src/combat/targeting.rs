//! Deterministic slot targeting.
//!
//! ```text
//!  front row   0 1 2        attacker in front slot s:  s+3, other back, 0 1 2
//!  back row    3 4 5        attacker in back slot s:   s-3, other front, 3 4 5
//! ```

use crate::config::GameConfig;

use super::Team;

const ROW: usize = GameConfig::ROW_SIZE;

/// Preference order of enemy slots for an attacker standing in `slot`.
///
/// Always a permutation of `0..6`. Out-of-range slots wrap.
pub fn attack_order(slot: usize) -> [usize; GameConfig::TEAM_SIZE] {
    let slot = slot % GameConfig::TEAM_SIZE;
    let (mirrored, mirror_row, own_row) = if slot < ROW {
        (slot + ROW, ROW, 0)
    } else {
        (slot - ROW, 0, ROW)
    };

    let mut order = [0; GameConfig::TEAM_SIZE];
    order[0] = mirrored;
    let mut next = 1;
    for candidate in (mirror_row..mirror_row + ROW).filter(|&c| c != mirrored) {
        order[next] = candidate;
        next += 1;
    }
    for candidate in own_row..own_row + ROW {
        order[next] = candidate;
        next += 1;
    }
    order
}

/// First living enemy in the attacker's preference order.
pub fn select_target(enemies: &Team, attacker_slot: usize) -> Option<usize> {
    attack_order(attacker_slot)
        .into_iter()
        .find(|&slot| enemies.is_alive(slot))
}
