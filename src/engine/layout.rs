//! Betting layout geometry.
//!
//! The board is twelve rows of three: row `r` holds `3r+1, 3r+2, 3r+3`.
//! Columns run down the board and pay 2:1, dozens are four-row blocks.

use crate::engine::pocket::{Pocket, WheelKind, BLACK_NUMBERS, DOUBLE_ZERO, RED_NUMBERS, ZERO};
use crate::engine::types::BetCategory;
use std::collections::BTreeSet;

pub const ROWS: u8 = 12;

fn set<I: IntoIterator<Item = u8>>(numbers: I) -> BTreeSet<Pocket> {
    numbers.into_iter().map(Pocket::Number).collect()
}

pub fn straight(pocket: Pocket) -> BTreeSet<Pocket> {
    BTreeSet::from([pocket])
}

/// Three numbers of board row `row` (0-based).
pub fn street(row: u8) -> Option<BTreeSet<Pocket>> {
    (row < ROWS).then(|| set((1..=3).map(|i| row * 3 + i)))
}

/// Rows `row` and `row + 1`.
pub fn six_line(row: u8) -> Option<BTreeSet<Pocket>> {
    (row < ROWS - 1).then(|| set((1..=6).map(|i| row * 3 + i)))
}

/// Square with `top_left` as its lowest number.
pub fn corner(top_left: u8) -> Option<BTreeSet<Pocket>> {
    let valid = (1..=32).contains(&top_left) && top_left % 3 != 0;
    valid.then(|| set([top_left, top_left + 1, top_left + 3, top_left + 4]))
}

/// Column 0, 1 or 2 (the column of 1, 2 or 3 respectively).
pub fn column(index: u8) -> Option<BTreeSet<Pocket>> {
    (index < 3).then(|| set((0..ROWS).map(|row| row * 3 + index + 1)))
}

/// Dozen 0, 1 or 2 (1-12, 13-24, 25-36).
pub fn dozen(index: u8) -> Option<BTreeSet<Pocket>> {
    (index < 3).then(|| set((1..=12).map(|i| index * 12 + i)))
}

/// Two pockets sharing an edge on the layout, zeros included.
pub fn split(a: Pocket, b: Pocket, wheel: WheelKind) -> Option<BTreeSet<Pocket>> {
    let targets = BTreeSet::from([a, b]);
    legal_spots(BetCategory::Split, wheel)
        .contains(&targets)
        .then_some(targets)
}

/// Fixed target set of an even-money bet. `None` for inside categories.
pub fn outside_targets(category: BetCategory) -> Option<BTreeSet<Pocket>> {
    let targets = match category {
        BetCategory::Red => set(RED_NUMBERS),
        BetCategory::Black => set(BLACK_NUMBERS),
        BetCategory::Odd => set((1..=36).filter(|n| n % 2 == 1)),
        BetCategory::Even => set((1..=36).filter(|n| n % 2 == 0)),
        BetCategory::Low => set(1..=18),
        BetCategory::High => set(19..=36),
        _ => return None,
    };
    Some(targets)
}

/// Every legal target set for `category` on `wheel`.
pub fn legal_spots(category: BetCategory, wheel: WheelKind) -> Vec<BTreeSet<Pocket>> {
    let american = wheel == WheelKind::American;
    match category {
        BetCategory::Straight => wheel.sequence().iter().map(|p| straight(*p)).collect(),
        BetCategory::Split => {
            let mut spots = Vec::new();
            for n in 1..=36u8 {
                if n % 3 != 0 {
                    spots.push(set([n, n + 1]));
                }
                if n <= 33 {
                    spots.push(set([n, n + 3]));
                }
            }
            if american {
                spots.push(BTreeSet::from([ZERO, Pocket::Number(1)]));
                spots.push(BTreeSet::from([ZERO, Pocket::Number(2)]));
                spots.push(BTreeSet::from([DOUBLE_ZERO, Pocket::Number(2)]));
                spots.push(BTreeSet::from([DOUBLE_ZERO, Pocket::Number(3)]));
                spots.push(BTreeSet::from([ZERO, DOUBLE_ZERO]));
            } else {
                for n in 1..=3 {
                    spots.push(set([0, n]));
                }
            }
            spots
        }
        BetCategory::Street => {
            let mut spots: Vec<_> = (0..ROWS).filter_map(street).collect();
            if american {
                spots.push(set([0, 1, 2]));
                spots.push(BTreeSet::from([ZERO, DOUBLE_ZERO, Pocket::Number(2)]));
                spots.push(BTreeSet::from([DOUBLE_ZERO, Pocket::Number(2), Pocket::Number(3)]));
            } else {
                spots.push(set([0, 1, 2]));
                spots.push(set([0, 2, 3]));
            }
            spots
        }
        BetCategory::Corner => {
            let mut spots: Vec<_> = (1..=32).filter_map(corner).collect();
            if !american {
                spots.push(set([0, 1, 2, 3]));
            }
            spots
        }
        BetCategory::SixLine => (0..ROWS).filter_map(six_line).collect(),
        BetCategory::Column => (0..3).filter_map(column).collect(),
        BetCategory::Dozen => (0..3).filter_map(dozen).collect(),
        outside => outside_targets(outside).into_iter().collect(),
    }
}

/// True when `targets` is a legal spot for `category` on `wheel`.
pub fn is_valid_spot(category: BetCategory, targets: &BTreeSet<Pocket>, wheel: WheelKind) -> bool {
    if targets.iter().any(|p| !wheel.contains(*p)) {
        return false;
    }
    legal_spots(category, wheel).iter().any(|spot| spot == targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_counts_european() {
        let wheel = WheelKind::European;
        assert_eq!(legal_spots(BetCategory::Straight, wheel).len(), 37);
        assert_eq!(legal_spots(BetCategory::Split, wheel).len(), 60);
        assert_eq!(legal_spots(BetCategory::Street, wheel).len(), 14);
        assert_eq!(legal_spots(BetCategory::Corner, wheel).len(), 23);
        assert_eq!(legal_spots(BetCategory::SixLine, wheel).len(), 11);
        assert_eq!(legal_spots(BetCategory::Column, wheel).len(), 3);
        assert_eq!(legal_spots(BetCategory::Dozen, wheel).len(), 3);
        assert_eq!(legal_spots(BetCategory::Red, wheel).len(), 1);
    }

    #[test]
    fn test_spot_counts_american() {
        let wheel = WheelKind::American;
        assert_eq!(legal_spots(BetCategory::Straight, wheel).len(), 38);
        assert_eq!(legal_spots(BetCategory::Split, wheel).len(), 62);
        assert_eq!(legal_spots(BetCategory::Street, wheel).len(), 15);
        assert_eq!(legal_spots(BetCategory::Corner, wheel).len(), 22);
    }

    #[test]
    fn test_columns_and_dozens_partition_numbers() {
        for groups in [
            (0..3).filter_map(column).collect::<Vec<_>>(),
            (0..3).filter_map(dozen).collect::<Vec<_>>(),
        ] {
            let mut all = BTreeSet::new();
            for group in &groups {
                assert_eq!(group.len(), 12);
                all.extend(group.iter().copied());
            }
            assert_eq!(all, set(1..=36));
        }
        assert!(column(0).unwrap().contains(&Pocket::Number(34)));
        assert!(column(2).unwrap().contains(&Pocket::Number(36)));
    }

    #[test]
    fn test_split_adjacency() {
        let wheel = WheelKind::European;
        assert!(split(Pocket::Number(1), Pocket::Number(2), wheel).is_some());
        assert!(split(Pocket::Number(1), Pocket::Number(4), wheel).is_some());
        assert!(split(Pocket::Number(3), Pocket::Number(4), wheel).is_none());
        assert!(split(ZERO, Pocket::Number(3), wheel).is_some());
        assert!(split(ZERO, DOUBLE_ZERO, wheel).is_none());
        assert!(split(ZERO, DOUBLE_ZERO, WheelKind::American).is_some());
    }

    #[test]
    fn test_corner_shapes() {
        assert_eq!(corner(1), Some(set([1, 2, 4, 5])));
        assert_eq!(corner(3), None);
        assert_eq!(corner(33), None);
        assert!(is_valid_spot(BetCategory::Corner, &set([0, 1, 2, 3]), WheelKind::European));
        assert!(!is_valid_spot(BetCategory::Corner, &set([0, 1, 2, 3]), WheelKind::American));
    }

    #[test]
    fn test_rejects_off_wheel_and_wrong_shape() {
        let wheel = WheelKind::European;
        assert!(!is_valid_spot(BetCategory::Straight, &straight(DOUBLE_ZERO), wheel));
        assert!(!is_valid_spot(BetCategory::Straight, &set([1, 2]), wheel));
        assert!(!is_valid_spot(BetCategory::Red, &set([1, 3]), wheel));
        assert!(is_valid_spot(BetCategory::Red, &outside_targets(BetCategory::Red).unwrap(), wheel));
        assert!(!is_valid_spot(BetCategory::Street, &BTreeSet::new(), wheel));
    }
}
