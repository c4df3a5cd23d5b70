use core::ops::RangeInclusive;

/// Position of a tile inside the current round's tile set.
pub type TileIndex = usize;

/// Count type used for tile and pair counts.
pub type TileCount = usize;

/// Running score, floored at zero.
pub type Score = u32;

pub const MIN_TILES_PER_ROUND: TileCount = 10;
pub const MAX_TILES_PER_ROUND: TileCount = 25;
pub const DEFAULT_TILES_PER_ROUND: TileCount = 25;

pub const TILE_COUNT_RANGE: RangeInclusive<TileCount> = MIN_TILES_PER_ROUND..=MAX_TILES_PER_ROUND;

pub const fn clamp_tile_count(count: TileCount) -> TileCount {
    if count < MIN_TILES_PER_ROUND {
        MIN_TILES_PER_ROUND
    } else if count > MAX_TILES_PER_ROUND {
        MAX_TILES_PER_ROUND
    } else {
        count
    }
}

/// Pairs to draw so that `count` tiles can be dealt, rounding odd counts up.
pub const fn pairs_for(count: TileCount) -> TileCount {
    count.div_ceil(2)
}

/// Category part of an image key, e.g. `tu_a` for `tu_a 7`.
pub fn image_category(key: &str) -> &str {
    key.split_once(' ').map_or(key, |(category, _)| category)
}

/// Numeric part of an image key, `0` when the key carries none.
pub fn image_number(key: &str) -> u32 {
    key.split_once(' ')
        .and_then(|(_, number)| number.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_counts_round_pairs_up() {
        assert_eq!(pairs_for(10), 5);
        assert_eq!(pairs_for(25), 13);
        assert_eq!(pairs_for(0), 0);
    }

    #[test]
    fn image_key_parts() {
        assert_eq!(image_category("tu_b 4"), "tu_b");
        assert_eq!(image_number("tu_b 4"), 4);
        assert_eq!(image_category("plain"), "plain");
        assert_eq!(image_number("plain"), 0);
        assert_eq!(image_number("tu_c x"), 0);
    }
}
