/// Values a weight editor steps through, in order.
pub const WEIGHT_CYCLE: [u32; 5] = [1, 2, 3, 5, 10];

/// Returns the weight that follows `current` in [`WEIGHT_CYCLE`].
///
/// The last value wraps around to the first. A weight that is not part of the
/// cycle (for example one set by a preset) restarts the cycle at its first value.
pub fn next_weight(current: u32) -> u32 {
    match WEIGHT_CYCLE.iter().position(|&w| w == current) {
        Some(idx) => WEIGHT_CYCLE[(idx + 1) % WEIGHT_CYCLE.len()],
        None => WEIGHT_CYCLE[0],
    }
}
