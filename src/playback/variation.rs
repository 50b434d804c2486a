//! Non-repeating random variation choice.

use rand::Rng;

/// Pick an index in `0..count` uniformly, excluding `previous` whenever there
/// are at least two variations to choose from.
///
/// ```
/// use chat_sfx::playback::pick_index;
///
/// let mut rng = rand::rng();
/// assert_eq!(pick_index(1, Some(0), &mut rng), 0);
/// assert_eq!(pick_index(2, Some(0), &mut rng), 1);
/// ```
pub fn pick_index<R: Rng + ?Sized>(count: usize, previous: Option<usize>, rng: &mut R) -> usize {
    match previous {
        _ if count <= 1 => 0,
        Some(prev) if prev < count => {
            // Draw from the remaining count - 1 slots and skip over `prev`.
            let pick = rng.random_range(0..count - 1);
            if pick >= prev {
                pick + 1
            } else {
                pick
            }
        }
        _ => rng.random_range(0..count),
    }
}
