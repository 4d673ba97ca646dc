//! Enumerate stop orderings in which every rider is picked up before being
//! dropped off.
//!
//! Each rider contributes one precedence edge (pickup before dropoff) and no
//! other constraint exists between riders, so the valid orderings are the
//! topological orders of that partial order. For `n` riders there are
//! `(2n)! / 2^n` of them. The enumeration is exhaustive on purpose: the detour
//! evaluator needs the true minimum. Growth is combinatorial, which is fine for
//! the handful of passengers a car carries but not for larger inputs; see
//! [`crate::DEFAULT_MAX_RIDERS`].

/// Stop indices for one rider within a per-evaluation coordinate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StopPair {
    /// Index of the pickup coordinate.
    pub pickup: usize,
    /// Index of the dropoff coordinate.
    pub dropoff: usize,
}

impl StopPair {
    /// Construct a pair from pickup and dropoff indices.
    #[must_use]
    pub const fn new(pickup: usize, dropoff: usize) -> Self {
        Self { pickup, dropoff }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Waiting,
    Onboard,
    Delivered,
}

/// Call `visit` once for every valid ordering of the riders' stops.
///
/// Orderings are produced by backtracking; at each step any stop whose
/// prerequisite is already placed may come next. With no riders, `visit` runs
/// once with an empty ordering.
pub fn for_each_valid_ordering<F>(riders: &[StopPair], mut visit: F)
where
    F: FnMut(&[usize]),
{
    let mut progress = vec![Progress::Waiting; riders.len()];
    let mut current = Vec::with_capacity(riders.len() * 2);
    backtrack(riders, &mut progress, &mut current, &mut visit);
}

fn backtrack<F>(
    riders: &[StopPair],
    progress: &mut [Progress],
    current: &mut Vec<usize>,
    visit: &mut F,
) where
    F: FnMut(&[usize]),
{
    if current.len() == riders.len() * 2 {
        visit(current);
        return;
    }

    for (idx, rider) in riders.iter().enumerate() {
        let state = progress[idx];
        let (stop, next_state) = match state {
            Progress::Waiting => (rider.pickup, Progress::Onboard),
            Progress::Onboard => (rider.dropoff, Progress::Delivered),
            Progress::Delivered => continue,
        };
        progress[idx] = next_state;
        current.push(stop);
        backtrack(riders, progress, current, visit);
        current.pop();
        progress[idx] = state;
    }
}

/// Collect every valid ordering of the riders' stops.
///
/// # Examples
///
/// ```
/// use carpool_core::StopPair;
/// use carpool_core::ordering::valid_orderings;
///
/// let orderings = valid_orderings(&[StopPair::new(2, 3)]);
/// assert_eq!(orderings, vec![vec![2, 3]]);
/// ```
#[must_use]
pub fn valid_orderings(riders: &[StopPair]) -> Vec<Vec<usize>> {
    let mut orderings = Vec::new();
    for_each_valid_ordering(riders, |ordering| orderings.push(ordering.to_vec()));
    orderings
}

/// Number of valid orderings for `riders` independent riders, `(2n)! / 2^n`.
///
/// Saturates at `u128::MAX`.
#[must_use]
pub fn ordering_count(riders: usize) -> u128 {
    (1..=riders as u128).fold(1_u128, |count, k| count.saturating_mul(k.saturating_mul(2 * k - 1)))
}
