// Cyclic advance over a fixed, ordered set of variants.

/// A closed set of variants with a declared order.
///
/// `next` wraps from the last variant back to the first; it never clamps.
pub trait Cyclic: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn next(self) -> Self {
        cycle_next(Self::ALL, self)
    }
}

/// Returns the variant after `current` in `all`, wrapping to the start.
/// A value missing from `all` maps to the first entry.
pub fn cycle_next<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    match all.iter().position(|item| *item == current) {
        Some(idx) => all[(idx + 1) % all.len()],
        None => all[0],
    }
}
