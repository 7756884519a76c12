use rand::Rng;

////////////////////////////////////////////////////////////////////////////////

/// Source of uniformly distributed indices: called with `n`, returns a value
/// in `0..n`.
pub trait RandomSource: FnMut(usize) -> usize {}

impl<F: FnMut(usize) -> usize> RandomSource for F {}

/// Wraps any [`Rng`] into a [`RandomSource`].
pub fn from_rng<R: Rng>(mut rng: R) -> impl RandomSource {
    move |n: usize| rng.gen_range(0..n)
}

/// Replays `indices` in order, wrapping around when they run out. Every
/// index is reduced modulo the requested bound.
#[cfg(test)]
pub(crate) fn scripted(indices: Vec<usize>) -> impl RandomSource {
    assert!(!indices.is_empty(), "scripted source needs at least one index");
    let mut position = 0;
    move |n: usize| {
        let index = indices[position % indices.len()];
        position += 1;
        index % n
    }
}

////////////////////////////////////////////////////////////////////////////////
