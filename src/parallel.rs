use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;
        pub use rayon::iter::ParallelIterator;

        pub fn opt_par_iter<T: Sync>(collection: &[T]) -> rayon::slice::Iter<'_, T> {
            collection.par_iter()
        }

        pub fn opt_into_par_iter(range: std::ops::Range<usize>) -> rayon::range::Iter<usize> {
            range.into_par_iter()
        }
    } else {
        pub fn opt_par_iter<T>(collection: &[T]) -> std::slice::Iter<'_, T> {
            collection.iter()
        }

        pub fn opt_into_par_iter(range: std::ops::Range<usize>) -> std::ops::Range<usize> {
            range
        }
    }
}
