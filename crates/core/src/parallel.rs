#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
const PARALLEL_THRESHOLD: usize = 1024;

pub fn for_each_indexed_mut<T, F>(slice: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if slice.len() >= PARALLEL_THRESHOLD {
            slice
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, value)| f(idx, value));
            return;
        }
    }

    for (idx, value) in slice.iter_mut().enumerate() {
        f(idx, value);
    }
}

/// Runs `f` over consecutive `chunk_len` blocks; each block is touched by one task.
pub fn for_each_chunk_mut<T, F>(slice: &mut [T], chunk_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if chunk_len == 0 {
        return;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if slice.len() / chunk_len > 1 {
            slice
                .par_chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(idx, chunk)| f(idx, chunk));
            return;
        }
    }

    for (idx, chunk) in slice.chunks_mut(chunk_len).enumerate() {
        f(idx, chunk);
    }
}
