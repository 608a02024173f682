/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const GROW_SIZE: usize = 4 * 1024 * 1024;

/// Runs `f`, first switching to a new stack segment if fewer than
/// [`RED_ZONE`] bytes are left.
///
/// # Example
/// ```
/// use kll::util::stack::grow;
///
/// fn depth(n: u32) -> u32 {
///     if n == 0 { 0 } else { grow(|| depth(n - 1)) + 1 }
/// }
/// assert_eq!(depth(100_000), 100_000);
/// ```
#[inline]
pub fn grow<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROW_SIZE, f)
}
