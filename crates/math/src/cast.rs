/// Cast between numeric types, panicking if the value is not representable in the target type.
///
/// Only used for small constants (like `0.5` or an entity count) where failure would indicate a
/// broken scalar type rather than bad input.
#[must_use]
pub fn cast<T: num::NumCast>(a: impl num::NumCast) -> T {
    num::cast::<_, T>(a).expect("numeric cast out of range")
}

/// The number `n` as a float, typically an entity count used as a divisor.
#[must_use]
pub fn count<T: num::Float>(n: usize) -> T {
    cast(n)
}
