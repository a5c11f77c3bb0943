use crate::vector::Vector;

/// An axis-aligned box, used to pick split directions while building sphere hierarchies.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AABox<T, const N: usize> {
    pub min: Vector<T, N>,
    pub max: Vector<T, N>,
}

pub type Box3<T> = AABox<T, 3>;

impl<T, const N: usize> AABox<T, N> {
    pub const fn new(min: Vector<T, N>, max: Vector<T, N>) -> Self {
        Self { min, max }
    }
}

impl<T: num::Float, const N: usize> AABox<T, N> {
    /// A box that contains nothing and becomes exactly the extended point on the first call to
    /// `extend`.
    pub fn empty() -> Self {
        Self::new(
            Vector::splat(T::infinity()),
            Vector::splat(T::neg_infinity()),
        )
    }

    /// Returns true if along any axis, the minimum is greater than the maximum.
    ///
    /// Unlike half-open boxes, a single point is *not* empty.
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(a, b)| a > b)
    }

    pub fn extend(&mut self, p: Vector<T, N>) {
        self.min = self.min.min_by_component(p);
        self.max = self.max.max_by_component(p);
    }

    pub fn from_points(i: impl IntoIterator<Item = Vector<T, N>>) -> Self {
        let mut b = Self::empty();
        for p in i {
            b.extend(p);
        }
        b
    }

    pub fn diagonal(&self) -> Vector<T, N> {
        self.max - self.min
    }

    /// The axis along which the box is longest. Ties go to the *later* axis, so a cube splits
    /// along its last dimension.
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        let mut axis = 0;
        for i in 1..N {
            if d[i] >= d[axis] {
                axis = i;
            }
        }
        axis
    }
}
