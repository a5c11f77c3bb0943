use std::{array, ops, slice};

use crate::cast;

/// A fixed size vector of `N` scalars.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Vector<T, const N: usize>([T; N]);

pub type Vec3<T> = Vector<T, 3>;

impl<T: Default, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(a: [T; N]) -> Self {
        Self(a)
    }
}

impl<T, const N: usize> IntoIterator for Vector<T, N> {
    type Item = T;
    type IntoIter = array::IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a Vector<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T, const N: usize> ops::Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T, const N: usize> ops::IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<T: ops::Neg<Output = T> + Copy, const N: usize> ops::Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

// Component-wise operators between two vectors, and between a vector and a scalar for `*` / `/`.
macro_rules! impl_binary_ops {
    ($($op:ident::$method:ident, $op_assign:ident::$method_assign:ident;)*) => {
        $(
            impl<T: ops::$op<Output = T> + Copy, const N: usize> ops::$op<Self> for Vector<T, N> {
                type Output = Self;

                fn $method(self, rhs: Self) -> Self {
                    Self::from_fn(|i| ops::$op::$method(self.0[i], rhs.0[i]))
                }
            }

            impl<T: ops::$op_assign + Copy, const N: usize> ops::$op_assign<Self> for Vector<T, N> {
                fn $method_assign(&mut self, rhs: Self) {
                    for (l, r) in self.0.iter_mut().zip(rhs.0) {
                        ops::$op_assign::$method_assign(l, r);
                    }
                }
            }
        )*
    };
}

impl_binary_ops! {
    Add::add, AddAssign::add_assign;
    Sub::sub, SubAssign::sub_assign;
    Mul::mul, MulAssign::mul_assign;
    Div::div, DivAssign::div_assign;
}

impl<T: ops::Mul<Output = T> + Copy, const N: usize> ops::Mul<T> for Vector<T, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|v| v * rhs)
    }
}

impl<T: ops::Div<Output = T> + Copy, const N: usize> ops::Div<T> for Vector<T, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|v| v / rhs)
    }
}

impl<T, const N: usize> Vector<T, N> {
    #[must_use]
    pub fn into_array(self) -> [T; N] {
        self.0
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.0.iter()
    }

    #[must_use]
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self(array::from_fn(f))
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Vector<U, N> {
        Vector(self.0.map(f))
    }
}

impl<T: Copy, const N: usize> Vector<T, N> {
    #[must_use]
    pub fn splat(t: T) -> Self {
        Self([t; N])
    }

    #[must_use]
    pub fn zip_with<U: Copy, V>(
        self,
        other: Vector<U, N>,
        mut f: impl FnMut(T, U) -> V,
    ) -> Vector<V, N> {
        Vector::from_fn(|i| f(self.0[i], other.0[i]))
    }
}

impl<T: num::Zero + Copy, const N: usize> Vector<T, N> {
    #[must_use]
    pub fn zero() -> Self {
        Self::splat(T::zero())
    }
}

impl<T, const N: usize> Vector<T, N>
where
    T: num::Zero + ops::Mul<Output = T> + Copy,
{
    #[must_use]
    pub fn dot(self, rhs: Self) -> T {
        self.0
            .into_iter()
            .zip(rhs.0)
            .fold(T::zero(), |acc, (a, b)| acc + a * b)
    }
}

impl<T: num::Float, const N: usize> Vector<T, N> {
    #[must_use]
    pub fn length_squared(self) -> T {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> T {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn distance_squared(self, other: Self) -> T {
        (self - other).length_squared()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> T {
        self.distance_squared(other).sqrt()
    }

    #[must_use]
    pub fn min_by_component(self, other: Self) -> Self {
        self.zip_with(other, T::min)
    }

    #[must_use]
    pub fn max_by_component(self, other: Self) -> Self {
        self.zip_with(other, T::max)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.into_iter().all(T::is_finite)
    }

    /// The arithmetic mean of the given points, or `None` if there are none.
    pub fn mean(points: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut count = 0;
        let sum = points.into_iter().fold(Self::zero(), |sum, p| {
            count += 1;
            sum + p
        });
        (count > 0).then(|| sum / cast::count::<T>(count))
    }
}

impl<T> Vec3<T> {
    #[must_use]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self([x, y, z])
    }
}

impl<T: num::Float> Vec3<T> {
    #[must_use]
    pub fn cross(self, rhs: Self) -> Self {
        let Self([x, y, z]) = self;
        let Self([rx, ry, rz]) = rhs;
        Self([y * rz - z * ry, z * rx - x * rz, x * ry - y * rx])
    }
}
