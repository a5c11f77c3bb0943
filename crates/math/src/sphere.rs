use crate::vector::Vec3;

/// A bounding sphere.
///
/// Spheres are closed: points on the surface are contained, and two spheres that merely touch
/// overlap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere<T> {
    pub center: Vec3<T>,
    pub radius: T,
}

impl<T> Sphere<T> {
    pub const fn new(center: Vec3<T>, radius: T) -> Self {
        Self { center, radius }
    }
}

impl<T: num::Float> Sphere<T> {
    /// A sphere of radius zero at the origin.
    pub fn zero() -> Self {
        Self::new(Vec3::zero(), T::zero())
    }

    pub fn point(center: Vec3<T>) -> Self {
        Self::new(center, T::zero())
    }

    /// Returns true if `‖self.center - other.center‖ <= self.radius + other.radius`.
    ///
    /// The comparison is done on squared values, so no square root is taken.
    pub fn overlaps(&self, other: &Self) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }

    /// Returns true if every point of `other` lies within this sphere.
    pub fn encloses(&self, other: &Self) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius
    }

    /// Grow the radius of this sphere so that it encloses `other`, keeping the center fixed.
    pub fn enclose(&mut self, other: &Self) {
        self.radius = self
            .radius
            .max(self.center.distance(other.center) + other.radius);
    }

    #[must_use]
    pub fn inflate(self, margin: T) -> Self {
        Self::new(self.center, self.radius + margin)
    }
}
