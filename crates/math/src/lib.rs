pub mod aabox;
pub mod cast;
pub mod sphere;
pub mod vector;

pub use self::{
    aabox::{AABox, Box3},
    sphere::Sphere,
    vector::{Vec3, Vector},
};
