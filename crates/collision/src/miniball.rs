use std::cmp::Ordering;

use arrayvec::ArrayVec;
use spheretree_math::{Box3, Vec3, cast::cast};

/// The smallest ball enclosing a point set, as returned by [`min_ball`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Miniball<N> {
    pub center: [N; 3],
    /// The squared radius of the ball. This is negative for the empty ball returned for an empty
    /// point set.
    pub squared_radius: N,
}

impl<N: num::Float> Miniball<N> {
    pub fn is_empty(&self) -> bool {
        self.squared_radius < N::zero()
    }

    pub fn radius(&self) -> N {
        self.squared_radius.max(N::zero()).sqrt()
    }
}

/// Compute the minimal enclosing ball of `count` points in 3D.
///
/// Points are read through `accessor`, which maps a local index in `0..count` to the coordinates of
/// that point. This uses Welzl's algorithm with the "move-to-front" heuristic, which runs in
/// expected linear time for inputs without adversarial ordering.
///
/// Every input point is contained in the returned ball. The ball may exceed the true minimum by a
/// small tolerance relative to the extent of the point set.
pub fn min_ball<N: num::Float>(count: usize, accessor: impl Fn(usize) -> [N; 3]) -> Miniball<N> {
    let absolute: Vec<Vec3<N>> = (0..count).map(|i| Vec3::from(accessor(i))).collect();

    // Work relative to the center of the bounds, so that precision depends on the size of the point
    // set and not on its distance from the origin.
    let bounds = Box3::from_points(absolute.iter().copied());
    if bounds.is_empty() {
        return Miniball {
            center: [N::zero(); 3],
            squared_radius: -N::one(),
        };
    }
    let origin = midpoint(bounds.min, bounds.max);
    let mut points: Vec<Vec3<N>> = absolute.iter().map(|&p| p - origin).collect();

    // The tolerance applies to squared distances, so it scales with the squared extent.
    let tolerance = N::epsilon() * cast(64) * bounds.diagonal().length_squared();

    let mut support = ArrayVec::new();
    let ball = move_to_front(&mut points, count, &mut support, tolerance);

    // Moving back to absolute coordinates rounds the center, so measure the radius again there.
    let center = ball.center + origin;
    let squared_radius = absolute
        .iter()
        .fold(ball.squared_radius, |r, &p| r.max(center.distance_squared(p)));

    Miniball {
        center: center.into_array(),
        squared_radius,
    }
}

#[derive(Debug, Copy, Clone)]
struct Ball<N> {
    center: Vec3<N>,
    squared_radius: N,
}

impl<N: num::Float> Ball<N> {
    fn empty() -> Self {
        Self {
            center: Vec3::zero(),
            squared_radius: -N::one(),
        }
    }

    fn point(p: Vec3<N>) -> Self {
        Self {
            center: p,
            squared_radius: N::zero(),
        }
    }

    fn with_center(center: Vec3<N>, boundary_point: Vec3<N>) -> Self {
        Self {
            center,
            squared_radius: center.distance_squared(boundary_point),
        }
    }

    fn contains(&self, p: Vec3<N>, tolerance: N) -> bool {
        self.center.distance_squared(p) <= self.squared_radius + tolerance
    }
}

type Support<N> = ArrayVec<Vec3<N>, 4>;

// The smallest ball that contains `points[..end]` and has every point in `support` on its boundary.
//
// Points found outside of the current ball are moved to the front of the list, so that later calls
// see the "important" points first.
fn move_to_front<N: num::Float>(
    points: &mut [Vec3<N>],
    end: usize,
    support: &mut Support<N>,
    tolerance: N,
) -> Ball<N> {
    let mut ball = support_ball(support, tolerance);
    if support.is_full() {
        return ball;
    }

    for i in 0..end {
        let p = points[i];
        if !ball.contains(p, tolerance) {
            support.push(p);
            ball = move_to_front(points, i, support, tolerance);
            support.pop();
            points[..=i].rotate_right(1);
        }
    }

    ball
}

// The smallest ball with every support point on its boundary.
//
// If the support points are degenerate (coincident, collinear or coplanar points), there is no such
// ball and instead this returns the smallest ball spanned by a subset of the support which encloses
// all of it.
fn support_ball<N: num::Float>(support: &[Vec3<N>], tolerance: N) -> Ball<N> {
    match *support {
        [] => Ball::empty(),
        [a] => Ball::point(a),
        [a, b] => Ball::with_center(midpoint(a, b), a),
        [a, b, c] => circumball(a, b, c).unwrap_or_else(|| farthest_pair(support)),
        [a, b, c, d] => circumsphere(a, b, c, d)
            .unwrap_or_else(|| smallest_enclosing_sub_ball(support, tolerance)),
        _ => unreachable!("support set has at most 4 points"),
    }
}

fn midpoint<N: num::Float>(a: Vec3<N>, b: Vec3<N>) -> Vec3<N> {
    let half: N = cast(0.5);
    (a + b) * half
}

fn circumball<N: num::Float>(a: Vec3<N>, b: Vec3<N>, c: Vec3<N>) -> Option<Ball<N>> {
    let u = b - a;
    let v = c - a;
    let w = u.cross(v);
    let denom = w.length_squared() * cast(2);
    if !(denom > N::epsilon() * u.length_squared() * v.length_squared()) {
        return None;
    }

    let offset = (v * u.length_squared() - u * v.length_squared()).cross(w) / denom;
    Some(Ball::with_center(a + offset, a))
}

fn circumsphere<N: num::Float>(
    a: Vec3<N>,
    b: Vec3<N>,
    c: Vec3<N>,
    d: Vec3<N>,
) -> Option<Ball<N>> {
    let u = b - a;
    let v = c - a;
    let w = d - a;
    let det = u.dot(v.cross(w));
    if !(det.abs() > N::epsilon() * u.length() * v.length() * w.length()) {
        return None;
    }

    let offset = (v.cross(w) * u.length_squared()
        + w.cross(u) * v.length_squared()
        + u.cross(v) * w.length_squared())
        / (det * cast(2));
    Some(Ball::with_center(a + offset, a))
}

fn farthest_pair<N: num::Float>(points: &[Vec3<N>]) -> Ball<N> {
    let mut best = Ball::point(points[0]);
    for (i, &a) in points.iter().enumerate() {
        for &b in &points[i + 1..] {
            let ball = Ball::with_center(midpoint(a, b), a);
            if ball.squared_radius > best.squared_radius {
                best = ball;
            }
        }
    }
    best
}

fn smallest_enclosing_sub_ball<N: num::Float>(points: &[Vec3<N>], tolerance: N) -> Ball<N> {
    let n = points.len();
    let mut candidates = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            candidates.push(Ball::with_center(midpoint(points[i], points[j]), points[i]));
            for k in j + 1..n {
                candidates.extend(circumball(points[i], points[j], points[k]));
            }
        }
    }

    candidates
        .into_iter()
        .filter(|ball| points.iter().all(|&p| ball.contains(p, tolerance)))
        .min_by(|a, b| {
            a.squared_radius
                .partial_cmp(&b.squared_radius)
                .unwrap_or(Ordering::Equal)
        })
        .unwrap_or_else(|| farthest_pair(points))
}
