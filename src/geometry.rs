//! Geometry primitives shared by the rest of the crate.
//!
//! Scalars are `f64` throughout; vector types are the nalgebra ones.

use nalgebra::{Point3, Vector3};

/// Scalar type used for all geometry.
pub type Scalar = f64;

/// Squared Euclidean length of a vector.
#[inline]
pub fn norm2(v: &Vector3<Scalar>) -> Scalar {
    v.dot(v)
}

/// Normalize a vector, returning the zero vector when its length vanishes.
#[inline]
pub fn normalize_or_zero(v: Vector3<Scalar>) -> Vector3<Scalar> {
    v.try_normalize(Scalar::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Unit normal of the triangle `(x0, x1, x2)` by the right-hand rule.
///
/// Degenerate triangles yield the zero vector.
#[inline]
pub fn triangle_normal(x0: &Point3<Scalar>, x1: &Point3<Scalar>, x2: &Point3<Scalar>) -> Vector3<Scalar> {
    normalize_or_zero((x1 - x0).cross(&(x2 - x0)))
}

/// Area of the triangle `(x0, x1, x2)`.
#[inline]
pub fn triangle_area(x0: &Point3<Scalar>, x1: &Point3<Scalar>, x2: &Point3<Scalar>) -> Scalar {
    0.5 * (x1 - x0).cross(&(x2 - x0)).norm()
}

/// Interior angle at `x0` between the rays towards `x1` and `x2`, in radians.
///
/// The cosine is clamped to `[-1, 1]` before `acos`. A zero-length ray
/// gives an angle of zero.
pub fn corner_angle(x0: &Point3<Scalar>, x1: &Point3<Scalar>, x2: &Point3<Scalar>) -> Scalar {
    let (Some(e1), Some(e2)) = (
        (x1 - x0).try_normalize(Scalar::EPSILON),
        (x2 - x0).try_normalize(Scalar::EPSILON),
    ) else {
        return 0.0;
    };
    e1.dot(&e2).clamp(-1.0, 1.0).acos()
}

/// Smallest of the three interior angles of a triangle.
pub fn min_triangle_angle(x0: &Point3<Scalar>, x1: &Point3<Scalar>, x2: &Point3<Scalar>) -> Scalar {
    corner_angle(x0, x1, x2)
        .min(corner_angle(x1, x2, x0))
        .min(corner_angle(x2, x0, x1))
}

/// A position offset and non-uniform scale, applied as `position + scale ∘ x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation applied after scaling.
    pub position: Vector3<Scalar>,
    /// Per-axis scale factors.
    pub scale: Vector3<Scalar>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Create a transform from an offset and scale.
    pub fn new(position: Vector3<Scalar>, scale: Vector3<Scalar>) -> Self {
        Self { position, scale }
    }

    /// Set the translation.
    pub fn with_position(mut self, position: Vector3<Scalar>) -> Self {
        self.position = position;
        self
    }

    /// Set the per-axis scale.
    pub fn with_scale(mut self, scale: Vector3<Scalar>) -> Self {
        self.scale = scale;
        self
    }

    /// Check whether this is exactly the identity transform.
    pub fn is_identity(&self) -> bool {
        self.position == Vector3::zeros() && self.scale == Vector3::new(1.0, 1.0, 1.0)
    }

    /// Map a point from object space into world space.
    #[inline]
    pub fn apply_point(&self, p: &Point3<Scalar>) -> Point3<Scalar> {
        Point3::from(p.coords.component_mul(&self.scale) + self.position)
    }

    /// Check whether every scale factor is non-zero, so points can be
    /// mapped back with [`Transform::unapply_point`].
    pub fn is_invertible(&self) -> bool {
        self.scale.iter().all(|&s| s != 0.0)
    }

    /// Map a point from world space back into object space.
    ///
    /// A zero scale factor gives non-finite coordinates on that axis. Check
    /// [`Transform::is_invertible`] first.
    #[inline]
    pub fn unapply_point(&self, p: &Point3<Scalar>) -> Point3<Scalar> {
        Point3::from((p.coords - self.position).component_div(&self.scale))
    }

    /// Map a normal into world space (inverse-transpose of the scale), renormalized.
    ///
    /// A zero scale factor gives non-finite components.
    #[inline]
    pub fn apply_normal(&self, n: &Vector3<Scalar>) -> Vector3<Scalar> {
        normalize_or_zero(n.component_div(&self.scale))
    }
}
