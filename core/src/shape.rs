//! Collision shapes: circles and convex polygons, with their derived mass
//! properties and bounding boxes.

use arrayvec::ArrayVec;

use crate::constants::MAX_VERTEX_COUNT;
use crate::error::PhysicsError;
use crate::vec2::{Transform, Vec2};

/// Physical material properties shared by a shape's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.0,
            restitution: 0.0,
        }
    }
}

/// An axis-aligned bounding box in world coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

type VertexList = ArrayVec<Vec2, MAX_VERTEX_COUNT>;

/// A collision shape: either a circle or a convex polygon.
///
/// Polygon vertices are always stored counter-clockwise, normalized through a
/// convex-hull sweep at construction time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Circle {
        material: Material,
        radius: f32,
        area: f32,
    },
    Polygon {
        material: Material,
        vertices: VertexList,
        normals: VertexList,
        area: f32,
    },
}

/// Which variant a [`Shape`] is. Useful for wrong-kind-access queries without
/// borrowing the shape itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeType {
    #[default]
    Unknown,
    Circle,
    Polygon,
}

impl Shape {
    /// Creates a circle shape. `radius` must be positive.
    pub fn circle(material: Material, radius: f32) -> Result<Self, PhysicsError> {
        if radius <= 0.0 {
            return Err(PhysicsError::InvalidShape);
        }

        Ok(Shape::Circle {
            material,
            radius,
            area: std::f32::consts::PI * radius * radius,
        })
    }

    /// Creates a 4-vertex rectangle, centered on the origin in local space.
    pub fn rectangle(material: Material, width: f32, height: f32) -> Result<Self, PhysicsError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(PhysicsError::InvalidShape);
        }

        let half_w = 0.5 * width;
        let half_h = 0.5 * height;

        Self::polygon(
            material,
            &[
                Vec2::new(-half_w, -half_h),
                Vec2::new(-half_w, half_h),
                Vec2::new(half_w, half_h),
                Vec2::new(half_w, -half_h),
            ],
        )
    }

    /// Creates a convex polygon from arbitrary input points, normalized through
    /// a gift-wrapping (Jarvis march) convex-hull sweep.
    pub fn polygon(material: Material, points: &[Vec2]) -> Result<Self, PhysicsError> {
        if points.len() < 3 {
            return Err(PhysicsError::InvalidShape);
        }

        let hull = jarvis_march(points);

        if hull.len() < 3 || hull.len() > MAX_VERTEX_COUNT {
            return Err(PhysicsError::InvalidShape);
        }

        let mut vertices: VertexList = ArrayVec::new();
        vertices.extend(hull.iter().copied());

        // normals[i] is the left unit normal of edge (vertices[j] -> vertices[i]).
        let mut normals: VertexList = ArrayVec::new();
        let n = vertices.len();
        for i in 0..n {
            let j = if i == 0 { n - 1 } else { i - 1 };
            normals.push((vertices[i] - vertices[j]).left_normal());
        }

        let area = polygon_area(&vertices);

        Ok(Shape::Polygon {
            material,
            vertices,
            normals,
            area,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle { .. } => ShapeType::Circle,
            Shape::Polygon { .. } => ShapeType::Polygon,
        }
    }

    pub fn material(&self) -> Material {
        match self {
            Shape::Circle { material, .. } | Shape::Polygon { material, .. } => *material,
        }
    }

    pub fn set_material(&mut self, new_material: Material) {
        match self {
            Shape::Circle { material, .. } | Shape::Polygon { material, .. } => {
                *material = new_material;
            }
        }
    }

    pub fn density(&self) -> f32 {
        self.material().density
    }

    pub fn set_density(&mut self, density: f32) {
        match self {
            Shape::Circle { material, .. } | Shape::Polygon { material, .. } => {
                material.density = density;
            }
        }
    }

    pub fn friction(&self) -> f32 {
        self.material().friction
    }

    pub fn set_friction(&mut self, friction: f32) {
        match self {
            Shape::Circle { material, .. } | Shape::Polygon { material, .. } => {
                material.friction = friction;
            }
        }
    }

    pub fn restitution(&self) -> f32 {
        self.material().restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        match self {
            Shape::Circle { material, .. } | Shape::Polygon { material, .. } => {
                material.restitution = restitution;
            }
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { area, .. } | Shape::Polygon { area, .. } => *area,
        }
    }

    /// Mass derived from density and area. Zero for a non-positive density.
    pub fn mass(&self) -> f32 {
        self.density() * self.area()
    }

    /// Moment of inertia about the shape's local origin. Zero for a
    /// non-positive density.
    pub fn inertia(&self) -> f32 {
        if self.density() <= 0.0 {
            return 0.0;
        }

        match self {
            Shape::Circle { radius, .. } => 0.5 * self.mass() * (radius * radius),
            Shape::Polygon {
                vertices, material, ..
            } => polygon_inertia(vertices, material.density),
        }
    }

    /// Radius of a circle shape, or `0.0` if `self` is a polygon.
    pub fn circle_radius(&self) -> f32 {
        match self {
            Shape::Circle { radius, .. } => *radius,
            Shape::Polygon { .. } => 0.0,
        }
    }

    /// Sets the radius of a circle shape, recomputing its area. No-op on a
    /// polygon.
    pub fn set_circle_radius(&mut self, radius: f32) {
        if let Shape::Circle { radius: r, area, .. } = self {
            *r = radius;
            *area = std::f32::consts::PI * radius * radius;
        }
    }

    /// Replaces a polygon shape's dimensions with a centered rectangle. No-op
    /// on a circle or for non-positive dimensions.
    pub fn set_rectangle_dimensions(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        if !matches!(self, Shape::Polygon { .. }) {
            return;
        }

        let half_w = 0.5 * width;
        let half_h = 0.5 * height;
        self.set_polygon_vertices(&[
            Vec2::new(-half_w, -half_h),
            Vec2::new(-half_w, half_h),
            Vec2::new(half_w, half_h),
            Vec2::new(half_w, -half_h),
        ]);
    }

    /// Replaces a polygon shape's vertex list, re-running the convex-hull
    /// sweep. No-op on a circle, on empty input, or on a hull outside
    /// `[3, MAX_VERTEX_COUNT]`.
    pub fn set_polygon_vertices(&mut self, points: &[Vec2]) {
        let material = match self {
            Shape::Polygon { material, .. } => *material,
            Shape::Circle { .. } => return,
        };

        if let Ok(Shape::Polygon {
            vertices,
            normals,
            area,
            ..
        }) = Shape::polygon(material, points)
        {
            if let Shape::Polygon {
                vertices: v,
                normals: n,
                area: a,
                ..
            } = self
            {
                *v = vertices;
                *n = normals;
                *a = area;
            }
        }
    }

    /// Vertex `index` of a polygon shape, or the zero vector if out of range
    /// or `self` is a circle.
    pub fn polygon_vertex(&self, index: usize) -> Vec2 {
        match self {
            Shape::Polygon { vertices, .. } => vertices.get(index).copied().unwrap_or(Vec2::ZERO),
            Shape::Circle { .. } => Vec2::ZERO,
        }
    }

    pub fn polygon_vertices(&self) -> &[Vec2] {
        match self {
            Shape::Polygon { vertices, .. } => vertices.as_slice(),
            Shape::Circle { .. } => &[],
        }
    }

    /// Normal `index` of a polygon shape, or the zero vector if out of range
    /// or `self` is a circle.
    pub fn polygon_normal(&self, index: usize) -> Vec2 {
        match self {
            Shape::Polygon { normals, .. } => normals.get(index).copied().unwrap_or(Vec2::ZERO),
            Shape::Circle { .. } => Vec2::ZERO,
        }
    }

    pub fn polygon_normals(&self) -> &[Vec2] {
        match self {
            Shape::Polygon { normals, .. } => normals.as_slice(),
            Shape::Circle { .. } => &[],
        }
    }

    /// Tests whether world-space `point` lies within `self` under transform
    /// `tx`. A polygon is treated as inclusive of its boundary.
    pub fn contains_point(&self, tx: Transform, point: Vec2) -> bool {
        match self {
            Shape::Circle { radius, .. } => point.distance_sqr(tx.position) <= radius * radius,
            Shape::Polygon {
                vertices, normals, ..
            } => {
                let local = tx.to_local(point);
                vertices
                    .iter()
                    .zip(normals.iter())
                    .all(|(&v, &n)| n.dot(local - v) <= 0.0)
            }
        }
    }

    /// World-space AABB of `self` under transform `tx`.
    pub fn aabb(&self, tx: Transform) -> Aabb {
        match self {
            Shape::Circle { radius, .. } => Aabb {
                x: tx.position.x - radius,
                y: tx.position.y - radius,
                width: 2.0 * radius,
                height: 2.0 * radius,
            },
            Shape::Polygon { vertices, .. } => {
                let mut min = Vec2::new(f32::MAX, f32::MAX);
                let mut max = Vec2::new(f32::MIN, f32::MIN);

                for &v in vertices.iter() {
                    let world = v.transform(tx);
                    min.x = min.x.min(world.x);
                    min.y = min.y.min(world.y);
                    max.x = max.x.max(world.x);
                    max.y = max.y.max(world.y);
                }

                Aabb {
                    x: min.x,
                    y: min.y,
                    width: max.x - min.x,
                    height: max.y - min.y,
                }
            }
        }
    }
}

/// Triangle-fan area from `vertices[0]`: `|½ Σ cross(v_i - v_0, v_{i+1} - v_0)|`.
fn polygon_area(vertices: &[Vec2]) -> f32 {
    let mut twice_area_sum = 0.0;

    for i in 0..vertices.len() - 1 {
        twice_area_sum += (vertices[i] - vertices[0]).cross(vertices[i + 1] - vertices[0]);
    }

    (0.5 * twice_area_sum).abs()
}

/// Moment of inertia of a convex polygon about its local origin, given a
/// uniform `density`. See <https://en.wikipedia.org/wiki/List_of_moments_of_inertia>.
fn polygon_inertia(vertices: &[Vec2], density: f32) -> f32 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    let n = vertices.len();
    for i in 0..n {
        let j = if i == 0 { n - 1 } else { i - 1 };
        let v1 = vertices[j];
        let v2 = vertices[i];

        let cross = v1.cross(v2);
        let dot_sum = v1.dot(v1) + v1.dot(v2) + v2.dot(v2);

        numerator += cross * dot_sum;
        denominator += cross;
    }

    density * (numerator / (6.0 * denominator))
}

/// Computes the convex hull of `input` via gift wrapping (Jarvis march).
///
/// The upstream implementation this is grounded on has a colinear tie-break
/// bug: it compares the distance from the current vertex to the *tentative
/// next* vertex against itself, so the "farther point wins on a colinear tie"
/// rule never actually fires. This implementation compares the candidate's
/// distance against the tentative next vertex's distance, as intended.
fn jarvis_march(input: &[Vec2]) -> Vec<Vec2> {
    let mut output = Vec::new();

    if input.len() < 3 {
        return output;
    }

    let mut lowest_index = 0;
    for i in 1..input.len() {
        if input[lowest_index].x > input[i].x {
            lowest_index = i;
        }
    }

    output.push(input[lowest_index]);

    let mut current_index = lowest_index;

    loop {
        let mut next_index = (0..input.len())
            .find(|&i| i != current_index)
            .expect("at least two distinct points after the length check above");

        for i in 0..input.len() {
            if i == current_index || i == next_index {
                continue;
            }

            let direction =
                Vec2::counter_clockwise(input[current_index], input[i], input[next_index]);

            if direction < 0 {
                continue;
            }

            let to_candidate = input[current_index].distance_sqr(input[i]);
            let to_next = input[current_index].distance_sqr(input[next_index]);

            if direction != 0 || to_candidate > to_next {
                next_index = i;
            }
        }

        if next_index == lowest_index {
            break;
        }

        current_index = next_index;
        output.push(input[next_index]);

        if output.len() > MAX_VERTEX_COUNT {
            break;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ]
    }

    #[test]
    fn circle_requires_positive_radius() {
        assert!(Shape::circle(Material::default(), 0.0).is_err());
        assert!(Shape::circle(Material::default(), -1.0).is_err());
        assert!(Shape::circle(Material::default(), 1.0).is_ok());
    }

    #[test]
    fn polygon_requires_at_least_three_points() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert!(Shape::polygon(Material::default(), &pts).is_err());
    }

    #[test]
    fn hull_is_counter_clockwise_and_convex() {
        // Deliberately unordered and with an interior point that must be discarded.
        let pts = [
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, -1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, 1.0),
        ];
        let shape = Shape::polygon(Material::default(), &pts).unwrap();
        let verts = shape.polygon_vertices();
        assert_eq!(verts.len(), 4);

        for i in 0..verts.len() {
            let a = verts[i];
            let b = verts[(i + 1) % verts.len()];
            let c = verts[(i + 2) % verts.len()];
            assert!(Vec2::counter_clockwise(a, b, c) >= 0);
        }
    }

    #[test]
    fn rectangle_area_and_mass() {
        let material = Material {
            density: 2.0,
            ..Default::default()
        };
        let shape = Shape::rectangle(material, 4.0, 2.0).unwrap();
        assert_relative_eq!(shape.area(), 8.0, epsilon = 1e-4);
        assert_relative_eq!(shape.mass(), 16.0, epsilon = 1e-4);
    }

    #[test]
    fn circle_inertia_matches_formula() {
        let material = Material {
            density: 1.0,
            ..Default::default()
        };
        let shape = Shape::circle(material, 2.0).unwrap();
        let expected = 0.5 * shape.mass() * (2.0 * 2.0);
        assert_relative_eq!(shape.inertia(), expected, epsilon = 1e-4);
    }

    #[test]
    fn zero_density_zeroes_mass_and_inertia() {
        let material = Material {
            density: 0.0,
            ..Default::default()
        };
        let shape = Shape::polygon(material, &unit_square()).unwrap();
        assert_relative_eq!(shape.mass(), 0.0);
        assert_relative_eq!(shape.inertia(), 0.0);
    }

    #[test]
    fn contains_point_matches_circle_and_polygon() {
        let tx = Transform::new(Vec2::new(1.0, 1.0), 0.0);
        let circle = Shape::circle(Material::default(), 1.0).unwrap();
        assert!(circle.contains_point(tx, Vec2::new(1.5, 1.0)));
        assert!(!circle.contains_point(tx, Vec2::new(3.0, 1.0)));

        let square = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        assert!(square.contains_point(tx, Vec2::new(1.9, 1.9)));
        assert!(!square.contains_point(tx, Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn circle_aabb() {
        let shape = Shape::circle(Material::default(), 3.0).unwrap();
        let tx = Transform::new(Vec2::new(10.0, -5.0), 0.0);
        let aabb = shape.aabb(tx);
        assert_relative_eq!(aabb.x, 7.0, epsilon = 1e-4);
        assert_relative_eq!(aabb.y, -8.0, epsilon = 1e-4);
        assert_relative_eq!(aabb.width, 6.0, epsilon = 1e-4);
        assert_relative_eq!(aabb.height, 6.0, epsilon = 1e-4);
    }
}
