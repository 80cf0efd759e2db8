//! JSON scene description consumed by the CLI: gravity, broad-phase cell
//! size, and a flat list of bodies to seed a [`World`] with.
//!
//! Deliberately a separate set of types from `impulse2d_core`'s `Shape`/
//! `Body` rather than a direct `#[derive(Deserialize)]` on those — the core
//! types carry derived fields (a polygon's cached `area`, a body's cached
//! `aabb`) that have no business appearing in a hand-written scene file.

use std::rc::Rc;

use anyhow::{bail, Result};
use serde::Deserialize;

use impulse2d_core::{Body, BodyType, Material, Shape, Vec2, World};

#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    gravity: Vec2Spec,
    cell_size: f32,
    #[serde(default)]
    bodies: Vec<BodySpec>,
}

impl Scene {
    /// Builds a `World` from this scene, adding every body in source order
    /// (so the body at scene index `i` lands at world index `i`).
    pub fn build_world(&self) -> Result<World> {
        let mut world = World::new(self.gravity.into(), self.cell_size)?;

        for (index, spec) in self.bodies.iter().enumerate() {
            let shape = Rc::new(spec.shape.build()?);
            let mut body = Body::new(spec.body_type.into(), shape);
            body.set_position(spec.position.into());
            body.set_angle(spec.angle);
            world
                .add_body(body)
                .map_err(|err| anyhow::anyhow!("adding body {index}: {err}"))?;
        }

        Ok(world)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Vec2Spec {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

impl From<Vec2Spec> for Vec2 {
    fn from(spec: Vec2Spec) -> Self {
        Vec2::new(spec.x, spec.y)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyTypeSpec {
    Static,
    Kinematic,
    Dynamic,
}

impl From<BodyTypeSpec> for BodyType {
    fn from(spec: BodyTypeSpec) -> Self {
        match spec {
            BodyTypeSpec::Static => BodyType::Static,
            BodyTypeSpec::Kinematic => BodyType::Kinematic,
            BodyTypeSpec::Dynamic => BodyType::Dynamic,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BodySpec {
    #[serde(rename = "type")]
    body_type: BodyTypeSpec,
    shape: ShapeSpec,
    #[serde(default)]
    position: Vec2Spec,
    #[serde(default)]
    angle: f32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ShapeSpec {
    Circle {
        radius: f32,
        #[serde(default)]
        material: MaterialSpec,
    },
    Rectangle {
        width: f32,
        height: f32,
        #[serde(default)]
        material: MaterialSpec,
    },
    Polygon {
        vertices: Vec<Vec2Spec>,
        #[serde(default)]
        material: MaterialSpec,
    },
}

impl ShapeSpec {
    fn build(&self) -> Result<Shape> {
        let shape = match self {
            ShapeSpec::Circle { radius, material } => Shape::circle((*material).into(), *radius)?,
            ShapeSpec::Rectangle {
                width,
                height,
                material,
            } => Shape::rectangle((*material).into(), *width, *height)?,
            ShapeSpec::Polygon { vertices, material } => {
                if vertices.len() < 3 {
                    bail!("polygon shape needs at least 3 vertices, got {}", vertices.len());
                }
                let points: Vec<Vec2> = vertices.iter().map(|v| (*v).into()).collect();
                Shape::polygon((*material).into(), &points)?
            }
        };
        Ok(shape)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MaterialSpec {
    #[serde(default = "default_density")]
    density: f32,
    #[serde(default)]
    friction: f32,
    #[serde(default)]
    restitution: f32,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            density: default_density(),
            friction: 0.0,
            restitution: 0.0,
        }
    }
}

fn default_density() -> f32 {
    1.0
}

impl From<MaterialSpec> for Material {
    fn from(spec: MaterialSpec) -> Self {
        Material {
            density: spec.density,
            friction: spec.friction,
            restitution: spec.restitution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_scene() {
        let json = r#"{
            "cell_size": 4.0,
            "bodies": [
                { "type": "static", "shape": { "kind": "rectangle", "width": 10, "height": 1 } },
                { "type": "dynamic", "shape": { "kind": "circle", "radius": 0.5 }, "position": { "x": 0, "y": -5 } }
            ]
        }"#;

        let scene: Scene = serde_json::from_str(json).unwrap();
        let world = scene.build_world().unwrap();
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn rejects_a_polygon_with_too_few_vertices() {
        let json = r#"{
            "cell_size": 4.0,
            "bodies": [
                { "type": "dynamic", "shape": { "kind": "polygon", "vertices": [{"x":0,"y":0},{"x":1,"y":0}] } }
            ]
        }"#;

        let scene: Scene = serde_json::from_str(json).unwrap();
        assert!(scene.build_world().is_err());
    }
}
