//! Indexed triangle meshes and OBJ loading.
//!
//! The renderer only needs positions: faces are shaded flat and the
//! barycentric coordinates of a hit double as surface coordinates.

use std::path::Path;

use ember_math::{Aabb, Point3, Vec3};
use thiserror::Error;

/// Errors that can occur while loading mesh geometry.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("No triangles found in {0}")]
    NoTriangles(String),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Vertex positions plus triangle indices (every 3 indices form a triangle).
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<Point3>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(positions: Vec<Point3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Load and triangulate every model in an OBJ file into one mesh.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let base = positions.len() as u32;
            positions.extend(
                model
                    .mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
            indices.extend(model.mesh.indices.iter().map(|i| base + i));
        }

        let mesh = Self::new(positions, indices);
        if mesh.triangle_count() == 0 {
            return Err(MeshError::NoTriangles(path.display().to_string()));
        }

        log::debug!(
            "Loaded OBJ {}: {} models, {} vertices, {} triangles",
            path.display(),
            models.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        Ok(mesh)
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Point3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::from_points(min, max)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Triangle corners as `[v0, v1, v2]`, skipping faces with bad indices.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |face| {
            let corner = |i: u32| self.positions.get(i as usize).copied();
            match (corner(face[0]), corner(face[1]), corner(face[2])) {
                (Some(v0), Some(v1), Some(v2)) => Some([v0, v1, v2]),
                _ => {
                    log::warn!(
                        "Invalid triangle indices: {:?}, vertex count: {}",
                        face,
                        self.positions.len()
                    );
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn unit_square() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![0, 1, 2, 1, 3, 2])
    }

    #[test]
    fn test_mesh_counts() {
        let mesh = unit_square();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2]);

        assert_eq!(mesh.bounds.x.min, -1.0);
        assert_eq!(mesh.bounds.x.max, 4.0);
        assert_eq!(mesh.bounds.z.min, -3.0);
        assert_eq!(mesh.bounds.z.max, 6.0);
    }

    #[test]
    fn test_empty_mesh_has_empty_bounds() {
        let mesh = Mesh::new(Vec::new(), Vec::new());
        assert_eq!(mesh.bounds, Aabb::EMPTY);
        assert_eq!(mesh.triangles().count(), 0);
    }

    #[test]
    fn test_triangles_skip_bad_indices() {
        let mut mesh = unit_square();
        mesh.indices.extend([0, 1, 42]);

        let triangles: Vec<_> = mesh.triangles().collect();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1], [mesh.positions[1], mesh.positions[3], mesh.positions[2]]);
    }

    #[test]
    fn test_load_obj_triangulates_quads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4").unwrap();

        let mesh = Mesh::load_obj(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_load_obj_missing_file() {
        let err = Mesh::load_obj("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, MeshError::Obj { .. }));
    }
}
