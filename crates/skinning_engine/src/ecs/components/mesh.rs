//! Mesh component
//!
//! Owns the drawable geometry of an entity and publishes it on the message
//! bus. Deformers (skinning) find the mesh by its content id and rewrite the
//! vertex and normal buffers in place through the read/write entries.

use crate::ecs::{Component, ComponentMessenger, Entity, MessengerError};
use crate::foundation::collections::Shared;
use crate::foundation::math::Vec3Array;
use crate::geometry::{Triangle, TriangleMesh};

/// Suffix appended to the content id for the vertex buffer entry
pub const VERTICES_SUFFIX: &str = "v";

/// Suffix appended to the content id for the normal buffer entry
pub const NORMALS_SUFFIX: &str = "n";

/// Bus id of the vertex buffer for `content_id`
pub fn vertices_id(content_id: &str) -> String {
    format!("{content_id}{VERTICES_SUFFIX}")
}

/// Bus id of the normal buffer for `content_id`
pub fn normals_id(content_id: &str) -> String {
    format!("{content_id}{NORMALS_SUFFIX}")
}

/// Geometry of one entity, shared with deformers and drawables
pub struct MeshComponent {
    name: String,
    entity: Entity,
    content_id: String,
    vertices: Shared<Vec3Array>,
    normals: Shared<Vec3Array>,
    triangles: Shared<Vec<Triangle>>,
    deformable: bool,
}

impl MeshComponent {
    /// Create a deformable mesh component
    pub fn new(name: impl Into<String>, entity: Entity, content_id: impl Into<String>, mesh: TriangleMesh) -> Self {
        Self {
            name: name.into(),
            entity,
            content_id: content_id.into(),
            vertices: Shared::new(mesh.vertices),
            normals: Shared::new(mesh.normals),
            triangles: Shared::new(mesh.triangles),
            deformable: true,
        }
    }

    /// Mark the mesh as static: no setter is published for it
    pub fn with_deformable(mut self, deformable: bool) -> Self {
        self.deformable = deformable;
        self
    }

    /// Content id the mesh is published under
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    /// Whether deformers may write the mesh
    pub fn is_deformable(&self) -> bool {
        self.deformable
    }

    /// Current vertex buffer
    pub fn vertices(&self) -> &Shared<Vec3Array> {
        &self.vertices
    }

    /// Current normal buffer
    pub fn normals(&self) -> &Shared<Vec3Array> {
        &self.normals
    }

    /// Snapshot of the current geometry
    pub fn mesh(&self) -> TriangleMesh {
        snapshot(&self.vertices, &self.normals, &self.triangles)
    }

    /// Publish the mesh and its buffers on the message bus
    pub fn register(&self, messenger: &mut ComponentMessenger) -> Result<(), MessengerError> {
        let (vertices, normals, triangles) = (self.vertices.clone(), self.normals.clone(), self.triangles.clone());
        messenger.register_output::<TriangleMesh>(self.entity, &self.name, &self.content_id, move || {
            snapshot(&vertices, &normals, &triangles)
        })?;

        if self.deformable {
            let (vertices, normals, triangles) =
                (self.vertices.clone(), self.normals.clone(), self.triangles.clone());
            messenger.register_input::<TriangleMesh>(self.entity, &self.name, &self.content_id, move |mesh| {
                match (vertices.write(), normals.write(), triangles.write()) {
                    (Ok(mut v), Ok(mut n), Ok(mut t)) => {
                        v.clone_from(&mesh.vertices);
                        n.clone_from(&mesh.normals);
                        t.clone_from(&mesh.triangles);
                    }
                    _ => log::error!("Mesh buffers poisoned, dropping mesh update"),
                }
            })?;
        }

        messenger.register_read_write(self.entity, &self.name, &vertices_id(&self.content_id), self.vertices.clone())?;
        messenger.register_read_write(self.entity, &self.name, &normals_id(&self.content_id), self.normals.clone())?;

        log::debug!(
            "Mesh '{}' published for entity {} ({} vertices, deformable: {})",
            self.content_id,
            self.entity,
            self.vertices.read_unpoisoned().len(),
            self.deformable
        );
        Ok(())
    }
}

impl Component for MeshComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

fn snapshot(vertices: &Shared<Vec3Array>, normals: &Shared<Vec3Array>, triangles: &Shared<Vec<Triangle>>) -> TriangleMesh {
    TriangleMesh::new(
        vertices.read_unpoisoned().clone(),
        normals.read_unpoisoned().clone(),
        triangles.read_unpoisoned().clone(),
    )
}
