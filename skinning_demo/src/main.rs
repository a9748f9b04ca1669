//! Skinning demo
//!
//! Bends a skinned tube at its elbow with each skinning algorithm and logs
//! how well the joint keeps its volume.
//!
//! Usage: `skinning_demo [config.toml | config.ron]`

use skinning_engine::animation::SkeletonError;
use skinning_engine::ecs::MessengerError;
use skinning_engine::foundation::collections::PoisonedLock;
use skinning_engine::foundation::logging;
use skinning_engine::foundation::math::constants::{HALF_PI, PI};
use skinning_engine::prelude::*;
use skinning_engine::skinning::gpu;
use skinning_engine::core::ConfigError;
use thiserror::Error;

const SEGMENTS: usize = 12;
const SIDES: usize = 8;
const LENGTH: f32 = 4.0;
const RADIUS: f32 = 0.5;
const FRAMES: usize = 30;
const CONTENT_ID: &str = "tube";

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
    #[error(transparent)]
    Messenger(#[from] MessengerError),
    #[error(transparent)]
    Skinning(#[from] SkinningError),
    #[error(transparent)]
    Poisoned(#[from] PoisonedLock),
}

struct JointReport {
    mean_radius: f32,
    gpu_bytes: usize,
}

/// Tube along X, elbow at the origin
fn build_tube() -> (TriangleMesh, WeightMatrix) {
    let mut vertices = Vec::with_capacity((SEGMENTS + 1) * SIDES);
    let mut rows = Vec::with_capacity((SEGMENTS + 1) * SIDES);

    for ring in 0..=SEGMENTS {
        let x = LENGTH * ring as f32 / SEGMENTS as f32 - LENGTH * 0.5;
        // Smooth falloff over one unit around the elbow
        let t = (x + 0.5).clamp(0.0, 1.0);
        let lower = t * t * (3.0 - 2.0 * t);
        for side in 0..SIDES {
            let angle = 2.0 * PI * side as f32 / SIDES as f32;
            vertices.push(Vec3::new(x, RADIUS * angle.cos(), RADIUS * angle.sin()));
            rows.push(vec![1.0 - lower, lower]);
        }
    }

    let mut triangles = Vec::with_capacity(SEGMENTS * SIDES * 2);
    for ring in 0..SEGMENTS {
        for side in 0..SIDES {
            let a = (ring * SIDES + side) as u32;
            let b = (ring * SIDES + (side + 1) % SIDES) as u32;
            let (c, d) = (a + SIDES as u32, b + SIDES as u32);
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }

    (
        TriangleMesh::with_computed_normals(vertices, triangles),
        WeightMatrix::from_rows(2, &rows),
    )
}

fn build_skeleton() -> Result<Skeleton, SkeletonError> {
    let mut skeleton = Skeleton::new("tube_rig");
    let upper = skeleton.add_bone("upper", None, Transform::from_position(Vec3::new(-LENGTH * 0.5, 0.0, 0.0)))?;
    skeleton.add_bone("lower", Some(upper), Transform::from_position(Vec3::new(LENGTH * 0.5, 0.0, 0.0)))?;
    Ok(skeleton)
}

fn bend_tube(kind: SkinningType, config: &EngineConfig) -> Result<JointReport, DemoError> {
    let mut world = World::new();
    let entity = world.create_entity();
    let (mesh, weights) = build_tube();

    let mesh = MeshComponent::new("mesh", entity, CONTENT_ID, mesh);
    let animation = AnimationComponent::new("animation", entity, CONTENT_ID, build_skeleton()?, weights);
    mesh.register(world.messenger_mut())?;
    animation.register(world.messenger_mut())?;

    let mut system = SkinningSystem::new(config.skinning.with_skinning_type(kind));
    let handle = system.handle_weights_loading(&mut world, entity, CONTENT_ID)?;

    for frame in 1..=FRAMES {
        let angle = HALF_PI * frame as f32 / FRAMES as f32;
        let elbow = Transform::from_position_rotation(
            Vec3::new(LENGTH * 0.5, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::z_axis(), angle),
        );
        animation.skeleton().write()?.set_transform(1, elbow, SpaceType::Local)?;
        system.update(&world)?;
    }

    let vertices = mesh.vertices().snapshot()?;
    let middle = SEGMENTS / 2 * SIDES;
    let mean_radius = vertices[middle..middle + SIDES]
        .iter()
        .map(|vertex| vertex.norm())
        .sum::<f32>()
        / SIDES as f32;

    let gpu_bytes = system
        .component(handle)
        .map(|component| component.dual_quaternions().snapshot())
        .transpose()?
        .map_or(0, |dq| gpu::as_bytes(&gpu::pack_dual_quaternions(&dq)).len());

    Ok(JointReport { mean_radius, gpu_bytes })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(&path)?,
        None => EngineConfig::new("skinning_demo"),
    };
    logging::init_with_config(&config.logging);
    log::info!("Starting {}", config.application_name);

    for kind in [SkinningType::Lbs, SkinningType::Dqs, SkinningType::Cor] {
        let report = bend_tube(kind, &config)?;
        log::info!(
            "{}: elbow radius {:.3} ({:.0}% of rest), dual quaternion buffer {} bytes",
            kind,
            report.mean_radius,
            100.0 * report.mean_radius / RADIUS,
            report.gpu_bytes
        );
    }
    Ok(())
}
