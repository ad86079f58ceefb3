use rayon::prelude::*;

use crate::math_prelude::*;

use super::model::{Face, Model};
use super::shader::{ScreenVertex, ShadedTriangle, SurfaceAttributes};
use super::transform::FrameTransform;

/// Why a face was dropped before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Culled {
    /// A corner has a non-positive (or non-finite) clip-space `w`.
    BehindEye,
    /// A corner lies in front of the eye but closer than the near plane or
    /// beyond the far plane.
    OutsideDepthRange,
    /// A corner references a position the model does not have.
    InvalidIndex,
}

/// Screen-space triangles of one frame, in face order.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub triangles: Vec<ShadedTriangle>,
    pub behind_eye: usize,
    pub outside_depth_range: usize,
    pub invalid: usize,
}

/// Transforms, culls and perspective-divides every face of the model.
///
/// World-space attributes are carried along untouched for lighting. Faces
/// where any corner lacks a normal get the flat face normal on all three
/// corners; texture coordinates are only used when every corner has one.
pub fn assemble_triangles(model: &Model, transform: &FrameTransform) -> Assembly {
    let clip: Vec<Vec4> = model
        .positions
        .par_iter()
        .map(|position| transform.view_projection * *position)
        .collect();

    let results: Vec<Result<ShadedTriangle, Culled>> = model
        .faces
        .par_iter()
        .map(|face| assemble_face(model, &clip, transform, face))
        .collect();

    let mut assembly = Assembly {
        triangles: Vec::with_capacity(results.len()),
        ..Default::default()
    };
    for result in results {
        match result {
            Ok(triangle) => assembly.triangles.push(triangle),
            Err(Culled::BehindEye) => assembly.behind_eye += 1,
            Err(Culled::OutsideDepthRange) => assembly.outside_depth_range += 1,
            Err(Culled::InvalidIndex) => assembly.invalid += 1,
        }
    }
    assembly
}

fn assemble_face(
    model: &Model,
    clip: &[Vec4],
    transform: &FrameTransform,
    face: &Face,
) -> Result<ShadedTriangle, Culled> {
    let mut corners = [Vec4::ZERO; 3];
    for (corner, vertex) in corners.iter_mut().zip(&face.vertices) {
        *corner = *clip.get(vertex.position).ok_or(Culled::InvalidIndex)?;
    }
    if corners.iter().any(|c| c.w <= 0.0 || !c.is_finite()) {
        return Err(Culled::BehindEye);
    }
    // Clip-space depth range of the projection, `0 <= z <= w`.
    if corners.iter().any(|c| c.z < 0.0 || c.z > c.w) {
        return Err(Culled::OutsideDepthRange);
    }

    let vertices = corners.map(|c| {
        let inv_w = 1.0 / c.w;
        let ndc = c.truncate() * inv_w;
        ScreenVertex::new(transform.viewport.project_point3(ndc), inv_w)
    });

    let positions = face
        .vertices
        .map(|v| cartesian(model.positions[v.position]));
    let normals = face
        .vertices
        .map(|v| v.normal.and_then(|i| model.normals.get(i)).copied());
    let texcoords = face
        .vertices
        .map(|v| v.texcoord.and_then(|i| model.texcoords.get(i)).map(|t| t.truncate()));

    let flat_normal = (positions[1] - positions[0])
        .cross(positions[2] - positions[0])
        .normalize_or_zero();
    let textured = texcoords.iter().all(Option::is_some);
    let smooth = normals.iter().all(Option::is_some);

    let mut attributes = [SurfaceAttributes::default(); 3];
    for (i, attribute) in attributes.iter_mut().enumerate() {
        attribute.position = positions[i];
        attribute.normal = if smooth {
            normals[i].unwrap_or(flat_normal)
        } else {
            flat_normal
        };
        if textured {
            attribute.texcoord = texcoords[i].unwrap_or_default();
        }
    }

    Ok(ShadedTriangle {
        vertices,
        attributes,
        textured,
    })
}

// Homogeneous to world space, matching what the projection sees.
fn cartesian(position: Vec4) -> Vec3 {
    if position.w != 0.0 {
        position.truncate() / position.w
    } else {
        position.truncate()
    }
}
