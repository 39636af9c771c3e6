use bevy::prelude::*;
use constants::render_settings::ANNOTATION_PLANE_HEIGHT;

/// World-space ray under the window cursor.
/// Both vertex placement and vertex dragging resolve their ray through this
/// one helper so the two paths cannot disagree on pointer coordinates.
pub fn cursor_ray(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    cursor_pos: Vec2,
) -> Option<Ray3d> {
    camera.viewport_to_world(camera_transform, cursor_pos).ok()
}

/// Ray intersection with the horizontal plane at `plane_height`.
/// Returns `None` for near-parallel rays and for intersections behind the
/// ray origin; callers treat a miss as "ignore this event".
pub fn plane_hit(ray: &Ray3d, plane_height: f32) -> Option<Vec3> {
    let dir = ray.direction.as_vec3();
    if dir.y.abs() < 0.001 {
        return None;
    }
    let t = (plane_height - ray.origin.y) / dir.y;
    if t > 0.0 {
        Some(ray.origin + dir * t)
    } else {
        None
    }
}

/// Nearest vertex handle hit by the ray, as (index, ray parameter).
/// Index order follows `centers`, which is index-aligned with the ring.
pub fn nearest_marker_hit(ray: &Ray3d, centers: &[Vec3], radius: f32) -> Option<(usize, f32)> {
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let mut best: Option<(usize, f32)> = None;
    for (i, center) in centers.iter().enumerate() {
        if let Some(t) = ray_hits_sphere(origin, dir, *center, radius) {
            if best.is_none() || t < best.unwrap().1 {
                best = Some((i, t));
            }
        }
    }
    best
}

// Analytic ray-sphere intersection, returns nearest t >= 0 or None.
// Assumes `dir` is unit length (it comes from a Dir3).
fn ray_hits_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_disc;
    if far >= 0.0 { Some(far) } else { None }
}

/// Clamp a reference-plane hit onto the annotation plane. Edited vertices
/// always carry the annotation height, whatever surface the ray met.
pub fn onto_annotation_plane(hit: Vec3) -> Vec3 {
    Vec3::new(hit.x, ANNOTATION_PLANE_HEIGHT, hit.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 100.0, z), Dir3::NEG_Y)
    }

    #[test]
    fn plane_hit_is_deterministic() {
        let ray = down_ray(3.0, -7.0);
        let first = plane_hit(&ray, 0.0);
        let second = plane_hit(&ray, 0.0);
        assert_eq!(first, second, "same ray must yield the same hit");
        assert_eq!(first, Some(Vec3::new(3.0, 0.0, -7.0)));
    }

    #[test]
    fn parallel_ray_misses_plane() {
        let ray = Ray3d::new(Vec3::new(0.0, 10.0, 0.0), Dir3::X);
        assert_eq!(plane_hit(&ray, 0.0), None);
    }

    #[test]
    fn plane_behind_origin_misses() {
        let ray = Ray3d::new(Vec3::new(0.0, 10.0, 0.0), Dir3::Y);
        assert_eq!(plane_hit(&ray, 0.0), None);
    }

    #[test]
    fn nearest_marker_wins_over_farther_one() {
        // Two handles stacked along the ray; the upper one is hit first.
        let ray = down_ray(0.0, 0.0);
        let centers = [Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 50.0, 0.0)];
        let (index, t) = nearest_marker_hit(&ray, &centers, 1.0).expect("both spheres on ray");
        assert_eq!(index, 1);
        assert!(t < 50.0);
    }

    #[test]
    fn marker_off_ray_misses() {
        let ray = down_ray(0.0, 0.0);
        let centers = [Vec3::new(10.0, 5.0, 0.0)];
        assert_eq!(nearest_marker_hit(&ray, &centers, 1.0), None);
    }

    #[test]
    fn annotation_projection_keeps_plane_coordinates() {
        let hit = Vec3::new(4.0, 0.0, 9.0);
        let projected = onto_annotation_plane(hit);
        assert_eq!(projected.x, hit.x);
        assert_eq!(projected.z, hit.z);
        assert_eq!(projected.y, ANNOTATION_PLANE_HEIGHT);
    }
}
