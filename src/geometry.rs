//! Bond geometry: atom pairs to parallel cylinder segments.

use glam::{Mat4, Quat, Vec3};

use crate::scene::{BondOrder, Scene};

const EPSILON: f32 = 1e-6;

/// Reference axes tried, in order, when looking for a vector perpendicular
/// to a bond.
const REFERENCE_AXES: [Vec3; 3] = [Vec3::Z, Vec3::Y, Vec3::X];

pub const BOND_RADIUS: f32 = 0.18;
pub const BOND_SEPARATION: f32 = 0.3;
const DOUBLE_RADIUS_SCALE: f32 = 0.95;
const TRIPLE_RADIUS_SCALE: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub color_hint: Option<[f32; 3]>,
}

impl CylinderSegment {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self {
            start,
            end,
            radius,
            color_hint: None,
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color_hint = Some(color);
        self
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    /// Places a unit cylinder template (radius 1, z in `[0, 1]`) onto this
    /// segment. `None` for zero-length segments.
    pub fn transform(&self) -> Option<Mat4> {
        let delta = self.end - self.start;
        let length = delta.length();
        if length <= EPSILON {
            return None;
        }
        let rotation = cylinder_rotation(delta / length);
        Some(Mat4::from_scale_rotation_translation(
            Vec3::new(self.radius, self.radius, length),
            rotation,
            self.start,
        ))
    }
}

/// Rotation taking world Z onto the unit direction `u`.
pub fn cylinder_rotation(u: Vec3) -> Quat {
    let angle = Vec3::Z.dot(u).clamp(-1.0, 1.0).acos();
    if angle <= 1e-3 {
        return Quat::IDENTITY;
    }
    let axis = Vec3::Z.cross(u);
    let axis = if axis.length() <= EPSILON {
        Vec3::X
    } else {
        axis.normalize()
    };
    Quat::from_axis_angle(axis, angle)
}

/// A unit vector perpendicular to `u`, chosen deterministically.
pub fn perpendicular(u: Vec3) -> Vec3 {
    for axis in REFERENCE_AXES {
        let candidate = u.cross(axis);
        let length = candidate.length();
        if length >= EPSILON {
            return candidate / length;
        }
    }
    log::debug!("no perpendicular found for {u:?}, using X");
    Vec3::X
}

#[derive(Debug, Clone, Copy)]
pub struct BondGeometryBuilder {
    pub radius: f32,
    pub separation: f32,
}

impl Default for BondGeometryBuilder {
    fn default() -> Self {
        Self {
            radius: BOND_RADIUS,
            separation: BOND_SEPARATION,
        }
    }
}

impl BondGeometryBuilder {
    /// Expands one bond into `order.count()` parallel segments, or none when
    /// the two atoms coincide.
    pub fn build(&self, a: Vec3, b: Vec3, order: BondOrder) -> Vec<CylinderSegment> {
        let delta = b - a;
        let length = delta.length();
        if length <= EPSILON {
            log::debug!("skipping zero-length bond at {a:?}");
            return Vec::new();
        }
        let offset = perpendicular(delta / length) * self.separation;
        let (offsets, radius): (&[f32], f32) = match order {
            BondOrder::Single => (&[0.0], self.radius),
            BondOrder::Double => (&[1.0, -1.0], self.radius * DOUBLE_RADIUS_SCALE),
            BondOrder::Triple => (&[0.0, 1.0, -1.0], self.radius * TRIPLE_RADIUS_SCALE),
        };
        offsets
            .iter()
            .map(|&side| {
                let shift = offset * side;
                CylinderSegment::new(a + shift, b + shift, radius)
            })
            .collect()
    }

    pub fn build_scene(&self, scene: &Scene) -> Vec<CylinderSegment> {
        scene
            .bonds()
            .iter()
            .flat_map(|bond| {
                let (a, b) = scene.bond_endpoints(bond);
                self.build(a, b, bond.order)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    fn same_segment_up_to_swap(x: &CylinderSegment, y: &CylinderSegment) -> bool {
        (x.radius - y.radius).abs() < 1e-6
            && ((approx(x.start, y.start) && approx(x.end, y.end))
                || (approx(x.start, y.end) && approx(x.end, y.start)))
    }

    #[test]
    fn emits_one_segment_per_order() {
        let builder = BondGeometryBuilder::default();
        let a = Vec3::new(0.3, -1.0, 2.0);
        let b = Vec3::new(1.5, 0.5, -0.4);
        assert_eq!(builder.build(a, b, BondOrder::Single).len(), 1);
        assert_eq!(builder.build(a, b, BondOrder::Double).len(), 2);
        assert_eq!(builder.build(a, b, BondOrder::Triple).len(), 3);
    }

    #[test]
    fn zero_length_bond_is_skipped() {
        let builder = BondGeometryBuilder::default();
        let p = Vec3::new(1.0, 2.0, 3.0);
        for order in [BondOrder::Single, BondOrder::Double, BondOrder::Triple] {
            assert!(builder.build(p, p, order).is_empty());
        }
    }

    #[test]
    fn swapping_atoms_gives_the_same_segments() {
        let builder = BondGeometryBuilder::default();
        let pairs = [
            (Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.5)),
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 3.0)),
            (Vec3::new(1.0, -2.0, 0.0), Vec3::new(1.0, 4.0, 0.0)),
        ];
        for (a, b) in pairs {
            for order in [BondOrder::Single, BondOrder::Double, BondOrder::Triple] {
                let forward = builder.build(a, b, order);
                let backward = builder.build(b, a, order);
                assert_eq!(forward.len(), backward.len());
                for segment in &forward {
                    assert!(
                        backward
                            .iter()
                            .any(|other| same_segment_up_to_swap(segment, other)),
                        "{order:?} {a:?}-{b:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn double_bond_offsets_and_radii() {
        let builder = BondGeometryBuilder::default();
        let segments = builder.build(Vec3::ZERO, Vec3::new(2.4, 0.0, 0.0), BondOrder::Double);
        // Along X the first reference axis (Z) gives a perpendicular along -Y.
        assert!(approx(segments[0].start, Vec3::new(0.0, -0.3, 0.0)));
        assert!(approx(segments[1].start, Vec3::new(0.0, 0.3, 0.0)));
        for segment in &segments {
            assert!((segment.radius - BOND_RADIUS * 0.95).abs() < 1e-6);
            assert!((segment.length() - 2.4).abs() < 1e-5);
        }
    }

    #[test]
    fn triple_bond_keeps_a_centered_segment() {
        let builder = BondGeometryBuilder::default();
        let a = Vec3::new(-1.3, 0.0, 0.0);
        let b = Vec3::new(1.3, 0.0, 0.0);
        let segments = builder.build(a, b, BondOrder::Triple);
        assert!(approx(segments[0].start, a) && approx(segments[0].end, b));
        assert!(segments
            .iter()
            .all(|segment| (segment.radius - BOND_RADIUS * 0.9).abs() < 1e-6));
    }

    #[test]
    fn perpendicular_along_reference_axis_is_deterministic() {
        let p = perpendicular(Vec3::Z);
        assert!(p.dot(Vec3::Z).abs() < 1e-6);
        assert!((p.length() - 1.0).abs() < 1e-6);
        assert_eq!(p, perpendicular(Vec3::Z));
        assert!(approx(perpendicular(-Vec3::Z), -p));
    }

    #[test]
    fn transform_maps_template_onto_segment() {
        let segment = CylinderSegment::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 4.0, 1.0), 0.2);
        let transform = segment.transform().unwrap();
        assert!(approx(transform.transform_point3(Vec3::ZERO), segment.start));
        assert!(approx(transform.transform_point3(Vec3::Z), segment.end));
        let rim = transform.transform_point3(Vec3::X) - segment.start;
        assert!((rim.length() - 0.2).abs() < 1e-5);
        assert!(rim.dot(Vec3::Y).abs() < 1e-5);
    }

    #[test]
    fn rotation_handles_antiparallel_direction() {
        let rotated = cylinder_rotation(-Vec3::Z) * Vec3::Z;
        assert!(approx(rotated, -Vec3::Z));
        assert!(CylinderSegment::new(Vec3::ONE, Vec3::ONE, 0.1).transform().is_none());
    }
}
