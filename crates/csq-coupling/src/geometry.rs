use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

type Point = [f64; 3];

const CUBE_A: f64 = 0.577_350_269_189_625_8;

const CUBE: [Point; 8] = [
    [CUBE_A, CUBE_A, CUBE_A],
    [-CUBE_A, CUBE_A, CUBE_A],
    [CUBE_A, -CUBE_A, CUBE_A],
    [-CUBE_A, -CUBE_A, CUBE_A],
    [CUBE_A, CUBE_A, -CUBE_A],
    [-CUBE_A, CUBE_A, -CUBE_A],
    [CUBE_A, -CUBE_A, -CUBE_A],
    [-CUBE_A, -CUBE_A, -CUBE_A],
];

const ICOSAHEDRON: [Point; 12] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [-0.894427, 0.0, -0.447214],
    [0.894427, 0.0, 0.447214],
    [0.723607, -0.525731, -0.447214],
    [0.723607, 0.525731, -0.447214],
    [-0.723607, -0.525731, 0.447214],
    [-0.723607, 0.525731, 0.447214],
    [-0.276393, -0.850651, -0.447214],
    [-0.276393, 0.850651, -0.447214],
    [0.276393, -0.850651, 0.447214],
    [0.276393, 0.850651, 0.447214],
];

/// Dodecahedron vertices scaled onto the unit sphere: the eight cube corners
/// followed by the three golden-ratio rectangles.
fn dodecahedron() -> [Point; 20] {
    let a = CUBE_A;
    let phi = (0.5 + 5f64.sqrt() * 0.5) * a;
    let iphi = a * a / phi;
    [
        [a, a, a],
        [-a, a, a],
        [a, -a, a],
        [-a, -a, a],
        [a, a, -a],
        [-a, a, -a],
        [a, -a, -a],
        [-a, -a, -a],
        [0.0, phi, iphi],
        [0.0, -phi, iphi],
        [0.0, phi, -iphi],
        [0.0, -phi, -iphi],
        [iphi, 0.0, phi],
        [-iphi, 0.0, phi],
        [iphi, 0.0, -phi],
        [-iphi, 0.0, -phi],
        [phi, iphi, 0.0],
        [-phi, iphi, 0.0],
        [phi, -iphi, 0.0],
        [-phi, -iphi, 0.0],
    ]
}

/// Arrangement of the bath sites around the central spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// Sites evenly spaced on a circle in the xy-plane.
    #[default]
    Ring,
    /// Up to eight sites on the corners of a cube.
    Cube,
    /// Up to twenty sites on the vertices of a dodecahedron.
    Dodecahedron,
    /// Up to twelve sites on the vertices of an icosahedron.
    Icosahedron,
    /// Golden-spiral points distributed over a sphere.
    Sphere,
    /// No lattice; couplings follow a Gaussian profile and are supplied explicitly.
    Gauss,
}

impl Geometry {
    /// Lowercase name used in configuration files and result documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Geometry::Ring => "ring",
            Geometry::Cube => "cube",
            Geometry::Dodecahedron => "dodecahedron",
            Geometry::Icosahedron => "icosahedron",
            Geometry::Sphere => "sphere",
            Geometry::Gauss => "gauss",
        }
    }

    /// Cosine of the polar angle of site `j` after tilting the lattice by
    /// `tilt · π` about the x-axis.
    ///
    /// Sites beyond a polyhedron's vertex count, and every site of the
    /// [`Geometry::Gauss`] profile, report zero.
    pub fn polar_angle_cos(&self, j: usize, bath_count: usize, tilt: f64) -> f64 {
        let theta = tilt * PI;
        let rotate = |[_, y, z]: Point| y * theta.sin() + z * theta.cos();
        match self {
            Geometry::Ring => {
                let azimuth = 2.0 * PI * j as f64 / bath_count as f64;
                azimuth.cos() * theta.sin()
            }
            Geometry::Cube => CUBE.get(j).copied().map(rotate).unwrap_or(0.0),
            Geometry::Dodecahedron => dodecahedron().get(j).copied().map(rotate).unwrap_or(0.0),
            Geometry::Icosahedron => ICOSAHEDRON.get(j).copied().map(rotate).unwrap_or(0.0),
            Geometry::Sphere => {
                let n = bath_count as f64;
                let phi = (1.0 - 2.0 * (j as f64 + 0.5) / n).acos();
                let azimuth = PI * (1.0 + 5f64.sqrt()) * j as f64;
                rotate([0.0, azimuth.sin() * phi.sin(), phi.cos()])
            }
            Geometry::Gauss => 0.0,
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
