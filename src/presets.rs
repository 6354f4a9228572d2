//! Built-in molecule geometries.
//!
//! Coordinates are illustrative, not chemically exact, and are kept as the
//! literal tables the viewer has always shown.

use std::collections::HashMap;

use crate::scene::{Atom, Bond, BondOrder, Scene};

pub const DEFAULT_PRESET: &str = "H2O";

/// Canonical names in menu order, each followed by its accepted aliases.
const PRESET_NAMES: &[(&str, &[&str])] = &[
    ("H2O", &[]),
    ("CO2", &[]),
    ("CH4", &[]),
    ("NH3", &[]),
    ("O2", &[]),
    ("N2", &[]),
    ("CO", &[]),
    ("Etanol", &["ethanol"]),
    ("Benceno", &["benzene"]),
    ("NaCl", &[]),
    ("Metano Clorado", &["chloromethane"]),
    ("Etileno", &["ethylene"]),
    ("Acetileno", &["acetylene"]),
    ("Glucosa", &["glucose"]),
];

pub struct PresetTable {
    scenes: HashMap<&'static str, Scene>,
    aliases: HashMap<String, &'static str>,
}

impl PresetTable {
    pub fn new() -> Self {
        let mut scenes = HashMap::new();
        let mut aliases = HashMap::new();
        for (canonical, extra) in PRESET_NAMES {
            scenes.insert(*canonical, build(canonical));
            aliases.insert(normalize_name(canonical), *canonical);
            for alias in *extra {
                aliases.insert(normalize_name(alias), *canonical);
            }
        }
        Self { scenes, aliases }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        PRESET_NAMES.iter().map(|(name, _)| *name)
    }

    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        self.aliases.get(&normalize_name(name)).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Scene> {
        self.resolve(name).and_then(|canonical| self.scenes.get(canonical))
    }

    /// Looks a preset up by any accepted spelling, degrading to water.
    pub fn load(&self, name: &str) -> Scene {
        match self.get(name) {
            Some(scene) => scene.clone(),
            None => {
                log::warn!("unknown molecule {name:?}, showing {DEFAULT_PRESET}");
                build(DEFAULT_PRESET)
            }
        }
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

fn scene(atoms: &[(&str, [f32; 3])], bonds: &[(usize, usize, u8)]) -> Scene {
    Scene::new(
        atoms
            .iter()
            .map(|(element, position)| Atom::new(*element, *position))
            .collect(),
        bonds
            .iter()
            .map(|&(a, b, order)| Bond::new(a, b, BondOrder::from_raw(order.into()))),
    )
}

fn polar(radius: f32, degrees: f32) -> [f32; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [radius * cos, radius * sin, 0.0]
}

fn build(canonical: &str) -> Scene {
    match canonical {
        "CO2" => scene(
            &[
                ("O", [-2.0, 0.0, 0.0]),
                ("C", [0.0, 0.0, 0.0]),
                ("O", [2.0, 0.0, 0.0]),
            ],
            &[(0, 1, 1), (1, 2, 1)],
        ),
        "CH4" => scene(
            &[
                ("C", [0.0, 0.0, 0.0]),
                ("H", [1.5, 1.5, 1.5]),
                ("H", [-1.5, -1.5, 1.5]),
                ("H", [-1.5, 1.5, -1.5]),
                ("H", [1.5, -1.5, -1.5]),
            ],
            &[(0, 1, 1), (0, 2, 1), (0, 3, 1), (0, 4, 1)],
        ),
        "NH3" => scene(
            &[
                ("N", [0.0, 0.5, 0.0]),
                ("H", [1.5, -0.5, 0.0]),
                ("H", [-1.5, -0.5, 0.0]),
                ("H", [0.0, -0.5, 1.5]),
            ],
            &[(0, 1, 1), (0, 2, 1), (0, 3, 1)],
        ),
        "O2" => scene(
            &[("O", [-1.2, 0.0, 0.0]), ("O", [1.2, 0.0, 0.0])],
            &[(0, 1, 2)],
        ),
        "N2" => scene(
            &[("N", [-1.3, 0.0, 0.0]), ("N", [1.3, 0.0, 0.0])],
            &[(0, 1, 3)],
        ),
        "CO" => scene(
            &[("C", [0.0, 0.0, 0.0]), ("O", [1.3, 0.0, 0.0])],
            &[(0, 1, 3)],
        ),
        "Etanol" => scene(
            &[
                ("C", [0.0, 0.0, 0.0]),
                ("C", [1.5, 0.0, 0.0]),
                ("O", [3.0, 0.2, 0.0]),
                ("H", [-0.9, 0.9, 0.0]),
                ("H", [-0.9, -0.9, 0.0]),
                ("H", [0.0, 0.0, 1.1]),
                ("H", [1.5, 1.0, 0.9]),
                ("H", [1.5, -1.0, -0.9]),
                ("H", [3.8, 0.9, 0.0]),
            ],
            &[
                (0, 1, 1),
                (1, 2, 1),
                (0, 3, 1),
                (0, 4, 1),
                (0, 5, 1),
                (1, 6, 1),
                (1, 7, 1),
                (2, 8, 1),
            ],
        ),
        "Benceno" => benzene(),
        "NaCl" => scene(
            &[("Na", [-1.5, 0.0, 0.0]), ("Cl", [1.5, 0.0, 0.0])],
            &[(0, 1, 1)],
        ),
        "Metano Clorado" => scene(
            &[
                ("C", [0.0, 0.0, 0.0]),
                ("Cl", [2.4, 0.0, 0.0]),
                ("H", [-1.5, -1.5, 1.5]),
                ("H", [-1.5, 1.5, -1.5]),
                ("H", [1.5, -1.5, -1.5]),
            ],
            &[(0, 1, 1), (0, 2, 1), (0, 3, 1), (0, 4, 1)],
        ),
        "Etileno" => scene(
            &[
                ("C", [-1.2, 0.0, 0.0]),
                ("C", [1.2, 0.0, 0.0]),
                ("H", [-1.2, 1.0, 0.0]),
                ("H", [-1.2, -1.0, 0.0]),
                ("H", [1.2, 1.0, 0.0]),
                ("H", [1.2, -1.0, 0.0]),
            ],
            &[(0, 1, 2), (0, 2, 1), (0, 3, 1), (1, 4, 1), (1, 5, 1)],
        ),
        "Acetileno" => scene(
            &[
                ("C", [-1.5, 0.0, 0.0]),
                ("C", [1.5, 0.0, 0.0]),
                ("H", [-2.6, 0.0, 0.0]),
                ("H", [2.6, 0.0, 0.0]),
            ],
            &[(0, 1, 3), (0, 2, 1), (1, 3, 1)],
        ),
        "Glucosa" => glucose(),
        _ => scene(
            &[
                ("O", [0.0, 0.0, 0.0]),
                ("H", [1.5, 1.0, 0.0]),
                ("H", [-1.5, 1.0, 0.0]),
            ],
            &[(0, 1, 1), (0, 2, 1)],
        ),
    }
}

// Planar hexagon with alternating double/single ring bonds and radial H.
fn benzene() -> Scene {
    let mut atoms = Vec::with_capacity(12);
    for i in 0..6 {
        atoms.push(Atom::new("C", polar(2.0, 60.0 * i as f32)));
    }
    for i in 0..6 {
        atoms.push(Atom::new("H", polar(3.0, 60.0 * i as f32)));
    }
    let mut bonds = Vec::with_capacity(12);
    for i in 0..6 {
        let order = if i % 2 == 0 {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
        bonds.push(Bond::new(i, (i + 1) % 6, order));
        bonds.push(Bond::single(i, 6 + i));
    }
    Scene::new(atoms, bonds)
}

// Six-carbon ring; each carbon carries an OH group and an H rotated 25°.
fn glucose() -> Scene {
    let mut atoms = Vec::with_capacity(24);
    let mut bonds = Vec::with_capacity(24);
    let mut carbons = Vec::with_capacity(6);
    for i in 0..6 {
        let angle = 60.0 * i as f32;
        let carbon = atoms.len();
        carbons.push(carbon);
        atoms.push(Atom::new("C", polar(2.0, angle)));
        atoms.push(Atom::new("O", polar(3.0, angle)));
        atoms.push(Atom::new("H", polar(3.8, angle)));
        atoms.push(Atom::new("H", polar(3.0, angle + 25.0)));
        bonds.push(Bond::single(carbon, carbon + 1));
        bonds.push(Bond::single(carbon + 1, carbon + 2));
        bonds.push(Bond::single(carbon, carbon + 3));
    }
    for i in 0..6 {
        bonds.push(Bond::single(carbons[i], carbons[(i + 1) % 6]));
    }
    Scene::new(atoms, bonds)
}
