use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: String,
    pub position: Vec3,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            element: element.into(),
            position: Vec3::from_array(position),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Maps a raw integer order onto the three drawable orders.
    pub fn from_raw(order: i64) -> Self {
        match order {
            i64::MIN..=1 => BondOrder::Single,
            2 => BondOrder::Double,
            _ => BondOrder::Triple,
        }
    }

    pub fn count(self) -> usize {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub atom_a: usize,
    pub atom_b: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(atom_a: usize, atom_b: usize, order: BondOrder) -> Self {
        Self {
            atom_a,
            atom_b,
            order,
        }
    }

    pub fn single(atom_a: usize, atom_b: usize) -> Self {
        Self::new(atom_a, atom_b, BondOrder::Single)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Scene {
    /// Builds a scene, silently dropping bonds that reference missing atoms
    /// or connect an atom to itself.
    pub fn new(atoms: Vec<Atom>, bonds: impl IntoIterator<Item = Bond>) -> Self {
        let count = atoms.len();
        let bonds = bonds
            .into_iter()
            .filter(|bond| {
                let valid = bond.atom_a < count && bond.atom_b < count && bond.atom_a != bond.atom_b;
                if !valid {
                    log::debug!(
                        "dropping bond {}-{} (scene has {count} atoms)",
                        bond.atom_a,
                        bond.atom_b
                    );
                }
                valid
            })
            .collect();
        Self { atoms, bonds }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn bond_endpoints(&self, bond: &Bond) -> (Vec3, Vec3) {
        (
            self.atoms[bond.atom_a].position,
            self.atoms[bond.atom_b].position,
        )
    }

    pub fn centroid(&self) -> Vec3 {
        if self.atoms.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self.atoms.iter().map(|atom| atom.position).sum();
        sum / self.atoms.len() as f32
    }

    /// Returns a copy translated so the mean atom position is the origin.
    pub fn recenter(&self) -> Scene {
        let center = self.centroid();
        Scene {
            atoms: self
                .atoms
                .iter()
                .map(|atom| Atom {
                    element: atom.element.clone(),
                    position: atom.position - center,
                })
                .collect(),
            bonds: self.bonds.clone(),
        }
    }

    /// Largest distance of any atom from the origin.
    pub fn bounding_radius(&self) -> f32 {
        self.atoms
            .iter()
            .map(|atom| atom.position.length())
            .fold(0.0_f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_and_self_bonds_are_dropped() {
        let atoms = vec![Atom::new("O", [0.0, 0.0, 0.0]), Atom::new("H", [1.0, 0.0, 0.0])];
        let scene = Scene::new(
            atoms,
            [Bond::single(0, 1), Bond::single(0, 5), Bond::single(1, 1)],
        );
        assert_eq!(scene.bonds(), &[Bond::single(0, 1)]);
    }

    #[test]
    fn recenter_moves_mean_to_origin() {
        let atoms = vec![
            Atom::new("C", [1.0, 2.0, 3.0]),
            Atom::new("O", [4.0, -2.0, 7.5]),
            Atom::new("H", [-0.5, 9.0, 1.0]),
        ];
        let scene = Scene::new(atoms, []).recenter();
        assert!(scene.centroid().length() < 1e-5);
        assert_eq!(scene.atoms()[0].element, "C");
    }

    #[test]
    fn recenter_empty_scene() {
        let scene = Scene::default().recenter();
        assert!(scene.is_empty());
        assert_eq!(scene.bounding_radius(), 0.0);
    }

    #[test]
    fn bounding_radius_is_farthest_atom() {
        let atoms = vec![Atom::new("C", [0.0, 3.0, 4.0]), Atom::new("C", [1.0, 0.0, 0.0])];
        let scene = Scene::new(atoms, []);
        assert_eq!(scene.bounding_radius(), 5.0);
    }

    #[test]
    fn bond_order_from_raw() {
        assert_eq!(BondOrder::from_raw(0), BondOrder::Single);
        assert_eq!(BondOrder::from_raw(1), BondOrder::Single);
        assert_eq!(BondOrder::from_raw(2), BondOrder::Double);
        assert_eq!(BondOrder::from_raw(3), BondOrder::Triple);
        assert_eq!(BondOrder::from_raw(7), BondOrder::Triple);
        assert_eq!(BondOrder::Triple.count(), 3);
    }
}
