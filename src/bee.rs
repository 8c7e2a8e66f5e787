use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::distance::DistanceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Onlooker,
    Forager,
    #[default]
    Scout,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Onlooker => "onlooker",
            Role::Forager => "forager",
            Role::Scout => "scout",
        };
        f.write_str(name)
    }
}

pub fn random_tour<R: Rng + ?Sized>(n_cities: usize, rng: &mut R) -> Vec<usize> {
    let mut tour: Vec<usize> = (0..n_cities).collect();
    tour.shuffle(rng);
    tour
}

/// Copy of `tour` with one uniformly chosen adjacent pair `(i, i + 1)` exchanged.
pub fn swap_adjacent<R: Rng + ?Sized>(tour: &[usize], rng: &mut R) -> Vec<usize> {
    let mut candidate = tour.to_vec();
    if candidate.len() >= 2 {
        let i = rng.random_range(0..candidate.len() - 1);
        candidate.swap(i, i + 1);
    }
    candidate
}

pub fn is_permutation(tour: &[usize], n_cities: usize) -> bool {
    if tour.len() != n_cities {
        return false;
    }
    let mut seen = vec![false; n_cities];
    for &city in tour {
        if city >= n_cities || seen[city] {
            return false;
        }
        seen[city] = true;
    }
    true
}

/// An agent holding a candidate tour.
///
/// `length` is always the rounded closed length of `tour`; the only writers are
/// the constructors and the phase functions below.
#[derive(Debug, Clone, PartialEq)]
pub struct Bee {
    role: Role,
    tour: Vec<usize>,
    length: f64,
    stagnation: usize,
}

impl Bee {
    pub fn new(tour: Vec<usize>, table: &DistanceTable) -> Self {
        let length = table.tour_length(&tour);
        Bee {
            role: Role::default(),
            tour,
            length,
            stagnation: 0,
        }
    }

    pub fn random<R: Rng + ?Sized>(table: &DistanceTable, rng: &mut R) -> Self {
        Bee::new(random_tour(table.dimension(), rng), table)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    pub(crate) fn reset_tour<R: Rng + ?Sized>(&mut self, table: &DistanceTable, rng: &mut R) {
        self.tour.shuffle(rng);
        self.length = table.tour_length(&self.tour);
        self.stagnation = 0;
    }
}

/// One hill-climbing step for a forager.
///
/// A strictly shorter neighbour replaces the bee's tour and clears its
/// stagnation count; anything else bumps the count. Reaching
/// `stagnation_limit` turns the bee into a scout.
pub fn forage<'a, R: Rng + ?Sized>(
    bee: &'a mut Bee,
    table: &DistanceTable,
    stagnation_limit: usize,
    rng: &mut R,
) -> (f64, &'a [usize]) {
    let candidate = swap_adjacent(&bee.tour, rng);
    let candidate_length = table.tour_length(&candidate);

    if candidate_length < bee.length {
        bee.tour = candidate;
        bee.length = candidate_length;
        bee.stagnation = 0;
    } else {
        bee.stagnation += 1;
    }
    if bee.stagnation >= stagnation_limit {
        bee.role = Role::Scout;
    }
    (bee.length, &bee.tour)
}

/// Abandons the current tour for a fresh random one and hands the bee back to foraging.
pub fn scout<R: Rng + ?Sized>(bee: &mut Bee, table: &DistanceTable, rng: &mut R) {
    bee.reset_tour(table, rng);
    bee.role = Role::Forager;
}

/// Onlooker step: take a copy of the best tour and perturb it once.
///
/// The bee keeps the perturbed copy. Whether it beats the current best is for the
/// caller to decide. Returns `None` while there is no best tour to copy.
pub fn recruit<'a, R: Rng + ?Sized>(
    bee: &'a mut Bee,
    best_tour: &[usize],
    table: &DistanceTable,
    rng: &mut R,
) -> Option<(f64, &'a [usize])> {
    if best_tour.is_empty() {
        return None;
    }
    bee.tour = swap_adjacent(best_tour, rng);
    bee.length = table.tour_length(&bee.tour);
    Some((bee.length, &bee.tour))
}
