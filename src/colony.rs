use rand::Rng;

use crate::bee::{Bee, Role};
use crate::distance::DistanceTable;
use crate::error::{Result, TspError};

/// Fixed-size population of bees. Size never changes after `initialize`.
#[derive(Debug, Clone)]
pub struct Colony {
    bees: Vec<Bee>,
}

pub fn check_fraction(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(TspError::config(parameter, value, "must be within [0, 1]"));
    }
    Ok(())
}

impl Colony {
    /// Creates `population` bees, each on an independent random tour.
    ///
    /// Every bee starts as a scout until [`Colony::assign_roles`] runs.
    pub fn initialize<R: Rng + ?Sized>(
        population: usize,
        table: &DistanceTable,
        rng: &mut R,
    ) -> Result<Self> {
        if population == 0 {
            return Err(TspError::config("population", population, "must be positive"));
        }
        let bees = (0..population).map(|_| Bee::random(table, rng)).collect();
        Ok(Colony { bees })
    }

    /// Partitions the colony by index: onlookers first, then foragers, scouts for the rest.
    ///
    /// Counts are `floor(population * fraction)`. Foragers get a fresh random tour.
    pub fn assign_roles<R: Rng + ?Sized>(
        &mut self,
        onlooker_fraction: f64,
        forager_fraction: f64,
        table: &DistanceTable,
        rng: &mut R,
    ) -> Result<()> {
        check_fraction("onlooker_fraction", onlooker_fraction)?;
        check_fraction("forager_fraction", forager_fraction)?;
        let total = onlooker_fraction + forager_fraction;
        if total > 1.0 + f64::EPSILON {
            return Err(TspError::config(
                "onlooker_fraction + forager_fraction",
                total,
                "role fractions must not sum to more than 1",
            ));
        }

        let population = self.bees.len();
        let onlooker_count = (population as f64 * onlooker_fraction).floor() as usize;
        let forager_count = ((population as f64 * forager_fraction).floor() as usize)
            .min(population - onlooker_count);

        for (idx, bee) in self.bees.iter_mut().enumerate() {
            if idx < onlooker_count {
                bee.set_role(Role::Onlooker);
            } else if idx < onlooker_count + forager_count {
                bee.set_role(Role::Forager);
                bee.reset_tour(table, rng);
            } else {
                bee.set_role(Role::Scout);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bees.is_empty()
    }

    pub fn bees(&self) -> &[Bee] {
        &self.bees
    }

    pub(crate) fn bees_mut(&mut self) -> &mut [Bee] {
        &mut self.bees
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.bees.iter().filter(|b| b.role() == role).count()
    }

    /// Shortest tour held by any bee, lowest index on ties.
    pub fn shortest(&self) -> Option<(usize, &Bee)> {
        self.bees
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &Bee)>, (idx, bee)| match best {
                Some((_, b)) if b.length() <= bee.length() => best,
                _ => Some((idx, bee)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bee::is_permutation;
    use crate::parser::Node;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn line_table(n: usize) -> DistanceTable {
        let nodes: Vec<Node> = (0..n)
            .map(|i| Node::new(i, (i * i) as f64, (i % 3) as f64))
            .collect();
        DistanceTable::build(&nodes).unwrap()
    }

    #[test]
    fn initializes_requested_population_with_valid_tours() {
        let table = line_table(9);
        let mut rng = StdRng::seed_from_u64(1);
        let colony = Colony::initialize(12, &table, &mut rng).unwrap();
        assert_eq!(colony.len(), 12);
        for bee in colony.bees() {
            assert!(is_permutation(bee.tour(), 9));
            assert_eq!(bee.length(), table.tour_length(bee.tour()));
            assert_eq!(bee.stagnation(), 0);
        }
    }

    #[test]
    fn zero_population_is_config_error() {
        let table = line_table(4);
        let mut rng = StdRng::seed_from_u64(1);
        let err = Colony::initialize(0, &table, &mut rng).unwrap_err();
        assert!(matches!(err, TspError::Config { parameter: "population", .. }));
    }

    #[test]
    fn roles_are_assigned_by_index_with_scout_remainder() {
        let table = line_table(6);
        let mut rng = StdRng::seed_from_u64(2);
        let mut colony = Colony::initialize(10, &table, &mut rng).unwrap();
        colony.assign_roles(0.3, 0.4, &table, &mut rng).unwrap();

        // 3 onlookers, 4 foragers, the remaining 3 scout.
        let roles: Vec<Role> = colony.bees().iter().map(|b| b.role()).collect();
        assert_eq!(&roles[..3], &[Role::Onlooker; 3]);
        assert_eq!(&roles[3..7], &[Role::Forager; 4]);
        assert_eq!(&roles[7..], &[Role::Scout; 3]);
        assert_eq!(colony.count_role(Role::Scout), 3);
    }

    #[test]
    fn even_split_leaves_no_scouts() {
        let table = line_table(10);
        let mut rng = StdRng::seed_from_u64(3);
        let mut colony = Colony::initialize(30, &table, &mut rng).unwrap();
        colony.assign_roles(0.5, 0.5, &table, &mut rng).unwrap();
        assert_eq!(colony.count_role(Role::Onlooker), 15);
        assert_eq!(colony.count_role(Role::Forager), 15);
        assert_eq!(colony.count_role(Role::Scout), 0);
    }

    #[test]
    fn fractions_over_one_are_rejected() {
        let table = line_table(5);
        let mut rng = StdRng::seed_from_u64(4);
        let mut colony = Colony::initialize(10, &table, &mut rng).unwrap();
        assert!(matches!(
            colony.assign_roles(0.7, 0.4, &table, &mut rng),
            Err(TspError::Config { .. })
        ));
        assert!(colony.assign_roles(-0.1, 0.4, &table, &mut rng).is_err());
        assert!(colony.assign_roles(0.2, f64::NAN, &table, &mut rng).is_err());
    }

    #[test]
    fn foragers_keep_consistent_lengths_after_reshuffle() {
        let table = line_table(8);
        let mut rng = StdRng::seed_from_u64(5);
        let mut colony = Colony::initialize(8, &table, &mut rng).unwrap();
        colony.assign_roles(0.0, 1.0, &table, &mut rng).unwrap();
        for bee in colony.bees() {
            assert_eq!(bee.role(), Role::Forager);
            assert_eq!(bee.length(), table.tour_length(bee.tour()));
        }
    }

    #[test]
    fn shortest_prefers_lowest_index_on_ties() {
        let table = line_table(2);
        let mut rng = StdRng::seed_from_u64(6);
        let colony = Colony::initialize(4, &table, &mut rng).unwrap();
        let (idx, bee) = colony.shortest().unwrap();
        assert_eq!(idx, 0);
        assert_eq!(bee.length(), table.tour_length(&[0, 1]));
    }
}
