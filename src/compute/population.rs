//! Shape populations: random creation and single-field mutation.
//!
//! A population stores all individuals in one flat gene vector, `arity`
//! fields per individual, in draw order. Every field is an integer in
//! `[0, bound)` where the bound comes from [`ShapeKind::field_bound`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::{CanvasSize, ConfigError, ShapeKind};

/// A fixed-size, ordered population of primitives of one shape kind.
///
/// Populations are values: mutation produces a new population and never
/// touches the source, so a rejected candidate can simply be dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPopulation")]
pub struct Population {
    kind: ShapeKind,
    canvas: CanvasSize,
    genes: Vec<u32>,
}

/// Unvalidated serialized form.
#[derive(Deserialize)]
struct RawPopulation {
    kind: ShapeKind,
    canvas: CanvasSize,
    genes: Vec<u32>,
}

impl TryFrom<RawPopulation> for Population {
    type Error = ConfigError;

    fn try_from(raw: RawPopulation) -> Result<Self, Self::Error> {
        Population::from_genes(raw.kind, raw.canvas, raw.genes)
    }
}

/// Record of a single resampled field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub individual: usize,
    pub field: usize,
    pub old_value: u32,
    pub new_value: u32,
}

impl Population {
    /// Create `count` individuals with every field sampled uniformly in its range.
    pub fn random<R: Rng>(
        kind: ShapeKind,
        count: usize,
        canvas: CanvasSize,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let len = validate_shape(kind, count, canvas)?;

        let arity = kind.arity();
        let mut genes = Vec::with_capacity(len);
        for _ in 0..count {
            for field in 0..arity {
                genes.push(rng.gen_range(0..kind.field_bound(field, canvas)));
            }
        }

        Ok(Self {
            kind,
            canvas,
            genes,
        })
    }

    /// Rebuild a population from a stored gene vector, checking every range.
    pub fn from_genes(
        kind: ShapeKind,
        canvas: CanvasSize,
        genes: Vec<u32>,
    ) -> Result<Self, ConfigError> {
        let arity = kind.arity();
        if genes.is_empty() || genes.len() % arity != 0 {
            return Err(ConfigError::GeneLengthMismatch {
                len: genes.len(),
                arity,
            });
        }
        validate_shape(kind, genes.len() / arity, canvas)?;

        for (individual, fields) in genes.chunks_exact(arity).enumerate() {
            for (field, &value) in fields.iter().enumerate() {
                let bound = kind.field_bound(field, canvas);
                if value >= bound {
                    return Err(ConfigError::FieldOutOfRange {
                        individual,
                        field,
                        value,
                        bound,
                    });
                }
            }
        }

        Ok(Self {
            kind,
            canvas,
            genes,
        })
    }

    /// Copy with one field of one individual resampled.
    #[inline]
    pub fn mutated<R: Rng>(&self, rng: &mut R) -> Self {
        self.mutated_traced(rng).0
    }

    /// Like [`mutated`](Self::mutated), also reporting which field was resampled.
    ///
    /// Draw order is individual index, then field index, then the new value.
    /// The new value may equal the old one.
    pub fn mutated_traced<R: Rng>(&self, rng: &mut R) -> (Self, Mutation) {
        let arity = self.arity();
        let individual = rng.gen_range(0..self.len());
        let field = rng.gen_range(0..arity);
        let new_value = rng.gen_range(0..self.kind.field_bound(field, self.canvas));

        let mut child = self.clone();
        let slot = &mut child.genes[individual * arity + field];
        let old_value = std::mem::replace(slot, new_value);

        (
            child,
            Mutation {
                individual,
                field,
                old_value,
                new_value,
            },
        )
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Fields per individual.
    #[inline]
    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    /// Number of individuals.
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len() / self.arity()
    }

    /// Always false: populations hold at least one individual.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// The flat gene vector in draw order.
    #[inline]
    pub fn genes(&self) -> &[u32] {
        &self.genes
    }

    /// Fields of one individual.
    pub fn individual(&self, index: usize) -> &[u32] {
        let arity = self.arity();
        &self.genes[index * arity..(index + 1) * arity]
    }

    /// Individuals in draw order.
    pub fn individuals(&self) -> impl Iterator<Item = &[u32]> {
        self.genes.chunks_exact(self.arity())
    }
}

/// Checks shared by every constructor. Returns the gene vector length.
fn validate_shape(kind: ShapeKind, count: usize, canvas: CanvasSize) -> Result<usize, ConfigError> {
    if count == 0 {
        return Err(ConfigError::EmptyPopulation);
    }
    canvas.validate()?;
    kind.validate()?;
    kind.gene_count(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn canvas(width: u32, height: u32) -> CanvasSize {
        CanvasSize { width, height }
    }

    fn assert_within_bounds(population: &Population) {
        let kind = population.kind();
        for individual in population.individuals() {
            for (field, &value) in individual.iter().enumerate() {
                assert!(value < kind.field_bound(field, population.canvas()));
            }
        }
    }

    fn differing_fields(a: &Population, b: &Population) -> Vec<usize> {
        a.genes()
            .iter()
            .zip(b.genes())
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_random_polygons() {
        let mut rng = StdRng::seed_from_u64(1);
        let kind = ShapeKind::Polygon { sides: 5 };
        let population = Population::random(kind, 20, canvas(17, 9), &mut rng).unwrap();

        assert_eq!(population.len(), 20);
        assert_eq!(population.arity(), 14);
        assert_eq!(population.genes().len(), 280);
        assert_within_bounds(&population);
    }

    #[test]
    fn test_random_circles() {
        let mut rng = StdRng::seed_from_u64(2);
        let kind = ShapeKind::Circle { max_radius: 4 };
        let population = Population::random(kind, 30, canvas(10, 6), &mut rng).unwrap();

        assert_eq!(population.len(), 30);
        assert_eq!(population.individual(0).len(), 7);
        assert_within_bounds(&population);
        assert!(population.individuals().all(|c| c[2] < 4));
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(3);
        let triangle = ShapeKind::Polygon { sides: 3 };

        assert_eq!(
            Population::random(triangle, 0, canvas(4, 4), &mut rng),
            Err(ConfigError::EmptyPopulation)
        );
        assert_eq!(
            Population::random(ShapeKind::Polygon { sides: 2 }, 1, canvas(4, 4), &mut rng),
            Err(ConfigError::TooFewSides(2))
        );
        assert_eq!(
            Population::random(ShapeKind::Circle { max_radius: 0 }, 1, canvas(4, 4), &mut rng),
            Err(ConfigError::InvalidMaxRadius)
        );
        assert!(Population::random(triangle, 1, canvas(0, 4), &mut rng).is_err());
        assert!(Population::random(triangle, 1, canvas(4, 4), &mut rng).is_ok());
    }

    #[test]
    fn test_oversized_shapes_rejected_before_allocation() {
        let mut rng = StdRng::seed_from_u64(5);
        let huge = ShapeKind::Polygon { sides: usize::MAX };

        assert!(matches!(
            Population::random(huge, 1, canvas(4, 4), &mut rng),
            Err(ConfigError::PopulationTooLarge { .. })
        ));
        assert!(matches!(
            Population::random(ShapeKind::Polygon { sides: 3 }, usize::MAX, canvas(4, 4), &mut rng),
            Err(ConfigError::PopulationTooLarge { .. })
        ));
        assert!(Population::from_genes(huge, canvas(4, 4), vec![0; 10]).is_err());
    }

    #[test]
    fn test_same_seed_same_population() {
        let kind = ShapeKind::Circle { max_radius: 9 };
        let a = Population::random(kind, 8, canvas(32, 32), &mut StdRng::seed_from_u64(99));
        let b = Population::random(kind, 8, canvas(32, 32), &mut StdRng::seed_from_u64(99));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_mutation_leaves_source_untouched() {
        let mut rng = StdRng::seed_from_u64(4);
        let kind = ShapeKind::Polygon { sides: 4 };
        let parent = Population::random(kind, 3, canvas(50, 50), &mut rng).unwrap();
        let snapshot = parent.clone();

        for _ in 0..100 {
            let (child, mutation) = parent.mutated_traced(&mut rng);
            assert_eq!(parent, snapshot);

            let changed = differing_fields(&parent, &child);
            assert!(changed.len() <= 1);
            let slot = mutation.individual * parent.arity() + mutation.field;
            if let Some(&index) = changed.first() {
                assert_eq!(index, slot);
            }
            assert_eq!(parent.genes()[slot], mutation.old_value);
            assert_eq!(child.genes()[slot], mutation.new_value);
        }
    }

    #[test]
    fn test_mutation_reaches_every_field() {
        let mut rng = StdRng::seed_from_u64(5);
        let kind = ShapeKind::Circle { max_radius: 6 };
        let population = Population::random(kind, 2, canvas(8, 8), &mut rng).unwrap();

        let mut hit = vec![false; population.genes().len()];
        for _ in 0..2000 {
            let (_, mutation) = population.mutated_traced(&mut rng);
            hit[mutation.individual * population.arity() + mutation.field] = true;
        }
        assert!(hit.iter().all(|&h| h));
    }

    #[test]
    fn test_mutation_preserves_order_and_shape() {
        let mut rng = StdRng::seed_from_u64(6);
        let kind = ShapeKind::Polygon { sides: 3 };
        let mut population = Population::random(kind, 4, canvas(12, 12), &mut rng).unwrap();

        for _ in 0..500 {
            let child = population.mutated(&mut rng);
            assert_eq!(child.len(), 4);
            assert_eq!(child.arity(), 10);
            assert_within_bounds(&child);
            assert!(differing_fields(&population, &child).len() <= 1);
            population = child;
        }
    }

    #[test]
    fn test_from_genes_validation() {
        let kind = ShapeKind::Circle { max_radius: 5 };
        let size = canvas(10, 10);

        let valid = vec![9, 9, 4, 255, 255, 255, 255];
        assert!(Population::from_genes(kind, size, valid).is_ok());

        assert_eq!(
            Population::from_genes(kind, size, vec![1, 2, 3]),
            Err(ConfigError::GeneLengthMismatch { len: 3, arity: 7 })
        );
        assert!(Population::from_genes(kind, size, Vec::new()).is_err());
        assert_eq!(
            Population::from_genes(kind, size, vec![1, 1, 5, 0, 0, 0, 0]),
            Err(ConfigError::FieldOutOfRange {
                individual: 0,
                field: 2,
                value: 5,
                bound: 5
            })
        );
        assert_eq!(
            Population::from_genes(kind, size, vec![0, 0, 0, 0, 0, 0, 0, 0, 10, 0, 0, 0, 0, 0]),
            Err(ConfigError::FieldOutOfRange {
                individual: 1,
                field: 1,
                value: 10,
                bound: 10
            })
        );
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let mut rng = StdRng::seed_from_u64(7);
        let kind = ShapeKind::Polygon { sides: 3 };
        let population = Population::random(kind, 2, canvas(6, 6), &mut rng).unwrap();

        let json = serde_json::to_string(&population).unwrap();
        let parsed: Population = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, population);

        let tampered = json.replacen("\"genes\":[", "\"genes\":[999,", 1);
        assert!(serde_json::from_str::<Population>(&tampered).is_err());
    }

    proptest! {
        #[test]
        fn prop_polygon_fields_within_bounds(
            count in 1usize..6,
            width in 1u32..48,
            height in 1u32..48,
            sides in 3usize..8,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let kind = ShapeKind::Polygon { sides };
            let population = Population::random(kind, count, canvas(width, height), &mut rng).unwrap();
            for (i, &value) in population.genes().iter().enumerate() {
                let bound = kind.field_bound(i % kind.arity(), population.canvas());
                prop_assert!(value < bound);
            }
        }

        #[test]
        fn prop_mutation_changes_at_most_one_field(
            count in 1usize..6,
            max_radius in 1u32..20,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let kind = ShapeKind::Circle { max_radius };
            let parent = Population::random(kind, count, canvas(16, 16), &mut rng).unwrap();
            let child = parent.mutated(&mut rng);

            prop_assert!(differing_fields(&parent, &child).len() <= 1);
            for (i, &value) in child.genes().iter().enumerate() {
                prop_assert!(value < kind.field_bound(i % kind.arity(), child.canvas()));
            }
        }
    }
}
