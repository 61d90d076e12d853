use phylo_core::{Collection, PhyloError, Structure};
use phylo_gene::{
    build_distances, EquivalenceOp, Equivalences, Gene, GeneSpace, Metric, Normalization,
};
use phylo_props::{
    builtin_registry, FailurePolicy, PropertyEngine, PropertyRegistry, PropertySpec,
    PropertyValue, Shape,
};
use proptest::prelude::*;
use serde_json::Value;
use std::sync::Arc;

fn dimer(length: f64) -> Structure {
    Structure::new(
        vec!["Si".to_string(), "Si".to_string()],
        vec![[0.0, 0.0, 0.0], [length, 0.0, 0.0]],
    )
    .expect("dimer")
}

fn dimers(lengths: &[f64]) -> Collection {
    Collection::from_structures(lengths.iter().map(|&length| dimer(length)).collect())
}

/// Reads a per-site "angle" array so tests can exercise cyclic columns.
struct SiteAngle;

impl PropertySpec for SiteAngle {
    fn name(&self) -> &str {
        "site_angle"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        let angles = structure.site_array("angle").ok_or_else(|| {
            PhyloError::Property(phylo_core::ErrorInfo::new(
                "no-angle",
                "structure carries no angle array",
            ))
        })?;
        Ok(PropertyValue::Scalar(angles[0]))
    }
}

fn angle_structure(angle: f64) -> Structure {
    dimer(1.0)
        .with_site_array("angle", vec![angle, angle])
        .expect("angle array")
}

fn angle_registry() -> PropertyRegistry {
    PropertyRegistry::builder()
        .register(Arc::new(SiteAngle))
        .expect("register")
        .build()
}

fn scalar_space(lengths: &[f64], normalization: Normalization) -> GeneSpace {
    let registry = builtin_registry().expect("registry");
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let genes = vec![Gene::new("mean_neighbour_distance", 1.0, normalization).expect("gene")];
    GeneSpace::build(&mut engine, &registry, &dimers(lengths), &genes).expect("space")
}

#[test]
fn rebuilds_are_bit_identical() {
    let lengths = [1.0, 1.4, 2.2, 3.9];
    let first = scalar_space(&lengths, Normalization::MinMax);
    let second = scalar_space(&lengths, Normalization::MinMax);
    assert_eq!(first, second);
}

#[test]
fn degenerate_statistics_yield_all_zero_columns() {
    let space = scalar_space(&[2.0, 2.0, 2.0], Normalization::MinMax);
    for row in space.rows() {
        assert_eq!(row, &vec![0.0]);
    }
    let zscored = scalar_space(&[2.0, 2.0, 2.0], Normalization::ZScore);
    for row in zscored.rows() {
        assert_eq!(row, &vec![0.0]);
    }
}

#[test]
fn weights_scale_after_normalization() {
    let registry = builtin_registry().expect("registry");
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let genes =
        vec![Gene::new("mean_neighbour_distance", 2.0, Normalization::MinMax).expect("gene")];
    let space =
        GeneSpace::build(&mut engine, &registry, &dimers(&[1.0, 2.0, 3.0]), &genes).expect("space");
    let column: Vec<f64> = space.rows().iter().map(|row| row[0]).collect();
    assert_eq!(column, vec![0.0, 1.0, 2.0]);
}

#[test]
fn distance_matrix_is_symmetric_and_zero_diagonal() {
    let space = scalar_space(&[1.0, 1.5, 3.0, 4.2], Normalization::MinMax);
    for metric in [Metric::Euclidean, Metric::Manhattan, Metric::Cosine] {
        let matrix = build_distances(&space, metric, None).expect("distances");
        matrix.validate().expect("invariants");
        for i in 0..matrix.size() {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..matrix.size() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
    }
}

#[test]
fn duplicate_structures_are_at_distance_zero() {
    let space = scalar_space(&[1.0, 2.5, 1.0], Normalization::None);
    for metric in [Metric::Euclidean, Metric::Manhattan, Metric::Cosine] {
        let matrix = build_distances(&space, metric, None).expect("distances");
        assert_eq!(matrix.get(0, 2), 0.0);
    }
}

#[test]
fn cyclic_columns_use_the_wrapped_difference() {
    let registry = angle_registry();
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let collection =
        Collection::from_structures(vec![angle_structure(350.0), angle_structure(10.0)]);
    let genes = vec![Gene::new("site_angle", 1.0, Normalization::None)
        .expect("gene")
        .with_cyclic(360.0)
        .expect("cyclic")];
    let space = GeneSpace::build(&mut engine, &registry, &collection, &genes).expect("space");
    let matrix = build_distances(&space, Metric::Euclidean, None).expect("distances");
    assert!((matrix.get(0, 1) - 20.0).abs() < 1e-12);
}

#[test]
fn declared_arity_must_match_the_property_shape() {
    let registry = builtin_registry().expect("registry");
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let collection = dimers(&[1.0, 2.0]);
    let genes = vec![Gene::new("centroid", 1.0, Normalization::None)
        .expect("gene")
        .with_arity(2)];
    let err = GeneSpace::build(&mut engine, &registry, &collection, &genes).unwrap_err();
    assert!(matches!(err, PhyloError::Configuration(_)));

    let genes = vec![Gene::new("centroid", 1.0, Normalization::None)
        .expect("gene")
        .with_arity(3)];
    GeneSpace::build(&mut engine, &registry, &collection, &genes).expect("matching arity");
}

#[test]
fn cosine_over_cyclic_columns_is_rejected() {
    let registry = angle_registry();
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let collection =
        Collection::from_structures(vec![angle_structure(10.0), angle_structure(20.0)]);
    let genes = vec![Gene::new("site_angle", 1.0, Normalization::None)
        .expect("gene")
        .with_cyclic(360.0)
        .expect("cyclic")];
    let space = GeneSpace::build(&mut engine, &registry, &collection, &genes).expect("space");
    let err = build_distances(&space, Metric::Cosine, None).unwrap_err();
    assert!(matches!(err, PhyloError::Configuration(_)));
}

fn two_column_space(pairs: &[(f64, f64)]) -> GeneSpace {
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let structures: Vec<Structure> = pairs
        .iter()
        .map(|&(a, b)| {
            dimer(1.0)
                .with_site_array("angle", vec![a, b])
                .expect("array")
        })
        .collect();
    let registry = PropertyRegistry::builder()
        .register(Arc::new(FirstAngle))
        .expect("first")
        .register(Arc::new(SecondAngle))
        .expect("second")
        .build();
    let genes = vec![
        Gene::new("first_angle", 1.0, Normalization::None).expect("gene"),
        Gene::new("second_angle", 1.0, Normalization::None).expect("gene"),
    ];
    GeneSpace::build(
        &mut engine,
        &registry,
        &Collection::from_structures(structures),
        &genes,
    )
    .expect("space")
}

struct FirstAngle;

impl PropertySpec for FirstAngle {
    fn name(&self) -> &str {
        "first_angle"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        Ok(PropertyValue::Scalar(
            structure.site_array("angle").expect("angle")[0],
        ))
    }
}

struct SecondAngle;

impl PropertySpec for SecondAngle {
    fn name(&self) -> &str {
        "second_angle"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        Ok(PropertyValue::Scalar(
            structure.site_array("angle").expect("angle")[1],
        ))
    }
}

#[test]
fn symmetry_minimization_never_increases_distance() {
    let space = two_column_space(&[(0.0, 4.0), (4.0, 0.0), (1.0, 3.0)]);
    let plain = build_distances(&space, Metric::Euclidean, None).expect("plain");
    let swap = Equivalences::global(vec![EquivalenceOp::new(vec![1, 0]).expect("swap")]);
    let symmetric =
        build_distances(&space, Metric::Euclidean, Some(&swap)).expect("symmetric");
    for i in 0..plain.size() {
        for j in 0..plain.size() {
            assert!(symmetric.get(i, j) <= plain.get(i, j));
        }
    }
    // Rows 0 and 1 are mirror images: the swap collapses their distance.
    assert_eq!(symmetric.get(0, 1), 0.0);
    assert!(plain.get(0, 1) > 0.0);
}

#[test]
fn per_structure_operators_only_affect_their_pairs() {
    let space = two_column_space(&[(0.0, 4.0), (4.0, 0.0), (1.0, 3.0), (3.0, 1.0)]);
    let plain = build_distances(&space, Metric::Euclidean, None).expect("plain");
    // Declare the swap for structure 1 only: pairs touching index 1 may
    // shrink, the (2, 3) distance must not.
    let equivalences = Equivalences::default()
        .with_structure_ops(1, vec![EquivalenceOp::new(vec![1, 0]).expect("swap")]);
    let symmetric =
        build_distances(&space, Metric::Euclidean, Some(&equivalences)).expect("symmetric");
    symmetric.validate().expect("invariants");
    assert_eq!(symmetric.get(0, 1), 0.0);
    assert_eq!(symmetric.get(2, 3), plain.get(2, 3));
}

#[test]
fn identity_equivalence_changes_nothing() {
    let space = two_column_space(&[(0.0, 4.0), (4.0, 0.0), (1.0, 3.0)]);
    let plain = build_distances(&space, Metric::Euclidean, None).expect("plain");
    let identity = Equivalences::global(vec![EquivalenceOp::identity(space.width())]);
    let with_identity =
        build_distances(&space, Metric::Euclidean, Some(&identity)).expect("identity");
    assert_eq!(plain, with_identity);
}

#[test]
fn mismatched_operator_width_is_rejected() {
    let space = scalar_space(&[1.0, 2.0], Normalization::None);
    let ops = Equivalences::global(vec![EquivalenceOp::new(vec![1, 0]).expect("op")]);
    let err = build_distances(&space, Metric::Euclidean, Some(&ops)).unwrap_err();
    assert!(matches!(err, PhyloError::Configuration(_)));
}

proptest! {
    #[test]
    fn random_collections_keep_matrix_invariants(
        lengths in proptest::collection::vec(0.5f64..5.0, 2..12)
    ) {
        let space = scalar_space(&lengths, Normalization::MinMax);
        let matrix = build_distances(&space, Metric::Euclidean, None).expect("distances");
        prop_assert!(matrix.validate().is_ok());
    }

    #[test]
    fn constant_collections_normalize_to_zero(
        value in 0.5f64..5.0,
        count in 2usize..8
    ) {
        let lengths = vec![value; count];
        let space = scalar_space(&lengths, Normalization::ZScore);
        for row in space.rows() {
            prop_assert_eq!(row, &vec![0.0]);
        }
    }
}
