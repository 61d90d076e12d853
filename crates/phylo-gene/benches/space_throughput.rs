use criterion::{criterion_group, criterion_main, Criterion};

use phylo_core::{rattle, Collection, RngHandle, Structure};
use phylo_gene::{build_distances, Gene, GeneSpace, Metric, Normalization};
use phylo_props::{builtin_registry, FailurePolicy, PropertyEngine};

fn make_collection(count: usize) -> Collection {
    let seed = Structure::new(
        vec!["Si".to_string(), "Si".to_string(), "O".to_string(), "O".to_string()],
        vec![
            [0.0, 0.0, 0.0],
            [1.2, 0.0, 0.0],
            [0.0, 1.2, 0.0],
            [0.0, 0.0, 1.2],
        ],
    )
    .expect("seed structure");
    let generator = rattle(&seed, 0.3, RngHandle::from_seed(2024)).expect("rattle");
    Collection::from_generator(generator, count)
}

fn make_genes() -> Vec<Gene> {
    vec![
        Gene::new("mean_neighbour_distance", 1.0, Normalization::MinMax).expect("gene"),
        Gene::new("centroid", 0.5, Normalization::ZScore).expect("gene"),
    ]
}

fn bench_space(c: &mut Criterion) {
    let registry = builtin_registry().expect("registry");
    let collection = make_collection(64);
    let genes = make_genes();
    c.bench_function("gene_space_build", |b| {
        b.iter(|| {
            let mut engine = PropertyEngine::new(FailurePolicy::Abort);
            let _ = GeneSpace::build(&mut engine, &registry, &collection, &genes)
                .expect("gene space");
        });
    });
}

fn bench_distances(c: &mut Criterion) {
    let registry = builtin_registry().expect("registry");
    let collection = make_collection(64);
    let genes = make_genes();
    let mut engine = PropertyEngine::new(FailurePolicy::Abort);
    let space =
        GeneSpace::build(&mut engine, &registry, &collection, &genes).expect("gene space");
    c.bench_function("distance_matrix_build", |b| {
        b.iter(|| {
            let _ = build_distances(&space, Metric::Euclidean, None).expect("distances");
        });
    });
}

criterion_group!(benches, bench_space, bench_distances);
criterion_main!(benches);
