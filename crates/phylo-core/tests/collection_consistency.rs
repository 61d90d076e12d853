use phylo_core::{linspace, Collection, PhyloError, RngHandle, Structure};
use serde_json::json;

fn dimer(offset: f64) -> Structure {
    Structure::new(
        vec!["Si".to_string(), "O".to_string()],
        vec![[0.0, 0.0, 0.0], [offset, 0.0, 0.0]],
    )
    .expect("dimer")
}

#[test]
fn metadata_arrays_track_collection_length() {
    let mut collection = Collection::from_structures(vec![dimer(1.0), dimer(1.1)]);
    collection
        .set_metadata("label", vec![json!("a"), json!("b")])
        .expect("metadata");
    assert_eq!(collection.metadata("label").unwrap().len(), collection.len());

    collection.push(dimer(1.2));
    assert_eq!(collection.metadata("label").unwrap().len(), collection.len());
    assert_eq!(collection.metadata("label").unwrap()[2], json!(null));
    collection.validate().expect("invariant");
}

#[test]
fn mismatched_metadata_is_rejected() {
    let mut collection = Collection::from_structures(vec![dimer(1.0), dimer(1.1)]);
    let err = collection
        .set_metadata("label", vec![json!("only-one")])
        .unwrap_err();
    assert!(matches!(err, PhyloError::Collection(_)));
}

#[test]
fn slicing_preserves_positional_correspondence() {
    let mut collection =
        Collection::from_structures(vec![dimer(1.0), dimer(1.1), dimer(1.2), dimer(1.3)]);
    collection
        .set_metadata("step", vec![json!(0), json!(1), json!(2), json!(3)])
        .expect("metadata");

    let window = collection.slice(1..3).expect("slice");
    assert_eq!(window.len(), 2);
    assert_eq!(window.metadata("step").unwrap(), &[json!(1), json!(2)]);
    window.validate().expect("invariant");

    assert!(collection.slice(2..9).is_err());
}

#[test]
fn concat_unions_metadata_with_null_fill() {
    let mut left = Collection::from_structures(vec![dimer(1.0)]);
    left.set_metadata("origin", vec![json!("seed")]).unwrap();
    let mut right = Collection::from_structures(vec![dimer(2.0), dimer(2.1)]);
    right
        .set_metadata("energy", vec![json!(-1.0), json!(-2.0)])
        .unwrap();

    let joined = left.concat(&right);
    assert_eq!(joined.len(), 3);
    assert_eq!(
        joined.metadata("origin").unwrap(),
        &[json!("seed"), json!(null), json!(null)]
    );
    assert_eq!(
        joined.metadata("energy").unwrap(),
        &[json!(null), json!(-1.0), json!(-2.0)]
    );
    joined.validate().expect("invariant");
}

#[test]
fn generator_consumption_is_bounded() {
    let start = dimer(1.0);
    let end = dimer(3.0);
    let generator = linspace(&start, &end, 10, false).expect("linspace");
    let collection = Collection::from_generator(generator, 4);
    assert_eq!(collection.len(), 4);
}

#[test]
fn infinite_generator_is_truncated() {
    let seed = dimer(1.0);
    let generator = phylo_core::rattle(&seed, 0.05, RngHandle::from_seed(11)).expect("rattle");
    let collection = Collection::from_generator(generator, 6);
    assert_eq!(collection.len(), 6);
}

#[test]
fn content_hash_is_order_sensitive() {
    let forward = Collection::from_structures(vec![dimer(1.0), dimer(2.0)]);
    let reversed = Collection::from_structures(vec![dimer(2.0), dimer(1.0)]);
    assert_ne!(
        forward.content_hash().unwrap(),
        reversed.content_hash().unwrap()
    );

    let again = Collection::from_structures(vec![dimer(1.0), dimer(2.0)]);
    assert_eq!(
        forward.content_hash().unwrap(),
        again.content_hash().unwrap()
    );
}
