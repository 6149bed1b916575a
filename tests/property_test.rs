//! Property tests for recommendation invariants over arbitrary small catalogs

use std::collections::HashSet;

use proptest::prelude::*;
use book_recommender::{
    BookRecord, Catalog, EmbeddingStore, FlatIndex, HnswIndex, HnswParams, Recommender,
};

fn catalog(n: usize) -> Catalog {
    Catalog::from_records((0..n).map(|id| BookRecord {
        book_id: id,
        title: format!("Book {}", id),
        authors: "Someone".to_string(),
    }))
    .unwrap()
}

/// Rows of a fixed dimension with at least one clearly non-zero component.
fn rows() -> impl Strategy<Value = Vec<Vec<f32>>> {
    (1usize..6).prop_flat_map(|dim| {
        prop::collection::vec(
            prop::collection::vec(-1.0f32..1.0, dim).prop_map(|mut row| {
                row[0] += if row[0] >= 0.0 { 1.0 } else { -1.0 };
                row
            }),
            1..40,
        )
    })
}

/// Rows drawn from a small pool, so most stores contain repeated vectors.
fn rows_with_duplicates() -> impl Strategy<Value = Vec<Vec<f32>>> {
    rows().prop_flat_map(|pool| {
        let size = pool.len();
        prop::collection::vec(0..size, 1..40)
            .prop_map(move |picks| picks.into_iter().map(|i| pool[i].clone()).collect())
    })
}

proptest! {
    #[test]
    fn recommendations_are_well_formed(rows in rows(), seed_pick in any::<prop::sample::Index>(), k in 1usize..12) {
        let n = rows.len();
        let seed_id = seed_pick.index(n);
        let store = EmbeddingStore::from_rows(rows).unwrap();
        let recommender: Recommender<HnswIndex> =
            Recommender::build(store, catalog(n), HnswParams::new(4, 32, 16)).unwrap();

        let recs = recommender.recommend(seed_id, k).unwrap();
        prop_assert_eq!(recs.len(), k.min(n - 1));

        let ids: HashSet<usize> = recs.iter().map(|r| r.item_id).collect();
        prop_assert_eq!(ids.len(), recs.len());
        prop_assert!(!ids.contains(&seed_id));
        for pair in recs.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
        for r in &recs {
            prop_assert!((0.0..=2.0).contains(&r.distance));
        }

        prop_assert_eq!(recs, recommender.recommend(seed_id, k).unwrap());
    }

    #[test]
    fn hnsw_returns_min_of_k_and_rest_with_duplicates(
        rows in rows_with_duplicates(),
        seed_pick in any::<prop::sample::Index>(),
        k in 1usize..50,
    ) {
        let n = rows.len();
        let seed_id = seed_pick.index(n);
        let store = EmbeddingStore::from_rows(rows).unwrap();
        for params in [HnswParams::default(), HnswParams::new(4, 32, 16)] {
            let recommender: Recommender<HnswIndex> =
                Recommender::build(store.clone(), catalog(n), params).unwrap();
            let recs = recommender.recommend(seed_id, k).unwrap();
            prop_assert_eq!(recs.len(), k.min(n - 1));
            let ids: HashSet<usize> = recs.iter().map(|r| r.item_id).collect();
            prop_assert_eq!(ids.len(), recs.len());
            prop_assert!(!ids.contains(&seed_id));
        }
    }

    #[test]
    fn exact_backend_returns_min_of_k_and_rest(rows in rows(), k in 1usize..50) {
        let n = rows.len();
        let store = EmbeddingStore::from_rows(rows).unwrap();
        let recommender: Recommender<FlatIndex> =
            Recommender::build(store, catalog(n), ()).unwrap();

        let recs = recommender.recommend(0, k).unwrap();
        prop_assert_eq!(recs.len(), k.min(n - 1));
    }
}
