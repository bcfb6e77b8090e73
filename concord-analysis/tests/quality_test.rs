//! Worker quality tests — T1-QUA-01 through T1-QUA-07.
//!
//! Tests cover: leave-one-out correlation scoring against conforming and
//! contrarian raters built through the store, undefined scores for
//! workers without a usable crowd, and how the two selection modes treat
//! score bands and missing scores.

use concord_analysis::masks::{Mask, MaskIndex};
use concord_analysis::quality::{quality_scores, select_by_percentile, select_by_threshold};
use concord_analysis::store::{
    AssignmentMeta, RatingStore, RatingTensor, StoreBuilder, SubmissionState,
};

// ---- Helpers ----

fn meta(submitted_at: i64) -> AssignmentMeta {
    AssignmentMeta {
        device: "headphone".to_string(),
        state: SubmissionState::Pending,
        submitted_at,
        work_duration_secs: 300,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn entities(mask: &Mask) -> Vec<usize> {
    mask.masked_indices()
        .into_iter()
        .filter_map(|ix| match ix {
            MaskIndex::Entity(e) => Some(e),
            MaskIndex::Cell(..) => None,
        })
        .collect()
}

/// Four workers on one algorithm, three files. worker00 through worker02
/// rate the files 1, 3, 5; worker03 rates them inverted as 5, 3, 1.
fn contrarian_store() -> RatingStore {
    let mut b = StoreBuilder::new();
    for i in 0..4 {
        let assignment = format!("a{i}");
        let worker = format!("worker{i:02}");
        b.add_assignment(&assignment, &worker, meta(100 + i as i64))
            .expect("assignment");
        let votes: [f64; 3] = if i == 3 { [5.0, 3.0, 1.0] } else { [1.0, 3.0, 5.0] };
        for (f, vote) in votes.iter().enumerate() {
            let file = format!("file{}", f + 1);
            b.add_rating(&assignment, "alg1", &file, "mos", *vote)
                .expect("rating");
        }
    }
    b.build().expect("build store")
}

/// Two workers fully rating three algorithms whose per-algorithm means
/// agree in ranking: worker00 averages 1, 3, 5 and worker01 averages
/// 2, 3, 4.
fn agreeing_store() -> RatingStore {
    let mut b = StoreBuilder::new();
    b.add_assignment("a0", "worker00", meta(100)).expect("a0");
    b.add_assignment("a1", "worker01", meta(110)).expect("a1");
    for (alg, vote) in [("alg1", 1.0), ("alg2", 3.0), ("alg3", 5.0)] {
        b.add_rating("a0", alg, "file1", "mos", vote).expect("r");
        b.add_rating("a0", alg, "file2", "mos", vote).expect("r");
    }
    for (alg, vote) in [("alg1", 2.0), ("alg2", 3.0), ("alg3", 4.0)] {
        b.add_rating("a1", alg, "file1", "mos", vote).expect("r");
        b.add_rating("a1", alg, "file2", "mos", vote).expect("r");
    }
    b.build().expect("build store")
}

/// The contrarian crowd plus worker04, who rated a single cell.
fn sparse_fifth_worker_store() -> RatingStore {
    let mut b = StoreBuilder::new();
    for i in 0..4 {
        let assignment = format!("a{i}");
        let worker = format!("worker{i:02}");
        b.add_assignment(&assignment, &worker, meta(100 + i as i64))
            .expect("assignment");
        let votes: [f64; 3] = if i == 3 { [5.0, 3.0, 1.0] } else { [1.0, 3.0, 5.0] };
        for (f, vote) in votes.iter().enumerate() {
            let file = format!("file{}", f + 1);
            b.add_rating(&assignment, "alg1", &file, "mos", *vote)
                .expect("rating");
        }
    }
    b.add_assignment("a4", "worker04", meta(104)).expect("a4");
    b.add_rating("a4", "alg1", "file1", "mos", 3.0).expect("r");
    b.build().expect("build store")
}

fn scores_of(store: &RatingStore) -> Vec<f64> {
    let tensor = RatingTensor::from_store(store, "mos").expect("tensor");
    quality_scores(&tensor).iter().map(|s| s.combined).collect()
}

// ---- Tests ----

/// T1-QUA-01: raters who track the crowd score sentence correlation 1;
/// with a single algorithm the algorithm component stays undefined and
/// the combined score falls back to the sentence component.
#[test]
fn conformers_score_plus_one() {
    let store = contrarian_store();
    let tensor = RatingTensor::from_store(&store, "mos").expect("tensor");
    let scores = quality_scores(&tensor);

    for w in 0..3 {
        assert!(close(scores[w].sentence, 1.0), "worker{w}: {}", scores[w].sentence);
        assert!(scores[w].algorithm.is_nan(), "one algorithm gives no ranking");
        assert!(close(scores[w].combined, 1.0));
    }
}

/// T1-QUA-02: a rater inverting the crowd ordering scores -1.
#[test]
fn contrarian_scores_minus_one() {
    let store = contrarian_store();
    let tensor = RatingTensor::from_store(&store, "mos").expect("tensor");
    let scores = quality_scores(&tensor);

    assert!(close(scores[3].sentence, -1.0), "worker03: {}", scores[3].sentence);
    assert!(close(scores[3].combined, -1.0));
}

/// T1-QUA-03: agreement on the algorithm ranking shows up in both
/// components and their average.
#[test]
fn algorithm_ranking_agreement_scores_one() {
    let store = agreeing_store();
    let tensor = RatingTensor::from_store(&store, "mos").expect("tensor");
    let scores = quality_scores(&tensor);

    for w in 0..2 {
        assert!(close(scores[w].sentence, 1.0), "worker{w} sentence");
        assert!(close(scores[w].algorithm, 1.0), "worker{w} algorithm");
        assert!(close(scores[w].combined, 1.0), "worker{w} combined");
    }
}

/// T1-QUA-04: with nobody else rating the same cells there is no crowd
/// to correlate against.
#[test]
fn lone_rater_has_no_score() {
    let mut b = StoreBuilder::new();
    b.add_assignment("a0", "worker00", meta(100)).expect("a0");
    b.add_rating("a0", "alg1", "file1", "mos", 4.0).expect("r");
    b.add_rating("a0", "alg1", "file2", "mos", 2.0).expect("r");
    b.add_rating("a0", "alg2", "file1", "mos", 5.0).expect("r");
    b.add_rating("a0", "alg2", "file2", "mos", 3.0).expect("r");
    let store = b.build().expect("build store");
    let tensor = RatingTensor::from_store(&store, "mos").expect("tensor");
    let scores = quality_scores(&tensor);

    assert_eq!(scores.len(), 1);
    assert!(scores[0].sentence.is_nan());
    assert!(scores[0].algorithm.is_nan());
    assert!(scores[0].combined.is_nan());
}

/// T1-QUA-05: the bottom percentile band selects exactly the contrarian
/// and the mask excludes everyone else.
#[test]
fn bottom_percentile_selects_contrarian() {
    let store = contrarian_store();
    let combined = scores_of(&store);

    let mask = select_by_percentile(&combined, 0.0, 0.25, &Mask::from_worker_indices(4, []))
        .expect("select");
    assert_eq!(mask.masked_count(), 3);
    let mut kept: Vec<usize> = mask
        .unmasked_indices()
        .into_iter()
        .filter_map(|ix| match ix {
            MaskIndex::Entity(e) => Some(e),
            MaskIndex::Cell(..) => None,
        })
        .collect();
    kept.sort_unstable();
    assert_eq!(kept, vec![3], "only the worst quartile is in the band");
}

/// T1-QUA-06: workers without a defined score never enter the percentile
/// pool, so even the full band leaves them excluded.
#[test]
fn undefined_scores_stay_out_of_percentile_pool() {
    let store = sparse_fifth_worker_store();
    let combined = scores_of(&store);
    assert!(combined[4].is_nan(), "one rated cell gives no correlation");

    let mask = select_by_percentile(&combined, 0.0, 1.0, &Mask::from_worker_indices(5, []))
        .expect("select");
    let mut masked = entities(&mask);
    masked.sort_unstable();
    assert_eq!(masked, vec![4]);
}

/// T1-QUA-07: threshold selection drops out-of-band scores always and
/// missing scores only when not asked to keep them.
#[test]
fn threshold_keeps_missing_scores_only_on_request() {
    let store = sparse_fifth_worker_store();
    let combined = scores_of(&store);

    let strict = select_by_threshold(&combined, 0.0, 2.0, false);
    let mut masked = entities(&strict);
    masked.sort_unstable();
    assert_eq!(masked, vec![3, 4], "contrarian out of band, missing dropped");

    let lenient = select_by_threshold(&combined, 0.0, 2.0, true);
    let mut masked = entities(&lenient);
    masked.sort_unstable();
    assert_eq!(masked, vec![3], "missing score kept on request");
}
