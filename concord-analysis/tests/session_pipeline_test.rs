//! Session pipeline tests — T1-SES-01 through T1-SES-12.
//!
//! Tests cover: mask registration reports (before/after counts, newly
//! covered labels, skipped finer masks), metadata filters with config
//! fallbacks, eager validation leaving the registry untouched on
//! failure, threshold and percentile selections composed with prior
//! masks, and assignment approve/reject decision lists.

use ndarray::Array3;

use concord_analysis::masks::Mask;
use concord_analysis::report::AssignmentDecision;
use concord_analysis::session::Session;
use concord_analysis::stats::OutlierScope;
use concord_analysis::store::{AssignmentMeta, RatingStore, StoreBuilder, SubmissionState};
use concord_core::config::EvalConfig;
use concord_core::errors::{ConfigError, MaskError, SessionError};
use concord_core::types::MaskKind;

// ---- Helpers ----

fn meta(device: &str, submitted_at: i64, work_duration_secs: u64) -> AssignmentMeta {
    AssignmentMeta {
        device: device.to_string(),
        state: SubmissionState::Pending,
        submitted_at,
        work_duration_secs,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Three workers, four assignments, two algorithms, two files. a2 and a3
/// were submitted on a laptop, a2 in an implausible 90 seconds.
///
/// Rated cells (algorithm, worker, file): a0 owns (0,0,0)=1 and
/// (0,0,1)=5; a1 owns (0,1,0)=2 and (1,1,0)=2; a2 owns (1,2,1)=3; a3
/// owns (1,0,0)=4.
fn pipeline_store() -> RatingStore {
    let mut b = StoreBuilder::new();
    b.add_assignment("a0", "worker00", meta("headphone", 100, 400))
        .expect("a0");
    b.add_assignment("a1", "worker01", meta("headphone", 110, 350))
        .expect("a1");
    b.add_assignment("a2", "worker02", meta("laptop", 120, 90))
        .expect("a2");
    b.add_assignment("a3", "worker00", meta("laptop", 130, 500))
        .expect("a3");
    b.add_rating("a0", "alg1", "file1", "mos", 1.0).expect("r");
    b.add_rating("a0", "alg1", "file2", "mos", 5.0).expect("r");
    b.add_rating("a1", "alg1", "file1", "mos", 2.0).expect("r");
    b.add_rating("a1", "alg2", "file1", "mos", 2.0).expect("r");
    b.add_rating("a2", "alg2", "file2", "mos", 3.0).expect("r");
    b.add_rating("a3", "alg2", "file1", "mos", 4.0).expect("r");
    b.build().expect("build store")
}

/// Four workers on one algorithm, three files, worker03 inverting the
/// crowd: scores come out near 1, 1, 1, -1.
fn contrarian_store() -> RatingStore {
    let mut b = StoreBuilder::new();
    for i in 0..4 {
        let assignment = format!("a{i}");
        let worker = format!("worker{i:02}");
        b.add_assignment(&assignment, &worker, meta("headphone", 100 + i as i64, 300))
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

/// Ten one-cell raters, worker07 spiking at z = 3 exactly.
fn spiked_store() -> RatingStore {
    let mut b = StoreBuilder::new();
    for i in 0..10 {
        let assignment = format!("a{i}");
        let worker = format!("worker{i:02}");
        b.add_assignment(&assignment, &worker, meta("headphone", 100 + i as i64, 300))
            .expect("assignment");
        let vote = if i == 7 { 100.0 } else { 10.0 };
        b.add_rating(&assignment, "alg1", "file1", "mos", vote)
            .expect("rating");
    }
    b.build().expect("build store")
}

fn decision(assignment: &str, worker: &str) -> AssignmentDecision {
    AssignmentDecision {
        assignment: assignment.to_string(),
        worker: worker.to_string(),
    }
}

// ---- Tests ----

/// T1-SES-01: a device filter reports the covered assignments and the
/// rating cells they imply, leaving worker counts alone.
#[test]
fn device_mask_reports_assignment_delta() {
    let mut session = Session::new(pipeline_store(), EvalConfig::default());
    let report = session.mask_device("laptop", "laptop").expect("register");

    assert_eq!(report.name, "laptop");
    assert_eq!(report.kind, MaskKind::Assignment);
    assert_eq!(report.before.assignments.masked, 0);
    assert_eq!(report.before.ratings.masked, 0);
    assert_eq!(report.after.assignments.masked, 2);
    assert_eq!(report.after.assignments.unmasked, 2);
    assert_eq!(report.after.ratings.masked, 2);
    assert_eq!(report.after.workers.masked, 0);
    assert_eq!(report.newly_masked, vec!["a2".to_string(), "a3".to_string()]);
    assert!(report.merge_skipped.is_empty());
}

/// T1-SES-02: the short-assignment filter falls back to the configured
/// plausibility floor.
#[test]
fn short_assignment_filter_uses_config_floor() {
    let config = EvalConfig {
        min_work_duration_secs: Some(120),
        ..EvalConfig::default()
    };
    let mut session = Session::new(pipeline_store(), config);
    let report = session.mask_short_assignments("rushed", None).expect("register");

    assert_eq!(report.after.assignments.masked, 1);
    assert_eq!(report.newly_masked, vec!["a2".to_string()]);
}

/// T1-SES-03: without an explicit or configured floor the filter is
/// refused instead of silently masking nothing.
#[test]
fn short_assignment_filter_without_floor_is_refused() {
    let mut session = Session::new(pipeline_store(), EvalConfig::default());
    let err = session
        .mask_short_assignments("rushed", None)
        .expect_err("no floor");

    assert!(matches!(
        err,
        SessionError::Config(ConfigError::ValidationFailed { ref field, .. })
            if field == "min_work_duration_secs"
    ));
    assert!(session.registry().is_empty());
}

/// T1-SES-04: re-registering a name reports only the coverage the new
/// mask adds over the old registry state.
#[test]
fn reregistration_reports_only_new_coverage() {
    let mut session = Session::new(pipeline_store(), EvalConfig::default());
    let first = session
        .register_mask("suspect", Mask::from_worker_indices(3, [0]))
        .expect("first");
    assert_eq!(first.newly_masked, vec!["worker00".to_string()]);
    assert_eq!(first.after.workers.masked, 1);

    let second = session
        .register_mask("suspect", Mask::from_worker_indices(3, [0, 2]))
        .expect("second");
    assert_eq!(second.before.workers.masked, 1);
    assert_eq!(second.after.workers.masked, 2);
    assert_eq!(second.newly_masked, vec!["worker02".to_string()]);
    assert_eq!(session.registry().len(), 1);
}

/// T1-SES-05: a registered rating mask cannot speak about workers, so a
/// worker-level registration reports it as skipped rather than failing.
#[test]
fn finer_masks_skip_in_worker_merge_report() {
    let mut session = Session::new(pipeline_store(), EvalConfig::default());
    let mut flags = Array3::from_elem((2, 3, 2), false);
    flags[(0, 0, 0)] = true;
    session
        .register_mask("spike", Mask::Rating(flags))
        .expect("spike");

    let report = session
        .register_mask("suspect", Mask::from_worker_indices(3, [1]))
        .expect("suspect");
    assert_eq!(report.merge_skipped, vec!["spike".to_string()]);
    assert_eq!(report.newly_masked, vec!["worker01".to_string()]);
    assert_eq!(report.before.ratings.masked, 1);
    // worker01 owns two rated cells on top of the spike.
    assert_eq!(report.after.ratings.masked, 3);
    assert_eq!(report.after.workers.masked, 1);
}

/// T1-SES-06: asking for a rating name nobody submitted is an error.
#[test]
fn unknown_rating_name_is_an_error() {
    let session = Session::new(pipeline_store(), EvalConfig::default());
    let err = session.mos_report("vqs", &[]).expect_err("unknown name");
    assert!(matches!(
        err,
        SessionError::UnknownRatingName { ref name } if name == "vqs"
    ));
}

/// T1-SES-07: composite operations fail before any registry write when a
/// named mask does not exist.
#[test]
fn unknown_mask_name_fails_before_any_write() {
    let mut session = Session::new(spiked_store(), EvalConfig::default());
    let err = session
        .detect_and_register_outliers("x", "mos", &["missing"], Some(2.5), OutlierScope::Global)
        .expect_err("unknown mask");

    assert!(matches!(
        err,
        SessionError::Mask(MaskError::UnknownMask { ref name }) if name == "missing"
    ));
    assert!(session.registry().is_empty());
}

/// T1-SES-08: a shape that does not fit the store is rejected eagerly
/// and registers nothing.
#[test]
fn wrong_shape_mask_is_rejected_eagerly() {
    let mut session = Session::new(pipeline_store(), EvalConfig::default());
    let err = session
        .register_mask("suspect", Mask::from_worker_indices(99, [0]))
        .expect_err("wrong shape");

    assert!(matches!(err, SessionError::Mask(MaskError::ShapeMismatch { .. })));
    assert!(session.registry().is_empty());
}

/// T1-SES-09: the outlier threshold falls back to the configured value;
/// the compiled default of 3 does not flag a spike sitting at z = 3.
#[test]
fn outlier_threshold_falls_back_to_config() {
    let config = EvalConfig {
        outlier_threshold: Some(2.5),
        ..EvalConfig::default()
    };
    let mut tuned = Session::new(spiked_store(), config);
    let report = tuned
        .detect_and_register_outliers("spikes", "mos", &[], None, OutlierScope::Global)
        .expect("scan");
    assert_eq!(report.after.ratings.masked, 1);

    let mut stock = Session::new(spiked_store(), EvalConfig::default());
    let report = stock
        .detect_and_register_outliers("spikes", "mos", &[], None, OutlierScope::Global)
        .expect("scan");
    assert_eq!(report.after.ratings.masked, 0, "z = 3 is not above 3");
}

/// T1-SES-10: masks change the MOS report and the decision lists name
/// each assignment with its owning worker.
#[test]
fn pipeline_masks_reports_and_decisions() {
    let mut session = Session::new(pipeline_store(), EvalConfig::default());

    let unmasked = session.mos_report("mos", &[]).expect("report");
    assert!(close(unmasked.algorithms[0].mos, 8.0 / 3.0));
    assert!(close(unmasked.algorithms[1].mos, 3.0));

    session.mask_device("laptop", "laptop").expect("device");
    let masked = session.mos_report("mos", &["laptop"]).expect("report");
    assert!(close(masked.algorithms[0].mos, 8.0 / 3.0), "alg1 untouched");
    assert!(close(masked.algorithms[1].mos, 2.0), "alg2 lost a2 and a3");

    let decisions = session.assignment_decisions(&["laptop"]).expect("decisions");
    assert_eq!(
        decisions.approve,
        vec![decision("a0", "worker00"), decision("a1", "worker01")]
    );
    assert_eq!(
        decisions.reject,
        vec![decision("a2", "worker02"), decision("a3", "worker00")]
    );
    assert!(decisions.merge_skipped.is_empty());
}

/// T1-SES-11: percentile selection ranks only workers the prior masks
/// leave visible, and coverage already explained by those masks is not
/// reported as new.
#[test]
fn percentile_selection_respects_prior_worker_masks() {
    let mut session = Session::new(contrarian_store(), EvalConfig::default());
    session
        .register_mask("manual", Mask::from_worker_indices(4, [3]))
        .expect("manual");

    let report = session
        .register_percentile_selection("band", "mos", &["manual"], 0.0, 1.0)
        .expect("band");
    // The full band keeps every ranked worker; only the pre-masked
    // contrarian stays excluded, and "manual" already covers them.
    assert_eq!(report.after.workers.masked, 1);
    assert!(report.newly_masked.is_empty());
    assert!(report.merge_skipped.is_empty());
}

/// T1-SES-12: threshold selection falls back to the configured missing-
/// score policy.
#[test]
fn threshold_selection_uses_config_missing_policy() {
    let mut b = StoreBuilder::new();
    for i in 0..4 {
        let assignment = format!("a{i}");
        let worker = format!("worker{i:02}");
        b.add_assignment(&assignment, &worker, meta("headphone", 100 + i as i64, 300))
            .expect("assignment");
        let votes: [f64; 3] = if i == 3 { [5.0, 3.0, 1.0] } else { [1.0, 3.0, 5.0] };
        for (f, vote) in votes.iter().enumerate() {
            let file = format!("file{}", f + 1);
            b.add_rating(&assignment, "alg1", &file, "mos", *vote)
                .expect("rating");
        }
    }
    b.add_assignment("a4", "worker04", meta("headphone", 104, 300))
        .expect("a4");
    b.add_rating("a4", "alg1", "file1", "mos", 3.0).expect("r");
    let store = b.build().expect("build store");

    let config = EvalConfig {
        include_missing_scores: Some(true),
        ..EvalConfig::default()
    };
    let mut session = Session::new(store, config);
    let report = session
        .register_threshold_selection("band", "mos", &[], 0.0, 2.0, None)
        .expect("band");

    // worker03 scores below the band; worker04 has no score but the
    // configured policy keeps them.
    assert_eq!(report.after.workers.masked, 1);
    assert_eq!(report.newly_masked, vec!["worker03".to_string()]);
}
