//! Tests for the Concord error handling system.

use std::collections::HashSet;

use concord_core::errors::error_code::ConcordErrorCode;
use concord_core::errors::*;
use concord_core::types::MaskKind;

/// T0-ERR-01: Test every error enum has ConcordErrorCode implementation
#[test]
fn test_all_errors_have_error_code() {
    let mask = MaskError::UnknownMask {
        name: "missing".into(),
    };
    assert!(!mask.error_code().is_empty());

    let stats = StatsError::EmptyScope {
        scope: "alg1".into(),
    };
    assert!(!stats.error_code().is_empty());

    let store = StoreError::Empty;
    assert!(!store.error_code().is_empty());

    let config = ConfigError::FileNotFound {
        path: "/tmp".into(),
    };
    assert!(!config.error_code().is_empty());

    let storage = StorageError::DbCorrupt {
        message: "bad header".into(),
    };
    assert!(!storage.error_code().is_empty());

    let session = SessionError::UnknownRatingName { name: "mos".into() };
    assert!(!session.error_code().is_empty());
}

/// T0-ERR-02: Test From conversions between sub-errors and session error
#[test]
fn test_from_conversions() {
    let mask = MaskError::IllegalConversion {
        from: MaskKind::Rating,
        to: MaskKind::Worker,
    };
    let session: SessionError = mask.into();
    assert!(matches!(
        session,
        SessionError::Mask(MaskError::IllegalConversion { .. })
    ));

    let stats = StatsError::ZeroVariance {
        scope: "global".into(),
    };
    let session: SessionError = stats.into();
    assert!(matches!(session, SessionError::Stats(_)));

    let store = StoreError::Empty;
    let session: SessionError = store.into();
    assert!(matches!(session, SessionError::Store(_)));

    let config = ConfigError::FileNotFound {
        path: "/tmp".into(),
    };
    let session: SessionError = config.into();
    assert!(matches!(session, SessionError::Config(_)));

    let storage = StorageError::Sqlite {
        message: "locked".into(),
    };
    let session: SessionError = storage.into();
    assert!(matches!(session, SessionError::Storage(_)));
}

/// T0-ERR-03: Test report string format [ERROR_CODE] message
#[test]
fn test_report_string_format() {
    let mask = MaskError::UnknownMask {
        name: "outliers".into(),
    };
    let report = mask.report_string();
    assert!(report.starts_with('['));
    assert!(report.contains(']'));
    assert_eq!(report, "[UNKNOWN_MASK] unknown mask: outliers");

    let store = StoreError::Empty;
    assert_eq!(store.report_string(), "[STORE_ERROR] store has no ratings");
}

/// T0-ERR-04: Test session error code is inherited from the wrapped error
#[test]
fn test_session_error_code_inherited() {
    let session: SessionError = MaskError::ShapeMismatch {
        expected: vec![3, 2, 4],
        actual: vec![3, 2, 5],
    }
    .into();
    assert_eq!(session.error_code(), "SHAPE_MISMATCH");

    let session: SessionError = StatsError::EmptyScope {
        scope: "alg2".into(),
    }
    .into();
    assert_eq!(session.error_code(), "DEGENERATE_INPUT");

    let session: SessionError = StoreError::AmbiguousDuplicate {
        worker: "w0".into(),
        algorithm: "alg1".into(),
        file: "file1".into(),
        rating_name: "mos".into(),
    }
    .into();
    assert_eq!(session.error_code(), "AMBIGUOUS_DUPLICATE");
}

/// T0-ERR-05: Test every error variant's Display impl produces human-readable message
#[test]
fn test_display_human_readable() {
    let errors: Vec<Box<dyn std::fmt::Display>> = vec![
        Box::new(MaskError::ShapeMismatch {
            expected: vec![3, 2, 4],
            actual: vec![2, 2, 4],
        }),
        Box::new(MaskError::KindMismatch {
            left: MaskKind::Worker,
            right: MaskKind::Rating,
        }),
        Box::new(MaskError::IllegalConversion {
            from: MaskKind::Rating,
            to: MaskKind::Assignment,
        }),
        Box::new(MaskError::UnknownMask {
            name: "missing".into(),
        }),
        Box::new(StatsError::EmptyScope {
            scope: "alg1".into(),
        }),
        Box::new(StatsError::ZeroVariance {
            scope: "global".into(),
        }),
        Box::new(StoreError::DuplicateAssignment {
            assignment: "a1".into(),
        }),
        Box::new(StoreError::UnknownAssignment {
            assignment: "a9".into(),
        }),
        Box::new(StoreError::NonFiniteVote {
            assignment: "a1".into(),
            algorithm: "alg1".into(),
            file: "file1".into(),
            rating_name: "mos".into(),
            vote: f64::NAN,
        }),
        Box::new(ConfigError::ValidationFailed {
            field: "outlier_threshold".into(),
            message: "too low".into(),
        }),
        Box::new(StorageError::MigrationFailed {
            version: 1,
            message: "column missing".into(),
        }),
    ];

    for error in &errors {
        let msg = error.to_string();
        // Should not contain Debug formatting artifacts
        assert!(!msg.contains("{ "), "Debug leak in: {}", msg);
        assert!(!msg.is_empty());
    }
}

/// T0-ERR-06: Test all report error codes are unique
#[test]
fn test_error_codes_unique() {
    use concord_core::errors::error_code::*;

    let codes = vec![
        SHAPE_MISMATCH,
        ILLEGAL_CONVERSION,
        UNKNOWN_MASK,
        DEGENERATE_INPUT,
        STORE_ERROR,
        AMBIGUOUS_DUPLICATE,
        CONFIG_ERROR,
        STORAGE_ERROR,
        DB_CORRUPT,
        MIGRATION_FAILED,
    ];

    let unique: HashSet<&str> = codes.iter().copied().collect();
    assert_eq!(codes.len(), unique.len(), "Duplicate error codes found");
}

/// T0-ERR-07: Test kind mismatch maps to the shape-mismatch code
#[test]
fn test_kind_mismatch_is_shape_category() {
    let err = MaskError::KindMismatch {
        left: MaskKind::Assignment,
        right: MaskKind::Worker,
    };
    assert_eq!(err.error_code(), "SHAPE_MISMATCH");
}
