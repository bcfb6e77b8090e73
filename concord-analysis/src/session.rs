//! Session orchestration: one evaluation run over an immutable store.
//!
//! A [`Session`] owns the rating store, the indices derived from it once
//! at construction, the named mask registry and the evaluation config.
//! Composite operations follow one shape: validate names and shapes
//! eagerly, merge the requested masks to the needed granularity, convert,
//! apply, compute. A failure anywhere before the final registry write
//! leaves the registry untouched.

use std::time::Instant;

use tracing::{debug, info};

use concord_core::config::EvalConfig;
use concord_core::errors::{ConfigError, MaskError, SessionError};
use concord_core::types::{FxHashSet, MaskKind};

use crate::masks::{Mask, MaskIndex, MaskRegistry};
use crate::quality::{quality_scores, select_by_percentile, select_by_threshold};
use crate::report::{
    AlgorithmMos, AssignmentDecision, AssignmentDecisions, GranularityCounts, MaskCounts,
    MaskReport, MosReport, WorkerScore, WorkerScoreReport,
};
use crate::stats::{apply_mask, detect_outliers, mos_per_algorithm, OutlierScope};
use crate::store::{RatingStore, RatingTensor, StoreIndex};

/// One evaluation run: immutable ratings, cached indices, named masks and
/// the config that parameterizes filter defaults.
#[derive(Debug)]
pub struct Session {
    store: RatingStore,
    index: StoreIndex,
    registry: MaskRegistry,
    config: EvalConfig,
}

impl Session {
    pub fn new(store: RatingStore, config: EvalConfig) -> Self {
        Self::from_parts(store, MaskRegistry::new(), config)
    }

    /// Rebuild a session around an existing registry, as the persistence
    /// layer does after a load.
    pub fn from_parts(store: RatingStore, registry: MaskRegistry, config: EvalConfig) -> Self {
        let started = Instant::now();
        let index = StoreIndex::build(&store);
        debug!(
            algorithms = store.n_algorithms(),
            workers = store.n_workers(),
            files = store.n_files(),
            assignments = store.n_assignments(),
            tensor_build_time = started.elapsed().as_millis() as u64,
            "session indices built"
        );
        Self {
            store,
            index,
            registry,
            config,
        }
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn index(&self) -> &StoreIndex {
        &self.index
    }

    pub fn registry(&self) -> &MaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Validate and register a mask under `name`, reporting what changed.
    ///
    /// `before`/`after` totals merge every registered mask at each
    /// granularity, so re-registering an existing name reports the delta
    /// against the old content. `newly_masked` lists only identifiers no
    /// previously registered mask already covered.
    pub fn register_mask(&mut self, name: &str, mask: Mask) -> Result<MaskReport, SessionError> {
        self.validate_shape(&mask)?;

        let before = self.exclusion_counts()?;
        let prior = {
            let names: Vec<&str> = self.registry.names().collect();
            self.registry
                .merge_into(mask.kind(), &names, &self.store, &self.index)?
        };
        let newly_masked = self.newly_masked_labels(&mask, &prior.mask);
        let kind = mask.kind();

        self.registry.register(name, mask);
        let after = self.exclusion_counts()?;

        info!(
            mask = name,
            kind = %kind,
            masked_workers = after.workers.masked,
            masked_assignments = after.assignments.masked,
            masked_ratings = after.ratings.masked,
            "registered mask"
        );

        Ok(MaskReport {
            name: name.to_string(),
            kind,
            before,
            after,
            newly_masked,
            merge_skipped: prior.skipped,
        })
    }

    /// Materialize the named rating tensor with the named masks applied.
    ///
    /// Every mask kind converts to rating granularity, so this merge
    /// never skips.
    pub fn masked_tensor(
        &self,
        rating_name: &str,
        mask_names: &[&str],
    ) -> Result<RatingTensor, SessionError> {
        let started = Instant::now();
        let tensor = RatingTensor::from_store(&self.store, rating_name).ok_or_else(|| {
            SessionError::UnknownRatingName {
                name: rating_name.to_string(),
            }
        })?;
        let merged =
            self.registry
                .merge_into(MaskKind::Rating, mask_names, &self.store, &self.index)?;
        let masked = apply_mask(&tensor, &merged.mask)?;
        debug!(
            rating_name = rating_name,
            masked_ratings = merged.mask.masked_count(),
            tensor_build_time = started.elapsed().as_millis() as u64,
            "masked tensor materialized"
        );
        Ok(masked)
    }

    /// Per-algorithm MOS and CI95 for one rating name under the named
    /// masks.
    pub fn mos_report(
        &self,
        rating_name: &str,
        mask_names: &[&str],
    ) -> Result<MosReport, SessionError> {
        let tensor = self.masked_tensor(rating_name, mask_names)?;
        let started = Instant::now();
        let estimates = mos_per_algorithm(&tensor);
        let algorithms = self
            .store
            .algorithms()
            .iter()
            .zip(estimates)
            .map(|((_, name), estimate)| AlgorithmMos {
                algorithm: name.to_string(),
                mos: estimate.mos,
                ci95: estimate.ci95,
            })
            .collect();
        debug!(
            rating_name = rating_name,
            ci_compute_time = started.elapsed().as_millis() as u64,
            "mos report computed"
        );
        Ok(MosReport {
            rating_name: rating_name.to_string(),
            algorithms,
        })
    }

    /// Scan the masked tensor for statistical outliers and register the
    /// resulting rating mask under `name`.
    ///
    /// `threshold` falls back to the configured default. Cells already
    /// excluded by the named masks are invisible to the scan and can
    /// never be flagged again.
    pub fn detect_and_register_outliers(
        &mut self,
        name: &str,
        rating_name: &str,
        mask_names: &[&str],
        threshold: Option<f64>,
        scope: OutlierScope,
    ) -> Result<MaskReport, SessionError> {
        let threshold = threshold.unwrap_or_else(|| self.config.effective_outlier_threshold());
        let tensor = self.masked_tensor(rating_name, mask_names)?;
        let started = Instant::now();
        let outliers = detect_outliers(&tensor, threshold, scope)?;
        info!(
            rating_name = rating_name,
            threshold = threshold,
            scope = ?scope,
            flagged = outliers.masked_count(),
            outlier_scan_time = started.elapsed().as_millis() as u64,
            "outlier scan finished"
        );
        self.register_mask(name, outliers)
    }

    /// Quality components per worker for one rating name under the named
    /// masks.
    pub fn score_workers(
        &self,
        rating_name: &str,
        mask_names: &[&str],
    ) -> Result<WorkerScoreReport, SessionError> {
        let tensor = self.masked_tensor(rating_name, mask_names)?;
        let started = Instant::now();
        let scores = quality_scores(&tensor);
        let rows = self
            .store
            .workers()
            .iter()
            .zip(scores)
            .map(|((_, worker), score)| WorkerScore {
                worker: worker.to_string(),
                sentence: score.sentence,
                algorithm: score.algorithm,
                combined: score.combined,
            })
            .collect();
        debug!(
            rating_name = rating_name,
            score_compute_time = started.elapsed().as_millis() as u64,
            "worker scores computed"
        );
        Ok(WorkerScoreReport {
            rating_name: rating_name.to_string(),
            scores: rows,
        })
    }

    /// Select workers by combined score in `[from, to)` and register the
    /// exclusion mask under `name`. `include_missing` falls back to the
    /// configured default.
    pub fn register_threshold_selection(
        &mut self,
        name: &str,
        rating_name: &str,
        mask_names: &[&str],
        from: f64,
        to: f64,
        include_missing: Option<bool>,
    ) -> Result<MaskReport, SessionError> {
        let include_missing =
            include_missing.unwrap_or_else(|| self.config.effective_include_missing_scores());
        let tensor = self.masked_tensor(rating_name, mask_names)?;
        let combined: Vec<f64> = quality_scores(&tensor).iter().map(|s| s.combined).collect();
        let mask = select_by_threshold(&combined, from, to, include_missing);
        self.register_mask(name, mask)
    }

    /// Select the `[from, to)` percentile band of the combined-score
    /// ranking and register the exclusion mask under `name`.
    ///
    /// Workers the named masks already exclude stay out of the ranking
    /// pool; named masks finer than worker granularity cannot restrict
    /// the pool and are reported as skipped.
    pub fn register_percentile_selection(
        &mut self,
        name: &str,
        rating_name: &str,
        mask_names: &[&str],
        from: f64,
        to: f64,
    ) -> Result<MaskReport, SessionError> {
        let tensor = self.masked_tensor(rating_name, mask_names)?;
        let combined: Vec<f64> = quality_scores(&tensor).iter().map(|s| s.combined).collect();
        let already =
            self.registry
                .merge_into(MaskKind::Worker, mask_names, &self.store, &self.index)?;
        if !already.skipped.is_empty() {
            debug!(
                merge_skipped = ?already.skipped,
                "masks finer than worker granularity left out of the ranking pool"
            );
        }
        let mask = select_by_percentile(&combined, from, to, &already.mask)?;
        let mut report = self.register_mask(name, mask)?;
        for skipped in already.skipped {
            if !report.merge_skipped.contains(&skipped) {
                report.merge_skipped.push(skipped);
            }
        }
        Ok(report)
    }

    /// Flag assignments completed faster than a plausibility floor and
    /// register the mask under `name`. `min_duration_secs` falls back to
    /// the configured floor; with neither, the operation is refused.
    pub fn mask_short_assignments(
        &mut self,
        name: &str,
        min_duration_secs: Option<u64>,
    ) -> Result<MaskReport, SessionError> {
        let floor = match min_duration_secs.or_else(|| self.config.effective_min_work_duration_secs())
        {
            Some(floor) => floor,
            None => {
                return Err(ConfigError::ValidationFailed {
                    field: "min_work_duration_secs".to_string(),
                    message: "no duration floor given and none configured".to_string(),
                }
                .into())
            }
        };
        let mask = Mask::from_meta(&self.store, |meta| meta.work_duration_secs < floor);
        info!(
            floor_secs = floor,
            flagged = mask.masked_count(),
            "short assignment filter"
        );
        self.register_mask(name, mask)
    }

    /// Flag assignments submitted on the named listening device and
    /// register the mask under `name`.
    pub fn mask_device(&mut self, name: &str, device: &str) -> Result<MaskReport, SessionError> {
        let mask = Mask::from_meta(&self.store, |meta| meta.device == device);
        info!(
            device = device,
            flagged = mask.masked_count(),
            "device filter"
        );
        self.register_mask(name, mask)
    }

    /// Split assignments into approval and rejection candidates under the
    /// named masks, each labeled with its owning worker.
    ///
    /// Rating-granularity masks cannot speak about whole assignments and
    /// are reported as skipped.
    pub fn assignment_decisions(
        &self,
        mask_names: &[&str],
    ) -> Result<AssignmentDecisions, SessionError> {
        let merged = self.registry.merge_into(
            MaskKind::Assignment,
            mask_names,
            &self.store,
            &self.index,
        )?;

        let worker_names = self.worker_names();
        let assignment_names = self.assignment_names();
        let decision = |a: usize| AssignmentDecision {
            assignment: assignment_names[a].to_string(),
            worker: worker_names[self.index.worker_of(a)].to_string(),
        };

        let mut approve = Vec::new();
        for ix in merged.mask.unmasked_indices() {
            if let MaskIndex::Entity(a) = ix {
                approve.push(decision(a));
            }
        }
        let mut reject = Vec::new();
        for ix in merged.mask.masked_indices() {
            if let MaskIndex::Entity(a) = ix {
                reject.push(decision(a));
            }
        }

        info!(
            approve = approve.len(),
            reject = reject.len(),
            merge_skipped = merged.skipped.len(),
            "assignment decisions computed"
        );
        Ok(AssignmentDecisions {
            approve,
            reject,
            merge_skipped: merged.skipped,
        })
    }

    fn expected_shape(&self, kind: MaskKind) -> Vec<usize> {
        match kind {
            MaskKind::Rating => {
                let (a, w, f) = self.store.tensor_shape();
                vec![a, w, f]
            }
            MaskKind::Assignment => vec![self.store.n_assignments()],
            MaskKind::Worker => vec![self.store.n_workers()],
        }
    }

    fn validate_shape(&self, mask: &Mask) -> Result<(), MaskError> {
        let expected = self.expected_shape(mask.kind());
        let actual = mask.shape();
        if expected != actual {
            return Err(MaskError::ShapeMismatch { expected, actual });
        }
        Ok(())
    }

    fn counts_at(&self, kind: MaskKind, names: &[&str]) -> Result<GranularityCounts, MaskError> {
        let merged = self.registry.merge_into(kind, names, &self.store, &self.index)?;
        Ok(GranularityCounts {
            masked: merged.mask.masked_count(),
            unmasked: merged.mask.unmasked_count(),
        })
    }

    /// Exclusion totals over every registered mask. At worker and
    /// assignment granularity only masks at least that coarse count; a
    /// masked rating never masks its assignment or worker.
    fn exclusion_counts(&self) -> Result<MaskCounts, MaskError> {
        let names: Vec<&str> = self.registry.names().collect();
        Ok(MaskCounts {
            workers: self.counts_at(MaskKind::Worker, &names)?,
            assignments: self.counts_at(MaskKind::Assignment, &names)?,
            ratings: self.counts_at(MaskKind::Rating, &names)?,
        })
    }

    fn worker_names(&self) -> Vec<&str> {
        self.store.workers().iter().map(|(_, name)| name).collect()
    }

    fn assignment_names(&self) -> Vec<&str> {
        self.store
            .assignments()
            .iter()
            .map(|(_, name)| name)
            .collect()
    }

    fn algorithm_names(&self) -> Vec<&str> {
        self.store
            .algorithms()
            .iter()
            .map(|(_, name)| name)
            .collect()
    }

    fn file_names(&self) -> Vec<&str> {
        self.store.files().iter().map(|(_, name)| name).collect()
    }

    /// Labels for flags set in `mask` that `prior` does not already
    /// cover. Rating cells label as `algorithm/worker/file`.
    fn newly_masked_labels(&self, mask: &Mask, prior: &Mask) -> Vec<String> {
        let covered: FxHashSet<MaskIndex> = prior.masked_indices().into_iter().collect();
        let mut labels = Vec::new();
        match mask {
            Mask::Worker(flags) => {
                let workers = self.worker_names();
                for (w, &set) in flags.iter().enumerate() {
                    if set && !covered.contains(&MaskIndex::Entity(w)) {
                        labels.push(workers[w].to_string());
                    }
                }
            }
            Mask::Assignment(flags) => {
                let assignments = self.assignment_names();
                for (a, &set) in flags.iter().enumerate() {
                    if set && !covered.contains(&MaskIndex::Entity(a)) {
                        labels.push(assignments[a].to_string());
                    }
                }
            }
            Mask::Rating(flags) => {
                let algorithms = self.algorithm_names();
                let workers = self.worker_names();
                let files = self.file_names();
                for ((a, w, f), &set) in flags.indexed_iter() {
                    if set && !covered.contains(&MaskIndex::Cell(a, w, f)) {
                        labels.push(format!("{}/{}/{}", algorithms[a], workers[w], files[f]));
                    }
                }
            }
        }
        labels
    }
}
