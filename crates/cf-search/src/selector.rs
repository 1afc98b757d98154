//! Aggregation and parameter selection over a score matrix.

use tracing::info;

use cf_engine::{ScoreMatrix, TaskState};
use cf_types::{AggregateResult, CfError, CfResult, ParameterSummary};

/// One non-blocking poll of every cell, reduced per parameter.
///
/// Failed cells are excluded from both numerator and denominator — a
/// failure never contributes a zero. Non-finite scores count as failures
/// for the same reason. Polling only observes task state;
/// calling this repeatedly as results trickle in is safe and each call
/// reflects the completions visible at that moment.
pub fn summarize(matrix: &ScoreMatrix) -> Vec<ParameterSummary> {
    matrix
        .grid()
        .iter()
        .enumerate()
        .map(|(grid_index, &parameter)| {
            let mut sum = 0.0;
            let mut contributing = 0usize;
            let mut failed = 0usize;
            let mut pending = 0usize;

            for cell in matrix.row(grid_index) {
                match cell.poll() {
                    TaskState::Ready(score) if score.is_finite() => {
                        sum += score;
                        contributing += 1;
                    }
                    // A NaN or infinite score would poison the mean and
                    // defeat the ranking comparison; count it as failed.
                    TaskState::Ready(_) | TaskState::Failed(_) => failed += 1,
                    TaskState::Pending => pending += 1,
                }
            }

            ParameterSummary {
                parameter,
                mean_score: (contributing > 0).then(|| sum / contributing as f64),
                contributing_folds: contributing,
                failed_folds: failed,
                pending_folds: pending,
            }
        })
        .collect()
}

/// Reduce the matrix to the parameter with the highest mean held-out score.
///
/// Parameters with zero contributing folds are excluded from candidacy
/// entirely; if that excludes everyone the call fails with
/// [`CfError::NoResultsAvailable`]. Ties keep the parameter that appears
/// earliest in the original grid order. The result is marked provisional
/// whenever the winner is missing fold contributions or any task pool-wide
/// is still unresolved.
pub fn select(matrix: &ScoreMatrix) -> CfResult<AggregateResult> {
    let summaries = summarize(matrix);
    let any_pending = summaries.iter().any(|s| s.pending_folds > 0);

    let mut best: Option<(usize, f64)> = None;
    for (index, summary) in summaries.iter().enumerate() {
        let Some(mean) = summary.mean_score else {
            continue;
        };
        // Strict improvement only, so the earliest grid entry wins ties.
        if best.map_or(true, |(_, best_mean)| mean > best_mean) {
            best = Some((index, mean));
        }
    }

    let Some((index, mean_score)) = best else {
        return Err(CfError::NoResultsAvailable);
    };

    let winner = &summaries[index];
    let provisional = winner.contributing_folds < matrix.fold_count() || any_pending;

    info!(
        parameter = winner.parameter,
        mean_score,
        contributing = winner.contributing_folds,
        provisional,
        "selected parameter"
    );

    Ok(AggregateResult {
        parameter: winner.parameter,
        mean_score,
        contributing_folds: winner.contributing_folds,
        provisional,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_engine::ScoreTask;
    use cf_types::{SchedulingError, TaskError, TrainingFailure};
    use crossbeam_channel::{bounded, Sender};

    fn ready_row(parameter: f64, scores: &[f64]) -> Vec<ScoreTask> {
        scores
            .iter()
            .enumerate()
            .map(|(f, &s)| ScoreTask::ready(parameter, f, s))
            .collect()
    }

    fn failed_cell(parameter: f64, fold_index: usize) -> ScoreTask {
        ScoreTask::failed(
            parameter,
            fold_index,
            TaskError::Training(TrainingFailure {
                parameter,
                fold_index,
                cause: "did not converge".into(),
            }),
        )
    }

    fn pending_cell(parameter: f64, fold_index: usize) -> (ScoreTask, Sender<cf_engine::TaskResult>) {
        let (tx, rx) = bounded(1);
        (ScoreTask::pending(parameter, fold_index, rx), tx)
    }

    #[test]
    fn selects_highest_mean() {
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0, 10.0],
            2,
            vec![
                ready_row(0.1, &[0.80, 0.82]),
                ready_row(1.0, &[0.90, 0.88]),
                ready_row(10.0, &[0.70, 0.72]),
            ],
        )
        .unwrap();

        let result = select(&matrix).unwrap();
        assert_eq!(result.parameter, 1.0);
        assert!((result.mean_score - 0.89).abs() < 1e-12);
        assert_eq!(result.contributing_folds, 2);
        assert!(!result.provisional);
    }

    #[test]
    fn tie_break_keeps_earliest_grid_entry() {
        let matrix = ScoreMatrix::from_cells(
            vec![0.3, 0.7],
            2,
            vec![ready_row(0.3, &[0.5, 0.5]), ready_row(0.7, &[0.5, 0.5])],
        )
        .unwrap();

        let result = select(&matrix).unwrap();
        assert_eq!(result.parameter, 0.3);

        // Same property with a duplicated grid value: the winner is the
        // first row's summary.
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 0.1],
            1,
            vec![ready_row(0.1, &[0.4]), ready_row(0.1, &[0.4])],
        )
        .unwrap();
        let result = select(&matrix).unwrap();
        assert_eq!(result.summaries[0].contributing_folds, 1);
        assert_eq!(result.parameter, 0.1);
    }

    #[test]
    fn failed_folds_are_excluded_not_zeroed() {
        let matrix = ScoreMatrix::from_cells(
            vec![0.5],
            3,
            vec![vec![
                ScoreTask::ready(0.5, 0, 0.8),
                ScoreTask::ready(0.5, 1, 0.6),
                failed_cell(0.5, 2),
            ]],
        )
        .unwrap();

        let result = select(&matrix).unwrap();
        assert_eq!(result.contributing_folds, 2);
        assert!((result.mean_score - 0.7).abs() < 1e-12);
        assert_eq!(result.summaries[0].failed_folds, 1);
        // Two of three folds is short of k, so the result stays provisional.
        assert!(result.provisional);
    }

    #[test]
    fn nan_scores_count_as_failures_and_never_win() {
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0],
            2,
            vec![
                vec![
                    ScoreTask::ready(0.1, 0, f64::NAN),
                    ScoreTask::ready(0.1, 1, 0.9),
                ],
                ready_row(1.0, &[0.5, 0.5]),
            ],
        )
        .unwrap();

        let summaries = summarize(&matrix);
        assert_eq!(summaries[0].contributing_folds, 1);
        assert_eq!(summaries[0].failed_folds, 1);
        assert_eq!(summaries[0].mean_score, Some(0.9));

        // The NaN fold is excluded rather than poisoning the comparison:
        // the surviving 0.9 mean still wins on its merits.
        let result = select(&matrix).unwrap();
        assert_eq!(result.parameter, 0.1);
        assert_eq!(result.contributing_folds, 1);

        // An all-NaN parameter never becomes a candidate at all.
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0],
            1,
            vec![
                vec![ScoreTask::ready(0.1, 0, f64::NAN)],
                ready_row(1.0, &[0.5]),
            ],
        )
        .unwrap();
        let result = select(&matrix).unwrap();
        assert_eq!(result.parameter, 1.0);
        assert_eq!(result.summaries[0].mean_score, None);
    }

    #[test]
    fn partial_aggregation_counts_only_resolved_folds() {
        let (pending_a, _tx_a) = pending_cell(2.0, 1);
        let (pending_b, _tx_b) = pending_cell(2.0, 2);
        let matrix = ScoreMatrix::from_cells(
            vec![2.0],
            3,
            vec![vec![ScoreTask::ready(2.0, 0, 0.42), pending_a, pending_b]],
        )
        .unwrap();

        let result = select(&matrix).unwrap();
        assert_eq!(result.contributing_folds, 1);
        assert_eq!(result.mean_score, 0.42);
        assert!(result.provisional);
        assert_eq!(result.summaries[0].pending_folds, 2);
    }

    #[test]
    fn zero_contribution_parameters_never_compete() {
        let (pending, _tx) = pending_cell(0.1, 0);
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0],
            1,
            vec![vec![pending], ready_row(1.0, &[-5.0])],
        )
        .unwrap();

        // The unresolved parameter is excluded entirely, not compared as 0,
        // so even a negative mean wins.
        let result = select(&matrix).unwrap();
        assert_eq!(result.parameter, 1.0);
        assert_eq!(result.mean_score, -5.0);
        assert!(result.provisional);
    }

    #[test]
    fn empty_candidate_set_is_an_error() {
        let (pending, _tx) = pending_cell(0.1, 0);
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0],
            1,
            vec![vec![pending], vec![failed_cell(1.0, 0)]],
        )
        .unwrap();

        assert!(matches!(select(&matrix), Err(CfError::NoResultsAvailable)));
    }

    #[test]
    fn provisional_when_any_task_pool_wide_is_unresolved() {
        let (pending, _tx) = pending_cell(1.0, 0);
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0],
            1,
            vec![ready_row(0.1, &[0.9]), vec![pending]],
        )
        .unwrap();

        // The winner itself is complete, but an outstanding task elsewhere
        // could still change the ranking.
        let result = select(&matrix).unwrap();
        assert_eq!(result.parameter, 0.1);
        assert_eq!(result.contributing_folds, 1);
        assert!(result.provisional);
    }

    #[test]
    fn select_is_idempotent_and_observes_late_arrivals() {
        let (pending, tx) = pending_cell(1.0, 0);
        let matrix = ScoreMatrix::from_cells(
            vec![0.1, 1.0],
            1,
            vec![ready_row(0.1, &[0.5]), vec![pending]],
        )
        .unwrap();

        let first = select(&matrix).unwrap();
        let second = select(&matrix).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.parameter, 0.1);

        // A later completion flips the winner on the next poll without
        // anything having been consumed by earlier selects.
        tx.send(Ok(0.9)).unwrap();
        let third = select(&matrix).unwrap();
        assert_eq!(third.parameter, 1.0);
        assert!(!third.provisional);
    }

    #[test]
    fn abandonment_counts_as_failure_not_pending() {
        let (pending, tx) = pending_cell(1.0, 0);
        drop(tx);
        let matrix = ScoreMatrix::from_cells(vec![1.0], 1, vec![vec![pending]]).unwrap();

        let summaries = summarize(&matrix);
        assert_eq!(summaries[0].failed_folds, 1);
        assert_eq!(summaries[0].pending_folds, 0);
        assert!(matches!(select(&matrix), Err(CfError::NoResultsAvailable)));

        // And the failure is classified as scheduling, for the record.
        let cell = &matrix.row(0)[0];
        assert!(matches!(
            cell.poll(),
            TaskState::Failed(TaskError::Scheduling(SchedulingError::TaskAbandoned))
        ));
    }
}
