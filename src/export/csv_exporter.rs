use std::io::Write;

use tracing::info;

use crate::{
    database::Fact,
    error::{EngineResult, StoreError},
    executor::PlanExecutor,
    export::Stringify,
    planner::CohortPlan,
};

/// Streams a plan's matching facts as CSV: a header row of field names,
/// then one row per fact, bounded by the plan's effective limit.
pub struct CsvExporter;

impl CsvExporter {
    /// Returns the number of data rows written. Buffered output is flushed
    /// even when the scan or a row write fails.
    pub async fn export<W: Write + Send>(
        executor: &PlanExecutor,
        plan: &CohortPlan,
        fields: &[String],
        writer: &mut W,
    ) -> EngineResult<usize> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(fields)?;

        let mut write_error: Option<csv::Error> = None;
        let scanned = executor.scan(plan, &mut |fact: &Fact| {
            let record = executor.project(fact, fields).values().map(Stringify::value).collect::<Vec<_>>();
            wtr.write_record(&record).map_err(|e| {
                write_error = Some(e);
                StoreError::Aborted
            })
        }).await;

        let flushed = wtr.flush();

        if let Some(e) = write_error {
            return Err(e.into());
        }
        let rows = scanned?;
        flushed?;

        info!(cohort_id = %plan.cohort_id, rows, "cohort exported");
        Ok(rows)
    }
}
