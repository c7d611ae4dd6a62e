use camino::Utf8PathBuf;
use log::info;

/// Outcome of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Store file that was populated.
    pub database_path: Utf8PathBuf,
    /// Data rows counted in the source (header excluded).
    pub total_rows: u64,
    /// Rows newly inserted into the store.
    pub inserted: u64,
    /// Rows read but skipped because their postcode was already stored.
    pub skipped: u64,
    /// Number of batches written.
    pub batches: u64,
}

/// Observer for provisioning progress.
///
/// Every method defaults to a no-op so implementers override only the events
/// they render. Observers cannot influence the import.
pub trait ProvisionProgress {
    /// Called once the source rows have been counted.
    fn started(&self, total: u64) {
        let _ = total;
    }

    /// Called after each batch commits with cumulative and total row counts.
    fn batch_inserted(&self, processed: u64, total: u64) {
        let _ = (processed, total);
    }

    /// Called before the store is compacted.
    fn compacting(&self) {}

    /// Called when the run completes.
    fn finished(&self, report: &ProvisionReport) {
        let _ = report;
    }
}

/// Progress observer that writes each event to the `log` facade at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProvisionProgress for LogProgress {
    fn started(&self, total: u64) {
        info!("importing {total} postcodes");
    }

    fn batch_inserted(&self, processed: u64, total: u64) {
        info!("imported {processed}/{total} postcodes");
    }

    fn compacting(&self) {
        info!("compacting database...");
    }

    fn finished(&self, report: &ProvisionReport) {
        info!(
            "...done: {} inserted, {} skipped in {} batches into {}",
            report.inserted, report.skipped, report.batches, report.database_path
        );
    }
}
