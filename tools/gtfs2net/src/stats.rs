use gtfs2net_transit::SweepSummary;

/// Totals over every processed feed
#[derive(Debug, Default)]
pub struct BatchStats {
    pub feeds_processed: usize,
    pub feeds_with_failures: usize,
    pub radii_written: usize,
    pub radii_failed: usize,
    pub edges_written: usize,
}

impl BatchStats {
    pub fn add(&mut self, summary: &SweepSummary) {
        self.feeds_processed += 1;
        if !summary.is_complete() {
            self.feeds_with_failures += 1;
        }
        self.radii_written += summary.outcomes.len();
        self.radii_failed += summary.failures.len();
        self.edges_written += summary.outcomes.iter().map(|o| o.edge_count).sum::<usize>();
    }

    pub fn log_summary(&self) {
        log::info!("=== Sweep Statistics ===");
        log::info!("Feeds processed: {}", self.feeds_processed);
        log::info!("Networks written: {}", self.radii_written);
        log::info!("Edges written: {}", self.edges_written);
        if self.radii_failed > 0 {
            log::warn!(
                "Radius iterations skipped: {} (in {} feeds)",
                self.radii_failed,
                self.feeds_with_failures
            );
        }
    }
}
