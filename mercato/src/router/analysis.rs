use mercato_core::{AnalysisReport, MercatoError, analyze_snapshot};

use crate::Mercato;
use crate::router::snapshot::SnapshotRequest;

impl Mercato {
    /// Take a snapshot and run the full analysis pass over it.
    ///
    /// Levels and EMA series are computed for every populated interval; confluence
    /// zones cluster the levels of all intervals around the snapshot's current
    /// price. Absent intervals contribute nothing.
    ///
    /// # Errors
    /// Same as [`snapshot`](Self::snapshot).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "mercato::analyze", skip(self, req), fields(symbol = %symbol))
    )]
    pub async fn analyze(
        &self,
        symbol: &str,
        req: SnapshotRequest,
    ) -> Result<AnalysisReport, MercatoError> {
        let snapshot = self.snapshot(symbol, req).await?;
        let report = analyze_snapshot(snapshot, &self.cfg.analysis);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            symbol = %report.snapshot.symbol,
            zones = report.zones.len(),
            "analysis complete"
        );
        Ok(report)
    }
}
