use crate::domain::ports::AnalysisPipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a pipeline through its three phases and reports progress.
pub struct AnalysisEngine<P: AnalysisPipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: AnalysisPipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting analysis process...");
        self.monitor.log_stats("Start");

        // Acquire
        println!("Acquiring analysis...");
        let outcome = self.pipeline.acquire().await?;
        println!("Analysis acquired from: {}", outcome.source);
        self.monitor.log_stats("Acquire");

        // Compose
        println!("Composing report...");
        let document = self.pipeline.compose(outcome).await?;
        println!("Report composed for: {}", document.company);
        self.monitor.log_stats("Compose");

        // Publish
        println!("Publishing report...");
        let report_file = self.pipeline.publish(document).await?;
        println!("Report saved to: {}", report_file);
        self.monitor.log_stats("Publish");

        self.monitor.log_final_stats();
        Ok(report_file)
    }
}
