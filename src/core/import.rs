use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use tracing::info;

/// 執行 extract → transform → load，並視需要記錄資源使用
pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        info!("🚀 Starting sequence import...");
        self.monitor.log_stats("Import started");

        let extracted = self.pipeline.extract().await?;
        info!(
            "📥 Extracted {} records ({} messages)",
            extracted.records.len(),
            extracted.messages.len()
        );
        self.monitor.log_stats("Extract completed");

        let result = self.pipeline.transform(extracted).await?;
        info!("🔄 Transformed {} records", result.records.len());
        self.monitor.log_stats("Transform completed");

        let output_path = self.pipeline.load(result).await?;
        info!("📁 Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
