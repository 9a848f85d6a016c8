use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
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
        tracing::info!("Starting dataset run");
        self.monitor.log_stats("start");

        // Extract
        let raw = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} articles, {} authors, {} authorships",
            raw.articles.len(),
            raw.authors.len(),
            raw.authorships.len()
        );
        self.monitor.log_stats("extract");

        // Transform
        let result = self.pipeline.transform(raw).await?;
        tracing::info!("Transform complete");
        self.monitor.log_stats("transform");

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawDataset;
    use crate::utils::error::EtlError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        type Output = usize;

        async fn extract(&self) -> Result<RawDataset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawDataset::default())
        }

        async fn transform(&self, data: RawDataset) -> Result<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(EtlError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(data.record_count())
        }

        async fn load(&self, records: usize) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("out/{}", records))
        }
    }

    #[test]
    fn test_run_calls_every_phase() {
        let engine = EtlEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });
        let output = tokio_test::block_on(engine.run()).unwrap();
        assert_eq!(output, "out/0");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_run_stops_at_failing_phase() {
        let engine = EtlEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: true,
        });
        let err = tokio_test::block_on(engine.run()).unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
