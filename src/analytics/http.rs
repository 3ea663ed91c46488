use super::{AnalyticsEvent, AnalyticsRecorder};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// HTTP 上报通道
///
/// 记录先进入有界队列，由后台任务逐条 POST 到采集端。
/// 队列满或投递失败均直接丢弃并告警，不影响调用方。
pub struct HttpRecorder {
    queue: mpsc::Sender<AnalyticsEvent>,
}

impl HttpRecorder {
    /// 启动后台投递任务并返回入队端
    ///
    /// 前置条件：必须在 Tokio 运行时内调用。
    pub fn spawn(endpoint: String, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AnalyticsEvent>(queue_capacity);

        tokio::spawn(async move {
            let client = reqwest::Client::new();
            info!("[Analytics] HTTP sink ready, endpoint: {}", endpoint);
            while let Some(event) = rx.recv().await {
                match client.post(&endpoint).json(&event).send().await {
                    Ok(response) => {
                        if let Err(e) = response.error_for_status() {
                            warn!("[Analytics] Collector rejected '{}': {}", event.name, e);
                        }
                    }
                    Err(e) => {
                        warn!("[Analytics] Delivery failed for '{}': {}", event.name, e);
                    }
                }
            }
        });

        Self { queue: tx }
    }
}

impl AnalyticsRecorder for HttpRecorder {
    fn record(&self, event: AnalyticsEvent) {
        if let Err(e) = self.queue.try_send(event) {
            warn!("[Analytics] Queue full, record dropped: {}", e);
        }
    }
}
