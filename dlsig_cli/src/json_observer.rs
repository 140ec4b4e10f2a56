use async_trait::async_trait;
use serde_json::json;

use dlsig_core::{DownloadError, ProgressObserver, ProgressSnapshot};

/// Prints every snapshot as one JSON object per line on stdout.
pub struct JsonProgressObserver;

impl JsonProgressObserver {
    fn emit(&self, value: serde_json::Value) {
        println!("{}", value);
    }
}

#[async_trait]
impl ProgressObserver for JsonProgressObserver {
    async fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.emit(json!({ "event": "progress", "snapshot": snapshot }));
    }

    async fn on_complete(&self, snapshot: &ProgressSnapshot) {
        self.emit(json!({ "event": "complete", "snapshot": snapshot }));
    }

    async fn on_error(&self, error: &DownloadError) {
        log::error!("[JsonProgressObserver] download error: {}", error);
        self.emit(json!({
            "event": "error",
            "domain": error.domain(),
            "code": error.code(),
            "message": error.to_string(),
        }));
    }
}
