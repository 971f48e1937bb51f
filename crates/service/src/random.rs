use rand::Rng;
use tracing::info;

use crate::errors::ServiceError;
use crate::lifecycle::{Lifecycle, LifecycleState};

/// Random number generator gated by a lifecycle.
///
/// With a request quota the service trips into its error state once the
/// quota is used up and stays there until enabled again.
pub struct RandomNumberService {
    lifecycle: Lifecycle,
}

impl RandomNumberService {
    pub fn new(request_quota: Option<u64>) -> Self {
        Self { lifecycle: Lifecycle::new("random_number").with_request_quota(request_quota) }
    }

    /// Uniform integer in `start..=end`.
    pub async fn generate(&self, start: i64, end: i64) -> Result<i64, ServiceError> {
        let _admitted = self.lifecycle.admit().await?;
        if start > end {
            return Err(ServiceError::InvalidArgument(format!(
                "range start {start} is greater than range end {end}"
            )));
        }
        let result = rand::thread_rng().gen_range(start..=end);
        info!(
            result,
            start,
            end,
            requests = self.lifecycle.admitted_requests(),
            "generated random number"
        );
        Ok(result)
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub async fn enable(&self) {
        self.lifecycle.enable().await
    }

    pub async fn disable(&self) -> Result<(), ServiceError> {
        self.lifecycle.disable().await
    }
}
