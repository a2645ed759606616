use crate::error::ProviderError;
use crate::lambda_concurrency_client::ConcurrencyApi;
use async_trait::async_trait;
use rusoto_core::RusotoError;
use rusoto_lambda::{GetFunctionConcurrencyError, PutFunctionConcurrencyError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Lambda stand-in keeping reservations in memory and counting calls.
#[derive(Default)]
pub struct InMemoryLambda {
    reserved: Mutex<HashMap<String, i32>>,
    calls: AtomicUsize,
    failing: bool,
    limit: Option<i32>,
}

impl InMemoryLambda {
    pub fn failing() -> Self {
        InMemoryLambda {
            failing: true,
            ..Default::default()
        }
    }

    /// Puts above `limit` are clamped to it and the clamped value is echoed.
    pub fn with_limit(limit: i32) -> Self {
        InMemoryLambda {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reserve(&self, function_name: &str, reserved: i32) {
        self.reserved
            .lock()
            .unwrap()
            .insert(function_name.to_string(), reserved);
    }

    pub fn reserved_for(&self, function_name: &str) -> Option<i32> {
        self.reserved.lock().unwrap().get(function_name).copied()
    }
}

pub fn client(lambda: &Arc<InMemoryLambda>) -> Arc<dyn ConcurrencyApi> {
    lambda.clone()
}

#[async_trait]
impl ConcurrencyApi for InMemoryLambda {
    async fn put_function_concurrency(
        &self,
        function_name: &str,
        reserved_concurrent_executions: i32,
    ) -> Result<i32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(RusotoError::<PutFunctionConcurrencyError>::Validation(
                "throttled".to_string(),
            )
            .into());
        }
        let reserved = match self.limit {
            Some(limit) => reserved_concurrent_executions.min(limit),
            None => reserved_concurrent_executions,
        };
        self.reserve(function_name, reserved);
        Ok(reserved)
    }

    async fn get_function_concurrency(&self, function_name: &str) -> Result<i32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(RusotoError::<GetFunctionConcurrencyError>::Validation(
                "access denied".to_string(),
            )
            .into());
        }
        Ok(self.reserved_for(function_name).unwrap_or_default())
    }
}
