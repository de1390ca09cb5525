use crate::gateways::{GatewayError, PaymentGateway, StkPushCommand, StkPushReply};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Offline provider. `behavior` selects the reply:
/// `ALWAYS_REJECT`, `AUTH_FAILURE`, `GARBLED`, anything else accepts.
pub struct MockGateway {
    pub behavior: String,
    calls: AtomicUsize,
    last: Mutex<Option<StkPushCommand>>,
}

impl MockGateway {
    pub fn new(behavior: &str) -> Self {
        Self {
            behavior: behavior.to_string(),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_command(&self) -> Option<StkPushCommand> {
        self.last.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn stk_push(&self, command: StkPushCommand) -> Result<StkPushReply, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut last) = self.last.lock() {
            *last = Some(command);
        }

        match self.behavior.as_str() {
            "AUTH_FAILURE" => Err(GatewayError::Authentication { status: 401 }),
            "GARBLED" => Err(GatewayError::Decode("mock garbled body".to_string())),
            "ALWAYS_REJECT" => Ok(StkPushReply {
                error_code: Some("400.002.02".to_string()),
                error_message: Some("Bad Request - Invalid PhoneNumber".to_string()),
                ..Default::default()
            }),
            _ => Ok(StkPushReply {
                merchant_request_id: Some(format!("mock-merchant-{}", n)),
                checkout_request_id: Some(format!("ws_CO_mock_{}", uuid::Uuid::new_v4().simple())),
                response_code: Some("0".to_string()),
                response_description: Some("Success. Request accepted for processing".to_string()),
                customer_message: Some("Success. Request accepted for processing".to_string()),
                ..Default::default()
            }),
        }
    }
}
