use hirelens_core::{route, Inbound, SubscriptionStatus};
use hirelens_logging::{lens_debug, lens_info, lens_trace, lens_warn};

use crate::transport::{Transport, TransportSettings};
use crate::TransportError;

/// Owns the channel connection and the one destination currently observed.
pub struct SessionManager {
    transport: Box<dyn Transport>,
    settings: TransportSettings,
    status: SubscriptionStatus,
    destination: Option<String>,
}

impl SessionManager {
    pub fn new(transport: Box<dyn Transport>, settings: TransportSettings) -> Self {
        Self {
            transport,
            settings,
            status: SubscriptionStatus::Inactive,
            destination: None,
        }
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub async fn open(&mut self) -> Result<(), TransportError> {
        if self.is_open() {
            lens_debug!("channel already open");
            return Ok(());
        }
        self.transport.connect().await?;
        self.status = SubscriptionStatus::Active;
        self.destination = None;
        Ok(())
    }

    /// Returns `false` without touching the transport when the channel is not open.
    pub async fn subscribe(&mut self, job_id: &str) -> Result<bool, TransportError> {
        if !self.is_open() {
            lens_warn!("cannot subscribe to job {}: channel not open", job_id);
            return Ok(false);
        }
        let destination = self.settings.destination_for(job_id);
        self.transport.subscribe(&destination).await?;
        lens_info!("observing {}", destination);
        self.destination = Some(destination);
        Ok(true)
    }

    /// Next routed frame for the subscribed destination. `None` once the
    /// channel is closed or ended.
    pub async fn next_inbound(&mut self) -> Option<Inbound> {
        while self.is_open() {
            let message = match self.transport.next_message().await {
                Some(Ok(message)) => message,
                Some(Err(TransportError::Protocol(err))) => {
                    lens_warn!("skipping malformed frame: {}", err);
                    continue;
                }
                Some(Err(err)) => {
                    lens_warn!("channel ended: {}", err);
                    self.close().await;
                    return None;
                }
                None => {
                    lens_info!("channel closed by server");
                    self.close().await;
                    return None;
                }
            };
            if self.destination.as_deref() != Some(message.destination.as_str()) {
                lens_trace!("ignoring message for {}", message.destination);
                continue;
            }
            if let Some(inbound) = route(&message.body) {
                return Some(inbound);
            }
        }
        None
    }

    /// Idempotent.
    pub async fn close(&mut self) {
        if self.status == SubscriptionStatus::Inactive {
            return;
        }
        self.status = SubscriptionStatus::Closing;
        if let Err(err) = self.transport.disconnect().await {
            lens_warn!("error while closing channel: {}", err);
        }
        self.mark_closed();
        lens_debug!("channel closed");
    }

    fn mark_closed(&mut self) {
        self.status = SubscriptionStatus::Inactive;
        self.destination = None;
    }
}
