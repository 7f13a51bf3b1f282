//! Playback device selection
//!
//! A selection made by the player is shown immediately (optimistic) and
//! only becomes the confirmed device once the platform accepts the
//! transfer. Refreshing the device list from the platform never overrides
//! a selection that is still awaiting confirmation.

use crate::catalog::{Device, Playback};
use crate::error::Result;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    devices: Vec<Device>,
    confirmed: Option<String>,
    pending: Option<String>,
}

impl DeviceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known devices, with `is_active` reflecting the current selection
    pub fn devices(&self) -> Vec<Device> {
        let selected = self.selected();
        self.devices
            .iter()
            .map(|d| Device {
                is_active: selected == Some(d.id.as_str()),
                ..d.clone()
            })
            .collect()
    }

    /// Device shown as selected: the pending choice, else the confirmed one
    pub fn selected(&self) -> Option<&str> {
        self.pending.as_deref().or(self.confirmed.as_deref())
    }

    pub fn confirmed(&self) -> Option<&str> {
        self.confirmed.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn optimistic_select(&mut self, device_id: impl Into<String>) {
        self.pending = Some(device_id.into());
    }

    /// The platform accepted the pending selection
    pub fn confirm(&mut self) {
        if let Some(id) = self.pending.take() {
            self.confirmed = Some(id);
        }
    }

    /// The platform rejected the pending selection
    pub fn rollback(&mut self) {
        self.pending = None;
    }

    /// Replace the device list with the platform's view
    pub fn sync(&mut self, devices: Vec<Device>) {
        self.confirmed = devices.iter().find(|d| d.is_active).map(|d| d.id.clone());
        self.devices = devices;
    }

    /// Fetch devices from the platform and sync
    pub async fn refresh(&mut self, playback: &dyn Playback) -> Result<()> {
        let devices = playback.devices().await?;
        debug!(count = devices.len(), "Devices refreshed");
        self.sync(devices);
        Ok(())
    }

    /// Select optimistically, transfer playback, then confirm or roll back
    pub async fn select(&mut self, playback: &dyn Playback, device_id: &str) -> Result<()> {
        self.optimistic_select(device_id);
        match playback.set_device(device_id).await {
            Ok(()) => {
                self.confirm();
                Ok(())
            }
            Err(e) => {
                warn!(device_id, error = %e, "Device transfer failed, rolling back");
                self.rollback();
                Err(e.into())
            }
        }
    }
}
