use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::controller::RasterLayerController;
use crate::error::Result;
use crate::map::{ControlSurface, MapSurface};
use crate::types::Channel;

/// A discrete edit emitted by the raster control panel. Slider payloads are the raw
/// slider positions in percent (opacity 0–100, brightness 0–200).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    Opacity { percent: u32 },
    Brightness { percent: u32 },
    BandSelected { channel: Channel, band: usize },
}

impl ControlEvent {
    fn apply<M: MapSurface, C: ControlSurface>(
        &self,
        controller: &mut RasterLayerController<M, C>,
    ) -> Result<()> {
        match *self {
            ControlEvent::Opacity { percent } => {
                controller.update_params(Some(percent as f64 / 100.0), None)
            }
            ControlEvent::Brightness { percent } => {
                controller.update_params(None, Some(percent as f64 / 100.0))
            }
            ControlEvent::BandSelected { channel, band } => {
                controller.update_assignment(channel, band)
            }
        }
    }
}

impl std::fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlEvent::Opacity { percent } => write!(f, "opacity={}%", percent),
            ControlEvent::Brightness { percent } => write!(f, "brightness={}%", percent),
            ControlEvent::BandSelected { channel, band } => write!(f, "{}=band {}", channel, band),
        }
    }
}

/// Result of forwarding one event. `rebuild` is the controller's rebuild count after
/// the event's rebuild; errors were recovered and changed nothing.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub event: ControlEvent,
    pub result: Result<u64>,
}

impl DispatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Forwards control-panel edits to a `RasterLayerController` strictly in arrival
/// order. Every event is applied on its own and triggers its own rebuild; nothing
/// is coalesced.
#[derive(Debug, Default)]
pub struct ParameterChangeDispatcher {
    queue: VecDeque<ControlEvent>,
    dispatched: u64,
}

impl ParameterChangeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ControlEvent) {
        self.queue.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events forwarded so far, successful or not.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Forward the oldest queued event, if any.
    pub fn dispatch_next<M: MapSurface, C: ControlSurface>(
        &mut self,
        controller: &mut RasterLayerController<M, C>,
    ) -> Option<DispatchOutcome> {
        let event = self.queue.pop_front()?;
        self.dispatched += 1;
        let result = event.apply(controller).map(|()| controller.rebuild_count());
        match &result {
            Ok(rebuild) => debug!(%event, rebuild, "control event applied"),
            Err(e) => warn!(%event, "control event rejected: {}", e),
        }
        Some(DispatchOutcome { event, result })
    }

    /// Drain the queue, one outcome per event in arrival order.
    pub fn dispatch_all<M: MapSurface, C: ControlSurface>(
        &mut self,
        controller: &mut RasterLayerController<M, C>,
    ) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(outcome) = self.dispatch_next(controller) {
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl Extend<ControlEvent> for ParameterChangeDispatcher {
    fn extend<T: IntoIterator<Item = ControlEvent>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}
