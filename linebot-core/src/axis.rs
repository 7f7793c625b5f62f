//! Shared wheel axis state
//!
//! Each wheel is driven by a motor controller on the bus. Incoming frames
//! update the axis they address; the control task and telemetry read it.

use crate::dispatch::{FrameHeader, BUS_PAYLOAD_LEN};
use crate::traits::MotorRouter;

/// Number of driven axes (left and right wheel)
pub const AXIS_COUNT: usize = 2;

/// Default node ids of the left and right wheel controllers
pub const DEFAULT_NODE_IDS: [u8; AXIS_COUNT] = [0, 1];

/// Last known state of one axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisState {
    /// Bus node id of the controller
    pub node_id: u8,
    /// Error word from the last heartbeat
    pub error: u32,
    /// Controller state from the last heartbeat
    pub state: u8,
    /// Position estimate (turns)
    pub position: f32,
    /// Velocity estimate (turns/s)
    pub velocity: f32,
    /// Heartbeats received
    pub heartbeats: u32,
}

impl AxisState {
    pub const fn new(node_id: u8) -> Self {
        Self {
            node_id,
            error: 0,
            state: 0,
            position: 0.0,
            velocity: 0.0,
            heartbeats: 0,
        }
    }
}

/// All driven axes
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    axes: [AxisState; AXIS_COUNT],
}

impl Default for Axes {
    fn default() -> Self {
        Self::new()
    }
}

impl Axes {
    /// Axes with the default node ids
    pub const fn new() -> Self {
        Self::with_nodes(DEFAULT_NODE_IDS)
    }

    pub const fn with_nodes(nodes: [u8; AXIS_COUNT]) -> Self {
        Self {
            axes: [AxisState::new(nodes[0]), AxisState::new(nodes[1])],
        }
    }

    /// Axis by position (0 = left, 1 = right)
    pub fn get(&self, index: usize) -> Option<&AxisState> {
        self.axes.get(index)
    }

    /// Axis addressed by a bus node id
    pub fn by_node_mut(&mut self, node_id: u8) -> Option<&mut AxisState> {
        self.axes.iter_mut().find(|axis| axis.node_id == node_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisState> {
        self.axes.iter()
    }
}

/// Motor controller command ids understood by [`CanSimpleRouter`]
pub mod command {
    /// Heartbeat: error u32 LE, state u8
    pub const HEARTBEAT: u8 = 0x01;
    /// Encoder estimates: position f32 LE, velocity f32 LE
    pub const ENCODER_ESTIMATES: u8 = 0x09;
}

/// Motor protocol router for the wheel controllers
///
/// Decodes the periodic status frames the controllers broadcast. Frames
/// for unknown nodes or commands are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanSimpleRouter {
    dropped: u32,
}

impl CanSimpleRouter {
    pub const fn new() -> Self {
        Self { dropped: 0 }
    }

    /// Frames that matched no axis or no known command
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

fn u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

impl MotorRouter for CanSimpleRouter {
    fn route(&mut self, axes: &mut Axes, header: &FrameHeader, payload: &[u8; BUS_PAYLOAD_LEN]) {
        let Some(axis) = axes.by_node_mut(header.node_id()) else {
            self.dropped = self.dropped.wrapping_add(1);
            return;
        };

        match header.command_id() {
            command::HEARTBEAT => {
                axis.error = u32_le(&payload[0..4]);
                axis.state = payload[4];
                axis.heartbeats = axis.heartbeats.wrapping_add(1);
            }
            command::ENCODER_ESTIMATES => {
                axis.position = f32::from_bits(u32_le(&payload[0..4]));
                axis.velocity = f32::from_bits(u32_le(&payload[4..8]));
            }
            _ => {
                self.dropped = self.dropped.wrapping_add(1);
            }
        }
    }
}
