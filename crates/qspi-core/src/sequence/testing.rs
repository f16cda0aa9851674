//! Recording HAL used by the unit tests

extern crate std;

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use crate::hal::{HalResult, SpiController, SpiHal, StatusCode};
use crate::spi::BusConfig;

/// A call seen by a controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Init(u32),
    Transfer(BusConfig, Vec<u8>),
}

/// Shared call log, readable after the controller has been moved away
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn transfers(&self) -> Vec<(BusConfig, Vec<u8>)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Transfer(cfg, tx) => Some((*cfg, tx.clone())),
                Call::Init(_) => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }
}

#[derive(Default)]
pub struct RecordingController {
    log: CallLog,
    init_status: i32,
    /// (1-based transfer number, status)
    fail_at: Option<(usize, i32)>,
    fill: u8,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(transfer: usize, status: i32) -> Self {
        Self {
            fail_at: Some((transfer, status)),
            ..Self::default()
        }
    }

    pub fn with_init_status(mut self, status: i32) -> Self {
        self.init_status = status;
        self
    }

    pub fn with_response_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl SpiController for RecordingController {
    fn init(&mut self, baud_rate: u32) -> HalResult {
        self.log.push(Call::Init(baud_rate));
        StatusCode::check(self.init_status)
    }

    fn transfer(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> HalResult {
        assert_eq!(tx.len(), rx.len());
        self.log.push(Call::Transfer(*config, tx.to_vec()));
        rx.fill(self.fill);

        match self.fail_at {
            Some((n, status)) if n == self.log.transfers().len() => StatusCode::check(status),
            _ => Ok(()),
        }
    }
}

/// HAL with at most one controller, at a fixed index
pub struct RecordingHal {
    present_at: Option<u8>,
    controller: Option<RecordingController>,
    pub probed: Vec<u8>,
}

impl RecordingHal {
    pub fn with_controller_at(index: u8, controller: RecordingController) -> Self {
        Self {
            present_at: Some(index),
            controller: Some(controller),
            probed: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            present_at: None,
            controller: None,
            probed: Vec::new(),
        }
    }
}

impl SpiHal for RecordingHal {
    type Controller = RecordingController;

    fn get_device(&mut self, index: u8) -> Option<RecordingController> {
        self.probed.push(index);
        if self.present_at == Some(index) {
            self.controller.take()
        } else {
            None
        }
    }
}
