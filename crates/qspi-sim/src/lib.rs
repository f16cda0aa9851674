//! qspi-sim - Simulated SPI HAL for testing
//!
//! This crate provides an [`SpiHal`] whose controllers sit at configurable
//! indices and talk to an emulated NOR flash. It can inject a failing clock
//! init or a failing transfer, and records every HAL call in an
//! [`EventLog`] so tests can check ordering after the run.
//!
//! # Example
//!
//! ```
//! use qspi_core::plan::Plan;
//! use qspi_core::sequence::{execute, RunOptions};
//! use qspi_sim::{SimConfig, SimHal};
//!
//! let mut hal = SimHal::new(SimConfig::default().with_devices(&[3]));
//! let summary = execute(&mut hal, &RunOptions::default(), &Plan::QSPI, &mut ()).unwrap();
//! assert_eq!(summary.index, 3);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use qspi_core::hal::{Capabilities, HalResult, SpiController, SpiHal, StatusCode};
use qspi_core::spi::{BitOrder, BusConfig, ChipSelectPolarity, ProtocolWidth};

pub mod error;
pub mod flash;

pub use error::{Result, SimError};
pub use flash::{FlashIdentity, SimFlash, HIGH_Z};

/// Status returned when a transfer asks for something the controller lacks
pub const STATUS_UNSUPPORTED: i32 = -22;

/// Inject a failing status on the given transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailAt {
    /// 1-based transfer number on the controller
    pub transfer: usize,
    /// Status to return
    pub status: i32,
}

/// Configuration for the simulated HAL
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Controller indices that exist
    pub devices: Vec<u8>,
    /// Emulated flash identity
    pub identity: FlashIdentity,
    /// Emulated flash size in bytes
    pub size: usize,
    /// What the controllers advertise and accept
    pub capabilities: Capabilities,
    /// Status returned by `init`
    pub clock_status: i32,
    /// Optional transfer fault
    pub fail: Option<FailAt>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            devices: vec![0],
            identity: FlashIdentity::default(),
            size: 64 * 1024,
            capabilities: Capabilities::all(),
            clock_status: 0,
            fail: None,
        }
    }
}

impl SimConfig {
    /// Place controllers at these indices
    pub fn with_devices(mut self, devices: &[u8]) -> Self {
        self.devices = devices.to_vec();
        self
    }

    /// Fail transfer number `transfer` (1-based) with `status`
    pub fn failing_transfer(mut self, transfer: usize, status: i32) -> Self {
        self.fail = Some(FailAt { transfer, status });
        self
    }

    /// Return `status` from clock init
    pub fn with_clock_status(mut self, status: i32) -> Self {
        self.clock_status = status;
        self
    }

    /// Restrict controller capabilities
    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.capabilities = caps;
        self
    }

    /// Build a configuration from `key=value` backend options
    ///
    /// - `devices=0|3` - controller indices, `|`-separated (empty for none)
    /// - `fail=<n>` - fail the n-th transfer
    /// - `status=<code>` - status for `fail` (default 1)
    /// - `clock-status=<code>` - status returned by clock init
    /// - `jedec=<hex>` - 6 hex digits, manufacturer + device ID
    /// - `caps=single|dual|quad` - widest protocol the controller accepts
    pub fn from_options(options: &[(&str, &str)]) -> Result<Self> {
        let mut config = Self::default();
        let mut fail_transfer = None;
        let mut fail_status = 1;

        for (key, value) in options {
            match *key {
                "devices" => {
                    config.devices = value
                        .split('|')
                        .filter(|s| !s.is_empty())
                        .map(|s| s.trim().parse::<u8>())
                        .collect::<std::result::Result<_, _>>()
                        .map_err(|_| invalid(key, value))?;
                }
                "fail" => {
                    fail_transfer = Some(value.parse::<usize>().map_err(|_| invalid(key, value))?);
                }
                "status" => {
                    fail_status = value.parse::<i32>().map_err(|_| invalid(key, value))?;
                }
                "clock-status" => {
                    config.clock_status = value.parse::<i32>().map_err(|_| invalid(key, value))?;
                }
                "jedec" => {
                    let hex = value.trim_start_matches("0x");
                    if hex.len() != 6 {
                        return Err(invalid(key, value));
                    }
                    let id = u32::from_str_radix(hex, 16).map_err(|_| invalid(key, value))?;
                    config.identity.manufacturer_id = (id >> 16) as u8;
                    config.identity.device_id = id as u16;
                }
                "caps" => {
                    let width = match *value {
                        "single" => ProtocolWidth::Single,
                        "dual" => ProtocolWidth::Dual,
                        "quad" => ProtocolWidth::Quad,
                        other => return Err(SimError::UnknownCapability(other.to_string())),
                    };
                    config.capabilities = capabilities_up_to(width);
                }
                _ => {
                    log::warn!("sim: Unknown option: {}={}", key, value);
                }
            }
        }

        config.fail = fail_transfer.map(|transfer| FailAt {
            transfer,
            status: fail_status,
        });
        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> SimError {
    SimError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn capabilities_up_to(width: ProtocolWidth) -> Capabilities {
    let base = Capabilities::LSB_FIRST | Capabilities::CS_ACTIVE_HIGH;
    match width {
        ProtocolWidth::Single => base,
        ProtocolWidth::Dual => base | Capabilities::DUAL,
        ProtocolWidth::Quad => base | Capabilities::QSPI,
    }
}

/// A HAL call seen by the simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// `get_device` was called
    Probe {
        /// Index probed
        index: u8,
        /// Whether a controller was handed out
        found: bool,
    },
    /// `init` was called
    Init {
        /// Controller index
        index: u8,
        /// Requested baud rate
        baud_rate: u32,
    },
    /// `transfer` was called
    Transfer {
        /// Controller index
        index: u8,
        /// Configuration passed
        config: BusConfig,
        /// Bytes clocked out
        tx: Vec<u8>,
        /// Bytes clocked in
        rx: Vec<u8>,
    },
}

/// Shared, cloneable record of HAL calls
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<SimEvent>>>);

impl EventLog {
    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<SimEvent> {
        self.0.borrow().clone()
    }

    /// Number of `init` calls
    pub fn init_count(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, SimEvent::Init { .. }))
            .count()
    }

    /// All transfers as (config, tx, rx)
    pub fn transfers(&self) -> Vec<(BusConfig, Vec<u8>, Vec<u8>)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SimEvent::Transfer { config, tx, rx, .. } => Some((*config, tx.clone(), rx.clone())),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SimEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// Simulated SPI HAL
pub struct SimHal {
    config: SimConfig,
    log: EventLog,
}

impl SimHal {
    /// Create a HAL with the given configuration
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            log: EventLog::default(),
        }
    }

    /// Handle to the event log
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }
}

impl SpiHal for SimHal {
    type Controller = SimController;

    fn get_device(&mut self, index: u8) -> Option<SimController> {
        let found = self.config.devices.contains(&index);
        self.log.push(SimEvent::Probe { index, found });
        if !found {
            return None;
        }

        log::debug!("sim: Handing out controller {}", index);
        Some(SimController {
            index,
            flash: SimFlash::new(self.config.identity.clone(), self.config.size),
            capabilities: self.config.capabilities,
            clock_status: self.config.clock_status,
            fail: self.config.fail,
            transfers: 0,
            log: self.log.clone(),
        })
    }
}

/// One simulated controller with a flash on chip-select 0
pub struct SimController {
    index: u8,
    flash: SimFlash,
    capabilities: Capabilities,
    clock_status: i32,
    fail: Option<FailAt>,
    transfers: usize,
    log: EventLog,
}

impl SimController {
    fn check_config(&self, config: &BusConfig) -> HalResult {
        let caps = self.capabilities;
        let supported = config.protocol.supported_by(caps)
            && (config.bit_order == BitOrder::Msb || caps.contains(Capabilities::LSB_FIRST))
            && (config.cs_active == ChipSelectPolarity::Low
                || caps.contains(Capabilities::CS_ACTIVE_HIGH));
        if supported {
            Ok(())
        } else {
            Err(StatusCode(STATUS_UNSUPPORTED))
        }
    }
}

impl SpiController for SimController {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn init(&mut self, baud_rate: u32) -> HalResult {
        self.log.push(SimEvent::Init {
            index: self.index,
            baud_rate,
        });
        StatusCode::check(self.clock_status)
    }

    fn transfer(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> HalResult {
        self.transfers += 1;

        let result = if tx.len() != rx.len() {
            Err(StatusCode(STATUS_UNSUPPORTED))
        } else if let Some(fail) = self.fail.filter(|f| f.transfer == self.transfers) {
            StatusCode::check(fail.status)
        } else {
            self.check_config(config).map(|()| {
                // Only chip-select 0 has a flash behind it
                if config.csid == 0 {
                    self.flash.respond(config, tx, rx);
                } else {
                    rx.fill(HIGH_Z);
                }
            })
        };

        self.log.push(SimEvent::Transfer {
            index: self.index,
            config: *config,
            tx: tx.to_vec(),
            rx: rx.to_vec(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qspi_core::plan::Plan;
    use qspi_core::sequence::{execute, ClockPolicy, RunOptions, StepOutcome};
    use qspi_core::spi::opcodes;
    use qspi_core::Error;

    fn run(hal: &mut SimHal, plan: &Plan) -> qspi_core::Result<Vec<StepOutcome>> {
        struct Collect(Vec<StepOutcome>);
        impl qspi_core::sequence::Observer for Collect {
            fn step(&mut self, outcome: &StepOutcome) {
                self.0.push(outcome.clone());
            }
        }

        let mut collect = Collect(Vec::new());
        execute(hal, &RunOptions::default(), plan, &mut collect)?;
        Ok(collect.0)
    }

    #[test]
    fn test_no_devices() {
        let mut hal = SimHal::new(SimConfig::default().with_devices(&[]));
        let log = hal.log();
        assert_eq!(
            run(&mut hal, &Plan::QSPI).unwrap_err(),
            Error::DiscoveryFailed { probed: 10 }
        );
        assert_eq!(log.init_count(), 0);
        assert!(log.transfers().is_empty());
        assert_eq!(log.events().len(), 10);
    }

    #[test]
    fn test_first_device_wins() {
        let mut hal = SimHal::new(SimConfig::default().with_devices(&[5, 3]));
        let summary = execute(&mut hal, &RunOptions::default(), &Plan::INIT_ONLY, &mut ()).unwrap();
        assert_eq!(summary.index, 3);
    }

    #[test]
    fn test_full_plan_reads_flash() {
        let mut hal = SimHal::new(SimConfig::default());
        let log = hal.log();
        let outcomes = run(&mut hal, &Plan::QSPI).unwrap();

        assert_eq!(log.init_count(), 1);
        assert!(matches!(log.events()[1], SimEvent::Init { baud_rate: 100_000, .. }));

        let by_name = |name: &str| outcomes.iter().find(|o| o.name == name).unwrap();
        assert_eq!(by_name("read-id").payload(), &[0x01, 0x20, 0x18]);
        assert_eq!(by_name("read").payload().len(), 66);
        assert_eq!(&by_name("read").payload()[..4], &[0, 1, 2, 3]);
        assert_eq!(by_name("dual-read").payload(), &[0, 1, 2, 3, 4]);
        assert_eq!(by_name("quad-read").payload().len(), 15);
        assert!(by_name("raw-dual").payload().is_empty());
    }

    #[test]
    fn test_transfer_failure_stops_run() {
        let mut hal = SimHal::new(SimConfig::default().failing_transfer(2, 1));
        let log = hal.log();
        let err = run(&mut hal, &Plan::QSPI).unwrap_err();
        assert!(matches!(
            err,
            Error::TransferFailed {
                opcode: opcodes::RDID,
                ..
            }
        ));
        assert_eq!(log.transfers().len(), 2);
    }

    #[test]
    fn test_single_only_controller_rejects_dual() {
        let config = SimConfig::default().with_capabilities(Capabilities::empty());
        let mut hal = SimHal::new(config);
        let err = run(&mut hal, &Plan::QSPI).unwrap_err();
        assert_eq!(
            err,
            Error::TransferFailed {
                step: "raw-dual",
                opcode: 0x34,
                status: StatusCode(STATUS_UNSUPPORTED),
            }
        );
    }

    #[test]
    fn test_clock_status_policies() {
        let mut hal = SimHal::new(SimConfig::default().with_clock_status(3));
        assert!(run(&mut hal, &Plan::FLASH_READS).is_ok());

        let mut hal = SimHal::new(SimConfig::default().with_clock_status(3));
        let log = hal.log();
        let options = RunOptions {
            clock_policy: ClockPolicy::Checked,
            ..RunOptions::default()
        };
        let err = execute(&mut hal, &options, &Plan::FLASH_READS, &mut ()).unwrap_err();
        assert_eq!(err, Error::ClockInitFailed { status: StatusCode(3) });
        assert!(log.transfers().is_empty());
    }

    #[test]
    fn test_from_options() {
        let config = SimConfig::from_options(&[
            ("devices", "2|7"),
            ("fail", "3"),
            ("status", "-5"),
            ("jedec", "ef4018"),
            ("caps", "dual"),
        ])
        .unwrap();
        assert_eq!(config.devices, [2, 7]);
        assert_eq!(config.fail, Some(FailAt { transfer: 3, status: -5 }));
        assert_eq!(config.identity.manufacturer_id, 0xEF);
        assert_eq!(config.identity.device_id, 0x4018);
        assert!(config.capabilities.contains(Capabilities::DUAL));
        assert!(!config.capabilities.contains(Capabilities::QUAD));

        let none = SimConfig::from_options(&[("devices", "")]).unwrap();
        assert!(none.devices.is_empty());
    }

    #[test]
    fn test_from_options_errors() {
        assert!(matches!(
            SimConfig::from_options(&[("fail", "x")]),
            Err(SimError::InvalidValue { .. })
        ));
        assert!(matches!(
            SimConfig::from_options(&[("jedec", "ef40")]),
            Err(SimError::InvalidValue { .. })
        ));
        assert_eq!(
            SimConfig::from_options(&[("caps", "octal")]).unwrap_err(),
            SimError::UnknownCapability("octal".to_string())
        );
    }
}
