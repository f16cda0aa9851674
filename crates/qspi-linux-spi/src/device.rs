//! Linux spidev controller
//!
//! Each `/dev/spidevB.C` node is one controller. The bus configuration is
//! applied per transfer: the mode bits go through `SPI_IOC_WR_MODE` when
//! they change, and the protocol width travels in the transfer's
//! `tx_nbits`/`rx_nbits` fields.

use crate::error::{LinuxSpiError, Result};

use qspi_core::hal::{Capabilities, HalResult, SpiController, SpiHal};
use qspi_core::spi::{BitOrder, BusConfig, ChipSelectPolarity, ClockPhase, ClockPolarity};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Default device node prefix
pub const DEFAULT_PREFIX: &str = "/dev/spidev";

/// Kernel SPI mode bits (`include/uapi/linux/spi/spi.h`)
pub mod mode {
    /// Sample on the second clock edge
    pub const SPI_CPHA: u8 = 0x01;
    /// Clock idles high
    pub const SPI_CPOL: u8 = 0x02;
    /// Chip select is active high
    pub const SPI_CS_HIGH: u8 = 0x04;
    /// Shift least significant bit first
    pub const SPI_LSB_FIRST: u8 = 0x08;
}

mod ioctl {
    use nix::ioctl_write_ptr;

    pub const SPI_IOC_MAGIC: u8 = b'k';

    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// `SPI_IOC_MESSAGE(n)` = `_IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(spi_ioc_transfer)])`
    pub fn spi_ioc_message(n: usize) -> libc::c_ulong {
        let size = n * core::mem::size_of::<super::SpiIocTransfer>();
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// Kernel `struct spi_ioc_transfer`
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    _pad: u8,
}

/// Where to look for spidev nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSpiConfig {
    /// Path prefix; the controller index and chip select are appended
    pub prefix: String,
    /// Chip select number on each bus
    pub cs: u8,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            cs: 0,
        }
    }
}

impl LinuxSpiConfig {
    /// Device node for controller `index`
    pub fn path_for(&self, index: u8) -> String {
        format!("{}{}.{}", self.prefix, index, self.cs)
    }
}

/// Kernel mode byte for a bus configuration
pub fn mode_bits(config: &BusConfig) -> u8 {
    let mut bits = 0;
    if config.phase == ClockPhase::CaptureOnSecondTransition {
        bits |= mode::SPI_CPHA;
    }
    if config.polarity == ClockPolarity::IdleHigh {
        bits |= mode::SPI_CPOL;
    }
    if config.cs_active == ChipSelectPolarity::High {
        bits |= mode::SPI_CS_HIGH;
    }
    if config.bit_order == BitOrder::Lsb {
        bits |= mode::SPI_LSB_FIRST;
    }
    bits
}

fn os_error(e: nix::errno::Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e as i32)
}

/// spidev-backed HAL: controller `N` is `<prefix>N.<cs>`
#[derive(Debug, Clone, Default)]
pub struct LinuxSpiHal {
    config: LinuxSpiConfig,
}

impl LinuxSpiHal {
    /// Create a HAL with the given node layout
    pub fn new(config: LinuxSpiConfig) -> Self {
        Self { config }
    }
}

impl SpiHal for LinuxSpiHal {
    type Controller = LinuxSpi;

    fn get_device(&mut self, index: u8) -> Option<LinuxSpi> {
        let path = self.config.path_for(index);
        match LinuxSpi::open(&path, self.config.cs) {
            Ok(spi) => Some(spi),
            Err(e) => {
                log::debug!("linux_spi: {}", e);
                None
            }
        }
    }
}

/// One spidev node
///
/// A node is bound to one chip select, so transfers must name that line.
pub struct LinuxSpi {
    file: File,
    path: String,
    cs: u8,
    speed_hz: u32,
    mode: Option<u8>,
}

impl LinuxSpi {
    /// Open the spidev node for chip select `cs` and set 8 bits per word
    pub fn open(path: &str, cs: u8) -> Result<Self> {
        log::debug!("linux_spi: Opening device {}", path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: path.to_string(),
                source: e,
            })?;

        let bits: u8 = 8;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(file.as_raw_fd(), &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: os_error(e),
                }
            })?;
        }

        log::info!("linux_spi: Opened {}", path);
        Ok(Self {
            file,
            path: path.to_string(),
            cs,
            speed_hz: 0,
            mode: None,
        })
    }

    /// Set the SPI clock speed
    pub fn set_speed(&mut self, speed_hz: u32) -> Result<()> {
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(self.file.as_raw_fd(), &speed_hz).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed: speed_hz,
                    source: os_error(e),
                }
            })?;
        }
        self.speed_hz = speed_hz;
        log::debug!("linux_spi: Set speed to {} Hz", speed_hz);
        Ok(())
    }

    fn set_mode(&mut self, bits: u8) -> Result<()> {
        if self.mode == Some(bits) {
            return Ok(());
        }
        unsafe {
            ioctl::spi_ioc_wr_mode(self.file.as_raw_fd(), &bits).map_err(|e| {
                LinuxSpiError::SetModeFailed {
                    mode: bits,
                    source: os_error(e),
                }
            })?;
        }
        log::debug!("linux_spi: Mode set to 0x{:02X}", bits);
        self.mode = Some(bits);
        Ok(())
    }

    /// One full-duplex message under `config`
    pub fn full_duplex(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if config.csid != self.cs {
            return Err(LinuxSpiError::ChipSelectMismatch {
                requested: config.csid,
                node: self.cs,
            });
        }
        if tx.len() != rx.len() {
            return Err(LinuxSpiError::LengthMismatch {
                tx: tx.len(),
                rx: rx.len(),
            });
        }
        self.set_mode(mode_bits(config))?;

        let lines = config.protocol.data_lines();
        let transfer = SpiIocTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: rx.as_mut_ptr() as u64,
            len: tx.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            tx_nbits: lines,
            rx_nbits: lines,
            ..Default::default()
        };

        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                ioctl::spi_ioc_message(1),
                &transfer as *const SpiIocTransfer,
            )
        };
        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }
}

impl SpiController for LinuxSpi {
    fn capabilities(&self) -> Capabilities {
        // The kernel rejects what the controller driver cannot do
        Capabilities::all()
    }

    fn init(&mut self, baud_rate: u32) -> HalResult {
        self.set_speed(baud_rate).map_err(|e| {
            log::warn!("linux_spi: {}", e);
            e.status()
        })
    }

    fn transfer(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> HalResult {
        self.full_duplex(config, tx, rx).map_err(|e| {
            log::warn!("linux_spi: {}: {}", self.path, e);
            e.status()
        })
    }
}

/// Parse backend options from a list of key-value pairs
///
/// - `cs=<n>` - chip select number (default: 0)
/// - `prefix=<path>` - node prefix (default: `/dev/spidev`)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "cs" => {
                config.cs = value
                    .parse()
                    .map_err(|_| format!("Invalid cs value: {}", value))?;
            }
            "prefix" => {
                if value.is_empty() {
                    return Err("prefix cannot be empty".to_string());
                }
                config.prefix = value.to_string();
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}
