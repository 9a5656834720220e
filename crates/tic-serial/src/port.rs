//! 基于 `serialport` crate 的真实串口后端
//!
//! 线路固定为 8N1、无流控，对应 Tic 控制器 TTL 串口的出厂设置。

use crate::{SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialTransport};
use std::io::Write;
use std::time::Duration;
use tic_protocol::BaudRate;
use tracing::{debug, trace};

/// 串口配置
#[derive(Debug, Clone)]
pub struct SerialPortConfig {
    /// 设备路径（如 "/dev/ttyACM0"、"COM3"）
    pub path: String,
    /// 波特率
    pub baud_rate: BaudRate,
    /// 写超时
    pub timeout: Duration,
}

impl SerialPortConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn baud_rate(mut self, baud_rate: BaudRate) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SerialPortConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyACM0".to_string(),
            baud_rate: BaudRate::default(),
            timeout: Duration::from_millis(500),
        }
    }
}

/// 真实串口传输
pub struct SerialPortTransport {
    port: Box<dyn serialport::SerialPort>,
    path: String,
}

impl SerialPortTransport {
    /// 打开串口
    pub fn open(config: &SerialPortConfig) -> Result<Self, SerialError> {
        let port = serialport::new(&config.path, config.baud_rate.bits_per_second())
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|e| SerialError::Device(map_serialport_error(e)))?;

        debug!("Serial port '{}' opened at {} baud", config.path, config.baud_rate);

        Ok(Self {
            port,
            path: config.path.clone(),
        })
    }

    /// 设备路径
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SerialTransport for SerialPortTransport {
    fn flush(&mut self) -> Result<(), SerialError> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(|e| SerialError::Device(map_serialport_error(e)))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.port.write_all(bytes).map_err(map_io_error)?;
        Write::flush(&mut self.port).map_err(map_io_error)?;
        trace!("serial tx [{}]: {:02X?}", self.path, bytes);
        Ok(())
    }

    fn set_baud(&mut self, rate: u32) -> Result<(), SerialError> {
        self.port
            .set_baud_rate(rate)
            .map_err(|e| SerialError::Device(map_serialport_error(e)))?;
        debug!("Serial port '{}' switched to {} baud", self.path, rate);
        Ok(())
    }
}

impl Drop for SerialPortTransport {
    fn drop(&mut self) {
        debug!("Serial port '{}' closed", self.path);
    }
}

fn map_io_error(err: std::io::Error) -> SerialError {
    if err.kind() == std::io::ErrorKind::TimedOut {
        SerialError::Timeout
    } else {
        SerialError::Io(err)
    }
}

fn map_serialport_error(err: serialport::Error) -> SerialDeviceError {
    let kind = match err.kind() {
        serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NoDevice,
        serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::InvalidInput,
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            SerialDeviceErrorKind::AccessDenied
        },
        serialport::ErrorKind::Io(std::io::ErrorKind::ResourceBusy) => SerialDeviceErrorKind::Busy,
        serialport::ErrorKind::Io(_) => SerialDeviceErrorKind::Backend,
        _ => SerialDeviceErrorKind::Unknown,
    };
    SerialDeviceError::new(kind, err.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SerialPortConfig::new("/dev/ttyUSB1")
            .baud_rate(BaudRate::B9600)
            .timeout(Duration::from_millis(100));

        assert_eq!(config.path, "/dev/ttyUSB1");
        assert_eq!(config.baud_rate, BaudRate::B9600);
        assert_eq!(config.timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_config_default_is_115200() {
        let config = SerialPortConfig::default();
        assert_eq!(config.baud_rate.bits_per_second(), 115_200);
    }

    #[test]
    fn test_open_missing_port_fails() {
        let config = SerialPortConfig::new("/dev/tic-focuser-does-not-exist");
        assert!(SerialPortTransport::open(&config).is_err());
    }

    #[test]
    fn test_error_mapping() {
        let err = serialport::Error::new(serialport::ErrorKind::NoDevice, "gone");
        let mapped = map_serialport_error(err);
        assert_eq!(mapped.kind, SerialDeviceErrorKind::NoDevice);
        assert_eq!(mapped.message, "gone");

        let timeout = map_io_error(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert!(matches!(timeout, SerialError::Timeout));
    }
}
