//! # Tic Serial Transport Layer
//!
//! 串口硬件抽象层：清空缓冲区、写入原始字节、设置线路波特率。
//! 协议只写不读，因此这里没有接收接口。

use thiserror::Error;

pub use tic_protocol::TicFrame;

#[cfg(feature = "native")]
pub mod port;

#[cfg(feature = "native")]
pub use port::{SerialPortConfig, SerialPortTransport};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockHandle, MockTransport};

/// 串口层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),
    #[error("Write timeout")]
    Timeout,
    #[error("Port closed")]
    Closed,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NoDevice,
    InvalidInput,
    AccessDenied,
    Busy,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SerialDeviceErrorKind::NoDevice | SerialDeviceErrorKind::AccessDenied
        )
    }
}

impl From<String> for SerialDeviceError {
    fn from(message: String) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for SerialDeviceError {
    fn from(message: &str) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

/// 串口传输接口
///
/// 一个连接周期内由会话独占持有，不需要内部同步。
pub trait SerialTransport {
    /// 丢弃输入/输出缓冲区中尚未处理的数据
    fn flush(&mut self) -> Result<(), SerialError>;

    /// 写入原始字节（阻塞直到全部写出）
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// 设置线路波特率
    fn set_baud(&mut self, rate: u32) -> Result<(), SerialError>;

    /// 发送一帧：先清空缓冲区再写入
    fn write_frame(&mut self, frame: &TicFrame) -> Result<(), SerialError> {
        self.flush()?;
        self.write(frame.as_bytes())
    }
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn flush(&mut self) -> Result<(), SerialError> {
        (**self).flush()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        (**self).write(bytes)
    }

    fn set_baud(&mut self, rate: u32) -> Result<(), SerialError> {
        (**self).set_baud(rate)
    }

    fn write_frame(&mut self, frame: &TicFrame) -> Result<(), SerialError> {
        (**self).write_frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingTransport {
        flushes: usize,
        written: Vec<u8>,
    }

    impl SerialTransport for CountingTransport {
        fn flush(&mut self) -> Result<(), SerialError> {
            self.flushes += 1;
            Ok(())
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn set_baud(&mut self, _rate: u32) -> Result<(), SerialError> {
            Ok(())
        }
    }

    #[test]
    fn test_write_frame_flushes_first() {
        let mut transport = CountingTransport {
            flushes: 0,
            written: Vec::new(),
        };
        transport.write_frame(&TicFrame::new(&[0x83])).unwrap();
        transport.write_frame(&TicFrame::new(&[0x94, 0x02])).unwrap();

        assert_eq!(transport.flushes, 2);
        assert_eq!(transport.written, vec![0x83, 0x94, 0x02]);
    }

    #[test]
    fn test_boxed_transport_delegates() {
        let mut boxed: Box<dyn SerialTransport> = Box::new(CountingTransport {
            flushes: 0,
            written: Vec::new(),
        });
        boxed.write_frame(&TicFrame::new(&[0x83])).unwrap();
        boxed.set_baud(9600).unwrap();
    }

    #[test]
    fn test_device_error_display_and_fatal() {
        let err = SerialDeviceError::new(SerialDeviceErrorKind::NoDevice, "/dev/ttyACM0 missing");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "NoDevice: /dev/ttyACM0 missing");

        let err: SerialDeviceError = "glitch".into();
        assert_eq!(err.kind, SerialDeviceErrorKind::Unknown);
        assert!(!err.is_fatal());

        let err = SerialError::from(err);
        assert!(err.to_string().starts_with("Device Error"));
    }
}
