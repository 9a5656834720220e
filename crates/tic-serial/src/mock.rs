//! Mock 串口
//!
//! 记录所有成功写入的字节，并可以按需注入写失败。
//! `MockHandle` 与传输共享状态，传输被会话拿走之后测试仍能观察写入历史。

use crate::{SerialError, SerialTransport, TicFrame};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MockState {
    writes: Vec<Vec<u8>>,
    flushes: usize,
    baud: Option<u32>,
    fail_all: bool,
    fail_next: bool,
    /// 第 N 次写入（从 0 开始计数所有写入尝试）失败
    fail_at: Option<usize>,
    fail_baud: bool,
    attempts: usize,
}

/// 模拟串口
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// 共享观察句柄
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建传输及其观察句柄
    pub fn with_handle() -> (Self, MockHandle) {
        let transport = Self::new();
        let handle = transport.handle();
        (transport, handle)
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl SerialTransport for MockTransport {
    fn flush(&mut self) -> Result<(), SerialError> {
        self.state.lock().flushes += 1;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let mut state = self.state.lock();
        let attempt = state.attempts;
        state.attempts += 1;

        let injected = state.fail_all || state.fail_next || state.fail_at == Some(attempt);
        state.fail_next = false;
        if injected {
            return Err(SerialError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }

        state.writes.push(bytes.to_vec());
        Ok(())
    }

    fn set_baud(&mut self, rate: u32) -> Result<(), SerialError> {
        let mut state = self.state.lock();
        if state.fail_baud {
            return Err(SerialError::Closed);
        }
        state.baud = Some(rate);
        Ok(())
    }
}

impl MockHandle {
    /// 所有成功写入（每次 write 调用一条）
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    /// 成功写入，按帧返回
    pub fn frames(&self) -> Vec<TicFrame> {
        self.state.lock().writes.iter().map(|w| TicFrame::new(w)).collect()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    pub fn flush_count(&self) -> usize {
        self.state.lock().flushes
    }

    /// 最近一次设置成功的波特率
    pub fn baud(&self) -> Option<u32> {
        self.state.lock().baud
    }

    /// 之后所有写入都失败
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_all = fail;
    }

    /// 下一次写入失败
    pub fn fail_next_write(&self) {
        self.state.lock().fail_next = true;
    }

    /// 从现在起第 `n` 次写入尝试失败（0 = 下一次）
    pub fn fail_write_after(&self, n: usize) {
        let mut state = self.state.lock();
        state.fail_at = Some(state.attempts + n);
    }

    pub fn fail_set_baud(&self, fail: bool) {
        self.state.lock().fail_baud = fail;
    }

    /// 清空历史（不清除故障注入设置）
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.writes.clear();
        state.flushes = 0;
    }
}
