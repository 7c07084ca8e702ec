// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io::{Result, Write},
          sync::{Arc, Mutex}};

/// In memory writer for asserting on formatted log output.
///
/// You can safely clone this struct, since it only contains an `Arc<Mutex<Vec<u8>>>`.
/// Hand one clone to the subscriber (wrapped in a [`Mutex`], which implements
/// [`tracing_subscriber::fmt::MakeWriter`]) and keep the other to read the output.
#[derive(Clone, Debug, Default)]
pub struct LogCapture {
    pub buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self { Self::default() }

    pub fn get_copy_of_buffer_as_string(&self) -> String {
        let buffer_data = self.buffer.lock().unwrap();
        String::from_utf8(buffer_data.clone()).expect("utf8")
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

#[test]
fn test_log_capture_clones_share_buffer() {
    let mut capture = LogCapture::new();
    let capture_clone = capture.clone();
    capture.write_all(b"hello world").unwrap();
    capture.flush().unwrap();
    pretty_assertions::assert_eq!(
        capture_clone.get_copy_of_buffer_as_string(),
        "hello world"
    );
}
