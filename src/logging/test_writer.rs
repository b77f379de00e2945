//! Буферный writer для проверки логов в тестах.

use std::{
    io,
    sync::{Arc, Mutex},
};

use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
pub(crate) struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

impl VecMakeWriter {
    pub(crate) fn contents(&self) -> String {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> MakeWriter<'a> for VecMakeWriter {
    type Writer = VecWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        VecWriterGuard(Arc::clone(&self.0))
    }
}

pub(crate) struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

impl io::Write for VecWriterGuard {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
