use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Flow, Renderer};
use crate::error::Result;
use crate::game::Observation;

/// Renderer that draws nothing and only honours the cancellation flag
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    cancel: Arc<AtomicBool>,
}

impl HeadlessRenderer {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    fn flow(&self) -> Flow {
        if self.cancel.load(Ordering::Relaxed) {
            Flow::Abort
        } else {
            Flow::Continue
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn poll(&mut self) -> Result<Flow> {
        Ok(self.flow())
    }

    fn render(&mut self, _observation: &Observation) -> Result<Flow> {
        Ok(self.flow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborts_once_cancelled() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut renderer = HeadlessRenderer::new(cancel.clone());
        assert_eq!(renderer.poll().unwrap(), Flow::Continue);

        cancel.store(true, Ordering::Relaxed);
        assert_eq!(renderer.poll().unwrap(), Flow::Abort);
    }
}
