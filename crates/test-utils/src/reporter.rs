use std::sync::{Arc, Mutex};

use devloop::report::{Reporter, Tag};

/// Reporter that keeps every `(tag, line)` for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    lines: Arc<Mutex<Vec<(Tag, String)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Tag, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.lines.lock().unwrap().iter().filter(|(t, _)| *t == tag).count()
    }

    /// True if some line with `tag` contains `needle`.
    pub fn contains(&self, tag: Tag, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(t, line)| *t == tag && line.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, tag: Tag, line: &str) {
        tracing::debug!("[{tag}] {line}");
        self.lines.lock().unwrap().push((tag, line.to_string()));
    }
}
