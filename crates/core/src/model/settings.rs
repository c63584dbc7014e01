/// User preferences for starting a run. Survive restarts within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub randomize: bool,
    /// 1-based position of the first question; clamped at start.
    pub start_from: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            randomize: false,
            start_from: 1,
        }
    }
}

impl SessionSettings {
    /// Zero-based start index for a run of `len` questions.
    ///
    /// `start_from` is clamped into `[1, len]`. Returns `None` for an empty run.
    #[must_use]
    pub fn start_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let requested = usize::try_from(self.start_from).unwrap_or(usize::MAX);
        Some(requested.clamp(1, len) - 1)
    }
}
