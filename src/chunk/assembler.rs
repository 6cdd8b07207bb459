/// Accumulates output lines into blank-line separated chunks
///
/// Lines are pushed with their trailing `\n`. A line that is exactly `\n`
/// closes the pending chunk, which includes that blank line.
#[derive(Debug, Default)]
pub struct ChunkAssembler {
    pending: String,
}

impl ChunkAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one line, returning the chunk it completes, if any
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        self.pending.push_str(line);
        if line == "\n" {
            Some(std::mem::take(&mut self.pending))
        } else {
            None
        }
    }

    /// Return the remaining partial chunk at end of stream
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending)
        }
    }
}
