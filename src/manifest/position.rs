/// Line-start offsets of a document, for turning byte offsets into line numbers.
///
/// Built once per document and never mutated, so it can be shared freely.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(data: &[u8]) -> Self {
        let mut starts = vec![0];
        starts.extend(
            data.iter()
                .enumerate()
                .filter(|(_, b)| **b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// 1-based line containing `offset`. Offsets past the end map to the last line.
    pub fn line_of(&self, offset: usize) -> u32 {
        // starts[0] == 0, so the count is always at least 1
        self.starts.partition_point(|&start| start <= offset) as u32
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}
