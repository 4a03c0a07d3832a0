//! Fixed-capacity scratch buffers for block processing.

/// Input and output scratch, `channels` rows of `block_size` frames each.
///
/// Allocated once at host construction and reused for every processing
/// call; the dimensions never change afterwards. The input rows stay
/// permanently silent and stand in for channels absent from a batch, so
/// they are zeroed once and never written again.
pub struct BlockBuffers {
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
    channels: usize,
    block_size: usize,
}

impl BlockBuffers {
    pub fn new(channels: usize, block_size: usize) -> Self {
        Self {
            inputs: vec![vec![0.0; block_size]; channels],
            outputs: vec![vec![0.0; block_size]; channels],
            channels,
            block_size,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Silent input rows plus writable output scratch, borrowed disjointly
    /// so the dispatcher can read one while the effect fills the other.
    pub fn split(&mut self) -> (&[Vec<f32>], &mut [Vec<f32>]) {
        (&self.inputs, &mut self.outputs)
    }
}

/// Zero-fill every frame of the given channel buffers.
///
/// Run against the output scratch before each effect call so effects that
/// read padding frames observe silence rather than stale data.
pub fn silence_channels(channels: &mut [Vec<f32>]) {
    for channel in channels.iter_mut() {
        channel.fill(0.0);
    }
}
