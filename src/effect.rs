//! Effect instance trait and metadata.
//!
//! The host never assumes more about a loaded effect than this fixed
//! operation set: metadata, lifecycle notifications, block processing,
//! chunk/parameter state, and program selection. The native VST2 backend
//! lives in `vst2`; tests substitute their own implementations.

use crate::error::Result;
use std::path::Path;

/// Metadata captured when an effect is loaded.
#[derive(Clone, Debug, Default)]
pub struct EffectInfo {
    /// Display name reported by the effect.
    pub name: String,
    /// Vendor string reported by the effect.
    pub vendor: String,
    /// Four-byte registered identifier.
    pub unique_id: i32,
    pub num_params: usize,
    pub num_programs: i32,
    /// Input channel count the effect declares.
    pub num_inputs: usize,
    /// Output channel count the effect declares.
    pub num_outputs: usize,
    /// Effect persists state as an opaque bank chunk rather than a
    /// parameter vector.
    pub has_chunk_format: bool,
    /// Effect ships its own editor UI.
    pub has_editor: bool,
}

/// A loaded audio effect exposing the fixed VST2-shaped operation set.
///
/// Lifecycle contract: `open` before any configuration, `resume` only after
/// sample rate and block size are set, `suspend` before `close`, nothing
/// after `close`. The host upholds this ordering; implementations may assume
/// it.
pub trait EffectInstance: Send {
    fn info(&self) -> &EffectInfo;

    /// `effOpen` notification.
    fn open(&mut self);

    /// `effClose` notification. The instance is dropped right after.
    fn close(&mut self);

    fn set_sample_rate(&mut self, rate: f32);

    fn set_block_size(&mut self, frames: usize);

    /// Mains on (`effMainsChanged`, 1).
    fn resume(&mut self);

    /// Mains off (`effMainsChanged`, 0).
    fn suspend(&mut self);

    /// Process one block in replacing mode.
    ///
    /// `inputs[ch]` holds at least `frames` samples; `outputs[ch]` holds a
    /// full scratch block the effect may overwrite past `frames`. Called on
    /// the audio thread: implementations must not allocate or block.
    fn process(&mut self, inputs: &[&[f32]], outputs: &mut [Vec<f32>], frames: usize);

    /// Opaque bank chunk (`effGetChunk`, bank context). Only meaningful when
    /// `info().has_chunk_format`.
    fn bank_chunk(&mut self) -> Vec<u8>;

    /// Restore an opaque bank chunk (`effSetChunk`, bank context).
    fn load_bank_chunk(&mut self, data: &[u8]);

    /// Normalized 0..1 value of one parameter.
    fn parameter(&self, index: usize) -> f32;

    fn set_parameter(&mut self, index: usize, value: f32);

    fn program(&self) -> i32;

    /// Switch programs. The caller bounds-checks against
    /// `info().num_programs`.
    fn set_program(&mut self, index: i32);
}

/// Loads effect instances from native module paths.
///
/// The production implementation is [`crate::vst2::Vst2Loader`]; tests
/// inject fakes to drive the lifecycle manager without touching the
/// filesystem.
pub trait EffectLoader: Send {
    fn load(&self, path: &Path) -> Result<Box<dyn EffectInstance>>;
}
