//! The effect host: lifecycle, block dispatch, state snapshots, editor.
//!
//! One `VstHost` owns at most one loaded effect. Control operations
//! (load/unload, editor, state, programs) run on a single control context;
//! `process` runs on the audio callback and takes no locks, relying only on
//! the handle and readiness flag the control context maintains.

use crate::buffers::{silence_channels, BlockBuffers};
use crate::codec;
use crate::editor::{EditorCoordinator, EditorFactory, EditorState};
use crate::effect::{EffectInstance, EffectLoader};
use crate::error::{HostError, Result};
use crate::vst2::Vst2Loader;
use crate::{DEFAULT_BLOCK_SIZE, MAX_CHANNELS};

use smallvec::SmallVec;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug)]
pub struct HostConfig {
    /// Sample rate announced to the effect, from the host audio subsystem.
    pub sample_rate: f32,
    /// Fixed processing granularity; every effect call sees at most this
    /// many frames.
    pub block_size: usize,
    /// Scratch buffer capacity. Batch channels beyond this count pass
    /// through untouched.
    pub max_channels: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: DEFAULT_BLOCK_SIZE,
            max_channels: MAX_CHANNELS,
        }
    }
}

pub struct VstHost {
    config: HostConfig,
    loader: Box<dyn EffectLoader>,
    effect: Option<Box<dyn EffectInstance>>,
    /// Set only once the full activation handshake has completed; cleared
    /// before any deactivation step begins.
    ready: bool,
    plugin_path: Option<PathBuf>,
    buffers: BlockBuffers,
    editor: EditorCoordinator,
    editor_factory: Option<Box<dyn EditorFactory>>,
    open_editor_when_active: bool,
}

impl VstHost {
    pub fn new(config: HostConfig) -> Self {
        Self::with_loader(config, Box::new(Vst2Loader))
    }

    pub fn with_loader(config: HostConfig, loader: Box<dyn EffectLoader>) -> Self {
        Self {
            buffers: BlockBuffers::new(config.max_channels, config.block_size),
            config,
            loader,
            effect: None,
            ready: false,
            plugin_path: None,
            editor: EditorCoordinator::new(),
            editor_factory: None,
            open_editor_when_active: false,
        }
    }

    /// Install the surface factory used by [`open_editor`](Self::open_editor).
    pub fn set_editor_factory(&mut self, factory: Box<dyn EditorFactory>) {
        self.editor_factory = Some(factory);
    }

    /// Reopen the editor automatically whenever an effect (re)activates.
    pub fn set_open_editor_when_active(&mut self, open: bool) {
        self.open_editor_when_active = open;
    }

    /// Load the effect module at `path` and run the activation handshake.
    ///
    /// A no-op when `path` is already loaded. Loading a different path first
    /// tears the current effect down completely, editor included. Failures
    /// are logged and leave the host with no effect.
    pub fn load_effect_from_path(&mut self, path: &Path) -> Result<()> {
        let mut reopen_editor = false;
        if self.effect.is_some() && self.plugin_path.as_deref() != Some(path) {
            reopen_editor = self.editor.is_open();
            self.unload_effect();
        }

        if self.effect.is_some() {
            return Ok(());
        }

        self.plugin_path = Some(path.to_path_buf());

        let mut effect = match self.loader.load(path) {
            Ok(effect) => effect,
            Err(e) => {
                tracing::warn!("Failed to load effect from {}: {}", path.display(), e);
                return Err(e);
            }
        };

        effect.open();
        effect.set_sample_rate(self.config.sample_rate);
        effect.set_block_size(self.config.block_size);
        effect.resume();

        self.effect = Some(effect);
        self.ready = true;

        if self.open_editor_when_active || reopen_editor {
            self.open_editor();
        }

        Ok(())
    }

    /// Deactivate and release the current effect. Idempotent.
    ///
    /// The editor surface is destroyed first (blocking, so it can never
    /// outlive the effect it renders), readiness drops before the mains-off
    /// and close notifications, and dropping the instance releases the
    /// native module.
    pub fn unload_effect(&mut self) {
        self.editor.close(true);
        self.editor.wait_teardown();

        self.ready = false;

        if let Some(mut effect) = self.effect.take() {
            effect.suspend();
            effect.close();
        }
    }

    /// Run one audio callback's worth of frames through the effect.
    ///
    /// `channels[i]` is the batch data for channel `i`, or `None` when that
    /// channel is absent; present slices must hold at least `frames`
    /// samples. Present channels within the effect's declared width are
    /// overwritten in place with processed audio; absent channels read as
    /// silence on the effect side and are never written; channels past the
    /// declared width pass through. Passthrough unless an effect is loaded
    /// and ready.
    ///
    /// Real-time safe: no locks, no heap allocation.
    pub fn process(&mut self, channels: &mut [Option<&mut [f32]>], frames: usize) {
        let Self {
            effect,
            ready,
            buffers,
            config,
            ..
        } = self;

        let Some(effect) = effect else { return };
        if !*ready || frames == 0 {
            return;
        }

        let block_size = config.block_size;
        // The effect always sees its full declared channel width: indices
        // past the end of the batch read as silence, and batch channels
        // past the declared width (or the scratch capacity) pass through
        // untouched.
        let declared = effect.info().num_inputs.max(effect.info().num_outputs);
        let width = if declared == 0 {
            config.max_channels
        } else {
            declared.min(config.max_channels)
        };
        let (silent_inputs, scratch_outputs) = buffers.split();

        let passes = frames.div_ceil(block_size);
        let extra = frames % block_size;

        // Strictly sequential: block order carries the effect's internal
        // filter and delay-line state.
        for pass in 0..passes {
            let offset = pass * block_size;
            let block_frames = if pass + 1 == passes && extra != 0 {
                extra
            } else {
                block_size
            };

            silence_channels(scratch_outputs);

            let mut inputs: SmallVec<[&[f32]; MAX_CHANNELS]> = SmallVec::new();
            for index in 0..width {
                match channels.get(index).and_then(|channel| channel.as_deref()) {
                    Some(data) => inputs.push(&data[offset..offset + block_frames]),
                    None => inputs.push(&silent_inputs[index][..block_frames]),
                }
            }

            effect.process(&inputs, &mut scratch_outputs[..width], block_frames);
            // Release the borrows of `channels` before the write-back.
            drop(inputs);

            for (index, channel) in channels.iter_mut().take(width).enumerate() {
                if let Some(data) = channel {
                    data[offset..offset + block_frames]
                        .copy_from_slice(&scratch_outputs[index][..block_frames]);
                }
            }
        }
    }

    /// Capture the effect's state as a text-safe string.
    ///
    /// Chunk-capable effects contribute their opaque bank chunk; all others
    /// contribute the ordered vector of normalized parameter values. Empty
    /// when no effect is loaded.
    pub fn get_state(&mut self) -> String {
        let Some(effect) = self.effect.as_deref_mut() else {
            return String::new();
        };

        if effect.info().has_chunk_format {
            codec::encode(&effect.bank_chunk())
        } else {
            let count = effect.info().num_params;
            let mut params = Vec::with_capacity(count);
            for index in 0..count {
                params.push(effect.parameter(index));
            }
            codec::encode(&codec::params_to_bytes(&params))
        }
    }

    /// Restore state captured by [`get_state`](Self::get_state).
    ///
    /// The string is decoded before anything else so corrupt input is
    /// reported even with no effect loaded; with none loaded the call is
    /// otherwise a no-op. On the parameter path, a vector whose length
    /// disagrees with the effect's declared parameter count aborts the
    /// whole restore: parameters are never partially applied.
    pub fn set_state(&mut self, encoded: &str) -> Result<()> {
        let data = match codec::decode(encoded) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Rejected effect state string: {}", e);
                return Err(e);
            }
        };

        let Some(effect) = self.effect.as_deref_mut() else {
            return Ok(());
        };

        if effect.info().has_chunk_format {
            effect.load_bank_chunk(&data);
            return Ok(());
        }

        let params = codec::bytes_to_params(&data);
        let expected = effect.info().num_params;
        if params.len() != expected {
            let err = HostError::StateSizeMismatch {
                expected,
                got: params.len(),
            };
            tracing::warn!("Rejected effect state: {}", err);
            return Err(err);
        }

        for (index, value) in params.iter().enumerate() {
            effect.set_parameter(index, *value);
        }

        Ok(())
    }

    /// Select a program, bounds-checked against the effect's declared count.
    pub fn set_program(&mut self, index: i32) -> Result<()> {
        let Some(effect) = self.effect.as_deref_mut() else {
            return Ok(());
        };

        let count = effect.info().num_programs;
        if index < 0 || index >= count {
            let err = HostError::ProgramOutOfRange {
                requested: index,
                count,
            };
            tracing::error!("Failed to select program: {}", err);
            return Err(err);
        }

        effect.set_program(index);
        Ok(())
    }

    pub fn get_program(&self) -> i32 {
        self.effect.as_deref().map_or(0, |effect| effect.program())
    }

    /// Show the effect's editor. No-op without a loaded effect, a surface
    /// factory, or an effect-side editor; also while one is already open.
    pub fn open_editor(&mut self) {
        self.editor.wait_teardown();

        let (Some(effect), Some(factory)) =
            (self.effect.as_deref_mut(), self.editor_factory.as_deref())
        else {
            return;
        };

        if !effect.info().has_editor {
            tracing::debug!("effect \"{}\" has no editor", effect.info().name);
            return;
        }

        self.editor.open(factory, effect);
    }

    /// Hide the editor and destroy it asynchronously. `wait_for_completion`
    /// blocks until teardown finishes (shutdown discipline).
    pub fn close_editor(&mut self, wait_for_completion: bool) {
        self.editor.close(wait_for_completion);
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor.is_open()
    }

    pub fn editor_state(&self) -> EditorState {
        self.editor.state()
    }

    pub fn is_effect_ready(&self) -> bool {
        self.ready && self.effect.is_some()
    }

    /// Path of the most recently requested effect module.
    pub fn plugin_path(&self) -> Option<&Path> {
        self.plugin_path.as_deref()
    }

    pub fn effect_name(&self) -> Option<&str> {
        self.effect.as_deref().map(|effect| effect.info().name.as_str())
    }

    pub fn vendor_name(&self) -> Option<&str> {
        self.effect
            .as_deref()
            .map(|effect| effect.info().vendor.as_str())
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

impl Drop for VstHost {
    fn drop(&mut self) {
        self.unload_effect();
    }
}
