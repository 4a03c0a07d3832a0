//! In-process VST2 effect hosting.
//!
//! This crate bridges a third-party binary audio effect into a real-time
//! audio pipeline: arbitrary-length callbacks are re-blocked to the
//! effect's fixed processing size, the effect's lifecycle is driven through
//! the full load/activate/deactivate/unload handshake, its persistent
//! state round-trips through a text-safe string, and its editor window is
//! torn down asynchronously without ever blocking the audio thread.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use vst2_host::{HostConfig, VstHost};
//!
//! let mut host = VstHost::new(HostConfig::default());
//! host.load_effect_from_path(Path::new("/usr/lib/vst/reverb.so"))?;
//!
//! // On the audio callback: present channels are processed in place,
//! // absent channels read as silence on the effect side.
//! let mut left = vec![0.0f32; 480];
//! let mut channels = [Some(left.as_mut_slice()), None];
//! host.process(&mut channels, 480);
//!
//! let snapshot = host.get_state();
//! host.set_state(&snapshot)?;
//! # Ok::<(), vst2_host::HostError>(())
//! ```

pub mod abi;

mod error;
pub use error::{HostError, Result};

mod effect;
pub use effect::{EffectInfo, EffectInstance, EffectLoader};

mod buffers;
pub use buffers::{silence_channels, BlockBuffers};

pub mod codec;

mod editor;
pub use editor::{EditorCoordinator, EditorFactory, EditorState, EditorSurface};

mod vst2;
pub use vst2::{Vst2Effect, Vst2Loader};

mod host;
pub use host::{HostConfig, VstHost};

/// Scratch buffer capacity and default batch channel limit.
pub const MAX_CHANNELS: usize = 8;

/// Default fixed processing block size, in frames.
pub const DEFAULT_BLOCK_SIZE: usize = 512;
