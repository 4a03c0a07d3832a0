//! Raw VST2 ABI definitions.
//!
//! Only the subset of the effect interface this host actually drives:
//! the `AEffect` struct, the dispatcher opcodes for the lifecycle and
//! state handshakes, and the capability flag bits.

use std::ffi::c_void;

/// `'VstP'` — identity marker every well-formed `AEffect` carries.
pub const EFFECT_MAGIC: i32 = 0x5673_7450;

/// Dispatcher entry point on the effect side.
pub type DispatcherProc = unsafe extern "C" fn(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize;

/// `processReplacing` / legacy `process` entry point.
pub type ProcessProc = unsafe extern "C" fn(
    effect: *mut AEffect,
    inputs: *const *const f32,
    outputs: *mut *mut f32,
    frames: i32,
);

pub type ProcessDoubleProc = unsafe extern "C" fn(
    effect: *mut AEffect,
    inputs: *const *const f64,
    outputs: *mut *mut f64,
    frames: i32,
);

pub type SetParameterProc = unsafe extern "C" fn(effect: *mut AEffect, index: i32, value: f32);
pub type GetParameterProc = unsafe extern "C" fn(effect: *mut AEffect, index: i32) -> f32;

/// Callback the effect uses to talk back to the host.
pub type HostCallbackProc = unsafe extern "C" fn(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize;

/// Signature of the canonical VST2 entry point (`VSTPluginMain`).
pub type EntryPoint = unsafe extern "C" fn(callback: HostCallbackProc) -> *mut AEffect;

/// The effect structure returned by the plugin entry point.
///
/// Layout is fixed by the VST 2.4 ABI; every field after `flags` is either
/// reserved or host-opaque, but the offsets must be exact for the function
/// pointers at the tail to resolve.
#[repr(C)]
pub struct AEffect {
    pub magic: i32,
    pub dispatcher: Option<DispatcherProc>,
    /// Deprecated accumulating process call; unused by this host.
    pub process: Option<ProcessProc>,
    pub set_parameter: Option<SetParameterProc>,
    pub get_parameter: Option<GetParameterProc>,
    pub num_programs: i32,
    pub num_params: i32,
    pub num_inputs: i32,
    pub num_outputs: i32,
    pub flags: i32,
    pub resvd1: isize,
    pub resvd2: isize,
    pub initial_delay: i32,
    pub real_qualities: i32,
    pub off_qualities: i32,
    pub io_ratio: f32,
    pub object: *mut c_void,
    pub user: *mut c_void,
    pub unique_id: i32,
    pub version: i32,
    pub process_replacing: Option<ProcessProc>,
    pub process_double_replacing: Option<ProcessDoubleProc>,
    pub future: [u8; 56],
}

// Effect dispatcher opcodes (effOpen .. effGetVendorString).
pub mod opcodes {
    pub const OPEN: i32 = 0;
    pub const CLOSE: i32 = 1;
    pub const SET_PROGRAM: i32 = 2;
    pub const GET_PROGRAM: i32 = 3;
    pub const SET_SAMPLE_RATE: i32 = 10;
    pub const SET_BLOCK_SIZE: i32 = 11;
    pub const MAINS_CHANGED: i32 = 12;
    pub const GET_CHUNK: i32 = 23;
    pub const SET_CHUNK: i32 = 24;
    pub const GET_EFFECT_NAME: i32 = 45;
    pub const GET_VENDOR_STRING: i32 = 47;
}

// Host callback opcodes the bridge answers.
pub mod host_opcodes {
    pub const AUTOMATE: i32 = 0;
    pub const VERSION: i32 = 1;
    pub const IDLE: i32 = 3;
    pub const SIZE_WINDOW: i32 = 15;
}

// AEffect capability flag bits.
pub mod flags {
    pub const HAS_EDITOR: i32 = 1 << 0;
    pub const CAN_REPLACING: i32 = 1 << 4;
    pub const PROGRAM_CHUNKS: i32 = 1 << 5;
}

/// Longest string the name/vendor opcodes may write, per the 2.4 ABI.
pub const MAX_STRING_LEN: usize = 64;
