//! Native VST2 effect backend.
//!
//! Loads an effect module with `libloading`, resolves the canonical
//! `VSTPluginMain` entry point (falling back to the legacy `main` export),
//! validates the `AEffect` identity marker, and adapts the raw dispatcher
//! interface to [`EffectInstance`]. All unsafe FFI stays inside this
//! module.

use crate::abi::{self, flags, host_opcodes, opcodes, AEffect, EntryPoint, EFFECT_MAGIC};
use crate::effect::{EffectInfo, EffectInstance, EffectLoader};
use crate::error::{HostError, Result};
use crate::MAX_CHANNELS;

use libloading::Library;
use smallvec::SmallVec;
use std::ffi::c_void;
use std::path::Path;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Loads [`Vst2Effect`] instances from native module paths.
pub struct Vst2Loader;

impl EffectLoader for Vst2Loader {
    fn load(&self, path: &Path) -> Result<Box<dyn EffectInstance>> {
        Ok(Box::new(Vst2Effect::load(path)?))
    }
}

/// A loaded native VST2 effect.
///
/// Owns the dynamic library; dropping the instance releases the module.
/// The `effect` pointer is only valid while `_library` is alive, which the
/// field order guarantees.
pub struct Vst2Effect {
    effect: *mut AEffect,
    info: EffectInfo,
    _library: Library,
}

// The effect pointer is confined to whichever thread currently holds the
// instance; the host never shares it across threads concurrently.
unsafe impl Send for Vst2Effect {}

impl Vst2Effect {
    pub fn load(path: &Path) -> Result<Self> {
        let library = unsafe { Library::new(path) }?;

        let entry = unsafe {
            let symbol = library
                .get::<EntryPoint>(b"VSTPluginMain\0")
                .or_else(|_| library.get::<EntryPoint>(b"main\0"))
                .map_err(|_| HostError::LoadFailed {
                    path: path.to_path_buf(),
                    reason: "no VSTPluginMain or main entry point".to_string(),
                })?;
            *symbol
        };

        let effect = unsafe { entry(host_callback) };
        if effect.is_null() {
            return Err(HostError::LoadFailed {
                path: path.to_path_buf(),
                reason: "entry point returned no effect".to_string(),
            });
        }

        // A bad marker means the module is not a VST effect or is corrupt.
        // Treated exactly like a load failure: the library drops here and
        // no further calls reach the bogus structure.
        let magic = unsafe { (*effect).magic };
        if magic != EFFECT_MAGIC {
            return Err(HostError::IdentityMismatch {
                path: path.to_path_buf(),
                magic,
            });
        }

        let effect_flags = unsafe { (*effect).flags };
        if effect_flags & flags::CAN_REPLACING == 0
            || unsafe { (*effect).process_replacing }.is_none()
        {
            return Err(HostError::LoadFailed {
                path: path.to_path_buf(),
                reason: "effect cannot process in replacing mode".to_string(),
            });
        }

        let mut instance = Self {
            effect,
            info: EffectInfo::default(),
            _library: library,
        };

        instance.info = EffectInfo {
            name: instance.read_string(opcodes::GET_EFFECT_NAME),
            vendor: instance.read_string(opcodes::GET_VENDOR_STRING),
            unique_id: unsafe { (*effect).unique_id },
            num_params: unsafe { (*effect).num_params }.max(0) as usize,
            num_programs: unsafe { (*effect).num_programs },
            num_inputs: unsafe { (*effect).num_inputs }.max(0) as usize,
            num_outputs: unsafe { (*effect).num_outputs }.max(0) as usize,
            has_chunk_format: effect_flags & flags::PROGRAM_CHUNKS != 0,
            has_editor: effect_flags & flags::HAS_EDITOR != 0,
        };

        tracing::info!(
            "Loaded effect \"{}\" by \"{}\" from {}",
            instance.info.name,
            instance.info.vendor,
            path.display()
        );

        Ok(instance)
    }

    fn dispatch(&self, opcode: i32, index: i32, value: isize, ptr: *mut c_void, opt: f32) -> isize {
        match unsafe { (*self.effect).dispatcher } {
            Some(dispatcher) => unsafe { dispatcher(self.effect, opcode, index, value, ptr, opt) },
            None => 0,
        }
    }

    fn read_string(&self, opcode: i32) -> String {
        let mut buf = [0u8; abi::MAX_STRING_LEN];
        self.dispatch(opcode, 0, 0, buf.as_mut_ptr() as *mut c_void, 0.0);
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        String::from_utf8_lossy(&buf[..len]).into_owned()
    }
}

impl EffectInstance for Vst2Effect {
    fn info(&self) -> &EffectInfo {
        &self.info
    }

    fn open(&mut self) {
        self.dispatch(opcodes::OPEN, 0, 0, ptr::null_mut(), 0.0);
    }

    fn close(&mut self) {
        self.dispatch(opcodes::CLOSE, 0, 0, ptr::null_mut(), 0.0);
    }

    fn set_sample_rate(&mut self, rate: f32) {
        self.dispatch(opcodes::SET_SAMPLE_RATE, 0, 0, ptr::null_mut(), rate);
    }

    fn set_block_size(&mut self, frames: usize) {
        self.dispatch(opcodes::SET_BLOCK_SIZE, 0, frames as isize, ptr::null_mut(), 0.0);
    }

    fn resume(&mut self) {
        self.dispatch(opcodes::MAINS_CHANGED, 0, 1, ptr::null_mut(), 0.0);
    }

    fn suspend(&mut self) {
        self.dispatch(opcodes::MAINS_CHANGED, 0, 0, ptr::null_mut(), 0.0);
    }

    fn process(&mut self, inputs: &[&[f32]], outputs: &mut [Vec<f32>], frames: usize) {
        let Some(process_replacing) = (unsafe { (*self.effect).process_replacing }) else {
            return;
        };

        let in_ptrs: SmallVec<[*const f32; MAX_CHANNELS]> =
            inputs.iter().map(|ch| ch.as_ptr()).collect();
        let mut out_ptrs: SmallVec<[*mut f32; MAX_CHANNELS]> =
            outputs.iter_mut().map(|ch| ch.as_mut_ptr()).collect();

        unsafe {
            process_replacing(
                self.effect,
                in_ptrs.as_ptr(),
                out_ptrs.as_mut_ptr(),
                frames as i32,
            );
        }
    }

    fn bank_chunk(&mut self) -> Vec<u8> {
        let mut data: *mut c_void = ptr::null_mut();
        let size = self.dispatch(
            opcodes::GET_CHUNK,
            1, // bank context
            0,
            &mut data as *mut *mut c_void as *mut c_void,
            0.0,
        );
        if size <= 0 || data.is_null() {
            return Vec::new();
        }
        // The effect owns the chunk memory; copy it out before anything
        // else is dispatched.
        unsafe { std::slice::from_raw_parts(data as *const u8, size as usize) }.to_vec()
    }

    fn load_bank_chunk(&mut self, data: &[u8]) {
        self.dispatch(
            opcodes::SET_CHUNK,
            1,
            data.len() as isize,
            data.as_ptr() as *mut c_void,
            0.0,
        );
    }

    fn parameter(&self, index: usize) -> f32 {
        match unsafe { (*self.effect).get_parameter } {
            Some(get_parameter) => unsafe { get_parameter(self.effect, index as i32) },
            None => 0.0,
        }
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        if let Some(set_parameter) = unsafe { (*self.effect).set_parameter } {
            unsafe { set_parameter(self.effect, index as i32, value) };
        }
    }

    fn program(&self) -> i32 {
        self.dispatch(opcodes::GET_PROGRAM, 0, 0, ptr::null_mut(), 0.0) as i32
    }

    fn set_program(&mut self, index: i32) {
        self.dispatch(opcodes::SET_PROGRAM, 0, index as isize, ptr::null_mut(), 0.0);
    }
}

/// Callback handed to the effect at instantiation.
///
/// Some effects spam idle notifications on every cycle; the first one is
/// logged and the rest are dropped silently. Window resize requests are
/// refused since the host does not manage editor geometry.
unsafe extern "C" fn host_callback(
    _effect: *mut AEffect,
    opcode: i32,
    _index: i32,
    _value: isize,
    _ptr: *mut c_void,
    _opt: f32,
) -> isize {
    match opcode {
        host_opcodes::VERSION => 2400,
        host_opcodes::IDLE => {
            static IDLE_LOGGED: AtomicBool = AtomicBool::new(false);
            if !IDLE_LOGGED.swap(true, Ordering::Relaxed) {
                tracing::warn!("effect issued an idle notification; further ones will be dropped");
            }
            0
        }
        host_opcodes::SIZE_WINDOW => 0,
        host_opcodes::AUTOMATE => 0,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_callback_reports_vst24() {
        let result = unsafe {
            host_callback(
                ptr::null_mut(),
                host_opcodes::VERSION,
                0,
                0,
                ptr::null_mut(),
                0.0,
            )
        };
        assert_eq!(result, 2400);
    }

    #[test]
    fn test_host_callback_refuses_window_resize() {
        let result = unsafe {
            host_callback(
                ptr::null_mut(),
                host_opcodes::SIZE_WINDOW,
                0,
                0,
                ptr::null_mut(),
                0.0,
            )
        };
        assert_eq!(result, 0);
    }

    #[test]
    fn test_idle_calls_are_swallowed() {
        for _ in 0..3 {
            let result = unsafe {
                host_callback(
                    ptr::null_mut(),
                    host_opcodes::IDLE,
                    0,
                    0,
                    ptr::null_mut(),
                    0.0,
                )
            };
            assert_eq!(result, 0);
        }
    }
}
