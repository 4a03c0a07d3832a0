//! Native loading failure paths.
//!
//! Real plugin binaries are not available in CI, but every failure branch
//! of the native loader is reachable with files that are not loadable
//! modules.

use std::io::Write;
use std::path::Path;

use vst2_host::{HostConfig, HostError, Vst2Effect, VstHost};

#[test]
fn test_missing_module_fails_to_load() {
    let result = Vst2Effect::load(Path::new("/nonexistent/plugins/verb.so"));
    assert!(matches!(result, Err(HostError::Library(_))));
}

#[test]
fn test_garbage_module_fails_to_load() {
    let mut file = tempfile::NamedTempFile::with_suffix(".so").unwrap();
    file.write_all(b"this is not a shared object").unwrap();

    let result = Vst2Effect::load(file.path());
    assert!(matches!(result, Err(HostError::Library(_))));
}

#[test]
fn test_host_survives_failed_load() {
    let mut host = VstHost::new(HostConfig::default());

    let result = host.load_effect_from_path(Path::new("/nonexistent/plugins/verb.so"));
    assert!(result.is_err());
    assert!(!host.is_effect_ready());
    assert_eq!(host.effect_name(), None);

    // The failed path is still recorded, and audio passes through.
    assert_eq!(
        host.plugin_path(),
        Some(Path::new("/nonexistent/plugins/verb.so"))
    );
    let mut samples = vec![0.5f32; 64];
    let mut channels = [Some(samples.as_mut_slice())];
    host.process(&mut channels, 64);
    assert!(samples.iter().all(|&s| s == 0.5));
}

#[test]
fn test_failed_load_is_retried_on_next_request() {
    let mut host = VstHost::new(HostConfig::default());

    assert!(host
        .load_effect_from_path(Path::new("/nonexistent/a.so"))
        .is_err());
    // A later request for a different path goes through the full load again
    // rather than being treated as "already loaded".
    assert!(host
        .load_effect_from_path(Path::new("/nonexistent/b.so"))
        .is_err());
    assert_eq!(host.plugin_path(), Some(Path::new("/nonexistent/b.so")));
}
