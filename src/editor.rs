//! Editor surface lifecycle coordination.
//!
//! The effect may own an editor window; the host never constructs one
//! itself. Window creation is behind [`EditorFactory`] so the embedding
//! application decides how surfaces come to exist, while this module owns
//! when: at most one surface alive, destruction always on a background
//! thread, and a single pending-teardown slot that every lifecycle
//! operation drains before acting. The audio path never touches any of
//! this.

use crate::effect::EffectInstance;
use std::thread::JoinHandle;

/// An effect-owned editor window, as seen by the host.
///
/// Native teardown happens in `Drop`, which the coordinator runs on a
/// dedicated thread so the caller is never blocked by window destruction.
pub trait EditorSurface: Send {
    fn set_title(&mut self, title: &str);
    fn show(&mut self);
    /// Request the window to leave the screen ahead of destruction.
    fn hide(&mut self);
}

/// Builds editor surfaces bound to a loaded effect.
pub trait EditorFactory: Send {
    fn create(&self, effect: &mut dyn EffectInstance) -> Box<dyn EditorSurface>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Open,
    /// A background teardown is still running.
    Closing,
}

/// State machine over {closed, open, closing} with a single-slot teardown
/// handle.
///
/// Only one teardown can ever be in flight: every entry point joins the
/// slot before proceeding, so a close immediately followed by open (or a
/// second close) can neither race a pending destroy nor accumulate tasks.
pub struct EditorCoordinator {
    surface: Option<Box<dyn EditorSurface>>,
    teardown: Option<JoinHandle<()>>,
}

impl Default for EditorCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorCoordinator {
    pub fn new() -> Self {
        Self {
            surface: None,
            teardown: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    pub fn state(&self) -> EditorState {
        if self.surface.is_some() {
            EditorState::Open
        } else if self.teardown.as_ref().is_some_and(|t| !t.is_finished()) {
            EditorState::Closing
        } else {
            EditorState::Closed
        }
    }

    /// Join a pending teardown, if any, and clear the slot.
    pub fn wait_teardown(&mut self) {
        if let Some(task) = self.teardown.take() {
            if task.join().is_err() {
                tracing::error!("editor teardown thread panicked");
            }
        }
    }

    /// Build and show a surface for `effect`. No-op while one is alive.
    pub fn open(&mut self, factory: &dyn EditorFactory, effect: &mut dyn EffectInstance) {
        self.wait_teardown();

        if self.surface.is_some() {
            return;
        }

        let mut surface = factory.create(effect);
        surface.set_title(&effect.info().name);
        surface.show();
        self.surface = Some(surface);
    }

    /// Hide the surface and destroy it on a background thread.
    ///
    /// `wait_for_completion` blocks until destruction finishes; it is meant
    /// for full shutdown, where the surface must be gone before the host
    /// itself goes away.
    pub fn close(&mut self, wait_for_completion: bool) {
        let Some(mut surface) = self.surface.take() else {
            return;
        };

        // Drain the previous teardown before starting another; the slot
        // holds at most one task.
        self.wait_teardown();

        surface.hide();
        self.teardown = Some(std::thread::spawn(move || drop(surface)));

        if wait_for_completion {
            self.wait_teardown();
        }
    }
}

impl Drop for EditorCoordinator {
    fn drop(&mut self) {
        self.close(true);
        self.wait_teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::ThreadId;

    struct NullEffect {
        info: EffectInfo,
    }

    impl NullEffect {
        fn new() -> Self {
            Self {
                info: EffectInfo {
                    name: "Probe Verb".to_string(),
                    has_editor: true,
                    ..Default::default()
                },
            }
        }
    }

    impl EffectInstance for NullEffect {
        fn info(&self) -> &EffectInfo {
            &self.info
        }
        fn open(&mut self) {}
        fn close(&mut self) {}
        fn set_sample_rate(&mut self, _rate: f32) {}
        fn set_block_size(&mut self, _frames: usize) {}
        fn resume(&mut self) {}
        fn suspend(&mut self) {}
        fn process(&mut self, _inputs: &[&[f32]], _outputs: &mut [Vec<f32>], _frames: usize) {}
        fn bank_chunk(&mut self) -> Vec<u8> {
            Vec::new()
        }
        fn load_bank_chunk(&mut self, _data: &[u8]) {}
        fn parameter(&self, _index: usize) -> f32 {
            0.0
        }
        fn set_parameter(&mut self, _index: usize, _value: f32) {}
        fn program(&self) -> i32 {
            0
        }
        fn set_program(&mut self, _index: i32) {}
    }

    #[derive(Default)]
    struct SurfaceProbe {
        titles: Mutex<Vec<String>>,
        shown: AtomicUsize,
        hidden: AtomicUsize,
        dropped: AtomicUsize,
        drop_thread: Mutex<Option<ThreadId>>,
    }

    struct ProbeSurface {
        probe: Arc<SurfaceProbe>,
    }

    impl EditorSurface for ProbeSurface {
        fn set_title(&mut self, title: &str) {
            self.probe.titles.lock().unwrap().push(title.to_string());
        }
        fn show(&mut self) {
            self.probe.shown.fetch_add(1, Ordering::SeqCst);
        }
        fn hide(&mut self) {
            self.probe.hidden.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Drop for ProbeSurface {
        fn drop(&mut self) {
            self.probe.dropped.fetch_add(1, Ordering::SeqCst);
            *self.probe.drop_thread.lock().unwrap() = Some(std::thread::current().id());
        }
    }

    struct ProbeFactory {
        probe: Arc<SurfaceProbe>,
        created: AtomicUsize,
    }

    impl EditorFactory for ProbeFactory {
        fn create(&self, _effect: &mut dyn EffectInstance) -> Box<dyn EditorSurface> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Box::new(ProbeSurface {
                probe: Arc::clone(&self.probe),
            })
        }
    }

    fn probe_factory() -> (ProbeFactory, Arc<SurfaceProbe>) {
        let probe = Arc::new(SurfaceProbe::default());
        (
            ProbeFactory {
                probe: Arc::clone(&probe),
                created: AtomicUsize::new(0),
            },
            probe,
        )
    }

    #[test]
    fn test_open_sets_title_and_shows() {
        let (factory, probe) = probe_factory();
        let mut effect = NullEffect::new();
        let mut editor = EditorCoordinator::new();

        assert_eq!(editor.state(), EditorState::Closed);
        editor.open(&factory, &mut effect);

        assert!(editor.is_open());
        assert_eq!(editor.state(), EditorState::Open);
        assert_eq!(probe.titles.lock().unwrap().as_slice(), ["Probe Verb"]);
        assert_eq!(probe.shown.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reopen_while_open_is_noop() {
        let (factory, _probe) = probe_factory();
        let mut effect = NullEffect::new();
        let mut editor = EditorCoordinator::new();

        editor.open(&factory, &mut effect);
        editor.open(&factory, &mut effect);

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_destroys_off_thread() {
        let (factory, probe) = probe_factory();
        let mut effect = NullEffect::new();
        let mut editor = EditorCoordinator::new();

        editor.open(&factory, &mut effect);
        editor.close(true);

        assert!(!editor.is_open());
        assert_eq!(editor.state(), EditorState::Closed);
        assert_eq!(probe.hidden.load(Ordering::SeqCst), 1);
        assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
        let drop_thread = probe.drop_thread.lock().unwrap().unwrap();
        assert_ne!(drop_thread, std::thread::current().id());
    }

    #[test]
    fn test_nonblocking_close_reports_not_open() {
        let (factory, probe) = probe_factory();
        let mut effect = NullEffect::new();
        let mut editor = EditorCoordinator::new();

        editor.open(&factory, &mut effect);
        editor.close(false);
        // Teardown may still be in flight, but the surface is already gone
        // from the host's point of view.
        assert!(!editor.is_open());

        editor.wait_teardown();
        assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_double_close_spawns_single_teardown() {
        let (factory, probe) = probe_factory();
        let mut effect = NullEffect::new();
        let mut editor = EditorCoordinator::new();

        editor.open(&factory, &mut effect);
        editor.close(false);
        editor.close(false);
        editor.wait_teardown();

        assert_eq!(probe.hidden.load(Ordering::SeqCst), 1);
        assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_then_reopen_waits_for_teardown() {
        let (factory, probe) = probe_factory();
        let mut effect = NullEffect::new();
        let mut editor = EditorCoordinator::new();

        editor.open(&factory, &mut effect);
        editor.close(false);
        editor.open(&factory, &mut effect);

        // The reopen joined the pending destroy before building the second
        // surface, so exactly one drop has happened and one surface lives.
        assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert!(editor.is_open());
    }

    #[test]
    fn test_drop_finishes_pending_teardown() {
        let (factory, probe) = probe_factory();
        let mut effect = NullEffect::new();
        {
            let mut editor = EditorCoordinator::new();
            editor.open(&factory, &mut effect);
            editor.close(false);
        }
        assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
    }
}
