use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use taskdag::dag::{action, BoxedAction};
use taskdag::engine::InterruptFlag;
use taskdag::errors::TaskdagError;

/// Hands out recipe actions that:
/// - record their task name, in invocation order, into a shared log
/// - then succeed, fail, or fail in a specific way.
#[derive(Debug, Clone, Default)]
pub struct FakeActions {
    invoked: Arc<Mutex<Vec<String>>>,
}

impl FakeActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task names in the order their actions ran.
    pub fn invoked(&self) -> Vec<String> {
        self.invoked.lock().unwrap().clone()
    }

    fn recorder(&self, name: &str) -> impl Fn() + Send + Sync + 'static {
        let invoked = Arc::clone(&self.invoked);
        let name = name.to_string();
        move || invoked.lock().unwrap().push(name.clone())
    }

    pub fn succeed(&self, name: &str) -> Option<BoxedAction> {
        let record = self.recorder(name);
        action(move || {
            record();
            Ok(())
        })
    }

    /// Succeeds after writing `path`, like a real recipe would.
    pub fn touch(&self, name: &str, path: PathBuf) -> Option<BoxedAction> {
        let record = self.recorder(name);
        let contents = name.to_string();
        action(move || {
            record();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &contents).with_context(|| format!("writing {:?}", path))
        })
    }

    pub fn fail(&self, name: &str) -> Option<BoxedAction> {
        let record = self.recorder(name);
        let message = format!("{name} broke");
        action(move || {
            record();
            Err(anyhow!(message.clone()))
        })
    }

    /// Fails with "no space left on device".
    pub fn disk_full(&self, name: &str) -> Option<BoxedAction> {
        let record = self.recorder(name);
        action(move || {
            record();
            Err(io::Error::from(io::ErrorKind::StorageFull)).context("writing output")
        })
    }

    /// Fails as if the user pressed Ctrl-C while it ran.
    pub fn interrupted(&self, name: &str) -> Option<BoxedAction> {
        let record = self.recorder(name);
        action(move || {
            record();
            Err(TaskdagError::Interrupted.into())
        })
    }

    /// Succeeds, but raises `flag` on the way out, as a Ctrl-C arriving
    /// between two tasks would.
    pub fn succeed_then_raise(&self, name: &str, flag: InterruptFlag) -> Option<BoxedAction> {
        let record = self.recorder(name);
        action(move || {
            record();
            flag.raise();
            Ok(())
        })
    }

    pub fn panic(&self, name: &str) -> Option<BoxedAction> {
        let record = self.recorder(name);
        let message = format!("{name} panicked");
        action(move || {
            record();
            panic!("{}", message);
        })
    }
}
