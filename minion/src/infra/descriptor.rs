//! Infrastructure implementation of the `DescriptorProbe` port.

use std::path::PathBuf;

use crate::application::ports::DescriptorProbe;

/// Looks for `<dir>/<service_name>` in each configured init directory.
#[derive(Debug, Clone)]
pub struct InitDirProbe {
    dirs: Vec<PathBuf>,
}

impl InitDirProbe {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl DescriptorProbe for InitDirProbe {
    fn descriptor_exists(&self, service_name: &str) -> bool {
        self.dirs.iter().any(|dir| {
            let candidate = dir.join(service_name);
            let found = candidate.exists();
            tracing::debug!(path = %candidate.display(), found, "probed init descriptor");
            found
        })
    }
}
