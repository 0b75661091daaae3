//! In-memory mock filesystem for testing the collector without real sysfs.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::collector::traits::FileSystem;

/// In-memory filesystem for tests.
///
/// Stores files and directories in memory so tests can simulate arbitrary
/// `/sys/class/infiniband` states, including counters that go missing
/// mid-run (via [`MockFs::remove_file`] on a shared reference).
#[derive(Debug, Default)]
pub struct MockFs {
    files: Mutex<HashMap<PathBuf, String>>,
    directories: Mutex<HashSet<PathBuf>>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.lock().unwrap().insert(path, content.into());
    }

    /// Removes a file, simulating a counter that disappears mid-run.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }

    /// Adds an empty directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.lock().unwrap().insert(path);
    }

    fn add_parents(&self, path: &Path) {
        let mut dirs = self.directories.lock().unwrap();
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                dirs.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Populates an ACTIVE InfiniBand port with the four mandatory
    /// `port_*` counters, link metadata, and a couple of GID entries.
    pub fn add_ib_port(&self, device: &str, port: u32) {
        let base = PathBuf::from(format!("/sys/class/infiniband/{device}/ports/{port}"));
        self.add_file(base.join("state"), "4: ACTIVE\n");
        self.add_file(base.join("link_layer"), "InfiniBand\n");
        self.add_file(base.join("rate"), "100 Gb/sec (4X EDR)\n");
        let counters = base.join("counters");
        self.add_file(counters.join("port_rcv_data"), "0\n");
        self.add_file(counters.join("port_xmit_data"), "0\n");
        self.add_file(counters.join("port_rcv_packets"), "0\n");
        self.add_file(counters.join("port_xmit_packets"), "0\n");
        self.add_file(
            base.join("gids/0"),
            "fe80:0000:0000:0000:0011:2233:4455:6677\n",
        );
        self.add_file(base.join("gids/1"), "0000:0000:0000:0000:0000:0000:0000:0000\n");
        self.add_file(base.join("gid_attrs/types/0"), "IB/RoCE v1\n");
        self.add_file(base.join("gid_attrs/ndevs/0"), format!("{device}-ndev\n"));
    }

    /// Overwrites a single counter value under an existing port.
    pub fn set_counter(&self, device: &str, port: u32, counter: &str, value: u64) {
        let path = PathBuf::from(format!(
            "/sys/class/infiniband/{device}/ports/{port}/counters/{counter}"
        ));
        self.add_file(path, format!("{value}\n"));
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display())))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
            || self.directories.lock().unwrap().contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.lock().unwrap().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}", path.display()),
            ));
        }
        let files = self.files.lock().unwrap();
        let dirs = self.directories.lock().unwrap();
        let mut out: Vec<PathBuf> = files
            .keys()
            .chain(dirs.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        Ok(out)
    }
}
