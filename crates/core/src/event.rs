//! Change events emitted by the diff

use bitflags::bitflags;
use std::fmt;
use std::path::{Path, PathBuf};

bitflags! {
    /// Kind(s) of change observed for one path
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Op: u32 {
        const CREATE = 1;
        const WRITE = 1 << 1;
        const REMOVE = 1 << 2;
        /// Reserved. The diff reports a rename as REMOVE + CREATE.
        const RENAME = 1 << 3;
        const CHMOD = 1 << 4;
    }
}

/// Display order of flag names, independent of bit order
const OP_NAMES: [(Op, &str); 5] = [
    (Op::CREATE, "CREATE"),
    (Op::REMOVE, "REMOVE"),
    (Op::WRITE, "WRITE"),
    (Op::RENAME, "RENAME"),
    (Op::CHMOD, "CHMOD"),
];

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in OP_NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A single detected change
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    path: PathBuf,
    op: Op,
}

impl Event {
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }

    /// Path the change applies to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn op(&self) -> Op {
        self.op
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path.to_string_lossy(), self.op)
    }
}
