//! Well-known directories the crate reads configuration and build inputs from.
use std::path::PathBuf;

const APP_DIR: &str = "bvr";

#[derive(Debug, Clone, Copy)]
pub enum FsAccess {
    Config,
    Current,
}

impl FsAccess {
    /// Base path for the directory type, with the `bvr` sub-directory appended
    /// unless `raw` is set.
    fn get_path(&self, raw: bool) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Could not resolve the {:?} directory on this system", self)
        })?;

        // The working directory is used as is
        if !raw {
            if let FsAccess::Config = self {
                path.push(APP_DIR);
            }
        }
        Ok(path)
    }

    /// The directory itself, without the `bvr` sub-directory.
    pub fn raw_path(&self) -> anyhow::Result<PathBuf> {
        self.get_path(true)
    }

    /// `bvr` directory joined with `subs`. Only resolves the path, nothing is created.
    ///
    /// Examples: `~/.config/bvr/mask_rcnn`.
    pub fn path_with_subs(&self, subs: &[&str]) -> anyhow::Result<PathBuf> {
        let mut d = self.get_path(false)?;
        for sub in subs {
            d.push(sub);
        }
        Ok(d)
    }
}
