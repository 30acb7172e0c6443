//! Version control helpers backed by libgit2.

use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature};
use log::debug;

use crate::error::Result;

/// Initializes a repository in `dir`, stages everything not ignored and
/// commits it with `message`.
///
/// The author comes from the git configuration; a local placeholder is used
/// when none is configured.
pub fn init_and_commit<P: AsRef<Path>>(dir: P, message: &str) -> Result<Oid> {
    let repo = Repository::init(dir.as_ref())?;
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;

    let tree = repo.find_tree(index.write_tree()?)?;
    let signature = match repo.signature() {
        Ok(signature) => signature,
        Err(e) => {
            debug!("No git identity configured ({}), using a placeholder", e);
            Signature::now("django-setting", "django-setting@localhost")?
        }
    };
    let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
    debug!("Created commit {} in {}", oid, dir.as_ref().display());
    Ok(oid)
}

/// Stages `paths` (relative to the work tree) in the repository at `dir`.
pub fn stage<P: AsRef<Path>>(dir: P, paths: &[&str]) -> Result<()> {
    let repo = Repository::open(dir.as_ref())?;
    let mut index = repo.index()?;
    for path in paths {
        index.add_path(Path::new(path))?;
    }
    index.write()?;
    Ok(())
}
