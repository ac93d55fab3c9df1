use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` directly under the root is dropped (`/..` is `/`); leading `..`
/// of a relative path is kept.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// The name a walked path is recorded under in the archive.
///
/// Always relative: root, drive prefix and leading `..` are stripped after
/// normalization, so `/tmp/x/a` becomes `tmp/x/a` and `../data/a` becomes
/// `data/a`. Returns an empty path for `.`, `/` and the like.
pub fn entry_name(walked: &Path) -> PathBuf {
    lexical_normalize(walked)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Joins an entry name onto an extraction root.
///
/// Returns `None` when the normalized result is neither the root itself nor
/// beneath it. Absolute names replace the root on join and are therefore
/// rejected unless they already point inside it.
pub fn contained_target(root: &Path, name: &str) -> Option<PathBuf> {
    let root = lexical_normalize(root);
    let target = lexical_normalize(&root.join(name));
    target.starts_with(&root).then_some(target)
}
