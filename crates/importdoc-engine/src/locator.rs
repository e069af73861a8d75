//! Filesystem probing for module files.
//!
//! Nothing here imports or executes code. Lookups follow the path-based
//! finder layout: for `a.b` under a search location `root`, the candidates
//! are the package `root/a/b/__init__.*`, extension modules
//! `root/a/b.<tag>.so`, then `root/a/b.py` and `root/a/b.pyc`. A directory
//! `root/a/b` without an `__init__` file is a namespace portion.
//!
//! Directory contents are read through a [`DirectoryCache`], one listing per
//! directory, with symlinks followed when classifying entries.

use importdoc_types::ModuleName;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::trace;
use walkdir::WalkDir;

const INIT_STEM: &str = "__init__";
const SOURCE_SUFFIXES: [&str; 2] = [".py", ".pyc"];
const EXTENSION_SUFFIXES: [&str; 2] = [".so", ".pyd"];

/// What a single search location holds for one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Regular package; path of its `__init__` file
    Package(PathBuf),
    /// Source, bytecode or extension module file
    Module(PathBuf),
    /// Directory without `__init__`: namespace package portion
    Namespace(PathBuf),
}

/// Contents of one directory, classified through symlinks.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    /// Sorted names of entries that are (or link to) regular files
    pub files: Vec<String>,
    /// Sorted names of entries that are (or link to) directories
    pub dirs: Vec<String>,
}

impl DirectoryListing {
    pub fn has_dir(&self, name: &str) -> bool {
        self.dirs.binary_search_by(|d| d.as_str().cmp(name)).is_ok()
    }

    fn has_file(&self, name: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(name)).is_ok()
    }

    /// File backing module `stem`: extension module first, then source, then bytecode.
    pub fn module_file(&self, stem: &str) -> Option<String> {
        if let Some(extension) = self
            .files
            .iter()
            .find(|file| is_extension_module_file(file, stem))
        {
            return Some(extension.clone());
        }

        SOURCE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}{}", stem, suffix))
            .find(|file| self.has_file(file))
    }
}

/// Directory listings shared by every lookup of one diagnosis.
///
/// Each directory is read at most once; later lookups answer from that
/// snapshot. Missing directories are remembered as absent. Read errors are
/// returned and not cached.
#[derive(Debug, Default, Clone)]
pub struct DirectoryCache {
    listings: RefCell<HashMap<PathBuf, Option<Rc<DirectoryListing>>>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing of `dir`, or `None` when it is missing or not a directory.
    pub fn listing(&self, dir: &Path) -> io::Result<Option<Rc<DirectoryListing>>> {
        if let Some(cached) = self.listings.borrow().get(dir) {
            return Ok(cached.clone());
        }

        let listing = read_listing(dir)?.map(Rc::new);
        self.listings
            .borrow_mut()
            .insert(dir.to_path_buf(), listing.clone());
        Ok(listing)
    }

    /// Look in one directory for `name` (a single, undotted segment).
    pub fn lookup(&self, dir: &Path, name: &str) -> io::Result<Option<Candidate>> {
        let Some(listing) = self.listing(dir)? else {
            return Ok(None);
        };
        trace!(dir = %dir.display(), name, "looking up");

        let mut namespace = None;
        if listing.has_dir(name) {
            let package_dir = dir.join(name);
            if let Some(init) = self.find_init(&package_dir)? {
                return Ok(Some(Candidate::Package(init)));
            }
            namespace = Some(package_dir);
        }

        if let Some(file) = listing.module_file(name) {
            return Ok(Some(Candidate::Module(dir.join(file))));
        }

        Ok(namespace.map(Candidate::Namespace))
    }

    /// `__init__` file of a package directory: compiled, source or bytecode.
    pub fn find_init(&self, package_dir: &Path) -> io::Result<Option<PathBuf>> {
        Ok(self
            .listing(package_dir)?
            .and_then(|listing| listing.module_file(INIT_STEM))
            .map(|file| package_dir.join(file)))
    }

    /// Locate the file that would back `name` on `search_paths`.
    ///
    /// Returns the first match. Namespace portions have no file and are not
    /// reported. "Not found" is `Ok(None)`; filesystem errors propagate.
    pub fn find_module_file(
        &self,
        name: &ModuleName,
        search_paths: &[PathBuf],
    ) -> io::Result<Option<PathBuf>> {
        for root in search_paths {
            let dir = parent_dir(root, name);
            match self.lookup(&dir, name.last())? {
                Some(Candidate::Package(path)) | Some(Candidate::Module(path)) => {
                    return Ok(Some(path));
                }
                Some(Candidate::Namespace(_)) | None => {}
            }
        }
        Ok(None)
    }
}

/// Locate the file that would back `name` on `search_paths`.
pub fn find_module_file_path(
    name: &ModuleName,
    search_paths: &[PathBuf],
) -> io::Result<Option<PathBuf>> {
    DirectoryCache::new().find_module_file(name, search_paths)
}

/// Find an entry whose name matches the last segment of `name` ignoring case.
///
/// Exact matches are not reported; they are `find_module_file_path`'s job.
pub fn find_case_insensitive_match(
    name: &ModuleName,
    search_paths: &[PathBuf],
) -> io::Result<Option<PathBuf>> {
    let wanted = name.last();
    let differs_only_in_case = |stem: &str| stem != wanted && stem.eq_ignore_ascii_case(wanted);
    let cache = DirectoryCache::new();

    for root in search_paths {
        let dir = parent_dir(root, name);
        let Some(listing) = cache.listing(&dir)? else {
            continue;
        };

        let packages = listing
            .dirs
            .iter()
            .filter(|entry| differs_only_in_case(entry.as_str()));
        let modules = listing.files.iter().filter(|file| {
            let stem = file.split('.').next().unwrap_or(file.as_str());
            differs_only_in_case(stem)
                && (SOURCE_SUFFIXES.iter().any(|s| file.ends_with(s))
                    || is_extension_module_file(file, stem))
        });

        if let Some(found) = packages.chain(modules).min() {
            return Ok(Some(dir.join(found)));
        }
    }
    Ok(None)
}

/// Permission bits of a file (`mode & 0o777` on Unix).
pub fn permission_bits(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o777
    }

    #[cfg(not(unix))]
    {
        if metadata.permissions().readonly() {
            0o444
        } else {
            0o666
        }
    }
}

/// Permission bits rendered as three octal digits (`"755"`).
pub fn permission_string(metadata: &Metadata) -> String {
    format!("{:03o}", permission_bits(metadata))
}

/// `root` joined with every segment of `name` except the last.
fn parent_dir(root: &Path, name: &ModuleName) -> PathBuf {
    let segments = name.segments();
    segments[..segments.len() - 1]
        .iter()
        .fold(root.to_path_buf(), |mut acc, segment| {
            acc.push(segment);
            acc
        })
}

fn read_listing(dir: &Path) -> io::Result<Option<DirectoryListing>> {
    if !is_dir(dir)? {
        return Ok(None);
    }

    let mut listing = DirectoryListing::default();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };

        // Path::is_dir / is_file follow symlinks; dangling links are neither.
        let path = entry.path();
        if path.is_dir() {
            listing.dirs.push(file_name.to_string());
        } else if path.is_file() {
            listing.files.push(file_name.to_string());
        }
    }
    listing.dirs.sort();
    listing.files.sort();

    trace!(
        dir = %dir.display(),
        files = listing.files.len(),
        dirs = listing.dirs.len(),
        "listed directory"
    );
    Ok(Some(listing))
}

/// `name.so`, `name.pyd`, or with an ABI tag: `name.cpython-312-x86_64-linux-gnu.so`
pub fn is_extension_module_file(file_name: &str, name: &str) -> bool {
    let Some(rest) = file_name
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('.'))
    else {
        return false;
    };

    EXTENSION_SUFFIXES.iter().any(|suffix| {
        let bare = &suffix[1..];
        rest == bare
            || rest
                .strip_suffix(suffix)
                .is_some_and(|tag| !tag.is_empty() && !tag.contains('.'))
    })
}

fn is_dir(path: &Path) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(err) if is_absent(&err) => Ok(false),
        Err(err) => Err(err),
    }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_finds_plain_module() {
        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "mod.py");

        let found = find_module_file_path(&name("mod"), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(found, Some(file));
    }

    #[test]
    fn test_package_init_wins_over_module_file() {
        let tmp = TempDir::new().unwrap();
        let init = touch(tmp.path(), "pkg/__init__.py");
        touch(tmp.path(), "pkg.py");

        let found = find_module_file_path(&name("pkg"), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(found, Some(init));
    }

    #[test]
    fn test_dotted_name_descends_into_package() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "pkg/__init__.py");
        let leaf = touch(tmp.path(), "pkg/sub/leaf.py");

        let found =
            find_module_file_path(&name("pkg.sub.leaf"), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(found, Some(leaf));
    }

    #[test]
    fn test_first_search_path_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let expected = touch(first.path(), "dup.py");
        touch(second.path(), "dup.py");

        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(find_module_file_path(&name("dup"), &paths).unwrap(), Some(expected));
    }

    #[test]
    fn test_extension_module_with_abi_tag() {
        let tmp = TempDir::new().unwrap();
        let ext = touch(tmp.path(), "_speedups.cpython-312-x86_64-linux-gnu.so");

        let found =
            find_module_file_path(&name("_speedups"), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(found, Some(ext));
    }

    #[test]
    fn test_namespace_directory_is_not_a_file_match() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("ns")).unwrap();

        let paths = [tmp.path().to_path_buf()];
        assert_eq!(find_module_file_path(&name("ns"), &paths).unwrap(), None);
        assert_eq!(
            DirectoryCache::new().lookup(tmp.path(), "ns").unwrap(),
            Some(Candidate::Namespace(tmp.path().join("ns")))
        );
    }

    #[test]
    fn test_missing_and_non_directory_roots_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let zip = touch(tmp.path(), "python312.zip");
        let paths = vec![tmp.path().join("does-not-exist"), zip];

        assert_eq!(find_module_file_path(&name("anything"), &paths).unwrap(), None);
    }

    #[test]
    fn test_case_insensitive_match() {
        let tmp = TempDir::new().unwrap();
        let actual = touch(tmp.path(), "MyModule.py");

        let paths = [tmp.path().to_path_buf()];
        assert_eq!(find_module_file_path(&name("mymodule"), &paths).unwrap(), None);
        assert_eq!(
            find_case_insensitive_match(&name("mymodule"), &paths).unwrap(),
            Some(actual)
        );
        assert_eq!(
            find_case_insensitive_match(&name("MyModule"), &paths).unwrap(),
            None
        );
    }

    #[test]
    fn test_compiled_package_init_is_a_package() {
        let tmp = TempDir::new().unwrap();
        let init = touch(tmp.path(), "fast/__init__.cpython-312-x86_64-linux-gnu.so");
        touch(tmp.path(), "bytecode/__init__.pyc");

        let cache = DirectoryCache::new();
        assert_eq!(
            cache.lookup(tmp.path(), "fast").unwrap(),
            Some(Candidate::Package(init))
        );
        assert_eq!(
            cache.lookup(tmp.path(), "bytecode").unwrap(),
            Some(Candidate::Package(tmp.path().join("bytecode/__init__.pyc")))
        );
    }

    #[test]
    fn test_source_init_wins_over_bytecode_init() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "pkg/__init__.py");
        touch(tmp.path(), "pkg/__init__.pyc");

        let found = DirectoryCache::new().find_init(&tmp.path().join("pkg")).unwrap();
        assert_eq!(found, Some(source));
    }

    #[test]
    fn test_cache_reads_each_directory_once() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "first.py");

        let cache = DirectoryCache::new();
        assert!(cache.lookup(tmp.path(), "first").unwrap().is_some());

        // Added after the listing was taken: invisible to this cache only.
        touch(tmp.path(), "second.py");
        assert_eq!(cache.lookup(tmp.path(), "second").unwrap(), None);
        assert!(DirectoryCache::new()
            .lookup(tmp.path(), "second")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_missing_directory_has_no_listing() {
        let tmp = TempDir::new().unwrap();
        let cache = DirectoryCache::new();

        assert!(cache.listing(&tmp.path().join("absent")).unwrap().is_none());
        assert!(cache.find_init(&tmp.path().join("absent")).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_entries_are_followed() {
        use std::os::unix::fs::symlink;

        let real = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();
        touch(real.path(), "lib/__init__.py");
        touch(real.path(), "helper.py");
        symlink(real.path().join("lib"), site.path().join("linked")).unwrap();
        symlink(real.path().join("helper.py"), site.path().join("helper.py")).unwrap();
        symlink(real.path().join("gone"), site.path().join("dangling")).unwrap();

        let listing = DirectoryCache::new().listing(site.path()).unwrap().unwrap();
        assert_eq!(listing.dirs, vec!["linked"]);
        assert_eq!(listing.files, vec!["helper.py"]);

        let paths = [site.path().to_path_buf()];
        assert_eq!(
            find_module_file_path(&name("linked"), &paths).unwrap(),
            Some(site.path().join("linked/__init__.py"))
        );
        assert_eq!(
            find_module_file_path(&name("helper"), &paths).unwrap(),
            Some(site.path().join("helper.py"))
        );
    }

    #[test]
    fn test_is_extension_module_file() {
        assert!(is_extension_module_file("foo.so", "foo"));
        assert!(is_extension_module_file("foo.abi3.so", "foo"));
        assert!(is_extension_module_file("foo.cp312-win_amd64.pyd", "foo"));
        assert!(!is_extension_module_file("foo.py", "foo"));
        assert!(!is_extension_module_file("foobar.so", "foo"));
        assert!(!is_extension_module_file("foo..so", "foo"));
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_string() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "mod.py");
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();

        let metadata = fs::metadata(&file).unwrap();
        assert_eq!(permission_string(&metadata), "755");
        assert_eq!(permission_bits(&metadata), 0o755);
    }
}
