use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// Locate the [`syn::Path`] of a slate crate as seen from the caller's `Cargo.toml`.
///
/// Code emitted by a proc-macro runs inside the invoking crate, so the path of
/// the runtime crate depends on how that crate spells its dependencies.
///
/// # Example
///
/// ```rust
/// # use slate_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("slate_record"));
/// ```
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If a dependency is a rename of the requested crate (`key = { package = "crate_name" }`),
///    return `::key`.
/// 3. If the requested crate name begins with `slate_` and the target crate depends on
///    the facade crate `slate`, return `::slate::short_name`
///    (e.g. `slate_record` -> `::slate::record`).
/// 4. Repeat step 1-3 in `dev-dependencies`.
/// 5. Otherwise, fall back to the absolute path `::crate_name`.
///
/// ## Note
///
/// A crate that expands its own macros must alias itself, for example
/// `extern crate self as slate_record;` in the crate root, so the absolute
/// path also resolves from inside.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "slate";
const CRATE_PREFIX: &str = "slate_";

impl Manifest {
    #[inline(never)]
    fn get_manifest_path() -> PathBuf {
        env::var_os("CARGO_MANIFEST_DIR")
            .map(|path| {
                let mut path = PathBuf::from(path);
                path.push("Cargo.toml");
                assert!(
                    path.exists(),
                    "Cargo manifest does not exist at path {}",
                    path.display(),
                );
                path
            })
            .expect("CARGO_MANIFEST_DIR should be auto-defined by cargo.")
    }

    #[inline(never)]
    fn get_manifest_modified_time(path: &Path) -> Result<SystemTime, std::io::Error> {
        std::fs::metadata(path).and_then(|metadata| metadata.modified())
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let manifest = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(manifest)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    #[inline]
    fn parse_str<T: syn::parse::Parse>(path: &str) -> T {
        syn::parse_str(path).unwrap()
    }

    // `key = { package = "name" }` or `[dependencies.key] package = "name"`.
    fn renamed_to<'a>(deps: &'a Table, name: &str) -> Option<&'a str> {
        deps.iter().find_map(|(key, item)| {
            let package = match item {
                Item::Table(table) => table.get("package").and_then(Item::as_str),
                Item::Value(value) => value
                    .as_inline_table()
                    .and_then(|table| table.get("package"))
                    .and_then(|value| value.as_str()),
                _ => None,
            };
            (package == Some(name)).then_some(key)
        })
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::parse_str(&format!("::{name}")));
        }

        if let Some(key) = Self::renamed_to(deps, name) {
            return Some(Self::parse_str(&format!("::{key}")));
        }

        if let Some(module) = name.strip_prefix(CRATE_PREFIX)
            && deps.contains_key(FACADE_NAME)
        {
            let mut path = Self::parse_str::<syn::Path>(&format!("::{FACADE_NAME}"));
            path.segments.push(Self::parse_str(module));
            return Some(path);
        }

        None
    }

    /// Return a [`syn::Path`] for the package named `name` as resolved from this
    /// crate's Cargo.toml. See the type documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .find_map(|section| match self.manifest.get(section) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .unwrap_or_else(|| Self::parse_str(&format!("::{name}")))
    }

    /// Run `func` against the caller's parsed `Cargo.toml`.
    ///
    /// Manifests are cached per path and re-read when the file's modification time
    /// changes. Callers should resolve paths once per macro invocation.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let manifest_path = Self::get_manifest_path();
        let modified_time = Self::get_manifest_modified_time(&manifest_path)
            .expect("The Cargo.toml should have a modified time.");

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }

        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read_manifest(&manifest_path),
            modified_time,
        };

        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}

// -----------------------------------------------------------------------------
// Tests
