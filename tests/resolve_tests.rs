//! Reference resolution tests over on-disk projects.

use jsdepend::resolve::sloppy::match_score;
use jsdepend::resolve::{Resolvable, Resolver};
use jsdepend::{Config, Dialect, LocalFileStore, Reference};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, handle: &str, contents: &str) {
        let path = root.join(handle);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(path, contents).expect("Failed to write file");
    }

    fn resolver(dir: &TempDir, config: Config) -> Resolver {
        Resolver::new(Arc::new(LocalFileStore::new(dir.path())), config)
    }

    #[test]
    fn test_match_score_examples() {
        assert_eq!(match_score("foo/bar/util", "bar/foo/util.js"), 0);
        assert_eq!(match_score("scripts/foo/bar/util", "foo/bar/util.js"), 2);
        assert_eq!(match_score("foo/bar/util", "foo/bar/util.js"), 2);
        assert_eq!(match_score("bar/util", "foo/bar/util.js"), 1);
        assert_eq!(match_score("scripts/bar/util", "foo/bar/util.js"), 1);
        assert_eq!(match_score("util", "util.js"), 0);
    }

    #[test]
    fn test_nested_node_modules_prefers_nearest() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(dir.path(), "node_modules/left-pad/index.js", "");
        write(dir.path(), "packages/app/node_modules/left-pad/package.json", r#"{"main": "./pad.js"}"#);
        write(dir.path(), "packages/app/node_modules/left-pad/pad.js", "");
        write(dir.path(), "packages/app/src/main.js", "require('left-pad');");
        write(dir.path(), "packages/other/main.js", "require('left-pad');");

        let r = resolver(&dir, Config::default());
        let near = r.resolve_one("packages/app/src/main.js", Reference::new(Dialect::COMMONJS, "left-pad"));
        assert_eq!(near.path.as_deref(), Some("packages/app/node_modules/left-pad/pad.js"));

        let far = r.resolve_one("packages/other/main.js", Reference::new(Dialect::COMMONJS, "left-pad"));
        assert_eq!(far.path.as_deref(), Some("node_modules/left-pad/index.js"));
    }

    #[test]
    fn test_malformed_package_json_is_skipped() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(dir.path(), "node_modules/broken/package.json", "{ this is not json");
        write(dir.path(), "node_modules/broken/index.js", "");
        write(dir.path(), "main.js", "");

        let r = resolver(&dir, Config::default());
        let resolved = r.resolve_one("main.js", Reference::new(Dialect::COMMONJS, "broken"));
        assert_eq!(resolved.path.as_deref(), Some("node_modules/broken/index.js"));
    }

    #[test]
    fn test_loader_plugins() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(dir.path(), "views/list.js", "");
        write(dir.path(), "views/template.html", "<ul></ul>");

        let r = resolver(&dir, Config::default());
        let refs = r.resolve(
            "views/list.js",
            Resolvable::Many(vec![
                Reference::new(Dialect::AMD, "text!template.html"),
                Reference::new(Dialect::AMD, "domReady!"),
                Reference::new(Dialect::AMD, "css!styles/list.css"),
            ]),
        );
        let Resolvable::Many(refs) = refs else {
            panic!("shape changed");
        };
        assert_eq!(refs[0].path.as_deref(), Some("views/template.html"));
        assert!(refs[1].ignore);
        assert_eq!(refs[1].path, None);
        assert!(refs[2].ignore);

        let json = serde_json::to_value(&refs[1]).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "AMD", "name": "domReady!", "ignore": true }));
    }

    #[test]
    fn test_builtins_independent_of_project() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(dir.path(), "main.js", "");
        write(dir.path(), "node_modules/path/index.js", "");
        write(dir.path(), "path.js", "");

        let r = resolver(&dir, Config::default());
        for name in ["fs", "path", "events", "node:util"] {
            let resolved = r.resolve_one("main.js", Reference::new(Dialect::COMMONJS, name));
            let bare = name.trim_start_matches("node:");
            assert_eq!(resolved.path, Some(format!("node_natives/{}.js", bare)));
        }
    }

    #[test]
    fn test_sloppy_ties_pick_smallest_path() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(dir.path(), "main.js", "");
        write(dir.path(), "zeta/helpers.js", "");
        write(dir.path(), "alpha/helpers.js", "");

        let config = Config {
            sloppy: true,
            ..Config::default()
        };
        let r = resolver(&dir, config);
        let guessed = r.resolve_one("main.js", Reference::new(Dialect::AMD, "lib/helpers"));
        assert_eq!(guessed.path.as_deref(), Some("alpha/helpers.js"));
        let candidates = guessed.candidates.expect("sloppy resolution lists candidates");
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.score == 0));
    }

    #[test]
    fn test_declared_packages_from_page() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write(
            dir.path(),
            "index.html",
            r#"<script>
                var require = {
                    baseUrl: 'scripts',
                    packages: [{ name: 'cart', location: 'modules/cart' }]
                };
            </script>
            <script src="scripts/require.js"></script>"#,
        );
        write(dir.path(), "scripts/app.js", "");
        write(dir.path(), "scripts/modules/cart/main.js", "");
        write(dir.path(), "scripts/modules/cart/item.js", "");

        let r = resolver(&dir, Config::default());
        let main = r.resolve_one("scripts/app.js", Reference::new(Dialect::AMD, "cart"));
        assert_eq!(main.path.as_deref(), Some("scripts/modules/cart/main.js"));
        let item = r.resolve_one("scripts/app.js", Reference::new(Dialect::AMD, "cart/item"));
        assert_eq!(item.path.as_deref(), Some("scripts/modules/cart/item.js"));
    }
}
