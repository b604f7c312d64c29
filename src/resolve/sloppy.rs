//! Heuristic whole-project search for references nothing else resolves.

use super::loader::Target;
use crate::ingest::imports::Candidate;
use crate::ingest::is_script;
use crate::store::paths;

/// Number of agreeing trailing segments beyond the last one.
///
/// The path's extension is ignored. Scores start at 0 for a bare final
/// segment match.
///
/// # Example
/// ```
/// # use jsdepend::resolve::sloppy::match_score;
/// assert_eq!(match_score("scripts/foo/bar/util", "foo/bar/util.js"), 2);
/// assert_eq!(match_score("foo/bar/util", "bar/foo/util.js"), 0);
/// ```
pub fn match_score(name: &str, path: &str) -> usize {
    trailing_agreement(name, paths::strip_extension(path))
}

fn trailing_agreement(a: &str, b: &str) -> usize {
    a.rsplit('/')
        .zip(b.rsplit('/'))
        .take_while(|(x, y)| x == y)
        .count()
        .saturating_sub(1)
}

/// Every project file that could be the target, best first.
///
/// Modules match on the final segment with the extension ignored and
/// must be scripts; plain files must match the final segment exactly.
/// Ordering is by score descending, then path.
pub fn candidates(target: &Target<'_>, files: &[String]) -> Vec<Candidate> {
    let Some(name) = target.name() else {
        return Vec::new();
    };

    let mut found: Vec<Candidate> = if target.is_module() {
        let name = name.strip_suffix(".js").unwrap_or(name);
        let wanted = paths::basename(name);
        files
            .iter()
            .filter(|file| is_script(file))
            .filter(|file| paths::strip_extension(paths::basename(file)) == wanted)
            .map(|file| Candidate {
                path: file.clone(),
                score: match_score(name, file),
            })
            .collect()
    } else {
        let wanted = paths::basename(name);
        files
            .iter()
            .filter(|file| paths::basename(file) == wanted)
            .map(|file| Candidate {
                path: file.clone(),
                score: trailing_agreement(name, file),
            })
            .collect()
    };

    found.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_candidates_sorted_with_path_tie_break() {
        let files: Vec<String> = [
            "z/util.js",
            "a/util.js",
            "lib/bar/util.js",
            "lib/bar/util.css",
            "lib/other.js",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let found = candidates(&Target::Module("bar/util"), &files);
        let paths: Vec<&str> = found.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["lib/bar/util.js", "a/util.js", "z/util.js"]);
        assert_eq!(found[0].score, 1);
        assert_eq!(found[1].score, 0);
    }

    #[test]
    fn test_file_candidates_need_exact_basename() {
        let files = vec!["tpl/row.html".to_string(), "row.js".to_string()];
        let found = candidates(&Target::File("views/tpl/row.html"), &files);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "tpl/row.html");
        assert_eq!(found[0].score, 1);
    }

    #[test]
    fn test_unsupported_has_no_candidates() {
        let files = vec!["x.js".to_string()];
        assert!(candidates(&Target::Unsupported { plugin: "css" }, &files).is_empty());
    }
}
