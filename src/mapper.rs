// src/mapper.rs

//! Source file → test artifact path derivation.
//!
//! The mapping is purely structural: it never touches the filesystem. A
//! derived artifact path may not exist; callers decide what to do with it.
//!
//! The conventions, using the default spec convention as an example:
//! - all artifacts live under one target root (`spec/`);
//! - the directory layout is mirrored: `lib/a/b/c.rb` maps to `spec/a/b/c_spec.rb`;
//! - source files (`.rb`) get the suffix inserted before the extension;
//! - any other file gets `_spec.rb` appended to its whole basename;
//! - a source file already under the target root maps to itself.

use crate::types::ArtifactKind;

/// Extension of files written in the language under test.
pub const DEFAULT_SOURCE_EXTENSION: &str = "rb";

/// Naming/directory rules for one artifact family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConvention {
    target_root: String,
    suffix: String,
    source_extension: String,
    /// Second-segment rewrites applied after the first segment is replaced,
    /// e.g. `controllers` → `functional`.
    rewrites: Vec<(String, String)>,
}

impl MappingConvention {
    pub fn new(target_root: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            target_root: target_root.into(),
            suffix: suffix.into(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            rewrites: Vec::new(),
        }
    }

    /// Default convention for the given kind, without any rewrites.
    pub fn for_kind(kind: ArtifactKind) -> Self {
        Self::new(kind.target_root(), kind.suffix())
    }

    /// Test convention with the Rails layout: controllers are tested in
    /// `test/functional`, models in `test/unit`.
    pub fn rails_test() -> Self {
        Self::for_kind(ArtifactKind::Test)
            .with_rewrite("controllers", "functional")
            .with_rewrite("models", "unit")
    }

    pub fn with_source_extension(mut self, ext: impl Into<String>) -> Self {
        self.source_extension = ext.into();
        self
    }

    /// Add (or replace) a second-segment rewrite.
    pub fn with_rewrite(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        match self.rewrites.iter_mut().find(|(f, _)| *f == from) {
            Some(existing) => existing.1 = to,
            None => self.rewrites.push((from, to)),
        }
        self
    }

    pub fn target_root(&self) -> &str {
        &self.target_root
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    pub fn rewrites(&self) -> &[(String, String)] {
        &self.rewrites
    }
}

/// Derives artifact paths for one [`MappingConvention`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    convention: MappingConvention,
}

impl PathMapper {
    pub fn new(convention: MappingConvention) -> Self {
        Self { convention }
    }

    pub fn for_kind(kind: ArtifactKind) -> Self {
        Self::new(MappingConvention::for_kind(kind))
    }

    pub fn convention(&self) -> &MappingConvention {
        &self.convention
    }

    /// Theoretical artifact path for `file`.
    ///
    /// Paths with an unexpected shape (absolute paths, bare file names) are
    /// not rejected; they produce a structurally derived path.
    pub fn artifact_for(&self, file: &str) -> String {
        let conv = &self.convention;
        let (dir, base) = split_dir_base(file);
        let ext = extension(base);
        let is_source = ext == Some(conv.source_extension.as_str());
        let mut segments = dir_segments(dir);

        if is_source && segments.first() == Some(&conv.target_root.as_str()) {
            return file.to_string();
        }

        let artifact_base = match ext {
            Some(ext) if is_source => {
                let stem = &base[..base.len() - ext.len() - 1];
                format!("{stem}{}.{ext}", conv.suffix)
            }
            _ => format!("{base}{}.{}", conv.suffix, conv.source_extension),
        };

        match segments.first_mut() {
            Some(first) => *first = conv.target_root.as_str(),
            None => segments.push(conv.target_root.as_str()),
        }
        if let Some(second) = segments.get_mut(1) {
            let current = *second;
            if let Some((_, to)) = conv.rewrites.iter().find(|(from, _)| from == current) {
                *second = to.as_str();
            }
        }

        format!("{}/{}", segments.join("/"), artifact_base)
    }

    /// Candidate source files for an artifact under the target root.
    ///
    /// This inverts [`artifact_for`](Self::artifact_for): the suffix is
    /// stripped and the target root is swapped for each of `source_roots`.
    /// A rewritten directory is tried both un-rewritten and literally. The
    /// stem is tried with the source extension and then with every entry of
    /// `source_extensions`; a stem that already has an extension is also
    /// tried as-is, first. Artifacts outside the target root yield no
    /// candidates.
    pub fn sources_for(
        &self,
        artifact: &str,
        source_roots: &[String],
        source_extensions: &[String],
    ) -> Vec<String> {
        let conv = &self.convention;
        let (dir, base) = split_dir_base(artifact);
        let segments = dir_segments(dir);
        if segments.first() != Some(&conv.target_root.as_str()) {
            return Vec::new();
        }

        let tail = format!("{}.{}", conv.suffix, conv.source_extension);
        let stem = match base.strip_suffix(tail.as_str()) {
            Some(stem) if !stem.is_empty() => stem,
            _ => return Vec::new(),
        };

        // A rewritten directory may also be a literal source directory
        // (`test/unit/x_test.rb` from `lib/unit/x.rb`), so keep both.
        let literal = segments[1..].join("/");
        let mut rests = Vec::new();
        for (from, to) in &conv.rewrites {
            if literal == *to {
                rests.push(from.clone());
                break;
            }
            if let Some(after) = literal.strip_prefix(&format!("{to}/")) {
                rests.push(format!("{from}/{after}"));
                break;
            }
        }
        rests.push(literal);

        // `foo.bar` is either a complete basename or a stem whose own dot is
        // part of the name (`foo.bar.rb`).
        let mut basenames = Vec::new();
        if extension(stem).is_some() {
            basenames.push(stem.to_string());
        }
        let exts = std::iter::once(&conv.source_extension).chain(source_extensions);
        for ext in exts {
            let candidate = format!("{stem}.{ext}");
            if !basenames.contains(&candidate) {
                basenames.push(candidate);
            }
        }

        let mut out = Vec::new();
        for root in source_roots.iter().filter(|r| **r != conv.target_root) {
            for rest in &rests {
                let dir = if rest.is_empty() {
                    root.clone()
                } else {
                    format!("{root}/{rest}")
                };
                for name in &basenames {
                    let candidate = format!("{dir}/{name}");
                    if !out.contains(&candidate) {
                        out.push(candidate);
                    }
                }
            }
        }
        out
    }
}

/// Theoretical spec path for `file` using the default spec convention.
pub fn spec_for(file: &str) -> String {
    PathMapper::for_kind(ArtifactKind::Spec).artifact_for(file)
}

/// Theoretical test path for `file` using the default test convention
/// (no second-segment rewrites).
pub fn test_for(file: &str) -> String {
    PathMapper::for_kind(ArtifactKind::Test).artifact_for(file)
}

/// Split into (directory, basename). A bare name lives in `.`.
fn split_dir_base(file: &str) -> (&str, &str) {
    match file.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => (".", file),
    }
}

/// Directory segments with trailing empty segments dropped.
fn dir_segments(dir: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = dir.split('/').collect();
    while segments.last() == Some(&"") {
        segments.pop();
    }
    segments
}

/// Extension of a basename, without the dot.
///
/// A leading dot (`.bashrc`) or a trailing dot (`foo.`) is not an extension.
fn extension(base: &str) -> Option<&str> {
    let idx = base.rfind('.')?;
    if idx == 0 || idx + 1 == base.len() {
        return None;
    }
    Some(&base[idx + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn spec_for_source_file() {
        assert_eq!(spec_for("lib/dir_monitor.rb"), "spec/dir_monitor_spec.rb");
        assert_eq!(spec_for("lib/a/b/c.rb"), "spec/a/b/c_spec.rb");
        assert_eq!(spec_for("app/models/post.rb"), "spec/models/post_spec.rb");
    }

    #[test]
    fn spec_for_non_source_file_appends_to_whole_basename() {
        assert_eq!(
            spec_for("app/views/posts/post.html.haml"),
            "spec/views/posts/post.html.haml_spec.rb"
        );
        assert_eq!(spec_for("lib/tasks/Rakefile"), "spec/tasks/Rakefile_spec.rb");
        assert_eq!(spec_for("lib/.hidden"), "spec/.hidden_spec.rb");
    }

    #[test]
    fn spec_files_are_fixed_points() {
        assert_eq!(spec_for("spec/dir_monitor_spec.rb"), "spec/dir_monitor_spec.rb");
        assert_eq!(spec_for("spec/models/post_spec.rb"), "spec/models/post_spec.rb");
        let once = spec_for("lib/x.rb");
        assert_eq!(spec_for(&once), once);
    }

    #[test]
    fn non_source_file_under_spec_is_not_a_fixed_point() {
        assert_eq!(spec_for("spec/spec.opts"), "spec/spec.opts_spec.rb");
    }

    #[test]
    fn bare_file_names_map_into_target_root() {
        assert_eq!(spec_for("foo.rb"), "spec/foo_spec.rb");
        assert_eq!(test_for("foo.rb"), "test/foo_test.rb");
    }

    #[test]
    fn unexpected_shapes_map_structurally() {
        assert_eq!(spec_for("/abs/lib/x.rb"), "spec/abs/lib/x_spec.rb");
    }

    #[test]
    fn test_for_source_and_non_source_files() {
        assert_eq!(test_for("lib/dir_monitor.rb"), "test/dir_monitor_test.rb");
        assert_eq!(
            test_for("app/views/posts/post.html.haml"),
            "test/views/posts/post.html.haml_test.rb"
        );
        assert_eq!(test_for("test/dir_monitor_test.rb"), "test/dir_monitor_test.rb");
    }

    #[test]
    fn test_for_without_policy_keeps_second_segment() {
        assert_eq!(
            test_for("app/controllers/posts_controller.rb"),
            "test/controllers/posts_controller_test.rb"
        );
    }

    #[test]
    fn rails_policy_rewrites_controllers_and_models() {
        let mapper = PathMapper::new(MappingConvention::rails_test());
        assert_eq!(
            mapper.artifact_for("app/controllers/posts_controller.rb"),
            "test/functional/posts_controller_test.rb"
        );
        assert_eq!(mapper.artifact_for("app/models/post.rb"), "test/unit/post_test.rb");
        assert_eq!(
            mapper.artifact_for("app/helpers/posts_helper.rb"),
            "test/helpers/posts_helper_test.rb"
        );
        // Only the second segment is ever rewritten.
        assert_eq!(
            mapper.artifact_for("app/admin/models/user.rb"),
            "test/admin/models/user_test.rb"
        );
    }

    #[test]
    fn with_rewrite_replaces_existing_entry() {
        let conv = MappingConvention::rails_test().with_rewrite("models", "model_tests");
        assert_eq!(conv.rewrites().len(), 2);
        let mapper = PathMapper::new(conv);
        assert_eq!(mapper.artifact_for("app/models/post.rb"), "test/model_tests/post_test.rb");
    }

    #[test]
    fn custom_source_extension() {
        let mapper = PathMapper::new(
            MappingConvention::for_kind(ArtifactKind::Spec).with_source_extension("py"),
        );
        assert_eq!(mapper.artifact_for("lib/x.py"), "spec/x_spec.py");
        assert_eq!(mapper.artifact_for("lib/x.rb"), "spec/x.rb_spec.py");
    }

    #[test]
    fn sources_for_reverses_source_mapping() {
        let mapper = PathMapper::for_kind(ArtifactKind::Spec);
        let roots = strings(&["lib", "app", "spec"]);
        let exts = strings(&["rb", "haml"]);
        assert_eq!(
            mapper.sources_for("spec/a/b_spec.rb", &roots, &exts),
            strings(&["lib/a/b.rb", "lib/a/b.haml", "app/a/b.rb", "app/a/b.haml"])
        );
    }

    #[test]
    fn sources_for_keeps_non_source_stems() {
        let mapper = PathMapper::for_kind(ArtifactKind::Spec);
        let roots = strings(&["app"]);
        assert_eq!(
            mapper.sources_for("spec/views/posts/post.html.haml_spec.rb", &roots, &[]),
            strings(&[
                "app/views/posts/post.html.haml",
                "app/views/posts/post.html.haml.rb",
            ])
        );
    }

    #[test]
    fn sources_for_tries_dotted_stems_with_source_extension() {
        let mapper = PathMapper::for_kind(ArtifactKind::Spec);
        let roots = strings(&["lib"]);
        let candidates = mapper.sources_for("spec/foo.bar_spec.rb", &roots, &[]);
        assert_eq!(candidates, strings(&["lib/foo.bar", "lib/foo.bar.rb"]));
        assert_eq!(mapper.artifact_for("lib/foo.bar.rb"), "spec/foo.bar_spec.rb");
    }

    #[test]
    fn sources_for_undoes_rewrites() {
        let mapper = PathMapper::new(MappingConvention::rails_test());
        let roots = strings(&["app"]);
        assert_eq!(
            mapper.sources_for("test/functional/posts_controller_test.rb", &roots, &[]),
            strings(&[
                "app/controllers/posts_controller.rb",
                "app/functional/posts_controller.rb",
            ])
        );
    }

    #[test]
    fn sources_for_keeps_literal_rewrite_target_directory() {
        let mapper = PathMapper::new(MappingConvention::rails_test());
        let roots = strings(&["lib"]);
        let candidates = mapper.sources_for("test/unit/conv_test.rb", &roots, &[]);
        assert_eq!(candidates, strings(&["lib/models/conv.rb", "lib/unit/conv.rb"]));
        for source in &candidates {
            assert_eq!(mapper.artifact_for(source), "test/unit/conv_test.rb");
        }
    }

    #[test]
    fn sources_for_ignores_foreign_artifacts() {
        let mapper = PathMapper::for_kind(ArtifactKind::Spec);
        let roots = strings(&["lib"]);
        assert!(mapper.sources_for("lib/a_spec.rb", &roots, &[]).is_empty());
        assert!(mapper.sources_for("spec/spec_helper.rb", &roots, &[]).is_empty());
        assert!(mapper.sources_for("spec/_spec.rb", &roots, &[]).is_empty());
    }
}
