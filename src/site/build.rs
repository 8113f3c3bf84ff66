//! Site building orchestration.
//!
//! Build phases:
//! - **Clean** - Remove destination and render cache (`--clean`)
//! - **Read** - Discover sources, localize documents, register resources
//! - **Check** - Fail on URLs claimed twice
//! - **Render** - Parallel page rendering plus layouts, backed by the disk cache
//! - **Write** - Rendered resources and static files
//! - **Finalize** - Cache persistence, failure report

use std::any::TypeId;
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde_json::Value;

use crate::address::check_conflicts;
use crate::cache::{ContentHash, ContentHasher, RenderCache, clear_cache_dir, hash_dir};
use crate::component::{MAX_RENDER_DEPTH, ViewContext, find_in_dirs, render_source, template_data};
use crate::core::{BuildScope, PipelineError, PipelineResult};
use crate::logger::{ProgressLine, error_chain};
use crate::resource::{JsonMap, Resource, ResourceId, parse_front_matter};
use crate::utils::plural::plural_count;
use crate::{debug, log};

use super::write::{copy_static, write_resource};
use super::{Site, SiteContext, discover};

/// Layout value that disables the layout chain.
const NO_LAYOUT: &str = "none";

/// Template owner of documents rendered as pages.
enum Page {}

/// Template owner of `_layouts` templates.
enum Layout {}

/// Counts of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub resources: usize,
    pub static_files: usize,
    pub drafts_skipped: usize,
    pub cache_hits: usize,
}

impl Site {
    /// Build the site into the destination directory.
    ///
    /// Pipeline: clean -> read -> check -> render -> write -> finalize.
    /// A resource that fails to render is reported and not written; the build
    /// fails after every other resource was written.
    pub fn build(&mut self) -> Result<BuildReport> {
        let config = Arc::clone(&self.config);
        if config.clean {
            clean(&config.destination, &self.cache_dir)?;
        }

        let drafts_skipped = self.read()?;
        if drafts_skipped > 0 {
            log!("build"; "{} skipped", plural_count(drafts_skipped, "draft"));
        }
        self.check_urls()?;

        let context = Arc::new(self.context());
        let _scope = BuildScope::enter(Arc::clone(&context));

        let cache = if config.disable_disk_cache {
            RenderCache::disabled()
        } else {
            RenderCache::open(&self.cache_dir, fingerprint(&context))
        };

        let total = self.resources().count();
        let progress = ProgressLine::new(&[
            ("render", total),
            ("write", total),
            ("static", self.static_files.len()),
        ]);

        let failures = self.render_all(&context, &cache, &progress);
        let written = self.write_all(&progress)?;
        progress.finish();

        let report = BuildReport {
            resources: written,
            static_files: self.static_files.len(),
            drafts_skipped,
            cache_hits: cache.hits(),
        };
        if let Err(e) = cache.persist() {
            debug!("build"; "failed to persist render cache: {}", e);
        }

        if !failures.is_empty() {
            for (id, error) in &failures {
                log!("error"; "{}: {}", id, error_chain(error));
            }
            bail!("{} failed to render", plural_count(failures.len(), "resource"));
        }

        log!(
            "build";
            "done: {}, {} ({} cached)",
            plural_count(report.resources, "resource"),
            plural_count(report.static_files, "static file"),
            report.cache_hits
        );
        Ok(report)
    }

    /// Discover sources and register one resource per (document, locale).
    ///
    /// Returns the number of drafts left out.
    fn read(&mut self) -> Result<usize> {
        for collection in &mut self.collections {
            collection.clear();
        }

        let discovered = discover(&self.config)
            .with_context(|| format!("failed to read {}", self.config.source.display()))?;
        self.static_files = discovered.static_files;
        self.data = discovered.data;

        let mut drafts_skipped = 0;
        for document in discovered.documents {
            if document.meta().is_draft() && !self.config.drafts {
                drafts_skipped += 1;
                continue;
            }
            let document = Arc::new(document);
            let resources = self.resolver.localize(Arc::clone(&document), &self.config.base_path)?;
            let collection = self
                .collection_mut(document.collection())
                .with_context(|| format!("unknown collection `{}`", document.collection()))?;
            for resource in resources {
                collection.register(resource)?;
            }
        }
        Ok(drafts_skipped)
    }

    /// Fail when two resources or static files land on the same URL.
    fn check_urls(&self) -> PipelineResult<()> {
        let base_path = &self.config.base_path;
        let resources = self
            .resources()
            .map(|r| (r.relative_url().clone(), r.id().to_string()));
        let statics = self
            .static_files
            .iter()
            .map(|f| (f.url(base_path), f.relative_path.clone()));
        check_conflicts(resources.chain(statics))
    }

    /// Render every resource in parallel and store the outputs in order.
    fn render_all(
        &mut self,
        context: &Arc<SiteContext>,
        cache: &RenderCache,
        progress: &ProgressLine,
    ) -> Vec<(ResourceId, PipelineError)> {
        let rendered: Vec<(ResourceId, PipelineResult<String>)> = self
            .resources()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|resource| {
                let key = cache.key(resource);
                let output = match cache.get(resource, key) {
                    Some(output) => Ok(output),
                    None => render_resource(context, resource).inspect(|output| {
                        cache.put(resource, key, output);
                    }),
                };
                progress.inc("render");
                (resource.id().clone(), output)
            })
            .collect();

        let mut failures = Vec::new();
        for (id, output) in rendered {
            let stored = output.and_then(|output| {
                self.collections
                    .iter_mut()
                    .find_map(|c| c.get_mut(&id))
                    .map_or(Ok(()), |resource| resource.set_output(output))
            });
            if let Err(error) = stored {
                failures.push((id, error));
            }
        }
        failures
    }

    /// Write rendered resources and copy static files. Returns resources written.
    fn write_all(&mut self, progress: &ProgressLine) -> Result<usize> {
        let destination = self.config.destination.clone();
        let mut written = 0;
        for resource in self.collections.iter_mut().flat_map(|c| c.iter_mut()) {
            if write_resource(resource, &destination)?.is_some() {
                written += 1;
            }
            progress.inc("write");
        }

        let base_path = &self.config.base_path;
        self.static_files.par_iter().try_for_each(|file| {
            copy_static(file, &destination, base_path)?;
            progress.inc("static");
            Ok::<_, PipelineError>(())
        })?;
        Ok(written)
    }
}

/// Render a resource's body with its engine, then wrap it in its layouts.
fn render_resource(context: &Arc<SiteContext>, resource: &Resource) -> PipelineResult<String> {
    let document = resource.document();
    let identity = resource.id().to_string();
    let page = match resource.to_value() {
        Value::Object(page) => page,
        _ => JsonMap::new(),
    };
    let view = ViewContext::for_site(Arc::clone(context))
        .with_locale(resource.locale().clone())
        .with_page(page);

    let mut data = template_data(&view, context);
    let mut output = render_source(
        &view,
        TypeId::of::<Page>(),
        &identity,
        &document.extension(),
        document.body(),
        &data,
    )?;

    let mut layout = resource.meta().layout.clone();
    let mut depth = 0;
    while let Some(name) = layout.take().filter(|n| !n.is_empty() && n != NO_LAYOUT) {
        if depth >= MAX_RENDER_DEPTH {
            return Err(PipelineError::RenderDepth {
                identity: format!("{identity} (layout {name})"),
                limit: MAX_RENDER_DEPTH,
            });
        }
        let layout_identity = format!("layout {name}");
        let path = find_in_dirs(
            TypeId::of::<Layout>(),
            &layout_identity,
            context.layout_dirs(),
            &name,
        )?;
        let text = context.read_source(&path)?;
        let (front_matter, body) = parse_front_matter(&path.display().to_string(), &text)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        data.insert("content".into(), Value::String(output));
        data.insert("layout".into(), Value::Object(front_matter.clone()));
        output = render_source(
            &view,
            TypeId::of::<Layout>(),
            &layout_identity,
            extension,
            body,
            &data,
        )?;

        layout = front_matter
            .get("layout")
            .and_then(Value::as_str)
            .map(str::to_string);
        depth += 1;
    }
    Ok(output)
}

/// Hash of everything besides the resource itself that shapes rendered output.
fn fingerprint(context: &SiteContext) -> ContentHash {
    let mut hasher = ContentHasher::new();
    hasher
        .update(env!("CARGO_PKG_VERSION"))
        .update(serde_json::to_string(context.config.as_ref()).unwrap_or_default())
        .update(serde_json::to_string(context.template_data()).unwrap_or_default());
    let dirs = context
        .layout_dirs()
        .iter()
        .chain(context.partial_dirs())
        .chain(context.component_dirs());
    for dir in dirs {
        hasher
            .update(dir.to_string_lossy().as_bytes())
            .update_hash(hash_dir(dir));
    }
    hasher.finish()
}

fn clean(destination: &std::path::Path, cache_dir: &std::path::Path) -> Result<()> {
    if destination.exists() {
        fs::remove_dir_all(destination).with_context(|| {
            format!("failed to clear destination: {}", destination.display())
        })?;
    }
    clear_cache_dir(cache_dir)
        .with_context(|| format!("failed to clear cache: {}", cache_dir.display()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentTemplate};
    use crate::config::{SiteConfig, test_site_config};
    use crate::core::is_build_active;
    use serde_json::json;
    use serial_test::serial;
    use std::path::Path;
    use tempfile::TempDir;

    const LOCALES: &str = r#"
[[locales]]
tag = "en"
default = true

[[locales]]
tag = "fr"
"#;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project(config: &str, files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            write(dir.path(), path, content);
        }
        let config = test_site_config(dir.path(), config);
        (dir, config)
    }

    fn read(dir: &TempDir, path: &str) -> String {
        fs::read_to_string(dir.path().join("output").join(path)).unwrap()
    }

    #[test]
    #[serial(current_site)]
    fn test_build_locales_and_layouts() {
        let (dir, config) = project(
            LOCALES,
            &[
                ("src/_layouts/default.tera", "<html lang=\"{{ locale }}\">{{ content | safe }}</html>"),
                ("src/about.en.md", "---\nlayout: default\n---\n# About"),
                ("src/about.fr.md", "---\nlayout: default\n---\n# À propos"),
            ],
        );
        let mut site = Site::new(&config);
        let report = site.build().unwrap();

        assert_eq!(report.resources, 2);
        assert_eq!(
            read(&dir, "about/index.html"),
            "<html lang=\"en\"><h1>About</h1>\n</html>"
        );
        assert_eq!(
            read(&dir, "fr/about/index.html"),
            "<html lang=\"fr\"><h1>À propos</h1>\n</html>"
        );
        assert!(site.resources().all(Resource::is_written));
        assert!(!is_build_active());
    }

    #[test]
    #[serial(current_site)]
    fn test_localized_url_in_templates() {
        let (dir, config) = project(
            LOCALES,
            &[(
                "src/switch.html",
                "---\n---\n<a href=\"{{ localized_url(path='/about/', locale='fr') }}\">fr</a>",
            )],
        );
        Site::new(&config).build().unwrap();
        assert_eq!(
            read(&dir, "switch/index.html"),
            "<a href=\"/fr/about/\">fr</a>"
        );
    }

    #[test]
    #[serial(current_site)]
    fn test_nested_layouts_see_layout_front_matter() {
        let (dir, config) = project(
            "",
            &[
                ("src/_layouts/base.tera", "[{{ content | safe }}]"),
                (
                    "src/_layouts/post.tera",
                    "---\nlayout: base\nkind: article\n---\n{{ layout.kind }}:{{ content | safe }}",
                ),
                ("src/note.html", "---\nlayout: post\n---\nhello"),
            ],
        );
        Site::new(&config).build().unwrap();
        assert_eq!(read(&dir, "note/index.html"), "[article:hello]");
    }

    #[test]
    #[serial(current_site)]
    fn test_base_path_helpers_and_static_files() {
        let (dir, config) = project(
            "base_path = \"/docs\"\nurl = \"https://example.org\"",
            &[
                (
                    "src/index.html",
                    "---\ntitle: Home & Co\n---\n<a href=\"{{ relative_url(path='/about/') }}\">{{ page.title }}</a> {{ absolute_url(path='/') }}",
                ),
                ("src/img/logo.png", "png"),
            ],
        );
        let report = Site::new(&config).build().unwrap();

        assert_eq!(report.static_files, 1);
        assert_eq!(
            read(&dir, "docs/index.html"),
            "<a href=\"/docs/about/\">Home &amp; Co</a> https://example.org/docs/"
        );
        assert_eq!(read(&dir, "docs/img/logo.png"), "png");
    }

    #[test]
    #[serial(current_site)]
    fn test_collections_and_data_in_templates() {
        let (dir, config) = project(
            "",
            &[
                ("src/_data/nav.yml", "- Home\n- Blog\n"),
                ("src/_posts/2024-06-15-hello.md", "---\ntitle: Hello\n---\nHi"),
                (
                    "src/blog.html",
                    "---\n---\n{% for post in site.collections.posts %}{{ post.url }}{% endfor %}|{{ site.data.nav | join(sep=',') }}",
                ),
            ],
        );
        let mut site = Site::new(&config);
        site.build().unwrap();

        assert_eq!(read(&dir, "blog/index.html"), "/2024/06/15/hello/|Home,Blog");
        assert_eq!(site.collection("posts").unwrap().len(), 1);
        assert_eq!(site.data()["nav"][0], "Home");
    }

    #[test]
    #[serial(current_site)]
    fn test_drafts_skipped_unless_enabled() {
        let files = [
            ("src/idea.md", "---\ndraft: true\n---\nidea"),
            ("src/hidden.md", "---\npublished: false\n---\nhidden"),
            ("src/about.md", "about"),
        ];
        let (dir, config) = project("", &files);
        let report = Site::new(&config).build().unwrap();
        assert_eq!(report.drafts_skipped, 2);
        assert_eq!(report.resources, 1);
        assert!(!dir.path().join("output/idea/index.html").exists());

        let (dir, config) = project("drafts = true", &files);
        let report = Site::new(&config).build().unwrap();
        assert_eq!(report.drafts_skipped, 0);
        assert!(dir.path().join("output/idea/index.html").exists());
    }

    #[test]
    #[serial(current_site)]
    fn test_conflicting_urls_abort_before_writing() {
        let (dir, config) = project(
            "",
            &[("src/about.md", "one"), ("src/about/index.md", "two")],
        );
        let err = Site::new(&config).build().unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("/about/"), "{message}");
        assert!(message.contains("about.md [en]"), "{message}");
        assert!(!dir.path().join("output").exists());
    }

    #[test]
    #[serial(current_site)]
    fn test_static_file_conflicts_with_resource() {
        let (_dir, config) = project(
            "",
            &[("src/about.md", "page"), ("src/about/index.html", "<p>static</p>")],
        );
        assert!(Site::new(&config).build().is_err());
    }

    #[test]
    #[serial(current_site)]
    fn test_failed_resource_is_not_written() {
        let (dir, config) = project(
            "",
            &[
                ("src/good.html", "---\n---\nok"),
                ("src/bad.html", "---\n---\n{{ missing.value }}"),
            ],
        );
        let mut site = Site::new(&config);
        let err = site.build().unwrap_err();

        assert!(err.to_string().contains("1 resource failed"));
        assert_eq!(read(&dir, "good/index.html"), "ok");
        assert!(!dir.path().join("output/bad/index.html").exists());
        let bad = site.resources().find(|r| r.id().relative_path.as_ref() == "bad.html");
        assert!(bad.is_some_and(|r| r.output().is_none() && !r.is_written()));
    }

    #[test]
    #[serial(current_site)]
    fn test_components_and_partials_from_templates() {
        struct Badge {
            label: String,
        }

        impl Component for Badge {
            fn name(&self) -> &str {
                "Badge"
            }

            fn locals(&self) -> JsonMap {
                let mut locals = JsonMap::new();
                locals.insert("label".into(), json!(self.label.to_uppercase()));
                locals
            }
        }

        let (dir, config) = project(
            "",
            &[
                ("src/_components/badge.tera", "<b>{{ label }}</b>"),
                ("src/_components/card.tera", "<div>{{ title }}</div>"),
                ("src/_partials/nav.tera", "<nav>{{ page.url }}</nav>"),
                (
                    "src/index.html",
                    "---\n---\n{{ partial(name='nav') }}{{ component(name='card', title='Hi') }}{{ component(name='badge', label='new') }}",
                ),
            ],
        );
        let mut site = Site::new(&config);
        site.components_mut().register_named(
            "badge",
            ComponentTemplate::named("badge"),
            |args: JsonMap| Badge {
                label: args
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
        );
        site.build().unwrap();

        assert_eq!(
            read(&dir, "index.html"),
            "<nav>/</nav><div>Hi</div><b>NEW</b>"
        );
    }

    #[test]
    #[serial(current_site)]
    fn test_disk_cache_skips_rendering() {
        let (dir, config) = project("", &[("src/about.md", "# About")]);
        let report = Site::new(&config).build().unwrap();
        assert_eq!(report.cache_hits, 0);

        // Replace the cached body: a hit must serve it instead of re-rendering
        let render_dir = config.cache_dir.join(crate::cache::RENDER_DIR);
        let cached: Vec<_> = fs::read_dir(&render_dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
            .collect();
        assert_eq!(cached.len(), 1);
        fs::write(&cached[0], "from cache").unwrap();

        let report = Site::new(&config).build().unwrap();
        assert_eq!(report.cache_hits, 1);
        assert_eq!(read(&dir, "about/index.html"), "from cache");

        // Source changes miss
        write(dir.path(), "src/about.md", "# Changed");
        let report = Site::new(&config).build().unwrap();
        assert_eq!(report.cache_hits, 0);
        assert_eq!(read(&dir, "about/index.html"), "<h1>Changed</h1>\n");
    }

    #[test]
    #[serial(current_site)]
    fn test_disable_disk_cache() {
        let (dir, config) = project("disable_disk_cache = true", &[("src/about.md", "# About")]);
        Site::new(&config).build().unwrap();
        let report = Site::new(&config).build().unwrap();

        assert_eq!(report.cache_hits, 0);
        assert!(!config.cache_dir.exists());
        assert_eq!(read(&dir, "about/index.html"), "<h1>About</h1>\n");
    }

    #[test]
    #[serial(current_site)]
    fn test_clean_removes_stale_output() {
        let (dir, mut config) = project("", &[("src/about.md", "# About")]);
        write(dir.path(), "output/stale.html", "old");

        config.clean = true;
        Site::new(&config).build().unwrap();
        assert!(!dir.path().join("output/stale.html").exists());
        assert!(dir.path().join("output/about/index.html").exists());
    }

    #[test]
    #[serial(current_site)]
    fn test_rebuild_replaces_resources() {
        let (dir, config) = project("", &[("src/a.md", "a"), ("src/b.md", "b")]);
        let mut site = Site::new(&config);
        site.build().unwrap();
        assert_eq!(site.resources().count(), 2);

        fs::remove_file(dir.path().join("src/b.md")).unwrap();
        site.build().unwrap();
        let paths: Vec<_> = site
            .resources()
            .map(|r| r.id().relative_path.to_string())
            .collect();
        assert_eq!(paths, ["a.md"]);
    }

    #[test]
    fn test_fingerprint_tracks_templates() {
        let (dir, config) = project("", &[("src/_layouts/default.tera", "v1")]);
        let context = SiteContext::new(Arc::new(config));
        let before = fingerprint(&context);
        assert_eq!(before, fingerprint(&context));

        write(dir.path(), "src/_layouts/default.tera", "v2");
        assert_ne!(before, fingerprint(&context));
    }
}
