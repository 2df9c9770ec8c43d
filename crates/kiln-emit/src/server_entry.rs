//! `index.js`: the server bootstrap module.
//!
//! The runtime imports this module once at startup. It exposes the path
//! configuration (rewritable through `override`), the deployment version,
//! the rendering options including both compiled templates, and
//! `get_hooks()` which loads the app's server hooks on demand.

use std::path::Path;
use std::sync::Arc;

use kiln_config::KilnConfig;
use kiln_graph::Runtime;
use tracing::debug;

use crate::template::{Template, TemplateKind, TemplateToken};
use crate::{Error, Result, js};

/// Output path of the server entry relative to the server output directory.
pub const SERVER_ENTRY_MODULE: &str = "index.js";

/// Error page used when the project has no error template.
pub const DEFAULT_ERROR_PAGE: &str = r#"<!doctype html>
<html lang="en">
	<head>
		<meta charset="utf-8" />
		<title>%kiln.error.message%</title>
	</head>
	<body>
		<h1>%kiln.status%</h1>
		<p>%kiln.error.message%</p>
	</body>
</html>
"#;

/// The app shell and error page, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub app: Template,
    pub error: Template,
}

impl Templates {
    /// Read and parse both templates from the paths in `config.files`.
    ///
    /// A missing error template falls back to [`DEFAULT_ERROR_PAGE`]; a
    /// missing app template is an error.
    pub fn load(config: &KilnConfig, runtime: &Arc<dyn Runtime>, cwd: &Path) -> Result<Self> {
        let prefix = &config.env.public_prefix;

        let app_path = cwd.join(&config.files.app_template);
        let app_source =
            runtime
                .read_to_string(&app_path)
                .map_err(|source| Error::TemplateNotFound {
                    path: app_path.clone(),
                    source,
                })?;
        let app = Template::parse(TemplateKind::App, &app_source, prefix).map_err(|source| {
            Error::Template {
                path: app_path.clone(),
                source,
            }
        })?;

        let error_path = cwd.join(&config.files.error_template);
        let error_source = match runtime.read_to_string(&error_path) {
            Ok(source) => source,
            Err(err) if err.is_not_found() => {
                debug!(path = %error_path.display(), "no error template, using default");
                DEFAULT_ERROR_PAGE.to_string()
            }
            Err(source) => {
                return Err(Error::Read {
                    path: error_path,
                    source,
                });
            }
        };
        let error = Template::parse(TemplateKind::Error, &error_source, prefix)
            .map_err(|source| Error::Template {
                path: error_path.clone(),
                source,
            })?;

        Ok(Self { app, error })
    }
}

/// Short content hash of the version token, stable across builds of the
/// same version.
pub fn version_hash(version: &str) -> String {
    blake3::hash(version.as_bytes()).to_hex().as_str()[..16].to_string()
}

/// Render the server entry module.
///
/// `hooks` is the import specifier of the compiled server hooks module,
/// relative to the server output directory.
pub fn emit_server_entry(
    config: &KilnConfig,
    hooks: Option<&str>,
    templates: &Templates,
) -> Result<String> {
    let paths = &config.paths;
    let assets = if paths.assets.is_empty() {
        &paths.base
    } else {
        &paths.assets
    };
    let hash = version_hash(&config.version.name);

    let get_hooks = match hooks {
        Some(specifier) => format!(
            "\treturn {{\n\t\t...(await import({}))\n\t}};",
            js::string(specifier)
        ),
        None => "\treturn {};".to_string(),
    };

    Ok(format!(
        r#"export const paths = {{
	base: {base},
	assets: {assets},
	relative: {relative}
}};

export let building = false;
export let prerendering = false;
export let prerendered = {{}};
export let read = null;

export const version = {version};

export const options = {{
	app_template_contains_nonce: {contains_nonce},
	csp: {csp},
	csrf_check_origin: {check_origin},
	csrf_trusted_origins: {trusted_origins},
	env_public_prefix: {public_prefix},
	env_private_prefix: {private_prefix},
	service_worker: {service_worker},
	templates: {{
		app: {app},
		error: {error}
	}},
	version_hash: {hash}
}};

export async function get_hooks() {{
{get_hooks}
}}

export function override(settings) {{
	paths.base = settings.paths.base;
	paths.assets = settings.paths.assets || settings.paths.base;
	building = settings.building ?? false;
	prerendering = settings.prerendering ?? false;
	prerendered = settings.prerendered ?? {{}};
	read = settings.read ?? null;
}}
"#,
        base = js::string(&paths.base),
        assets = js::string(assets),
        relative = paths.relative,
        version = js::string(&config.version.name),
        contains_nonce = templates.app.contains(&TemplateToken::Nonce),
        csp = serde_json::to_string(&config.csp)?,
        check_origin = config.csrf.check_origin,
        trusted_origins = js::string_array(&config.csrf.trusted_origins),
        public_prefix = js::string(&config.env.public_prefix),
        private_prefix = js::string(&config.env.private_prefix),
        service_worker = config.service_worker,
        app = templates.app.to_js_function(),
        error = templates.error.to_js_function(),
        hash = js::string(&hash),
    ))
}

#[cfg(test)]
mod tests {
    use kiln_graph::TestRuntime;

    use super::*;

    const APP: &str = "<head>%kiln.head%</head><body>%kiln.body%</body>";

    fn config() -> KilnConfig {
        let mut config = KilnConfig::default();
        config.version.name = "1.0.0".to_string();
        config
    }

    fn templates(app: &str) -> Templates {
        Templates {
            app: Template::parse(TemplateKind::App, app, "PUBLIC_").unwrap(),
            error: Template::parse(TemplateKind::Error, DEFAULT_ERROR_PAGE, "PUBLIC_").unwrap(),
        }
    }

    #[test]
    fn test_version_hash_is_stable() {
        let hash = version_hash("1.0.0");
        assert_eq!(hash.len(), 16);
        assert_eq!(hash, version_hash("1.0.0"));
        assert_ne!(hash, version_hash("1.0.1"));
    }

    #[test]
    fn test_entry_without_hooks() {
        let module = emit_server_entry(&config(), None, &templates(APP)).unwrap();

        assert!(module.contains("\tbase: \"\",\n\tassets: \"\",\n\trelative: true\n"));
        assert!(module.contains("export const version = \"1.0.0\";"));
        assert!(module.contains("app_template_contains_nonce: false,"));
        assert!(module.contains("csrf_check_origin: true,"));
        assert!(module.contains("env_public_prefix: \"PUBLIC_\","));
        assert!(module.contains(&format!("version_hash: \"{}\"", version_hash("1.0.0"))));
        assert!(module.contains("export async function get_hooks() {\n\treturn {};\n}"));
        assert!(module.contains("\tservice_worker: false,\n\ttemplates: {"));
        assert!(!module.contains("hooks: null"));
        assert!(module.contains("export function override(settings) {"));
        assert!(module.contains(
            r#"app: ({ head, body, assets, nonce, env }) => "<head>" + head + "</head><body>" + body + "</body>""#
        ));
    }

    #[test]
    fn test_entry_with_hooks_and_nonce() {
        let mut config = config();
        config.paths.base = "/docs".to_string();
        config.csrf.trusted_origins = vec!["https://example.com".to_string()];
        config.service_worker = true;
        let app = r#"<script nonce="%kiln.nonce%"></script>%kiln.head%%kiln.body%"#;

        let module =
            emit_server_entry(&config, Some("./entries/hooks.server.js"), &templates(app)).unwrap();

        assert!(module.contains("\tbase: \"/docs\",\n\tassets: \"/docs\","));
        assert!(module.contains("app_template_contains_nonce: true,"));
        assert!(module.contains(r#"csrf_trusted_origins: ["https://example.com"],"#));
        assert!(module.contains("service_worker: true,"));
        assert!(module.contains(r#"...(await import("./entries/hooks.server.js"))"#));
    }

    #[test]
    fn test_csp_is_embedded_as_json() {
        let mut config = config();
        config
            .csp
            .directives
            .insert("script-src".to_string(), vec!["self".to_string()]);

        let module = emit_server_entry(&config, None, &templates(APP)).unwrap();

        assert!(module.contains(
            r#"csp: {"mode":"auto","directives":{"script-src":["self"]},"report_only":{}},"#
        ));
    }

    #[test]
    fn test_load_templates_with_default_error_page() {
        let runtime: Arc<dyn Runtime> = Arc::new(TestRuntime::new("/app").with_file("src/app.html", APP));

        let templates = Templates::load(&config(), &runtime, Path::new("/app")).unwrap();

        assert_eq!(templates.app.kind(), TemplateKind::App);
        assert!(templates.error.contains(&TemplateToken::Status));
    }

    #[test]
    fn test_load_templates_requires_app_template() {
        let runtime: Arc<dyn Runtime> = Arc::new(TestRuntime::new("/app"));

        let err = Templates::load(&config(), &runtime, Path::new("/app")).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { ref path, .. } if path == Path::new("/app/src/app.html")));
    }

    #[test]
    fn test_load_templates_reports_bad_placeholders() {
        let runtime: Arc<dyn Runtime> = Arc::new(
            TestRuntime::new("/app")
                .with_file("src/app.html", APP)
                .with_file("src/error.html", "%kiln.head%"),
        );

        let err = Templates::load(&config(), &runtime, Path::new("/app")).unwrap_err();
        assert!(matches!(err, Error::Template { ref path, .. } if path == Path::new("/app/src/error.html")));
    }
}
