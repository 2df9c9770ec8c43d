//! HTML templates with `%kiln.*%` placeholders.
//!
//! The app shell and the error page are compiled into JavaScript functions in
//! the server entry. Placeholders form a closed set per template kind, so a
//! typo like `%kiln.haed%` is a build error instead of literal text in every
//! page.
//!
//! | Placeholder            | Template | Substituted with                  |
//! |------------------------|----------|-----------------------------------|
//! | `%kiln.head%`          | app      | rendered `<head>` content         |
//! | `%kiln.body%`          | app      | rendered `<body>` content         |
//! | `%kiln.assets%`        | app      | asset base path                   |
//! | `%kiln.nonce%`         | app      | CSP nonce                         |
//! | `%kiln.env.NAME%`      | app      | public environment variable       |
//! | `%kiln.status%`        | error    | HTTP status code                  |
//! | `%kiln.error.message%` | error    | error message                     |

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::js;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateToken {
    Head,
    Body,
    Assets,
    Nonce,
    Env(String),
    Status,
    ErrorMessage,
}

impl TemplateToken {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "head" => Some(TemplateToken::Head),
            "body" => Some(TemplateToken::Body),
            "assets" => Some(TemplateToken::Assets),
            "nonce" => Some(TemplateToken::Nonce),
            "status" => Some(TemplateToken::Status),
            "error.message" => Some(TemplateToken::ErrorMessage),
            _ => name
                .strip_prefix("env.")
                .filter(|var| !var.is_empty())
                .map(|var| TemplateToken::Env(var.to_string())),
        }
    }

    fn allowed_in(&self, kind: TemplateKind) -> bool {
        match self {
            TemplateToken::Status | TemplateToken::ErrorMessage => kind == TemplateKind::Error,
            _ => kind == TemplateKind::App,
        }
    }

    /// JavaScript expression the placeholder compiles to.
    fn js_expression(&self) -> String {
        match self {
            TemplateToken::Head => "head".to_string(),
            TemplateToken::Body => "body".to_string(),
            TemplateToken::Assets => "assets".to_string(),
            TemplateToken::Nonce => "nonce".to_string(),
            TemplateToken::Env(name) => format!("env[{}]", js::string(name)),
            TemplateToken::Status => "status".to_string(),
            TemplateToken::ErrorMessage => "message".to_string(),
        }
    }
}

impl fmt::Display for TemplateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateToken::Head => f.write_str("%kiln.head%"),
            TemplateToken::Body => f.write_str("%kiln.body%"),
            TemplateToken::Assets => f.write_str("%kiln.assets%"),
            TemplateToken::Nonce => f.write_str("%kiln.nonce%"),
            TemplateToken::Env(name) => write!(f, "%kiln.env.{name}%"),
            TemplateToken::Status => f.write_str("%kiln.status%"),
            TemplateToken::ErrorMessage => f.write_str("%kiln.error.message%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// The HTML shell every page renders into.
    App,
    /// The static page served when rendering itself fails.
    Error,
}

impl TemplateKind {
    fn parameters(self) -> &'static str {
        match self {
            TemplateKind::App => "{ head, body, assets, nonce, env }",
            TemplateKind::Error => "{ status, message }",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder %kiln.{0}%")]
    UnknownToken(String),

    #[error("missing required placeholder {0}")]
    MissingToken(TemplateToken),

    #[error("placeholder {0} appears more than once")]
    DuplicateToken(TemplateToken),

    #[error("%kiln.env.{name}% is not public: names must start with \"{prefix}\"")]
    PrivateEnv { name: String, prefix: String },
}

impl TemplateError {
    pub fn help(&self) -> Option<String> {
        match self {
            TemplateError::UnknownToken(_) => Some(
                "App templates accept head, body, assets, nonce and env.NAME; error templates accept status and error.message"
                    .to_string(),
            ),
            TemplateError::MissingToken(token) => {
                Some(format!("Add {token} to the app template"))
            }
            TemplateError::DuplicateToken(token) => {
                Some(format!("Remove all but one occurrence of {token}"))
            }
            TemplateError::PrivateEnv { prefix, .. } => Some(format!(
                "Only variables starting with \"{prefix}\" can be rendered into HTML"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(TemplateToken),
}

/// A parsed template: literal text interleaved with placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    kind: TemplateKind,
    segments: Vec<Segment>,
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%kiln\.([A-Za-z0-9_.]+)%").expect("placeholder pattern is valid"));

impl Template {
    /// Parse `source`, checking every placeholder against `kind`.
    ///
    /// `public_prefix` is the prefix env placeholders must carry.
    pub fn parse(kind: TemplateKind, source: &str, public_prefix: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut last = 0;

        for captures in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            let token = TemplateToken::parse(name.as_str())
                .filter(|token| token.allowed_in(kind))
                .ok_or_else(|| TemplateError::UnknownToken(name.as_str().to_string()))?;

            if let TemplateToken::Env(var) = &token {
                if !var.starts_with(public_prefix) {
                    return Err(TemplateError::PrivateEnv {
                        name: var.clone(),
                        prefix: public_prefix.to_string(),
                    });
                }
            }

            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Token(token));
            last = whole.end();
        }

        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        let template = Self { kind, segments };
        if kind == TemplateKind::App {
            for required in [TemplateToken::Head, TemplateToken::Body] {
                match template.count(&required) {
                    0 => return Err(TemplateError::MissingToken(required)),
                    1 => {}
                    _ => return Err(TemplateError::DuplicateToken(required)),
                }
            }
        }

        Ok(template)
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn contains(&self, token: &TemplateToken) -> bool {
        self.count(token) > 0
    }

    fn count(&self, token: &TemplateToken) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Token(t) if t == token))
            .count()
    }

    /// The template as a JavaScript arrow function taking the kind's
    /// substitution values.
    pub fn to_js_function(&self) -> String {
        let body = if self.segments.is_empty() {
            "\"\"".to_string()
        } else {
            self.segments
                .iter()
                .map(|segment| match segment {
                    Segment::Literal(text) => js::string(text),
                    Segment::Token(token) => token.js_expression(),
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        format!("({}) => {}", self.kind.parameters(), body)
    }
}
