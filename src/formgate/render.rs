//! Template loading and per-request render mode resolution.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::convert::Infallible;

pub const BASE: &str = "base.html";
pub const INDEX: &str = "index.html";
pub const LOGIN: &str = "login.html";
pub const SIGNUP: &str = "signup.html";
pub const FORGOT_PASSWORD: &str = "forgotpassword.html";
pub const MUSTER: &str = "muster.html";
pub const SNIPPETS: &str = "snippets.html";
pub const UNAUTHENTICATED: &str = "unauthenticated.html";
pub const CALC: &str = "calc.html";

pub const CONTENT_BLOCK: &str = "content";
pub const LOGIN_SUCCESS_BLOCK: &str = "loginsuccess";
pub const SIGNUP_SUCCESS_BLOCK: &str = "signupsuccess";
pub const FAILED_BLOCK: &str = "failed";

const TEMPLATES: &[(&str, &str)] = &[
    (BASE, include_str!("../../templates/base.html")),
    (INDEX, include_str!("../../templates/index.html")),
    (LOGIN, include_str!("../../templates/login.html")),
    (SIGNUP, include_str!("../../templates/signup.html")),
    (
        FORGOT_PASSWORD,
        include_str!("../../templates/forgotpassword.html"),
    ),
    (MUSTER, include_str!("../../templates/muster.html")),
    (SNIPPETS, include_str!("../../templates/snippets.html")),
    (
        UNAUTHENTICATED,
        include_str!("../../templates/unauthenticated.html"),
    ),
    (CALC, include_str!("../../templates/calc.html")),
];

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";
const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// How much of a template a request asked for.
///
/// Resolved once per request; handlers never look at the headers directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Full document including the layout.
    Page,
    /// Only the blocks that change between views. `datastar` is set when
    /// the request came from Datastar and can take an event stream.
    Fragment { datastar: bool },
}

impl RenderMode {
    /// Datastar marks its requests with `datastar-request: true`; classic
    /// XHR clients send `X-Requested-With: XMLHttpRequest`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let datastar = headers
            .get(DATASTAR_REQUEST_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        let xhr = headers
            .get(REQUESTED_WITH_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == "XMLHttpRequest");

        if datastar || xhr {
            Self::Fragment { datastar }
        } else {
            Self::Page
        }
    }

    #[must_use]
    pub const fn is_fragment(self) -> bool {
        matches!(self, Self::Fragment { .. })
    }

    /// A Datastar fragment request; plain XHR clients get HTML instead.
    #[must_use]
    pub const fn accepts_stream(self) -> bool {
        matches!(self, Self::Fragment { datastar: true })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RenderMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Compiled template set, embedded at build time.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Load every embedded template.
    /// # Errors
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    /// Render a whole template, layout included.
    /// # Errors
    /// Returns an error if the template is unknown or fails to render.
    pub fn render_page<C: Serialize>(&self, name: &str, ctx: C) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    /// Render a single named block of a template.
    /// # Errors
    /// Returns an error if the template or block is unknown or fails to render.
    pub fn render_block<C: Serialize>(
        &self,
        name: &str,
        block: &str,
        ctx: C,
    ) -> Result<String, minijinja::Error> {
        self.render_blocks(name, &[block], ctx)
    }

    /// Render several blocks of one template and concatenate them in order.
    /// # Errors
    /// Returns an error if the template or any block is unknown or fails to render.
    pub fn render_blocks<C: Serialize>(
        &self,
        name: &str,
        blocks: &[&str],
        ctx: C,
    ) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(name)?;
        let mut state = template.eval_to_state(ctx)?;

        let mut rendered = String::new();
        for block in blocks {
            rendered.push_str(&state.render_block(block)?);
        }

        Ok(rendered)
    }

    /// Render `name` as a page or as its blocks, depending on `mode`.
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn render<C: Serialize>(
        &self,
        mode: RenderMode,
        name: &str,
        blocks: &[&str],
        ctx: C,
    ) -> Result<String, minijinja::Error> {
        match mode {
            RenderMode::Page => self.render_page(name, ctx),
            RenderMode::Fragment { .. } => self.render_blocks(name, blocks, ctx),
        }
    }
}
