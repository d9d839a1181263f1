//! The table of API endpoints, addressed by dot-separated keys

use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock},
};

use reqwest::Url;

use crate::http::HttpMethod;

/// The path prefix shared by all endpoints of the v0.1 API
pub const API_ROOT: &str = "/ghost/api/v0.1/";

/// A single API endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
    key: String,
    path: String,
    method: HttpMethod,
    private: bool,
    variables: Vec<String>,
}

impl EndpointDescriptor {
    /// An endpoint authenticated with the client ID and secret in the body
    pub fn public(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            path: path.into(),
            method,
            private: false,
            variables: Vec::new(),
        }
    }

    /// An endpoint authenticated with a bearer access token
    pub fn private(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            private: true,
            ..Self::public(method, path)
        }
    }

    /// Declares the `{variable}` placeholders of the path template, in order
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// The dot-separated key this endpoint is registered under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The path template, relative to the blog root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The HTTP method used to call the endpoint
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Whether the endpoint requires a bearer access token
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// The names of the path variables to substitute
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Resolves the path template against the blog's base URL
    ///
    /// Braces in the template come back percent-encoded.
    pub fn url(&self, base: &str) -> Option<Url> {
        if self.path.is_empty() {
            return None;
        }
        Url::parse(base).ok()?.join(&self.path).ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Group(BTreeMap<String, Node>),
    Endpoint(EndpointDescriptor),
}

/// An immutable tree of endpoints
///
/// Build it once and share it between clients with [`Arc`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointTable {
    root: BTreeMap<String, Node>,
}

impl EndpointTable {
    /// Constructs an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an endpoint under a dot-separated key
    ///
    /// Anything already registered at `key` is replaced.
    pub fn with(mut self, key: &str, mut descriptor: EndpointDescriptor) -> Self {
        descriptor.key = key.to_owned();

        let mut segments = key.split('.').peekable();
        let mut level = &mut self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                level.insert(segment.to_owned(), Node::Endpoint(descriptor));
                break;
            }

            let node = level
                .entry(segment.to_owned())
                .or_insert_with(|| Node::Group(BTreeMap::new()));
            if let Node::Endpoint(_) = node {
                *node = Node::Group(BTreeMap::new());
            }
            level = match node {
                Node::Group(children) => children,
                Node::Endpoint(_) => unreachable!("replaced with a group above"),
            };
        }

        self
    }

    /// Looks up the endpoint registered under `key`
    ///
    /// Returns `None` when any segment is missing or the key names a group
    /// rather than an endpoint.
    pub fn endpoint(&self, key: &str) -> Option<&EndpointDescriptor> {
        let mut segments = key.split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                Node::Group(children) => children.get(segment)?,
                Node::Endpoint(_) => return None,
            };
        }

        match node {
            Node::Endpoint(descriptor) if !descriptor.path.is_empty() => Some(descriptor),
            _ => None,
        }
    }

    /// The endpoints of the Ghost v0.1 API
    pub fn ghost_v0_1() -> Self {
        use HttpMethod::*;

        let api = |path: &str| format!("{API_ROOT}{path}");

        Self::new()
            .with(
                "token.create",
                EndpointDescriptor::public(Post, api("authentication/token")),
            )
            .with(
                "token.destroy",
                EndpointDescriptor::public(Post, api("authentication/revoke")),
            )
            .with("post.browse", EndpointDescriptor::public(Get, api("posts")))
            .with(
                "post.read",
                EndpointDescriptor::public(Get, api("posts/{id}")).with_variables(["id"]),
            )
            .with(
                "post.slug",
                EndpointDescriptor::public(Get, api("posts/slug/{slug}")).with_variables(["slug"]),
            )
            .with("post.create", EndpointDescriptor::private(Post, api("posts")))
            .with(
                "post.update",
                EndpointDescriptor::private(Put, api("posts/{id}")).with_variables(["id"]),
            )
            .with(
                "post.delete",
                EndpointDescriptor::private(Delete, api("posts/{id}")).with_variables(["id"]),
            )
    }

    /// A process-wide copy of [`ghost_v0_1()`][Self::ghost_v0_1()]
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<EndpointTable>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::ghost_v0_1())).clone()
    }
}
