//! Actions on blog posts

use std::fmt;

use ghost_clock::Clock;
use serde::Serialize;

use crate::{client::GhostClient, error::RequestError, http::ApiResponse, transport::Transport};

/// Post actions bound to a client
///
/// Obtained through [`GhostClient::posts()`].
pub struct Posts<'a, T, C> {
    client: &'a GhostClient<T, C>,
}

impl<T, C> GhostClient<T, C> {
    /// Actions on this blog's posts
    pub fn posts(&self) -> Posts<'_, T, C> {
        Posts { client: self }
    }
}

impl<T: Transport, C: Clock> Posts<'_, T, C> {
    /// Lists posts, passing `query` along as filters
    pub async fn browse<P>(&self, query: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.client.make_request("post.browse", query).await
    }

    /// Reads one post by its ID
    pub async fn read<P>(&self, post: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.client.make_request("post.read", post).await
    }

    /// Reads one post by its slug
    pub async fn read_by_slug<P>(&self, post: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.client.make_request("post.slug", post).await
    }

    /// Creates a post
    pub async fn create<P>(&self, post: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.client.make_request("post.create", post).await
    }

    /// Updates the post whose `id` is in the payload
    pub async fn update<P>(&self, post: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.client.make_request("post.update", post).await
    }

    /// Deletes the post whose `id` is in the payload
    pub async fn delete<P>(&self, post: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.client.make_request("post.delete", post).await
    }
}

impl<T, C> fmt::Debug for Posts<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Posts").field("client", self.client).finish()
    }
}
