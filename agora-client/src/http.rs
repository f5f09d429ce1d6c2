use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Method, RequestBuilder, Response,
};

use crate::{
    api::{self, endpoints, Comment, CommentId, NewComment, Post, PostId, User},
    Backend, Error, ValidationError,
};

/// `Backend` speaking to the real API over HTTP
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    host: String,
    token: String,
}

impl HttpBackend {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> HttpBackend {
        HttpBackend::with_client(reqwest::Client::new(), host, token)
    }

    pub fn with_client(
        client: reqwest::Client,
        host: impl Into<String>,
        token: impl Into<String>,
    ) -> HttpBackend {
        let host = host.into();
        HttpBackend {
            client,
            host: String::from(host.trim_end_matches('/')),
            token: token.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.host, path))
            .bearer_auth(&self.token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, Error> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await?;
        Err(Error::Server {
            status: status.as_u16(),
            error: api::Error::parse_lossy(&body),
        })
    }

    async fn fetch<R>(&self, path: &str) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let body = self.send(self.request(Method::GET, path)).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn submit(&self, method: Method, path: &str, c: NewComment) -> Result<(), Error> {
        let form = comment_form(c)?;
        self.send(self.request(method, path).multipart(form))
            .await?;
        Ok(())
    }
}

fn comment_form(c: NewComment) -> Result<Form, Error> {
    let form = Form::new().text("content", c.content);
    Ok(match c.image {
        None => form,
        Some(image) => {
            let part = Part::bytes(image.data)
                .file_name(image.file_name)
                .mime_str(&image.content_type)
                .map_err(|_| ValidationError::InvalidImageType(image.content_type))?;
            form.part("image", part)
        }
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn current_user(&self) -> Result<User, Error> {
        self.fetch(endpoints::CURRENT_USER).await
    }

    async fn fetch_post(&self, post: PostId) -> Result<Post, Error> {
        self.fetch(&endpoints::post(post)).await
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        let body: serde_json::Value = self.fetch(&endpoints::post_comments(post)).await?;
        if !body.is_array() {
            tracing::warn!(%post, "comment listing is not an array, assuming no comments");
        }
        Ok(api::decode_comment_list(body)?)
    }

    async fn create_comment(&self, post: PostId, comment: NewComment) -> Result<(), Error> {
        self.submit(Method::POST, &endpoints::post_comment(post), comment)
            .await
    }

    async fn create_reply(&self, parent: CommentId, comment: NewComment) -> Result<(), Error> {
        self.submit(Method::POST, &endpoints::comment_reply(parent), comment)
            .await
    }

    async fn edit_comment(&self, comment: CommentId, edit: NewComment) -> Result<(), Error> {
        self.submit(Method::PUT, &endpoints::comment_detail(comment), edit)
            .await
    }

    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error> {
        self.send(self.request(Method::DELETE, &endpoints::comment_detail(comment)))
            .await?;
        Ok(())
    }

    async fn toggle_comment_lock(&self, post: PostId) -> Result<(), Error> {
        self.send(self.request(Method::PUT, &endpoints::post_lock_toggle(post)))
            .await?;
        Ok(())
    }
}
