use std::sync::Arc;

use agora_api::{Comment, CommentId, Post, PostId, User};
use anyhow::Context;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::{error::Error, extractors::Bearer, MockServer};

pub type SharedServer = Arc<Mutex<MockServer>>;

/// Serves `server` over the same routes as the real API
pub fn router(server: SharedServer) -> Router {
    Router::new()
        .route("/user/current-user/", get(current_user))
        .route("/post/:post/", get(fetch_post))
        .route("/post/:post/comments/", get(list_comments))
        .route("/post/:post/comment/", post(add_comment))
        .route("/post/:post/lock-unlock-comment/", put(toggle_comment_lock))
        .route("/comment/:comment/reply/", post(reply))
        .route("/comment/:comment/", put(edit_comment).delete(delete_comment))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Fields of the multipart body used to create or edit a comment
struct CommentForm {
    content: String,
    image: Option<String>,
}

impl CommentForm {
    async fn read(mut body: Multipart) -> Result<CommentForm, Error> {
        let mut content = String::new();
        let mut image = None;
        while let Some(field) = body
            .next_field()
            .await
            .context("reading multipart field")?
        {
            let name = field.name().map(String::from);
            match name.as_deref() {
                Some("content") => {
                    content = field.text().await.context("reading comment content")?;
                }
                Some("image") => {
                    let file_name = field
                        .file_name()
                        .map(String::from)
                        .unwrap_or_else(|| String::from("image"));
                    // the bytes themselves are not stored anywhere
                    field.bytes().await.context("reading comment image")?;
                    image = Some(file_name);
                }
                _ => (),
            }
        }
        Ok(CommentForm { content, image })
    }
}

async fn current_user(
    State(srv): State<SharedServer>,
    Bearer(token): Bearer,
) -> Result<Json<User>, Error> {
    Ok(Json(srv.lock().await.current_user(&token)?))
}

async fn fetch_post(
    State(srv): State<SharedServer>,
    Path(post): Path<PostId>,
) -> Result<Json<Post>, Error> {
    Ok(Json(srv.lock().await.post(post)?))
}

async fn list_comments(
    State(srv): State<SharedServer>,
    Path(post): Path<PostId>,
) -> Result<Json<Vec<Comment>>, Error> {
    Ok(Json(srv.lock().await.comments(post)?))
}

async fn add_comment(
    State(srv): State<SharedServer>,
    Bearer(token): Bearer,
    Path(post): Path<PostId>,
    body: Multipart,
) -> Result<(StatusCode, Json<Comment>), Error> {
    let form = CommentForm::read(body).await?;
    let comment =
        srv.lock()
            .await
            .add_comment(&token, post, &form.content, form.image.as_deref())?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn reply(
    State(srv): State<SharedServer>,
    Bearer(token): Bearer,
    Path(parent): Path<CommentId>,
    body: Multipart,
) -> Result<(StatusCode, Json<Comment>), Error> {
    let form = CommentForm::read(body).await?;
    let comment = srv
        .lock()
        .await
        .reply(&token, parent, &form.content, form.image.as_deref())?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn edit_comment(
    State(srv): State<SharedServer>,
    Bearer(token): Bearer,
    Path(comment): Path<CommentId>,
    body: Multipart,
) -> Result<Json<Comment>, Error> {
    let form = CommentForm::read(body).await?;
    Ok(Json(srv.lock().await.edit_comment(
        &token,
        comment,
        &form.content,
        form.image.as_deref(),
    )?))
}

async fn delete_comment(
    State(srv): State<SharedServer>,
    Bearer(token): Bearer,
    Path(comment): Path<CommentId>,
) -> Result<StatusCode, Error> {
    srv.lock().await.delete_comment(&token, comment)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_comment_lock(
    State(srv): State<SharedServer>,
    Bearer(token): Bearer,
    Path(post): Path<PostId>,
) -> Result<Json<Post>, Error> {
    Ok(Json(srv.lock().await.toggle_comment_lock(&token, post)?))
}

#[cfg(test)]
mod tests {
    use agora_api::Role;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::*;

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.oneshot(req).await.expect("running request");
        let status = resp.status();
        let body = hyper::body::to_bytes(resp.into_body())
            .await
            .expect("recovering resp bytes");
        (status, body.to_vec())
    }

    fn setup() -> (SharedServer, String, PostId) {
        let mut srv = MockServer::new();
        let u = srv.create_user("alice", "Alice", "", Role::Alumni);
        let token = srv.open_session(u.id).unwrap();
        let post = srv.create_post(u.id, "hi").unwrap().id;
        (Arc::new(Mutex::new(srv)), token, post)
    }

    fn multipart(token: &str, method: &str, uri: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--XX\r\nContent-Disposition: form-data; name=\"content\"\r\n\r\n{content}\r\n\
             --XX\r\nContent-Disposition: form-data; name=\"image\"; filename=\"pic.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\nJPEG\r\n--XX--\r\n"
        );
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "multipart/form-data; boundary=XX")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_list() {
        let (srv, token, post) = setup();
        let (status, body) = call(
            router(srv.clone()),
            multipart(&token, "POST", &format!("/post/{post}/comment/"), "hello"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Comment = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.content, "hello");
        assert_eq!(created.image.as_deref(), Some("image/upload/pic.jpg"));

        let (status, body) = call(
            router(srv),
            Request::get(format!("/post/{post}/comments/"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let listed: Vec<Comment> = serde_json::from_slice(&body).unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn errors_use_the_wire_format() {
        let (srv, token, post) = setup();
        let (status, body) = call(
            router(srv.clone()),
            multipart("bogus", "POST", &format!("/post/{post}/comment/"), "x"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            agora_api::Error::parse(&body).unwrap(),
            agora_api::Error::PermissionDenied
        );

        let (status, body) = call(
            router(srv.clone()),
            multipart(&token, "POST", &format!("/post/{post}/comment/"), "   "),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            agora_api::Error::parse(&body).unwrap(),
            agora_api::Error::EmptyContent
        );

        let (status, _) = call(
            router(srv),
            Request::delete("/comment/12345/")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_token_is_denied() {
        let (srv, _, _) = setup();
        let (status, _) = call(
            router(srv),
            Request::get("/user/current-user/")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
