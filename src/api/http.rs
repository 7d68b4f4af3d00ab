use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use crate::api::client::NotesApi;
use crate::api::types::{
    CreateNoteRequest, ErrorBody, LoginRequest, LoginResponse, RegisterRequest, UpdateNoteRequest,
};
use crate::config::ApiConfig;
use crate::errors::{NotesError, NotesResult};
use crate::note::Note;

pub struct HttpNotesApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNotesApi {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> NotesResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &ApiConfig) -> NotesResult<Self> {
        Self::new(config.base_url.clone(), config.timeout_secs.map(Duration::from_secs))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

/// Turns a non-2xx response into `NotesError::Api`, keeping the server's `error` text.
async fn api_error(response: Response) -> NotesError {
    let status = response.status();
    let raw = response.text().await.unwrap_or_default();
    let message = ErrorBody::message_from(&raw);
    tracing::debug!(status = %status, message = ?message, "API request rejected");
    NotesError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Like [`api_error`], but a 401 on an authenticated route means the token is no good.
async fn authed_error(response: Response) -> NotesError {
    if response.status() == StatusCode::UNAUTHORIZED {
        tracing::warn!("token rejected by server");
        return NotesError::Unauthenticated;
    }
    api_error(response).await
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn login(&self, request: &LoginRequest) -> NotesResult<LoginResponse> {
        tracing::debug!(email = %request.email, "POST /api/auth/login");
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        // A 2xx with an unreadable body is treated as a response without a token.
        let raw = response.text().await?;
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    async fn register(&self, request: &RegisterRequest) -> NotesResult<()> {
        tracing::debug!(email = %request.email, username = %request.username, "POST /api/auth/register");
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    async fn list_notes(&self, token: &str) -> NotesResult<Vec<Note>> {
        let response = self
            .client
            .get(self.url("/notes"))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(authed_error(response).await);
        }
        let notes: Vec<Note> = response.json().await?;
        tracing::debug!(count = notes.len(), "GET /api/notes");
        Ok(notes)
    }

    async fn create_note(&self, token: &str, request: &CreateNoteRequest) -> NotesResult<()> {
        tracing::debug!(title = %request.title, "POST /api/notes");
        let response = self
            .client
            .post(self.url("/notes"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(authed_error(response).await);
        }
        Ok(())
    }

    async fn update_note(&self, token: &str, id: u64, request: &UpdateNoteRequest) -> NotesResult<()> {
        tracing::debug!(id, "PUT /api/notes/{{id}}");
        let response = self
            .client
            .put(self.url(&format!("/notes/{id}")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(authed_error(response).await);
        }
        Ok(())
    }

    async fn delete_note(&self, token: &str, id: u64) -> NotesResult<()> {
        tracing::debug!(id, "DELETE /api/notes/{{id}}");
        let response = self
            .client
            .delete(self.url(&format!("/notes/{id}")))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(authed_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::note::NoteId;

    /// Serves exactly one canned response and hands back the raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn list_notes_sends_bearer_token() {
        let (base, server) = serve_once("200 OK", r#"[{"id":1,"title":"A","content":"a"},{"id":2,"title":"B"}]"#).await;
        let api = HttpNotesApi::new(base, None).unwrap();

        let notes = api.list_notes("tok-123").await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, NoteId::Server(1));
        assert_eq!(notes[0].body, "a");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/notes HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn list_notes_maps_401_to_unauthenticated() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"error":"Unauthorized"}"#).await;
        let api = HttpNotesApi::new(base, None).unwrap();

        let err = api.list_notes("stale").await.unwrap_err();
        assert!(err.is_unauthenticated());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn login_failure_keeps_server_message() {
        let (base, server) = serve_once("400 Bad Request", r#"{"error":"Email tidak ditemukan"}"#).await;
        let api = HttpNotesApi::new(base, None).unwrap();

        let err = api
            .login(&LoginRequest {
                email: "nobody@example.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        match err {
            NotesError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Email tidak ditemukan"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/auth/login HTTP/1.1"));
        assert!(request.contains(r#""email":"nobody@example.com""#));
    }

    #[tokio::test]
    async fn login_success_returns_token() {
        let (base, server) = serve_once("200 OK", r#"{"message":"Login berhasil","token":"jwt.abc"}"#).await;
        let api = HttpNotesApi::new(format!("{base}/"), None).unwrap();

        let resp = api
            .login(&LoginRequest {
                email: "a@b.c".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.token.as_deref(), Some("jwt.abc"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn create_note_posts_title_and_content() {
        let (base, server) = serve_once("200 OK", r#"{"id":9}"#).await;
        let api = HttpNotesApi::new(base, None).unwrap();

        api.create_note(
            "tok",
            &CreateNoteRequest {
                title: "T".into(),
                content: "C".into(),
            },
        )
        .await
        .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/notes HTTP/1.1"));
        assert!(request.ends_with(r#"{"title":"T","content":"C"}"#));
    }

    #[tokio::test]
    async fn opaque_error_body_has_no_message() {
        let (base, server) = serve_once("500 Internal Server Error", "oops").await;
        let api = HttpNotesApi::new(base, None).unwrap();

        let err = api
            .register(&RegisterRequest {
                username: "u".into(),
                email: "e@x.y".into(),
                password: "p".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::Api { status: 500, message: None }));
        server.await.unwrap();
    }
}
