//! Fixture factory
//!
//! Every `Fixture` owns a fresh in-memory database with migrations applied
//! and the full router on top of it, so tests never share state.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use crate::api::{build_router, urls, AppState};
use crate::config::Config;
use crate::db::repositories::{
    CommentRepository, NewsRepository, NoteRepository, SqlxCommentRepository, SqlxNewsRepository,
    SqlxNoteRepository,
};
use crate::db::{create_test_pool, migrations};
use crate::models::{Comment, CreateNewsInput, News, Note, User};
use crate::services::RegisterInput;

/// Password every fixture user is created with
pub const DEFAULT_PASSWORD: &str = "fixture-password";

/// An isolated application instance
pub struct Fixture {
    pub state: AppState,
    pub router: Router,
}

impl Fixture {
    /// Application with the default configuration
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool, &config).expect("Failed to build app state");
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// Register a user with `DEFAULT_PASSWORD`
    pub async fn user(&self, username: &str) -> User {
        self.state
            .user_service
            .register(RegisterInput::new(username, DEFAULT_PASSWORD))
            .await
            .expect("Failed to create fixture user")
    }

    /// Client already logged in as `user`
    pub async fn client_for(&self, user: &User) -> TestClient {
        let session = self
            .state
            .user_service
            .open_session(user.id)
            .await
            .expect("Failed to open session");
        TestClient {
            router: self.router.clone(),
            session: Some(session.id),
        }
    }

    /// Client without a session
    pub fn anon(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            session: None,
        }
    }

    fn news_repo(&self) -> SqlxNewsRepository {
        SqlxNewsRepository::new(self.state.pool.clone())
    }

    fn comment_repo(&self) -> SqlxCommentRepository {
        SqlxCommentRepository::new(self.state.pool.clone())
    }

    fn note_repo(&self) -> SqlxNoteRepository {
        SqlxNoteRepository::new(self.state.pool.clone())
    }

    /// News item dated today
    pub async fn news(&self, title: &str) -> News {
        self.news_repo()
            .create(&CreateNewsInput::new(title, "Просто текст."))
            .await
            .expect("Failed to create news")
    }

    /// `count` news items dated today, yesterday and so on back.
    ///
    /// Insertion order alternates between the newest and the oldest dates,
    /// so neither id order matches date order.
    pub async fn many_news(&self, count: usize) -> Vec<News> {
        let today = Utc::now().date_naive();
        let repo = self.news_repo();
        let mut created = Vec::with_capacity(count);
        for (index, offset) in interleaved(count).into_iter().enumerate() {
            let input = CreateNewsInput::new(format!("Новость {}", index), "Просто текст.")
                .dated(today - Duration::days(offset as i64));
            created.push(repo.create(&input).await.expect("Failed to create news"));
        }
        created
    }

    pub async fn comment(&self, news: &News, author: &User, text: &str) -> Comment {
        self.comment_repo()
            .create(&Comment::new(news.id, author.id, text.to_string()))
            .await
            .expect("Failed to create comment")
    }

    /// `count` comments stamped now, tomorrow and so on forward, inserted
    /// out of chronological order
    pub async fn many_comments(&self, news: &News, author: &User, count: usize) -> Vec<Comment> {
        let now = Utc::now();
        let repo = self.comment_repo();
        let mut created = Vec::with_capacity(count);
        for (index, offset) in interleaved(count).into_iter().enumerate() {
            let mut comment = Comment::new(news.id, author.id, format!("Текст {}", index));
            comment.created = now + Duration::days(offset as i64);
            created.push(repo.create(&comment).await.expect("Failed to create comment"));
        }
        created
    }

    pub async fn note(&self, author: &User, title: &str, slug: &str) -> Note {
        self.note_repo()
            .create(&Note::new(
                title.to_string(),
                "Текст".to_string(),
                slug.to_string(),
                author.id,
            ))
            .await
            .expect("Failed to create note")
    }

    pub async fn get_note(&self, id: i64) -> Option<Note> {
        self.note_repo().get_by_id(id).await.expect("Failed to load note")
    }

    pub async fn get_comment(&self, id: i64) -> Option<Comment> {
        self.comment_repo()
            .get_by_id(id)
            .await
            .expect("Failed to load comment")
    }

    pub async fn all_comments(&self, news: &News) -> Vec<Comment> {
        self.comment_repo()
            .list_by_news(news.id)
            .await
            .expect("Failed to list comments")
            .into_iter()
            .map(|c| c.comment)
            .collect()
    }

    pub async fn news_count(&self) -> i64 {
        self.news_repo().count().await.expect("Failed to count news")
    }

    pub async fn comment_count(&self) -> i64 {
        self.comment_repo()
            .count()
            .await
            .expect("Failed to count comments")
    }

    pub async fn note_count(&self) -> i64 {
        self.note_repo().count().await.expect("Failed to count notes")
    }
}

/// `0..count` taken alternately from both ends: 0, n-1, 1, n-2, ...
fn interleaved(count: usize) -> Vec<usize> {
    let (mut low, mut high) = (0, count);
    let mut order = Vec::with_capacity(count);
    while low < high {
        order.push(low);
        low += 1;
        if low < high {
            high -= 1;
            order.push(high);
        }
    }
    order
}

/// Drives the router in-process, carrying a session cookie when logged in
#[derive(Clone)]
pub struct TestClient {
    router: Router,
    session: Option<String>,
}

impl TestClient {
    pub async fn get(&self, url: &str) -> TestResponse {
        self.send(self.request("GET", url).body(Body::empty()))
            .await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            self.request("POST", url)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body)),
        )
        .await
    }

    pub async fn post_empty(&self, url: &str) -> TestResponse {
        self.send(self.request("POST", url).body(Body::empty()))
            .await
    }

    fn request(&self, method: &str, url: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(url);
        match &self.session {
            Some(token) => builder.header(header::COOKIE, format!("session={}", token)),
            None => builder,
        }
    }

    async fn send(
        &self,
        request: Result<Request<Body>, axum::http::Error>,
    ) -> TestResponse {
        let request = request.expect("Failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// What a request came back with
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Assert a `302 Found` to exactly `location`
    #[track_caller]
    pub fn assert_redirect(&self, location: &str) {
        assert_eq!(self.status, StatusCode::FOUND, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(location));
    }

    #[track_caller]
    pub fn assert_status(&self, status: StatusCode) {
        assert_eq!(self.status, status, "location: {:?}", self.location);
    }

    /// Number of times `needle` appears in the body
    pub fn count(&self, needle: &str) -> usize {
        self.body.matches(needle).count()
    }

    /// Values of `attr="..."` in body order
    pub fn attr_values(&self, attr: &str) -> Vec<String> {
        let marker = format!("{}=\"", attr);
        self.body
            .match_indices(&marker)
            .filter_map(|(start, _)| {
                let rest = &self.body[start + marker.len()..];
                rest.find('"').map(|end| rest[..end].to_string())
            })
            .collect()
    }
}

/// Standard cast for the news app: a news item with one comment by
/// `author`, plus a `reader` who didn't write it
pub struct NewsScene {
    pub fixture: Fixture,
    pub author: User,
    pub reader: User,
    pub author_client: TestClient,
    pub reader_client: TestClient,
    pub anon: TestClient,
    pub news: News,
    pub comment: Comment,
}

impl NewsScene {
    pub const COMMENT_TEXT: &'static str = "Текст комментария";

    pub async fn new() -> Self {
        let fixture = Fixture::new().await;
        let author = fixture.user("Автор").await;
        let reader = fixture.user("Читатель").await;
        let author_client = fixture.client_for(&author).await;
        let reader_client = fixture.client_for(&reader).await;
        let anon = fixture.anon();
        let news = fixture.news("Заголовок").await;
        let comment = fixture.comment(&news, &author, Self::COMMENT_TEXT).await;

        Self {
            fixture,
            author,
            reader,
            author_client,
            reader_client,
            anon,
            news,
            comment,
        }
    }

    pub fn detail_url(&self) -> String {
        urls::news_detail(self.news.id)
    }

    pub fn comments_url(&self) -> String {
        urls::news_comments(self.news.id)
    }

    pub fn edit_url(&self) -> String {
        urls::edit_comment(self.comment.id)
    }

    pub fn delete_url(&self) -> String {
        urls::delete_comment(self.comment.id)
    }
}

/// Standard cast for the notes app: one note by `author`, plus a
/// `reader` who didn't write it
pub struct NoteScene {
    pub fixture: Fixture,
    pub author: User,
    pub reader: User,
    pub author_client: TestClient,
    pub reader_client: TestClient,
    pub anon: TestClient,
    pub note: Note,
}

impl NoteScene {
    pub const TITLE: &'static str = "Заголовок";
    pub const SLUG: &'static str = "note-slug";

    pub async fn new() -> Self {
        let fixture = Fixture::new().await;
        let author = fixture.user("Лев Толстой").await;
        let reader = fixture.user("Читатель простой").await;
        let author_client = fixture.client_for(&author).await;
        let reader_client = fixture.client_for(&reader).await;
        let anon = fixture.anon();
        let note = fixture.note(&author, Self::TITLE, Self::SLUG).await;

        Self {
            fixture,
            author,
            reader,
            author_client,
            reader_client,
            anon,
            note,
        }
    }

    pub fn detail_url(&self) -> String {
        urls::note_detail(&self.note.slug)
    }

    pub fn edit_url(&self) -> String {
        urls::note_edit(&self.note.slug)
    }

    pub fn delete_url(&self) -> String {
        urls::note_delete(&self.note.slug)
    }
}
