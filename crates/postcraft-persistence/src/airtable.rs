//! Airtable REST backend.
//!
//! Posts map to rows of one table. Column names are fixed:
//!
//! | Column | Content |
//! |---|---|
//! | `Post ID` | post id |
//! | `Post Content` | post body |
//! | `Tone` | tone label, e.g. `What Broke` |
//! | `Audience Type` | `business` / `technical` |
//! | `Series ID` | series id |
//! | `Sequence Number` | 1-based position in the series |
//! | `Parent Post ID` | parent post id, follow-ups only |
//! | `Relationship Type` | relationship code, `none` for first posts |
//! | `Source File` | uploaded file name |
//! | `Created At` | RFC 3339 timestamp |
//! | `Approved` | checkbox |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use postcraft_models::{AudienceType, Post, PostId, RelationshipType, SeriesId, Tone};

use crate::error::{PersistenceError, Result};
use crate::store::PostStore;

/// Default Airtable API base URL.
pub const AIRTABLE_API_BASE: &str = "https://api.airtable.com";

/// Airtable's maximum page size.
const MAX_PAGE_SIZE: usize = 100;

/// Post store backed by an Airtable table.
#[derive(Clone)]
pub struct AirtableStore {
    client: reqwest::Client,
    api_key: String,
    base_id: String,
    table_name: String,
    base_url: String,
}

impl AirtableStore {
    pub fn new(
        api_key: impl Into<String>,
        base_id: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_id: base_id.into(),
            table_name: table_name.into(),
            base_url: AIRTABLE_API_BASE.to_string(),
        }
    }

    /// Point the client at another server (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn table_url(&self) -> String {
        format!("{}/v0/{}/{}", self.base_url, self.base_id, self.table_name)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PersistenceError::Airtable {
            status: status.as_u16(),
            body,
        })
    }

    /// Fetch pages until `limit` records are collected or pages run out.
    async fn list(&self, query: &[(&str, String)], limit: Option<usize>) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut params: Vec<(&str, String)> = query.to_vec();
            if let Some(offset) = &offset {
                params.push(("offset", offset.clone()));
            }

            let response = self
                .client
                .get(self.table_url())
                .bearer_auth(&self.api_key)
                .query(&params)
                .send()
                .await?;
            let page: ListResponse = Self::check_status(response).await?.json().await?;

            for record in page.records {
                posts.push(record.fields.into_post()?);
            }

            let full = limit.is_some_and(|l| posts.len() >= l);
            match page.offset {
                Some(next) if !full => offset = Some(next),
                _ => break,
            }
        }

        if let Some(limit) = limit {
            posts.truncate(limit);
        }
        Ok(posts)
    }
}

/// Quote a value for use inside an Airtable formula string literal.
fn formula_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[async_trait]
impl PostStore for AirtableStore {
    fn backend_name(&self) -> &'static str {
        "airtable"
    }

    async fn save_post(&self, post: &Post) -> Result<()> {
        let body = CreateRequest {
            fields: PostFields::from_post(post),
            typecast: true,
        };

        let response = self
            .client
            .post(self.table_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let created: CreatedRecord = Self::check_status(response).await?.json().await?;

        info!(
            record_id = %created.id,
            post_id = %post.id,
            series_id = %post.series_id,
            sequence = post.sequence,
            "Saved post to Airtable"
        );
        Ok(())
    }

    async fn series_posts(&self, series_id: &SeriesId) -> Result<Vec<Post>> {
        let query = [
            (
                "filterByFormula",
                format!("{{Series ID}} = {}", formula_literal(series_id.as_str())),
            ),
            ("sort[0][field]", "Sequence Number".to_string()),
            ("sort[0][direction]", "asc".to_string()),
        ];
        let posts = self.list(&query, None).await?;
        debug!(series_id = %series_id, count = posts.len(), "Loaded series from Airtable");
        Ok(posts)
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = [
            ("sort[0][field]", "Created At".to_string()),
            ("sort[0][direction]", "desc".to_string()),
            ("pageSize", limit.min(MAX_PAGE_SIZE).to_string()),
            ("maxRecords", limit.to_string()),
        ];
        self.list(&query, Some(limit)).await
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.api_key)
            .query(&[("maxRecords", "1")])
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }
}

#[derive(Debug, Serialize)]
struct CreateRequest {
    fields: PostFields,
    typecast: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Record {
    fields: PostFields,
}

/// One Airtable row. Airtable omits empty cells and unchecked boxes.
#[derive(Debug, Serialize, Deserialize)]
struct PostFields {
    #[serde(rename = "Post ID")]
    post_id: String,
    #[serde(rename = "Post Content", default)]
    content: String,
    #[serde(rename = "Tone")]
    tone: String,
    #[serde(rename = "Audience Type")]
    audience: String,
    #[serde(rename = "Series ID")]
    series_id: String,
    #[serde(rename = "Sequence Number", default)]
    sequence: u32,
    #[serde(rename = "Parent Post ID", default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(rename = "Relationship Type", default)]
    relationship: Option<String>,
    #[serde(rename = "Source File", default, skip_serializing_if = "Option::is_none")]
    source_file: Option<String>,
    #[serde(rename = "Created At")]
    created_at: DateTime<Utc>,
    #[serde(rename = "Approved", default)]
    approved: bool,
}

impl PostFields {
    fn from_post(post: &Post) -> Self {
        Self {
            post_id: post.id.to_string(),
            content: post.content.clone(),
            tone: post.tone.label().to_string(),
            audience: post.audience.code().to_string(),
            series_id: post.series_id.to_string(),
            sequence: post.sequence,
            parent_id: post.parent_id.as_ref().map(|id| id.to_string()),
            relationship: Some(post.relationship.code().to_string()),
            source_file: post.source_file.clone(),
            created_at: post.created_at,
            approved: post.approved,
        }
    }

    fn into_post(self) -> Result<Post> {
        let tone = Tone::from_label(&self.tone)
            .ok_or_else(|| PersistenceError::InvalidData(format!("unknown tone '{}'", self.tone)))?;
        let audience: AudienceType = self
            .audience
            .parse()
            .map_err(|e| PersistenceError::InvalidData(format!("{}", e)))?;
        let relationship = match self.relationship.as_deref() {
            Some(value) if !value.trim().is_empty() => value
                .parse::<RelationshipType>()
                .map_err(|e| PersistenceError::InvalidData(format!("{}", e)))?,
            _ => RelationshipType::None,
        };

        Ok(Post {
            id: PostId::from_string(self.post_id),
            series_id: SeriesId::from_string(self.series_id),
            sequence: self.sequence,
            content: self.content,
            tone,
            audience,
            relationship,
            parent_id: self.parent_id.map(PostId::from_string),
            source_file: self.source_file,
            created_at: self.created_at,
            approved: self.approved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_models::GeneratedPost;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> AirtableStore {
        AirtableStore::new("pat-test", "appBase", "Posts").with_base_url(server.uri())
    }

    fn sample_post(series: &SeriesId, sequence: u32) -> Post {
        let generated = GeneratedPost {
            tone: Tone::ProblemSolutionResult,
            post_content: format!("Post number {}.", sequence),
            reason: String::new(),
            fallback: false,
        };
        let mut post = Post::from_generated(&generated, AudienceType::Technical, series.clone(), sequence)
            .with_source("journal.md");
        post.approve();
        post
    }

    fn record_json(post: &Post) -> serde_json::Value {
        serde_json::json!({
            "id": format!("rec{}", post.sequence),
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": serde_json::to_value(PostFields::from_post(post)).unwrap()
        })
    }

    #[tokio::test]
    async fn test_save_post_sends_fields() {
        let server = MockServer::start().await;
        let series = SeriesId::from_string("series-abc");
        let post = sample_post(&series, 2).with_parent(PostId::from_string("post-parent"), RelationshipType::SequentialStory);

        Mock::given(method("POST"))
            .and(path("/v0/appBase/Posts"))
            .and(header("authorization", "Bearer pat-test"))
            .and(body_partial_json(serde_json::json!({
                "fields": {
                    "Post ID": post.id.as_str(),
                    "Tone": "Problem→Solution→Result",
                    "Audience Type": "technical",
                    "Series ID": "series-abc",
                    "Sequence Number": 2,
                    "Parent Post ID": "post-parent",
                    "Relationship Type": "sequential_story",
                    "Source File": "journal.md",
                    "Approved": true
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "rec123",
                "createdTime": "2024-01-01T00:00:00.000Z",
                "fields": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        store_for(&server).save_post(&post).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_post_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("INVALID_VALUE_FOR_COLUMN"))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .save_post(&sample_post(&SeriesId::new(), 1))
            .await
            .unwrap_err();
        match err {
            PersistenceError::Airtable { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("INVALID_VALUE_FOR_COLUMN"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_series_posts_follows_offset() {
        let server = MockServer::start().await;
        let series = SeriesId::from_string("series-xyz");
        let first = sample_post(&series, 1);
        let second = sample_post(&series, 2);

        // Mounted first so it wins for the request carrying the offset.
        Mock::given(method("GET"))
            .and(path("/v0/appBase/Posts"))
            .and(query_param("offset", "itr2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "records": [record_json(&second)] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v0/appBase/Posts"))
            .and(query_param("filterByFormula", "{Series ID} = 'series-xyz'"))
            .and(query_param("sort[0][field]", "Sequence Number"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [record_json(&first)],
                "offset": "itr2"
            })))
            .mount(&server)
            .await;

        let posts = store_for(&server).series_posts(&series).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0], first);
        assert_eq!(posts[1], second);
    }

    #[tokio::test]
    async fn test_recent_posts_respects_limit() {
        let server = MockServer::start().await;
        let series = SeriesId::new();
        let records: Vec<_> = (1..=3).map(|i| record_json(&sample_post(&series, i))).collect();

        Mock::given(method("GET"))
            .and(path("/v0/appBase/Posts"))
            .and(query_param("maxRecords", "2"))
            .and(query_param("sort[0][direction]", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": records,
                "offset": "more"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let posts = store_for(&server).recent_posts(2).await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_unchecked_approved_and_missing_relationship() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [{
                    "id": "rec1",
                    "fields": {
                        "Post ID": "post-1",
                        "Post Content": "Hello",
                        "Tone": "Mini Lesson",
                        "Audience Type": "business",
                        "Series ID": "series-1",
                        "Sequence Number": 1,
                        "Created At": "2024-05-01T10:00:00Z"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let posts = store_for(&server).recent_posts(10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert!(!posts[0].approved);
        assert_eq!(posts[0].relationship, RelationshipType::None);
        assert_eq!(posts[0].tone, Tone::MiniLesson);
    }

    #[tokio::test]
    async fn test_unknown_tone_is_invalid_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [{
                    "id": "rec1",
                    "fields": {
                        "Post ID": "post-1",
                        "Tone": "Shouting",
                        "Audience Type": "business",
                        "Series ID": "series-1",
                        "Created At": "2024-05-01T10:00:00Z"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let err = store_for(&server).recent_posts(1).await.unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("maxRecords", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "records": [] })))
            .mount(&server)
            .await;
        assert!(store_for(&server).health_check().await.is_ok());

        let failing = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&failing)
            .await;
        assert!(store_for(&failing).health_check().await.is_err());
    }

    #[test]
    fn test_formula_literal_escapes_quotes() {
        assert_eq!(formula_literal("it's"), "'it\\'s'");
    }
}
