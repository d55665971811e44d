use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of digest characters shown in compact tables (`sha256:` + 12 hex)
const SHORT_DIGEST_LEN: usize = 19;

/// One container image repository as stored in the collection
///
/// `tags` keep the order they were received in (oldest release first).
/// Display order is computed by [`crate::pager::derive_page`], never by
/// reordering this vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRepository {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "latest", default)]
    pub latest_tag: String,
    #[serde(rename = "registry", default)]
    pub registry_host: String,
    #[serde(rename = "repository", default)]
    pub repository_path: String,
    #[serde(rename = "digest", default, skip_serializing_if = "Option::is_none")]
    pub latest_digest: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        rename = "dockerAuthConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pull_token: Option<String>,
}

/// A published tag of an image repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(
        rename = "arch",
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "non_empty_architectures"
    )]
    pub architectures: Vec<String>,
}

/// Error record embedded in a collection response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionErrorEntry {
    pub code: i64,
    pub message: String,
}

/// Payload stored under the collection's object key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionResponse {
    #[serde(rename = "updated", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "duration", default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub images: Vec<ImageRepository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<CollectionErrorEntry>>,
}

/// Container engine used to render pull commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Docker,
    Podman,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Docker, Engine::Podman];

    pub fn command(&self) -> &'static str {
        match self {
            Engine::Docker => "docker",
            Engine::Podman => "podman",
        }
    }
}

fn non_empty_architectures<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let architectures = Vec::<String>::deserialize(deserializer)?;
    if architectures.is_empty() {
        return Err(serde::de::Error::custom(
            "tag architecture list must not be empty",
        ));
    }
    Ok(architectures)
}

impl Tag {
    pub fn new(name: &str, architectures: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            digest: None,
            architectures: architectures.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn with_digest(mut self, digest: &str) -> Self {
        self.digest = Some(digest.to_string());
        self
    }

    /// Digest truncated for table display, empty when unknown
    pub fn short_digest(&self) -> &str {
        match self.digest.as_deref() {
            Some(digest) => digest
                .char_indices()
                .nth(SHORT_DIGEST_LEN)
                .map(|(idx, _)| &digest[..idx])
                .unwrap_or(digest),
            None => "",
        }
    }
}

impl ImageRepository {
    pub fn new(name: &str, repository_path: &str) -> Self {
        let registry_host = repository_path
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            name: name.to_string(),
            description: String::new(),
            latest_tag: String::new(),
            registry_host,
            repository_path: repository_path.to_string(),
            latest_digest: None,
            tags: Vec::new(),
            login: None,
            password: None,
            pull_token: None,
        }
    }

    /// Pull command referencing `tag` by name
    pub fn pull_by_tag(&self, engine: Engine, tag: &str) -> String {
        format!("{} pull {}:{}", engine.command(), self.repository_path, tag)
    }

    /// Pull command referencing an immutable digest
    pub fn pull_by_digest(&self, engine: Engine, digest: &str) -> String {
        format!("{} pull {}@{}", engine.command(), self.repository_path, digest)
    }

    pub fn find_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

impl CollectionResponse {
    /// Embedded errors, `None` when the array is absent or empty
    pub fn reported_errors(&self) -> Option<&[CollectionErrorEntry]> {
        self.errors.as_deref().filter(|errors| !errors.is_empty())
    }
}

/// Architectures implied by a tag name
///
/// Release tags encode the architecture when the image is single-arch
/// (`7.10.0-1234.falcon-linux.x86_64.Release.US-1`); anything else is a
/// multi-arch manifest.
pub fn arch_in_tag(tag: &str) -> Vec<String> {
    if tag.contains("x86_64") {
        vec!["x86_64".to_string()]
    } else if tag.contains("aarch64") {
        vec!["aarch64".to_string()]
    } else {
        vec!["x86_64".to_string(), "aarch64".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_collection_wire_format() {
        let json = r#"{
            "updated": "2025-03-01T10:00:00Z",
            "duration": 1234,
            "images": [{
                "name": "Falcon Container Sensor",
                "description": "sidecar",
                "latest": "7.10.0",
                "registry": "registry.example.com",
                "repository": "registry.example.com/falcon-container/release/falcon-sensor",
                "digest": "sha256:abc",
                "tags": [{"name": "7.10.0", "arch": ["x86_64"]}]
            }]
        }"#;

        let resp: CollectionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.duration_ms, 1234);
        assert!(resp.updated_at.is_some());
        assert_eq!(resp.images.len(), 1);

        let image = &resp.images[0];
        assert_eq!(image.latest_tag, "7.10.0");
        assert_eq!(image.registry_host, "registry.example.com");
        assert_eq!(image.latest_digest.as_deref(), Some("sha256:abc"));
        assert_eq!(image.tags[0].architectures, vec!["x86_64"]);
        assert!(image.login.is_none());
        assert!(resp.reported_errors().is_none());
    }

    #[test]
    fn test_empty_architecture_list_is_rejected() {
        let json = r#"{"name": "v1", "arch": []}"#;
        assert!(serde_json::from_str::<Tag>(json).is_err());
    }

    #[test]
    fn test_missing_architecture_list_defaults_to_empty() {
        let tag: Tag = serde_json::from_str(r#"{"name": "v1"}"#).unwrap();
        assert!(tag.architectures.is_empty());
        assert_eq!(tag.short_digest(), "");
    }

    #[test]
    fn test_tag_without_architectures_reads_back() {
        let resp: CollectionResponse =
            serde_json::from_str(r#"{"images":[{"name":"a","tags":[{"name":"v1"}]}]}"#).unwrap();
        let written = serde_json::to_string(&resp).unwrap();
        assert!(!written.contains("arch"));

        let reread: CollectionResponse = serde_json::from_str(&written).unwrap();
        assert_eq!(reread, resp);

        let bare = serde_json::to_string(&Tag::new("v2", &[])).unwrap();
        let tag: Tag = serde_json::from_str(&bare).unwrap();
        assert_eq!(tag, Tag::new("v2", &[]));
    }

    #[test]
    fn test_empty_errors_array_is_not_reported() {
        let resp: CollectionResponse =
            serde_json::from_str(r#"{"images": [], "errors": []}"#).unwrap();
        assert!(resp.reported_errors().is_none());
    }

    #[test]
    fn test_short_digest() {
        let tag = Tag::new("v1", &["x86_64"]).with_digest(
            "sha256:1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
        );
        assert_eq!(tag.short_digest(), "sha256:1234567890ab");

        let short = Tag::new("v1", &["x86_64"]).with_digest("sha256:12");
        assert_eq!(short.short_digest(), "sha256:12");
    }

    #[test]
    fn test_pull_commands() {
        let image = ImageRepository::new("sensor", "registry.example.com/mock/sensor");
        assert_eq!(image.registry_host, "registry.example.com");
        assert_eq!(
            image.pull_by_tag(Engine::Docker, "1.2.3"),
            "docker pull registry.example.com/mock/sensor:1.2.3"
        );
        assert_eq!(
            image.pull_by_digest(Engine::Podman, "sha256:abc"),
            "podman pull registry.example.com/mock/sensor@sha256:abc"
        );
    }

    #[test]
    fn test_arch_in_tag() {
        assert_eq!(
            arch_in_tag("7.10.0-1234.falcon-linux.x86_64.Release.US-1"),
            vec!["x86_64"]
        );
        assert_eq!(
            arch_in_tag("7.10.0-1234.falcon-linux.aarch64.Release.US-1"),
            vec!["aarch64"]
        );
        assert_eq!(arch_in_tag("1.0.2"), vec!["x86_64", "aarch64"]);
    }
}
