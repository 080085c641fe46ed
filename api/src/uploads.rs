use crate::session::{CredentialVerifier, SessionGuard};
use crate::store::BlobStore;
use crate::LeagueError;
use chrono::{DateTime, Utc};
use log::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// `<unix-millis>_<file name>`, with separators and whitespace flattened to `_`.
pub fn object_name(now: DateTime<Utc>, file_name: &str) -> String {
    let base: String = file_name
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_whitespace() { '_' } else { c })
        .collect();
    let base = if base.is_empty() { "upload".to_owned() } else { base };
    format!("{}_{base}", now.timestamp_millis())
}

/// Store an admin upload and return its public URL.
///
/// The session is checked before anything else, so an unauthorised call
/// writes nothing.
pub async fn store_upload<V, B>(
    guard: &SessionGuard<V>,
    token: Option<&str>,
    blobs: &B,
    file: Option<UploadedFile>,
    now: DateTime<Utc>,
) -> Result<String, LeagueError>
where
    V: CredentialVerifier,
    B: BlobStore,
{
    guard.authorize(token, now)?;
    let file = file.filter(|f| !f.bytes.is_empty()).ok_or(LeagueError::MissingUpload)?;
    let name = object_name(now, &file.file_name);
    let size = file.bytes.len();
    let path = blobs.upload(&name, file.bytes, file.content_type.as_deref()).await?;
    info!("stored upload {path} ({size} bytes)");
    Ok(blobs.public_url(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::session::StaticCredentials;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    fn guard() -> SessionGuard<StaticCredentials> {
        SessionGuard::new(StaticCredentials::new("admin@league.test", "pw", "Admin"))
    }

    fn crest() -> UploadedFile {
        UploadedFile {
            file_name: "club crest.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn object_name_is_timestamp_prefixed() {
        assert_eq!(object_name(now(), "club crest.png"), "1700000000123_club_crest.png");
        assert_eq!(object_name(now(), "../x/y.jpg"), "1700000000123_.._x_y.jpg");
        assert_eq!(object_name(now(), "  "), "1700000000123_upload");
    }

    #[tokio::test]
    async fn upload_without_session_writes_nothing() {
        let store = MemoryStore::new();
        let err = store_upload(&guard(), None, &store, Some(crest()), now()).await.unwrap_err();
        assert!(matches!(err, LeagueError::UnauthorizedMutation));
        assert!(store.blob("1700000000123_club_crest.png").is_none());
    }

    #[tokio::test]
    async fn upload_returns_public_url() {
        let store = MemoryStore::new();
        let g = guard();
        let token = g.login("admin@league.test", "pw", now()).unwrap().token();
        let url = store_upload(&g, Some(&token), &store, Some(crest()), now()).await.unwrap();
        assert_eq!(url, "memory://uploads/1700000000123_club_crest.png");
        assert_eq!(store.blob("1700000000123_club_crest.png").unwrap().len(), 4);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let store = MemoryStore::new();
        let g = guard();
        let token = g.login("admin@league.test", "pw", now()).unwrap().token();
        let empty = UploadedFile { bytes: vec![], ..crest() };
        for file in [None, Some(empty)] {
            let err = store_upload(&g, Some(&token), &store, file, now()).await.unwrap_err();
            assert_eq!(err.to_string(), "No file provided");
        }
    }
}
