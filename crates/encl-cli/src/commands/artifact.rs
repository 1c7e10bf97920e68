//! Artifact commands.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::cli::{ArtifactCommand, ArtifactTagCommand};
use crate::client::ApiClient;
use crate::config::OutputFormat;
use crate::model::{AddTagRequest, Artifact, ArtifactRow, DeleteArtifactRequest, Fqn, RemoveTagRequest};
use crate::output::{highlight, info, output, success};
use crate::{CliError, CliResult};

use super::Context;

/// File name the upload is sent under.
const UPLOAD_FILE_NAME: &str = "plugin.wasm";

/// Runs an artifact command.
pub async fn run_artifact(cmd: ArtifactCommand, ctx: &Context<'_>) -> CliResult<()> {
    match cmd {
        ArtifactCommand::List {
            source,
            author,
            name,
        } => {
            let client = ctx.client()?;
            let path = format!(
                "/artifact/list{}",
                query(&[
                    ("source", source.as_deref()),
                    ("author", author.as_deref()),
                    ("name", name.as_deref()),
                ])
            );
            let artifacts: Vec<Artifact> = client.get(&path).await?;
            print_artifacts(&artifacts, ctx.format)
        }
        ArtifactCommand::Upload { fqn, file, tags } => {
            let fqn: Fqn = fqn.parse()?;
            check_wasm_file(&file)?;
            let tags = split_tags(tags.as_deref());

            let client = ctx.client()?;
            let artifact = upload(&client, &fqn, &file, &tags).await?;
            success("Uploaded artifact successfully!");
            print_artifacts(std::slice::from_ref(&artifact), ctx.format)
        }
        ArtifactCommand::Download { fqn, output } => {
            let (fqn, identifier) = Fqn::parse_with_identifier(&fqn)?;
            let client = ctx.client()?;

            info("Downloading artifact...");
            // Buffered so a failed request leaves no partial file behind.
            let mut buffer = Vec::new();
            let written = client
                .download_to(&version_path("/artifact/upload", &fqn, &identifier), &mut buffer)
                .await
                .map_err(|e| e.for_resource("Artifact", &format!("{fqn}:{identifier}")))?;
            std::fs::write(&output, &buffer)?;

            tracing::info!(size = written, file = %output.display(), "Artifact downloaded");
            success(&format!(
                "Artifact {} saved to {}",
                highlight(&fqn.to_string()),
                output.display()
            ));
            Ok(())
        }
        ArtifactCommand::Metadata { fqn } => {
            let (fqn, identifier) = Fqn::parse_with_identifier(&fqn)?;
            let client = ctx.client()?;
            let artifact: Artifact = client
                .get(&version_path("/artifact", &fqn, &identifier))
                .await
                .map_err(|e| e.for_resource("Artifact", &format!("{fqn}:{identifier}")))?;
            print_artifacts(std::slice::from_ref(&artifact), ctx.format)
        }
        ArtifactCommand::Delete { fqn } => {
            let (fqn, identifier) = Fqn::parse_with_identifier(&fqn)?;
            let client = ctx.client()?;
            let request = DeleteArtifactRequest {
                fqn: &fqn,
                identifier: &identifier,
            };
            client
                .delete("/artifact", &request)
                .await
                .map_err(|e| e.for_resource("Artifact", &format!("{fqn}:{identifier}")))?;
            success("Artifact deleted successfully");
            Ok(())
        }
        ArtifactCommand::Tag(cmd) => run_tag(cmd, ctx).await,
    }
}

async fn run_tag(cmd: ArtifactTagCommand, ctx: &Context<'_>) -> CliResult<()> {
    match cmd {
        ArtifactTagCommand::Add { fqn, tag } => {
            let (fqn, version_hash) = hash_identified(&fqn)?;
            let request = AddTagRequest {
                fqn: &fqn,
                version_hash: &version_hash,
                new_tag: &tag,
            };
            ctx.client()?.post("/artifact/tag", &request).await?;
            success(&format!("Tag {} added successfully", highlight(&tag)));
            Ok(())
        }
        ArtifactTagCommand::Remove { fqn, tag } => {
            let (fqn, version_hash) = hash_identified(&fqn)?;
            let request = RemoveTagRequest {
                fqn: &fqn,
                version_hash: &version_hash,
                tag: &tag,
            };
            ctx.client()?.delete("/artifact/tag", &request).await?;
            success(&format!("Tag {} removed successfully", highlight(&tag)));
            Ok(())
        }
    }
}

/// Sends the artifact as a multipart form: name parts, one `tag` field per
/// tag, then the WASM file.
async fn upload(client: &ApiClient, fqn: &Fqn, file: &Path, tags: &[String]) -> CliResult<Artifact> {
    let bytes = std::fs::read(file)?;
    tracing::info!(size = bytes.len(), file = %file.display(), "Read wasm file");

    let mut form = Form::new()
        .text("source", fqn.source.clone())
        .text("author", fqn.author.clone())
        .text("name", fqn.name.clone());
    for tag in tags {
        form = form.text("tag", tag.clone());
    }
    form = form.part("file", Part::bytes(bytes).file_name(UPLOAD_FILE_NAME));

    client.upload("/artifact/upload", form).await
}

/// Prints artifacts as rows, or as the API returned them for JSON output.
fn print_artifacts(artifacts: &[Artifact], format: OutputFormat) -> CliResult<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(artifacts)?);
        return Ok(());
    }
    let rows: Vec<ArtifactRow> = artifacts.iter().map(ArtifactRow::from).collect();
    output(&rows, format)
}

/// Parses an FQN whose identifier must be `hash:<version-hash>`, returning
/// the bare hash.
fn hash_identified(value: &str) -> CliResult<(Fqn, String)> {
    let (fqn, identifier) = Fqn::parse_with_identifier(value)?;
    match identifier.strip_prefix("hash:") {
        Some(hash) if !hash.is_empty() => Ok((fqn, hash.to_string())),
        _ => Err(CliError::Validation(format!(
            "tags can only be changed on artifacts identified by hash, got identifier: {identifier}"
        ))),
    }
}

/// Checks that `file` is an existing compiled WASM file.
fn check_wasm_file(file: &Path) -> CliResult<()> {
    if file.extension().and_then(|e| e.to_str()) != Some("wasm") {
        return Err(CliError::Validation(
            "provided file needs to be compiled WASM (.wasm)".to_string(),
        ));
    }
    if !file.is_file() {
        return Err(CliError::Validation(format!(
            "provided wasm file not valid: {}",
            file.display()
        )));
    }
    Ok(())
}

/// Splits the space separated `--tags` value, dropping empty entries.
fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| t.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Path addressing one artifact version.
fn version_path(base: &str, fqn: &Fqn, identifier: &str) -> String {
    format!(
        "{base}{}",
        query(&[
            ("source", Some(fqn.source.as_str())),
            ("author", Some(fqn.author.as_str())),
            ("name", Some(fqn.name.as_str())),
            ("identifier", Some(identifier)),
        ])
    )
}

/// Builds a query string from the parameters that are set and non-empty.
fn query(params: &[(&str, Option<&str>)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect();
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::BasicAuth;

    fn artifact_json() -> serde_json::Value {
        serde_json::json!({
            "fqn": {"source": "github", "author": "acme", "name": "auth"},
            "version_hash": "9f2c",
            "tags": ["latest"],
            "created_at": "2024-05-01T12:30:00Z",
            "pulls": 3
        })
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::with_auth(
            &server.uri(),
            Arc::new(BasicAuth::new("admin", "secret")),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn query_skips_unset_filters() {
        assert_eq!(query(&[("source", None), ("name", Some(""))]), "");
        assert_eq!(
            query(&[("source", Some("github")), ("author", None), ("name", Some("a b"))]),
            "?source=github&name=a%20b"
        );
    }

    #[test]
    fn version_path_carries_identifier() {
        let fqn: Fqn = "github/acme/auth".parse().unwrap();
        assert_eq!(
            version_path("/artifact", &fqn, "hash:9f2c"),
            "/artifact?source=github&author=acme&name=auth&identifier=hash%3A9f2c"
        );
    }

    #[test]
    fn tags_split_on_whitespace() {
        assert_eq!(split_tags(Some(" latest  stable ")), vec!["latest", "stable"]);
        assert!(split_tags(None).is_empty());
    }

    #[test]
    fn tag_changes_need_hash_identifier() {
        let (fqn, hash) = hash_identified("github/acme/auth:hash:9f2c").unwrap();
        assert_eq!(fqn.name, "auth");
        assert_eq!(hash, "9f2c");

        assert!(matches!(
            hash_identified("github/acme/auth:latest"),
            Err(CliError::Validation(_))
        ));
        assert!(hash_identified("github/acme/auth:hash:").is_err());
    }

    #[test]
    fn upload_requires_existing_wasm_file() {
        assert!(matches!(
            check_wasm_file(Path::new("plugin.txt")),
            Err(CliError::Validation(_))
        ));
        assert!(matches!(
            check_wasm_file(Path::new("/nonexistent/encl/plugin.wasm")),
            Err(CliError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_sends_filters_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/artifact/list"))
            .and(query_param("author", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([artifact_json()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let path = format!("/artifact/list{}", query(&[("author", Some("acme"))]));
        let artifacts: Vec<Artifact> = client.get(&path).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].fqn.to_string(), "github/acme/auth");
    }

    #[tokio::test]
    async fn upload_posts_multipart_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/artifact/upload"))
            .respond_with(ResponseTemplate::new(201).set_body_json(artifact_json()))
            .expect(1)
            .mount(&server)
            .await;

        let file = std::env::temp_dir().join(format!("encl-upload-{}.wasm", std::process::id()));
        std::fs::write(&file, b"\0asm").unwrap();

        let fqn: Fqn = "github/acme/auth".parse().unwrap();
        let result = upload(&client_for(&server), &fqn, &file, &["latest".to_string()]).await;
        std::fs::remove_file(&file).unwrap();

        let artifact = result.unwrap();
        assert_eq!(artifact.version_hash, "9f2c");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"source\""));
        assert!(body.contains("name=\"tag\""));
        assert!(body.contains("filename=\"plugin.wasm\""));
    }
}
