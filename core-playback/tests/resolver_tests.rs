//! Tests for stream resolution
//!
//! This test suite verifies:
//! - Lookup request shape (endpoint, encoding, headers, timeout)
//! - Stream URL priority and failure classification
//! - Fallback tool output parsing
//! - Fallback timeout and process-tree termination

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::BridgeError;
use bytes::Bytes;
use core_playback::{
    ErrorKind, MediaInfoSource, MediaReference, PlaybackConfig, RemoteApiResolver,
    ResolutionOutcome, ResolutionStrategy, ResolveAttempt, ResolverChain, StreamResolver,
};
use mockall::mock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

const SOURCE: &str = "https://video.example.com/watch?v=aaa&t=10";
const ENCODED: &str = "https%3A%2F%2Fvideo.example.com%2Fwatch%3Fv%3Daaa%26t%3D10";

fn config() -> PlaybackConfig {
    PlaybackConfig {
        user_agent: "Reelcast/test".to_string(),
        ..PlaybackConfig::default().with_api_base_url("https://api.test/")
    }
}

fn respond(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn resolver_returning(status: u16, body: &'static str) -> RemoteApiResolver {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .times(1)
        .returning(move |_| Ok(respond(status, body)));
    RemoteApiResolver::new(Arc::new(http), &config())
}

async fn resolve_remote(resolver: &RemoteApiResolver) -> ResolutionOutcome {
    let reference = MediaReference::remote(SOURCE).unwrap();
    resolver.resolve(&reference, ResolveAttempt::Primary).await
}

// ============================================================================
// Remote Lookup
// ============================================================================

#[tokio::test]
async fn test_lookup_request_shape() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|request| {
            request.url == format!("https://api.test/api/download?url={ENCODED}")
                && request.headers.get("User-Agent").map(String::as_str) == Some("Reelcast/test")
                && request.timeout == Some(Duration::from_secs(30))
        })
        .times(1)
        .returning(|_| Ok(respond(200, r#"{"url": "https://cdn/a.mp4"}"#)));

    let resolver = RemoteApiResolver::new(Arc::new(http), &config());
    assert_eq!(resolver.lookup(SOURCE).await.unwrap(), "https://cdn/a.mp4");
}

#[tokio::test]
async fn test_stream_url_priority() {
    let cases = [
        (
            r#"{"video_url": "v1", "url": "u1", "streams": [{"url": "s1"}]}"#,
            "v1",
        ),
        (r#"{"url": "u1", "streams": [{"url": "s1"}]}"#, "u1"),
        (r#"{"streams": [{"url": "s1"}, {"url": "s2"}]}"#, "s1"),
        (r#"{"VIDEO_URL": "", "Url": "u2"}"#, "u2"),
    ];

    for (body, expected) in cases {
        let outcome = resolve_remote(&resolver_returning(200, body)).await;
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved {
                url: expected.to_string(),
                strategy: ResolutionStrategy::Remote,
            },
            "body: {body}"
        );
    }
}

#[tokio::test]
async fn test_empty_response_finds_no_stream() {
    let outcome = resolve_remote(&resolver_returning(200, "{}")).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::NoStreamFound));

    let outcome = resolve_remote(&resolver_returning(
        200,
        r#"{"status": "error", "message": "unsupported site", "streams": []}"#,
    ))
    .await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::NoStreamFound));
}

#[tokio::test]
async fn test_error_status_is_network_error() {
    let outcome = resolve_remote(&resolver_returning(500, "upstream exploded")).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::NetworkError));

    let outcome = resolve_remote(&resolver_returning(404, r#"{"url": "u1"}"#)).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::NetworkError));
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Err(BridgeError::Timeout("deadline exceeded".to_string())));
    let resolver = RemoteApiResolver::new(Arc::new(http), &config());

    let outcome = resolve_remote(&resolver).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::NetworkError));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let outcome = resolve_remote(&resolver_returning(200, "<html>oops</html>")).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::ParseError));

    let outcome = resolve_remote(&resolver_returning(200, r#""just a string""#)).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::ParseError));
}

#[tokio::test]
async fn test_array_body_is_parse_error() {
    let outcome = resolve_remote(&resolver_returning(200, "[]")).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::ParseError));

    let outcome =
        resolve_remote(&resolver_returning(200, r#"["t", "https://cdn/x.mp4"]"#)).await;
    assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::ParseError));
}

#[tokio::test]
async fn test_bad_stream_entries_keep_video_url() {
    let outcome = resolve_remote(&resolver_returning(
        200,
        r#"{"video_url": "https://cdn/v1.mp4", "streams": [null, "x"]}"#,
    ))
    .await;
    assert_eq!(
        outcome,
        ResolutionOutcome::Resolved {
            url: "https://cdn/v1.mp4".to_string(),
            strategy: ResolutionStrategy::Remote,
        }
    );
}

#[tokio::test]
async fn test_fetch_info_uses_info_endpoint() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|request| request.url == format!("https://api.test/api/info?url={ENCODED}"))
        .times(1)
        .returning(|_| {
            Ok(respond(
                200,
                r#"{"Title": "Launch", "channel": "Space", "duration": 93.4, "formats": []}"#,
            ))
        });
    let resolver = RemoteApiResolver::new(Arc::new(http), &config());

    let info = resolver.fetch_info(SOURCE).await.unwrap();
    assert_eq!(info.title, "Launch");
    assert_eq!(info.channel.as_deref(), Some("Space"));
    assert_eq!(info.duration_secs, Some(93));
    assert!(info.thumbnail.is_none());
}

#[tokio::test]
async fn test_chain_never_looks_up_local_items() {
    let mut http = MockHttpClient::new();
    http.expect_execute().times(0);
    let chain = ResolverChain::primary_only(Arc::new(RemoteApiResolver::new(
        Arc::new(http),
        &config(),
    )));

    let local = MediaReference::local("/media/clip.mp4").unwrap();
    let outcome = chain.resolve(&local, ResolveAttempt::Primary).await;
    assert!(!outcome.is_resolved());
}

// ============================================================================
// Subprocess Fallback
// ============================================================================

#[cfg(unix)]
mod subprocess {
    use super::*;
    use core_playback::{PlaybackError, SubprocessResolver};
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-resolver");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        drop(file);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn resolver(path: &PathBuf, timeout: Duration) -> SubprocessResolver {
        SubprocessResolver::new(path.to_string_lossy(), timeout)
    }

    #[tokio::test]
    async fn test_takes_first_non_blank_line() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "printf '\\n   \\n  https://cdn/x.mp4  \\nhttps://cdn/y.mp4\\n'\n");

        let url = resolver(&path, Duration::from_secs(5)).run(SOURCE).await.unwrap();
        assert_eq!(url, "https://cdn/x.mp4");
    }

    #[tokio::test]
    async fn test_passes_source_without_shell_interpretation() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "echo \"$@\"\n");
        let source = "https://example.com/watch?v=1&list=$(reboot)";

        let echoed = resolver(&path, Duration::from_secs(5)).run(source).await.unwrap();
        assert_eq!(
            echoed,
            format!("-f best --get-url --no-warnings --no-playlist -- {source}")
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_still_uses_stdout() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "echo https://cdn/partial.mp4\necho 'WARNING: oops' >&2\nexit 1\n");

        let url = resolver(&path, Duration::from_secs(5)).run(SOURCE).await.unwrap();
        assert_eq!(url, "https://cdn/partial.mp4");
    }

    #[tokio::test]
    async fn test_blank_output_finds_no_stream() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "echo '   '\n");

        let reference = MediaReference::remote(SOURCE).unwrap();
        let outcome = resolver(&path, Duration::from_secs(5))
            .resolve(&reference, ResolveAttempt::Fallback)
            .await;
        assert_eq!(outcome, ResolutionOutcome::failed(ErrorKind::NoStreamFound));
    }

    #[tokio::test]
    async fn test_resolve_reports_fallback_strategy() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "echo https://cdn/fb.mp4\n");

        let reference = MediaReference::remote(SOURCE).unwrap();
        let outcome = resolver(&path, Duration::from_secs(5))
            .resolve(&reference, ResolveAttempt::Fallback)
            .await;
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved {
                url: "https://cdn/fb.mp4".to_string(),
                strategy: ResolutionStrategy::Fallback,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_tool_is_unavailable_not_timeout() {
        let reference = MediaReference::remote(SOURCE).unwrap();
        let outcome = SubprocessResolver::new("/nonexistent/yt-dlp", Duration::from_secs(5))
            .resolve(&reference, ResolveAttempt::Fallback)
            .await;
        assert_eq!(
            outcome,
            ResolutionOutcome::failed(ErrorKind::SubprocessUnavailable)
        );
    }

    #[tokio::test]
    async fn test_timeout_kills_tool_and_descendants() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        let path = script(
            &dir,
            &format!(
                "sleep 30 &\necho $! > '{}'\nwait\n",
                pid_file.display()
            ),
        );

        let started = std::time::Instant::now();
        let result = resolver(&path, Duration::from_millis(500)).run(SOURCE).await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(PlaybackError::SubprocessTimeout(_))));
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(5));

        #[cfg(target_os = "linux")]
        {
            let pid: u32 = std::fs::read_to_string(&pid_file)
                .unwrap()
                .trim()
                .parse()
                .unwrap();
            let mut alive = true;
            for _ in 0..100 {
                alive = is_running(pid);
                if !alive {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            assert!(!alive, "grandchild {pid} survived the timeout");
        }
    }

    /// Zombies count as dead.
    #[cfg(target_os = "linux")]
    fn is_running(pid: u32) -> bool {
        let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
            return false;
        };
        let state = stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next());
        !matches!(state, Some('Z') | Some('X') | None)
    }
}
