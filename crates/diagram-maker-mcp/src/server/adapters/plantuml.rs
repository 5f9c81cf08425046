//! PlantUML diagrams rendered by a PlantUML server.
//!
//! The source travels in the URL: raw DEFLATE, then PlantUML's own base64
//! alphabet (`0-9A-Za-z-_`). Responses are never cached or reused.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use diagram_maker_types::{OutputFormat, RenderError, RenderOutcome, ResolvedInput};
use flate2::write::DeflateEncoder;
use flate2::Compression;

use super::RenderAdapter;
use crate::server::materialize;

const ENGINE: &str = "PlantUML";

/// Renders PlantUML source through a PlantUML server.
#[derive(Debug, Clone)]
pub struct PlantUmlAdapter {
    server_url: String,
    http: reqwest::Client,
}

impl PlantUmlAdapter {
    /// Create an adapter for the server at `server_url`.
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("diagram-maker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build PlantUML HTTP client")?;

        Ok(Self {
            server_url: server_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// URL that renders `source` as `format`.
    pub fn render_url(&self, source: &str, format: OutputFormat) -> RenderOutcome<String> {
        let encoded = encode_plantuml(source)
            .map_err(|e| RenderError::backend(ENGINE, format!("failed to encode source: {e}")))?;
        Ok(format!("{}/{}/{}", self.server_url, format, encoded))
    }

    async fn fetch(&self, url: &str) -> RenderOutcome<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| RenderError::backend(ENGINE, format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RenderError::backend(ENGINE, format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let excerpt: String = String::from_utf8_lossy(&body).chars().take(300).collect();
            return Err(RenderError::backend(
                ENGINE,
                format!("server returned {status}: {}", excerpt.trim()),
            ));
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl RenderAdapter for PlantUmlAdapter {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    async fn render(
        &self,
        input: &ResolvedInput,
        format: OutputFormat,
        output_path: &Path,
    ) -> RenderOutcome<String> {
        if format == OutputFormat::Html {
            return Err(RenderError::UnsupportedFormat {
                tool: "create_plantuml_diagram".to_string(),
                format: format.to_string(),
                supported: "png, svg".to_string(),
            });
        }

        let url = self.render_url(input.content(), format)?;
        tracing::debug!(%format, url_len = url.len(), "requesting PlantUML render");
        let image = self.fetch(&url).await?;
        materialize::write(output_path, image).await
    }
}

/// Encode PlantUML source the way PlantUML servers expect it in URLs.
pub fn encode_plantuml(source: &str) -> std::io::Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(source.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(encode64(&compressed))
}

fn encode64(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);
        out.push(encode6(b1 >> 2));
        out.push(encode6(((b1 & 0x3) << 4) | (b2 >> 4)));
        out.push(encode6(((b2 & 0xF) << 2) | (b3 >> 6)));
        out.push(encode6(b3 & 0x3F));
    }
    out
}

fn encode6(b: u8) -> char {
    let b = b & 0x3F;
    match b {
        0..=9 => (b'0' + b) as char,
        10..=35 => (b'A' + b - 10) as char,
        36..=61 => (b'a' + b - 36) as char,
        62 => '-',
        _ => '_',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use std::io::Read;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SOURCE: &str = "@startuml\nAlice -> Bob: hello\n@enduml";

    fn decode6(c: char) -> u8 {
        match c {
            '0'..='9' => c as u8 - b'0',
            'A'..='Z' => c as u8 - b'A' + 10,
            'a'..='z' => c as u8 - b'a' + 36,
            '-' => 62,
            _ => 63,
        }
    }

    fn decode64(s: &str) -> Vec<u8> {
        let chars: Vec<u8> = s.chars().map(decode6).collect();
        let mut out = Vec::new();
        for quad in chars.chunks(4) {
            out.push((quad[0] << 2) | (quad[1] >> 4));
            out.push(((quad[1] & 0xF) << 4) | (quad[2] >> 2));
            out.push(((quad[2] & 0x3) << 6) | quad[3]);
        }
        out
    }

    #[test]
    fn encode6_alphabet() {
        assert_eq!(encode6(0), '0');
        assert_eq!(encode6(9), '9');
        assert_eq!(encode6(10), 'A');
        assert_eq!(encode6(35), 'Z');
        assert_eq!(encode6(36), 'a');
        assert_eq!(encode6(61), 'z');
        assert_eq!(encode6(62), '-');
        assert_eq!(encode6(63), '_');
    }

    #[test]
    fn encode64_packs_three_bytes_into_four_chars() {
        assert_eq!(encode64(&[0, 0, 0]), "0000");
        assert_eq!(encode64(&[0xFF, 0xFF, 0xFF]), "____");
        // Partial chunks are zero padded.
        assert_eq!(encode64(&[0xFF]).len(), 4);
    }

    #[test]
    fn encoding_inflates_back_to_source() {
        let encoded = encode_plantuml(SOURCE).unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let compressed = decode64(&encoded);
        let mut inflated = String::new();
        // Zero padding after the final DEFLATE block is ignored by the decoder.
        DeflateDecoder::new(&compressed[..])
            .read_to_string(&mut inflated)
            .unwrap();
        assert_eq!(inflated, SOURCE);
    }

    #[test]
    fn render_url_trims_trailing_slash() {
        let adapter =
            PlantUmlAdapter::new("http://localhost:8080/plantuml/", Duration::from_secs(1)).unwrap();
        let url = adapter.render_url(SOURCE, OutputFormat::Svg).unwrap();
        assert!(url.starts_with("http://localhost:8080/plantuml/svg/"), "{url}");
    }

    #[tokio::test]
    async fn renders_png_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/png/[0-9A-Za-z_-]+$"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG fake".to_vec()))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("uml/seq.png");
        let adapter = PlantUmlAdapter::new(server.uri(), Duration::from_secs(5)).unwrap();
        let input = ResolvedInput::new(SOURCE).unwrap();

        // No reuse between calls: both renders reach the server.
        for _ in 0..2 {
            let path = adapter
                .render(&input, OutputFormat::Png, &out)
                .await
                .expect("render failed");
            assert_eq!(path, out.to_string_lossy());
        }
        assert_eq!(std::fs::read(&out).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn server_error_is_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/svg/.+$"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Syntax Error?"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bad.svg");
        let adapter = PlantUmlAdapter::new(server.uri(), Duration::from_secs(5)).unwrap();
        let input = ResolvedInput::new("@startuml\n-> -> ->\n@enduml").unwrap();

        let err = adapter
            .render(&input, OutputFormat::Svg, &out)
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("PlantUML rendering failed"), "{text}");
        assert!(text.contains("400"), "{text}");
        assert!(text.contains("Syntax Error?"), "{text}");
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn html_is_unsupported() {
        let adapter = PlantUmlAdapter::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let input = ResolvedInput::new(SOURCE).unwrap();
        let err = adapter
            .render(&input, OutputFormat::Html, Path::new("out.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat { .. }));
    }
}
