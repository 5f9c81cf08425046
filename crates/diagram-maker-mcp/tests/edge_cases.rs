//! Edge case tests for diagram-maker-mcp.
//!
//! Malformed calls must come back as ordinary text replies, and the server
//! must keep serving afterwards.

mod common;

use std::path::Path;

use anyhow::Result;
use diagram_maker_mcp::client::reply_text;
use serde_json::json;

#[tokio::test]
async fn test_unknown_tool() -> Result<()> {
    let h = common::start_default().await?;
    let result = h.client.call_tool("does_not_exist", None).await?;

    assert_eq!(result.content.len(), 1);
    assert_eq!(
        reply_text(&result),
        Some("error: unknown tool: does_not_exist")
    );

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_missing_input() -> Result<()> {
    let h = common::start_default().await?;
    let out = h.path("never.png");

    let result = h
        .client
        .render(
            "create_plantuml_diagram",
            json!({"output_format": "png", "output_path": out}),
        )
        .await?;

    assert!(result.text().starts_with("error: missing input"), "{result}");
    assert!(!Path::new(&out).exists());

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_format_touches_nothing() -> Result<()> {
    let h = common::start_default().await?;
    let out = h.path("fresh/dir/chart.pdf");

    let result = h
        .client
        .render(
            "create_vega_lite_chart",
            json!({"vl_spec": "{}", "output_format": "pdf", "output_path": out}),
        )
        .await?;

    assert!(
        result.text().starts_with("error: unsupported format"),
        "{result}"
    );
    assert!(!h.dir.path().join("fresh").exists());

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_mermaid_png_not_implemented() -> Result<()> {
    let h = common::start_default().await?;
    let result = h
        .client
        .render(
            "create_mermaid_chart",
            json!({"source": "graph TD; A-->B", "output_format": "png", "output_path": h.path("c.png")}),
        )
        .await?;

    assert_eq!(
        result.text(),
        "error: not implemented: png output for create_mermaid_chart is not implemented"
    );

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_malformed_vega_lite() -> Result<()> {
    let h = common::start_default().await?;
    let result = h
        .client
        .render(
            "create_vega_lite_chart",
            json!({"vl_spec": "not json", "output_format": "png", "output_path": h.path("v.png")}),
        )
        .await?;

    assert!(result.text().starts_with("error: malformed spec"), "{result}");

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_wrong_argument_type() -> Result<()> {
    let h = common::start_default().await?;
    let result = h
        .client
        .render(
            "create_mermaid_chart",
            json!({"source": ["graph", "TD"], "output_format": "html", "output_path": h.path("x.html")}),
        )
        .await?;

    assert_eq!(
        result.text(),
        "error: invalid argument: `source` must be a string"
    );

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_file_input_wins() -> Result<()> {
    let h = common::start_default().await?;
    let src = h.path("chart.mmd");
    std::fs::write(&src, "graph LR; FileSide-->X")?;
    let out = h.path("chart.html");

    let result = h
        .client
        .render(
            "create_mermaid_chart",
            json!({
                "source": "graph LR; InlineSide-->Y",
                "input_filepath": src,
                "output_format": "html",
                "output_path": out,
            }),
        )
        .await?;

    assert!(!result.is_error(), "{result}");
    let html = std::fs::read_to_string(&out)?;
    assert!(html.contains("FileSide"));
    assert!(!html.contains("InlineSide"));

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_server_survives_failures() -> Result<()> {
    let h = common::start_default().await?;

    for _ in 0..3 {
        let result = h.client.call_tool("does_not_exist", None).await?;
        assert!(reply_text(&result).unwrap().starts_with("error: "));
    }

    let out = h.path("after.html");
    let result = h
        .client
        .render(
            "create_mermaid_chart",
            json!({"source": "graph TD; A-->B", "output_path": out}),
        )
        .await?;
    assert_eq!(result.text(), out);

    h.client.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_calls() -> Result<()> {
    let h = common::start_default().await?;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = h.client.clone();
        let out = h.path(&format!("many/chart-{i}.html"));
        tasks.push(tokio::spawn(async move {
            client
                .render(
                    "create_mermaid_chart",
                    json!({"source": format!("graph TD; N{i}-->M"), "output_path": out}),
                )
                .await
        }));
    }

    for task in tasks {
        let result = task.await??;
        assert!(!result.is_error(), "{result}");
    }
    assert_eq!(std::fs::read_dir(h.dir.path().join("many"))?.count(), 8);

    h.client.disconnect().await?;
    Ok(())
}
