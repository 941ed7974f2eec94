use anyhow::Result;
use csv_splitter::summary::GeminiSummarizer;
use csv_splitter::utils::SummaryConfig;
use csv_splitter::{AppConfig, Workbench, FALLBACK_MESSAGE};
use std::io::{Cursor, Read};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_csv() -> Vec<u8> {
    let mut csv = String::from("sku,description,qty\n");
    for i in 0..45 {
        csv.push_str(&format!("SKU-{:03},\"Widget, size {}\",{}\n", i, i % 5, i * 2));
    }
    csv.push_str("\n\n");
    csv.into_bytes()
}

fn config_for(server: &MockServer, out: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.split.default_rows_per_file = 20;
    config.export.output_dir = out.path().to_path_buf();
    config.summary = SummaryConfig {
        endpoint: server.uri(),
        model: "flash".to_string(),
        api_key_env: "CSV_SPLITTER_WORKFLOW_UNSET_KEY".to_string(),
        ..Default::default()
    };
    config
}

#[tokio::test]
async fn load_analyze_split_and_bundle() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Inventory of widgets."}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new()?;
    let config = config_for(&server, &out);
    let summarizer = GeminiSummarizer::new(&config.summary)?.with_api_key("k");
    let wb = Workbench::new(config, summarizer)?;

    let table = wb.load_bytes("inventory.csv", sample_csv()).await?;
    assert_eq!(table.row_count(), 45);

    let (summary, chunks) = tokio::join!(wb.analyze(), wb.split());
    assert_eq!(summary?, "Inventory of widgets.");
    let chunks = chunks?;
    assert_eq!(
        chunks.iter().map(|c| c.row_count).collect::<Vec<_>>(),
        vec![20, 20, 5]
    );

    let exported = wb.export_all(None).await?;
    assert_eq!(exported.path, out.path().join("inventory_split.zip"));

    let bytes = std::fs::read(&exported.path)?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    for chunk in chunks.iter() {
        let mut entry = archive.by_name(&chunk.name)?;
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        assert_eq!(content, chunk.content);
    }
    Ok(())
}

#[tokio::test]
async fn summary_outage_does_not_block_splitting() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let out = TempDir::new()?;
    let config = config_for(&server, &out);
    let summarizer = GeminiSummarizer::new(&config.summary)?.with_api_key("k");
    let wb = Workbench::new(config, summarizer)?;

    wb.load_bytes("inventory.csv", sample_csv()).await?;
    assert_eq!(wb.analyze().await?, FALLBACK_MESSAGE);

    let chunks = wb.split().await?;
    assert_eq!(chunks.len(), 3);

    let first = wb.export_chunk(0).await?;
    assert_eq!(
        std::fs::read_to_string(first.path)?,
        chunks[0].content
    );
    Ok(())
}

#[tokio::test]
async fn custom_archive_name_gets_zip_suffix() -> Result<()> {
    let server = MockServer::start().await;
    let out = TempDir::new()?;
    let config = config_for(&server, &out);
    let summarizer = GeminiSummarizer::new(&config.summary)?;
    let wb = Workbench::new(config, summarizer)?;

    wb.load_bytes("inventory.csv", sample_csv()).await?;
    wb.split().await?;

    let exported = wb.export_all(Some("parts")).await?;
    assert_eq!(exported.path, out.path().join("parts.zip"));
    Ok(())
}
