use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, Command};
use tracing::{info, warn};

use comment_chapters::{
    format_timestamp, parse_video_id, Config, ExtractionResult, ManualParser, TimestampExtractor,
    YouTubeDataApi,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("chapter-extract")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract chapter timestamps from video comments or pasted text")
        .arg(
            Arg::new("video")
                .value_name("URL_OR_ID")
                .help("Video URL or id to extract comment timestamps from")
                .required_unless_present("manual"),
        )
        .arg(
            Arg::new("manual")
                .short('m')
                .long("manual")
                .value_name("FILE")
                .help("Parse timestamps from a plaintext file instead of comments"),
        )
        .arg(
            Arg::new("duration")
                .short('d')
                .long("duration")
                .value_name("SECONDS")
                .help("Video duration ceiling for manual parsing"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Comment API key (also read from config or YOUTUBE_API_KEY)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit the full result (entries and trace) as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let filter = if matches.get_flag("verbose") {
        "comment_chapters=debug,info"
    } else {
        "comment_chapters=info,warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    let duration = matches
        .get_one::<String>("duration")
        .map(|d| d.parse::<u32>())
        .transpose()?;

    let result = if let Some(path) = matches.get_one::<String>("manual") {
        let text = tokio::fs::read_to_string(path).await?;
        let parser = ManualParser::new(
            config.extraction.manual_dedup_gap_seconds,
            config.extraction.max_caption_length,
        );
        parser.parse(&text, duration)
    } else {
        let input = matches
            .get_one::<String>("video")
            .map(String::as_str)
            .unwrap_or_default();
        let video_id = parse_video_id(input)?;

        let api_key = config
            .resolved_api_key(matches.get_one::<String>("api-key").cloned())
            .ok_or_else(|| {
                anyhow::anyhow!("API key required: pass --api-key, set it in config, or export YOUTUBE_API_KEY")
            })?;

        let api = Arc::new(YouTubeDataApi::from_config(&config.source, api_key));
        let extractor = TimestampExtractor::new(api.clone(), config.extraction.clone())
            .with_video_info(api);

        extractor.extract(&video_id).await?
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_entries(&result);
    }

    Ok(())
}

fn print_entries(result: &ExtractionResult) {
    if result.is_empty() {
        println!("No timestamps found.");
        return;
    }

    info!(
        "📊 {} timestamps from {} comments",
        result.entries.len(),
        result.comments_scanned
    );
    for entry in &result.entries {
        println!("{:>8}  {}", format_timestamp(entry.seconds), entry.caption);
    }
}
