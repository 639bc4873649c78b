//! postgrab CLI
//!
//! Opens a feed-post URL in a browser (or attaches to a running one), walks
//! the post's slides to collect every media item, and downloads them with
//! deterministic filenames.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;

use postgrab::{
    plan_downloads, BrowserSession, ConnectionOptions, DownloadConfig, Downloader, LaunchOptions,
    PostContext, PostSlides, WalkerConfig,
};

#[derive(Parser)]
#[command(name = "postgrab", version, about = "Collect and download media from a feed post")]
struct Args {
    /// Post URL to open
    url: String,

    /// Directory downloads are written to
    #[arg(short, long, default_value = "downloads")]
    out_dir: PathBuf,

    /// Launch the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Attach to a running browser over this DevTools WebSocket URL
    #[arg(long)]
    connect: Option<String>,

    /// Only list the collected media, do not download
    #[arg(long)]
    list: bool,

    /// Slide budget per post
    #[arg(long, default_value_t = 20)]
    max_slides: usize,

    /// Settle delay after a slide transition, in milliseconds
    #[arg(long, default_value_t = 600)]
    settle_ms: u64,

    /// Pause between bulk downloads, in milliseconds
    #[arg(long, default_value_t = 800)]
    stagger_ms: u64,

    /// Per-fetch timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session = match &args.connect {
        Some(ws_url) => BrowserSession::connect(ConnectionOptions::new(ws_url))?,
        None => BrowserSession::launch(LaunchOptions::new().headless(!args.headed))?,
    };

    eprintln!("opening {}", args.url);
    session.navigate(&args.url)?;
    session.wait_for_navigation()?;

    let Some(mut post) = session.find_post()? else {
        eprintln!("no post found on this page");
        return Ok(());
    };

    let page_url = post.page_url();
    let context = PostContext::from_post(&post.snapshot()?, Some(&page_url));
    eprintln!("post by '{}' (date: {})", context.account, context.post_date);

    let walker_config = WalkerConfig::new()
        .max_steps(args.max_slides)
        .settle(Duration::from_millis(args.settle_ms));
    let collection = postgrab::collect_media(&mut post, &walker_config)?;

    if collection.is_empty() {
        eprintln!("no media found in this post");
        return Ok(());
    }
    eprintln!("collected {} media item(s)", collection.len());

    if args.list {
        let set = collection.into_display(Local::now().timestamp_millis());
        for item in set.items() {
            println!(
                "{} {}",
                if item.is_video { "video" } else { "image" },
                item.display_url
            );
        }
        return Ok(());
    }

    let tasks = plan_downloads(&collection, &context, Local::now().naive_local());
    let download_config = DownloadConfig::new(&args.out_dir)
        .timeout(Duration::from_secs(args.timeout_secs))
        .stagger(Duration::from_millis(args.stagger_ms));
    let downloader = Downloader::new(download_config)?
        .last_resort(Box::new(session.click_through_backend()?));

    let report = downloader.download_all(&tasks);
    if report.failed > 0 {
        eprintln!("{} of {} download(s) failed", report.failed, report.attempted());
    } else {
        eprintln!(
            "downloaded {} file(s) to {}",
            report.succeeded,
            args.out_dir.display()
        );
    }

    Ok(())
}
