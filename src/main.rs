//! wikitrans - 维基正文提取与翻译

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;

use wikitrans::builders::DocumentStyle;
use wikitrans::core::{process_page, Collaborators, WikiOptions, DEFAULT_OUTPUT, DEFAULT_WORKERS};
use wikitrans::env::{self, EnvVar};
use wikitrans::network::{Session, SessionOptions};
use wikitrans::parsers::html::anchor::AnchorSpec;
use wikitrans::parsers::html::assets::{ImageReplacements, DEFAULT_ASSET_DIR};
use wikitrans::parsers::html::boundary::BoundaryPolicy;
use wikitrans::parsers::html::links::LinkMode;
use wikitrans::translation::{ConfigManager, TranslationConfig, TranslationService};
use wikitrans::utils::url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BoundaryKind {
    /// Stop before the first node whose text contains the marker
    Textual,
    /// Stop after the trailing attribution container
    Structural,
    /// Take every sibling, then cut the output after the landmark
    Unconditional,
}

#[derive(Parser)]
#[command(name = "wikitrans")]
#[command(version, about = "Extract, translate and localize a wiki article into a single HTML file", long_about = None)]
#[command(after_help = "EXAMPLES:
    wikitrans https://en.tankiwiki.com/Crystals -o crystals.html
    wikitrans page.html --no-translate --boundary textual
    wikitrans https://wiki.example/Page --container-id mw-content-text --container-class mw-parser-output")]
struct Cli {
    /// Page URL or local HTML file
    #[arg(value_name = "URL|PATH", required_unless_present_any = ["env_docs", "generate_config"])]
    target: Option<String>,

    /// Output file; supports %title% and %timestamp%
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Directory for localized images, relative to the output file
    #[arg(long, value_name = "DIR")]
    asset_dir: Option<String>,

    /// JSON table mapping absolute image URLs to replacement images
    #[arg(long, value_name = "FILE")]
    image_map: Option<PathBuf>,

    /// Base URL for resolving relative links and images
    #[arg(short, long, value_name = "URL")]
    base_url: Option<String>,

    /// Substring of the comment that marks where the article starts
    #[arg(long, value_name = "TEXT", conflicts_with_all = ["container_id", "container_class"])]
    sentinel: Option<String>,

    /// Use the children of the element with this id as the article
    #[arg(long, value_name = "ID")]
    container_id: Option<String>,

    /// Use the children of the first element with this class as the article
    #[arg(long, value_name = "CLASS")]
    container_class: Option<String>,

    /// How the end of the article is detected
    #[arg(long, value_enum, default_value_t = BoundaryKind::Structural)]
    boundary: BoundaryKind,

    /// Text marker for --boundary textual
    #[arg(long, value_name = "TEXT")]
    marker: Option<String>,

    /// Truncation landmark for --boundary unconditional
    #[arg(long, value_name = "TEXT")]
    landmark: Option<String>,

    /// Remove elements with this id or class from the article (repeatable)
    #[arg(long = "strip", value_name = "NAME")]
    strip: Vec<String>,

    /// Target language
    #[arg(long, value_name = "LANG")]
    target_lang: Option<String>,

    /// Source language
    #[arg(long, value_name = "LANG")]
    source_lang: Option<String>,

    /// DeepLX-compatible translation endpoint
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// JSON glossary applied before translation
    #[arg(long, value_name = "FILE")]
    glossary: Option<String>,

    /// Translation configuration file (TOML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Keep the original text
    #[arg(long)]
    no_translate: bool,

    /// Point wiki article links to ./<Page>.html
    #[arg(long)]
    local_links: bool,

    /// Site suffix removed from the page title
    #[arg(long, value_name = "TEXT")]
    title_suffix: Option<String>,

    /// Network request timeout in seconds
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Abort the whole run after this many seconds
    #[arg(long, value_name = "SECONDS")]
    deadline: Option<u64>,

    /// Wait this many seconds after loading the page before reading it
    #[arg(long, value_name = "SECONDS", default_value_t = 0)]
    settle: u64,

    /// Concurrent image downloads
    #[arg(short = 'j', long, value_name = "N")]
    workers: Option<usize>,

    /// Custom User-Agent string
    #[arg(short, long, value_name = "UA")]
    user_agent: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Do not add the provenance comment
    #[arg(long)]
    no_metadata: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    env_docs: bool,

    /// Write an example configuration file and exit
    #[arg(long, value_name = "FILE")]
    generate_config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.env_docs {
        print!("{}", env::generate_env_docs());
        return ExitCode::SUCCESS;
    }

    if let Some(path) = &cli.generate_config {
        return match ConfigManager::generate_example_config(path) {
            Ok(()) => {
                eprintln!("wrote {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => env::core::LogLevel::get()
                .ok()
                .and_then(|level| level.parse().ok())
                .unwrap_or(Level::INFO),
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(!env::core::NoColor::get_or_default(false))
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let target = cli.target.as_deref().unwrap_or_default();

    let translation_config = translation_config(cli)?;
    let style = DocumentStyle::for_lang(&translation_config.target_lang);
    let translation = TranslationService::from_config(translation_config)?;

    let session = Session::new(session_options(cli))?;
    let collaborators = Collaborators::with_session(session, translation);

    let report = process_page(target, &cli.output, wiki_options(cli, style)?, collaborators)?;

    if !cli.quiet {
        eprintln!("{}", report.summary());
    }
    Ok(())
}

/// 配置文件 → 环境变量 → 命令行参数
fn translation_config(cli: &Cli) -> Result<TranslationConfig, Box<dyn std::error::Error>> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.into_config();

    if let Some(lang) = &cli.target_lang {
        config.target_lang = lang.clone();
    }
    if let Some(lang) = &cli.source_lang {
        config.source_lang = lang.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(path) = &cli.glossary {
        config.glossary_path = Some(path.clone());
    }
    if cli.no_translate {
        config.enabled = false;
    }

    config.validate()?;
    Ok(config)
}

fn session_options(cli: &Cli) -> SessionOptions {
    let mut options = SessionOptions::default();

    if let Some(timeout) = cli
        .timeout
        .map(Duration::from_secs)
        .or_else(env::network::Timeout::lookup)
    {
        options.timeout = timeout;
    }
    options.user_agent = cli
        .user_agent
        .clone()
        .or_else(env::network::UserAgent::lookup);
    options.insecure = cli.insecure;
    options.settle_delay = Duration::from_secs(cli.settle);

    options
}

fn wiki_options(cli: &Cli, style: DocumentStyle) -> Result<WikiOptions, Box<dyn std::error::Error>> {
    let mut options = WikiOptions {
        style,
        ..WikiOptions::default()
    };

    if cli.container_id.is_some() || cli.container_class.is_some() {
        options.anchor = AnchorSpec::Container {
            id: cli.container_id.clone(),
            class: cli.container_class.clone(),
        };
    } else if let Some(sentinel) = &cli.sentinel {
        options.anchor = AnchorSpec::Comment {
            sentinel: sentinel.clone(),
        };
    }

    options.boundary = match cli.boundary {
        BoundaryKind::Textual => match &cli.marker {
            Some(marker) => BoundaryPolicy::TextualMarker {
                marker: marker.clone(),
            },
            None => BoundaryPolicy::textual_default(),
        },
        BoundaryKind::Structural => BoundaryPolicy::structural_default(),
        BoundaryKind::Unconditional => match &cli.landmark {
            Some(landmark) => BoundaryPolicy::Unconditional {
                landmark: landmark.clone(),
            },
            None => BoundaryPolicy::unconditional_default(),
        },
    };

    if !cli.strip.is_empty() {
        options.strip_chrome = cli.strip.clone();
    }

    if let Some(base_url) = &cli.base_url {
        options.base_url = Some(Url::parse(base_url)?);
    }

    options.asset_dir = cli
        .asset_dir
        .clone()
        .or_else(env::core::AssetDir::lookup)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(DEFAULT_ASSET_DIR).to_path_buf());
    if let Some(path) = &cli.image_map {
        options.image_replacements = ImageReplacements::load(path)?;
    }

    options.link_mode = if cli.local_links {
        LinkMode::LocalPages
    } else {
        LinkMode::Absolute
    };
    options.title_suffix = cli.title_suffix.clone();
    options.no_metadata = cli.no_metadata;
    options.workers = cli
        .workers
        .or_else(env::core::Workers::lookup)
        .unwrap_or(DEFAULT_WORKERS);
    options.deadline = cli.deadline.map(Duration::from_secs);

    Ok(options)
}
