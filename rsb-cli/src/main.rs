use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rsb_core::{
    bind, BotConfig, ConsoleMailer, MatchMode, Mailer, PollOutcome, RedditListing, RuleRegistry,
    SearchBot, SendmailMailer,
};

use rsb::ConfigFile;

#[derive(Parser)]
#[command(name = "rsb", version)]
#[command(about = "searches Reddit posts and matches posts that meet known rules")]
struct Args {
    /// Subreddit to watch (with or without the r/ prefix)
    subreddit: Option<String>,

    /// Exports the program configuration file
    #[arg(short, long)]
    export_config: bool,

    /// Displays the filesystem path to the program's default configuration file
    #[arg(short, long)]
    show_config_path: bool,

    /// Alternative PATH for the program's configuration file
    #[arg(short, long, value_name = "PATH")]
    config_path: Option<String>,

    /// List the registered rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Stop after the first report
    #[arg(long)]
    once: bool,

    /// Print reports instead of mailing them
    #[arg(long)]
    dry_run: bool,

    /// Number of posts to gather per report (overrides the config file)
    #[arg(long)]
    threshold: Option<usize>,

    /// per-rule or all-rules (overrides the config file)
    #[arg(long)]
    match_mode: Option<MatchMode>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    if args.show_config_path {
        println!("{}", ConfigFile::default_path()?.display());
        return Ok(());
    }

    let config_file = match &args.config_path {
        Some(path) => ConfigFile::at(path),
        None => {
            let file = ConfigFile::default_location()?;
            if file.ensure_exists()? {
                println!("📝 Created default config at: {}", file.path().display());
            }
            file
        }
    };

    if args.export_config {
        println!("{}", config_file.contents()?);
        return Ok(());
    }

    let registry = RuleRegistry::with_builtin_rules();

    if args.list_rules {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(subreddit) = args.subreddit.as_deref() else {
        bail!("SUBREDDIT_NAME argument is required");
    };

    let mut config = config_file.load()?;
    println!("📋 Loaded config from: {}", config_file.path().display());

    if let Some(threshold) = args.threshold {
        config.post_threshold = threshold;
    }
    if let Some(mode) = args.match_mode {
        config.match_mode = mode;
    }
    config.validate()?;

    // Rule problems end the run before anything is polled.
    let rules = bind(&registry, &config.rules).context("failed to set up rules")?;
    println!(
        "🔧 {} rule(s) bound, {} mode, reporting every {} posts",
        rules.len(),
        config.match_mode,
        config.post_threshold
    );

    if args.dry_run {
        watch(&config, subreddit, rules, ConsoleMailer, args.once, false)
    } else {
        config.validate_mail()?;
        let mailer = SendmailMailer::new(&config.sendmail_path);
        watch(&config, subreddit, rules, mailer, args.once, true)
    }
}

fn watch<M: Mailer>(
    config: &BotConfig,
    subreddit: &str,
    rules: Vec<rsb_core::RuleHandle>,
    mailer: M,
    once: bool,
    announce: bool,
) -> Result<()> {
    let source = RedditListing::new(subreddit, &config.user_agent);
    let mut bot = SearchBot::new(config, subreddit, rules, source, mailer);

    if announce {
        bot.announce()?;
    }

    println!("👀 Watching r/{}", subreddit.trim_start_matches("r/"));
    if once {
        if let PollOutcome::Reported { posts, matches } = bot.run_once()? {
            println!("✅ Reported {posts} posts with {} match(es)", matches.len());
        }
        return Ok(());
    }
    bot.run()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
