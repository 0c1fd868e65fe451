//! Lexi - Rust 背单词工具
//!
//! 入口：解析命令、加载配置、初始化日志，构造存储与补充器后执行 add / review / list / show。

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexi::config::load_config;
use lexi::core::AppBuilder;
use lexi::review::ReviewSession;
use lexi::store::StoreError;
use lexi::ui::{render_item_detail, render_item_line, render_items_json, ConsolePrompter};

#[derive(Parser)]
#[command(name = "lexi", about = "间隔重复背单词", version)]
struct Cli {
    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 数据库路径（覆盖配置中的 app.db_path）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// 添加单词
    Add {
        word: String,
        meaning: String,
    },

    /// 复习今天到期的单词
    Review {
        /// 本次最多复习的条数（默认取配置 app.batch_size）
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// 列出全部单词（优先级降序，到期日升序）
    List {
        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },

    /// 查看单个单词及例句
    Show {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.clone());
    let cfg = loaded.as_ref().cloned().unwrap_or_default();
    lexi::observability::init(&cfg.app.log_level);
    if let Err(e) = &loaded {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    let builder = AppBuilder::new(cfg).with_db_path(cli.db);
    let store = builder
        .build_store()
        .with_context(|| format!("Failed to open item store at {:?}", builder.db_path()))?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Add { word, meaning } => match store.insert(word.trim(), meaning.trim(), today) {
            Ok(item) => println!("已添加 #{} {}：{}", item.id, item.word, item.meaning),
            Err(StoreError::DuplicateKey(word)) => eprintln!("单词已存在：{}", word),
            Err(e) => return Err(e).context("Failed to add item"),
        },

        Command::Review { limit } => {
            let limit = limit.unwrap_or(builder.config().app.batch_size);
            let mut session = ReviewSession::new(
                store,
                builder.build_enricher(),
                ConsolePrompter::new(),
                builder.session_options(),
            );
            session.run(today, limit).await.context("Review session failed")?;
        }

        Command::List { format } => {
            let items = store.list_all().context("Failed to list items")?;
            match format {
                OutputFormat::Json => println!("{}", render_items_json(&items)?),
                OutputFormat::Plain if items.is_empty() => println!("还没有单词，用 lexi add <单词> <释义> 添加。"),
                OutputFormat::Plain => {
                    for item in &items {
                        println!("{}", render_item_line(item));
                    }
                }
            }
        }

        Command::Show { id } => {
            let item = store
                .get_by_id(id)
                .context("Failed to load item")?
                .with_context(|| format!("Item {} not found", id))?;
            print!("{}", render_item_detail(&item));
        }
    }

    Ok(())
}
