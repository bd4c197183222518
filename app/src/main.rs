use anyhow::Result;
use app_lib::{
    clear_dictionary, config_path, import_dictionary, init_config, list_dictionary, load_config,
    run_replace, AppConfig, ReplaceRequest,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wordswap_render::OutputFormat;

/// 默认词库文件
const DEFAULT_STORE: &str = "wordswap-words.json";

#[derive(Parser)]
#[command(name = "wordswap")]
#[command(about = "按词库替换文档中的敏感词，并输出原文/替换后对照文档")]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true, env = "WORDSWAP_CONFIG")]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 替换文档中的词条
    Replace {
        /// 输入文档（.txt / .md）
        input: PathBuf,

        /// 词库文件（.json 词库或 .csv 表格）
        #[arg(short, long)]
        dict: Option<PathBuf>,

        /// 输出文件，默认为 <输入名>_replaced.<扩展名>
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 输出格式: html | text
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// 没有任何替换时报错
        #[arg(long)]
        strict: bool,
    },

    /// 词库管理
    Dict {
        #[command(subcommand)]
        command: DictCommands,
    },

    /// 配置管理
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DictCommands {
    /// 从 CSV 表格导入词库（覆盖原有内容）
    Import {
        csv: PathBuf,

        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// 词库名称
        #[arg(long)]
        name: Option<String>,
    },
    /// 列出词库内容
    List {
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
    },
    /// 清空词库
    Clear {
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// 写出默认配置
    Init,
    /// 显示当前配置
    Show,
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = config_path(cli.config.as_deref());
    // config init 用于修复损坏的配置，不读取现有文件
    let config = match &cli.command {
        Commands::Config {
            command: ConfigCommands::Init,
        } => AppConfig::default(),
        _ => load_config(&path)?,
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Replace {
            input,
            dict,
            output,
            format,
            strict,
        } => {
            let request = ReplaceRequest {
                input,
                dictionary: dict,
                output,
                format,
                strict,
            };
            let outcome = run_replace(&config, &request)?;
            for warning in &outcome.warnings {
                eprintln!("警告: {}", warning);
            }
            println!("{}", outcome.message);
            println!("输出: {}", outcome.output_path.display());
        }
        Commands::Dict { command } => match command {
            DictCommands::Import { csv, store, name } => {
                let count = import_dictionary(&csv, &store, name.as_deref())?;
                println!("词库更新成功，共导入 {} 个词条", count);
            }
            DictCommands::List { store } => {
                let pack = list_dictionary(&store)?;
                println!("{} (v{})，共 {} 个词条", pack.name, pack.version, pack.terms.len());
                for term in &pack.terms {
                    println!("{}\t{}", term.original, term.substitute);
                }
            }
            DictCommands::Clear { store } => {
                clear_dictionary(&store)?;
                println!("词库已清空");
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Init => {
                init_config(&path)?;
                println!("已写入默认配置: {}", path.display());
            }
            ConfigCommands::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        },
    }

    Ok(())
}
