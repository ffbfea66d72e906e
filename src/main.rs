use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::Level;

use talent_query::lexer::tokenize;
use talent_query::{EngineConfig, QueryError, SearchEngine};

/// 内置的候选人搜索配置，未指定配置文件时使用
const BUNDLED_CONFIG: &str = include_str!("../search_config.json");

const HELP: &str = "\
命令:
  <query>           编译为 WHERE 片段并打印参数
  :tokens <query>   打印分词结果
  :ast <query>      以JSON打印语法树
  :select <query>   打印完整的 SELECT 语句
  :help             显示帮助
  :quit             退出";

/// 日志级别由 TALENT_QUERY_LOG 环境变量决定，默认 INFO
fn log_level() -> Level {
    std::env::var("TALENT_QUERY_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Level::INFO)
}

/// 优先使用命令行指定的JSON配置，否则使用内置配置
fn load_config() -> Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("无法加载配置文件 {path}")),
        None => EngineConfig::from_json_str(BUNDLED_CONFIG).context("内置配置无效"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(log_level()).init();

    let engine = SearchEngine::new(load_config()?)?;

    println!("--- Talent Query: 布尔搜索到 SQL 编译器 ---");
    println!("已加载 {} 个字段别名，主表 {}", engine.registry().fields.len(), engine.registry().main_table);
    println!("输入 :help 查看命令");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("query> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                if !run_command(&engine, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// 执行一行输入，返回 false 表示退出
fn run_command(engine: &SearchEngine, line: &str) -> bool {
    let (command, query) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) if command.starts_with(':') => (command, rest.trim()),
        _ if line.starts_with(':') => (line, ""),
        _ => ("", line),
    };

    match command {
        ":quit" | ":q" => return false,
        ":help" => println!("{HELP}"),
        ":tokens" => print_tokens(query),
        ":ast" => print_ast(engine, query),
        ":select" => print_select(engine, query),
        "" => print_where(engine, query),
        other => println!("未知命令 {other}，输入 :help 查看命令"),
    }
    true
}

fn print_tokens(query: &str) {
    match tokenize(query) {
        Ok(tokens) => {
            for token in tokens {
                println!(
                    "  {:<14} {:<20} {}..{}",
                    token.kind.to_string(),
                    format!("{:?}", token.text),
                    token.span.start,
                    token.span.end
                );
            }
        }
        Err(e) => report(&QueryError::from(e), query),
    }
}

fn print_ast(engine: &SearchEngine, query: &str) {
    match engine.parse(query) {
        Ok(Some(ast)) => {
            println!("  {ast}");
            match serde_json::to_string_pretty(&ast) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("✗ 无法序列化语法树: {e}"),
            }
        }
        Ok(None) => println!("(空查询，不过滤)"),
        Err(e) => report(&e, query),
    }
}

fn print_where(engine: &SearchEngine, query: &str) {
    match engine.build_where(query) {
        Ok(Some(filter)) => {
            println!("{}", filter.sql);
            for (key, value) in &filter.params {
                println!("  :{key} = {value:?}");
            }
        }
        Ok(None) => println!("(空查询，不过滤)"),
        Err(e) => report(&e, query),
    }
}

fn print_select(engine: &SearchEngine, query: &str) {
    match engine.build_where(query) {
        Ok(Some(filter)) => {
            println!("{}", filter.select_statement(engine.registry()));
            let (_, values) = filter.to_positional();
            for (i, value) in values.0.iter().enumerate() {
                println!("  ${} = {value:?}", i + 1);
            }
        }
        Ok(None) => println!("(空查询，不过滤)"),
        Err(e) => report(&e, query),
    }
}

fn report(error: &QueryError, query: &str) {
    println!("✗ {}", error.format_with_context(query));
}
