use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use menu_render::{load_menu_table, AppConfig, MenuSession, OutputFormat};

const DEFAULT_CONFIG_PATH: &str = "menu_render.json";

#[derive(Clone, Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    data_file: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    background: Option<PathBuf>,
    no_background: bool,
    commands: Vec<String>,
    list: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let args = parse_args(args)?;
    let config = build_config(&args)?;
    let table = load_menu_table(&config).map_err(|e| e.to_string())?;

    if args.list {
        for category in table.categories() {
            println!("{}", category);
            for entry in table.entries().iter().filter(|e| e.category == category) {
                println!("  {}", entry.name);
            }
        }
        return Ok(());
    }

    let session = MenuSession::new(table, config);
    if !args.commands.is_empty() {
        for command in &args.commands {
            print_replies(&session.respond(command));
        }
        return Ok(());
    }

    println!("{}", menu_render::WELCOME_TEXT);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().map_err(|e| e.to_string())?;
        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line).map_err(|e| e.to_string())?;
        let line = line.trim();
        if read == 0 || line == "/quit" || line == "/exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        print_replies(&session.respond(line));
    }
    Ok(())
}

fn print_replies(replies: &[String]) {
    for reply in replies {
        println!("{}", reply);
    }
}

fn build_config(args: &Args) -> Result<AppConfig, String> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    if args.config.is_some() && !path.is_file() {
        return Err(format!("config file {} not found", path.display()));
    }
    let mut config = AppConfig::load(&path).map_err(|e| e.to_string())?;
    if let Some(data_file) = &args.data_file {
        config.data_file = data_file.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
        if args.format.is_none() {
            config.format = None;
        }
    }
    if let Some(format) = args.format {
        config.format = Some(format);
    }
    if let Some(background) = &args.background {
        config.background = Some(background.clone());
    }
    if args.no_background {
        config.background = None;
    }
    Ok(config)
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    let mut cfg = Args::default();
    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Err("help requested".to_string()),
            "--config" => {
                let v = value_for(&args, i, "--config")?;
                cfg.config = Some(PathBuf::from(v));
                i += 2;
            }
            "--data" => {
                let v = value_for(&args, i, "--data")?;
                cfg.data_file = Some(PathBuf::from(v));
                i += 2;
            }
            "--out" => {
                let v = value_for(&args, i, "--out")?;
                cfg.output = Some(PathBuf::from(v));
                i += 2;
            }
            "--format" => {
                let v = value_for(&args, i, "--format")?;
                cfg.format = Some(v.parse::<OutputFormat>().map_err(|e| e.to_string())?);
                i += 2;
            }
            "--background" => {
                let v = value_for(&args, i, "--background")?;
                cfg.background = Some(PathBuf::from(v));
                i += 2;
            }
            "--no-background" => {
                cfg.no_background = true;
                i += 1;
            }
            "--command" | "-c" => {
                let v = value_for(&args, i, "--command")?;
                cfg.commands.push(v.to_string());
                i += 2;
            }
            "--list" => {
                cfg.list = true;
                i += 1;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    if cfg.background.is_some() && cfg.no_background {
        return Err("--background and --no-background are exclusive".to_string());
    }
    Ok(cfg)
}

fn value_for<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn help_text() -> &'static str {
    r#"menu-render - build a restaurant menu page from selected dishes

USAGE:
  cargo run --features cli --bin menu-render -- [options]

OPTIONS:
  --config <path>      settings JSON (default: menu_render.json, defaults if absent)
  --data <path>        menu data JSON (default: menu_data.json)
  --out <path>         output file (default: menu_output.png)
  --format <fmt>       png|pdf (default: inferred from --out)
  --background <path>  background image
  --no-background      render on a blank page
  -c, --command <cmd>  run one command and exit; repeatable
  --list               print dishes grouped by category and exit

COMMANDS:
  /start                       show the welcome text
  /menu Rosół, Schabowy, ...   render the listed dishes
  /quit                        leave the prompt

Set RUST_LOG=debug for layout details.
"#
}
