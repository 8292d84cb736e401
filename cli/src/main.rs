use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use scena::{Component, Engine, EngineOptions, Error, Object, Value, render_error};

/// Scena - load a scene document and print the object tree it builds
#[derive(Parser, Debug)]
#[command(name = "scena")]
#[command(about = "Instantiate a Scena document", long_about = None)]
struct Args {
    /// Document to load
    file: PathBuf,

    /// Bind a value in the root context before instantiating (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_binding)]
    bindings: Vec<(String, Value)>,

    /// Additional directory searched by directory imports (repeatable)
    #[arg(long = "import-path", value_name = "DIR")]
    import_paths: Vec<PathBuf>,

    /// Place the root object in a visible top-level window
    #[arg(long)]
    window: bool,
}

/// Parse `name=value`. The value is a bool, an integer, a float or else a
/// string, tried in that order.
fn parse_binding(arg: &str) -> Result<(String, Value), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{}\"", arg))?;
    if name.is_empty() {
        return Err("binding name is empty".to_string());
    }
    Ok((name.to_string(), parse_value(value)))
}

fn parse_value(text: &str) -> Value {
    if let Ok(b) = text.parse::<bool>() {
        Value::Bool(b)
    } else if let Ok(n) = text.parse::<isize>() {
        Value::Int(n)
    } else if let Ok(f) = text.parse::<f64>() {
        Value::Float64(f)
    } else {
        Value::String(text.to_string())
    }
}

/// Print `object` and its subtree as indented `Type { prop: value }` blocks.
fn print_tree(object: &Object, depth: usize) -> scena::Result<()> {
    let indent = "    ".repeat(depth);
    println!("{}{} {{", indent, object.type_name()?);
    for (name, value) in object.properties()? {
        println!("{}    {}: {}", indent, name, value);
    }
    for child in object.children()? {
        print_tree(&child, depth + 1)?;
    }
    println!("{}}}", indent);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let options = args
        .import_paths
        .into_iter()
        .fold(EngineOptions::default(), |options, dir| {
            options.with_import_path(dir)
        });
    let engine = Engine::new(options).into_diagnostic()?;

    let context = engine.root_context();
    for (name, value) in args.bindings {
        context.set(&name, value).into_diagnostic()?;
    }

    let mut component = Component::new(&engine);
    match component.set_file(&args.file) {
        Ok(()) => {}
        Err(e @ Error::Compile(_)) => {
            render_error(&e);
            return Err(miette!("{} failed to compile", args.file.display()));
        }
        Err(e) => return Err(e).into_diagnostic(),
    }

    let root = if args.window {
        component.create_window(&context).into_diagnostic()?.object().clone()
    } else {
        component.create(&context).into_diagnostic()?
    };
    print_tree(&root, 0).into_diagnostic()?;

    engine.close();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG overrides; by default only warnings and document console output are shown
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn,scena::console=debug"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("-12"), Value::Int(-12));
        assert_eq!(parse_value("2.5"), Value::Float64(2.5));
        assert_eq!(parse_value("1e3"), Value::Float64(1000.0));
        assert_eq!(parse_value("hello world"), Value::String("hello world".into()));
        assert_eq!(parse_value(""), Value::String(String::new()));
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(
            parse_binding("N=42").unwrap(),
            ("N".to_string(), Value::Int(42))
        );
        assert_eq!(
            parse_binding("title=a=b").unwrap(),
            ("title".to_string(), Value::String("a=b".into()))
        );
        assert!(parse_binding("missing").is_err());
        assert!(parse_binding("=1").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "scena",
            "main.qml",
            "--set",
            "N=42",
            "--import-path",
            "lib",
            "--window",
        ])
        .unwrap();
        assert_eq!(args.file, PathBuf::from("main.qml"));
        assert_eq!(args.bindings, vec![("N".to_string(), Value::Int(42))]);
        assert_eq!(args.import_paths, vec![PathBuf::from("lib")]);
        assert!(args.window);
    }
}
