//! Command-line inspection tool for question-annotated grammars
//!
//! Usage:
//!   qtree questions `<grammar>`                       - List question annotations
//!   qtree productions `<grammar>`                     - List productions and use-case headers
//!   qtree compile `<grammar>` `<target>` [--format F]   - Compile a production or endpoint path
//!   qtree formats                                   - List output formats

use clap::{Arg, Command};
use qtree::catalog::EndpointCatalog;
use qtree::config;
use qtree::formats::FormatRegistry;
use qtree::{Compiler, Grammar};
use std::path::Path;

fn main() {
    let matches = Command::new("qtree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect question-annotated EBNF grammars and the decision trees they compile to")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("questions")
                .about("List question annotations")
                .arg(grammar_arg()),
        )
        .subcommand(
            Command::new("productions")
                .about("List productions and use-case headers")
                .arg(grammar_arg()),
        )
        .subcommand(
            Command::new("compile")
                .about("Compile a production, or an endpoint path starting with '/'")
                .arg(grammar_arg())
                .arg(
                    Arg::new("target")
                        .help("Production name or endpoint path")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (see `qtree formats`)")
                        .default_value("treeviz"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("YAML file layered over the built-in settings and ./qtree.yaml"),
                )
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .help("Endpoint catalog YAML used to resolve endpoint paths"),
                ),
        )
        .subcommand(Command::new("formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("questions", sub)) => {
            let grammar = load_grammar(sub.get_one::<String>("grammar").unwrap());
            handle_questions_command(&grammar);
        }
        Some(("productions", sub)) => {
            let grammar = load_grammar(sub.get_one::<String>("grammar").unwrap());
            handle_productions_command(&grammar);
        }
        Some(("compile", sub)) => {
            let grammar = load_grammar(sub.get_one::<String>("grammar").unwrap());
            handle_compile_command(
                &grammar,
                sub.get_one::<String>("target").unwrap(),
                sub.get_one::<String>("format").unwrap(),
                sub.get_one::<String>("config").map(String::as_str),
                sub.get_one::<String>("catalog").map(String::as_str),
            );
        }
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!(),
    }
}

fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .help("Path to the grammar file")
        .required(true)
        .index(1)
}

fn load_grammar(path: &str) -> Grammar {
    let grammar = Grammar::load(path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    for diagnostic in grammar.diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }
    grammar
}

fn handle_questions_command(grammar: &Grammar) {
    for annotation in grammar.questions().iter() {
        let marker = if annotation.optional { " (optional)" } else { "" };
        println!(
            "{:>5}  {}{}: {}",
            annotation.line, annotation.parameter, marker, annotation.text
        );
    }
}

fn handle_productions_command(grammar: &Grammar) {
    for production in grammar.productions().iter() {
        match grammar.use_case(&production.name) {
            Some(use_case) => println!(
                "{:>5}  {}  [use case {}: {}]",
                production.line, production.name, use_case.number, use_case.endpoint
            ),
            None => println!("{:>5}  {}", production.line, production.name),
        }
    }
}

fn handle_compile_command(
    grammar: &Grammar,
    target: &str,
    format: &str,
    config_path: Option<&str>,
    catalog_path: Option<&str>,
) {
    let config = config::discover(Path::new("."), config_path.map(Path::new))
        .unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        });

    let compiler = Compiler::new(grammar, config);
    let compiled = if target.starts_with('/') {
        let catalog = match catalog_path {
            Some(path) => EndpointCatalog::from_yaml_file(path),
            None => EndpointCatalog::load_defaults(),
        }
        .unwrap_or_else(|e| {
            eprintln!("Error loading catalog: {}", e);
            std::process::exit(1);
        });
        compiler.compile_path(target, &catalog)
    } else {
        compiler.compile(target)
    };

    let Some(compiled) = compiled else {
        eprintln!("No production found for '{}'", target);
        std::process::exit(1);
    };

    let output = FormatRegistry::with_defaults()
        .render(&compiled, format)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}

fn handle_formats_command() {
    println!("Available formats:\n");
    for (name, description) in FormatRegistry::with_defaults().describe() {
        println!("  {}", name);
        println!("    {}", description);
    }
}
