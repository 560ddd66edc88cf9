use std::{env, fs::read_to_string, path::Path, process, rc::Rc, time::Instant};

use cyon::{
    binding_resolver::binding_resolver::resolve_bindings,
    call_resolver::call_resolver::resolve_calls,
    errors::errors::Error,
    format_error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    scope::globals::GlobalScope,
};

struct Options {
    file_path: String,
    show_tokens: bool,
    show_ast: bool,
}

fn parse_args() -> Result<Options, String> {
    let mut file_path = None;
    let mut show_tokens = false;
    let mut show_ast = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--tokens" => show_tokens = true,
            "--ast" => show_ast = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown flag: {}", flag)),
            _ if file_path.is_some() => return Err(String::from("Only one file can be given")),
            _ => file_path = Some(arg.clone()),
        }
    }

    match file_path {
        Some(file_path) => Ok(Options {
            file_path,
            show_tokens,
            show_ast,
        }),
        None => Err(String::from("Usage: cyon <file> [--tokens] [--ast]")),
    }
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let file_name = Path::new(&options.file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| options.file_path.clone());

    let source = match read_to_string(&options.file_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", options.file_path, error);
            process::exit(2);
        }
    };

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(errors) => fail(&errors, &source),
    };

    println!("Tokenized in {:?}", start.elapsed());

    if options.show_tokens {
        for token in &tokens {
            println!("{}", token.debug());
        }
    }

    let parse_start = Instant::now();
    let (_, parsed_ast) = parse(tokens, Rc::new(file_name));

    println!("Parsed in {:?}", parse_start.elapsed());

    let mut ast = match parsed_ast {
        Ok(ast) => ast,
        Err(errors) => fail(&errors, &source),
    };

    let mut globals = GlobalScope::new();

    let calls_start = Instant::now();
    if let Err(error) = resolve_calls(&mut ast, &globals) {
        fail(&[error], &source);
    }

    println!("Resolved calls in {:?}", calls_start.elapsed());

    let bindings_start = Instant::now();
    if let Err(errors) = resolve_bindings(&mut ast, &mut globals) {
        fail(&errors, &source);
    }

    println!("Resolved bindings in {:?}", bindings_start.elapsed());
    println!("Total time: {:?}", start.elapsed());

    if options.show_ast {
        println!("{}", pretty_print(ast.to_string()));
    }
}

fn fail(errors: &[Error], source: &str) -> ! {
    for error in errors {
        print!("{}", format_error(error, source));
    }

    process::exit(1);
}

/// Breaks an S-expression over several lines, one nested list per line.
fn pretty_print(string: String) -> String {
    let mut result = String::new();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in string.chars() {
        if in_string {
            result.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            '(' => {
                if depth > 0 {
                    if result.ends_with(' ') {
                        result.pop();
                    }
                    result.push('\n');
                    result.push_str(&"  ".repeat(depth));
                }
                depth += 1;
                result.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}
