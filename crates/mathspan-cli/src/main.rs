use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use ariadne::Source;
use clap::Parser;

use math_core::{LatexError, LatexToMathML, MathDisplay};
use mathspan::{MathMode, TypesetError, Typesetter};

mod config_file;

use config_file::{Config, load_config_file};

/// Typesets math-marked elements in HTML files
#[derive(Parser, Debug)]
#[command(version, about = "Typesets math-marked elements in HTML files", long_about = None)]
struct Args {
    /// The HTML file to process ("-" for stdin)
    #[arg(conflicts_with = "formula", value_name = "FILE")]
    file: Option<PathBuf>,

    /// Class that marks an element as math content [default: math]
    #[arg(long, conflicts_with = "formula", value_name = "CLASS")]
    math_class: Option<String>,

    /// Class that selects display-style rendering [default: displaystyle]
    #[arg(long, conflicts_with = "formula", value_name = "CLASS")]
    display_class: Option<String>,

    /// Look recursively for HTML files in the given directory
    #[arg(short, long, conflicts_with = "formula")]
    recursive: bool,

    /// Dry run: typeset but don't write anything
    #[arg(long, conflicts_with = "formula")]
    dry_run: bool,

    /// If true, elements that fail to render are left untouched instead of
    /// aborting the run
    #[arg(long, conflicts_with = "formula")]
    continue_on_error: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Specifies a single LaTeX formula
    #[arg(short, long, conflicts_with = "file")]
    formula: Option<String>,

    /// Sets the display style for the formula to "inline"
    #[arg(short, long, conflicts_with = "file", group = "mode")]
    inline: bool,

    /// Sets the display style for the formula to "display"
    #[arg(short, long, conflicts_with = "file", group = "mode")]
    display: bool,
}

fn main() {
    let args = Args::parse();
    let config = match args.config {
        Some(ref path) => load_config_file(path).unwrap_or_else(|e| exit_config_error(e)),
        None => Config::default(),
    };
    // Command-line flags win over the config file.
    let math_class = args
        .math_class
        .clone()
        .or(config.math_class)
        .unwrap_or_else(|| "math".to_string());
    let display_class = args
        .display_class
        .clone()
        .or(config.display_class)
        .unwrap_or_else(|| "displaystyle".to_string());
    let mut converter =
        LatexToMathML::new(config.math_core).unwrap_or_else(|err| exit_macro_error(err));

    if let Some(ref fpath) = args.file {
        let mut typesetter = Typesetter::new(&math_class, &display_class, args.continue_on_error);
        if fpath == &PathBuf::from("-") {
            let input = read_stdin();
            match typeset_document(&mut typesetter, &input, &mut converter) {
                Ok(page) => println!("{}", page),
                Err(e) => exit_typeset_error(e, None),
            }
        } else if args.recursive {
            typeset_html_recursive(fpath, &mut typesetter, &mut converter, args.dry_run);
        } else {
            typeset_html(fpath, &mut typesetter, &mut converter, args.dry_run);
        }
    } else if let Some(ref formula) = args.formula {
        convert_and_exit(&args, formula, &converter);
    } else {
        convert_and_exit(&args, &read_stdin(), &converter);
    }
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
        exit_io_error(e);
    }
    buffer
}

fn convert_and_exit(args: &Args, latex: &str, converter: &LatexToMathML) {
    let display = if args.display {
        MathDisplay::Block
    } else {
        MathDisplay::Inline
    };
    match converter.convert_with_local_counter(latex, display) {
        Ok(mathml) => println!("{}", mathml),
        Err(e) => {
            let _ = e
                .to_report("formula", true)
                .eprint(("formula", Source::from(latex)));
            std::process::exit(2);
        }
    }
}

/// Typesets all math-marked elements of one document, with the equation
/// counter starting fresh.
fn typeset_document<'source>(
    typesetter: &mut Typesetter,
    input: &'source str,
    converter: &mut LatexToMathML,
) -> Result<String, TypesetError<'source>> {
    converter.reset_global_counter();
    typesetter.typeset(input, |buf, math, mode| -> Result<(), Box<LatexError>> {
        let display = match mode {
            MathMode::Inline => MathDisplay::Inline,
            MathMode::Display => MathDisplay::Block,
        };
        let mathml = converter.convert_with_global_counter(math, display)?;
        buf.push_str(&mathml);
        Ok(())
    })
}

/// Typesets all HTML files in a given directory.
///
/// The argument can be a file name or a directory name. For the latter case,
/// all HTML files in the directory are processed. If processing fails for a
/// file, the file is not changed. The extension of HTML files must be
/// ".html"; `.htm` files are ignored.
fn typeset_html_recursive(
    path: &Path,
    typesetter: &mut Typesetter,
    converter: &mut LatexToMathML,
    dry_run: bool,
) {
    if path.is_dir() {
        let dir = fs::read_dir(path).unwrap_or_else(|e| exit_io_error(e));
        for entry in dir.filter_map(Result::ok) {
            typeset_html_recursive(entry.path().as_ref(), typesetter, converter, dry_run)
        }
    } else if path.is_file() {
        if let Some(ext) = path.extension() {
            if ext == "html" {
                typeset_html(path, typesetter, converter, dry_run);
            }
        }
    }
}

fn typeset_html(
    fp: &Path,
    typesetter: &mut Typesetter,
    converter: &mut LatexToMathML,
    dry_run: bool,
) {
    let original = fs::read_to_string(fp).unwrap_or_else(|e| exit_io_error(e));
    let converted = typeset_document(typesetter, &original, converter)
        .unwrap_or_else(|e| exit_typeset_error(e, Some(fp)));
    if !dry_run && original != converted {
        let mut fp = fs::File::create(fp).unwrap_or_else(|e| exit_io_error(e));
        fp.write_all(converted.as_bytes())
            .unwrap_or_else(|e| exit_io_error(e));
    }
}

fn exit_typeset_error(e: TypesetError, fp: Option<&Path>) -> ! {
    eprint!("Typesetting error");
    if let Some(fp) = fp {
        eprint!(" in '{}'", fp.display());
    }
    eprintln!(": {}", e);
    std::process::exit(2);
}

fn exit_macro_error((err, index, definition): (Box<LatexError>, usize, String)) -> ! {
    eprintln!("Error in custom macro {} ('{}'): {}", index, definition, err);
    std::process::exit(2);
}

fn exit_config_error(e: config_file::ConfigError) -> ! {
    eprintln!("Configuration error: {}", e);
    std::process::exit(1);
}

fn exit_io_error(e: std::io::Error) -> ! {
    eprintln!("IO Error: {}", e);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use math_core::{LatexToMathML, MathCoreConfig};
    use mathspan::Typesetter;

    #[test]
    fn full_test() {
        let text = r#"<p>
Let us consider a rigid sphere of radius <span class="math">R</span> which is
at rest relative to the system <span class="math">K</span>. The equation of the
surface of this sphere, moving with velocity <span class="math">v</span>
relative to <span class="math">K</span>, is
<span class="math displaystyle">\xi^2 + \eta^2 + \zeta^2 = R^2</span>
</p>
"#;
        let mut converter = LatexToMathML::new(MathCoreConfig::default()).unwrap();
        let mut typesetter = Typesetter::new("math", "displaystyle", false);
        let page = crate::typeset_document(&mut typesetter, text, &mut converter).unwrap();
        assert!(page.contains("<math"));
        assert!(page.contains("display=\"block\""));
        assert!(page.contains("surface of this sphere"));
        assert!(!page.contains(r#"<span class="math">R</span>"#));
    }
}
